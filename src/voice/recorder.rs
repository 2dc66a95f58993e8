//! Audio capture as a scoped acquisition.
//!
//! A [`Recorder`] owns an [`AudioDevice`] and at most one finished clip.
//! [`Recorder::start`] hands out an [`ActiveCapture`] that mutably borrows the
//! recorder, so two overlapping captures cannot be expressed. The device is
//! released when the capture stops and also when it is dropped early.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::time::Duration;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{ClientError, ClientResult};

pub const WAV_MIME: &str = "audio/wav";
pub const WAV_FILE_NAME: &str = "recording.wav";

const CHUNK_FRAMES: usize = 4096;

/// A finished recording, ready to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlob {
    bytes: Vec<u8>,
    duration: Duration,
}

impl AudioBlob {
    /// Encode mono samples in `[-1.0, 1.0]` as a 16-bit PCM WAV clip.
    pub fn from_samples(samples: &[f32], sample_rate: u32) -> ClientResult<Self> {
        if samples.is_empty() {
            return Err(ClientError::Recorder("No audio recorded".into()));
        }
        if sample_rate == 0 {
            return Err(ClientError::Recorder("Sample rate must be positive".into()));
        }

        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).map_err(wav_error)?;
            for sample in samples {
                let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer.write_sample(sample_i16).map_err(wav_error)?;
            }
            writer.finalize().map_err(wav_error)?;
        }

        Ok(Self {
            bytes: cursor.into_inner(),
            duration: Duration::from_secs_f64(samples.len() as f64 / sample_rate as f64),
        })
    }

    /// Wrap an already encoded WAV clip after checking it parses.
    pub fn from_wav_bytes(bytes: Vec<u8>) -> ClientResult<Self> {
        let (spec, frames) = {
            let reader = WavReader::new(Cursor::new(bytes.as_slice())).map_err(wav_error)?;
            (reader.spec(), reader.duration())
        };
        if frames == 0 {
            return Err(ClientError::Recorder("No audio recorded".into()));
        }
        let duration = Duration::from_secs_f64(frames as f64 / spec.sample_rate as f64);
        Ok(Self { bytes, duration })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn mime(&self) -> &'static str {
        WAV_MIME
    }

    pub fn file_name(&self) -> &'static str {
        WAV_FILE_NAME
    }
}

/// `MM:SS` as shown next to the record button.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// A microphone, or anything standing in for one.
pub trait AudioDevice {
    /// Take exclusive hold of the device and report its sample rate.
    fn acquire(&mut self) -> ClientResult<u32>;

    /// Next block of mono samples, `None` once the source is exhausted.
    fn read_chunk(&mut self) -> ClientResult<Option<Vec<f32>>>;

    /// Give the device back. Must be safe to call on an unacquired device.
    fn release(&mut self);
}

pub struct Recorder<D: AudioDevice> {
    device: D,
    blob: Option<AudioBlob>,
}

impl<D: AudioDevice> Recorder<D> {
    pub fn new(device: D) -> Self {
        Self { device, blob: None }
    }

    /// Begin a new capture. Any previous clip is discarded first.
    pub fn start(&mut self) -> ClientResult<ActiveCapture<'_, D>> {
        if self.blob.take().is_some() {
            tracing::debug!("Discarded previous recording");
        }

        let sample_rate = self.device.acquire().map_err(|e| {
            tracing::warn!(error = %e, "Microphone access failed");
            e
        })?;
        tracing::info!(sample_rate, "Recording started");

        Ok(ActiveCapture {
            recorder: self,
            sample_rate,
            samples: Vec::new(),
            released: false,
        })
    }

    pub fn blob(&self) -> Option<&AudioBlob> {
        self.blob.as_ref()
    }

    /// Drop the finished clip ("Record Again").
    pub fn reset(&mut self) {
        self.blob = None;
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

/// An in-progress capture. Samples only ever get appended.
pub struct ActiveCapture<'a, D: AudioDevice> {
    recorder: &'a mut Recorder<D>,
    sample_rate: u32,
    samples: Vec<f32>,
    released: bool,
}

impl<'a, D: AudioDevice> ActiveCapture<'a, D> {
    /// Pull one chunk from the device. Returns `false` once it has no more.
    pub fn pump(&mut self) -> ClientResult<bool> {
        match self.recorder.device.read_chunk()? {
            Some(chunk) => {
                self.samples.extend_from_slice(&chunk);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Pump until the device runs dry.
    pub fn record_to_end(&mut self) -> ClientResult<()> {
        while self.pump()? {}
        Ok(())
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate.max(1) as f64)
    }

    /// Finish the capture, release the device and keep the clip on the recorder.
    pub fn stop(mut self) -> ClientResult<()> {
        self.release();
        let samples = std::mem::take(&mut self.samples);
        let blob = AudioBlob::from_samples(&samples, self.sample_rate)?;
        tracing::info!(
            bytes = blob.len(),
            duration = %format_elapsed(blob.duration()),
            "Recording completed"
        );
        self.recorder.blob = Some(blob);
        Ok(())
    }

    fn release(&mut self) {
        if !self.released {
            self.recorder.device.release();
            self.released = true;
        }
    }
}

impl<D: AudioDevice> Drop for ActiveCapture<'_, D> {
    fn drop(&mut self) {
        if !self.released {
            tracing::debug!(
                samples = self.samples.len(),
                "Capture abandoned, releasing device"
            );
            self.release();
        }
    }
}

/// Replays a WAV file as if it were the microphone.
pub struct WavFileDevice {
    path: PathBuf,
    reader: Option<WavReader<BufReader<File>>>,
}

impl WavFileDevice {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reader: None,
        }
    }
}

impl AudioDevice for WavFileDevice {
    fn acquire(&mut self) -> ClientResult<u32> {
        let reader = WavReader::open(&self.path).map_err(|e| {
            ClientError::Recorder(format!("Failed to open {}: {}", self.path.display(), e))
        })?;
        let rate = reader.spec().sample_rate;
        self.reader = Some(reader);
        Ok(rate)
    }

    fn read_chunk(&mut self) -> ClientResult<Option<Vec<f32>>> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| ClientError::Recorder("Device not acquired".into()))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;
        let wanted = CHUNK_FRAMES * channels;

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .samples::<f32>()
                .take(wanted)
                .collect::<Result<_, _>>()
                .map_err(wav_error)?,
            SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1) as u32)) as f32;
                reader
                    .samples::<i32>()
                    .take(wanted)
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()
                    .map_err(wav_error)?
            }
        };

        if interleaved.is_empty() {
            return Ok(None);
        }

        let mono = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();
        Ok(Some(mono))
    }

    fn release(&mut self) {
        self.reader = None;
    }
}

fn wav_error(e: hound::Error) -> ClientError {
    ClientError::Recorder(format!("WAV error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted device that counts acquire/release calls.
    #[derive(Default)]
    struct ScriptedDevice {
        chunks: VecDeque<Vec<f32>>,
        acquired: usize,
        released: usize,
        deny: bool,
    }

    impl ScriptedDevice {
        fn with_chunks(chunks: Vec<Vec<f32>>) -> Self {
            Self {
                chunks: chunks.into(),
                ..Default::default()
            }
        }
    }

    impl AudioDevice for ScriptedDevice {
        fn acquire(&mut self) -> ClientResult<u32> {
            if self.deny {
                return Err(ClientError::Recorder("Microphone access required".into()));
            }
            self.acquired += 1;
            Ok(8_000)
        }

        fn read_chunk(&mut self) -> ClientResult<Option<Vec<f32>>> {
            Ok(self.chunks.pop_front())
        }

        fn release(&mut self) {
            self.released += 1;
        }
    }

    #[test]
    fn test_capture_produces_wav_blob() {
        let mut recorder = Recorder::new(ScriptedDevice::with_chunks(vec![
            vec![0.1; 4_000],
            vec![-0.1; 4_000],
        ]));
        let mut capture = recorder.start().unwrap();
        capture.record_to_end().unwrap();
        assert_eq!(capture.elapsed(), Duration::from_secs(1));
        capture.stop().unwrap();

        let blob = recorder.blob().unwrap();
        assert_eq!(blob.mime(), "audio/wav");
        assert_eq!(blob.file_name(), "recording.wav");
        assert_eq!(blob.duration(), Duration::from_secs(1));
        assert_eq!(recorder.device().released, 1);

        let parsed = AudioBlob::from_wav_bytes(blob.bytes().to_vec()).unwrap();
        assert_eq!(parsed.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_new_capture_discards_previous_blob() {
        let mut recorder = Recorder::new(ScriptedDevice::with_chunks(vec![vec![0.2; 800]]));
        let mut capture = recorder.start().unwrap();
        capture.record_to_end().unwrap();
        capture.stop().unwrap();
        assert!(recorder.blob().is_some());

        let capture = recorder.start().unwrap();
        drop(capture);
        assert!(recorder.blob().is_none());
    }

    #[test]
    fn test_dropped_capture_releases_device() {
        let mut recorder = Recorder::new(ScriptedDevice::with_chunks(vec![vec![0.5; 100]]));
        {
            let mut capture = recorder.start().unwrap();
            capture.pump().unwrap();
        }
        assert_eq!(recorder.device().acquired, 1);
        assert_eq!(recorder.device().released, 1);
        assert!(recorder.blob().is_none());
    }

    #[test]
    fn test_empty_capture_rejected() {
        let mut recorder = Recorder::new(ScriptedDevice::default());
        let capture = recorder.start().unwrap();
        let err = capture.stop().unwrap_err();
        assert_eq!(err.to_string(), "Recorder error: No audio recorded");
        assert_eq!(recorder.device().released, 1);
        assert!(recorder.blob().is_none());
    }

    #[test]
    fn test_denied_microphone_surfaces_error() {
        let mut recorder = Recorder::new(ScriptedDevice {
            deny: true,
            ..Default::default()
        });
        assert!(recorder.start().is_err());
        assert_eq!(recorder.device().released, 0);
    }

    #[test]
    fn test_reset_drops_blob() {
        let mut recorder = Recorder::new(ScriptedDevice::with_chunks(vec![vec![0.0; 10]]));
        let mut capture = recorder.start().unwrap();
        capture.record_to_end().unwrap();
        capture.stop().unwrap();
        recorder.reset();
        assert!(recorder.blob().is_none());
    }

    #[test]
    fn test_wav_file_device_downmixes_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("day.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..16_000 {
            writer.write_sample(i16::MAX / 2).unwrap();
            writer.write_sample(i16::MAX / 2).unwrap();
        }
        writer.finalize().unwrap();

        let mut recorder = Recorder::new(WavFileDevice::new(&path));
        let mut capture = recorder.start().unwrap();
        capture.record_to_end().unwrap();
        assert_eq!(capture.elapsed(), Duration::from_secs(1));
        capture.stop().unwrap();
        assert_eq!(recorder.blob().unwrap().duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_missing_file_fails_to_acquire() {
        let mut recorder = Recorder::new(WavFileDevice::new("/nonexistent/day.wav"));
        assert!(recorder.start().is_err());
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00");
        assert_eq!(format_elapsed(Duration::from_secs(75)), "01:15");
    }
}
