//! Voice diary capture: the recorder, the completion tracker, and the session
//! that ties them to the diary service.

pub mod recorder;
pub mod session;
pub mod tracker;

pub use recorder::{ActiveCapture, AudioBlob, AudioDevice, Recorder, WavFileDevice};
pub use session::{SubmitOutcome, VoiceSession};
pub use tracker::{
    Affordances, Banner, BannerKind, CaptureRequest, CompletionTracker, TrackerState,
};
