use std::fmt::Write;
use std::path::Path;

use chrono::NaiveDate;

use crate::api::DiaryService;
use crate::error::{ClientError, ClientResult};
use crate::models::{CaptureTarget, DiaryId};
use crate::voice::recorder::{format_elapsed, AudioBlob, Recorder, WavFileDevice};
use crate::voice::tracker::{BannerKind, CompletionTracker, TrackerState};
use crate::voice::VoiceSession;

pub async fn status<S: DiaryService>(service: S, id: DiaryId) -> ClientResult<String> {
    let session = VoiceSession::resume(service, id).await?;
    Ok(render_tracker(session.tracker()))
}

/// Play `audio` through the recorder and submit it as whatever the entry needs.
pub async fn submit<S: DiaryService>(
    service: S,
    audio: &Path,
    diary: Option<DiaryId>,
    target: Option<CaptureTarget>,
    date: Option<NaiveDate>,
) -> ClientResult<String> {
    let mut session = match diary {
        Some(id) => VoiceSession::resume(service, id).await?,
        None => VoiceSession::new(service),
    };
    if let Some(date) = date {
        session = session.with_entry_date(date);
    }
    if let Some(target) = target {
        session.select(target)?;
    }

    let blob = capture(audio)?;
    let outcome = session.submit(&blob).await?;

    let mut out = String::new();
    if let Some(message) = &outcome.message {
        let _ = writeln!(out, "{}", message);
    }
    let _ = writeln!(out, "Diary #{}", outcome.diary_id);
    out.push_str(&render_tracker(session.tracker()));
    Ok(out)
}

fn capture(path: &Path) -> ClientResult<AudioBlob> {
    let mut recorder = Recorder::new(WavFileDevice::new(path));
    let mut capture = recorder.start()?;
    capture.record_to_end()?;
    tracing::debug!(elapsed = %format_elapsed(capture.elapsed()), "Capture finished");
    capture.stop()?;

    recorder
        .blob()
        .cloned()
        .ok_or_else(|| ClientError::Recorder("No audio recorded".into()))
}

pub fn render_tracker(tracker: &CompletionTracker) -> String {
    let mut out = String::new();
    let affordances = tracker.affordances();

    match tracker.state() {
        TrackerState::Complete { diary_id } => {
            let _ = writeln!(out, "All information is complete!");
            let _ = writeln!(out, "View it with `record diary show {}`", diary_id);
            return out;
        }
        TrackerState::NoEntry => {
            let _ = writeln!(out, "No entry yet.");
        }
        TrackerState::AskingQuestion { .. } => {
            let _ = writeln!(out, "One more question before the entry is complete.");
        }
        TrackerState::Collecting { missing, .. } if !missing.is_empty() => {
            let names: Vec<_> = missing.iter().map(|p| p.as_str()).collect();
            let _ = writeln!(out, "Still missing: {}", names.join(", "));
        }
        TrackerState::Collecting { .. } => {}
    }

    if let Some(banner) = &affordances.banner {
        let label = match banner.kind {
            BannerKind::Suggestion => "AI suggests",
            BannerKind::Question => "AI asks",
        };
        let _ = writeln!(out, "{}: {}", label, banner.text);
    }

    let tabs: Vec<String> = affordances
        .tabs
        .iter()
        .map(|t| {
            if tracker.selected() == Some(*t) {
                format!("[{}]", t)
            } else {
                t.to_string()
            }
        })
        .collect();
    let _ = writeln!(out, "Record next: {}", tabs.join("  "));
    if let Some(prompt) = tracker.prompt() {
        let _ = writeln!(out, "{}", prompt);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompletionStatus, ConversationPhase, Period};

    #[test]
    fn test_render_collecting_with_suggestion() {
        let mut tracker = CompletionTracker::new();
        tracker.apply(
            DiaryId(5),
            &CompletionStatus {
                complete: false,
                missing_information: vec![Period::Afternoon],
                conversation_phase: Some(ConversationPhase::CollectingInfo),
                next_question: Some("What did you have for lunch?".into()),
                meaningful_question: None,
                conversation_log: Vec::new(),
            },
        );
        let text = render_tracker(&tracker);
        assert!(text.contains("Still missing: afternoon"));
        assert!(text.contains("AI suggests: What did you have for lunch?"));
        assert!(text.contains("Record next: afternoon  [general]"));
    }

    #[test]
    fn test_render_complete() {
        let mut tracker = CompletionTracker::new();
        tracker.apply(
            DiaryId(5),
            &CompletionStatus {
                complete: true,
                missing_information: Vec::new(),
                conversation_phase: None,
                next_question: None,
                meaningful_question: None,
                conversation_log: Vec::new(),
            },
        );
        assert!(render_tracker(&tracker).contains("record diary show 5"));
    }

    #[test]
    fn test_capture_missing_file_fails() {
        assert!(capture(Path::new("/nonexistent/clip.wav")).is_err());
    }
}
