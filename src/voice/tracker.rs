//! Completion tracker for voice diaries.
//!
//! The tracker turns the server's latest [`CompletionStatus`] into what the
//! user can do next. It holds no history: every status replaces the whole
//! state, so the same status always renders the same affordances.

use crate::auth::Route;
use crate::dto::SupplementRequest;
use crate::error::{ClientError, ClientResult};
use crate::models::{CaptureTarget, CompletionStatus, ConversationPhase, DiaryId, Period};

pub const NEW_ENTRY_PROMPT: &str =
    "How was your day? Please tell me what you did in the morning, afternoon, and evening.";
pub const GENERAL_PROMPT: &str = "Is there anything else you would like to record?";
pub const QUESTION_FALLBACK_PROMPT: &str =
    "Please respond to this meaningful question about your day.";

pub fn period_prompt(period: Period) -> &'static str {
    match period {
        Period::Morning => "What did you do in the morning? How did you feel?",
        Period::Afternoon => "What did you do in the afternoon? What happened?",
        Period::Evening => "What happened in the evening? How did you feel?",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerState {
    /// No diary yet; the first recording creates one.
    NoEntry,
    Collecting {
        diary_id: DiaryId,
        missing: Vec<Period>,
        suggestion: Option<String>,
    },
    AskingQuestion {
        diary_id: DiaryId,
        question: String,
    },
    Complete {
        diary_id: DiaryId,
    },
}

impl TrackerState {
    pub fn diary_id(&self) -> Option<DiaryId> {
        match self {
            TrackerState::NoEntry => None,
            TrackerState::Collecting { diary_id, .. }
            | TrackerState::AskingQuestion { diary_id, .. }
            | TrackerState::Complete { diary_id } => Some(*diary_id),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TrackerState::NoEntry => "no_entry",
            TrackerState::Collecting { .. } => "collecting",
            TrackerState::AskingQuestion { .. } => "asking_question",
            TrackerState::Complete { .. } => "complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    /// Routine nudge towards missing information ("AI suggests").
    Suggestion,
    /// A meaningful question that needs its own answer ("AI asks").
    Question,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub target: CaptureTarget,
    pub text: String,
}

/// Everything the screen offers for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordances {
    pub tabs: Vec<CaptureTarget>,
    pub banner: Option<Banner>,
    pub view_entry: Option<DiaryId>,
}

/// What the next recording must be sent as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureRequest {
    NewEntry,
    Supplement(SupplementRequest),
}

#[derive(Debug, Clone)]
pub struct CompletionTracker {
    state: TrackerState,
    selected: Option<CaptureTarget>,
    banner: Option<Banner>,
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self {
            state: TrackerState::NoEntry,
            selected: Some(CaptureTarget::General),
            banner: None,
        }
    }

    /// Replace the tracker's state with the server's verdict for `diary_id`.
    pub fn apply(&mut self, diary_id: DiaryId, status: &CompletionStatus) {
        let state = interpret(diary_id, status);

        self.banner = match &state {
            TrackerState::Collecting {
                missing,
                suggestion: Some(text),
                ..
            } => Some(Banner {
                kind: BannerKind::Suggestion,
                target: missing
                    .first()
                    .map(|p| CaptureTarget::Period(*p))
                    .unwrap_or(CaptureTarget::General),
                text: text.clone(),
            }),
            TrackerState::AskingQuestion { question, .. } => Some(Banner {
                kind: BannerKind::Question,
                target: CaptureTarget::QuestionResponse,
                text: question.clone(),
            }),
            _ => None,
        };

        self.selected = match &state {
            TrackerState::NoEntry => Some(CaptureTarget::General),
            TrackerState::Collecting { missing, .. } => match self.selected {
                Some(CaptureTarget::Period(p)) if missing.contains(&p) => self.selected,
                _ => Some(CaptureTarget::General),
            },
            TrackerState::AskingQuestion { .. } => Some(CaptureTarget::QuestionResponse),
            TrackerState::Complete { .. } => None,
        };
        if !banner_fits(self.banner.as_ref(), self.selected) {
            self.banner = None;
        }

        tracing::debug!(
            diary_id = %diary_id,
            state = state.name(),
            selected = ?self.selected,
            "Completion state replaced"
        );
        self.state = state;
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn diary_id(&self) -> Option<DiaryId> {
        self.state.diary_id()
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, TrackerState::Complete { .. })
    }

    pub fn selected(&self) -> Option<CaptureTarget> {
        self.selected
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn affordances(&self) -> Affordances {
        Affordances {
            tabs: self.tabs(),
            banner: self.banner.clone(),
            view_entry: match self.state {
                TrackerState::Complete { diary_id } => Some(diary_id),
                _ => None,
            },
        }
    }

    /// Choose the tab the next recording is tagged with.
    ///
    /// Only offered tabs can be chosen. Choosing a period tab drops any
    /// banner that was rendered for a different one.
    pub fn select(&mut self, target: CaptureTarget) -> ClientResult<()> {
        if !self.tabs().contains(&target) {
            return Err(ClientError::InvalidTarget(format!(
                "{} is not offered while {}",
                target,
                self.state.name()
            )));
        }
        self.selected = Some(target);
        if !banner_fits(self.banner.as_ref(), self.selected) {
            self.banner = None;
        }
        Ok(())
    }

    /// Text shown above the record button.
    pub fn prompt(&self) -> Option<String> {
        match &self.state {
            TrackerState::NoEntry => Some(NEW_ENTRY_PROMPT.to_string()),
            TrackerState::Complete { .. } => None,
            TrackerState::AskingQuestion { question, .. } => Some(question.clone()),
            TrackerState::Collecting { .. } => Some(
                match self.selected.unwrap_or(CaptureTarget::General) {
                    CaptureTarget::Period(p) => period_prompt(p),
                    CaptureTarget::General => GENERAL_PROMPT,
                    CaptureTarget::QuestionResponse => QUESTION_FALLBACK_PROMPT,
                }
                .to_string(),
            ),
        }
    }

    /// How the next recording must be submitted, `None` once complete.
    pub fn capture_request(&self) -> Option<CaptureRequest> {
        match &self.state {
            TrackerState::NoEntry => Some(CaptureRequest::NewEntry),
            TrackerState::Collecting { diary_id, .. } => {
                Some(CaptureRequest::Supplement(SupplementRequest {
                    diary_id: *diary_id,
                    target: self.selected.unwrap_or(CaptureTarget::General),
                    question: None,
                }))
            }
            TrackerState::AskingQuestion { diary_id, question } => {
                Some(CaptureRequest::Supplement(SupplementRequest {
                    diary_id: *diary_id,
                    target: CaptureTarget::QuestionResponse,
                    question: Some(question.clone()),
                }))
            }
            TrackerState::Complete { .. } => None,
        }
    }

    /// Where to navigate once the entry is complete.
    pub fn finished_view(&self) -> Option<Route> {
        match self.state {
            TrackerState::Complete { diary_id } => Some(Route::DiaryDetail(diary_id)),
            _ => None,
        }
    }

    fn tabs(&self) -> Vec<CaptureTarget> {
        match &self.state {
            TrackerState::NoEntry => vec![CaptureTarget::General],
            TrackerState::Collecting { missing, .. } => missing
                .iter()
                .map(|p| CaptureTarget::Period(*p))
                .chain(std::iter::once(CaptureTarget::General))
                .collect(),
            TrackerState::AskingQuestion { .. } => vec![CaptureTarget::QuestionResponse],
            TrackerState::Complete { .. } => Vec::new(),
        }
    }
}

/// Map a status onto a state. `complete` outranks everything, then a
/// meaningful question, then missing-field collection.
/// A banner stays up unless a period tab other than its own is selected.
fn banner_fits(banner: Option<&Banner>, selected: Option<CaptureTarget>) -> bool {
    match (banner, selected) {
        (Some(banner), Some(selected @ CaptureTarget::Period(_))) => banner.target == selected,
        _ => true,
    }
}

fn interpret(diary_id: DiaryId, status: &CompletionStatus) -> TrackerState {
    let phase = status.conversation_phase;

    if status.complete {
        if !status.missing_information.is_empty() || phase.is_some_and(|p| p != ConversationPhase::Complete) {
            tracing::warn!(
                diary_id = %diary_id,
                missing = ?status.missing_information,
                phase = ?phase,
                "Inconsistent completion status, trusting complete flag"
            );
        }
        return TrackerState::Complete { diary_id };
    }

    if let Some(question) = &status.meaningful_question {
        if phase == Some(ConversationPhase::AskingQuestion) || status.next_question.is_some() {
            return TrackerState::AskingQuestion {
                diary_id,
                question: question.clone(),
            };
        }
    }

    if phase == Some(ConversationPhase::AskingQuestion) {
        tracing::warn!(diary_id = %diary_id, "Asking-question phase without a question, collecting instead");
    }
    if status.missing_information.is_empty() {
        tracing::warn!(diary_id = %diary_id, phase = ?phase, "Incomplete entry reports nothing missing, offering general tab");
    }

    TrackerState::Collecting {
        diary_id,
        missing: status.missing_information.clone(),
        suggestion: status.next_question.clone(),
    }
}
