use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::diary::{DiaryId, Period};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    CollectingInfo,
    AskingQuestion,
    Complete,
}

impl ConversationPhase {
    /// Unknown phase names from a newer backend are ignored rather than fatal.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        match raw.trim() {
            "collecting_info" => Some(Self::CollectingInfo),
            "asking_question" => Some(Self::AskingQuestion),
            "complete" => Some(Self::Complete),
            other => {
                tracing::warn!(phase = %other, "Ignoring unknown conversation phase");
                None
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollectingInfo => "collecting_info",
            Self::AskingQuestion => "asking_question",
            Self::Complete => "complete",
        }
    }
}

pub(crate) fn lenient_phase<'de, D>(deserializer: D) -> Result<Option<ConversationPhase>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| ConversationPhase::parse_lenient(&s)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Server verdict on how far a diary entry is from being complete.
///
/// Always replaced wholesale by the next fetch; the client never derives it
/// from the entry's structured content.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "CompletionStatusWire")]
pub struct CompletionStatus {
    pub complete: bool,
    /// Canonically ordered, duplicates removed, unknown names dropped.
    pub missing_information: Vec<Period>,
    pub conversation_phase: Option<ConversationPhase>,
    pub next_question: Option<String>,
    pub meaningful_question: Option<String>,
    pub conversation_log: Vec<ConversationMessage>,
}

/// Both the documented shape and the legacy `{ isComplete, missingInformation }`
/// shape some backend versions answer with.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionStatusWire {
    #[serde(default)]
    complete: Option<bool>,
    #[serde(default)]
    is_complete: Option<bool>,
    #[serde(default)]
    missing_information: Option<Vec<String>>,
    #[serde(default)]
    conversation_phase: Option<String>,
    #[serde(default)]
    next_question: Option<String>,
    #[serde(default)]
    meaningful_question: Option<String>,
    #[serde(default)]
    conversation_log: Option<Vec<ConversationMessage>>,
}

impl TryFrom<CompletionStatusWire> for CompletionStatus {
    type Error = String;

    fn try_from(wire: CompletionStatusWire) -> Result<Self, Self::Error> {
        let missing_information = normalize_missing(wire.missing_information.unwrap_or_default());

        if let Some(is_complete) = wire.is_complete {
            return Ok(Self {
                complete: is_complete,
                missing_information,
                conversation_phase: None,
                next_question: None,
                meaningful_question: None,
                conversation_log: Vec::new(),
            });
        }

        let complete = wire
            .complete
            .ok_or_else(|| "completion status is missing `complete`".to_string())?;

        Ok(Self {
            complete,
            missing_information,
            conversation_phase: wire
                .conversation_phase
                .as_deref()
                .and_then(ConversationPhase::parse_lenient),
            next_question: non_blank(wire.next_question),
            meaningful_question: non_blank(wire.meaningful_question),
            conversation_log: wire.conversation_log.unwrap_or_default(),
        })
    }
}

fn normalize_missing(raw: Vec<String>) -> Vec<Period> {
    let set: BTreeSet<Period> = raw
        .iter()
        .filter_map(|name| match name.parse::<Period>() {
            Ok(p) => Some(p),
            Err(_) => {
                tracing::warn!(name = %name, "Dropping unknown missing-information period");
                None
            }
        })
        .collect();
    set.into_iter().collect()
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// What a voice submission is tagged with (`supplementType` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureTarget {
    Period(Period),
    General,
    QuestionResponse,
}

impl CaptureTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureTarget::Period(p) => p.as_str(),
            CaptureTarget::General => "general",
            CaptureTarget::QuestionResponse => "question_response",
        }
    }
}

impl fmt::Display for CaptureTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptureTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(CaptureTarget::General),
            "question_response" | "question" => Ok(CaptureTarget::QuestionResponse),
            other => other
                .parse::<Period>()
                .map(CaptureTarget::Period)
                .map_err(|_| format!("Unknown capture target: {}", other)),
        }
    }
}

/// Acknowledgement of a new or supplementary voice submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSubmissionResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub diary_id: Option<DiaryId>,
    #[serde(default, deserialize_with = "lenient_phase")]
    pub conversation_phase: Option<ConversationPhase>,
    #[serde(default)]
    pub next_question: Option<String>,
    #[serde(default)]
    pub meaningful_question: Option<String>,
    #[serde(default)]
    pub complete: Option<bool>,
    #[serde(default)]
    pub missing_information: Option<Vec<String>>,
}

impl VoiceSubmissionResponse {
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(true)
    }
}
