use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::analysis::SentimentAnalysis;
use crate::models::completion::{lenient_phase, ConversationMessage, ConversationPhase};

/// Server-assigned diary identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiaryId(pub i64);

impl fmt::Display for DiaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for DiaryId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(DiaryId)
            .map_err(|_| format!("Invalid diary ID: {}", s))
    }
}

/// A part of the day a diary entry can be split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Morning,
    Afternoon,
    Evening,
}

impl Period {
    /// Canonical display order.
    pub const ALL: [Period; 3] = [Period::Morning, Period::Afternoon, Period::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Morning => "morning",
            Period::Afternoon => "afternoon",
            Period::Evening => "evening",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(Period::Morning),
            "afternoon" => Ok(Period::Afternoon),
            "evening" => Ok(Period::Evening),
            other => Err(format!("Unknown period: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afternoon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evening: Option<String>,
}

impl StructuredContent {
    pub fn get(&self, period: Period) -> Option<&str> {
        let text = match period {
            Period::Morning => self.morning.as_deref(),
            Period::Afternoon => self.afternoon.as_deref(),
            Period::Evening => self.evening.as_deref(),
        };
        text.filter(|t| !t.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        Period::ALL.iter().all(|p| self.get(*p).is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: DiaryId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "wire_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub structured_content: Option<StructuredContent>,
    #[serde(default)]
    pub audio_file_path: Option<String>,
    #[serde(default)]
    pub analysis: Option<SentimentAnalysis>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_analyzed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_complete: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conversation_log: Vec<ConversationMessage>,
    #[serde(default, deserialize_with = "lenient_phase")]
    pub conversation_phase: Option<ConversationPhase>,
    #[serde(default)]
    pub next_question: Option<String>,
    #[serde(default)]
    pub meaningful_question: Option<String>,
    #[serde(default)]
    pub meaningful_answer: Option<String>,
}

impl DiaryEntry {
    /// Analysis is only shown once the server flags the entry as analyzed.
    pub fn visible_analysis(&self) -> Option<&SentimentAnalysis> {
        if self.is_analyzed {
            self.analysis.as_ref()
        } else {
            None
        }
    }

    pub fn period_text(&self, period: Period) -> Option<&str> {
        self.structured_content.as_ref().and_then(|c| c.get(period))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `YYYY-MM-DD` as well as a full timestamp whose date part is used.
fn wire_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_wire_date(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn parse_wire_date(raw: &str) -> Result<NaiveDate, String> {
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| format!("Invalid date {:?}: {}", raw, e))
}
