use serde::{Deserialize, Serialize};

use crate::models::diary::Period;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feelings {
    pub emotion: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    #[serde(default)]
    pub morning: String,
    #[serde(default)]
    pub afternoon: String,
    #[serde(default)]
    pub evening: String,
}

impl PeriodSummary {
    pub fn get(&self, period: Period) -> &str {
        match period {
            Period::Morning => &self.morning,
            Period::Afternoon => &self.afternoon,
            Period::Evening => &self.evening,
        }
    }
}

/// Result of one analysis request. A later request replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub feelings: Feelings,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub summary: PeriodSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

impl SentimentAnalysis {
    pub fn follow_up(&self) -> Option<&str> {
        self.question.as_deref().filter(|q| !q.trim().is_empty())
    }
}
