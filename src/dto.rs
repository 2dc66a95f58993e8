//! # RecorD: Request DTOs
//!
//! Every request body the client sends, validated before it leaves the
//! process. A request that fails validation never reaches the network and
//! never reaches the completion tracker.
//!
//! Conventions:
//! - `*Request` → serialized to the server as a JSON body
//! - Voice submissions are sent as multipart forms and carry no JSON body
//! - All validation is expressed via `validator` derive macros plus a few
//!   cross-field helpers

use chrono::NaiveDate;
use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::models::{CaptureTarget, DiaryId, StructuredContent};

// ============================================================================
// Auth
// ============================================================================

/// POST /auth/login
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(custom = "not_blank")]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// POST /auth/register
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom = "not_blank")]
    #[validate(length(max = 50, message = "Username must be under 50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "Password must be 1-128 characters"))]
    pub password: String,
}

// ============================================================================
// Diaries
// ============================================================================

/// POST /diaries
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiaryRequest {
    #[validate(custom = "not_blank")]
    #[validate(length(max = 200, message = "Title must be under 200 characters"))]
    pub title: String,

    #[validate(custom = "not_blank")]
    pub content: String,

    pub date: NaiveDate,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<StructuredContent>,

    pub is_analyzed: bool,
    pub is_complete: bool,
}

impl CreateDiaryRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            date,
            structured_content: None,
            is_analyzed: false,
            is_complete: false,
        }
    }

    /// Blank period sections are dropped rather than sent as empty strings.
    pub fn with_structured_content(mut self, content: StructuredContent) -> Self {
        self.structured_content = non_empty_sections(content);
        self
    }
}

/// PUT /diaries/{id}, partial update, all fields optional
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiaryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "not_blank")]
    #[validate(length(max = 200, message = "Title must be under 200 characters"))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom = "not_blank")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<StructuredContent>,
}

impl UpdateDiaryRequest {
    /// At least one field must change
    pub fn validate_not_empty(&self) -> Result<(), String> {
        if self.title.is_none()
            && self.content.is_none()
            && self.date.is_none()
            && self.structured_content.is_none()
        {
            return Err("Nothing to update".into());
        }
        Ok(())
    }
}

// ============================================================================
// Voice
// ============================================================================

/// POST /diaries/voice: form fields accompanying the audio part
#[derive(Debug, Clone, Validate)]
pub struct NewVoiceEntry {
    pub date: NaiveDate,

    #[validate(custom = "not_blank")]
    pub title: String,
}

impl NewVoiceEntry {
    /// Entry for `date` titled the way the diary list expects (`Diary: YYYY-MM-DD`).
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            title: format!("Diary: {}", date.format("%Y-%m-%d")),
        }
    }

    pub fn form_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// POST /diaries/voice/supplement: form fields accompanying the audio part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplementRequest {
    pub diary_id: DiaryId,
    pub target: CaptureTarget,
    pub question: Option<String>,
}

impl SupplementRequest {
    /// A question response must echo the question back; other targets never carry one.
    pub fn validate_question(&self) -> Result<(), String> {
        match (self.target, self.question.as_deref()) {
            (CaptureTarget::QuestionResponse, Some(q)) if !q.trim().is_empty() => Ok(()),
            (CaptureTarget::QuestionResponse, _) => {
                Err("A question response must include the question being answered".into())
            }
            (_, Some(_)) => Err(format!(
                "Only question responses carry a question, not {}",
                self.target
            )),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// Validation helpers
// ============================================================================

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn non_empty_sections(content: StructuredContent) -> Option<StructuredContent> {
    let keep = |s: Option<String>| s.filter(|t| !t.trim().is_empty());
    let content = StructuredContent {
        morning: keep(content.morning),
        afternoon: keep(content.afternoon),
        evening: keep(content.evening),
    };
    (!content.is_empty()).then_some(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Period;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn test_login_requires_username() {
        let req = LoginRequest {
            username: "   ".into(),
            password: "secret".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_register_rejects_bad_email() {
        let req = RegisterRequest {
            username: "mina".into(),
            email: "not-an-email".into(),
            password: "secret".into(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_create_diary_requires_title_and_content() {
        let req = CreateDiaryRequest::new("", "", day());
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("content"));
    }

    #[test]
    fn test_create_diary_serializes_camel_case() {
        let req = CreateDiaryRequest::new("Sunday", "Slow day", day()).with_structured_content(
            StructuredContent {
                morning: Some("Coffee".into()),
                afternoon: Some("".into()),
                evening: None,
            },
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["date"], "2026-03-02");
        assert_eq!(json["isAnalyzed"], false);
        assert_eq!(json["structuredContent"]["morning"], "Coffee");
        assert!(json["structuredContent"].get("afternoon").is_none());
    }

    #[test]
    fn test_all_blank_sections_are_omitted() {
        let req = CreateDiaryRequest::new("t", "c", day())
            .with_structured_content(StructuredContent::default());
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("structuredContent").is_none());
    }

    #[test]
    fn test_update_skips_absent_fields() {
        let req = UpdateDiaryRequest {
            title: Some("New title".into()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
        assert!(req.validate_not_empty().is_ok());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "New title" }));
    }

    #[test]
    fn test_empty_update_rejected() {
        assert!(UpdateDiaryRequest::default().validate_not_empty().is_err());
    }

    #[test]
    fn test_new_voice_entry_title() {
        let entry = NewVoiceEntry::for_date(day());
        assert_eq!(entry.title, "Diary: 2026-03-02");
        assert_eq!(entry.form_date(), "2026-03-02");
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_question_response_must_carry_question() {
        let mut req = SupplementRequest {
            diary_id: DiaryId(4),
            target: CaptureTarget::QuestionResponse,
            question: None,
        };
        assert!(req.validate_question().is_err());
        req.question = Some("What made today meaningful?".into());
        assert!(req.validate_question().is_ok());
    }

    #[test]
    fn test_period_supplement_carries_no_question() {
        let req = SupplementRequest {
            diary_id: DiaryId(4),
            target: CaptureTarget::Period(Period::Evening),
            question: Some("stale".into()),
        };
        assert!(req.validate_question().is_err());
    }
}
