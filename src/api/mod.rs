//! The remote RecorD API as the rest of the crate sees it.
//!
//! [`DiaryService`] is the seam: the voice session and the command handlers
//! only ever talk to the trait, [`HttpDiaryClient`] is the production
//! implementation.

pub mod client;

use async_trait::async_trait;

use crate::dto::{
    CreateDiaryRequest, LoginRequest, NewVoiceEntry, RegisterRequest, SupplementRequest,
    UpdateDiaryRequest,
};
use crate::error::ClientResult;
use crate::models::{
    AuthToken, CompletionStatus, DiaryEntry, DiaryId, SentimentAnalysis, VoiceSubmissionResponse,
};
use crate::voice::recorder::AudioBlob;

pub use client::HttpDiaryClient;

/// Every remote operation the client depends on. Implementations perform no
/// retries; a failure is returned as-is and the caller decides what to do.
#[async_trait]
pub trait DiaryService: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> ClientResult<AuthToken>;

    async fn register(&self, req: &RegisterRequest) -> ClientResult<AuthToken>;

    async fn list_diaries(&self) -> ClientResult<Vec<DiaryEntry>>;

    async fn get_diary(&self, id: DiaryId) -> ClientResult<DiaryEntry>;

    async fn create_diary(&self, req: &CreateDiaryRequest) -> ClientResult<DiaryEntry>;

    async fn update_diary(&self, id: DiaryId, req: &UpdateDiaryRequest) -> ClientResult<DiaryEntry>;

    async fn delete_diary(&self, id: DiaryId) -> ClientResult<bool>;

    async fn request_analysis(&self, id: DiaryId) -> ClientResult<SentimentAnalysis>;

    /// Create a new entry from a recording.
    async fn submit_voice(
        &self,
        audio: &AudioBlob,
        entry: &NewVoiceEntry,
    ) -> ClientResult<VoiceSubmissionResponse>;

    /// Add a recording to an existing entry, tagged with a period, `general`,
    /// or `question_response`.
    async fn supplement_voice(
        &self,
        audio: &AudioBlob,
        req: &SupplementRequest,
    ) -> ClientResult<VoiceSubmissionResponse>;

    async fn get_completion_status(&self, id: DiaryId) -> ClientResult<CompletionStatus>;
}
