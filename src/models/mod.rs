pub mod analysis;
pub mod completion;
pub mod diary;
pub mod user;

pub use analysis::{Feelings, PeriodSummary, SentimentAnalysis};
pub use completion::{
    CaptureTarget, CompletionStatus, ConversationMessage, ConversationPhase, Role,
    VoiceSubmissionResponse,
};
pub use diary::{DiaryEntry, DiaryId, Period, StructuredContent};
pub use user::{AuthToken, User};
