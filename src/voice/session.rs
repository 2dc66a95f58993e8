use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::api::DiaryService;
use crate::dto::NewVoiceEntry;
use crate::error::{ClientError, ClientResult};
use crate::models::{CaptureTarget, DiaryId};
use crate::voice::recorder::AudioBlob;
use crate::voice::tracker::{CaptureRequest, CompletionTracker, TrackerState};

/// What a successful submission produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub diary_id: DiaryId,
    pub message: Option<String>,
    pub state: TrackerState,
}

/// One voice-diary screen: a tracker plus the service it submits to.
///
/// `submit` takes `&mut self`, so a second submission cannot start while one
/// is in flight.
pub struct VoiceSession<S: DiaryService> {
    service: S,
    tracker: CompletionTracker,
    entry_date: Option<NaiveDate>,
}

impl<S: DiaryService> VoiceSession<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            tracker: CompletionTracker::new(),
            entry_date: None,
        }
    }

    /// Open the screen on an existing diary and load its completion state.
    pub async fn resume(service: S, diary_id: DiaryId) -> ClientResult<Self> {
        let mut session = Self::new(service);
        session.refresh_for(diary_id).await?;
        Ok(session)
    }

    /// Date used when the first recording creates the entry. Defaults to today.
    pub fn with_entry_date(mut self, date: NaiveDate) -> Self {
        self.entry_date = Some(date);
        self
    }

    pub fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn select(&mut self, target: CaptureTarget) -> ClientResult<()> {
        self.tracker.select(target)
    }

    /// Re-fetch the status of the current diary.
    pub async fn refresh(&mut self) -> ClientResult<&CompletionTracker> {
        match self.tracker.diary_id() {
            Some(diary_id) => {
                self.refresh_for(diary_id).await?;
                Ok(&self.tracker)
            }
            None => Ok(&self.tracker),
        }
    }

    /// Send `audio` as whatever the tracker currently asks for, then adopt the
    /// server's new completion status.
    ///
    /// On any failure the tracker is left exactly as it was, so the same clip
    /// can be submitted again.
    pub async fn submit(&mut self, audio: &AudioBlob) -> ClientResult<SubmitOutcome> {
        if audio.is_empty() {
            return Err(ClientError::Recorder("No audio recorded".into()));
        }
        let request = self.tracker.capture_request().ok_or_else(|| {
            ClientError::InvalidTarget("This diary is already complete".into())
        })?;

        let submission_id = Uuid::new_v4();
        let response = match &request {
            CaptureRequest::NewEntry => {
                let date = self.entry_date.unwrap_or_else(|| Local::now().date_naive());
                tracing::info!(%submission_id, %date, "Submitting new voice diary");
                self.service
                    .submit_voice(audio, &NewVoiceEntry::for_date(date))
                    .await?
            }
            CaptureRequest::Supplement(req) => {
                tracing::info!(
                    %submission_id,
                    diary_id = %req.diary_id,
                    target = %req.target,
                    "Submitting voice supplement"
                );
                self.service.supplement_voice(audio, req).await?
            }
        };

        if !response.is_success() {
            let message = response
                .message
                .unwrap_or_else(|| "Voice submission was not accepted".to_string());
            return Err(ClientError::Rejected(message));
        }

        let diary_id = response
            .diary_id
            .or_else(|| self.tracker.diary_id())
            .ok_or_else(|| {
                ClientError::MalformedResponse("submission response carried no diaryId".into())
            })?;

        let status = self.service.get_completion_status(diary_id).await?;
        self.tracker.apply(diary_id, &status);

        tracing::info!(
            %submission_id,
            %diary_id,
            reported_phase = ?response.conversation_phase,
            state = self.tracker.state().name(),
            "Voice submission processed"
        );

        Ok(SubmitOutcome {
            diary_id,
            message: response.message,
            state: self.tracker.state().clone(),
        })
    }

    async fn refresh_for(&mut self, diary_id: DiaryId) -> ClientResult<()> {
        let status = self.service.get_completion_status(diary_id).await?;
        self.tracker.apply(diary_id, &status);
        Ok(())
    }
}
