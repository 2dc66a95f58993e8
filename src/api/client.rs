use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::api::DiaryService;
use crate::auth::SessionStore;
use crate::config::Config;
use crate::dto::{
    CreateDiaryRequest, LoginRequest, NewVoiceEntry, RegisterRequest, SupplementRequest,
    UpdateDiaryRequest,
};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    AuthToken, CompletionStatus, DiaryEntry, DiaryId, SentimentAnalysis, VoiceSubmissionResponse,
};
use crate::voice::recorder::AudioBlob;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// `DiaryService` over the RecorD HTTP API.
#[derive(Debug, Clone)]
pub struct HttpDiaryClient {
    http: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl HttpDiaryClient {
    pub fn new(config: &Config) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .user_agent(concat!("record-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            bearer: None,
        })
    }

    /// Attach the credential held by `session`, if any.
    pub fn with_session(self, session: &SessionStore) -> Self {
        Self {
            bearer: session.bearer().map(str::to_string),
            ..self
        }
    }

    pub fn with_bearer(self, token: impl Into<String>) -> Self {
        Self {
            bearer: Some(token.into()),
            ..self
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> (Uuid, RequestBuilder) {
        let request_id = Uuid::new_v4();
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%request_id, %method, %url, "Sending request");
        let builder = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        (request_id, builder)
    }

    /// Same as `request`, but refuses to leave the process without a credential.
    fn authed(&self, method: Method, path: &str) -> ClientResult<(Uuid, RequestBuilder)> {
        let token = self.bearer.as_deref().ok_or(ClientError::Unauthorized)?;
        let (request_id, builder) = self.request(method, path);
        Ok((request_id, builder.bearer_auth(token)))
    }

    async fn send(request_id: Uuid, builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%request_id, error = %e, "Request failed before a response arrived");
            ClientError::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%request_id, status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_status(status, &body);
        tracing::warn!(%request_id, status = status.as_u16(), error = %err, "Request rejected by server");
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(request_id: Uuid, builder: RequestBuilder) -> ClientResult<T> {
        let response = Self::send(request_id, builder).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(%request_id, error = %e, "Response did not match the expected shape");
            ClientError::MalformedResponse(e.to_string())
        })
    }

    async fn send_voice(&self, path: &str, form: Form) -> ClientResult<VoiceSubmissionResponse> {
        let (request_id, builder) = self.authed(Method::POST, path)?;
        let response: VoiceSubmissionResponse =
            Self::send_json(request_id, builder.multipart(form)).await?;

        if !response.is_success() {
            let message = response
                .message
                .clone()
                .unwrap_or_else(|| "Voice submission was not accepted".to_string());
            tracing::warn!(%request_id, %message, "Voice submission rejected");
            return Err(ClientError::Rejected(message));
        }
        Ok(response)
    }
}

fn audio_part(audio: &AudioBlob) -> ClientResult<Part> {
    if audio.is_empty() {
        return Err(ClientError::Recorder("No audio recorded".into()));
    }
    Part::bytes(audio.bytes().to_vec())
        .file_name(audio.file_name())
        .mime_str(audio.mime())
        .map_err(|e| ClientError::Recorder(format!("Failed to build audio part: {}", e)))
}

#[async_trait]
impl DiaryService for HttpDiaryClient {
    async fn login(&self, req: &LoginRequest) -> ClientResult<AuthToken> {
        req.validate()?;
        let (request_id, builder) = self.request(Method::POST, "/auth/login");
        Self::send_json(request_id, builder.json(req)).await
    }

    async fn register(&self, req: &RegisterRequest) -> ClientResult<AuthToken> {
        req.validate()?;
        let (request_id, builder) = self.request(Method::POST, "/auth/register");
        Self::send_json(request_id, builder.json(req)).await
    }

    async fn list_diaries(&self) -> ClientResult<Vec<DiaryEntry>> {
        let (request_id, builder) = self.authed(Method::GET, "/diaries")?;
        Self::send_json(request_id, builder).await
    }

    async fn get_diary(&self, id: DiaryId) -> ClientResult<DiaryEntry> {
        let (request_id, builder) = self.authed(Method::GET, &format!("/diaries/{}", id))?;
        Self::send_json(request_id, builder).await
    }

    async fn create_diary(&self, req: &CreateDiaryRequest) -> ClientResult<DiaryEntry> {
        req.validate()?;
        let (request_id, builder) = self.authed(Method::POST, "/diaries")?;
        Self::send_json(request_id, builder.json(req)).await
    }

    async fn update_diary(&self, id: DiaryId, req: &UpdateDiaryRequest) -> ClientResult<DiaryEntry> {
        req.validate()?;
        req.validate_not_empty().map_err(ClientError::Validation)?;
        let (request_id, builder) = self.authed(Method::PUT, &format!("/diaries/{}", id))?;
        Self::send_json(request_id, builder.json(req)).await
    }

    async fn delete_diary(&self, id: DiaryId) -> ClientResult<bool> {
        let (request_id, builder) = self.authed(Method::DELETE, &format!("/diaries/{}", id))?;
        Self::send(request_id, builder).await?;
        Ok(true)
    }

    async fn request_analysis(&self, id: DiaryId) -> ClientResult<SentimentAnalysis> {
        let (request_id, builder) =
            self.authed(Method::GET, &format!("/diaries/{}/analysis", id))?;
        Self::send_json(request_id, builder).await
    }

    async fn submit_voice(
        &self,
        audio: &AudioBlob,
        entry: &NewVoiceEntry,
    ) -> ClientResult<VoiceSubmissionResponse> {
        entry.validate()?;
        let form = Form::new()
            .part("audio", audio_part(audio)?)
            .text("date", entry.form_date())
            .text("title", entry.title.clone());
        self.send_voice("/diaries/voice", form).await
    }

    async fn supplement_voice(
        &self,
        audio: &AudioBlob,
        req: &SupplementRequest,
    ) -> ClientResult<VoiceSubmissionResponse> {
        req.validate_question().map_err(ClientError::Validation)?;
        let mut form = Form::new()
            .part("audio", audio_part(audio)?)
            .text("diaryId", req.diary_id.to_string())
            .text("supplementType", req.target.as_str().to_string());
        if let Some(question) = &req.question {
            form = form.text("question", question.clone());
        }
        self.send_voice("/diaries/voice/supplement", form).await
    }

    async fn get_completion_status(&self, id: DiaryId) -> ClientResult<CompletionStatus> {
        let (request_id, builder) =
            self.authed(Method::GET, &format!("/diaries/{}/completion-status", id))?;
        Self::send_json(request_id, builder).await
    }
}
