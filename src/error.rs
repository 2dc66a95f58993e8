use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Capture target not offered: {0}")]
    InvalidTarget(String),

    #[error("Recorder error: {0}")]
    Recorder(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Failures the user can recover from by pressing "Submit" again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Server { .. }
                | ClientError::Rejected(_)
                | ClientError::MalformedResponse(_)
                | ClientError::Transport(_)
                | ClientError::NotFound(_)
        )
    }

    /// The routing layer answers these with a redirect to the login screen.
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }

    /// Map a non-success HTTP status and its body onto the error taxonomy.
    /// `Validation` is reserved for checks that fail before a request is sent,
    /// so a 400/422 from the server stays retryable.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized,
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            _ => ClientError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ClientError::Validation(errors.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::MalformedResponse(e.to_string())
    }
}

/// Error envelopes the backend is known to answer with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    Nested { error: ErrorBody },
    Flat(ErrorBody),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: MessageField,
}

// NestJS answers validation failures with an array of messages.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageField {
    One(String),
    Many(Vec<String>),
}

fn extract_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let body = match envelope {
        ErrorEnvelope::Nested { error } => error,
        ErrorEnvelope::Flat(body) => body,
    };
    let message = match body.message {
        MessageField::One(m) => m,
        MessageField::Many(ms) => ms.join("; "),
    };
    (!message.is_empty()).then_some(message)
}

pub type ClientResult<T> = Result<T, ClientError>;
