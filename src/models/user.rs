use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Body of `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthToken {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl AuthToken {
    /// The bearer credential, if the server actually issued one.
    pub fn credential(&self) -> Option<&str> {
        if self.success == Some(false) {
            return None;
        }
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}
