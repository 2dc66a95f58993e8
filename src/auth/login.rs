use crate::api::DiaryService;
use crate::auth::jwt::read_claims;
use crate::auth::session::SessionStore;
use crate::dto::{LoginRequest, RegisterRequest};
use crate::error::{ClientError, ClientResult};
use crate::models::{AuthToken, User};

const LOGIN_FAILED: &str = "Authentication failed. Please check your credentials.";

/// Exchange credentials for a token and remember who signed in.
pub async fn sign_in<S: DiaryService + ?Sized>(
    service: &S,
    session: &mut SessionStore,
    req: &LoginRequest,
) -> ClientResult<User> {
    let token = service.login(req).await?;
    let credential = token
        .credential()
        .ok_or_else(|| ClientError::Rejected(rejection_message(&token, LOGIN_FAILED)))?;

    let user = user_from_token(credential, &req.username);
    session.login(credential, user.clone())?;
    Ok(user)
}

/// Create an account. Some backends sign the new user straight in; others
/// answer without a token and the user logs in afterwards, giving `None`.
pub async fn sign_up<S: DiaryService + ?Sized>(
    service: &S,
    session: &mut SessionStore,
    req: &RegisterRequest,
) -> ClientResult<Option<User>> {
    let token = service.register(req).await?;
    if token.success == Some(false) {
        return Err(ClientError::Rejected(rejection_message(
            &token,
            "Registration failed. Please try again.",
        )));
    }

    let Some(credential) = token.credential() else {
        tracing::info!(username = %req.username, "Registered without a session, login required");
        return Ok(None);
    };

    let mut user = user_from_token(credential, &req.username);
    if user.email.is_empty() {
        user.email = req.email.clone();
    }
    session.login(credential, user.clone())?;
    Ok(Some(user))
}

fn user_from_token(credential: &str, username: &str) -> User {
    match read_claims(credential) {
        Ok(claims) => claims.to_user(username),
        Err(e) => {
            tracing::warn!(error = %e, "Token claims unreadable, using submitted username");
            User {
                id: 0,
                username: username.to_string(),
                email: String::new(),
            }
        }
    }
}

fn rejection_message(token: &AuthToken, fallback: &str) -> String {
    token
        .message
        .clone()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
