use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::{ClientError, ClientResult};
use crate::models::User;

/// Claims the RecorD backend puts in its access tokens. Every field is
/// optional because the client only reads what happens to be there.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<serde_json::Value>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }

    /// Numeric user id from `sub`, whether the server encoded it as a number or a string.
    pub fn user_id(&self) -> Option<i64> {
        match self.sub.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// The signed-in user as far as the token describes them, filling gaps
    /// from what was typed into the login form.
    pub fn to_user(&self, fallback_username: &str) -> User {
        User {
            id: self.user_id().unwrap_or_default(),
            username: self
                .username
                .clone()
                .unwrap_or_else(|| fallback_username.to_string()),
            email: self.email.clone().unwrap_or_default(),
        }
    }
}

/// Decode the payload of a bearer token without checking its signature.
///
/// The server is the only party that verifies tokens; the client reads the
/// claims to learn who is signed in and when the session lapses.
pub fn read_claims(token: &str) -> ClientResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| ClientError::Session(format!("Unreadable access token: {}", e)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    pub(crate) fn token_with(claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_read_claims_without_secret() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = token_with(json!({ "sub": 7, "username": "mina", "exp": exp }));
        let claims = read_claims(&token).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.username.as_deref(), Some("mina"));
        assert!(!claims.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_expired_token_detected() {
        let exp = (Utc::now() - Duration::minutes(5)).timestamp();
        let token = token_with(json!({ "sub": "7", "exp": exp }));
        let claims = read_claims(&token).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert!(claims.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_token_without_exp_never_expires() {
        let token = token_with(json!({ "username": "mina" }));
        let claims = read_claims(&token).unwrap();
        assert!(!claims.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(read_claims("not-a-token").is_err());
    }

    #[test]
    fn test_to_user_falls_back_to_login_name() {
        let user = Claims::default().to_user("mina");
        assert_eq!(user.username, "mina");
        assert_eq!(user.id, 0);
    }
}
