use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::read_claims;
use crate::error::{ClientError, ClientResult};
use crate::models::User;

/// What survives between runs: the bearer credential and who it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
    user: User,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    saved_at: DateTime<Utc>,
}

/// Lifecycle-scoped holder of the signed-in user and their credential.
///
/// `init` loads whatever a previous run left on disk, `login` and `logout`
/// keep the file in step, and `teardown` releases the store without touching
/// the file.
#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    current: Option<StoredSession>,
}

impl SessionStore {
    /// Load the session persisted at `path`.
    ///
    /// A missing file means nobody is signed in. A corrupt file or an expired
    /// credential is cleared so the next run starts from a clean login.
    pub fn init(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        let mut store = Self {
            path: Some(path.clone()),
            current: None,
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(store),
            Err(e) => {
                return Err(ClientError::Session(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) if stored.is_expired_at(Utc::now()) => {
                tracing::info!(user = %stored.user.username, "Stored session expired, clearing");
                store.clear_file()?;
            }
            Ok(stored) => {
                tracing::debug!(user = %stored.user.username, "Session restored");
                store.current = Some(stored);
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Discarding unreadable session file");
                store.clear_file()?;
            }
        }

        Ok(store)
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: None,
        }
    }

    pub fn login(&mut self, access_token: &str, user: User) -> ClientResult<()> {
        if access_token.trim().is_empty() {
            return Err(ClientError::Session("Empty access token".into()));
        }

        let expires_at = read_claims(access_token)
            .ok()
            .and_then(|claims| claims.expires_at());

        let stored = StoredSession {
            access_token: access_token.to_string(),
            user,
            expires_at,
            saved_at: Utc::now(),
        };
        self.persist(&stored)?;
        tracing::info!(user = %stored.user.username, "Signed in");
        self.current = Some(stored);
        Ok(())
    }

    pub fn logout(&mut self) -> ClientResult<()> {
        if let Some(stored) = self.current.take() {
            tracing::info!(user = %stored.user.username, "Signed out");
        }
        self.clear_file()
    }

    /// Release the in-memory session, leaving the persisted copy for the next run.
    pub fn teardown(self) {
        tracing::debug!(signed_in = self.current.is_some(), "Session store released");
    }

    pub fn current_user(&self) -> Option<&User> {
        self.live().map(|s| &s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.live().is_some()
    }

    /// The credential to attach to authenticated calls, if still valid.
    pub fn bearer(&self) -> Option<&str> {
        self.live().map(|s| s.access_token.as_str())
    }

    /// Like [`current_user`](Self::current_user) but answers a missing or
    /// lapsed session with the redirect-to-login error.
    pub fn require_user(&self) -> ClientResult<&User> {
        self.current_user().ok_or(ClientError::Unauthorized)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn live(&self) -> Option<&StoredSession> {
        self.current
            .as_ref()
            .filter(|s| !s.is_expired_at(Utc::now()))
    }

    fn persist(&self, stored: &StoredSession) -> ClientResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ClientError::Session(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(stored)
            .map_err(|e| ClientError::Session(format!("Failed to encode session: {}", e)))?;

        // Write-then-rename so a crash never leaves half a credential behind.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| ClientError::Session(format!("Failed to write {}: {}", tmp.display(), e)))?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, path)
            .map_err(|e| ClientError::Session(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(())
    }

    fn clear_file(&self) -> ClientResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Session(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

impl StoredSession {
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> ClientResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| ClientError::Session(format!("Failed to protect {}: {}", path.display(), e)))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> ClientResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::tests::token_with;
    use chrono::Duration;
    use serde_json::json;

    fn user() -> User {
        User {
            id: 7,
            username: "mina".into(),
            email: "mina@example.com".into(),
        }
    }

    #[test]
    fn test_login_persists_across_init() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let token = token_with(json!({ "sub": 7, "exp": (Utc::now() + Duration::hours(1)).timestamp() }));

        let mut store = SessionStore::init(&path).unwrap();
        assert!(!store.is_authenticated());
        store.login(&token, user()).unwrap();
        assert_eq!(store.bearer(), Some(token.as_str()));
        store.teardown();

        let restored = SessionStore::init(&path).unwrap();
        assert_eq!(restored.current_user(), Some(&user()));
        assert_eq!(restored.bearer(), Some(token.as_str()));
        assert_eq!(restored.require_user().unwrap().id, user().id);
    }

    #[test]
    fn test_logout_clears_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut store = SessionStore::init(&path).unwrap();
        store.login(&token_with(json!({ "sub": 7 })), user()).unwrap();
        assert!(path.exists());

        store.logout().unwrap();
        assert!(!path.exists());
        assert!(store.current_user().is_none());
        assert!(store.require_user().unwrap_err().requires_login());
    }

    #[test]
    fn test_expired_session_dropped_on_init() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let token = token_with(json!({ "sub": 7, "exp": (Utc::now() - Duration::hours(1)).timestamp() }));

        let mut store = SessionStore::init(&path).unwrap();
        store.login(&token, user()).unwrap();
        assert!(!store.is_authenticated());

        let restored = SessionStore::init(&path).unwrap();
        assert!(!restored.is_authenticated());
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SessionStore::init(&path).unwrap();
        assert!(!store.is_authenticated());
        assert!(!path.exists());
    }

    #[test]
    fn test_opaque_token_accepted() {
        let mut store = SessionStore::in_memory();
        store.login("opaque-session-token", user()).unwrap();
        assert!(store.is_authenticated());
        assert!(store.path().is_none());
    }

    #[test]
    fn test_empty_token_rejected() {
        let mut store = SessionStore::in_memory();
        assert!(store.login("  ", user()).is_err());
    }
}
