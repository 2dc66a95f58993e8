use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

const DEFAULT_API_URL: &str = "http://localhost:3001";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
    pub http_timeout_secs: u64,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> ClientResult<Self> {
        let api_url = env::var("RECORD_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());

        let session_file = match env::var("RECORD_SESSION_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_session_file()?,
        };

        let http_timeout_secs = env::var("RECORD_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .map_err(|_| {
                ClientError::Config("RECORD_HTTP_TIMEOUT_SECS must be a number".into())
            })?;

        let log_format = match env::var("RECORD_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            session_file,
            http_timeout_secs,
            log_format,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn default_session_file() -> ClientResult<PathBuf> {
    let base = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| ClientError::Config("Could not determine a config directory".into()))?;
    Ok(base.join("record").join("session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_url: &str) -> Config {
        Config {
            api_url: api_url.into(),
            session_file: PathBuf::from("session.json"),
            http_timeout_secs: 30,
            log_format: LogFormat::Pretty,
        }
    }

    #[test]
    fn test_http_timeout() {
        assert_eq!(config("x").http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_default_session_file_location() {
        if let Ok(path) = default_session_file() {
            assert!(path.ends_with("record/session.json"));
        }
    }
}
