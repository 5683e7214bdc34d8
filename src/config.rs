//! Configuration management for the newsletter agent.
//!
//! Configuration can be set via environment variables:
//! - `LYZR_API_KEY` - Required. API key for the Lyzr agent platform.
//! - `OPENAI_API_KEY` - Required. Model-provider key forwarded to the platform.
//! - `LYZR_BASE_URL` - Optional. Platform API root. Defaults to `https://agent.api.lyzr.app/v2`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8501`.
//! - `NEWSLETTER_USER_ID` - Optional. Caller id sent with every message. Defaults to `default_user`.
//! - `REQUEST_TIMEOUT_SECS` - Optional. Timeout for each platform call. Defaults to `300`.
//! - `SESSION_IDLE_TIMEOUT_SECS` - Optional. Idle sessions are dropped after this long. Defaults to `3600`.
//!
//! Before reading these, `main` loads a `.env` file (path from
//! `NEWSLETTER_DOTENV_PATH`, default `.env`) if one exists.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://agent.api.lyzr.app/v2";
pub const DEFAULT_USER_ID: &str = "default_user";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    /// Lyzr platform API key
    pub lyzr_api_key: String,

    /// Model-provider (OpenAI) key handed to the platform on environment creation
    pub llm_api_key: String,

    /// Platform API root, without trailing slash
    pub base_url: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Caller identifier attached to every message
    pub user_id: String,

    /// Upper bound on a single platform call
    pub request_timeout: Duration,

    /// Sessions untouched for this long are dropped from memory
    pub session_idle_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("lyzr_api_key", &"<redacted>")
            .field("llm_api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user_id", &self.user_id)
            .field("request_timeout", &self.request_timeout)
            .field("session_idle_timeout", &self.session_idle_timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `LYZR_API_KEY` or `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let lyzr_api_key = required("LYZR_API_KEY")?;
        let llm_api_key = required("OPENAI_API_KEY")?;

        let base_url = lookup("LYZR_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "8501".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let user_id = lookup("NEWSLETTER_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        let request_timeout = parse_secs(&lookup, "REQUEST_TIMEOUT_SECS", 300)?;
        let session_idle_timeout = parse_secs(&lookup, "SESSION_IDLE_TIMEOUT_SECS", 3600)?;

        Ok(Self {
            lyzr_api_key,
            llm_api_key,
            base_url,
            host,
            port,
            user_id,
            request_timeout,
            session_idle_timeout,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(lyzr_api_key: String, llm_api_key: String, base_url: String) -> Self {
        Self {
            lyzr_api_key,
            llm_api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            host: "127.0.0.1".to_string(),
            port: 8501,
            user_id: DEFAULT_USER_ID.to_string(),
            request_timeout: Duration::from_secs(300),
            session_idle_timeout: Duration::from_secs(3600),
        }
    }
}

fn parse_secs<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = match lookup(key) {
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{}", e)))?,
        None => default,
    };
    if secs == 0 {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Load a `.env` file into the process environment.
///
/// Returns the path that was loaded, or `None` when there is no such file.
/// Variables already set in the process environment win over the file.
///
/// # Errors
///
/// Returns the `dotenvy` error if the file exists but cannot be read or parsed.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    let path = std::env::var("NEWSLETTER_DOTENV_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".env"));
    match dotenvy::from_path(&path) {
        Ok(()) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
