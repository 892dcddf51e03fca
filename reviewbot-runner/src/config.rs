//! Runner configuration
//!
//! Defines the credentials, endpoints, intervals and timeouts of the
//! notifier. Everything is read once at startup and passed down explicitly.

use anyhow::Context;
use reviewbot_client::DEFAULT_REQUEST_TIMEOUT;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_REVIEW_API_URL: &str =
    "https://praktikum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Runner configuration
#[derive(Clone)]
pub struct Config {
    /// Full URL of the review-status endpoint
    pub review_api_url: String,

    /// OAuth token for the review API
    pub review_api_token: String,

    /// Bot API base URL
    pub telegram_api_url: String,

    /// Bot token
    pub telegram_token: String,

    /// Chat that receives every notification
    pub telegram_chat_id: String,

    /// Delay between successful poll cycles
    pub poll_interval: Duration,

    /// First delay after a failed cycle; doubles on consecutive failures
    pub error_backoff: Duration,

    /// Ceiling for the failure delay
    pub max_error_backoff: Duration,

    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,

    /// Optional file that receives a copy of the log output
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(
        review_api_token: String,
        telegram_token: String,
        telegram_chat_id: String,
    ) -> Self {
        Self {
            review_api_url: DEFAULT_REVIEW_API_URL.to_string(),
            review_api_token,
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            telegram_token,
            telegram_chat_id,
            poll_interval: Duration::from_secs(300), // 5 minutes
            error_backoff: Duration::from_secs(5),
            max_error_backoff: Duration::from_secs(300),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            log_file: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - PRAKTIKUM_TOKEN (required)
    /// - TELEGRAM_TOKEN (required)
    /// - TELEGRAM_CHAT_ID (required)
    /// - REVIEW_API_URL (optional)
    /// - TELEGRAM_API_URL (optional, default: https://api.telegram.org)
    /// - POLL_INTERVAL (optional, seconds, default: 300)
    /// - ERROR_BACKOFF (optional, seconds, default: 5)
    /// - MAX_ERROR_BACKOFF (optional, seconds, default: 300)
    /// - REQUEST_TIMEOUT (optional, seconds, default: 30)
    /// - LOG_FILE (optional)
    ///
    /// Variables missing from the process environment are also looked up in
    /// a `.env` file in the working directory, if there is one.
    pub fn from_env() -> anyhow::Result<Self> {
        let file_vars = read_env_file(Path::new(".env"))?;
        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_vars.get(key).cloned())
        })
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| anyhow::anyhow!("{} environment variable not set", key))
        };

        let mut config = Self::new(
            required("PRAKTIKUM_TOKEN")?,
            required("TELEGRAM_TOKEN")?,
            required("TELEGRAM_CHAT_ID")?,
        );

        if let Some(url) = lookup("REVIEW_API_URL") {
            config.review_api_url = url;
        }
        if let Some(url) = lookup("TELEGRAM_API_URL") {
            config.telegram_api_url = url;
        }

        let seconds = |key: &str, default: Duration| -> anyhow::Result<Duration> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("{} must be a whole number of seconds", key)),
                None => Ok(default),
            }
        };

        config.poll_interval = seconds("POLL_INTERVAL", config.poll_interval)?;
        config.error_backoff = seconds("ERROR_BACKOFF", config.error_backoff)?;
        config.max_error_backoff = seconds("MAX_ERROR_BACKOFF", config.max_error_backoff)?;
        config.request_timeout = seconds("REQUEST_TIMEOUT", config.request_timeout)?;
        config.log_file = lookup("LOG_FILE")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.review_api_token.is_empty() {
            anyhow::bail!("review_api_token cannot be empty");
        }

        if self.telegram_token.is_empty() {
            anyhow::bail!("telegram_token cannot be empty");
        }

        if self.telegram_chat_id.is_empty() {
            anyhow::bail!("telegram_chat_id cannot be empty");
        }

        for (name, url) in [
            ("review_api_url", &self.review_api_url),
            ("telegram_api_url", &self.telegram_api_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.error_backoff.is_zero() {
            anyhow::bail!("error_backoff must be greater than 0");
        }

        if self.max_error_backoff < self.error_backoff {
            anyhow::bail!("max_error_backoff must not be less than error_backoff");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

/// Reads `KEY=value` pairs from a dotenv file; a missing file is empty
fn read_env_file(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => return Ok(HashMap::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    entries
        .collect::<Result<HashMap<_, _>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

// Tokens stay out of the logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("review_api_url", &self.review_api_url)
            .field("review_api_token", &"<redacted>")
            .field("telegram_api_url", &self.telegram_api_url)
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("poll_interval", &self.poll_interval)
            .field("error_backoff", &self.error_backoff)
            .field("max_error_backoff", &self.max_error_backoff)
            .field("request_timeout", &self.request_timeout)
            .field("log_file", &self.log_file)
            .finish()
    }
}
