//! Runtime configuration read from environment variables.
//!
//! # Responsibility
//! - Resolve REST API location, credentials and timeout.
//! - Resolve logging level/directory for executables.
//!
//! # Invariants
//! - Missing token means "no remote API configured", not an error.
//! - Malformed values are rejected instead of silently defaulted.

use reqwest::Url;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const ENV_API_URL: &str = "PLACES_API_URL";
pub const ENV_API_GROUP: &str = "PLACES_API_GROUP";
pub const ENV_API_TOKEN: &str = "PLACES_API_TOKEN";
pub const ENV_API_TIMEOUT_SECS: &str = "PLACES_API_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "PLACES_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PLACES_LOG_DIR";

pub const DEFAULT_API_URL: &str = "https://nomoreparties.co/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration error with the offending variable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required setting `{key}`"),
            Self::Invalid { key, message } => write!(f, "invalid setting `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Connection settings for the places REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// API root without the group segment.
    pub base_url: Url,
    /// Group (cohort) segment appended to `base_url`.
    pub group: String,
    /// Value sent verbatim in the `authorization` header.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Reads settings from process environment.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`.
    ///
    /// Returns `Ok(None)` when no token is set.
    ///
    /// # Errors
    /// - `Missing` when a token is set but the group is not.
    /// - `Invalid` for a malformed url or timeout.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        let Some(token) = non_blank(lookup(ENV_API_TOKEN)) else {
            return Ok(None);
        };
        let group = non_blank(lookup(ENV_API_GROUP)).ok_or(ConfigError::Missing(ENV_API_GROUP))?;

        let raw_url = non_blank(lookup(ENV_API_URL)).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = Url::parse(raw_url.trim_end_matches('/')).map_err(|err| {
            ConfigError::Invalid {
                key: ENV_API_URL,
                message: err.to_string(),
            }
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: ENV_API_URL,
                message: format!("unsupported scheme `{}`", base_url.scheme()),
            });
        }

        let timeout_secs = match non_blank(lookup(ENV_API_TIMEOUT_SECS)) {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: ENV_API_TIMEOUT_SECS,
                    message: format!("expected a positive integer, got `{value}`"),
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Some(Self {
            base_url,
            group,
            token,
            timeout: Duration::from_secs(timeout_secs),
        }))
    }
}

/// Logging settings for executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// `None` disables file logging.
    pub log_dir: Option<String>,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            level: non_blank(lookup(ENV_LOG_LEVEL))
                .unwrap_or_else(|| crate::logging::default_log_level().to_string()),
            log_dir: non_blank(lookup(ENV_LOG_DIR)),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
