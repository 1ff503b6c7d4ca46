//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_AUTH_URL: &str = "https://functions.poehali.dev/48f80eee-773f-4390-9a6e-c3524d053b3d";
pub const DEFAULT_CHAT_URL: &str = "https://functions.poehali.dev/a9200a7a-4ac5-47b0-b48a-aa315785eb3c";
pub const DEFAULT_LIKES_URL: &str = "https://functions.poehali.dev/de9b8f4e-33f8-4022-b463-c072c20d423d";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Base URLs of the hosted functions.
///
/// News and contacts have no public deployment to default to; those
/// commands fail with [`crate::net::types::ApiError::Unconfigured`] until set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub auth: String,
    pub chat: String,
    pub likes: String,
    pub news: Option<String>,
    pub contacts: Option<String>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth: DEFAULT_AUTH_URL.to_owned(),
            chat: DEFAULT_CHAT_URL.to_owned(),
            likes: DEFAULT_LIKES_URL.to_owned(),
            news: None,
            contacts: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    pub poll_interval: Duration,
    pub state_path: PathBuf,
    pub senior_admin_code: Option<String>,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// All optional:
    /// - `CLASS5U_AUTH_URL`, `CLASS5U_CHAT_URL`, `CLASS5U_LIKES_URL`: endpoint overrides
    /// - `CLASS5U_NEWS_URL`, `CLASS5U_CONTACTS_URL`: content endpoints, no default
    /// - `CLASS5U_POLL_INTERVAL_MS`: default 3000, must be non-zero
    /// - `CLASS5U_STATE_PATH`: default `$HOME/.class5u/session.json`
    /// - `CLASS5U_SENIOR_ADMIN_CODE`: senior admin grants are refused when unset
    /// - `CLASS5U_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CLASS5U_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a numeric variable does not parse
    /// or the poll interval is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable lookup.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_owned())
                .trim_end_matches('/')
                .to_owned()
        };

        let endpoints = Endpoints {
            auth: url("CLASS5U_AUTH_URL", DEFAULT_AUTH_URL),
            chat: url("CLASS5U_CHAT_URL", DEFAULT_CHAT_URL),
            likes: url("CLASS5U_LIKES_URL", DEFAULT_LIKES_URL),
            news: optional_url(&lookup, "CLASS5U_NEWS_URL"),
            contacts: optional_url(&lookup, "CLASS5U_CONTACTS_URL"),
        };

        let poll_ms = parse_u64(&lookup, "CLASS5U_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        if poll_ms == 0 {
            return Err(ConfigError::Invalid {
                var: "CLASS5U_POLL_INTERVAL_MS",
                message: "must be greater than zero".to_owned(),
            });
        }

        let state_path = match lookup("CLASS5U_STATE_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_state_path(lookup("HOME")),
        };

        let senior_admin_code = lookup("CLASS5U_SENIOR_ADMIN_CODE").filter(|code| !code.is_empty());

        let timeouts = Timeouts {
            request_secs: parse_u64(&lookup, "CLASS5U_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_u64(&lookup, "CLASS5U_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self {
            endpoints,
            poll_interval: Duration::from_millis(poll_ms),
            state_path,
            senior_admin_code,
            timeouts,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            state_path: default_state_path(None),
            senior_admin_code: None,
            timeouts: Timeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

fn optional_url<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| value.trim().trim_end_matches('/').to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_u64<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::Invalid { var, message: e.to_string() }),
    }
}

fn default_state_path(home: Option<String>) -> PathBuf {
    let base = home.map_or_else(|| PathBuf::from("."), PathBuf::from);
    base.join(".class5u").join("session.json")
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
