use std::time::Duration;

use restore_core::ui::timing;

/// Default toolkit web interface address (the Flask app's dev default).
const DEFAULT_TOOLKIT_URL: &str = "http://localhost:5000";

/// Status watcher configuration loaded from environment variables.
///
/// All fields default to the dashboard's stock timings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the toolkit web interface, without trailing slash.
    pub base_url: String,
    /// Period between status polls (default: 30 s).
    pub poll_interval: Duration,
    /// Per-request timeout for API calls; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_TOOLKIT_URL.to_string(),
            poll_interval: Duration::from_millis(u64::from(timing::POLL_INTERVAL_MS)),
            request_timeout: Some(Duration::from_millis(u64::from(timing::REQUEST_TIMEOUT_MS))),
        }
    }
}

/// A configuration variable held a value that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `TOOLKIT_URL`           | `http://localhost:5000` |
    /// | `POLL_INTERVAL_SECS`    | `30`                    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30` (`0` disables)     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("TOOLKIT_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);

        let poll_secs = parse_u64(&lookup, "POLL_INTERVAL_SECS")?;
        if poll_secs == Some(0) {
            return Err(ConfigError::Invalid {
                var: "POLL_INTERVAL_SECS",
                expected: "a positive integer",
                value: "0".into(),
            });
        }
        let poll_interval = poll_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);

        let request_timeout = match parse_u64(&lookup, "REQUEST_TIMEOUT_SECS")? {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.request_timeout,
        };

        Ok(Self {
            base_url,
            poll_interval,
            request_timeout,
        })
    }
}

fn parse_u64<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                var,
                expected: "a non-negative integer",
                value: raw,
            }),
    }
}
