use restore_core::ui::timing;

/// In-page client configuration.
///
/// The dashboard template can override any field with a `data-*`
/// attribute on `<body>`; everything else keeps the stock timings.
#[derive(Debug, Clone, PartialEq)]
pub struct WebConfig {
    /// Toolkit base URL without trailing slash. Empty means the page's
    /// own origin.
    pub base_url: String,
    pub poll_interval_ms: u32,
    /// `None` waits indefinitely.
    pub request_timeout_ms: Option<u32>,
    pub refresh_delay_ms: u32,
    pub form_restore_delay_ms: u32,
    pub notification_ttl_ms: u32,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            poll_interval_ms: timing::POLL_INTERVAL_MS,
            request_timeout_ms: Some(timing::REQUEST_TIMEOUT_MS),
            refresh_delay_ms: timing::REFRESH_DELAY_MS,
            form_restore_delay_ms: timing::FORM_RESTORE_DELAY_MS,
            notification_ttl_ms: timing::NOTIFICATION_TTL_MS,
        }
    }
}

/// A configuration attribute held a value that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{attr} must be {expected}, got {value:?}")]
    Invalid {
        attr: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl WebConfig {
    /// Build a configuration from `data-*` attributes.
    ///
    /// | Attribute                    | Default        |
    /// |------------------------------|----------------|
    /// | `data-toolkit-url`           | page origin    |
    /// | `data-poll-interval-ms`      | `30000`        |
    /// | `data-request-timeout-ms`    | `30000` (`0` disables) |
    /// | `data-refresh-delay-ms`      | `1000`         |
    /// | `data-form-restore-delay-ms` | `3000`         |
    /// | `data-notification-ttl-ms`   | `5000`         |
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("data-toolkit-url")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let poll_interval_ms = match parse_ms(&lookup, "data-poll-interval-ms")? {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    attr: "data-poll-interval-ms",
                    expected: "a positive integer",
                    value: "0".into(),
                })
            }
            Some(ms) => ms,
            None => defaults.poll_interval_ms,
        };

        let request_timeout_ms = match parse_ms(&lookup, "data-request-timeout-ms")? {
            Some(0) => None,
            Some(ms) => Some(ms),
            None => defaults.request_timeout_ms,
        };

        Ok(Self {
            base_url,
            poll_interval_ms,
            request_timeout_ms,
            refresh_delay_ms: parse_ms(&lookup, "data-refresh-delay-ms")?
                .unwrap_or(defaults.refresh_delay_ms),
            form_restore_delay_ms: parse_ms(&lookup, "data-form-restore-delay-ms")?
                .unwrap_or(defaults.form_restore_delay_ms),
            notification_ttl_ms: parse_ms(&lookup, "data-notification-ttl-ms")?
                .unwrap_or(defaults.notification_ttl_ms),
        })
    }

    /// Read the configuration from an element's attributes, usually
    /// `<body>`.
    #[cfg(target_arch = "wasm32")]
    pub fn from_element(element: Option<&web_sys::Element>) -> Result<Self, ConfigError> {
        Self::from_lookup(|attr| element.and_then(|el| el.get_attribute(attr)))
    }
}

fn parse_ms<F>(lookup: &F, attr: &'static str) -> Result<Option<u32>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(attr) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                attr,
                expected: "a non-negative number of milliseconds",
                value: raw,
            }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |attr: &str| map.get(attr).cloned()
    }

    #[test]
    fn no_attributes_use_stock_timings() {
        let config = WebConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, WebConfig::default());
        assert_eq!(config.base_url, "");
        assert_eq!(config.poll_interval_ms, 30_000);
        assert_eq!(config.request_timeout_ms, Some(30_000));
        assert_eq!(config.refresh_delay_ms, 1_000);
        assert_eq!(config.form_restore_delay_ms, 3_000);
        assert_eq!(config.notification_ttl_ms, 5_000);
    }

    #[test]
    fn attributes_override_defaults() {
        let config = WebConfig::from_lookup(lookup(&[
            ("data-toolkit-url", "http://nas.local:5000/"),
            ("data-poll-interval-ms", "10000"),
            ("data-request-timeout-ms", "0"),
            ("data-notification-ttl-ms", " 2500 "),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://nas.local:5000");
        assert_eq!(config.poll_interval_ms, 10_000);
        assert_eq!(config.request_timeout_ms, None);
        assert_eq!(config.notification_ttl_ms, 2_500);
        assert_eq!(config.refresh_delay_ms, 1_000);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let err = WebConfig::from_lookup(lookup(&[("data-poll-interval-ms", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { attr: "data-poll-interval-ms", .. }
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = WebConfig::from_lookup(lookup(&[("data-refresh-delay-ms", "soon")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "data-refresh-delay-ms must be a non-negative number of milliseconds, got \"soon\""
        );
    }
}
