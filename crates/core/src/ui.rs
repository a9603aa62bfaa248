//! Markup contract between the toolkit dashboard page and its client.
//!
//! The server-rendered page flags elements with `data-*` markers; the
//! client finds them with the selectors below and rewrites labels,
//! classes and banners using the strings defined here.

use std::fmt;
use std::str::FromStr;

/// Marks a control that reloads the page when clicked.
pub const AUTO_REFRESH_ATTR: &str = "data-auto-refresh";

/// Names the status key an element displays.
pub const STATUS_INDICATOR_ATTR: &str = "data-status-indicator";

/// Class of the element notifications are inserted into.
pub const CONTAINER_CLASS: &str = "container";

/// Class of a banner's close button.
pub const CLOSE_BUTTON_CLASS: &str = "btn-close";

pub mod selectors {
    pub const AUTO_REFRESH: &str = "[data-auto-refresh]";
    pub const STATUS_INDICATOR: &str = "[data-status-indicator]";
    pub const FORM: &str = "form";
    pub const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;
    pub const CONTAINER: &str = ".container";
    pub const CLOSE_BUTTON: &str = ".btn-close";
}

/// Stock dashboard timings, in milliseconds.
pub mod timing {
    pub const POLL_INTERVAL_MS: u32 = 30_000;
    pub const REFRESH_DELAY_MS: u32 = 1_000;
    pub const FORM_RESTORE_DELAY_MS: u32 = 3_000;
    pub const NOTIFICATION_TTL_MS: u32 = 5_000;
    pub const REQUEST_TIMEOUT_MS: u32 = 30_000;
}

pub const REFRESHING_LABEL: &str = r#"<i class="fas fa-spinner fa-spin"></i> Refreshing..."#;
pub const PROCESSING_LABEL: &str = r#"<i class="fas fa-spinner fa-spin"></i> Processing..."#;

pub const SUCCESS_CLASS: &str = "fas fa-check-circle status-success";
pub const FAILURE_CLASS: &str = "fas fa-exclamation-circle status-danger";

/// Indicator class for a check result.
pub fn indicator_class(success: bool) -> &'static str {
    if success {
        SUCCESS_CLASS
    } else {
        FAILURE_CLASS
    }
}

/// Visual severity of a notification banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown notification severity: {0}")]
pub struct UnknownSeverity(String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    /// Accepts the alert class suffixes, plus `error` as used by the
    /// toolkit's flash messages.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "success" => Ok(Severity::Success),
            "warning" => Ok(Severity::Warning),
            "danger" | "error" => Ok(Severity::Danger),
            other => Err(UnknownSeverity(other.to_string())),
        }
    }
}

/// Escape text for inclusion in element markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Class attribute of a banner.
pub fn banner_class(severity: Severity) -> String {
    format!("alert alert-{severity} alert-dismissible fade show")
}

/// Inner markup of a banner: the escaped message and its close button.
pub fn banner_html(message: &str) -> String {
    format!(
        r#"{}<button type="button" class="{CLOSE_BUTTON_CLASS}" data-bs-dismiss="alert"></button>"#,
        escape_html(message)
    )
}
