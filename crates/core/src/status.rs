//! Payloads returned by the toolkit's status API.
//!
//! `GET /api/status` answers with one [`IndicatorStatus`] per toolkit
//! check (`disk`, `snapshots`, `backups`), collected into a
//! [`StatusSnapshot`]. `GET /api/task/{id}` answers with a task record the
//! dashboard never interprets, carried as a [`TaskStatus`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Indicator keys reported by the toolkit server.
pub mod indicator_keys {
    pub const DISK: &str = "disk";
    pub const SNAPSHOTS: &str = "snapshots";
    pub const BACKUPS: &str = "backups";

    pub const ALL: &[&str] = &[DISK, SNAPSHOTS, BACKUPS];
}

/// Result of one toolkit check.
///
/// Only `success` drives the dashboard. A payload without it counts as a
/// failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: String,
    /// Any further fields the server attaches.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl IndicatorStatus {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: String::new(),
            extra: Default::default(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: error.into(),
            extra: Default::default(),
        }
    }
}

/// Indicator name to check result, as served by `GET /api/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSnapshot(BTreeMap<String, IndicatorStatus>);

impl StatusSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for tests and fixtures.
    pub fn with(mut self, key: impl Into<String>, status: IndicatorStatus) -> Self {
        self.0.insert(key.into(), status);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, status: IndicatorStatus) {
        self.0.insert(key.into(), status);
    }

    pub fn get(&self, key: &str) -> Option<&IndicatorStatus> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndicatorStatus)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, IndicatorStatus)> for StatusSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, IndicatorStatus)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Opaque task record from `GET /api/task/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStatus(serde_json::Value);

impl TaskStatus {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}
