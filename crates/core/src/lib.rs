//! Shared domain types for the System Restore Toolkit dashboard.
//!
//! Holds the status payloads served by the toolkit's JSON API, the pure
//! formatting helpers used when rendering them, and the markup contract
//! shared by the browser client and the headless watcher.

pub mod error;
pub mod format;
pub mod status;
pub mod ui;
