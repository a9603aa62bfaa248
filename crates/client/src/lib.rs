//! `restore-client` library crate.
//!
//! Headless watcher for the System Restore Toolkit status API. The binary
//! entrypoint lives in `main.rs`; modules are public for integration
//! testing and embedding. The in-page dashboard client is `restore-web`.

pub mod api;
pub mod config;
pub mod poller;
pub mod timer;
pub mod watcher;

pub use watcher::{StatusChange, StatusWatcher};
