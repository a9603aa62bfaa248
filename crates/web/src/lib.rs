//! `restore-web` library crate.
//!
//! In-page client for the System Restore Toolkit dashboard, compiled to
//! WebAssembly. It drives the server-rendered page through `web-sys`:
//! auto-refresh controls, submit feedback, status indicators and
//! notification banners. Only [`config`] builds for other targets.

pub mod config;

#[cfg(target_arch = "wasm32")]
pub mod api;
#[cfg(target_arch = "wasm32")]
pub mod dashboard;
#[cfg(target_arch = "wasm32")]
mod entry;
#[cfg(target_arch = "wasm32")]
pub mod error;
#[cfg(target_arch = "wasm32")]
mod timer;

#[cfg(target_arch = "wasm32")]
pub use dashboard::DashboardClient;
