//! JavaScript surface of the crate.
//!
//! ```js
//! import init, { Dashboard } from "./restore_web.js";
//! await init();
//! window.SystemRestoreToolkit = new Dashboard();
//! ```

use std::rc::Rc;

use gloo::utils::document;
use js_sys::Promise;
use restore_core::format;
use restore_core::ui::Severity;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::api::ToolkitApi;
use crate::config::WebConfig;
use crate::dashboard::DashboardClient;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Fails only when a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Info);
}

/// The dashboard client bound to the current page.
#[wasm_bindgen]
pub struct Dashboard {
    client: DashboardClient,
}

#[wasm_bindgen]
impl Dashboard {
    /// Boot the client, configured from `<body data-*>` attributes.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Dashboard, JsError> {
        let document = document();
        let body = document.body();
        let config = WebConfig::from_element(body.as_deref())?;
        let api = ToolkitApi::new(config.base_url.clone(), config.request_timeout_ms);
        let client = DashboardClient::bootstrap(document, Rc::new(api), config)?;
        Ok(Dashboard { client })
    }

    /// `severity` is one of `info` (default), `success`, `warning`,
    /// `danger` or `error`.
    #[wasm_bindgen(js_name = showNotification)]
    pub fn show_notification(&self, message: &str, severity: Option<String>) -> Result<(), JsError> {
        let severity = match severity {
            Some(s) => s.parse()?,
            None => Severity::default(),
        };
        self.client.show_notification(message, severity)?;
        Ok(())
    }

    /// Resolves to the status snapshot, or `null` when the fetch failed.
    #[wasm_bindgen(js_name = fetchStatus)]
    pub fn fetch_status(&self) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move { to_js(client.fetch_status().await.as_ref()) })
    }

    /// Resolves to the task record, or `null` when the fetch failed.
    #[wasm_bindgen(js_name = checkTaskStatus)]
    pub fn check_task_status(&self, task_id: String) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move { to_js(client.check_task_status(&task_id).await.as_ref()) })
    }

    /// Resolves to whether the indicators were updated.
    #[wasm_bindgen(js_name = updateSystemStatus)]
    pub fn update_system_status(&self) -> Promise {
        let client = self.client.clone();
        future_to_promise(async move { Ok(JsValue::from_bool(client.update_system_status().await)) })
    }

    pub fn shutdown(&self) {
        self.client.shutdown();
    }
}

#[wasm_bindgen(js_name = formatFileSize)]
pub fn format_file_size(bytes: f64) -> String {
    // Saturating: negatives and NaN read as zero.
    format::format_file_size(bytes as u64)
}

#[wasm_bindgen(js_name = formatDate)]
pub fn format_date(input: &str) -> Result<String, JsError> {
    Ok(format::format_date(input)?)
}

fn to_js<T: Serialize>(value: Option<&T>) -> Result<JsValue, JsValue> {
    let Some(value) = value else {
        return Ok(JsValue::NULL);
    };
    let json = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}
