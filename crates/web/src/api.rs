//! Browser client for the toolkit's JSON API.
//!
//! [`ToolkitApi`] issues `fetch` requests through [`gloo_net`]. As on the
//! toolkit server, error responses carry JSON too, so a body that decodes
//! is returned whatever the HTTP status.

use async_trait::async_trait;
use futures::future::{self, Either};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use restore_core::status::{StatusSnapshot, TaskStatus};
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// `fetch` rejected or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Request(#[from] gloo_net::Error),

    #[error("Request timed out after {0} ms")]
    Timeout(u32),

    /// A 2xx response whose body is not the expected JSON.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A non-2xx response whose body is not the expected JSON.
    #[error("Toolkit API error ({status}): {body}")]
    Status { status: u16, body: String },
}

/// Anything that can answer the dashboard's status queries.
///
/// Browser futures are not `Send`, hence `?Send`.
#[async_trait(?Send)]
pub trait StatusSource {
    async fn system_status(&self) -> Result<StatusSnapshot, ApiError>;

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError>;
}

pub struct ToolkitApi {
    base_url: String,
    timeout_ms: Option<u32>,
}

impl ToolkitApi {
    /// `base_url` may be empty to address the page's own origin.
    pub fn new(base_url: impl Into<String>, timeout_ms: Option<u32>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout_ms,
        }
    }

    pub fn status_url(&self) -> String {
        format!("{}/api/status", self.base_url)
    }

    /// The task id is percent-encoded as one path segment.
    pub fn task_url(&self, task_id: &str) -> String {
        let segment: String = js_sys::encode_uri_component(task_id).into();
        format!("{}/api/task/{segment}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let fetch = async {
            let response = Request::get(url).send().await?;
            let status = response.status();
            let body = response.text().await?;
            decode_body(status, &body)
        };

        let Some(timeout_ms) = self.timeout_ms else {
            return fetch.await;
        };
        let timeout = Box::pin(TimeoutFuture::new(timeout_ms));
        match future::select(Box::pin(fetch), timeout).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(ApiError::Timeout(timeout_ms)),
        }
    }
}

#[async_trait(?Send)]
impl StatusSource for ToolkitApi {
    async fn system_status(&self) -> Result<StatusSnapshot, ApiError> {
        self.get_json(&self.status_url()).await
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError> {
        self.get_json(&self.task_url(task_id)).await
    }
}

/// Decode a response body regardless of its status code.
pub fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        if (200..300).contains(&status) {
            ApiError::Decode(e)
        } else {
            ApiError::Status {
                status,
                body: body.to_string(),
            }
        }
    })
}
