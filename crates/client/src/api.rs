//! REST client for the toolkit web interface's JSON API.
//!
//! [`ToolkitApi`] wraps the two endpoints the dashboard consumes using
//! [`reqwest`]. The [`StatusSource`] trait abstracts over it so the
//! dashboard can be driven by any status provider.
//!
//! The toolkit answers errors with JSON too (`404 {"error": "Task not
//! found"}`), so a body that decodes is returned whatever the HTTP status.

use std::time::Duration;

use async_trait::async_trait;
use restore_core::status::{StatusSnapshot, TaskStatus};
use serde::de::DeserializeOwned;

/// Errors from the toolkit API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request failed (connection, timeout, reading the body).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A 2xx response whose body is not the expected JSON.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A non-2xx response whose body is not the expected JSON.
    #[error("Toolkit API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The configured base URL cannot address the endpoint.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Anything that can answer the dashboard's status queries.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Current result of every toolkit check.
    async fn system_status(&self) -> Result<StatusSnapshot, ApiError>;

    /// Progress record of a single background task.
    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError>;
}

/// HTTP client for a toolkit web interface.
pub struct ToolkitApi {
    client: reqwest::Client,
    base_url: String,
}

impl ToolkitApi {
    /// Create a client for the toolkit at `base_url`, e.g.
    /// `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/status`
    pub fn status_url(&self) -> String {
        format!("{}/api/status", self.base_url)
    }

    /// `GET /api/task/{task_id}`, with the id encoded as one path segment.
    pub fn task_url(&self, task_id: &str) -> Result<reqwest::Url, ApiError> {
        let mut url = reqwest::Url::parse(&format!("{}/api/task", self.base_url))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?
            .push(task_id);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: reqwest::Url) -> Result<T, ApiError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_body(status, &body)
    }
}

/// Decode a response body regardless of its status code.
///
/// Only a body that is not the expected JSON is an error: [`ApiError::Decode`]
/// for 2xx responses, [`ApiError::Status`] carrying the raw body otherwise.
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

#[async_trait]
impl StatusSource for ToolkitApi {
    async fn system_status(&self) -> Result<StatusSnapshot, ApiError> {
        let url = reqwest::Url::parse(&self.status_url())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        self.get_json(url).await
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError> {
        let url = self.task_url(task_id)?;
        self.get_json(url).await
    }
}
