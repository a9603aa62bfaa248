#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

use restore_client::api::{ApiError, StatusSource};
use restore_core::status::{indicator_keys, IndicatorStatus, StatusSnapshot, TaskStatus};

/// In-memory [`StatusSource`] with a swappable snapshot.
///
/// A `None` snapshot makes `system_status` fail with a 500, the way an
/// unreachable or broken toolkit would. Unknown tasks answer with the
/// toolkit's `{"error": "Task not found"}` body.
#[derive(Default)]
pub struct FakeSource {
    snapshot: Mutex<Option<StatusSnapshot>>,
    tasks: Mutex<HashMap<String, TaskStatus>>,
    status_calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_snapshot(snapshot: StatusSnapshot) -> Arc<Self> {
        let source = Self::default();
        *source.snapshot.lock().unwrap() = Some(snapshot);
        Arc::new(source)
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_snapshot(&self, snapshot: Option<StatusSnapshot>) {
        *self.snapshot.lock().unwrap() = snapshot;
    }

    pub fn add_task(&self, task_id: &str, status: serde_json::Value) {
        self.tasks
            .lock()
            .unwrap()
            .insert(task_id.to_string(), TaskStatus::new(status));
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for FakeSource {
    async fn system_status(&self) -> Result<StatusSnapshot, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.snapshot
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ApiError::Status {
                status: 500,
                body: "toolkit unavailable".to_string(),
            })
    }

    async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError> {
        let task = self
            .tasks
            .lock()
            .unwrap()
            .get(task_id)
            .cloned()
            .unwrap_or_else(|| TaskStatus::new(serde_json::json!({ "error": "Task not found" })));
        Ok(task)
    }
}

/// Disk healthy, snapshot listing broken, backups not reported.
pub fn mixed_snapshot() -> StatusSnapshot {
    StatusSnapshot::new()
        .with(
            indicator_keys::DISK,
            IndicatorStatus::ok("/dev/sda1  100G  40G  60G  40% /"),
        )
        .with(
            indicator_keys::SNAPSHOTS,
            IndicatorStatus::failed("timeshift: command not found\n"),
        )
}

/// Every check healthy.
pub fn healthy_snapshot() -> StatusSnapshot {
    indicator_keys::ALL
        .iter()
        .map(|key| (key.to_string(), IndicatorStatus::ok("ok")))
        .collect()
}

/// Serve `app` on an ephemeral localhost port and return its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
