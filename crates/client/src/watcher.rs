//! Headless status watcher for a toolkit web interface.
//!
//! [`StatusWatcher`] polls the toolkit status API the way the dashboard
//! page does and remembers the last snapshot it applied. Each poll is
//! compared against that snapshot, and only keys whose health flipped (or
//! that are seen for the first time) are published as [`StatusChange`]s.

use std::ops::ControlFlow;
use std::sync::{Arc, Weak};

use restore_core::status::{IndicatorStatus, StatusSnapshot, TaskStatus};
use tokio::sync::{broadcast, Mutex};

use crate::api::StatusSource;
use crate::config::ClientConfig;
use crate::poller;
use crate::timer::ScheduledTask;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A status key whose health differs from the last applied snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub key: String,
    /// `None` the first time the key is reported.
    pub previous: Option<IndicatorStatus>,
    pub current: IndicatorStatus,
}

impl StatusChange {
    /// Whether this is the key's first observation rather than a flip.
    pub fn is_initial(&self) -> bool {
        self.previous.is_none()
    }
}

pub struct StatusWatcher {
    source: Arc<dyn StatusSource>,
    config: ClientConfig,
    last: Mutex<Option<StatusSnapshot>>,
    events: broadcast::Sender<StatusChange>,
    poller: Mutex<Option<ScheduledTask>>,
}

impl StatusWatcher {
    pub fn new(source: Arc<dyn StatusSource>, config: ClientConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            source,
            config,
            last: Mutex::new(None),
            events,
            poller: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.events.subscribe()
    }

    /// The snapshot applied by the last successful poll, merged over the
    /// ones before it.
    pub async fn last_snapshot(&self) -> Option<StatusSnapshot> {
        self.last.lock().await.clone()
    }

    /// Fetch the current status snapshot. Failures are logged and yield
    /// `None`.
    pub async fn fetch_status(&self) -> Option<StatusSnapshot> {
        match self.source.system_status().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch status");
                None
            }
        }
    }

    /// Fetch the record of a background task. Failures are logged and
    /// yield `None`.
    pub async fn check_task_status(&self, task_id: &str) -> Option<TaskStatus> {
        match self.source.task_status(task_id).await {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::error!(task_id, error = %e, "Failed to fetch task status");
                None
            }
        }
    }

    /// One poll: fetch and, if that worked, apply. Returns whether a
    /// snapshot was applied.
    pub async fn update_system_status(&self) -> bool {
        match self.fetch_status().await {
            Some(snapshot) => {
                self.apply(&snapshot).await;
                true
            }
            None => false,
        }
    }

    /// Merge `snapshot` into the remembered state and publish a
    /// [`StatusChange`] for every key that is new or whose `success` flag
    /// flipped. Keys absent from `snapshot` keep their last state.
    pub async fn apply(&self, snapshot: &StatusSnapshot) -> Vec<StatusChange> {
        let mut last = self.last.lock().await;
        let merged = last.get_or_insert_with(StatusSnapshot::new);

        let mut changes = Vec::new();
        for (key, current) in snapshot.iter() {
            let previous = merged.get(key);
            if previous.is_some_and(|p| p.success == current.success) {
                merged.insert(key, current.clone());
                continue;
            }

            tracing::info!(key, success = current.success, "Status indicator changed");
            changes.push(StatusChange {
                key: key.to_string(),
                previous: previous.cloned(),
                current: current.clone(),
            });
            merged.insert(key, current.clone());
        }
        drop(last);

        for change in &changes {
            // No subscribers is fine.
            let _ = self.events.send(change.clone());
        }
        changes
    }

    /// Start the status polling loop unless one is already running.
    pub async fn start_polling(self: &Arc<Self>) {
        let mut slot = self.poller.lock().await;
        if slot.as_ref().is_some_and(|p| !p.is_finished()) {
            tracing::debug!("Status polling already running");
            return;
        }

        let watcher = Arc::downgrade(self);
        let period = self.config.poll_interval;
        *slot = Some(ScheduledTask::spawn(move |cancel| {
            poller::run(period, cancel, move || poll_tick(watcher.clone()))
        }));
    }

    pub async fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|p| !p.is_finished() && !p.is_cancelled())
    }

    /// Stop polling and wait for the loop to exit.
    pub async fn shutdown(&self) {
        if let Some(poller) = self.poller.lock().await.take() {
            poller.cancel();
            poller.join().await;
        }
        tracing::info!("Status watcher shut down");
    }
}

async fn poll_tick(watcher: Weak<StatusWatcher>) -> ControlFlow<()> {
    match watcher.upgrade() {
        Some(watcher) => {
            watcher.update_system_status().await;
            ControlFlow::Continue(())
        }
        None => ControlFlow::Break(()),
    }
}
