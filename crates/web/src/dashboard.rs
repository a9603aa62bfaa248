//! Page-level interactivity for the toolkit dashboard.
//!
//! [`DashboardClient`] binds busy-state feedback to auto-refresh controls
//! and forms, polls the toolkit status API to keep indicators current, and
//! shows transient notification banners. Listeners and timers only hold
//! weak references back to the client.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use gloo::utils::window;
use gloo_timers::future::TimeoutFuture;
use restore_core::status::{StatusSnapshot, TaskStatus};
use restore_core::ui::{
    banner_class, banner_html, indicator_class, selectors, Severity, PROCESSING_LABEL,
    REFRESHING_LABEL, STATUS_INDICATOR_ATTR,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event};

use crate::api::StatusSource;
use crate::config::WebConfig;
use crate::error::{WebError, WebResult};
use crate::timer::Scheduled;

/// What a scheduled reload runs. Defaults to `location.reload()`.
pub type ReloadHook = Rc<dyn Fn()>;

/// A submit button waiting to get its label back.
struct PendingRestore {
    button: Element,
    original_label: String,
    timer: Scheduled,
}

/// A banner on the page with its close handler and expiry.
struct Banner {
    element: Element,
    _close: Option<EventListener>,
    expiry: Scheduled,
}

struct Inner {
    document: Document,
    source: Rc<dyn StatusSource>,
    config: WebConfig,
    reload: RefCell<ReloadHook>,
    initialized: Cell<bool>,
    listeners: RefCell<Vec<EventListener>>,
    reloads: RefCell<Vec<Scheduled>>,
    restorations: RefCell<Vec<PendingRestore>>,
    banners: RefCell<Vec<Banner>>,
    polling: Cell<bool>,
    poll_epoch: Cell<u32>,
}

#[derive(Clone)]
pub struct DashboardClient(Rc<Inner>);

impl DashboardClient {
    pub fn new(document: Document, source: Rc<dyn StatusSource>, config: WebConfig) -> Self {
        Self(Rc::new(Inner {
            document,
            source,
            config,
            reload: RefCell::new(Rc::new(reload_window)),
            initialized: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            reloads: RefCell::new(Vec::new()),
            restorations: RefCell::new(Vec::new()),
            banners: RefCell::new(Vec::new()),
            polling: Cell::new(false),
            poll_epoch: Cell::new(0),
        }))
    }

    /// Construct a client for a freshly loaded page and wire it up.
    pub fn bootstrap(
        document: Document,
        source: Rc<dyn StatusSource>,
        config: WebConfig,
    ) -> WebResult<Self> {
        let client = Self::new(document, source, config);
        client.initialize()?;
        Ok(client)
    }

    pub fn config(&self) -> &WebConfig {
        &self.0.config
    }

    /// Replace what a scheduled reload does.
    pub fn set_reload_hook(&self, hook: ReloadHook) {
        *self.0.reload.borrow_mut() = hook;
    }

    /// Register all listeners and start polling. Only the first call has
    /// any effect.
    pub fn initialize(&self) -> WebResult<()> {
        if self.0.initialized.replace(true) {
            tracing::debug!("Dashboard client already initialized");
            return Ok(());
        }

        let refresh_controls = self.bind_auto_refresh_controls()?;
        let forms = self.bind_form_feedback()?;
        self.start_polling();

        tracing::info!(refresh_controls, forms, "Dashboard client initialized");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Auto-refresh controls
    // -----------------------------------------------------------------------

    /// Bind the busy-then-reload handler to every `[data-auto-refresh]`
    /// element. Returns how many controls were bound.
    pub fn bind_auto_refresh_controls(&self) -> WebResult<usize> {
        let controls = query_all(&self.0.document, selectors::AUTO_REFRESH)?;
        let mut listeners = self.0.listeners.borrow_mut();
        for control in &controls {
            let client = Rc::downgrade(&self.0);
            listeners.push(EventListener::new(control, "click", move |event| {
                if let Some(client) = upgrade(&client) {
                    client.refresh_page(event);
                }
            }));
        }
        Ok(controls.len())
    }

    /// Mark the clicked control busy and reload the page after the
    /// refresh delay. Further clicks while a reload is pending are
    /// ignored.
    pub fn refresh_page(&self, event: &Event) {
        let Some(control) = current_element(event) else {
            return;
        };
        if self.0.reloads.borrow().iter().any(Scheduled::is_pending) {
            tracing::debug!("Reload already scheduled");
            return;
        }
        if let Err(e) = mark_busy(&control, REFRESHING_LABEL) {
            tracing::warn!(error = %e, "Could not mark auto-refresh control busy");
            return;
        }

        tracing::debug!(
            delay_ms = self.0.config.refresh_delay_ms,
            "Reloading page after refresh delay"
        );
        let reload = Rc::clone(&self.0.reload.borrow());
        let timer = Scheduled::after(self.0.config.refresh_delay_ms, move || reload());

        let mut reloads = self.0.reloads.borrow_mut();
        reloads.retain(Scheduled::is_pending);
        reloads.push(timer);
    }

    // -----------------------------------------------------------------------
    // Form feedback
    // -----------------------------------------------------------------------

    /// Bind submit feedback to every form. Returns how many forms were
    /// bound.
    pub fn bind_form_feedback(&self) -> WebResult<usize> {
        let forms = query_all(&self.0.document, selectors::FORM)?;
        let mut listeners = self.0.listeners.borrow_mut();
        for form in &forms {
            let client = Rc::downgrade(&self.0);
            listeners.push(EventListener::new(form, "submit", move |event| {
                if let Some(client) = upgrade(&client) {
                    client.handle_form_submit(event);
                }
            }));
        }
        Ok(forms.len())
    }

    /// Mark the form's submit button busy and schedule its restoration.
    ///
    /// The restoration runs whether or not the submission ever completes.
    /// A second submit while one is pending replaces the pending
    /// restoration but keeps the label from before the first.
    pub fn handle_form_submit(&self, event: &Event) {
        let Some(form) = current_element(event) else {
            return;
        };
        let Ok(Some(button)) = form.query_selector(selectors::SUBMIT_BUTTON) else {
            return;
        };

        let mut restorations = self.0.restorations.borrow_mut();
        restorations.retain(|pending| pending.timer.is_pending());

        let original_label = match restorations.iter().position(|p| p.button == button) {
            // Dropping the stale timer cancels it.
            Some(index) => restorations.swap_remove(index).original_label,
            None => button.inner_html(),
        };

        if let Err(e) = mark_busy(&button, PROCESSING_LABEL) {
            tracing::warn!(error = %e, "Could not mark submit button busy");
            return;
        }

        let timer = {
            let button = button.clone();
            let label = original_label.clone();
            Scheduled::after(self.0.config.form_restore_delay_ms, move || {
                if let Err(e) = restore_control(&button, &label) {
                    tracing::debug!(error = %e, "Could not restore submit button");
                }
            })
        };
        restorations.push(PendingRestore {
            button,
            original_label,
            timer,
        });
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    /// Fetch the current status snapshot. Failures are logged and yield
    /// `None`.
    pub async fn fetch_status(&self) -> Option<StatusSnapshot> {
        match self.0.source.system_status().await {
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
        match self.0.source.task_status(task_id).await {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::error!(task_id, error = %e, "Failed to fetch task status");
                None
            }
        }
    }

    /// Start the status polling loop unless one is already running.
    ///
    /// The next poll is scheduled only once the previous one finished.
    pub fn start_polling(&self) {
        if self.0.polling.replace(true) {
            tracing::debug!("Status polling already running");
            return;
        }

        let epoch = self.0.poll_epoch.get();
        let period_ms = self.0.config.poll_interval_ms;
        let client = Rc::downgrade(&self.0);
        spawn_local(async move {
            tracing::info!(period_ms, "Status polling started");
            loop {
                TimeoutFuture::new(period_ms).await;
                let Some(client) = upgrade(&client) else {
                    break;
                };
                if client.0.poll_epoch.get() != epoch {
                    break;
                }
                client.update_system_status().await;
            }
            tracing::info!("Status polling stopped");
        });
    }

    pub fn is_polling(&self) -> bool {
        self.0.polling.get()
    }

    /// Stop the polling loop at its next wake-up.
    pub fn stop_polling(&self) {
        if self.0.polling.replace(false) {
            self.0.poll_epoch.set(self.0.poll_epoch.get().wrapping_add(1));
        }
    }

    /// One poll: fetch and, if that worked, apply. Returns whether the
    /// indicators were updated.
    pub async fn update_system_status(&self) -> bool {
        match self.fetch_status().await {
            Some(snapshot) => {
                self.apply_status_to_indicators(&snapshot);
                true
            }
            None => false,
        }
    }

    /// Set the class of every indicator whose key is in `snapshot`.
    /// Indicators for other keys are left alone. Returns how many
    /// indicators had a matching key.
    pub fn apply_status_to_indicators(&self, snapshot: &StatusSnapshot) -> usize {
        let indicators = match query_all(&self.0.document, selectors::STATUS_INDICATOR) {
            Ok(indicators) => indicators,
            Err(e) => {
                tracing::warn!(error = %e, "Could not look up status indicators");
                return 0;
            }
        };

        let mut updated = 0;
        for indicator in indicators {
            let Some(key) = indicator.get_attribute(STATUS_INDICATOR_ATTR) else {
                continue;
            };
            let Some(status) = snapshot.get(&key) else {
                continue;
            };
            let class_name = indicator_class(status.success);
            if indicator.class_name() != class_name {
                tracing::info!(key = %key, success = status.success, "Status indicator changed");
                indicator.set_class_name(class_name);
            }
            updated += 1;
        }
        updated
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    /// Show a banner at the top of the page container and remove it after
    /// the notification lifetime. Returns the banner element.
    pub fn show_notification(&self, message: &str, severity: Severity) -> WebResult<Element> {
        let document = &self.0.document;
        let container = document
            .query_selector(selectors::CONTAINER)?
            .ok_or(WebError::MissingContainer(selectors::CONTAINER))?;

        let banner = document.create_element("div")?;
        banner.set_class_name(&banner_class(severity));
        banner.set_inner_html(&banner_html(message));
        container.insert_before(&banner, container.first_child().as_ref())?;

        let close = banner
            .query_selector(selectors::CLOSE_BUTTON)?
            .map(|button| {
                let banner = banner.clone();
                EventListener::new(&button, "click", move |_| banner.remove())
            });

        let expiry = {
            let banner = banner.clone();
            Scheduled::after(self.0.config.notification_ttl_ms, move || {
                if banner.parent_node().is_some() {
                    banner.remove();
                }
            })
        };

        tracing::info!(severity = %severity, "{message}");

        let mut banners = self.0.banners.borrow_mut();
        banners.retain(|b| b.element.parent_node().is_some());
        banners.push(Banner {
            element: banner.clone(),
            _close: close,
            expiry,
        });

        Ok(banner)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Number of timers (reloads, restorations, banner expiries) that
    /// have not fired yet.
    pub fn pending_timers(&self) -> usize {
        let reloads = self.0.reloads.borrow().iter().filter(|t| t.is_pending()).count();
        let restorations = self
            .0
            .restorations
            .borrow()
            .iter()
            .filter(|p| p.timer.is_pending())
            .count();
        let banners = self
            .0
            .banners
            .borrow()
            .iter()
            .filter(|b| b.expiry.is_pending())
            .count();
        reloads + restorations + banners
    }

    /// Stop polling, cancel every pending timer and unbind all listeners.
    /// Banners already on the page stay.
    pub fn shutdown(&self) {
        self.stop_polling();
        self.0.listeners.borrow_mut().clear();
        self.0.reloads.borrow_mut().clear();
        self.0.restorations.borrow_mut().clear();
        self.0.banners.borrow_mut().clear();
        self.0.initialized.set(false);
        tracing::info!("Dashboard client shut down");
    }
}

fn upgrade(client: &Weak<Inner>) -> Option<DashboardClient> {
    client.upgrade().map(DashboardClient)
}

fn reload_window() {
    if let Err(e) = window().location().reload() {
        tracing::error!(error = ?e, "Page reload failed");
    }
}

fn query_all(document: &Document, selector: &str) -> WebResult<Vec<Element>> {
    let nodes = document.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

fn current_element(event: &Event) -> Option<Element> {
    event.current_target()?.dyn_into::<Element>().ok()
}

/// Set the `disabled` property the way a script assigning
/// `element.disabled` would, whatever the element type.
fn set_disabled(element: &Element, disabled: bool) -> WebResult<()> {
    js_sys::Reflect::set(element, &JsValue::from_str("disabled"), &JsValue::from_bool(disabled))?;
    Ok(())
}

fn mark_busy(control: &Element, label: &str) -> WebResult<()> {
    control.set_inner_html(label);
    set_disabled(control, true)
}

fn restore_control(control: &Element, label: &str) -> WebResult<()> {
    control.set_inner_html(label);
    set_disabled(control, false)
}
