//! One-shot browser timers that remember whether they fired.

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;

/// A [`Timeout`] plus a fired flag. Dropping it before it fires cancels
/// the callback.
pub(crate) struct Scheduled {
    fired: Rc<Cell<bool>>,
    _timeout: Timeout,
}

impl Scheduled {
    pub(crate) fn after<F>(delay_ms: u32, callback: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let timeout = Timeout::new(delay_ms, move || {
            flag.set(true);
            callback();
        });
        Self {
            fired,
            _timeout: timeout,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        !self.fired.get()
    }
}
