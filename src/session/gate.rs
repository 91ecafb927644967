//! Per-session mutual exclusion for state-changing actions.
//!
//! One create/buy/draw runs to completion (or failure) before another is
//! accepted from the same session. The flag is held as an RAII permit so it
//! is released on every exit path of the pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The per-session processing flag.
#[derive(Debug, Clone, Default)]
pub struct ActionGate {
    busy: Arc<AtomicBool>,
}

impl ActionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the gate, or `None` if another action is already in flight.
    ///
    /// Acquire before `Building`; the permit releases on drop.
    pub fn try_begin(&self) -> Option<ActionPermit> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Some(ActionPermit {
                busy: Arc::clone(&self.busy),
            })
        } else {
            None
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the lifetime of one state-changing action.
#[derive(Debug)]
pub struct ActionPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for ActionPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
