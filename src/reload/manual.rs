//! In-process trigger fired by code: the dev server's reload endpoint,
//! `SIGHUP`, and tests.

use std::sync::{Mutex, PoisonError};

use crate::reload::trigger::{Listeners, ReloadEvent, ReloadListener, ReloadStatus, ReloadTrigger};

/// Trigger driven by explicit calls.
#[derive(Debug, Default)]
pub struct ManualTrigger {
    listeners: Listeners,
    status: Mutex<ReloadStatus>,
}

impl ManualTrigger {
    /// Create a trigger in the `Idle` status with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every listener.
    pub fn fire(&self, event: ReloadEvent) {
        tracing::debug!(?event, listeners = self.listeners.len(), "Firing reload event");
        self.listeners.emit(event);
    }

    /// Report that the module was replaced.
    pub fn accept(&self) {
        self.fire(ReloadEvent::Accepted);
    }

    /// Report that the module is going away.
    pub fn dispose(&self) {
        self.fire(ReloadEvent::Disposed);
    }

    /// Move to `status`, notifying listeners only if it actually changed.
    pub fn set_status(&self, status: ReloadStatus) {
        let changed = {
            let mut current = self.status.lock().unwrap_or_else(PoisonError::into_inner);
            let changed = *current != status;
            *current = status;
            changed
        };
        if changed {
            self.fire(ReloadEvent::Status(status));
        }
    }

    /// Number of subscribed listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ReloadTrigger for ManualTrigger {
    fn subscribe(&self, listener: ReloadListener) {
        self.listeners.push(listener);
    }

    fn status(&self) -> ReloadStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
