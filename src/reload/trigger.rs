//! The reload trigger interface.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

/// Callback invoked for every reload event.
pub type ReloadListener = Arc<dyn Fn(ReloadEvent) + Send + Sync>;

/// Progress of an in-flight module update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadStatus {
    #[default]
    Idle,
    Check,
    Prepare,
    Ready,
    Dispose,
    Apply,
    Abort,
    Fail,
}

/// Notification delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadEvent {
    /// The module was replaced and the replacement accepted.
    Accepted,
    /// The update moved to a new status.
    Status(ReloadStatus),
    /// The old module instance is about to be discarded.
    Disposed,
}

/// A source of reload notifications.
pub trait ReloadTrigger: Send + Sync {
    /// Register `listener` for every future event.
    fn subscribe(&self, listener: ReloadListener);

    /// Current update status. Sources without status tracking stay idle.
    fn status(&self) -> ReloadStatus {
        ReloadStatus::Idle
    }
}

/// Fan-out list shared by the concrete triggers.
#[derive(Clone, Default)]
pub(crate) struct Listeners {
    inner: Arc<RwLock<Vec<ReloadListener>>>,
}

impl Listeners {
    pub(crate) fn push(&self, listener: ReloadListener) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Call every listener. The list is copied first so a listener may
    /// subscribe further listeners without deadlocking.
    pub(crate) fn emit(&self, event: ReloadEvent) {
        let listeners = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("count", &self.len()).finish()
    }
}
