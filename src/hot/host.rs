//! The hot router adapter.
//!
//! # Responsibilities
//! - Own the factory, the captured context and the router slot
//! - Build the initial router and mount the entry point on the host
//! - Turn reload notifications into deferred rebuilds
//! - Keep the last good router when a rebuild fails

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use arc_swap::ArcSwap;
use dashmap::DashSet;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::hot::app::{HostApp, HostId};
use crate::hot::entry::{self, EntryPoint};
use crate::hot::error::{RebuildError, SetupError};
use crate::hot::factory::RouterFactory;
use crate::hot::slot::RouterSlot;
use crate::observability::metrics::{self, ReloadOutcome};
use crate::reload::{ReloadEvent, ReloadStatus, ReloadTrigger};

/// Lifecycle of the adapter. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterState {
    Uninitialized,
    Active,
}

/// Counters for reload rebuilds. The initial build is not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReloadStats {
    pub applied: u64,
    pub failed: u64,
}

struct Factory<C>(Box<dyn RouterFactory<C>>);

struct Inner<C> {
    factory: ArcSwap<Factory<C>>,
    context: OnceLock<Arc<C>>,
    slot: Arc<RouterSlot>,
    /// Held across the initial build so concurrent `initialize` calls build once.
    initial_build: Mutex<()>,
    mounted: DashSet<HostId>,
    runtime: Handle,
    applied: AtomicU64,
    failed: AtomicU64,
}

/// Hot-swappable router built from a factory and a process-wide context.
pub struct HotRouter<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for HotRouter<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Send + Sync + 'static> HotRouter<C> {
    /// Create the adapter around `factory`.
    ///
    /// Must be called inside a Tokio runtime; rebuilds are spawned onto it even
    /// when notifications arrive from foreign threads.
    pub fn install(factory: impl RouterFactory<C>) -> Result<Self, SetupError> {
        let runtime = Handle::try_current().map_err(|_| SetupError::NoRuntime)?;

        Ok(Self {
            inner: Arc::new(Inner {
                factory: ArcSwap::from_pointee(Factory(Box::new(factory))),
                context: OnceLock::new(),
                slot: Arc::new(RouterSlot::new()),
                initial_build: Mutex::new(()),
                mounted: DashSet::new(),
                runtime,
                applied: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
        })
    }

    /// The stable dispatch entry point. All calls return handles to the same
    /// slot.
    pub fn entry_point(&self) -> EntryPoint {
        EntryPoint::new(Arc::clone(&self.inner.slot))
    }

    /// Capture `context`, build the first router and mount the entry point on
    /// `app`, which is handed back for chaining.
    ///
    /// Only the first context ever passed is kept. Later calls build nothing
    /// new and mount the entry point only on hosts that don't have it yet.
    pub fn initialize<A: HostApp>(&self, app: A, context: Arc<C>) -> Result<A, SetupError> {
        let host = app.host_id().ok_or(SetupError::MissingHostId)?;

        let captured = self.inner.context.get_or_init(|| Arc::clone(&context));
        if !Arc::ptr_eq(captured, &context) {
            tracing::debug!(host = %host, "Context already captured, ignoring the new one");
        }

        {
            let _guard = self
                .inner
                .initial_build
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if self.inner.slot.is_empty() {
                let version = self.build_and_install().map_err(SetupError::InitialBuild)?;
                metrics::record_reload(ReloadOutcome::Initial, Some(version));
                tracing::info!(version, "Router initialized");
            }
        }

        if !self.inner.mounted.insert(host) {
            tracing::debug!(host = %host, "Entry point already mounted");
            return Ok(app);
        }

        tracing::debug!(host = %host, "Mounting entry point");
        Ok(app.mount(self.entry_point()))
    }

    /// Replace the factory with one from a newer module version. Takes effect
    /// on the next rebuild.
    pub fn replace_factory(&self, factory: impl RouterFactory<C>) {
        self.inner
            .factory
            .store(Arc::new(Factory(Box::new(factory))));
    }

    /// Rebuild on the next scheduler turn.
    ///
    /// Every call spawns its own rebuild; when several are pending the one
    /// that installs last decides the active router.
    pub fn schedule_rebuild(&self) -> JoinHandle<Result<u64, RebuildError>> {
        let this = self.clone();
        self.inner.runtime.spawn(async move {
            tokio::task::yield_now().await;
            this.rebuild_now()
        })
    }

    /// Rebuild synchronously. On failure the previous router stays installed.
    pub fn rebuild_now(&self) -> Result<u64, RebuildError> {
        match self.build_and_install() {
            Ok(version) => {
                self.inner.applied.fetch_add(1, Ordering::Relaxed);
                metrics::record_reload(ReloadOutcome::Applied, Some(version));
                tracing::info!(version, "Router swapped");
                Ok(version)
            }
            Err(RebuildError::Uninitialized) => {
                tracing::debug!("Reload requested before initialization, ignoring");
                Err(RebuildError::Uninitialized)
            }
            Err(e) => {
                self.inner.failed.fetch_add(1, Ordering::Relaxed);
                metrics::record_reload(ReloadOutcome::Failed, None);
                tracing::warn!(
                    error = %e,
                    active_version = ?self.version(),
                    "Router rebuild failed, keeping previous router"
                );
                Err(e)
            }
        }
    }

    /// Subscribe to `trigger`.
    ///
    /// Accepted replacements always rebuild. An `Apply` status rebuilds only
    /// if the trigger was idle when we subscribed. Disposal never rebuilds.
    pub fn listen(&self, trigger: &dyn ReloadTrigger) {
        let watch_status = trigger.status() == ReloadStatus::Idle;
        let this = self.clone();
        trigger.subscribe(Arc::new(move |event: ReloadEvent| {
            this.on_event(event, watch_status)
        }));
    }

    fn on_event(&self, event: ReloadEvent, watch_status: bool) {
        match event {
            ReloadEvent::Accepted => {
                tracing::debug!("Module replacement accepted, scheduling rebuild");
                let _ = self.schedule_rebuild();
            }
            ReloadEvent::Status(ReloadStatus::Apply) if watch_status => {
                tracing::debug!("Reload status apply, scheduling rebuild");
                let _ = self.schedule_rebuild();
            }
            ReloadEvent::Status(status) => {
                tracing::trace!(?status, "Reload status changed");
            }
            ReloadEvent::Disposed => {
                tracing::debug!("Module disposed, keeping current router");
            }
        }
    }

    fn build_and_install(&self) -> Result<u64, RebuildError> {
        let context = self
            .inner
            .context
            .get()
            .ok_or(RebuildError::Uninitialized)?;
        let factory = self.inner.factory.load_full();

        let built = panic::catch_unwind(AssertUnwindSafe(|| factory.0.build(entry::shell(), context)));
        let router = match built {
            Ok(Ok(router)) => entry::seal(router),
            Ok(Err(e)) => return Err(RebuildError::Factory(e)),
            Err(payload) => return Err(RebuildError::Panicked(panic_message(payload.as_ref()))),
        };

        Ok(self.inner.slot.install(router))
    }

    /// `Active` once the first router is installed.
    pub fn state(&self) -> AdapterState {
        if self.inner.slot.is_empty() {
            AdapterState::Uninitialized
        } else {
            AdapterState::Active
        }
    }

    /// Version of the active router, `None` before initialization.
    pub fn version(&self) -> Option<u64> {
        self.inner.slot.version()
    }

    /// The captured context, if `initialize` has run.
    pub fn context(&self) -> Option<Arc<C>> {
        self.inner.context.get().cloned()
    }

    /// Applied and failed reload counts so far.
    pub fn stats(&self) -> ReloadStats {
        ReloadStats {
            applied: self.inner.applied.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
