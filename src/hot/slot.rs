//! Storage for the currently installed router.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use axum::Router;

/// A router together with the version it was installed as.
///
/// Both are swapped as one value, so a reader can never pair a router with
/// another build's version.
#[derive(Debug)]
pub struct Installed {
    pub router: Router,
    pub version: u64,
}

/// Holds at most one router; replacement is a single pointer store.
#[derive(Default)]
pub struct RouterSlot {
    current: ArcSwapOption<Installed>,
    last_version: AtomicU64,
}

impl RouterSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current router, kept alive by the returned `Arc` even
    /// if a swap happens meanwhile.
    pub fn load(&self) -> Option<Arc<Installed>> {
        self.current.load_full()
    }

    /// Version of the installed router, if any.
    pub fn version(&self) -> Option<u64> {
        self.current.load().as_ref().map(|installed| installed.version)
    }

    /// True until the first install.
    pub fn is_empty(&self) -> bool {
        self.current.load().is_none()
    }

    /// Install `router` as the next version and return that version.
    pub fn install(&self, router: Router) -> u64 {
        let version = self.last_version.fetch_add(1, Ordering::SeqCst) + 1;
        self.current.store(Some(Arc::new(Installed { router, version })));
        version
    }
}

impl fmt::Debug for RouterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterSlot")
            .field("version", &self.version())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_until_first_install() {
        let slot = RouterSlot::new();
        assert!(slot.is_empty());
        assert!(slot.load().is_none());
        assert_eq!(slot.version(), None);
    }

    #[test]
    fn versions_increase_per_install() {
        let slot = RouterSlot::new();
        assert_eq!(slot.install(Router::new()), 1);
        assert_eq!(slot.install(Router::new()), 2);
        assert_eq!(slot.version(), Some(2));
    }

    #[test]
    fn snapshot_outlives_swap() {
        let slot = RouterSlot::new();
        slot.install(Router::new());
        let held = slot.load().unwrap();

        slot.install(Router::new());

        assert_eq!(held.version, 1);
        assert_eq!(slot.load().unwrap().version, 2);
    }
}
