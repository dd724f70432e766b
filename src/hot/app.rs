//! Host applications the entry point is mounted on.

use std::fmt;

use axum::{routing::MethodRouter, Router};
use uuid::Uuid;

use crate::hot::entry::EntryPoint;

/// Identity of one host application instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(Uuid);

impl HostId {
    /// A fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host-{}", self.0)
    }
}

/// Something the dispatch entry point can be registered on.
pub trait HostApp: Sized {
    /// Identity used to register the entry point at most once per instance.
    /// Hosts returning `None` cannot take a registration.
    fn host_id(&self) -> Option<HostId>;

    /// Register the entry point. Called at most once per `HostId`.
    fn mount(self, entry: EntryPoint) -> Self;
}

/// Host application backed by an axum router.
///
/// The entry point is applied when the app is turned into a router, so it sits
/// in front of every host route regardless of registration order.
#[derive(Debug)]
pub struct App {
    id: HostId,
    router: Router,
    entry: Option<EntryPoint>,
}

impl App {
    /// An empty host app.
    pub fn new() -> Self {
        Self::from_router(Router::new())
    }

    /// Wrap an existing router as a host app with a fresh id.
    pub fn from_router(router: Router) -> Self {
        Self {
            id: HostId::new(),
            router,
            entry: None,
        }
    }

    /// Identity the entry point is registered against.
    pub fn id(&self) -> HostId {
        self.id
    }

    /// Add a host route.
    pub fn route(self, path: &str, method_router: MethodRouter) -> Self {
        self.map_router(|router| router.route(path, method_router))
    }

    /// Apply arbitrary changes to the host router.
    pub fn map_router(mut self, f: impl FnOnce(Router) -> Router) -> Self {
        self.router = f(self.router);
        self
    }

    /// Whether the entry point has been mounted.
    pub fn is_mounted(&self) -> bool {
        self.entry.is_some()
    }

    /// Finish the app, with the entry point in front of every host route.
    pub fn into_router(self) -> Router {
        match self.entry {
            Some(entry) => entry.wrap(self.router),
            None => self.router,
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl HostApp for App {
    fn host_id(&self) -> Option<HostId> {
        Some(self.id)
    }

    fn mount(mut self, entry: EntryPoint) -> Self {
        self.entry = Some(entry);
        self
    }
}
