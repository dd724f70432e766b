//! Hot router swapping.
//!
//! # Data Flow
//! ```text
//! HotRouter::install(factory)
//!     → HotRouter::initialize(app, context)
//!         → capture context (first caller wins)
//!         → factory(shell, &context) → RouterSlot v1
//!         → mount EntryPoint on the host app (once per HostId)
//!
//! Request
//!     → EntryPoint (stable, registered once)
//!     → RouterSlot::load() → current router
//!     → unmatched? → host's own routes ("next")
//!
//! Reload notification (ReloadTrigger)
//!     → schedule_rebuild() (spawned, yields once)
//!     → factory(fresh shell, &same context)
//!     → Ok: RouterSlot::install (single atomic pointer swap)
//!     → Err / panic: log, keep previous router
//! ```
//!
//! # Design Decisions
//! - The entry point never changes; only the router behind it does
//! - Readers hold their own `Arc` to the router for the whole request
//! - Rebuild failures never reach the request path
//! - No rebuild timeout: a hung factory leaves the old router in place

pub mod app;
pub mod entry;
pub mod error;
pub mod factory;
pub mod host;
pub mod slot;

pub use app::{App, HostApp, HostId};
pub use entry::EntryPoint;
pub use error::{RebuildError, SetupError};
pub use factory::{factory_fn, BoxError, RouterFactory};
pub use host::{AdapterState, HotRouter, ReloadStats};
pub use slot::{Installed, RouterSlot};
