//! Route table application.
//!
//! # Data Flow
//! ```text
//! routes.toml
//!     → table.rs (parse, validate against the reserved prefix)
//!     → mount onto the shell handed in by the hot router
//! ```
//!
//! The file is read again on every build, so editing it and triggering a
//! reload is all it takes to change the served routes. Any read, parse or
//! validation error fails the build and the previous router stays active.

pub mod table;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;

use crate::config::Mode;
use crate::hot::{factory_fn, BoxError, RouterFactory};

pub use table::{mount, CompiledRoute, RouteError, RouteSpec, RouteTable, RouteTableError};

/// Shared context handed to every build of the route table router.
#[derive(Debug)]
pub struct AppContext {
    pub routes_file: PathBuf,
    /// Prefix the dev server keeps for its own endpoints.
    pub reserved_prefix: String,
    pub mode: Mode,
    pub started_at: Instant,
}

impl AppContext {
    /// Context for `routes_file`, stamped with the current instant.
    pub fn new(routes_file: impl Into<PathBuf>, reserved_prefix: impl Into<String>, mode: Mode) -> Self {
        Self {
            routes_file: routes_file.into(),
            reserved_prefix: reserved_prefix.into(),
            mode,
            started_at: Instant::now(),
        }
    }
}

/// Build `shell` plus the routes currently in the context's routes file.
pub fn build(shell: Router, context: &Arc<AppContext>) -> Result<Router, BoxError> {
    let table = RouteTable::load(&context.routes_file)?;
    let routes = table.compile(&context.reserved_prefix)?;
    tracing::debug!(
        routes_file = %context.routes_file.display(),
        routes = routes.len(),
        "Route table loaded"
    );
    Ok(mount(routes, shell))
}

/// The factory the dev server installs.
pub fn factory() -> impl RouterFactory<AppContext> {
    factory_fn(build)
}
