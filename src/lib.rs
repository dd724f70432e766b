//! Hot-swappable axum router for development servers.
//!
//! The `hot` module is the adapter: a stable entry point mounted once on a
//! host app, in front of a router that is rebuilt from a factory whenever a
//! reload trigger fires. The rest of the crate is a development server built
//! on it that serves a TOML route table and reloads it on change.

// Adapter
pub mod hot;
pub mod reload;

// Dev server
pub mod config;
pub mod http;
pub mod routes;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::DevServerConfig;
pub use hot::{App, EntryPoint, HotRouter, RouterFactory};
pub use http::DevServer;
pub use lifecycle::Shutdown;
