//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks, all errors at once)
//!     → DevServerConfig (validated, immutable)
//!
//! process environment / CLI flags
//!     → env.rs (mode, CI, watch override)
//! ```
//!
//! # Design Decisions
//! - Every field has a default so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks
//! - Config is read once at startup; only the route table hot-reloads

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{Environment, Mode};
pub use loader::{load_config, ConfigError};
pub use schema::DevServerConfig;
pub use schema::{DevConfig, ListenerConfig, ObservabilityConfig, ReloadConfig, TimeoutConfig};
pub use validation::{validate_config, ValidationError};
