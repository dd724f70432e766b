//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Adapter, triggers, dev server produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (reload counters, router version gauge)
//!
//! Consumers:
//!     → stdout (pretty in development, JSON when configured)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request span
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
pub use metrics::{init_metrics, record_reload, ReloadOutcome};
