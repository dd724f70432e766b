//! Metrics collection and exposition.
//!
//! # Metrics
//! - `hot_router_reloads_total` (counter): router builds by `outcome`
//!   (`initial`, `applied`, `failed`)
//! - `hot_router_version` (gauge): version of the active router
//!
//! Without `init_metrics` the macros hit the no-op recorder.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const RELOADS_TOTAL: &str = "hot_router_reloads_total";
pub const ROUTER_VERSION: &str = "hot_router_version";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Initial,
    Applied,
    Failed,
}

impl ReloadOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ReloadOutcome::Initial => "initial",
            ReloadOutcome::Applied => "applied",
            ReloadOutcome::Failed => "failed",
        }
    }
}

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Count one router build and, when it installed a router, move the gauge.
pub fn record_reload(outcome: ReloadOutcome, version: Option<u64>) {
    metrics::counter!(RELOADS_TOTAL, "outcome" => outcome.as_str()).increment(1);
    if let Some(version) = version {
        metrics::gauge!(ROUTER_VERSION).set(version as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_labels() {
        assert_eq!(ReloadOutcome::Initial.as_str(), "initial");
        assert_eq!(ReloadOutcome::Applied.as_str(), "applied");
        assert_eq!(ReloadOutcome::Failed.as_str(), "failed");
    }

    #[test]
    fn recording_without_a_recorder_is_harmless() {
        record_reload(ReloadOutcome::Applied, Some(3));
        record_reload(ReloadOutcome::Failed, None);
    }
}
