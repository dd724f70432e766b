//! Control endpoints served by the host app.
//!
//! Mounted under the configured control prefix (`/__dev` by default):
//! - `GET  {prefix}/status`: adapter state, versions, reload counters
//! - `POST {prefix}/reload`: schedule a rebuild, answers `202 Accepted`
//! - `GET  {prefix}/health`: liveness

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::config::Mode;
use crate::hot::{AdapterState, HotRouter};
use crate::reload::ManualTrigger;
use crate::routes::AppContext;

#[derive(Clone)]
pub struct ControlState {
    pub hot: HotRouter<AppContext>,
    pub trigger: Arc<ManualTrigger>,
    pub mode: Mode,
}

#[derive(Debug, Serialize)]
pub struct DevStatus {
    pub version: &'static str,
    pub state: AdapterState,
    pub router_version: Option<u64>,
    pub reloads_applied: u64,
    pub reloads_failed: u64,
    pub mode: Mode,
    pub uptime_secs: u64,
}

/// Control router, to be nested under the control prefix.
pub fn routes(state: ControlState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/reload", post(post_reload))
        .route("/health", get(get_health))
        .with_state(state)
}

async fn get_status(State(state): State<ControlState>) -> Json<DevStatus> {
    let stats = state.hot.stats();
    let uptime_secs = state
        .hot
        .context()
        .map(|context| context.started_at.elapsed().as_secs())
        .unwrap_or_default();

    Json(DevStatus {
        version: env!("CARGO_PKG_VERSION"),
        state: state.hot.state(),
        router_version: state.hot.version(),
        reloads_applied: stats.applied,
        reloads_failed: stats.failed,
        mode: state.mode,
        uptime_secs,
    })
}

async fn post_reload(State(state): State<ControlState>) -> (StatusCode, Json<serde_json::Value>) {
    tracing::info!("Reload requested over HTTP");
    state.trigger.accept();
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "scheduled": true,
            "router_version": state.hot.version(),
        })),
    )
}

async fn get_health() -> &'static str {
    "ok"
}
