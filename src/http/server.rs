//! Development server setup.
//!
//! # Responsibilities
//! - Install the hot router with the route table factory
//! - Build the host app (control endpoints, static files) and mount the entry
//!   point on it
//! - Wire up middleware (request ID, tracing, timeout, CORS)
//! - Serve until the shutdown broadcast fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{DevServerConfig, Mode};
use crate::hot::{App, HotRouter, RouterFactory, SetupError};
use crate::http::control::{self, ControlState};
use crate::reload::ManualTrigger;
use crate::routes::{self, AppContext};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Development server with a hot-swappable route table.
pub struct DevServer {
    router: Router,
    config: DevServerConfig,
    hot: HotRouter<AppContext>,
    trigger: Arc<ManualTrigger>,
}

impl DevServer {
    /// Create a server serving the route table named by `context`.
    ///
    /// Must be called from within a Tokio runtime. Fails if the routes file
    /// can't be built on the first try.
    pub fn new(config: DevServerConfig, context: Arc<AppContext>) -> Result<Self, ServerError> {
        Self::with_factory(config, context, routes::factory())
    }

    /// Like `new`, with a custom router factory.
    pub fn with_factory(
        config: DevServerConfig,
        context: Arc<AppContext>,
        factory: impl RouterFactory<AppContext>,
    ) -> Result<Self, ServerError> {
        let mode = context.mode;
        let hot = HotRouter::install(factory)?;
        let trigger = Arc::new(ManualTrigger::new());
        hot.listen(trigger.as_ref());

        let state = ControlState {
            hot: hot.clone(),
            trigger: Arc::clone(&trigger),
            mode,
        };
        let prefix = config.dev.control_prefix.clone();
        let static_dir = config.dev.static_dir.clone();
        let app = App::new().map_router(|router| {
            let router = router.nest(&prefix, control::routes(state));
            match static_dir {
                Some(dir) => {
                    tracing::info!(dir = %dir.display(), "Serving static files");
                    router.fallback_service(ServeDir::new(dir))
                }
                None => router,
            }
        });
        let app = hot.initialize(app, context)?;

        let router = Self::build_router(&config, mode, app.into_router());

        Ok(Self {
            router,
            config,
            hot,
            trigger,
        })
    }

    /// Apply the middleware stack around the finished host router.
    fn build_router(config: &DevServerConfig, mode: Mode, app: Router) -> Router {
        #[allow(deprecated)]
        let timeout = TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs));

        let router = app.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(timeout),
        );

        if config.dev.cors && mode == Mode::Development {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// The hot router behind the entry point.
    pub fn hot(&self) -> &HotRouter<AppContext> {
        &self.hot
    }

    /// Trigger behind `POST {prefix}/reload`; other in-process sources
    /// (SIGHUP) fire it too.
    pub fn trigger(&self) -> &Arc<ManualTrigger> {
        &self.trigger
    }

    /// The configuration the server was built with.
    pub fn config(&self) -> &DevServerConfig {
        &self.config
    }

    /// The fully layered router, for serving it some other way.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let local_addr = listener.local_addr()?;
        tracing::info!(
            address = %local_addr,
            router_version = ?self.hot.version(),
            control_prefix = %self.config.dev.control_prefix,
            "Dev server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Dev server stopped");
        Ok(())
    }
}
