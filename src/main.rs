//! hot-router development server.
//!
//! # Architecture Overview
//!
//! ```text
//!   routes.toml ──edit──▶ FileTrigger ─┐
//!   SIGHUP / POST /__dev/reload ───────┼─▶ HotRouter::schedule_rebuild
//!                                      │        │
//!                                      │        ▼
//!                                      │   routes::factory ──▶ RouterSlot (swap)
//!                                      │                           │
//!   Client ──▶ request id ─▶ trace ─▶ timeout ─▶ EntryPoint ◀──────┘
//!                                                  │ unmatched
//!                                                  ▼
//!                                            control routes ─▶ 404
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use hot_router::config::{load_config, validate_config, ConfigError, DevServerConfig, Environment};
use hot_router::lifecycle::{self, Shutdown};
use hot_router::observability;
use hot_router::reload::FileTrigger;
use hot_router::routes::AppContext;
use hot_router::DevServer;

#[derive(Parser)]
#[command(name = "hot-router")]
#[command(about = "Development server with a hot-reloaded route table", long_about = None)]
struct Cli {
    /// Config file (TOML). Defaults apply when omitted.
    #[arg(short, long, env = "HOT_ROUTER_CONFIG")]
    config: Option<PathBuf>,

    /// Route table to serve, overriding the config file.
    #[arg(short, long)]
    routes: Option<PathBuf>,

    /// Directory of static files served behind the routes.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Bind address, overriding the config file.
    #[arg(short, long)]
    bind: Option<String>,

    /// Run in production mode (no file watching, no CORS).
    #[arg(long)]
    production: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let env = Environment::detect(cli.production);

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DevServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(routes) = cli.routes {
        config.reload.routes_file = routes;
    }
    if let Some(dir) = cli.static_dir {
        config.dev.static_dir = Some(dir);
    }
    if env.ci {
        config.observability.json_logs = true;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    observability::init_tracing(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?env.mode,
        ci = env.ci,
        "hot-router starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes_file = %config.reload.routes_file.display(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        observability::init_metrics(addr)?;
    }

    let context = Arc::new(AppContext::new(
        config.reload.routes_file.clone(),
        config.dev.control_prefix.clone(),
        env.mode,
    ));
    let server = DevServer::new(config.clone(), context)?;

    let file_trigger = FileTrigger::from_config(&config);
    let _watcher = if env.watch_enabled(config.reload.enabled) {
        server.hot().listen(&file_trigger);
        Some(file_trigger.start()?)
    } else {
        tracing::info!("File watching disabled");
        None
    };

    let shutdown = Shutdown::new();
    let sighup = lifecycle::spawn_reload_on_sighup(Arc::clone(server.trigger()), shutdown.subscribe());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    lifecycle::shutdown_signal().await;
    shutdown.trigger();

    server_task.await??;
    let _ = sighup.await;

    tracing::info!("Shutdown complete");
    Ok(())
}
