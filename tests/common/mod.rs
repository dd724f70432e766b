//! Shared utilities for integration tests.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use hot_router::config::{DevServerConfig, Mode};
use hot_router::lifecycle::Shutdown;
use hot_router::routes::AppContext;
use hot_router::DevServer;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A dev server running on an ephemeral port over a temporary routes file.
pub struct TestServer {
    pub addr: SocketAddr,
    pub routes_file: PathBuf,
    pub hot: hot_router::HotRouter<AppContext>,
    pub shutdown: Shutdown,
    _dir: TempDir,
}

impl TestServer {
    pub async fn start(routes: &str) -> Self {
        Self::start_with(routes, DevServerConfig::default()).await
    }

    pub async fn start_with(routes: &str, config: DevServerConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let routes_file = dir.path().join("routes.toml");
        fs::write(&routes_file, routes).unwrap();

        let context = Arc::new(AppContext::new(
            &routes_file,
            config.dev.control_prefix.clone(),
            Mode::Development,
        ));
        let server = DevServer::new(config, context).unwrap();
        let hot = server.hot().clone();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self {
            addr,
            routes_file,
            hot,
            shutdown,
            _dir: dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn write_routes(&self, routes: &str) {
        write_routes(&self.routes_file, routes);
    }

    /// Wait until the active router reaches `version`.
    pub async fn wait_for_version(&self, version: u64) {
        for _ in 0..200 {
            if self.hot.version() >= Some(version) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!(
            "router never reached version {version}, still at {:?}",
            self.hot.version()
        );
    }

    /// Wait until the failed reload counter reaches `count`.
    pub async fn wait_for_failures(&self, count: u64) {
        for _ in 0..200 {
            if self.hot.stats().failed >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("reload failure count never reached {count}");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn write_routes(path: &Path, routes: &str) {
    fs::write(path, routes).unwrap();
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// GET `url`, returning status and body.
#[allow(dead_code)]
pub async fn get(url: &str) -> (u16, String) {
    let res = client().get(url).send().await.expect("server unreachable");
    let status = res.status().as_u16();
    (status, res.text().await.unwrap())
}
