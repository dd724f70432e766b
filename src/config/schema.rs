//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the development server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DevServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route table location and reload behaviour.
    pub reload: ReloadConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Development-only conveniences.
    pub dev: DevConfig,
}

impl DevServerConfig {
    /// Everything the file trigger should watch: the reload paths plus the
    /// static directory, if any.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths = self.reload.watched_paths();
        if let Some(dir) = &self.dev.static_dir {
            if !paths.contains(dir) {
                paths.push(dir.clone());
            }
        }
        paths
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Hot reload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Watch files and rebuild the router when they change.
    pub enabled: bool,

    /// Route table the router is built from.
    pub routes_file: PathBuf,

    /// Paths whose changes trigger a rebuild. Empty means just `routes_file`.
    pub watch_paths: Vec<PathBuf>,

    /// Poll interval for watcher backends that poll, in milliseconds.
    pub poll_interval_ms: u64,
}

impl ReloadConfig {
    /// Paths the file trigger watches for route changes.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        if self.watch_paths.is_empty() {
            vec![self.routes_file.clone()]
        } else {
            self.watch_paths.clone()
        }
    }
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            routes_file: PathBuf::from("routes.toml"),
            watch_paths: Vec::new(),
            poll_interval_ms: 2000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Development conveniences.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevConfig {
    /// Allow any origin (disabled in production mode).
    pub cors: bool,

    /// Path prefix for the server's own status/reload endpoints.
    pub control_prefix: String,

    /// Directory served for requests no route handles. Also watched.
    pub static_dir: Option<PathBuf>,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            cors: true,
            control_prefix: "/__dev".to_string(),
            static_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watched_paths_default_to_routes_file() {
        let config = DevServerConfig::default();
        assert_eq!(config.watched_paths(), vec![PathBuf::from("routes.toml")]);
    }

    #[test]
    fn static_dir_is_watched() {
        let mut config = DevServerConfig::default();
        config.dev.static_dir = Some(PathBuf::from("public"));

        assert_eq!(
            config.watched_paths(),
            vec![PathBuf::from("routes.toml"), PathBuf::from("public")]
        );
    }

    #[test]
    fn static_dir_parses_from_toml() {
        let config: DevServerConfig = toml::from_str("[dev]\nstatic_dir = \"public\"\n").unwrap();
        assert_eq!(config.dev.static_dir, Some(PathBuf::from("public")));
        assert_eq!(config.dev.control_prefix, "/__dev");
    }
}
