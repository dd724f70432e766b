//! File watcher trigger for hot reload.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;

use crate::config::DevServerConfig;
use crate::reload::trigger::{Listeners, ReloadEvent, ReloadListener, ReloadTrigger};

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("failed to create file watcher: {0}")]
    Init(#[source] notify::Error),

    #[error("failed to watch {}: {source}", .path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// What a configured path turns into once watched.
///
/// Files are watched through their parent directory so editors that save by
/// replacing the file don't silently end the watch.
#[derive(Debug, Clone, PartialEq, Eq)]
enum WatchTarget {
    Dir(PathBuf),
    File { dir: PathBuf, name: OsString },
}

impl WatchTarget {
    fn new(path: &Path) -> Self {
        if path.is_dir() {
            return WatchTarget::Dir(canonical(path));
        }
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        WatchTarget::File {
            dir: canonical(&dir),
            name: path.file_name().map(ToOwned::to_owned).unwrap_or_default(),
        }
    }

    fn root(&self) -> (&Path, RecursiveMode) {
        match self {
            WatchTarget::Dir(dir) => (dir, RecursiveMode::Recursive),
            WatchTarget::File { dir, .. } => (dir, RecursiveMode::NonRecursive),
        }
    }

    fn matches(&self, changed: &Path) -> bool {
        match self {
            WatchTarget::Dir(dir) => changed.starts_with(dir),
            WatchTarget::File { name, .. } => changed.file_name() == Some(name.as_os_str()),
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Fires `Accepted` whenever one of the watched paths changes.
#[derive(Debug)]
pub struct FileTrigger {
    targets: Vec<WatchTarget>,
    poll_interval: Duration,
    listeners: Listeners,
}

impl FileTrigger {
    /// Watch `paths`; directories recursively, files by name.
    pub fn new(paths: &[PathBuf], poll_interval: Duration) -> Self {
        Self {
            targets: paths.iter().map(|path| WatchTarget::new(path)).collect(),
            poll_interval,
            listeners: Listeners::default(),
        }
    }

    /// Watch the routes file (or configured watch paths) and the static
    /// directory.
    pub fn from_config(config: &DevServerConfig) -> Self {
        Self::new(
            &config.watched_paths(),
            Duration::from_millis(config.reload.poll_interval_ms),
        )
    }

    /// Start watching. Events stop once the returned watcher is dropped.
    pub fn start(&self) -> Result<RecommendedWatcher, TriggerError> {
        let targets = self.targets.clone();
        let listeners = self.listeners.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify()
                        || event.kind.is_create()
                        || event.kind.is_remove();
                    if relevant && is_watched(&targets, &event.paths) {
                        tracing::info!(paths = ?event.paths, "Source change detected, reloading router");
                        listeners.emit(ReloadEvent::Accepted);
                    }
                }
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )
        .map_err(TriggerError::Init)?;

        let mut roots = HashSet::new();
        for target in &self.targets {
            let (root, mode) = target.root();
            if !roots.insert(root.to_path_buf()) {
                continue;
            }
            watcher
                .watch(root, mode)
                .map_err(|source| TriggerError::Watch {
                    path: root.to_path_buf(),
                    source,
                })?;
        }

        tracing::info!(targets = ?self.targets, "File trigger started");
        Ok(watcher)
    }
}

fn is_watched(targets: &[WatchTarget], changed: &[PathBuf]) -> bool {
    changed
        .iter()
        .any(|path| targets.iter().any(|target| target.matches(path)))
}

impl ReloadTrigger for FileTrigger {
    fn subscribe(&self, listener: ReloadListener) {
        self.listeners.push(listener);
    }
}
