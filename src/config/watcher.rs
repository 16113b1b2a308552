//! Hot reload of the tracker configuration file.
//!
//! # Data Flow
//! ```text
//! notify event (modify/create) → load_config → mpsc → apply_updates → tracker
//! ```
//!
//! Files that fail to parse or validate are logged and skipped; the tracker
//! keeps running on the last good configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::TrackerConfig;
use crate::routing::RelayHealthTracker;

/// Only consulted by polling backends.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Forwards every valid revision of a config file to an update channel.
#[derive(Debug)]
pub struct ConfigWatcher {
    path: PathBuf,
    updates: mpsc::UnboundedSender<TrackerConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its update channel.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<TrackerConfig>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            updates,
        };
        (watcher, rx)
    }

    /// Re-read the file and forward it if it is valid.
    ///
    /// Returns whether an update was sent.
    pub fn reload(&self) -> bool {
        match load_config(&self.path) {
            Ok(config) => self.updates.send(config).is_ok(),
            Err(error) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %error,
                    "Ignoring invalid relay health config; keeping the current one"
                );
                false
            }
        }
    }

    fn handle(&self, event: notify::Result<Event>) {
        match event {
            Ok(event) if triggers_reload(&event.kind) => {
                tracing::info!(path = %self.path.display(), "Relay health config changed");
                self.reload();
            }
            Ok(_) => {}
            Err(error) => tracing::error!(%error, "Config watch failed"),
        }
    }

    /// Start watching on notify's background thread.
    ///
    /// Reloads stop when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let mut watcher = RecommendedWatcher::new(
            move |event: notify::Result<Event>| self.handle(event),
            Config::default().with_poll_interval(POLL_INTERVAL),
        )?;
        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %path.display(), "Watching relay health config");
        Ok(watcher)
    }
}

fn triggers_reload(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}

/// Apply every reloaded configuration to `tracker` until the sender side closes.
pub async fn apply_updates(
    tracker: RelayHealthTracker,
    mut updates: mpsc::UnboundedReceiver<TrackerConfig>,
) {
    while let Some(config) = updates.recv().await {
        if let Err(errors) = tracker.apply_config(config.health) {
            // load_config already validated; this only trips on hand-fed channels
            tracing::error!(?errors, "Rejected health configuration update");
        }
    }
    tracing::debug!("Config update channel closed");
}
