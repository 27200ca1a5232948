//! Configuration watcher for hot reload.
//!
//! Watches the TOML file and the env directory. Any modify/create event
//! re-runs the loader; successfully loaded configs are sent to the reloader,
//! failures are logged and the current configuration stays in effect.

use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigSources};
use crate::config::schema::ServerConfig;

/// A watcher over every configuration source.
pub struct ConfigWatcher {
    sources: ConfigSources,
    update_tx: mpsc::UnboundedSender<ServerConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(sources: ConfigSources) -> (Self, mpsc::UnboundedReceiver<ServerConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (Self { sources, update_tx }, update_rx)
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let sources = self.sources.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    if !event.paths.iter().any(|p| is_config_path(&sources, p)) {
                        return;
                    }
                    tracing::info!(paths = ?event.paths, "Configuration change detected, reloading");
                    match load_config(&sources) {
                        Ok(config) => {
                            let _ = tx.send(config);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        if let Some(path) = &self.sources.config_file {
            watcher.watch(path, RecursiveMode::NonRecursive)?;
        }
        watcher.watch(&self.sources.env_dir, RecursiveMode::NonRecursive)?;

        tracing::info!(
            config_file = ?self.sources.config_file,
            env_dir = %self.sources.env_dir.display(),
            "Config watcher started"
        );
        Ok(watcher)
    }
}

/// Whether `path` is one of the files the loader reads.
fn is_config_path(sources: &ConfigSources, path: &std::path::Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    // Event paths may be canonicalized, so compare by file name.
    let env_files = sources.env_files();
    sources
        .config_file
        .iter()
        .chain(env_files.iter())
        .any(|candidate| candidate.file_name() == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_is_config_path() {
        let sources = ConfigSources {
            config_file: Some(PathBuf::from("/etc/aw/server.toml")),
            env_dir: PathBuf::from("/etc/aw"),
            app_env: "production".to_string(),
        };
        assert!(is_config_path(&sources, Path::new("/etc/aw/server.toml")));
        assert!(is_config_path(&sources, Path::new("/etc/aw/.env.production.local")));
        assert!(!is_config_path(&sources, Path::new("/etc/aw/.env.staging")));
        assert!(!is_config_path(&sources, Path::new("/etc/aw/notes.txt")));
    }
}
