//! Configuration reload.
//!
//! # Responsibilities
//! - Consume watcher updates and SIGHUP requests
//! - Validate candidates and publish accepted ones
//!
//! # Design Decisions
//! - A rejected candidate leaves the current snapshot in place
//! - The listener is bound once; a changed `PORT` or `LISTEN_HOST` only
//!   takes effect after a restart

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::{load_config, validate_config, ConfigError, ConfigSources, LiveConfig, ServerConfig};
use crate::observability::metrics;

/// What happened to one reload candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Applied,
    Unchanged,
    LoadFailed,
    Invalid,
}

impl ReloadOutcome {
    fn label(self) -> &'static str {
        match self {
            ReloadOutcome::Applied => "applied",
            ReloadOutcome::Unchanged => "unchanged",
            ReloadOutcome::LoadFailed => "load_failed",
            ReloadOutcome::Invalid => "invalid",
        }
    }
}

/// Spawn the task applying reloads until shutdown.
pub fn spawn_reloader(
    live: Arc<LiveConfig>,
    sources: ConfigSources,
    mut updates: mpsc::UnboundedReceiver<ServerConfig>,
    mut hangups: mpsc::UnboundedReceiver<()>,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let candidate = tokio::select! {
                Some(config) = updates.recv() => Ok(config),
                Some(()) = hangups.recv() => load_config(&sources),
                _ = shutdown.recv() => break,
                else => break,
            };
            apply_reload(&live, candidate);
        }
        tracing::debug!("Reloader stopped");
    })
}

/// Validate and publish one candidate.
pub fn apply_reload(live: &LiveConfig, candidate: Result<ServerConfig, ConfigError>) -> ReloadOutcome {
    let outcome = evaluate(live, candidate);
    metrics::record_reload(outcome.label());
    outcome
}

fn evaluate(live: &LiveConfig, candidate: Result<ServerConfig, ConfigError>) -> ReloadOutcome {
    let config = match candidate {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration, keeping current configuration");
            return ReloadOutcome::LoadFailed;
        }
    };

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::warn!(error = %error, "Rejected configuration");
        }
        return ReloadOutcome::Invalid;
    }

    let current = live.load();
    if current.config == config {
        tracing::debug!("Configuration unchanged");
        return ReloadOutcome::Unchanged;
    }

    if current.config.listener != config.listener {
        tracing::warn!(
            current = %current.config.listener.bind_address(),
            requested = %config.listener.bind_address(),
            "Listener address changed; restart required to rebind"
        );
    }

    live.publish(config);
    tracing::info!("Configuration reloaded");
    ReloadOutcome::Applied
}
