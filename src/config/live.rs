//! Live configuration snapshot.
//!
//! # Responsibilities
//! - Hold the current `ServerConfig` together with its parsed routing table
//! - Publish replacements atomically
//!
//! # Design Decisions
//! - Readers take one `Arc<Snapshot>` per request and never observe a
//!   half-applied reload
//! - The hostmap is parsed once per publish, not per request

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::ServerConfig;
use crate::routing::RoutingTable;

/// One immutable generation of configuration.
#[derive(Debug)]
pub struct Snapshot {
    pub config: ServerConfig,
    pub routes: RoutingTable,
}

impl Snapshot {
    pub fn new(config: ServerConfig) -> Self {
        let routes = RoutingTable::parse(&config.delivery.hostmap);
        Self { config, routes }
    }
}

pub struct LiveConfig {
    current: ArcSwap<Snapshot>,
}

impl LiveConfig {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::new(config)),
        }
    }

    /// The snapshot in effect right now.
    pub fn load(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Replace the snapshot. Returns the previous one.
    pub fn publish(&self, config: ServerConfig) -> Arc<Snapshot> {
        let next = Snapshot::new(config);
        tracing::info!(routes = next.routes.len(), "Publishing configuration snapshot");
        self.current.swap(Arc::new(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config_with_hostmap(hostmap: &str) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.delivery.hostmap = hostmap.to_string();
        config
    }

    #[test]
    fn test_publish_swaps_routes() {
        let live = LiveConfig::new(config_with_hostmap("a.test:/srv/a"));
        let before = live.load();
        assert_eq!(before.routes.resolve("a.test"), Some(Path::new("/srv/a")));

        let previous = live.publish(config_with_hostmap("a.test:/srv/b"));
        assert!(Arc::ptr_eq(&previous, &before));

        // A held snapshot is unaffected by the publish.
        assert_eq!(before.routes.resolve("a.test"), Some(Path::new("/srv/a")));
        assert_eq!(live.load().routes.resolve("a.test"), Some(Path::new("/srv/b")));
    }
}
