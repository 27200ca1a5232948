//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file
//!     → .env.defaults, .env, .env.local, .env.<APP_ENV>, .env.<APP_ENV>.local
//!     → loader.rs (layer & apply keys)
//!     → validation.rs (semantic checks)
//!     → live.rs (Snapshot { config, routes }, atomically published)
//!
//! On reload (file change or SIGHUP):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → LiveConfig::publish swaps the snapshot
//!     → subsequent requests observe it
//! ```
//!
//! # Design Decisions
//! - A snapshot is immutable once published; changes require full reload
//! - All fields have defaults to allow an empty configuration
//! - Validation separates syntactic (serde, loader) from semantic checks

pub mod live;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use live::{LiveConfig, Snapshot};
pub use loader::{load_config, ConfigError, ConfigSources};
pub use schema::{DeliveryConfig, ListenerConfig, ServerConfig};
pub use validation::{validate_config, ValidationError};
