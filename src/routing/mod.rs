//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! HOSTMAP string ("host:path;...")
//!     → router.rs (parse into ordered RoutingTable)
//!     → matcher.rs (classify each key: exact / suffix / wildcard)
//!     → frozen inside the config snapshot
//!
//! Per request:
//!     Host header → matcher::normalize_host (drop port, lowercase)
//!     → RoutingTable::resolve
//!     → Some(docroot) or None (404)
//! ```
//!
//! # Design Decisions
//! - Table built once per config snapshot, immutable at runtime
//! - Deterministic: definition order decides between suffix patterns
//! - No regex in the hot path

pub mod matcher;
pub mod router;

pub use matcher::{normalize_host, HostPattern};
pub use router::RoutingTable;
