//! Content negotiation subsystem.
//!
//! # Data Flow
//! ```text
//! Request (query string, headers)
//!     → params.rs (explicit `q` override?)
//!         yes → query values, parse-or-default
//!         no  → hints.rs (ClientHints from headers)
//!               → network.rs (score 0..=100)
//!               → quality.rs (encoder quality)
//!     → params.rs (validate → TransformRequest, or 400)
//! ```
//!
//! # Design Decisions
//! - Pure functions only; no I/O, no shared state
//! - Lookup tables are explicit ordered lists, not maps

pub mod hints;
pub mod network;
pub mod params;
pub mod quality;

pub use hints::{ClientHints, Ect};
pub use params::{InvalidParameters, QueryParams, RequestedParameters, TransformRequest};
