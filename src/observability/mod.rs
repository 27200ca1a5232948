//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape), when configured
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) is attached to every dispatch log line
//! - Metrics are cheap and recorded unconditionally

pub mod logging;
pub mod metrics;
