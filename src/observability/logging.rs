//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Pick the log filter from `RUST_LOG` or the configured level
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - `RUST_LOG` wins over configuration so operators can override per run

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor the config level parses.
const FALLBACK_FILTER: &str = "adaptive_webp=info,tower_http=info";

/// Build the filter for `level`.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive_for(level)))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// A bare level such as `debug` applies to this crate and tower_http only;
/// anything else is used as a full directive.
fn directive_for(level: &str) -> String {
    let level = level.trim();
    match level.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {
            format!("adaptive_webp={level},tower_http={level}")
        }
        _ => level.to_string(),
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
