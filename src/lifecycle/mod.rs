//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Trigger config reload
//!
//! Reload (reload.rs):
//!     watcher update or SIGHUP → validate → publish snapshot
//! ```
//!
//! # Design Decisions
//! - Startup order lives in `main`: config, logging, snapshot, listener
//! - Ordered shutdown: stop accept, drain, close

pub mod reload;
pub mod shutdown;
pub mod signals;

pub use reload::spawn_reloader;
pub use shutdown::Shutdown;
pub use signals::spawn_signal_handler;
