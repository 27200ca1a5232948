//! Adaptive WebP image server library.

pub mod config;
pub mod http;
pub mod imaging;
pub mod lifecycle;
pub mod negotiation;
pub mod observability;
pub mod routing;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
