//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, lookup host)
//!     → server.rs dispatch (routing, source stat, 304, parameters)
//!     → imaging adapter (200) or response.rs (304 / error)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::DeliveryError;
pub use server::HttpServer;
