//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from TOML files; the
//! environment-style keys (`PORT`, `HOSTMAP`, ...) are mapped onto the same
//! structure by the loader.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (address and port).
    pub listener: ListenerConfig,

    /// Image delivery and negotiation settings.
    pub delivery: DeliveryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// TCP port (`PORT`).
    pub port: u16,

    /// IP literal to bind (`LISTEN_HOST`).
    pub listen_host: IpAddr,
}

impl ListenerConfig {
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.listen_host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: 7777,
            listen_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }
}

/// Delivery settings consulted on every request.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Negotiate quality from client hints (`CONTENT_NEGOTIATION`).
    pub content_negotiation: bool,

    /// `max-age` and `s-max-age` of successful responses, in seconds (`MAX_AGE`).
    pub max_age: u64,

    /// `Accept-CH-Lifetime` in seconds (`ACH_LIFETIME`).
    pub ach_lifetime: u64,

    /// Host to docroot map, `host:path;host:path` (`HOSTMAP`).
    pub hostmap: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            content_negotiation: true,
            max_age: 864_000,
            ach_lifetime: 864_000,
            hostmap: String::new(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for producing a response, in seconds. 0 disables it (`REQUEST_TIMEOUT`).
    pub request_secs: u64,
}

impl TimeoutConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_secs > 0).then(|| Duration::from_secs(self.request_secs))
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive).
    pub log_level: String,

    /// Prometheus exporter bind address; metrics are off when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}
