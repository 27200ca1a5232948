//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and the loader handle syntax)
//! - Check hostmap roots and the metrics address
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is published, at startup and on every reload

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::routing::RoutingTable;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener port must be non-zero")]
    ZeroPort,

    #[error("hostmap root for '{host}' is not an absolute path: {root}")]
    RelativeRoot { host: String, root: String },

    #[error("hostmap root for '{host}' is empty")]
    EmptyRoot { host: String },

    #[error("metrics address is not a socket address: {0}")]
    MetricsAddress(String),
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let routes = RoutingTable::parse(&config.delivery.hostmap);
    for (pattern, root) in routes.entries() {
        let host = pattern.key().to_string();
        if root.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyRoot { host });
        } else if !Path::new(root).is_absolute() {
            errors.push(ValidationError::RelativeRoot {
                host,
                root: root.display().to_string(),
            });
        }
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::MetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServerConfig::default();
        config.listener.port = 0;
        config.delivery.hostmap = "a.test:relative/dir;b.test:".to_string();
        config.observability.metrics_address = Some("bogus".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroPort,
                ValidationError::RelativeRoot {
                    host: "a.test".to_string(),
                    root: "relative/dir".to_string(),
                },
                ValidationError::EmptyRoot {
                    host: "b.test".to_string()
                },
                ValidationError::MetricsAddress("bogus".to_string()),
            ]
        );
    }

    #[test]
    fn test_absolute_roots_pass() {
        let mut config = ServerConfig::default();
        config.delivery.hostmap = "a.test:/srv/a;.cdn.test:/srv/cdn".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
