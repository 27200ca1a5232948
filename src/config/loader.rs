//! Configuration loading.
//!
//! # Responsibilities
//! - Layer defaults, the optional TOML file and the env files into one `ServerConfig`
//! - Apply `KEY=value` settings with per-key validation
//!
//! # Design Decisions
//! - A value that fails its key's check is dropped with a warning; the
//!   previous layer's value stays in effect
//! - Unknown keys in env files are ignored
//! - Semantic validation is left to `validate_config` so reloads can reuse it

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::ValidationError;

/// Environment name used when `APP_ENV` is unset.
pub const DEFAULT_APP_ENV: &str = "development";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("env file {}: {source}", path.display())]
    Env {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where configuration comes from.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Optional TOML file.
    pub config_file: Option<PathBuf>,

    /// Directory holding the `.env*` files.
    pub env_dir: PathBuf,

    /// Environment name selecting `.env.<name>` and `.env.<name>.local`.
    pub app_env: String,
}

impl ConfigSources {
    pub fn new(config_file: Option<PathBuf>, env_dir: PathBuf) -> Self {
        let app_env = std::env::var("APP_ENV")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APP_ENV.to_string());
        Self {
            config_file,
            env_dir,
            app_env,
        }
    }

    /// Env files in application order; later files override earlier ones.
    pub fn env_files(&self) -> Vec<PathBuf> {
        [
            ".env.defaults".to_string(),
            ".env".to_string(),
            ".env.local".to_string(),
            format!(".env.{}", self.app_env),
            format!(".env.{}.local", self.app_env),
        ]
        .into_iter()
        .map(|name| self.env_dir.join(name))
        .collect()
    }
}

/// Load configuration from all sources. Not validated.
pub fn load_config(sources: &ConfigSources) -> Result<ServerConfig, ConfigError> {
    let mut config = match &sources.config_file {
        Some(path) => load_toml(path)?,
        None => ServerConfig::default(),
    };

    for path in sources.env_files() {
        if path.is_file() {
            apply_env_file(&mut config, &path)?;
        }
    }

    Ok(config)
}

fn load_toml(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

fn apply_env_file(config: &mut ServerConfig, path: &Path) -> Result<(), ConfigError> {
    let env_error = |source| ConfigError::Env {
        path: path.to_path_buf(),
        source,
    };

    for item in dotenvy::from_path_iter(path).map_err(env_error)? {
        let (key, value) = item.map_err(env_error)?;
        apply_override(config, &key, &value);
    }
    tracing::debug!(path = %path.display(), "Applied env file");
    Ok(())
}

/// Apply one `KEY=value` setting. Returns whether the key is known.
pub fn apply_override(config: &mut ServerConfig, key: &str, value: &str) -> bool {
    let raw = value;
    let value = value.trim();
    let accepted = match key {
        "PORT" => set_parsed(&mut config.listener.port, value, |p: &u16| *p != 0),
        "LISTEN_HOST" => set_parsed(&mut config.listener.listen_host, value, |_: &IpAddr| true),
        "CONTENT_NEGOTIATION" => match parse_flag(value) {
            Some(flag) => {
                config.delivery.content_negotiation = flag;
                true
            }
            None => false,
        },
        "MAX_AGE" => set_parsed(&mut config.delivery.max_age, value, |_: &u64| true),
        "ACH_LIFETIME" => set_parsed(&mut config.delivery.ach_lifetime, value, |_: &u64| true),
        "HOSTMAP" => {
            config.delivery.hostmap = raw.to_string();
            true
        }
        "REQUEST_TIMEOUT" => set_parsed(&mut config.timeouts.request_secs, value, |_: &u64| true),
        "LOG_LEVEL" => {
            if value.is_empty() {
                false
            } else {
                config.observability.log_level = value.to_string();
                true
            }
        }
        "METRICS_ADDRESS" => {
            if value.is_empty() {
                config.observability.metrics_address = None;
                true
            } else if value.parse::<SocketAddr>().is_ok() {
                config.observability.metrics_address = Some(value.to_string());
                true
            } else {
                false
            }
        }
        _ => return false,
    };

    if !accepted {
        tracing::warn!(key = %key, value = %raw, "Ignoring invalid configuration value");
    }
    true
}

fn set_parsed<T, F>(slot: &mut T, value: &str, valid: F) -> bool
where
    T: std::str::FromStr,
    F: Fn(&T) -> bool,
{
    match value.parse::<T>() {
        Ok(parsed) if valid(&parsed) => {
            *slot = parsed;
            true
        }
        _ => false,
    }
}

/// Integers are true when non-zero; words follow the usual on/off spellings.
fn parse_flag(value: &str) -> Option<bool> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(n != 0);
    }
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" => Some(true),
        "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
