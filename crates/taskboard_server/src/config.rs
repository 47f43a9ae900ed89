//! Environment-driven server configuration.
//!
//! # Variables
//! - `TASKBOARD_HOST`: bind address (default `127.0.0.1`)
//! - `TASKBOARD_PORT`: bind port (default `8080`)
//! - `TASKBOARD_DB_PATH`: SQLite file; unset means an in-memory database
//! - `TASKBOARD_LOG_LEVEL`: `trace|debug|info|warn|error` (default per build mode)
//! - `TASKBOARD_LOG_DIR`: absolute directory for rolling logs; unset means stderr

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use taskboard_core::default_log_level;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidHost(String),
    InvalidPort(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHost(value) => write!(f, "TASKBOARD_HOST `{value}` is not an IP address"),
            Self::InvalidPort(value) => write!(f, "TASKBOARD_PORT `{value}` is not a valid port"),
        }
    }
}

impl Error for ConfigError {}

impl ServerConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = match read("TASKBOARD_HOST") {
            Some(value) => value
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidHost(value))?,
            None => DEFAULT_HOST
                .parse()
                .map_err(|_| ConfigError::InvalidHost(DEFAULT_HOST.to_string()))?,
        };

        let port = match read("TASKBOARD_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host,
            port,
            database_path: read("TASKBOARD_DB_PATH").map(PathBuf::from),
            log_level: read("TASKBOARD_LOG_LEVEL")
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read("TASKBOARD_LOG_DIR"),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.database_path, None);
        assert_eq!(config.log_dir, None);
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            ("TASKBOARD_HOST", "0.0.0.0"),
            ("TASKBOARD_PORT", "9000"),
            ("TASKBOARD_DB_PATH", "/var/lib/taskboard/db.sqlite3"),
            ("TASKBOARD_LOG_DIR", "  "),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(
            config.database_path,
            Some(PathBuf::from("/var/lib/taskboard/db.sqlite3"))
        );
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            config_from(&[("TASKBOARD_PORT", "70000")]).unwrap_err(),
            ConfigError::InvalidPort("70000".to_string())
        );
        assert!(matches!(
            config_from(&[("TASKBOARD_HOST", "localhost")]).unwrap_err(),
            ConfigError::InvalidHost(_)
        ));
    }
}
