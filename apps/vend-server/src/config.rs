//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                    | Default              |
//! |-----------------------------|----------------------|
//! | `PORT`                      | `10000`              |
//! | `BIND_ADDR`                 | `0.0.0.0`            |
//! | `DATABASE_PATH`             | `vending_machine.db` |
//! | `DB_MAX_CONNECTIONS`        | `5`                  |
//! | `SEED_DEFAULT_PRODUCTS`     | `true`               |
//! | `TRANSACTION_HISTORY_LIMIT` | `50`                 |
//! | `SESSION_IDLE_TIMEOUT_SECS` | `1800`               |

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use vend_core::DEFAULT_HISTORY_LIMIT;

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// HTTP listen address
    pub bind_addr: IpAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub db_max_connections: u32,

    /// Stock the default catalog when the products table is empty
    pub seed_default_products: bool,

    /// Rows shown in the admin transaction table
    pub transaction_history_limit: i64,

    /// Seconds before an untouched session is dropped
    pub session_idle_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 10000,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            database_path: PathBuf::from("vending_machine.db"),
            db_max_connections: 5,
            seed_default_products: true,
            transaction_history_limit: DEFAULT_HISTORY_LIMIT,
            session_idle_timeout_secs: 30 * 60,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();

        let config = ServerConfig {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            seed_default_products: match lookup("SEED_DEFAULT_PRODUCTS") {
                Some(raw) => parse_bool("SEED_DEFAULT_PRODUCTS", &raw)?,
                None => defaults.seed_default_products,
            },
            transaction_history_limit: parse_or(
                &lookup,
                "TRANSACTION_HISTORY_LIMIT",
                defaults.transaction_history_limit,
            )?,
            session_idle_timeout_secs: parse_or(
                &lookup,
                "SESSION_IDLE_TIMEOUT_SECS",
                defaults.session_idle_timeout_secs,
            )?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if config.transaction_history_limit <= 0 {
            return Err(ConfigError::InvalidValue(
                "TRANSACTION_HISTORY_LIMIT".to_string(),
            ));
        }

        if config.session_idle_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_IDLE_TIMEOUT_SECS".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_secs)
    }

    /// Address the listener binds to.
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address().to_string(), "0.0.0.0:10000");
        assert_eq!(config.transaction_history_limit, 50);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("BIND_ADDR", "127.0.0.1"),
            ("DATABASE_PATH", "/tmp/vend.db"),
            ("SEED_DEFAULT_PRODUCTS", "false"),
            ("TRANSACTION_HISTORY_LIMIT", "10"),
            ("SESSION_IDLE_TIMEOUT_SECS", "60"),
        ])
        .unwrap();

        assert_eq!(config.bind_address().to_string(), "127.0.0.1:8080");
        assert_eq!(config.database_path, PathBuf::from("/tmp/vend.db"));
        assert!(!config.seed_default_products);
        assert_eq!(config.transaction_history_limit, 10);
        assert_eq!(config.session_idle_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("PORT", "http")]),
            Err(ConfigError::InvalidValue(key)) if key == "PORT"
        ));
        assert!(load(&[("SEED_DEFAULT_PRODUCTS", "maybe")]).is_err());
        assert!(load(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("TRANSACTION_HISTORY_LIMIT", "-1")]).is_err());
        assert!(load(&[("SESSION_IDLE_TIMEOUT_SECS", "0")]).is_err());
    }
}
