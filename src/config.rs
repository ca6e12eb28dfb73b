//! Service configuration, loaded from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `ORDER_API_HOST` | `0.0.0.0` |
//! | `ORDER_API_PORT` | `3000` |
//! | `ORDER_API_JSON_LIMIT` | `262144` bytes |
//! | `ORDER_STORE` | `memory` (`memory` \| `postgres` \| `scylla`) |
//! | `DATABASE_URL` | required when `ORDER_STORE=postgres` |
//! | `DATABASE_MAX_CONNECTIONS` | `5` |
//! | `SCYLLA_NODES` | `127.0.0.1:9042` (comma separated) |
//! | `SCYLLA_KEYSPACE` | `orders_ks` |
//! | `STORE_CONNECT_MAX_ATTEMPTS` | `5` |
//! | `STORE_CONNECT_INITIAL_DELAY_MS` | `200` |

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::utils::RetryConfig;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },

    #[error("Unknown order store backend: {0:?}")]
    InvalidStoreBackend(String),
}

/// Which `OrderStore` implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
    Scylla,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "memory" | "in_memory" | "inmemory" => Ok(Self::Memory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "scylla" | "scylladb" => Ok(Self::Scylla),
            _ => Err(ConfigError::InvalidStoreBackend(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Maximum accepted JSON body size in bytes
    pub json_limit: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            json_limit: 256 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub scylla_nodes: Vec<String>,
    pub scylla_keyspace: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            database_url: None,
            max_connections: 5,
            scylla_nodes: vec!["127.0.0.1:9042".to_string()],
            scylla_keyspace: "orders_ks".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub connect_retry: RetryConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_defaults = ServerSettings::default();
        let store_defaults = StoreSettings::default();
        let retry_defaults = RetryConfig::default();

        let server = ServerSettings {
            host: lookup("ORDER_API_HOST").unwrap_or(server_defaults.host),
            port: parse_or("ORDER_API_PORT", &lookup, server_defaults.port)?,
            json_limit: parse_or("ORDER_API_JSON_LIMIT", &lookup, server_defaults.json_limit)?,
        };

        let backend = match lookup("ORDER_STORE") {
            Some(raw) => raw.parse()?,
            None => store_defaults.backend,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
        }

        let scylla_nodes = match lookup("SCYLLA_NODES") {
            Some(raw) => {
                let nodes: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|node| !node.is_empty())
                    .map(String::from)
                    .collect();
                if nodes.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        name: "SCYLLA_NODES".to_string(),
                        value: raw,
                    });
                }
                nodes
            }
            None => store_defaults.scylla_nodes,
        };

        let store = StoreSettings {
            backend,
            database_url,
            max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                &lookup,
                store_defaults.max_connections,
            )?,
            scylla_nodes,
            scylla_keyspace: lookup("SCYLLA_KEYSPACE").unwrap_or(store_defaults.scylla_keyspace),
        };

        let connect_retry = RetryConfig {
            max_attempts: parse_or(
                "STORE_CONNECT_MAX_ATTEMPTS",
                &lookup,
                retry_defaults.max_attempts,
            )?,
            initial_delay: Duration::from_millis(parse_or(
                "STORE_CONNECT_INITIAL_DELAY_MS",
                &lookup,
                retry_defaults.initial_delay.as_millis() as u64,
            )?),
            ..retry_defaults
        };

        Ok(Self {
            server,
            store,
            connect_retry,
        })
    }
}

fn parse_or<T, F>(name: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ORDER_API_PORT", "8080"),
            ("ORDER_STORE", "Scylla"),
            ("SCYLLA_NODES", "10.0.0.1:9042, 10.0.0.2:9042"),
            ("STORE_CONNECT_INITIAL_DELAY_MS", "50"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.backend, StoreBackend::Scylla);
        assert_eq!(config.store.scylla_nodes, vec!["10.0.0.1:9042", "10.0.0.2:9042"]);
        assert_eq!(config.connect_retry.initial_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_postgres_requires_database_url() {
        assert_eq!(
            config_from(&[("ORDER_STORE", "postgres")]),
            Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
        );

        let config = config_from(&[
            ("ORDER_STORE", "postgres"),
            ("DATABASE_URL", "postgres://localhost/orders"),
        ])
        .unwrap();
        assert_eq!(config.store.database_url.as_deref(), Some("postgres://localhost/orders"));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            config_from(&[("ORDER_API_PORT", "http")]),
            Err(ConfigError::InvalidValue {
                name: "ORDER_API_PORT".to_string(),
                value: "http".to_string(),
            })
        );
        assert_eq!(
            config_from(&[("ORDER_STORE", "mongo")]),
            Err(ConfigError::InvalidStoreBackend("mongo".to_string()))
        );
        assert!(config_from(&[("SCYLLA_NODES", " , ")]).is_err());
    }
}
