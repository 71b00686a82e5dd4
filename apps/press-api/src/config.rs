//! Press API configuration module.
//!
//! Configuration is loaded from `PRESS_*` environment variables with
//! fallback to defaults.
//!
//! | Variable                      | Default         |
//! |-------------------------------|-----------------|
//! | `PRESS_HTTP_PORT`             | `8080`          |
//! | `PRESS_DB_PATH`               | `./press.db`    |
//! | `PRESS_DB_MAX_CONNECTIONS`    | `5`             |
//! | `PRESS_UTC_OFFSET`            | `local`         |
//! | `PRESS_ALLOCATION_ATTEMPTS`   | `5`             |
//! | `PRESS_ALLOCATION_TIMEOUT_MS` | `5000`          |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use press_core::order_number::DEFAULT_MAX_ATTEMPTS;
use press_core::ShopZone;
use press_db::{AllocationOptions, DbConfig};

/// Press API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub max_connections: u32,

    /// Zone whose calendar day numbers orders
    pub zone: ShopZone,

    /// Order-number candidates tried per checkout
    pub allocation_attempts: u32,

    /// Upper bound on one order-number allocation
    pub allocation_timeout: Duration,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let utc_offset = lookup("PRESS_UTC_OFFSET").unwrap_or_else(|| "local".to_string());
        let zone = ShopZone::parse(&utc_offset)
            .map_err(|_| ConfigError::InvalidValue("PRESS_UTC_OFFSET".to_string()))?;

        let config = ApiConfig {
            http_port: parse_or(&lookup, "PRESS_HTTP_PORT", 8080)?,

            database_path: lookup("PRESS_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./press.db")),

            max_connections: parse_or(&lookup, "PRESS_DB_MAX_CONNECTIONS", 5)?,

            zone,

            allocation_attempts: parse_or(
                &lookup,
                "PRESS_ALLOCATION_ATTEMPTS",
                DEFAULT_MAX_ATTEMPTS,
            )?,

            allocation_timeout: Duration::from_millis(parse_or(
                &lookup,
                "PRESS_ALLOCATION_TIMEOUT_MS",
                5000,
            )?),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "PRESS_DB_MAX_CONNECTIONS".to_string(),
            ));
        }
        if config.allocation_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "PRESS_ALLOCATION_ATTEMPTS".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }

    pub fn allocation_options(&self) -> AllocationOptions {
        AllocationOptions {
            zone: self.zone,
            max_attempts: self.allocation_attempts,
            timeout: self.allocation_timeout,
            precheck: true,
        }
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

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
