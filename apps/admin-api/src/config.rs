//! Admin API configuration.
//!
//! Hierarchical loading:
//! 1. Default values in code
//! 2. Optional TOML file (`config/{environment}.toml`)
//! 3. Environment variable overrides with `TARIFA_` prefix
//!    (e.g. `TARIFA_SERVER__PORT=9090`)

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Current environment (development, production)
    pub environment: String,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

impl ApiConfig {
    /// Load configuration from files and environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("TARIFA_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8080)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.path", "./tarifa.db")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::with_prefix("TARIFA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
