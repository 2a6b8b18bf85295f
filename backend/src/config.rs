//! Configuration management for the Estoque platform
//!
//! Sources are layered, later ones winning: built-in defaults, then
//! `config/{environment}.toml` if it exists, then `ESTOQUE__SECTION__KEY`
//! environment variables.

use ::config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Settings for the whole server process
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// `development` enables startup migrations
    pub environment: String,

    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// `postgres://` connection string
    pub url: String,

    pub max_connections: u32,
    pub min_connections: u32,

    /// Seconds to wait for a free connection
    pub acquire_timeout_secs: u64,

    /// Run embedded migrations at startup regardless of environment
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// HS256 signing key
    pub secret: String,

    /// Token lifetime in seconds
    pub access_token_expiry: i64,
}

impl Config {
    /// Read the layered configuration for `ESTOQUE_ENVIRONMENT` (default `development`)
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("ESTOQUE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Self::builder(&environment)?
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::with_prefix("ESTOQUE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn builder(
        environment: &str,
    ) -> Result<::config::ConfigBuilder<::config::builder::DefaultState>, ConfigError> {
        ::config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.run_migrations", false)?
            .set_default("jwt.access_token_expiry", 86_400)
    }

    /// Whether embedded migrations should run on startup
    pub fn should_run_migrations(&self) -> bool {
        self.environment == "development" || self.database.run_migrations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_everything_but_secrets() {
        let config: Config = Config::builder("production")
            .unwrap()
            .set_override("database.url", "postgres://localhost/estoque")
            .unwrap()
            .set_override("jwt.secret", "test-secret")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.environment, "production");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.access_token_expiry, 86_400);
        assert!(!config.should_run_migrations());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let result = Config::builder("production")
            .unwrap()
            .set_override("jwt.secret", "test-secret")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<Config>();

        assert!(result.is_err());
    }
}
