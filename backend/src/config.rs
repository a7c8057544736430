//! Configuration for the work location planner.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Longest accepted session lifetime (one year).
pub const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite path, optionally prefixed with `sqlite:`. `:memory:` is accepted.
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Fallback filter when RUST_LOG is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Login session settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// HMAC secret used to sign session tokens.
    pub secret: String,
    /// Session lifetime in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
    /// Mark the session cookie `Secure` (requires HTTPS in front of the server).
    #[serde(default)]
    pub secure_cookie: bool,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_database_url() -> String {
    "sqlite:./data/worklocation.db".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_ttl_hours() -> u64 {
    12
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (WORKLOC__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("database.url", default_database_url())?
            .set_default("logging.level", default_log_level())?
            .set_default("session.ttl_hours", default_ttl_hours() as i64)?
            .set_default("session.secure_cookie", false)?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("WORKLOC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.secret.is_empty() {
            return Err(ConfigError::Message("session.secret must not be empty".to_string()));
        }
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session.ttl_hours) {
            return Err(ConfigError::Message(format!(
                "session.ttl_hours must be between 1 and {}",
                MAX_SESSION_TTL_HOURS
            )));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
