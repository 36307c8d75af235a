//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_JUDGE_API_BASE_URL, DEFAULT_JUDGE_FETCH_COUNT,
    DEFAULT_JUDGE_TIMEOUT_SECONDS, DEFAULT_POLL_BACKOFF_SECONDS, DEFAULT_POLL_INTERVAL_SECONDS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_SWEEP_INTERVAL_SECONDS,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub judge: JudgeConfig,
    pub monitor: MonitorConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// JWT authentication configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

/// External judge feed configuration
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Base URL of the judge's HTTP API
    pub api_base_url: String,
    /// Request timeout against the feed
    pub request_timeout: Duration,
    /// Submissions fetched per poll (the feed's page size)
    pub fetch_count: u32,
}

/// Contest monitoring configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between contest status sweeps
    pub sweep_interval: Duration,
    /// Interval between submission polls for an ongoing contest
    pub poll_interval: Duration,
    /// Backoff after a failed submission poll
    pub poll_backoff: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            judge: JudgeConfig::from_env()?,
            monitor: MonitorConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DEFAULT_DATABASE_MAX_CONNECTIONS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,
        })
    }
}

impl RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        })
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET".to_string()))?,
        })
    }
}

impl JudgeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_seconds: u64 = env::var("JUDGE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| DEFAULT_JUDGE_TIMEOUT_SECONDS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("JUDGE_TIMEOUT_SECONDS".to_string()))?;

        Ok(Self {
            api_base_url: env::var("JUDGE_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_JUDGE_API_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(timeout_seconds),
            fetch_count: env::var("JUDGE_FETCH_COUNT")
                .unwrap_or_else(|_| DEFAULT_JUDGE_FETCH_COUNT.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JUDGE_FETCH_COUNT".to_string()))?,
        })
    }
}

impl MonitorConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let sweep_seconds: u64 = env::var("SWEEP_INTERVAL_SECONDS")
            .unwrap_or_else(|_| DEFAULT_SWEEP_INTERVAL_SECONDS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SWEEP_INTERVAL_SECONDS".to_string()))?;
        let poll_seconds: u64 = env::var("POLL_INTERVAL_SECONDS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_SECONDS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("POLL_INTERVAL_SECONDS".to_string()))?;
        let backoff_seconds: u64 = env::var("POLL_BACKOFF_SECONDS")
            .unwrap_or_else(|_| DEFAULT_POLL_BACKOFF_SECONDS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("POLL_BACKOFF_SECONDS".to_string()))?;

        Ok(Self {
            sweep_interval: Duration::from_secs(sweep_seconds),
            poll_interval: Duration::from_secs(poll_seconds),
            poll_backoff: Duration::from_secs(backoff_seconds),
        })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        // Test that defaults are applied when env vars are not set
        let server = ServerConfig {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            rust_log: "info".to_string(),
        };
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
    }
}
