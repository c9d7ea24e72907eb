//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub log_level: Level,
    pub cors_origin: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub request_timeout: Duration,
    pub db_max_connections: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = required(&lookup, "DATABASE_URL")?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Auth Settings ---
        let jwt_secret = required(&lookup, "JWT_SECRET")?;
        let jwt_ttl_hours: u64 = parsed(&lookup, "JWT_TTL_HOURS", 24)?;
        let jwt_ttl_secs = jwt_ttl_hours.checked_mul(60 * 60).ok_or_else(|| {
            ConfigError::InvalidValue(
                "JWT_TTL_HOURS".to_string(),
                format!("{} hours does not fit in a duration", jwt_ttl_hours),
            )
        })?;

        // --- Load HTTP Surface Settings ---
        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());
        let upload_dir = lookup("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("uploads"));
        let max_upload_bytes = parsed(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        let request_timeout_secs: u64 = parsed(&lookup, "REQUEST_TIMEOUT_SECS", 15)?;
        let db_max_connections = parsed(&lookup, "DB_MAX_CONNECTIONS", 10)?;

        Ok(Self {
            bind_address,
            database_url,
            jwt_secret,
            jwt_ttl: Duration::from_secs(jwt_ttl_secs),
            log_level,
            cors_origin,
            upload_dir,
            max_upload_bytes,
            request_timeout: Duration::from_secs(request_timeout_secs),
            db_max_connections,
        })
    }
}

/// Missing and blank values are treated alike.
fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/med_sum"),
            ("JWT_SECRET", "s3cret"),
        ])
        .unwrap();

        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.jwt_ttl, Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.db_max_connections, 10);
    }

    #[test]
    fn secret_and_database_are_required() {
        let err = load(&[("DATABASE_URL", "postgres://localhost/med_sum")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "JWT_SECRET"));

        let err = load(&[("JWT_SECRET", "s3cret")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "DATABASE_URL"));

        let err = load(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(_)));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s3cret"),
            ("REQUEST_TIMEOUT_SECS", "soon"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "REQUEST_TIMEOUT_SECS"));
    }

    #[test]
    fn ttl_that_overflows_seconds_is_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_HOURS", "18446744073709551"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "JWT_TTL_HOURS"));
    }
}
