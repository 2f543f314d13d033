//! Configuration management for Folio Server

use serde::Deserialize;
use std::env;

/// Default cap on list endpoints
pub const DEFAULT_LIST_LIMIT: i64 = 1000;

/// Database used when `DATABASE_URL` is unset
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./folio.db";

/// Default request body limit for uploads (100 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Maximum number of records returned by list endpoints
    pub list_limit: i64,
    /// Maximum accepted upload body size in bytes
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8001,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: 5,
            },
            api: ApiConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            list_limit: DEFAULT_LIST_LIMIT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("SERVER_PORT", 8001),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5),
            },
            api: ApiConfig {
                list_limit: parse_var("PDF_LIST_LIMIT", DEFAULT_LIST_LIMIT),
                max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8001);
        assert_eq!(config.api.list_limit, 1000);
        assert_eq!(config.api.max_upload_bytes, 100 * 1024 * 1024);
        assert!(config.database.url.starts_with("sqlite:"));
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        env::set_var("FOLIO_TEST_PORT", "not-a-number");
        assert_eq!(parse_var("FOLIO_TEST_PORT", 8001u16), 8001);

        env::set_var("FOLIO_TEST_PORT", "9090");
        assert_eq!(parse_var("FOLIO_TEST_PORT", 8001u16), 9090);

        env::remove_var("FOLIO_TEST_PORT");
        assert_eq!(parse_var("FOLIO_TEST_PORT", 8001u16), 8001);
    }

    #[test]
    fn test_missing_database_url_keeps_other_settings() {
        env::remove_var("DATABASE_URL");
        env::set_var("PDF_LIST_LIMIT", "25");
        env::set_var("MAX_UPLOAD_BYTES", "4096");

        let config = Config::from_env().unwrap();
        assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
        assert_eq!(config.api.list_limit, 25);
        assert_eq!(config.api.max_upload_bytes, 4096);

        env::remove_var("PDF_LIST_LIMIT");
        env::remove_var("MAX_UPLOAD_BYTES");
    }
}
