//! Configuration for the cost estimator

use domain_estimation::catalog::{CatalogConfig, DEFAULT_CATALOG_TIMEOUT, RETAIL_PRICES_API};
use domain_estimation::DEFAULT_MAX_CONCURRENCY;
use std::env;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment, selected by `APP_ENV`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env_or_default("APP_ENV", "development");

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub catalog: CatalogConfig,
    /// Concurrent catalog lookups per batch
    pub max_concurrency: usize,
    /// Allowed CORS origins; empty allows any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = env_parse("PRICING_CATALOG_TIMEOUT_SECS", DEFAULT_CATALOG_TIMEOUT.as_secs())?;

        Ok(Config {
            environment: Environment::from_env(),
            host: env_or_default("HOST", &Ipv4Addr::UNSPECIFIED.to_string()),
            port: env_parse("PORT", 8080)?,
            catalog: CatalogConfig {
                base_url: env_or_default("PRICING_CATALOG_URL", RETAIL_PRICES_API),
                timeout: Duration::from_secs(timeout_secs),
            },
            max_concurrency: env_parse("PRICING_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGIN")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
