//! Configuration module for receivable-service.

use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct ReceivableConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub directory: DirectoryConfig,
    pub renderer: RendererConfig,
    pub notifier: NotifierConfig,
    pub cache_refresh_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub url: String,
}

impl ReceivableConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "receivable-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| {
                    AppError::ConfigError(anyhow::anyhow!("DATABASE_URL is required"))
                })?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://redis:6379".to_string()),
            },
            directory: DirectoryConfig {
                url: env::var("DIRECTORY_SERVICE_URL")
                    .unwrap_or_else(|_| "http://directory-service:3001".to_string()),
            },
            renderer: RendererConfig {
                url: env::var("RENDERER_SERVICE_URL")
                    .unwrap_or_else(|_| "http://document-service:3001".to_string()),
            },
            notifier: NotifierConfig {
                url: env::var("NOTIFICATION_SERVICE_URL")
                    .unwrap_or_else(|_| "http://notification-service:3001".to_string()),
            },
            cache_refresh_seconds: env::var("CACHE_REFRESH_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        })
    }
}
