//! Gateway configuration
//!
//! The configuration is built once, at startup, and handed to every component through DI.
//! Nothing below `main` reads the process environment.

use axum::http::HeaderValue;
use sqlx::sqlite::SqliteConnectOptions;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{0}` must be set")]
    Missing(&'static str),

    #[error("`{key}` is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen_addr: SocketAddr,
    pub database: SqliteConnectOptions,
    pub max_connections: u32,
    /// Base URL of the auth/profile service, without a trailing `/`.
    pub auth_service_url: String,
    /// Base URL of the inference service, without a trailing `/`.
    pub inference_service_url: String,
    pub upstream_timeout: Duration,
    pub cors_origins: Vec<HeaderValue>,
}

impl GatewayConfig {
    /// Loads `.env` (if present) and reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let listen_addr = get("GATEWAY_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned())
            .parse::<SocketAddr>()
            .map_err(|e| invalid("GATEWAY_LISTEN_ADDR", e))?;

        let database = SqliteConnectOptions::from_str(&require("DATABASE_URL")?)
            .map_err(|e| invalid("DATABASE_URL", e))?
            .create_if_missing(true);

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .parse::<u32>()
                .map_err(|e| invalid("DATABASE_MAX_CONNECTIONS", e))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        if max_connections == 0 {
            return Err(invalid("DATABASE_MAX_CONNECTIONS", "must be at least 1"));
        }

        let auth_service_url = base_url("AUTH_SERVICE_URL", &require("AUTH_SERVICE_URL")?)?;
        let inference_service_url =
            base_url("INFERENCE_SERVICE_URL", &require("INFERENCE_SERVICE_URL")?)?;

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .map_err(|e| invalid("UPSTREAM_TIMEOUT_SECS", e))?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };
        if upstream_timeout == 0 {
            return Err(invalid("UPSTREAM_TIMEOUT_SECS", "must be at least 1"));
        }

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_owned())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| origin.parse::<HeaderValue>().map_err(|e| invalid("CORS_ORIGINS", e)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GatewayConfig {
            listen_addr,
            database,
            max_connections,
            auth_service_url,
            inference_service_url,
            upstream_timeout: Duration::from_secs(upstream_timeout),
            cors_origins,
        })
    }
}

fn invalid(key: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.to_string(),
    }
}

fn base_url(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let url = reqwest::Url::parse(value.trim()).map_err(|e| invalid(key, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(key, "scheme must be http or https"));
    }

    Ok(url.as_str().trim_end_matches('/').to_owned())
}
