use chrono::Duration;
use secrecy::{ExposeSecret, Secret};
use service_core::config::{self as core_config, get_env, get_env_parsed};
use service_core::error::AppError;

use crate::models::refresh_token::REFRESH_TOKEN_TTL_DAYS;
use crate::services::ServiceError;

/// Upper bound on `ACCESS_TOKEN_TTL_SECONDS` (one week).
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Upper bound on `REFRESH_TOKEN_TTL_DAYS` (one year).
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 365;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub database: DatabaseConfig,
    pub tokens: TokenConfig,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub jwt_secret: Secret<String>,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_days: i64,
}

impl TokenConfig {
    /// Access-token lifetime; `ConfigInvalid` unless within `1..=MAX_ACCESS_TOKEN_TTL_SECONDS`.
    pub fn access_token_ttl(&self) -> Result<Duration, ServiceError> {
        bounded_ttl(
            "ACCESS_TOKEN_TTL_SECONDS",
            self.access_token_ttl_seconds,
            MAX_ACCESS_TOKEN_TTL_SECONDS,
            Duration::try_seconds,
        )
    }

    /// Refresh-token lifetime; `ConfigInvalid` unless within `1..=MAX_REFRESH_TOKEN_TTL_DAYS`.
    pub fn refresh_token_ttl(&self) -> Result<Duration, ServiceError> {
        bounded_ttl(
            "REFRESH_TOKEN_TTL_DAYS",
            self.refresh_token_ttl_days,
            MAX_REFRESH_TOKEN_TTL_DAYS,
            Duration::try_days,
        )
    }
}

fn bounded_ttl(
    key: &str,
    value: i64,
    max: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration, ServiceError> {
    if value <= 0 || value > max {
        return Err(ServiceError::ConfigInvalid(format!(
            "{} must be between 1 and {}",
            key, max
        )));
    }
    to_duration(value)
        .ok_or_else(|| ServiceError::ConfigInvalid(format!("{} is out of range", key)))
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Shared key presented by the billing provider as `Authorization: ApiKey <key>`.
    pub polka_key: Secret<String>,
}

impl SessionConfig {
    /// Build the configuration from the environment. Any error here is fatal.
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = common.is_prod();

        let config = SessionConfig {
            service_name: get_env("SERVICE_NAME", Some("session-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: get_env_parsed("DATABASE_MAX_CONNECTIONS", Some("10"), is_prod)?,
                min_connections: get_env_parsed("DATABASE_MIN_CONNECTIONS", Some("1"), is_prod)?,
            },
            tokens: TokenConfig {
                jwt_secret: Secret::new(get_env("JWT_SECRET", None, is_prod)?),
                access_token_ttl_seconds: get_env_parsed(
                    "ACCESS_TOKEN_TTL_SECONDS",
                    Some("3600"),
                    is_prod,
                )?,
                refresh_token_ttl_days: get_env_parsed(
                    "REFRESH_TOKEN_TTL_DAYS",
                    Some(REFRESH_TOKEN_TTL_DAYS.to_string().as_str()),
                    is_prod,
                )?,
            },
            webhook: WebhookConfig {
                polka_key: Secret::new(get_env("POLKA_KEY", None, is_prod)?),
            },
            common,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.tokens.jwt_secret.expose_secret().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_SECRET must not be empty"
            )));
        }

        if self.webhook.polka_key.expose_secret().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "POLKA_KEY must not be empty"
            )));
        }

        self.tokens.access_token_ttl()?;
        self.tokens.refresh_token_ttl()?;

        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "DATABASE_MIN_CONNECTIONS cannot exceed DATABASE_MAX_CONNECTIONS"
            )));
        }

        Ok(())
    }
}
