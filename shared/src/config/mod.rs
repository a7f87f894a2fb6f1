//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `otp` - Code length, TTL, attempt budget and cipher key
//! - `rate_limit` - Issuance rate limiting window and scope
//! - `store` - OTP record store backend selection and sweeping
//! - `cache` - Redis connection settings
//! - `delivery` - Delivery dispatcher behaviour
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server and CORS configuration

pub mod cache;
pub mod delivery;
pub mod environment;
pub mod otp;
pub mod rate_limit;
pub mod server;
pub mod store;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use cache::CacheConfig;
pub use delivery::DeliveryConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpConfig;
pub use rate_limit::{RateLimitConfig, RateLimitScope};
pub use server::{CorsConfig, ServerConfig};
pub use store::{StoreBackend, StoreConfig};

/// Errors raised while validating configuration at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Missing required setting: {field}")]
    Missing { field: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// OTP lifecycle configuration
    #[serde(default)]
    pub otp: OtpConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Store backend configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Redis configuration (used by the redis store backend)
    #[serde(default)]
    pub cache: CacheConfig,

    /// Delivery configuration
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::default(),
            otp: OtpConfig::default(),
            rate_limit: RateLimitConfig::default(),
            store: StoreConfig::default(),
            cache: CacheConfig::default(),
            delivery: DeliveryConfig::default(),
            cors: CorsConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::new("0.0.0.0", 8080),
            otp: OtpConfig::default(),
            rate_limit: RateLimitConfig::default(),
            store: StoreConfig::redis(),
            cache: CacheConfig::default(),
            delivery: DeliveryConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Create the preset for an environment
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::production();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        }
    }

    /// Validate cross-cutting constraints before anything is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.otp.validate()?;
        self.rate_limit.validate()?;
        self.store.validate()?;

        if self.environment.is_production() {
            if self.otp.cipher_key.trim().is_empty() {
                return Err(ConfigError::Missing {
                    field: "otp.cipher_key".to_string(),
                });
            }
            if self.delivery.reveal_codes {
                return Err(ConfigError::invalid(
                    "delivery.reveal_codes",
                    "codes must never be revealed in production",
                ));
            }
        }

        Ok(())
    }
}

/// Read an environment variable and parse it, ignoring unset or malformed values
pub(crate) fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
