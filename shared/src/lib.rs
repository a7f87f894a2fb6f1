//! Shared utilities and common types for the OTP Guard server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Contact validation and masking

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ConfigError, CorsConfig, DeliveryConfig, Environment, LogFormat,
    LoggingConfig,
    OtpConfig, RateLimitConfig, RateLimitScope, ServerConfig, StoreBackend, StoreConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::contact;
