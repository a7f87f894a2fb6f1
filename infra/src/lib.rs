//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the OTP Guard service.
//! It provides concrete implementations of the ports defined in `otp_core`.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Cache**: Redis client and the Redis-backed OTP record store
//! - **Rate limit**: Redis sliding window limiter shared across instances
//! - **Delivery**: log dispatcher and per-channel routing
//!
//! [`initialize`] wires these together according to [`AppConfig`].

use std::sync::Arc;

use otp_core::{
    AllowAllRateLimiter, DeliveryDispatcher, DomainError, InMemoryOtpStore, InMemoryRateLimiter,
    OtpStore, RateLimiter,
};
use otp_shared::{AppConfig, StoreBackend};

/// Cache module - Redis client and OTP record store
pub mod cache;

/// Delivery module - OTP delivery channels
pub mod delivery;

/// Rate limit module - Redis sliding window limiter
pub mod rate_limit;

use cache::{RedisClient, RedisOtpStore};
use delivery::{ChannelRouter, LogDispatcher};
use rate_limit::RedisRateLimiter;

/// Infrastructure service container
#[derive(Clone)]
pub struct InfrastructureServices {
    /// OTP record store for the configured backend
    pub store: Arc<dyn OtpStore>,
    /// Issuance rate limiter
    pub rate_limiter: Arc<dyn RateLimiter>,
    /// Delivery dispatcher routing by contact kind
    pub dispatcher: Arc<dyn DeliveryDispatcher>,
    /// Redis client, present only with the redis backend
    pub redis: Option<Arc<RedisClient>>,
}

impl InfrastructureServices {
    /// Check connectivity of external dependencies.
    /// Always healthy with the memory backend.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        match &self.redis {
            Some(client) => client.health_check().await,
            None => Ok(true),
        }
    }
}

/// Initialize infrastructure services
///
/// This function sets up:
/// - The OTP record store (memory or Redis)
/// - The rate limiter matching the store backend, or a pass-through when disabled
/// - The delivery dispatchers
pub async fn initialize(config: &AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(
        backend = %config.store.backend,
        rate_limit_enabled = config.rate_limit.enabled,
        "Initializing infrastructure services..."
    );

    let redis = match config.store.backend {
        StoreBackend::Redis => Some(Arc::new(RedisClient::new(config.cache.clone()).await?)),
        StoreBackend::Memory => None,
    };

    let store: Arc<dyn OtpStore> = match &redis {
        Some(client) => Arc::new(RedisOtpStore::new(client.clone())),
        None => Arc::new(InMemoryOtpStore::new()),
    };

    let rate_limiter: Arc<dyn RateLimiter> = if !config.rate_limit.enabled {
        tracing::warn!("Rate limiting is disabled");
        Arc::new(AllowAllRateLimiter)
    } else {
        match &redis {
            Some(client) => Arc::new(RedisRateLimiter::new(
                client.clone(),
                config.rate_limit.max_requests,
                config.rate_limit.window_seconds,
            )),
            None => Arc::new(InMemoryRateLimiter::new(
                config.rate_limit.max_requests,
                config.rate_limit.window_seconds,
            )),
        }
    };

    if config.delivery.reveal_codes {
        tracing::warn!("Delivery dispatcher will log plaintext codes");
    }
    let sender = config.delivery.sender_name();
    let email: Arc<dyn DeliveryDispatcher> =
        Arc::new(LogDispatcher::new("email", sender, config.delivery.reveal_codes));
    let sms: Arc<dyn DeliveryDispatcher> =
        Arc::new(LogDispatcher::new("sms", sender, config.delivery.reveal_codes));
    let dispatcher: Arc<dyn DeliveryDispatcher> =
        Arc::new(ChannelRouter::new(Some(email), Some(sms)));

    tracing::info!("Infrastructure services initialized successfully");

    Ok(InfrastructureServices {
        store,
        rate_limiter,
        dispatcher,
        redis,
    })
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored data could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Config(message) => DomainError::Configuration { message },
            other => DomainError::Storage {
                message: other.to_string(),
            },
        }
    }
}
