//! Redis-backed storage for OTP records
//!
//! This module provides the Redis client with connection retry and the
//! [`RedisOtpStore`] implementation of the core `OtpStore` trait.

pub mod otp_store;
pub mod redis_client;

pub use otp_store::RedisOtpStore;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use otp_shared::CacheConfig;
