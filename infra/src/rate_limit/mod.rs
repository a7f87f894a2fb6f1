//! Redis-backed rate limiting shared across service instances

mod redis;

pub use self::redis::RedisRateLimiter;
