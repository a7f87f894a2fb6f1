//! Sliding window rate limiting for OTP issuance
//!
//! - `RateLimiter` trait shared by the in-memory and Redis implementations
//! - `InMemoryRateLimiter` for single instance deployments and tests
//! - `AllowAllRateLimiter` installed when rate limiting is disabled

mod memory;
mod traits;

pub use memory::InMemoryRateLimiter;
pub use traits::{AllowAllRateLimiter, RateLimitDecision, RateLimiter};
