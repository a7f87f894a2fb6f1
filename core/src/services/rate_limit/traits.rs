//! Rate limiter trait and decision type

use async_trait::async_trait;

use crate::errors::DomainResult;

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request admitted and recorded
    Allowed { remaining: u32 },
    /// Request rejected; nothing was recorded
    Limited { retry_after_seconds: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Sliding window limiter keyed by an opaque string (`ip:{addr}`, `contact:{value}`)
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count the request against `key` if the window has room
    async fn check(&self, key: &str) -> DomainResult<RateLimitDecision>;

    /// Boolean form of [`RateLimiter::check`]
    async fn is_allowed(&self, key: &str) -> DomainResult<bool> {
        Ok(self.check(key).await?.is_allowed())
    }

    /// Drop windows with no recent requests; returns how many keys were dropped
    async fn evict_expired(&self) -> DomainResult<usize> {
        Ok(0)
    }
}

/// Limiter that admits everything
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllRateLimiter;

#[async_trait]
impl RateLimiter for AllowAllRateLimiter {
    async fn check(&self, _key: &str) -> DomainResult<RateLimitDecision> {
        Ok(RateLimitDecision::Allowed {
            remaining: u32::MAX,
        })
    }
}
