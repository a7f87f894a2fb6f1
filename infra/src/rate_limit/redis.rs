//! Sliding window rate limiter on Redis sorted sets
//!
//! Each key owns a ZSET of request timestamps (unix millis). Pruning, counting
//! and recording run inside one Lua script, so concurrent instances cannot
//! both take the last slot of a window.

use async_trait::async_trait;
use chrono::Utc;
use redis::Script;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use otp_core::{DomainResult, RateLimitDecision, RateLimiter};

use crate::cache::redis_client::RedisClient;
use crate::InfrastructureError;

const RATE_NAMESPACE: &str = "otp:rate";

/// Returns `{1, remaining}` when admitted, `{0, retry_after_ms}` when limited
const SLIDING_WINDOW: &str = r#"
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local limit = tonumber(ARGV[3])
redis.call('ZREMRANGEBYSCORE', KEYS[1], '-inf', now - window)
local count = redis.call('ZCARD', KEYS[1])
if count >= limit then
    local oldest = redis.call('ZRANGE', KEYS[1], 0, 0, 'WITHSCORES')
    local retry = window
    if oldest[2] then
        retry = tonumber(oldest[2]) + window - now
    end
    return {0, retry}
end
redis.call('ZADD', KEYS[1], now, ARGV[4])
redis.call('PEXPIRE', KEYS[1], window)
return {1, limit - count - 1}
"#;

/// Redis implementation of [`RateLimiter`]
///
/// Idle windows expire through `PEXPIRE`, so `evict_expired` is a no-op.
pub struct RedisRateLimiter {
    redis_client: Arc<RedisClient>,
    max_requests: u32,
    window_seconds: u64,
    script: Script,
}

impl RedisRateLimiter {
    pub fn new(redis_client: Arc<RedisClient>, max_requests: u32, window_seconds: u64) -> Self {
        Self {
            redis_client,
            max_requests,
            window_seconds,
            script: Script::new(SLIDING_WINDOW),
        }
    }

    fn window_millis(&self) -> i64 {
        // Capped at one year, same as the in-memory limiter
        (self.window_seconds.min(31_536_000) as i64) * 1000
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: &str) -> DomainResult<RateLimitDecision> {
        let redis_key = self.redis_client.hashed_key(RATE_NAMESPACE, key);
        let mut conn = self.redis_client.connection();

        let now = Utc::now().timestamp_millis();
        let member = format!("{}-{}", now, Uuid::new_v4());

        let reply: Vec<i64> = self
            .script
            .key(&redis_key)
            .arg(now)
            .arg(self.window_millis())
            .arg(self.max_requests)
            .arg(member)
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;

        let decision = decision_from_reply(&reply).ok_or_else(|| {
            warn!(reply = ?reply, "Unexpected rate limit script reply");
            InfrastructureError::Serialization("malformed rate limit reply".to_string())
        })?;

        debug!(allowed = decision.is_allowed(), "Rate limit checked");
        Ok(decision)
    }
}

fn decision_from_reply(reply: &[i64]) -> Option<RateLimitDecision> {
    match reply {
        [1, remaining] => Some(RateLimitDecision::Allowed {
            remaining: u32::try_from(*remaining).unwrap_or(0),
        }),
        [0, retry_ms] => {
            // Round up to whole seconds, never below one
            let retry_ms = u64::try_from(*retry_ms).unwrap_or(0);
            Some(RateLimitDecision::Limited {
                retry_after_seconds: retry_ms.div_ceil(1000).max(1),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_reply() {
        assert_eq!(
            decision_from_reply(&[1, 4]),
            Some(RateLimitDecision::Allowed { remaining: 4 })
        );
    }

    #[test]
    fn test_limited_reply_rounds_up() {
        assert_eq!(
            decision_from_reply(&[0, 1_500]),
            Some(RateLimitDecision::Limited {
                retry_after_seconds: 2
            })
        );
        assert_eq!(
            decision_from_reply(&[0, 0]),
            Some(RateLimitDecision::Limited {
                retry_after_seconds: 1
            })
        );
    }

    #[test]
    fn test_malformed_reply() {
        assert_eq!(decision_from_reply(&[]), None);
        assert_eq!(decision_from_reply(&[2, 1]), None);
    }
}
