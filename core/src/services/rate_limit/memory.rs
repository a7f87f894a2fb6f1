//! In-memory sliding window rate limiter

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::DomainResult;
use crate::services::clock::{Clock, SystemClock};

use super::traits::{RateLimitDecision, RateLimiter};

/// Per-key request timestamps within the trailing window
pub struct InMemoryRateLimiter {
    windows: Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>,
    max_requests: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl InMemoryRateLimiter {
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self::with_clock(max_requests, window_seconds, Arc::new(SystemClock))
    }

    pub fn with_clock(max_requests: u32, window_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        // Capped at one year to stay inside chrono's range
        let window_seconds = window_seconds.min(31_536_000) as i64;
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window: Duration::seconds(window_seconds),
            clock,
        }
    }

    /// Number of keys currently tracked
    pub async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.len()
    }
}

fn evict_before(entries: &mut VecDeque<DateTime<Utc>>, cutoff: DateTime<Utc>) {
    while entries.front().map_or(false, |t| *t <= cutoff) {
        entries.pop_front();
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> DomainResult<RateLimitDecision> {
        let now = self.clock.now();
        let cutoff = now - self.window;

        let mut windows = self.windows.lock().await;
        let entries = windows.entry(key.to_string()).or_default();
        evict_before(entries, cutoff);

        let count = entries.len() as u32;
        if count < self.max_requests {
            entries.push_back(now);
            return Ok(RateLimitDecision::Allowed {
                remaining: self.max_requests - count - 1,
            });
        }

        let retry_after = entries
            .front()
            .map(|oldest| *oldest + self.window - now)
            .unwrap_or(self.window);
        // Round up so clients never retry a moment too early
        let millis = retry_after.num_milliseconds().max(0);
        let retry_after_seconds = ((millis + 999) / 1000).max(1) as u64;

        Ok(RateLimitDecision::Limited { retry_after_seconds })
    }

    async fn evict_expired(&self) -> DomainResult<usize> {
        let cutoff = self.clock.now() - self.window;
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, entries| {
            evict_before(entries, cutoff);
            !entries.is_empty()
        });
        Ok(before - windows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::ManualClock;

    fn limiter(max: u32, window: u64) -> (InMemoryRateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let limiter = InMemoryRateLimiter::with_clock(max, window, clock.clone());
        (limiter, clock)
    }

    #[tokio::test]
    async fn test_admits_up_to_limit() {
        let (limiter, _clock) = limiter(5, 60);
        for expected_remaining in (0..5).rev() {
            assert_eq!(
                limiter.check("ip:1.2.3.4").await.unwrap(),
                RateLimitDecision::Allowed {
                    remaining: expected_remaining
                }
            );
        }
        assert!(!limiter.is_allowed("ip:1.2.3.4").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (limiter, _clock) = limiter(1, 60);
        assert!(limiter.is_allowed("ip:1.2.3.4").await.unwrap());
        assert!(limiter.is_allowed("ip:5.6.7.8").await.unwrap());
        assert!(!limiter.is_allowed("ip:1.2.3.4").await.unwrap());
    }

    #[tokio::test]
    async fn test_window_slides() {
        let (limiter, clock) = limiter(2, 60);
        assert!(limiter.is_allowed("k").await.unwrap());
        clock.advance(Duration::seconds(30));
        assert!(limiter.is_allowed("k").await.unwrap());

        assert_eq!(
            limiter.check("k").await.unwrap(),
            RateLimitDecision::Limited {
                retry_after_seconds: 30
            }
        );

        // First request leaves the window
        clock.advance(Duration::seconds(30));
        assert!(limiter.is_allowed("k").await.unwrap());
        assert!(!limiter.is_allowed("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejected_requests_are_not_recorded() {
        let (limiter, clock) = limiter(1, 60);
        assert!(limiter.is_allowed("k").await.unwrap());
        for _ in 0..10 {
            clock.advance(Duration::seconds(5));
            assert!(!limiter.is_allowed("k").await.unwrap());
        }
        // 60s after the only recorded request
        clock.advance(Duration::seconds(10));
        assert!(limiter.is_allowed("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_evict_expired_drops_idle_keys() {
        let (limiter, clock) = limiter(5, 60);
        limiter.check("a").await.unwrap();
        limiter.check("b").await.unwrap();
        assert_eq!(limiter.tracked_keys().await, 2);

        clock.advance(Duration::seconds(61));
        assert_eq!(limiter.evict_expired().await.unwrap(), 2);
        assert_eq!(limiter.tracked_keys().await, 0);
    }

    #[tokio::test]
    async fn test_allow_all() {
        let limiter = super::super::AllowAllRateLimiter;
        for _ in 0..100 {
            assert!(limiter.is_allowed("ip:1.2.3.4").await.unwrap());
        }
    }
}
