//! Integration tests for the Redis store and rate limiter
//!
//! These tests require a running Redis instance to execute.
//! Run with: cargo test -p otp_infra --test redis_integration -- --ignored

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use otp_core::{
    AttemptReservation, Contact, EncryptedCode, OtpRecord, OtpStore, RateLimitDecision,
    RateLimiter,
};
use otp_infra::cache::{CacheConfig, RedisClient, RedisOtpStore};
use otp_infra::rate_limit::RedisRateLimiter;

async fn client() -> Arc<RedisClient> {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    // Unique prefix per test run keeps runs independent
    let config = CacheConfig::new(url).with_prefix(format!("test-{}", Uuid::new_v4()));
    Arc::new(RedisClient::new(config).await.expect("Failed to connect to Redis"))
}

fn record(contact: &str, ttl_seconds: i64) -> OtpRecord {
    let contact = Contact::parse(contact).unwrap();
    OtpRecord::new(
        &contact,
        EncryptedCode::from_bytes(vec![7; 34]),
        Utc::now(),
        ttl_seconds,
    )
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_health_check() {
    let client = client().await;
    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_put_get_and_replace() {
    let store = RedisOtpStore::new(client().await);
    let first = record("a@b.com", 120);

    store.put(first.clone()).await.unwrap();
    let loaded = store.get("a@b.com").await.unwrap().unwrap();
    assert_eq!(loaded.id, first.id);
    assert_eq!(loaded.encrypted_code, first.encrypted_code);
    assert_eq!(loaded.attempt_count, 0);
    assert_eq!(
        loaded.expires_at.timestamp_millis(),
        first.expires_at.timestamp_millis()
    );

    let second = record("a@b.com", 120);
    store.put(second.clone()).await.unwrap();
    assert_eq!(store.get("a@b.com").await.unwrap().unwrap().id, second.id);

    assert!(store.delete("a@b.com").await.unwrap());
    assert!(store.get("a@b.com").await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_conditional_operations_respect_record_id() {
    let store = RedisOtpStore::new(client().await);
    let current = record("a@b.com", 120);
    store.put(current.clone()).await.unwrap();

    let stale_id = Uuid::new_v4();
    assert_eq!(
        store.reserve_attempt("a@b.com", stale_id, 2).await.unwrap(),
        AttemptReservation::Missing
    );
    assert!(!store.remove_if_current("a@b.com", stale_id).await.unwrap());

    assert_eq!(
        store.reserve_attempt("a@b.com", current.id, 2).await.unwrap(),
        AttemptReservation::Reserved(1)
    );
    assert_eq!(
        store.reserve_attempt("a@b.com", current.id, 2).await.unwrap(),
        AttemptReservation::Reserved(2)
    );
    assert_eq!(
        store.reserve_attempt("a@b.com", current.id, 2).await.unwrap(),
        AttemptReservation::Exhausted
    );
    assert!(store.remove_if_current("a@b.com", current.id).await.unwrap());
    assert!(store.get("a@b.com").await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_record_expires_with_key() {
    let store = RedisOtpStore::new(client().await);
    store.put(record("a@b.com", 1)).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(1_500)).await;
    assert!(store.get("a@b.com").await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_rate_limiter_window() {
    let limiter = RedisRateLimiter::new(client().await, 3, 60);

    for remaining in (0..3).rev() {
        assert_eq!(
            limiter.check("contact:a@b.com").await.unwrap(),
            RateLimitDecision::Allowed { remaining }
        );
    }

    match limiter.check("contact:a@b.com").await.unwrap() {
        RateLimitDecision::Limited {
            retry_after_seconds,
        } => assert!((1..=60).contains(&retry_after_seconds)),
        other => panic!("Expected limit, got {:?}", other),
    }

    // Other keys have their own window
    assert!(limiter.is_allowed("contact:c@d.com").await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_rate_limiter_concurrent_checks() {
    let limiter = Arc::new(RedisRateLimiter::new(client().await, 5, 60));

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.is_allowed("ip:10.0.0.1").await.unwrap() })
        })
        .collect();

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 5);
}

