//! Redis client implementation
//!
//! This module provides a Redis client with a multiplexed connection, startup
//! retry logic, key hashing and a PING based health check. The OTP store and
//! the rate limiter issue their own commands through [`RedisClient::connection`].

use redis::{aio::MultiplexedConnection, Client, RedisError, RedisResult};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use otp_shared::CacheConfig;

use crate::InfrastructureError;

/// Redis client with connection setup retry
///
/// Cloning is cheap; all clones share one multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Connect using the retry settings from `config`
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(
            url = %mask_url(&config.url),
            max_retries = config.max_retries,
            "Creating Redis client"
        );

        // Parse Redis URL and create client
        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(error = %e, "Failed to parse Redis URL");
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(&client, &config).await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: &Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let max_retries = config.max_retries.max(1);
        let connect_timeout = Duration::from_secs(config.connection_timeout.max(1));
        let mut attempts = 0;
        let mut delay = config.retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let result = match timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(result) => result,
                Err(_) => Err(RedisError::from((
                    redis::ErrorKind::IoError,
                    "connection timed out",
                ))),
            };

            match result {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 5 seconds
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!(
                        "Failed to connect to Redis after {} attempts: {}",
                        attempts, e
                    );
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// A handle to the shared multiplexed connection
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    /// Build a namespaced key whose variable part is a SHA-256 digest,
    /// so contacts and addresses never appear in Redis key space
    pub fn hashed_key(&self, namespace: &str, raw: &str) -> String {
        self.config
            .make_key(&format!("{}:{}", namespace, hash_identifier(raw)))
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let mut conn = self.connection();
        let result: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;

        match result {
            Ok(response) if response == "PONG" => {
                debug!("Redis health check passed");
                Ok(true)
            }
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }
}

/// Hex encoded SHA-256 of an identifier
pub(crate) fn hash_identifier(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Check if a Redis error is retriable
///
/// Determines if an error is transient and connecting should be retried.
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError | redis::ErrorKind::BusyLoadingError | redis::ErrorKind::TryAgain
    )
}

/// Mask sensitive parts of Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
