//! Shared application state

use std::sync::Arc;

use otp_core::OtpService;
use otp_infra::cache::RedisClient;
use otp_shared::ServerConfig;

/// State shared by all request handlers
pub struct AppState {
    /// OTP lifecycle manager
    pub otp_service: Arc<OtpService>,
    /// Peers allowed to supply `X-Forwarded-For` / `X-Real-IP`
    pub trusted_proxies: Vec<String>,
    /// Present with the redis backend; pinged by the health endpoint
    pub redis: Option<Arc<RedisClient>>,
}

impl AppState {
    pub fn new(otp_service: Arc<OtpService>, server: &ServerConfig) -> Self {
        Self {
            otp_service,
            trusted_proxies: server.trusted_proxies.clone(),
            redis: None,
        }
    }

    pub fn with_redis(mut self, redis: Option<Arc<RedisClient>>) -> Self {
        self.redis = redis;
        self
    }

    /// Whether forwarding headers from `peer_ip` may be honoured
    pub fn is_trusted_proxy(&self, peer_ip: &str) -> bool {
        self.trusted_proxies.iter().any(|proxy| proxy == peer_ip)
    }
}
