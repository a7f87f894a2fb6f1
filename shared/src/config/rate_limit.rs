//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

use super::{env_parse, ConfigError};

/// Which request attributes issuance is limited by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitScope {
    /// Per source IP address
    Ip,
    /// Per contact identifier
    Contact,
    /// Both the source IP and the contact
    Both,
}

impl RateLimitScope {
    pub fn includes_ip(&self) -> bool {
        matches!(self, RateLimitScope::Ip | RateLimitScope::Both)
    }

    pub fn includes_contact(&self) -> bool {
        matches!(self, RateLimitScope::Contact | RateLimitScope::Both)
    }
}

impl std::str::FromStr for RateLimitScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ip" => Ok(RateLimitScope::Ip),
            "contact" => Ok(RateLimitScope::Contact),
            "both" => Ok(RateLimitScope::Both),
            _ => Err(format!("Invalid rate limit scope: {}", s)),
        }
    }
}

/// Issuance rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Sliding window length in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Max issuance requests per key within the window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Keys the limiter is applied to
    #[serde(default = "default_scope")]
    pub scope: RateLimitScope,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            window_seconds: default_window_seconds(),
            max_requests: default_max_requests(),
            scope: default_scope(),
        }
    }
}

impl RateLimitConfig {
    /// Create a configuration with a custom limit and window
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            max_requests,
            window_seconds,
            ..Default::default()
        }
    }

    /// Disabled rate limiting (tests and load testing only)
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_scope(mut self, scope: RateLimitScope) -> Self {
        self.scope = scope;
        self
    }

    /// Overlay `RATE_LIMIT_*` environment variables on top of `base`
    pub fn from_env_or(base: Self) -> Self {
        Self {
            enabled: env_parse("RATE_LIMIT_ENABLED").unwrap_or(base.enabled),
            window_seconds: env_parse("RATE_LIMIT_WINDOW_SECONDS").unwrap_or(base.window_seconds),
            max_requests: env_parse("RATE_LIMIT_MAX_REQUESTS").unwrap_or(base.max_requests),
            scope: env_parse("RATE_LIMIT_SCOPE").unwrap_or(base.scope),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.window_seconds == 0 {
            return Err(ConfigError::invalid(
                "rate_limit.window_seconds",
                "must be greater than zero",
            ));
        }
        if self.max_requests == 0 {
            return Err(ConfigError::invalid(
                "rate_limit.max_requests",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_window_seconds() -> u64 {
    60
}

fn default_max_requests() -> u32 {
    5
}

fn default_scope() -> RateLimitScope {
    RateLimitScope::Both
}
