//! Configuration for the OTP manager

use otp_shared::{OtpConfig, RateLimitConfig, RateLimitScope};

use crate::domain::entities::{DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS, DEFAULT_TTL_SECONDS};

/// Runtime settings of [`super::OtpService`]
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Digits per generated code
    pub code_length: usize,
    /// Seconds before an issued code expires
    pub ttl_seconds: i64,
    /// Wrong submissions allowed per issuance
    pub max_attempts: u32,
    /// Which keys issuance is rate limited by
    pub rate_limit_scope: RateLimitScope,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rate_limit_scope: RateLimitScope::Both,
        }
    }
}

impl OtpServiceConfig {
    pub fn from_config(otp: &OtpConfig, rate_limit: &RateLimitConfig) -> Self {
        Self {
            code_length: otp.code_length,
            ttl_seconds: otp.ttl_seconds,
            max_attempts: otp.max_attempts,
            rate_limit_scope: rate_limit.scope,
        }
    }
}
