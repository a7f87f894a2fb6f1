//! OTP lifecycle configuration

use serde::{Deserialize, Serialize};

use super::{env_parse, ConfigError};

/// Default number of digits in a generated code
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Default lifetime of an issued code (2 minutes)
pub const DEFAULT_TTL_SECONDS: i64 = 120;

/// Default number of wrong submissions before a code is invalidated
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Supported code length range
pub const MIN_CODE_LENGTH: usize = 4;
pub const MAX_CODE_LENGTH: usize = 10;

/// Configuration for OTP generation, expiry and verification
#[derive(Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Number of digits in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Seconds until an issued code expires
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: i64,

    /// Wrong submissions allowed before the code is invalidated
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base64 encoded 256-bit key used to encrypt codes at rest.
    /// Empty means "generate an ephemeral key" (development only).
    #[serde(default)]
    pub cipher_key: String,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            cipher_key: String::new(),
        }
    }
}

impl std::fmt::Debug for OtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpConfig")
            .field("code_length", &self.code_length)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("max_attempts", &self.max_attempts)
            .field(
                "cipher_key",
                &if self.cipher_key.is_empty() { "<unset>" } else { "<redacted>" },
            )
            .finish()
    }
}

impl OtpConfig {
    /// Overlay `OTP_*` environment variables on top of `base`
    pub fn from_env_or(base: Self) -> Self {
        Self {
            code_length: env_parse("OTP_CODE_LENGTH").unwrap_or(base.code_length),
            ttl_seconds: env_parse("OTP_TTL_SECONDS").unwrap_or(base.ttl_seconds),
            max_attempts: env_parse("OTP_MAX_ATTEMPTS").unwrap_or(base.max_attempts),
            cipher_key: std::env::var("OTP_CIPHER_KEY").unwrap_or(base.cipher_key),
        }
    }

    /// Set the cipher key
    pub fn with_cipher_key(mut self, key: impl Into<String>) -> Self {
        self.cipher_key = key.into();
        self
    }

    /// Set the TTL in seconds
    pub fn with_ttl_seconds(mut self, ttl_seconds: i64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// Set the attempt budget
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&self.code_length) {
            return Err(ConfigError::invalid(
                "otp.code_length",
                format!("must be between {} and {}", MIN_CODE_LENGTH, MAX_CODE_LENGTH),
            ));
        }
        if self.ttl_seconds <= 0 || self.ttl_seconds > 3600 {
            return Err(ConfigError::invalid(
                "otp.ttl_seconds",
                "must be between 1 and 3600",
            ));
        }
        if self.max_attempts == 0 || self.max_attempts > 20 {
            return Err(ConfigError::invalid(
                "otp.max_attempts",
                "must be between 1 and 20",
            ));
        }
        Ok(())
    }
}

fn default_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_ttl_seconds() -> i64 {
    DEFAULT_TTL_SECONDS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
