//! OTP lifecycle error types
//!
//! These errors describe why an issuance or verification did not succeed.
//! Detailed kinds are meant for logs and tests; the presentation layer collapses
//! verification kinds into one generic message.

use thiserror::Error;

/// Errors produced by the OTP manager and its collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("Too many requests, retry after {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    #[error("No active verification code")]
    NoActiveOtp,

    #[error("Verification code expired")]
    Expired,

    #[error("Maximum verification attempts exceeded")]
    Exhausted,

    #[error("Invalid verification code, {remaining_attempts} attempts remaining")]
    InvalidCode { remaining_attempts: u32 },

    #[error("Stored code could not be decrypted: {reason}")]
    Decryption { reason: String },

    #[error("Secure random source unavailable: {reason}")]
    GeneratorUnavailable { reason: String },
}

impl OtpError {
    /// Stable snake_case label used in structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            OtpError::RateLimited { .. } => "rate_limited",
            OtpError::NoActiveOtp => "no_active_otp",
            OtpError::Expired => "expired",
            OtpError::Exhausted => "exhausted",
            OtpError::InvalidCode { .. } => "invalid_code",
            OtpError::Decryption { .. } => "decryption",
            OtpError::GeneratorUnavailable { .. } => "generator_unavailable",
        }
    }

    /// Whether this is one of the outcomes of a failed verification.
    /// All of these are reported to clients identically.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            OtpError::NoActiveOtp
                | OtpError::Expired
                | OtpError::Exhausted
                | OtpError::InvalidCode { .. }
                | OtpError::Decryption { .. }
        )
    }
}
