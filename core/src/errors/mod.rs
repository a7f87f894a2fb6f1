//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

pub use types::OtpError;

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to the OTP lifecycle errors
    #[error(transparent)]
    Otp(#[from] OtpError),
}

impl DomainError {
    /// Only a broken random source is fatal to the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, DomainError::Otp(OtpError::GeneratorUnavailable { .. }))
    }

    /// Stable label used in structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "validation",
            DomainError::Configuration { .. } => "configuration",
            DomainError::Storage { .. } => "storage",
            DomainError::Internal { .. } => "internal",
            DomainError::Otp(err) => err.kind(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::Storage {
            message: message.into(),
        }
    }
}

impl From<otp_shared::ConfigError> for DomainError {
    fn from(err: otp_shared::ConfigError) -> Self {
        DomainError::Configuration {
            message: err.to_string(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
