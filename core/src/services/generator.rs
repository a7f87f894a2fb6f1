//! Numeric OTP code generation backed by the OS CSPRNG

use rand::{rngs::OsRng, RngCore};

use otp_shared::config::otp::{MAX_CODE_LENGTH, MIN_CODE_LENGTH};

use crate::errors::{DomainError, DomainResult, OtpError};

/// Bytes at or above this value are discarded so `byte % 10` stays unbiased
const REJECTION_THRESHOLD: u8 = 250;

/// Source of numeric one-time codes
pub trait CodeGenerator: Send + Sync {
    /// Generate a code of exactly `length` decimal digits
    fn generate(&self, length: usize) -> DomainResult<String>;
}

/// Generator drawing every digit independently from [`OsRng`]
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRngCodeGenerator;

impl OsRngCodeGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Startup check: draws one code and checks its shape.
    /// A failure here means the process must not serve requests.
    pub fn self_check(&self) -> DomainResult<()> {
        let code = self.generate(MIN_CODE_LENGTH)?;
        if code.len() != MIN_CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpError::GeneratorUnavailable {
                reason: "self-check produced a malformed code".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl CodeGenerator for OsRngCodeGenerator {
    fn generate(&self, length: usize) -> DomainResult<String> {
        if length == 0 {
            return Err(DomainError::validation("Code length must be greater than zero"));
        }
        if length > MAX_CODE_LENGTH {
            return Err(DomainError::validation(format!(
                "Code length must not exceed {}",
                MAX_CODE_LENGTH
            )));
        }

        let mut code = String::with_capacity(length);
        let mut buf = [0u8; 16];

        while code.len() < length {
            OsRng
                .try_fill_bytes(&mut buf)
                .map_err(|e| OtpError::GeneratorUnavailable {
                    reason: e.to_string(),
                })?;

            for byte in buf.iter().copied().filter(|b| *b < REJECTION_THRESHOLD) {
                if code.len() == length {
                    break;
                }
                code.push(char::from(b'0' + byte % 10));
            }
        }

        Ok(code)
    }
}
