//! Unit tests for domain error types

use super::*;

#[test]
fn test_otp_error_kinds_are_stable() {
    assert_eq!(OtpError::NoActiveOtp.kind(), "no_active_otp");
    assert_eq!(OtpError::Exhausted.kind(), "exhausted");
    assert_eq!(
        OtpError::InvalidCode { remaining_attempts: 2 }.kind(),
        "invalid_code"
    );
    assert_eq!(
        DomainError::from(OtpError::RateLimited { retry_after_seconds: 30 }).kind(),
        "rate_limited"
    );
    assert_eq!(DomainError::storage("down").kind(), "storage");
}

#[test]
fn test_verification_failures() {
    assert!(OtpError::NoActiveOtp.is_verification_failure());
    assert!(OtpError::Expired.is_verification_failure());
    assert!(OtpError::Exhausted.is_verification_failure());
    assert!(OtpError::InvalidCode { remaining_attempts: 1 }.is_verification_failure());
    assert!(OtpError::Decryption { reason: "tag".into() }.is_verification_failure());
    assert!(!OtpError::RateLimited { retry_after_seconds: 1 }.is_verification_failure());
    assert!(!OtpError::GeneratorUnavailable { reason: "os".into() }.is_verification_failure());
}

#[test]
fn test_only_generator_failure_is_fatal() {
    let fatal: DomainError = OtpError::GeneratorUnavailable {
        reason: "getrandom failed".into(),
    }
    .into();
    assert!(fatal.is_fatal());
    assert!(!DomainError::from(OtpError::Exhausted).is_fatal());
    assert!(!DomainError::storage("connection reset").is_fatal());
}

#[test]
fn test_error_messages() {
    let error = OtpError::InvalidCode { remaining_attempts: 3 };
    assert!(error.to_string().contains("3 attempts remaining"));

    let config_error: DomainError =
        otp_shared::ConfigError::invalid("otp.ttl_seconds", "must be positive").into();
    assert!(matches!(config_error, DomainError::Configuration { .. }));
    assert!(config_error.to_string().contains("otp.ttl_seconds"));
}
