//! Domain error to HTTP response mapping
//!
//! Verification failures of every kind share one status and one body so the
//! response cannot be used to tell an expired code from a wrong one. The
//! detailed kind only reaches the logs.

use actix_web::{
    error::JsonPayloadError,
    http::{header, StatusCode},
    HttpRequest, HttpResponse,
};
use validator::ValidationErrors;

use otp_core::{DomainError, OtpError};
use otp_shared::{error_codes, ErrorResponse};

/// The only message clients ever see for a failed verification
pub const VERIFICATION_FAILED_MESSAGE: &str = "Invalid or expired verification code";

pub const RATE_LIMITED_MESSAGE: &str = "Too many OTP requests, please try again later.";

const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

const SERVICE_UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";

// Extension trait for ErrorResponse to add actix-web specific methods
pub trait ErrorResponseExt {
    fn to_response(&self, status: StatusCode) -> HttpResponse;
}

impl ErrorResponseExt for ErrorResponse {
    fn to_response(&self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

/// Uniform 400 for any failed verification
pub fn verification_failed() -> HttpResponse {
    ErrorResponse::new(error_codes::VERIFICATION_FAILED, VERIFICATION_FAILED_MESSAGE)
        .to_response(StatusCode::BAD_REQUEST)
}

/// 400 listing the fields that failed validation
pub fn validation_failed(errors: &ValidationErrors) -> HttpResponse {
    let fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| field.to_string())
        .collect();

    ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data")
        .add_detail("fields", fields)
        .to_response(StatusCode::BAD_REQUEST)
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    match error {
        DomainError::Otp(OtpError::RateLimited {
            retry_after_seconds,
        }) => {
            let body = ErrorResponse::new(error_codes::RATE_LIMIT_EXCEEDED, RATE_LIMITED_MESSAGE)
                .add_detail("retry_after_seconds", retry_after_seconds);
            HttpResponse::TooManyRequests()
                .insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()))
                .json(body)
        }
        DomainError::Otp(otp_error) if otp_error.is_verification_failure() => verification_failed(),
        DomainError::Otp(OtpError::GeneratorUnavailable { .. }) => {
            tracing::error!(error = %error, "Code generation unavailable");
            ErrorResponse::new(error_codes::SERVICE_UNAVAILABLE, SERVICE_UNAVAILABLE_MESSAGE)
                .to_response(StatusCode::SERVICE_UNAVAILABLE)
        }
        DomainError::Validation { message } => {
            ErrorResponse::new(error_codes::VALIDATION_ERROR, message.as_str())
                .to_response(StatusCode::BAD_REQUEST)
        }
        DomainError::Storage { .. }
        | DomainError::Configuration { .. }
        | DomainError::Internal { .. }
        | DomainError::Otp(_) => {
            tracing::error!(error = %error, kind = error.kind(), "Request failed");
            ErrorResponse::new(error_codes::INTERNAL_ERROR, INTERNAL_ERROR_MESSAGE)
                .to_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// JSON body errors on `/send-otp` and other routes
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected request body");
    let response = ErrorResponse::new(error_codes::BAD_REQUEST, "Malformed request body")
        .to_response(StatusCode::BAD_REQUEST);
    actix_web::error::InternalError::from_response(err, response).into()
}

/// JSON body errors on `/verify-otp` look like any other failed verification
pub fn verify_json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected verification body");
    actix_web::error::InternalError::from_response(err, verification_failed()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_kinds_share_status() {
        let kinds = [
            OtpError::NoActiveOtp,
            OtpError::Expired,
            OtpError::Exhausted,
            OtpError::InvalidCode {
                remaining_attempts: 3,
            },
            OtpError::Decryption {
                reason: "tag mismatch".to_string(),
            },
        ];

        for kind in kinds {
            let response = handle_domain_error(&DomainError::Otp(kind));
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = handle_domain_error(&DomainError::Otp(OtpError::RateLimited {
            retry_after_seconds: 42,
        }));
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "42"
        );
    }

    #[test]
    fn test_internal_errors() {
        let response = handle_domain_error(&DomainError::storage("connection reset"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = handle_domain_error(&DomainError::Otp(OtpError::GeneratorUnavailable {
            reason: "getrandom failed".to_string(),
        }));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_validation_error() {
        let response = handle_domain_error(&DomainError::validation("Invalid contact"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
