use actix_web::{web, HttpResponse};
use validator::Validate;

use otp_core::{Contact, DomainError};

use crate::dto::{VerifyOtpRequest, VerifyOtpResponse};
use crate::handlers::error::{handle_domain_error, verification_failed};
use crate::state::AppState;

/// Handler for POST /verify-otp
///
/// # Request Body
///
/// ```json
/// { "contact": "user@example.com", "otp": "123456" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "success": true, "message": "OTP verified." }
/// ```
///
/// ## Errors
/// Every failed verification, including malformed input, returns
/// 400 `{"error": "Invalid or expired verification code", ...}`.
pub async fn verify_otp(
    state: web::Data<AppState>,
    request: web::Json<VerifyOtpRequest>,
) -> HttpResponse {
    if request.validate().is_err() {
        return verification_failed();
    }

    let contact = match Contact::parse(&request.contact) {
        Ok(contact) => contact,
        Err(_) => return verification_failed(),
    };

    match state.otp_service.verify_otp(&contact, &request.otp).await {
        Ok(()) => HttpResponse::Ok().json(VerifyOtpResponse {
            success: true,
            message: "OTP verified.".to_string(),
        }),
        Err(DomainError::Otp(error)) if error.is_verification_failure() => verification_failed(),
        Err(error) => handle_domain_error(&error),
    }
}
