use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use otp_core::Contact;

use crate::dto::{SendOtpRequest, SendOtpResponse};
use crate::handlers::error::{handle_domain_error, validation_failed};
use crate::state::AppState;

use super::extract_client_ip;

/// Handler for POST /send-otp
///
/// # Request Body
///
/// ```json
/// { "contact": "user@example.com" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "message": "OTP sent successfully.", "expires_in": 120 }
/// ```
///
/// The code itself is never part of the response.
///
/// ## Errors
/// - 400 malformed contact
/// - 429 rate limit exceeded, with `Retry-After`
/// - 500 storage failure
pub async fn send_otp(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<SendOtpRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        tracing::debug!(errors = %errors, "Invalid send_otp request");
        return validation_failed(&errors);
    }

    let contact = match Contact::parse(&request.contact) {
        Ok(contact) => contact,
        Err(error) => return handle_domain_error(&error),
    };

    let client_ip = extract_client_ip(&req, &state);

    match state
        .otp_service
        .issue_otp(&contact, client_ip.as_deref())
        .await
    {
        Ok(result) => HttpResponse::Ok().json(SendOtpResponse {
            message: "OTP sent successfully.".to_string(),
            expires_in: result.expires_in_seconds,
        }),
        Err(error) => handle_domain_error(&error),
    }
}
