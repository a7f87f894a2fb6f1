//! Health check and service information

use actix_web::{web, HttpResponse};

use crate::state::AppState;

/// Handler for GET /health
///
/// 503 when the Redis backend does not answer `PING`.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let service = &state.otp_service;

    let storage_healthy = match &state.redis {
        Some(client) => match client.health_check().await {
            Ok(healthy) => healthy,
            Err(error) => {
                tracing::warn!(error = %error, "Storage health check failed");
                false
            }
        },
        None => true,
    };

    let body = serde_json::json!({
        "status": if storage_healthy { "healthy" } else { "unhealthy" },
        "service": "otp-guard",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": service.storage_backend().to_string(),
        "delivery": service.delivery_channel(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    if storage_healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// Handler for GET /
pub async fn service_info() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "OTP Guard",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "send_otp": {
                "path": "/send-otp",
                "method": "POST",
                "description": "Issue a one-time passcode and deliver it to the contact",
                "request_body": {
                    "contact": "string (email address or E.164 phone number)"
                },
                "responses": {
                    "200": "Code issued",
                    "400": "Invalid contact",
                    "429": "Rate limit exceeded"
                }
            },
            "verify_otp": {
                "path": "/verify-otp",
                "method": "POST",
                "description": "Verify a one-time passcode",
                "request_body": {
                    "contact": "string",
                    "otp": "string"
                },
                "responses": {
                    "200": "Code verified",
                    "400": "Invalid or expired verification code"
                }
            }
        }
    }))
}

/// Default 404 handler
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(otp_shared::ErrorResponse::new(
        otp_shared::error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
