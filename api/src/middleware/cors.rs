//! CORS middleware configuration for cross-origin requests.
//!
//! Browser clients call `/send-otp` and `/verify-otp` directly, so the
//! allowed origins come from [`CorsConfig`]: `*` in development, an explicit
//! list (`ALLOWED_ORIGINS`) elsewhere.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use otp_shared::CorsConfig;

/// Creates a CORS middleware instance from configuration.
///
/// A disabled configuration yields the actix default, which rejects
/// cross-origin requests.
pub fn create_cors(config: &CorsConfig) -> Cors {
    if !config.enabled {
        tracing::info!("CORS is disabled");
        return Cors::default();
    }

    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers(vec![
            header::RETRY_AFTER,
            header::HeaderName::from_static("x-request-id"),
        ])
        .max_age(config.max_age);

    if config.allows_any_origin() {
        tracing::info!("Configuring CORS to allow any origin");
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.allowed_origins {
            tracing::info!(origin = %origin, "Adding allowed origin");
            cors = cors.allowed_origin(origin);
        }
    }

    // Credentials cannot be combined with a wildcard origin
    if config.allow_credentials && !config.allows_any_origin() {
        cors = cors.supports_credentials();
    }

    cors
}
