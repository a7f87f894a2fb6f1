//! Application factory
//!
//! Builds the Actix-web application from shared state and configuration.
//! The binary and the integration tests use the same factory.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App,
};
use tracing_actix_web::TracingLogger;

use otp_shared::AppConfig;

use crate::handlers::error::{json_error_handler, verify_json_error_handler};
use crate::middleware::{cors::create_cors, security::SecurityMiddleware};
use crate::routes::health::{health_check, not_found, service_info};
use crate::routes::otp::{send_otp, verify_otp};
use crate::state::AppState;

/// Create and configure the application with all dependencies
pub fn create_app(
    state: web::Data<AppState>,
    config: &AppConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let cors = create_cors(&config.cors);
    let security = SecurityMiddleware::from_config(config.environment, &config.server);
    let payload_limit = config.server.max_payload_size;

    App::new()
        .app_data(state)
        .app_data(
            web::JsonConfig::default()
                .limit(payload_limit)
                .error_handler(json_error_handler),
        )
        // Middleware runs outermost-last: tracing, then CORS, then security
        .wrap(security)
        .wrap(cors)
        .wrap(TracingLogger::default())
        .configure(configure_routes(payload_limit))
        .default_service(web::route().to(not_found))
}

/// Route table, shared with tests that build their own `App`
pub fn configure_routes(payload_limit: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.route("/", web::get().to(service_info))
            .route("/health", web::get().to(health_check))
            .route("/send-otp", web::post().to(send_otp))
            .service(
                web::resource("/verify-otp")
                    .app_data(
                        web::JsonConfig::default()
                            .limit(payload_limit)
                            .error_handler(verify_json_error_handler),
                    )
                    .route(web::post().to(verify_otp)),
            );
    }
}
