use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;

use otp_api::{config, create_app, telemetry, AppState};
use otp_core::{AesGcmCipher, CipherKey, OsRngCodeGenerator, OtpService, OtpServiceConfig, OtpSweeper};
use otp_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load().context("Failed to load configuration")?;

    telemetry::init_tracing(&config.logging);

    tracing::info!(
        environment = %config.environment,
        storage = %config.store.backend,
        "Starting OTP Guard API server"
    );

    // Refuse to start without a working secure random source
    OsRngCodeGenerator::new()
        .self_check()
        .context("Secure random source failed its self-check")?;

    let cipher_key = load_cipher_key(&config)?;

    let infrastructure = otp_infra::initialize(&config)
        .await
        .context("Failed to initialize infrastructure")?;

    let otp_service = Arc::new(OtpService::new(
        infrastructure.store.clone(),
        infrastructure.rate_limiter.clone(),
        infrastructure.dispatcher.clone(),
        Arc::new(AesGcmCipher::new(&cipher_key)),
        OtpServiceConfig::from_config(&config.otp, &config.rate_limit),
    ));

    let sweeper = Arc::new(OtpSweeper::new(
        otp_service.clone(),
        config.store.sweep_interval_seconds,
    ));
    let sweeper_handle = sweeper.start_background_task();

    let state = web::Data::new(
        AppState::new(otp_service, &config.server).with_redis(infrastructure.redis.clone()),
    );

    let bind_address = config.server.bind_address();
    tracing::info!(address = %bind_address, "Server will bind");

    let app_config = config.clone();
    let mut server = HttpServer::new(move || create_app(state.clone(), &app_config));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await?;

    if let Some(handle) = sweeper_handle {
        handle.abort();
    }
    tracing::info!("Server stopped");
    Ok(())
}

/// The configured key, or an ephemeral one in development.
/// Codes issued under an ephemeral key do not survive a restart.
fn load_cipher_key(config: &AppConfig) -> anyhow::Result<CipherKey> {
    if config.otp.cipher_key.trim().is_empty() {
        if !config.environment.is_development() {
            anyhow::bail!("OTP_CIPHER_KEY must be set outside development");
        }
        tracing::warn!("OTP_CIPHER_KEY is not set; using an ephemeral key");
        return CipherKey::generate().context("Failed to generate ephemeral cipher key");
    }

    CipherKey::from_base64(&config.otp.cipher_key).context("Invalid OTP_CIPHER_KEY")
}
