//! Layered configuration loading
//!
//! Sources, lowest precedence first:
//! 1. Presets for the detected environment (`AppConfig::for_environment`)
//! 2. Optional `config/config.{environment}.toml`
//! 3. `OTP__SECTION__FIELD` environment variables
//! 4. Flat variables kept for existing deployments (`OTP_CIPHER_KEY`, `REDIS_URL`,
//!    `SERVER_PORT`, `ALLOWED_ORIGINS`, ...)
//!
//! `.env` is loaded first so it can feed any of the environment based layers.

use otp_shared::{
    AppConfig, CacheConfig, ConfigError as SettingsError, CorsConfig, Environment, OtpConfig,
    RateLimitConfig, ServerConfig,
};
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error(transparent)]
    Invalid(#[from] SettingsError),
}

/// Load and validate the application configuration
pub fn load() -> Result<AppConfig, ConfigLoadError> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();
    let config = load_for(environment, Some(&environment.config_file()))?;
    config.validate()?;
    Ok(config)
}

/// Build the layered configuration for `environment`.
/// `file` is a path stem without extension; a missing file is not an error.
pub fn load_for(environment: Environment, file: Option<&str>) -> Result<AppConfig, ConfigLoadError> {
    let defaults = AppConfig::for_environment(environment);

    let mut builder = config::Config::builder().add_source(config::Config::try_from(&defaults)?);

    if let Some(file) = file {
        builder = builder.add_source(config::File::with_name(file).required(false));
    }

    let layered: AppConfig = builder
        .add_source(
            config::Environment::with_prefix("OTP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    Ok(apply_flat_env(layered))
}

fn apply_flat_env(config: AppConfig) -> AppConfig {
    AppConfig {
        server: ServerConfig::from_env_or(config.server),
        otp: OtpConfig::from_env_or(config.otp),
        rate_limit: RateLimitConfig::from_env_or(config.rate_limit),
        cache: CacheConfig::from_env_or(config.cache),
        cors: CorsConfig::from_env_or(config.cors),
        ..config
    }
}
