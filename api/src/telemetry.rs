//! Tracing subscriber installation

use otp_shared::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `LoggingConfig::level` when set.
pub fn init_tracing(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let fmt = tracing_subscriber::fmt::layer()
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    match config.format {
        LogFormat::Json => registry.with(fmt.json()).init(),
        LogFormat::Pretty => registry.with(fmt.pretty()).init(),
        LogFormat::Compact => registry.with(fmt.compact()).init(),
    }
}
