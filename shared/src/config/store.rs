//! OTP record store configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Backing implementation of the OTP record store and rate limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local maps; single instance deployments and tests
    Memory,
    /// Shared Redis instance; multi-instance deployments
    Redis,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Redis => write!(f, "redis"),
        }
    }
}

/// Store selection and maintenance settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Which backend to use
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// How often the background sweeper purges expired records, in seconds.
    /// Zero disables the sweeper, which only the Redis backend allows.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

impl StoreConfig {
    /// Redis backend with default sweeping
    pub fn redis() -> Self {
        Self {
            backend: StoreBackend::Redis,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Process-local maps are only ever shrunk by the sweeper
        if self.sweep_interval_seconds == 0 && self.backend == StoreBackend::Memory {
            return Err(ConfigError::invalid(
                "store.sweep_interval_seconds",
                "the memory backend needs the sweeper enabled",
            ));
        }
        if self.sweep_interval_seconds > 86_400 {
            return Err(ConfigError::invalid(
                "store.sweep_interval_seconds",
                "must not exceed one day",
            ));
        }
        Ok(())
    }
}

fn default_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_sweep_interval() -> u64 {
    60
}
