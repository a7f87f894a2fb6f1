//! Background sweeping of expired OTP records and idle rate limit windows

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::errors::DomainResult;

use super::service::OtpService;
use super::types::SweepResult;

/// Periodically calls [`OtpService::sweep_expired`]
pub struct OtpSweeper {
    service: Arc<OtpService>,
    interval_seconds: u64,
}

impl OtpSweeper {
    /// `interval_seconds == 0` disables the background task
    pub fn new(service: Arc<OtpService>, interval_seconds: u64) -> Self {
        Self {
            service,
            interval_seconds,
        }
    }

    /// Run a single sweep cycle
    pub async fn run_once(&self) -> DomainResult<SweepResult> {
        self.service.sweep_expired().await
    }

    /// Start the sweep loop on the tokio runtime.
    /// Returns `None` when sweeping is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if self.interval_seconds == 0 {
            warn!("OTP sweeper is disabled");
            return None;
        }

        let interval = Duration::from_secs(self.interval_seconds);

        Some(tokio::spawn(async move {
            info!(
                interval_seconds = self.interval_seconds,
                "OTP sweeper started"
            );

            let mut interval_timer = tokio::time::interval(interval);
            // The first tick completes immediately
            interval_timer.tick().await;

            loop {
                interval_timer.tick().await;

                match self.run_once().await {
                    Ok(result) => {
                        if !result.errors.is_empty() {
                            warn!(errors = ?result.errors, "OTP sweep completed with errors");
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "OTP sweep cycle failed");
                    }
                }
            }
        }))
    }
}
