//! Dispatcher that records deliveries in the log instead of sending them

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{info, warn};
use uuid::Uuid;

use otp_core::{Contact, DeliveryDispatcher, DeliveryError, DeliveryReceipt};

/// Log-only delivery channel
///
/// The code itself is logged only when `reveal_codes` is set, which the
/// configuration refuses in production.
pub struct LogDispatcher {
    channel: String,
    sender_name: String,
    reveal_codes: bool,
    /// Number of deliveries handled
    message_count: AtomicU64,
    /// Whether to simulate failures
    simulate_failure: AtomicBool,
}

impl LogDispatcher {
    pub fn new(channel: impl Into<String>, sender_name: impl Into<String>, reveal_codes: bool) -> Self {
        Self {
            channel: channel.into(),
            sender_name: sender_name.into(),
            reveal_codes,
            message_count: AtomicU64::new(0),
            simulate_failure: AtomicBool::new(false),
        }
    }

    /// Make subsequent sends fail with `DeliveryError::Unavailable`
    pub fn set_simulate_failure(&self, fail: bool) {
        self.simulate_failure.store(fail, Ordering::SeqCst);
    }

    /// Number of deliveries handled so far
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryDispatcher for LogDispatcher {
    async fn send(&self, contact: &Contact, code: &str) -> Result<DeliveryReceipt, DeliveryError> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(
                channel = %self.channel,
                contact = %contact.masked(),
                "Simulated delivery failure"
            );
            return Err(DeliveryError::Unavailable(format!(
                "{} channel is unavailable",
                self.channel
            )));
        }

        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        let message_id = format!("log-{}", Uuid::new_v4());

        if self.reveal_codes {
            info!(
                event = "otp_dispatched",
                channel = %self.channel,
                sender = %self.sender_name,
                contact = %contact.masked(),
                message_id = %message_id,
                count = count,
                code = %code,
                "OTP delivered to log"
            );
        } else {
            info!(
                event = "otp_dispatched",
                channel = %self.channel,
                sender = %self.sender_name,
                contact = %contact.masked(),
                message_id = %message_id,
                count = count,
                "OTP delivered to log"
            );
        }

        Ok(DeliveryReceipt {
            message_id,
            channel: self.channel.clone(),
        })
    }

    fn channel_name(&self) -> &str {
        &self.channel
    }
}
