//! Delivery dispatcher integration

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::value_objects::{Contact, ContactKind};

/// Confirmation returned by a dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Provider message identifier
    pub message_id: String,
    /// Channel that carried the message
    pub channel: String,
}

/// Why a code could not be handed to a delivery channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Delivery channel unavailable: {0}")]
    Unavailable(String),

    #[error("Delivery rejected by provider: {0}")]
    Rejected(String),

    #[error("No delivery channel configured for {0:?} contacts")]
    UnsupportedContact(ContactKind),
}

/// Out-of-band channel (email, SMS) that carries the plaintext code to the user
#[async_trait]
pub trait DeliveryDispatcher: Send + Sync {
    /// Deliver `code` to `contact`
    async fn send(&self, contact: &Contact, code: &str) -> Result<DeliveryReceipt, DeliveryError>;

    /// Short channel name for logs and health output
    fn channel_name(&self) -> &str;
}
