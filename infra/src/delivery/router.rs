//! Routes deliveries to the channel matching the contact kind

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use otp_core::{Contact, ContactKind, DeliveryDispatcher, DeliveryError, DeliveryReceipt};

/// Email and SMS dispatchers behind one [`DeliveryDispatcher`]
pub struct ChannelRouter {
    email: Option<Arc<dyn DeliveryDispatcher>>,
    sms: Option<Arc<dyn DeliveryDispatcher>>,
}

impl ChannelRouter {
    pub fn new(
        email: Option<Arc<dyn DeliveryDispatcher>>,
        sms: Option<Arc<dyn DeliveryDispatcher>>,
    ) -> Self {
        Self { email, sms }
    }

    fn route(&self, kind: ContactKind) -> Option<&Arc<dyn DeliveryDispatcher>> {
        match kind {
            ContactKind::Email => self.email.as_ref(),
            ContactKind::Phone => self.sms.as_ref(),
        }
    }
}

#[async_trait]
impl DeliveryDispatcher for ChannelRouter {
    async fn send(&self, contact: &Contact, code: &str) -> Result<DeliveryReceipt, DeliveryError> {
        let dispatcher = self
            .route(contact.kind())
            .ok_or(DeliveryError::UnsupportedContact(contact.kind()))?;

        debug!(channel = dispatcher.channel_name(), "Routing OTP delivery");
        dispatcher.send(contact, code).await
    }

    fn channel_name(&self) -> &str {
        "router"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::LogDispatcher;

    #[tokio::test]
    async fn test_routes_by_contact_kind() {
        let email = Arc::new(LogDispatcher::new("email", "OTP Guard", false));
        let sms = Arc::new(LogDispatcher::new("sms", "OTP Guard", false));
        let router = ChannelRouter::new(
            Some(email.clone() as Arc<dyn DeliveryDispatcher>),
            Some(sms.clone() as Arc<dyn DeliveryDispatcher>),
        );

        let receipt = router
            .send(&Contact::parse("a@b.com").unwrap(), "123456")
            .await
            .unwrap();
        assert_eq!(receipt.channel, "email");

        let receipt = router
            .send(&Contact::parse("+14155552671").unwrap(), "123456")
            .await
            .unwrap();
        assert_eq!(receipt.channel, "sms");

        assert_eq!(email.message_count(), 1);
        assert_eq!(sms.message_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_channel() {
        let email: Arc<dyn DeliveryDispatcher> =
            Arc::new(LogDispatcher::new("email", "OTP Guard", false));
        let router = ChannelRouter::new(Some(email), None);

        let result = router
            .send(&Contact::parse("+14155552671").unwrap(), "123456")
            .await;
        assert!(matches!(
            result,
            Err(DeliveryError::UnsupportedContact(ContactKind::Phone))
        ));
    }
}
