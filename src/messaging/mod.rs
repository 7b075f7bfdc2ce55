mod twilio;

pub use twilio::TwilioMessenger;

use async_trait::async_trait;

use crate::error::MessagingError;

/// Acknowledgement from the delivery service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Provider-assigned message id
    pub id: String,
}

/// Out-of-band delivery of a chat message
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn deliver(&self, to: &str, from: &str, body: &str)
        -> Result<DeliveryReceipt, MessagingError>;
}
