//! Notification repository

use async_trait::async_trait;
use reviewbot_client::{DeliveryError, TelegramClient};

/// Delivers text to the configured recipient
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), DeliveryError>;
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn notify(&self, message: &str) -> Result<(), DeliveryError> {
        self.send_message(message).await
    }
}
