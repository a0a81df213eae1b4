pub mod push;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;
use crate::errors::CoordError;

pub use push::PushNotifier;

/// Delivers a message to a farmer's device.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Returns the provider's message id.
    async fn send(&self, user_id: &str, title: &str, body: &str, data: Value) -> Result<String, CoordError>;
}

/// Fallback used when no push endpoint is configured. Records the message in
/// the operational log only.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl NotificationService for LogNotifier {
    async fn send(&self, user_id: &str, title: &str, body: &str, data: Value) -> Result<String, CoordError> {
        let message_id = uuid::Uuid::new_v4().to_string();
        info!(user_id, title, body, %data, message_id = %message_id, "notification (log only)");
        Ok(message_id)
    }
}
