use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;
use crate::db::ProfileStore;
use crate::errors::{with_retry, CoordError, RetryConfig};
use super::NotificationService;

/// FCM-style push delivery keyed by the token stored on the user's profile.
pub struct PushNotifier {
    client: Client,
    endpoint: String,
    server_key: String,
    profiles: ProfileStore,
    retry: RetryConfig,
}

impl PushNotifier {
    pub fn new(endpoint: &str, server_key: &str, profiles: ProfileStore) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            server_key: server_key.to_string(),
            profiles,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn post(&self, body: &Value) -> Result<String, CoordError> {
        let resp = self.client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(body)
            .send()
            .await
            .map_err(|e| CoordError::Network(format!("Push request failed: {}", e)))?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(CoordError::RateLimit("Push provider rate limit".into()));
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(CoordError::Authentication("Push provider rejected server key".into()));
        }
        if !status.is_success() {
            return Err(CoordError::Notification(format!("Push provider returned {}", status)));
        }

        let data: Value = resp.json().await
            .map_err(|e| CoordError::Notification(format!("Failed to parse push response: {}", e)))?;
        Ok(message_id(&data))
    }
}

fn message_id(response: &Value) -> String {
    response["results"][0]["message_id"].as_str()
        .or_else(|| response["message_id"].as_str())
        .or_else(|| response["name"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

#[async_trait]
impl NotificationService for PushNotifier {
    async fn send(&self, user_id: &str, title: &str, body: &str, data: Value) -> Result<String, CoordError> {
        let token = self.profiles.get_by_user(user_id)?
            .and_then(|p| p.push_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CoordError::NoToken(user_id.to_string()))?;

        let payload = json!({
            "to": token,
            "notification": {"title": title, "body": body},
            "data": data,
        });

        let id = with_retry("push_notification", &self.retry, || self.post(&payload)).await?;
        debug!(user_id, message_id = %id, "push notification sent");
        Ok(id)
    }
}
