use async_trait::async_trait;
use serde_json::Value;
use crate::errors::CoordError;
use super::types::InferenceRequest;

/// Model-backed analysis used by the agent executors.
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Structured completion. The returned value is the parsed JSON object
    /// the model produced for `request.schema`.
    async fn infer(&self, request: &InferenceRequest) -> Result<Value, CoordError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;

    /// Model identifier
    fn model_name(&self) -> &str;
}
