use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub system: String,
    pub prompt: String,
    /// `data:image/...;base64,...` attached to the prompt when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data_uri: Option<String>,
    pub schema: Value,
}

impl InferenceRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            image_data_uri: None,
            schema,
        }
    }

    pub fn with_image(mut self, data_uri: Option<String>) -> Self {
        self.image_data_uri = data_uri;
        self
    }
}
