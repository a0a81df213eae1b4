use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use crate::errors::CoordError;
use super::provider::InferenceService;
use super::types::InferenceRequest;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions client for OpenAI and any server speaking the same API
/// (Ollama, vLLM, LM Studio).
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    name: &'static str,
}

impl OpenAIProvider {
    pub fn new(api_key: &str, model: Option<&str>) -> Self {
        Self::with_base_url(api_key, model.unwrap_or("gpt-4o"), OPENAI_BASE_URL, "openai")
    }

    pub fn with_base_url(api_key: &str, model: &str, base_url: &str, name: &'static str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            name,
        }
    }

    fn build_body(&self, request: &InferenceRequest) -> Value {
        let instructions = format!(
            "{}\n\nRespond ONLY with valid JSON matching this schema:\n{}",
            request.prompt,
            serde_json::to_string_pretty(&request.schema).unwrap_or_default()
        );
        let user_content = match &request.image_data_uri {
            Some(uri) => json!([
                {"type": "text", "text": instructions},
                {"type": "image_url", "image_url": {"url": uri}},
            ]),
            None => Value::String(instructions),
        };

        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": user_content},
            ],
            "max_tokens": 2048,
            "response_format": { "type": "json_object" },
        })
    }
}

#[async_trait]
impl InferenceService for OpenAIProvider {
    async fn infer(&self, request: &InferenceRequest) -> Result<Value, CoordError> {
        let body = self.build_body(request);

        let mut req = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }
        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                CoordError::Timeout(format!("{} request timed out: {}", self.name, e))
            } else {
                CoordError::Network(format!("{} request failed: {}", self.name, e))
            }
        })?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(CoordError::RateLimit(format!("{} rate limit", self.name)));
        }
        if status.as_u16() == 401 {
            return Err(CoordError::Authentication(format!("Invalid {} API key", self.name)));
        }

        let data: Value = resp.json().await
            .map_err(|e| CoordError::Inference(format!("Failed to parse {} response: {}", self.name, e)))?;

        if let Some(error) = data.get("error") {
            return Err(CoordError::Inference(error["message"].as_str().unwrap_or("Unknown").to_string()));
        }

        let content = data["choices"][0]["message"]["content"].as_str()
            .ok_or_else(|| CoordError::Inference(format!("No content in {} response", self.name)))?;
        parse_json_content(content)
    }

    fn provider_name(&self) -> &str { self.name }
    fn model_name(&self) -> &str { &self.model }
}

/// Parse model output as a JSON object, tolerating prose or code fences
/// around it.
pub fn parse_json_content(text: &str) -> Result<Value, CoordError> {
    if let Ok(v) = serde_json::from_str::<Value>(text.trim()) {
        if v.is_object() {
            return Ok(v);
        }
    }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return serde_json::from_str(&text[start..=end])
                .map_err(|e| CoordError::Inference(format!("Invalid JSON in model output: {}", e)));
        }
    }
    Err(CoordError::Inference("No JSON object in model output".into()))
}
