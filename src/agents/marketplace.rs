use std::sync::{Arc, LazyLock};
use async_trait::async_trait;
use serde_json::{json, Value};
use crate::errors::CoordError;
use crate::llm::{InferenceRequest, InferenceService};
use super::executor::{AgentExecutor, AgentOutput, TaskContext};

const SYSTEM: &str = "You advise farmers on where and when to buy inputs or sell produce. \
Give price ranges as estimates and say when data is uncertain.";

static INSIGHT_SCHEMA: LazyLock<Value> = LazyLock::new(|| json!({
    "type": "object",
    "required": ["summary"],
    "properties": {
        "summary": {"type": "string"},
        "price_range": {
            "type": "object",
            "properties": {
                "low": {"type": "number"},
                "high": {"type": "number"},
                "unit": {"type": "string"}
            }
        },
        "suggestions": {"type": "array", "items": {"type": "string"}}
    }
}));

pub struct MarketplaceExecutor {
    llm: Arc<dyn InferenceService>,
}

impl MarketplaceExecutor {
    pub fn new(llm: Arc<dyn InferenceService>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl AgentExecutor for MarketplaceExecutor {
    async fn execute(&self, ctx: &TaskContext) -> Result<AgentOutput, CoordError> {
        let query = ctx.payload_str(&["query", "crop"])
            .ok_or_else(|| CoordError::InvalidRequest("marketplace task needs a query or crop".into()))?;

        let mut prompt = format!("Request: {}\n", query);
        if let Some(crop) = ctx.payload_str(&["crop"]) {
            prompt.push_str(&format!("Crop: {}\n", crop));
        }
        if let Some(location) = ctx.payload_str(&["location"]) {
            prompt.push_str(&format!("Market area: {}\n", location));
        }

        self.llm.infer(&InferenceRequest::new(SYSTEM, prompt, INSIGHT_SCHEMA.clone())).await
            .map(AgentOutput::from)
    }
}
