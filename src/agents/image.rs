use std::sync::{Arc, LazyLock};
use async_trait::async_trait;
use serde_json::{json, Value};
use crate::errors::CoordError;
use crate::llm::{InferenceRequest, InferenceService};
use super::executor::{AgentExecutor, AgentOutput, TaskContext};

const SYSTEM: &str = "You check crop photos before diagnosis. Judge whether the image is usable \
and describe what plant parts are visible.";

static ANALYSIS_SCHEMA: LazyLock<Value> = LazyLock::new(|| json!({
    "type": "object",
    "required": ["usable"],
    "properties": {
        "usable": {"type": "boolean"},
        "quality_issues": {"type": "array", "items": {"type": "string"}},
        "plant_parts": {"type": "array", "items": {"type": "string"}},
        "crop_guess": {"type": "string"}
    }
}));

pub struct ImageProcessingExecutor {
    llm: Arc<dyn InferenceService>,
}

impl ImageProcessingExecutor {
    pub fn new(llm: Arc<dyn InferenceService>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl AgentExecutor for ImageProcessingExecutor {
    async fn execute(&self, ctx: &TaskContext) -> Result<AgentOutput, CoordError> {
        let photo = ctx.payload_str(&["photo_data_uri", "photoDataUri"])
            .ok_or_else(|| CoordError::InvalidRequest("image processing needs a photo".into()))?;
        if !photo.starts_with("data:image/") {
            return Err(CoordError::InvalidRequest("photo must be an image data URI".into()));
        }

        let request = InferenceRequest::new(SYSTEM, "Assess this crop photo.", ANALYSIS_SCHEMA.clone())
            .with_image(Some(photo.to_string()));
        let analysis = self.llm.infer(&request).await?;
        let report = json!({"image_analysis": analysis});
        Ok(AgentOutput::new(analysis).with_report(report))
    }
}
