use std::sync::{Arc, LazyLock};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;
use crate::errors::CoordError;
use crate::llm::{InferenceRequest, InferenceService};
use crate::models::ReportStatus;
use super::executor::{AgentExecutor, AgentOutput, TaskContext};

const SYSTEM: &str = "You are an agronomist diagnosing crop diseases and pests for smallholder farmers. \
Base the diagnosis on the photo and the reported symptoms. Be conservative with confidence.";

static DIAGNOSIS_SCHEMA: LazyLock<Value> = LazyLock::new(|| json!({
    "type": "object",
    "required": ["disease", "confidence"],
    "properties": {
        "disease": {"type": "string"},
        "confidence": {"type": "number", "minimum": 0, "maximum": 100},
        "severity": {"type": "string", "enum": ["low", "medium", "high"]},
        "symptoms_observed": {"type": "array", "items": {"type": "string"}},
        "recommendations": {"type": "array", "items": {"type": "string"}}
    }
}));

/// Photo and symptom based disease diagnosis.
pub struct DiagnosticExecutor {
    llm: Arc<dyn InferenceService>,
}

impl DiagnosticExecutor {
    pub fn new(llm: Arc<dyn InferenceService>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl AgentExecutor for DiagnosticExecutor {
    async fn execute(&self, ctx: &TaskContext) -> Result<AgentOutput, CoordError> {
        let photo = ctx.payload_str(&["photo_data_uri", "photoDataUri"]);
        let symptoms = ctx.payload_str(&["symptoms"]);
        if photo.is_none() && symptoms.is_none() {
            return Err(CoordError::InvalidRequest("diagnostic task needs a photo or symptoms".into()));
        }

        let mut prompt = String::from("Diagnose the crop problem.\n");
        if let Some(crop) = ctx.payload_str(&["crop"]) {
            prompt.push_str(&format!("Crop: {}\n", crop));
        }
        if let Some(symptoms) = symptoms {
            prompt.push_str(&format!("Reported symptoms: {}\n", symptoms));
        }

        let request = InferenceRequest::new(SYSTEM, prompt, DIAGNOSIS_SCHEMA.clone())
            .with_image(photo.map(str::to_string));
        let diagnosis = self.llm.infer(&request).await?;

        info!(
            task_id = %ctx.task_id,
            disease = diagnosis["disease"].as_str().unwrap_or("unknown"),
            "Diagnosis produced"
        );
        let report = json!({
            "status": ReportStatus::Complete,
            "diagnosis": diagnosis,
        });
        Ok(AgentOutput::new(diagnosis).with_report(report))
    }
}
