use std::sync::{Arc, LazyLock};
use async_trait::async_trait;
use serde_json::{json, Value};
use crate::errors::CoordError;
use crate::llm::{InferenceRequest, InferenceService};
use super::executor::{AgentExecutor, AgentOutput, TaskContext};

const SYSTEM: &str = "You are an agricultural extension officer. Produce a practical treatment plan \
that prefers locally available and low-cost interventions.";

static PLAN_SCHEMA: LazyLock<Value> = LazyLock::new(|| json!({
    "type": "object",
    "required": ["steps"],
    "properties": {
        "steps": {
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "action": {"type": "string"},
                    "timing": {"type": "string"},
                    "materials": {"type": "array", "items": {"type": "string"}}
                }
            }
        },
        "organic_options": {"type": "array", "items": {"type": "string"}},
        "prevention": {"type": "array", "items": {"type": "string"}},
        "estimated_cost": {"type": "string"}
    }
}));

pub struct TreatmentPlanExecutor {
    llm: Arc<dyn InferenceService>,
}

impl TreatmentPlanExecutor {
    pub fn new(llm: Arc<dyn InferenceService>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl AgentExecutor for TreatmentPlanExecutor {
    async fn execute(&self, ctx: &TaskContext) -> Result<AgentOutput, CoordError> {
        let disease = ctx.payload_str(&["disease"])
            .ok_or_else(|| CoordError::InvalidRequest("treatment plan needs a disease".into()))?;

        let mut prompt = format!("Write a treatment plan for {}.\n", disease);
        for (label, key) in [("Crop", "crop"), ("Severity", "severity"), ("Location", "location")] {
            if let Some(value) = ctx.payload_str(&[key]) {
                prompt.push_str(&format!("{}: {}\n", label, value));
            }
        }

        let plan = self.llm.infer(&InferenceRequest::new(SYSTEM, prompt, PLAN_SCHEMA.clone())).await?;
        let report = json!({"treatment_plan": plan});
        Ok(AgentOutput::new(plan).with_report(report))
    }
}
