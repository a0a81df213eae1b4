use std::sync::{Arc, LazyLock};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};
use crate::errors::CoordError;
use crate::llm::{InferenceRequest, InferenceService};
use crate::notify::NotificationService;
use super::executor::{AgentExecutor, AgentOutput, TaskContext};

const SYSTEM: &str = "You are a farm weather advisor. Given a location, list weather risks for \
the next 48 hours that affect field work, spraying, irrigation or harvest.";

static ADVISORY_SCHEMA: LazyLock<Value> = LazyLock::new(|| json!({
    "type": "object",
    "required": ["alerts", "severity"],
    "properties": {
        "alerts": {
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "kind": {"type": "string"},
                    "message": {"type": "string"}
                }
            }
        },
        "advice": {"type": "string"},
        "severity": {"type": "string", "enum": ["none", "low", "medium", "high"]}
    }
}));

/// Location advisory. Pushes a notification to the farmer when anything
/// actionable comes back.
pub struct WeatherAlertExecutor {
    llm: Arc<dyn InferenceService>,
    notifier: Arc<dyn NotificationService>,
}

impl WeatherAlertExecutor {
    pub fn new(llm: Arc<dyn InferenceService>, notifier: Arc<dyn NotificationService>) -> Self {
        Self { llm, notifier }
    }

    async fn notify(&self, user_id: &str, ctx: &TaskContext, advisory: &Value, count: usize) {
        let title = match count {
            1 => "Weather alert for your farm".to_string(),
            n => format!("{} weather alerts for your farm", n),
        };
        let body = advisory["advice"].as_str()
            .or_else(|| advisory["alerts"][0]["message"].as_str())
            .unwrap_or("Check the app for details")
            .to_string();
        let data = json!({"task_id": ctx.task_id, "type": "weather_alert"});

        match self.notifier.send(user_id, &title, &body, data).await {
            Ok(message_id) => info!(task_id = %ctx.task_id, user_id, %message_id, "Weather alert sent"),
            Err(CoordError::NoToken(_)) => info!(task_id = %ctx.task_id, user_id, "No push token, alert not sent"),
            Err(e) => warn!(task_id = %ctx.task_id, user_id, error = %e, "Weather alert notification failed"),
        }
    }
}

#[async_trait]
impl AgentExecutor for WeatherAlertExecutor {
    async fn execute(&self, ctx: &TaskContext) -> Result<AgentOutput, CoordError> {
        let (lat, lon) = match (ctx.payload_f64("latitude"), ctx.payload_f64("longitude")) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(CoordError::InvalidRequest("weather alert needs latitude and longitude".into())),
        };

        let mut prompt = format!("Coordinates: {:.4}, {:.4}\n", lat, lon);
        if let Some(name) = ctx.payload_str(&["location"]) {
            prompt.push_str(&format!("Place: {}\n", name));
        }

        let advisory = self.llm.infer(&InferenceRequest::new(SYSTEM, prompt, ADVISORY_SCHEMA.clone())).await?;

        let alert_count = advisory["alerts"].as_array().map_or(0, Vec::len);
        if let (Some(user_id), true) = (&ctx.user_id, alert_count > 0) {
            self.notify(user_id, ctx, &advisory, alert_count).await;
        }
        Ok(advisory.into())
    }
}
