use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const COORDINATOR_AGENT: &str = "coordinator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    Success,
    Error,
    Retry,
}

/// An audit record as stored in the decision log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDecision {
    pub id: String,
    pub agent_name: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    pub status: DecisionStatus,
    #[serde(default)]
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

impl AgentDecision {
    /// Execution time recorded with the decision, in milliseconds.
    pub fn duration(&self) -> Option<f64> {
        self.payload.get("duration").and_then(Value::as_f64)
    }
}

/// A decision waiting to be appended. The timestamp is assigned by the store.
#[derive(Debug, Clone, Serialize)]
pub struct NewDecision {
    pub agent_name: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    pub status: DecisionStatus,
    pub payload: Value,
}

impl NewDecision {
    pub fn new(agent_name: impl Into<String>, action: impl Into<String>, status: DecisionStatus) -> Self {
        Self {
            agent_name: agent_name.into(),
            action: action.into(),
            task_id: None,
            report_id: None,
            status,
            payload: Value::Object(Default::default()),
        }
    }

    pub fn task(mut self, task_id: &str, report_id: Option<&str>) -> Self {
        self.task_id = Some(task_id.to_string());
        self.report_id = report_id.map(str::to_string);
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}
