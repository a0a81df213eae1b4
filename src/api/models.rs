use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use crate::errors::CoordError;
use crate::models::{AgentType, Priority, TaskSpec};

/// Body of `POST /api/tasks`. Fields are optional here so that a missing
/// agent type or payload is reported as a 400 with a clear message.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(alias = "agentType")]
    pub agent_type: Option<String>,
    pub priority: Option<String>,
    #[serde(alias = "userId")]
    pub user_id: Option<String>,
    #[serde(alias = "reportId")]
    pub report_id: Option<String>,
    pub payload: Option<Value>,
    #[serde(alias = "maxRetries")]
    pub max_retries: Option<u32>,
    #[serde(alias = "scheduledFor")]
    pub scheduled_for: Option<DateTime<Utc>>,
}

impl TryFrom<CreateTaskRequest> for TaskSpec {
    type Error = CoordError;

    fn try_from(req: CreateTaskRequest) -> Result<Self, Self::Error> {
        let agent_type: AgentType = req.agent_type
            .ok_or_else(|| CoordError::InvalidRequest("agent_type is required".into()))?
            .parse()?;
        let priority = match req.priority {
            Some(p) => p.parse::<Priority>()?,
            None => Priority::default(),
        };
        let payload = req.payload
            .ok_or_else(|| CoordError::InvalidRequest("payload is required".into()))?;

        Ok(TaskSpec {
            agent_type,
            priority,
            user_id: req.user_id,
            report_id: req.report_id,
            payload,
            max_retries: req.max_retries,
            scheduled_for: req.scheduled_for,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub agent_type: Option<String>,
}
