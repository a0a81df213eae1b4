use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::errors::CoordError;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Selects the agent executor that runs a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Diagnostic,
    TreatmentPlan,
    WeatherAlert,
    Marketplace,
    ImageProcessing,
}

impl AgentType {
    pub const ALL: [AgentType; 5] = [
        AgentType::Diagnostic,
        AgentType::TreatmentPlan,
        AgentType::WeatherAlert,
        AgentType::Marketplace,
        AgentType::ImageProcessing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diagnostic => "diagnostic",
            Self::TreatmentPlan => "treatment_plan",
            Self::WeatherAlert => "weather_alert",
            Self::Marketplace => "marketplace",
            Self::ImageProcessing => "image_processing",
        }
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentType {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoordError::InvalidRequest(format!("Unknown agent type: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
    Scheduled,
}

impl Priority {
    /// Urgent and high priority tasks are processed as soon as they are created;
    /// everything else waits for the sweep.
    pub fn dispatch_immediately(&self) -> bool {
        matches!(self, Priority::Urgent | Priority::High)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Scheduled => "scheduled",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urgent" => Ok(Self::Urgent),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "scheduled" => Ok(Self::Scheduled),
            other => Err(CoordError::InvalidRequest(format!("Unknown priority: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Failed,
    Retry,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Retry => "retry",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        match (self, next) {
            (Pending, Assigned) => true,
            (Pending | Assigned | Retry, InProgress) => true,
            (InProgress, Completed | Retry | Failed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted unit of agent work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    pub id: String,
    pub agent_type: AgentType,
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(default)]
    pub payload: Value,
    pub retry_count: u32,
    pub max_retries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new task. Identity, timestamps, status and
/// retry count are assigned on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub agent_type: AgentType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub report_id: Option<String>,
    pub payload: Value,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
}

impl TaskSpec {
    pub fn new(agent_type: AgentType, priority: Priority, payload: Value) -> Self {
        Self {
            agent_type,
            priority,
            user_id: None,
            report_id: None,
            payload,
            max_retries: None,
            scheduled_for: None,
        }
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_report(mut self, report_id: impl Into<String>) -> Self {
        self.report_id = Some(report_id.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_for = Some(at);
        self
    }

    pub fn validate(&self) -> Result<(), CoordError> {
        if self.payload.is_null() {
            return Err(CoordError::InvalidRequest("payload is required".into()));
        }
        Ok(())
    }
}

/// Partial update merged into a stored task. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl TaskUpdate {
    pub fn assigned(at: DateTime<Utc>) -> Self {
        Self {
            status: Some(TaskStatus::Assigned),
            assigned_at: Some(at),
            ..Default::default()
        }
    }

    /// `started_at` is only written on the first attempt.
    pub fn started(task: &AgentTask, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(TaskStatus::InProgress),
            started_at: task.started_at.is_none().then_some(at),
            ..Default::default()
        }
    }

    pub fn completed(result: Value, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(TaskStatus::Completed),
            result: Some(result),
            completed_at: Some(at),
            ..Default::default()
        }
    }

    /// Status and retry count always move together.
    pub fn retrying(retry_count: u32, error: &str) -> Self {
        Self {
            status: Some(TaskStatus::Retry),
            retry_count: Some(retry_count),
            error_message: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn failed(error: &str, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(TaskStatus::Failed),
            error_message: Some(error.to_string()),
            completed_at: Some(at),
            ..Default::default()
        }
    }
}
