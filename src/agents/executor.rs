use async_trait::async_trait;
use serde_json::Value;
use crate::errors::CoordError;
use crate::models::{AgentTask, AgentType};

/// What an executor sees of the task it runs. Executors never touch the
/// task record itself.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub task_id: String,
    pub agent_type: AgentType,
    pub user_id: Option<String>,
    pub report_id: Option<String>,
    pub payload: Value,
}

impl TaskContext {
    pub fn from_task(task: &AgentTask) -> Self {
        Self {
            task_id: task.id.clone(),
            agent_type: task.agent_type,
            user_id: task.user_id.clone(),
            report_id: task.report_id.clone(),
            payload: task.payload.clone(),
        }
    }

    /// First non-empty string among `keys` in the payload.
    pub fn payload_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.payload.get(*k).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty())
    }

    pub fn payload_f64(&self, key: &str) -> Option<f64> {
        self.payload.get(key).and_then(Value::as_f64)
    }
}

/// What a successful attempt produced. `report` holds fields for the task's
/// linked report; the coordinator writes them after the task is completed.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutput {
    pub result: Value,
    pub report: Option<Value>,
}

impl AgentOutput {
    pub fn new(result: Value) -> Self {
        Self { result, report: None }
    }

    pub fn with_report(mut self, fields: Value) -> Self {
        self.report = Some(fields);
        self
    }
}

impl From<Value> for AgentOutput {
    fn from(result: Value) -> Self {
        Self::new(result)
    }
}

/// Runs one kind of agent work. Executors do not write to the store; any
/// error returned here goes through the task retry path.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    async fn execute(&self, ctx: &TaskContext) -> Result<AgentOutput, CoordError>;
}
