use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use crate::errors::CoordError;
use crate::models::{AgentTask, AgentType, Priority, TaskSpec, TaskStatus, TaskUpdate, DEFAULT_MAX_RETRIES};
use super::documents::{format_timestamp, Collection, Direction, Document, DocumentStore, FilterOp, Query};

pub const TASKS: &str = "agent_tasks";

#[derive(Serialize)]
struct NewTaskRecord<'a> {
    agent_type: AgentType,
    priority: Priority,
    status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report_id: Option<&'a str>,
    payload: &'a Value,
    retry_count: u32,
    max_retries: u32,
    /// Fixed-width so the due check can compare it as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduled_for: Option<String>,
}

/// Persisted `AgentTask` records.
#[derive(Clone)]
pub struct TaskStore {
    collection: Collection,
}

impl TaskStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { collection: Collection::new(store, TASKS) }
    }

    /// Insert a new task as `pending` with no retries used.
    pub fn create(&self, spec: &TaskSpec) -> Result<String, CoordError> {
        let record = NewTaskRecord {
            agent_type: spec.agent_type,
            priority: spec.priority,
            status: TaskStatus::Pending,
            user_id: spec.user_id.as_deref(),
            report_id: spec.report_id.as_deref(),
            payload: &spec.payload,
            retry_count: 0,
            max_retries: spec.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            scheduled_for: spec.scheduled_for.map(format_timestamp),
        };
        self.collection.add(serde_json::to_value(&record)?)
    }

    pub fn get(&self, task_id: &str) -> Result<Option<AgentTask>, CoordError> {
        self.collection.get(task_id)?.map(Document::decode).transpose()
    }

    pub fn update(&self, task_id: &str, update: &TaskUpdate) -> Result<(), CoordError> {
        self.collection.update(task_id, serde_json::to_value(update)?)
    }

    pub fn delete(&self, task_id: &str) -> Result<bool, CoordError> {
        self.collection.delete(task_id)
    }

    /// A user's tasks, newest first.
    pub fn query_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<AgentTask>, CoordError> {
        let q = Query::new()
            .filter("user_id", FilterOp::Eq, json!(user_id))
            .order_by("created_at", Direction::Desc)
            .limit(limit);
        self.decode_all(self.collection.query(&q)?)
    }

    /// Up to `cap` pending or assigned tasks that are due at `now`, oldest first.
    /// Tasks without `scheduled_for` are always due.
    pub fn query_pending(&self, now: DateTime<Utc>, cap: usize) -> Result<Vec<AgentTask>, CoordError> {
        let q = Query::new()
            .filter("status", FilterOp::In, json!([TaskStatus::Pending, TaskStatus::Assigned]))
            .filter("scheduled_for", FilterOp::LteOrNull, json!(format_timestamp(now)))
            .order_by("created_at", Direction::Asc)
            .limit(cap);
        self.decode_all(self.collection.query(&q)?)
    }

    /// Tasks currently in `status`, oldest first.
    pub fn query_by_status(&self, status: TaskStatus, limit: usize) -> Result<Vec<AgentTask>, CoordError> {
        let q = Query::new()
            .filter("status", FilterOp::Eq, json!(status))
            .order_by("created_at", Direction::Asc)
            .limit(limit);
        self.decode_all(self.collection.query(&q)?)
    }

    fn decode_all(&self, docs: Vec<Document>) -> Result<Vec<AgentTask>, CoordError> {
        docs.into_iter().map(Document::decode).collect()
    }
}
