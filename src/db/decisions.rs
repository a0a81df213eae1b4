use std::sync::Arc;
use serde_json::{json, Value};
use crate::errors::CoordError;
use crate::models::{AgentDecision, NewDecision};
use super::documents::{Collection, Direction, Document, DocumentStore, FilterOp, Query};

pub const DECISIONS: &str = "agent_decisions";

/// Append-only audit trail of coordinator and agent actions.
#[derive(Clone)]
pub struct DecisionLog {
    collection: Collection,
}

impl DecisionLog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { collection: Collection::new(store, DECISIONS) }
    }

    pub fn append(&self, entry: &NewDecision) -> Result<String, CoordError> {
        if entry.agent_name.trim().is_empty() {
            return Err(CoordError::InvalidRequest("decision agent_name is required".into()));
        }
        if entry.action.trim().is_empty() {
            return Err(CoordError::InvalidRequest("decision action is required".into()));
        }
        self.collection.add(serde_json::to_value(entry)?)
    }

    /// Most recent decisions first, optionally only those made by `agent_name`.
    pub fn recent(&self, agent_name: Option<&str>, limit: usize) -> Result<Vec<AgentDecision>, CoordError> {
        let mut q = Query::new();
        if let Some(name) = agent_name {
            q = q.filter("agent_name", FilterOp::Eq, json!(name));
        }
        let q = q.order_by("created_at", Direction::Desc).limit(limit);
        self.collection.query(&q)?.into_iter().map(decode).collect()
    }

    /// The causal trace of one task, oldest first.
    pub fn for_task(&self, task_id: &str) -> Result<Vec<AgentDecision>, CoordError> {
        let q = Query::new()
            .filter("task_id", FilterOp::Eq, json!(task_id))
            .order_by("created_at", Direction::Asc);
        self.collection.query(&q)?.into_iter().map(decode).collect()
    }
}

fn decode(doc: Document) -> Result<AgentDecision, CoordError> {
    let mut record = doc.into_record();
    if let Value::Object(map) = &mut record {
        if let Some(created_at) = map.get("created_at").cloned() {
            map.insert("timestamp".into(), created_at);
        }
    }
    Ok(serde_json::from_value(record)?)
}
