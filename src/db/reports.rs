use std::sync::Arc;
use serde_json::{json, Value};
use crate::errors::CoordError;
use crate::models::ReportStatus;
use super::documents::{Collection, Document, DocumentStore};

pub const REPORTS: &str = "diagnosis_reports";

/// Diagnosis reports linked from tasks. Executors write their results here.
#[derive(Clone)]
pub struct ReportStore {
    collection: Collection,
}

impl ReportStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { collection: Collection::new(store, REPORTS) }
    }

    pub fn create(&self, user_id: &str, fields: Value) -> Result<String, CoordError> {
        let mut data = json!({"user_id": user_id, "status": ReportStatus::Pending});
        if let (Value::Object(base), Value::Object(extra)) = (&mut data, fields) {
            base.extend(extra);
        }
        self.collection.add(data)
    }

    pub fn get(&self, report_id: &str) -> Result<Option<Value>, CoordError> {
        Ok(self.collection.get(report_id)?.map(Document::into_record))
    }

    pub fn update(&self, report_id: &str, fields: Value) -> Result<(), CoordError> {
        self.collection.update(report_id, fields)
    }

    pub fn set_status(&self, report_id: &str, status: ReportStatus) -> Result<(), CoordError> {
        self.update(report_id, json!({"status": status}))
    }
}
