#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use agricoord::agents::{AgentExecutor, AgentOutput, ExecutorRegistry, TaskContext};
use agricoord::coordinator::{Coordinator, CoordinatorConfig};
use agricoord::db::decisions::DECISIONS;
use agricoord::db::tasks::TASKS;
use agricoord::db::{Database, Document, DocumentStore, Query};
use agricoord::errors::{BackoffPolicy, CoordError};
use agricoord::llm::{InferenceRequest, InferenceService};
use agricoord::models::{AgentTask, TaskStatus};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Fails the first `failures` calls, then returns `output`. Optionally
/// sleeps before answering.
pub struct ScriptedExecutor {
    failures: u32,
    output: Value,
    delay: Option<Duration>,
    calls: AtomicU32,
    pub call_times: Mutex<Vec<Instant>>,
}

impl ScriptedExecutor {
    pub fn succeeding(output: Value) -> Arc<Self> {
        Arc::new(Self::build(0, output, None))
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self::build(u32::MAX, Value::Null, None))
    }

    pub fn failing_times(failures: u32, output: Value) -> Arc<Self> {
        Arc::new(Self::build(failures, output, None))
    }

    pub fn slow(delay: Duration, output: Value) -> Arc<Self> {
        Arc::new(Self::build(0, output, Some(delay)))
    }

    fn build(failures: u32, output: Value, delay: Option<Duration>) -> Self {
        Self {
            failures,
            output,
            delay,
            calls: AtomicU32::new(0),
            call_times: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentExecutor for ScriptedExecutor {
    async fn execute(&self, _ctx: &TaskContext) -> Result<AgentOutput, CoordError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().unwrap().push(Instant::now());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if n < self.failures {
            return Err(CoordError::Inference(format!("model unavailable (call {})", n + 1)));
        }
        Ok(self.output.clone().into())
    }
}

/// Inference stub returning a fixed object and counting calls.
pub struct FixedInference {
    response: Value,
    calls: AtomicU32,
}

impl FixedInference {
    pub fn new(response: Value) -> Arc<Self> {
        Arc::new(Self { response, calls: AtomicU32::new(0) })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceService for FixedInference {
    async fn infer(&self, _request: &InferenceRequest) -> Result<Value, CoordError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    fn provider_name(&self) -> &str { "fixed" }
    fn model_name(&self) -> &str { "fixed" }
}

/// Document store that can be told to fail specific writes.
pub struct FlakyStore {
    inner: Database,
    pub fail_completion_writes: AtomicBool,
    pub fail_decision_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Database) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_completion_writes: AtomicBool::new(false),
            fail_decision_writes: AtomicBool::new(false),
        })
    }
}

impl DocumentStore for FlakyStore {
    fn add(&self, collection: &str, data: Value) -> Result<String, CoordError> {
        if collection == DECISIONS && self.fail_decision_writes.load(Ordering::SeqCst) {
            return Err(CoordError::Database("injected decision write failure".into()));
        }
        self.inner.add(collection, data)
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, CoordError> {
        self.inner.get(collection, id)
    }

    fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), CoordError> {
        if collection == TASKS
            && fields["status"] == "completed"
            && self.fail_completion_writes.load(Ordering::SeqCst)
        {
            return Err(CoordError::Database("injected store outage".into()));
        }
        self.inner.update(collection, id, fields)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool, CoordError> {
        self.inner.delete(collection, id)
    }

    fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, CoordError> {
        self.inner.query(collection, query)
    }
}

/// Millisecond backoff without jitter, no executor timeout.
pub fn fast_config(base_ms: u64) -> CoordinatorConfig {
    CoordinatorConfig {
        backoff: BackoffPolicy {
            base: Duration::from_millis(base_ms),
            max: Duration::from_secs(5),
            jitter: false,
        },
        executor_timeout: None,
        ..Default::default()
    }
}

pub fn coordinator_with(
    executor: Arc<dyn AgentExecutor>,
    config: CoordinatorConfig,
) -> (Arc<Coordinator>, Database) {
    let db = Database::in_memory().unwrap();
    let store: Arc<dyn DocumentStore> = Arc::new(db.clone());
    let coordinator = Coordinator::new(store, ExecutorRegistry::uniform(executor), config);
    (coordinator, db)
}

pub async fn wait_for_status(
    coordinator: &Coordinator,
    task_id: &str,
    status: TaskStatus,
    timeout: Duration,
) -> AgentTask {
    let deadline = Instant::now() + timeout;
    loop {
        let task = coordinator.get_task_status(task_id).unwrap().expect("task exists");
        if task.status == status {
            return task;
        }
        if Instant::now() > deadline {
            panic!("task {} stuck in {} waiting for {}", task_id, task.status, status);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn actions(coordinator: &Coordinator, task_id: &str) -> Vec<String> {
    coordinator.task_decisions(task_id).unwrap().into_iter().map(|d| d.action).collect()
}

pub fn diagnosis() -> Value {
    json!({"disease": "Rust", "confidence": 92})
}
