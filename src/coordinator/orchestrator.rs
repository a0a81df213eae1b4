use std::sync::Arc;
use std::time::{Duration, Instant};
use chrono::Utc;
use dashmap::DashSet;
use futures::future::join_all;
use serde::{Serialize, Serializer};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use crate::agents::{AgentOutput, ExecutorRegistry, TaskContext};
use crate::db::{DecisionLog, DocumentStore, ProfileStore, ReportStore, TaskStore};
use crate::errors::{BackoffPolicy, CoordError};
use crate::models::{
    AgentDecision, AgentTask, AgentType, DecisionStatus, NewDecision, Priority, ReportStatus,
    TaskSpec, TaskStatus, TaskUpdate, COORDINATOR_AGENT, DEFAULT_MAX_RETRIES,
};
use super::metrics::{aggregate, AgentMetrics};
use super::timers::{run_retry_dispatcher, Activity, ActivityHold, RetryTimers};

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub default_max_retries: u32,
    pub backoff: BackoffPolicy,
    /// `None` lets an executor run indefinitely.
    pub executor_timeout: Option<Duration>,
    pub sweep_batch_size: usize,
    pub weather_lead: Duration,
    pub metrics_window: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_max_retries: DEFAULT_MAX_RETRIES,
            backoff: BackoffPolicy::default(),
            executor_timeout: Some(Duration::from_secs(120)),
            sweep_batch_size: 10,
            weather_lead: Duration::from_secs(3600),
            metrics_window: 1000,
        }
    }
}

/// What a single `process_task` call did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProcessOutcome {
    Completed,
    Retrying {
        retry_count: u32,
        #[serde(rename = "delay_ms", serialize_with = "serialize_millis")]
        delay: Duration,
    },
    Failed,
    /// The task was already terminal; nothing was written.
    Skipped { status: TaskStatus },
}

fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepReport {
    pub dispatched: usize,
    pub completed: usize,
    pub retrying: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Removes the task id from the in-flight set when processing ends,
/// including on early return.
struct InFlightGuard<'a> {
    set: &'a DashSet<String>,
    task_id: String,
    _activity: ActivityHold,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a DashSet<String>, activity: &Activity, task_id: &str) -> Result<Self, CoordError> {
        if !set.insert(task_id.to_string()) {
            return Err(CoordError::AlreadyProcessing(task_id.to_string()));
        }
        Ok(Self { set, task_id: task_id.to_string(), _activity: activity.hold() })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.task_id);
    }
}

/// Owns the task lifecycle: creation, dispatch to executors, retry with
/// backoff and the decision audit trail.
pub struct Coordinator {
    tasks: TaskStore,
    decisions: DecisionLog,
    profiles: ProfileStore,
    reports: ReportStore,
    executors: ExecutorRegistry,
    config: CoordinatorConfig,
    timers: RetryTimers,
    in_flight: DashSet<String>,
    activity: Activity,
}

impl Coordinator {
    /// Must be called from within a tokio runtime; the retry dispatcher is
    /// spawned here.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        executors: ExecutorRegistry,
        config: CoordinatorConfig,
    ) -> Arc<Self> {
        let (fire_tx, fire_rx) = mpsc::unbounded_channel();
        let activity = Activity::default();
        let coordinator = Arc::new(Self {
            tasks: TaskStore::new(store.clone()),
            decisions: DecisionLog::new(store.clone()),
            profiles: ProfileStore::new(store.clone()),
            reports: ReportStore::new(store),
            executors,
            config,
            timers: RetryTimers::new(fire_tx, activity.clone()),
            in_flight: DashSet::new(),
            activity,
        });
        tokio::spawn(run_retry_dispatcher(Arc::downgrade(&coordinator), fire_rx));
        coordinator
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn timers(&self) -> &RetryTimers {
        &self.timers
    }

    pub async fn create_task(&self, mut spec: TaskSpec) -> Result<String, CoordError> {
        spec.validate()?;
        if spec.max_retries.is_none() {
            spec.max_retries = Some(self.config.default_max_retries);
        }

        let task_id = self.tasks.create(&spec)?;
        info!(
            task_id = %task_id,
            agent_type = %spec.agent_type,
            priority = spec.priority.as_str(),
            "Task created"
        );
        self.record(
            NewDecision::new(COORDINATOR_AGENT, "task_created", DecisionStatus::Success)
                .task(&task_id, spec.report_id.as_deref())
                .payload(json!({
                    "agent_type": spec.agent_type,
                    "priority": spec.priority,
                    "user_id": spec.user_id,
                })),
        );

        if spec.priority.dispatch_immediately() {
            self.process_task(&task_id).await?;
        }
        Ok(task_id)
    }

    pub fn get_task_status(&self, task_id: &str) -> Result<Option<AgentTask>, CoordError> {
        self.tasks.get(task_id)
    }

    pub fn get_user_tasks(&self, user_id: &str, limit: usize) -> Result<Vec<AgentTask>, CoordError> {
        self.tasks.query_by_user(user_id, limit)
    }

    pub fn task_decisions(&self, task_id: &str) -> Result<Vec<AgentDecision>, CoordError> {
        self.decisions.for_task(task_id)
    }

    /// Marks a pending task as assigned. The sweep treats it like pending.
    pub fn assign_task(&self, task_id: &str) -> Result<AgentTask, CoordError> {
        let task = self.load(task_id)?;
        if !task.status.can_transition_to(TaskStatus::Assigned) {
            return Err(CoordError::InvalidRequest(format!(
                "task {} is {}, only pending tasks can be assigned", task_id, task.status
            )));
        }
        self.tasks.update(task_id, &TaskUpdate::assigned(Utc::now()))?;
        self.record(
            NewDecision::new(COORDINATOR_AGENT, "task_assigned", DecisionStatus::Success)
                .task(task_id, task.report_id.as_deref()),
        );
        self.load(task_id)
    }

    pub fn delete_task(&self, task_id: &str) -> Result<(), CoordError> {
        let task = self.load(task_id)?;
        if self.in_flight.contains(task_id) {
            return Err(CoordError::AlreadyProcessing(task_id.to_string()));
        }
        let had_timer = self.timers.cancel(task_id);
        self.tasks.delete(task_id)?;
        info!(task_id, had_timer, "Task deleted");
        self.record(
            NewDecision::new(COORDINATOR_AGENT, "task_deleted", DecisionStatus::Success)
                .task(task_id, task.report_id.as_deref())
                .payload(json!({"status": task.status, "cancelled_retry": had_timer})),
        );
        Ok(())
    }

    /// Run one attempt of a task. Executor failures are retried with backoff
    /// up to the task's `max_retries`; store failures are returned to the
    /// caller and never retried.
    pub async fn process_task(&self, task_id: &str) -> Result<ProcessOutcome, CoordError> {
        let (outcome, _handoff) = {
            let _guard = InFlightGuard::acquire(&self.in_flight, &self.activity, task_id)?;
            let outcome = self.run_attempt(task_id).await?;
            // Spans the gap between releasing the guard and arming the timer.
            let handoff = matches!(outcome, ProcessOutcome::Retrying { .. }).then(|| self.activity.hold());
            (outcome, handoff)
        };
        if let ProcessOutcome::Retrying { delay, .. } = &outcome {
            self.timers.schedule(task_id, *delay);
        }
        Ok(outcome)
    }

    async fn run_attempt(&self, task_id: &str) -> Result<ProcessOutcome, CoordError> {
        let task = self.load(task_id)?;
        if task.status.is_terminal() {
            debug!(task_id, status = %task.status, "Task already finished, skipping");
            return Ok(ProcessOutcome::Skipped { status: task.status });
        }
        if task.status == TaskStatus::InProgress {
            // The in-flight guard is held, so no attempt for this id is running here.
            warn!(task_id, retry_count = task.retry_count, "Recovering task left in progress");
        }
        self.timers.cancel(task_id);

        self.tasks.update(task_id, &TaskUpdate::started(&task, Utc::now()))?;
        info!(
            task_id,
            agent_type = %task.agent_type,
            attempt = task.retry_count + 1,
            "Processing task"
        );

        let ctx = TaskContext::from_task(&task);
        let start = Instant::now();
        let result = self.execute(&ctx).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(output) => self.complete(&task, output, duration_ms),
            Err(e) if e.is_store_error() => {
                error!(task_id, error = %e, "Store failure during execution, attempt not counted");
                Err(e)
            }
            Err(e) => self.fail_attempt(&task, e),
        }
    }

    async fn execute(&self, ctx: &TaskContext) -> Result<AgentOutput, CoordError> {
        let executor = self.executors.get(ctx.agent_type);
        match self.config.executor_timeout {
            Some(limit) => tokio::time::timeout(limit, executor.execute(ctx))
                .await
                .map_err(|_| CoordError::Timeout(format!(
                    "{} executor did not finish within {:?}", ctx.agent_type, limit
                )))?,
            None => executor.execute(ctx).await,
        }
    }

    /// The task record is written first; the linked report follows and is
    /// best-effort, so a report problem never re-runs a finished attempt.
    fn complete(&self, task: &AgentTask, output: AgentOutput, duration_ms: u64) -> Result<ProcessOutcome, CoordError> {
        let AgentOutput { result, report } = output;
        self.tasks.update(&task.id, &TaskUpdate::completed(result, Utc::now()))?;
        info!(task_id = %task.id, agent_type = %task.agent_type, duration_ms, "Task completed");
        self.record(
            NewDecision::new(task.agent_type.as_str(), "task_completed", DecisionStatus::Success)
                .task(&task.id, task.report_id.as_deref())
                .payload(json!({"duration": duration_ms, "retry_count": task.retry_count})),
        );
        if let (Some(report_id), Some(fields)) = (&task.report_id, report) {
            if let Err(e) = self.reports.update(report_id, fields) {
                warn!(task_id = %task.id, report_id = %report_id, error = %e, "Could not update linked report");
            }
        }
        Ok(ProcessOutcome::Completed)
    }

    fn fail_attempt(&self, task: &AgentTask, err: CoordError) -> Result<ProcessOutcome, CoordError> {
        let classification = err.classify();
        let message = err.to_string();

        if task.retry_count < task.max_retries {
            let retry_count = task.retry_count + 1;
            self.tasks.update(&task.id, &TaskUpdate::retrying(retry_count, &message))?;
            let delay = self.config.backoff.delay(task.retry_count);
            warn!(
                task_id = %task.id,
                agent_type = %task.agent_type,
                retry_count,
                delay_ms = delay.as_millis() as u64,
                error_type = classification.error_type,
                error = %message,
                "Task failed, retry scheduled"
            );
            self.record(
                NewDecision::new(task.agent_type.as_str(), "task_retry", DecisionStatus::Retry)
                    .task(&task.id, task.report_id.as_deref())
                    .payload(json!({
                        "error": message,
                        "error_type": classification.error_type,
                        "retry_count": retry_count,
                        "delay_ms": delay.as_millis() as u64,
                    })),
            );
            return Ok(ProcessOutcome::Retrying { retry_count, delay });
        }

        self.tasks.update(&task.id, &TaskUpdate::failed(&message, Utc::now()))?;
        error!(
            task_id = %task.id,
            agent_type = %task.agent_type,
            retry_count = task.retry_count,
            error_type = classification.error_type,
            error = %message,
            "Task failed permanently"
        );
        self.record(
            NewDecision::new(task.agent_type.as_str(), "task_failed", DecisionStatus::Error)
                .task(&task.id, task.report_id.as_deref())
                .payload(json!({
                    "error": message,
                    "error_type": classification.error_type,
                    "retry_count": task.retry_count,
                })),
        );
        if let Some(report_id) = &task.report_id {
            if let Err(e) = self.reports.set_status(report_id, ReportStatus::Failed) {
                warn!(task_id = %task.id, report_id = %report_id, error = %e, "Could not mark report failed");
            }
        }
        Ok(ProcessOutcome::Failed)
    }

    /// Dispatch every due pending or assigned task concurrently, up to the
    /// configured batch size. One task's error never stops the others.
    pub async fn process_pending_tasks(&self) -> Result<SweepReport, CoordError> {
        let due = self.tasks.query_pending(Utc::now(), self.config.sweep_batch_size)?;
        let mut report = SweepReport { dispatched: due.len(), ..Default::default() };
        if due.is_empty() {
            debug!("Sweep found no due tasks");
            return Ok(report);
        }

        let results = join_all(due.iter().map(|t| self.process_task(&t.id))).await;
        for (task, result) in due.iter().zip(results) {
            match result {
                Ok(ProcessOutcome::Completed) => report.completed += 1,
                Ok(ProcessOutcome::Retrying { .. }) => report.retrying += 1,
                Ok(ProcessOutcome::Failed) => report.failed += 1,
                Ok(ProcessOutcome::Skipped { .. }) => report.skipped += 1,
                Err(e) => {
                    report.errors += 1;
                    warn!(task_id = %task.id, error = %e, "Sweep could not process task");
                }
            }
        }
        info!(
            dispatched = report.dispatched,
            completed = report.completed,
            retrying = report.retrying,
            failed = report.failed,
            errors = report.errors,
            "Sweep finished"
        );
        Ok(report)
    }

    /// Create one scheduled weather alert task per profile that has
    /// coordinates. Returns the new task ids.
    pub async fn schedule_weather_checks(&self) -> Result<Vec<String>, CoordError> {
        let profiles = self.profiles.list_with_coordinates()?;
        let lead = chrono::Duration::from_std(self.config.weather_lead)
            .map_err(|e| CoordError::Config(format!("weather lead out of range: {}", e)))?;
        let run_at = Utc::now() + lead;

        let mut created = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let Some(location) = profile.location else { continue };
            let spec = TaskSpec::new(
                AgentType::WeatherAlert,
                Priority::Scheduled,
                json!({
                    "latitude": location.latitude,
                    "longitude": location.longitude,
                    "location": profile.location_name,
                }),
            )
            .for_user(&profile.user_id)
            .scheduled_at(run_at);

            match self.create_task(spec).await {
                Ok(id) => created.push(id),
                Err(e) => warn!(user_id = %profile.user_id, error = %e, "Could not schedule weather check"),
            }
        }
        info!(count = created.len(), "Weather checks scheduled");
        Ok(created)
    }

    /// Aggregate the most recent decisions, optionally for one agent.
    pub fn get_agent_metrics(&self, agent_type: Option<&str>) -> Result<AgentMetrics, CoordError> {
        let decisions = self.decisions.recent(agent_type, self.config.metrics_window)?;
        Ok(aggregate(&decisions))
    }

    /// Re-arm timers for tasks left in `retry` by a previous process, each
    /// with the backoff delay of the attempt that failed. Tasks left
    /// `in_progress` with no attempt running are dispatched again at once.
    pub fn resume_retries(&self) -> Result<usize, CoordError> {
        let mut resumed = 0;
        for status in [TaskStatus::Retry, TaskStatus::InProgress] {
            for task in self.tasks.query_by_status(status, usize::MAX)? {
                if self.timers.is_pending(&task.id) || self.in_flight.contains(&task.id) {
                    continue;
                }
                let delay = match status {
                    TaskStatus::Retry => self.config.backoff.delay(task.retry_count.saturating_sub(1)),
                    _ => Duration::ZERO,
                };
                self.timers.schedule(&task.id, delay);
                resumed += 1;
            }
        }
        if resumed > 0 {
            info!(resumed, "Resumed pending retries");
        }
        Ok(resumed)
    }

    /// No task is running and no retry is waiting or being armed.
    pub fn is_idle(&self) -> bool {
        self.activity.is_idle()
    }

    fn load(&self, task_id: &str) -> Result<AgentTask, CoordError> {
        self.tasks.get(task_id)?
            .ok_or_else(|| CoordError::TaskNotFound(task_id.to_string()))
    }

    /// Decision log writes never fail the operation they describe.
    fn record(&self, entry: NewDecision) {
        if let Err(e) = self.decisions.append(&entry) {
            warn!(
                agent = %entry.agent_name,
                action = %entry.action,
                task_id = entry.task_id.as_deref().unwrap_or(""),
                error = %e,
                "Failed to write decision log entry"
            );
        }
    }
}
