mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use agricoord::agents::diagnostic::DiagnosticExecutor;
use agricoord::agents::{AgentExecutor, AgentOutput, ExecutorRegistry, TaskContext};
use agricoord::coordinator::{Coordinator, CoordinatorConfig, ProcessOutcome};
use agricoord::db::{Database, DecisionLog, DocumentStore, ProfileStore, ReportStore, TaskStore};
use agricoord::errors::CoordError;
use agricoord::models::{
    AgentType, DecisionStatus, NewDecision, Priority, TaskSpec, TaskStatus, TaskUpdate, UserProfile,
};
use async_trait::async_trait;
use chrono::Utc;
use common::*;
use serde_json::json;

fn diagnostic_spec(priority: Priority) -> TaskSpec {
    TaskSpec::new(AgentType::Diagnostic, priority, json!({"symptoms": "yellow spots"})).for_user("farmer-1")
}

#[tokio::test]
async fn test_urgent_task_is_processed_before_create_returns() {
    let exec = ScriptedExecutor::succeeding(diagnosis());
    let (coord, _db) = coordinator_with(exec.clone(), fast_config(10));

    let id = coord.create_task(diagnostic_spec(Priority::Urgent)).await.unwrap();

    assert_eq!(actions(&coord, &id), vec!["task_created", "task_completed"]);
    let task = coord.get_task_status(&id).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.result.unwrap()["disease"], "Rust");
    assert!(task.started_at.is_some());
    assert!(task.completed_at.is_some());
    assert_eq!(exec.calls(), 1);
}

#[tokio::test]
async fn test_medium_task_waits_for_sweep() {
    let exec = ScriptedExecutor::succeeding(diagnosis());
    let (coord, _db) = coordinator_with(exec.clone(), fast_config(10));

    let id = coord.create_task(diagnostic_spec(Priority::Medium)).await.unwrap();
    assert_eq!(actions(&coord, &id), vec!["task_created"]);
    let task = coord.get_task_status(&id).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.completed_at.is_none());
    assert_eq!(exec.calls(), 0);

    let report = coord.process_pending_tasks().await.unwrap();
    assert_eq!(report.dispatched, 1);
    assert_eq!(report.completed, 1);
    assert_eq!(actions(&coord, &id), vec!["task_created", "task_completed"]);
}

#[tokio::test]
async fn test_backoff_doubles_until_failure() {
    let exec = ScriptedExecutor::failing();
    let (coord, _db) = coordinator_with(exec.clone(), fast_config(40));

    let id = coord.create_task(diagnostic_spec(Priority::High)).await.unwrap();
    let task = coord.get_task_status(&id).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Retry);
    assert_eq!(task.retry_count, 1);
    assert!(task.completed_at.is_none());

    let task = wait_for_status(&coord, &id, TaskStatus::Failed, Duration::from_secs(5)).await;
    assert_eq!(task.retry_count, 3);
    assert_eq!(task.max_retries, 3);
    assert!(task.completed_at.is_some());
    assert!(task.error_message.unwrap().contains("model unavailable"));

    let decisions = coord.task_decisions(&id).unwrap();
    let retries: Vec<_> = decisions.iter().filter(|d| d.action == "task_retry").collect();
    assert_eq!(retries.len(), 3);
    assert!(retries.iter().all(|d| d.status == DecisionStatus::Retry));
    let delays: Vec<u64> = retries.iter().map(|d| d.payload["delay_ms"].as_u64().unwrap()).collect();
    assert_eq!(delays, vec![40, 80, 160]);
    let counts: Vec<u64> = retries.iter().map(|d| d.payload["retry_count"].as_u64().unwrap()).collect();
    assert_eq!(counts, vec![1, 2, 3]);

    assert_eq!(decisions.iter().filter(|d| d.action == "task_failed").count(), 1);
    assert!(decisions.iter().all(|d| d.action != "task_completed"));
    assert_eq!(exec.calls(), 4);

    let times = exec.call_times.lock().unwrap().clone();
    for (gap, expected) in times.windows(2).zip([40u64, 80, 160]) {
        assert!(gap[1] - gap[0] >= Duration::from_millis(expected));
    }
}

#[tokio::test]
async fn test_retry_then_success() {
    let exec = ScriptedExecutor::failing_times(1, diagnosis());
    let (coord, _db) = coordinator_with(exec.clone(), fast_config(10));

    let id = coord.create_task(diagnostic_spec(Priority::High)).await.unwrap();
    let task = wait_for_status(&coord, &id, TaskStatus::Completed, Duration::from_secs(2)).await;
    assert_eq!(task.retry_count, 1);
    assert_eq!(actions(&coord, &id), vec!["task_created", "task_retry", "task_completed"]);
}

#[tokio::test]
async fn test_terminal_tasks_are_not_reprocessed() {
    let exec = ScriptedExecutor::succeeding(diagnosis());
    let (coord, _db) = coordinator_with(exec.clone(), fast_config(10));
    let id = coord.create_task(diagnostic_spec(Priority::Urgent)).await.unwrap();
    let before = coord.get_task_status(&id).unwrap().unwrap();

    let outcome = coord.process_task(&id).await.unwrap();
    assert_eq!(outcome, ProcessOutcome::Skipped { status: TaskStatus::Completed });

    let after = coord.get_task_status(&id).unwrap().unwrap();
    assert_eq!(after.result, before.result);
    assert_eq!(after.updated_at, before.updated_at);
    assert_eq!(exec.calls(), 1);

    let failing = ScriptedExecutor::failing();
    let (coord, _db) = coordinator_with(failing.clone(), fast_config(5));
    let id = coord.create_task(diagnostic_spec(Priority::High).with_max_retries(0)).await.unwrap();
    assert_eq!(coord.get_task_status(&id).unwrap().unwrap().status, TaskStatus::Failed);
    let outcome = coord.process_task(&id).await.unwrap();
    assert_eq!(outcome, ProcessOutcome::Skipped { status: TaskStatus::Failed });
    assert_eq!(failing.calls(), 1);
}

#[tokio::test]
async fn test_diagnostic_scenario_completes_report() {
    let db = Database::in_memory().unwrap();
    let store: Arc<dyn DocumentStore> = Arc::new(db.clone());
    let reports = ReportStore::new(store.clone());
    let diagnostic = Arc::new(DiagnosticExecutor::new(FixedInference::new(diagnosis())));
    let registry = ExecutorRegistry::uniform(ScriptedExecutor::failing())
        .with(AgentType::Diagnostic, diagnostic);
    let coord = Coordinator::new(store, registry, fast_config(10));

    let report_id = reports.create("farmer-1", json!({"crop": "wheat"})).unwrap();
    let spec = TaskSpec::new(
        AgentType::Diagnostic,
        Priority::High,
        json!({"photoDataUri": "data:image/jpeg;base64,/9j/4AAQ", "symptoms": "yellow spots"}),
    )
    .for_user("farmer-1")
    .with_report(&report_id);

    let id = coord.create_task(spec).await.unwrap();
    let task = coord.get_task_status(&id).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.result.unwrap()["disease"], "Rust");

    let report = reports.get(&report_id).unwrap().unwrap();
    assert_eq!(report["status"], "Complete");
    assert_eq!(report["diagnosis"]["confidence"], 92);
}

#[tokio::test]
async fn test_missing_report_does_not_rerun_inference() {
    let db = Database::in_memory().unwrap();
    let store: Arc<dyn DocumentStore> = Arc::new(db.clone());
    let inference = FixedInference::new(diagnosis());
    let registry = ExecutorRegistry::uniform(ScriptedExecutor::failing())
        .with(AgentType::Diagnostic, Arc::new(DiagnosticExecutor::new(inference.clone())));
    let coord = Coordinator::new(store, registry, fast_config(5));

    let id = coord
        .create_task(diagnostic_spec(Priority::High).with_report("report-never-created"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let task = coord.get_task_status(&id).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.retry_count, 0);
    assert_eq!(inference.calls(), 1);
    assert_eq!(actions(&coord, &id), vec!["task_created", "task_completed"]);
    assert_eq!(coord.timers().pending(), 0);
}

#[tokio::test]
async fn test_result_keeps_null_fields() {
    let output = json!({"details": {"spread": 3, "stage": null}, "disease": "Rust", "notes": null});
    let (coord, _db) = coordinator_with(ScriptedExecutor::succeeding(output.clone()), fast_config(10));

    let id = coord.create_task(diagnostic_spec(Priority::Urgent)).await.unwrap();

    let task = coord.get_task_status(&id).unwrap().unwrap();
    assert_eq!(task.result, Some(output));
}

#[tokio::test]
async fn test_permanent_failure_marks_report_failed() {
    let db = Database::in_memory().unwrap();
    let store: Arc<dyn DocumentStore> = Arc::new(db.clone());
    let reports = ReportStore::new(store.clone());
    let coord = Coordinator::new(store, ExecutorRegistry::uniform(ScriptedExecutor::failing()), fast_config(5));

    let report_id = reports.create("farmer-1", json!({})).unwrap();
    let id = coord
        .create_task(diagnostic_spec(Priority::High).with_report(&report_id).with_max_retries(0))
        .await
        .unwrap();

    assert_eq!(coord.get_task_status(&id).unwrap().unwrap().status, TaskStatus::Failed);
    assert_eq!(reports.get(&report_id).unwrap().unwrap()["status"], "Failed");
}

#[tokio::test]
async fn test_weather_checks_fan_out_to_located_profiles() {
    let exec = ScriptedExecutor::succeeding(json!({"alerts": []}));
    let (coord, db) = coordinator_with(exec.clone(), fast_config(10));
    let profiles = ProfileStore::new(Arc::new(db.clone()));
    profiles.create(&UserProfile::new("farmer-1").at(-0.30, 36.07)).unwrap();
    profiles.create(&UserProfile::new("farmer-2")).unwrap();
    profiles.create(&UserProfile::new("farmer-3").at(7.95, -1.02)).unwrap();

    let before = Utc::now();
    let ids = coord.schedule_weather_checks().await.unwrap();
    assert_eq!(ids.len(), 2);

    for id in &ids {
        let task = coord.get_task_status(id).unwrap().unwrap();
        assert_eq!(task.agent_type, AgentType::WeatherAlert);
        assert_eq!(task.priority, Priority::Scheduled);
        assert_eq!(task.status, TaskStatus::Pending);
        let lead = task.scheduled_for.unwrap() - before;
        assert!(lead >= chrono::Duration::seconds(3595) && lead <= chrono::Duration::seconds(3605));
        assert!(task.payload["latitude"].is_f64());
    }
    let owners: Vec<_> = ids.iter()
        .map(|id| coord.get_task_status(id).unwrap().unwrap().user_id.unwrap())
        .collect();
    assert_eq!(owners, vec!["farmer-1", "farmer-3"]);

    // not due for another hour
    let report = coord.process_pending_tasks().await.unwrap();
    assert_eq!(report.dispatched, 0);
    assert_eq!(exec.calls(), 0);
}

#[tokio::test]
async fn test_store_failure_on_completion_is_not_retried() {
    let flaky = FlakyStore::new(Database::in_memory().unwrap());
    flaky.fail_completion_writes.store(true, Ordering::SeqCst);
    let exec = ScriptedExecutor::succeeding(diagnosis());
    let coord = Coordinator::new(flaky.clone(), ExecutorRegistry::uniform(exec.clone()), fast_config(5));

    let err = coord.create_task(diagnostic_spec(Priority::Urgent)).await.unwrap_err();
    assert!(matches!(err, CoordError::Database(_)));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(exec.calls(), 1);
    assert_eq!(coord.timers().pending(), 0);

    let tasks = TaskStore::new(flaky.clone());
    let left = tasks.query_by_status(TaskStatus::InProgress, 10).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].retry_count, 0);

    // Once the store is back the same task runs to completion.
    flaky.fail_completion_writes.store(false, Ordering::SeqCst);
    let outcome = coord.process_task(&left[0].id).await.unwrap();
    assert_eq!(outcome, ProcessOutcome::Completed);
    assert_eq!(exec.calls(), 2);
    let task = coord.get_task_status(&left[0].id).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.retry_count, 0);
}

struct StoreFailingExecutor;

#[async_trait]
impl AgentExecutor for StoreFailingExecutor {
    async fn execute(&self, _ctx: &TaskContext) -> Result<AgentOutput, CoordError> {
        Err(CoordError::Database("injected read failure".into()))
    }
}

#[tokio::test]
async fn test_store_error_from_executor_does_not_use_a_retry() {
    let (coord, _db) = coordinator_with(Arc::new(StoreFailingExecutor), fast_config(5));

    let err = coord.create_task(diagnostic_spec(Priority::Urgent)).await.unwrap_err();
    assert!(matches!(err, CoordError::Database(_)));

    let tasks = coord.get_user_tasks("farmer-1", 10).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].retry_count, 0);
    assert_eq!(tasks[0].status, TaskStatus::InProgress);
    assert!(!actions(&coord, &tasks[0].id).contains(&"task_retry".to_string()));
    assert_eq!(coord.timers().pending(), 0);
}

#[tokio::test]
async fn test_decision_log_failure_does_not_fail_task() {
    let flaky = FlakyStore::new(Database::in_memory().unwrap());
    flaky.fail_decision_writes.store(true, Ordering::SeqCst);
    let coord = Coordinator::new(
        flaky.clone(),
        ExecutorRegistry::uniform(ScriptedExecutor::succeeding(diagnosis())),
        fast_config(5),
    );

    let id = coord.create_task(diagnostic_spec(Priority::Urgent)).await.unwrap();
    assert_eq!(coord.get_task_status(&id).unwrap().unwrap().status, TaskStatus::Completed);
    assert!(coord.task_decisions(&id).unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_processing_of_same_task_is_rejected() {
    let exec = ScriptedExecutor::slow(Duration::from_millis(100), diagnosis());
    let (coord, _db) = coordinator_with(exec.clone(), fast_config(10));
    let id = coord.create_task(diagnostic_spec(Priority::Medium)).await.unwrap();

    let (a, b) = tokio::join!(coord.process_task(&id), coord.process_task(&id));
    let (ok, err) = match (a, b) {
        (Ok(o), Err(e)) | (Err(e), Ok(o)) => (o, e),
        other => panic!("expected one success and one rejection, got {:?}", other),
    };
    assert_eq!(ok, ProcessOutcome::Completed);
    assert!(matches!(err, CoordError::AlreadyProcessing(_)));
    assert_eq!(exec.calls(), 1);
}

#[tokio::test]
async fn test_sweep_isolates_task_errors() {
    let exec = ScriptedExecutor::slow(Duration::from_millis(50), diagnosis());
    let (coord, _db) = coordinator_with(exec.clone(), fast_config(10));
    let a = coord.create_task(diagnostic_spec(Priority::Low)).await.unwrap();
    coord.create_task(diagnostic_spec(Priority::Low)).await.unwrap();

    // `a` is busy when the sweep reaches it
    let busy = coord.clone();
    let a_id = a.clone();
    let running = tokio::spawn(async move { busy.process_task(&a_id).await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    let report = coord.process_pending_tasks().await.unwrap();
    assert_eq!(report.dispatched, 1);
    assert_eq!(report.completed, 1);
    assert_eq!(running.await.unwrap().unwrap(), ProcessOutcome::Completed);
}

#[tokio::test]
async fn test_sweep_batch_is_capped() {
    let exec = ScriptedExecutor::succeeding(json!({}));
    let (coord, _db) = coordinator_with(exec.clone(), fast_config(10));
    for _ in 0..12 {
        coord.create_task(diagnostic_spec(Priority::Low)).await.unwrap();
    }

    let first = coord.process_pending_tasks().await.unwrap();
    assert_eq!(first.dispatched, 10);
    let second = coord.process_pending_tasks().await.unwrap();
    assert_eq!(second.dispatched, 2);
    let third = coord.process_pending_tasks().await.unwrap();
    assert_eq!(third.dispatched, 0);
}

#[tokio::test]
async fn test_delete_cancels_pending_retry() {
    let exec = ScriptedExecutor::failing();
    let (coord, _db) = coordinator_with(exec.clone(), fast_config(150));

    let id = coord.create_task(diagnostic_spec(Priority::High)).await.unwrap();
    assert!(coord.timers().is_pending(&id));

    coord.delete_task(&id).unwrap();
    assert_eq!(coord.timers().pending(), 0);
    assert!(coord.get_task_status(&id).unwrap().is_none());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(exec.calls(), 1);
    assert!(matches!(coord.delete_task(&id), Err(CoordError::TaskNotFound(_))));
}

#[tokio::test]
async fn test_executor_timeout_counts_as_failure() {
    let exec = ScriptedExecutor::slow(Duration::from_millis(500), diagnosis());
    let config = CoordinatorConfig {
        executor_timeout: Some(Duration::from_millis(30)),
        ..fast_config(5)
    };
    let (coord, _db) = coordinator_with(exec, config);

    let id = coord.create_task(diagnostic_spec(Priority::High).with_max_retries(0)).await.unwrap();
    let task = coord.get_task_status(&id).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert!(task.error_message.unwrap().starts_with("Timeout"));

    let failed = coord.task_decisions(&id).unwrap().pop().unwrap();
    assert_eq!(failed.action, "task_failed");
    assert_eq!(failed.payload["error_type"], "TimeoutError");
}

#[tokio::test]
async fn test_assign_task() {
    let exec = ScriptedExecutor::succeeding(json!({}));
    let (coord, _db) = coordinator_with(exec, fast_config(10));
    let id = coord.create_task(diagnostic_spec(Priority::Medium)).await.unwrap();

    let task = coord.assign_task(&id).unwrap();
    assert_eq!(task.status, TaskStatus::Assigned);
    assert!(task.assigned_at.is_some());
    assert!(matches!(coord.assign_task(&id), Err(CoordError::InvalidRequest(_))));

    let report = coord.process_pending_tasks().await.unwrap();
    assert_eq!(report.completed, 1);
    assert_eq!(actions(&coord, &id), vec!["task_created", "task_assigned", "task_completed"]);
}

#[tokio::test]
async fn test_missing_and_invalid_tasks() {
    let (coord, _db) = coordinator_with(ScriptedExecutor::succeeding(json!({})), fast_config(10));

    assert!(matches!(coord.process_task("nope").await, Err(CoordError::TaskNotFound(_))));
    assert!(coord.get_task_status("nope").unwrap().is_none());

    let bad = TaskSpec::new(AgentType::Marketplace, Priority::Urgent, serde_json::Value::Null).for_user("farmer-1");
    assert!(matches!(coord.create_task(bad).await, Err(CoordError::InvalidRequest(_))));
    assert!(coord.get_user_tasks("farmer-1", 20).unwrap().is_empty());
}

#[tokio::test]
async fn test_max_retries_default_comes_from_config() {
    let config = CoordinatorConfig { default_max_retries: 1, ..fast_config(10) };
    let (coord, _db) = coordinator_with(ScriptedExecutor::succeeding(json!({})), config);

    let id = coord.create_task(diagnostic_spec(Priority::Low)).await.unwrap();
    assert_eq!(coord.get_task_status(&id).unwrap().unwrap().max_retries, 1);
    let id = coord.create_task(diagnostic_spec(Priority::Low).with_max_retries(6)).await.unwrap();
    assert_eq!(coord.get_task_status(&id).unwrap().unwrap().max_retries, 6);
}

#[tokio::test]
async fn test_user_tasks_newest_first() {
    let (coord, _db) = coordinator_with(ScriptedExecutor::succeeding(json!({})), fast_config(10));
    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(coord.create_task(diagnostic_spec(Priority::Low)).await.unwrap());
    }
    let listed: Vec<_> = coord.get_user_tasks("farmer-1", 2).unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(listed, vec![ids[2].clone(), ids[1].clone()]);
}

#[tokio::test]
async fn test_resume_retries_after_restart() {
    let db = Database::in_memory().unwrap();
    let store: Arc<dyn DocumentStore> = Arc::new(db.clone());
    let tasks = TaskStore::new(store.clone());
    let id = tasks.create(&diagnostic_spec(Priority::Medium)).unwrap();
    tasks.update(&id, &TaskUpdate::retrying(1, "previous process died")).unwrap();

    let exec = ScriptedExecutor::succeeding(diagnosis());
    let coord = Coordinator::new(store, ExecutorRegistry::uniform(exec.clone()), fast_config(10));
    assert_eq!(coord.resume_retries().unwrap(), 1);
    assert!(coord.timers().is_pending(&id));

    let task = wait_for_status(&coord, &id, TaskStatus::Completed, Duration::from_secs(2)).await;
    assert_eq!(task.retry_count, 1);
    assert_eq!(exec.calls(), 1);
}

#[tokio::test]
async fn test_resume_reruns_task_left_in_progress() {
    let db = Database::in_memory().unwrap();
    let store: Arc<dyn DocumentStore> = Arc::new(db.clone());
    let tasks = TaskStore::new(store.clone());
    let id = tasks.create(&diagnostic_spec(Priority::Medium)).unwrap();
    let task = tasks.get(&id).unwrap().unwrap();
    tasks.update(&id, &TaskUpdate::started(&task, Utc::now())).unwrap();

    let exec = ScriptedExecutor::succeeding(diagnosis());
    let coord = Coordinator::new(store, ExecutorRegistry::uniform(exec.clone()), fast_config(10));
    assert_eq!(coord.resume_retries().unwrap(), 1);

    let task = wait_for_status(&coord, &id, TaskStatus::Completed, Duration::from_secs(2)).await;
    assert_eq!(task.retry_count, 0);
    assert_eq!(exec.calls(), 1);
}

#[tokio::test]
async fn test_not_idle_until_fired_retry_finishes() {
    let exec = ScriptedExecutor::failing_times(1, diagnosis());
    let (coord, _db) = coordinator_with(exec.clone(), fast_config(20));

    let id = coord.create_task(diagnostic_spec(Priority::High)).await.unwrap();
    assert!(!coord.is_idle());

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !coord.is_idle() {
        assert!(tokio::time::Instant::now() < deadline, "retry never settled");
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let task = coord.get_task_status(&id).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(exec.calls(), 2);
}

#[tokio::test]
async fn test_metrics_by_agent() {
    let (coord, db) = coordinator_with(ScriptedExecutor::succeeding(json!({})), fast_config(10));
    let log = DecisionLog::new(Arc::new(db.clone()));
    for (status, n) in [(DecisionStatus::Success, 5), (DecisionStatus::Error, 2), (DecisionStatus::Retry, 1)] {
        for i in 0..n {
            let entry = NewDecision::new("diagnostic", "task_completed", status)
                .payload(json!({"duration": 100 * (i + 1)}));
            log.append(&entry).unwrap();
        }
    }
    log.append(&NewDecision::new("coordinator", "task_created", DecisionStatus::Success)).unwrap();

    let m = coord.get_agent_metrics(Some("diagnostic")).unwrap();
    assert_eq!(m.total_tasks, 8);
    assert_eq!(m.success_count, 5);
    assert_eq!(m.error_count, 2);
    assert_eq!(m.retry_count, 1);
    assert!(m.avg_duration > 0.0);

    assert_eq!(coord.get_agent_metrics(None).unwrap().total_tasks, 9);

    let empty = coord.get_agent_metrics(Some("marketplace")).unwrap();
    assert_eq!(empty.total_tasks, 0);
    assert_eq!(empty.avg_duration, 0.0);
}

#[tokio::test]
async fn test_completed_tasks_feed_agent_metrics() {
    let (coord, _db) = coordinator_with(ScriptedExecutor::succeeding(json!({})), fast_config(10));
    coord.create_task(diagnostic_spec(Priority::Urgent)).await.unwrap();
    coord.create_task(TaskSpec::new(AgentType::Marketplace, Priority::High, json!({"query": "maize"}))).await.unwrap();

    let m = coord.get_agent_metrics(Some("diagnostic")).unwrap();
    assert_eq!(m.total_tasks, 1);
    assert_eq!(m.success_count, 1);
    assert_eq!(coord.get_agent_metrics(Some("coordinator")).unwrap().total_tasks, 2);
}
