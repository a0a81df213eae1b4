use std::path::Path;
use crate::cli::commands::{MetricsArgs, StatusArgs, TasksArgs};
use crate::cli::runtime::build_runtime;
use crate::errors::CoordError;

pub async fn handle_status(args: StatusArgs, config: Option<&Path>, db: Option<&str>) -> Result<(), CoordError> {
    let runtime = build_runtime(config, db).await?;
    let task = runtime.coordinator.get_task_status(&args.task_id)?
        .ok_or_else(|| CoordError::TaskNotFound(args.task_id.clone()))?;
    println!("{}", serde_json::to_string_pretty(&task)?);

    if args.decisions {
        for d in runtime.coordinator.task_decisions(&args.task_id)? {
            println!(
                "{}  {:<12} {:<16} {:?}",
                d.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"), d.agent_name, d.action, d.status
            );
        }
    }
    Ok(())
}

pub async fn handle_tasks(args: TasksArgs, config: Option<&Path>, db: Option<&str>) -> Result<(), CoordError> {
    let runtime = build_runtime(config, db).await?;
    let tasks = runtime.coordinator.get_user_tasks(&args.user_id, args.limit)?;
    if tasks.is_empty() {
        println!("No tasks for {}", args.user_id);
        return Ok(());
    }
    for t in tasks {
        println!(
            "{}  {:<16} {:<9} {:<11} retries {}/{}",
            t.id, t.agent_type.as_str(), t.priority.as_str(), t.status.as_str(), t.retry_count, t.max_retries
        );
    }
    Ok(())
}

pub async fn handle_metrics(args: MetricsArgs, config: Option<&Path>, db: Option<&str>) -> Result<(), CoordError> {
    let runtime = build_runtime(config, db).await?;
    let metrics = runtime.coordinator.get_agent_metrics(args.agent_type.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}
