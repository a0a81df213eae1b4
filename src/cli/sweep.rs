use std::path::Path;
use std::time::Duration;
use crate::cli::commands::SweepArgs;
use crate::cli::runtime::build_runtime;
use crate::errors::CoordError;
use tracing::info;

pub async fn handle_sweep(args: SweepArgs, config: Option<&Path>, db: Option<&str>) -> Result<(), CoordError> {
    let runtime = build_runtime(config, db).await?;
    let report = runtime.coordinator.process_pending_tasks().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if args.wait {
        info!(pending = runtime.coordinator.timers().pending(), "Waiting for scheduled retries");
        while !runtime.coordinator.is_idle() {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    } else if runtime.coordinator.timers().pending() > 0 {
        info!(
            pending = runtime.coordinator.timers().pending(),
            "Retries left scheduled; they resume on the next `serve` start"
        );
    }
    Ok(())
}

pub async fn handle_weather(config: Option<&Path>, db: Option<&str>) -> Result<(), CoordError> {
    let runtime = build_runtime(config, db).await?;
    let ids = runtime.coordinator.schedule_weather_checks().await?;
    println!("Created {} weather alert task(s)", ids.len());
    for id in ids {
        println!("  {}", id);
    }
    Ok(())
}
