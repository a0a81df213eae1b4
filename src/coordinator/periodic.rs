use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use super::orchestrator::Coordinator;

#[derive(Debug, Clone, Copy)]
pub struct PeriodicIntervals {
    pub sweep: Duration,
    pub weather: Duration,
}

/// Drive the sweep and the weather fan-out on fixed intervals until `cancel`
/// fires. The first sweep runs immediately; the first weather check waits a
/// full interval.
pub fn spawn_periodic(
    coordinator: Arc<Coordinator>,
    intervals: PeriodicIntervals,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sweep = interval(intervals.sweep);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut weather = interval_at(Instant::now() + intervals.weather, intervals.weather);
        weather.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            sweep_secs = intervals.sweep.as_secs(),
            weather_secs = intervals.weather.as_secs(),
            "Periodic triggers started"
        );
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sweep.tick() => {
                    if let Err(e) = coordinator.process_pending_tasks().await {
                        warn!(error = %e, "Scheduled sweep failed");
                    }
                }
                _ = weather.tick() => {
                    if let Err(e) = coordinator.schedule_weather_checks().await {
                        warn!(error = %e, "Scheduled weather checks failed");
                    }
                }
            }
        }
        info!("Periodic triggers stopped");
    })
}
