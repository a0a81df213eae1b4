pub mod orchestrator;
pub mod timers;
pub mod metrics;
pub mod periodic;

pub use orchestrator::{Coordinator, CoordinatorConfig, ProcessOutcome, SweepReport};
pub use timers::{Activity, RetryTimers};
pub use metrics::{aggregate, AgentMetrics};
pub use periodic::{spawn_periodic, PeriodicIntervals};
