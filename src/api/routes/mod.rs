pub mod health;
pub mod tasks;
pub mod scheduling;
pub mod metrics;
