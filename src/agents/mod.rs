pub mod executor;
pub mod registry;
pub mod diagnostic;
pub mod treatment;
pub mod weather;
pub mod marketplace;
pub mod image;

pub use executor::{AgentExecutor, AgentOutput, TaskContext};
pub use registry::ExecutorRegistry;
