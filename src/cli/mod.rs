pub mod commands;
pub mod runtime;
pub mod serve;
pub mod sweep;
pub mod query;

pub use commands::{Cli, Commands, LogFormat};
