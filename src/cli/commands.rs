use std::path::PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "agricoord", version, about = "Agent task coordinator for crop diagnosis and farm advisory")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// YAML configuration file (defaults to ./agricoord.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database path, overrides the config file
    #[arg(long, global = true)]
    pub db: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API with periodic sweep and weather triggers
    Serve(ServeArgs),
    /// Dispatch due pending tasks once
    Sweep(SweepArgs),
    /// Create weather alert tasks for every located farmer
    Weather,
    /// Show one task
    Status(StatusArgs),
    /// List a user's tasks, newest first
    Tasks(TasksArgs),
    /// Show decision-log metrics
    Metrics(MetricsArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Listen port, overrides the config file
    #[arg(long)]
    pub port: Option<u16>,

    /// Listen address, overrides the config file
    #[arg(long)]
    pub host: Option<String>,

    /// Serve the API without the periodic triggers
    #[arg(long)]
    pub no_scheduler: bool,
}

#[derive(Args, Clone)]
pub struct SweepArgs {
    /// Keep running until scheduled retries have finished
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Clone)]
pub struct StatusArgs {
    /// Task ID
    pub task_id: String,

    /// Also print the task's decision trail
    #[arg(long)]
    pub decisions: bool,
}

#[derive(Args, Clone)]
pub struct TasksArgs {
    /// User ID
    pub user_id: String,

    /// Maximum tasks to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args, Clone)]
pub struct MetricsArgs {
    /// Restrict to one agent (e.g. diagnostic, coordinator)
    #[arg(long)]
    pub agent_type: Option<String>,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: PathBuf,
}
