use agricoord::cli::{self, LogFormat};
use agricoord::config;
use agricoord::errors::CoordError;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    match cli.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(!cli.no_color)
            .init(),
    }

    let config_path = cli.config.as_deref();
    let db = cli.db.as_deref();
    let result = match cli.command {
        cli::Commands::Serve(args) => cli::serve::handle_serve(args, config_path, db).await,
        cli::Commands::Sweep(args) => cli::sweep::handle_sweep(args, config_path, db).await,
        cli::Commands::Weather => cli::sweep::handle_weather(config_path, db).await,
        cli::Commands::Status(args) => cli::query::handle_status(args, config_path, db).await,
        cli::Commands::Tasks(args) => cli::query::handle_tasks(args, config_path, db).await,
        cli::Commands::Metrics(args) => cli::query::handle_metrics(args, config_path, db).await,
        cli::Commands::Validate(args) => handle_validate(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let exit_code = match &e {
            CoordError::Config(_) => 2,
            CoordError::InvalidRequest(_) => 3,
            CoordError::TaskNotFound(_) | CoordError::NotFound(_) => 4,
            CoordError::Database(_) => 5,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), CoordError> {
    let config = config::parse_config(&args.config).await?;
    let coord = config.coordinator_config();
    println!("Configuration is valid: {}", args.config.display());
    println!("  database:      {}", config.database_path());
    println!("  max retries:   {}", coord.default_max_retries);
    println!("  backoff base:  {:?}", coord.backoff.base);
    println!("  sweep batch:   {}", coord.sweep_batch_size);
    if let Some(key) = config.inference.as_ref().and_then(|i| i.api_key.as_deref()) {
        println!("  inference key: {}", config::credentials::mask_secret(&config::resolve_credential(key)));
    }
    Ok(())
}
