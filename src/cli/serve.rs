use std::path::Path;
use crate::cli::commands::ServeArgs;
use crate::cli::runtime::build_runtime;
use crate::coordinator::spawn_periodic;
use crate::errors::CoordError;
use crate::api;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn handle_serve(args: ServeArgs, config: Option<&Path>, db: Option<&str>) -> Result<(), CoordError> {
    let runtime = build_runtime(config, db).await?;
    let (default_host, default_port) = runtime.config.bind_address();
    let host = args.host.unwrap_or(default_host);
    let port = args.port.unwrap_or(default_port);

    runtime.coordinator.resume_retries()?;

    let cancel = CancellationToken::new();
    let scheduler = (!args.no_scheduler).then(|| {
        spawn_periodic(runtime.coordinator.clone(), runtime.config.periodic_intervals(), cancel.clone())
    });

    let state = api::AppState::new(runtime.coordinator.clone()).with_env_token();
    if state.api_token.is_none() {
        info!("API token not set, endpoints are unauthenticated");
    }
    let app = api::build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
            shutdown.cancel();
        })
        .await
        .map_err(|e| CoordError::Internal(format!("Server error: {}", e)))?;

    cancel.cancel();
    if let Some(handle) = scheduler {
        let _ = handle.await;
    }
    runtime.coordinator.timers().cancel_all();
    Ok(())
}
