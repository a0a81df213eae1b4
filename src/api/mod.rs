pub mod routes;
pub mod models;
pub mod errors;
pub mod auth;

use std::sync::Arc;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::coordinator::Coordinator;

pub const API_TOKEN_ENV: &str = "AGRICOORD_API_TOKEN";

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    /// Bearer token required on every route except health. `None` disables auth.
    pub api_token: Option<String>,
}

impl AppState {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator, api_token: None }
    }

    /// Reads the token from `AGRICOORD_API_TOKEN`; empty means disabled.
    pub fn with_env_token(mut self) -> Self {
        self.api_token = std::env::var(API_TOKEN_ENV).ok().filter(|t| !t.is_empty());
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/tasks", post(routes::tasks::create_task))
        .route("/api/tasks/:id", get(routes::tasks::get_task).delete(routes::tasks::delete_task))
        .route("/api/tasks/:id/process", post(routes::tasks::process_task))
        .route("/api/tasks/:id/assign", post(routes::tasks::assign_task))
        .route("/api/tasks/:id/decisions", get(routes::tasks::get_task_decisions))
        .route("/api/users/:user_id/tasks", get(routes::tasks::list_user_tasks))
        .route("/api/sweep", post(routes::scheduling::run_sweep))
        .route("/api/weather-checks", post(routes::scheduling::schedule_weather_checks))
        .route("/api/metrics", get(routes::metrics::get_metrics))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::api_auth_middleware));

    Router::new()
        .route("/api/health", get(routes::health::health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
