use axum::{extract::State, Json};
use serde_json::{json, Value};
use crate::api::AppState;
use crate::errors::CoordError;

pub async fn run_sweep(State(state): State<AppState>) -> Result<Json<Value>, CoordError> {
    let report = state.coordinator.process_pending_tasks().await?;
    Ok(Json(serde_json::to_value(report)?))
}

pub async fn schedule_weather_checks(State(state): State<AppState>) -> Result<Json<Value>, CoordError> {
    let ids = state.coordinator.schedule_weather_checks().await?;
    Ok(Json(json!({ "created": ids.len(), "task_ids": ids })))
}
