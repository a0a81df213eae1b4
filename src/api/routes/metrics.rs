use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;
use crate::api::AppState;
use crate::api::models::MetricsQuery;
use crate::errors::CoordError;

pub async fn get_metrics(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<Value>, CoordError> {
    let metrics = state.coordinator.get_agent_metrics(query.agent_type.as_deref())?;
    Ok(Json(serde_json::to_value(metrics)?))
}
