use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use crate::api::AppState;
use crate::api::models::{CreateTaskRequest, ListQuery};
use crate::errors::CoordError;
use crate::models::TaskSpec;

pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Value>), CoordError> {
    let spec = TaskSpec::try_from(req)?;
    let id = state.coordinator.create_task(spec).await?;
    let task = state.coordinator.get_task_status(&id)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "status": task.map(|t| t.status),
        })),
    ))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, CoordError> {
    match state.coordinator.get_task_status(&id)? {
        Some(task) => Ok(Json(serde_json::to_value(task)?)),
        None => Err(CoordError::TaskNotFound(id)),
    }
}

pub async fn process_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, CoordError> {
    let outcome = state.coordinator.process_task(&id).await?;
    let mut body = serde_json::to_value(outcome)?;
    body["id"] = Value::String(id);
    Ok(Json(body))
}

pub async fn assign_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, CoordError> {
    let task = state.coordinator.assign_task(&id)?;
    Ok(Json(serde_json::to_value(task)?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, CoordError> {
    state.coordinator.delete_task(&id)?;
    Ok(Json(json!({"deleted": true})))
}

pub async fn get_task_decisions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, CoordError> {
    let decisions = state.coordinator.task_decisions(&id)?;
    Ok(Json(json!({ "decisions": decisions, "total": decisions.len() })))
}

pub async fn list_user_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, CoordError> {
    let limit = query.limit.unwrap_or(20);
    let tasks = state.coordinator.get_user_tasks(&user_id, limit)?;
    Ok(Json(json!({ "tasks": tasks, "total": tasks.len() })))
}
