use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use crate::errors::CoordError;

impl IntoResponse for CoordError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            CoordError::InvalidRequest(_) | CoordError::Config(_) => StatusCode::BAD_REQUEST,
            CoordError::TaskNotFound(_) | CoordError::NotFound(_) => StatusCode::NOT_FOUND,
            CoordError::AlreadyProcessing(_) => StatusCode::CONFLICT,
            CoordError::Authentication(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}
