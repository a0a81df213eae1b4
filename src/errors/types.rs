use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Task is already being processed: {0}")]
    AlreadyProcessing(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Rate limited: {0}")]
    RateLimit(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("No push token registered for user {0}")]
    NoToken(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoordError {
    /// Failures raised by the document store itself, as opposed to failures
    /// reported by an agent executor.
    pub fn is_store_error(&self) -> bool {
        matches!(self, CoordError::Database(_) | CoordError::NotFound(_))
    }
}
