use super::types::CoordError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl CoordError {
    /// Classify this error to determine its type and whether it can be retried.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Retryable errors
            CoordError::RateLimit(_) => ErrorClassification {
                error_type: "RateLimitError",
                retryable: true,
            },
            CoordError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                retryable: true,
            },
            CoordError::Timeout(_) => ErrorClassification {
                error_type: "TimeoutError",
                retryable: true,
            },
            CoordError::Inference(_) => ErrorClassification {
                error_type: "InferenceError",
                retryable: true,
            },
            CoordError::Database(_) => ErrorClassification {
                error_type: "StoreWriteError",
                retryable: true,
            },
            CoordError::Notification(_) => ErrorClassification {
                error_type: "NotificationError",
                retryable: true,
            },
            CoordError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: true,
            },
            CoordError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: true,
            },

            // Non-retryable errors
            CoordError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            CoordError::InvalidRequest(_) => ErrorClassification {
                error_type: "InvalidRequestError",
                retryable: false,
            },
            CoordError::TaskNotFound(_) => ErrorClassification {
                error_type: "TaskNotFoundError",
                retryable: false,
            },
            CoordError::NotFound(_) => ErrorClassification {
                error_type: "NotFoundError",
                retryable: false,
            },
            CoordError::AlreadyProcessing(_) => ErrorClassification {
                error_type: "AlreadyProcessingError",
                retryable: false,
            },
            CoordError::Authentication(_) => ErrorClassification {
                error_type: "AuthenticationError",
                retryable: false,
            },
            CoordError::NoToken(_) => ErrorClassification {
                error_type: "NoTokenError",
                retryable: false,
            },
            CoordError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: false,
            },
            CoordError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },
        }
    }
}
