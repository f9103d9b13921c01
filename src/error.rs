use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum PocketError {
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("Storage handle is closed")]
    StorageClosed,

    #[error("Unsupported scope type: {0}")]
    UnsupportedScope(String),

    #[error("Protocol violation in {scope} exchange: {message}")]
    ProtocolViolation { scope: &'static str, message: String },

    #[error("Application is not running")]
    NotStarted,

    #[error("Handler task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Exchange closed by peer")]
    ExchangeClosed,
}

impl From<figment::Error> for PocketError {
    fn from(e: figment::Error) -> Self {
        PocketError::Config(Box::new(e))
    }
}

impl PocketError {
    pub fn protocol(scope: &'static str, message: impl Into<String>) -> Self {
        PocketError::ProtocolViolation {
            scope,
            message: message.into(),
        }
    }
}

impl IntoResponse for PocketError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            PocketError::NotStarted | PocketError::StorageClosed => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorBody {
                    code: "NOT_READY".to_string(),
                    message: "Application is not accepting requests.".to_string(),
                },
            ),
            PocketError::UnsupportedScope(_) | PocketError::ProtocolViolation { .. } => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "PROTOCOL_ERROR".to_string(),
                    message: self.to_string(),
                },
            ),
            PocketError::Database(_)
            | PocketError::Config(_)
            | PocketError::Io(_)
            | PocketError::Integrity(_)
            | PocketError::Task(_)
            | PocketError::ExchangeClosed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                },
            ),
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
