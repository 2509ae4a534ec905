use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// A capability or registry object needed to build an intent was not found
    MissingReference(String),
    /// One or more cross-referenced objects could not be fetched
    ResolutionFailed(String),
    NotFound(String),
    /// The signing collaborator rejected or failed to execute a transaction
    Submission(String),
    /// The ledger node answered with a JSON-RPC error object
    Rpc { code: i64, message: String },
    Network(String),
    BadRequest(String),
    Validation(String),
    DeserializationError(String),
    ConfigurationError(String),
    /// The view that requested the work was torn down
    Cancelled(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingReference(msg) => write!(f, "Missing reference: {}", msg),
            AppError::ResolutionFailed(msg) => write!(f, "Resolution failed: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Submission(msg) => write!(f, "Submission failed: {}", msg),
            AppError::Rpc { code, message } => write!(f, "RPC error {}: {}", code, message),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Cancelled(msg) => write!(f, "Cancelled: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Whether this error means the requested object simply is not on chain
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::MissingReference(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::ResolutionFailed(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Submission(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Rpc { code, message } => {
                tracing::error!("RPC error {}: {}", code, message);
                (StatusCode::BAD_GATEWAY, "Ledger node error".to_string())
            }
            AppError::Network(msg) => {
                tracing::error!("Network error: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Ledger node unreachable".to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::DeserializationError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::ConfigurationError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Cancelled(msg) => (StatusCode::REQUEST_TIMEOUT, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::DeserializationError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
