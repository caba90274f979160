use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RoostError {
    /// Invalid or missing required field for a selected variant or backend.
    /// Fatal: aborts startup before the runtime activates.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Valid descriptor, but the backend could not be reached.
    #[error("connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A schema query failed during `up` or `down`. No automatic rollback.
    #[error("migration error: {0}")]
    Migration(#[source] SqlxError),

    /// Request-time query failure in a repository.
    #[error("database error: {0}")]
    Database(#[from] SqlxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RoostError {
    pub fn config(msg: impl Into<String>) -> Self {
        RoostError::Configuration(msg.into())
    }

    /// Configuration error for a required key that is unset or empty.
    pub fn missing(key: &str) -> Self {
        RoostError::Configuration(format!("missing required setting `{key}`"))
    }
}

impl From<figment::Error> for RoostError {
    fn from(e: figment::Error) -> Self {
        RoostError::Configuration(e.to_string())
    }
}

impl IntoResponse for RoostError {
    fn into_response(self) -> axum::response::Response {
        let body = match self {
            RoostError::Configuration(_) => ApiErrorBody {
                code: "CONFIGURATION".to_string(),
                message: "The server is misconfigured.".to_string(),
            },
            RoostError::Connection(_)
            | RoostError::Migration(_)
            | RoostError::Database(_)
            | RoostError::Io(_) => ApiErrorBody {
                code: "INTERNAL_ERROR".to_string(),
                message: "An internal server error occurred.".to_string(),
            },
        };
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiErrorResponse { error: body }),
        )
            .into_response()
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
