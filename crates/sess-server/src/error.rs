use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use sess_repo::SessionError;
use sess_types::TypeError;
use thiserror::Error;

/// Failures starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] sess_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// A failed request, rendered as `{"error": kind, "message": text}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The `source` or `type` path segment is not acceptable.
    #[error("invalid session scope: {0}")]
    Scope(#[from] TypeError),

    #[error("missing query parameter: {0}")]
    MissingParameter(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Session(SessionError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Session(SessionError::Invalid(_))
            | ApiError::Session(SessionError::QueryInvalid(_)) => StatusCode::BAD_REQUEST,
            ApiError::Session(SessionError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Scope(_) | ApiError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Session(e) => e.kind(),
            ApiError::Scope(_) => "SessionScopeInvalid",
            ApiError::MissingParameter(_) => "MissingParameter",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(kind = self.kind(), error = %self, "request rejected");
        }
        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
