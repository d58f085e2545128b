/// Unified error handling module
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Upstream bodies can be whole HTML pages; keep only the head of them
const MAX_UPSTREAM_MESSAGE: usize = 200;

/// Unified error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Upstream answered with a non-success status
    #[error("{source_name} returned HTTP {status}: {message}")]
    UpstreamHttp {
        source_name: &'static str,
        status: u16,
        message: String,
    },

    /// Upstream answered 2xx but the payload was not what we read
    #[error("{source_name} returned an unexpected payload: {detail}")]
    UpstreamShape {
        source_name: &'static str,
        detail: String,
    },

    /// Network-level failure, including timeouts
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn upstream_http(source_name: &'static str, status: u16, body: &str) -> Self {
        let message: String = body.trim().chars().take(MAX_UPSTREAM_MESSAGE).collect();
        ApiError::UpstreamHttp {
            source_name,
            status,
            message,
        }
    }

    pub fn shape(source_name: &'static str, detail: impl Into<String>) -> Self {
        ApiError::UpstreamShape {
            source_name,
            detail: detail.into(),
        }
    }

    pub(crate) fn code_and_status(&self) -> (&'static str, StatusCode) {
        match self {
            ApiError::UpstreamHttp { status, .. } => (
                match status {
                    403 => "UPSTREAM_403",
                    404 => "UPSTREAM_404",
                    429 => "UPSTREAM_429",
                    500..=599 => "UPSTREAM_5XX",
                    _ => "UPSTREAM_ERROR",
                },
                StatusCode::BAD_GATEWAY,
            ),
            ApiError::UpstreamShape { .. } => ("UPSTREAM_SHAPE", StatusCode::BAD_GATEWAY),
            ApiError::Transport(e) if e.is_timeout() => {
                ("UPSTREAM_TIMEOUT", StatusCode::GATEWAY_TIMEOUT)
            }
            ApiError::Transport(_) => ("UPSTREAM_ERROR", StatusCode::BAD_GATEWAY),
            ApiError::MissingCredential(_) => {
                ("MISSING_CREDENTIAL", StatusCode::SERVICE_UNAVAILABLE)
            }
            ApiError::Database(_) => ("DATABASE_ERROR", StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::NotFound(_) => ("NOT_FOUND", StatusCode::NOT_FOUND),
            ApiError::Internal(_) => ("INTERNAL_ERROR", StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, status) = self.code_and_status();

        let error_response = ErrorResponse {
            ok: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
