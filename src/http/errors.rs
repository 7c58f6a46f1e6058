//! HTTP error handling and conversion

use crate::core::service::ServiceError;
use crate::http::models::{ApiResponse, ErrorResponse};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// HTTP error types
#[derive(Debug, Clone)]
pub enum HttpError {
    /// Malformed request body or parameters
    BadRequest(String),

    NotFound(String),

    /// Server errors
    InternalServerError(String),
}

impl HttpError {
    /// Convert to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            HttpError::BadRequest(_) => "BAD_REQUEST",
            HttpError::NotFound(_) => "NOT_FOUND",
            HttpError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            HttpError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            HttpError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        let message = match self {
            HttpError::BadRequest(msg)
            | HttpError::NotFound(msg)
            | HttpError::InternalServerError(msg) => msg,
        };

        let body = Json(ApiResponse::<()>::error(ErrorResponse {
            code: error_code.to_string(),
            message,
            details: None,
        }));

        (status, body).into_response()
    }
}

/// Convert service errors to HTTP errors
impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidOperation(msg) => HttpError::BadRequest(msg),
            ServiceError::Path(err) => HttpError::BadRequest(err.to_string()),
            ServiceError::Config(msg) => HttpError::InternalServerError(msg),
            ServiceError::Io(err) => HttpError::InternalServerError(err.to_string()),
            ServiceError::Transfer(err) => HttpError::InternalServerError(err.to_string()),
        }
    }
}

/// Result type alias for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;
