//! Translation of core errors into HTTP responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use rf_core::AppError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("authentication required")]
    Unauthorized,

    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::App(AppError::InvalidId { .. }) => StatusCode::BAD_REQUEST,
            ApiError::App(AppError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::App(AppError::InvalidArgument(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::App(AppError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::App(AppError::UnknownKind(_) | AppError::Unexpected(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            ApiError::Validation(errors) => {
                HttpResponse::build(status).json(serde_json::json!({ "errors": errors }))
            }
            ApiError::App(e) if !e.is_recoverable() => {
                error!(error = %e, "request failed");
                HttpResponse::build(status).json(serde_json::json!({ "message": "internal server error" }))
            }
            other => HttpResponse::build(status).json(serde_json::json!({ "message": other.to_string() })),
        }
    }
}
