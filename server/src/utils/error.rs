use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::forms::FieldErrors;
use crate::store::StoreError;
use crate::utils::response::error as error_response;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Submitted input failed validation; nothing was written.
    #[error("Validation error: {errors:?}")]
    ValidationError { errors: FieldErrors, input: Value },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Store error")]
    StoreError(#[from] StoreError),

    /// The request body was not JSON, or not shaped like the form.
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),
}

impl AppError {
    /// Rejects `input` with per-field messages, keeping the submitted
    /// values so they can be shown again.
    pub fn invalid<T: Serialize>(errors: FieldErrors, input: &T) -> Self {
        AppError::ValidationError {
            errors,
            input: serde_json::to_value(input).unwrap_or(Value::Null),
        }
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{entity} with id '{id}' was not found"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StoreError(StoreError::Database(sqlx::Error::RowNotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MalformedBody(rejection) => rejection.status(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::MalformedBody(_) => "MALFORMED_BODY",
            AppError::StoreError(_) if self.status_code() == StatusCode::NOT_FOUND => "NOT_FOUND",
            AppError::StoreError(_) => "DATABASE_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError { errors, .. } => {
                warn!(fields = ?errors, "Rejected invalid submission");
            }
            AppError::NotFound(msg) => {
                warn!(message = %msg, "Resource not found");
            }
            AppError::StoreError(e) => {
                error!(error = ?e, "Store error");
            }
            AppError::MalformedBody(rejection) => {
                warn!(reason = %rejection.body_text(), "Rejected malformed body");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Store failures stay generic; client mistakes are spelled out.
        let (public_message, details) = match self {
            AppError::ValidationError { errors, input } => (
                "Please correct the errors below.".to_string(),
                Some(json!({ "fields": errors, "input": input })),
            ),
            AppError::NotFound(msg) => (msg, None),
            AppError::StoreError(_) if status == StatusCode::NOT_FOUND => {
                ("Resource not found".to_string(), None)
            }
            AppError::StoreError(_) => ("A database error occurred".to_string(), None),
            AppError::MalformedBody(rejection) => (rejection.body_text(), None),
        };

        error_response(code, public_message, details, status)
    }
}
