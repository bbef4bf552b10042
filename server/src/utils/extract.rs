use axum::extract::FromRequest;

use crate::utils::error::AppError;

/// `axum::Json`, but a body that cannot be read or decoded is answered
/// with the usual [`AppError`] envelope instead of a plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonForm<T>(pub T);
