use axum::response::Response;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::utils::error::{AppError, AppResult};
use crate::utils::response::success;

pub mod categories;
pub mod dashboard;
pub mod events;
pub mod participants;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "eventdesk",
    };

    success(payload, "Health check successful")
}

/// A create/update form as shown before submission.
#[derive(Debug, Serialize)]
pub struct FormPage<F: Serialize> {
    pub title: &'static str,
    pub form: F,
}

/// Ids that do not parse cannot name a stored row, so they are reported
/// as missing rather than malformed.
pub(crate) fn parse_id(entity: &str, raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(entity, raw))
}

/// The calendar date "today" is judged against, read fresh per request.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
