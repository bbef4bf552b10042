//! Event listing, detail and the create/update/delete flow.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::forms::{EventChoices, EventForm};
use crate::handlers::parse_id;
use crate::models::{Category, EventListing};
use crate::query::{EventFilter, EventListParams};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::extract::JsonForm;
use crate::utils::response::{see_other, success};

const ENTITY: &str = "Event";

#[derive(Debug, Serialize)]
pub struct EventListPage {
    pub events: Vec<EventListing>,
    pub categories: Vec<Category>,
    pub search: String,
    pub category_id: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct EventFormPage {
    pub title: &'static str,
    pub form: EventForm,
    #[serde(flatten)]
    pub choices: EventChoices,
}

async fn find_listing(state: &AppState, raw_id: &str) -> AppResult<EventListing> {
    let id = parse_id(ENTITY, raw_id)?;
    state
        .store
        .find_event(id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))
}

/// GET /events?search=&category=&start=&end=
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListParams>,
) -> AppResult<Response> {
    let filter =
        EventFilter::from_params(&params).map_err(|errors| AppError::invalid(errors, &params))?;

    let events = state.store.list_events(&filter).await?;
    let categories = state.store.list_categories().await?;

    let page = EventListPage {
        events,
        categories,
        search: params.search().to_string(),
        category_id: params.category().to_string(),
        start: params.start().to_string(),
        end: params.end().to_string(),
    };
    Ok(success(page, "Events retrieved"))
}

/// GET /events/{id}
pub async fn event_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let event = find_listing(&state, &id).await?;
    Ok(success(event, "Event retrieved"))
}

/// GET /events/new
pub async fn new_event_form(State(state): State<AppState>) -> AppResult<Response> {
    let page = EventFormPage {
        title: "Create Event",
        form: EventForm::default(),
        choices: EventChoices::load(state.store.as_ref()).await?,
    };
    Ok(success(page, "Event form"))
}

/// POST /events/new
pub async fn create_event(
    State(state): State<AppState>,
    JsonForm(form): JsonForm<EventForm>,
) -> AppResult<Response> {
    let choices = EventChoices::load(state.store.as_ref()).await?;
    let draft = form
        .clean(&choices)
        .map_err(|errors| AppError::invalid(errors, &form))?;

    let event = state.store.insert_event(&draft).await?;
    info!(event_id = %event.id, "Event created");

    Ok(see_other("/events"))
}

/// GET /events/{id}/edit
pub async fn edit_event_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let listing = find_listing(&state, &id).await?;
    let page = EventFormPage {
        title: "Update Event",
        form: EventForm::from(&listing),
        choices: EventChoices::load(state.store.as_ref()).await?,
    };
    Ok(success(page, "Event form"))
}

/// POST /events/{id}/edit
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonForm(form): JsonForm<EventForm>,
) -> AppResult<Response> {
    let id = find_listing(&state, &id).await?.id();

    let choices = EventChoices::load(state.store.as_ref()).await?;
    let draft = form
        .clean(&choices)
        .map_err(|errors| AppError::invalid(errors, &form))?;

    state
        .store
        .update_event(id, &draft)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    info!(event_id = %id, "Event updated");

    Ok(see_other(&format!("/events/{id}")))
}

/// GET /events/{id}/delete
///
/// Shows what would be deleted; nothing is removed until the POST.
pub async fn confirm_delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let event = find_listing(&state, &id).await?;
    Ok(success(json!({ "event": event }), "Confirm event deletion"))
}

/// POST /events/{id}/delete
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(ENTITY, &id)?;
    if !state.store.delete_event(id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    info!(event_id = %id, "Event deleted");

    Ok(see_other("/events"))
}
