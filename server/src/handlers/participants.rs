use axum::extract::{Path, State};
use axum::response::Response;
use serde_json::json;
use tracing::info;

use crate::forms::ParticipantForm;
use crate::handlers::{parse_id, FormPage};
use crate::models::Participant;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::extract::JsonForm;
use crate::utils::response::{see_other, success};

const ENTITY: &str = "Participant";
const LIST_PATH: &str = "/participants";

async fn find_participant(state: &AppState, raw_id: &str) -> AppResult<Participant> {
    let id = parse_id(ENTITY, raw_id)?;
    state
        .store
        .find_participant(id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))
}

/// GET /participants
pub async fn list_participants(State(state): State<AppState>) -> AppResult<Response> {
    let participants = state.store.list_participants().await?;
    Ok(success(json!({ "participants": participants }), "Participants retrieved"))
}

/// GET /participants/new
pub async fn new_participant_form() -> Response {
    let page = FormPage {
        title: "Create Participant",
        form: ParticipantForm::default(),
    };
    success(page, "Participant form")
}

/// POST /participants/new
pub async fn create_participant(
    State(state): State<AppState>,
    JsonForm(form): JsonForm<ParticipantForm>,
) -> AppResult<Response> {
    let draft = form
        .clean()
        .map_err(|errors| AppError::invalid(errors, &form))?;

    let participant = state.store.insert_participant(&draft).await?;
    info!(participant_id = %participant.id, "Participant created");

    Ok(see_other(LIST_PATH))
}

/// GET /participants/{id}/edit
pub async fn edit_participant_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let participant = find_participant(&state, &id).await?;
    let page = FormPage {
        title: "Update Participant",
        form: ParticipantForm::from(&participant),
    };
    Ok(success(page, "Participant form"))
}

/// POST /participants/{id}/edit
pub async fn update_participant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonForm(form): JsonForm<ParticipantForm>,
) -> AppResult<Response> {
    let id = find_participant(&state, &id).await?.id;
    let draft = form
        .clean()
        .map_err(|errors| AppError::invalid(errors, &form))?;

    state
        .store
        .update_participant(id, &draft)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    info!(participant_id = %id, "Participant updated");

    Ok(see_other(LIST_PATH))
}

/// GET /participants/{id}/delete
pub async fn confirm_delete_participant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let participant = find_participant(&state, &id).await?;
    Ok(success(
        json!({ "participant": participant }),
        "Confirm participant deletion",
    ))
}

/// POST /participants/{id}/delete
///
/// Removes the participant from every event it joined; the events stay.
pub async fn delete_participant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(ENTITY, &id)?;
    if !state.store.delete_participant(id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    info!(participant_id = %id, "Participant deleted");

    Ok(see_other(LIST_PATH))
}
