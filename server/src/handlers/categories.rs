use axum::extract::{Path, State};
use axum::response::Response;
use serde_json::json;
use tracing::info;

use crate::forms::CategoryForm;
use crate::handlers::{parse_id, FormPage};
use crate::models::Category;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::extract::JsonForm;
use crate::utils::response::{see_other, success};

const ENTITY: &str = "Category";
const LIST_PATH: &str = "/categories";

async fn find_category(state: &AppState, raw_id: &str) -> AppResult<Category> {
    let id = parse_id(ENTITY, raw_id)?;
    state
        .store
        .find_category(id)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))
}

/// GET /categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Response> {
    let categories = state.store.list_categories().await?;
    Ok(success(json!({ "categories": categories }), "Categories retrieved"))
}

/// GET /categories/new
pub async fn new_category_form() -> Response {
    let page = FormPage {
        title: "Create Category",
        form: CategoryForm::default(),
    };
    success(page, "Category form")
}

/// POST /categories/new
pub async fn create_category(
    State(state): State<AppState>,
    JsonForm(form): JsonForm<CategoryForm>,
) -> AppResult<Response> {
    let draft = form
        .clean()
        .map_err(|errors| AppError::invalid(errors, &form))?;

    let category = state.store.insert_category(&draft).await?;
    info!(category_id = %category.id, "Category created");

    Ok(see_other(LIST_PATH))
}

/// GET /categories/{id}/edit
pub async fn edit_category_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let category = find_category(&state, &id).await?;
    let page = FormPage {
        title: "Update Category",
        form: CategoryForm::from(&category),
    };
    Ok(success(page, "Category form"))
}

/// POST /categories/{id}/edit
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonForm(form): JsonForm<CategoryForm>,
) -> AppResult<Response> {
    let id = find_category(&state, &id).await?.id;
    let draft = form
        .clean()
        .map_err(|errors| AppError::invalid(errors, &form))?;

    state
        .store
        .update_category(id, &draft)
        .await?
        .ok_or_else(|| AppError::not_found(ENTITY, id))?;
    info!(category_id = %id, "Category updated");

    Ok(see_other(LIST_PATH))
}

/// GET /categories/{id}/delete
pub async fn confirm_delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let category = find_category(&state, &id).await?;
    Ok(success(
        json!({ "category": category }),
        "Confirm category deletion",
    ))
}

/// POST /categories/{id}/delete
///
/// Events in the category are kept and become uncategorized.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(ENTITY, &id)?;
    if !state.store.delete_category(id).await? {
        return Err(AppError::not_found(ENTITY, id));
    }
    info!(category_id = %id, "Category deleted");

    Ok(see_other(LIST_PATH))
}
