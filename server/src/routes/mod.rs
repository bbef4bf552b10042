use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{categories, dashboard, events, health_check, participants};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let security_headers = create_security_headers_layer(state.config.production);
    let cors = create_cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/health", get(health_check))
        .route("/dashboard", get(dashboard::dashboard))
        .merge(event_routes())
        .merge(category_routes())
        .merge(participant_routes())
        .layer(TraceLayer::new_for_http())
        .layer(security_headers)
        .layer(cors)
        .with_state(state)
}

fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(events::list_events))
        .route(
            "/events/new",
            get(events::new_event_form).post(events::create_event),
        )
        .route("/events/:id", get(events::event_detail))
        .route(
            "/events/:id/edit",
            get(events::edit_event_form).post(events::update_event),
        )
        .route(
            "/events/:id/delete",
            get(events::confirm_delete_event).post(events::delete_event),
        )
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(categories::list_categories))
        .route(
            "/categories/new",
            get(categories::new_category_form).post(categories::create_category),
        )
        .route(
            "/categories/:id/edit",
            get(categories::edit_category_form).post(categories::update_category),
        )
        .route(
            "/categories/:id/delete",
            get(categories::confirm_delete_category).post(categories::delete_category),
        )
}

fn participant_routes() -> Router<AppState> {
    Router::new()
        .route("/participants", get(participants::list_participants))
        .route(
            "/participants/new",
            get(participants::new_participant_form).post(participants::create_participant),
        )
        .route(
            "/participants/:id/edit",
            get(participants::edit_participant_form).post(participants::update_participant),
        )
        .route(
            "/participants/:id/delete",
            get(participants::confirm_delete_participant)
                .post(participants::delete_participant),
        )
}
