use axum::extract::{Query, State};
use axum::response::Response;

use crate::dashboard::{build_dashboard, DashboardParams};
use crate::handlers::today;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::success;

/// GET /dashboard?mode={today|all|upcoming|past}
pub async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> AppResult<Response> {
    let dashboard =
        build_dashboard(state.store.as_ref(), params.mode.as_deref(), today()).await?;

    Ok(success(dashboard, "Dashboard retrieved"))
}
