//! Admin dashboard and account moderation.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;

use crate::auth::CurrentUser;
use crate::domain::{JobId, UserId};
use crate::error::PlacementError;
use crate::state::PlacementState;
use crate::store::stats;

pub fn admin_router() -> Router<PlacementState> {
    Router::new()
        .route("/admin", get(dashboard_handler))
        .route("/admin/users/:user_id/deactivate", post(deactivate_handler))
        .route("/admin/users/:user_id/activate", post(activate_handler))
        .route("/admin/jobs/:job_id/recount", post(recount_handler))
}

pub(crate) async fn dashboard_handler(
    State(state): State<PlacementState>,
) -> Result<impl IntoResponse, PlacementError> {
    let statistics = stats::admin_statistics(state.store.pool()).await?;
    Ok(Json(json!({ "statistics": statistics })))
}

pub(crate) async fn deactivate_handler(
    State(state): State<PlacementState>,
    Extension(admin): Extension<CurrentUser>,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, PlacementError> {
    if user_id == admin.user_id {
        return Err(PlacementError::InvalidInput(
            "Administrators cannot deactivate their own account".to_string(),
        ));
    }
    state.accounts.set_active(user_id, false).await?;
    Ok(Json(json!({ "user_id": user_id, "is_active": false })))
}

pub(crate) async fn activate_handler(
    State(state): State<PlacementState>,
    Path(user_id): Path<UserId>,
) -> Result<impl IntoResponse, PlacementError> {
    state.accounts.set_active(user_id, true).await?;
    Ok(Json(json!({ "user_id": user_id, "is_active": true })))
}

pub(crate) async fn recount_handler(
    State(state): State<PlacementState>,
    Path(job_id): Path<JobId>,
) -> Result<impl IntoResponse, PlacementError> {
    let current_applications = state.placements.recount_applications(job_id).await?;
    Ok(Json(json!({
        "job_id": job_id,
        "current_applications": current_applications,
    })))
}
