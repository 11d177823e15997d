use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Extension, Json, Router};
use serde_json::json;

use super::service::ProfileService;
use crate::auth::CurrentUser;
use crate::error::PlacementError;
use crate::state::PlacementState;
use crate::store::companies::CompanyProfileUpdate;
use crate::store::students::StudentProfileUpdate;

pub fn student_profile_router() -> Router<PlacementState> {
    Router::new().route(
        "/student/profile",
        get(student_profile_handler).post(update_student_profile_handler),
    )
}

pub fn company_profile_router() -> Router<PlacementState> {
    Router::new().route(
        "/company/profile",
        get(company_profile_handler).post(update_company_profile_handler),
    )
}

pub(crate) async fn student_profile_handler(
    State(service): State<Arc<ProfileService>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, PlacementError> {
    let profile = service.student_profile(user.user_id).await?;
    Ok(Json(json!({
        "is_profile_complete": profile.is_profile_complete,
        "profile": profile,
    })))
}

pub(crate) async fn update_student_profile_handler(
    State(service): State<Arc<ProfileService>>,
    Extension(user): Extension<CurrentUser>,
    Json(update): Json<StudentProfileUpdate>,
) -> Result<impl IntoResponse, PlacementError> {
    let profile = service.update_student_profile(user.user_id, update).await?;
    Ok(Json(json!({
        "message": "Profile updated successfully",
        "is_profile_complete": profile.is_profile_complete,
        "profile": profile,
    })))
}

pub(crate) async fn company_profile_handler(
    State(service): State<Arc<ProfileService>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, PlacementError> {
    let profile = service.company_profile(user.user_id).await?;
    Ok(Json(json!({
        "is_profile_complete": profile.has_required_fields(),
        "profile": profile,
    })))
}

pub(crate) async fn update_company_profile_handler(
    State(service): State<Arc<ProfileService>>,
    Extension(user): Extension<CurrentUser>,
    Json(update): Json<CompanyProfileUpdate>,
) -> Result<impl IntoResponse, PlacementError> {
    let profile = service.update_company_profile(user.user_id, update).await?;
    Ok(Json(json!({
        "message": "Company profile updated successfully",
        "is_profile_complete": profile.has_required_fields(),
        "profile": profile,
    })))
}
