use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;

use super::domain::{ApplyRequest, JobStatusChange, NewJob, StatusChange};
use super::service::PlacementService;
use crate::auth::CurrentUser;
use crate::domain::{ApplicationId, JobId};
use crate::error::PlacementError;
use crate::state::PlacementState;

/// Job browsing and applications for student sessions.
pub fn student_router() -> Router<PlacementState> {
    Router::new()
        .route("/student/dashboard", get(student_dashboard_handler))
        .route("/jobs", get(active_jobs_handler))
        .route("/jobs/:job_id", get(job_detail_handler))
        .route("/apply/:job_id", post(apply_handler))
        .route("/my-applications", get(my_applications_handler))
        .route(
            "/applications/:application_id/withdraw",
            post(withdraw_handler),
        )
}

/// Posting management and applicant review for company sessions.
pub fn company_router() -> Router<PlacementState> {
    Router::new()
        .route("/company/dashboard", get(company_dashboard_handler))
        .route(
            "/company/jobs",
            get(company_jobs_handler).post(post_job_handler),
        )
        .route("/company/jobs/:job_id/status", post(job_status_handler))
        .route("/company/applicants/:job_id", get(applicants_handler))
        .route(
            "/company/applications/:application_id/status",
            post(application_status_handler),
        )
}

pub(crate) async fn student_dashboard_handler(
    State(service): State<Arc<PlacementService>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, PlacementError> {
    Ok(Json(service.student_dashboard(user.user_id).await?))
}

pub(crate) async fn active_jobs_handler(
    State(service): State<Arc<PlacementService>>,
) -> Result<impl IntoResponse, PlacementError> {
    let jobs = service.active_jobs().await?;
    Ok(Json(json!({ "jobs": jobs })))
}

pub(crate) async fn job_detail_handler(
    State(service): State<Arc<PlacementService>>,
    Extension(user): Extension<CurrentUser>,
    Path(job_id): Path<JobId>,
) -> Result<impl IntoResponse, PlacementError> {
    Ok(Json(service.job_detail_for_student(user.user_id, job_id).await?))
}

/// An absent body applies without a cover letter; anything else must be a valid request.
fn parse_apply_body(body: &[u8]) -> Result<ApplyRequest, PlacementError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApplyRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| PlacementError::InvalidInput(format!("Invalid request body: {err}")))
}

pub(crate) async fn apply_handler(
    State(service): State<Arc<PlacementService>>,
    Extension(user): Extension<CurrentUser>,
    Path(job_id): Path<JobId>,
    body: Bytes,
) -> Result<impl IntoResponse, PlacementError> {
    let request = parse_apply_body(&body)?;
    let application_id = service
        .apply_for_job(user.user_id, job_id, request.cover_letter)
        .await?;

    let payload = json!({
        "application_id": application_id,
        "job_id": job_id,
        "status": "pending",
        "message": "Application submitted successfully",
    });
    Ok((StatusCode::CREATED, Json(payload)))
}

pub(crate) async fn my_applications_handler(
    State(service): State<Arc<PlacementService>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, PlacementError> {
    let applications = service.applications_for_student(user.user_id).await?;
    Ok(Json(json!({ "applications": applications })))
}

pub(crate) async fn withdraw_handler(
    State(service): State<Arc<PlacementService>>,
    Extension(user): Extension<CurrentUser>,
    Path(application_id): Path<ApplicationId>,
) -> Result<impl IntoResponse, PlacementError> {
    Ok(Json(
        service
            .withdraw_application(user.user_id, application_id)
            .await?,
    ))
}

pub(crate) async fn company_dashboard_handler(
    State(service): State<Arc<PlacementService>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, PlacementError> {
    Ok(Json(service.company_dashboard(user.user_id).await?))
}

pub(crate) async fn company_jobs_handler(
    State(service): State<Arc<PlacementService>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, PlacementError> {
    let jobs = service.jobs_for_company(user.user_id).await?;
    Ok(Json(json!({ "jobs": jobs })))
}

pub(crate) async fn post_job_handler(
    State(service): State<Arc<PlacementService>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<NewJob>,
) -> Result<impl IntoResponse, PlacementError> {
    let job = service.post_job(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

pub(crate) async fn job_status_handler(
    State(service): State<Arc<PlacementService>>,
    Extension(user): Extension<CurrentUser>,
    Path(job_id): Path<JobId>,
    Json(change): Json<JobStatusChange>,
) -> Result<impl IntoResponse, PlacementError> {
    Ok(Json(
        service
            .set_job_status(user.user_id, job_id, change.status)
            .await?,
    ))
}

pub(crate) async fn applicants_handler(
    State(service): State<Arc<PlacementService>>,
    Extension(user): Extension<CurrentUser>,
    Path(job_id): Path<JobId>,
) -> Result<impl IntoResponse, PlacementError> {
    let applicants = service.applicants_for_job(user.user_id, job_id).await?;
    Ok(Json(json!({ "job_id": job_id, "applicants": applicants })))
}

pub(crate) async fn application_status_handler(
    State(service): State<Arc<PlacementService>>,
    Extension(user): Extension<CurrentUser>,
    Path(application_id): Path<ApplicationId>,
    Json(change): Json<StatusChange>,
) -> Result<impl IntoResponse, PlacementError> {
    Ok(Json(
        service
            .update_application_status(user.user_id, application_id, change.status, change.notes)
            .await?,
    ))
}
