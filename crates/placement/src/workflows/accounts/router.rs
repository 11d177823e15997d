use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;

use super::service::{landing_path, AccountService, LoginRequest, RegistrationRequest};
use crate::auth::{cleared_session_cookie, session_cookie, session_token, CurrentUser};
use crate::error::PlacementError;
use crate::state::PlacementState;

/// Routes reachable without a session.
pub fn public_router() -> Router<PlacementState> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
}

/// `GET /` for any signed-in user.
pub fn landing_router() -> Router<PlacementState> {
    Router::new().route("/", get(landing_handler))
}

pub(crate) async fn register_handler(
    State(service): State<Arc<AccountService>>,
    Json(request): Json<RegistrationRequest>,
) -> Result<impl IntoResponse, PlacementError> {
    let account = service.register(request).await?;
    let payload = json!({
        "account": account,
        "message": "Registration successful! Please login.",
        "redirect": "/login",
    });
    Ok((StatusCode::CREATED, Json(payload)))
}

pub(crate) async fn login_handler(
    State(service): State<Arc<AccountService>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, PlacementError> {
    let outcome = service.login(request).await?;
    let cookie = session_cookie(service.config(), outcome.token).to_string();
    let payload = json!({
        "user_id": outcome.user_id,
        "role": outcome.role,
        "redirect": outcome.redirect,
        "expires_at": outcome.expires_at,
    });
    Ok(([(header::SET_COOKIE, cookie)], Json(payload)))
}

pub(crate) async fn logout_handler(
    State(service): State<Arc<AccountService>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let token = session_token(&headers, &service.config().session_cookie);
    service.logout(token.as_deref());
    let cookie = cleared_session_cookie(service.config()).to_string();
    (
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "You have been logged out", "redirect": "/login" })),
    )
}

pub(crate) async fn landing_handler(
    Extension(user): Extension<CurrentUser>,
) -> Result<Redirect, PlacementError> {
    Ok(Redirect::to(landing_path(&user.role)?))
}
