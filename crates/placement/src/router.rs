use axum::extract::Request;
use axum::middleware::{from_fn, from_fn_with_state, Next};
use axum::Router;

use crate::auth::{require_role, require_session};
use crate::domain::Role;
use crate::state::PlacementState;
use crate::workflows::{accounts, admin, placement, profiles};

/// Full placement HTTP surface.
///
/// Protected routes pass the session guard first, then the per-area role guard.
pub fn placement_router(state: PlacementState) -> Router {
    let student = profiles::student_profile_router()
        .merge(placement::student_router())
        .route_layer(from_fn(|request: Request, next: Next| {
            require_role(Role::Student, request, next)
        }));

    let company = profiles::company_profile_router()
        .merge(placement::company_router())
        .route_layer(from_fn(|request: Request, next: Next| {
            require_role(Role::Company, request, next)
        }));

    let admin = admin::admin_router().route_layer(from_fn(|request: Request, next: Next| {
        require_role(Role::Admin, request, next)
    }));

    let protected = accounts::landing_router()
        .merge(student)
        .merge(company)
        .merge(admin)
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(accounts::public_router())
        .merge(protected)
        .with_state(state)
}
