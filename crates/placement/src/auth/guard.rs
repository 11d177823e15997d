use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::session::{cleared_session_cookie, session_token, SessionStore};
use crate::domain::{Role, UserId};
use crate::error::PlacementError;
use crate::state::PlacementState;
use crate::store::{users, Store};

/// Authenticated caller, inserted as a request extension by [`require_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub username: String,
    /// Role as recorded on the session.
    pub role: String,
    pub session_token: String,
}

impl CurrentUser {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// Resolves a session token to its user.
///
/// The user row is re-read on every call: a vanished or deactivated account ends the session.
pub async fn authenticate(
    store: &Store,
    sessions: &dyn SessionStore,
    token: Option<&str>,
) -> Result<CurrentUser, PlacementError> {
    let token = token.ok_or(PlacementError::Unauthenticated)?;
    let session = sessions.get(token).ok_or(PlacementError::Unauthenticated)?;

    let Some(user) = users::find_by_id(store.pool(), session.user_id).await? else {
        sessions.destroy(token);
        return Err(PlacementError::Unauthenticated);
    };

    if !user.is_active {
        sessions.destroy(token);
        tracing::info!(user_id = %user.id, "session ended for deactivated account");
        return Err(PlacementError::AccountDeactivated);
    }

    Ok(CurrentUser {
        user_id: user.id,
        username: user.username,
        role: session.role,
        session_token: token.to_string(),
    })
}

pub fn authorize(user: &CurrentUser, required: Role) -> Result<(), PlacementError> {
    if user.role.trim().eq_ignore_ascii_case(required.as_str()) {
        Ok(())
    } else {
        Err(PlacementError::Forbidden)
    }
}

/// Middleware admitting only requests that carry a live session.
pub async fn require_session(
    State(state): State<PlacementState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = session_token(request.headers(), &state.auth.session_cookie);

    match authenticate(&state.store, state.sessions.as_ref(), token.as_deref()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => {
            let stale_cookie = token.is_some()
                && matches!(
                    err,
                    PlacementError::Unauthenticated | PlacementError::AccountDeactivated
                );
            let mut response = err.into_response();
            if stale_cookie {
                let cleared = cleared_session_cookie(&state.auth).to_string();
                if let Ok(value) = HeaderValue::from_str(&cleared) {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
            }
            response
        }
    }
}

/// Middleware admitting only sessions holding `required`. Must run after [`require_session`].
pub async fn require_role(required: Role, request: Request, next: Next) -> Response {
    let Some(user) = request.extensions().get::<CurrentUser>() else {
        return PlacementError::Unauthenticated.into_response();
    };

    if let Err(err) = authorize(user, required) {
        tracing::debug!(user_id = %user.user_id, required = %required, "role check failed");
        return err.into_response();
    }

    next.run(request).await
}
