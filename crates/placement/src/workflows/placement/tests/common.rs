use std::sync::Arc;

use argon2::Params;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use serde_json::Value;

use crate::auth::InMemorySessionStore;
use crate::config::{AuthConfig, DatabaseConfig, LifecycleConfig};
use crate::credentials::CredentialHasher;
use crate::domain::{JobId, UserId};
use crate::state::PlacementState;
use crate::store::Store;
use crate::workflows::accounts::{LoginRequest, RegistrationRequest};
use crate::workflows::placement::{NewJob, TransitionPolicy};
use crate::workflows::profiles::CompanyProfileUpdate;

pub(super) const PASSWORD: &str = "Secret1!";

pub(super) async fn state_with_policy(policy: TransitionPolicy) -> PlacementState {
    let store = Store::in_memory().await.expect("in-memory store");
    with_store(store, policy)
}

pub(super) async fn state() -> PlacementState {
    state_with_policy(TransitionPolicy::Strict).await
}

fn with_store(store: Store, policy: TransitionPolicy) -> PlacementState {
    PlacementState::with_parts(
        store,
        Arc::new(InMemorySessionStore::new()),
        CredentialHasher::with_params(Params::new(256, 1, 1, None).expect("argon2 params")),
        AuthConfig::default(),
        LifecycleConfig {
            transition_policy: policy,
        },
    )
}

/// State over a database file with a multi-connection pool, so writers really contend.
/// The returned directory owns the file and must outlive the state.
pub(super) async fn file_backed_state() -> (PlacementState, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("placement.db");
    let store = Store::connect(&DatabaseConfig {
        url: format!("sqlite://{}", path.display()),
        max_connections: 5,
    })
    .await
    .expect("file store");
    store.migrate().await.expect("migrations");
    (with_store(store, TransitionPolicy::Strict), dir)
}

pub(super) async fn register(state: &PlacementState, username: &str, role: &str) -> UserId {
    state
        .accounts
        .register(RegistrationRequest {
            username: username.to_string(),
            email: format!("{username}@campus.test"),
            password: PASSWORD.to_string(),
            role: role.to_string(),
        })
        .await
        .expect("registration succeeds")
        .user_id
}

/// Company account with a named profile, ready to post jobs.
pub(super) async fn company(state: &PlacementState, username: &str) -> UserId {
    let user_id = register(state, username, "company").await;
    state
        .profiles
        .update_company_profile(
            user_id,
            CompanyProfileUpdate {
                company_name: Some(format!("{username} Ltd")),
                industry: Some("Software".to_string()),
                ..CompanyProfileUpdate::default()
            },
        )
        .await
        .expect("company profile");
    user_id
}

pub(super) fn new_job(title: &str) -> NewJob {
    NewJob {
        title: title.to_string(),
        description: "Design and ship services".to_string(),
        eligibility: "Final-year students".to_string(),
        ..NewJob::default()
    }
}

pub(super) async fn post_job(state: &PlacementState, company: UserId, job: NewJob) -> JobId {
    state
        .placements
        .post_job(company, job)
        .await
        .expect("job posted")
        .id
}

/// `Cookie` header value for a fresh session.
pub(super) async fn login_cookie(state: &PlacementState, username: &str) -> String {
    let outcome = state
        .accounts
        .login(LoginRequest {
            identifier: username.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .expect("login succeeds");
    format!("{}={}", state.auth.session_cookie, outcome.token)
}

pub(super) fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub(super) async fn read_json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}
