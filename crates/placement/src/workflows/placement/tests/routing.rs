use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::router::placement_router;
use crate::state::PlacementState;
use crate::store::{students, users};

async fn send(
    state: &PlacementState,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let response = placement_router(state.clone())
        .oneshot(request(method, uri, cookie, body))
        .await
        .expect("router responds");
    read_json_body(response).await
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let state = state().await;
    let (status, body) = send(&state, Method::GET, "/jobs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/login");

    let (status, _) = send(
        &state,
        Method::GET,
        "/student/dashboard",
        Some("placement_session=forged"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn roles_gate_their_areas() {
    let state = state().await;
    register(&state, "alice1", "student").await;
    let cookie = login_cookie(&state, "alice1").await;

    let (status, body) = send(&state, Method::GET, "/student/dashboard", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_applications"], 0);

    for uri in ["/company/dashboard", "/admin"] {
        let (status, body) = send(&state, Method::GET, uri, Some(&cookie), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn landing_redirects_by_role() {
    let state = state().await;
    company(&state, "acme").await;
    let cookie = login_cookie(&state, "acme").await;

    let response = placement_router(state.clone())
        .oneshot(request(Method::GET, "/", Some(&cookie), None))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/company/dashboard"
    );
}

#[tokio::test]
async fn login_sets_the_session_cookie() {
    let state = state().await;
    register(&state, "alice1", "student").await;

    let response = placement_router(state.clone())
        .oneshot(request(
            Method::POST,
            "/login",
            None,
            Some(json!({ "username": "ALICE1@campus.test", "password": PASSWORD })),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .expect("ascii cookie")
        .to_string();
    assert!(cookie.starts_with("placement_session="));
    assert!(cookie.contains("HttpOnly"));

    let (_, body) = read_json_body(response).await;
    assert_eq!(body["role"], "student");
    assert_eq!(body["redirect"], "/student/dashboard");

    let (status, body) = send(
        &state,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice1", "password": "Wrong1!x" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn applying_twice_conflicts() {
    let state = state().await;
    let company = company(&state, "acme").await;
    let job = post_job(&state, company, new_job("Analyst")).await;
    register(&state, "alice1", "student").await;
    let cookie = login_cookie(&state, "alice1").await;
    let uri = format!("/apply/{job}");

    let (status, body) = send(
        &state,
        Method::POST,
        &uri,
        Some(&cookie),
        Some(json!({ "cover_letter": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");

    let (status, _) = send(&state, Method::POST, &uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&state, Method::GET, "/my-applications", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applications"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn malformed_apply_body_is_rejected() {
    let state = state().await;
    let company = company(&state, "acme").await;
    let job = post_job(&state, company, new_job("Analyst")).await;
    let student = register(&state, "alice1", "student").await;
    let cookie = login_cookie(&state, "alice1").await;
    let uri = format!("/apply/{job}");

    let malformed = Request::builder()
        .method(Method::POST)
        .uri(&uri)
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"cover_letter": "unterminated"#))
        .expect("request");
    let response = placement_router(state.clone())
        .oneshot(malformed)
        .await
        .expect("router responds");
    let (status, body) = read_json_body(response).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.starts_with("Invalid request body")));

    let (status, body) = send(
        &state,
        Method::POST,
        &uri,
        Some(&cookie),
        Some(json!({ "cover_letter": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");

    let profile = students::find_by_user(state.store.pool(), student)
        .await
        .expect("query")
        .expect("profile");
    assert!(!state
        .placements
        .has_applied(profile.id, job)
        .await
        .expect("has_applied query"));

    let (status, _) = send(&state, Method::POST, &uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn company_reviews_applicants_over_http() {
    let state = state().await;
    company(&state, "acme").await;
    let company_cookie = login_cookie(&state, "acme").await;

    let (status, job) = send(
        &state,
        Method::POST,
        "/company/jobs",
        Some(&company_cookie),
        Some(json!({
            "title": "Data Engineer",
            "description": "Pipelines",
            "eligibility": "Any branch",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let job_id = job["id"].as_i64().expect("job id");

    register(&state, "alice1", "student").await;
    let student_cookie = login_cookie(&state, "alice1").await;
    let (_, applied) = send(
        &state,
        Method::POST,
        &format!("/apply/{job_id}"),
        Some(&student_cookie),
        None,
    )
    .await;
    let application_id = applied["application_id"].as_i64().expect("application id");

    let (status, body) = send(
        &state,
        Method::GET,
        &format!("/company/applicants/{job_id}"),
        Some(&company_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applicants"][0]["email"], "alice1@campus.test");

    let (status, body) = send(
        &state,
        Method::POST,
        &format!("/company/applications/{application_id}/status"),
        Some(&company_cookie),
        Some(json!({ "status": "shortlisted", "notes": "Strong profile" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "shortlisted");

    let (status, _) = send(
        &state,
        Method::POST,
        &format!("/company/applications/{application_id}/status"),
        Some(&company_cookie),
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn deactivated_account_is_signed_out() {
    let state = state().await;
    let student = register(&state, "alice1", "student").await;
    let cookie = login_cookie(&state, "alice1").await;

    users::set_active(state.store.pool(), student, false)
        .await
        .expect("deactivate");

    let response = placement_router(state.clone())
        .oneshot(request(Method::GET, "/jobs", Some(&cookie), None))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let cleared = response.headers()[header::SET_COOKIE]
        .to_str()
        .expect("ascii cookie")
        .to_string();
    assert!(cleared.starts_with("placement_session="));
    assert!(cleared.contains("Max-Age=0"));

    let (_, body) = read_json_body(response).await;
    assert_eq!(body["redirect"], "/login");
}

#[tokio::test]
async fn admin_manages_accounts() {
    let state = state().await;
    let admin = state
        .accounts
        .create_admin("registrar", "registrar@campus.test", PASSWORD.to_string())
        .await
        .expect("admin")
        .user_id;
    let student = register(&state, "alice1", "student").await;
    let student_cookie = login_cookie(&state, "alice1").await;
    let admin_cookie = login_cookie(&state, "registrar").await;

    let (status, body) = send(&state, Method::GET, "/admin", Some(&admin_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statistics"]["total_students"], 1);

    let (status, _) = send(
        &state,
        Method::POST,
        &format!("/admin/users/{admin}/deactivate"),
        Some(&admin_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &state,
        Method::POST,
        &format!("/admin/users/{student}/deactivate"),
        Some(&admin_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let (status, _) = send(&state, Method::GET, "/jobs", Some(&student_cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
