//! Account lifecycle through the public service facade: registration, login, profile completion
//! and administrative deactivation.

mod common {
    use std::sync::Arc;

    use argon2::Params;

    use placement::auth::InMemorySessionStore;
    use placement::config::{AuthConfig, LifecycleConfig};
    use placement::credentials::CredentialHasher;
    use placement::store::Store;
    use placement::workflows::accounts::RegistrationRequest;
    use placement::PlacementState;

    pub(super) const PASSWORD: &str = "Campus2025!";

    pub(super) async fn state() -> PlacementState {
        let store = Store::in_memory().await.expect("in-memory store");
        PlacementState::with_parts(
            store,
            Arc::new(InMemorySessionStore::new()),
            CredentialHasher::with_params(Params::new(256, 1, 1, None).expect("argon2 params")),
            AuthConfig::default(),
            LifecycleConfig::default(),
        )
    }

    pub(super) fn registration(username: &str, email: &str, role: &str) -> RegistrationRequest {
        RegistrationRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            role: role.to_string(),
        }
    }
}

use common::*;
use placement::domain::Role;
use placement::workflows::accounts::LoginRequest;
use placement::workflows::profiles::StudentProfileUpdate;
use placement::PlacementError;

#[tokio::test]
async fn student_registers_logs_in_and_completes_profile() {
    let state = state().await;

    let account = state
        .accounts
        .register(registration("priya_s", "Priya@Campus.edu", "student"))
        .await
        .expect("registration succeeds");
    assert_eq!(account.email, "priya@campus.edu");
    assert_eq!(account.role, Role::Student);

    let duplicate_name = state
        .accounts
        .register(registration("priya_s", "other@campus.edu", "student"))
        .await;
    assert!(matches!(
        duplicate_name,
        Err(PlacementError::AlreadyExists(field)) if field == "username"
    ));
    let duplicate_email = state
        .accounts
        .register(registration("priya_two", "PRIYA@campus.edu", "company"))
        .await;
    assert!(matches!(
        duplicate_email,
        Err(PlacementError::AlreadyExists(field)) if field == "email"
    ));

    let wrong_password = state
        .accounts
        .login(LoginRequest {
            identifier: "priya_s".to_string(),
            password: "Campus2024!".to_string(),
        })
        .await;
    assert!(matches!(wrong_password, Err(PlacementError::Unauthenticated)));

    let outcome = state
        .accounts
        .login(LoginRequest {
            identifier: "priya@campus.edu".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .expect("login by email");
    assert_eq!(outcome.user_id, account.user_id);
    assert_eq!(outcome.redirect, "/student/dashboard");
    assert!(state.sessions.get(&outcome.token).is_some());

    let partial = state
        .profiles
        .update_student_profile(
            account.user_id,
            StudentProfileUpdate {
                name: Some("Priya Sharma".to_string()),
                course: Some("B.Tech CSE".to_string()),
                ..StudentProfileUpdate::default()
            },
        )
        .await
        .expect("partial update");
    assert!(!partial.is_profile_complete);

    let complete = state
        .profiles
        .update_student_profile(
            account.user_id,
            StudentProfileUpdate {
                cgpa: Some(8.7),
                phone: Some("+91 98765 43210".to_string()),
                year_of_study: Some(4),
                ..StudentProfileUpdate::default()
            },
        )
        .await
        .expect("completing update");
    assert!(complete.is_profile_complete);
    assert_eq!(complete.name, "Priya Sharma");

    let out_of_range = state
        .profiles
        .update_student_profile(
            account.user_id,
            StudentProfileUpdate {
                cgpa: Some(11.0),
                ..StudentProfileUpdate::default()
            },
        )
        .await;
    assert!(matches!(out_of_range, Err(PlacementError::InvalidInput(_))));
}

#[tokio::test]
async fn public_registration_cannot_mint_admins() {
    let state = state().await;

    let attempt = state
        .accounts
        .register(registration("root", "root@campus.edu", "admin"))
        .await;
    assert!(matches!(attempt, Err(PlacementError::InvalidRole(_))));

    let admin = state
        .accounts
        .create_admin("registrar", "registrar@campus.edu", PASSWORD.to_string())
        .await
        .expect("provisioned admin");
    assert_eq!(admin.role, Role::Admin);
}

#[tokio::test]
async fn deactivation_ends_sessions_and_blocks_login() {
    let state = state().await;
    let account = state
        .accounts
        .register(registration("acme_hr", "hr@acme.example", "company"))
        .await
        .expect("registered");
    let outcome = state
        .accounts
        .login(LoginRequest {
            identifier: "acme_hr".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .expect("login");

    state
        .accounts
        .set_active(account.user_id, false)
        .await
        .expect("deactivate");
    assert!(state.sessions.get(&outcome.token).is_none());

    let blocked = state
        .accounts
        .login(LoginRequest {
            identifier: "acme_hr".to_string(),
            password: PASSWORD.to_string(),
        })
        .await;
    assert!(matches!(blocked, Err(PlacementError::AccountDeactivated)));

    state
        .accounts
        .set_active(account.user_id, true)
        .await
        .expect("reactivate");
    state
        .accounts
        .login(LoginRequest {
            identifier: "acme_hr".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .expect("login after reactivation");
}
