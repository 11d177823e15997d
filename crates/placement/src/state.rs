use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::{InMemorySessionStore, SessionStore};
use crate::config::{AuthConfig, LifecycleConfig};
use crate::credentials::CredentialHasher;
use crate::store::Store;
use crate::workflows::accounts::AccountService;
use crate::workflows::placement::PlacementService;
use crate::workflows::profiles::ProfileService;

/// Shared handles for every placement route.
#[derive(Clone)]
pub struct PlacementState {
    pub store: Store,
    pub sessions: Arc<dyn SessionStore>,
    pub auth: Arc<AuthConfig>,
    pub accounts: Arc<AccountService>,
    pub profiles: Arc<ProfileService>,
    pub placements: Arc<PlacementService>,
}

impl PlacementState {
    /// In-memory sessions and production hashing cost.
    pub fn new(store: Store, auth: AuthConfig, lifecycle: LifecycleConfig) -> Self {
        Self::with_parts(
            store,
            Arc::new(InMemorySessionStore::new()),
            CredentialHasher::default(),
            auth,
            lifecycle,
        )
    }

    pub fn with_parts(
        store: Store,
        sessions: Arc<dyn SessionStore>,
        hasher: CredentialHasher,
        auth: AuthConfig,
        lifecycle: LifecycleConfig,
    ) -> Self {
        let accounts = Arc::new(AccountService::new(
            store.clone(),
            sessions.clone(),
            hasher,
            auth.clone(),
        ));
        let profiles = Arc::new(ProfileService::new(store.clone()));
        let placements = Arc::new(PlacementService::new(
            store.clone(),
            lifecycle.transition_policy,
        ));

        Self {
            store,
            sessions,
            auth: Arc::new(auth),
            accounts,
            profiles,
            placements,
        }
    }
}

impl FromRef<PlacementState> for Arc<AccountService> {
    fn from_ref(state: &PlacementState) -> Self {
        state.accounts.clone()
    }
}

impl FromRef<PlacementState> for Arc<ProfileService> {
    fn from_ref(state: &PlacementState) -> Self {
        state.profiles.clone()
    }
}

impl FromRef<PlacementState> for Arc<PlacementService> {
    fn from_ref(state: &PlacementState) -> Self {
        state.placements.clone()
    }
}
