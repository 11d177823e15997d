use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::SessionStore;
use crate::config::AuthConfig;
use crate::credentials::{
    sanitize_input, validate_email, validate_password, validate_username, CredentialError,
    CredentialHasher,
};
use crate::domain::{Role, UserId};
use crate::error::PlacementError;
use crate::store::{companies, students, users, Store, StoreError};

const USERNAME_INPUT_CHARS: usize = 50;
const EMAIL_INPUT_CHARS: usize = 100;
const DECOY_PASSWORD: &str = "decoy-credential-for-unknown-logins";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    #[serde(alias = "username")]
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: String,
    pub user_id: UserId,
    pub role: Role,
    pub redirect: &'static str,
    pub expires_at: DateTime<Utc>,
}

struct ValidCredentials {
    username: String,
    email: String,
    password: String,
}

/// Registration, login and account activation.
pub struct AccountService {
    store: Store,
    sessions: Arc<dyn SessionStore>,
    hasher: CredentialHasher,
    config: AuthConfig,
    /// Hash checked when the identifier matches no user, so both rejections cost one verify.
    decoy_hash: Arc<OnceLock<String>>,
}

/// Landing path for a stored role name.
pub fn landing_path(role: &str) -> Result<&'static str, PlacementError> {
    Role::parse(role)
        .map(Role::landing_path)
        .ok_or_else(|| PlacementError::InvalidRole(role.to_string()))
}

impl AccountService {
    pub fn new(
        store: Store,
        sessions: Arc<dyn SessionStore>,
        hasher: CredentialHasher,
        config: AuthConfig,
    ) -> Self {
        Self {
            store,
            sessions,
            hasher,
            config,
            decoy_hash: Arc::new(OnceLock::new()),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn validate(
        &self,
        username: &str,
        email: &str,
        password: String,
    ) -> Result<ValidCredentials, PlacementError> {
        let username = sanitize_input(username, Some(USERNAME_INPUT_CHARS));
        let email = sanitize_input(email, Some(EMAIL_INPUT_CHARS)).to_lowercase();

        validate_username(&username)?;
        if !validate_email(&email) {
            return Err(CredentialError::InvalidEmail.into());
        }
        validate_password(&password, self.config.password_policy)?;

        Ok(ValidCredentials {
            username,
            email,
            password,
        })
    }

    async fn hash(&self, password: String) -> Result<String, PlacementError> {
        let hasher = self.hasher.clone();
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| CredentialError::Hashing(err.to_string()))??;
        Ok(hashed)
    }

    async fn verify(&self, password: String, hash: String) -> bool {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .unwrap_or(false)
    }

    async fn verify_decoy(&self, password: String) {
        let hasher = self.hasher.clone();
        let decoy = self.decoy_hash.clone();
        let verified = tokio::task::spawn_blocking(move || {
            let hash = decoy.get_or_init(|| hasher.hash(DECOY_PASSWORD).unwrap_or_default());
            hasher.verify(&password, hash)
        })
        .await;
        if let Err(error) = verified {
            tracing::warn!(%error, "decoy verification task failed");
        }
    }

    /// Creates the user row and, for students and companies, the empty profile in one
    /// transaction.
    async fn create_account(
        &self,
        credentials: ValidCredentials,
        role: Role,
    ) -> Result<Account, PlacementError> {
        let password_hash = self.hash(credentials.password).await?;

        let mut tx = self.store.begin().await?;
        if users::username_taken(&mut *tx, &credentials.username).await? {
            return Err(PlacementError::AlreadyExists("username".to_string()));
        }
        if users::email_taken(&mut *tx, &credentials.email).await? {
            return Err(PlacementError::AlreadyExists("email".to_string()));
        }

        let user_id = users::insert(
            &mut *tx,
            &users::NewUser {
                username: &credentials.username,
                email: &credentials.email,
                password_hash: &password_hash,
                role,
            },
        )
        .await
        .map_err(account_conflict)?;

        match role {
            Role::Student => {
                students::insert_empty(&mut *tx, user_id, &credentials.email).await?;
            }
            Role::Company => {
                companies::insert_empty(&mut *tx, user_id, &credentials.email).await?;
            }
            Role::Admin => {}
        }
        tx.commit().await.map_err(StoreError::from)?;

        tracing::info!(user_id = %user_id, role = role.as_str(), "account created");
        Ok(Account {
            user_id,
            username: credentials.username,
            email: credentials.email,
            role,
        })
    }

    /// Self-service sign-up; only students and companies may register.
    pub async fn register(&self, request: RegistrationRequest) -> Result<Account, PlacementError> {
        let role = match Role::parse(&request.role) {
            Some(role @ (Role::Student | Role::Company)) => role,
            _ => return Err(PlacementError::InvalidRole(request.role)),
        };
        let credentials = self.validate(&request.username, &request.email, request.password)?;
        self.create_account(credentials, role).await
    }

    /// Provisions an administrator. Not reachable over HTTP.
    pub async fn create_admin(
        &self,
        username: &str,
        email: &str,
        password: String,
    ) -> Result<Account, PlacementError> {
        let credentials = self.validate(username, email, password)?;
        self.create_account(credentials, Role::Admin).await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, PlacementError> {
        let identifier = sanitize_input(&request.identifier, Some(EMAIL_INPUT_CHARS));
        if identifier.is_empty() || request.password.is_empty() {
            return Err(PlacementError::InvalidInput(
                "Please provide both username and password".to_string(),
            ));
        }

        let Some(user) = users::find_by_login(self.store.pool(), &identifier).await? else {
            self.verify_decoy(request.password).await;
            tracing::debug!("login rejected: unknown identifier");
            return Err(PlacementError::Unauthenticated);
        };
        if !self.verify(request.password, user.password_hash.clone()).await {
            tracing::debug!(user_id = %user.id, "login rejected: password mismatch");
            return Err(PlacementError::Unauthenticated);
        }
        if !user.is_active {
            return Err(PlacementError::AccountDeactivated);
        }

        let now = Utc::now();
        let expires_at = now + Duration::minutes(self.config.session_ttl_minutes);
        let token = self.sessions.create(user.id, user.role, expires_at);

        // Best-effort: the login succeeds even if the timestamp is not written.
        if let Err(error) = users::touch_last_login(self.store.pool(), user.id, now).await {
            tracing::warn!(user_id = %user.id, %error, "last login not recorded");
        }

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "user logged in");
        Ok(LoginOutcome {
            token,
            user_id: user.id,
            role: user.role,
            redirect: user.role.landing_path(),
            expires_at,
        })
    }

    /// Ends the session if it exists. Safe to repeat.
    pub fn logout(&self, token: Option<&str>) {
        if let Some(token) = token {
            if self.sessions.destroy(token) {
                tracing::debug!("session ended");
            }
        }
    }

    /// Activates or deactivates an account; deactivation ends all of its sessions.
    pub async fn set_active(&self, user_id: UserId, active: bool) -> Result<(), PlacementError> {
        if !users::set_active(self.store.pool(), user_id, active).await? {
            return Err(PlacementError::NotFound("user"));
        }
        if !active {
            let ended = self.sessions.destroy_for_user(user_id);
            tracing::info!(user_id = %user_id, sessions_ended = ended, "account deactivated");
        } else {
            tracing::info!(user_id = %user_id, "account activated");
        }
        Ok(())
    }
}

fn account_conflict(error: StoreError) -> PlacementError {
    match error {
        StoreError::Conflict => PlacementError::AlreadyExists("username or email".to_string()),
        other => other.into(),
    }
}
