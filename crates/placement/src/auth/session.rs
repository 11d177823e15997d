use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use cookie::{Cookie, SameSite};

use crate::config::AuthConfig;
use crate::credentials::{generate_secure_token, DEFAULT_TOKEN_BYTES};
use crate::domain::{Role, UserId};

/// What a session remembers about its user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Server-side session storage keyed by opaque token.
pub trait SessionStore: Send + Sync {
    /// Starts a session and returns its token.
    fn create(&self, user_id: UserId, role: Role, expires_at: DateTime<Utc>) -> String;
    /// Live session for `token`; expired sessions are dropped and reported as absent.
    fn get(&self, token: &str) -> Option<Session>;
    fn destroy(&self, token: &str) -> bool;
    /// Drops every session belonging to `user_id`, returning how many were removed.
    fn destroy_for_user(&self, user_id: UserId) -> usize;
}

#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    inner: Arc<Mutex<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("session mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, user_id: UserId, role: Role, expires_at: DateTime<Utc>) -> String {
        let token = generate_secure_token(DEFAULT_TOKEN_BYTES);
        let session = Session {
            user_id,
            role: role.as_str().to_string(),
            expires_at,
        };
        let mut guard = self.inner.lock().expect("session mutex poisoned");
        guard.retain(|_, existing| !existing.is_expired(Utc::now()));
        guard.insert(token.clone(), session);
        token
    }

    fn get(&self, token: &str) -> Option<Session> {
        let mut guard = self.inner.lock().expect("session mutex poisoned");
        match guard.get(token) {
            Some(session) if session.is_expired(Utc::now()) => {
                guard.remove(token);
                None
            }
            Some(session) => Some(session.clone()),
            None => None,
        }
    }

    fn destroy(&self, token: &str) -> bool {
        let mut guard = self.inner.lock().expect("session mutex poisoned");
        guard.remove(token).is_some()
    }

    fn destroy_for_user(&self, user_id: UserId) -> usize {
        let mut guard = self.inner.lock().expect("session mutex poisoned");
        let before = guard.len();
        guard.retain(|_, session| session.user_id != user_id);
        before - guard.len()
    }
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(config: &AuthConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.session_cookie.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(cookie::time::Duration::minutes(config.session_ttl_minutes))
        .build()
}

/// Cookie instructing the client to forget its session.
pub fn cleared_session_cookie(config: &AuthConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build((config.session_cookie.clone(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .build();
    cookie.make_removal();
    cookie
}

/// Session token from the request's `Cookie` headers, if any.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == cookie_name && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}
