//! Authorization gate: server-side sessions plus the authentication and role guards that run
//! before every protected handler.

pub mod guard;
pub mod session;

pub use guard::{authenticate, authorize, require_role, require_session, CurrentUser};
pub use session::{
    cleared_session_cookie, session_cookie, session_token, InMemorySessionStore, Session,
    SessionStore,
};
