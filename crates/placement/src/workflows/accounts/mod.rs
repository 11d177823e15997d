//! Account registration, login/logout and administrative activation.

pub mod router;
pub mod service;

pub use router::{landing_router, public_router};
pub use service::{
    landing_path, Account, AccountService, LoginOutcome, LoginRequest, RegistrationRequest,
};
