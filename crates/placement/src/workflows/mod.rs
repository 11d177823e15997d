pub mod accounts;
pub mod admin;
pub mod placement;
pub mod profiles;
