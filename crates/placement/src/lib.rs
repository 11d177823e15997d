pub mod auth;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod router;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod workflows;

pub use error::{AppError, PlacementError};
pub use router::placement_router;
pub use state::PlacementState;
