//! Job postings and the student application lifecycle.
//!
//! Applications start `pending` and only move forward under the default [`TransitionPolicy`];
//! companies drive review decisions, students may withdraw.

pub mod domain;
pub mod lifecycle;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplyRequest, CompanyDashboard, JobStatusChange, NewJob, StatusChange, StudentDashboard,
    StudentJobView,
};
pub use lifecycle::{company_may_set, TransitionPolicy};
pub use router::{company_router, student_router};
pub use service::PlacementService;
