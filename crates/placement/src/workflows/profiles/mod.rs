//! Student and company profiles, created empty at registration and completed by their owners.

pub mod router;
pub mod service;

pub use crate::store::companies::CompanyProfileUpdate;
pub use crate::store::students::StudentProfileUpdate;
pub use router::{company_profile_router, student_profile_router};
pub use service::ProfileService;
