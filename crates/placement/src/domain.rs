use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Primary key of a `users` row.
    UserId
);
row_id!(
    /// Primary key of a `students` row (distinct from the owning user id).
    StudentId
);
row_id!(
    /// Primary key of a `companies` row (distinct from the owning user id).
    CompanyId
);
row_id!(JobId);
row_id!(ApplicationId);

/// Account role, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Company,
    Student,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Company => "company",
            Role::Student => "student",
        }
    }

    /// Case-insensitive parse of a stored or submitted role name.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        [Role::Admin, Role::Company, Role::Student]
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(raw))
    }

    pub const fn landing_path(self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Company => "/company/dashboard",
            Role::Student => "/student/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Internship,
    Contract,
}

impl JobType {
    pub const fn label(self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Internship => "internship",
            JobType::Contract => "contract",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Inactive,
    Closed,
    Draft,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Inactive => "inactive",
            JobStatus::Closed => "closed",
            JobStatus::Draft => "draft",
        }
    }
}

/// Status of a student's application to a job.
///
/// `Pending` is the initial state. `Accepted`, `Rejected` and `Withdrawn` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Shortlisted,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_ignores_case_and_whitespace() {
        assert_eq!(Role::parse("Student"), Some(Role::Student));
        assert_eq!(Role::parse(" COMPANY "), Some(Role::Company));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("recruiter"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn landing_paths_follow_role() {
        assert_eq!(Role::Admin.landing_path(), "/admin");
        assert_eq!(Role::Company.landing_path(), "/company/dashboard");
        assert_eq!(Role::Student.landing_path(), "/student/dashboard");
    }

    #[test]
    fn job_type_serializes_kebab_case() {
        let json = serde_json::to_string(&JobType::FullTime).expect("serialize");
        assert_eq!(json, "\"full-time\"");
        let parsed: JobType = serde_json::from_str("\"part-time\"").expect("deserialize");
        assert_eq!(parsed, JobType::PartTime);
    }

    #[test]
    fn terminal_statuses() {
        let terminal: Vec<_> = ApplicationStatus::ALL
            .into_iter()
            .filter(|status| status.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![
                ApplicationStatus::Accepted,
                ApplicationStatus::Rejected,
                ApplicationStatus::Withdrawn
            ]
        );
    }
}
