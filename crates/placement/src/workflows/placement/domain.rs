use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::credentials::sanitize_input;
use crate::domain::{ApplicationStatus, JobStatus, JobType};
use crate::error::PlacementError;
use crate::store::applications::StudentApplicationView;
use crate::store::companies::CompanyRecord;
use crate::store::jobs::{JobDraft, JobListing, JobRecord};
use crate::store::students::StudentRecord;

const DEFAULT_MAX_APPLICATIONS: i64 = 100;
const DEFAULT_CURRENCY: &str = "INR";
pub(crate) const COVER_LETTER_MAX_CHARS: usize = 5000;

/// Job posting request submitted by a company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub eligibility: String,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub application_deadline: Option<NaiveDate>,
    #[serde(default)]
    pub max_applications: Option<i64>,
}

fn required_text(value: &str, limit: usize, field: &str) -> Result<String, PlacementError> {
    let value = sanitize_input(value, Some(limit));
    if value.is_empty() {
        return Err(PlacementError::InvalidInput(format!("{field} is required")));
    }
    Ok(value)
}

fn optional_text(value: Option<&str>, limit: usize) -> Option<String> {
    value
        .map(|text| sanitize_input(text, Some(limit)))
        .filter(|text| !text.is_empty())
}

impl NewJob {
    /// Sanitizes and validates the request against `today`, filling defaults.
    pub fn into_draft(self, today: NaiveDate) -> Result<JobDraft, PlacementError> {
        let title = required_text(&self.title, 200, "Job title")?;
        let description = required_text(&self.description, 10_000, "Job description")?;
        let eligibility = required_text(&self.eligibility, 2_000, "Eligibility")?;

        for salary in [self.salary_min, self.salary_max].into_iter().flatten() {
            if !salary.is_finite() || salary < 0.0 {
                return Err(PlacementError::InvalidInput(
                    "Salary must be a non-negative amount".to_string(),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if min > max {
                return Err(PlacementError::InvalidInput(
                    "Minimum salary cannot exceed maximum salary".to_string(),
                ));
            }
        }

        let max_applications = self.max_applications.unwrap_or(DEFAULT_MAX_APPLICATIONS);
        if max_applications < 1 {
            return Err(PlacementError::InvalidInput(
                "Maximum applications must be at least 1".to_string(),
            ));
        }

        if self
            .application_deadline
            .is_some_and(|deadline| deadline < today)
        {
            return Err(PlacementError::InvalidInput(
                "Application deadline cannot be in the past".to_string(),
            ));
        }

        let currency = optional_text(self.currency.as_deref(), 3)
            .map(|code| code.to_ascii_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        Ok(JobDraft {
            title,
            description,
            eligibility,
            requirements: optional_text(self.requirements.as_deref(), 5_000),
            location: optional_text(self.location.as_deref(), 200),
            job_type: self.job_type.unwrap_or_default(),
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            currency,
            application_deadline: self.application_deadline,
            max_applications,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyRequest {
    #[serde(default)]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JobStatusChange {
    pub status: JobStatus,
}

/// A posting as a student sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentJobView {
    #[serde(flatten)]
    pub job: JobListing,
    pub has_applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentDashboard {
    pub profile: StudentRecord,
    pub profile_complete: bool,
    pub total_applications: i64,
    /// Every status is present, zero when the student has none in it.
    pub applications_by_status: BTreeMap<&'static str, i64>,
    pub recent_applications: Vec<StudentApplicationView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDashboard {
    pub profile: CompanyRecord,
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub total_applicants: i64,
    pub recent_jobs: Vec<JobRecord>,
}
