use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};

use super::StoreError;
use crate::domain::{CompanyId, JobId, JobStatus, JobType};

const JOB_COLUMNS: &str = "j.id, j.company_id, j.title, j.description, j.eligibility, \
     j.requirements, j.location, j.job_type, j.salary_min, j.salary_max, j.currency, \
     j.application_deadline, j.max_applications, j.current_applications, j.views_count, \
     j.status, j.created_at";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct JobRecord {
    pub id: JobId,
    pub company_id: CompanyId,
    pub title: String,
    pub description: String,
    pub eligibility: String,
    pub requirements: Option<String>,
    pub location: Option<String>,
    pub job_type: JobType,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub currency: String,
    pub application_deadline: Option<NaiveDate>,
    pub max_applications: i64,
    pub current_applications: i64,
    pub views_count: i64,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn deadline_passed(&self, today: NaiveDate) -> bool {
        self.application_deadline
            .is_some_and(|deadline| deadline < today)
    }

    pub fn is_full(&self) -> bool {
        self.current_applications >= self.max_applications
    }
}

/// Job plus the posting company's display fields.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct JobListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: JobRecord,
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub logo_url: Option<String>,
}

/// Validated values for a new posting.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub eligibility: String,
    pub requirements: Option<String>,
    pub location: Option<String>,
    pub job_type: JobType,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub currency: String,
    pub application_deadline: Option<NaiveDate>,
    pub max_applications: i64,
}

pub async fn insert<'e, E>(
    executor: E,
    company_id: CompanyId,
    draft: &JobDraft,
) -> Result<JobId, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO jobs (company_id, title, description, eligibility, requirements, location, \
         job_type, salary_min, salary_max, currency, application_deadline, max_applications, \
         status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(company_id)
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(&draft.eligibility)
    .bind(&draft.requirements)
    .bind(&draft.location)
    .bind(draft.job_type)
    .bind(draft.salary_min)
    .bind(draft.salary_max)
    .bind(&draft.currency)
    .bind(draft.application_deadline)
    .bind(draft.max_applications)
    .bind(JobStatus::Active)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(JobId(id))
}

pub async fn find<'e, E>(executor: E, id: JobId) -> Result<Option<JobRecord>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {JOB_COLUMNS} FROM jobs j WHERE j.id = ?");
    Ok(sqlx::query_as::<_, JobRecord>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

pub async fn find_listing<'e, E>(executor: E, id: JobId) -> Result<Option<JobListing>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {JOB_COLUMNS}, c.company_name, c.industry, c.logo_url \
         FROM jobs j LEFT JOIN companies c ON c.id = j.company_id WHERE j.id = ?"
    );
    Ok(sqlx::query_as::<_, JobListing>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

/// Active postings, newest first.
pub async fn list_active<'e, E>(executor: E) -> Result<Vec<JobListing>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {JOB_COLUMNS}, c.company_name, c.industry, c.logo_url \
         FROM jobs j LEFT JOIN companies c ON c.id = j.company_id \
         WHERE j.status = ? ORDER BY j.created_at DESC, j.id DESC"
    );
    Ok(sqlx::query_as::<_, JobListing>(&sql)
        .bind(JobStatus::Active)
        .fetch_all(executor)
        .await?)
}

pub async fn list_for_company<'e, E>(
    executor: E,
    company_id: CompanyId,
) -> Result<Vec<JobRecord>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {JOB_COLUMNS} FROM jobs j WHERE j.company_id = ? \
         ORDER BY j.created_at DESC, j.id DESC"
    );
    Ok(sqlx::query_as::<_, JobRecord>(&sql)
        .bind(company_id)
        .fetch_all(executor)
        .await?)
}

pub async fn increment_views<'e, E>(executor: E, id: JobId) -> Result<(), StoreError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE jobs SET views_count = views_count + 1 WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn increment_applications<'e, E>(executor: E, id: JobId) -> Result<(), StoreError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE jobs SET current_applications = current_applications + 1 WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Recomputes `current_applications` from the applications table and returns the new value.
pub async fn recount_applications<'e, E>(executor: E, id: JobId) -> Result<i64, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let count: Option<i64> = sqlx::query_scalar(
        "UPDATE jobs SET current_applications = \
         (SELECT COUNT(*) FROM applications a WHERE a.job_id = jobs.id) \
         WHERE id = ? RETURNING current_applications",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    count.ok_or(StoreError::Database(sqlx::Error::RowNotFound))
}

/// Only the owning company may change a posting's status. Returns `false` otherwise.
pub async fn set_status<'e, E>(
    executor: E,
    company_id: CompanyId,
    id: JobId,
    status: JobStatus,
) -> Result<bool, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let result =
        sqlx::query("UPDATE jobs SET status = ?, updated_at = ? WHERE id = ? AND company_id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .bind(company_id)
            .execute(executor)
            .await?;
    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
pub(crate) fn sample_draft(title: &str) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        description: "Build things".to_string(),
        eligibility: "CGPA above 7".to_string(),
        requirements: None,
        location: Some("Remote".to_string()),
        job_type: JobType::Internship,
        salary_min: Some(10_000.0),
        salary_max: Some(20_000.0),
        currency: "INR".to_string(),
        application_deadline: None,
        max_applications: 100,
    }
}
