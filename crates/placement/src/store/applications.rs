use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};

use super::StoreError;
use crate::domain::{ApplicationId, ApplicationStatus, CompanyId, JobId, StudentId};

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub student_id: StudentId,
    pub job_id: JobId,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// One row of a student's application history.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct StudentApplicationView {
    pub application_id: ApplicationId,
    pub job_id: JobId,
    pub job_title: String,
    pub company_name: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// One applicant as seen by the company owning the job.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ApplicantView {
    pub application_id: ApplicationId,
    pub student_id: StudentId,
    pub student_name: String,
    pub email: String,
    pub course: String,
    pub cgpa: Option<f64>,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub applied_at: DateTime<Utc>,
}

const APPLICATION_COLUMNS: &str =
    "a.id, a.student_id, a.job_id, a.status, a.cover_letter, a.notes, a.applied_at, a.reviewed_at";

pub async fn exists<'e, E>(executor: E, student_id: StudentId, job_id: JobId) -> Result<bool, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let found: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM applications WHERE student_id = ? AND job_id = ?)",
    )
    .bind(student_id)
    .bind(job_id)
    .fetch_one(executor)
    .await?;
    Ok(found)
}

/// Inserts a `pending` application. A second row for the same pair fails with `Conflict`.
pub async fn insert<'e, E>(
    executor: E,
    student_id: StudentId,
    job_id: JobId,
    cover_letter: Option<&str>,
) -> Result<ApplicationId, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO applications (student_id, job_id, status, cover_letter, applied_at) \
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(student_id)
    .bind(job_id)
    .bind(ApplicationStatus::Pending)
    .bind(cover_letter)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;
    Ok(ApplicationId(id))
}

pub async fn find<'e, E>(executor: E, id: ApplicationId) -> Result<Option<ApplicationRecord>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications a WHERE a.id = ?");
    Ok(sqlx::query_as::<_, ApplicationRecord>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

/// The application, only if it targets a job owned by `company_id`.
pub async fn find_for_company<'e, E>(
    executor: E,
    id: ApplicationId,
    company_id: CompanyId,
) -> Result<Option<ApplicationRecord>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {APPLICATION_COLUMNS} FROM applications a \
         JOIN jobs j ON j.id = a.job_id WHERE a.id = ? AND j.company_id = ?"
    );
    Ok(sqlx::query_as::<_, ApplicationRecord>(&sql)
        .bind(id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?)
}

pub async fn find_for_student<'e, E>(
    executor: E,
    id: ApplicationId,
    student_id: StudentId,
) -> Result<Option<ApplicationRecord>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {APPLICATION_COLUMNS} FROM applications a WHERE a.id = ? AND a.student_id = ?"
    );
    Ok(sqlx::query_as::<_, ApplicationRecord>(&sql)
        .bind(id)
        .bind(student_id)
        .fetch_optional(executor)
        .await?)
}

/// Sets the status. Existing notes and `reviewed_at` are kept when the new values are `None`.
pub async fn set_status<'e, E>(
    executor: E,
    id: ApplicationId,
    status: ApplicationStatus,
    notes: Option<&str>,
    reviewed_at: Option<DateTime<Utc>>,
) -> Result<bool, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE applications SET status = ?, notes = COALESCE(?, notes), \
         reviewed_at = COALESCE(?, reviewed_at) WHERE id = ?",
    )
    .bind(status)
    .bind(notes)
    .bind(reviewed_at)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// A student's applications, newest first.
pub async fn list_for_student<'e, E>(
    executor: E,
    student_id: StudentId,
) -> Result<Vec<StudentApplicationView>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    Ok(sqlx::query_as::<_, StudentApplicationView>(
        "SELECT a.id AS application_id, a.job_id, j.title AS job_title, c.company_name, \
         a.status, a.applied_at \
         FROM applications a \
         JOIN jobs j ON j.id = a.job_id \
         LEFT JOIN companies c ON c.id = j.company_id \
         WHERE a.student_id = ? ORDER BY a.applied_at DESC, a.id DESC",
    )
    .bind(student_id)
    .fetch_all(executor)
    .await?)
}

/// Applicants for a job owned by `company_id`, newest first.
pub async fn list_for_job<'e, E>(
    executor: E,
    company_id: CompanyId,
    job_id: JobId,
) -> Result<Vec<ApplicantView>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    Ok(sqlx::query_as::<_, ApplicantView>(
        "SELECT a.id AS application_id, a.student_id, s.name AS student_name, u.email, \
         s.course, s.cgpa, a.status, a.cover_letter, a.applied_at \
         FROM applications a \
         JOIN jobs j ON j.id = a.job_id \
         JOIN students s ON s.id = a.student_id \
         JOIN users u ON u.id = s.user_id \
         WHERE a.job_id = ? AND j.company_id = ? \
         ORDER BY a.applied_at DESC, a.id DESC",
    )
    .bind(job_id)
    .bind(company_id)
    .fetch_all(executor)
    .await?)
}

/// Number of applications per status for one student; statuses with no rows are omitted.
pub async fn count_by_status_for_student<'e, E>(
    executor: E,
    student_id: StudentId,
) -> Result<Vec<(ApplicationStatus, i64)>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    Ok(sqlx::query_as::<_, (ApplicationStatus, i64)>(
        "SELECT status, COUNT(*) FROM applications WHERE student_id = ? GROUP BY status",
    )
    .bind(student_id)
    .fetch_all(executor)
    .await?)
}

pub async fn count_for_company<'e, E>(executor: E, company_id: CompanyId) -> Result<i64, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM applications a JOIN jobs j ON j.id = a.job_id WHERE j.company_id = ?",
    )
    .bind(company_id)
    .fetch_one(executor)
    .await?;
    Ok(count)
}
