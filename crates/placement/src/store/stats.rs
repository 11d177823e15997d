use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};

use super::StoreError;
use crate::domain::CompanyId;

/// Site-wide totals shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct AdminStatistics {
    pub total_users: i64,
    pub active_users: i64,
    pub total_students: i64,
    pub total_companies: i64,
    pub total_jobs: i64,
    pub active_jobs: i64,
    pub total_applications: i64,
    pub pending_applications: i64,
    pub accepted_applications: i64,
}

pub async fn admin_statistics<'e, E>(executor: E) -> Result<AdminStatistics, StoreError>
where
    E: SqliteExecutor<'e>,
{
    Ok(sqlx::query_as::<_, AdminStatistics>(
        "SELECT \
         (SELECT COUNT(*) FROM users) AS total_users, \
         (SELECT COUNT(*) FROM users WHERE is_active) AS active_users, \
         (SELECT COUNT(*) FROM students) AS total_students, \
         (SELECT COUNT(*) FROM companies) AS total_companies, \
         (SELECT COUNT(*) FROM jobs) AS total_jobs, \
         (SELECT COUNT(*) FROM jobs WHERE status = 'active') AS active_jobs, \
         (SELECT COUNT(*) FROM applications) AS total_applications, \
         (SELECT COUNT(*) FROM applications WHERE status = 'pending') AS pending_applications, \
         (SELECT COUNT(*) FROM applications WHERE status = 'accepted') AS accepted_applications",
    )
    .fetch_one(executor)
    .await?)
}

/// Job counts for one company's dashboard: `(total, active)`.
pub async fn company_job_counts<'e, E>(
    executor: E,
    company_id: CompanyId,
) -> Result<(i64, i64), StoreError>
where
    E: SqliteExecutor<'e>,
{
    Ok(sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), COALESCE(SUM(status = 'active'), 0) FROM jobs WHERE company_id = ?",
    )
    .bind(company_id)
    .fetch_one(executor)
    .await?)
}
