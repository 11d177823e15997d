use std::collections::BTreeMap;

use chrono::Utc;

use super::domain::{
    CompanyDashboard, NewJob, StudentDashboard, StudentJobView, COVER_LETTER_MAX_CHARS,
};
use super::lifecycle::{company_may_set, TransitionPolicy};
use crate::credentials::sanitize_input;
use crate::domain::{ApplicationId, ApplicationStatus, JobId, JobStatus, StudentId, UserId};
use crate::error::PlacementError;
use crate::store::applications::{
    self, ApplicantView, ApplicationRecord, StudentApplicationView,
};
use crate::store::companies::{self, CompanyRecord};
use crate::store::jobs::{self, JobListing, JobRecord};
use crate::store::students::{self, StudentRecord};
use crate::store::{stats, Store, StoreError};

const DASHBOARD_RECENT: usize = 5;
const NOTES_MAX_CHARS: usize = 2000;

/// Job postings and the application lifecycle.
pub struct PlacementService {
    store: Store,
    policy: TransitionPolicy,
}

impl PlacementService {
    pub fn new(store: Store, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    async fn student_for(&self, user_id: UserId) -> Result<StudentRecord, PlacementError> {
        students::find_by_user(self.store.pool(), user_id)
            .await?
            .ok_or(PlacementError::NotFound("student profile"))
    }

    async fn company_for(&self, user_id: UserId) -> Result<CompanyRecord, PlacementError> {
        companies::find_by_user(self.store.pool(), user_id)
            .await?
            .ok_or(PlacementError::NotFound("company profile"))
    }

    async fn job(&self, job_id: JobId) -> Result<JobRecord, PlacementError> {
        jobs::find(self.store.pool(), job_id)
            .await?
            .ok_or(PlacementError::NotFound("job"))
    }

    pub async fn post_job(&self, user_id: UserId, request: NewJob) -> Result<JobRecord, PlacementError> {
        let company = self.company_for(user_id).await?;
        if company.company_name.is_empty() {
            return Err(PlacementError::InvalidInput(
                "Please complete your company profile before posting jobs".to_string(),
            ));
        }

        let draft = request.into_draft(Utc::now().date_naive())?;
        let job_id = jobs::insert(self.store.pool(), company.id, &draft).await?;
        tracing::info!(company_id = %company.id, job_id = %job_id, "job posted");
        self.job(job_id).await
    }

    pub async fn jobs_for_company(&self, user_id: UserId) -> Result<Vec<JobRecord>, PlacementError> {
        let company = self.company_for(user_id).await?;
        Ok(jobs::list_for_company(self.store.pool(), company.id).await?)
    }

    pub async fn active_jobs(&self) -> Result<Vec<JobListing>, PlacementError> {
        Ok(jobs::list_active(self.store.pool()).await?)
    }

    /// Reading a posting counts as a view.
    pub async fn job_detail(&self, job_id: JobId) -> Result<JobListing, PlacementError> {
        // Best-effort: a failed view count never fails the read.
        if let Err(error) = jobs::increment_views(self.store.pool(), job_id).await {
            tracing::debug!(job_id = %job_id, %error, "view count not recorded");
        }

        jobs::find_listing(self.store.pool(), job_id)
            .await?
            .ok_or(PlacementError::NotFound("job"))
    }

    pub async fn job_detail_for_student(
        &self,
        user_id: UserId,
        job_id: JobId,
    ) -> Result<StudentJobView, PlacementError> {
        let student = self.student_for(user_id).await?;
        let job = self.job_detail(job_id).await?;
        let has_applied = self.has_applied(student.id, job_id).await?;
        Ok(StudentJobView { job, has_applied })
    }

    pub async fn set_job_status(
        &self,
        user_id: UserId,
        job_id: JobId,
        status: JobStatus,
    ) -> Result<JobRecord, PlacementError> {
        let company = self.company_for(user_id).await?;
        if !jobs::set_status(self.store.pool(), company.id, job_id, status).await? {
            return Err(PlacementError::NotFound("job"));
        }
        tracing::info!(job_id = %job_id, status = status.label(), "job status changed");
        self.job(job_id).await
    }

    pub async fn has_applied(&self, student_id: StudentId, job_id: JobId) -> Result<bool, PlacementError> {
        Ok(applications::exists(self.store.pool(), student_id, job_id).await?)
    }

    /// Creates a `pending` application and bumps the job's application counter atomically.
    pub async fn apply_for_job(
        &self,
        user_id: UserId,
        job_id: JobId,
        cover_letter: Option<String>,
    ) -> Result<ApplicationId, PlacementError> {
        let student = self.student_for(user_id).await?;
        let cover_letter = cover_letter
            .map(|text| sanitize_input(&text, Some(COVER_LETTER_MAX_CHARS)))
            .filter(|text| !text.is_empty());

        let mut tx = self.store.begin().await?;

        let job = jobs::find(&mut *tx, job_id)
            .await?
            .ok_or(PlacementError::NotFound("job"))?;
        if applications::exists(&mut *tx, student.id, job_id).await? {
            return Err(PlacementError::AlreadyApplied);
        }
        if job.status != JobStatus::Active {
            return Err(PlacementError::InvalidInput(
                "This job is not accepting applications".to_string(),
            ));
        }
        if job.deadline_passed(Utc::now().date_naive()) {
            return Err(PlacementError::InvalidInput(
                "The application deadline for this job has passed".to_string(),
            ));
        }
        if job.is_full() {
            return Err(PlacementError::InvalidInput(
                "This job has reached its maximum number of applications".to_string(),
            ));
        }

        let application_id =
            match applications::insert(&mut *tx, student.id, job_id, cover_letter.as_deref()).await {
                Ok(id) => id,
                Err(StoreError::Conflict) => return Err(PlacementError::AlreadyApplied),
                Err(other) => return Err(other.into()),
            };
        jobs::increment_applications(&mut *tx, job_id).await?;
        tx.commit().await.map_err(StoreError::from)?;

        tracing::info!(
            student_id = %student.id,
            job_id = %job_id,
            application_id = %application_id,
            "application submitted"
        );
        Ok(application_id)
    }

    pub async fn applications_for_student(
        &self,
        user_id: UserId,
    ) -> Result<Vec<StudentApplicationView>, PlacementError> {
        let student = self.student_for(user_id).await?;
        Ok(applications::list_for_student(self.store.pool(), student.id).await?)
    }

    pub async fn applicants_for_job(
        &self,
        user_id: UserId,
        job_id: JobId,
    ) -> Result<Vec<ApplicantView>, PlacementError> {
        let company = self.company_for(user_id).await?;
        let job = self.job(job_id).await?;
        if job.company_id != company.id {
            return Err(PlacementError::NotFound("job"));
        }
        Ok(applications::list_for_job(self.store.pool(), company.id, job_id).await?)
    }

    /// Company decision on an application to one of its own jobs.
    pub async fn update_application_status(
        &self,
        user_id: UserId,
        application_id: ApplicationId,
        status: ApplicationStatus,
        notes: Option<String>,
    ) -> Result<ApplicationRecord, PlacementError> {
        if !company_may_set(status) {
            return Err(PlacementError::InvalidInput(format!(
                "Companies cannot mark an application as {status}"
            )));
        }
        let company = self.company_for(user_id).await?;
        let notes = notes
            .map(|text| sanitize_input(&text, Some(NOTES_MAX_CHARS)))
            .filter(|text| !text.is_empty());

        let mut tx = self.store.begin().await?;
        let current = applications::find_for_company(&mut *tx, application_id, company.id)
            .await?
            .ok_or(PlacementError::NotFound("application"))?;
        self.policy.check(current.status, status)?;
        applications::set_status(
            &mut *tx,
            application_id,
            status,
            notes.as_deref(),
            Some(Utc::now()),
        )
        .await?;
        let updated = applications::find(&mut *tx, application_id)
            .await?
            .ok_or(PlacementError::NotFound("application"))?;
        tx.commit().await.map_err(StoreError::from)?;

        tracing::info!(
            application_id = %application_id,
            from = current.status.label(),
            to = status.label(),
            "application status updated"
        );
        Ok(updated)
    }

    /// Student pulls back one of their own applications.
    pub async fn withdraw_application(
        &self,
        user_id: UserId,
        application_id: ApplicationId,
    ) -> Result<ApplicationRecord, PlacementError> {
        let student = self.student_for(user_id).await?;

        let mut tx = self.store.begin().await?;
        let current = applications::find_for_student(&mut *tx, application_id, student.id)
            .await?
            .ok_or(PlacementError::NotFound("application"))?;
        self.policy.check(current.status, ApplicationStatus::Withdrawn)?;
        applications::set_status(
            &mut *tx,
            application_id,
            ApplicationStatus::Withdrawn,
            None,
            None,
        )
        .await?;
        let updated = applications::find(&mut *tx, application_id)
            .await?
            .ok_or(PlacementError::NotFound("application"))?;
        tx.commit().await.map_err(StoreError::from)?;

        tracing::info!(application_id = %application_id, "application withdrawn");
        Ok(updated)
    }

    /// Rebuilds the job's cached application counter from the applications table.
    pub async fn recount_applications(&self, job_id: JobId) -> Result<i64, PlacementError> {
        match jobs::recount_applications(self.store.pool(), job_id).await {
            Ok(count) => Ok(count),
            Err(StoreError::Database(sqlx::Error::RowNotFound)) => {
                Err(PlacementError::NotFound("job"))
            }
            Err(other) => Err(other.into()),
        }
    }

    pub async fn student_dashboard(&self, user_id: UserId) -> Result<StudentDashboard, PlacementError> {
        let profile = self.student_for(user_id).await?;
        let counts = applications::count_by_status_for_student(self.store.pool(), profile.id).await?;
        let mut recent = applications::list_for_student(self.store.pool(), profile.id).await?;
        recent.truncate(DASHBOARD_RECENT);

        let mut applications_by_status: BTreeMap<&'static str, i64> = ApplicationStatus::ALL
            .into_iter()
            .map(|status| (status.label(), 0))
            .collect();
        for (status, count) in &counts {
            applications_by_status.insert(status.label(), *count);
        }

        Ok(StudentDashboard {
            profile_complete: profile.is_profile_complete,
            total_applications: counts.iter().map(|(_, count)| count).sum(),
            applications_by_status,
            recent_applications: recent,
            profile,
        })
    }

    pub async fn company_dashboard(&self, user_id: UserId) -> Result<CompanyDashboard, PlacementError> {
        let profile = self.company_for(user_id).await?;
        let (total_jobs, active_jobs) = stats::company_job_counts(self.store.pool(), profile.id).await?;
        let total_applicants = applications::count_for_company(self.store.pool(), profile.id).await?;
        let mut recent_jobs = jobs::list_for_company(self.store.pool(), profile.id).await?;
        recent_jobs.truncate(DASHBOARD_RECENT);

        Ok(CompanyDashboard {
            profile,
            total_jobs,
            active_jobs,
            total_applicants,
            recent_jobs,
        })
    }
}
