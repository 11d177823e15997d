use crate::credentials::{sanitize_input, validate_email};
use crate::domain::UserId;
use crate::error::PlacementError;
use crate::store::companies::{self, CompanyProfileUpdate, CompanyRecord};
use crate::store::students::{self, StudentProfileUpdate, StudentRecord};
use crate::store::{Store, StoreError};

const SHORT_TEXT: usize = 100;
const URL_TEXT: usize = 500;
const LONG_TEXT: usize = 2000;

fn clean(value: &mut Option<String>, limit: usize) {
    if let Some(text) = value.as_mut() {
        *text = sanitize_input(text, Some(limit));
    }
}

fn check_email(value: &mut Option<String>, field: &str) -> Result<(), PlacementError> {
    clean(value, SHORT_TEXT);
    if let Some(email) = value.as_mut() {
        *email = email.to_lowercase();
        if !validate_email(email) {
            return Err(PlacementError::InvalidInput(format!("Invalid {field}")));
        }
    }
    Ok(())
}

fn check_url(value: &mut Option<String>, field: &str) -> Result<(), PlacementError> {
    clean(value, URL_TEXT);
    match value.as_deref() {
        Some(url) if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) => {
            Err(PlacementError::InvalidInput(format!(
                "{field} must start with http:// or https://"
            )))
        }
        _ => Ok(()),
    }
}

fn normalize_student(update: &mut StudentProfileUpdate) -> Result<(), PlacementError> {
    clean(&mut update.name, SHORT_TEXT);
    clean(&mut update.course, SHORT_TEXT);
    clean(&mut update.phone, 20);
    clean(&mut update.skills, LONG_TEXT);
    clean(&mut update.bio, LONG_TEXT);
    check_email(&mut update.email, "email address")?;
    check_url(&mut update.resume_url, "Resume URL")?;
    check_url(&mut update.linkedin_url, "LinkedIn URL")?;
    check_url(&mut update.github_url, "GitHub URL")?;

    if let Some(cgpa) = update.cgpa {
        if !(0.0..=10.0).contains(&cgpa) {
            return Err(PlacementError::InvalidInput(
                "CGPA must be between 0 and 10".to_string(),
            ));
        }
    }
    if let Some(year) = update.year_of_study {
        if !(1..=10).contains(&year) {
            return Err(PlacementError::InvalidInput(
                "Year of study must be between 1 and 10".to_string(),
            ));
        }
    }
    Ok(())
}

fn normalize_company(update: &mut CompanyProfileUpdate) -> Result<(), PlacementError> {
    clean(&mut update.company_name, SHORT_TEXT);
    clean(&mut update.company_type, SHORT_TEXT);
    clean(&mut update.industry, SHORT_TEXT);
    clean(&mut update.hr_phone, 20);
    clean(&mut update.address, LONG_TEXT);
    clean(&mut update.description, LONG_TEXT);
    check_email(&mut update.hr_email, "HR email address")?;
    check_url(&mut update.website, "Website")?;
    check_url(&mut update.logo_url, "Logo URL")?;
    Ok(())
}

/// Student and company self-service profiles.
pub struct ProfileService {
    store: Store,
}

impl ProfileService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn student_profile(&self, user_id: UserId) -> Result<StudentRecord, PlacementError> {
        students::find_by_user(self.store.pool(), user_id)
            .await?
            .ok_or(PlacementError::NotFound("student profile"))
    }

    /// Applies the present fields and refreshes the completeness flag.
    pub async fn update_student_profile(
        &self,
        user_id: UserId,
        mut update: StudentProfileUpdate,
    ) -> Result<StudentRecord, PlacementError> {
        normalize_student(&mut update)?;

        let mut tx = self.store.begin().await?;
        let current = students::find_by_user(&mut *tx, user_id)
            .await?
            .ok_or(PlacementError::NotFound("student profile"))?;
        students::update_profile(&mut *tx, current.id, &update).await?;

        let mut refreshed = students::find_by_user(&mut *tx, user_id)
            .await?
            .ok_or(PlacementError::NotFound("student profile"))?;
        let complete = refreshed.has_required_fields();
        if complete != refreshed.is_profile_complete {
            students::set_profile_complete(&mut *tx, refreshed.id, complete).await?;
            refreshed.is_profile_complete = complete;
        }
        tx.commit().await.map_err(StoreError::from)?;

        tracing::info!(student_id = %refreshed.id, complete, "student profile updated");
        Ok(refreshed)
    }

    pub async fn company_profile(&self, user_id: UserId) -> Result<CompanyRecord, PlacementError> {
        companies::find_by_user(self.store.pool(), user_id)
            .await?
            .ok_or(PlacementError::NotFound("company profile"))
    }

    pub async fn update_company_profile(
        &self,
        user_id: UserId,
        mut update: CompanyProfileUpdate,
    ) -> Result<CompanyRecord, PlacementError> {
        normalize_company(&mut update)?;

        let mut tx = self.store.begin().await?;
        let current = companies::find_by_user(&mut *tx, user_id)
            .await?
            .ok_or(PlacementError::NotFound("company profile"))?;
        companies::update_profile(&mut *tx, current.id, &update).await?;
        let refreshed = companies::find_by_user(&mut *tx, user_id)
            .await?
            .ok_or(PlacementError::NotFound("company profile"))?;
        tx.commit().await.map_err(StoreError::from)?;

        tracing::info!(company_id = %refreshed.id, "company profile updated");
        Ok(refreshed)
    }
}
