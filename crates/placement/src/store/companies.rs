use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};

use super::{nullable_text, Column, PartialUpdate, StoreError};
use crate::domain::{CompanyId, UserId};

const COMPANY_COLUMNS: &str = "id, user_id, company_name, hr_email, company_type, industry, \
     website, hr_phone, address, description, logo_url, is_verified";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CompanyRecord {
    pub id: CompanyId,
    pub user_id: UserId,
    pub company_name: String,
    pub hr_email: String,
    pub company_type: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub hr_phone: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub is_verified: bool,
}

impl CompanyRecord {
    pub fn has_required_fields(&self) -> bool {
        !self.company_name.is_empty()
            && !self.hr_email.is_empty()
            && self.industry.as_deref().is_some_and(|industry| !industry.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyProfileUpdate {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub hr_email: Option<String>,
    #[serde(default)]
    pub company_type: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub hr_phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum CompanyColumn {
    CompanyName,
    HrEmail,
    CompanyType,
    Industry,
    Website,
    HrPhone,
    Address,
    Description,
    LogoUrl,
    UpdatedAt,
}

impl Column for CompanyColumn {
    fn as_sql(self) -> &'static str {
        match self {
            CompanyColumn::CompanyName => "company_name",
            CompanyColumn::HrEmail => "hr_email",
            CompanyColumn::CompanyType => "company_type",
            CompanyColumn::Industry => "industry",
            CompanyColumn::Website => "website",
            CompanyColumn::HrPhone => "hr_phone",
            CompanyColumn::Address => "address",
            CompanyColumn::Description => "description",
            CompanyColumn::LogoUrl => "logo_url",
            CompanyColumn::UpdatedAt => "updated_at",
        }
    }
}

pub async fn insert_empty<'e, E>(
    executor: E,
    user_id: UserId,
    hr_email: &str,
) -> Result<CompanyId, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO companies (user_id, company_name, hr_email, updated_at) \
         VALUES (?, '', ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(hr_email)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;
    Ok(CompanyId(id))
}

pub async fn find_by_user<'e, E>(
    executor: E,
    user_id: UserId,
) -> Result<Option<CompanyRecord>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE user_id = ?");
    Ok(sqlx::query_as::<_, CompanyRecord>(&sql)
        .bind(user_id)
        .fetch_optional(executor)
        .await?)
}

pub async fn update_profile<'e, E>(
    executor: E,
    id: CompanyId,
    update: &CompanyProfileUpdate,
) -> Result<bool, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let mut query = PartialUpdate::new("companies");
    query
        .set_if(CompanyColumn::CompanyName, update.company_name.clone())
        .set_if(CompanyColumn::HrEmail, update.hr_email.clone())
        .set_if(CompanyColumn::CompanyType, nullable_text(&update.company_type))
        .set_if(CompanyColumn::Industry, nullable_text(&update.industry))
        .set_if(CompanyColumn::Website, nullable_text(&update.website))
        .set_if(CompanyColumn::HrPhone, nullable_text(&update.hr_phone))
        .set_if(CompanyColumn::Address, nullable_text(&update.address))
        .set_if(CompanyColumn::Description, nullable_text(&update.description))
        .set_if(CompanyColumn::LogoUrl, nullable_text(&update.logo_url));
    if query.is_empty() {
        return Ok(false);
    }
    query.set(CompanyColumn::UpdatedAt, Utc::now());
    Ok(query.execute_for(executor, id.0).await? == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::store::{users, Store};

    #[tokio::test]
    async fn company_profile_completion() {
        let store = Store::in_memory().await.expect("store");
        let user_id = users::insert(
            store.pool(),
            &users::NewUser {
                username: "acme",
                email: "hr@acme.test",
                password_hash: "hash",
                role: Role::Company,
            },
        )
        .await
        .expect("user");
        let company_id = insert_empty(store.pool(), user_id, "hr@acme.test")
            .await
            .expect("company");

        let initial = find_by_user(store.pool(), user_id)
            .await
            .expect("query")
            .expect("profile");
        assert_eq!(initial.hr_email, "hr@acme.test");
        assert!(!initial.has_required_fields());

        let update = CompanyProfileUpdate {
            company_name: Some("Acme".into()),
            industry: Some("Software".into()),
            website: Some("https://acme.test".into()),
            ..CompanyProfileUpdate::default()
        };
        update_profile(store.pool(), company_id, &update)
            .await
            .expect("update");

        let updated = find_by_user(store.pool(), user_id)
            .await
            .expect("query")
            .expect("profile");
        assert_eq!(updated.company_name, "Acme");
        assert_eq!(updated.website.as_deref(), Some("https://acme.test"));
        assert!(updated.has_required_fields());
    }

    #[tokio::test]
    async fn second_profile_for_same_user_conflicts() {
        let store = Store::in_memory().await.expect("store");
        let user_id = users::insert(
            store.pool(),
            &users::NewUser {
                username: "acme",
                email: "hr@acme.test",
                password_hash: "hash",
                role: Role::Company,
            },
        )
        .await
        .expect("user");
        insert_empty(store.pool(), user_id, "hr@acme.test")
            .await
            .expect("first");
        let err = insert_empty(store.pool(), user_id, "hr@acme.test")
            .await
            .expect_err("second");
        assert!(matches!(err, StoreError::Conflict));
    }
}
