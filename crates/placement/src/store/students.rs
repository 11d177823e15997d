use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};

use super::{nullable_text, Column, PartialUpdate, StoreError};
use crate::domain::{StudentId, UserId};

const STUDENT_COLUMNS: &str = "id, user_id, name, email, course, cgpa, phone, year_of_study, \
     skills, bio, resume_url, linkedin_url, github_url, is_profile_complete";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct StudentRecord {
    pub id: StudentId,
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub course: String,
    pub cgpa: Option<f64>,
    pub phone: Option<String>,
    pub year_of_study: Option<i64>,
    pub skills: Option<String>,
    pub bio: Option<String>,
    pub resume_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub is_profile_complete: bool,
}

impl StudentRecord {
    /// Name, email, course, CGPA, phone and year of study are all present.
    pub fn has_required_fields(&self) -> bool {
        !self.name.is_empty()
            && !self.email.is_empty()
            && !self.course.is_empty()
            && self.cgpa.is_some()
            && self.phone.as_deref().is_some_and(|phone| !phone.is_empty())
            && self.year_of_study.is_some()
    }
}

/// Fields a student may change on their own profile. Absent fields are left untouched; empty
/// text clears an optional column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub cgpa: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub year_of_study: Option<i64>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum StudentColumn {
    Name,
    Email,
    Course,
    Cgpa,
    Phone,
    YearOfStudy,
    Skills,
    Bio,
    ResumeUrl,
    LinkedinUrl,
    GithubUrl,
    UpdatedAt,
}

impl Column for StudentColumn {
    fn as_sql(self) -> &'static str {
        match self {
            StudentColumn::Name => "name",
            StudentColumn::Email => "email",
            StudentColumn::Course => "course",
            StudentColumn::Cgpa => "cgpa",
            StudentColumn::Phone => "phone",
            StudentColumn::YearOfStudy => "year_of_study",
            StudentColumn::Skills => "skills",
            StudentColumn::Bio => "bio",
            StudentColumn::ResumeUrl => "resume_url",
            StudentColumn::LinkedinUrl => "linkedin_url",
            StudentColumn::GithubUrl => "github_url",
            StudentColumn::UpdatedAt => "updated_at",
        }
    }
}

/// Creates the empty profile that accompanies a new student account.
pub async fn insert_empty<'e, E>(
    executor: E,
    user_id: UserId,
    email: &str,
) -> Result<StudentId, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO students (user_id, name, email, course, updated_at) \
         VALUES (?, '', ?, '', ?) RETURNING id",
    )
    .bind(user_id)
    .bind(email)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;
    Ok(StudentId(id))
}

pub async fn find_by_user<'e, E>(
    executor: E,
    user_id: UserId,
) -> Result<Option<StudentRecord>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE user_id = ?");
    Ok(sqlx::query_as::<_, StudentRecord>(&sql)
        .bind(user_id)
        .fetch_optional(executor)
        .await?)
}

/// Writes the present fields of `update`. Returns `false` when nothing was written.
pub async fn update_profile<'e, E>(
    executor: E,
    id: StudentId,
    update: &StudentProfileUpdate,
) -> Result<bool, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let mut query = PartialUpdate::new("students");
    query
        .set_if(StudentColumn::Name, update.name.clone())
        .set_if(StudentColumn::Email, update.email.clone())
        .set_if(StudentColumn::Course, update.course.clone())
        .set_if(StudentColumn::Cgpa, update.cgpa)
        .set_if(StudentColumn::Phone, nullable_text(&update.phone))
        .set_if(StudentColumn::YearOfStudy, update.year_of_study)
        .set_if(StudentColumn::Skills, nullable_text(&update.skills))
        .set_if(StudentColumn::Bio, nullable_text(&update.bio))
        .set_if(StudentColumn::ResumeUrl, nullable_text(&update.resume_url))
        .set_if(StudentColumn::LinkedinUrl, nullable_text(&update.linkedin_url))
        .set_if(StudentColumn::GithubUrl, nullable_text(&update.github_url));
    if query.is_empty() {
        return Ok(false);
    }
    query.set(StudentColumn::UpdatedAt, Utc::now());
    Ok(query.execute_for(executor, id.0).await? == 1)
}

pub async fn set_profile_complete<'e, E>(
    executor: E,
    id: StudentId,
    complete: bool,
) -> Result<(), StoreError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE students SET is_profile_complete = ? WHERE id = ?")
        .bind(complete)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::store::{users, Store};

    async fn seeded() -> (Store, UserId, StudentId) {
        let store = Store::in_memory().await.expect("store");
        let user_id = users::insert(
            store.pool(),
            &users::NewUser {
                username: "alice1",
                email: "alice@example.com",
                password_hash: "hash",
                role: Role::Student,
            },
        )
        .await
        .expect("user");
        let student_id = insert_empty(store.pool(), user_id, "alice@example.com")
            .await
            .expect("student");
        (store, user_id, student_id)
    }

    #[tokio::test]
    async fn new_profile_starts_empty() {
        let (store, user_id, student_id) = seeded().await;
        let profile = find_by_user(store.pool(), user_id)
            .await
            .expect("query")
            .expect("profile");
        assert_eq!(profile.id, student_id);
        assert_eq!(profile.name, "");
        assert_eq!(profile.course, "");
        assert_eq!(profile.cgpa, None);
        assert_eq!(profile.email, "alice@example.com");
        assert!(!profile.is_profile_complete);
        assert!(!profile.has_required_fields());
    }

    #[tokio::test]
    async fn partial_update_touches_only_given_fields() {
        let (store, user_id, student_id) = seeded().await;
        let update = StudentProfileUpdate {
            name: Some("Alice".into()),
            cgpa: Some(8.7),
            bio: Some("hello".into()),
            ..StudentProfileUpdate::default()
        };
        assert!(update_profile(store.pool(), student_id, &update)
            .await
            .expect("update"));

        let clear_bio = StudentProfileUpdate {
            bio: Some(String::new()),
            ..StudentProfileUpdate::default()
        };
        update_profile(store.pool(), student_id, &clear_bio)
            .await
            .expect("update");

        let profile = find_by_user(store.pool(), user_id)
            .await
            .expect("query")
            .expect("profile");
        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.cgpa, Some(8.7));
        assert_eq!(profile.course, "");
        assert_eq!(profile.bio, None);
    }

    #[tokio::test]
    async fn empty_update_writes_nothing() {
        let (store, _, student_id) = seeded().await;
        let written = update_profile(store.pool(), student_id, &StudentProfileUpdate::default())
            .await
            .expect("update");
        assert!(!written);
    }

    #[tokio::test]
    async fn cgpa_outside_range_is_rejected_by_schema() {
        let (store, _, student_id) = seeded().await;
        let update = StudentProfileUpdate {
            cgpa: Some(11.0),
            ..StudentProfileUpdate::default()
        };
        let err = update_profile(store.pool(), student_id, &update)
            .await
            .expect_err("check constraint");
        assert!(matches!(err, StoreError::Database(_)));
    }
}
