use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};

use super::StoreError;
use crate::domain::{Role, UserId};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, is_active, email_verified, last_login, created_at";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub email_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

pub async fn insert<'e, E>(executor: E, user: &NewUser<'_>) -> Result<UserId, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, role, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(user.username)
    .bind(user.email)
    .bind(user.password_hash)
    .bind(user.role)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(UserId(id))
}

pub async fn find_by_id<'e, E>(executor: E, id: UserId) -> Result<Option<UserRecord>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    Ok(sqlx::query_as::<_, UserRecord>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?)
}

/// Looks a user up by username, or by email when the identifier matches one.
pub async fn find_by_login<'e, E>(
    executor: E,
    identifier: &str,
) -> Result<Option<UserRecord>, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ? OR email = ? \
         ORDER BY username = ? DESC LIMIT 1"
    );
    Ok(sqlx::query_as::<_, UserRecord>(&sql)
        .bind(identifier)
        .bind(identifier.to_lowercase())
        .bind(identifier)
        .fetch_optional(executor)
        .await?)
}

pub async fn username_taken<'e, E>(executor: E, username: &str) -> Result<bool, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let taken: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = ?)")
        .bind(username)
        .fetch_one(executor)
        .await?;
    Ok(taken)
}

pub async fn email_taken<'e, E>(executor: E, email: &str) -> Result<bool, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let taken: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = ?)")
        .bind(email)
        .fetch_one(executor)
        .await?;
    Ok(taken)
}

pub async fn touch_last_login<'e, E>(
    executor: E,
    id: UserId,
    at: DateTime<Utc>,
) -> Result<(), StoreError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Returns `false` when no such user exists.
pub async fn set_active<'e, E>(executor: E, id: UserId, active: bool) -> Result<bool, StoreError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
        .bind(active)
        .bind(Utc::now())
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() == 1)
}
