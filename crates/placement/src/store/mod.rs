//! Persistence accessors over a pooled SQLite store.
//!
//! Every accessor is a free function generic over [`SqliteExecutor`], so the same query runs
//! against the pool or inside a transaction obtained from [`Store::begin`].

pub mod applications;
pub mod companies;
pub mod jobs;
pub mod stats;
pub mod students;
pub mod users;

use std::marker::PhantomData;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Encode, QueryBuilder, Sqlite, SqliteExecutor, SqlitePool, Transaction, Type};

use crate::config::DatabaseConfig;

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        match &value {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict,
            _ => Self::Database(value),
        }
    }
}

/// How long a connection waits for another writer's lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared handle to the relational store.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!(
            max_connections = config.max_connections,
            "relational store connected"
        );
        Ok(Self { pool })
    }

    /// Migrated single-connection in-memory store for tests and demos.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        // Each connection to `:memory:` is its own database; pin exactly one for the pool's lifetime.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Opens a write transaction.
    ///
    /// `BEGIN IMMEDIATE` takes the write lock up front, so concurrent read-then-write
    /// transactions queue on the busy timeout instead of failing with `SQLITE_BUSY` when a
    /// deferred read lock cannot be upgraded.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, StoreError> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }
}

/// A column that may appear in a partial update.
pub(crate) trait Column: Copy {
    fn as_sql(self) -> &'static str;
}

/// `UPDATE <table> SET ...` that only emits assignments for the columns it was given.
///
/// Column names come from a closed `Column` enum; values are always bound parameters.
pub(crate) struct PartialUpdate<'args, C> {
    builder: QueryBuilder<'args, Sqlite>,
    assigned: usize,
    _columns: PhantomData<C>,
}

impl<'args, C: Column> PartialUpdate<'args, C> {
    pub(crate) fn new(table: &'static str) -> Self {
        let mut builder = QueryBuilder::new("UPDATE ");
        builder.push(table).push(" SET ");
        Self {
            builder,
            assigned: 0,
            _columns: PhantomData,
        }
    }

    pub(crate) fn set<T>(&mut self, column: C, value: T) -> &mut Self
    where
        T: 'args + Encode<'args, Sqlite> + Type<Sqlite> + Send,
    {
        if self.assigned > 0 {
            self.builder.push(", ");
        }
        self.builder.push(column.as_sql()).push(" = ").push_bind(value);
        self.assigned += 1;
        self
    }

    pub(crate) fn set_if<T>(&mut self, column: C, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Sqlite> + Type<Sqlite> + Send,
    {
        if let Some(value) = value {
            self.set(column, value);
        }
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.assigned == 0
    }

    /// Runs the update against the row with the given primary key. Returns rows affected.
    pub(crate) async fn execute_for<'e, E>(mut self, executor: E, id: i64) -> Result<u64, StoreError>
    where
        E: SqliteExecutor<'e>,
    {
        if self.is_empty() {
            return Ok(0);
        }
        self.builder.push(" WHERE id = ").push_bind(id);
        let result = self.builder.build().execute(executor).await?;
        Ok(result.rows_affected())
    }

    #[cfg(test)]
    pub(crate) fn sql(&self) -> &str {
        self.builder.sql()
    }
}

/// Empty optional text is stored as NULL.
pub(crate) fn nullable_text(value: &Option<String>) -> Option<Option<String>> {
    value
        .as_ref()
        .map(|text| Some(text.clone()).filter(|text| !text.is_empty()))
}
