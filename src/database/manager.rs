use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Scoped lookup found nothing (missing or owned by someone else)
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input rejected by a storage-level rule checked in code
    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    return DatabaseError::Conflict("Resource already exists".to_string())
                }
                ErrorKind::ForeignKeyViolation
                | ErrorKind::CheckViolation
                | ErrorKind::NotNullViolation => {
                    return DatabaseError::ConstraintViolation(db_err.message().to_string())
                }
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

fn connect_options(url: &str) -> Result<SqliteConnectOptions, DatabaseError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);
    Ok(options)
}

/// Open the application pool. The database file and its directory are
/// created on first use.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let options = connect_options(&config.url)?;

    let filename = options.clone().get_filename();
    if let Some(parent) = filename.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Migration(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect_with(options)
        .await?;

    info!("Opened database pool for: {}", config.url);
    Ok(pool)
}

/// Open the pool and bring the schema up to date.
pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let pool = connect(config).await?;
    super::schema::migrate(&pool).await?;
    Ok(pool)
}

/// Open a transaction that holds the write lock from its first statement.
///
/// A deferred transaction that reads before it writes cannot wait for a busy
/// writer and fails with `SQLITE_BUSY` instead. Taking the lock up front lets
/// the busy timeout apply, so concurrent writers queue.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, DatabaseError> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE users SET id = id WHERE 0")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &SqlitePool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
