use sqlx::SqlitePool;
use tracing::info;

use super::manager::DatabaseError;

fn migrations() -> Vec<(i64, &'static str)> {
    vec![(1, include_str!("migrations/001_initial_schema.sql"))]
}

/// Apply every pending migration, each in its own transaction.
/// Returns the schema version after the run.
pub async fn migrate(pool: &SqlitePool) -> Result<i64, DatabaseError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let mut current: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM migrations")
        .fetch_one(pool)
        .await?;
    info!("Current database version: {}", current);

    for (version, sql) in migrations() {
        if version <= current {
            continue;
        }
        info!("Applying migration version {}", version);

        let mut tx = pool.begin().await?;
        for statement in sql.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| DatabaseError::Migration(format!("version {}: {}", version, e)))?;
        }
        sqlx::query("INSERT INTO migrations (version) VALUES (?)")
            .bind(version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        current = version;
    }

    Ok(current)
}
