use crate::errors::{DbError, DbResult};
use sqlx::SqlitePool;

// Embed all migration SQL files at compile time
const MIGRATION_BASIC: &str = include_str!("../migrations/20240101000000_basic.sql");
const MIGRATION_REVOKED_TOKENS: &str = include_str!("../migrations/20240102000000_revoked_tokens.sql");

// List of migrations with their names and SQL content, oldest first
const MIGRATIONS: &[(&str, &str)] = &[
    ("20240101000000_basic.sql", MIGRATION_BASIC),
    ("20240102000000_revoked_tokens.sql", MIGRATION_REVOKED_TOKENS),
];

/// Bring the schema up to date. Returns how many migrations were applied.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<usize> {
    log::debug!("Starting database migration process");

    create_migrations_table(pool).await?;

    let last_migration = get_last_migration(pool).await?;
    match &last_migration {
        Some(name) => log::debug!("Last applied migration: {}", name),
        None => log::debug!("No migrations applied yet"),
    }

    let applied = apply_pending_migrations(pool, last_migration).await?;
    if applied > 0 {
        log::info!("Applied {} database migration(s)", applied);
    }
    Ok(applied)
}

/// Create migrations table if it doesn't exist
async fn create_migrations_table(pool: &SqlitePool) -> DbResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )"
    )
    .execute(pool)
    .await
    .map_err(|e| DbError::Migration(format!("Failed to create migrations table: {}", e)))?;

    Ok(())
}

/// Get the last applied migration
async fn get_last_migration(pool: &SqlitePool) -> DbResult<Option<String>> {
    sqlx::query_scalar::<_, String>("SELECT name FROM migrations ORDER BY id DESC LIMIT 1")
        .fetch_optional(pool)
        .await
        .map_err(|e| DbError::Migration(format!("Failed to get last migration: {}", e)))
}

/// Apply pending migrations in order
async fn apply_pending_migrations(pool: &SqlitePool, last_migration: Option<String>) -> DbResult<usize> {
    let pending_migrations = get_pending_migrations(last_migration.as_deref());

    if pending_migrations.is_empty() {
        log::debug!("No pending migrations to apply");
        return Ok(0);
    }

    apply_migrations(pool, &pending_migrations).await
}

/// Each migration commits in its own transaction together with its `migrations` row,
/// so a failure keeps everything applied before it.
async fn apply_migrations(pool: &SqlitePool, migrations: &[(&str, &str)]) -> DbResult<usize> {
    for &(migration_name, migration_sql) in migrations {
        log::debug!("Applying migration: {}", migration_name);

        let mut tx = pool.begin().await
            .map_err(|e| DbError::Transaction(format!("Failed to begin transaction: {}", e)))?;

        // Files hold several statements, so they go through the unprepared path
        sqlx::raw_sql(migration_sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                log::error!("Failed to apply migration {}: {}", migration_name, e);
                DbError::Migration(format!("Failed to apply migration {}: {}", migration_name, e))
            })?;

        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query("INSERT INTO migrations (name, applied_at) VALUES (?, ?)")
            .bind(migration_name)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::Migration(format!("Failed to record migration {}: {}", migration_name, e)))?;

        tx.commit().await
            .map_err(|e| DbError::Transaction(format!("Failed to commit migration {}: {}", migration_name, e)))?;
    }

    Ok(migrations.len())
}

/// Determine which migrations need to be applied
fn get_pending_migrations(last_migration: Option<&str>) -> Vec<(&'static str, &'static str)> {
    let mut pending = Vec::new();
    let mut should_include = last_migration.is_none();

    for &(migration_name, migration_sql) in MIGRATIONS {
        if should_include {
            pending.push((migration_name, migration_sql));
        } else if Some(migration_name) == last_migration {
            // Found the last applied migration, include all subsequent ones
            should_include = true;
        }
    }

    pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_pool;

    #[test]
    fn test_pending_after_last_applied() {
        assert_eq!(get_pending_migrations(None).len(), MIGRATIONS.len());
        let pending = get_pending_migrations(Some("20240101000000_basic.sql"));
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].0, "20240102000000_revoked_tokens.sql");
        assert!(get_pending_migrations(Some("20240102000000_revoked_tokens.sql")).is_empty());
    }

    #[tokio::test]
    async fn test_running_twice_is_a_no_op() {
        let pool = memory_pool().await;

        assert_eq!(run_migrations(&pool).await.unwrap(), MIGRATIONS.len());
        assert_eq!(run_migrations(&pool).await.unwrap(), 0);

        let recorded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(recorded as usize, MIGRATIONS.len());

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('news', 'courses', 'users', 'revoked_tokens')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(tables, 4);
    }

    #[tokio::test]
    async fn test_failed_migration_keeps_earlier_ones() {
        let pool = memory_pool().await;
        create_migrations_table(&pool).await.unwrap();

        let migrations = [
            ("0001_first.sql", "CREATE TABLE first_table (id INTEGER PRIMARY KEY);"),
            ("0002_broken.sql", "CREATE TABLE second_table (id INTEGER PRIMARY KEY); NOT VALID SQL;"),
        ];
        let err = apply_migrations(&pool, &migrations).await.unwrap_err();
        assert!(matches!(err, DbError::Migration(_)));

        assert_eq!(get_last_migration(&pool).await.unwrap().as_deref(), Some("0001_first.sql"));
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('first_table', 'second_table')",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables, vec!["first_table".to_string()]);
    }
}
