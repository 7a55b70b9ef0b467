use crate::config::AppConfig;
use crate::errors::{DbError, DbResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Open the connection pool described by the configuration, creating the file if needed
pub async fn connect(config: &AppConfig) -> DbResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(DbError::from)?
        .create_if_missing(true);

    let mut pool_options = SqlitePoolOptions::new().max_connections(config.db_max_connections);

    // Every connection to `:memory:` is its own database, and closing it loses the data
    if config.database_url.contains(":memory:") {
        pool_options = pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    log::debug!("Connecting to {}", config.database_url);

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| {
            log::error!("Database connection failed: {}", e);
            DbError::from(e)
        })?;

    Ok(pool)
}
