//! Shared fixtures for unit tests

use crate::auth::AuthService;
use crate::db_migration::run_migrations;
use crate::types::{to_db_timestamp, UserRole};
use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

pub(crate) const TEST_SECRET: &str = "test-secret";
pub(crate) const ADMIN_USERNAME: &str = "admin@local.ru";
pub(crate) const ADMIN_PASSWORD: &str = "admin";

/// Fresh, empty in-memory database on a single long-lived connection
pub(crate) async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database")
}

/// In-memory database with the schema applied
pub(crate) async fn migrated_pool() -> SqlitePool {
    let pool = memory_pool().await;
    run_migrations(&pool).await.expect("migrations");
    pool
}

pub(crate) fn auth_service(pool: SqlitePool) -> AuthService {
    AuthService::new(pool, TEST_SECRET.to_string(), Duration::minutes(30))
}

/// Insert an active user with an argon2-hashed password
pub(crate) async fn seed_user(pool: &SqlitePool, username: &str, password: &str, role: UserRole) -> Uuid {
    let hash = auth_service(pool.clone()).hash_password(password).expect("hash");
    let id = Uuid::new_v4();
    let now = to_db_timestamp(&Utc::now());

    sqlx::query(
        "INSERT INTO users (id, username, password_hash, role, active, created_at, updated_at)
         VALUES (?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id.to_string())
    .bind(username)
    .bind(hash)
    .bind(role.as_str())
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("seed user");

    id
}
