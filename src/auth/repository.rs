use crate::errors::{DbError, DbResult, DomainError};
use crate::domains::user::types::{User, UserRow};
use crate::types::to_db_timestamp;
use sqlx::{SqlitePool, query_as};
use uuid::Uuid;
use chrono::Utc;
use async_trait::async_trait;

#[async_trait]
pub(crate) trait AuthRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> DbResult<User>;
    async fn update_last_login(&self, user_id: Uuid) -> DbResult<()>;
    /// False for a deactivated or deleted user
    async fn is_user_active(&self, user_id: Uuid) -> DbResult<bool>;
    async fn add_revoked_token(&self, jti: &str, expiry: i64) -> DbResult<()>;
    async fn is_token_revoked(&self, jti: &str) -> DbResult<bool>;
    async fn delete_expired_revoked_tokens(&self) -> DbResult<u64>;
}

pub(crate) struct SqliteAuthRepository {
    pool: SqlitePool,
}

impl SqliteAuthRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthRepository for SqliteAuthRepository {
    async fn find_user_by_username(&self, username: &str) -> DbResult<User> {
        let row = query_as::<_, UserRow>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DbError::NotFound("User".to_string(), username.to_string()))?;

        row.into_entity().map_err(|e| match e {
            DomainError::Database(db_err) => db_err,
            _ => DbError::Other(e.to_string()),
        })
    }

    async fn update_last_login(&self, user_id: Uuid) -> DbResult<()> {
        let now = to_db_timestamp(&Utc::now());

        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(now)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn is_user_active(&self, user_id: Uuid) -> DbResult<bool> {
        let active: Option<bool> = sqlx::query_scalar("SELECT active FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(active.unwrap_or(false))
    }

    async fn add_revoked_token(&self, jti: &str, expiry: i64) -> DbResult<()> {
        // Revoking twice is fine
        sqlx::query("INSERT OR IGNORE INTO revoked_tokens (jti, expiry) VALUES (?, ?)")
            .bind(jti)
            .bind(expiry)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(())
    }

    async fn is_token_revoked(&self, jti: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM revoked_tokens WHERE jti = ?")
            .bind(jti)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(count > 0)
    }

    async fn delete_expired_revoked_tokens(&self) -> DbResult<u64> {
        let now = Utc::now().timestamp();
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expiry < ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::migrated_pool;

    #[tokio::test]
    async fn test_revocation_list() {
        let repo = SqliteAuthRepository::new(migrated_pool().await);
        let future = Utc::now().timestamp() + 600;

        assert!(!repo.is_token_revoked("abc").await.unwrap());
        repo.add_revoked_token("abc", future).await.unwrap();
        repo.add_revoked_token("abc", future).await.unwrap();
        assert!(repo.is_token_revoked("abc").await.unwrap());

        repo.add_revoked_token("old", 1).await.unwrap();
        assert_eq!(repo.delete_expired_revoked_tokens().await.unwrap(), 1);
        assert!(repo.is_token_revoked("abc").await.unwrap());
        assert!(!repo.is_token_revoked("old").await.unwrap());
    }
}
