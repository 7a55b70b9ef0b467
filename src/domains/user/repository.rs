use crate::errors::{DbError, DomainError, DomainResult};
use crate::domains::user::types::{User, NewUser, UserRow};
use crate::domains::core::repository::FindById;
use crate::auth::AuthContext;
use crate::types::to_db_timestamp;
use uuid::Uuid;
use chrono::Utc;
use sqlx::{SqlitePool, query, query_as, query_scalar, Transaction, Sqlite};
use async_trait::async_trait;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync + FindById<User> {
    /// Create a new user. `user.password` must already hold the password hash.
    async fn create(&self, user: NewUser, auth: &AuthContext) -> DomainResult<User>;

    /// Check if a username is still free
    async fn is_username_unique(&self, username: &str) -> DomainResult<bool>;
}

/// SQLite implementation of UserRepository
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Helper to find user by ID within a transaction (needed after inserts)
    async fn find_by_id_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<User> {
        let row = query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| DomainError::Database(DbError::from(e)))?
            .ok_or_else(|| DomainError::EntityNotFound("User".to_string(), id))?;

        row.into_entity()
    }

    async fn create_with_tx<'t>(
        &self,
        user: &NewUser,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<User> {
        let id = Uuid::new_v4();
        let now = to_db_timestamp(&Utc::now());

        query(
            "INSERT INTO users (id, username, password_hash, role, active, created_at, updated_at, created_by_user_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(id.to_string())
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.role)
        .bind(user.active as i64)
        .bind(&now)
        .bind(&now)
        .bind(auth.actor_id().map(|u| u.to_string()))
        .execute(&mut **tx)
        .await
        .map_err(|e| DomainError::Database(DbError::from(e)))?;

        self.find_by_id_with_tx(id, tx).await
    }
}

#[async_trait]
impl FindById<User> for SqliteUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<User> {
        let row = query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Database(DbError::from(e)))?
            .ok_or_else(|| DomainError::EntityNotFound("User".to_string(), id))?;

        row.into_entity()
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser, auth: &AuthContext) -> DomainResult<User> {
        let mut tx = self.pool.begin().await.map_err(|e| DomainError::Database(DbError::from(e)))?;
        match self.create_with_tx(&user, auth, &mut tx).await {
            Ok(created) => {
                tx.commit().await.map_err(|e| DomainError::Database(DbError::from(e)))?;
                Ok(created)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn is_username_unique(&self, username: &str) -> DomainResult<bool> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Database(DbError::from(e)))?;

        Ok(count == 0)
    }
}
