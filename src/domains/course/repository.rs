use crate::auth::AuthContext;
use crate::domains::core::repository::{where_clause, FindById, Scope, ScopedRepository, SoftDeletable};
use crate::domains::course::types::{Course, CourseRow, NewCourse};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::types::to_db_timestamp;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, query_scalar, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Trait defining course repository operations
#[async_trait]
pub trait CourseRepository:
    FindById<Course> + SoftDeletable + ScopedRepository<Course> + Send + Sync
{
    async fn create(&self, new_course: &NewCourse) -> DomainResult<Course>;

    /// Clear the deleted flag on every course in one statement.
    /// Returns the number of rows the statement matched, which is the whole table.
    async fn activate_all(&self) -> DomainResult<u64>;
}

/// SQLite implementation for CourseRepository
#[derive(Debug, Clone)]
pub struct SqliteCourseRepository {
    pool: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn entity_name(&self) -> &'static str {
        "Course"
    }
}

#[async_trait]
impl FindById<Course> for SqliteCourseRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Course> {
        let row = query_as::<_, CourseRow>("SELECT * FROM courses WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound(self.entity_name().to_string(), id))?;

        row.into_entity()
    }
}

#[async_trait]
impl ScopedRepository<Course> for SqliteCourseRepository {
    async fn count(&self, scope: Scope) -> DomainResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM courses{}", where_clause(&scope.conditions()));
        let count: i64 = query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(count as u64)
    }

    async fn find_all(&self, scope: Scope) -> DomainResult<Vec<Course>> {
        let sql = format!("SELECT * FROM courses{} ORDER BY rowid", where_clause(&scope.conditions()));
        let rows = query_as::<_, CourseRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        rows.into_iter().map(CourseRow::into_entity).collect()
    }
}

#[async_trait]
impl SoftDeletable for SqliteCourseRepository {
    async fn soft_delete_with_tx(
        &self,
        id: Uuid,
        _auth: &AuthContext,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let now = to_db_timestamp(&Utc::now());

        let result = query("UPDATE courses SET deleted = 1, updated_at = ? WHERE id = ? AND deleted = 0")
            .bind(now)
            .bind(id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            let exists: Option<String> = query_scalar("SELECT id FROM courses WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&mut **tx)
                .await
                .map_err(DbError::from)?;

            if exists.is_none() {
                return Err(DomainError::EntityNotFound(self.entity_name().to_string(), id));
            }
        }

        Ok(())
    }

    async fn soft_delete(&self, id: Uuid, auth: &AuthContext) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.soft_delete_with_tx(id, auth, &mut tx).await {
            Ok(()) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(())
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn create(&self, new_course: &NewCourse) -> DomainResult<Course> {
        let id = Uuid::new_v4();
        let now = to_db_timestamp(&Utc::now());

        query(
            "INSERT INTO courses (id, name, description, cost, created_at, updated_at, deleted)
             VALUES (?, ?, ?, ?, ?, ?, 0)"
        )
        .bind(id.to_string())
        .bind(&new_course.name)
        .bind(&new_course.description)
        .bind(new_course.cost)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        self.find_by_id(id).await
    }

    async fn activate_all(&self) -> DomainResult<u64> {
        // Scope::All: deleted rows are the target
        let sql = format!("UPDATE courses SET deleted = 0{}", where_clause(&Scope::All.conditions()));
        let result = query(&sql)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(result.rows_affected())
    }
}
