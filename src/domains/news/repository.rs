use crate::auth::AuthContext;
use crate::domains::core::repository::{where_clause, FindById, Scope, ScopedRepository, SoftDeletable};
use crate::domains::news::types::{NewNews, News, NewsFilter, NewsRow, UpdateNews};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::types::{to_db_timestamp, PageRequest, PaginatedResult};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query, query_as, query_scalar, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Trait defining news repository operations
#[async_trait]
pub trait NewsRepository:
    FindById<News> + SoftDeletable + ScopedRepository<News> + Send + Sync
{
    /// One page of the listing, filtered by scope and created range, in insertion order
    async fn find_page(
        &self,
        scope: Scope,
        filter: &NewsFilter,
        page: PageRequest,
        per_page: u32,
    ) -> DomainResult<PaginatedResult<News>>;

    async fn create(&self, new_news: &NewNews, auth: &AuthContext) -> DomainResult<News>;

    /// Replace the text fields. Works on deleted items too; leaves `created_at` and `deleted` alone.
    async fn update(&self, id: Uuid, update: &UpdateNews, auth: &AuthContext) -> DomainResult<News>;

    /// Clear the deleted flag
    async fn restore(&self, id: Uuid, auth: &AuthContext) -> DomainResult<News>;
}

/// SQLite implementation for NewsRepository
#[derive(Debug, Clone)]
pub struct SqliteNewsRepository {
    pool: SqlitePool,
}

impl SqliteNewsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn entity_name(&self) -> &'static str {
        "News"
    }

    async fn find_by_id_with_tx<'t>(
        &self,
        id: Uuid,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<News> {
        let row = query_as::<_, NewsRow>("SELECT * FROM news WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&mut **tx)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound(self.entity_name().to_string(), id))?;

        row.into_entity()
    }

    async fn create_with_tx<'t>(
        &self,
        new_news: &NewNews,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<News> {
        let id = Uuid::new_v4();
        let now = to_db_timestamp(&Utc::now());
        let actor = auth.actor_id().map(|u| u.to_string());

        query(
            "INSERT INTO news (id, title, preambule, body, created_at, updated_at, deleted, created_by_user_id, updated_by_user_id)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)"
        )
        .bind(id.to_string())
        .bind(&new_news.title)
        .bind(&new_news.preambule)
        .bind(&new_news.body)
        .bind(&now)
        .bind(&now)
        .bind(&actor)
        .bind(&actor)
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        self.find_by_id_with_tx(id, tx).await
    }

    async fn update_with_tx<'t>(
        &self,
        id: Uuid,
        update: &UpdateNews,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<News> {
        let now = to_db_timestamp(&Utc::now());

        let result = query(
            "UPDATE news SET title = ?, preambule = ?, body = ?, updated_at = ?, updated_by_user_id = ? WHERE id = ?"
        )
        .bind(&update.title)
        .bind(&update.preambule)
        .bind(&update.body)
        .bind(&now)
        .bind(auth.actor_id().map(|u| u.to_string()))
        .bind(id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::EntityNotFound(self.entity_name().to_string(), id));
        }

        self.find_by_id_with_tx(id, tx).await
    }

    async fn restore_with_tx<'t>(
        &self,
        id: Uuid,
        auth: &AuthContext,
        tx: &mut Transaction<'t, Sqlite>,
    ) -> DomainResult<News> {
        let now = to_db_timestamp(&Utc::now());

        let result = query(
            "UPDATE news SET deleted = 0, updated_at = ?, updated_by_user_id = ? WHERE id = ? AND deleted = 1"
        )
        .bind(&now)
        .bind(auth.actor_id().map(|u| u.to_string()))
        .bind(id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            log::debug!("News {} was not deleted, nothing to restore", id);
        }

        // Fails with EntityNotFound when the id is unknown
        self.find_by_id_with_tx(id, tx).await
    }
}

/// Conditions and bind values for a scoped, range-filtered listing query
fn listing_conditions(scope: Scope, filter: &NewsFilter) -> (Vec<&'static str>, Vec<String>) {
    let mut conditions = scope.conditions();
    let mut binds = Vec::new();

    if let Some(from) = &filter.date_from {
        conditions.push("created_at >= ?");
        binds.push(to_db_timestamp(from));
    }
    if let Some(to) = &filter.date_to {
        conditions.push("created_at <= ?");
        binds.push(to_db_timestamp(to));
    }

    (conditions, binds)
}

#[async_trait]
impl FindById<News> for SqliteNewsRepository {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<News> {
        let row = query_as::<_, NewsRow>("SELECT * FROM news WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DomainError::EntityNotFound(self.entity_name().to_string(), id))?;

        row.into_entity()
    }
}

#[async_trait]
impl ScopedRepository<News> for SqliteNewsRepository {
    async fn count(&self, scope: Scope) -> DomainResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM news{}", where_clause(&scope.conditions()));
        let count: i64 = query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(count as u64)
    }

    async fn find_all(&self, scope: Scope) -> DomainResult<Vec<News>> {
        let sql = format!("SELECT * FROM news{} ORDER BY rowid", where_clause(&scope.conditions()));
        let rows = query_as::<_, NewsRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        rows.into_iter().map(NewsRow::into_entity).collect()
    }
}

#[async_trait]
impl SoftDeletable for SqliteNewsRepository {
    async fn soft_delete_with_tx(
        &self,
        id: Uuid,
        auth: &AuthContext,
        tx: &mut Transaction<'_, Sqlite>,
    ) -> DomainResult<()> {
        let now = to_db_timestamp(&Utc::now());

        let result = query(
            "UPDATE news SET deleted = 1, updated_at = ?, updated_by_user_id = ? WHERE id = ? AND deleted = 0"
        )
        .bind(now)
        .bind(auth.actor_id().map(|u| u.to_string()))
        .bind(id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            // Either already deleted (fine) or not there at all
            let exists: Option<String> = query_scalar("SELECT id FROM news WHERE id = ?")
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
impl NewsRepository for SqliteNewsRepository {
    async fn find_page(
        &self,
        scope: Scope,
        filter: &NewsFilter,
        page: PageRequest,
        per_page: u32,
    ) -> DomainResult<PaginatedResult<News>> {
        let (conditions, binds) = listing_conditions(scope, filter);
        let clause = where_clause(&conditions);

        let count_sql = format!("SELECT COUNT(*) FROM news{}", clause);
        let mut count_query = query_scalar::<_, i64>(&count_sql);
        for value in &binds {
            count_query = count_query.bind(value.as_str());
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)? as u64;

        let params = page.resolve(total, per_page);

        let page_sql = format!("SELECT * FROM news{} ORDER BY rowid LIMIT ? OFFSET ?", clause);
        let mut page_query = query_as::<_, NewsRow>(&page_sql);
        for value in &binds {
            page_query = page_query.bind(value.as_str());
        }
        let rows = page_query
            .bind(params.per_page as i64)
            .bind(i64::try_from(params.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(NewsRow::into_entity)
            .collect::<DomainResult<Vec<News>>>()?;

        Ok(PaginatedResult::new(items, total, params))
    }

    async fn create(&self, new_news: &NewNews, auth: &AuthContext) -> DomainResult<News> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.create_with_tx(new_news, auth, &mut tx).await {
            Ok(news) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(news)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn update(&self, id: Uuid, update: &UpdateNews, auth: &AuthContext) -> DomainResult<News> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.update_with_tx(id, update, auth, &mut tx).await {
            Ok(news) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(news)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }

    async fn restore(&self, id: Uuid, auth: &AuthContext) -> DomainResult<News> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        match self.restore_with_tx(id, auth, &mut tx).await {
            Ok(news) => {
                tx.commit().await.map_err(DbError::from)?;
                Ok(news)
            }
            Err(e) => {
                let _ = tx.rollback().await;
                Err(e)
            }
        }
    }
}
