use crate::auth::AuthContext;
use crate::domains::core::repository::Scope;
use crate::domains::news::repository::NewsRepository;
use crate::domains::news::types::{NewNews, NewsFilter, NewsResponse, UpdateNews, NEWS_PAGE_SIZE};
use crate::domains::permission::Permission;
use crate::errors::{ServiceError, ServiceResult};
use crate::types::{PageRequest, PaginatedResult};
use crate::validation::Validate;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Trait defining news service operations
#[async_trait]
pub trait NewsService: Send + Sync {
    /// Public listing: visible items only, inclusive created range, pages of `NEWS_PAGE_SIZE`
    async fn list_news(
        &self,
        filter: &NewsFilter,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResult<NewsResponse>>;

    /// Detail read by ID. Soft-deleted items are still returned.
    async fn get_news(&self, id: Uuid) -> ServiceResult<NewsResponse>;

    async fn create_news(&self, new_news: NewNews, auth: &AuthContext) -> ServiceResult<NewsResponse>;

    async fn update_news(
        &self,
        id: Uuid,
        update: UpdateNews,
        auth: &AuthContext,
    ) -> ServiceResult<NewsResponse>;

    /// Soft delete. Repeating it is a no-op.
    async fn delete_news(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<()>;

    /// Administrative undelete
    async fn restore_news(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<NewsResponse>;
}

/// Implementation of the news service
#[derive(Clone)]
pub struct NewsServiceImpl {
    repo: Arc<dyn NewsRepository>,
}

impl NewsServiceImpl {
    pub fn new(repo: Arc<dyn NewsRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl NewsService for NewsServiceImpl {
    async fn list_news(
        &self,
        filter: &NewsFilter,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResult<NewsResponse>> {
        let result = self
            .repo
            .find_page(Scope::Visible, filter, page, NEWS_PAGE_SIZE)
            .await
            .map_err(ServiceError::Domain)?;

        Ok(result.map(NewsResponse::from))
    }

    async fn get_news(&self, id: Uuid) -> ServiceResult<NewsResponse> {
        let news = self.repo.find_by_id(id).await.map_err(ServiceError::Domain)?;
        Ok(news.into())
    }

    async fn create_news(&self, new_news: NewNews, auth: &AuthContext) -> ServiceResult<NewsResponse> {
        auth.authorize(Permission::CreateNews)?;
        new_news.validate()?;

        let created = self.repo.create(&new_news, auth).await.map_err(ServiceError::Domain)?;
        log::info!("News {} created by '{}'", created.id, auth.username);
        Ok(created.into())
    }

    async fn update_news(
        &self,
        id: Uuid,
        update: UpdateNews,
        auth: &AuthContext,
    ) -> ServiceResult<NewsResponse> {
        auth.authorize(Permission::EditNews)?;
        update.validate()?;

        let updated = self.repo.update(id, &update, auth).await.map_err(ServiceError::Domain)?;
        log::info!("News {} updated by '{}'", id, auth.username);
        Ok(updated.into())
    }

    async fn delete_news(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<()> {
        auth.authorize(Permission::DeleteNews)?;

        self.repo.soft_delete(id, auth).await.map_err(ServiceError::Domain)?;
        log::info!("News {} soft-deleted by '{}'", id, auth.username);
        Ok(())
    }

    async fn restore_news(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<NewsResponse> {
        auth.authorize(Permission::RestoreNews)?;

        let restored = self.repo.restore(id, auth).await.map_err(ServiceError::Domain)?;
        log::info!("News {} restored by '{}'", id, auth.username);
        Ok(restored.into())
    }
}
