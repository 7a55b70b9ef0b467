//! News portal: soft-deletable news listing, session login and a course catalogue,
//! served over HTTP and administered from the command line.

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod database;
pub mod db_migration;
pub mod domains;
pub mod errors;
pub mod locale;
pub mod types;
pub mod validation;
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::domains::course::{CourseService, CourseServiceImpl, SqliteCourseRepository};
use crate::domains::news::{NewsService, NewsServiceImpl, SqliteNewsRepository};
use crate::domains::user::{SqliteUserRepository, UserService};
use crate::errors::{ServiceError, ServiceResult};
use chrono::Duration;
use sqlx::SqlitePool;

/// Every service, wired to one connection pool
#[derive(Clone)]
pub struct AppServices {
    pub pool: SqlitePool,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub news_service: Arc<dyn NewsService>,
    pub course_service: Arc<dyn CourseService>,
}

impl AppServices {
    pub fn build(pool: SqlitePool, jwt_secret: String, session_ttl: Duration) -> Self {
        let auth_service = Arc::new(AuthService::new(pool.clone(), jwt_secret, session_ttl));

        let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
        let user_service = Arc::new(UserService::new(user_repo, auth_service.clone()));

        let news_repo = Arc::new(SqliteNewsRepository::new(pool.clone()));
        let news_service: Arc<dyn NewsService> = Arc::new(NewsServiceImpl::new(news_repo));

        let course_repo = Arc::new(SqliteCourseRepository::new(pool.clone()));
        let course_service: Arc<dyn CourseService> = Arc::new(CourseServiceImpl::new(course_repo));

        Self {
            pool,
            auth_service,
            user_service,
            news_service,
            course_service,
        }
    }
}

/// Connect, bring the schema up to date and wire the services
pub async fn initialize(config: &AppConfig) -> ServiceResult<AppServices> {
    log::info!("Starting initialization");

    let pool = database::connect(config).await.map_err(ServiceError::from)?;

    let applied = db_migration::run_migrations(&pool).await.map_err(ServiceError::from)?;
    if applied > 0 {
        log::info!("Applied {} migration(s)", applied);
    }

    // Without a secret, token issue and verification fail with a configuration error
    let jwt_secret = config.jwt_secret.clone().unwrap_or_default();
    Ok(AppServices::build(pool, jwt_secret, config.session_ttl))
}
