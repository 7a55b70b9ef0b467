use crate::auth::AuthContext;
use crate::domains::course::repository::CourseRepository;
use crate::domains::course::types::{CourseResponse, NewCourse};
use crate::domains::permission::Permission;
use crate::errors::{ServiceError, ServiceResult};
use crate::validation::Validate;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Trait defining course service operations
#[async_trait]
pub trait CourseService: Send + Sync {
    /// Visible courses, in insertion order
    async fn list_courses(&self) -> ServiceResult<Vec<CourseResponse>>;

    async fn create_course(&self, new_course: NewCourse, auth: &AuthContext) -> ServiceResult<CourseResponse>;

    async fn delete_course(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<()>;

    /// Mark every course as not deleted. Admin only.
    async fn activate_all(&self, auth: &AuthContext) -> ServiceResult<u64>;
}

/// Implementation of the course service
#[derive(Clone)]
pub struct CourseServiceImpl {
    repo: Arc<dyn CourseRepository>,
}

impl CourseServiceImpl {
    pub fn new(repo: Arc<dyn CourseRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl CourseService for CourseServiceImpl {
    async fn list_courses(&self) -> ServiceResult<Vec<CourseResponse>> {
        let courses = self.repo.visible().await.map_err(ServiceError::Domain)?;
        Ok(courses.into_iter().map(CourseResponse::from).collect())
    }

    async fn create_course(&self, new_course: NewCourse, auth: &AuthContext) -> ServiceResult<CourseResponse> {
        auth.authorize(Permission::ManageCourses)?;
        new_course.validate()?;

        let course = self.repo.create(&new_course).await.map_err(ServiceError::Domain)?;
        Ok(course.into())
    }

    async fn delete_course(&self, id: Uuid, auth: &AuthContext) -> ServiceResult<()> {
        auth.authorize(Permission::ManageCourses)?;
        self.repo.soft_delete(id, auth).await.map_err(ServiceError::Domain)?;
        Ok(())
    }

    async fn activate_all(&self, auth: &AuthContext) -> ServiceResult<u64> {
        auth.authorize_admin()?;

        let affected = self.repo.activate_all().await.map_err(ServiceError::Domain)?;
        log::info!("Activated courses: {} row(s) matched", affected);
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::core::repository::{FindById, Scope, ScopedRepository};
    use crate::domains::course::repository::SqliteCourseRepository;
    use crate::test_support::migrated_pool;
    use crate::types::UserRole;

    fn course(name: &str) -> NewCourse {
        NewCourse {
            name: name.to_string(),
            description: format!("About {}", name),
            cost: 100.0,
        }
    }

    async fn setup() -> (Arc<SqliteCourseRepository>, CourseServiceImpl) {
        let repo = Arc::new(SqliteCourseRepository::new(migrated_pool().await));
        (repo.clone(), CourseServiceImpl::new(repo))
    }

    #[tokio::test]
    async fn test_activation_restores_every_course() {
        let (repo, service) = setup().await;
        let admin = AuthContext::internal_system_context();

        let mut ids = Vec::new();
        for name in ["rust", "sql", "http"] {
            ids.push(service.create_course(course(name), &admin).await.unwrap().id);
        }
        service.delete_course(ids[0], &admin).await.unwrap();
        service.delete_course(ids[2], &admin).await.unwrap();
        assert_eq!(service.list_courses().await.unwrap().len(), 1);

        let before = repo.find_by_id_unchecked(ids[0]).await;
        let affected = service.activate_all(&admin).await.unwrap();

        // The bulk update matches the whole table, not just the deleted rows
        assert_eq!(affected, 3);
        assert_eq!(repo.count(Scope::Visible).await.unwrap(), 3);
        assert_eq!(service.list_courses().await.unwrap().len(), 3);

        // Activation leaves updated_at alone
        assert_eq!(repo.find_by_id_unchecked(ids[0]).await.updated_at, before.updated_at);

        // Second run changes no state
        assert_eq!(service.activate_all(&admin).await.unwrap(), 3);
        assert_eq!(repo.count(Scope::Visible).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_activation_on_empty_table() {
        let (_repo, service) = setup().await;
        let affected = service.activate_all(&AuthContext::internal_system_context()).await.unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_activation_requires_admin() {
        let (_repo, service) = setup().await;
        let editor = AuthContext::new(Uuid::new_v4(), "editor".to_string(), UserRole::Editor);
        assert!(matches!(service.activate_all(&editor).await, Err(ServiceError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_course_validation() {
        let (_repo, service) = setup().await;
        let admin = AuthContext::internal_system_context();
        let bad = NewCourse { name: String::new(), description: String::new(), cost: -5.0 };
        assert!(matches!(service.create_course(bad, &admin).await, Err(ServiceError::Domain(_))));
    }

    impl SqliteCourseRepository {
        async fn find_by_id_unchecked(&self, id: Uuid) -> crate::domains::course::types::Course {
            self.find_by_id(id).await.unwrap()
        }
    }
}
