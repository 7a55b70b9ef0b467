use crate::errors::{DomainError, ServiceError, ServiceResult, ValidationError};
use crate::domains::user::types::{NewUser, UserResponse};
use crate::domains::user::repository::UserRepository;
use crate::auth::{AuthContext, AuthService};
use crate::types::Permission;
use crate::validation::Validate;
use std::sync::Arc;

/// Service for user-related operations
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    auth_service: Arc<AuthService>,
}

impl UserService {
    /// Create a new user service
    pub fn new(user_repo: Arc<dyn UserRepository>, auth_service: Arc<AuthService>) -> Self {
        Self { user_repo, auth_service }
    }

    /// Create a new user
    pub async fn create_user(&self, user: NewUser, auth: &AuthContext) -> ServiceResult<UserResponse> {
        auth.authorize(Permission::ManageUsers)?;

        user.validate().map_err(ServiceError::Domain)?;

        if !self.user_repo.is_username_unique(&user.username).await? {
            return Err(ServiceError::Domain(DomainError::Validation(ValidationError::unique("username"))));
        }

        let password_hash = self.auth_service.hash_password(&user.password)?;
        let mut user_with_hash = user;
        user_with_hash.password = password_hash;

        let new_user = self.user_repo.create(user_with_hash, auth)
            .await
            .map_err(ServiceError::Domain)?;

        log::info!("Created {} account '{}'", new_user.role.as_str(), new_user.username);
        Ok(new_user.into())
    }
}
