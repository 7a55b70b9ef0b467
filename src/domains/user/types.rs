use crate::errors::{DomainError, DomainResult};
use crate::validation::{NestedValidator, Validate, ValidationBuilder};
use crate::types::{parse_db_timestamp, UserRole};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use sqlx::FromRow;

/// Core User entity - an account that can sign in to the site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    pub active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by_user_id: Option<Uuid>,
}

impl User {
    // Helper to check if user is admin
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// NewUser DTO - used when creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String, // Plain text password (will be hashed)
    pub role: String,
    pub active: bool,
}

impl Validate for NewUser {
    fn validate(&self) -> DomainResult<()> {
        let mut validator = NestedValidator::new();

        validator.add_errors(
            ValidationBuilder::new("username", Some(self.username.clone()))
                .not_blank()
                .max_length(150)
                .username()
                .into_errors(),
        );

        validator.add_errors(
            ValidationBuilder::new("password", Some(self.password.clone()))
                .not_blank()
                .min_length(4)
                .into_errors(),
        );

        validator.add_errors(
            ValidationBuilder::new("role", Some(self.role.clone()))
                .not_blank()
                .one_of(&UserRole::ALL, Some("Invalid role"))
                .into_errors(),
        );

        validator.validate()
    }
}

/// UserResponse DTO - what leaves the service, never carries the hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
    pub active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            active: user.active,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

/// UserRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub active: i64,
    pub last_login: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub created_by_user_id: Option<String>,
}

impl UserRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<User> {
        let parse_uuid = |s: &str| Uuid::parse_str(s).map_err(|_| DomainError::InvalidUuid(s.to_string()));

        Ok(User {
            id: parse_uuid(&self.id)?,
            username: self.username,
            password_hash: self.password_hash,
            role: UserRole::from_str(&self.role)
                .ok_or_else(|| DomainError::Internal(format!("Invalid role in database: {}", self.role)))?,
            active: self.active != 0,
            last_login: self.last_login.as_deref().map(parse_db_timestamp).transpose()?,
            created_at: parse_db_timestamp(&self.created_at)?,
            updated_at: parse_db_timestamp(&self.updated_at)?,
            created_by_user_id: self.created_by_user_id.as_deref().map(parse_uuid).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, password: &str, role: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: password.to_string(),
            role: role.to_string(),
            active: true,
        }
    }

    #[test]
    fn test_new_user_validation() {
        assert!(new_user("admin@local.ru", "admin", "admin").validate().is_ok());

        match new_user("has space", "ab", "root").validate() {
            Err(DomainError::ValidationFailed(errors)) => {
                assert_eq!(errors.for_field("username").count(), 1);
                assert_eq!(errors.for_field("password").count(), 1);
                assert_eq!(errors.for_field("role").count(), 1);
            }
            other => panic!("expected collected errors, got {:?}", other),
        }
    }

    #[test]
    fn test_row_conversion_rejects_unknown_role() {
        let row = UserRow {
            id: Uuid::new_v4().to_string(),
            username: "x".to_string(),
            password_hash: "h".to_string(),
            role: "superuser".to_string(),
            active: 1,
            last_login: None,
            created_at: "2024-01-01T00:00:00.000000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000000Z".to_string(),
            created_by_user_id: None,
        };
        assert!(row.into_entity().is_err());
    }
}
