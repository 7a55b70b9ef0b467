use crate::errors::{DbError, DomainError, ServiceError, ServiceResult};
use crate::auth::{AuthContext, AuthRepository, jwt};
use crate::auth::repository::SqliteAuthRepository;
use crate::types::UserRole;
use uuid::Uuid;
use argon2::{Argon2, PasswordHash, PasswordVerifier, PasswordHasher, password_hash::SaltString};
// Use the older rand version for compatibility with argon2
use rand_core::OsRng as ArgonOsRng;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Result of a successful login
#[derive(Debug)]
pub struct LoginResult {
    pub user_id: Uuid,
    pub role: UserRole,
    pub auth_context: AuthContext,
    pub token: String,
    pub expiry: DateTime<Utc>,
}

/// Auth service for handling user authentication
pub struct AuthService {
    auth_repo: Arc<dyn AuthRepository>,
    jwt_secret: String,
    session_ttl: Duration,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(pool: SqlitePool, jwt_secret: String, session_ttl: Duration) -> Self {
        let auth_repo = Arc::new(SqliteAuthRepository::new(pool));

        Self {
            auth_repo,
            jwt_secret,
            session_ttl,
        }
    }

    /// Lifetime of a session token
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Authenticate a user with username and password and issue a session token.
    /// Unknown users, inactive users and wrong passwords all get the same error.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<LoginResult> {
        let user = match self.auth_repo.find_user_by_username(username).await {
            Ok(user) => user,
            Err(DbError::NotFound(..)) => {
                log::info!("Failed login for unknown user '{}'", username);
                return Err(ServiceError::Authentication(INVALID_CREDENTIALS.to_string()));
            }
            Err(e) => return Err(ServiceError::Domain(DomainError::Database(e))),
        };

        if !user.active {
            log::info!("Failed login for inactive user '{}'", username);
            return Err(ServiceError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        if self.verify_password(password, &user.password_hash).is_err() {
            log::info!("Failed login for user '{}': wrong password", username);
            return Err(ServiceError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        self.auth_repo.update_last_login(user.id).await.map_err(DomainError::Database)?;

        let (token, expiry) = jwt::generate_token(
            &self.jwt_secret,
            &user.id,
            &user.username,
            &user.role,
            self.session_ttl,
        )?;

        log::info!("User '{}' logged in", user.username);

        let auth_context = AuthContext::new(user.id, user.username, user.role);

        Ok(LoginResult {
            user_id: user.id,
            role: user.role,
            auth_context,
            token,
            expiry,
        })
    }

    /// Verify a session token and create an auth context
    pub async fn verify_token(&self, token: &str) -> ServiceResult<AuthContext> {
        let claims = jwt::verify_token(&self.jwt_secret, token)?;

        let is_revoked = self.auth_repo.is_token_revoked(&claims.jti)
            .await
            .map_err(|db_err| ServiceError::Domain(DomainError::Database(db_err)))?;

        if is_revoked {
            log::warn!("Attempted to use revoked token JTI: {}", claims.jti);
            return Err(ServiceError::Authentication("Token has been revoked".to_string()));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ServiceError::Authentication("Invalid user ID in token".to_string()))?;

        let role = UserRole::from_str(&claims.role)
            .ok_or_else(|| ServiceError::Authentication("Invalid role in token".to_string()))?;

        let is_active = self.auth_repo.is_user_active(user_id)
            .await
            .map_err(|db_err| ServiceError::Domain(DomainError::Database(db_err)))?;

        if !is_active {
            log::warn!("Token presented for inactive or missing user {}", user_id);
            return Err(ServiceError::Authentication("User account is inactive".to_string()));
        }

        Ok(AuthContext::new(user_id, claims.username, role))
    }

    /// Log out by adding the token's JTI to the blocklist.
    /// A token that no longer verifies has nothing left to revoke.
    pub async fn logout(&self, token: &str) -> ServiceResult<()> {
        match jwt::verify_token(&self.jwt_secret, token) {
            Ok(claims) => {
                self.auth_repo.add_revoked_token(&claims.jti, claims.exp)
                    .await
                    .map_err(DomainError::Database)?;
                log::info!("User '{}' logged out", claims.username);
            }
            Err(e) => {
                log::debug!("Logout with an unusable token: {}", e);
            }
        }
        Ok(())
    }

    /// Drop blocklist entries whose tokens have expired anyway
    pub async fn purge_expired_tokens(&self) -> ServiceResult<u64> {
        let removed = self.auth_repo.delete_expired_revoked_tokens()
            .await
            .map_err(DomainError::Database)?;
        if removed > 0 {
            log::debug!("Purged {} expired revoked tokens", removed);
        }
        Ok(removed)
    }

    /// Generate a hash for a new password
    pub fn hash_password(&self, password: &str) -> ServiceResult<String> {
        let mut rng = ArgonOsRng;
        let salt = SaltString::generate(&mut rng);

        let password_hash = Argon2::default().hash_password(password.as_bytes(), &salt)
            .map_err(|e| ServiceError::Domain(DomainError::Internal(format!("Failed to hash password: {}", e))))?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<(), ServiceError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| ServiceError::Domain(DomainError::Internal("Invalid password hash format".to_string())))?;

        Argon2::default().verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| ServiceError::Authentication("Invalid password".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{auth_service, migrated_pool, seed_user, ADMIN_PASSWORD, ADMIN_USERNAME};

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let pool = migrated_pool().await;
        let user_id = seed_user(&pool, ADMIN_USERNAME, ADMIN_PASSWORD, UserRole::Admin).await;
        let service = auth_service(pool.clone());

        let result = service.login(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();
        assert_eq!(result.user_id, user_id);
        assert_eq!(result.role, UserRole::Admin);
        assert!(result.expiry > Utc::now());

        let context = service.verify_token(&result.token).await.unwrap();
        assert_eq!(context.user_id, user_id);
        assert_eq!(context.username, ADMIN_USERNAME);

        let last_login: Option<String> = sqlx::query_scalar("SELECT last_login FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(last_login.is_some());
    }

    #[tokio::test]
    async fn test_bad_credentials_share_one_error() {
        let pool = migrated_pool().await;
        seed_user(&pool, ADMIN_USERNAME, ADMIN_PASSWORD, UserRole::Admin).await;
        let inactive = seed_user(&pool, "former", "former", UserRole::Editor).await;
        sqlx::query("UPDATE users SET active = 0 WHERE id = ?")
            .bind(inactive.to_string())
            .execute(&pool)
            .await
            .unwrap();
        let service = auth_service(pool);

        for (username, password) in [(ADMIN_USERNAME, "wrong"), ("ghost", "ghost"), ("former", "former")] {
            match service.login(username, password).await {
                Err(ServiceError::Authentication(message)) => assert_eq!(message, INVALID_CREDENTIALS),
                other => panic!("expected authentication failure, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_logged_out_token_is_rejected() {
        let pool = migrated_pool().await;
        seed_user(&pool, ADMIN_USERNAME, ADMIN_PASSWORD, UserRole::Admin).await;
        let service = auth_service(pool);

        let token = service.login(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap().token;
        service.logout(&token).await.unwrap();
        assert!(matches!(service.verify_token(&token).await, Err(ServiceError::Authentication(_))));

        // Logging out with garbage is harmless
        service.logout("not-a-token").await.unwrap();
    }

    #[tokio::test]
    async fn test_deactivated_user_token_is_rejected() {
        let pool = migrated_pool().await;
        let user_id = seed_user(&pool, ADMIN_USERNAME, ADMIN_PASSWORD, UserRole::Admin).await;
        let service = auth_service(pool.clone());

        let token = service.login(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap().token;
        assert!(service.verify_token(&token).await.is_ok());

        sqlx::query("UPDATE users SET active = 0 WHERE id = ?")
            .bind(user_id.to_string())
            .execute(&pool)
            .await
            .unwrap();
        assert!(matches!(service.verify_token(&token).await, Err(ServiceError::Authentication(_))));

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .execute(&pool)
            .await
            .unwrap();
        assert!(matches!(service.verify_token(&token).await, Err(ServiceError::Authentication(_))));
    }
}
