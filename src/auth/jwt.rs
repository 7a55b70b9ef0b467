use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::errors::{DomainError, ServiceError, ServiceResult};
use crate::types::UserRole;

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Generate a signed session token
pub fn generate_token(
    secret: &str,
    user_id: &Uuid,
    username: &str,
    role: &UserRole,
    ttl: Duration,
) -> ServiceResult<(String, DateTime<Utc>)> {
    if secret.is_empty() {
        return Err(ServiceError::Configuration("JWT secret not initialized".to_string()));
    }

    let now = Utc::now();
    let expiry = now + ttl;

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role: role.as_str().to_string(),
        iat: now.timestamp(),
        exp: expiry.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ServiceError::Domain(DomainError::Internal(format!("JWT encoding error: {}", e))))?;

    Ok((token, expiry))
}

/// Verify a session token's signature and expiry
pub fn verify_token(secret: &str, token: &str) -> ServiceResult<Claims> {
    if secret.is_empty() {
        return Err(ServiceError::Configuration("JWT secret not initialized".to_string()));
    }

    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
        &jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => ServiceError::SessionExpired,
        _ => ServiceError::Authentication(format!("Invalid token: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn test_token_carries_identity() {
        let user_id = Uuid::new_v4();
        let (token, expiry) =
            generate_token(SECRET, &user_id, "admin@local.ru", &UserRole::Admin, Duration::minutes(5)).unwrap();
        assert!(expiry > Utc::now());

        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "admin@local.ru");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let (token, _) =
            generate_token(SECRET, &Uuid::new_v4(), "u", &UserRole::Reader, Duration::minutes(5)).unwrap();
        assert!(matches!(verify_token("other", &token), Err(ServiceError::Authentication(_))));
    }

    #[test]
    fn test_expired_token_reports_session_expired() {
        // Well past the decoder's default leeway
        let (token, _) =
            generate_token(SECRET, &Uuid::new_v4(), "u", &UserRole::Reader, Duration::minutes(-10)).unwrap();
        assert!(matches!(verify_token(SECRET, &token), Err(ServiceError::SessionExpired)));
    }

    #[test]
    fn test_empty_secret_is_a_configuration_error() {
        let result = generate_token("", &Uuid::new_v4(), "u", &UserRole::Reader, Duration::minutes(5));
        assert!(matches!(result, Err(ServiceError::Configuration(_))));

        // A token signed with an empty key is never accepted
        let forged = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &Claims {
                sub: Uuid::new_v4().to_string(),
                username: "u".to_string(),
                role: "admin".to_string(),
                iat: Utc::now().timestamp(),
                exp: (Utc::now() + Duration::minutes(5)).timestamp(),
                jti: Uuid::new_v4().to_string(),
            },
            &jsonwebtoken::EncodingKey::from_secret(b""),
        )
        .unwrap();
        assert!(matches!(verify_token("", &forged), Err(ServiceError::Configuration(_))));
    }
}
