use crate::errors::{ServiceError, ServiceResult};
use crate::locale::Locale;
use chrono::Duration;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://news_portal.sqlite";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
/// Two weeks
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 20_160;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Runtime configuration, read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Only the web server signs sessions, so one-shot commands run without it
    pub jwt_secret: Option<String>,
    pub session_ttl: Duration,
    pub db_max_connections: u32,
    pub default_locale: Locale,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> ServiceResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup
    pub fn from_lookup<F>(lookup: F) -> ServiceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = get("JWT_SECRET");

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ServiceError::Configuration(format!("Invalid BIND_ADDR '{}': {}", bind_raw, e)))?;

        let session_ttl_minutes = match get("SESSION_TTL_MINUTES") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .ok_or_else(|| ServiceError::Configuration(format!("Invalid SESSION_TTL_MINUTES '{}'", raw)))?,
            None => DEFAULT_SESSION_TTL_MINUTES,
        };

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ServiceError::Configuration(format!("Invalid DB_MAX_CONNECTIONS '{}'", raw)))?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        let default_locale = match get("DEFAULT_LOCALE") {
            Some(raw) => Locale::from_tag(&raw)
                .ok_or_else(|| ServiceError::Configuration(format!("Unsupported DEFAULT_LOCALE '{}'", raw)))?,
            None => Locale::default(),
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr,
            jwt_secret,
            session_ttl: Duration::minutes(session_ttl_minutes),
            db_max_connections,
            default_locale,
        })
    }

    /// The session signing secret, for commands that issue or verify tokens
    pub fn require_jwt_secret(&self) -> ServiceResult<&str> {
        self.jwt_secret
            .as_deref()
            .ok_or_else(|| ServiceError::Configuration("JWT_SECRET must be set".to_string()))
    }
}
