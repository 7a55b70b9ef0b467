//! Request extractors for the session cookie and the page language

use crate::auth::AuthContext;
use crate::locale::Locale;
use crate::web::AppState;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use chrono::Duration;
use std::convert::Infallible;

pub const SESSION_COOKIE: &str = "sessionid";

/// The logged-in user, if the request carries a valid, unrevoked session
#[derive(Debug, Clone)]
pub struct MaybeAuth(pub Option<AuthContext>);

impl FromRequestParts<AppState> for MaybeAuth {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(MaybeAuth(None));
        };
        match state.auth_service.verify_token(&token).await {
            Ok(auth) => Ok(MaybeAuth(Some(auth))),
            Err(e) => {
                log::debug!("Ignoring session cookie: {}", e);
                Ok(MaybeAuth(None))
            }
        }
    }
}

/// Language for the response
#[derive(Debug, Clone, Copy)]
pub struct PageLocale(pub Locale);

impl FromRequestParts<AppState> for PageLocale {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let lang = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(pairs)| crate::web::param(&pairs, "lang").map(str::to_string));
        let accept = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        Ok(PageLocale(Locale::resolve(lang.as_deref(), accept, state.default_locale)))
    }
}

/// Value of the session cookie across all `Cookie` headers
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.num_seconds().max(0)
    )
}

pub fn clear_session_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Only same-site absolute paths are followed after login
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path,
        _ => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_from_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; sessionid=abc.def; b=2"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def"));

        let mut empty = HeaderMap::new();
        empty.append(header::COOKIE, HeaderValue::from_static("sessionid="));
        assert_eq!(session_token(&empty), None);
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/news/create/")), "/news/create/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("tok", Duration::minutes(2));
        assert!(cookie.starts_with("sessionid=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("Max-Age=120"));
        assert!(clear_session_cookie().ends_with("Max-Age=0"));
    }
}
