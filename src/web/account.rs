//! Login and logout over the session cookie

use crate::errors::ServiceError;
use crate::web::error::{redirect, OrPage, WebError};
use crate::web::render;
use crate::web::session::{clear_session_cookie, safe_next, session_cookie, session_token, PageLocale};
use crate::web::{param, AppState};
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub next: Option<String>,
}

pub async fn login_form(
    PageLocale(locale): PageLocale,
    Query(query): Query<Vec<(String, String)>>,
) -> Html<String> {
    let next = safe_next(param(&query, "next"));
    Html(render::login_page(locale, next, "", false))
}

/// Success sets the session cookie and follows `next`. Any credential failure re-renders the form.
pub async fn login(
    State(state): State<AppState>,
    PageLocale(locale): PageLocale,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, WebError> {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let username = form.username.unwrap_or_default();
    let password = form.password.unwrap_or_default();
    let next = safe_next(form.next.as_deref()).to_string();

    match state.auth_service.login(username.trim(), &password).await {
        Ok(result) => {
            let cookie = session_cookie(&result.token, state.auth_service.session_ttl());
            Ok((
                StatusCode::FOUND,
                [(header::LOCATION, next), (header::SET_COOKIE, cookie)],
            )
                .into_response())
        }
        Err(ServiceError::Authentication(_)) => {
            Ok(Html(render::login_page(locale, &next, &username, true)).into_response())
        }
        Err(err) => Err(WebError::from_service(locale, err)),
    }
}

/// Revoke the current session, clear the cookie and go home
pub async fn logout(
    State(state): State<AppState>,
    PageLocale(locale): PageLocale,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    if let Some(token) = session_token(&headers) {
        state.auth_service.logout(&token).await.or_page(locale)?;
    }
    let mut response = redirect("/");
    if let Ok(value) = clear_session_cookie().parse() {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}
