//! HTTP surface: server-rendered pages plus a JSON view of the news listing

pub mod account;
pub mod courses;
pub mod error;
pub mod news;
pub mod pages;
pub mod render;
pub mod session;

use crate::auth::AuthService;
use crate::domains::course::CourseService;
use crate::domains::news::NewsService;
use crate::locale::Locale;
use crate::AppServices;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub news_service: Arc<dyn NewsService>,
    pub course_service: Arc<dyn CourseService>,
    pub auth_service: Arc<AuthService>,
    pub default_locale: Locale,
}

impl AppState {
    pub fn new(services: &AppServices, default_locale: Locale) -> Self {
        Self {
            news_service: services.news_service.clone(),
            course_service: services.course_service.clone(),
            auth_service: services.auth_service.clone(),
            default_locale,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/news/", get(news::list))
        .route("/news/create/", get(news::create_form).post(news::create))
        .route("/news/{id}/", get(news::detail))
        .route("/news/{id}/update/", get(news::update_form).post(news::update))
        .route("/news/{id}/delete/", get(news::delete_confirm).post(news::delete))
        .route("/courses/", get(courses::list))
        .route("/login/", get(account::login_form).post(account::login))
        .route("/logout/", get(account::logout).post(account::logout))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

/// Last value of a query or form key. Repeated keys never reject the request.
pub fn param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
