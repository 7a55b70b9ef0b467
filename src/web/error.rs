use crate::errors::{DomainError, FieldErrors, ServiceError, ServiceResult};
use crate::locale::Locale;
use crate::web::render;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};

/// What went wrong while serving a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebErrorKind {
    NotFound,
    /// Anonymous visitor on a page that needs a session; `next` is where to return after login
    LoginRequired { next: String },
    Forbidden,
    Internal,
}

/// An error page rendered in the visitor's language
#[derive(Debug)]
pub struct WebError {
    pub locale: Locale,
    pub kind: WebErrorKind,
}

impl WebError {
    pub fn new(locale: Locale, kind: WebErrorKind) -> Self {
        Self { locale, kind }
    }

    pub fn not_found(locale: Locale) -> Self {
        Self::new(locale, WebErrorKind::NotFound)
    }

    pub fn login_required(locale: Locale, next: &str) -> Self {
        Self::new(locale, WebErrorKind::LoginRequired { next: next.to_string() })
    }

    /// Map a service failure onto the page the visitor should see
    pub fn from_service(locale: Locale, err: ServiceError) -> Self {
        let kind = match &err {
            ServiceError::Domain(domain) if domain.is_not_found() => WebErrorKind::NotFound,
            ServiceError::Domain(DomainError::InvalidUuid(_)) => WebErrorKind::NotFound,
            ServiceError::PermissionDenied(_) => WebErrorKind::Forbidden,
            ServiceError::Authentication(_) | ServiceError::SessionExpired => {
                WebErrorKind::LoginRequired { next: "/".to_string() }
            }
            _ => {
                log::error!("Request failed: {}", err);
                WebErrorKind::Internal
            }
        };
        Self::new(locale, kind)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match self.kind {
            WebErrorKind::LoginRequired { next } => return login_redirect(&next),
            WebErrorKind::NotFound => StatusCode::NOT_FOUND,
            WebErrorKind::Forbidden => StatusCode::FORBIDDEN,
            WebErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Html(render::error_page(self.locale, status))).into_response()
    }
}

/// 302 to the login page, carrying the requested path
pub fn login_redirect(next: &str) -> Response {
    let location = format!("/login/?next={}", urlencoding::encode(next));
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Plain 302
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Field errors to re-render a form with, if the failure was a validation one
pub fn validation_errors(err: &ServiceError) -> Option<FieldErrors> {
    match err {
        ServiceError::Domain(domain) => domain.field_errors(),
        _ => None,
    }
}

pub trait OrPage<T> {
    fn or_page(self, locale: Locale) -> Result<T, WebError>;
}

impl<T> OrPage<T> for ServiceResult<T> {
    fn or_page(self, locale: Locale) -> Result<T, WebError> {
        self.map_err(|e| WebError::from_service(locale, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DbError, ValidationError};
    use uuid::Uuid;

    #[test]
    fn test_service_errors_map_to_pages() {
        let cases = [
            (
                ServiceError::Domain(DomainError::EntityNotFound("News".into(), Uuid::nil())),
                WebErrorKind::NotFound,
            ),
            (
                ServiceError::Domain(DomainError::Database(DbError::NotFound("News".into(), "x".into()))),
                WebErrorKind::NotFound,
            ),
            (ServiceError::PermissionDenied("nope".into()), WebErrorKind::Forbidden),
            (ServiceError::Configuration("broken".into()), WebErrorKind::Internal),
        ];
        for (err, expected) in cases {
            assert_eq!(WebError::from_service(Locale::En, err).kind, expected);
        }
    }

    #[test]
    fn test_login_redirect_encodes_next() {
        let response = login_redirect("/news/create/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login/?next=%2Fnews%2Fcreate%2F"
        );
    }

    #[test]
    fn test_validation_errors_are_extracted() {
        let err = ServiceError::from(ValidationError::required("title"));
        let errors = validation_errors(&err).unwrap();
        assert_eq!(errors.for_field("title").count(), 1);
        assert!(validation_errors(&ServiceError::SessionExpired).is_none());
    }
}
