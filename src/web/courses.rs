use crate::web::error::{OrPage, WebError};
use crate::web::render;
use crate::web::session::{MaybeAuth, PageLocale};
use crate::web::AppState;
use axum::extract::State;
use axum::response::Html;

/// `GET /courses/`: every course that is not deleted
pub async fn list(
    State(state): State<AppState>,
    PageLocale(locale): PageLocale,
    MaybeAuth(user): MaybeAuth,
) -> Result<Html<String>, WebError> {
    let courses = state.course_service.list_courses().await.or_page(locale)?;
    Ok(Html(render::courses_page(locale, user.as_ref(), &courses)))
}
