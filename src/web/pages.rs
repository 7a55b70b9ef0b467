use crate::web::render;
use crate::web::session::{MaybeAuth, PageLocale};
use axum::response::Html;

pub async fn index(PageLocale(locale): PageLocale, MaybeAuth(user): MaybeAuth) -> Html<String> {
    Html(render::index_page(locale, user.as_ref()))
}
