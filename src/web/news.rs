use crate::auth::AuthContext;
use crate::domains::news::{NewNews, NewsFilter, UpdateNews};
use crate::errors::ServiceError;
use crate::locale::Locale;
use crate::types::{PageRequest, Permission};
use crate::web::error::{redirect, validation_errors, OrPage, WebError};
use crate::web::render::{self, Label, ListLinks};
use crate::web::session::{MaybeAuth, PageLocale};
use crate::web::{param, AppState};
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Path, Query, State};
use axum::http::Uri;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

/// Submitted create/edit form. Missing fields arrive as empty and fail validation.
#[derive(Debug, Default, Deserialize)]
pub struct NewsForm {
    pub title: Option<String>,
    pub preambule: Option<String>,
    pub body: Option<String>,
}

impl NewsForm {
    /// A body that is not urlencoded reads as an empty form
    fn from_body(body: Result<Form<NewsForm>, FormRejection>) -> Self {
        match body {
            Ok(Form(form)) => form,
            Err(rejection) => {
                log::debug!("Unreadable news form: {}", rejection);
                NewsForm::default()
            }
        }
    }

    fn into_update(self) -> UpdateNews {
        UpdateNews {
            title: self.title.unwrap_or_default(),
            preambule: self.preambule.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
        }
    }
}

fn parse_id(locale: Locale, raw: &str) -> Result<Uuid, WebError> {
    Uuid::parse_str(raw).map_err(|_| WebError::not_found(locale))
}

/// The session user, or a redirect to the login page that returns here
fn require_login(auth: MaybeAuth, locale: Locale, uri: &Uri) -> Result<AuthContext, WebError> {
    auth.0.ok_or_else(|| WebError::login_required(locale, uri.path()))
}

/// `GET /news/`: visible news, two per page, optional `dateFrom`/`dateTo`, `page` (number or `last`)
pub async fn list(
    State(state): State<AppState>,
    PageLocale(locale): PageLocale,
    MaybeAuth(user): MaybeAuth,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, WebError> {
    let date_from = param(&query, "dateFrom");
    let date_to = param(&query, "dateTo");
    let filter = NewsFilter::from_query(date_from, date_to);
    let page = PageRequest::parse(param(&query, "page"));

    let result = state.news_service.list_news(&filter, page).await.or_page(locale)?;

    if param(&query, "format") == Some("json") {
        return Ok(Json(result).into_response());
    }

    let links = ListLinks { date_from, date_to };
    Ok(Html(render::news_list_page(locale, user.as_ref(), &result, &links)).into_response())
}

pub async fn detail(
    State(state): State<AppState>,
    PageLocale(locale): PageLocale,
    MaybeAuth(user): MaybeAuth,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let id = parse_id(locale, &id)?;
    let news = state.news_service.get_news(id).await.or_page(locale)?;
    Ok(Html(render::news_detail_page(locale, user.as_ref(), &news)))
}

pub async fn create_form(
    PageLocale(locale): PageLocale,
    auth: MaybeAuth,
    uri: Uri,
) -> Result<Html<String>, WebError> {
    let user = require_login(auth, locale, &uri)?;
    user.authorize(Permission::CreateNews).or_page(locale)?;
    Ok(Html(render::news_form_page(
        locale,
        Some(&user),
        Label::CreateNews,
        "/news/create/",
        &UpdateNews::default(),
        None,
    )))
}

pub async fn create(
    State(state): State<AppState>,
    PageLocale(locale): PageLocale,
    auth: MaybeAuth,
    uri: Uri,
    form: Result<Form<NewsForm>, FormRejection>,
) -> Result<Response, WebError> {
    let user = require_login(auth, locale, &uri)?;
    let values = NewsForm::from_body(form).into_update();
    let new_news = NewNews {
        title: values.title.clone(),
        preambule: values.preambule.clone(),
        body: values.body.clone(),
    };

    match state.news_service.create_news(new_news, &user).await {
        Ok(_) => Ok(redirect("/news/")),
        Err(err) => form_error(locale, &user, Label::CreateNews, "/news/create/", &values, err),
    }
}

pub async fn update_form(
    State(state): State<AppState>,
    PageLocale(locale): PageLocale,
    auth: MaybeAuth,
    uri: Uri,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let user = require_login(auth, locale, &uri)?;
    user.authorize(Permission::EditNews).or_page(locale)?;
    let id = parse_id(locale, &id)?;
    let news = state.news_service.get_news(id).await.or_page(locale)?;
    Ok(Html(render::news_form_page(
        locale,
        Some(&user),
        Label::EditNews,
        &format!("/news/{}/update/", id),
        &UpdateNews::from(&news),
        None,
    )))
}

pub async fn update(
    State(state): State<AppState>,
    PageLocale(locale): PageLocale,
    auth: MaybeAuth,
    uri: Uri,
    Path(id): Path<String>,
    form: Result<Form<NewsForm>, FormRejection>,
) -> Result<Response, WebError> {
    let user = require_login(auth, locale, &uri)?;
    let id = parse_id(locale, &id)?;
    let values = NewsForm::from_body(form).into_update();

    match state.news_service.update_news(id, values.clone(), &user).await {
        Ok(news) => Ok(redirect(&format!("/news/{}/", news.id))),
        Err(err) => {
            let action = format!("/news/{}/update/", id);
            form_error(locale, &user, Label::EditNews, &action, &values, err)
        }
    }
}

pub async fn delete_confirm(
    State(state): State<AppState>,
    PageLocale(locale): PageLocale,
    auth: MaybeAuth,
    uri: Uri,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let user = require_login(auth, locale, &uri)?;
    user.authorize(Permission::DeleteNews).or_page(locale)?;
    let id = parse_id(locale, &id)?;
    let news = state.news_service.get_news(id).await.or_page(locale)?;
    Ok(Html(render::news_delete_page(locale, Some(&user), &news)))
}

pub async fn delete(
    State(state): State<AppState>,
    PageLocale(locale): PageLocale,
    auth: MaybeAuth,
    uri: Uri,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let user = require_login(auth, locale, &uri)?;
    let id = parse_id(locale, &id)?;
    state.news_service.delete_news(id, &user).await.or_page(locale)?;
    Ok(redirect("/news/"))
}

/// Validation failures re-render the form with the submitted values, anything else is an error page
fn form_error(
    locale: Locale,
    user: &AuthContext,
    heading: Label,
    action: &str,
    values: &UpdateNews,
    err: ServiceError,
) -> Result<Response, WebError> {
    match validation_errors(&err) {
        Some(errors) => Ok(Html(render::news_form_page(
            locale,
            Some(user),
            heading,
            action,
            values,
            Some(&errors),
        ))
        .into_response()),
        None => Err(WebError::from_service(locale, err)),
    }
}
