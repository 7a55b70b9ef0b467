//! Server-side HTML for every page. Each function takes the request's `Locale` explicitly.

use crate::auth::AuthContext;
use crate::domains::course::CourseResponse;
use crate::domains::news::{NewsResponse, UpdateNews};
use crate::errors::{FieldErrors, ValidationError};
use crate::locale::Locale;
use crate::types::{PaginatedResult, Permission};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Every piece of interface text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    SiteName,
    MainPage,
    Welcome,
    News,
    Courses,
    Login,
    Logout,
    CreateNews,
    EditNews,
    DeleteNews,
    ConfirmDelete,
    Title,
    Preambule,
    Body,
    Created,
    Updated,
    DateFrom,
    DateTo,
    Filter,
    Previous,
    Next,
    Page,
    Of,
    NoNews,
    NoCourses,
    Deleted,
    Save,
    Cancel,
    Username,
    Password,
    InvalidLogin,
    Cost,
    NotFound,
    Forbidden,
    ServerError,
    Back,
}

/// Look up a label in the given language
pub fn t(locale: Locale, label: Label) -> &'static str {
    use Label::*;
    match locale {
        Locale::En => match label {
            SiteName => "News Portal",
            MainPage => "Home",
            Welcome => "Welcome! Read the latest news and browse our courses.",
            News => "News",
            Courses => "Courses",
            Login => "Log in",
            Logout => "Log out",
            CreateNews => "Add news",
            EditNews => "Edit news",
            DeleteNews => "Delete news",
            ConfirmDelete => "Are you sure you want to delete this news item?",
            Title => "Title",
            Preambule => "Preamble",
            Body => "Body",
            Created => "Created",
            Updated => "Updated",
            DateFrom => "From",
            DateTo => "To",
            Filter => "Filter",
            Previous => "Previous",
            Next => "Next",
            Page => "Page",
            Of => "of",
            NoNews => "No news yet.",
            NoCourses => "No courses available.",
            Deleted => "Deleted",
            Save => "Save",
            Cancel => "Cancel",
            Username => "Username",
            Password => "Password",
            InvalidLogin => "Invalid username or password.",
            Cost => "Cost",
            NotFound => "Page not found",
            Forbidden => "You do not have permission to do this.",
            ServerError => "Something went wrong. Please try again later.",
            Back => "Back",
        },
        Locale::Ru => match label {
            SiteName => "Новостной портал",
            MainPage => "Главная",
            Welcome => "Добро пожаловать! Читайте последние новости и выбирайте курсы.",
            News => "Новости",
            Courses => "Курсы",
            Login => "Войти",
            Logout => "Выйти",
            CreateNews => "Добавить новость",
            EditNews => "Редактировать новость",
            DeleteNews => "Удалить новость",
            ConfirmDelete => "Вы уверены, что хотите удалить эту новость?",
            Title => "Заголовок",
            Preambule => "Преамбула",
            Body => "Текст",
            Created => "Создано",
            Updated => "Обновлено",
            DateFrom => "С",
            DateTo => "По",
            Filter => "Фильтр",
            Previous => "Назад",
            Next => "Вперёд",
            Page => "Страница",
            Of => "из",
            NoNews => "Новостей пока нет.",
            NoCourses => "Нет доступных курсов.",
            Deleted => "Удалено",
            Save => "Сохранить",
            Cancel => "Отмена",
            Username => "Имя пользователя",
            Password => "Пароль",
            InvalidLogin => "Неверное имя пользователя или пароль.",
            Cost => "Стоимость",
            NotFound => "Страница не найдена",
            Forbidden => "У вас нет прав на это действие.",
            ServerError => "Что-то пошло не так. Попробуйте позже.",
            Back => "Назад",
        },
    }
}

/// Message shown under a form field
pub fn field_message(locale: Locale, error: &ValidationError) -> String {
    match (locale, error) {
        (Locale::En, ValidationError::Required { .. }) => "This field is required.".to_string(),
        (Locale::Ru, ValidationError::Required { .. }) => "Обязательное поле.".to_string(),
        (Locale::En, ValidationError::MaxLength { max, .. }) => {
            format!("Ensure this value has at most {} characters.", max)
        }
        (Locale::Ru, ValidationError::MaxLength { max, .. }) => {
            format!("Значение должно содержать не более {} символов.", max)
        }
        (Locale::En, ValidationError::MinLength { min, .. }) => {
            format!("Ensure this value has at least {} characters.", min)
        }
        (Locale::Ru, ValidationError::MinLength { min, .. }) => {
            format!("Значение должно содержать не менее {} символов.", min)
        }
        (_, other) => other.to_string(),
    }
}

/// Escape text for HTML element content and quoted attribute values
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

fn can(user: Option<&AuthContext>, permission: Permission) -> bool {
    user.is_some_and(|u| u.has_permission(permission))
}

/// Shared page frame: navbar, content, footer
fn layout(locale: Locale, title: &str, user: Option<&AuthContext>, content: &str) -> String {
    let account = match user {
        Some(user) => format!(
            r#"<span class="navbar-text">{}</span> <a class="nav-link" href="/logout/">{}</a>"#,
            escape(&user.username),
            t(locale, Label::Logout)
        ),
        None => format!(r#"<a class="nav-link" href="/login/">{}</a>"#, t(locale, Label::Login)),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<title>{title} | {site}</title>
</head>
<body class="d-flex flex-column min-vh-100">
<nav class="navbar">
<a class="navbar-brand" href="/">{site}</a>
<a class="nav-link" href="/news/">{news}</a>
<a class="nav-link" href="/courses/">{courses}</a>
{account}
</nav>
<main class="container">
<h1>{title}</h1>
{content}
</main>
<footer class="mt-auto">{site}</footer>
</body>
</html>
"#,
        lang = locale.as_str(),
        title = escape(title),
        site = t(locale, Label::SiteName),
        news = t(locale, Label::News),
        courses = t(locale, Label::Courses),
        account = account,
        content = content,
    )
}

pub fn index_page(locale: Locale, user: Option<&AuthContext>) -> String {
    let content = format!(
        r#"<p>{}</p>
<ul>
<li><a href="/news/">{}</a></li>
<li><a href="/courses/">{}</a></li>
</ul>"#,
        t(locale, Label::Welcome),
        t(locale, Label::News),
        t(locale, Label::Courses),
    );
    layout(locale, t(locale, Label::MainPage), user, &content)
}

/// Raw filter values echoed back into the form and the pagination links
#[derive(Debug, Clone, Default)]
pub struct ListLinks<'a> {
    pub date_from: Option<&'a str>,
    pub date_to: Option<&'a str>,
}

impl ListLinks<'_> {
    fn href(&self, page: &str) -> String {
        let mut href = format!("/news/?page={}", page);
        if let Some(from) = self.date_from.filter(|v| !v.is_empty()) {
            let _ = write!(href, "&dateFrom={}", urlencoding::encode(from));
        }
        if let Some(to) = self.date_to.filter(|v| !v.is_empty()) {
            let _ = write!(href, "&dateTo={}", urlencoding::encode(to));
        }
        href
    }
}

pub fn news_list_page(
    locale: Locale,
    user: Option<&AuthContext>,
    page: &PaginatedResult<NewsResponse>,
    links: &ListLinks<'_>,
) -> String {
    let mut content = String::new();

    if can(user, Permission::CreateNews) {
        let _ = write!(
            content,
            r#"<p><a class="btn" href="/news/create/">{}</a></p>"#,
            t(locale, Label::CreateNews)
        );
    }

    let _ = write!(
        content,
        r#"<form method="get" action="/news/" class="news-filter">
<label for="id_dateFrom">{from}</label> <input type="date" id="id_dateFrom" name="dateFrom" value="{from_value}">
<label for="id_dateTo">{to}</label> <input type="date" id="id_dateTo" name="dateTo" value="{to_value}">
<button type="submit">{filter}</button>
</form>
"#,
        from = t(locale, Label::DateFrom),
        to = t(locale, Label::DateTo),
        from_value = escape(links.date_from.unwrap_or_default()),
        to_value = escape(links.date_to.unwrap_or_default()),
        filter = t(locale, Label::Filter),
    );

    if page.items.is_empty() {
        let _ = write!(content, "<p>{}</p>", t(locale, Label::NoNews));
    }

    for news in &page.items {
        let _ = write!(
            content,
            r#"<article class="news-item">
<h2><a href="/news/{id}/">{title}</a></h2>
<p class="preambule">{preambule}</p>
<p class="text-muted">{created_label}: {created}</p>
</article>
"#,
            id = news.id,
            title = escape(&news.title),
            preambule = escape(&news.preambule),
            created_label = t(locale, Label::Created),
            created = format_timestamp(&news.created_at),
        );
    }

    if page.total_pages > 1 {
        content.push_str(r#"<nav class="pagination">"#);
        if page.has_previous() {
            let _ = write!(
                content,
                r#"<a href="{}">{}</a> "#,
                escape(&links.href(&(page.page - 1).to_string())),
                t(locale, Label::Previous)
            );
        }
        let _ = write!(
            content,
            "<span>{} {} {} {}</span>",
            t(locale, Label::Page),
            page.page,
            t(locale, Label::Of),
            page.total_pages
        );
        if page.has_next() {
            let _ = write!(
                content,
                r#" <a href="{}">{}</a>"#,
                escape(&links.href(&(page.page + 1).to_string())),
                t(locale, Label::Next)
            );
        }
        content.push_str("</nav>");
    }

    layout(locale, t(locale, Label::News), user, &content)
}

pub fn news_detail_page(locale: Locale, user: Option<&AuthContext>, news: &NewsResponse) -> String {
    let mut content = String::new();

    if news.deleted {
        let _ = write!(content, r#"<p class="badge deleted">{}</p>"#, t(locale, Label::Deleted));
    }

    let _ = write!(
        content,
        r#"<p class="preambule"><strong>{preambule}</strong></p>
<div class="body">{body}</div>
<p class="text-muted">{created_label}: {created} &middot; {updated_label}: {updated}</p>
"#,
        preambule = escape(&news.preambule),
        body = escape(&news.body),
        created_label = t(locale, Label::Created),
        created = format_timestamp(&news.created_at),
        updated_label = t(locale, Label::Updated),
        updated = format_timestamp(&news.updated_at),
    );

    if can(user, Permission::EditNews) {
        let _ = write!(content, r#"<a class="btn" href="/news/{}/update/">{}</a> "#, news.id, t(locale, Label::EditNews));
    }
    if can(user, Permission::DeleteNews) && !news.deleted {
        let _ = write!(content, r#"<a class="btn" href="/news/{}/delete/">{}</a> "#, news.id, t(locale, Label::DeleteNews));
    }
    let _ = write!(content, r#"<a href="/news/">{}</a>"#, t(locale, Label::Back));

    layout(locale, &news.title, user, &content)
}

fn field_errors_html(locale: Locale, errors: Option<&FieldErrors>, field: &str) -> String {
    let Some(errors) = errors else {
        return String::new();
    };
    errors
        .for_field(field)
        .map(|e| format!(r#"<div class="invalid-feedback">{}</div>"#, escape(&field_message(locale, e))))
        .collect()
}

/// Create and edit share one form; `values` is what the user last submitted
pub fn news_form_page(
    locale: Locale,
    user: Option<&AuthContext>,
    heading: Label,
    action: &str,
    values: &UpdateNews,
    errors: Option<&FieldErrors>,
) -> String {
    let content = format!(
        r#"<form method="post" action="{action}">
<p><label for="id_title">{title_label}</label>
<input type="text" id="id_title" name="title" maxlength="255" value="{title}">
{title_errors}</p>
<p><label for="id_preambule">{preambule_label}</label>
<textarea id="id_preambule" name="preambule">{preambule}</textarea>
{preambule_errors}</p>
<p><label for="id_body">{body_label}</label>
<textarea id="id_body" name="body">{body}</textarea>
{body_errors}</p>
<button type="submit">{save}</button> <a href="/news/">{cancel}</a>
</form>"#,
        action = escape(action),
        title_label = t(locale, Label::Title),
        title = escape(&values.title),
        title_errors = field_errors_html(locale, errors, "title"),
        preambule_label = t(locale, Label::Preambule),
        preambule = escape(&values.preambule),
        preambule_errors = field_errors_html(locale, errors, "preambule"),
        body_label = t(locale, Label::Body),
        body = escape(&values.body),
        body_errors = field_errors_html(locale, errors, "body"),
        save = t(locale, Label::Save),
        cancel = t(locale, Label::Cancel),
    );
    layout(locale, t(locale, heading), user, &content)
}

pub fn news_delete_page(locale: Locale, user: Option<&AuthContext>, news: &NewsResponse) -> String {
    let content = format!(
        r#"<p>{question}</p>
<p><strong>{title}</strong></p>
<form method="post" action="/news/{id}/delete/">
<button type="submit">{delete}</button> <a href="/news/{id}/">{cancel}</a>
</form>"#,
        question = t(locale, Label::ConfirmDelete),
        title = escape(&news.title),
        id = news.id,
        delete = t(locale, Label::DeleteNews),
        cancel = t(locale, Label::Cancel),
    );
    layout(locale, t(locale, Label::DeleteNews), user, &content)
}

pub fn courses_page(locale: Locale, user: Option<&AuthContext>, courses: &[CourseResponse]) -> String {
    let mut content = String::new();
    if courses.is_empty() {
        let _ = write!(content, "<p>{}</p>", t(locale, Label::NoCourses));
    }
    for course in courses {
        let _ = write!(
            content,
            r#"<section class="course">
<h2>{name}</h2>
<p>{description}</p>
<p>{cost_label}: {cost:.2}</p>
</section>
"#,
            name = escape(&course.name),
            description = escape(&course.description),
            cost_label = t(locale, Label::Cost),
            cost = course.cost,
        );
    }
    layout(locale, t(locale, Label::Courses), user, &content)
}

pub fn login_page(locale: Locale, next: &str, username: &str, failed: bool) -> String {
    let error = if failed {
        format!(r#"<div class="alert">{}</div>"#, t(locale, Label::InvalidLogin))
    } else {
        String::new()
    };
    let content = format!(
        r#"{error}<form method="post" action="/login/">
<input type="hidden" name="next" value="{next}">
<p><label for="id_username">{username_label}</label>
<input type="text" id="id_username" name="username" value="{username}" autofocus></p>
<p><label for="id_password">{password_label}</label>
<input type="password" id="id_password" name="password"></p>
<button type="submit">{login}</button>
</form>"#,
        error = error,
        next = escape(next),
        username_label = t(locale, Label::Username),
        username = escape(username),
        password_label = t(locale, Label::Password),
        login = t(locale, Label::Login),
    );
    layout(locale, t(locale, Label::Login), None, &content)
}

pub fn error_page(locale: Locale, status: StatusCode) -> String {
    let message = match status {
        StatusCode::NOT_FOUND => t(locale, Label::NotFound),
        StatusCode::FORBIDDEN => t(locale, Label::Forbidden),
        _ => t(locale, Label::ServerError),
    };
    let content = format!(r#"<p>{}</p><p><a href="/">{}</a></p>"#, message, t(locale, Label::MainPage));
    layout(locale, &status.as_u16().to_string(), None, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaginationParams, UserRole};
    use uuid::Uuid;

    fn sample(title: &str) -> NewsResponse {
        let now = Utc::now();
        NewsResponse {
            id: Uuid::new_v4(),
            title: title.to_string(),
            preambule: "p".to_string(),
            body: "b".to_string(),
            created_at: now,
            updated_at: now,
            deleted: false,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<b>"Tom" & 'Jerry'</b>"#), "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;");
    }

    #[test]
    fn test_list_links_keep_filter() {
        let items = vec![sample("<script>")];
        let page = PaginatedResult::new(items, 3, PaginationParams::new(1, 2));
        let links = ListLinks { date_from: Some("2024-01-05"), date_to: None };
        let html = news_list_page(Locale::En, None, &page, &links);

        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("/news/?page=2&amp;dateFrom=2024-01-05"));
        assert!(!html.contains(r#"href="/news/create/""#));
    }

    #[test]
    fn test_create_link_only_for_editors() {
        let page = PaginatedResult::new(vec![], 0, PaginationParams::new(1, 2));
        let editor = AuthContext::new(Uuid::new_v4(), "ed".to_string(), UserRole::Editor);
        let reader = AuthContext::new(Uuid::new_v4(), "rd".to_string(), UserRole::Reader);

        let html = news_list_page(Locale::Ru, Some(&editor), &page, &ListLinks::default());
        assert!(html.contains(r#"href="/news/create/""#));
        assert!(html.contains("Новостей пока нет."));

        let html = news_list_page(Locale::En, Some(&reader), &page, &ListLinks::default());
        assert!(!html.contains(r#"href="/news/create/""#));
    }

    #[test]
    fn test_form_shows_field_messages() {
        let mut errors = FieldErrors::new();
        errors.push(ValidationError::required("title"));
        let html = news_form_page(Locale::En, None, Label::CreateNews, "/news/create/", &UpdateNews::default(), Some(&errors));
        assert!(html.contains(r#"id="id_title""#));
        assert!(html.contains("This field is required."));
    }
}
