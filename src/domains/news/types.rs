use crate::errors::{DomainError, DomainResult};
use crate::types::parse_db_timestamp;
use crate::validation::{NestedValidator, Validate, ValidationBuilder};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fixed page size of the public news listing
pub const NEWS_PAGE_SIZE: u32 = 2;

/// Core News entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub preambule: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    pub created_by_user_id: Option<Uuid>,
    pub updated_by_user_id: Option<Uuid>,
}

/// Validate the three text fields every news item needs.
/// All bad fields are reported together so a form can show each message.
fn validate_text_fields(title: &str, preambule: &str, body: &str) -> DomainResult<()> {
    let mut validator = NestedValidator::new();
    validator.add_errors(
        ValidationBuilder::new("title", Some(title.to_string()))
            .not_blank()
            .max_length(255)
            .into_errors(),
    );
    validator.add_errors(
        ValidationBuilder::new("preambule", Some(preambule.to_string()))
            .not_blank()
            .into_errors(),
    );
    validator.add_errors(
        ValidationBuilder::new("body", Some(body.to_string()))
            .not_blank()
            .into_errors(),
    );
    validator.validate()
}

/// NewNews DTO - used when creating a news item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewNews {
    pub title: String,
    pub preambule: String,
    pub body: String,
}

impl Validate for NewNews {
    fn validate(&self) -> DomainResult<()> {
        validate_text_fields(&self.title, &self.preambule, &self.body)
    }
}

/// UpdateNews DTO - replaces the text of an existing item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNews {
    pub title: String,
    pub preambule: String,
    pub body: String,
}

impl Validate for UpdateNews {
    fn validate(&self) -> DomainResult<()> {
        validate_text_fields(&self.title, &self.preambule, &self.body)
    }
}

/// Prefill for the edit form
impl From<&NewsResponse> for UpdateNews {
    fn from(news: &NewsResponse) -> Self {
        Self {
            title: news.title.clone(),
            preambule: news.preambule.clone(),
            body: news.body.clone(),
        }
    }
}

/// NewsResponse DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsResponse {
    pub id: Uuid,
    pub title: String,
    pub preambule: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
}

impl From<News> for NewsResponse {
    fn from(news: News) -> Self {
        Self {
            id: news.id,
            title: news.title,
            preambule: news.preambule,
            body: news.body,
            created_at: news.created_at,
            updated_at: news.updated_at,
            deleted: news.deleted,
        }
    }
}

/// Optional inclusive `created_at` range for the listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewsFilter {
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl NewsFilter {
    /// Build a filter from raw query values. Unusable values leave that bound open.
    pub fn from_query(date_from: Option<&str>, date_to: Option<&str>) -> Self {
        Self {
            date_from: date_from.and_then(parse_bound),
            date_to: date_to.and_then(parse_bound),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date_from.is_none() && self.date_to.is_none()
    }
}

/// Parse one range bound. A bare date means midnight UTC at the start of that day.
pub fn parse_bound(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// NewsRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct NewsRow {
    pub id: String,
    pub title: String,
    pub preambule: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted: i64,
    pub created_by_user_id: Option<String>,
    pub updated_by_user_id: Option<String>,
}

impl NewsRow {
    /// Convert database row to domain entity
    pub fn into_entity(self) -> DomainResult<News> {
        let parse_uuid = |s: &str| Uuid::parse_str(s).map_err(|_| DomainError::InvalidUuid(s.to_string()));

        Ok(News {
            id: parse_uuid(&self.id)?,
            title: self.title,
            preambule: self.preambule,
            body: self.body,
            created_at: parse_db_timestamp(&self.created_at)?,
            updated_at: parse_db_timestamp(&self.updated_at)?,
            deleted: self.deleted != 0,
            created_by_user_id: self.created_by_user_id.as_deref().map(parse_uuid).transpose()?,
            updated_by_user_id: self.updated_by_user_id.as_deref().map(parse_uuid).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_bare_date_means_midnight() {
        assert_eq!(parse_bound("2024-01-05"), Some(utc("2024-01-05T00:00:00Z")));
        assert_eq!(parse_bound(" 2024-01-05 "), Some(utc("2024-01-05T00:00:00Z")));
    }

    #[test]
    fn test_datetime_forms() {
        assert_eq!(parse_bound("2024-01-05T10:30"), Some(utc("2024-01-05T10:30:00Z")));
        assert_eq!(parse_bound("2024-01-05T10:30:15"), Some(utc("2024-01-05T10:30:15Z")));
        assert_eq!(parse_bound("2024-01-05 10:30"), Some(utc("2024-01-05T10:30:00Z")));
        assert_eq!(parse_bound("2024-01-05T12:00:00+02:00"), Some(utc("2024-01-05T10:00:00Z")));
    }

    #[test]
    fn test_malformed_bounds_are_absent() {
        for raw in ["", "   ", "yesterday", "2024-13-01", "2024-02-30", "05.01.2024"] {
            assert_eq!(parse_bound(raw), None, "{:?}", raw);
        }
        let filter = NewsFilter::from_query(Some("garbage"), None);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_blank_fields_are_all_reported() {
        let news = NewNews {
            title: "  ".to_string(),
            preambule: String::new(),
            body: "text".to_string(),
        };
        match news.validate() {
            Err(DomainError::ValidationFailed(errors)) => {
                assert_eq!(errors.for_field("title").count(), 1);
                assert_eq!(errors.for_field("preambule").count(), 1);
                assert_eq!(errors.for_field("body").count(), 0);
            }
            other => panic!("expected collected errors, got {:?}", other),
        }
    }
}
