use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use crate::errors::{DomainError, DomainResult};

// Re-export UserRole and Permission from the permission module
pub use crate::domains::permission::{Permission, UserRole};

/// Render a timestamp the way it is stored. Fixed precision and a `Z` suffix keep
/// string comparison in SQL identical to chronological comparison.
pub fn to_db_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp column
pub fn parse_db_timestamp(value: &str) -> DomainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DomainError::Internal(format!("Invalid date format: {}", value)))
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u32,
    pub per_page: u32,
}

impl PaginationParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page.max(1) as u64 - 1) * self.per_page as u64
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

/// Which page the caller asked for, before the total is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Number(u32),
    Last,
}

impl PageRequest {
    /// Lenient parse of a `page` query value. Anything unusable means the first page.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("last") => PageRequest::Last,
            Some(value) => match value.parse::<u32>() {
                Ok(n) if n >= 1 => PageRequest::Number(n),
                // Too many digits for u32: past any real page, not malformed
                Err(_) if is_positive_integer(value) => PageRequest::Number(u32::MAX),
                _ => PageRequest::Number(1),
            },
            None => PageRequest::Number(1),
        }
    }

    /// Resolve against a known total
    pub fn resolve(self, total: u64, per_page: u32) -> PaginationParams {
        match self {
            PageRequest::Number(n) => PaginationParams::new(n, per_page),
            PageRequest::Last => PaginationParams::new(total_pages(total, per_page).max(1), per_page),
        }
    }
}

fn is_positive_integer(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && digits.bytes().any(|b| b != b'0')
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::Number(1)
    }
}

fn total_pages(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page as u64) as u32
}

/// Paginated result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, params: PaginationParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
            total_pages: total_pages(total, params.per_page),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1 && self.total_pages > 0
    }

    pub fn map<U, F>(self, f: F) -> PaginatedResult<U>
    where F: FnMut(T) -> U {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}
