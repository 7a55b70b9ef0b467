use crate::errors::{DomainError, DomainResult};
use crate::types::parse_db_timestamp;
use crate::validation::{NestedValidator, Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Core Course entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
}

/// NewCourse DTO
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCourse {
    pub name: String,
    pub description: String,
    pub cost: f64,
}

impl Validate for NewCourse {
    fn validate(&self) -> DomainResult<()> {
        let mut validator = NestedValidator::new();
        validator.add_errors(
            ValidationBuilder::new("name", Some(self.name.clone()))
                .not_blank()
                .max_length(255)
                .into_errors(),
        );
        validator.add_errors(
            ValidationBuilder::new("cost", Some(self.cost))
                .min(0.0)
                .into_errors(),
        );
        validator.validate()
    }
}

/// CourseResponse DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub cost: f64,
    pub deleted: bool,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            name: course.name,
            description: course.description,
            cost: course.cost,
            deleted: course.deleted,
        }
    }
}

/// CourseRow - SQLite row representation for mapping from database
#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: f64,
    pub created_at: String,
    pub updated_at: String,
    pub deleted: i64,
}

impl CourseRow {
    pub fn into_entity(self) -> DomainResult<Course> {
        Ok(Course {
            id: Uuid::parse_str(&self.id).map_err(|_| DomainError::InvalidUuid(self.id.clone()))?,
            name: self.name,
            description: self.description,
            cost: self.cost,
            created_at: parse_db_timestamp(&self.created_at)?,
            updated_at: parse_db_timestamp(&self.updated_at)?,
            deleted: self.deleted != 0,
        })
    }
}
