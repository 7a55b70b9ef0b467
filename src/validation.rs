use crate::errors::{DomainError, DomainResult, FieldErrors, ValidationError};
use regex::Regex;
use std::sync::OnceLock;

/// A trait that entities should implement for validation.
pub trait Validate {
    /// Validates the entity and returns an error if validation fails.
    fn validate(&self) -> DomainResult<()>;
}

// Letters, digits and @.+-_
fn username_regex() -> &'static Regex {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    USERNAME_REGEX.get_or_init(|| Regex::new(r"^[\w.@+-]+$").unwrap())
}

/// Struct for configuring validations in a fluent style
#[derive(Default)]
pub struct ValidationBuilder<T> {
    field_name: String,
    value: Option<T>,
    errors: Vec<ValidationError>,
}

/// Collects errors from several builders so a form can report every bad field at once
pub struct NestedValidator {
    errors: FieldErrors,
}

impl NestedValidator {
    pub fn new() -> Self {
        Self { errors: FieldErrors::new() }
    }

    pub fn add_errors(&mut self, errors: Vec<ValidationError>) {
        self.errors.extend(errors);
    }

    pub fn validate(self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::ValidationFailed(self.errors))
        }
    }
}

impl Default for NestedValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generic validation implementations
impl<T> ValidationBuilder<T> {
    pub fn new(field_name: &str, value: Option<T>) -> Self {
        Self {
            field_name: field_name.to_string(),
            value,
            errors: Vec::new(),
        }
    }

    /// Hand the collected errors to a `NestedValidator`
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

/// String-specific validations
impl ValidationBuilder<String> {
    /// Missing, empty and whitespace-only input all count as required.
    /// Stops the chain from reporting length errors for a value that is not there.
    pub fn not_blank(mut self) -> Self {
        let blank = self.value.as_ref().map_or(true, |v| v.trim().is_empty());
        if blank {
            self.errors.push(ValidationError::required(&self.field_name));
            self.value = None;
        }
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        if let Some(value) = &self.value {
            if value.chars().count() < min {
                self.errors.push(ValidationError::min_length(&self.field_name, min));
            }
        }
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        if let Some(value) = &self.value {
            if value.chars().count() > max {
                self.errors.push(ValidationError::max_length(&self.field_name, max));
            }
        }
        self
    }

    pub fn matches_pattern(mut self, pattern: &Regex, message: &str) -> Self {
        if let Some(value) = &self.value {
            if !pattern.is_match(value) {
                self.errors.push(ValidationError::format(&self.field_name, message));
            }
        }
        self
    }

    pub fn username(self) -> Self {
        self.matches_pattern(
            username_regex(),
            "may contain only letters, digits and @/./+/-/_",
        )
    }

    pub fn one_of(mut self, allowed_values: &[&str], message: Option<&str>) -> Self {
        if let Some(value) = &self.value {
            if !allowed_values.contains(&value.as_str()) {
                let reason = message.unwrap_or("must be one of the allowed values");
                self.errors.push(ValidationError::invalid_value(&self.field_name, reason));
            }
        }
        self
    }
}

/// Numeric validations
impl<T> ValidationBuilder<T>
where T: PartialOrd + Clone + std::fmt::Display
{
    pub fn min(mut self, min: T) -> Self {
        if let Some(value) = &self.value {
            if value < &min {
                self.errors.push(ValidationError::invalid_value(
                    &self.field_name,
                    &format!("must be at least {}", min),
                ));
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_validation() {
        assert!(username_regex().is_match("admin@local.ru"));
        assert!(username_regex().is_match("editor_01"));
        assert!(!username_regex().is_match("with space"));
        assert!(!username_regex().is_match(""));
    }

    #[test]
    fn test_validation_builder() {
        let errors = ValidationBuilder::new("title", None::<String>).not_blank().into_errors();
        assert_eq!(errors, vec![ValidationError::required("title")]);

        // A blank value stops the later length checks
        let errors = ValidationBuilder::new("title", Some("   ".to_string()))
            .not_blank()
            .min_length(2)
            .into_errors();
        assert_eq!(errors, vec![ValidationError::required("title")]);

        let errors = ValidationBuilder::new("role", Some("root".to_string()))
            .one_of(&["admin", "editor"], None)
            .into_errors();
        assert_eq!(errors.len(), 1);

        let errors = ValidationBuilder::new("cost", Some(-1.0)).min(0.0).into_errors();
        assert!(matches!(errors.as_slice(), [ValidationError::InvalidValue { .. }]));

        assert!(ValidationBuilder::new("cost", Some(0.0)).min(0.0).into_errors().is_empty());
    }

    #[test]
    fn test_nested_validator_collects_every_field() {
        let mut validator = NestedValidator::new();
        validator.add_errors(ValidationBuilder::new("title", None::<String>).not_blank().into_errors());
        validator.add_errors(ValidationBuilder::new("body", Some("ok".to_string())).not_blank().into_errors());
        validator.add_errors(ValidationBuilder::new("preambule", Some(String::new())).not_blank().into_errors());

        match validator.validate() {
            Err(DomainError::ValidationFailed(errors)) => {
                assert_eq!(errors.for_field("title").count(), 1);
                assert_eq!(errors.for_field("preambule").count(), 1);
                assert_eq!(errors.for_field("body").count(), 0);
            }
            other => panic!("expected collected errors, got {:?}", other),
        }
    }
}
