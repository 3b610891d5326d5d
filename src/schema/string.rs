//! String schema validation.
//!
//! This module provides [`StringSchema`] for validating string values with
//! length and pattern constraints.

use regex::Regex;
use serde_json::Value;
use stillwater::Validation;

use crate::error::{ValidationIssue, ValidationIssues};
use crate::path::Location;

use super::finish;
use super::traits::SchemaLike;

#[derive(Clone)]
enum StringConstraint {
    MinLength {
        min: usize,
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        message: Option<String>,
    },
    Pattern {
        regex: Regex,
        message: Option<String>,
    },
}

/// A schema for string values.
///
/// Length counts Unicode scalar values. All constraint violations are
/// reported together.
///
/// # Example
///
/// ```rust
/// use safecall::{Location, Schema};
/// use serde_json::json;
///
/// let schema = Schema::string()
///     .min_len(3)
///     .pattern(r"^[a-z]+$")
///     .unwrap();
///
/// let issues = schema
///     .validate(&json!("AB"), &Location::root())
///     .into_result()
///     .unwrap_err();
///
/// // Both the length and the pattern are reported
/// assert_eq!(issues.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct StringSchema {
    constraints: Vec<StringConstraint>,
    type_error_message: Option<String>,
}

impl StringSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints
            .push(StringConstraint::MinLength { min, message: None });
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints
            .push(StringConstraint::MaxLength { max, message: None });
        self
    }

    /// Requires the string to match `pattern` (searched, not anchored).
    ///
    /// # Errors
    ///
    /// Returns the regex error if `pattern` does not compile.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        self.constraints.push(StringConstraint::Pattern {
            regex,
            message: None,
        });
        Ok(self)
    }

    /// Sets a custom message for the most recent constraint, or for type
    /// errors if no constraint has been added yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.constraints.last_mut() {
            Some(StringConstraint::MinLength { message: m, .. })
            | Some(StringConstraint::MaxLength { message: m, .. })
            | Some(StringConstraint::Pattern { message: m, .. }) => *m = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    pub fn validate(
        &self,
        value: &Value,
        location: &Location,
    ) -> Validation<String, ValidationIssues> {
        let s = match value.as_str() {
            Some(s) => s,
            None => {
                let message = self
                    .type_error_message
                    .clone()
                    .unwrap_or_else(|| "Input should be a valid string".to_string());
                return Validation::Failure(ValidationIssues::single(ValidationIssue::new(
                    "string_type",
                    location.clone(),
                    message,
                    value.clone(),
                )));
            }
        };

        let issues: Vec<ValidationIssue> = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, s, location))
            .collect();

        finish(s.to_string(), issues)
    }
}

impl SchemaLike for StringSchema {
    type Output = String;

    fn validate(&self, value: &Value, location: &Location) -> Validation<String, ValidationIssues> {
        self.validate(value, location)
    }

    fn validate_to_value(
        &self,
        value: &Value,
        location: &Location,
    ) -> Validation<Value, ValidationIssues> {
        self.validate(value, location).map(Value::String)
    }
}

fn check_constraint(
    constraint: &StringConstraint,
    s: &str,
    location: &Location,
) -> Option<ValidationIssue> {
    let issue = |kind: &str, message: String| {
        ValidationIssue::new(kind, location.clone(), message, Value::from(s))
    };

    match constraint {
        StringConstraint::MinLength { min, message } => {
            if s.chars().count() >= *min {
                return None;
            }
            let msg = message.clone().unwrap_or_else(|| {
                format!("String should have at least {} {}", min, plural(*min))
            });
            Some(issue("string_too_short", msg).with_context("min_length", *min))
        }
        StringConstraint::MaxLength { max, message } => {
            if s.chars().count() <= *max {
                return None;
            }
            let msg = message.clone().unwrap_or_else(|| {
                format!("String should have at most {} {}", max, plural(*max))
            });
            Some(issue("string_too_long", msg).with_context("max_length", *max))
        }
        StringConstraint::Pattern { regex, message } => {
            if regex.is_match(s) {
                return None;
            }
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("String should match pattern '{}'", regex.as_str()));
            Some(issue("string_pattern_mismatch", msg).with_context("pattern", regex.as_str()))
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "character"
    } else {
        "characters"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_string() {
        let result = StringSchema::new().validate(&json!("hello"), &Location::root());
        assert_eq!(result.into_result().unwrap(), "hello");
    }

    #[test]
    fn test_rejects_non_string() {
        let issues = StringSchema::new()
            .validate(&json!(42), &Location::from_field("name"))
            .into_result()
            .unwrap_err();

        let issue = issues.first();
        assert_eq!(issue.kind, "string_type");
        assert_eq!(issue.location, Location::from_field("name"));
        assert_eq!(issue.input, json!(42));
    }

    #[test]
    fn test_length_counts_chars() {
        let schema = StringSchema::new().max_len(3);
        assert!(schema.validate(&json!("日本語"), &Location::root()).is_success());
    }

    #[test]
    fn test_too_short_message_and_context() {
        let issues = StringSchema::new()
            .min_len(1)
            .validate(&json!(""), &Location::root())
            .into_result()
            .unwrap_err();

        assert_eq!(issues.first().message, "String should have at least 1 character");
        assert_eq!(issues.first().context_value("min_length"), Some(&json!(1)));
    }

    #[test]
    fn test_pattern_mismatch() {
        let issues = StringSchema::new()
            .pattern(r"^\d+$")
            .unwrap()
            .validate(&json!("abc"), &Location::root())
            .into_result()
            .unwrap_err();

        assert_eq!(issues.first().kind, "string_pattern_mismatch");
        assert_eq!(issues.first().context_value("pattern"), Some(&json!(r"^\d+$")));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        assert!(StringSchema::new().pattern("(").is_err());
    }

    #[test]
    fn test_custom_message_applies_to_last_constraint() {
        let issues = StringSchema::new()
            .min_len(5)
            .error("username too short")
            .validate(&json!("hi"), &Location::root())
            .into_result()
            .unwrap_err();

        assert_eq!(issues.first().message, "username too short");
    }
}
