//! Integer schema validation.
//!
//! This module provides [`IntegerSchema`], which accepts integers and, unless
//! switched to strict mode, values that unambiguously denote one: integral
//! floats and numeric strings.

use serde_json::Value;
use std::ops::RangeInclusive;
use stillwater::Validation;

use crate::error::{ValidationIssue, ValidationIssues};
use crate::path::Location;

use super::finish;
use super::traits::SchemaLike;

/// A bound applied to integer values.
#[derive(Clone)]
enum IntegerConstraint {
    Ge { value: i64, message: Option<String> },
    Le { value: i64, message: Option<String> },
    Gt { value: i64, message: Option<String> },
}

/// A schema for integer values.
///
/// # Example
///
/// ```rust
/// use safecall::{Location, Schema};
/// use serde_json::json;
///
/// let schema = Schema::integer().min(0).max(100);
///
/// assert!(schema.validate(&json!(50), &Location::root()).is_success());
/// // Numeric strings are coerced in lax mode
/// assert!(schema.validate(&json!("42"), &Location::root()).is_success());
///
/// let issues = schema
///     .validate(&json!("A"), &Location::from_field("a"))
///     .into_result()
///     .unwrap_err();
/// assert_eq!(issues.first().kind, "int_parsing");
/// ```
#[derive(Clone, Default)]
pub struct IntegerSchema {
    constraints: Vec<IntegerConstraint>,
    strict: bool,
    type_error_message: Option<String>,
}

impl IntegerSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects anything that is not already a JSON integer.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Inclusive lower bound (`greater_than_equal`).
    pub fn min(mut self, value: i64) -> Self {
        self.constraints.push(IntegerConstraint::Ge {
            value,
            message: None,
        });
        self
    }

    /// Inclusive upper bound (`less_than_equal`).
    pub fn max(mut self, value: i64) -> Self {
        self.constraints.push(IntegerConstraint::Le {
            value,
            message: None,
        });
        self
    }

    pub fn range(self, range: RangeInclusive<i64>) -> Self {
        self.min(*range.start()).max(*range.end())
    }

    /// Strictly greater than zero (`greater_than`).
    pub fn positive(mut self) -> Self {
        self.constraints.push(IntegerConstraint::Gt {
            value: 0,
            message: None,
        });
        self
    }

    /// Sets a custom message for the most recent constraint, or for type
    /// errors if no constraint has been added yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.constraints.last_mut() {
            Some(IntegerConstraint::Ge { message: m, .. })
            | Some(IntegerConstraint::Le { message: m, .. })
            | Some(IntegerConstraint::Gt { message: m, .. }) => *m = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    pub fn validate(&self, value: &Value, location: &Location) -> Validation<i64, ValidationIssues> {
        let n = match self.coerce(value) {
            Ok(n) => n,
            Err((kind, default_message)) => {
                let message = self
                    .type_error_message
                    .clone()
                    .unwrap_or_else(|| default_message.to_string());
                return Validation::Failure(ValidationIssues::single(ValidationIssue::new(
                    kind,
                    location.clone(),
                    message,
                    value.clone(),
                )));
            }
        };

        let issues: Vec<ValidationIssue> = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, n, value, location))
            .collect();

        finish(n, issues)
    }

    fn coerce(&self, value: &Value) -> Result<i64, (&'static str, &'static str)> {
        const INT_TYPE: (&str, &str) = ("int_type", "Input should be a valid integer");

        match value {
            Value::Number(num) => {
                if let Some(n) = num.as_i64() {
                    return Ok(n);
                }
                if num.as_u64().is_some() {
                    return Err((
                        "int_parsing_size",
                        "Unable to parse input string as an integer, exceeded maximum size",
                    ));
                }
                if self.strict {
                    return Err(INT_TYPE);
                }
                match num.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                    _ => Err((
                        "int_from_float",
                        "Input should be a valid integer, got a number with a fractional part",
                    )),
                }
            }
            Value::String(s) if !self.strict => s.trim().parse::<i64>().map_err(|_| {
                (
                    "int_parsing",
                    "Input should be a valid integer, unable to parse string as an integer",
                )
            }),
            Value::Bool(b) if !self.strict => Ok(i64::from(*b)),
            _ => Err(INT_TYPE),
        }
    }
}

impl SchemaLike for IntegerSchema {
    type Output = i64;

    fn validate(&self, value: &Value, location: &Location) -> Validation<i64, ValidationIssues> {
        self.validate(value, location)
    }

    fn validate_to_value(
        &self,
        value: &Value,
        location: &Location,
    ) -> Validation<Value, ValidationIssues> {
        self.validate(value, location).map(Value::from)
    }
}

fn check_constraint(
    constraint: &IntegerConstraint,
    n: i64,
    input: &Value,
    location: &Location,
) -> Option<ValidationIssue> {
    let (kind, key, bound, message, violated) = match constraint {
        IntegerConstraint::Ge { value, message } => {
            ("greater_than_equal", "ge", *value, message, n < *value)
        }
        IntegerConstraint::Le { value, message } => {
            ("less_than_equal", "le", *value, message, n > *value)
        }
        IntegerConstraint::Gt { value, message } => {
            ("greater_than", "gt", *value, message, n <= *value)
        }
    };
    if !violated {
        return None;
    }

    let relation = match key {
        "ge" => "greater than or equal to",
        "le" => "less than or equal to",
        _ => "greater than",
    };
    let msg = message
        .clone()
        .unwrap_or_else(|| format!("Input should be {} {}", relation, bound));
    Some(
        ValidationIssue::new(kind, location.clone(), msg, input.clone()).with_context(key, bound),
    )
}
