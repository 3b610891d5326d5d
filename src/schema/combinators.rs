//! Schema combinators.

use serde_json::Value;
use stillwater::prelude::*;
use stillwater::Validation;

use crate::error::ValidationIssues;
use crate::path::Location;

use super::traits::{SchemaLike, ValueValidator};

/// Accepts `null`, or whatever the inner schema accepts.
///
/// ```rust
/// use safecall::{Location, Schema};
/// use serde_json::json;
///
/// let context = Schema::nullable(Schema::string());
///
/// assert!(context.validate(&json!(null), &Location::root()).is_success());
/// assert!(context.validate(&json!("ctx"), &Location::root()).is_success());
/// assert!(context.validate(&json!(1), &Location::root()).is_failure());
/// ```
pub struct NullableSchema {
    inner: Box<dyn ValueValidator>,
}

impl NullableSchema {
    pub fn new<S>(inner: S) -> Self
    where
        S: ValueValidator + 'static,
    {
        Self {
            inner: Box::new(inner),
        }
    }

    pub fn validate(&self, value: &Value, location: &Location) -> Validation<Value, ValidationIssues> {
        if value.is_null() {
            Validation::Success(Value::Null)
        } else {
            self.inner.validate_value(value, location)
        }
    }
}

impl SchemaLike for NullableSchema {
    type Output = Value;

    fn validate(&self, value: &Value, location: &Location) -> Validation<Value, ValidationIssues> {
        self.validate(value, location)
    }

    fn validate_to_value(
        &self,
        value: &Value,
        location: &Location,
    ) -> Validation<Value, ValidationIssues> {
        self.validate(value, location)
    }
}

/// Accepts a value matching any of several schemas, tried in order.
///
/// When nothing matches, the issues of every alternative are reported.
pub struct AnyOfSchema {
    alternatives: Vec<Box<dyn ValueValidator>>,
}

impl AnyOfSchema {
    pub fn new(alternatives: Vec<Box<dyn ValueValidator>>) -> Self {
        Self { alternatives }
    }

    pub fn validate(&self, value: &Value, location: &Location) -> Validation<Value, ValidationIssues> {
        let mut collected: Option<ValidationIssues> = None;
        for alternative in &self.alternatives {
            match alternative.validate_value(value, location) {
                Validation::Success(v) => return Validation::Success(v),
                Validation::Failure(issues) => {
                    collected = Some(match collected {
                        Some(prev) => prev.combine(issues),
                        None => issues,
                    });
                }
            }
        }
        match collected {
            Some(issues) => Validation::Failure(issues),
            // No alternatives: nothing constrains the value.
            None => Validation::Success(value.clone()),
        }
    }
}

impl SchemaLike for AnyOfSchema {
    type Output = Value;

    fn validate(&self, value: &Value, location: &Location) -> Validation<Value, ValidationIssues> {
        self.validate(value, location)
    }

    fn validate_to_value(
        &self,
        value: &Value,
        location: &Location,
    ) -> Validation<Value, ValidationIssues> {
        self.validate(value, location)
    }
}
