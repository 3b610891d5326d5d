//! Boolean, literal and unconstrained schemas.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{ValidationIssue, ValidationIssues};
use crate::path::Location;

use super::traits::SchemaLike;

/// A schema for booleans.
///
/// In lax mode the usual textual spellings (`"true"`, `"no"`, `"1"`, ...) and
/// the integers `0` and `1` are accepted as well.
#[derive(Clone, Default)]
pub struct BooleanSchema {
    strict: bool,
}

impl BooleanSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn validate(&self, value: &Value, location: &Location) -> Validation<bool, ValidationIssues> {
        let parsed = match value {
            Value::Bool(b) => Ok(*b),
            _ if self.strict => Err("bool_type"),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err("bool_parsing"),
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "on" | "1" => Ok(true),
                "false" | "f" | "no" | "n" | "off" | "0" => Ok(false),
                _ => Err("bool_parsing"),
            },
            _ => Err("bool_type"),
        };

        match parsed {
            Ok(b) => Validation::Success(b),
            Err(kind) => {
                let message = if kind == "bool_parsing" {
                    "Input should be a valid boolean, unable to interpret input"
                } else {
                    "Input should be a valid boolean"
                };
                Validation::Failure(ValidationIssues::single(ValidationIssue::new(
                    kind,
                    location.clone(),
                    message,
                    value.clone(),
                )))
            }
        }
    }
}

impl SchemaLike for BooleanSchema {
    type Output = bool;

    fn validate(&self, value: &Value, location: &Location) -> Validation<bool, ValidationIssues> {
        self.validate(value, location)
    }

    fn validate_to_value(
        &self,
        value: &Value,
        location: &Location,
    ) -> Validation<Value, ValidationIssues> {
        self.validate(value, location).map(Value::Bool)
    }
}

/// A schema accepting one of a fixed set of values.
///
/// ```rust
/// use safecall::{Location, Schema};
/// use serde_json::json;
///
/// let species = Schema::literal([json!("cat"), json!("dog")]);
///
/// let issues = species
///     .validate(&json!("turtle"), &Location::root())
///     .into_result()
///     .unwrap_err();
/// assert_eq!(issues.first().message, "Input should be \"cat\" or \"dog\"");
/// ```
#[derive(Clone)]
pub struct LiteralSchema {
    allowed: Vec<Value>,
}

impl LiteralSchema {
    pub fn new(allowed: impl IntoIterator<Item = Value>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn validate(&self, value: &Value, location: &Location) -> Validation<Value, ValidationIssues> {
        if self.allowed.contains(value) {
            return Validation::Success(value.clone());
        }
        let expected = self.expected();
        Validation::Failure(ValidationIssues::single(
            ValidationIssue::new(
                "literal_error",
                location.clone(),
                format!("Input should be {}", expected),
                value.clone(),
            )
            .with_context("expected", expected),
        ))
    }

    fn expected(&self) -> String {
        let rendered: Vec<String> = self.allowed.iter().map(Value::to_string).collect();
        match rendered.split_last() {
            None => "nothing".to_string(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        }
    }
}

impl SchemaLike for LiteralSchema {
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

/// Accepts any value unchanged.
#[derive(Clone, Copy, Default)]
pub struct AnySchema;

impl SchemaLike for AnySchema {
    type Output = Value;

    fn validate(&self, value: &Value, _location: &Location) -> Validation<Value, ValidationIssues> {
        Validation::Success(value.clone())
    }

    fn validate_to_value(
        &self,
        value: &Value,
        _location: &Location,
    ) -> Validation<Value, ValidationIssues> {
        Validation::Success(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kind_of(result: Validation<bool, ValidationIssues>) -> String {
        result.into_result().unwrap_err().first().kind.clone()
    }

    #[test]
    fn test_boolean_lax_spellings() {
        let schema = BooleanSchema::new();
        let root = Location::root();

        assert!(schema.validate(&json!("Yes"), &root).into_result().unwrap());
        assert!(!schema.validate(&json!(0), &root).into_result().unwrap());
        assert_eq!(kind_of(schema.validate(&json!("maybe"), &root)), "bool_parsing");
        assert_eq!(kind_of(schema.validate(&json!(2), &root)), "bool_parsing");
        assert_eq!(kind_of(schema.validate(&json!([]), &root)), "bool_type");
    }

    #[test]
    fn test_boolean_strict() {
        let schema = BooleanSchema::new().strict();
        assert_eq!(kind_of(schema.validate(&json!("true"), &Location::root())), "bool_type");
    }

    #[test]
    fn test_literal_accepts_member() {
        let schema = LiteralSchema::new([json!("cat"), json!("dog")]);
        assert!(schema.validate(&json!("dog"), &Location::root()).is_success());
    }

    #[test]
    fn test_literal_expected_rendering() {
        let three = LiteralSchema::new([json!(1), json!(2), json!(3)]);
        assert_eq!(three.expected(), "1, 2 or 3");

        let one = LiteralSchema::new([json!("x")]);
        assert_eq!(one.expected(), "\"x\"");
    }

    #[test]
    fn test_any_accepts_everything() {
        let result = AnySchema.validate(&json!({"k": [1, null]}), &Location::root());
        assert!(result.is_success());
    }
}
