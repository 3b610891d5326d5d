//! Object schema validation.
//!
//! This module provides [`ObjectSchema`] for validating JSON objects with
//! required, optional and defaulted fields.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{ValidationIssue, ValidationIssues};
use crate::path::Location;

use super::finish;
use super::traits::{SchemaLike, ValueValidator};

struct FieldDef {
    schema: Box<dyn ValueValidator>,
    required: bool,
    default: Option<Value>,
}

/// A schema for JSON objects.
///
/// Fields are validated in declaration order and all issues are accumulated.
/// Unknown fields pass through unchanged unless
/// [`deny_extra`](ObjectSchema::deny_extra) is set.
///
/// # Example
///
/// ```rust
/// use safecall::{Location, Schema};
/// use serde_json::json;
///
/// let pet = Schema::object()
///     .named("Pet")
///     .field("animal", Schema::string())
///     .field("age", Schema::integer());
///
/// let issues = pet
///     .validate(&json!({"animal": "turtle"}), &Location::from_field("pet"))
///     .into_result()
///     .unwrap_err();
///
/// assert_eq!(issues.first().kind, "missing");
/// assert_eq!(issues.first().location.to_string(), "pet.age");
/// ```
pub struct ObjectSchema {
    name: Option<String>,
    fields: IndexMap<String, FieldDef>,
    deny_extra: bool,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self {
            name: None,
            fields: IndexMap::new(),
            deny_extra: false,
        }
    }

    /// Names the object type; non-objects are then reported as `model_type`.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a required field.
    pub fn field<S>(self, name: impl Into<String>, schema: S) -> Self
    where
        S: ValueValidator + 'static,
    {
        self.insert(name.into(), Box::new(schema), true, None)
    }

    /// Adds a field that may be absent.
    pub fn optional<S>(self, name: impl Into<String>, schema: S) -> Self
    where
        S: ValueValidator + 'static,
    {
        self.insert(name.into(), Box::new(schema), false, None)
    }

    /// Adds a field that takes `default` when absent. Defaults are not
    /// validated.
    pub fn default<S>(self, name: impl Into<String>, schema: S, default: Value) -> Self
    where
        S: ValueValidator + 'static,
    {
        self.insert(name.into(), Box::new(schema), false, Some(default))
    }

    /// Rejects fields that are not declared (`extra_forbidden`).
    pub fn deny_extra(mut self) -> Self {
        self.deny_extra = true;
        self
    }

    fn insert(
        mut self,
        name: String,
        schema: Box<dyn ValueValidator>,
        required: bool,
        default: Option<Value>,
    ) -> Self {
        self.fields.insert(
            name,
            FieldDef {
                schema,
                required,
                default,
            },
        );
        self
    }

    pub fn validate(
        &self,
        value: &Value,
        location: &Location,
    ) -> Validation<Map<String, Value>, ValidationIssues> {
        let obj = match value.as_object() {
            Some(o) => o,
            None => {
                return Validation::Failure(ValidationIssues::single(
                    self.type_issue(value, location),
                ))
            }
        };

        let mut issues = Vec::new();
        let mut validated = Map::new();

        for (name, def) in &self.fields {
            let field_location = location.push_field(name);
            match obj.get(name) {
                Some(field_value) => match def.schema.validate_value(field_value, &field_location) {
                    Validation::Success(v) => {
                        validated.insert(name.clone(), v);
                    }
                    Validation::Failure(e) => issues.extend(e),
                },
                None if def.required => issues.push(ValidationIssue::new(
                    "missing",
                    field_location,
                    "Field required",
                    value.clone(),
                )),
                None => {
                    if let Some(default) = &def.default {
                        validated.insert(name.clone(), default.clone());
                    }
                }
            }
        }

        for (key, extra) in obj {
            if self.fields.contains_key(key) {
                continue;
            }
            if self.deny_extra {
                issues.push(ValidationIssue::new(
                    "extra_forbidden",
                    location.push_field(key),
                    "Extra inputs are not permitted",
                    extra.clone(),
                ));
            } else {
                validated.insert(key.clone(), extra.clone());
            }
        }

        finish(validated, issues)
    }

    fn type_issue(&self, value: &Value, location: &Location) -> ValidationIssue {
        match &self.name {
            Some(name) => ValidationIssue::new(
                "model_type",
                location.clone(),
                format!("Input should be a valid dictionary or instance of {}", name),
                value.clone(),
            )
            .with_context("class_name", name.as_str()),
            None => ValidationIssue::new(
                "dict_type",
                location.clone(),
                "Input should be a valid dictionary",
                value.clone(),
            ),
        }
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for ObjectSchema {
    type Output = Map<String, Value>;

    fn validate(
        &self,
        value: &Value,
        location: &Location,
    ) -> Validation<Map<String, Value>, ValidationIssues> {
        self.validate(value, location)
    }

    fn validate_to_value(
        &self,
        value: &Value,
        location: &Location,
    ) -> Validation<Value, ValidationIssues> {
        self.validate(value, location).map(Value::Object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    fn person() -> ObjectSchema {
        Schema::object()
            .named("Person")
            .field("name", Schema::string())
            .field("age", Schema::integer())
            .default("role", Schema::string(), json!("user"))
    }

    #[test]
    fn test_valid_object_with_default() {
        let out = person()
            .validate(&json!({"name": "A", "age": "3"}), &Location::root())
            .into_result()
            .unwrap();

        assert_eq!(out["age"], json!(3));
        assert_eq!(out["role"], json!("user"));
    }

    #[test]
    fn test_accumulates_field_issues() {
        let issues = person()
            .validate(&json!({"age": "old"}), &Location::from_index(0))
            .into_result()
            .unwrap_err();

        let kinds: Vec<_> = issues.iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(kinds, ["missing", "int_parsing"]);
        assert_eq!(issues.first().location.to_string(), "0.name");
    }

    #[test]
    fn test_named_type_error() {
        let issues = person()
            .validate(&json!("nope"), &Location::root())
            .into_result()
            .unwrap_err();

        assert_eq!(issues.first().kind, "model_type");
        assert_eq!(issues.first().context_value("class_name"), Some(&json!("Person")));
    }

    #[test]
    fn test_anonymous_type_error() {
        let issues = Schema::object()
            .validate(&json!(1), &Location::root())
            .into_result()
            .unwrap_err();
        assert_eq!(issues.first().kind, "dict_type");
    }

    #[test]
    fn test_extra_fields() {
        let loose = Schema::object().field("a", Schema::integer());
        let out = loose
            .validate(&json!({"a": 1, "b": 2}), &Location::root())
            .into_result()
            .unwrap();
        assert_eq!(out["b"], json!(2));

        let strict = Schema::object().field("a", Schema::integer()).deny_extra();
        let issues = strict
            .validate(&json!({"a": 1, "b": 2}), &Location::root())
            .into_result()
            .unwrap_err();
        assert_eq!(issues.first().kind, "extra_forbidden");
        assert_eq!(issues.first().location, Location::from_field("b"));
    }

    #[test]
    fn test_nested_locations() {
        let event = Schema::object().field(
            "user",
            Schema::object().field("pet", Schema::object().field("age", Schema::integer())),
        );
        let issues = event
            .validate(&json!({"user": {"pet": {"age": "x"}}}), &Location::from_index(0))
            .into_result()
            .unwrap_err();

        assert_eq!(issues.first().location.to_string(), "0.user.pet.age");
    }
}
