//! Validation issue types.
//!
//! This module provides [`ValidationIssue`] for a single schema violation and
//! [`ValidationIssues`] for accumulating every violation found in one pass.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stillwater::prelude::*;

use crate::path::Location;

/// A single schema violation.
///
/// `ValidationIssue` is produced by the value validator and carried verbatim
/// into [`ErrorRecord::error_details`](crate::ErrorRecord). Its serialized
/// field names (`type`, `loc`, `msg`, `input`, `ctx`) are a wire contract
/// shared with downstream consumers of captured failures.
///
/// # Example
///
/// ```rust
/// use safecall::{Location, ValidationIssue};
/// use serde_json::json;
///
/// let issue = ValidationIssue::new(
///     "int_parsing",
///     Location::from_field("a"),
///     "Input should be a valid integer, unable to parse string as an integer",
///     json!("A"),
/// );
///
/// let wire = serde_json::to_value(&issue).unwrap();
/// assert_eq!(wire["type"], "int_parsing");
/// assert_eq!(wire["loc"], json!(["a"]));
/// assert!(wire.get("ctx").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Machine-readable discriminant (e.g. `int_parsing`, `missing`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Path from the root input to the offending value.
    #[serde(rename = "loc")]
    pub location: Location,
    /// Human-readable description.
    #[serde(rename = "msg")]
    pub message: String,
    /// The value that failed validation.
    pub input: Value,
    /// Constraint parameters, e.g. `{"min_length": 3}`.
    #[serde(rename = "ctx", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

impl ValidationIssue {
    pub fn new(
        kind: impl Into<String>,
        location: Location,
        message: impl Into<String>,
        input: Value,
    ) -> Self {
        Self {
            kind: kind.into(),
            location,
            message: message.into(),
            input,
            context: None,
        }
    }

    /// Adds one context entry and returns self for chaining.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Returns the context value stored under `key`, if any.
    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.as_ref().and_then(|ctx| ctx.get(key))
    }
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.location.is_root() {
            writeln!(f, "{}", self.location)?;
        }
        write!(
            f,
            "  {} [type={}, input_value={}, input_type={}]",
            self.message,
            self.kind,
            self.input,
            json_type_name(&self.input)
        )
    }
}

// Issues cross thread boundaries inside captured records.
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationIssue>();
    assert_sync::<ValidationIssue>();
};

/// A non-empty, ordered collection of validation issues.
///
/// Wraps a `NonEmptyVec` so a failed validation always carries at least one
/// issue. Collections from independent checks merge through `Semigroup`,
/// preserving order.
///
/// ```rust
/// use safecall::{Location, ValidationIssue, ValidationIssues};
/// use serde_json::json;
/// use stillwater::prelude::*;
///
/// let a = ValidationIssues::single(ValidationIssue::new(
///     "missing", Location::from_field("a"), "Missing required argument", json!(null),
/// ));
/// let b = ValidationIssues::single(ValidationIssue::new(
///     "int_type", Location::from_field("b"), "Input should be a valid integer", json!([]),
/// ));
///
/// assert_eq!(a.combine(b).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssues(NonEmptyVec<ValidationIssue>);

impl ValidationIssues {
    pub fn single(issue: ValidationIssue) -> Self {
        Self(NonEmptyVec::singleton(issue))
    }

    /// Builds a collection from a vec, or `None` if the vec is empty.
    pub fn from_vec(issues: Vec<ValidationIssue>) -> Option<Self> {
        NonEmptyVec::from_vec(issues).map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.0.iter()
    }

    pub fn first(&self) -> &ValidationIssue {
        self.0.head()
    }

    /// Returns every issue located exactly at `location`.
    pub fn at(&self, location: &Location) -> Vec<&ValidationIssue> {
        self.0.iter().filter(|i| &i.location == location).collect()
    }

    /// Returns every issue of the given kind.
    pub fn of_kind(&self, kind: &str) -> Vec<&ValidationIssue> {
        self.0.iter().filter(|i| i.kind == kind).collect()
    }

    pub fn to_vec(&self) -> Vec<ValidationIssue> {
        self.0.iter().cloned().collect()
    }

    pub fn into_vec(self) -> Vec<ValidationIssue> {
        self.0.into_vec()
    }
}

impl Semigroup for ValidationIssues {
    fn combine(self, other: Self) -> Self {
        ValidationIssues(self.0.combine(other.0))
    }
}

impl Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationIssues {}

impl IntoIterator for ValidationIssues {
    type Item = ValidationIssue;
    type IntoIter = std::vec::IntoIter<ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

/// Name of a JSON value's type, as reported in `input_type`.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
