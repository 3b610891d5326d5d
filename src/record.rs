//! The canonical error record.
//!
//! [`ErrorRecord`] is the structured description of one failed call. It is the
//! default error representation of a wrapper and the intermediate form every
//! other representation is built from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Fault, ValidationFailure, ValidationIssue};

/// `error_type` of records built from validation failures.
pub const VALIDATION_ERROR: &str = "ValidationError";

/// Canonical description of a failed call.
///
/// Field names are the wire contract for serialized failures. `error_tb`
/// holds a backtrace capture and differs between runs, so it takes no part in
/// equality.
///
/// # Example
///
/// ```rust
/// use safecall::ErrorRecord;
///
/// let record = ErrorRecord::from_exception("NameError", "Captured", "NameError(\"Captured\")", "");
///
/// assert_eq!(record.error_type, "NameError");
/// assert!(record.error_details.is_empty());
/// assert!(!record.is_validation());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Fault kind name, or `"ValidationError"`.
    pub error_type: String,
    /// Every validation issue, in validator order. Empty for body faults.
    pub error_details: Vec<ValidationIssue>,
    /// Human-readable description.
    pub error_str: String,
    /// Machine-oriented description.
    pub error_repr: String,
    /// Backtrace capture of the failure's origin.
    pub error_tb: String,
}

impl ErrorRecord {
    /// Builds a `ValidationError` record from validation issues.
    pub fn from_validation_failure(
        issues: impl IntoIterator<Item = ValidationIssue>,
        error_str: impl Into<String>,
        error_repr: impl Into<String>,
        error_tb: impl Into<String>,
    ) -> Self {
        Self {
            error_type: VALIDATION_ERROR.to_string(),
            error_details: issues.into_iter().collect(),
            error_str: error_str.into(),
            error_repr: error_repr.into(),
            error_tb: error_tb.into(),
        }
    }

    /// Builds a record for a non-validation failure. `error_details` is empty.
    pub fn from_exception(
        kind: impl Into<String>,
        error_str: impl Into<String>,
        error_repr: impl Into<String>,
        error_tb: impl Into<String>,
    ) -> Self {
        Self {
            error_type: kind.into(),
            error_details: Vec::new(),
            error_str: error_str.into(),
            error_repr: error_repr.into(),
            error_tb: error_tb.into(),
        }
    }

    /// Captures a validation failure: `Display` for `error_str`, `Debug` for
    /// `error_repr`, and the failure's own trace.
    pub fn from_failure(failure: &ValidationFailure) -> Self {
        Self::from_validation_failure(
            failure.issues().to_vec(),
            failure.to_string(),
            format!("{:?}", failure),
            failure.trace(),
        )
    }

    /// Captures a body fault.
    pub fn from_fault(fault: &Fault) -> Self {
        Self::from_exception(
            fault.kind(),
            fault.to_string(),
            format!("{:?}", fault),
            fault.trace(),
        )
    }

    pub fn is_validation(&self) -> bool {
        self.error_type == VALIDATION_ERROR
    }

    /// The canonical JSON form every error model is built from.
    pub fn to_value(&self) -> Value {
        Value::Object(
            [
                ("error_type", Value::from(self.error_type.as_str())),
                (
                    "error_details",
                    // Issues hold strings, string-keyed maps and JSON values,
                    // so converting them into a Value cannot fail.
                    Value::Array(
                        self.error_details
                            .iter()
                            .map(|issue| serde_json::to_value(issue).unwrap_or_default())
                            .collect(),
                    ),
                ),
                ("error_str", Value::from(self.error_str.as_str())),
                ("error_repr", Value::from(self.error_repr.as_str())),
                ("error_tb", Value::from(self.error_tb.as_str())),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        )
    }

    pub fn to_json_string(&self) -> String {
        self.to_value().to_string()
    }

    /// Pretty JSON limited to the given fields, in record order.
    pub fn to_json_pretty(&self, fields: &[&str]) -> String {
        let mut value = self.to_value();
        if let Value::Object(map) = &mut value {
            if !fields.is_empty() {
                map.retain(|k, _| fields.contains(&k.as_str()));
            }
        }
        // Serializing a Value into a String cannot fail.
        serde_json::to_string_pretty(&value).unwrap_or_default()
    }
}

impl PartialEq for ErrorRecord {
    fn eq(&self, other: &Self) -> bool {
        self.error_type == other.error_type
            && self.error_details == other.error_details
            && self.error_str == other.error_str
            && self.error_repr == other.error_repr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationIssues;
    use crate::path::Location;
    use serde_json::json;

    fn failure() -> ValidationFailure {
        ValidationFailure::new(
            "int_noop",
            ValidationIssues::single(ValidationIssue::new(
                "int_parsing",
                Location::from_field("a"),
                "Input should be a valid integer, unable to parse string as an integer",
                json!("A"),
            )),
        )
    }

    #[test]
    fn test_from_failure() {
        let record = ErrorRecord::from_failure(&failure());

        assert_eq!(record.error_type, "ValidationError");
        assert_eq!(record.error_details.len(), 1);
        assert_eq!(record.error_details[0].location, Location::from_field("a"));
        assert!(record.error_str.starts_with("1 validation error for int_noop"));
        assert!(record.error_repr.starts_with("ValidationFailure {"));
    }

    #[test]
    fn test_from_fault() {
        let record = ErrorRecord::from_fault(&Fault::new("ValueError", "L"));

        assert_eq!(record.error_type, "ValueError");
        assert!(record.error_details.is_empty());
        assert_eq!(record.error_str, "L");
        assert_eq!(record.error_repr, "ValueError(\"L\")");
    }

    #[test]
    fn test_equality_ignores_trace() {
        let a = ErrorRecord::from_exception("E", "s", "r", "trace one");
        let b = ErrorRecord::from_exception("E", "s", "r", "trace two");
        assert_eq!(a, b);
    }

    #[test]
    fn test_canonical_field_names() {
        let value = ErrorRecord::from_failure(&failure()).to_value();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();

        assert_eq!(
            keys,
            ["error_type", "error_details", "error_str", "error_repr", "error_tb"]
        );
        assert_eq!(value["error_details"][0]["loc"], json!(["a"]));
    }

    #[test]
    fn test_every_issue_in_canonical_form() {
        let issues = ValidationIssues::from_vec(vec![
            ValidationIssue::new("missing", Location::from_field("a"), "Field required", json!(null)),
            ValidationIssue::new(
                "string_too_short",
                Location::from_index(1).push_field("name"),
                "String should have at least 1 character",
                json!(""),
            )
            .with_context("min_length", 1),
        ])
        .unwrap();
        let record = ErrorRecord::from_failure(&ValidationFailure::new("f", issues));
        let value = record.to_value();

        let details = value["error_details"].as_array().unwrap();
        assert_eq!(details.len(), record.error_details.len());
        assert_eq!(details[1]["loc"], json!([1, "name"]));
        assert_eq!(details[1]["ctx"], json!({"min_length": 1}));
    }

    #[test]
    fn test_pretty_json_subset() {
        let record = ErrorRecord::from_failure(&failure());
        let text = record.to_json_pretty(&["error_type", "error_details"]);
        let parsed: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed.as_object().unwrap().len(), 2);
        assert_eq!(parsed["error_type"], "ValidationError");
    }

    #[test]
    fn test_serde_matches_canonical_form() {
        let record = ErrorRecord::from_failure(&failure());
        assert_eq!(serde_json::to_value(&record).unwrap(), record.to_value());
    }
}
