//! Array schema validation.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{ValidationIssue, ValidationIssues};
use crate::path::Location;

use super::finish;
use super::traits::{SchemaLike, ValueValidator};

/// A schema for arrays whose items all match one schema.
///
/// Item issues are located by index below the array's own location, and
/// every failing item is reported.
///
/// ```rust
/// use safecall::{Location, Schema};
/// use serde_json::json;
///
/// let ages = Schema::array(Schema::integer());
///
/// let issues = ages
///     .validate(&json!([1, "x", 3, "y"]), &Location::from_field("ages"))
///     .into_result()
///     .unwrap_err();
///
/// let locations: Vec<String> = issues.iter().map(|i| i.location.to_string()).collect();
/// assert_eq!(locations, ["ages.1", "ages.3"]);
/// ```
pub struct ArraySchema {
    item: Box<dyn ValueValidator>,
    min_items: Option<usize>,
    max_items: Option<usize>,
}

impl ArraySchema {
    pub fn new<S>(item: S) -> Self
    where
        S: ValueValidator + 'static,
    {
        Self {
            item: Box::new(item),
            min_items: None,
            max_items: None,
        }
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn validate(
        &self,
        value: &Value,
        location: &Location,
    ) -> Validation<Vec<Value>, ValidationIssues> {
        let items = match value.as_array() {
            Some(items) => items,
            None => {
                return Validation::Failure(ValidationIssues::single(ValidationIssue::new(
                    "list_type",
                    location.clone(),
                    "Input should be a valid list",
                    value.clone(),
                )))
            }
        };

        let mut issues = Vec::new();
        if let Some(min) = self.min_items.filter(|min| items.len() < *min) {
            issues.push(
                ValidationIssue::new(
                    "too_short",
                    location.clone(),
                    format!(
                        "List should have at least {} item{} after validation, not {}",
                        min,
                        if min == 1 { "" } else { "s" },
                        items.len()
                    ),
                    value.clone(),
                )
                .with_context("min_length", min)
                .with_context("actual_length", items.len()),
            );
        }
        if let Some(max) = self.max_items.filter(|max| items.len() > *max) {
            issues.push(
                ValidationIssue::new(
                    "too_long",
                    location.clone(),
                    format!(
                        "List should have at most {} item{} after validation, not {}",
                        max,
                        if max == 1 { "" } else { "s" },
                        items.len()
                    ),
                    value.clone(),
                )
                .with_context("max_length", max)
                .with_context("actual_length", items.len()),
            );
        }

        let mut validated = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match self.item.validate_value(item, &location.push_index(i)) {
                Validation::Success(v) => validated.push(v),
                Validation::Failure(e) => issues.extend(e),
            }
        }

        finish(validated, issues)
    }
}

impl SchemaLike for ArraySchema {
    type Output = Vec<Value>;

    fn validate(
        &self,
        value: &Value,
        location: &Location,
    ) -> Validation<Vec<Value>, ValidationIssues> {
        self.validate(value, location)
    }

    fn validate_to_value(
        &self,
        value: &Value,
        location: &Location,
    ) -> Validation<Value, ValidationIssues> {
        self.validate(value, location).map(Value::Array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    #[test]
    fn test_coerces_items() {
        let out = ArraySchema::new(Schema::integer())
            .validate(&json!(["1", 2]), &Location::root())
            .into_result()
            .unwrap();
        assert_eq!(out, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_rejects_non_array() {
        let issues = ArraySchema::new(Schema::integer())
            .validate(&json!({"0": 1}), &Location::root())
            .into_result()
            .unwrap_err();
        assert_eq!(issues.first().kind, "list_type");
    }

    #[test]
    fn test_length_bounds_with_item_issues() {
        let schema = ArraySchema::new(Schema::integer()).min_items(3);
        let issues = schema
            .validate(&json!(["x"]), &Location::root())
            .into_result()
            .unwrap_err();

        let kinds: Vec<_> = issues.iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(kinds, ["too_short", "int_parsing"]);
        assert_eq!(issues.first().context_value("actual_length"), Some(&json!(1)));
    }

    #[test]
    fn test_max_items() {
        let schema = ArraySchema::new(Schema::any()).max_items(1);
        let issues = schema
            .validate(&json!([1, 2]), &Location::root())
            .into_result()
            .unwrap_err();
        assert_eq!(issues.first().kind, "too_long");
    }
}
