//! Integration tests for the bundled value validator.

use safecall::{Location, Schema, SchemaLike, ValueValidator};
use serde_json::json;

fn kinds<T>(result: stillwater::Validation<T, safecall::ValidationIssues>) -> Vec<String> {
    result
        .into_result()
        .err()
        .map(|issues| issues.iter().map(|i| i.kind.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn test_event_schema_accumulates_everything() {
    let event = Schema::object()
        .named("Event")
        .field("id", Schema::integer().positive())
        .field("tags", Schema::array(Schema::string().min_len(1)).max_items(2))
        .optional("note", Schema::nullable(Schema::string()))
        .deny_extra();

    let result = event.validate(
        &json!({"id": -1, "tags": ["", "ok", ""], "note": 5, "extra": true}),
        &Location::root(),
    );

    assert_eq!(
        kinds(result),
        [
            "greater_than",
            "too_long",
            "string_too_short",
            "string_too_short",
            "string_type",
            "extra_forbidden"
        ]
    );
}

#[test]
fn test_valid_event_is_normalized() {
    let event = Schema::object()
        .field("id", Schema::integer())
        .field("flag", Schema::boolean())
        .default("kind", Schema::literal([json!("a"), json!("b")]), json!("a"));

    let out = event
        .validate(&json!({"id": "7", "flag": "yes"}), &Location::root())
        .into_result()
        .unwrap();

    assert_eq!(serde_json::Value::Object(out), json!({"id": 7, "flag": true, "kind": "a"}));
}

#[test]
fn test_any_of_through_trait_objects() {
    let id: Box<dyn ValueValidator> = Box::new(Schema::any_of(vec![
        Box::new(Schema::integer().strict()) as Box<dyn ValueValidator>,
        Box::new(Schema::string().pattern(r"^[a-z]+-\d+$").unwrap()) as Box<dyn ValueValidator>,
    ]));

    assert!(id.validate_value(&json!(4), &Location::root()).is_success());
    assert!(id.validate_value(&json!("ab-12"), &Location::root()).is_success());

    let issues = id
        .validate_value(&json!("12"), &Location::from_field("id"))
        .into_result()
        .unwrap_err();
    let found: Vec<_> = issues.iter().map(|i| i.kind.as_str()).collect();
    assert_eq!(found, ["int_type", "string_pattern_mismatch"]);
}

#[test]
fn test_generic_schema_use() {
    fn validate_all<S: SchemaLike>(schema: &S, values: &[serde_json::Value]) -> usize {
        values
            .iter()
            .filter(|v| schema.validate(v, &Location::root()).is_failure())
            .count()
    }

    let failures = validate_all(&Schema::integer().range(1..=10), &[json!(0), json!(5), json!(11)]);
    assert_eq!(failures, 2);
}
