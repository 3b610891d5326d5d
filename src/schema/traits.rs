//! Traits for schema polymorphism.
//!
//! [`SchemaLike`] lets schemas with different output types be composed, and
//! [`ValueValidator`] erases the output type so heterogeneous schemas can sit
//! side by side in a signature or an object schema.

use serde_json::Value;
use stillwater::Validation;

use crate::error::ValidationIssues;
use crate::path::Location;

/// A schema that validates JSON values.
///
/// Implementations accumulate every issue they find instead of stopping at the
/// first one. The `Send + Sync` bounds let a validated signature be shared by
/// concurrent calls.
pub trait SchemaLike: Send + Sync {
    /// The value produced by successful validation.
    type Output;

    /// Validates `value`, reporting issues relative to `location`.
    fn validate(&self, value: &Value, location: &Location)
        -> Validation<Self::Output, ValidationIssues>;

    /// Validates `value` and returns the (possibly coerced) value as JSON.
    fn validate_to_value(&self, value: &Value, location: &Location)
        -> Validation<Value, ValidationIssues>;
}

/// A type-erased schema producing JSON values.
///
/// Every [`SchemaLike`] is a `ValueValidator`:
///
/// ```rust
/// use safecall::{Schema, ValueValidator};
///
/// let validators: Vec<Box<dyn ValueValidator>> = vec![
///     Box::new(Schema::string().min_len(1)),
///     Box::new(Schema::integer()),
/// ];
/// assert_eq!(validators.len(), 2);
/// ```
pub trait ValueValidator: Send + Sync {
    fn validate_value(&self, value: &Value, location: &Location)
        -> Validation<Value, ValidationIssues>;
}

impl<S: SchemaLike> ValueValidator for S {
    fn validate_value(
        &self,
        value: &Value,
        location: &Location,
    ) -> Validation<Value, ValidationIssues> {
        self.validate_to_value(value, location)
    }
}
