//! The value validator behind signature and return validation.
//!
//! Schemas validate `serde_json::Value`s and accumulate every issue rather
//! than stopping at the first. Issue kinds and messages follow a fixed
//! vocabulary (`int_parsing`, `missing`, `string_type`, ...) so captured
//! failures stay comparable across producers.
//!
//! # Example
//!
//! ```rust
//! use safecall::{Location, Schema};
//! use serde_json::json;
//!
//! let event = Schema::object()
//!     .named("Event")
//!     .field("id", Schema::integer())
//!     .field("name", Schema::string().min_len(1));
//!
//! let result = event.validate(&json!({"id": "x", "name": ""}), &Location::from_index(0));
//! assert_eq!(result.into_result().unwrap_err().len(), 2);
//! ```

mod array;
mod combinators;
mod numeric;
mod object;
mod scalar;
mod string;
mod traits;

pub use array::ArraySchema;
pub use combinators::{AnyOfSchema, NullableSchema};
pub use numeric::IntegerSchema;
pub use object::ObjectSchema;
pub use scalar::{AnySchema, BooleanSchema, LiteralSchema};
pub use string::StringSchema;
pub use traits::{SchemaLike, ValueValidator};

use serde_json::Value;
use stillwater::Validation;

use crate::error::{ValidationIssue, ValidationIssues};

/// Entry point for creating schemas.
pub struct Schema;

impl Schema {
    /// Integers; lax by default (numeric strings and integral floats coerce).
    pub fn integer() -> IntegerSchema {
        IntegerSchema::new()
    }

    pub fn string() -> StringSchema {
        StringSchema::new()
    }

    pub fn boolean() -> BooleanSchema {
        BooleanSchema::new()
    }

    /// One of the given values, compared structurally.
    pub fn literal(allowed: impl IntoIterator<Item = Value>) -> LiteralSchema {
        LiteralSchema::new(allowed)
    }

    pub fn array<S>(item: S) -> ArraySchema
    where
        S: ValueValidator + 'static,
    {
        ArraySchema::new(item)
    }

    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }

    pub fn nullable<S>(inner: S) -> NullableSchema
    where
        S: ValueValidator + 'static,
    {
        NullableSchema::new(inner)
    }

    pub fn any_of(alternatives: Vec<Box<dyn ValueValidator>>) -> AnyOfSchema {
        AnyOfSchema::new(alternatives)
    }

    pub fn any() -> AnySchema {
        AnySchema
    }
}

/// Success with `value` if no issues were collected.
pub(crate) fn finish<T>(value: T, issues: Vec<ValidationIssue>) -> Validation<T, ValidationIssues> {
    match ValidationIssues::from_vec(issues) {
        Some(issues) => Validation::Failure(issues),
        None => Validation::Success(value),
    }
}
