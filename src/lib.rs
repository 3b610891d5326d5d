//! # Safecall
//!
//! Schema-validated function calls that hand failures back as values.
//!
//! ## Overview
//!
//! A wrapped function validates its arguments against a [`Signature`], runs
//! its body, optionally validates the return value, and returns an
//! [`Outcome`]: the body's value on success, or a structured error value on
//! failure. Which failures become values and which propagate unchanged is
//! decided per call from the wrapper's [`CallOptions`]; argument validation
//! failures are always captured.
//!
//! ## Core Types
//!
//! - [`SafeCall`] / [`SafeFn`]: the wrapper builder and the wrapped function
//! - [`ErrorRecord`]: the canonical description of a failed call
//! - [`ErrorSpec`]: how captured failures are represented (direct model,
//!   transformed model, or tagged union of models)
//! - [`ValidationIssue`]: one validation problem, located by a [`Location`]
//! - [`Schema`]: the bundled value validator used by signatures
//! - [`Observer`]: synchronous call notifications
//!
//! ## Example
//!
//! ```rust
//! use safecall::{BoundArgs, CallArgs, ExceptionFilter, Fault, SafeCall, Schema, Signature};
//!
//! let lookup = SafeCall::new(Signature::new("lookup").param("key", Schema::string()))
//!     .validate_body(true)
//!     .extra_exceptions(ExceptionFilter::kinds(["KeyError"]))
//!     .wrap(|args: &BoundArgs| -> Result<i64, Fault> {
//!         let key: String = args.parse("key")?;
//!         match key.as_str() {
//!             "answer" => Ok(42),
//!             other => Err(Fault::new("KeyError", format!("'{}'", other))),
//!         }
//!     })
//!     .unwrap();
//!
//! let found = lookup.call(&CallArgs::new().arg("answer")).unwrap();
//! assert_eq!(found.success(), Some(42));
//!
//! let missing = lookup.call(&CallArgs::new().arg("question")).unwrap();
//! let record = missing.failure().unwrap();
//! assert_eq!(record.error_type, "KeyError");
//! assert!(record.error_details.is_empty());
//! ```

pub mod error;
pub mod observe;
pub mod outcome;
pub mod path;
pub mod record;
pub mod representation;
pub mod schema;
pub mod signature;
pub mod wrapper;

pub use error::{
    CallError, ConfigError, Fault, ModelError, ObserverError, ValidationFailure, ValidationIssue,
    ValidationIssues, ValidationPhase,
};
pub use observe::{Observation, ObservationLog, Observer, TracingObserver};
pub use outcome::Outcome;
pub use path::{Location, PathSegment};
pub use record::{ErrorRecord, VALIDATION_ERROR};
pub use representation::{
    Discriminant, ErrorModel, ErrorRepresentation, ErrorSpec, RepresentationKind, UnionSpec,
};
pub use schema::{
    AnyOfSchema, AnySchema, ArraySchema, BooleanSchema, IntegerSchema, LiteralSchema,
    NullableSchema, ObjectSchema, Schema, SchemaLike, StringSchema, ValueValidator,
};
pub use signature::{BoundArgs, CallArgs, Signature};
pub use wrapper::{CallOptions, CallState, Disposition, ExceptionFilter, SafeCall, SafeFn};

/// Type alias for validation results using ValidationIssues
pub type ValidationResult<T> = stillwater::Validation<T, ValidationIssues>;
