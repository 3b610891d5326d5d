//! Faults raised by the body of a wrapped function.

use std::error::Error as StdError;
use std::fmt::{self, Display};

use crate::error::call::CallError;
use crate::error::capture_trace;
use crate::error::failure::ValidationFailure;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// An error raised by a wrapped function's body.
///
/// A fault has a `kind` name, which is what the wrapper's allow-list
/// ([`ExceptionFilter`](crate::ExceptionFilter)) matches against and what a
/// captured [`ErrorRecord`](crate::ErrorRecord) reports as `error_type`.
///
/// Any `std::error::Error` converts into a `Fault` with the error type's
/// short name as its kind, so `?` works inside bodies:
///
/// ```rust
/// use safecall::Fault;
///
/// fn parse(s: &str) -> Result<i64, Fault> {
///     Ok(s.parse::<i64>()?)
/// }
///
/// let fault = parse("x").unwrap_err();
/// assert_eq!(fault.kind(), "ParseIntError");
///
/// let named = Fault::new("NameError", "Captured");
/// assert_eq!(format!("{:?}", named), "NameError(\"Captured\")");
/// ```
///
/// `Fault` deliberately does not implement `std::error::Error` itself; that
/// is what makes the blanket conversion possible.
pub struct Fault {
    kind: String,
    message: String,
    source: Option<BoxError>,
    trace: String,
}

impl Fault {
    /// Creates a fault of an explicit kind.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            source: None,
            trace: capture_trace(),
        }
    }

    /// Wraps an error, naming the fault after the error's type.
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            kind: short_type_name::<E>().to_string(),
            message: error.to_string(),
            source: Some(Box::new(error)),
            trace: capture_trace(),
        }
    }

    /// Overrides the kind name, keeping message and source.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> &str {
        &self.trace
    }

    pub fn source(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Returns true if the wrapped source error is an `E`.
    pub fn is<E: StdError + 'static>(&self) -> bool {
        self.downcast_ref::<E>().is_some()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.source.as_deref().and_then(|e| e.downcast_ref::<E>())
    }

    /// The validation failure this fault wraps, for validation performed
    /// inside a body. Sees through a [`CallError`] propagated by a nested
    /// wrapped call.
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        if let Some(failure) = self.downcast_ref::<ValidationFailure>() {
            return Some(failure);
        }
        match self.downcast_ref::<CallError>()? {
            CallError::Validation(failure) => Some(failure),
            CallError::Fault(inner) => inner.as_validation(),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.as_validation().is_some()
    }

    /// Unwraps the inner validation failure, or returns the fault.
    ///
    /// A [`CallError`] propagated by a nested wrapped call is unpacked: its
    /// validation failure is returned, and its fault replaces this one so the
    /// original kind survives.
    pub fn into_validation(self) -> Result<ValidationFailure, Self> {
        let Fault {
            kind,
            message,
            source,
            trace,
        } = self;
        let rebuild = |source: Option<BoxError>| Fault {
            kind,
            message,
            source,
            trace,
        };
        let source = match source {
            Some(source) => source,
            None => return Err(rebuild(None)),
        };
        let source = match source.downcast::<ValidationFailure>() {
            Ok(failure) => return Ok(*failure),
            Err(source) => source,
        };
        match source.downcast::<CallError>() {
            Ok(nested) => match *nested {
                CallError::Validation(failure) => Ok(failure),
                CallError::Fault(inner) => inner.into_validation(),
                other => Err(rebuild(Some(Box::new(other)))),
            },
            Err(source) => Err(rebuild(Some(source))),
        }
    }
}

impl<E> From<E> for Fault
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Fault::from_error(error)
    }
}

impl Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind, self.message)
    }
}

/// Last path segment of a type name, without generic arguments.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::call::ModelError;
    use crate::error::issue::{ValidationIssue, ValidationIssues};
    use crate::path::Location;
    use serde_json::json;

    #[derive(Debug, thiserror::Error)]
    #[error("lookup of {0} failed")]
    struct LookupError(String);

    #[test]
    fn test_kind_from_error_type() {
        let fault = Fault::from(LookupError("x".into()));
        assert_eq!(fault.kind(), "LookupError");
        assert_eq!(fault.message(), "lookup of x failed");
        assert!(fault.is::<LookupError>());
    }

    #[test]
    fn test_with_kind_keeps_source() {
        let fault = Fault::from(LookupError("x".into())).with_kind("AttributeError");
        assert_eq!(fault.kind(), "AttributeError");
        assert!(fault.downcast_ref::<LookupError>().is_some());
    }

    #[test]
    fn test_explicit_fault_has_no_source() {
        let fault = Fault::new("ValueError", "Thrown");
        assert!(fault.source().is_none());
        assert_eq!(fault.to_string(), "Thrown");
    }

    #[test]
    fn test_into_validation_round_trips() {
        let failure = ValidationFailure::new(
            "A",
            ValidationIssues::single(ValidationIssue::new(
                "int_parsing",
                Location::from_field("a"),
                "bad",
                json!("x"),
            )),
        );
        let fault = Fault::from(failure.clone());
        assert!(fault.is_validation());

        let back = fault.into_validation().unwrap();
        assert_eq!(back, failure);
    }

    #[test]
    fn test_into_validation_rejects_other_faults() {
        let fault = Fault::new("NameError", "nope");
        let back = fault.into_validation().unwrap_err();
        assert_eq!(back.kind(), "NameError");
    }

    #[test]
    fn test_nested_call_error_unpacked() {
        let failure = ValidationFailure::new(
            "inner",
            ValidationIssues::single(ValidationIssue::new(
                "int_type",
                Location::root(),
                "bad",
                json!("foo"),
            )),
        );
        let nested = Fault::from(CallError::from(failure.clone()));
        assert_eq!(nested.kind(), "CallError");
        assert_eq!(nested.as_validation(), Some(&failure));
        assert_eq!(nested.into_validation().unwrap(), failure);

        let nested = Fault::from(CallError::from(Fault::new("NameError", "Captured")));
        let inner = nested.into_validation().unwrap_err();
        assert_eq!(inner.kind(), "NameError");
        assert_eq!(inner.message(), "Captured");
    }

    #[test]
    fn test_nested_model_error_keeps_outer_fault() {
        let nested = Fault::from(CallError::from(ModelError::NoMatchingMember("E".into())));
        assert!(!nested.is_validation());

        let back = nested.into_validation().unwrap_err();
        assert_eq!(back.kind(), "CallError");
        assert!(back.is::<CallError>());
    }

    #[test]
    fn test_short_type_name_strips_generics() {
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
        assert_eq!(short_type_name::<std::num::ParseIntError>(), "ParseIntError");
    }
}
