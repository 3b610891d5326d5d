//! Error representation resolution.
//!
//! A wrapper does not hand back [`ErrorRecord`]s directly; it hands back
//! whatever error type the caller configured. [`ErrorSpec`] is that
//! configuration and [`ErrorRepresentation`] is its resolved form, produced
//! once when the wrapper is created and shared by every call.
//!
//! Three shapes are supported:
//!
//! - **Direct**: one [`ErrorModel`] built straight from the record.
//! - **Transformed**: a model built from the record, then passed through a
//!   registered transform whose result is the outcome value.
//! - **Tagged union**: several models, each declaring which `error_type`
//!   values it accepts; the record is dispatched to the first member that
//!   accepts it.
//!
//! # Example
//!
//! ```rust
//! use safecall::{Discriminant, ErrorModel, ErrorRecord, ErrorSpec};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct InvalidInput {
//!     error_type: String,
//! }
//!
//! impl ErrorModel for InvalidInput {
//!     fn discriminant() -> Option<Discriminant> {
//!         Some(Discriminant::OneOf(&["ValidationError"]))
//!     }
//! }
//!
//! #[derive(Debug)]
//! enum Failure {
//!     Invalid(InvalidInput),
//!     Other(ErrorRecord),
//! }
//!
//! let representation = ErrorSpec::union()
//!     .member(Failure::Invalid)
//!     .member(Failure::Other)
//!     .resolve()
//!     .unwrap();
//!
//! let record = ErrorRecord::from_exception("KeyError", "'x'", "KeyError('x')", "");
//! assert!(matches!(representation.construct(&record), Ok(Failure::Other(_))));
//! ```

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{short_type_name, ConfigError, ModelError};
use crate::record::ErrorRecord;

/// Builds an error value from a captured record.
pub type Construct<E> = Arc<dyn Fn(&ErrorRecord) -> Result<E, ModelError> + Send + Sync>;

/// The `error_type` values an error model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discriminant {
    /// Any `error_type`; the canonical record declares this.
    Any,
    /// Exactly the listed values.
    OneOf(&'static [&'static str]),
}

impl Discriminant {
    pub fn accepts(&self, error_type: &str) -> bool {
        match self {
            Discriminant::Any => true,
            Discriminant::OneOf(values) => values.contains(&error_type),
        }
    }

    fn is_declared(&self) -> bool {
        match self {
            Discriminant::Any => true,
            Discriminant::OneOf(values) => !values.is_empty(),
        }
    }
}

/// A type a captured failure can be represented as.
///
/// The default constructor deserializes the record's canonical JSON form
/// ([`ErrorRecord::to_value`]), so a model may declare any subset of the
/// record's fields. Models used as tagged-union members must also declare the
/// `error_type` values they accept.
pub trait ErrorModel: DeserializeOwned {
    /// The `error_type` values this model accepts, if it declares them.
    fn discriminant() -> Option<Discriminant> {
        None
    }

    fn from_record(record: &ErrorRecord) -> Result<Self, ModelError> {
        serde_json::from_value(record.to_value()).map_err(|source| ModelError::Deserialize {
            model: short_type_name::<Self>(),
            source,
        })
    }
}

impl ErrorModel for ErrorRecord {
    fn discriminant() -> Option<Discriminant> {
        Some(Discriminant::Any)
    }

    fn from_record(record: &ErrorRecord) -> Result<Self, ModelError> {
        Ok(record.clone())
    }
}

/// A union member before resolution.
struct MemberSpec<E> {
    model: &'static str,
    discriminant: Option<Discriminant>,
    construct: Construct<E>,
}

enum SpecKind<E> {
    Direct {
        model: &'static str,
        construct: Construct<E>,
    },
    Transformed {
        model: &'static str,
        construct: Construct<E>,
    },
    Union(Vec<MemberSpec<E>>),
}

/// The error representation a wrapper is configured with.
///
/// Resolved into an [`ErrorRepresentation`] by [`ErrorSpec::resolve`], which
/// [`SafeCall::wrap`](crate::SafeCall::wrap) calls once.
pub struct ErrorSpec<E> {
    kind: SpecKind<E>,
}

impl ErrorSpec<ErrorRecord> {
    /// The canonical record, used when nothing else is configured.
    pub fn record() -> Self {
        Self::model()
    }
}

impl<M: ErrorModel + 'static> ErrorSpec<M> {
    /// Direct representation as `M`.
    pub fn model() -> Self {
        Self {
            kind: SpecKind::Direct {
                model: short_type_name::<M>(),
                construct: Arc::new(|record: &ErrorRecord| M::from_record(record)),
            },
        }
    }
}

impl<E: 'static> ErrorSpec<E> {
    /// Builds an `M` from the record, then hands `transform(m)` back as the
    /// error value.
    ///
    /// ```rust
    /// use safecall::{ErrorRecord, ErrorSpec};
    ///
    /// // Failures surface as JSON strings.
    /// let spec: ErrorSpec<String> = ErrorSpec::transformed(|r: ErrorRecord| r.to_json_string());
    /// let repr = spec.resolve().unwrap();
    ///
    /// let record = ErrorRecord::from_exception("ValueError", "L", "ValueError('L')", "");
    /// assert!(repr.construct(&record).unwrap().contains("\"error_type\":\"ValueError\""));
    /// ```
    pub fn transformed<M, F>(transform: F) -> Self
    where
        M: ErrorModel + 'static,
        F: Fn(M) -> E + Send + Sync + 'static,
    {
        Self {
            kind: SpecKind::Transformed {
                model: short_type_name::<M>(),
                construct: Arc::new(move |record: &ErrorRecord| {
                    M::from_record(record).map(&transform)
                }),
            },
        }
    }

    /// Starts a tagged union.
    pub fn union() -> UnionSpec<E> {
        UnionSpec {
            members: Vec::new(),
        }
    }

    /// Resolves the configuration, failing fast on malformed unions.
    pub fn resolve(self) -> Result<ErrorRepresentation<E>, ConfigError> {
        match self.kind {
            SpecKind::Direct { model, construct } => {
                Ok(ErrorRepresentation::Direct { model, construct })
            }
            SpecKind::Transformed { model, construct } => {
                Ok(ErrorRepresentation::Transformed { model, construct })
            }
            SpecKind::Union(members) => {
                if members.is_empty() {
                    return Err(ConfigError::EmptyUnion);
                }
                let members = members
                    .into_iter()
                    .map(|m| match m.discriminant {
                        Some(discriminant) if discriminant.is_declared() => Ok(UnionMember {
                            model: m.model,
                            discriminant,
                            construct: m.construct,
                        }),
                        _ => Err(ConfigError::UndeclaredDiscriminant(m.model)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ErrorRepresentation::TaggedUnion { members })
            }
        }
    }
}

impl Default for ErrorSpec<ErrorRecord> {
    fn default() -> Self {
        Self::record()
    }
}

/// Builder for a tagged-union representation.
///
/// Members are tried in the order they are added.
pub struct UnionSpec<E> {
    members: Vec<MemberSpec<E>>,
}

impl<E: 'static> UnionSpec<E> {
    /// Adds `M`, converted into the union type by `into`. `M` must declare
    /// its discriminant through [`ErrorModel::discriminant`].
    pub fn member<M, F>(self, into: F) -> Self
    where
        M: ErrorModel + 'static,
        F: Fn(M) -> E + Send + Sync + 'static,
    {
        self.push::<M, F>(M::discriminant(), into)
    }

    /// Adds `M` with an explicitly supplied discriminant.
    pub fn member_with<M, F>(self, discriminant: Discriminant, into: F) -> Self
    where
        M: ErrorModel + 'static,
        F: Fn(M) -> E + Send + Sync + 'static,
    {
        self.push::<M, F>(Some(discriminant), into)
    }

    fn push<M, F>(mut self, discriminant: Option<Discriminant>, into: F) -> Self
    where
        M: ErrorModel + 'static,
        F: Fn(M) -> E + Send + Sync + 'static,
    {
        self.members.push(MemberSpec {
            model: short_type_name::<M>(),
            discriminant,
            construct: Arc::new(move |record: &ErrorRecord| M::from_record(record).map(&into)),
        });
        self
    }

    pub fn resolve(self) -> Result<ErrorRepresentation<E>, ConfigError> {
        ErrorSpec::from(self).resolve()
    }
}

impl<E> From<UnionSpec<E>> for ErrorSpec<E> {
    fn from(union: UnionSpec<E>) -> Self {
        Self {
            kind: SpecKind::Union(union.members),
        }
    }
}

/// A resolved tagged-union member.
pub struct UnionMember<E> {
    pub model: &'static str,
    pub discriminant: Discriminant,
    construct: Construct<E>,
}

/// Which shape a representation resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepresentationKind {
    Direct,
    Transformed,
    TaggedUnion,
}

/// A resolved error representation.
///
/// Immutable once resolved; calls only read it, so one instance serves
/// concurrent calls.
pub enum ErrorRepresentation<E> {
    Direct {
        model: &'static str,
        construct: Construct<E>,
    },
    Transformed {
        model: &'static str,
        construct: Construct<E>,
    },
    TaggedUnion {
        members: Vec<UnionMember<E>>,
    },
}

impl<E> ErrorRepresentation<E> {
    /// Builds the error value for `record`.
    ///
    /// For a tagged union, the first member whose discriminant accepts
    /// `record.error_type` is used; if none does, the result is
    /// [`ModelError::NoMatchingMember`].
    pub fn construct(&self, record: &ErrorRecord) -> Result<E, ModelError> {
        match self {
            ErrorRepresentation::Direct { construct, .. }
            | ErrorRepresentation::Transformed { construct, .. } => construct(record),
            ErrorRepresentation::TaggedUnion { members } => {
                let member = members
                    .iter()
                    .find(|m| m.discriminant.accepts(&record.error_type))
                    .ok_or_else(|| ModelError::NoMatchingMember(record.error_type.clone()))?;
                (member.construct)(record)
            }
        }
    }

    pub fn kind(&self) -> RepresentationKind {
        match self {
            ErrorRepresentation::Direct { .. } => RepresentationKind::Direct,
            ErrorRepresentation::Transformed { .. } => RepresentationKind::Transformed,
            ErrorRepresentation::TaggedUnion { .. } => RepresentationKind::TaggedUnion,
        }
    }

    /// Names of the models involved, in dispatch order.
    pub fn models(&self) -> Vec<&'static str> {
        match self {
            ErrorRepresentation::Direct { model, .. }
            | ErrorRepresentation::Transformed { model, .. } => vec![*model],
            ErrorRepresentation::TaggedUnion { members } => {
                members.iter().map(|m| m.model).collect()
            }
        }
    }
}

impl<E> fmt::Debug for ErrorRepresentation<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRepresentation")
            .field("kind", &self.kind())
            .field("models", &self.models())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Slim {
        error_type: String,
        error_details: Vec<serde_json::Value>,
    }

    impl ErrorModel for Slim {}

    #[derive(Debug, Deserialize)]
    struct Strict {
        #[allow(dead_code)]
        missing_field: String,
    }

    impl ErrorModel for Strict {}

    fn name_error() -> ErrorRecord {
        ErrorRecord::from_exception("NameError", "Captured", "NameError(\"Captured\")", "")
    }

    #[test]
    fn test_default_is_direct_record() {
        let repr = ErrorSpec::<ErrorRecord>::default().resolve().unwrap();
        assert_eq!(repr.kind(), RepresentationKind::Direct);
        assert_eq!(repr.construct(&name_error()).unwrap(), name_error());
    }

    #[test]
    fn test_direct_model_takes_field_subset() {
        let repr = ErrorSpec::<Slim>::model().resolve().unwrap();
        let slim = repr.construct(&name_error()).unwrap();
        assert_eq!(slim.error_type, "NameError");
        assert!(slim.error_details.is_empty());
    }

    #[test]
    fn test_direct_model_reports_deserialize_failure() {
        let repr = ErrorSpec::<Strict>::model().resolve().unwrap();
        let err = repr.construct(&name_error()).unwrap_err();
        assert!(matches!(err, ModelError::Deserialize { model: "Strict", .. }));
    }

    #[test]
    fn test_transformed_changes_surface_type() {
        let repr = ErrorSpec::transformed(|r: ErrorRecord| r.error_type.len())
            .resolve()
            .unwrap();
        assert_eq!(repr.kind(), RepresentationKind::Transformed);
        assert_eq!(repr.construct(&name_error()).unwrap(), "NameError".len());
    }

    #[test]
    fn test_empty_union_is_config_error() {
        let err = ErrorSpec::<ErrorRecord>::union().resolve().unwrap_err();
        assert_eq!(err, ConfigError::EmptyUnion);
    }

    #[test]
    fn test_undeclared_member_is_config_error() {
        let err = ErrorSpec::union()
            .member(|r: ErrorRecord| r.error_type)
            .member(|s: Slim| s.error_type)
            .resolve()
            .unwrap_err();
        assert_eq!(err, ConfigError::UndeclaredDiscriminant("Slim"));
    }

    #[test]
    fn test_empty_discriminant_list_is_undeclared() {
        let err = ErrorSpec::union()
            .member_with(Discriminant::OneOf(&[]), |s: Slim| s.error_type)
            .resolve()
            .unwrap_err();
        assert_eq!(err, ConfigError::UndeclaredDiscriminant("Slim"));
    }

    #[test]
    fn test_union_dispatches_in_order() {
        let repr = ErrorSpec::union()
            .member_with(Discriminant::OneOf(&["NameError"]), |s: Slim| {
                format!("slim:{}", s.error_type)
            })
            .member(|r: ErrorRecord| format!("record:{}", r.error_type))
            .resolve()
            .unwrap();

        assert_eq!(repr.models(), vec!["Slim", "ErrorRecord"]);
        assert_eq!(repr.construct(&name_error()).unwrap(), "slim:NameError");

        let other = ErrorRecord::from_exception("KeyError", "", "", "");
        assert_eq!(repr.construct(&other).unwrap(), "record:KeyError");
    }

    #[test]
    fn test_union_without_match() {
        let repr = ErrorSpec::union()
            .member_with(Discriminant::OneOf(&["ValidationError"]), |s: Slim| s)
            .resolve()
            .unwrap();

        let err = repr.construct(&name_error()).unwrap_err();
        assert!(matches!(err, ModelError::NoMatchingMember(t) if t == "NameError"));
    }
}
