//! Errors that escape a wrapper instead of being captured.

use std::error::Error as StdError;

use crate::error::failure::ValidationFailure;
use crate::error::fault::Fault;

/// A wrapper configuration that cannot be resolved.
///
/// Reported by [`SafeCall::wrap`](crate::SafeCall::wrap), never at call time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A tagged union was configured without any member.
    #[error("error union has no members")]
    EmptyUnion,

    /// A union member does not declare the `error_type` values it accepts.
    #[error("union member '{0}' does not declare the error_type values it accepts")]
    UndeclaredDiscriminant(&'static str),

    /// Two parameters of one signature share a name.
    #[error("parameter '{param}' declared more than once in signature of '{function}'")]
    DuplicateParameter { function: String, param: String },
}

/// An error value could not be built from a captured record.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The record's canonical form does not deserialize into the model.
    #[error("cannot build {model} from error record: {source}")]
    Deserialize {
        model: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// No member of a tagged union accepts the record's `error_type`.
    #[error("no union member accepts error_type '{0}'")]
    NoMatchingMember(String),
}

/// An observer refused an observation.
#[derive(Debug, thiserror::Error)]
#[error("observer failed: {message}")]
pub struct ObserverError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A failure the wrapper propagates to its caller.
///
/// These are the out-of-scope cases: the wrapped call behaves exactly as if
/// the wrapper were absent, handing back the original failure unchanged.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// A validation failure that is not captured (return or body validation
    /// while only signature failures are captured).
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// A body fault outside the capture scope.
    #[error("{0}")]
    Fault(Fault),

    /// The configured error model rejected the captured record.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The observer failed; this supersedes the call's own outcome.
    #[error(transparent)]
    Observer(#[from] ObserverError),
}

impl From<Fault> for CallError {
    fn from(fault: Fault) -> Self {
        CallError::Fault(fault)
    }
}

impl CallError {
    pub fn as_fault(&self) -> Option<&Fault> {
        match self {
            CallError::Fault(fault) => Some(fault),
            _ => None,
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            CallError::Validation(failure) => Some(failure),
            _ => None,
        }
    }

    /// Kind of the propagated failure: the fault kind, or `ValidationError`.
    pub fn kind(&self) -> &str {
        match self {
            CallError::Validation(_) => crate::record::VALIDATION_ERROR,
            CallError::Fault(fault) => fault.kind(),
            CallError::Model(_) => "ModelError",
            CallError::Observer(_) => "ObserverError",
        }
    }
}
