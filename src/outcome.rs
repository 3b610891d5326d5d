//! The result of a wrapped call.

use serde::{Deserialize, Serialize};

/// What a wrapped function returns for an in-scope call: the body's value, or
/// the failure built through the configured error representation.
///
/// Unlike `Result`, a `Failure` here is an ordinary value. Out-of-scope
/// failures are never turned into an `Outcome`; they surface as
/// [`CallError`](crate::CallError).
///
/// # Example
///
/// ```rust
/// use safecall::Outcome;
///
/// let ok: Outcome<i64, String> = Outcome::Success(3);
/// assert_eq!(ok.map(|n| n * 2).success(), Some(6));
///
/// let failed: Outcome<i64, String> = Outcome::Failure("bad".to_string());
/// assert!(failed.is_failure());
/// assert_eq!(failed.into_result(), Err("bad".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome<R, E> {
    Success(R),
    Failure(E),
}

impl<R, E> Outcome<R, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn success(self) -> Option<R> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(self) -> Option<E> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    pub fn as_success(&self) -> Option<&R> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&E> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> Outcome<T, E> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }

    pub fn map_failure<F>(self, f: impl FnOnce(E) -> F) -> Outcome<R, F> {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(error) => Outcome::Failure(f(error)),
        }
    }

    pub fn into_result(self) -> Result<R, E> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}

impl<R, E> From<Result<R, E>> for Outcome<R, E> {
    fn from(result: Result<R, E>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => Outcome::Failure(error),
        }
    }
}
