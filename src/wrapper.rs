//! The safe call wrapper.
//!
//! [`SafeCall`] configures how a function's failures are treated and
//! [`SafeCall::wrap`] turns a body into a [`SafeFn`]. Calling a `SafeFn`
//! binds and validates the arguments, runs the body, optionally validates
//! the return value, and classifies any failure:
//!
//! | Failure                                   | `validate_body` | Result      |
//! |-------------------------------------------|-----------------|-------------|
//! | argument validation                       | any             | `Failure`   |
//! | return validation                         | `false`         | propagated  |
//! | return validation                         | `true`          | `Failure`   |
//! | body fault allowed by `extra_exceptions`  | `true`          | `Failure`   |
//! | body fault not allowed                    | `true`          | propagated  |
//! | any body fault                            | `false`         | propagated  |
//!
//! Captured failures become an [`ErrorRecord`] and then the configured error
//! type. Propagated failures come back unchanged as [`CallError`]. Panics in
//! the body are not faults and unwind through the wrapper.
//!
//! # Example
//!
//! ```rust
//! use safecall::{BoundArgs, CallArgs, Fault, SafeCall, Schema, Signature};
//!
//! let double = SafeCall::new(Signature::new("double").param("a", Schema::integer()))
//!     .wrap(|args: &BoundArgs| -> Result<i64, Fault> { Ok(args.parse::<i64>("a")? * 2) })
//!     .unwrap();
//!
//! let ok = double.call(&CallArgs::new().arg(21)).unwrap();
//! assert_eq!(ok.success(), Some(42));
//!
//! let failed = double.call(&CallArgs::new().kwarg("a", "A")).unwrap();
//! let record = failed.failure().unwrap();
//! assert_eq!(record.error_type, "ValidationError");
//! assert_eq!(record.error_details[0].location.to_string(), "a");
//! ```

use std::collections::BTreeSet;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{
    short_type_name, CallError, ConfigError, Fault, ModelError, ValidationFailure,
    ValidationPhase,
};
use crate::observe::{Observation, Observer, TracingObserver};
use crate::outcome::Outcome;
use crate::record::ErrorRecord;
use crate::representation::{ErrorRepresentation, ErrorSpec, UnionSpec};
use crate::signature::{BoundArgs, CallArgs, Signature};

type Body<R> = Box<dyn Fn(&BoundArgs) -> Result<R, Fault> + Send + Sync>;

/// Which body fault kinds are captured when `validate_body` is set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExceptionFilter {
    /// Every fault kind.
    #[default]
    Any,
    /// Only the listed kinds.
    Kinds(BTreeSet<String>),
}

impl ExceptionFilter {
    /// Captures nothing; extend with [`capture`](ExceptionFilter::capture).
    pub fn none() -> Self {
        ExceptionFilter::Kinds(BTreeSet::new())
    }

    pub fn kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExceptionFilter::Kinds(kinds.into_iter().map(Into::into).collect())
    }

    /// Adds the kind a `Fault` converted from `E` carries. `Any` already
    /// covers it and stays unchanged.
    pub fn capture<E: StdError + 'static>(self) -> Self {
        match self {
            ExceptionFilter::Any => ExceptionFilter::Any,
            ExceptionFilter::Kinds(mut kinds) => {
                kinds.insert(short_type_name::<E>().to_string());
                ExceptionFilter::Kinds(kinds)
            }
        }
    }

    pub fn allows(&self, kind: &str) -> bool {
        match self {
            ExceptionFilter::Any => true,
            ExceptionFilter::Kinds(kinds) => kinds.contains(kind),
        }
    }
}

/// Wrap-time flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Validate the body's result against the signature's return schema.
    pub validate_return: bool,
    /// Capture return-validation failures and allowed body faults.
    pub validate_body: bool,
    /// Body fault kinds eligible for capture.
    pub extra_exceptions: ExceptionFilter,
    /// Notify an observer about calls.
    pub report: bool,
}

/// Where one call is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Invoking,
    SignatureInvalid,
    ReturnInvalid,
    BodyException,
    Success,
    Reported,
    Done,
}

impl CallState {
    /// True for the states a call settles in after invoking.
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            CallState::SignatureInvalid
                | CallState::ReturnInvalid
                | CallState::BodyException
                | CallState::Success
        )
    }
}

/// What happens to a failure raised during a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Converted into the configured error type.
    Capture(CallState),
    /// Returned to the caller unchanged.
    Propagate,
}

/// Classifies a validation failure raised while calling `function`.
///
/// A failure comes from this call's argument binding only when it is titled
/// after `function` and not tagged as a return check. A binding failure of
/// some other signature, raised from inside the body, is a body failure.
/// Untagged failures rely on the title alone, which is approximate: a body
/// validating some other subject under the same name looks the same.
pub fn classify_validation(
    failure: &ValidationFailure,
    function: &str,
    options: &CallOptions,
) -> Disposition {
    let from_arguments = match failure.phase() {
        Some(ValidationPhase::Return) => false,
        Some(ValidationPhase::Arguments) | None => failure.title() == function,
    };
    if from_arguments {
        Disposition::Capture(CallState::SignatureInvalid)
    } else if options.validate_body {
        Disposition::Capture(CallState::ReturnInvalid)
    } else {
        Disposition::Propagate
    }
}

/// Classifies a fault raised by the body.
pub fn classify_fault(fault: &Fault, options: &CallOptions) -> Disposition {
    if options.validate_body && options.extra_exceptions.allows(fault.kind()) {
        Disposition::Capture(CallState::BodyException)
    } else {
        Disposition::Propagate
    }
}

/// Builder for a wrapped function.
///
/// Defaults: canonical [`ErrorRecord`] errors, no return validation, no body
/// capture, every fault kind allowed, no reporting.
pub struct SafeCall<E = ErrorRecord> {
    signature: Signature,
    errors: ErrorSpec<E>,
    options: CallOptions,
    observer: Option<Arc<dyn Observer>>,
}

impl SafeCall<ErrorRecord> {
    pub fn new(signature: Signature) -> Self {
        Self {
            signature,
            errors: ErrorSpec::record(),
            options: CallOptions::default(),
            observer: None,
        }
    }
}

impl<E: 'static> SafeCall<E> {
    /// Sets the error type failures are represented as.
    pub fn error_representation<F: 'static>(self, errors: ErrorSpec<F>) -> SafeCall<F> {
        SafeCall {
            signature: self.signature,
            errors,
            options: self.options,
            observer: self.observer,
        }
    }

    /// Represents failures as a tagged union.
    pub fn error_union<F: 'static>(self, union: UnionSpec<F>) -> SafeCall<F> {
        self.error_representation(ErrorSpec::from(union))
    }

    pub fn validate_return(mut self, enabled: bool) -> Self {
        self.options.validate_return = enabled;
        self
    }

    pub fn validate_body(mut self, enabled: bool) -> Self {
        self.options.validate_body = enabled;
        self
    }

    pub fn extra_exceptions(mut self, filter: ExceptionFilter) -> Self {
        self.options.extra_exceptions = filter;
        self
    }

    /// Enables reporting. Without an explicit observer, observations go to
    /// [`TracingObserver`].
    pub fn report(mut self, enabled: bool) -> Self {
        self.options.report = enabled;
        self
    }

    /// Reports to `observer`. Implies `report(true)`.
    pub fn observe<O>(mut self, observer: O) -> Self
    where
        O: Observer + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self.options.report = true;
        self
    }

    pub fn options(&self) -> &CallOptions {
        &self.options
    }

    /// Resolves the error representation, checks the signature and wraps
    /// `body`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a malformed union or a signature that
    /// declares a parameter twice.
    pub fn wrap<R, B>(self, body: B) -> Result<SafeFn<R, E>, ConfigError>
    where
        B: Fn(&BoundArgs) -> Result<R, Fault> + Send + Sync + 'static,
    {
        let representation = self.errors.resolve()?;
        self.signature.check()?;

        let observer = match (self.options.report, self.observer) {
            (false, _) => None,
            (true, Some(observer)) => Some(observer),
            (true, None) => Some(Arc::new(TracingObserver) as Arc<dyn Observer>),
        };

        Ok(SafeFn {
            inner: Arc::new(Inner {
                signature: self.signature,
                representation,
                options: self.options,
                observer,
                body: Box::new(body),
            }),
        })
    }
}

struct Inner<R, E> {
    signature: Signature,
    representation: ErrorRepresentation<E>,
    options: CallOptions,
    observer: Option<Arc<dyn Observer>>,
    body: Body<R>,
}

/// A wrapped function.
///
/// Cheap to clone; clones share the same immutable configuration, so a
/// `SafeFn` can be called from several threads at once.
pub struct SafeFn<R, E = ErrorRecord> {
    inner: Arc<Inner<R, E>>,
}

impl<R, E> Clone for SafeFn<R, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, E> fmt::Debug for SafeFn<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeFn")
            .field("signature", &self.inner.signature)
            .field("representation", &self.inner.representation)
            .field("options", &self.inner.options)
            .finish()
    }
}

enum Raised {
    Validation(ValidationFailure),
    Fault(Fault),
}

impl<R, E> SafeFn<R, E>
where
    R: Serialize,
    E: fmt::Debug,
{
    pub fn name(&self) -> &str {
        self.inner.signature.name()
    }

    pub fn signature(&self) -> &Signature {
        &self.inner.signature
    }

    pub fn options(&self) -> &CallOptions {
        &self.inner.options
    }

    pub fn representation(&self) -> &ErrorRepresentation<E> {
        &self.inner.representation
    }

    /// Calls the wrapped function.
    ///
    /// In-scope failures come back as `Ok(Outcome::Failure)`. Out-of-scope
    /// failures, observer errors and error-model construction errors come
    /// back as `Err`.
    pub fn call(&self, args: &CallArgs) -> Result<Outcome<R, E>, CallError> {
        let inner = &*self.inner;
        let function = inner.signature.name();
        let mut state = CallState::Idle;

        if let Some(observer) = &inner.observer {
            observer.observe(&Observation::Received { function, args })?;
        }
        advance(function, &mut state, CallState::Invoking);

        let outcome = match self.invoke(args) {
            Ok(value) => {
                advance(function, &mut state, CallState::Success);
                Outcome::Success(value)
            }
            Err(raised) => {
                let error = self.capture(raised, &mut state)?;
                Outcome::Failure(error)
            }
        };

        if let (Some(observer), true) = (&inner.observer, inner.options.validate_return) {
            observer.observe(&Observation::Outcome {
                function,
                succeeded: outcome.is_success(),
                summary: summarize(&outcome),
            })?;
            advance(function, &mut state, CallState::Reported);
        }
        advance(function, &mut state, CallState::Done);

        Ok(outcome)
    }

    fn invoke(&self, args: &CallArgs) -> Result<R, Raised> {
        let inner = &*self.inner;
        let bound = inner.signature.bind(args).map_err(Raised::Validation)?;

        let value = (inner.body)(&bound).map_err(|fault| match fault.into_validation() {
            Ok(failure) => Raised::Validation(failure),
            Err(fault) => Raised::Fault(fault),
        })?;

        if inner.options.validate_return && inner.signature.has_return_schema() {
            let serialized = serde_json::to_value(&value).map_err(|e| {
                Raised::Fault(Fault::from_error(e).with_kind("SerializationError"))
            })?;
            inner
                .signature
                .check_return(&serialized)
                .map_err(Raised::Validation)?;
        }

        Ok(value)
    }

    /// Turns an in-scope failure into the configured error type, or hands
    /// the original failure back as the call's error.
    fn capture(&self, raised: Raised, state: &mut CallState) -> Result<E, CallError> {
        let inner = &*self.inner;
        let function = inner.signature.name();

        let (disposition, record, original) = match raised {
            Raised::Validation(failure) => {
                let disposition = classify_validation(&failure, function, &inner.options);
                let record = ErrorRecord::from_failure(&failure);
                (disposition, record, CallError::Validation(failure))
            }
            Raised::Fault(fault) => {
                let disposition = classify_fault(&fault, &inner.options);
                let record = ErrorRecord::from_fault(&fault);
                (disposition, record, CallError::Fault(fault))
            }
        };

        let settled = match disposition {
            Disposition::Capture(settled) => settled,
            Disposition::Propagate => {
                tracing::trace!(function, error_type = %record.error_type, "propagating failure");
                return Err(original);
            }
        };
        advance(function, state, settled);
        tracing::debug!(
            function,
            state = ?settled,
            error_type = %record.error_type,
            "captured failure"
        );

        match inner.representation.construct(&record) {
            Ok(error) => Ok(error),
            Err(ModelError::NoMatchingMember(error_type)) => {
                tracing::warn!(
                    function,
                    error_type = %error_type,
                    "no error union member accepts this failure, propagating it"
                );
                Err(original)
            }
            Err(e) => Err(CallError::Model(e)),
        }
    }
}

fn advance(function: &str, state: &mut CallState, next: CallState) {
    let from = *state;
    tracing::trace!(function, from = ?from, to = ?next, "call state");
    *state = next;
}

fn summarize<R: Serialize, E: fmt::Debug>(outcome: &Outcome<R, E>) -> String {
    match outcome {
        Outcome::Success(value) => {
            let rendered = serde_json::to_string(value).unwrap_or_else(|e| format!("<{}>", e));
            format!("{}: {}", short_type_name::<R>(), rendered)
        }
        Outcome::Failure(error) => format!("{:?}", error),
    }
}
