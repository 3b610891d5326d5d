//! Call observation.
//!
//! An [`Observer`] is notified synchronously on the calling thread: once
//! before the body runs, and once after the outcome is built when return
//! validation is enabled. Observers are for side effects such as logging;
//! an observer error propagates to the caller and supersedes the call's own
//! outcome.

use std::fmt::{self, Display};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ObserverError;
use crate::signature::CallArgs;

/// One notification about a wrapped call.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation<'a> {
    /// The function is about to be invoked with `args`.
    Received {
        function: &'a str,
        args: &'a CallArgs,
    },
    /// The call finished. `summary` is `<type>: <value>` for a success and
    /// the error's `Debug` form for a failure.
    Outcome {
        function: &'a str,
        succeeded: bool,
        summary: String,
    },
}

impl Observation<'_> {
    pub fn function(&self) -> &str {
        match self {
            Observation::Received { function, .. } | Observation::Outcome { function, .. } => {
                function
            }
        }
    }

    pub fn is_received(&self) -> bool {
        matches!(self, Observation::Received { .. })
    }
}

/// `f received *(1,), **{}` before the call, `f -> i64: 3` or
/// `f -> ErrorRecord { .. }` after it.
impl Display for Observation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::Received { function, args } => {
                write!(f, "{} received {}", function, args)
            }
            Observation::Outcome {
                function, summary, ..
            } => write!(f, "{} -> {}", function, summary),
        }
    }
}

/// A sink for call observations.
///
/// Implemented for closures:
///
/// ```rust
/// use safecall::{Observation, Observer, ObserverError};
///
/// let quiet = |_: &Observation<'_>| -> Result<(), ObserverError> { Ok(()) };
/// fn takes(_: impl Observer) {}
/// takes(quiet);
/// ```
pub trait Observer: Send + Sync {
    fn observe(&self, observation: &Observation<'_>) -> Result<(), ObserverError>;
}

impl<F> Observer for F
where
    F: Fn(&Observation<'_>) -> Result<(), ObserverError> + Send + Sync,
{
    fn observe(&self, observation: &Observation<'_>) -> Result<(), ObserverError> {
        self(observation)
    }
}

/// Emits each observation as an `info` event on the `safecall::report`
/// target. The sink used when reporting is enabled without an observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, observation: &Observation<'_>) -> Result<(), ObserverError> {
        tracing::info!(
            target: "safecall::report",
            function = observation.function(),
            "{}",
            observation
        );
        Ok(())
    }
}

/// Collects rendered observations in memory.
///
/// Clones share the same log, so one clone can be handed to a wrapper while
/// another is read.
///
/// ```rust
/// use safecall::{CallArgs, Observation, ObservationLog, Observer};
///
/// let log = ObservationLog::new();
/// let args = CallArgs::new().arg(1);
/// log.observe(&Observation::Received { function: "f", args: &args }).unwrap();
///
/// assert_eq!(log.entries(), ["f received *(1,), **{}"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObservationLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ObservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the rendered observations, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Observer for ObservationLog {
    fn observe(&self, observation: &Observation<'_>) -> Result<(), ObserverError> {
        self.entries.lock().push(observation.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_received() {
        let args = CallArgs::new().arg(1).kwarg("b", "x");
        let observation = Observation::Received {
            function: "f",
            args: &args,
        };
        assert_eq!(observation.to_string(), "f received *(1,), **{\"b\": \"x\"}");
        assert!(observation.is_received());
    }

    #[test]
    fn test_render_outcome() {
        let observation = Observation::Outcome {
            function: "f",
            succeeded: true,
            summary: format!("i64: {}", json!(3)),
        };
        assert_eq!(observation.to_string(), "f -> i64: 3");
        assert_eq!(observation.function(), "f");
    }

    #[test]
    fn test_log_clones_share_entries() {
        let log = ObservationLog::new();
        let handle = log.clone();
        let args = CallArgs::new();

        handle
            .observe(&Observation::Received {
                function: "g",
                args: &args,
            })
            .unwrap();

        assert_eq!(log.len(), 1);
        log.clear();
        assert!(handle.is_empty());
    }

    #[test]
    fn test_closure_observer_error() {
        let failing = |_: &Observation<'_>| -> Result<(), ObserverError> {
            Err(ObserverError::new("sink closed"))
        };
        let args = CallArgs::new();
        let err = failing
            .observe(&Observation::Received {
                function: "f",
                args: &args,
            })
            .unwrap_err();
        assert_eq!(err.message(), "sink closed");
    }

    #[test]
    fn test_tracing_observer_never_fails() {
        let args = CallArgs::new();
        let observation = Observation::Received {
            function: "f",
            args: &args,
        };
        assert!(TracingObserver.observe(&observation).is_ok());
    }
}
