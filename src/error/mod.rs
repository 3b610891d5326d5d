//! Error types for validation and call failures.
//!
//! - [`ValidationIssue`] / [`ValidationIssues`]: what the value validator reports
//! - [`ValidationFailure`]: issues raised against a named subject
//! - [`Fault`]: an error raised by a wrapped function's body
//! - [`CallError`], [`ConfigError`], [`ModelError`], [`ObserverError`]: what
//!   escapes the wrapper

mod call;
mod failure;
mod fault;
mod issue;

pub use call::{CallError, ConfigError, ModelError, ObserverError};
pub use failure::{ValidationFailure, ValidationPhase};
pub use fault::Fault;
pub use issue::{ValidationIssue, ValidationIssues};

pub(crate) use fault::short_type_name;

/// Renders the current backtrace. Empty detail unless `RUST_BACKTRACE` is set.
pub(crate) fn capture_trace() -> String {
    std::backtrace::Backtrace::capture().to_string()
}
