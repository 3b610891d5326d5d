//! Validation failures raised against a named subject.

use std::fmt::{self, Display};

use crate::error::issue::{ValidationIssue, ValidationIssues};
use crate::error::capture_trace;

/// Which side of a call a validation failure was raised on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationPhase {
    /// Binding and validating the arguments, before the body runs.
    Arguments,
    /// Validating the body's return value.
    Return,
}

/// Every issue found while validating one subject.
///
/// The `title` names the subject that was validated: the wrapped function's
/// name for argument and return validation, or a model name for validation
/// performed inside a function body. The bundled signature validator also
/// tags its failures with an explicit [`ValidationPhase`]; failures built
/// elsewhere usually leave it unset.
///
/// Equality ignores the captured trace.
#[derive(Clone)]
pub struct ValidationFailure {
    title: String,
    phase: Option<ValidationPhase>,
    issues: ValidationIssues,
    trace: String,
}

impl ValidationFailure {
    /// Creates an untagged failure for `title`, capturing the current trace.
    pub fn new(title: impl Into<String>, issues: ValidationIssues) -> Self {
        Self {
            title: title.into(),
            phase: None,
            issues,
            trace: capture_trace(),
        }
    }

    pub fn with_phase(mut self, phase: ValidationPhase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn phase(&self) -> Option<ValidationPhase> {
        self.phase
    }

    pub fn issues(&self) -> &ValidationIssues {
        &self.issues
    }

    pub fn first(&self) -> &ValidationIssue {
        self.issues.first()
    }

    pub fn trace(&self) -> &str {
        &self.trace
    }

    pub fn into_issues(self) -> ValidationIssues {
        self.issues
    }
}

impl PartialEq for ValidationFailure {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.phase == other.phase && self.issues == other.issues
    }
}

impl Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.issues.len();
        let noun = if n == 1 { "error" } else { "errors" };
        write!(f, "{} validation {} for {}", n, noun, self.title)?;
        for issue in self.issues.iter() {
            write!(f, "\n{}", issue)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationFailure")
            .field("title", &self.title)
            .field("phase", &self.phase)
            .field("issues", &self.issues.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl std::error::Error for ValidationFailure {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Location;
    use serde_json::json;
    use stillwater::prelude::*;

    fn int_parsing(loc: Location, input: serde_json::Value) -> ValidationIssue {
        ValidationIssue::new(
            "int_parsing",
            loc,
            "Input should be a valid integer, unable to parse string as an integer",
            input,
        )
    }

    #[test]
    fn test_display_single_issue() {
        let failure = ValidationFailure::new(
            "botched_ret",
            ValidationIssues::single(int_parsing(Location::from_field("a"), json!("A"))),
        );

        assert_eq!(
            failure.to_string(),
            "1 validation error for botched_ret\n\
             a\n  Input should be a valid integer, unable to parse string as an integer \
             [type=int_parsing, input_value=\"A\", input_type=str]"
        );
    }

    #[test]
    fn test_display_pluralizes() {
        let issues = ValidationIssues::single(int_parsing(Location::from_field("a"), json!("A")))
            .combine(ValidationIssues::single(int_parsing(
                Location::from_field("b"),
                json!("B"),
            )));
        let failure = ValidationFailure::new("f", issues);

        assert!(failure.to_string().starts_with("2 validation errors for f"));
    }

    #[test]
    fn test_equality_ignores_trace() {
        let issues = ValidationIssues::single(int_parsing(Location::root(), json!("foo")));
        let mut a = ValidationFailure::new("f", issues.clone()).with_phase(ValidationPhase::Return);
        let b = ValidationFailure::new("f", issues).with_phase(ValidationPhase::Return);
        a.trace = "somewhere else".to_string();

        assert_eq!(a, b);
    }

    #[test]
    fn test_debug_is_structured() {
        let failure = ValidationFailure::new(
            "f",
            ValidationIssues::single(int_parsing(Location::root(), json!("foo"))),
        );
        let repr = format!("{:?}", failure);

        assert!(repr.starts_with("ValidationFailure {"));
        assert!(repr.contains("int_parsing"));
    }
}
