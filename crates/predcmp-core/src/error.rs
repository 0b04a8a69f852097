use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct an inequality-origin invariant violation.
    pub(crate) fn inequality_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Inequality,
            message.into(),
        )
    }

    /// Construct a builder-origin unsupported error.
    pub(crate) fn builder_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Builder, message.into())
    }

    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self.class, ErrorClass::InvariantViolation)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Internal,
    Unsupported,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Internal => "internal",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Builder,
    Inequality,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Builder => "builder",
            Self::Inequality => "inequality",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_class_prefixes_origin_and_class() {
        let err = InternalError::inequality_invariant("unexpected atom");

        assert_eq!(
            err.display_with_class(),
            "inequality:invariant_violation: unexpected atom"
        );
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn unsupported_errors_are_not_invariant_violations() {
        let err = InternalError::builder_unsupported("missing field 'group'");

        assert_eq!(err.class, ErrorClass::Unsupported);
        assert_eq!(err.origin, ErrorOrigin::Builder);
        assert!(!err.is_invariant_violation());
        assert_eq!(err.to_string(), "missing field 'group'");
    }
}
