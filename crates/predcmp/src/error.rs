use predcmp_core::error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Wrap a failure reported by an external filter parser.
    pub fn parse(err: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Parse, ErrorOrigin::Parser, err.to_string())
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match err.class {
            ErrorClass::Unsupported => ErrorKind::Unsupported,
            ErrorClass::Internal | ErrorClass::InvariantViolation => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Parse, ErrorOrigin::Decode, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// A filter could not be turned into an expression tree.
    Parse,

    /// The input is well formed but asks for something unsupported.
    Unsupported,

    /// The caller cannot remediate this.
    Internal,
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Parser,
    Decode,
    Builder,
    Inequality,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Builder => Self::Builder,
            CoreErrorOrigin::Inequality => Self::Inequality,
        }
    }
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Parser => "parser",
            Self::Decode => "decode",
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
    fn invariant_violations_surface_as_internal() {
        let core = InternalError::new(
            ErrorClass::InvariantViolation,
            CoreErrorOrigin::Inequality,
            "unexpected atom",
        );

        let err = Error::from(core);

        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.origin, ErrorOrigin::Inequality);
        assert_eq!(err.to_string(), "unexpected atom");
    }

    #[test]
    fn decode_failures_are_parse_errors() {
        let decode = serde_json::from_str::<serde_json::Value>("{").expect_err("truncated");

        let err = Error::from(decode);

        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.origin, ErrorOrigin::Decode);
    }
}
