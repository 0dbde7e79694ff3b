//! Builder methods for creating errors with context

use super::types::{Error, ProtocolViolation};
use std::path::PathBuf;

impl Error {
    /// Create an evaluation error with no file context
    #[must_use]
    pub fn evaluation(message: impl Into<String>) -> Self {
        Error::Evaluation {
            path: None,
            message: message.into(),
        }
    }

    /// Create an evaluation error for a specific source file
    #[must_use]
    pub fn evaluation_at(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Evaluation {
            path: Some(path.into()),
            message: message.into(),
        }
    }

    /// Create a missing input file error
    #[must_use]
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create a protocol error at a byte offset
    #[must_use]
    pub fn protocol(offset: usize, violation: ProtocolViolation) -> Self {
        Error::Protocol { offset, violation }
    }

    /// Create a backend availability error with a hint naming the missing piece
    #[must_use]
    pub fn unavailable(
        backend: impl Into<String>,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Error::Unavailable {
            backend: backend.into(),
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create an error for text that cannot be parsed or produced in `format`
    #[must_use]
    pub fn interchange(format: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Interchange {
            format: format.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_error_kinds_are_disjoint() {
        assert_eq!(Error::evaluation("bad").kind(), ErrorKind::Evaluation);
        assert_eq!(
            Error::file_not_found("/nope.ncl").kind(),
            ErrorKind::Evaluation
        );
        assert_eq!(
            Error::protocol(3, ProtocolViolation::UnknownTag(9)).kind(),
            ErrorKind::Protocol
        );
        assert_eq!(
            Error::unavailable("subprocess", "not found", "install nickel").kind(),
            ErrorKind::Resource
        );
        assert_eq!(
            Error::configuration("bad format").kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_display_messages() {
        let err = Error::protocol(7, ProtocolViolation::UnknownTag(0x2a));
        assert_eq!(err.to_string(), "protocol error at byte 7: unknown type tag 0x2a");

        let err = Error::file_not_found("/tmp/missing.ncl");
        assert_eq!(err.to_string(), "file not found: '/tmp/missing.ncl'");

        let err = Error::evaluation_at("/tmp/main.ncl", "unbound identifier `x`");
        assert_eq!(
            err.to_string(),
            "evaluation of '/tmp/main.ncl' failed: unbound identifier `x`"
        );
    }

    #[test]
    fn test_unavailable_help_names_dependency() {
        use miette::Diagnostic;

        let err = Error::unavailable(
            "subprocess",
            "executable 'nickel' not found",
            "install the Nickel CLI",
        );
        let help = err.help().map(|h| h.to_string());
        assert_eq!(help.as_deref(), Some("install the Nickel CLI"));
    }
}
