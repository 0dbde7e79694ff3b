//! Display implementations for error types

use super::types::Error;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Evaluation {
                path: Some(path),
                message,
            } => {
                write!(
                    f,
                    "evaluation of '{}' failed: {}",
                    path.display(),
                    message
                )
            }
            Error::Evaluation {
                path: None,
                message,
            } => {
                write!(f, "evaluation failed: {message}")
            }
            Error::FileNotFound { path } => {
                write!(f, "file not found: '{}'", path.display())
            }
            Error::Protocol { offset, violation } => {
                write!(f, "protocol error at byte {offset}: {violation}")
            }
            Error::Unavailable {
                backend, message, ..
            } => {
                write!(f, "evaluator backend '{backend}' is unavailable: {message}")
            }
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
            Error::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "file system {} operation failed for '{}': {}",
                    operation,
                    path.display(),
                    source
                )
            }
            Error::Json { message, .. } => {
                write!(f, "JSON error: {message}")
            }
            Error::Interchange { format, message } => {
                write!(f, "{format} interchange error: {message}")
            }
        }
    }
}
