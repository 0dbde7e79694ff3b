//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for nickel-bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for nickel-bridge operations using thiserror
///
/// The three families the caller has to tell apart are evaluation errors (the
/// program is wrong), protocol errors (the two sides of the boundary disagree
/// about the wire format) and resource errors (no evaluator to talk to).
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
    /// The evaluator rejected the program
    #[diagnostic(code(nickel_bridge::evaluation))]
    Evaluation {
        path: Option<PathBuf>,
        message: String,
    },

    /// The input file for file-mode evaluation does not exist
    #[diagnostic(
        code(nickel_bridge::evaluation),
        help("check the path; relative paths are resolved against the current directory")
    )]
    FileNotFound { path: PathBuf },

    /// The binary buffer does not follow the wire format
    #[diagnostic(
        code(nickel_bridge::protocol),
        help("the evaluator and this library disagree on the wire format; rebuild both from the same release")
    )]
    Protocol {
        offset: usize,
        violation: ProtocolViolation,
    },

    /// The evaluator backend cannot be located or invoked
    #[diagnostic(code(nickel_bridge::resource), help("{hint}"))]
    Unavailable {
        backend: String,
        message: String,
        hint: String,
    },

    /// Configuration errors
    #[diagnostic(code(nickel_bridge::config))]
    Configuration { message: String },

    /// File system operations
    #[diagnostic(code(nickel_bridge::io))]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[diagnostic(code(nickel_bridge::interchange))]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML or TOML text from the evaluator could not be parsed
    #[diagnostic(code(nickel_bridge::interchange))]
    Interchange { format: String, message: String },
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Evaluation,
    Protocol,
    Resource,
    Configuration,
    Io,
}

/// The specific way a buffer broke the wire format
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    #[error("needed {needed} bytes but only {remaining} remain")]
    Truncated { needed: usize, remaining: usize },

    #[error("unknown type tag 0x{0:02x}")]
    UnknownTag(u8),

    #[error("declared length {declared} exceeds the {remaining} bytes remaining")]
    LengthOverrun { declared: u64, remaining: usize },

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("duplicate record key '{0}'")]
    DuplicateKey(String),

    #[error("nesting exceeds the maximum depth of {0}")]
    DepthExceeded(usize),

    #[error("{0} trailing bytes after the root value")]
    TrailingBytes(usize),

    #[error("{what} of {len} does not fit in a u32 length field")]
    LengthOverflow { what: &'static str, len: usize },
}

impl Error {
    /// Classify the error into one of the disjoint kinds callers act on
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Evaluation { .. } | Error::FileNotFound { .. } => ErrorKind::Evaluation,
            Error::Protocol { .. } => ErrorKind::Protocol,
            Error::Unavailable { .. } => ErrorKind::Resource,
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::FileSystem { .. } | Error::Json { .. } | Error::Interchange { .. } => {
                ErrorKind::Io
            }
        }
    }

    /// The protocol violation carried by this error, if any
    pub fn violation(&self) -> Option<&ProtocolViolation> {
        match self {
            Error::Protocol { violation, .. } => Some(violation),
            _ => None,
        }
    }
}
