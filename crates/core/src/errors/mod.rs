//! Error types for nickel-bridge operations

mod builders;
mod conversions;
mod display;
mod types;

pub use types::{Error, ErrorKind, ProtocolViolation, Result};
