//! Core types, wire format, and errors for `nickel-bridge`.
//!
//! Everything that both sides of the evaluator boundary must agree on lives
//! here.
//!
//! ## Key Components
//!
//! - **`value`**: the closed [`Value`] tree handed to callers.
//! - **`wire`**: the binary encoding, with the reference [`encode`] and the
//!   single-pass [`decode`].
//! - **`errors`**: the [`Error`] enum separating evaluation, protocol and
//!   resource failures.
//! - **`config`** and **`format`**: evaluator settings and the output format
//!   selector.

pub mod config;
pub mod constants;
pub mod errors;
pub mod format;
pub mod value;
pub mod wire;

pub use self::{
    config::EvaluatorConfig,
    errors::{Error, ErrorKind, ProtocolViolation, Result},
    format::ExportFormat,
    value::{Record, Value},
    wire::{decode, decode_with, encode, DecodeOptions, TrailingBytes, WireTag},
};
