//! Evaluate Nickel configuration and get typed values back
//!
//! The [`Gateway`] drives an evaluator [`Backend`]:
//!
//! - [`NativeBackend`] wraps an embedded evaluator speaking the C ABI from
//!   `nickel-bridge-ffi` and returns exact values through the binary wire
//!   format.
//! - [`SubprocessBackend`] runs the `nickel` executable and can only produce
//!   interchange text; values obtained through it are lossy.
//!
//! ```no_run
//! use nickel_bridge::{subprocess_gateway, EvaluatorConfig};
//!
//! let gateway = subprocess_gateway(&EvaluatorConfig::from_env()?)?;
//! let value = gateway.eval_file("config/main.ncl")?;
//! println!("{value}");
//! # Ok::<(), nickel_bridge::Error>(())
//! ```

pub mod backend;
pub mod gateway;
pub mod interchange;
pub mod native;
pub mod render;
pub mod state;
pub mod subprocess;

pub use backend::{Backend, Input};
pub use gateway::{Gateway, Output};
pub use native::NativeBackend;
pub use subprocess::SubprocessBackend;

pub use nickel_bridge_core::{
    decode, encode, DecodeOptions, Error, ErrorKind, EvaluatorConfig, ExportFormat,
    ProtocolViolation, Record, Result, TrailingBytes, Value,
};

#[cfg(feature = "linked")]
pub use nickel_bridge_ffi::LinkedEvaluator;

/// Gateway over the `nickel` executable named in `config`
pub fn subprocess_gateway(config: &EvaluatorConfig) -> Result<Gateway<SubprocessBackend>> {
    let backend = SubprocessBackend::new(config)?;
    Gateway::with_config(backend, config)
}

/// Gateway over the linked native evaluator library
#[cfg(feature = "linked")]
pub fn linked_gateway(
    config: &EvaluatorConfig,
) -> Result<Gateway<NativeBackend<LinkedEvaluator>>> {
    Gateway::with_config(NativeBackend::new(LinkedEvaluator), config)
}
