//! The seam between the gateway and a concrete evaluator

use nickel_bridge_core::{ExportFormat, Result};
use std::path::Path;

/// What to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// Source text with no filesystem context
    Source(&'a str),
    /// A file whose relative imports resolve against its own directory
    File(&'a Path),
}

impl Input<'_> {
    pub fn mode(&self) -> &'static str {
        match self {
            Input::Source(_) => "expression",
            Input::File(_) => "file",
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Input::Source(_) => None,
            Input::File(path) => Some(path),
        }
    }
}

/// An evaluator the gateway can drive
///
/// Each call is one blocking, one-shot evaluation. Implementations hand back
/// caller-owned data; no reference into evaluator memory escapes.
pub trait Backend: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Whether [`Backend::eval_binary`] is available
    fn supports_binary(&self) -> bool;

    /// Whether the evaluator can produce `format` text for this input itself
    fn exports_text(&self, input: &Input<'_>, format: ExportFormat) -> bool;

    /// Evaluate to a wire-format buffer copied into caller memory
    fn eval_binary(&self, input: Input<'_>) -> Result<Vec<u8>>;

    /// Evaluate to interchange text in `format`
    fn eval_text(&self, input: Input<'_>, format: ExportFormat) -> Result<String>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn supports_binary(&self) -> bool {
        (**self).supports_binary()
    }

    fn exports_text(&self, input: &Input<'_>, format: ExportFormat) -> bool {
        (**self).exports_text(input, format)
    }

    fn eval_binary(&self, input: Input<'_>) -> Result<Vec<u8>> {
        (**self).eval_binary(input)
    }

    fn eval_text(&self, input: Input<'_>, format: ExportFormat) -> Result<String> {
        (**self).eval_text(input, format)
    }
}
