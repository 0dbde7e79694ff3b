//! The evaluation gateway
//!
//! [`Gateway`] turns a source text or a file into a [`Value`] (binary mode) or
//! into interchange text (export mode) through whichever [`Backend`] it
//! wraps. Binary results are copied out of evaluator memory, released, and
//! decoded once. Nothing is cached between calls.

use crate::backend::{Backend, Input};
use crate::interchange;
use crate::render::render;
use crate::state::EvaluationCall;
use nickel_bridge_core::{DecodeOptions, Error, EvaluatorConfig, ExportFormat, Result, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of [`Gateway::evaluate`]
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Value(Value),
    Text(String),
}

pub struct Gateway<B: Backend> {
    backend: B,
    options: DecodeOptions,
}

impl<B: Backend> Gateway<B> {
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, DecodeOptions::default())
    }

    pub fn with_options(backend: B, options: DecodeOptions) -> Self {
        Self { backend, options }
    }

    /// Gateway whose decoder limits come from `config`
    pub fn with_config(backend: B, config: &EvaluatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_options(backend, config.decode_options()))
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Evaluate source text with no filesystem context
    pub fn eval_expr(&self, source: &str) -> Result<Value> {
        debug!(len = source.len(), "eval_expr");
        self.eval_value(Input::Source(source))
    }

    /// Evaluate a file; its relative imports resolve against its own directory
    ///
    /// A missing file is reported as [`Error::FileNotFound`] without invoking
    /// the evaluator.
    pub fn eval_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = resolve_source_path(path.as_ref())?;
        debug!(path = %path.display(), "eval_file");
        self.eval_value(Input::File(&path))
    }

    /// Evaluate through the JSON export and parse the text back
    ///
    /// Lossy: `42.0` comes back as `Int(42)` and enum variants arrive in
    /// whatever shape the export gives them.
    pub fn eval_expr_lossy(&self, source: &str) -> Result<Value> {
        debug!(len = source.len(), "eval_expr_lossy");
        self.eval_lossy(Input::Source(source))
    }

    /// Export source text as `format` text
    pub fn eval_export(&self, source: &str, format: ExportFormat) -> Result<String> {
        debug!(len = source.len(), %format, "eval_export");
        self.export(Input::Source(source), format)
    }

    /// Export a file as `format` text
    pub fn eval_file_export(&self, path: impl AsRef<Path>, format: ExportFormat) -> Result<String> {
        let path = resolve_source_path(path.as_ref())?;
        debug!(path = %path.display(), %format, "eval_file_export");
        self.export(Input::File(&path), format)
    }

    /// Evaluate `input` as a value for [`ExportFormat::Binary`], as text otherwise
    pub fn evaluate(&self, input: Input<'_>, format: ExportFormat) -> Result<Output> {
        let resolved;
        let input = match input {
            Input::File(path) => {
                resolved = resolve_source_path(path)?;
                Input::File(&resolved)
            }
            source => source,
        };
        match format {
            ExportFormat::Binary => self.eval_value(input).map(Output::Value),
            format => self.export(input, format).map(Output::Text),
        }
    }

    fn eval_value(&self, input: Input<'_>) -> Result<Value> {
        if !self.backend.supports_binary() {
            info!(
                backend = self.backend.name(),
                "backend has no binary export, falling back to lossy JSON"
            );
            return self.eval_lossy(input);
        }

        let call = EvaluationCall::new(self.backend.name(), input.mode()).invoke();
        let ready = call.complete(self.backend.eval_binary(input))?;
        ready.start_decoding().finish(self.options)
    }

    fn eval_lossy(&self, input: Input<'_>) -> Result<Value> {
        if !self.backend.exports_text(&input, ExportFormat::Json) {
            return Err(Error::configuration(format!(
                "the {} backend cannot export JSON for {} input",
                self.backend.name(),
                input.mode()
            )));
        }
        let text = self.backend.eval_text(input, ExportFormat::Json)?;
        interchange::from_json_str(&text)
    }

    fn export(&self, input: Input<'_>, format: ExportFormat) -> Result<String> {
        if format == ExportFormat::Binary {
            return Err(Error::configuration(
                "binary output has no text form; evaluate to a value instead",
            ));
        }
        if self.backend.exports_text(&input, format) {
            return self.backend.eval_text(input, format);
        }
        if self.backend.supports_binary() {
            let value = self.eval_value(input)?;
            return render(&value, format);
        }
        Err(Error::configuration(format!(
            "the {} backend cannot export {format} for {} input",
            self.backend.name(),
            input.mode()
        )))
    }
}

/// Make `path` absolute and check that it names an existing file
fn resolve_source_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(Error::configuration("source path cannot be empty"));
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| Error::file_system(path, "resolve", e))?
            .join(path)
    };
    if !absolute.exists() {
        return Err(Error::file_not_found(path));
    }
    if absolute.is_dir() {
        return Err(Error::evaluation_at(path, "path is a directory, not a source file"));
    }
    Ok(absolute)
}
