//! Backend that shells out to the `nickel` executable
//!
//! Only the textual export is available here. Expression sources are written
//! to a temporary file that lives exactly as long as the call.

use crate::backend::{Backend, Input};
use nickel_bridge_core::constants::{
    EXPORT_SUBCOMMAND, FORMAT_FLAG, GENERIC_EVALUATION_FAILURE, INSTALL_HINT, SOURCE_FILE_PREFIX,
    SOURCE_FILE_SUFFIX,
};
use nickel_bridge_core::{Error, EvaluatorConfig, ExportFormat, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::NamedTempFile;
use tracing::debug;
use which::which;

const BACKEND_NAME: &str = "subprocess";

/// Runs `nickel export --format <fmt> <file>` once per call
#[derive(Debug, Clone)]
pub struct SubprocessBackend {
    executable: PathBuf,
}

impl SubprocessBackend {
    /// Locate the configured executable on `PATH`
    pub fn new(config: &EvaluatorConfig) -> Result<Self> {
        let executable = which(&config.executable).map_err(|e| {
            Error::unavailable(
                BACKEND_NAME,
                format!("'{}' not found: {e}", config.executable.display()),
                INSTALL_HINT,
            )
        })?;
        debug!(executable = %executable.display(), "located evaluator executable");
        Ok(Self { executable })
    }

    /// Use `executable` as given, without searching `PATH`
    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn export(&self, file: &Path, format: ExportFormat) -> Result<Output> {
        debug!(
            executable = %self.executable.display(),
            file = %file.display(),
            %format,
            "spawning evaluator"
        );
        Command::new(&self.executable)
            .arg(EXPORT_SUBCOMMAND)
            .arg(FORMAT_FLAG)
            .arg(format.as_str())
            .arg(file)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => Error::unavailable(
                    BACKEND_NAME,
                    format!("cannot run '{}': {e}", self.executable.display()),
                    INSTALL_HINT,
                ),
                _ => Error::file_system(&self.executable, "spawn", e),
            })
    }
}

fn write_source(source: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(SOURCE_FILE_PREFIX)
        .suffix(SOURCE_FILE_SUFFIX)
        .tempfile()?;
    file.write_all(source.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| Error::file_system(file.path(), "write", e))?;
    Ok(file)
}

/// The evaluator's own diagnostic: stderr, else stdout, else a generic line
fn diagnostic(output: &Output) -> String {
    [&output.stderr, &output.stdout]
        .into_iter()
        .map(|stream| String::from_utf8_lossy(stream).trim().to_string())
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| GENERIC_EVALUATION_FAILURE.to_string())
}

impl Backend for SubprocessBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn supports_binary(&self) -> bool {
        false
    }

    fn exports_text(&self, _input: &Input<'_>, format: ExportFormat) -> bool {
        format.is_textual()
    }

    fn eval_binary(&self, input: Input<'_>) -> Result<Vec<u8>> {
        Err(Error::configuration(format!(
            "the {BACKEND_NAME} backend has no binary export ({} input)",
            input.mode()
        )))
    }

    fn eval_text(&self, input: Input<'_>, format: ExportFormat) -> Result<String> {
        if !format.is_textual() {
            return Err(Error::configuration(format!(
                "'{format}' is not a textual export format"
            )));
        }

        // Held until the process has exited; removed on drop
        let scratch;
        let file = match input {
            Input::Source(source) => {
                scratch = write_source(source)?;
                scratch.path()
            }
            Input::File(path) => path,
        };

        let output = self.export(file, format)?;
        if !output.status.success() {
            let message = diagnostic(&output);
            debug!(status = ?output.status.code(), "evaluator exited with failure");
            return Err(match input {
                Input::File(path) => Error::evaluation_at(path, message),
                Input::Source(_) => Error::evaluation(message),
            });
        }

        String::from_utf8(output.stdout)
            .map_err(|e| Error::evaluation(format!("evaluator printed non-UTF-8 output: {e}")))
    }
}
