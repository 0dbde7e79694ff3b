//! Backend driving an embedded evaluator through its C ABI

use crate::backend::{Backend, Input};
use nickel_bridge_core::{Error, ExportFormat, Result};
use nickel_bridge_ffi::abi::ffi_string;
use nickel_bridge_ffi::{CStringPtr, ForeignBuffer, NativeEvaluator};
use parking_lot::Mutex;
use std::path::Path;

const SILENT_FAILURE: &str = "evaluator signalled failure without a message";

/// Embedded evaluator behind a mutex
///
/// The evaluator reports failures through a single overwrite-on-next-call
/// slot. Holding the lock across "invoke, then read the slot" pairs each
/// failure with its own message and turns the pair into a `Result`.
pub struct NativeBackend<E: NativeEvaluator> {
    evaluator: Mutex<E>,
}

impl<E: NativeEvaluator> NativeBackend<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator: Mutex::new(evaluator),
        }
    }

    /// Run `f` with exclusive access to the evaluator
    pub fn with_evaluator<R>(&self, f: impl FnOnce(&E) -> R) -> R {
        f(&self.evaluator.lock())
    }

    pub fn into_inner(self) -> E {
        self.evaluator.into_inner()
    }

    fn failure(evaluator: &E, input: &Input<'_>) -> Error {
        let message = evaluator
            .last_error()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| SILENT_FAILURE.to_string());
        match input.path() {
            Some(path) => Error::evaluation_at(path, message),
            None => Error::evaluation(message),
        }
    }
}

fn path_arg(path: &Path) -> Result<std::ffi::CString> {
    let path_str = path.to_str().ok_or_else(|| {
        Error::configuration(format!("path '{}' is not valid UTF-8", path.display()))
    })?;
    ffi_string(path_str, "file path")
}

impl<E: NativeEvaluator> Backend for NativeBackend<E> {
    fn name(&self) -> &str {
        "native"
    }

    fn supports_binary(&self) -> bool {
        true
    }

    fn exports_text(&self, input: &Input<'_>, format: ExportFormat) -> bool {
        matches!(input, Input::Source(_)) && format == ExportFormat::Json
    }

    fn eval_binary(&self, input: Input<'_>) -> Result<Vec<u8>> {
        let arg = match input {
            Input::Source(source) => ffi_string(source, "source text")?,
            Input::File(path) => path_arg(path)?,
        };

        let evaluator = self.evaluator.lock();
        let raw = match input {
            Input::Source(_) => evaluator.eval_native(&arg),
            Input::File(_) => evaluator.eval_file_native(&arg),
        };
        tracing::debug!(
            evaluator = evaluator.name(),
            null = raw.is_null(),
            len = raw.len,
            "native evaluation returned"
        );

        // Safety: `raw` was just returned by this evaluator and is owned by
        // nobody else
        let buffer = unsafe { ForeignBuffer::acquire(&*evaluator, raw) };
        match buffer {
            Some(buffer) => Ok(buffer.into_owned()),
            None => Err(Self::failure(&*evaluator, &input)),
        }
    }

    fn eval_text(&self, input: Input<'_>, format: ExportFormat) -> Result<String> {
        let source = match input {
            Input::Source(source) if self.exports_text(&input, format) => source,
            _ => {
                return Err(Error::configuration(format!(
                    "the embedded evaluator cannot export {format} for {} input",
                    input.mode()
                )))
            }
        };
        let arg = ffi_string(source, "source text")?;

        let evaluator = self.evaluator.lock();
        let ptr = evaluator.eval_json(&arg);
        // Safety: `ptr` is null or a string just returned by this evaluator
        let text = unsafe { CStringPtr::new(&*evaluator, ptr) };
        if text.is_null() {
            return Err(Self::failure(&*evaluator, &input));
        }
        // Safety: checked non-null above
        let json = unsafe { text.to_str()? };
        Ok(json.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nickel_bridge_core::{decode, ErrorKind, Value};
    use nickel_bridge_ffi::testing::{CountingEvaluator, Reply, Request};

    fn backend() -> NativeBackend<CountingEvaluator> {
        NativeBackend::new(CountingEvaluator::new(|request| match request {
            Request::Source("oops") => Reply::Error("unexpected token".into()),
            Request::Source("silent") => Reply::Error(String::new()),
            Request::Source(_) => Reply::Value(Value::Int(3)),
            Request::File(path) => Reply::Error(format!("cannot import {}", path.display())),
        }))
    }

    #[test]
    fn test_binary_success_copies_and_releases() {
        let backend = backend();
        let bytes = backend.eval_binary(Input::Source("1 + 2")).unwrap();
        assert_eq!(decode(&bytes).unwrap(), Value::Int(3));
        backend.with_evaluator(|e| {
            assert_eq!(e.stats().buffers_released, 1);
            assert_eq!(e.stats().outstanding(), 0);
        });
    }

    #[test]
    fn test_failure_reads_message_from_slot() {
        let backend = backend();
        let err = backend.eval_binary(Input::Source("oops")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Evaluation);
        assert_eq!(err.to_string(), "evaluation failed: unexpected token");
    }

    #[test]
    fn test_file_failure_names_the_file() {
        let backend = backend();
        let err = backend
            .eval_binary(Input::File(Path::new("/cfg/main.ncl")))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "evaluation of '/cfg/main.ncl' failed: cannot import /cfg/main.ncl"
        );
    }

    #[test]
    fn test_empty_message_gets_generic_text() {
        let err = backend().eval_binary(Input::Source("silent")).unwrap_err();
        assert!(err.to_string().contains(SILENT_FAILURE));
    }

    #[test]
    fn test_interior_null_is_rejected_before_invocation() {
        let backend = backend();
        assert!(backend.eval_binary(Input::Source("1\0")).is_err());
        backend.with_evaluator(|e| assert_eq!(e.stats().calls, 0));
    }

    #[test]
    fn test_json_export_releases_string() {
        let backend = backend();
        let json = backend
            .eval_text(Input::Source("1 + 2"), ExportFormat::Json)
            .unwrap();
        assert_eq!(json.trim(), "3");
        backend.with_evaluator(|e| assert_eq!(e.stats().strings_released, 1));
    }

    #[test]
    fn test_yaml_export_is_not_native() {
        let backend = backend();
        assert!(!backend.exports_text(&Input::Source("1"), ExportFormat::Yaml));
        let err = backend
            .eval_text(Input::Source("1"), ExportFormat::Yaml)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
