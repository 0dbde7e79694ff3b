//! Per-call evaluation state machine using phantom types
//!
//! `Idle -> Invoked -> {BufferReady, Failed}`, then
//! `BufferReady -> Decoding -> {Decoded, ProtocolError}`. The terminal states
//! are the `Ok`/`Err` outcomes of [`EvaluationCall::complete`] and
//! [`EvaluationCall::finish`]; there is no way back to `Idle`, so a call
//! cannot be retried from inside the gateway.

use nickel_bridge_core::{decode_with, DecodeOptions, Result, Value};
use std::fmt;
use std::marker::PhantomData;
use tracing::Span;

/// Phantom type marker for a call that has not reached the evaluator
#[derive(Debug)]
pub struct Idle;

/// Phantom type marker for a call waiting on the evaluator
#[derive(Debug)]
pub struct Invoked;

/// Phantom type marker for a call holding an owned copy of the buffer
#[derive(Debug)]
pub struct BufferReady;

/// Phantom type marker for a call walking its buffer
#[derive(Debug)]
pub struct Decoding;

/// How a call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Decoded,
    Failed,
    ProtocolError,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Decoded => "decoded",
            Outcome::Failed => "failed",
            Outcome::ProtocolError => "protocol-error",
        })
    }
}

/// One evaluation, from invocation to decoded value
#[derive(Debug)]
pub struct EvaluationCall<State = Idle> {
    span: Span,
    bytes: Vec<u8>,
    _state: PhantomData<State>,
}

impl<State> EvaluationCall<State> {
    fn transition<Next>(self, to: &'static str) -> EvaluationCall<Next> {
        self.span.in_scope(|| tracing::trace!(state = to, "evaluation transition"));
        EvaluationCall {
            span: self.span,
            bytes: self.bytes,
            _state: PhantomData,
        }
    }

    fn end(&self, outcome: Outcome) {
        self.span
            .in_scope(|| tracing::debug!(%outcome, len = self.bytes.len(), "evaluation finished"));
    }
}

impl EvaluationCall<Idle> {
    pub fn new(backend: &str, mode: &'static str) -> Self {
        Self {
            span: tracing::debug_span!("evaluation", backend, mode),
            bytes: Vec::new(),
            _state: PhantomData,
        }
    }

    /// Hand the request to the evaluator
    pub fn invoke(self) -> EvaluationCall<Invoked> {
        self.transition("invoked")
    }
}

impl EvaluationCall<Invoked> {
    /// Record what the evaluator returned
    pub fn complete(self, result: Result<Vec<u8>>) -> Result<EvaluationCall<BufferReady>> {
        match result {
            Ok(bytes) => {
                let mut ready: EvaluationCall<BufferReady> = self.transition("buffer-ready");
                ready.bytes = bytes;
                Ok(ready)
            }
            Err(err) => {
                self.end(Outcome::Failed);
                Err(err)
            }
        }
    }
}

impl EvaluationCall<BufferReady> {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn start_decoding(self) -> EvaluationCall<Decoding> {
        self.transition("decoding")
    }
}

impl EvaluationCall<Decoding> {
    /// Walk the owned buffer into a value
    pub fn finish(self, options: DecodeOptions) -> Result<Value> {
        match decode_with(&self.bytes, options) {
            Ok(value) => {
                self.end(Outcome::Decoded);
                Ok(value)
            }
            Err(err) => {
                self.span.in_scope(|| tracing::error!(error = %err, "malformed evaluator buffer"));
                self.end(Outcome::ProtocolError);
                Err(err)
            }
        }
    }
}
