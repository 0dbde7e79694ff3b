//! In-process evaluator that tracks every allocation it hands out
//!
//! It implements the evaluator side of the ABI with [`NativeBuffer::from_vec`]
//! and keeps a ledger of live buffers and strings. A release of something
//! not in the ledger (double release, foreign pointer) is counted instead of
//! freed, so lifecycle bugs show up as numbers rather than heap corruption.

use crate::abi::{string_into_raw, string_release, NativeBuffer};
use crate::evaluator::NativeEvaluator;
use libc::c_char;
use nickel_bridge_core::{encode, Value};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::path::Path;
use std::ptr;

/// What the evaluator was asked to do
#[derive(Debug, Clone, Copy)]
pub enum Request<'a> {
    Source(&'a str),
    File(&'a Path),
}

/// How the evaluator answers a request
#[derive(Debug, Clone)]
pub enum Reply {
    /// Encode this value
    Value(Value),
    /// Hand over these bytes verbatim, even if they are malformed
    Bytes(Vec<u8>),
    /// Fail and store this message in the last-error slot
    Error(String),
}

type Handler = dyn Fn(Request<'_>) -> Reply + Send + Sync;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocationStats {
    pub calls: usize,
    pub failures: usize,
    pub buffers_allocated: usize,
    pub buffers_released: usize,
    pub strings_allocated: usize,
    pub strings_released: usize,
    /// Releases of pointers that were not live
    pub invalid_releases: usize,
}

impl AllocationStats {
    /// Buffers and strings handed out but not yet released
    pub fn outstanding(&self) -> usize {
        (self.buffers_allocated - self.buffers_released)
            + (self.strings_allocated - self.strings_released)
    }
}

#[derive(Default)]
struct Ledger {
    stats: AllocationStats,
    // address -> count; zero-length buffers may share a dangling address
    buffers: HashMap<usize, usize>,
    strings: HashMap<usize, usize>,
}

/// Scriptable evaluator with allocation accounting
pub struct CountingEvaluator {
    handler: Box<Handler>,
    ledger: Mutex<Ledger>,
    last_error: Mutex<Option<CString>>,
}

impl CountingEvaluator {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(Request<'_>) -> Reply + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            ledger: Mutex::new(Ledger::default()),
            last_error: Mutex::new(None),
        }
    }

    pub fn stats(&self) -> AllocationStats {
        self.ledger.lock().stats
    }

    fn answer(&self, request: Request<'_>) -> Result<Vec<u8>, String> {
        self.ledger.lock().stats.calls += 1;
        let reply = (self.handler)(request);
        let result = match reply {
            Reply::Value(value) => encode(&value).map_err(|e| e.to_string()),
            Reply::Bytes(bytes) => Ok(bytes),
            Reply::Error(message) => Err(message),
        };
        if let Err(message) = &result {
            self.fail(message);
        }
        result
    }

    // Overwrites the slot; successful calls leave a stale message behind
    fn fail(&self, message: &str) {
        self.ledger.lock().stats.failures += 1;
        *self.last_error.lock() = CString::new(message.replace('\0', " ")).ok();
    }

    fn hand_out(&self, bytes: Vec<u8>) -> NativeBuffer {
        let buffer = NativeBuffer::from_vec(bytes);
        let mut ledger = self.ledger.lock();
        ledger.stats.buffers_allocated += 1;
        *ledger.buffers.entry(buffer.data as usize).or_default() += 1;
        buffer
    }
}

fn take_live(map: &mut HashMap<usize, usize>, addr: usize) -> bool {
    match map.get_mut(&addr) {
        Some(count) if *count > 1 => {
            *count -= 1;
            true
        }
        Some(_) => {
            map.remove(&addr);
            true
        }
        None => false,
    }
}

impl NativeEvaluator for CountingEvaluator {
    fn eval_native(&self, source: &CStr) -> NativeBuffer {
        let source = source.to_string_lossy();
        match self.answer(Request::Source(&source)) {
            Ok(bytes) => self.hand_out(bytes),
            Err(_) => NativeBuffer::null(),
        }
    }

    fn eval_file_native(&self, path: &CStr) -> NativeBuffer {
        let path = path.to_string_lossy();
        match self.answer(Request::File(Path::new(&*path))) {
            Ok(bytes) => self.hand_out(bytes),
            Err(_) => NativeBuffer::null(),
        }
    }

    unsafe fn free_buffer(&self, buffer: NativeBuffer) {
        let mut ledger = self.ledger.lock();
        if take_live(&mut ledger.buffers, buffer.data as usize) {
            ledger.stats.buffers_released += 1;
            drop(ledger);
            buffer.release();
        } else {
            ledger.stats.invalid_releases += 1;
        }
    }

    fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .as_ref()
            .map(|message| message.to_string_lossy().into_owned())
    }

    fn eval_json(&self, source: &CStr) -> *mut c_char {
        let source = source.to_string_lossy();
        self.ledger.lock().stats.calls += 1;
        let text = match (self.handler)(Request::Source(&source)) {
            Reply::Value(value) => serde_json::to_string_pretty(&value).map_err(|e| e.to_string()),
            Reply::Bytes(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Reply::Error(message) => Err(message),
        };
        let raw = text.and_then(|text| string_into_raw(text).map_err(|e| e.to_string()));
        match raw {
            Ok(raw) => {
                let mut ledger = self.ledger.lock();
                ledger.stats.strings_allocated += 1;
                *ledger.strings.entry(raw as usize).or_default() += 1;
                raw
            }
            Err(message) => {
                self.fail(&message);
                ptr::null_mut()
            }
        }
    }

    unsafe fn free_string(&self, ptr: *mut c_char) {
        let mut ledger = self.ledger.lock();
        if take_live(&mut ledger.strings, ptr as usize) {
            ledger.stats.strings_released += 1;
            drop(ledger);
            string_release(ptr);
        } else {
            ledger.stats.invalid_releases += 1;
        }
    }

    fn name(&self) -> &str {
        "counting"
    }
}
