//! Bindings to the native evaluator library
//!
//! Linked by `build.rs` when the `linked` feature is enabled. The library
//! keeps its last-error slot per thread, so a failing call and the matching
//! `nickel_get_error` must run on the same thread with nothing in between.

use crate::abi::{copy_c_str, NativeBuffer};
use crate::evaluator::NativeEvaluator;
use libc::c_char;
use std::ffi::CStr;

extern "C" {
    fn nickel_eval_native(code: *const c_char) -> NativeBuffer;
    fn nickel_eval_file_native(path: *const c_char) -> NativeBuffer;
    fn nickel_free_buffer(buffer: NativeBuffer);
    fn nickel_get_error() -> *const c_char;
    fn nickel_eval_string(code: *const c_char) -> *const c_char;
    fn nickel_free_string(ptr: *const c_char);
}

/// Handle to the statically or dynamically linked evaluator
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkedEvaluator;

impl LinkedEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl NativeEvaluator for LinkedEvaluator {
    fn eval_native(&self, source: &CStr) -> NativeBuffer {
        // Safety: `source` is a valid null-terminated string for the whole
        // call; the library does not retain it
        unsafe { nickel_eval_native(source.as_ptr()) }
    }

    fn eval_file_native(&self, path: &CStr) -> NativeBuffer {
        // Safety: as for eval_native
        unsafe { nickel_eval_file_native(path.as_ptr()) }
    }

    unsafe fn free_buffer(&self, buffer: NativeBuffer) {
        nickel_free_buffer(buffer);
    }

    fn last_error(&self) -> Option<String> {
        // Safety: the pointer is owned by the library and valid until the
        // next nickel_* call on this thread; it is copied immediately
        unsafe { copy_c_str(nickel_get_error()) }
    }

    fn eval_json(&self, source: &CStr) -> *mut c_char {
        // Safety: as for eval_native
        unsafe { nickel_eval_string(source.as_ptr()) as *mut c_char }
    }

    unsafe fn free_string(&self, ptr: *mut c_char) {
        nickel_free_string(ptr);
    }

    fn name(&self) -> &str {
        "linked"
    }
}
