//! The raw operations an embedded evaluator exports

use crate::abi::NativeBuffer;
use libc::c_char;
use std::ffi::CStr;

/// Raw ABI of an embedded evaluator
///
/// This mirrors the exported C functions one to one, including the
/// single-slot last-error channel: a failing call stores its message and the
/// next call overwrites it. Callers should go through a wrapper that pairs
/// each call with its error read (see `nickel_bridge::NativeBackend`) instead
/// of using these methods directly.
pub trait NativeEvaluator: Send {
    /// Evaluate source text to a wire buffer; a null descriptor on failure
    fn eval_native(&self, source: &CStr) -> NativeBuffer;

    /// Evaluate a file, resolving its imports relative to each importing
    /// file; a null descriptor on failure
    fn eval_file_native(&self, path: &CStr) -> NativeBuffer;

    /// Return a buffer to the evaluator's allocator
    ///
    /// # Safety
    /// `buffer` must be a non-null descriptor returned by this evaluator
    /// that has not been released yet
    unsafe fn free_buffer(&self, buffer: NativeBuffer);

    /// Copy of the message stored by the most recent failing call
    fn last_error(&self) -> Option<String>;

    /// Evaluate source text and export it as JSON; null on failure
    fn eval_json(&self, source: &CStr) -> *mut c_char;

    /// Return a string from [`NativeEvaluator::eval_json`] to the evaluator
    ///
    /// # Safety
    /// `ptr` must be a non-null string returned by this evaluator that has not
    /// been released yet
    unsafe fn free_string(&self, ptr: *mut c_char);

    /// Name used in diagnostics
    fn name(&self) -> &str {
        "native"
    }
}
