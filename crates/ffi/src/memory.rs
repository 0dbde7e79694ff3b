//! Memory management for FFI strings
//!
//! Provides an RAII wrapper for C strings returned by the evaluator's JSON
//! export so they are handed back to its allocator.

use crate::evaluator::NativeEvaluator;
use libc::c_char;
use nickel_bridge_core::errors::{Error, Result};
use std::ffi::CStr;

/// RAII wrapper for C strings returned from FFI
/// Ensures proper cleanup when the wrapper goes out of scope
pub struct CStringPtr<'e, E: NativeEvaluator + ?Sized> {
    evaluator: &'e E,
    ptr: *mut c_char,
}

impl<'e, E: NativeEvaluator + ?Sized> CStringPtr<'e, E> {
    /// Creates a new wrapper from a raw pointer
    ///
    /// # Safety
    /// The caller must ensure that:
    /// - `ptr` is either null or a valid pointer returned by `evaluator`
    /// - The pointer has not been freed already
    /// - The pointer will not be used after this wrapper is dropped
    pub unsafe fn new(evaluator: &'e E, ptr: *mut c_char) -> Self {
        Self { evaluator, ptr }
    }

    /// Checks if the wrapped pointer is null
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// Converts the C string to a Rust &str
    ///
    /// # Safety
    /// The caller must ensure that the wrapped pointer is not null
    pub unsafe fn to_str(&self) -> Result<&str> {
        debug_assert!(
            !self.is_null(),
            "Attempted to convert null pointer to string"
        );

        let cstr = CStr::from_ptr(self.ptr);
        cstr.to_str().map_err(|e| {
            Error::evaluation(format!("evaluator returned text that is not UTF-8: {e}"))
        })
    }
}

impl<E: NativeEvaluator + ?Sized> Drop for CStringPtr<'_, E> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            // Safety: only non-null pointers returned by this evaluator are
            // wrapped, and the wrapper is the sole owner
            unsafe {
                self.evaluator.free_string(self.ptr);
            }
        }
    }
}
