//! Types shared with the native evaluator across the C ABI

use libc::c_char;
use nickel_bridge_core::{Error, Result};
use std::ffi::{CStr, CString};
use std::ptr;

/// Descriptor of an encoded buffer owned by the evaluator
///
/// A null `data` pointer means the evaluation failed and the message is in
/// the evaluator's last-error slot. Not `Clone`: each descriptor is released
/// at most once.
#[repr(C)]
#[derive(Debug)]
pub struct NativeBuffer {
    pub data: *mut u8,
    pub len: usize,
}

impl NativeBuffer {
    /// The failure descriptor
    pub const fn null() -> Self {
        Self {
            data: ptr::null_mut(),
            len: 0,
        }
    }

    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    /// Hand an encoded buffer to the other side of the boundary.
    ///
    /// Evaluator side of the contract; the result must come back through
    /// [`NativeBuffer::release`].
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let boxed = bytes.into_boxed_slice();
        let len = boxed.len();
        let data = Box::into_raw(boxed) as *mut u8;
        Self { data, len }
    }

    /// Free a buffer created by [`NativeBuffer::from_vec`]. Null is a no-op.
    ///
    /// # Safety
    /// - `self` must have been produced by `from_vec` in this allocator
    /// - it must not have been released already
    pub unsafe fn release(self) {
        if !self.data.is_null() {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                self.data, self.len,
            )));
        }
    }
}

/// Hand a string to the other side of the boundary (evaluator side)
pub fn string_into_raw(value: String) -> Result<*mut c_char> {
    CString::new(value)
        .map(CString::into_raw)
        .map_err(|e| Error::evaluation(format!("result contains a null byte: {e}")))
}

/// Free a string created by [`string_into_raw`]. Null is a no-op.
///
/// # Safety
/// `ptr` must come from `string_into_raw` and not have been released already
pub unsafe fn string_release(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Create a C string for an FFI argument, rejecting interior null bytes
pub fn ffi_string(value: &str, context: &str) -> Result<CString> {
    CString::new(value).map_err(|e| {
        Error::evaluation(format!("{context} contains a null byte at position {}", e.nul_position()))
    })
}

/// Copy a borrowed, evaluator-owned C string
///
/// # Safety
/// `ptr` must be null or point to a valid null-terminated string that stays
/// alive for the duration of the call
pub unsafe fn copy_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_round_trip() {
        let buffer = NativeBuffer::from_vec(vec![0x02, 1, 2, 3]);
        assert!(!buffer.is_null());
        assert_eq!(buffer.len, 4);
        // SAFETY: the buffer was just produced by from_vec
        let view = unsafe { std::slice::from_raw_parts(buffer.data, buffer.len) };
        assert_eq!(view, &[0x02, 1, 2, 3]);
        unsafe { buffer.release() };
    }

    #[test]
    fn test_empty_buffer_is_not_null() {
        let buffer = NativeBuffer::from_vec(Vec::new());
        assert!(!buffer.is_null());
        assert_eq!(buffer.len, 0);
        unsafe { buffer.release() };
    }

    #[test]
    fn test_release_null_is_noop() {
        unsafe { NativeBuffer::null().release() };
    }

    #[test]
    fn test_string_round_trip() {
        let ptr = string_into_raw("{\"a\": 1}".to_string()).unwrap();
        assert_eq!(unsafe { copy_c_str(ptr) }.as_deref(), Some("{\"a\": 1}"));
        unsafe { string_release(ptr) };
        assert_eq!(unsafe { copy_c_str(ptr::null()) }, None);
    }

    #[test]
    fn test_ffi_string_rejects_interior_null() {
        assert!(ffi_string("1 + 1", "source").is_ok());
        let err = ffi_string("1\0+ 1", "source").unwrap_err();
        assert!(err.to_string().contains("null byte at position 1"));
    }
}
