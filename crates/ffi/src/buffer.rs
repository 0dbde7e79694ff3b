//! Ownership of evaluator-allocated wire buffers
//!
//! The evaluator allocates, the caller copies, the evaluator frees. The
//! [`ForeignBuffer`] guard holds a descriptor between those steps and releases
//! it from `Drop`, so the release happens exactly once on every path,
//! including a failed decode of the copied bytes.

use crate::abi::NativeBuffer;
use crate::evaluator::NativeEvaluator;
use std::slice;

/// RAII guard for a non-null [`NativeBuffer`]
pub struct ForeignBuffer<'e, E: NativeEvaluator + ?Sized> {
    evaluator: &'e E,
    raw: Option<NativeBuffer>,
}

impl<'e, E: NativeEvaluator + ?Sized> ForeignBuffer<'e, E> {
    /// Take ownership of a descriptor returned by `evaluator`
    ///
    /// Returns `None` for the null failure descriptor, which owns nothing and
    /// is never released.
    ///
    /// # Safety
    /// The caller must ensure that:
    /// - `raw` was returned by `evaluator`
    /// - `raw` has not been released already
    /// - nothing else will release `raw`
    pub unsafe fn acquire(evaluator: &'e E, raw: NativeBuffer) -> Option<Self> {
        if raw.is_null() {
            if raw.len != 0 {
                log::warn!(
                    "evaluator '{}' returned a null buffer with length {}",
                    evaluator.name(),
                    raw.len
                );
            }
            return None;
        }
        Some(Self {
            evaluator,
            raw: Some(raw),
        })
    }

    pub fn len(&self) -> usize {
        self.raw.as_ref().map_or(0, |raw| raw.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the buffer contents into caller-owned memory
    pub fn to_vec(&self) -> Vec<u8> {
        match &self.raw {
            // SAFETY: acquire guarantees a live, non-null descriptor from the
            // evaluator, and it is only released in drop
            Some(raw) => unsafe { slice::from_raw_parts(raw.data, raw.len) }.to_vec(),
            None => Vec::new(),
        }
    }

    /// Copy the contents out and release the foreign allocation
    pub fn into_owned(self) -> Vec<u8> {
        self.to_vec()
    }
}

impl<E: NativeEvaluator + ?Sized> Drop for ForeignBuffer<'_, E> {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            tracing::trace!(len = raw.len, "releasing evaluator buffer");
            // SAFETY: the descriptor came from this evaluator (see acquire) and
            // take() leaves None behind, so it cannot be released twice
            unsafe { self.evaluator.free_buffer(raw) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingEvaluator, Reply};
    use nickel_bridge_core::{decode, Value};
    use std::ffi::CString;

    fn evaluator() -> CountingEvaluator {
        CountingEvaluator::new(|request| match request {
            crate::testing::Request::Source("broken") => Reply::Bytes(vec![0x04, 9, 0, 0, 0]),
            crate::testing::Request::Source("fail") => Reply::Error("syntax error".into()),
            _ => Reply::Value(Value::record([("x", Value::Int(1))])),
        })
    }

    fn source(text: &str) -> CString {
        CString::new(text).unwrap()
    }

    #[test]
    fn test_copy_then_release_once() {
        let evaluator = evaluator();
        let raw = evaluator.eval_native(&source("{ x = 1 }"));
        let guard = unsafe { ForeignBuffer::acquire(&evaluator, raw) }.unwrap();
        assert_eq!(evaluator.stats().outstanding(), 1);

        let owned = guard.into_owned();
        let stats = evaluator.stats();
        assert_eq!(stats.buffers_released, 1);
        assert_eq!(stats.invalid_releases, 0);

        // the copy outlives the foreign allocation
        assert_eq!(decode(&owned).unwrap().get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_null_descriptor_is_never_released() {
        let evaluator = evaluator();
        let raw = evaluator.eval_native(&source("fail"));
        assert!(unsafe { ForeignBuffer::acquire(&evaluator, raw) }.is_none());

        let stats = evaluator.stats();
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.buffers_allocated, 0);
        assert_eq!(stats.buffers_released, 0);
        assert_eq!(evaluator.last_error().as_deref(), Some("syntax error"));
    }

    #[test]
    fn test_release_survives_decode_failure() {
        let evaluator = evaluator();
        let result = {
            let raw = evaluator.eval_native(&source("broken"));
            let guard = unsafe { ForeignBuffer::acquire(&evaluator, raw) }.unwrap();
            decode(&guard.to_vec())
        };
        assert!(result.is_err());
        assert_eq!(evaluator.stats().outstanding(), 0);
        assert_eq!(evaluator.stats().invalid_releases, 0);
    }

    #[test]
    fn test_empty_buffer_is_released() {
        let evaluator = CountingEvaluator::new(|_| Reply::Bytes(Vec::new()));
        let raw = evaluator.eval_native(&source("anything"));
        let guard = unsafe { ForeignBuffer::acquire(&evaluator, raw) }.unwrap();
        assert!(guard.is_empty());
        assert!(guard.into_owned().is_empty());
        assert_eq!(evaluator.stats().buffers_released, 1);
    }

    #[test]
    fn test_ledger_flags_double_release() {
        let evaluator = evaluator();
        let raw = evaluator.eval_native(&source("{ x = 1 }"));
        let alias = NativeBuffer {
            data: raw.data,
            len: raw.len,
        };
        drop(unsafe { ForeignBuffer::acquire(&evaluator, raw) });
        unsafe { evaluator.free_buffer(alias) };
        assert_eq!(evaluator.stats().buffers_released, 1);
        assert_eq!(evaluator.stats().invalid_releases, 1);
    }

    #[test]
    fn test_json_string_guard_releases() {
        let evaluator = evaluator();
        {
            let ptr = evaluator.eval_json(&source("{ x = 1 }"));
            let text = unsafe { crate::memory::CStringPtr::new(&evaluator, ptr) };
            assert!(!text.is_null());
            let json = unsafe { text.to_str() }.unwrap();
            assert!(json.contains("\"x\": 1"));
        }
        let stats = evaluator.stats();
        assert_eq!(stats.strings_allocated, 1);
        assert_eq!(stats.strings_released, 1);
    }
}
