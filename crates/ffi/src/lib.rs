//! FFI boundary to the embedded Nickel evaluator
//!
//! This crate owns everything that touches foreign memory: the `#[repr(C)]`
//! buffer descriptor, the [`NativeEvaluator`] trait mirroring the exported C
//! functions, and the RAII guards that copy evaluator-owned data into Rust
//! memory and hand the allocation back exactly once.
//!
//! With the `linked` feature the crate links the native library and exposes
//! [`LinkedEvaluator`]. With `testing` it exposes
//! [`testing::CountingEvaluator`], an in-process evaluator with an
//! allocation ledger.

pub mod abi;
pub mod buffer;
pub mod evaluator;
pub mod memory;

#[cfg(feature = "linked")]
pub mod linked;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use abi::NativeBuffer;
pub use buffer::ForeignBuffer;
pub use evaluator::NativeEvaluator;
pub use memory::CStringPtr;

#[cfg(feature = "linked")]
pub use linked::LinkedEvaluator;
