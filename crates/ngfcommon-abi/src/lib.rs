// All extern "C" ABI exports accept raw pointers from C callers; the pointer
// contracts live in each module's docs rather than per-function safety docs.
#![allow(clippy::missing_safety_doc)]
//! # ngfcommon-abi
//!
//! C boundary for `ngfcommon-core`.
//!
//! Exposes the allocation-callback and diagnostic-callback registration points
//! plus the internal `ngfi_*` helpers that C code in the rest of the library
//! links against. Every entry point converts raw C arguments into the safe
//! types of `ngfcommon-core` and delegates.
//!
//! ```text
//! C caller -> ABI entry (this crate) -> ngfcommon-core -> process-wide slot
//! ```
//!
//! Status codes returned to C are `ngf_error` values: `0` for success,
//! otherwise [`ngfcommon_core::ErrorCode`] as an integer.

#[macro_use]
mod macros;

mod util;

pub mod alloc_abi;
pub mod diag_abi;
pub mod platform_abi;
