//! # ngfcommon-core
//!
//! Process-wide services shared by every nicegraf backend:
//!
//! - **Allocator registry** (`alloc`): one swappable allocation-callback table.
//!   Library code allocates and frees exclusively through it.
//! - **Diagnostic dispatch** (`diag`): one swappable leveled-message sink.
//!   Messages are discarded while no sink is installed.
//! - **Precondition checks** (`check`): recoverable checks that return an
//!   [`ErrorCode`] and fatal checks that terminate the process.
//! - **Platform shims** (`platform`): mutex, thread-local declarations and
//!   dynamic module loading with one contract on every OS.
//!
//! No `unsafe` code is permitted at the crate level; the allocator and the
//! platform shims opt in per module.

#![deny(unsafe_code)]

pub mod align;
#[allow(unsafe_code)]
pub mod alloc;
pub mod check;
pub mod config;
pub mod diag;
pub mod error;
#[allow(unsafe_code)]
pub mod platform;
pub mod range;

pub use align::{MAX_ALIGNMENT, align_size, checked_align_size};
pub use alloc::{AllocationCallbacks, AllocatorRegistry, CountingAllocator, SystemAllocator};
pub use check::{ensure, fatal};
pub use config::DiagnosticVerbosity;
pub use diag::{DiagnosticLevel, DiagnosticSink, Dispatcher};
pub use error::{ErrorCode, Result};
pub use range::Range;
