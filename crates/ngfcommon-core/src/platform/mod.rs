//! Platform compatibility shims.
//!
//! One contract per facility regardless of the host OS:
//! - [`mutex`]: init/lock/unlock/destroy, non-reentrant everywhere.
//! - [`tls`]: the [`ngfi_thread_local!`](crate::ngfi_thread_local) declaration.
//! - [`module`]: load a shared library and look up symbols in it.
//!
//! Higher-level code consumes these; the allocator registry and diagnostic
//! dispatcher do not.

pub mod module;
pub mod mutex;
pub mod tls;

pub use module::{
    ModuleError, ModuleHandle, get_symbol, last_module_error, load_module, load_module_cstr,
};
pub use mutex::{PlatformMutex, PlatformMutexGuard};
