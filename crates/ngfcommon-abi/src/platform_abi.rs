//! ABI layer for the platform shims: mutexes and dynamic modules.
//!
//! Mutex objects are allocated through the active allocation table and are
//! opaque to C. Status returns are `ngf_error` values.

use std::cell::RefCell;
use std::ffi::{CString, c_char, c_int, c_void};
use std::mem::ManuallyDrop;
use std::ptr::NonNull;

use ngfcommon_core::alloc;
use ngfcommon_core::error::{self, ErrorCode, Result};
use ngfcommon_core::platform::{self, ModuleHandle, PlatformMutex};

use crate::util;

/// Opaque mutex handle.
#[allow(non_camel_case_types)]
pub type ngfi_mutex = PlatformMutex;

// ---------------------------------------------------------------------------
// Mutex
// ---------------------------------------------------------------------------

fn mutex_init(out: *mut *mut ngfi_mutex) -> Result<()> {
    ngfcommon_core::check_condition!(
        !out.is_null(),
        ErrorCode::InvalidOperation,
        "ngfi_mutex_init called with a null output pointer"
    );
    let Some(slot) = alloc::alloc_one::<ngfi_mutex>() else {
        ngfcommon_core::diag_error!("failed to allocate a mutex object");
        return Err(ErrorCode::OutOfMemory);
    };
    // SAFETY: fresh storage for one mutex; `out` checked non-null above.
    unsafe {
        slot.as_ptr().write(PlatformMutex::new());
        *out = slot.as_ptr();
    }
    Ok(())
}

/// # Safety
///
/// A non-null `mutex` must come from `ngfi_mutex_init` and not yet be destroyed.
unsafe fn require_mutex<'a>(mutex: *mut ngfi_mutex, op: &str) -> Result<&'a ngfi_mutex> {
    let Some(m) = NonNull::new(mutex) else {
        ngfcommon_core::diag_error!("{op} called with a null mutex");
        return Err(ErrorCode::InvalidOperation);
    };
    // SAFETY: per the function contract.
    Ok(unsafe { &*m.as_ptr() })
}

unsafe fn mutex_lock(mutex: *mut ngfi_mutex) -> Result<()> {
    unsafe { require_mutex(mutex, "ngfi_mutex_lock") }?.lock();
    Ok(())
}

unsafe fn mutex_unlock(mutex: *mut ngfi_mutex) -> Result<()> {
    let m = unsafe { require_mutex(mutex, "ngfi_mutex_unlock") }?;
    ngfcommon_core::check_condition!(
        m.is_locked(),
        ErrorCode::InvalidOperation,
        "ngfi_mutex_unlock called on a mutex that is not locked"
    );
    // SAFETY: the caller holds the lock.
    unsafe { m.unlock() };
    Ok(())
}

unsafe fn mutex_destroy(mutex: *mut ngfi_mutex) -> Result<()> {
    if mutex.is_null() {
        return Ok(());
    }
    let m = unsafe { require_mutex(mutex, "ngfi_mutex_destroy") }?;
    ngfcommon_core::check_condition!(
        !m.is_locked(),
        ErrorCode::InvalidOperation,
        "ngfi_mutex_destroy called on a locked mutex"
    );
    // SAFETY: allocated by mutex_init via alloc_one and unlocked.
    unsafe {
        std::ptr::drop_in_place(mutex);
        alloc::free_one(mutex);
    }
    Ok(())
}

abi_fn! {
    /// Allocates and initializes a mutex, storing it in `*out`.
    fn ngfi_mutex_init(out: *mut *mut ngfi_mutex) -> c_int {
        error::to_raw(mutex_init(out))
    }
}

abi_fn! {
    fn ngfi_mutex_lock(mutex: *mut ngfi_mutex) -> c_int {
        error::to_raw(mutex_lock(mutex))
    }
}

abi_fn! {
    fn ngfi_mutex_unlock(mutex: *mut ngfi_mutex) -> c_int {
        error::to_raw(mutex_unlock(mutex))
    }
}

abi_fn! {
    /// Destroys and frees a mutex. Null is a no-op; a locked mutex is refused.
    fn ngfi_mutex_destroy(mutex: *mut ngfi_mutex) -> c_int {
        error::to_raw(mutex_destroy(mutex))
    }
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

abi_fn! {
    /// Loads a shared library. Null on failure; the reason is available from
    /// [`ngfi_module_error`] on the same thread.
    fn ngfi_load_module(name: *const c_char) -> *mut c_void {
        // SAFETY: NUL-terminated per the C contract.
        let Some(name) = (unsafe { util::c_str_arg(name) }) else {
            return std::ptr::null_mut();
        };
        match platform::load_module_cstr(name) {
            Ok(handle) => handle.leak(),
            Err(err) => {
                ngfcommon_core::diag_info!("{err}");
                std::ptr::null_mut()
            }
        }
    }
}

abi_fn! {
    /// Resolves `name` in a handle from [`ngfi_load_module`]. Null when absent.
    fn ngfi_get_symbol(handle: *mut c_void, name: *const c_char) -> *mut c_void {
        // SAFETY: NUL-terminated per the C contract.
        let Some(name) = (unsafe { util::c_str_arg(name) }) else {
            return std::ptr::null_mut();
        };
        // SAFETY: borrowed, never closed here.
        let Some(handle) = (unsafe { ModuleHandle::from_raw(handle) }).map(ManuallyDrop::new) else {
            return std::ptr::null_mut();
        };
        handle.symbol(name).map_or(std::ptr::null_mut(), NonNull::as_ptr)
    }
}

abi_fn! {
    /// Unloads a handle from [`ngfi_load_module`]. Null is a no-op.
    fn ngfi_unload_module(handle: *mut c_void) {
        // SAFETY: the caller gives up the handle.
        drop(unsafe { ModuleHandle::from_raw(handle) });
    }
}

ngfcommon_core::ngfi_thread_local! {
    static MODULE_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

abi_fn! {
    /// Reason for the calling thread's most recent [`ngfi_load_module`]
    /// failure, or null. The string stays valid until the next call on the
    /// same thread.
    fn ngfi_module_error() -> *const c_char {
        let reason = platform::last_module_error().map(|r| util::to_c_string(&r));
        MODULE_ERROR.with(|slot| {
            let mut slot = slot.borrow_mut();
            *slot = reason;
            slot.as_ref().map_or(std::ptr::null(), |s| s.as_ptr())
        })
    }
}
