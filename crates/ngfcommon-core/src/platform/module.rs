//! Dynamic module loading.
//!
//! `dlopen(RTLD_NOW)`/`dlsym` on Unix, `LoadLibraryA`/`GetProcAddress` on
//! Windows. The reason for the most recent load failure on the calling thread
//! is kept until [`last_module_error`] reads it, like `dlerror`.

use std::cell::RefCell;
use std::ffi::{CStr, CString, c_void};
use std::fmt;
use std::ptr::NonNull;

use thiserror::Error;

use crate::error::ErrorCode;

crate::ngfi_thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn set_last_error(reason: &str) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(reason.to_owned()));
}

/// Takes the calling thread's last load failure, clearing it.
#[must_use]
pub fn last_module_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("module name contains an interior NUL byte")]
    InvalidName,
    #[error("failed to load module `{name}`: {reason}")]
    LoadFailed { name: String, reason: String },
}

impl From<ModuleError> for ErrorCode {
    fn from(_: ModuleError) -> Self {
        ErrorCode::ObjectCreationFailed
    }
}

/// A loaded shared library. Unloaded on drop unless [`leak`](Self::leak)ed.
///
/// Symbols obtained from a handle are invalid once it is unloaded.
pub struct ModuleHandle {
    raw: NonNull<c_void>,
}

// SAFETY: loader handles are process-global and the loader APIs are
// thread-safe on every supported platform.
unsafe impl Send for ModuleHandle {}
unsafe impl Sync for ModuleHandle {}

impl ModuleHandle {
    /// Adopts a raw handle returned by the platform loader.
    ///
    /// # Safety
    ///
    /// `raw` must be a live handle from `dlopen` / `LoadLibrary` that nothing
    /// else will close.
    #[must_use]
    pub unsafe fn from_raw(raw: *mut c_void) -> Option<Self> {
        NonNull::new(raw).map(|raw| Self { raw })
    }

    #[must_use]
    pub fn as_raw(&self) -> *mut c_void {
        self.raw.as_ptr()
    }

    /// Keeps the module loaded for the rest of the process.
    #[must_use]
    pub fn leak(self) -> *mut c_void {
        let raw = self.raw.as_ptr();
        std::mem::forget(self);
        raw
    }

    /// Looks up `name` in this module.
    #[must_use]
    pub fn symbol(&self, name: &CStr) -> Option<NonNull<c_void>> {
        NonNull::new(sys::symbol(self.raw, name))
    }
}

impl Drop for ModuleHandle {
    fn drop(&mut self) {
        sys::close(self.raw);
    }
}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModuleHandle").field(&self.raw).finish()
    }
}

/// Loads the shared library `name`, resolving all symbols immediately.
pub fn load_module(name: &str) -> Result<ModuleHandle, ModuleError> {
    let c_name = CString::new(name).map_err(|_| {
        set_last_error("module name contains an interior NUL byte");
        ModuleError::InvalidName
    })?;
    load_module_cstr(&c_name)
}

/// [`load_module`] for callers that already hold a C string.
pub fn load_module_cstr(name: &CStr) -> Result<ModuleHandle, ModuleError> {
    match sys::open(name) {
        Ok(raw) => {
            tracing::debug!(target: "ngfcommon::module", module = ?name, "module loaded");
            Ok(ModuleHandle { raw })
        }
        Err(reason) => {
            tracing::warn!(target: "ngfcommon::module", module = ?name, %reason, "module load failed");
            set_last_error(&reason);
            Err(ModuleError::LoadFailed {
                name: name.to_string_lossy().into_owned(),
                reason,
            })
        }
    }
}

/// Looks up `name` in `handle`. `None` if the symbol is absent or the name
/// contains a NUL byte.
#[must_use]
pub fn get_symbol(handle: &ModuleHandle, name: &str) -> Option<NonNull<c_void>> {
    let c_name = CString::new(name).ok()?;
    handle.symbol(&c_name)
}

#[cfg(unix)]
mod sys {
    use std::ffi::{CStr, c_void};
    use std::ptr::NonNull;

    pub(super) fn open(name: &CStr) -> Result<NonNull<c_void>, String> {
        // SAFETY: `name` is a valid NUL-terminated string.
        let handle = unsafe { libc::dlopen(name.as_ptr(), libc::RTLD_NOW) };
        NonNull::new(handle).ok_or_else(loader_error)
    }

    pub(super) fn symbol(handle: NonNull<c_void>, name: &CStr) -> *mut c_void {
        // SAFETY: `handle` is live for the lifetime of the owning ModuleHandle.
        unsafe { libc::dlsym(handle.as_ptr(), name.as_ptr()) }
    }

    pub(super) fn close(handle: NonNull<c_void>) {
        // SAFETY: called once, from ModuleHandle::drop.
        unsafe { libc::dlclose(handle.as_ptr()) };
    }

    fn loader_error() -> String {
        // SAFETY: dlerror returns null or a NUL-terminated thread-local string.
        let msg = unsafe { libc::dlerror() };
        if msg.is_null() {
            return String::from("unknown dynamic loader error");
        }
        unsafe { CStr::from_ptr(msg) }
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(windows)]
mod sys {
    use std::ffi::{CStr, c_void};
    use std::ptr::NonNull;

    use windows::Win32::Foundation::{FreeLibrary, HMODULE};
    use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryA};
    use windows::core::PCSTR;

    pub(super) fn open(name: &CStr) -> Result<NonNull<c_void>, String> {
        // SAFETY: `name` is a valid NUL-terminated string.
        let module = unsafe { LoadLibraryA(PCSTR::from_raw(name.as_ptr().cast())) }
            .map_err(|e| e.to_string())?;
        NonNull::new(module.0).ok_or_else(|| String::from("LoadLibraryA returned null"))
    }

    pub(super) fn symbol(handle: NonNull<c_void>, name: &CStr) -> *mut c_void {
        // SAFETY: `handle` is live for the lifetime of the owning ModuleHandle.
        let proc = unsafe {
            GetProcAddress(HMODULE(handle.as_ptr()), PCSTR::from_raw(name.as_ptr().cast()))
        };
        proc.map_or(std::ptr::null_mut(), |f| f as *mut c_void)
    }

    pub(super) fn close(handle: NonNull<c_void>) {
        // SAFETY: called once, from ModuleHandle::drop.
        let _ = unsafe { FreeLibrary(HMODULE(handle.as_ptr())) };
    }
}
