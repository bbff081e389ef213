//! Shared internal utilities for ABI adapters.

use std::ffi::{CStr, CString, c_char};

/// Borrows a C string argument, `None` for null.
///
/// # Safety
///
/// A non-null `ptr` must point to a NUL-terminated string that stays valid
/// for `'a`.
pub(crate) unsafe fn c_str_arg<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null and NUL-terminated per the caller contract.
    Some(unsafe { CStr::from_ptr(ptr) })
}

/// Converts `text` for a C callee. Interior NUL bytes are dropped rather than
/// truncating the message.
pub(crate) fn to_c_string(text: &str) -> CString {
    CString::new(text).unwrap_or_else(|err| {
        let mut bytes = err.into_vec();
        bytes.retain(|&b| b != 0);
        CString::new(bytes).unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_argument_is_none() {
        assert!(unsafe { c_str_arg(std::ptr::null()) }.is_none());
    }

    #[test]
    fn borrows_terminated_string() {
        let owned = c"vulkan-1.dll";
        let borrowed = unsafe { c_str_arg(owned.as_ptr()) }.unwrap();
        assert_eq!(borrowed.to_str(), Ok("vulkan-1.dll"));
    }

    #[test]
    fn interior_nul_is_dropped() {
        assert_eq!(to_c_string("plain").as_bytes(), b"plain");
        assert_eq!(to_c_string("a\0b\0c").as_bytes(), b"abc");
    }
}
