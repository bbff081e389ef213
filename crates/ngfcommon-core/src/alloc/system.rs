//! Default allocation table backed by the C runtime heap.

use std::ffi::c_void;

use super::AllocationCallbacks;

/// Routes requests to `malloc`/`free`.
///
/// `malloc` already returns blocks aligned for any scalar type, which is the
/// alignment promised by [`AllocationCallbacks`]. Zero-byte requests are
/// rounded up to one byte so success always yields a freeable non-null
/// pointer; a byte count that overflows `usize` yields null.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

unsafe impl AllocationCallbacks for SystemAllocator {
    fn allocate(&self, element_size: usize, count: usize) -> *mut c_void {
        let Some(total) = element_size.checked_mul(count) else {
            return std::ptr::null_mut();
        };
        // SAFETY: malloc has no preconditions beyond a valid size.
        unsafe { libc::malloc(total.max(1)) }
    }

    unsafe fn free(&self, ptr: *mut c_void, _element_size: usize, _count: usize) {
        // SAFETY: caller guarantees `ptr` came from `allocate` above.
        unsafe { libc::free(ptr) }
    }
}
