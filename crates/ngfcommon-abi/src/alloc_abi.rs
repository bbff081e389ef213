//! ABI layer for allocation callbacks and the `ngfi_alloc` family.
//!
//! The registry keeps the caller's `ngf_allocation_callbacks` pointer rather
//! than a copy, so the table must outlive its installation. Function pointers
//! are re-read on every call.

use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::Arc;

use ngfcommon_core::alloc::{self, AllocationCallbacks};
use ngfcommon_core::align;

/// `void* (*allocate)(size_t element_size, size_t count, void* userdata)`
#[allow(non_camel_case_types)]
pub type ngf_allocate_fn =
    unsafe extern "C" fn(element_size: usize, count: usize, userdata: *mut c_void) -> *mut c_void;

/// `void (*free)(void* ptr, size_t element_size, size_t count, void* userdata)`
#[allow(non_camel_case_types)]
pub type ngf_free_fn =
    unsafe extern "C" fn(ptr: *mut c_void, element_size: usize, count: usize, userdata: *mut c_void);

/// Host-supplied allocation table.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
#[allow(non_camel_case_types)]
pub struct ngf_allocation_callbacks {
    pub allocate: Option<ngf_allocate_fn>,
    pub free: Option<ngf_free_fn>,
    pub userdata: *mut c_void,
}

/// Adapts a C table to [`AllocationCallbacks`].
struct ForeignTable {
    table: NonNull<ngf_allocation_callbacks>,
}

// SAFETY: the host promises its callbacks may be invoked from any thread for
// as long as the table is installed.
unsafe impl Send for ForeignTable {}
unsafe impl Sync for ForeignTable {}

impl ForeignTable {
    fn table(&self) -> &ngf_allocation_callbacks {
        // SAFETY: the table outlives its installation.
        unsafe { self.table.as_ref() }
    }
}

// SAFETY: forwards to the host's allocator, which carries the same contract.
unsafe impl AllocationCallbacks for ForeignTable {
    fn allocate(&self, element_size: usize, count: usize) -> *mut c_void {
        let table = self.table();
        match table.allocate {
            // SAFETY: host callback invoked with its own userdata.
            Some(allocate) => unsafe { allocate(element_size, count, table.userdata) },
            None => std::ptr::null_mut(),
        }
    }

    unsafe fn free(&self, ptr: *mut c_void, element_size: usize, count: usize) {
        let table = self.table();
        if let Some(free) = table.free {
            // SAFETY: `ptr` came from this table's allocate.
            unsafe { free(ptr, element_size, count, table.userdata) };
        }
    }
}

/// Turns a raw table pointer into what the registry should hold.
///
/// Null, or a table missing either function, restores the default allocator.
fn adopt_table(callbacks: *const ngf_allocation_callbacks) -> Option<Arc<dyn AllocationCallbacks>> {
    let table = NonNull::new(callbacks.cast_mut())?;
    // SAFETY: non-null and valid per the installation contract.
    let view = unsafe { table.as_ref() };
    if view.allocate.is_none() || view.free.is_none() {
        ngfcommon_core::diag_warning!(
            "allocation callbacks are missing allocate or free; using the default allocator"
        );
        return None;
    }
    Some(Arc::new(ForeignTable { table }))
}

abi_fn! {
    /// Installs the process-wide allocation table. Null restores the default.
    fn ngfi_set_allocation_callbacks(callbacks: *const ngf_allocation_callbacks) {
        let _previous = alloc::set_allocation_callbacks(adopt_table(callbacks));
    }
}

abi_fn! {
    /// Allocates `count` elements of `element_size` bytes through the active
    /// table. Null on failure.
    fn ngfi_alloc(element_size: usize, count: usize) -> *mut c_void {
        alloc::allocate(element_size, count).map_or(std::ptr::null_mut(), NonNull::as_ptr)
    }
}

abi_fn! {
    /// Releases memory from [`ngfi_alloc`] with the same size and count.
    fn ngfi_free(ptr: *mut c_void, element_size: usize, count: usize) {
        // SAFETY: `ptr` came from ngfi_alloc with these arguments.
        unsafe { alloc::free(ptr, element_size, count) }
    }
}

abi_fn! {
    /// Rounds `size` up to the platform's maximum fundamental alignment.
    fn ngfi_align_size(size: usize) -> usize {
        align::align_size(size)
    }
}

abi_fn! {
    fn ngfi_max_alignment() -> usize {
        align::MAX_ALIGNMENT
    }
}
