//! Allocator registry.
//!
//! Every allocation the library makes goes through the table installed in an
//! [`AllocatorRegistry`], never through the platform allocator directly. The
//! process-wide registry starts out empty, which routes requests to
//! [`SystemAllocator`]; hosts swap in their own [`AllocationCallbacks`] with
//! [`set_allocation_callbacks`].
//!
//! Memory must be freed through the same table that allocated it. Swapping
//! tables while allocations from the old one are outstanding is only sound
//! when both tables wrap the same underlying allocator.

mod counting;
mod system;

pub use counting::{AllocationStats, CountingAllocator};
pub use system::SystemAllocator;

use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::align::MAX_ALIGNMENT;
use crate::error::{ErrorCode, Result};

/// A pluggable allocate/free pair. The implementing value is the opaque
/// context the C API calls `userdata`.
///
/// # Safety
///
/// `allocate` must return either null or a pointer valid for reads and writes
/// of `element_size * count` bytes, aligned to [`MAX_ALIGNMENT`]. `free` must
/// accept every non-null pointer previously returned by `allocate` on the same
/// value, called with the same `element_size` and `count`.
pub unsafe trait AllocationCallbacks: Send + Sync {
    /// Requests storage for `count` contiguous elements of `element_size` bytes.
    fn allocate(&self, element_size: usize, count: usize) -> *mut c_void;

    /// Releases storage obtained from [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null and come from `allocate` on this table with the
    /// same `element_size` and `count`, and must not be used afterwards.
    unsafe fn free(&self, ptr: *mut c_void, element_size: usize, count: usize);
}

/// Slot holding the active allocation-callback table.
pub struct AllocatorRegistry {
    active: RwLock<Option<Arc<dyn AllocationCallbacks>>>,
}

impl AllocatorRegistry {
    /// Creates a registry routing to [`SystemAllocator`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: parking_lot::const_rwlock(None),
        }
    }

    /// Installs `table`, returning the one it replaces. `None` restores the
    /// built-in default.
    pub fn set(
        &self,
        table: Option<Arc<dyn AllocationCallbacks>>,
    ) -> Option<Arc<dyn AllocationCallbacks>> {
        let custom = table.is_some();
        let previous = std::mem::replace(&mut *self.active.write(), table);
        tracing::debug!(
            target: "ngfcommon::alloc",
            custom,
            replaced_custom = previous.is_some(),
            "allocation callbacks installed"
        );
        previous
    }

    /// The installed custom table, or `None` while the default is active.
    #[must_use]
    pub fn current(&self) -> Option<Arc<dyn AllocationCallbacks>> {
        self.active.read().clone()
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.active.read().is_none()
    }

    /// Requests `count` elements of `element_size` bytes from the active table.
    ///
    /// `None` means the table returned null; callers report it as
    /// [`ErrorCode::OutOfMemory`].
    #[must_use]
    pub fn allocate(&self, element_size: usize, count: usize) -> Option<NonNull<c_void>> {
        let ptr = match self.current() {
            Some(table) => table.allocate(element_size, count),
            None => SystemAllocator.allocate(element_size, count),
        };
        NonNull::new(ptr)
    }

    /// Like [`allocate`](Self::allocate), reporting failure as an error code
    /// after emitting an `Error` diagnostic.
    pub fn allocate_or_oom(&self, element_size: usize, count: usize) -> Result<NonNull<c_void>> {
        self.allocate(element_size, count).ok_or_else(|| {
            crate::diag_error!(
                "allocation of {count} element(s) of {element_size} byte(s) failed"
            );
            ErrorCode::OutOfMemory
        })
    }

    /// Releases storage through the active table. Null is a no-op.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must have been returned by [`allocate`](Self::allocate)
    /// on a table interchangeable with the active one, with the same
    /// `element_size` and `count`.
    pub unsafe fn free(&self, ptr: *mut c_void, element_size: usize, count: usize) {
        if ptr.is_null() {
            return;
        }
        match self.current() {
            Some(table) => unsafe { table.free(ptr, element_size, count) },
            None => unsafe { SystemAllocator.free(ptr, element_size, count) },
        }
    }
}

impl Default for AllocatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AllocatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocatorRegistry")
            .field("default", &self.is_default())
            .finish()
    }
}

static GLOBAL_REGISTRY: AllocatorRegistry = AllocatorRegistry::new();

/// The process-wide allocator registry.
#[must_use]
pub fn global() -> &'static AllocatorRegistry {
    &GLOBAL_REGISTRY
}

/// Installs the process-wide allocation table, returning the previous one.
pub fn set_allocation_callbacks(
    table: Option<Arc<dyn AllocationCallbacks>>,
) -> Option<Arc<dyn AllocationCallbacks>> {
    GLOBAL_REGISTRY.set(table)
}

/// Allocates through the process-wide registry.
#[must_use]
pub fn allocate(element_size: usize, count: usize) -> Option<NonNull<c_void>> {
    GLOBAL_REGISTRY.allocate(element_size, count)
}

/// Frees through the process-wide registry.
///
/// # Safety
///
/// See [`AllocatorRegistry::free`].
pub unsafe fn free(ptr: *mut c_void, element_size: usize, count: usize) {
    unsafe { GLOBAL_REGISTRY.free(ptr, element_size, count) }
}

/// Uninitialized storage for one `T`.
#[must_use]
pub fn alloc_one<T>() -> Option<NonNull<T>> {
    alloc_n::<T>(1)
}

/// Uninitialized storage for `count` contiguous `T`s.
#[must_use]
pub fn alloc_n<T>(count: usize) -> Option<NonNull<T>> {
    debug_assert!(std::mem::align_of::<T>() <= MAX_ALIGNMENT);
    allocate(std::mem::size_of::<T>(), count).map(NonNull::cast)
}

/// Releases storage from [`alloc_one`]. The value is not dropped.
///
/// # Safety
///
/// `ptr` must be null or come from `alloc_one::<T>()`.
pub unsafe fn free_one<T>(ptr: *mut T) {
    unsafe { free_n(ptr, 1) }
}

/// Releases storage from [`alloc_n`]. The values are not dropped.
///
/// # Safety
///
/// `ptr` must be null or come from `alloc_n::<T>(count)`.
pub unsafe fn free_n<T>(ptr: *mut T, count: usize) {
    unsafe { free(ptr.cast(), std::mem::size_of::<T>(), count) }
}
