//! Size alignment to the platform's widest scalar.
//!
//! Every block handed out by the default allocator is aligned for the widest
//! scalar type (`long double` / `max_align_t`). Sub-allocators that carve
//! several objects out of one block round each object's size with
//! [`align_size`] so the next object starts on the same boundary.

/// Alignment of the widest scalar type on the target.
///
/// Matches `sizeof(long double)` where that is a power of two; MSVC and Apple
/// arm64 make `long double` a plain `double`. On 32-bit x86 Linux, where it is
/// 12 bytes, this follows `max_align_t` instead.
#[cfg(any(
    all(target_arch = "x86_64", not(target_env = "msvc")),
    all(
        target_arch = "aarch64",
        not(target_env = "msvc"),
        not(target_vendor = "apple")
    ),
    target_arch = "loongarch64",
    target_arch = "mips64",
    target_arch = "powerpc64",
    target_arch = "riscv64",
    target_arch = "s390x",
    target_arch = "sparc64",
    target_arch = "wasm32",
    all(target_arch = "x86", target_os = "linux"),
))]
pub const MAX_ALIGNMENT: usize = 16;

/// Alignment of the widest scalar type on the target.
#[cfg(not(any(
    all(target_arch = "x86_64", not(target_env = "msvc")),
    all(
        target_arch = "aarch64",
        not(target_env = "msvc"),
        not(target_vendor = "apple")
    ),
    target_arch = "loongarch64",
    target_arch = "mips64",
    target_arch = "powerpc64",
    target_arch = "riscv64",
    target_arch = "s390x",
    target_arch = "sparc64",
    target_arch = "wasm32",
    all(target_arch = "x86", target_os = "linux"),
)))]
pub const MAX_ALIGNMENT: usize = 8;

const ALIGN_MASK: usize = MAX_ALIGNMENT - 1;

const _: () = assert!(MAX_ALIGNMENT.is_power_of_two());

/// Rounds `size` up to the nearest multiple of [`MAX_ALIGNMENT`].
///
/// Sizes within one alignment unit of `usize::MAX` wrap to zero; use
/// [`checked_align_size`] when the input is not a realistic allocation size.
#[inline]
#[must_use]
pub const fn align_size(size: usize) -> usize {
    let quotient = size & !ALIGN_MASK;
    let remainder = size & ALIGN_MASK;
    if remainder == 0 {
        quotient
    } else {
        quotient.wrapping_add(MAX_ALIGNMENT)
    }
}

/// Like [`align_size`], but returns `None` if the rounded size does not fit.
#[inline]
#[must_use]
pub const fn checked_align_size(size: usize) -> Option<usize> {
    let quotient = size & !ALIGN_MASK;
    if size & ALIGN_MASK == 0 {
        Some(quotient)
    } else {
        quotient.checked_add(MAX_ALIGNMENT)
    }
}
