//! Thread-local storage declarations.
//!
//! Expands to [`std::thread_local!`], which maps to the native TLS facility on
//! every target (`__thread` / `__declspec(thread)` or a keyed fallback).

/// Declares one or more thread-local statics.
///
/// ```
/// use std::cell::Cell;
///
/// ngfcommon_core::ngfi_thread_local! {
///     static FRAME_INDEX: Cell<u32> = const { Cell::new(0) };
/// }
///
/// FRAME_INDEX.with(|f| f.set(f.get() + 1));
/// assert_eq!(FRAME_INDEX.with(Cell::get), 1);
/// ```
#[macro_export]
macro_rules! ngfi_thread_local {
    ($($body:tt)*) => {
        ::std::thread_local! { $($body)* }
    };
}
