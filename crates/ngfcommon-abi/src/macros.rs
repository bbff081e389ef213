//! Helper macros for ABI function generation.

/// Generates a `#[unsafe(no_mangle)] pub unsafe extern "C" fn` with the given
/// signature and body.
///
/// ```ignore
/// abi_fn! {
///     /// Doc comment for the function.
///     fn ngfi_example(size: usize) -> usize {
///         size * 2
///     }
/// }
/// ```
///
/// The body runs inside an `unsafe` block; each raw-pointer dereference
/// still carries its own `SAFETY:` note at the use site.
macro_rules! abi_fn {
    (
        $(#[$meta:meta])*
        fn $name:ident( $($arg:ident : $argty:ty),* $(,)? ) -> $ret:ty
        $body:block
    ) => {
        $(#[$meta])*
        #[unsafe(no_mangle)]
        #[allow(unused_unsafe)]
        pub unsafe extern "C" fn $name( $($arg : $argty),* ) -> $ret {
            unsafe { $body }
        }
    };

    // Variant without return type (returns ())
    (
        $(#[$meta:meta])*
        fn $name:ident( $($arg:ident : $argty:ty),* $(,)? )
        $body:block
    ) => {
        $(#[$meta])*
        #[unsafe(no_mangle)]
        #[allow(unused_unsafe)]
        pub unsafe extern "C" fn $name( $($arg : $argty),* ) {
            unsafe { $body }
        }
    };
}
