//! Precondition checks.
//!
//! Two tiers, both reporting through the process-wide diagnostic dispatcher
//! before any control-flow effect:
//!
//! - [`check_condition!`](crate::check_condition) / [`ensure`]: emit one
//!   `Error` diagnostic and hand an [`ErrorCode`] back to the caller. Nothing is
//!   cleaned up on the way out; the calling routine releases whatever it holds.
//! - [`check_fatal!`](crate::check_fatal) / [`fatal`]: emit one `Error`
//!   diagnostic and terminate the process with [`FATAL_EXIT_CODE`]. No
//!   unwinding takes place. Reserved for corrupted internal state, never for
//!   bad user input.

use std::fmt;

use crate::diag::{self, DiagnosticLevel};
use crate::error::{ErrorCode, Result};

/// Exit status used by [`fatal`].
pub const FATAL_EXIT_CODE: i32 = 1;

/// Returns `Err(err)` after emitting `args` as an `Error` diagnostic when
/// `condition` is false.
///
/// Composes with `?`:
///
/// ```
/// use ngfcommon_core::{ensure, ErrorCode};
///
/// fn slot(idx: usize, len: usize) -> ngfcommon_core::Result<usize> {
///     ensure(idx < len, ErrorCode::OutOfBounds, format_args!("slot {idx} >= {len}"))?;
///     Ok(idx)
/// }
/// assert_eq!(slot(9, 4), Err(ErrorCode::OutOfBounds));
/// ```
pub fn ensure(condition: bool, err: ErrorCode, args: fmt::Arguments<'_>) -> Result<()> {
    if condition {
        return Ok(());
    }
    diag::emit(DiagnosticLevel::Error, args);
    Err(err)
}

/// Emits `args` as an `Error` diagnostic and terminates the process.
pub fn fatal(args: fmt::Arguments<'_>) -> ! {
    diag::emit(DiagnosticLevel::Error, args);
    std::process::exit(FATAL_EXIT_CODE)
}

/// Early-returns `Err(err.into())` from the enclosing function after one
/// `Error` diagnostic when the condition is false.
///
/// ```
/// use ngfcommon_core::{check_condition, ErrorCode};
///
/// fn resize(width: u32) -> ngfcommon_core::Result<u32> {
///     check_condition!(width > 0, ErrorCode::InvalidSize, "width must be non-zero, got {}", width);
///     Ok(width * 2)
/// }
/// assert_eq!(resize(0), Err(ErrorCode::InvalidSize));
/// assert_eq!(resize(3), Ok(6));
/// ```
#[macro_export]
macro_rules! check_condition {
    ($cond:expr, $err:expr, $($arg:tt)+) => {
        if !($cond) {
            $crate::diag_error!($($arg)+);
            return ::core::result::Result::Err(::core::convert::From::from($err));
        }
    };
}

/// Terminates the process after one `Error` diagnostic when the condition is
/// false.
#[macro_export]
macro_rules! check_fatal {
    ($cond:expr, $($arg:tt)+) => {
        if !($cond) {
            $crate::check::fatal(::core::format_args!($($arg)+));
        }
    };
}
