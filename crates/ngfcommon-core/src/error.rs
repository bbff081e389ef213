//! Error codes returned across the library boundary.
//!
//! The numeric values are part of the C ABI (`ngf_error`); `0` means success
//! and is represented on the Rust side by `Ok(..)`.

use thiserror::Error;

/// Recoverable failure reported to the immediate caller.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorCode {
    #[error("out of memory")]
    OutOfMemory = 1,
    #[error("object creation failed")]
    ObjectCreationFailed = 2,
    #[error("index out of bounds")]
    OutOfBounds = 3,
    #[error("invalid format")]
    InvalidFormat = 4,
    #[error("invalid size")]
    InvalidSize = 5,
    #[error("invalid enum value")]
    InvalidEnumValue = 6,
    #[error("invalid operation")]
    InvalidOperation = 7,
}

/// Result alias used throughout the library.
pub type Result<T> = core::result::Result<T, ErrorCode>;

/// Raw C value for success.
pub const NGF_ERROR_OK: i32 = 0;

impl ErrorCode {
    /// The integer value of this code at the C boundary.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Maps a raw C value back to a code. `0` and unknown values yield `None`.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(Self::OutOfMemory),
            2 => Some(Self::ObjectCreationFailed),
            3 => Some(Self::OutOfBounds),
            4 => Some(Self::InvalidFormat),
            5 => Some(Self::InvalidSize),
            6 => Some(Self::InvalidEnumValue),
            7 => Some(Self::InvalidOperation),
            _ => None,
        }
    }
}

/// Flattens a `Result<(), ErrorCode>` into the raw C return value.
#[must_use]
pub fn to_raw(result: Result<()>) -> i32 {
    match result {
        Ok(()) => NGF_ERROR_OK,
        Err(code) => code.as_raw(),
    }
}
