//! ABI layer for diagnostic callbacks.
//!
//! Unlike allocation tables, the `ngf_diagnostic_info` record is copied on
//! installation; the caller may free it immediately afterwards.

use std::ffi::{c_char, c_void};
use std::sync::Arc;

use ngfcommon_core::config::{self, DiagnosticVerbosity};
use ngfcommon_core::diag::{self, DiagnosticLevel, DiagnosticSink};

use crate::util;

#[allow(non_camel_case_types)]
pub type ngf_diagnostic_message_type = u32;

pub const NGF_DIAGNOSTIC_INFO: ngf_diagnostic_message_type = DiagnosticLevel::Info as u32;
pub const NGF_DIAGNOSTIC_WARNING: ngf_diagnostic_message_type = DiagnosticLevel::Warning as u32;
pub const NGF_DIAGNOSTIC_ERROR: ngf_diagnostic_message_type = DiagnosticLevel::Error as u32;

pub const NGF_DIAGNOSTICS_VERBOSITY_DEFAULT: u32 = DiagnosticVerbosity::Default as u32;
pub const NGF_DIAGNOSTICS_VERBOSITY_DETAILED: u32 = DiagnosticVerbosity::Detailed as u32;

/// `void (*callback)(ngf_diagnostic_message_type, void* userdata, const char* message)`
#[allow(non_camel_case_types)]
pub type ngf_diagnostic_callback =
    unsafe extern "C" fn(level: ngf_diagnostic_message_type, userdata: *mut c_void, message: *const c_char);

#[repr(C)]
#[derive(Debug, Clone, Copy)]
#[allow(non_camel_case_types)]
pub struct ngf_diagnostic_info {
    pub verbosity: u32,
    pub userdata: *mut c_void,
    pub callback: Option<ngf_diagnostic_callback>,
}

/// A copied `ngf_diagnostic_info` acting as a [`DiagnosticSink`].
struct ForeignSink {
    verbosity: DiagnosticVerbosity,
    userdata: *mut c_void,
    callback: ngf_diagnostic_callback,
}

// SAFETY: the host promises its callback may be invoked from any thread.
unsafe impl Send for ForeignSink {}
unsafe impl Sync for ForeignSink {}

impl DiagnosticSink for ForeignSink {
    fn message(&self, level: DiagnosticLevel, message: &str) {
        let text = util::to_c_string(message);
        // SAFETY: host callback invoked with its own userdata and a string
        // that lives until it returns.
        unsafe { (self.callback)(level as u32, self.userdata, text.as_ptr()) };
    }

    fn verbosity(&self) -> DiagnosticVerbosity {
        self.verbosity
    }
}

abi_fn! {
    /// Installs the process-wide diagnostic callback. A null record or a null
    /// callback disables diagnostics.
    fn ngfi_set_diagnostic_info(info: *const ngf_diagnostic_info) {
        let sink = if info.is_null() {
            None
        } else {
            // SAFETY: non-null record supplied by the caller.
            let info = unsafe { *info };
            info.callback.map(|callback| {
                Arc::new(ForeignSink {
                    verbosity: DiagnosticVerbosity::from_raw(info.verbosity),
                    userdata: info.userdata,
                    callback,
                }) as Arc<dyn DiagnosticSink>
            })
        };
        let _previous = diag::set_diagnostic_info(sink);
    }
}

abi_fn! {
    /// Emits a preformatted message. Unknown levels are reported as errors;
    /// a null message is ignored.
    fn ngfi_diag_emit(level: ngf_diagnostic_message_type, message: *const c_char) {
        // SAFETY: NUL-terminated per the C contract.
        let Some(message) = (unsafe { util::c_str_arg(message) }) else {
            return;
        };
        let level = DiagnosticLevel::from_raw(level).unwrap_or(DiagnosticLevel::Error);
        diag::emit(level, format_args!("{}", message.to_string_lossy()));
    }
}

abi_fn! {
    /// Verbosity the library should honor: the installed record's, raised by
    /// `NGFCOMMON_DIAG_VERBOSITY`.
    fn ngfi_diag_verbosity() -> u32 {
        config::effective_verbosity() as u32
    }
}
