//! Leveled diagnostic dispatch.
//!
//! A [`Dispatcher`] holds at most one [`DiagnosticSink`]. Messages emitted
//! while no sink is installed are dropped without being formatted. The
//! process-wide dispatcher is reached through [`global`] and the `diag_*!`
//! macros; hosts that want isolated configuration can own a `Dispatcher`.
//!
//! The sink is invoked outside the slot lock, so a sink may replace itself
//! (or emit further diagnostics) from inside its callback.

mod sink;

pub use sink::{DiagnosticRecord, FnSink, JsonLinesSink, TracingSink};

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::DiagnosticVerbosity;

/// Severity attached to a diagnostic message. Carries no control-flow effect.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info = 0,
    Warning = 1,
    Error = 2,
}

impl DiagnosticLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Maps the raw C enum value (`ngf_diagnostic_message_type`).
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Info),
            1 => Some(Self::Warning),
            2 => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of formatted diagnostic messages.
///
/// The implementing value plays the role of the C record's `userdata`.
pub trait DiagnosticSink: Send + Sync {
    /// Called once per emitted message with the fully formatted text.
    fn message(&self, level: DiagnosticLevel, message: &str);

    /// Verbosity requested by whoever installed this sink.
    fn verbosity(&self) -> DiagnosticVerbosity {
        DiagnosticVerbosity::Default
    }
}

/// Slot holding the active diagnostic sink.
pub struct Dispatcher {
    sink: RwLock<Option<Arc<dyn DiagnosticSink>>>,
}

impl Dispatcher {
    /// Creates a dispatcher with no sink installed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sink: parking_lot::const_rwlock(None),
        }
    }

    /// Installs `sink`, returning the one it replaces. `None` disables output.
    pub fn set(&self, sink: Option<Arc<dyn DiagnosticSink>>) -> Option<Arc<dyn DiagnosticSink>> {
        let installed = sink.is_some();
        let previous = std::mem::replace(&mut *self.sink.write(), sink);
        tracing::debug!(
            target: "ngfcommon::diag",
            installed,
            replaced = previous.is_some(),
            "diagnostic sink updated"
        );
        previous
    }

    /// The currently installed sink, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<dyn DiagnosticSink>> {
        self.sink.read().clone()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.sink.read().is_some()
    }

    /// Verbosity of the installed sink, or `None` when diagnostics are off.
    #[must_use]
    pub fn verbosity(&self) -> Option<DiagnosticVerbosity> {
        self.current().map(|sink| sink.verbosity())
    }

    /// Formats `args` and hands the message to the installed sink.
    pub fn emit(&self, level: DiagnosticLevel, args: fmt::Arguments<'_>) {
        let Some(sink) = self.current() else {
            return;
        };
        match args.as_str() {
            Some(literal) => sink.message(level, literal),
            None => sink.message(level, &fmt::format(args)),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("active", &self.is_active())
            .finish()
    }
}

static GLOBAL_DISPATCHER: Dispatcher = Dispatcher::new();

/// The process-wide dispatcher used by the `diag_*!` macros.
#[must_use]
pub fn global() -> &'static Dispatcher {
    &GLOBAL_DISPATCHER
}

/// Installs the process-wide diagnostic sink, returning the previous one.
pub fn set_diagnostic_info(
    sink: Option<Arc<dyn DiagnosticSink>>,
) -> Option<Arc<dyn DiagnosticSink>> {
    GLOBAL_DISPATCHER.set(sink)
}

/// Emits a message through the process-wide dispatcher.
pub fn emit(level: DiagnosticLevel, args: fmt::Arguments<'_>) {
    GLOBAL_DISPATCHER.emit(level, args);
}

/// Emits a diagnostic at an explicit level through the process-wide dispatcher.
///
/// ```
/// use ngfcommon_core::{diag_msg, diag::DiagnosticLevel};
/// diag_msg!(DiagnosticLevel::Warning, "x={}", 5);
/// ```
#[macro_export]
macro_rules! diag_msg {
    ($level:expr, $($arg:tt)+) => {
        $crate::diag::emit($level, ::core::format_args!($($arg)+))
    };
}

/// Emits an `Info` diagnostic.
#[macro_export]
macro_rules! diag_info {
    ($($arg:tt)+) => {
        $crate::diag_msg!($crate::diag::DiagnosticLevel::Info, $($arg)+)
    };
}

/// Emits a `Warning` diagnostic.
#[macro_export]
macro_rules! diag_warning {
    ($($arg:tt)+) => {
        $crate::diag_msg!($crate::diag::DiagnosticLevel::Warning, $($arg)+)
    };
}

/// Emits an `Error` diagnostic.
#[macro_export]
macro_rules! diag_error {
    ($($arg:tt)+) => {
        $crate::diag_msg!($crate::diag::DiagnosticLevel::Error, $($arg)+)
    };
}
