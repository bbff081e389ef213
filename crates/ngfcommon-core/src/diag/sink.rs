//! Built-in diagnostic sinks.

use std::io::Write;

use parking_lot::Mutex;
use serde::Serialize;

use super::{DiagnosticLevel, DiagnosticSink};
use crate::config::DiagnosticVerbosity;

/// Forwards diagnostics to the `tracing` subscriber of the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink {
    verbosity: DiagnosticVerbosity,
}

impl TracingSink {
    #[must_use]
    pub const fn new(verbosity: DiagnosticVerbosity) -> Self {
        Self { verbosity }
    }
}

impl DiagnosticSink for TracingSink {
    fn message(&self, level: DiagnosticLevel, message: &str) {
        match level {
            DiagnosticLevel::Info => tracing::info!(target: "ngfcommon", "{message}"),
            DiagnosticLevel::Warning => tracing::warn!(target: "ngfcommon", "{message}"),
            DiagnosticLevel::Error => tracing::error!(target: "ngfcommon", "{message}"),
        }
    }

    fn verbosity(&self) -> DiagnosticVerbosity {
        self.verbosity
    }
}

/// One JSONL line written by [`JsonLinesSink`].
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticRecord<'a> {
    pub level: DiagnosticLevel,
    pub message: &'a str,
}

/// Writes each diagnostic as a JSON object on its own line.
///
/// Write errors are swallowed: emitting a diagnostic never fails.
pub struct JsonLinesSink<W: Write + Send> {
    out: Mutex<W>,
    verbosity: DiagnosticVerbosity,
}

impl<W: Write + Send> JsonLinesSink<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            verbosity: DiagnosticVerbosity::Default,
        }
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: DiagnosticVerbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Recovers the underlying writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> DiagnosticSink for JsonLinesSink<W> {
    fn message(&self, level: DiagnosticLevel, message: &str) {
        let record = DiagnosticRecord { level, message };
        let mut out = self.out.lock();
        if serde_json::to_writer(&mut *out, &record).is_ok() {
            let _ = out.write_all(b"\n");
            let _ = out.flush();
        }
    }

    fn verbosity(&self) -> DiagnosticVerbosity {
        self.verbosity
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F> {
    f: F,
    verbosity: DiagnosticVerbosity,
}

impl<F> FnSink<F>
where
    F: Fn(DiagnosticLevel, &str) + Send + Sync,
{
    #[must_use]
    pub const fn new(f: F) -> Self {
        Self {
            f,
            verbosity: DiagnosticVerbosity::Default,
        }
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: DiagnosticVerbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}

impl<F> DiagnosticSink for FnSink<F>
where
    F: Fn(DiagnosticLevel, &str) + Send + Sync,
{
    fn message(&self, level: DiagnosticLevel, message: &str) {
        (self.f)(level, message);
    }

    fn verbosity(&self) -> DiagnosticVerbosity {
        self.verbosity
    }
}
