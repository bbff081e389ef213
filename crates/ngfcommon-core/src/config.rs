//! Diagnostic verbosity configuration.
//!
//! The installed diagnostic record carries a verbosity that backends consult
//! before producing chatty messages (validation-layer output, object names,
//! per-call traces). The `NGFCOMMON_DIAG_VERBOSITY` environment variable can
//! raise it process-wide without recompiling the host:
//! - `default`: only messages the backend considers noteworthy.
//! - `detailed`: everything, including informational traces.
//!
//! The dispatcher never filters on verbosity; it is advisory for producers.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the record's verbosity.
pub const VERBOSITY_ENV: &str = "NGFCOMMON_DIAG_VERBOSITY";

/// How much diagnostic output producers should generate.
#[repr(u32)]
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticVerbosity {
    #[default]
    Default = 0,
    Detailed = 1,
}

impl DiagnosticVerbosity {
    /// Parse from string (case-insensitive). Unknown values map to `Default`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "detailed" | "verbose" | "debug" | "all" | "1" => Self::Detailed,
            _ => Self::Default,
        }
    }

    /// Maps the raw C enum value. Unknown values map to `Default`.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::Detailed,
            _ => Self::Default,
        }
    }

    #[must_use]
    pub const fn is_detailed(self) -> bool {
        matches!(self, Self::Detailed)
    }
}

static ENV_VERBOSITY: OnceLock<DiagnosticVerbosity> = OnceLock::new();

fn parse_env(raw: Option<&str>) -> DiagnosticVerbosity {
    raw.map(DiagnosticVerbosity::from_str_loose).unwrap_or_default()
}

/// Verbosity requested through the environment, read on first use and
/// cached for the life of the process.
#[must_use]
pub fn env_verbosity() -> DiagnosticVerbosity {
    *ENV_VERBOSITY.get_or_init(|| {
        let verbosity = parse_env(std::env::var(VERBOSITY_ENV).ok().as_deref());
        tracing::debug!(target: "ngfcommon::config", ?verbosity, "environment verbosity resolved");
        verbosity
    })
}

/// Verbosity producers should honor right now: the installed record's
/// verbosity, raised by the environment override.
#[must_use]
pub fn effective_verbosity() -> DiagnosticVerbosity {
    let record = crate::diag::global().verbosity().unwrap_or_default();
    record.max(env_verbosity())
}
