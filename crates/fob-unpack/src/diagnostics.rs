//! Recoverable findings collected during an unpack run.
//!
//! Nothing in here aborts a run. Each finding is logged through `tracing`
//! when recorded (warnings at `warn`, notes at `debug`) and returned to the
//! caller in the [`UnpackReport`](crate::UnpackReport).

use std::path::PathBuf;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::graph::ModuleId;
use crate::table::DependencyTarget;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Warning,
    Note,
}

/// A recoverable finding with enough context to locate its cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Diagnostic {
    /// A dependency map names a module id the table does not contain.
    #[error("module {module} depends on missing module {target} via '{specifier}'")]
    DanglingDependency {
        module: ModuleId,
        specifier: String,
        target: DependencyTarget,
    },

    #[error("could not format module {module} ({}): {reason}", .path.display())]
    FormatFailed {
        module: ModuleId,
        path: PathBuf,
        reason: String,
    },

    #[error("could not evaluate JSON module {module} ({}): {reason}", .path.display())]
    JsonEvaluationFailed {
        module: ModuleId,
        path: PathBuf,
        reason: String,
    },

    /// A module is reachable through routes that imply different paths.
    /// The first path in pre-order from the root is kept.
    #[error(
        "module {module} kept path {} via {} (another route implies {})",
        .kept.display(),
        format_route(.route),
        .candidate.display()
    )]
    DivergentPath {
        module: ModuleId,
        kept: PathBuf,
        /// First-discoverer chain from the root that produced `kept`.
        route: Vec<ModuleId>,
        candidate: PathBuf,
    },

    /// Two modules resolved to the same output file.
    #[error(
        "module {module} resolved to {} which is taken; using {}",
        .requested.display(),
        .assigned.display()
    )]
    PathConflict {
        module: ModuleId,
        requested: PathBuf,
        assigned: PathBuf,
    },

    #[error("module {module} is not reachable from the root and was not written")]
    UnreachableModule { module: ModuleId },
}

impl Diagnostic {
    pub fn severity(&self) -> DiagnosticSeverity {
        match self {
            Diagnostic::DanglingDependency { .. }
            | Diagnostic::FormatFailed { .. }
            | Diagnostic::JsonEvaluationFailed { .. }
            | Diagnostic::PathConflict { .. } => DiagnosticSeverity::Warning,
            Diagnostic::DivergentPath { .. } | Diagnostic::UnreachableModule { .. } => {
                DiagnosticSeverity::Note
            }
        }
    }

    /// The module the finding is about.
    pub fn module(&self) -> ModuleId {
        match self {
            Diagnostic::DanglingDependency { module, .. }
            | Diagnostic::FormatFailed { module, .. }
            | Diagnostic::JsonEvaluationFailed { module, .. }
            | Diagnostic::DivergentPath { module, .. }
            | Diagnostic::PathConflict { module, .. }
            | Diagnostic::UnreachableModule { module } => *module,
        }
    }
}

/// Thread-safe diagnostics sink.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record a finding.
    pub fn push(&self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            DiagnosticSeverity::Warning => tracing::warn!("{diagnostic}"),
            DiagnosticSeverity::Note => tracing::debug!("{diagnostic}"),
        }
        self.entries.lock().push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries.into_inner()
    }
}

fn format_route(route: &[ModuleId]) -> String {
    route
        .iter()
        .map(ModuleId::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
