//! Per-run state threaded through graph building, path resolution and
//! emission.

use std::collections::BTreeSet;

use parking_lot::Mutex;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::options::UnpackOptions;

/// Options, the diagnostics sink and the external-dependency registry of one
/// unpack run.
///
/// Shared by reference; both sinks lock internally so emission jobs on the
/// rayon pool can report through `&UnpackContext`.
#[derive(Debug, Default)]
pub struct UnpackContext {
    options: UnpackOptions,
    diagnostics: Diagnostics,
    externals: Mutex<BTreeSet<String>>,
}

impl UnpackContext {
    pub fn new(options: UnpackOptions) -> Self {
        Self {
            options,
            diagnostics: Diagnostics::new(),
            externals: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn options(&self) -> &UnpackOptions {
        &self.options
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Record a named-package specifier. Returns `true` on first sight.
    pub fn register_external(&self, specifier: &str) -> bool {
        let mut externals = self.externals.lock();
        if externals.contains(specifier) {
            return false;
        }
        tracing::debug!(specifier, "external dependency");
        externals.insert(specifier.to_string())
    }

    /// Registered specifiers, sorted and deduplicated (case-sensitive).
    pub fn externals(&self) -> Vec<String> {
        self.externals.lock().iter().cloned().collect()
    }

    pub fn into_parts(self) -> (UnpackOptions, Vec<Diagnostic>, Vec<String>) {
        let externals = self.externals.into_inner().into_iter().collect();
        (self.options, self.diagnostics.into_vec(), externals)
    }
}
