//! # fob-unpack
//!
//! Reconstruct the original module tree from a browserify-style bundle.
//!
//! A bundle packs many CommonJS files into one script around a numeric
//! module table:
//!
//! ```text
//! {1: [function (require, module, exports) { ... }, {"./util": 2, "react": 3}],
//!  2: [function (require, module, exports) { ... }, {}], ...}
//! ```
//!
//! `fob-unpack` finds that table, rebuilds the dependency graph, infers each
//! module's original relative path from the `require` specifiers, and writes
//! one file per local module. Named-package dependencies are reported, not
//! written.
//!
//! ## Pipeline
//!
//! ```text
//! source ─▶ syntax::parse_source ─▶ locator ─▶ table ─▶ ModuleGraph::build
//!                                                             │
//!                     UnpackReport ◀─ Emitter::emit ◀─ resolver::resolve_paths
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fob_unpack::{NativeRuntime, UnpackOptions, unpack};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = std::fs::read_to_string("bundle.js")?;
//! let report = unpack(&source, Path::new("out"), &NativeRuntime, UnpackOptions::default())?;
//! println!("wrote {} files, externals: {:?}", report.written.len(), report.externals);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod format;
pub mod graph;
pub mod locator;
pub mod options;
pub mod resolver;
pub mod runtime;
pub mod sandbox;
pub mod span;
pub mod syntax;
pub mod table;
pub mod traversal;

#[cfg(test)]
mod tests;

use std::path::Path;

use serde::Serialize;

pub use context::UnpackContext;
pub use diagnostics::{Diagnostic, DiagnosticSeverity};
pub use emit::{EmitKind, Emitter, WrittenFile};
pub use error::{Result, UnpackError};
pub use format::{CodeFormatter, FormatError, NoopFormatter, OxcFormatter};
pub use graph::{ModuleGraph, ModuleId, ModuleNode};
pub use options::UnpackOptions;
pub use runtime::{NativeRuntime, Runtime, RuntimeError};
pub use span::SourceSpan;

/// Outcome of unpacking one bundle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpackReport {
    pub root: ModuleId,
    pub module_count: usize,
    /// Files written, in emission order.
    pub written: Vec<WrittenFile>,
    /// Named-package specifiers, sorted and deduplicated.
    pub externals: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl UnpackReport {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == DiagnosticSeverity::Warning)
    }
}

/// Unpack `source` into `out_dir` using the default formatter.
///
/// The formatter is [`OxcFormatter`] unless `options.format` is off.
pub fn unpack(
    source: &str,
    out_dir: &Path,
    runtime: &dyn Runtime,
    options: UnpackOptions,
) -> Result<UnpackReport> {
    if options.format {
        unpack_with_formatter(source, out_dir, runtime, &OxcFormatter, options)
    } else {
        unpack_with_formatter(source, out_dir, runtime, &NoopFormatter, options)
    }
}

/// Unpack `source` into `out_dir` with a caller-supplied formatter.
#[tracing::instrument(skip_all, fields(out_dir = %out_dir.display(), bytes = source.len()))]
pub fn unpack_with_formatter(
    source: &str,
    out_dir: &Path,
    runtime: &dyn Runtime,
    formatter: &dyn CodeFormatter,
    options: UnpackOptions,
) -> Result<UnpackReport> {
    let ctx = UnpackContext::new(options);

    let tree = syntax::parse_source(source)?;
    let span = locator::locate_module_table(&tree, ctx.options().max_nodes)?;
    tracing::debug!(%span, "module table located");
    drop(tree);

    let table = table::evaluate_table(source, span)?;
    let mut graph = ModuleGraph::build(table, &ctx)?;
    resolver::resolve_paths(&mut graph, &ctx);

    let written = Emitter::new(runtime, formatter, &ctx).emit(&graph, out_dir)?;

    let root = graph.root();
    let module_count = graph.len();
    let (_, diagnostics, externals) = ctx.into_parts();
    tracing::info!(
        modules = module_count,
        written = written.len(),
        externals = externals.len(),
        diagnostics = diagnostics.len(),
        "bundle unpacked"
    );

    Ok(UnpackReport {
        root,
        module_count,
        written,
        externals,
        diagnostics,
    })
}
