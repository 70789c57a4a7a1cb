//! Writing resolved modules to the output directory.
//!
//! Emission runs in two steps. A sequential pre-order walk from the root
//! plans one job per local module (parents before children). The jobs then
//! run on the rayon pool, or one by one when parallel emission is off. Each
//! job claims its node's write-once flag first, so a module is written at
//! most once no matter how often emission is requested.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::context::UnpackContext;
use crate::diagnostics::Diagnostic;
use crate::format::CodeFormatter;
use crate::graph::{ModuleGraph, ModuleId, ModuleNode};
use crate::resolver::output_file_name;
use crate::runtime::{Runtime, RuntimeResult};
use crate::sandbox;

/// How a module's content was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitKind {
    Script,
    Json,
}

/// One file written by the emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub module: ModuleId,
    pub path: PathBuf,
    pub kind: EmitKind,
}

struct Job {
    id: ModuleId,
    output: PathBuf,
    kind: EmitKind,
}

/// Writes modules through a [`Runtime`].
pub struct Emitter<'a> {
    runtime: &'a dyn Runtime,
    formatter: &'a dyn CodeFormatter,
    ctx: &'a UnpackContext,
}

impl<'a> Emitter<'a> {
    pub fn new(
        runtime: &'a dyn Runtime,
        formatter: &'a dyn CodeFormatter,
        ctx: &'a UnpackContext,
    ) -> Self {
        Self {
            runtime,
            formatter,
            ctx,
        }
    }

    /// Emit every resolved local module below `out_dir`.
    ///
    /// Returns the files written by this call, in pre-order.
    pub fn emit(&self, graph: &ModuleGraph, out_dir: &Path) -> RuntimeResult<Vec<WrittenFile>> {
        let jobs = self.plan(graph, out_dir);
        tracing::debug!(jobs = jobs.len(), parallel = self.ctx.options().parallel, "emitting");

        let results: Vec<RuntimeResult<Option<WrittenFile>>> = if self.ctx.options().parallel {
            jobs.par_iter().map(|job| self.run(graph, job)).collect()
        } else {
            jobs.iter().map(|job| self.run(graph, job)).collect()
        };

        let mut written = Vec::with_capacity(results.len());
        for result in results {
            if let Some(file) = result? {
                written.push(file);
            }
        }
        Ok(written)
    }

    fn plan(&self, graph: &ModuleGraph, out_dir: &Path) -> Vec<Job> {
        let default_extension = &self.ctx.options().default_extension;
        let mut jobs = Vec::new();
        let mut seen: FxHashSet<ModuleId> = FxHashSet::default();
        let mut stack = vec![graph.root()];

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(node) = graph.node(id) else {
                continue;
            };
            if node.is_external() {
                continue;
            }
            let Some(path) = node.path() else {
                continue;
            };

            let file_name = output_file_name(path, default_extension);
            let kind = if file_name.extension().is_some_and(|ext| ext == "json") {
                EmitKind::Json
            } else {
                EmitKind::Script
            };
            jobs.push(Job {
                id,
                output: out_dir.join(file_name.strip_prefix("/").unwrap_or(&file_name)),
                kind,
            });

            // reversed so the first child is popped first
            for &child in node.children().iter().rev() {
                if !seen.contains(&child) {
                    stack.push(child);
                }
            }
        }

        jobs
    }

    fn run(&self, graph: &ModuleGraph, job: &Job) -> RuntimeResult<Option<WrittenFile>> {
        let Some(node) = graph.node(job.id) else {
            return Ok(None);
        };
        if !node.claim_emission() {
            return Ok(None);
        }

        let content = match job.kind {
            EmitKind::Json => self.render_json(node, &job.output),
            EmitKind::Script => self.render_script(node, &job.output),
        };

        if let Some(parent) = job.output.parent() {
            self.runtime.create_dir_all(parent)?;
        }
        self.runtime.write_file(&job.output, content.as_bytes())?;
        tracing::trace!(module = %job.id, path = %job.output.display(), "written");

        Ok(Some(WrittenFile {
            module: job.id,
            path: job.output.clone(),
            kind: job.kind,
        }))
    }

    fn render_json(&self, node: &ModuleNode, output: &Path) -> String {
        let evaluated = sandbox::evaluate_exports(node.source(), &self.ctx.options().sandbox)
            .and_then(|value| sandbox::to_pretty_json(&value));
        match evaluated {
            Ok(json) => json,
            Err(err) => {
                self.ctx.report(Diagnostic::JsonEvaluationFailed {
                    module: node.id(),
                    path: output.to_path_buf(),
                    reason: err.to_string(),
                });
                ensure_trailing_newline(strip_wrapper(node.source()).trim().to_string())
            }
        }
    }

    fn render_script(&self, node: &ModuleNode, output: &Path) -> String {
        let body = strip_wrapper(node.source());
        let code = if self.ctx.options().format {
            match self.formatter.format(body) {
                Ok(formatted) => formatted,
                Err(err) => {
                    self.ctx.report(Diagnostic::FormatFailed {
                        module: node.id(),
                        path: output.to_path_buf(),
                        reason: err.to_string(),
                    });
                    body.trim().to_string()
                }
            }
        } else {
            body.trim().to_string()
        };

        let mut content = provenance_header(node);
        content.push_str(&code);
        ensure_trailing_newline(content)
    }
}

/// Text between the first `{` and the last `}` of a factory function.
///
/// Source without braces is returned whole.
pub fn strip_wrapper(source: &str) -> &str {
    match (source.find('{'), source.rfind('}')) {
        (Some(open), Some(close)) if open < close => &source[open + 1..close],
        _ => source,
    }
}

/// Comment naming the module's original id and the specifiers it was
/// required by.
pub fn provenance_header(node: &ModuleNode) -> String {
    let mut header = format!("// Module {} of the original bundle.\n", node.id());
    if node.referenced_by().is_empty() {
        header.push_str("// Entry module: not referenced by any other module.\n");
    } else {
        header.push_str("// Referenced as:\n");
        for specifier in node.referenced_by() {
            header.push_str(&format!("//   {specifier:?}\n"));
        }
    }
    header.push('\n');
    header
}

fn ensure_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
