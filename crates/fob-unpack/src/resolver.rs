//! Path inference for local modules.
//!
//! Starting at the root, the resolver walks the first-discoverer tree the way
//! a CommonJS loader would resolve `require` calls: a relative specifier is
//! joined onto the directory of the requiring module and normalized, and the
//! result becomes the target's path. Named-package specifiers (`"react"`,
//! `"lodash/map"`) are external: they are registered, their targets are
//! flagged and never followed.
//!
//! ```text
//! /ROOT_APP_MODULE.js ──"./lib/a"──▶ /lib/a ──"../b"──▶ /b
//!          └──────────"react"──────▶ (external)
//! ```
//!
//! Assignments are write-once. A module is placed relative to the module that
//! discovered it first; any other route implying a different path gets a
//! [`Diagnostic::DivergentPath`] note naming the route that was kept.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::UnpackContext;
use crate::diagnostics::Diagnostic;
use crate::graph::{ModuleGraph, ModuleId};
use crate::table::DependencyTarget;

/// Extensions kept as-is on output files. Anything else gets the default
/// extension appended.
pub const KNOWN_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "tsx", "json"];

/// Returns `true` for specifiers resolved against the requiring module.
pub fn is_local_specifier(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
        || specifier == "."
        || specifier == ".."
}

/// Resolve `specifier` against the module at `from`.
///
/// `..` never climbs above `/`. Specifiers naming a directory (trailing `/`,
/// or a last segment of `.` or `..`) resolve to that directory's `index`.
pub fn resolve_specifier(from: &Path, specifier: &str) -> PathBuf {
    let base = from.parent().unwrap_or_else(|| Path::new("/"));
    let joined = if specifier.starts_with('/') {
        PathBuf::from(specifier)
    } else {
        base.join(specifier)
    };
    let mut resolved = joined.clean();
    if !resolved.has_root() {
        resolved = Path::new("/").join(resolved).clean();
    }
    if names_directory(specifier) {
        resolved.push("index");
    }
    resolved
}

fn names_directory(specifier: &str) -> bool {
    specifier.ends_with('/') || matches!(specifier.rsplit('/').next(), Some("." | ".."))
}

/// File name used on disk for a module path.
pub fn output_file_name(path: &Path, default_extension: &str) -> PathBuf {
    let known = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| KNOWN_EXTENSIONS.contains(&ext));
    if known {
        return path.to_path_buf();
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(default_extension);
    PathBuf::from(name)
}

/// `/lib/a.js` -> `/lib/a_7.js`, `/lib/a` -> `/lib/a_7`.
fn suffixed_path(path: &Path, id: ModuleId, attempt: usize) -> PathBuf {
    let suffix = if attempt == 0 {
        format!("_{id}")
    } else {
        format!("_{id}_{attempt}")
    };
    let has_known_ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| KNOWN_EXTENSIONS.contains(&ext));

    let (stem, ext) = if has_known_ext {
        (
            path.file_stem().map(OsString::from).unwrap_or_default(),
            path.extension().map(|ext| {
                let mut dotted = OsString::from(".");
                dotted.push(ext);
                dotted
            }),
        )
    } else {
        (path.file_name().map(OsString::from).unwrap_or_default(), None)
    };

    let mut file_name = stem;
    file_name.push(suffix);
    if let Some(ext) = ext {
        file_name.push(ext);
    }
    path.with_file_name(file_name)
}

/// Outcome of a resolver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    /// Paths assigned by this run.
    pub assigned: usize,
    /// Local modules that received no path.
    pub unreachable: usize,
}

struct Frame {
    id: ModuleId,
    next_child: usize,
}

/// Output-file ownership, so no two modules share a file.
struct Claims<'a> {
    owners: FxHashMap<PathBuf, ModuleId>,
    default_extension: &'a str,
}

impl<'a> Claims<'a> {
    fn new(graph: &ModuleGraph, default_extension: &'a str) -> Self {
        let owners = graph
            .nodes()
            .filter_map(|node| {
                node.path()
                    .map(|path| (output_file_name(path, default_extension), node.id()))
            })
            .collect();
        Self {
            owners,
            default_extension,
        }
    }

    fn is_free_for(&self, path: &Path, id: ModuleId) -> bool {
        self.owners
            .get(&output_file_name(path, self.default_extension))
            .is_none_or(|owner| *owner == id)
    }

    /// Claim `requested` for `id`, or the first free suffixed variant.
    fn claim(&mut self, requested: PathBuf, id: ModuleId) -> PathBuf {
        let mut path = requested;
        let mut attempt = 0;
        let original = path.clone();
        while !self.is_free_for(&path, id) {
            path = suffixed_path(&original, id, attempt);
            attempt += 1;
        }
        self.owners
            .insert(output_file_name(&path, self.default_extension), id);
        path
    }
}

/// Assign paths to every local module reachable from the root.
///
/// Paths follow the first-discoverer tree: a child is resolved against its
/// parent's path with the specifier of the link that discovered it. Every
/// other link is checked afterwards; one that implies a different path gets a
/// [`Diagnostic::DivergentPath`] note.
///
/// Running this again on the same graph changes nothing and reports nothing
/// new.
pub fn resolve_paths(graph: &mut ModuleGraph, ctx: &UnpackContext) -> ResolveSummary {
    let default_extension = ctx.options().default_extension.clone();
    let mut claims = Claims::new(graph, &default_extension);
    let mut summary = ResolveSummary::default();
    let first_run = !graph.is_resolved();

    let root = graph.root();
    let mut in_progress: FxHashSet<ModuleId> = FxHashSet::default();
    let mut stack = vec![Frame {
        id: root,
        next_child: 0,
    }];
    in_progress.insert(root);

    while let Some(frame) = stack.last_mut() {
        let current = frame.id;
        let Some(node) = graph.node(current) else {
            stack.pop();
            continue;
        };
        let Some(child) = node.children().get(frame.next_child).copied() else {
            in_progress.remove(&current);
            stack.pop();
            continue;
        };
        frame.next_child += 1;

        let (Some(current_path), Some(edge)) = (node.path(), node.edge_to(child)) else {
            continue;
        };
        if !is_local_specifier(&edge.specifier) {
            if let Some(target) = graph.node_mut(child) {
                target.mark_external();
            }
            continue;
        }
        let candidate = resolve_specifier(current_path, &edge.specifier);

        if in_progress.contains(&child) {
            continue;
        }

        let Some(target) = graph.node(child) else {
            continue;
        };
        if target.is_external() {
            continue;
        }

        if target.path().is_none() {
            let assigned = claims.claim(candidate.clone(), child);
            if assigned != candidate {
                ctx.report(Diagnostic::PathConflict {
                    module: child,
                    requested: candidate,
                    assigned: assigned.clone(),
                });
            }
            tracing::trace!(module = %child, path = %assigned.display(), "path assigned");
            if let Some(target) = graph.node_mut(child) {
                target.assign_path(assigned);
            }
            summary.assigned += 1;
        }

        in_progress.insert(child);
        stack.push(Frame {
            id: child,
            next_child: 0,
        });
    }

    check_other_links(graph, ctx, first_run);
    register_externals(graph, ctx);

    for node in graph.nodes() {
        if node.path().is_none() && !node.is_external() {
            summary.unreachable += 1;
            if first_run {
                ctx.report(Diagnostic::UnreachableModule { module: node.id() });
            }
        }
    }

    graph.mark_resolved();
    tracing::debug!(
        assigned = summary.assigned,
        unreachable = summary.unreachable,
        "paths resolved"
    );
    summary
}

/// Walk the links outside the first-discoverer tree from every resolved
/// module: named-package links flag their target external, local links that
/// imply another path are reported.
fn check_other_links(graph: &mut ModuleGraph, ctx: &UnpackContext, report: bool) {
    let mut externals = Vec::new();

    for node in graph.nodes() {
        let Some(from) = node.path() else {
            continue;
        };
        for edge in node.edges() {
            if !is_local_specifier(&edge.specifier) {
                externals.push(edge.target);
                continue;
            }
            let Some(target) = graph.node(edge.target) else {
                continue;
            };
            let discovering = target.parent() == Some(node.id())
                && node.edge_to(edge.target).is_some_and(|first| std::ptr::eq(first, edge));
            let Some(kept) = target.path() else {
                continue;
            };
            if discovering || !report {
                continue;
            }

            let candidate = resolve_specifier(from, &edge.specifier);
            if kept != candidate && !is_suffixed_variant(kept, &candidate, edge.target) {
                ctx.report(Diagnostic::DivergentPath {
                    module: edge.target,
                    kept: kept.to_path_buf(),
                    route: graph.discovery_chain(edge.target).unwrap_or_default(),
                    candidate,
                });
            }
        }
    }

    for id in externals {
        if let Some(target) = graph.node_mut(id) {
            target.mark_external();
        }
    }
}

fn is_suffixed_variant(kept: &Path, candidate: &Path, id: ModuleId) -> bool {
    (0..8).any(|attempt| suffixed_path(candidate, id, attempt) == kept)
}

/// Named-package specifiers used by local modules, including ones whose
/// target is missing from the table.
fn register_externals(graph: &ModuleGraph, ctx: &UnpackContext) {
    for node in graph.nodes().filter(|node| node.path().is_some()) {
        for (specifier, target) in node.dependencies() {
            if is_local_specifier(specifier) {
                continue;
            }
            let known = matches!(target, DependencyTarget::Module(id) if graph.contains(*id));
            if !known {
                tracing::trace!(module = %node.id(), specifier, "external dependency outside the table");
            }
            ctx.register_external(specifier);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_classification() {
        for spec in ["./a", "../a", "/abs", ".", ".."] {
            assert!(is_local_specifier(spec), "{spec} should be local");
        }
        for spec in ["react", "lodash/map", "@scope/pkg", ".hidden", "..a"] {
            assert!(!is_local_specifier(spec), "{spec} should be external");
        }
    }

    #[test]
    fn test_resolve_relative() {
        let from = Path::new("/lib/util/a.js");
        assert_eq!(resolve_specifier(from, "./b"), PathBuf::from("/lib/util/b"));
        assert_eq!(resolve_specifier(from, "../b.js"), PathBuf::from("/lib/b.js"));
        assert_eq!(resolve_specifier(from, "./x/../y"), PathBuf::from("/lib/util/y"));
    }

    #[test]
    fn test_resolve_never_climbs_above_root() {
        let from = Path::new("/ROOT_APP_MODULE.js");
        assert_eq!(resolve_specifier(from, "../../a"), PathBuf::from("/a"));
    }

    #[test]
    fn test_resolve_directory_to_index() {
        let from = Path::new("/lib/a.js");
        assert_eq!(resolve_specifier(from, "./"), PathBuf::from("/lib/index"));
        assert_eq!(resolve_specifier(from, "."), PathBuf::from("/lib/index"));
        assert_eq!(resolve_specifier(from, ".."), PathBuf::from("/index"));
        assert_eq!(resolve_specifier(from, "./dir/"), PathBuf::from("/lib/dir/index"));
    }

    #[test]
    fn test_resolve_absolute() {
        let from = Path::new("/lib/a.js");
        assert_eq!(resolve_specifier(from, "/vendor/x"), PathBuf::from("/vendor/x"));
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name(Path::new("/a/b"), "js"), PathBuf::from("/a/b.js"));
        assert_eq!(output_file_name(Path::new("/a/b.json"), "js"), PathBuf::from("/a/b.json"));
        assert_eq!(output_file_name(Path::new("/a/b.tsx"), "js"), PathBuf::from("/a/b.tsx"));
        assert_eq!(output_file_name(Path::new("/a/b.min"), "js"), PathBuf::from("/a/b.min.js"));
    }

    #[test]
    fn test_suffixed_path() {
        let id = ModuleId::new(7);
        assert_eq!(suffixed_path(Path::new("/a/b.js"), id, 0), PathBuf::from("/a/b_7.js"));
        assert_eq!(suffixed_path(Path::new("/a/b"), id, 0), PathBuf::from("/a/b_7"));
        assert_eq!(suffixed_path(Path::new("/a/b"), id, 2), PathBuf::from("/a/b_7_2"));
    }
}
