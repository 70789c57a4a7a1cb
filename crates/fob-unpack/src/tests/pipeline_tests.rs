//! End-to-end scenarios through `unpack` with an in-memory runtime.

use std::path::{Path, PathBuf};

use super::BundleBuilder;
use crate::diagnostics::Diagnostic;
use crate::format::{CodeFormatter, FormatError};
use crate::runtime::test_utils::MemoryRuntime;
use crate::table::DependencyTarget;
use crate::{
    EmitKind, Emitter, ModuleGraph, ModuleId, UnpackContext, UnpackError, UnpackOptions, locator,
    resolver, syntax, table, unpack, unpack_with_formatter,
};

const OUT: &str = "/out";

fn run(source: &str) -> (crate::UnpackReport, MemoryRuntime) {
    run_with(source, UnpackOptions::default())
}

fn run_with(source: &str, options: UnpackOptions) -> (crate::UnpackReport, MemoryRuntime) {
    let runtime = MemoryRuntime::new();
    let report = unpack(source, Path::new(OUT), &runtime, options).unwrap();
    (report, runtime)
}

fn graph_of(source: &str, ctx: &UnpackContext) -> ModuleGraph {
    let tree = syntax::parse_source(source).unwrap();
    let span = locator::locate_module_table(&tree, ctx.options().max_nodes).unwrap();
    let raw = table::evaluate_table(source, span).unwrap();
    ModuleGraph::build(raw, ctx).unwrap()
}

fn sample_bundle() -> String {
    BundleBuilder::new(1)
        .module(
            1,
            r#"var a = require("./lib/a"); var pad = require("left-pad"); console.log(pad(a, 4));"#,
            &[("./lib/a", 2), ("left-pad", 4)],
        )
        .module(2, r#"module.exports = require("../b") + 1;"#, &[("../b", 3)])
        .module(3, "module.exports = 41;", &[])
        .module(4, "module.exports = function pad(s, n) { return s; };", &[])
        .build()
}

#[test]
fn test_unpacks_tree_with_inferred_paths() {
    let (report, runtime) = run(&sample_bundle());

    assert_eq!(report.root, ModuleId::new(1));
    assert_eq!(report.module_count, 4);
    assert_eq!(
        runtime.paths(),
        vec![
            PathBuf::from("/out/ROOT_APP_MODULE.js"),
            PathBuf::from("/out/b.js"),
            PathBuf::from("/out/lib/a.js"),
        ]
    );
    let order: Vec<u32> = report.written.iter().map(|f| f.module.get()).collect();
    assert_eq!(order, vec![1, 2, 3]);
    assert_eq!(report.externals, vec!["left-pad".to_string()]);
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
}

#[test]
fn test_module_file_has_provenance_header() {
    let (_, runtime) = run(&sample_bundle());
    let a = runtime.read_string("/out/lib/a.js").unwrap();
    assert!(a.starts_with("// Module 2 of the original bundle.\n// Referenced as:\n//   \"./lib/a\"\n"));
    assert!(a.contains("module.exports = require(\"../b\") + 1;"));
    assert!(!a.contains("function(require,module,exports)"));

    let root = runtime.read_string("/out/ROOT_APP_MODULE.js").unwrap();
    assert!(root.contains("// Entry module"));
}

#[test]
fn test_external_listed_once_and_never_written() {
    let source = BundleBuilder::new(1)
        .module(1, r#"require("./a"); require("left-pad");"#, &[("./a", 2), ("left-pad", 3)])
        .module(2, r#"require("left-pad");"#, &[("left-pad", 3)])
        .module(3, "module.exports = 1;", &[])
        .build();
    let (report, runtime) = run(&source);

    assert_eq!(report.externals, vec!["left-pad".to_string()]);
    assert!(report.written.iter().all(|f| f.module != ModuleId::new(3)));
    assert_eq!(runtime.paths().len(), 2);
}

#[test]
fn test_no_module_table() {
    let runtime = MemoryRuntime::new();
    let err = unpack(
        "var x = {a: [1]}; console.log(x);",
        Path::new(OUT),
        &runtime,
        UnpackOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, UnpackError::NoModuleTableFound));
    assert!(runtime.paths().is_empty());
}

#[test]
fn test_ambiguous_module_table_names_both_spans() {
    let source = "var a = {1: [function(){}, {}]};\nvar b = {2: [function(){}, {}]};";
    let runtime = MemoryRuntime::new();
    let err = unpack(source, Path::new(OUT), &runtime, UnpackOptions::default()).unwrap_err();

    let UnpackError::AmbiguousModuleTable { candidates } = err else {
        panic!("expected ambiguity, got {err:?}");
    };
    let texts: Vec<&str> = candidates.iter().filter_map(|span| span.slice(source)).collect();
    assert_eq!(texts, vec!["{1: [function(){}, {}]}", "{2: [function(){}, {}]}"]);
}

#[test]
fn test_dangling_dependency_reported_exactly_once() {
    let source = BundleBuilder::new(1)
        .module(1, r#"require("./three");"#, &[("./three", 3)])
        .module(3, r#"require("./seven");"#, &[("./seven", 7)])
        .build();
    let (report, runtime) = run(&source);

    let dangling: Vec<&Diagnostic> = report
        .diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::DanglingDependency { .. }))
        .collect();
    assert_eq!(
        dangling,
        vec![&Diagnostic::DanglingDependency {
            module: ModuleId::new(3),
            specifier: "./seven".to_string(),
            target: DependencyTarget::Module(ModuleId::new(7)),
        }]
    );
    assert_eq!(runtime.paths().len(), 2);
}

#[test]
fn test_excluded_builtin_is_dangling_and_external() {
    let source = BundleBuilder::new(1)
        .module_raw(1, r#"var fs = require("fs");"#, &[("fs", "undefined".to_string())])
        .build();
    let (report, _) = run(&source);

    assert_eq!(report.externals, vec!["fs".to_string()]);
    assert!(matches!(
        report.diagnostics.as_slice(),
        [Diagnostic::DanglingDependency { target: DependencyTarget::Unresolved(text), .. }] if text == "undefined"
    ));
}

#[test]
fn test_cycle_terminates_with_stable_paths() {
    let source = BundleBuilder::new(1)
        .module(1, r#"require("./a");"#, &[("./a", 2)])
        .module(2, r#"require("./b");"#, &[("./b", 3)])
        .module(3, r#"require("./a");"#, &[("./a", 2)])
        .build();
    let (report, runtime) = run(&source);

    assert_eq!(
        runtime.paths(),
        vec![
            PathBuf::from("/out/ROOT_APP_MODULE.js"),
            PathBuf::from("/out/a.js"),
            PathBuf::from("/out/b.js"),
        ]
    );
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);

    let a = runtime.read_string("/out/a.js").unwrap();
    assert!(a.contains("//   \"./a\""));
}

#[test]
fn test_resolving_twice_changes_nothing() {
    let ctx = UnpackContext::default();
    let mut graph = graph_of(&sample_bundle(), &ctx);

    resolver::resolve_paths(&mut graph, &ctx);
    let first = graph.assigned_paths();
    let second_summary = resolver::resolve_paths(&mut graph, &ctx);

    assert_eq!(graph.assigned_paths(), first);
    assert_eq!(second_summary.assigned, 0);
    assert_eq!(first.len(), 3);
    assert!(graph.node(ModuleId::new(4)).unwrap().is_external());
}

#[test]
fn test_path_conflict_gets_suffixed_name() {
    let source = BundleBuilder::new(1)
        .module(1, r#"require("./x"); require("./x.js");"#, &[("./x", 2), ("./x.js", 3)])
        .module(2, "module.exports = 2;", &[])
        .module(3, "module.exports = 3;", &[])
        .build();
    let (report, runtime) = run(&source);

    assert_eq!(
        runtime.paths(),
        vec![
            PathBuf::from("/out/ROOT_APP_MODULE.js"),
            PathBuf::from("/out/x.js"),
            PathBuf::from("/out/x_3.js"),
        ]
    );
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic::PathConflict {
            module: ModuleId::new(3),
            requested: PathBuf::from("/x.js"),
            assigned: PathBuf::from("/x_3.js"),
        }]
    );
}

#[test]
fn test_divergent_route_keeps_first_path() {
    let source = BundleBuilder::new(1)
        .module(1, "", &[("./a/one", 2), ("./b/two", 3)])
        .module(2, "", &[("../shared", 4)])
        .module(3, "", &[("./shared", 4)])
        .module(4, "module.exports = 'shared';", &[])
        .build();
    let (report, runtime) = run(&source);

    assert!(runtime.read_string("/out/shared.js").is_some());
    assert!(runtime.read_string("/out/b/shared.js").is_none());
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic::DivergentPath {
            module: ModuleId::new(4),
            kept: PathBuf::from("/shared"),
            route: vec![ModuleId::new(1), ModuleId::new(2), ModuleId::new(4)],
            candidate: PathBuf::from("/b/shared"),
        }]
    );
}

#[test]
fn test_diamond_places_module_under_first_discoverer() {
    // 3 is required first, but 2 has the lower id and discovers 4.
    let source = BundleBuilder::new(1)
        .module(1, "", &[("./lib/b", 3), ("./a", 2)])
        .module(2, "", &[("./c", 4)])
        .module(3, "", &[("./c", 4)])
        .module(4, "module.exports = 'c';", &[])
        .build();
    let ctx = UnpackContext::default();
    let mut graph = graph_of(&source, &ctx);
    resolver::resolve_paths(&mut graph, &ctx);

    let c = graph.node(ModuleId::new(4)).unwrap();
    assert_eq!(c.parent(), Some(ModuleId::new(2)));
    assert_eq!(c.path(), Some(Path::new("/c")));
    assert_eq!(
        ctx.diagnostics().snapshot(),
        vec![Diagnostic::DivergentPath {
            module: ModuleId::new(4),
            kept: PathBuf::from("/c"),
            route: vec![ModuleId::new(1), ModuleId::new(2), ModuleId::new(4)],
            candidate: PathBuf::from("/lib/c"),
        }]
    );

    let (_, runtime) = run(&source);
    assert!(runtime.read_string("/out/c.js").is_some());
    assert!(runtime.read_string("/out/lib/c.js").is_none());
}

#[test]
fn test_resolving_twice_reports_notes_once() {
    let source = BundleBuilder::new(1)
        .module(1, r#"require("lib");"#, &[("lib", 2), ("./a/one", 3), ("./b/two", 4)])
        .module(2, r#"require("./inner");"#, &[("./inner", 5)])
        .module(3, "", &[("../shared", 6)])
        .module(4, "", &[("./shared", 6)])
        .module(5, "", &[])
        .module(6, "", &[])
        .build();
    let ctx = UnpackContext::default();
    let mut graph = graph_of(&source, &ctx);

    let first = resolver::resolve_paths(&mut graph, &ctx);
    let reported = ctx.diagnostics().snapshot();
    let second = resolver::resolve_paths(&mut graph, &ctx);

    assert_eq!(reported.len(), 2, "{reported:?}");
    assert!(graph.is_resolved());
    assert_eq!(ctx.diagnostics().snapshot(), reported);
    assert_eq!(second.unreachable, first.unreachable);
    assert_eq!(second.assigned, 0);
}

#[test]
fn test_module_behind_external_is_unreachable() {
    let source = BundleBuilder::new(1)
        .module(1, r#"require("lib");"#, &[("lib", 2)])
        .module(2, r#"require("./inner");"#, &[("./inner", 3)])
        .module(3, "module.exports = 3;", &[])
        .build();
    let (report, runtime) = run(&source);

    assert_eq!(runtime.paths(), vec![PathBuf::from("/out/ROOT_APP_MODULE.js")]);
    assert_eq!(report.externals, vec!["lib".to_string()]);
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic::UnreachableModule {
            module: ModuleId::new(3)
        }]
    );
}

#[test]
fn test_json_module_written_as_pretty_json() {
    let source = BundleBuilder::new(1)
        .module(1, r#"var pkg = require("./package.json");"#, &[("./package.json", 2)])
        .module(2, r#"module.exports={"name":"demo","version":"1.0.0","files":["index.js"]}"#, &[])
        .build();
    let (report, runtime) = run(&source);

    assert_eq!(
        runtime.read_string("/out/package.json").unwrap(),
        "{\n  \"name\": \"demo\",\n  \"version\": \"1.0.0\",\n  \"files\": [\n    \"index.js\"\n  ]\n}\n"
    );
    let json = report.written.iter().find(|f| f.module == ModuleId::new(2)).unwrap();
    assert_eq!(json.kind, EmitKind::Json);
}

#[test]
fn test_broken_json_module_falls_back_to_body() {
    let source = BundleBuilder::new(1)
        .module(1, "", &[("./data.json", 2)])
        .module(2, r#"module.exports = require("./missing");"#, &[])
        .build();
    let (report, runtime) = run(&source);

    assert_eq!(
        runtime.read_string("/out/data.json").unwrap(),
        "module.exports = require(\"./missing\");\n"
    );
    assert!(matches!(
        report.diagnostics.as_slice(),
        [Diagnostic::JsonEvaluationFailed { module, .. }] if *module == ModuleId::new(2)
    ));
}

struct RejectingFormatter;

impl CodeFormatter for RejectingFormatter {
    fn format(&self, _code: &str) -> Result<String, FormatError> {
        Err(FormatError::new("formatter unavailable"))
    }
}

#[test]
fn test_formatter_failure_falls_back_to_raw_body() {
    let runtime = MemoryRuntime::new();
    let report = unpack_with_formatter(
        &sample_bundle(),
        Path::new(OUT),
        &runtime,
        &RejectingFormatter,
        UnpackOptions::default(),
    )
    .unwrap();

    let format_failures = report
        .diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::FormatFailed { .. }))
        .count();
    assert_eq!(format_failures, 3);
    let b = runtime.read_string("/out/b.js").unwrap();
    assert!(b.ends_with("module.exports = 41;\n"));
}

#[test]
fn test_no_format_keeps_body_verbatim() {
    let source = BundleBuilder::new(1)
        .module(1, "var  spaced   =  1;", &[])
        .build();
    let (_, runtime) = run_with(&source, UnpackOptions::default().with_format(false));
    let root = runtime.read_string("/out/ROOT_APP_MODULE.js").unwrap();
    assert!(root.ends_with("var  spaced   =  1;\n"));
}

#[test]
fn test_custom_root_path() {
    let (_, runtime) = run_with(
        &sample_bundle(),
        UnpackOptions::default().with_root_path("src/main.js"),
    );
    assert!(runtime.read_string("/out/src/main.js").is_some());
    // "../b" is required from /src/lib/a
    assert!(runtime.read_string("/out/src/b.js").is_some());
}

#[test]
fn test_emitting_twice_writes_nothing_new() {
    let ctx = UnpackContext::default();
    let mut graph = graph_of(&sample_bundle(), &ctx);
    resolver::resolve_paths(&mut graph, &ctx);

    let runtime = MemoryRuntime::new();
    let emitter = Emitter::new(&runtime, &crate::NoopFormatter, &ctx);
    let first = emitter.emit(&graph, Path::new(OUT)).unwrap();
    let writes = runtime.write_count();
    let second = emitter.emit(&graph, Path::new(OUT)).unwrap();

    assert_eq!(first.len(), 3);
    assert!(second.is_empty());
    assert_eq!(runtime.write_count(), writes);
}

#[test]
fn test_parallel_and_sequential_emission_match() {
    let (parallel_report, parallel) = run_with(&sample_bundle(), UnpackOptions::default());
    let (sequential_report, sequential) =
        run_with(&sample_bundle(), UnpackOptions::default().with_parallel(false));

    assert_eq!(parallel.snapshot(), sequential.snapshot());
    assert_eq!(parallel_report.written, sequential_report.written);
}

#[test]
fn test_write_failure_is_fatal() {
    let runtime = MemoryRuntime::failing();
    let err = unpack(&sample_bundle(), Path::new(OUT), &runtime, UnpackOptions::default())
        .unwrap_err();
    assert!(matches!(err, UnpackError::Runtime(_)));
}

#[test]
fn test_multiple_roots_fail() {
    let source = BundleBuilder::new(1)
        .module(1, "", &[])
        .module(2, "", &[])
        .build();
    let runtime = MemoryRuntime::new();
    let err = unpack(&source, Path::new(OUT), &runtime, UnpackOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        UnpackError::MultipleRootModules { ref candidates } if candidates == &[ModuleId::new(1), ModuleId::new(2)]
    ));
}

#[test]
fn test_traversal_limit_fails() {
    let runtime = MemoryRuntime::new();
    let err = unpack(
        &sample_bundle(),
        Path::new(OUT),
        &runtime,
        UnpackOptions::default().with_max_nodes(10),
    )
    .unwrap_err();
    assert!(matches!(err, UnpackError::TraversalLimitExceeded { limit: 10 }));
}
