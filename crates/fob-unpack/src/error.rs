//! Fatal errors of an unpack run.

use miette::Diagnostic;
use thiserror::Error;

use crate::graph::{GraphError, ModuleId};
use crate::locator::LocateError;
use crate::runtime::RuntimeError;
use crate::span::SourceSpan;
use crate::syntax::ParseError;
use crate::table::TableError;
use crate::traversal::TraversalError;

pub type Result<T> = std::result::Result<T, UnpackError>;

/// Errors that abort unpacking of one bundle.
#[derive(Error, Debug, Diagnostic)]
pub enum UnpackError {
    #[error("Failed to parse bundle: {0}")]
    #[diagnostic(code(fob::unpack::parse))]
    Parse(#[from] ParseError),

    #[error("Traversal limit exceeded: visited more than {limit} nodes")]
    #[diagnostic(
        code(fob::unpack::traversal_limit),
        help("raise the limit with --max-nodes if the bundle is legitimately this large")
    )]
    TraversalLimitExceeded { limit: usize },

    #[error("No module table found")]
    #[diagnostic(
        code(fob::unpack::no_module_table),
        help("expected an object literal like {{1: [function (require, module, exports) {{ ... }}, {{...}}]}}")
    )]
    NoModuleTableFound,

    #[error("Ambiguous module table: {} candidates at {}", .candidates.len(), format_spans(.candidates))]
    #[diagnostic(code(fob::unpack::ambiguous_module_table))]
    AmbiguousModuleTable { candidates: Vec<SourceSpan> },

    #[error("Failed to evaluate module table: {0}")]
    #[diagnostic(code(fob::unpack::table_evaluation))]
    TableEvaluation(#[from] TableError),

    #[error("No root module: every module is referenced by another")]
    #[diagnostic(code(fob::unpack::no_root))]
    NoRootModule,

    #[error("Multiple root modules: {}", format_ids(.candidates))]
    #[diagnostic(
        code(fob::unpack::multiple_roots),
        help("the bundle has several entry modules; only single-entry bundles can be unpacked")
    )]
    MultipleRootModules { candidates: Vec<ModuleId> },

    #[error("Failed to write output: {0}")]
    #[diagnostic(code(fob::unpack::runtime))]
    Runtime(#[from] RuntimeError),
}

impl From<LocateError> for UnpackError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::Traversal(TraversalError::LimitExceeded { limit }) => {
                Self::TraversalLimitExceeded { limit }
            }
            LocateError::NoModuleTableFound => Self::NoModuleTableFound,
            LocateError::AmbiguousModuleTable { candidates } => {
                Self::AmbiguousModuleTable { candidates }
            }
        }
    }
}

impl From<GraphError> for UnpackError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NoRootModule => Self::NoRootModule,
            GraphError::MultipleRootModules { candidates } => {
                Self::MultipleRootModules { candidates }
            }
        }
    }
}

fn format_spans(spans: &[SourceSpan]) -> String {
    spans
        .iter()
        .map(SourceSpan::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_ids(ids: &[ModuleId]) -> String {
    ids.iter()
        .map(ModuleId::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
