//! Module graph reconstructed from the bundle's module table.
//!
//! Nodes live in an arena keyed by [`ModuleId`]; parent links, children and
//! edges are stored as ids. Methods are split by concern:
//!
//! - `construction`: building the graph from a [`RawModuleTable`](crate::table::RawModuleTable)
//! - `queries`: read-only lookups

mod construction;
mod module_id;
mod node;
mod queries;

pub use module_id::ModuleId;
pub use node::{DependencyEdge, ModuleNode};

use std::collections::BTreeMap;

/// Errors that prevent a graph from having a single root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("No root module: every module is referenced by another")]
    NoRootModule,

    #[error("Multiple root modules: {}", format_ids(.candidates))]
    MultipleRootModules { candidates: Vec<ModuleId> },
}

fn format_ids(ids: &[ModuleId]) -> String {
    ids.iter()
        .map(ModuleId::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Arena of modules with a single root.
#[derive(Debug)]
pub struct ModuleGraph {
    nodes: BTreeMap<ModuleId, ModuleNode>,
    root: ModuleId,
    /// Set once the first resolver run has reported its notes.
    resolved: bool,
}
