//! Building a [`ModuleGraph`] from the evaluated module table.

use std::collections::BTreeMap;

use super::{GraphError, ModuleGraph, ModuleId, ModuleNode};
use crate::context::UnpackContext;
use crate::diagnostics::Diagnostic;
use crate::table::{DependencyTarget, RawModuleTable};

impl ModuleGraph {
    /// Build the graph in three passes: nodes, edges, root.
    ///
    /// Dependencies on ids missing from the table are reported as
    /// [`Diagnostic::DanglingDependency`] and skipped. The root is the only
    /// module no other module references; it is assigned the configured root
    /// path.
    pub fn build(table: RawModuleTable, ctx: &UnpackContext) -> Result<Self, GraphError> {
        let mut nodes: BTreeMap<ModuleId, ModuleNode> = table
            .into_iter()
            .map(|(id, raw)| (id, ModuleNode::new(id, raw.source, raw.dependencies)))
            .collect();

        link_edges(&mut nodes, ctx);

        let root = find_root(&nodes)?;
        if let Some(node) = nodes.get_mut(&root) {
            node.assign_path(ctx.options().normalized_root_path());
        }

        tracing::debug!(modules = nodes.len(), %root, "module graph built");
        Ok(Self {
            nodes,
            root,
            resolved: false,
        })
    }
}

fn link_edges(nodes: &mut BTreeMap<ModuleId, ModuleNode>, ctx: &UnpackContext) {
    let ids: Vec<ModuleId> = nodes.keys().copied().collect();

    for id in ids {
        let dependencies = match nodes.get(&id) {
            Some(node) => node.dependencies().clone(),
            None => continue,
        };

        for (specifier, target) in dependencies {
            let target_id = match &target {
                DependencyTarget::Module(target_id) if nodes.contains_key(target_id) => *target_id,
                _ => {
                    ctx.report(Diagnostic::DanglingDependency {
                        module: id,
                        specifier,
                        target,
                    });
                    continue;
                }
            };

            let discovered = match nodes.get_mut(&target_id) {
                Some(target_node) => {
                    target_node.add_reference(&specifier);
                    target_node.adopt_parent(id)
                }
                None => false,
            };

            if let Some(node) = nodes.get_mut(&id) {
                node.add_edge(&specifier, target_id);
                if discovered {
                    node.add_child(target_id);
                }
            }
        }
    }
}

fn find_root(nodes: &BTreeMap<ModuleId, ModuleNode>) -> Result<ModuleId, GraphError> {
    let candidates: Vec<ModuleId> = nodes
        .values()
        .filter(|node| node.referenced_by().is_empty())
        .map(ModuleNode::id)
        .collect();

    match candidates.as_slice() {
        [] => Err(GraphError::NoRootModule),
        [root] => Ok(*root),
        _ => Err(GraphError::MultipleRootModules { candidates }),
    }
}
