//! Read-only lookups on [`ModuleGraph`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{ModuleGraph, ModuleId, ModuleNode};

impl ModuleGraph {
    pub fn root(&self) -> ModuleId {
        self.root
    }

    pub fn root_node(&self) -> &ModuleNode {
        &self.nodes[&self.root]
    }

    pub fn node(&self, id: ModuleId) -> Option<&ModuleNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: ModuleId) -> Option<&mut ModuleNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether paths have been resolved at least once.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub(crate) fn mark_resolved(&mut self) {
        self.resolved = true;
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &ModuleNode> {
        self.nodes.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.nodes.keys().copied()
    }

    /// Every assigned path, keyed by module id.
    pub fn assigned_paths(&self) -> BTreeMap<ModuleId, PathBuf> {
        self.nodes
            .values()
            .filter_map(|node| node.path().map(|path| (node.id(), path.to_path_buf())))
            .collect()
    }

    /// Ids from the root down to `id`, following first-discoverer parents.
    ///
    /// Returns `None` for unknown ids or ids whose parent chain does not
    /// reach the root.
    pub fn discovery_chain(&self, id: ModuleId) -> Option<Vec<ModuleId>> {
        let mut chain = vec![id];
        let mut current = self.nodes.get(&id)?;
        while current.id() != self.root {
            let parent = current.parent()?;
            if chain.contains(&parent) {
                return None;
            }
            chain.push(parent);
            current = self.nodes.get(&parent)?;
        }
        chain.reverse();
        Some(chain)
    }
}
