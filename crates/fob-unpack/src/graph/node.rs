//! A single module of the reconstructed graph.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use serde::Serialize;

use super::ModuleId;
use crate::table::DependencyTarget;

/// A dependency link that points at a module present in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub specifier: String,
    pub target: ModuleId,
}

/// One module of the bundle.
///
/// `path` and the emission flag are write-once: once set they never change.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleNode {
    id: ModuleId,
    #[serde(skip)]
    source: String,
    dependencies: IndexMap<String, DependencyTarget>,
    path: Option<PathBuf>,
    parent: Option<ModuleId>,
    children: Vec<ModuleId>,
    edges: Vec<DependencyEdge>,
    referenced_by: BTreeSet<String>,
    external: bool,
    #[serde(skip)]
    emitted: AtomicBool,
}

impl ModuleNode {
    pub fn new(
        id: ModuleId,
        source: String,
        dependencies: IndexMap<String, DependencyTarget>,
    ) -> Self {
        Self {
            id,
            source,
            dependencies,
            path: None,
            parent: None,
            children: Vec::new(),
            edges: Vec::new(),
            referenced_by: BTreeSet::new(),
            external: false,
            emitted: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Factory function source as it appeared in the bundle.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn dependencies(&self) -> &IndexMap<String, DependencyTarget> {
        &self.dependencies
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The module that discovered this one first.
    pub fn parent(&self) -> Option<ModuleId> {
        self.parent
    }

    /// Modules this node discovered first, in dependency-map order.
    pub fn children(&self) -> &[ModuleId] {
        &self.children
    }

    /// Every resolvable dependency link, in dependency-map order.
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// The first link to `target`, which is the one that discovered it when
    /// `target` is one of [`children`](Self::children).
    pub fn edge_to(&self, target: ModuleId) -> Option<&DependencyEdge> {
        self.edges.iter().find(|edge| edge.target == target)
    }

    /// Specifiers other modules used to reach this one, sorted.
    pub fn referenced_by(&self) -> &BTreeSet<String> {
        &self.referenced_by
    }

    pub fn is_external(&self) -> bool {
        self.external
    }

    pub fn is_emitted(&self) -> bool {
        self.emitted.load(Ordering::Acquire)
    }

    /// Claim the right to emit this node. Only the first caller gets `true`.
    pub fn claim_emission(&self) -> bool {
        !self.emitted.swap(true, Ordering::AcqRel)
    }

    /// Assign the path unless one is already set. Returns whether it was set.
    pub(crate) fn assign_path(&mut self, path: PathBuf) -> bool {
        if self.path.is_some() {
            return false;
        }
        self.path = Some(path);
        true
    }

    /// Flag as a named-package dependency. Ignored once a path is assigned.
    pub(crate) fn mark_external(&mut self) {
        if self.path.is_none() {
            self.external = true;
        }
    }

    pub(crate) fn add_edge(&mut self, specifier: &str, target: ModuleId) {
        self.edges.push(DependencyEdge {
            specifier: specifier.to_string(),
            target,
        });
    }

    pub(crate) fn add_reference(&mut self, specifier: &str) {
        self.referenced_by.insert(specifier.to_string());
    }

    /// Record `parent` as first discoverer. An existing parent is kept.
    pub(crate) fn adopt_parent(&mut self, parent: ModuleId) -> bool {
        if self.parent.is_some() || parent == self.id {
            return false;
        }
        self.parent = Some(parent);
        true
    }

    pub(crate) fn add_child(&mut self, child: ModuleId) {
        self.children.push(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32) -> ModuleNode {
        ModuleNode::new(ModuleId::new(id), "function(){}".to_string(), IndexMap::new())
    }

    #[test]
    fn test_path_is_write_once() {
        let mut n = node(1);
        assert!(n.assign_path(PathBuf::from("/a.js")));
        assert!(!n.assign_path(PathBuf::from("/b.js")));
        assert_eq!(n.path(), Some(Path::new("/a.js")));
    }

    #[test]
    fn test_first_parent_wins() {
        let mut n = node(2);
        assert!(!n.adopt_parent(ModuleId::new(2)));
        assert!(n.adopt_parent(ModuleId::new(1)));
        assert!(!n.adopt_parent(ModuleId::new(3)));
        assert_eq!(n.parent(), Some(ModuleId::new(1)));
    }

    #[test]
    fn test_edge_to_returns_first_link() {
        let mut n = node(1);
        n.add_edge("./a", ModuleId::new(2));
        n.add_edge("./a.js", ModuleId::new(2));
        assert_eq!(n.edge_to(ModuleId::new(2)).map(|e| e.specifier.as_str()), Some("./a"));
        assert!(n.edge_to(ModuleId::new(3)).is_none());
    }

    #[test]
    fn test_emission_claimed_once() {
        let n = node(3);
        assert!(!n.is_emitted());
        assert!(n.claim_emission());
        assert!(!n.claim_emission());
        assert!(n.is_emitted());
    }

    #[test]
    fn test_external_flag_ignored_after_assignment() {
        let mut n = node(4);
        n.assign_path(PathBuf::from("/x.js"));
        n.mark_external();
        assert!(!n.is_external());
    }
}
