//! Depth-first traversal over the lowered syntax tree.
//!
//! The engine visits nodes in pre-order. For every node the [`Observer`] runs
//! first, then a kind-specific handler recurses into the node's children.
//! Generic nodes fall back to enumerating their property bag: node-valued
//! entries are visited, scalar entries are reported at trace level.
//!
//! A visited-node counter bounds the walk so that a pathological tree fails
//! with [`TraversalError::LimitExceeded`] instead of running unbounded.

use crate::syntax::{
    ArrayLiteral, GenericNode, ObjectLiteral, Property, PropertyNode, SyntaxNode,
};

/// Default upper bound on visited nodes.
pub const DEFAULT_MAX_NODES: usize = 10_000_000;

/// Error that can occur during traversal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraversalError {
    #[error("Traversal limit exceeded: visited more than {limit} nodes")]
    LimitExceeded { limit: usize },
}

/// Side-effect hook invoked on every visited node.
///
/// Observers cannot alter the traversal order.
pub trait Observer {
    fn observe(&mut self, node: &SyntaxNode, depth: usize);
}

impl<F> Observer for F
where
    F: FnMut(&SyntaxNode, usize),
{
    fn observe(&mut self, node: &SyntaxNode, depth: usize) {
        self(node, depth)
    }
}

/// Summary of a completed traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraversalStats {
    pub visited: usize,
    pub max_depth: usize,
}

/// Pre-order traversal engine with a node budget.
#[derive(Debug)]
pub struct Traversal {
    max_nodes: usize,
    stats: TraversalStats,
}

impl Default for Traversal {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NODES)
    }
}

impl Traversal {
    pub fn new(max_nodes: usize) -> Self {
        Self {
            max_nodes,
            stats: TraversalStats::default(),
        }
    }

    /// Visit `tree` and every node below it, calling `observer` on each.
    pub fn visit(
        mut self,
        tree: &SyntaxNode,
        observer: &mut dyn Observer,
    ) -> Result<TraversalStats, TraversalError> {
        self.visit_node(tree, observer, 0)?;
        Ok(self.stats)
    }

    fn visit_node(
        &mut self,
        node: &SyntaxNode,
        observer: &mut dyn Observer,
        depth: usize,
    ) -> Result<(), TraversalError> {
        self.stats.visited += 1;
        if self.stats.visited > self.max_nodes {
            return Err(TraversalError::LimitExceeded {
                limit: self.max_nodes,
            });
        }
        self.stats.max_depth = self.stats.max_depth.max(depth);

        observer.observe(node, depth);

        match node {
            SyntaxNode::Object(obj) => self.visit_object(obj, observer, depth),
            SyntaxNode::Property(prop) => self.visit_property(prop, observer, depth),
            SyntaxNode::Array(arr) => self.visit_array(arr, observer, depth),
            SyntaxNode::Number(_) | SyntaxNode::String(_) => Ok(()),
            SyntaxNode::Generic(generic) => self.visit_generic(generic, observer, depth),
        }
    }

    fn visit_object(
        &mut self,
        obj: &ObjectLiteral,
        observer: &mut dyn Observer,
        depth: usize,
    ) -> Result<(), TraversalError> {
        self.visit_all(&obj.properties, observer, depth + 1)
    }

    fn visit_property(
        &mut self,
        prop: &PropertyNode,
        observer: &mut dyn Observer,
        depth: usize,
    ) -> Result<(), TraversalError> {
        self.visit_all(&prop.children, observer, depth + 1)
    }

    fn visit_array(
        &mut self,
        arr: &ArrayLiteral,
        observer: &mut dyn Observer,
        depth: usize,
    ) -> Result<(), TraversalError> {
        self.visit_all(&arr.elements, observer, depth + 1)
    }

    /// Fallback handler: reflect over the property bag.
    fn visit_generic(
        &mut self,
        generic: &GenericNode,
        observer: &mut dyn Observer,
        depth: usize,
    ) -> Result<(), TraversalError> {
        for (name, property) in &generic.properties {
            match property {
                Property::Node(child) => self.visit_node(child, observer, depth + 1)?,
                Property::Nodes(children) => self.visit_all(children, observer, depth + 1)?,
                Property::Scalar(value) => {
                    tracing::trace!(kind = %generic.kind, "{name}: {value}");
                }
            }
        }
        Ok(())
    }

    fn visit_all(
        &mut self,
        nodes: &[SyntaxNode],
        observer: &mut dyn Observer,
        depth: usize,
    ) -> Result<(), TraversalError> {
        for node in nodes {
            self.visit_node(node, observer, depth)?;
        }
        Ok(())
    }
}
