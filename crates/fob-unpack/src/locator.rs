//! Structural search for the bundle's module table.
//!
//! A browserify bundle carries its modules in an object literal shaped like
//!
//! ```text
//! {1: [function (require, module, exports) { ... }, {"./dep": 2}], 2: [...]}
//! ```
//!
//! The locator flags every object literal whose keys are all integer literals
//! and whose values are all array literals. Exactly one such literal must
//! exist: bundled code can contain unrelated lookup tables of the same shape,
//! and guessing between them would silently unpack the wrong thing.

use crate::span::SourceSpan;
use crate::syntax::{PropertyKey, SyntaxNode};
use crate::traversal::{Observer, Traversal, TraversalError};
use crate::graph::ModuleId;

/// Error returned when the module table cannot be pinned down.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error(transparent)]
    Traversal(#[from] TraversalError),

    #[error("No module table found")]
    NoModuleTableFound,

    #[error("Found {} candidates for the module table: {}", .candidates.len(), format_spans(.candidates))]
    AmbiguousModuleTable { candidates: Vec<SourceSpan> },
}

fn format_spans(spans: &[SourceSpan]) -> String {
    spans
        .iter()
        .map(SourceSpan::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Observer collecting every table-shaped object literal.
#[derive(Debug, Default)]
pub struct ModuleTableFinder {
    candidates: Vec<SourceSpan>,
}

impl ModuleTableFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidates(&self) -> &[SourceSpan] {
        &self.candidates
    }

    /// The unique candidate, or the reason there is none.
    pub fn into_table_span(self) -> Result<SourceSpan, LocateError> {
        match self.candidates.as_slice() {
            [] => Err(LocateError::NoModuleTableFound),
            [only] => Ok(*only),
            _ => Err(LocateError::AmbiguousModuleTable {
                candidates: self.candidates,
            }),
        }
    }
}

impl Observer for ModuleTableFinder {
    fn observe(&mut self, node: &SyntaxNode, _depth: usize) {
        if is_module_table(node) {
            tracing::trace!(span = %node.span(), "module table candidate");
            self.candidates.push(node.span());
        }
    }
}

/// Returns `true` for a non-empty object literal with integer keys and
/// array values only.
pub fn is_module_table(node: &SyntaxNode) -> bool {
    let SyntaxNode::Object(obj) = node else {
        return false;
    };
    if obj.properties.is_empty() {
        return false;
    }

    obj.properties.iter().all(|member| {
        let SyntaxNode::Property(prop) = member else {
            // spread element
            return false;
        };
        let integer_key = matches!(
            prop.key,
            PropertyKey::Number(value) if ModuleId::from_literal(value).is_some()
        );
        integer_key
            && !prop.computed
            && matches!(prop.value().map(SyntaxNode::unparenthesized), Some(SyntaxNode::Array(_)))
    })
}

/// Locate the span of the module table in `tree`.
pub fn locate_module_table(tree: &SyntaxNode, max_nodes: usize) -> Result<SourceSpan, LocateError> {
    let mut finder = ModuleTableFinder::new();
    let stats = Traversal::new(max_nodes).visit(tree, &mut finder)?;
    tracing::debug!(
        visited = stats.visited,
        candidates = finder.candidates().len(),
        "module table search finished"
    );
    finder.into_table_span()
}
