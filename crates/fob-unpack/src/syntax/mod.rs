//! Lowered syntax tree used by the traversal engine.
//!
//! The oxc AST is rich and strongly typed, which is exactly what the table
//! locator does not need: it only cares about a handful of literal shapes and
//! must step over everything else. The parser output is therefore lowered
//! into a closed set of node kinds:
//!
//! - object literals, their properties, array literals, number and string
//!   literals keep dedicated variants with their literal values;
//! - every other node becomes a [`GenericNode`] carrying its kind name, its
//!   byte range and an ordered property bag.
//!
//! ```text
//! oxc Program ──lower──▶ SyntaxNode::Generic("Program")
//!                           └─ children: [ Generic("ExpressionStatement"), ... ]
//!                                             └─ Object { properties: [Property { key: 1, .. }] }
//! ```

mod lower;

pub use lower::{ParseError, parse_source};

use crate::span::SourceSpan;

/// A node of the lowered syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode {
    Object(ObjectLiteral),
    Property(PropertyNode),
    Array(ArrayLiteral),
    Number(NumberLiteral),
    String(StringLiteral),
    Generic(GenericNode),
}

impl SyntaxNode {
    pub fn span(&self) -> SourceSpan {
        match self {
            SyntaxNode::Object(node) => node.span,
            SyntaxNode::Property(node) => node.span,
            SyntaxNode::Array(node) => node.span,
            SyntaxNode::Number(node) => node.span,
            SyntaxNode::String(node) => node.span,
            SyntaxNode::Generic(node) => node.span,
        }
    }

    /// Kind tag, using oxc's node names.
    pub fn kind(&self) -> &str {
        match self {
            SyntaxNode::Object(_) => "ObjectExpression",
            SyntaxNode::Property(_) => "ObjectProperty",
            SyntaxNode::Array(_) => "ArrayExpression",
            SyntaxNode::Number(_) => "NumericLiteral",
            SyntaxNode::String(_) => "StringLiteral",
            SyntaxNode::Generic(node) => &node.kind,
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<&SyntaxNode> {
        match self {
            SyntaxNode::Object(obj) => obj.properties.iter().collect(),
            SyntaxNode::Property(prop) => prop.children.iter().collect(),
            SyntaxNode::Array(arr) => arr.elements.iter().collect(),
            SyntaxNode::Generic(generic) => generic.child_nodes().collect(),
            SyntaxNode::Number(_) | SyntaxNode::String(_) => Vec::new(),
        }
    }

    /// First object literal at or below this node, in pre-order.
    pub fn first_object(&self) -> Option<&ObjectLiteral> {
        if let SyntaxNode::Object(obj) = self {
            return Some(obj);
        }
        self.children().into_iter().find_map(SyntaxNode::first_object)
    }

    /// Returns `true` for function expressions and arrow functions.
    pub fn is_function(&self) -> bool {
        matches!(self.kind(), "Function" | "ArrowFunctionExpression")
    }

    /// Strip parentheses and transparent wrappers.
    ///
    /// `(x)` lowers to a `ParenthesizedExpression` wrapper; enum-like AST
    /// nodes may lower to a generic node holding a single child with the same
    /// byte range. Both are skipped.
    pub fn unparenthesized(&self) -> &SyntaxNode {
        let mut node = self;
        while let SyntaxNode::Generic(generic) = node {
            let mut children = generic.child_nodes();
            let (Some(inner), None) = (children.next(), children.next()) else {
                break;
            };
            let transparent = generic.kind == "ParenthesizedExpression" || inner.span() == generic.span;
            if !transparent {
                break;
            }
            node = inner;
        }
        node
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLiteral {
    pub span: SourceSpan,
    /// `Property` nodes, or generic nodes for spreads.
    pub properties: Vec<SyntaxNode>,
}

/// A `key: value` member of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    pub span: SourceSpan,
    pub key: PropertyKey,
    pub computed: bool,
    /// Key node followed by value node, in source order.
    pub children: Vec<SyntaxNode>,
}

impl PropertyNode {
    pub fn value(&self) -> Option<&SyntaxNode> {
        // A key always precedes its value; a lone child is the key.
        if self.children.len() < 2 {
            return None;
        }
        self.children.last()
    }
}

/// Statically known property key.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Number(f64),
    String(String),
    Identifier(String),
    Other,
}

impl PropertyKey {
    /// Key as the string a JavaScript engine would use for it.
    pub fn as_name(&self) -> Option<String> {
        match self {
            PropertyKey::String(s) | PropertyKey::Identifier(s) => Some(s.clone()),
            PropertyKey::Number(n) if n.fract() == 0.0 && n.is_finite() => {
                Some(format!("{}", *n as i64))
            }
            PropertyKey::Number(n) => Some(n.to_string()),
            PropertyKey::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub span: SourceSpan,
    pub elements: Vec<SyntaxNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub span: SourceSpan,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub span: SourceSpan,
    pub value: String,
}

/// Catch-all for node kinds the locator has no dedicated handling for.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericNode {
    pub span: SourceSpan,
    pub kind: String,
    /// Ordered property bag, enumerated by the generic traversal handler.
    pub properties: Vec<(String, Property)>,
}

impl GenericNode {
    /// All nodes reachable through the property bag, in order.
    pub fn child_nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.properties.iter().flat_map(|(_, property)| property.nodes())
    }
}

/// Value held by a generic node property.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Node(Box<SyntaxNode>),
    Nodes(Vec<SyntaxNode>),
    Scalar(Scalar),
}

impl Property {
    pub fn nodes(&self) -> &[SyntaxNode] {
        match self {
            Property::Node(node) => std::slice::from_ref(node.as_ref()),
            Property::Nodes(nodes) => nodes,
            Property::Scalar(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Str(String),
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Str(s) => write!(f, "{s}"),
        }
    }
}
