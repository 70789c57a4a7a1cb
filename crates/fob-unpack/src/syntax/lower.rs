//! Parse JavaScript with oxc and lower the AST into [`SyntaxNode`]s.

use oxc_allocator::Allocator;
use oxc_ast::AstKind;
use oxc_ast::ast::PropertyKey as OxcPropertyKey;
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};

use super::{
    ArrayLiteral, GenericNode, NumberLiteral, ObjectLiteral, Property, PropertyKey, PropertyNode,
    Scalar, StringLiteral, SyntaxNode,
};
use crate::span::SourceSpan;

/// The bundle text could not be parsed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", .messages.join("; "))]
pub struct ParseError {
    pub messages: Vec<String>,
}

/// Parse `source` as a CommonJS script and lower it.
///
/// Bundles are plain scripts (not ES modules), so sloppy-mode constructs
/// must be accepted.
pub fn parse_source(source: &str) -> Result<SyntaxNode, ParseError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let mut messages: Vec<String> = ret.errors.iter().map(|err| err.to_string()).collect();
        if messages.is_empty() {
            messages.push("parser aborted".to_string());
        }
        return Err(ParseError { messages });
    }

    let mut lowering = Lowering::default();
    lowering.visit_program(&ret.program);
    lowering.root.ok_or_else(|| ParseError {
        messages: vec!["empty syntax tree".to_string()],
    })
}

#[derive(Default)]
struct Lowering {
    stack: Vec<Frame>,
    root: Option<SyntaxNode>,
}

struct Frame {
    span: SourceSpan,
    pending: Pending,
    children: Vec<SyntaxNode>,
}

enum Pending {
    Object,
    Property { key: PropertyKey, computed: bool },
    Array,
    Number(f64),
    String(String),
    Generic { kind: String, scalars: Vec<(String, Scalar)> },
}

impl Frame {
    fn finish(self) -> SyntaxNode {
        let Frame {
            span,
            pending,
            children,
        } = self;

        match pending {
            Pending::Object => SyntaxNode::Object(ObjectLiteral {
                span,
                properties: children,
            }),
            Pending::Property { key, computed } => SyntaxNode::Property(PropertyNode {
                span,
                key,
                computed,
                children,
            }),
            Pending::Array => SyntaxNode::Array(ArrayLiteral {
                span,
                elements: children,
            }),
            Pending::Number(value) => SyntaxNode::Number(NumberLiteral { span, value }),
            Pending::String(value) => SyntaxNode::String(StringLiteral { span, value }),
            Pending::Generic { kind, scalars } => {
                let mut properties: Vec<(String, Property)> = scalars
                    .into_iter()
                    .map(|(name, value)| (name, Property::Scalar(value)))
                    .collect();
                if !children.is_empty() {
                    properties.push(("children".to_string(), Property::Nodes(children)));
                }
                SyntaxNode::Generic(GenericNode {
                    span,
                    kind,
                    properties,
                })
            }
        }
    }
}

impl<'a> Visit<'a> for Lowering {
    fn enter_node(&mut self, kind: AstKind<'a>) {
        let span = SourceSpan::from(kind.span());
        let pending = match kind {
            AstKind::ObjectExpression(_) => Pending::Object,
            AstKind::ObjectProperty(prop) => Pending::Property {
                key: lower_key(&prop.key),
                computed: prop.computed,
            },
            AstKind::ArrayExpression(_) => Pending::Array,
            AstKind::NumericLiteral(lit) => Pending::Number(lit.value),
            AstKind::StringLiteral(lit) => Pending::String(lit.value.to_string()),
            other => Pending::Generic {
                kind: kind_name(&other),
                scalars: scalars_of(&other),
            },
        };
        self.stack.push(Frame {
            span,
            pending,
            children: Vec::new(),
        });
    }

    fn leave_node(&mut self, _kind: AstKind<'a>) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let node = frame.finish();
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root = Some(node),
        }
    }
}

fn lower_key(key: &OxcPropertyKey<'_>) -> PropertyKey {
    match key {
        OxcPropertyKey::NumericLiteral(lit) => PropertyKey::Number(lit.value),
        OxcPropertyKey::StringLiteral(lit) => PropertyKey::String(lit.value.to_string()),
        OxcPropertyKey::StaticIdentifier(ident) => PropertyKey::Identifier(ident.name.to_string()),
        _ => PropertyKey::Other,
    }
}

/// `debug_name` renders e.g. `IdentifierReference(foo)`; keep the type part.
fn kind_name(kind: &AstKind<'_>) -> String {
    let name = kind.debug_name();
    match name.find('(') {
        Some(idx) => name[..idx].to_string(),
        None => name.into_owned(),
    }
}

fn scalars_of(kind: &AstKind<'_>) -> Vec<(String, Scalar)> {
    match kind {
        AstKind::IdentifierReference(ident) => {
            vec![("name".to_string(), Scalar::Str(ident.name.to_string()))]
        }
        AstKind::IdentifierName(ident) => {
            vec![("name".to_string(), Scalar::Str(ident.name.to_string()))]
        }
        AstKind::BindingIdentifier(ident) => {
            vec![("name".to_string(), Scalar::Str(ident.name.to_string()))]
        }
        AstKind::BooleanLiteral(lit) => vec![("value".to_string(), Scalar::Bool(lit.value))],
        AstKind::Function(func) => vec![
            ("async".to_string(), Scalar::Bool(func.r#async)),
            ("generator".to_string(), Scalar::Bool(func.generator)),
        ],
        _ => Vec::new(),
    }
}
