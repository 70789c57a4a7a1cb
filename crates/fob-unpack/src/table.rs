//! Evaluation of the located module table into a [`RawModuleTable`].
//!
//! The table literal is wrapped as `module.exports = <literal>;`, parsed, and
//! read structurally: no JavaScript is executed. Each entry must be
//! `id: [factory, dependencyMap]` where `factory` is a function expression
//! (its source text is taken verbatim, the way `Function.prototype.toString`
//! would render it) and `dependencyMap` is an object literal from specifier to
//! module id.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::graph::ModuleId;
use crate::span::SourceSpan;
use crate::syntax::{ObjectLiteral, ParseError, PropertyKey, SyntaxNode, parse_source};

const EXPORTS_PREFIX: &str = "module.exports = ";

/// Target of one dependency-map entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum DependencyTarget {
    Module(ModuleId),
    /// Anything that is not an integer literal, kept as its source text
    /// (browserify writes `undefined` for excluded modules).
    Unresolved(String),
}

impl std::fmt::Display for DependencyTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DependencyTarget::Module(id) => write!(f, "{id}"),
            DependencyTarget::Unresolved(text) => f.write_str(text),
        }
    }
}

/// One entry of the module table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawModule {
    /// Full factory function source, wrapper included.
    pub source: String,
    /// Specifier -> target, in source order.
    pub dependencies: IndexMap<String, DependencyTarget>,
}

/// The evaluated module table, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawModuleTable {
    modules: BTreeMap<ModuleId, RawModule>,
}

impl RawModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ModuleId, module: RawModule) -> Option<RawModule> {
        self.modules.insert(id, module)
    }

    pub fn get(&self, id: ModuleId) -> Option<&RawModule> {
        self.modules.get(&id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &RawModule)> {
        self.modules.iter().map(|(id, module)| (*id, module))
    }
}

impl IntoIterator for RawModuleTable {
    type Item = (ModuleId, RawModule);
    type IntoIter = std::collections::btree_map::IntoIter<ModuleId, RawModule>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.into_iter()
    }
}

impl FromIterator<(ModuleId, RawModule)> for RawModuleTable {
    fn from_iter<T: IntoIterator<Item = (ModuleId, RawModule)>>(iter: T) -> Self {
        Self {
            modules: iter.into_iter().collect(),
        }
    }
}

/// Errors that make the module table unusable.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TableError {
    #[error("module table span {span} is outside the source")]
    SpanOutOfBounds { span: SourceSpan },

    #[error("module table does not parse: {0}")]
    Parse(#[from] ParseError),

    #[error("module table is not an object literal")]
    NotAnObject,

    #[error("module table key at {span} is not a module id")]
    InvalidKey { span: SourceSpan },

    #[error("module {id}: {reason}")]
    InvalidEntry { id: ModuleId, reason: String },
}

/// Evaluate the table literal found at `span` inside `source`.
pub fn evaluate_table(source: &str, span: SourceSpan) -> Result<RawModuleTable, TableError> {
    let literal = span
        .slice(source)
        .ok_or(TableError::SpanOutOfBounds { span })?;
    let wrapped = format!("{EXPORTS_PREFIX}{literal};");
    let tree = parse_source(&wrapped)?;
    let object = tree.first_object().ok_or(TableError::NotAnObject)?;

    let table = read_table(object, &wrapped)?;
    tracing::debug!(modules = table.len(), "module table evaluated");
    Ok(table)
}

fn read_table(object: &ObjectLiteral, text: &str) -> Result<RawModuleTable, TableError> {
    let mut table = RawModuleTable::new();

    for member in &object.properties {
        let SyntaxNode::Property(prop) = member else {
            return Err(TableError::InvalidKey {
                span: member.span(),
            });
        };
        let id = match prop.key {
            PropertyKey::Number(value) if !prop.computed => {
                ModuleId::from_literal(value)
            }
            _ => None,
        }
        .ok_or(TableError::InvalidKey { span: prop.span })?;

        let entry = prop
            .value()
            .map(SyntaxNode::unparenthesized)
            .ok_or_else(|| invalid(id, "entry has no value"))?;
        let module = read_entry(id, entry, text)?;

        // Later duplicates win, as they would in an engine.
        table.insert(id, module);
    }

    Ok(table)
}

fn read_entry(id: ModuleId, entry: &SyntaxNode, text: &str) -> Result<RawModule, TableError> {
    let SyntaxNode::Array(array) = entry else {
        return Err(invalid(id, "entry is not an array"));
    };
    let mut elements = array.elements.iter().map(SyntaxNode::unparenthesized);

    let factory = elements
        .next()
        .ok_or_else(|| invalid(id, "entry is empty"))?;
    if !factory.is_function() {
        return Err(invalid(
            id,
            format!("expected a factory function, found {}", factory.kind()),
        ));
    }
    let source = factory
        .span()
        .slice(text)
        .ok_or_else(|| invalid(id, "factory span is outside the source"))?
        .to_string();

    let dependencies = match elements.next() {
        None => IndexMap::new(),
        Some(SyntaxNode::Object(map)) => read_dependencies(id, map, text)?,
        Some(other) => {
            return Err(invalid(
                id,
                format!("expected a dependency map, found {}", other.kind()),
            ));
        }
    };

    Ok(RawModule {
        source,
        dependencies,
    })
}

fn read_dependencies(
    id: ModuleId,
    map: &ObjectLiteral,
    text: &str,
) -> Result<IndexMap<String, DependencyTarget>, TableError> {
    let mut dependencies = IndexMap::with_capacity(map.properties.len());

    for member in &map.properties {
        let SyntaxNode::Property(prop) = member else {
            return Err(invalid(id, "dependency map contains a spread"));
        };
        let specifier = prop
            .key
            .as_name()
            .filter(|_| !prop.computed)
            .ok_or_else(|| invalid(id, format!("unsupported dependency key at {}", prop.span)))?;
        let value = prop
            .value()
            .map(SyntaxNode::unparenthesized)
            .ok_or_else(|| invalid(id, format!("dependency '{specifier}' has no value")))?;

        let target = match value {
            SyntaxNode::Number(number) => match ModuleId::from_literal(number.value) {
                Some(target) => DependencyTarget::Module(target),
                None => DependencyTarget::Unresolved(number.value.to_string()),
            },
            other => DependencyTarget::Unresolved(
                other.span().slice(text).unwrap_or_default().to_string(),
            ),
        };
        dependencies.insert(specifier, target);
    }

    Ok(dependencies)
}

fn invalid(id: ModuleId, reason: impl Into<String>) -> TableError {
    TableError::InvalidEntry {
        id,
        reason: reason.into(),
    }
}
