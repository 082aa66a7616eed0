//! Front-end hand-off: one parsed compilation unit with its bindings.
//!
//! The lexer, parser and binding resolver live outside Tessera. They hand
//! over a `CompilationUnit`: the source text, a flat pre-order arena of
//! syntax nodes, and the problems the compiler reported. Everything here is
//! plain data and deserializes from the JSON the front-end writes.
//!
//! ## Conventions
//!
//! - A node's id is its index in `CompilationUnit::nodes`.
//! - Offsets count `char`s from the start of `source`; `end` is exclusive.
//! - A `TypeRef` without a `binding` is an unresolved reference. The
//!   extractor degrades it to a placeholder instead of failing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::modifiers::Modifiers;
use crate::types::FileId;

/// Index of a node in its unit's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of the node in `CompilationUnit::nodes`.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The parsed representation of one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Storage identifier of the source file
    pub file_id: FileId,
    /// Human-readable label used only in diagnostic log lines (e.g. "(3/120) Foo.java")
    #[serde(default)]
    pub label: String,
    /// Declared package, if any
    #[serde(default)]
    pub package: Option<String>,
    /// Full source text
    pub source: String,
    /// Syntax nodes in pre-order
    #[serde(default)]
    pub nodes: Vec<SyntaxNode>,
    /// Problems reported by the compiler front-end
    #[serde(default)]
    pub problems: Vec<Problem>,
}

impl CompilationUnit {
    /// Create an empty unit over `source`.
    #[must_use]
    pub fn new(file_id: FileId, label: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file_id,
            label: label.into(),
            package: None,
            source: source.into(),
            nodes: Vec::new(),
            problems: Vec::new(),
        }
    }

    /// Read a unit from the front-end's JSON hand-off.
    ///
    /// A document consisting of `null` means the front-end produced no unit
    /// and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file can't be read and `Error::Json` if it
    /// isn't a valid unit document.
    pub fn from_json_file(path: &Path) -> Result<Option<Self>> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    /// Iterate nodes together with their ids.
    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeId, &SyntaxNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(u32::try_from(i).unwrap_or(u32::MAX)), node))
    }

    /// Iterate the strict ancestors of `id`, nearest first.
    ///
    /// The walk is bounded by the arena size, so a malformed parent cycle
    /// terminates instead of looping.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            unit: self,
            next: self.node(id).and_then(|n| n.parent),
            remaining: self.nodes.len(),
        }
    }

    /// Append a node and return its id.
    pub fn push(&mut self, node: SyntaxNode) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(node);
        id
    }
}

/// Iterator over a node's ancestors. See [`CompilationUnit::ancestors`].
pub struct Ancestors<'a> {
    unit: &'a CompilationUnit,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (NodeId, &'a SyntaxNode);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let id = self.next?;
        let node = self.unit.node(id)?;
        self.next = node.parent;
        Some((id, node))
    }
}

/// One node of the syntax tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Enclosing node, `None` for top-level nodes
    #[serde(default)]
    pub parent: Option<NodeId>,
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
    /// Synthesized by the front-end (e.g. a default constructor)
    #[serde(default)]
    pub implicit: bool,
    /// Attached documentation comment
    #[serde(default)]
    pub doc_comment: Option<String>,
    /// What this node is
    pub kind: NodeKind,
}

impl SyntaxNode {
    /// Create a node spanning `start..end`.
    #[must_use]
    pub fn new(parent: Option<NodeId>, start: usize, end: usize, kind: NodeKind) -> Self {
        Self {
            parent,
            start,
            end,
            implicit: false,
            doc_comment: None,
            kind,
        }
    }

    /// Attach a documentation comment.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }
}

/// Node payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum NodeKind {
    /// Class, interface or enum declaration
    Type(TypeDecl),
    /// Anonymous class body
    AnonymousClass(AnonymousClassDecl),
    /// Method or constructor declaration
    Method(MethodDecl),
    /// Field declaration (one per declared variable)
    Field(FieldDecl),
    /// Enum constant declaration
    EnumConstant(EnumConstantDecl),
    /// Local variable or parameter declaration
    Variable(VariableDecl),
    /// Lambda expression
    Lambda(LambdaDecl),
    /// Method invocation site
    Invocation(Invocation),
    /// Any other structural node
    Other,
}

/// Which kind of scope a node opens, for declaring-scope lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Named type declaration
    Type,
    /// Method or constructor
    Method,
    /// Lambda expression
    Lambda,
}

impl NodeKind {
    /// The scope this node opens, if any.
    ///
    /// Anonymous classes are deliberately not scopes: a method inside one
    /// keeps searching outward and finds the enclosing lambda or method.
    #[must_use]
    pub fn scope_kind(&self) -> Option<ScopeKind> {
        match self {
            Self::Type(_) => Some(ScopeKind::Type),
            Self::Method(_) => Some(ScopeKind::Method),
            Self::Lambda(_) => Some(ScopeKind::Lambda),
            _ => None,
        }
    }

    /// Whether this node can own members (named or anonymous type body).
    #[must_use]
    pub fn is_type_like(&self) -> bool {
        matches!(self, Self::Type(_) | Self::AnonymousClass(_))
    }
}

/// Kind of a named type declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// `class`
    #[default]
    Class,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
}

/// Resolved semantic information for a type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBinding {
    /// Fully qualified name (e.g. "java.util.List")
    pub qualified_name: String,
    /// Qualified names of the declared type parameters (e.g. `["E"]`)
    #[serde(default)]
    pub type_parameters: Vec<String>,
}

impl TypeBinding {
    /// Binding for a type without type parameters.
    #[must_use]
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            type_parameters: Vec::new(),
        }
    }

    /// Binding for a generic type.
    #[must_use]
    pub fn generic(qualified_name: impl Into<String>, type_parameters: &[&str]) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            type_parameters: type_parameters.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

/// A type as written in source, with its binding if the resolver found one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Text as written (e.g. "List<String>")
    pub written: String,
    /// Resolved binding, `None` when resolution failed
    #[serde(default)]
    pub binding: Option<TypeBinding>,
}

impl TypeRef {
    /// An unresolved reference.
    #[must_use]
    pub fn unresolved(written: impl Into<String>) -> Self {
        Self {
            written: written.into(),
            binding: None,
        }
    }

    /// A reference resolved to `qualified_name`.
    #[must_use]
    pub fn resolved(written: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            written: written.into(),
            binding: Some(TypeBinding::new(qualified_name)),
        }
    }

    /// A reference resolved to a full binding.
    #[must_use]
    pub fn bound(written: impl Into<String>, binding: TypeBinding) -> Self {
        Self {
            written: written.into(),
            binding: Some(binding),
        }
    }

    /// Qualified name if resolved, otherwise the text as written.
    #[must_use]
    pub fn qualified_or_written(&self) -> &str {
        self.binding
            .as_ref()
            .map_or(self.written.as_str(), |b| b.qualified_name.as_str())
    }

    /// Whether the resolver produced a binding.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.binding.is_some()
    }
}

/// Class, interface or enum declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Simple name
    pub name: String,
    /// Class, interface or enum
    #[serde(default)]
    pub type_kind: TypeKind,
    /// Raw modifier bits
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Type parameter names as written (e.g. `["T"]`)
    #[serde(default)]
    pub type_parameters: Vec<String>,
    /// Resolved binding
    #[serde(default)]
    pub binding: Option<TypeBinding>,
    /// `extends` clause of a class
    #[serde(default)]
    pub superclass: Option<TypeRef>,
    /// `implements` clause of a class/enum, `extends` clause of an interface
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,
}

/// Anonymous class body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnonymousClassDecl {
    /// Resolved binding (binary name such as "pkg.Outer$1")
    #[serde(default)]
    pub binding: Option<TypeBinding>,
}

/// Method or constructor declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodDecl {
    /// Simple name (the class name for constructors)
    pub name: String,
    /// Raw modifier bits
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Constructor rather than method
    #[serde(default)]
    pub constructor: bool,
    /// Return type, `None` for constructors
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    /// Parameter types in declaration order
    #[serde(default)]
    pub parameters: Vec<TypeRef>,
    /// Whether the declaration has a body
    #[serde(default)]
    pub has_body: bool,
}

/// Field declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name
    pub name: String,
    /// Raw modifier bits
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Declared type
    pub field_type: TypeRef,
    /// Whether an initializer is present
    #[serde(default)]
    pub has_initializer: bool,
}

/// Enum constant declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumConstantDecl {
    /// Constant name
    pub name: String,
}

/// Local variable or parameter declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableDecl {
    /// Variable name
    pub name: String,
    /// Raw modifier bits
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Declared type
    pub var_type: TypeRef,
    /// Whether an initializer is present
    #[serde(default)]
    pub has_initializer: bool,
}

/// Lambda expression.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LambdaDecl {
    /// Synthetic method name from the binding (e.g. "lambda$0")
    #[serde(default)]
    pub name: Option<String>,
    /// Return type of the functional method
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    /// Parameter types of the functional method
    #[serde(default)]
    pub parameters: Vec<TypeRef>,
}

/// Resolved target of a method invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodBinding {
    /// Type declaring the invoked method
    pub declaring_type: TypeBinding,
    /// Method name
    pub name: String,
    /// Qualified return type
    pub return_type: String,
    /// Qualified parameter types
    #[serde(default)]
    pub parameter_types: Vec<String>,
}

/// Method invocation site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Invocation {
    /// Invoked name as written
    pub name: String,
    /// Resolved target, `None` when resolution failed
    #[serde(default)]
    pub target: Option<MethodBinding>,
}

/// A problem reported by the compiler front-end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Problem {
    /// Problem message
    pub message: String,
    /// Reported as an error
    #[serde(default)]
    pub is_error: bool,
    /// Reported as a warning
    #[serde(default)]
    pub is_warning: bool,
    /// Start offset
    pub start: usize,
    /// End offset
    pub end: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_unit() -> CompilationUnit {
        let mut unit = CompilationUnit::new(FileId(1), "Chain.java", "class A { void m() {} }");
        let class = unit.push(SyntaxNode::new(
            None,
            0,
            23,
            NodeKind::Type(TypeDecl {
                name: "A".to_string(),
                ..TypeDecl::default()
            }),
        ));
        let method = unit.push(SyntaxNode::new(
            Some(class),
            10,
            21,
            NodeKind::Method(MethodDecl {
                name: "m".to_string(),
                ..MethodDecl::default()
            }),
        ));
        unit.push(SyntaxNode::new(Some(method), 19, 21, NodeKind::Other));
        unit
    }

    #[test]
    fn ancestors_walks_nearest_first() {
        let unit = chain_unit();

        let ids: Vec<NodeId> = unit.ancestors(NodeId(2)).map(|(id, _)| id).collect();

        assert_eq!(ids, vec![NodeId(1), NodeId(0)]);
    }

    #[test]
    fn ancestors_terminates_on_parent_cycle() {
        let mut unit = chain_unit();
        unit.nodes[0].parent = Some(NodeId(2));

        let count = unit.ancestors(NodeId(2)).count();

        assert_eq!(count, unit.nodes.len());
    }

    #[test]
    fn anonymous_class_is_type_like_but_not_a_scope() {
        let kind = NodeKind::AnonymousClass(AnonymousClassDecl::default());

        assert!(kind.is_type_like());
        assert_eq!(kind.scope_kind(), None);
    }

    #[test]
    fn unit_deserializes_from_front_end_json() {
        let json = r#"{
            "file_id": 4,
            "label": "Foo.java",
            "package": "com.example",
            "source": "class Foo {}",
            "nodes": [
                {"start": 0, "end": 12, "kind": {"node": "type", "name": "Foo"}}
            ],
            "problems": [
                {"message": "unused", "is_warning": true, "start": 6, "end": 9}
            ]
        }"#;

        let unit: CompilationUnit = serde_json::from_str(json).expect("valid unit json");

        assert_eq!(unit.file_id, FileId(4));
        assert_eq!(unit.nodes.len(), 1);
        assert!(matches!(&unit.nodes[0].kind, NodeKind::Type(t) if t.name == "Foo"));
        assert!(unit.problems[0].is_warning);
        assert!(!unit.problems[0].is_error);
    }

    #[test]
    fn null_document_means_no_unit() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("unit.json");
        std::fs::write(&path, "null").expect("should write file");

        let unit = CompilationUnit::from_json_file(&path).expect("null is valid");

        assert!(unit.is_none());
    }

    #[test]
    fn malformed_document_is_json_error() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("unit.json");
        std::fs::write(&path, "{\"file_id\": ").expect("should write file");

        let err = CompilationUnit::from_json_file(&path).expect_err("truncated json");

        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn type_ref_prefers_binding_over_written_text() {
        assert_eq!(
            TypeRef::resolved("String", "java.lang.String").qualified_or_written(),
            "java.lang.String"
        );
        assert_eq!(TypeRef::unresolved("Missing").qualified_or_written(), "Missing");
    }
}
