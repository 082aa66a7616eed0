//! Shared fixtures for integration tests.
//!
//! Sources are ASCII, so byte offsets found with `str::find` equal the char
//! offsets the extractor expects.

#![allow(dead_code)]

use tessera::unit::{
    FieldDecl, LambdaDecl, MethodDecl, TypeBinding, TypeDecl, TypeRef, VariableDecl,
};
use tessera::{CompilationUnit, FileId, Modifiers, NodeId, NodeKind, SyntaxNode};

/// Builds a unit by locating each node's text in the source.
pub struct UnitBuilder {
    unit: CompilationUnit,
}

impl UnitBuilder {
    pub fn new(file_id: i64, source: &str) -> Self {
        Self {
            unit: CompilationUnit::new(FileId(file_id), format!("Unit{file_id}.java"), source),
        }
    }

    pub fn package(mut self, package: &str) -> Self {
        self.unit.package = Some(package.to_string());
        self
    }

    /// Offsets of the `occurrence`-th (0-based) match of `needle`.
    pub fn span_at(&self, needle: &str, occurrence: usize) -> (usize, usize) {
        let (start, _) = self
            .unit
            .source
            .match_indices(needle)
            .nth(occurrence)
            .unwrap_or_else(|| panic!("{needle:?} occurrence {occurrence} not in source"));
        (start, start + needle.len())
    }

    pub fn add(&mut self, parent: Option<NodeId>, needle: &str, kind: NodeKind) -> NodeId {
        self.add_at(parent, needle, 0, kind)
    }

    pub fn add_at(
        &mut self,
        parent: Option<NodeId>,
        needle: &str,
        occurrence: usize,
        kind: NodeKind,
    ) -> NodeId {
        let (start, end) = self.span_at(needle, occurrence);
        self.unit.push(SyntaxNode::new(parent, start, end, kind))
    }

    pub fn add_node(&mut self, node: SyntaxNode) -> NodeId {
        self.unit.push(node)
    }

    pub fn unit_mut(&mut self) -> &mut CompilationUnit {
        &mut self.unit
    }

    pub fn finish(self) -> CompilationUnit {
        self.unit
    }
}

pub fn class(name: &str, qualified_name: Option<&str>) -> NodeKind {
    NodeKind::Type(TypeDecl {
        name: name.to_string(),
        binding: qualified_name.map(TypeBinding::new),
        ..TypeDecl::default()
    })
}

pub fn generic_class(name: &str, qualified_name: &str, params: &[&str]) -> NodeKind {
    NodeKind::Type(TypeDecl {
        name: name.to_string(),
        type_parameters: params.iter().map(|p| (*p).to_string()).collect(),
        binding: Some(TypeBinding::generic(qualified_name, params)),
        ..TypeDecl::default()
    })
}

pub fn method(name: &str, return_type: TypeRef, params: Vec<TypeRef>) -> NodeKind {
    NodeKind::Method(MethodDecl {
        name: name.to_string(),
        modifiers: Modifiers::default(),
        constructor: false,
        return_type: Some(return_type),
        parameters: params,
        has_body: true,
    })
}

pub fn field(name: &str, field_type: TypeRef, modifiers: u32) -> NodeKind {
    NodeKind::Field(FieldDecl {
        name: name.to_string(),
        modifiers: Modifiers(modifiers),
        field_type,
        has_initializer: false,
    })
}

pub fn variable(name: &str, var_type: TypeRef) -> NodeKind {
    NodeKind::Variable(VariableDecl {
        name: name.to_string(),
        var_type,
        has_initializer: true,
        ..VariableDecl::default()
    })
}

pub fn lambda() -> NodeKind {
    NodeKind::Lambda(LambdaDecl::default())
}

/// A primitive or `java.lang` type reference resolved to itself.
pub fn resolved(qualified_name: &str) -> TypeRef {
    let written = qualified_name.rsplit('.').next().unwrap_or(qualified_name);
    TypeRef::resolved(written, qualified_name)
}
