//! Identity resolution for nodes of one unit.
//!
//! Bridges the syntax arena and the canonical-string functions in
//! `identity`: finds enclosing types and methods, substitutes placeholder
//! qualified names where the resolver left bindings out, and reports
//! whether a placeholder was needed.

use std::collections::HashSet;

use crate::identity::{self, IdentityError, IdentityKey};
use crate::unit::{CompilationUnit, NodeId, NodeKind, SyntaxNode, TypeBinding, TypeRef};

/// An identity key plus the names that go with it.
#[derive(Debug, Clone)]
pub(crate) struct Resolved {
    /// Identity key
    pub key: IdentityKey,
    /// Qualified name used on the entity record
    pub qualified_name: String,
    /// Whether any of the node's own components fell back to a placeholder
    pub placeholder: bool,
}

/// Qualified name and identity key of a type reference.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedTypeRef {
    pub key: IdentityKey,
    pub qualified_name: String,
}

pub(crate) struct KeyResolver<'u> {
    unit: &'u CompilationUnit,
}

impl<'u> KeyResolver<'u> {
    pub fn new(unit: &'u CompilationUnit) -> Self {
        Self { unit }
    }

    /// Identity of a named or anonymous type node.
    ///
    /// Unresolved types get a placeholder built by walking outward to the
    /// first resolved type (or the top level) and appending one segment per
    /// nesting level: `.Name` for a member type, `$start` for an anonymous
    /// class and `$startName` for a local class.
    pub fn type_identity(&self, id: NodeId) -> Result<Resolved, IdentityError> {
        let kind = &self.type_node(id)?.kind;
        if let Some(binding) = type_binding(kind) {
            return Ok(Resolved {
                key: identity::type_key(&binding.qualified_name, &binding.type_parameters)?,
                qualified_name: binding.qualified_name.clone(),
                placeholder: false,
            });
        }

        let mut segments = Vec::new();
        let mut visited = HashSet::new();
        let mut current = id;
        let base = loop {
            if !visited.insert(current) {
                return Err(IdentityError::Malformed {
                    component: "type nesting",
                    value: current.to_string(),
                });
            }
            let node = self.type_node(current)?;
            if let Some(binding) = type_binding(&node.kind) {
                break binding.qualified_name.clone();
            }
            let outer = self.enclosing_type_node(current);
            match (&node.kind, outer) {
                (NodeKind::Type(decl), None) => {
                    break match &self.unit.package {
                        Some(package) if !package.is_empty() => format!("{package}.{}", decl.name),
                        _ => decl.name.clone(),
                    };
                }
                (NodeKind::Type(decl), Some(_)) if self.is_local(current) => {
                    segments.push(format!("${}{}", node.start, decl.name));
                }
                (NodeKind::Type(decl), Some(_)) => segments.push(format!(".{}", decl.name)),
                (_, None) => {
                    return Err(IdentityError::Empty {
                        component: "enclosing type",
                    });
                }
                (_, Some(_)) => segments.push(format!("${}", node.start)),
            }
            if let Some(outer) = outer {
                current = outer;
            }
        };

        let qualified_name = segments.iter().rev().fold(base, |mut name, segment| {
            name.push_str(segment);
            name
        });
        let key = match kind {
            NodeKind::Type(decl) => identity::type_key(&qualified_name, &decl.type_parameters)?,
            _ => identity::type_key::<&str>(&qualified_name, &[])?,
        };
        Ok(Resolved {
            key,
            qualified_name,
            placeholder: true,
        })
    }

    /// A type node, or an error if `id` is missing or not type-like.
    fn type_node(&self, id: NodeId) -> Result<&'u SyntaxNode, IdentityError> {
        let node = self.unit.node(id).ok_or(IdentityError::Empty {
            component: "type node",
        })?;
        if node.kind.is_type_like() {
            Ok(node)
        } else {
            Err(IdentityError::Malformed {
                component: "type node",
                value: id.to_string(),
            })
        }
    }

    /// Whether a type is declared inside a method or lambda body.
    fn is_local(&self, id: NodeId) -> bool {
        self.unit
            .ancestors(id)
            .find(|(_, node)| node.kind.is_type_like() || node.kind.scope_kind().is_some())
            .is_some_and(|(_, node)| !node.kind.is_type_like())
    }

    /// Identity of the nearest enclosing named or anonymous type.
    pub fn enclosing_type(&self, id: NodeId) -> Result<Resolved, IdentityError> {
        let outer = self.enclosing_type_node(id).ok_or(IdentityError::Empty {
            component: "enclosing type",
        })?;
        self.type_identity(outer)
    }

    fn enclosing_type_node(&self, id: NodeId) -> Option<NodeId> {
        self.unit
            .ancestors(id)
            .find(|(_, node)| node.kind.is_type_like())
            .map(|(outer, _)| outer)
    }

    /// Identity of a method, constructor or lambda node.
    pub fn method_identity(&self, id: NodeId) -> Result<Resolved, IdentityError> {
        let node = self.unit.node(id).ok_or(IdentityError::Empty {
            component: "method node",
        })?;
        let owner = self.enclosing_type(id)?;

        let (name, return_type, parameters) = match &node.kind {
            NodeKind::Method(decl) => (
                decl.name.as_str(),
                decl.return_type.as_ref(),
                &decl.parameters,
            ),
            NodeKind::Lambda(decl) => (
                decl.name.as_deref().unwrap_or("lambda"),
                decl.return_type.as_ref(),
                &decl.parameters,
            ),
            _ => {
                return Err(IdentityError::Malformed {
                    component: "method node",
                    value: id.to_string(),
                });
            }
        };

        let return_name = return_type.map_or("void", TypeRef::qualified_or_written);
        let parameter_names: Vec<&str> =
            parameters.iter().map(TypeRef::qualified_or_written).collect();
        let placeholder = return_type.is_some_and(|t| !t.is_resolved())
            || parameters.iter().any(|p| !p.is_resolved());

        Ok(Resolved {
            key: identity::method_key(
                &owner.key,
                return_name,
                name,
                &parameter_names,
                identity::lambda_offset(self.unit, id),
            )?,
            qualified_name: format!("{}.{name}", owner.qualified_name),
            placeholder,
        })
    }

    /// Identity of the method or lambda a variable is declared in.
    ///
    /// Variables outside any method (initializer blocks) fall back to the
    /// enclosing type.
    pub fn enclosing_method(&self, id: NodeId) -> Result<IdentityKey, IdentityError> {
        let method = self
            .unit
            .ancestors(id)
            .take_while(|(_, node)| !node.kind.is_type_like())
            .find(|(_, node)| matches!(node.kind, NodeKind::Method(_) | NodeKind::Lambda(_)))
            .map(|(method, _)| method);

        match method {
            Some(method) => Ok(self.method_identity(method)?.key),
            None => Ok(self.enclosing_type(id)?.key),
        }
    }

    /// Identity of a field node.
    pub fn field_identity(
        &self,
        id: NodeId,
        name: &str,
        field_type: &TypeRef,
    ) -> Result<Resolved, IdentityError> {
        let owner = self.enclosing_type(id)?;
        Ok(Resolved {
            key: identity::field_key(&owner.key, field_type.qualified_or_written(), name)?,
            qualified_name: format!("{}.{name}", owner.qualified_name),
            placeholder: !field_type.is_resolved(),
        })
    }

    /// Identity of a variable node.
    pub fn variable_identity(
        &self,
        id: NodeId,
        name: &str,
        var_type: &TypeRef,
    ) -> Result<Resolved, IdentityError> {
        let method = self.enclosing_method(id)?;
        Ok(Resolved {
            key: identity::variable_key(&method, var_type.qualified_or_written(), name)?,
            qualified_name: name.to_string(),
            placeholder: !var_type.is_resolved(),
        })
    }

    /// Identity of an enum constant node.
    pub fn enum_constant_identity(
        &self,
        id: NodeId,
        name: &str,
    ) -> Result<Resolved, IdentityError> {
        let owner = self.enclosing_type(id)?;
        Ok(Resolved {
            key: identity::enum_constant_key(&owner.qualified_name, name)?,
            qualified_name: format!("{}.{name}", owner.qualified_name),
            placeholder: false,
        })
    }

    /// Identity of a resolved invocation target.
    pub fn invocation_target(
        binding: &crate::unit::MethodBinding,
    ) -> Result<IdentityKey, IdentityError> {
        let owner = identity::type_key(
            &binding.declaring_type.qualified_name,
            &binding.declaring_type.type_parameters,
        )?;
        identity::method_key(
            &owner,
            &binding.return_type,
            &binding.name,
            &binding.parameter_types,
            None,
        )
    }
}

fn type_binding(kind: &NodeKind) -> Option<&TypeBinding> {
    match kind {
        NodeKind::Type(decl) => decl.binding.as_ref(),
        NodeKind::AnonymousClass(decl) => decl.binding.as_ref(),
        _ => None,
    }
}

/// Identity of a written type, as the declaration of that type would hash it.
///
/// Unresolved references hash their written text.
pub(crate) fn type_ref_identity(type_ref: &TypeRef) -> Result<ResolvedTypeRef, IdentityError> {
    match &type_ref.binding {
        Some(TypeBinding {
            qualified_name,
            type_parameters,
        }) => Ok(ResolvedTypeRef {
            key: identity::type_key(qualified_name, type_parameters)?,
            qualified_name: qualified_name.clone(),
        }),
        None => Ok(ResolvedTypeRef {
            key: identity::type_key::<&str>(&type_ref.written, &[])?,
            qualified_name: type_ref.written.clone(),
        }),
    }
}
