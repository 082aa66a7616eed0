//! Entity record builder.
//!
//! Walks one compilation unit and emits the records the storage layer
//! persists: an `Entity` and a declaring `AstNode` per declaration, plus
//! membership, inheritance, documentation and usage records.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    EntityRecordBuilder                    │
//! ├───────────────────────────────────────────────────────────┤
//! │  Pass 1: declarations in arena order                      │
//! │          Entity + AstNode + DocComment, edges of the type │
//! │  Pass 2: pending memberships against emitted entities     │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Unresolved bindings | Placeholder qualified names | Records still carry a deterministic key |
//! | Unresolved supertypes / targets | Edge skipped and counted | No edge may point at an unknown key |
//! | Failing declaration | Its records dropped, error collected | Siblings still produce records |
//! | Membership | Deferred to a second pass | Owners dropped in pass 1 never gain members |

mod keys;

use std::collections::HashSet;

use crate::config::ExtractorConfig;
use crate::error::{Error, ExtractionError, Result, Subject};
use crate::identity;
use crate::log::{BuildLog, LogLevel, emit};
use crate::modifiers::Modifiers;
use crate::position::PositionMapper;
use crate::types::{
    AstKind, AstNode, AstNodeId, DocComment, Entity, EntityDetail, EntityHash, ExtractionStats,
    Inheritance, MemberKind, MemberType, Record, RecordSet, Relation, RelationKind, SymbolKind,
    TypedEntity,
};
use crate::unit::{
    CompilationUnit, EnumConstantDecl, FieldDecl, Invocation, LambdaDecl, MethodDecl, NodeId,
    NodeKind, SyntaxNode, TypeDecl, TypeKind, TypeRef, VariableDecl,
};

use keys::{KeyResolver, Resolved, type_ref_identity};

/// Records and collected failures of one unit.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    /// Emitted records
    pub records: RecordSet,
    /// Declarations whose records were dropped
    pub errors: Vec<ExtractionError>,
    /// Placeholder and skipped-edge counters
    pub stats: ExtractionStats,
}

/// Builds entity records for compilation units.
///
/// Holds no per-unit state, so one builder can be shared across threads.
pub struct EntityRecordBuilder<'a> {
    config: &'a ExtractorConfig,
    log: &'a dyn BuildLog,
}

impl<'a> EntityRecordBuilder<'a> {
    /// Create a builder writing per-entity failures to `log`.
    #[must_use]
    pub fn new(config: &'a ExtractorConfig, log: &'a dyn BuildLog) -> Self {
        Self { config, log }
    }

    /// Build all records for `unit`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCompilationUnit` if `unit` is `None`. Failures of
    /// individual declarations never fail the unit; they are collected in
    /// `BuildOutput::errors`.
    pub fn build(&self, unit: Option<&CompilationUnit>) -> Result<BuildOutput> {
        let unit = unit.ok_or(Error::NoCompilationUnit)?;

        let mut build = UnitBuild {
            unit,
            config: self.config,
            mapper: PositionMapper::for_unit(unit),
            keys: KeyResolver::new(unit),
            out: BuildOutput::default(),
            emitted: HashSet::new(),
            pending_members: Vec::new(),
        };

        for (id, node) in unit.iter_nodes() {
            if let Err(error) = build.node(id, node) {
                emit(
                    self.log,
                    LogLevel::Warning,
                    &format!("{} {error}", unit.label),
                );
                build.out.errors.push(error);
            }
        }
        build.link_members();

        tracing::debug!(
            file_id = %unit.file_id,
            entities = build.out.records.entities.len(),
            ast_nodes = build.out.records.ast_nodes.len(),
            errors = build.out.errors.len(),
            placeholders = build.out.stats.placeholders,
            skipped = build.out.stats.skipped_references,
            "Built entity records"
        );
        Ok(build.out)
    }
}

/// A membership edge waiting for its owner to be confirmed.
struct PendingMember {
    owner: NodeId,
    member_hash: EntityHash,
    kind: MemberKind,
    modifiers: Modifiers,
    member_ast_node: AstNodeId,
}

/// Per-unit build state.
struct UnitBuild<'u> {
    unit: &'u CompilationUnit,
    config: &'u ExtractorConfig,
    mapper: PositionMapper<'u>,
    keys: KeyResolver<'u>,
    out: BuildOutput,
    emitted: HashSet<EntityHash>,
    pending_members: Vec<PendingMember>,
}

/// What a declaration contributes besides its identity.
struct Declared<'n> {
    name: &'n str,
    symbol_kind: SymbolKind,
    ast_kind: AstKind,
    detail: EntityDetail,
}

impl UnitBuild<'_> {
    fn node(&mut self, id: NodeId, node: &SyntaxNode) -> std::result::Result<(), ExtractionError> {
        match &node.kind {
            NodeKind::Type(decl) => self.type_decl(id, node, decl),
            NodeKind::AnonymousClass(_) => self.anonymous_class(id, node),
            NodeKind::Method(decl) => self.method(id, node, decl),
            NodeKind::Field(decl) => self.field(id, node, decl),
            NodeKind::EnumConstant(decl) => self.enum_constant(id, node, decl),
            NodeKind::Variable(decl) => self.variable(id, node, decl),
            NodeKind::Lambda(decl) => self.lambda(id, node, decl),
            NodeKind::Invocation(call) => self.invocation(id, node, call),
            NodeKind::Other => Ok(()),
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn type_decl(
        &mut self,
        id: NodeId,
        node: &SyntaxNode,
        decl: &TypeDecl,
    ) -> std::result::Result<(), ExtractionError> {
        let resolved = self
            .keys
            .type_identity(id)
            .map_err(|e| ExtractionError::identity(id, &e))?;

        // Supertype keys are computed before anything is emitted so a
        // malformed binding drops the whole declaration.
        let mut supertypes = Vec::new();
        if let Some(superclass) = &decl.superclass {
            supertypes.push((superclass, RelationKind::Inheritance));
        }
        let interface_kind = if decl.type_kind == TypeKind::Interface {
            RelationKind::Inheritance
        } else {
            RelationKind::Implements
        };
        supertypes.extend(decl.interfaces.iter().map(|i| (i, interface_kind)));

        let mut bases = Vec::new();
        for (reference, kind) in supertypes {
            if reference.is_resolved() {
                let base = type_ref_identity(reference)
                    .map_err(|e| ExtractionError::identity(id, &e))?;
                bases.push((base.key.hash(), kind));
            } else {
                self.skip_reference(id, &reference.written);
            }
        }

        let ast_node = self.declare(
            id,
            node,
            &resolved,
            Declared {
                name: &decl.name,
                symbol_kind: SymbolKind::Type,
                ast_kind: AstKind::Definition,
                detail: EntityDetail::Record(Record {
                    is_abstract: decl.modifiers.is_abstract()
                        || decl.type_kind == TypeKind::Interface,
                    is_final: decl.modifiers.is_final(),
                }),
            },
        )?;

        let derived = resolved.key.hash();
        for (base, kind) in bases {
            self.out.records.inheritances.push(Inheritance { base, derived });
            self.out.records.relations.push(Relation {
                kind,
                lhs: derived,
                rhs: base,
            });
        }

        self.queue_member(id, derived, MemberKind::NestedType, decl.modifiers, ast_node);
        Ok(())
    }

    // Anonymous classes own members but are not entities themselves.
    fn anonymous_class(
        &mut self,
        id: NodeId,
        node: &SyntaxNode,
    ) -> std::result::Result<(), ExtractionError> {
        let resolved = self
            .keys
            .type_identity(id)
            .map_err(|e| ExtractionError::identity(id, &e))?;
        if resolved.placeholder {
            self.note_placeholder(id, &resolved);
        }
        tracing::trace!(
            node = %id,
            start = node.start,
            key = %resolved.key,
            "Anonymous class scope"
        );
        Ok(())
    }

    fn method(
        &mut self,
        id: NodeId,
        node: &SyntaxNode,
        decl: &MethodDecl,
    ) -> std::result::Result<(), ExtractionError> {
        let resolved = self
            .keys
            .method_identity(id)
            .map_err(|e| ExtractionError::identity(id, &e))?;
        let (type_hash, qualified_type) = declared_type(id, decl.return_type.as_ref())?;

        let (symbol_kind, member_kind) = if decl.constructor {
            (SymbolKind::Constructor, MemberKind::Constructor)
        } else {
            (SymbolKind::Method, MemberKind::Method)
        };

        let ast_node = self.declare(
            id,
            node,
            &resolved,
            Declared {
                name: &decl.name,
                symbol_kind,
                ast_kind: if decl.has_body {
                    AstKind::Definition
                } else {
                    AstKind::Declaration
                },
                detail: EntityDetail::Typed(TypedEntity {
                    is_final: decl.modifiers.is_final(),
                    is_static: decl.modifiers.is_static(),
                    type_hash,
                    qualified_type,
                }),
            },
        )?;

        self.queue_member(id, resolved.key.hash(), member_kind, decl.modifiers, ast_node);
        Ok(())
    }

    fn lambda(
        &mut self,
        id: NodeId,
        node: &SyntaxNode,
        decl: &LambdaDecl,
    ) -> std::result::Result<(), ExtractionError> {
        let resolved = self
            .keys
            .method_identity(id)
            .map_err(|e| ExtractionError::identity(id, &e))?;
        let (type_hash, qualified_type) = declared_type(id, decl.return_type.as_ref())?;

        self.declare(
            id,
            node,
            &resolved,
            Declared {
                name: decl.name.as_deref().unwrap_or("lambda"),
                symbol_kind: SymbolKind::Lambda,
                ast_kind: AstKind::Definition,
                detail: EntityDetail::Typed(TypedEntity {
                    is_final: false,
                    is_static: false,
                    type_hash,
                    qualified_type,
                }),
            },
        )?;
        Ok(())
    }

    fn field(
        &mut self,
        id: NodeId,
        node: &SyntaxNode,
        decl: &FieldDecl,
    ) -> std::result::Result<(), ExtractionError> {
        let resolved = self
            .keys
            .field_identity(id, &decl.name, &decl.field_type)
            .map_err(|e| ExtractionError::identity(id, &e))?;
        let (type_hash, qualified_type) = declared_type(id, Some(&decl.field_type))?;

        let ast_node = self.declare(
            id,
            node,
            &resolved,
            Declared {
                name: &decl.name,
                symbol_kind: SymbolKind::Field,
                ast_kind: initialized(decl.has_initializer),
                detail: EntityDetail::Typed(TypedEntity {
                    is_final: decl.modifiers.is_final(),
                    is_static: decl.modifiers.is_static(),
                    type_hash,
                    qualified_type,
                }),
            },
        )?;

        self.queue_member(id, resolved.key.hash(), MemberKind::Field, decl.modifiers, ast_node);
        Ok(())
    }

    fn enum_constant(
        &mut self,
        id: NodeId,
        node: &SyntaxNode,
        decl: &EnumConstantDecl,
    ) -> std::result::Result<(), ExtractionError> {
        let resolved = self
            .keys
            .enum_constant_identity(id, &decl.name)
            .map_err(|e| ExtractionError::identity(id, &e))?;

        let ast_node = self.declare(
            id,
            node,
            &resolved,
            Declared {
                name: &decl.name,
                symbol_kind: SymbolKind::EnumConstant,
                ast_kind: AstKind::Definition,
                detail: EntityDetail::Constant,
            },
        )?;

        self.queue_member(
            id,
            resolved.key.hash(),
            MemberKind::EnumConstant,
            Modifiers::ENUM_CONSTANT,
            ast_node,
        );
        Ok(())
    }

    fn variable(
        &mut self,
        id: NodeId,
        node: &SyntaxNode,
        decl: &VariableDecl,
    ) -> std::result::Result<(), ExtractionError> {
        let resolved = self
            .keys
            .variable_identity(id, &decl.name, &decl.var_type)
            .map_err(|e| ExtractionError::identity(id, &e))?;
        let (type_hash, qualified_type) = declared_type(id, Some(&decl.var_type))?;

        self.declare(
            id,
            node,
            &resolved,
            Declared {
                name: &decl.name,
                symbol_kind: SymbolKind::Variable,
                ast_kind: initialized(decl.has_initializer),
                detail: EntityDetail::Typed(TypedEntity {
                    is_final: decl.modifiers.is_final(),
                    is_static: decl.modifiers.is_static(),
                    type_hash,
                    qualified_type,
                }),
            },
        )?;
        Ok(())
    }

    // ========================================================================
    // References
    // ========================================================================

    fn invocation(
        &mut self,
        id: NodeId,
        node: &SyntaxNode,
        call: &Invocation,
    ) -> std::result::Result<(), ExtractionError> {
        if !self.config.emit_usages {
            return Ok(());
        }
        let Some(target) = &call.target else {
            self.skip_reference(id, &call.name);
            return Ok(());
        };

        let key =
            KeyResolver::invocation_target(target).map_err(|e| ExtractionError::identity(id, &e))?;
        let ast_node = self.ast_node(id, node, key.hash(), SymbolKind::Method, AstKind::Usage)?;
        self.out.records.ast_nodes.push(ast_node);
        Ok(())
    }

    // ========================================================================
    // Emission helpers
    // ========================================================================

    /// Emit the `AstNode`, `Entity` and optional `DocComment` of a declaration.
    fn declare(
        &mut self,
        id: NodeId,
        node: &SyntaxNode,
        resolved: &Resolved,
        declared: Declared<'_>,
    ) -> std::result::Result<AstNodeId, ExtractionError> {
        let entity_hash = resolved.key.hash();
        let ast_node =
            self.ast_node(id, node, entity_hash, declared.symbol_kind, declared.ast_kind)?;
        let ast_node_id = ast_node.id;

        if resolved.placeholder {
            self.note_placeholder(id, resolved);
        }

        self.out.records.ast_nodes.push(ast_node);
        self.out.records.entities.push(Entity {
            ast_node_id,
            entity_hash,
            name: declared.name.to_string(),
            qualified_name: resolved.qualified_name.clone(),
            detail: declared.detail,
        });
        self.emitted.insert(entity_hash);

        if self.config.emit_doc_comments
            && let Some(content) = &node.doc_comment
        {
            self.out.records.doc_comments.push(DocComment {
                content: content.clone(),
                content_hash: identity::hash_canonical(content).as_i64(),
                entity_hash,
            });
        }

        Ok(ast_node_id)
    }

    fn ast_node(
        &self,
        id: NodeId,
        node: &SyntaxNode,
        entity_hash: EntityHash,
        symbol_kind: SymbolKind,
        ast_kind: AstKind,
    ) -> std::result::Result<AstNode, ExtractionError> {
        let location = self
            .mapper
            .compute(node.start, node.end)
            .map_err(|e| ExtractionError::position(Subject::Node(id), &e))?;
        let text = self
            .mapper
            .text(node.start, node.end)
            .map_err(|e| ExtractionError::position(Subject::Node(id), &e))?;

        Ok(AstNode {
            id: ast_node_id(
                self.unit,
                node,
                entity_hash,
                symbol_kind,
                ast_kind,
            ),
            ast_value: self.config.clip_ast_value(text),
            location,
            file_id: self.unit.file_id,
            entity_hash,
            symbol_kind,
            ast_kind,
            visible_in_source: !node.implicit,
        })
    }

    fn queue_member(
        &mut self,
        id: NodeId,
        member_hash: EntityHash,
        kind: MemberKind,
        modifiers: Modifiers,
        member_ast_node: AstNodeId,
    ) {
        // Members belong to the nearest type, method or lambda; only a named
        // type owner produces a membership edge.
        let owner = self
            .unit
            .ancestors(id)
            .find(|(_, n)| n.kind.is_type_like() || n.kind.scope_kind().is_some());
        if let Some((owner, NodeKind::Type(_))) = owner.map(|(o, n)| (o, &n.kind)) {
            self.pending_members.push(PendingMember {
                owner,
                member_hash,
                kind,
                modifiers,
                member_ast_node,
            });
        }
    }

    fn link_members(&mut self) {
        for pending in std::mem::take(&mut self.pending_members) {
            let Ok(owner) = self.keys.type_identity(pending.owner) else {
                continue;
            };
            let type_hash = owner.key.hash();
            if !self.emitted.contains(&type_hash) {
                tracing::debug!(
                    owner = %pending.owner,
                    member = %pending.member_hash,
                    "Dropping membership of a type without records"
                );
                continue;
            }
            self.out.records.member_types.push(MemberType {
                type_hash,
                member_hash: pending.member_hash,
                kind: pending.kind,
                visibility: pending.modifiers.visibility(),
                member_ast_node: pending.member_ast_node,
            });
        }
    }

    fn note_placeholder(&mut self, id: NodeId, resolved: &Resolved) {
        self.out.stats.placeholders += 1;
        tracing::debug!(
            file_id = %self.unit.file_id,
            node = %id,
            qualified_name = %resolved.qualified_name,
            "Using placeholder for unresolved binding"
        );
    }

    fn skip_reference(&mut self, id: NodeId, written: &str) {
        self.out.stats.skipped_references += 1;
        tracing::debug!(
            file_id = %self.unit.file_id,
            node = %id,
            reference = written,
            "Skipping unresolved reference"
        );
    }
}

/// Identity key and qualified name of a declared type (`void` when absent).
fn declared_type(
    id: NodeId,
    declared: Option<&TypeRef>,
) -> std::result::Result<(EntityHash, String), ExtractionError> {
    let void = TypeRef::resolved("void", "void");
    let declared = declared.unwrap_or(&void);
    let resolved = type_ref_identity(declared).map_err(|e| ExtractionError::identity(id, &e))?;
    Ok((resolved.key.hash(), resolved.qualified_name))
}

fn initialized(has_initializer: bool) -> AstKind {
    if has_initializer {
        AstKind::Definition
    } else {
        AstKind::Declaration
    }
}

/// Deterministic id of an AST node record.
fn ast_node_id(
    unit: &CompilationUnit,
    node: &SyntaxNode,
    entity_hash: EntityHash,
    symbol_kind: SymbolKind,
    ast_kind: AstKind,
) -> AstNodeId {
    let key = format!(
        "{}:{}:{}:{}:{}:{}",
        unit.file_id,
        node.start,
        node.end,
        symbol_kind.as_str(),
        ast_kind.as_str(),
        entity_hash
    );
    AstNodeId(identity::hash_canonical(&key).as_i64())
}
