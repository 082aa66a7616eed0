//! Domain types for Tessera records.
//!
//! These types represent what the extractor hands to the storage layer:
//! - **Keys**: `FileId`, `EntityHash`, `AstNodeId`
//! - **Records**: `AstNode`, `Entity`, `Relation`, `Inheritance`, `MemberType`,
//!   `DocComment`, `Diagnostic` (immutable once emitted)
//! - **Results**: `RecordSet`, `UnitExtraction`, `ExtractionStats`
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Entity subtypes | `EntityDetail` enum | One `Entity` row per declaration, attributes vary by kind |
//! | Hash width | `i64` | XXH3-64 reinterpreted, matches storage integer columns |
//! | Span | 1-indexed line and column | Matches editor conventions |

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

// ============================================================================
// Strongly-typed key wrappers
// ============================================================================

/// A strongly-typed file ID to prevent mixing with entity hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub i64);

impl FileId {
    /// Extract the raw i64 value.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for FileId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity key of a logical program entity.
///
/// Produced by `identity::hash_canonical` from a canonical identity string;
/// equal for two entities if and only if their canonical strings are equal
/// (modulo hash collisions, which this layer does not detect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityHash(pub i64);

impl EntityHash {
    /// Extract the raw i64 value.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for EntityHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an emitted AST node record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AstNodeId(pub i64);

impl AstNodeId {
    /// Extract the raw i64 value.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Visibility levels derived from access modifier bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// `private`
    Private,
    /// No access modifier
    PackagePrivate,
}

impl Visibility {
    /// Convert to storage string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::PackagePrivate => "package_private",
        }
    }
}

/// Symbol kinds of emitted AST nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Class, interface or enum
    Type,
    /// Method
    Method,
    /// Constructor
    Constructor,
    /// Field
    Field,
    /// Local variable or parameter
    Variable,
    /// Enum constant
    EnumConstant,
    /// Lambda body
    Lambda,
}

impl SymbolKind {
    /// Convert to storage string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Field => "field",
            Self::Variable => "variable",
            Self::EnumConstant => "enum_constant",
            Self::Lambda => "lambda",
        }
    }
}

/// How an AST node relates to its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AstKind {
    /// Declared without a body or initializer
    Declaration,
    /// Declared with a body or initializer
    Definition,
    /// A reference to an entity declared elsewhere
    Usage,
}

impl AstKind {
    /// Convert to storage string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Declaration => "declaration",
            Self::Definition => "definition",
            Self::Usage => "usage",
        }
    }
}

/// Kinds of generic relation edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// `extends` (class or interface)
    Inheritance,
    /// `implements`
    Implements,
    /// Any other edge
    Other,
}

/// Kinds of type membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// Field
    Field,
    /// Method
    Method,
    /// Constructor
    Constructor,
    /// Nested type
    NestedType,
    /// Enum constant
    EnumConstant,
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Compilation error
    Error,
    /// Compiler warning
    Warning,
    /// Anything else the compiler reported
    Note,
}

impl Severity {
    /// Classify a reported problem: error beats warning beats note.
    #[must_use]
    pub fn classify(is_error: bool, is_warning: bool) -> Self {
        if is_error {
            Self::Error
        } else if is_warning {
            Self::Warning
        } else {
            Self::Note
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// A start/end position range in a file.
///
/// Positions are 1-indexed (first line is 1, first column is 1) to match
/// editor conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Starting line (1-indexed)
    pub start_line: u32,
    /// Starting column (1-indexed)
    pub start_column: u32,
    /// Ending line (1-indexed)
    pub end_line: u32,
    /// Ending column (1-indexed)
    pub end_column: u32,
}

impl Span {
    /// Create a new span with validation.
    ///
    /// Returns `None` if the end position is before the start position.
    #[must_use]
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Option<Self> {
        if end_line < start_line || (end_line == start_line && end_column < start_column) {
            return None;
        }
        Some(Self {
            start_line,
            start_column,
            end_line,
            end_column,
        })
    }
}

/// One declaration or reference site in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AstNode {
    /// Deterministic node identifier
    pub id: AstNodeId,
    /// Raw source text of the node
    pub ast_value: String,
    /// Location in the file
    pub location: Span,
    /// File containing the node
    pub file_id: FileId,
    /// Entity the node declares or refers to
    pub entity_hash: EntityHash,
    /// What kind of symbol the entity is
    pub symbol_kind: SymbolKind,
    /// Declaration, definition or usage
    pub ast_kind: AstKind,
    /// `false` for nodes synthesized by the front-end
    pub visible_in_source: bool,
}

/// Attributes of a type-level entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Record {
    /// `abstract` modifier present
    pub is_abstract: bool,
    /// `final` modifier present
    pub is_final: bool,
}

/// Attributes of an entity with a declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedEntity {
    /// `final` modifier present
    pub is_final: bool,
    /// `static` modifier present
    pub is_static: bool,
    /// Identity key of the declared (or return) type
    pub type_hash: EntityHash,
    /// Qualified name of the declared (or return) type
    pub qualified_type: String,
}

/// Kind-specific entity attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum EntityDetail {
    /// Class, interface or enum
    Record(Record),
    /// Method, lambda, field or variable
    Typed(TypedEntity),
    /// Enum constant
    Constant,
}

/// A named program entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// AST node that declares the entity
    pub ast_node_id: AstNodeId,
    /// Identity key
    pub entity_hash: EntityHash,
    /// Simple name
    pub name: String,
    /// Qualified name
    pub qualified_name: String,
    /// Kind-specific attributes
    pub detail: EntityDetail,
}

impl Entity {
    /// Typed attributes, if this is a typed entity.
    #[must_use]
    pub fn typed(&self) -> Option<&TypedEntity> {
        match &self.detail {
            EntityDetail::Typed(typed) => Some(typed),
            _ => None,
        }
    }

    /// Record attributes, if this is a type-level entity.
    #[must_use]
    pub fn record(&self) -> Option<&Record> {
        match &self.detail {
            EntityDetail::Record(record) => Some(record),
            _ => None,
        }
    }
}

/// A generic edge between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relation {
    /// Edge kind
    pub kind: RelationKind,
    /// Derived side
    pub lhs: EntityHash,
    /// Base side
    pub rhs: EntityHash,
}

/// A specialization edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Inheritance {
    /// Supertype
    pub base: EntityHash,
    /// Subtype
    pub derived: EntityHash,
}

/// A type-to-member ownership edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberType {
    /// Owning type
    pub type_hash: EntityHash,
    /// Member entity
    pub member_hash: EntityHash,
    /// Member kind
    pub kind: MemberKind,
    /// Member visibility
    pub visibility: Visibility,
    /// AST node declaring the member
    pub member_ast_node: AstNodeId,
}

/// A documentation comment attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocComment {
    /// Comment text
    pub content: String,
    /// Hash of the comment text
    pub content_hash: i64,
    /// Entity the comment documents
    pub entity_hash: EntityHash,
}

/// A compiler-reported problem, positioned and classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Problem message
    pub message: String,
    /// Error, warning or note
    pub severity: Severity,
    /// Location of the problem
    pub range: Span,
}

// ============================================================================
// Results
// ============================================================================

/// All records extracted from one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordSet {
    /// AST node records (declarations and usages)
    pub ast_nodes: Vec<AstNode>,
    /// Entity records
    pub entities: Vec<Entity>,
    /// Generic relation edges
    pub relations: Vec<Relation>,
    /// Inheritance edges
    pub inheritances: Vec<Inheritance>,
    /// Membership edges
    pub member_types: Vec<MemberType>,
    /// Documentation comments
    pub doc_comments: Vec<DocComment>,
}

impl RecordSet {
    /// Find the entity with the given identity key.
    #[must_use]
    pub fn entity(&self, hash: EntityHash) -> Option<&Entity> {
        self.entities.iter().find(|e| e.entity_hash == hash)
    }

    /// Find the first entity with the given simple name.
    #[must_use]
    pub fn entity_named(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// Counters collected while extracting one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    /// Declarations that fell back to placeholder qualified names
    pub placeholders: usize,
    /// Supertype or invocation edges skipped for lack of a binding
    pub skipped_references: usize,
}

/// Everything produced for one compilation unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitExtraction {
    /// File the records belong to
    pub file_id: FileId,
    /// Entity, relation and AST records
    pub records: RecordSet,
    /// Compiler diagnostics
    pub diagnostics: Vec<Diagnostic>,
    /// Per-entity failures (the affected records were dropped)
    pub errors: Vec<ExtractionError>,
    /// Extraction counters
    pub stats: ExtractionStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_error_wins_over_warning() {
        assert_eq!(Severity::classify(true, true), Severity::Error);
        assert_eq!(Severity::classify(true, false), Severity::Error);
        assert_eq!(Severity::classify(false, true), Severity::Warning);
        assert_eq!(Severity::classify(false, false), Severity::Note);
    }

    #[test]
    fn span_new_valid_same_line() {
        let span = Span::new(10, 5, 10, 20).expect("valid span");
        assert_eq!(span.start_line, 10);
        assert_eq!(span.end_column, 20);
    }

    #[test]
    fn span_new_valid_single_position() {
        assert!(Span::new(1, 1, 1, 1).is_some());
    }

    #[test]
    fn span_new_invalid_end_line_before_start() {
        assert!(Span::new(10, 5, 8, 5).is_none());
    }

    #[test]
    fn span_new_invalid_end_column_before_start_same_line() {
        assert!(Span::new(10, 20, 10, 5).is_none());
    }

    #[test]
    fn entity_detail_serializes_with_tag() {
        let detail = EntityDetail::Record(Record {
            is_abstract: true,
            is_final: false,
        });

        let json = serde_json::to_value(&detail).expect("serializable");

        assert_eq!(json["entity"], "record");
        assert_eq!(json["is_abstract"], true);
    }

    #[test]
    fn visibility_storage_strings() {
        assert_eq!(Visibility::PackagePrivate.as_str(), "package_private");
        assert_eq!(Visibility::Public.as_str(), "public");
    }
}
