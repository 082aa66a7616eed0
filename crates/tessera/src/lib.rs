//! # Tessera: Entity Identity and Cross-Reference Extraction
//!
//! Tessera turns parsed, binding-resolved compilation units of a Java-like
//! language into flat records for a code-intelligence store: entities with
//! deterministic identity keys, the AST nodes that declare or use them,
//! type membership, inheritance edges and positioned compiler diagnostics.
//!
//! ## Design Philosophy
//!
//! - **Stable identity** - An entity's key depends only on what defines it,
//!   so every file that mentions it computes the same key independently
//! - **Degrade, don't fail** - Unresolved bindings become placeholder names;
//!   a broken declaration drops its own records and nothing else
//! - **Pure per unit** - No global state; units extract in parallel
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use tessera::{CompilationUnit, Extractor, ExtractorConfig};
//!
//! let unit = CompilationUnit::from_json_file(Path::new("Widget.json"))?;
//! let extraction = Extractor::new(ExtractorConfig::default()).extract(unit.as_ref())?;
//!
//! println!(
//!     "{} entities, {} diagnostics",
//!     extraction.records.entities.len(),
//!     extraction.diagnostics.len()
//! );
//! # Ok::<(), tessera::Error>(())
//! ```

mod builder;
mod config;
mod diagnostics;
mod error;
mod parallel;
mod position;
mod sink;
mod types;

pub mod identity;
pub mod log;
pub mod modifiers;
pub mod unit;

pub use builder::{BuildOutput, EntityRecordBuilder};
pub use config::{CONFIG_FILE_NAME, ExtractorConfig};
pub use diagnostics::{DiagnosticReport, collect as collect_diagnostics};
pub use error::{Error, ExtractionError, ExtractionErrorKind, Result, Subject};
pub use identity::{IdentityError, IdentityKey};
pub use log::{BuildLog, LogLevel, MemoryLog, TracingLog};
pub use modifiers::Modifiers;
pub use position::{PositionError, PositionMapper};
pub use sink::JsonlSink;
pub use types::{
    AstKind, AstNode, AstNodeId, Diagnostic, DocComment, Entity, EntityDetail, EntityHash,
    ExtractionStats, FileId, Inheritance, MemberKind, MemberType, Record, RecordSet, Relation,
    RelationKind, Severity, Span, SymbolKind, TypedEntity, UnitExtraction, Visibility,
};
pub use unit::{CompilationUnit, NodeId, NodeKind, SyntaxNode};

use std::sync::Arc;

/// Extraction entry point.
///
/// Owns the configuration and the build log shared by every unit it
/// processes. `Extractor` is `Sync`; one instance serves all worker threads.
#[derive(Clone)]
pub struct Extractor {
    config: ExtractorConfig,
    log: Arc<dyn BuildLog>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Extractor {
    /// Create an extractor that logs through `tracing`.
    #[must_use]
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            log: Arc::new(TracingLog),
        }
    }

    /// Replace the build log.
    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn BuildLog>) -> Self {
        self.log = log;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract records and diagnostics from one unit.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCompilationUnit` if `unit` is `None`. Per-entity
    /// failures are reported in `UnitExtraction::errors` instead.
    pub fn extract(&self, unit: Option<&CompilationUnit>) -> Result<UnitExtraction> {
        let build = EntityRecordBuilder::new(&self.config, self.log.as_ref()).build(unit)?;
        let unit = unit.ok_or(Error::NoCompilationUnit)?;

        let report = diagnostics::collect(unit, &PositionMapper::for_unit(unit), self.log.as_ref());

        let mut errors = build.errors;
        errors.extend(report.errors);

        Ok(UnitExtraction {
            file_id: unit.file_id,
            records: build.records,
            diagnostics: report.diagnostics,
            errors,
            stats: build.stats,
        })
    }

    /// Extract every unit in parallel. Results keep the input order.
    ///
    /// # Errors
    ///
    /// Returns the first unit-level error encountered.
    pub fn extract_all(&self, units: &[CompilationUnit]) -> Result<Vec<UnitExtraction>> {
        parallel::extract_units(self, units)
    }
}
