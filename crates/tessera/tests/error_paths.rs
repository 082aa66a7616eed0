//! Error path integration tests for Tessera extraction.
//!
//! Tests that missing, malformed and out-of-range input is reported
//! through the right channel without panicking.

mod common;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use common::{UnitBuilder, class, field, resolved};
use tempfile::TempDir;
use tessera::log::LogError;
use tessera::unit::Problem;
use tessera::{
    BuildLog, CompilationUnit, Error, ExtractionErrorKind, Extractor, ExtractorConfig, LogLevel,
    MemoryLog, NodeKind, SyntaxNode,
};

/// Write `content` to a file in a fresh temp dir.
fn file_with(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("should write file");
    (dir, path)
}

fn extractor() -> Extractor {
    Extractor::new(ExtractorConfig::default()).with_log(Arc::new(MemoryLog::new()))
}

struct BrokenLog;

impl BuildLog for BrokenLog {
    fn log(&self, _level: LogLevel, _text: &str) -> Result<(), LogError> {
        Err(LogError("log sink offline".to_string()))
    }
}

// === Missing and malformed units ===

#[test]
fn null_hand_off_is_no_compilation_unit() {
    let (_dir, path) = file_with("unit.json", "null");

    let unit = CompilationUnit::from_json_file(&path).expect("null is a valid document");
    let err = extractor().extract(unit.as_ref()).expect_err("no unit");

    assert!(matches!(err, Error::NoCompilationUnit));
}

#[test]
fn truncated_hand_off_names_the_file() {
    let (_dir, path) = file_with("broken.json", r#"{"file_id": 1, "source": "#);

    let err = CompilationUnit::from_json_file(&path).expect_err("truncated json");

    assert!(matches!(&err, Error::Json { path: p, .. } if p == &path));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn missing_hand_off_is_io_error() {
    let dir = tempfile::tempdir().expect("should create temp dir");

    let err = CompilationUnit::from_json_file(&dir.path().join("absent.json"))
        .expect_err("missing file");

    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn invalid_config_is_reported() {
    let (_dir, path) = file_with("tessera.yaml", "emit-usages: sometimes\n");

    let err = ExtractorConfig::load(&path).expect_err("not a bool");

    assert!(matches!(err, Error::Config(_)));
}

// === Empty input ===

#[test]
fn empty_source_yields_no_records() {
    let unit = UnitBuilder::new(1, "").finish();

    let extraction = extractor().extract(Some(&unit)).expect("unit present");

    assert!(extraction.records.entities.is_empty());
    assert!(extraction.records.ast_nodes.is_empty());
    assert!(extraction.diagnostics.is_empty());
    assert!(extraction.errors.is_empty());
}

#[test]
fn problem_at_end_of_file_is_valid() {
    let mut unit = UnitBuilder::new(1, "class A {").finish();
    unit.problems.push(Problem {
        message: "reached end of file while parsing".to_string(),
        is_error: true,
        start: 9,
        end: 9,
        ..Problem::default()
    });

    let extraction = extractor().extract(Some(&unit)).expect("unit present");

    let range = extraction.diagnostics[0].range;
    assert_eq!((range.start_line, range.start_column), (1, 10));
    assert!(extraction.errors.is_empty());
}

// === Out of range and inverted offsets ===

#[test]
fn out_of_range_declaration_is_collected_not_thrown() {
    let mut builder = UnitBuilder::new(2, "class Box {\n    int ok;\n}\n");
    let boxed = builder.add(None, "class Box", class("Box", Some("store.Box")));
    builder.add(Some(boxed), "int ok;", field("ok", resolved("int"), 0));
    let stray = builder.add_node(SyntaxNode::new(
        Some(boxed),
        3,
        1_000,
        field("far", resolved("int"), 0),
    ));
    let unit = builder.finish();
    let log = Arc::new(MemoryLog::new());

    let extraction = Extractor::new(ExtractorConfig::default())
        .with_log(log.clone())
        .extract(Some(&unit))
        .expect("unit present");

    assert_eq!(extraction.records.entities.len(), 2);
    assert_eq!(extraction.errors.len(), 1);
    assert_eq!(extraction.errors[0].kind, ExtractionErrorKind::OutOfRangePosition);
    assert_eq!(extraction.errors[0].subject, tessera::Subject::Node(stray));
    let warnings = log.at(LogLevel::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("Unit2.java "));
}

#[test]
fn unmappable_problem_reaches_build_log() {
    let mut unit = UnitBuilder::new(9, "class A {}").finish();
    unit.problems.push(Problem {
        message: "dangling".to_string(),
        is_error: true,
        start: 0,
        end: 999,
        ..Problem::default()
    });
    let log = Arc::new(MemoryLog::new());

    let extraction = Extractor::new(ExtractorConfig::default())
        .with_log(log.clone())
        .extract(Some(&unit))
        .expect("unit present");

    assert!(extraction.diagnostics.is_empty());
    assert_eq!(extraction.errors.len(), 1);
    assert_eq!(extraction.errors[0].subject, tessera::Subject::Problem(0));
    let warnings = log.at(LogLevel::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("Unit9.java problem 0: "));
}

#[test]
fn inverted_node_range_is_collected() {
    let mut builder = UnitBuilder::new(3, "class Box {}\n");
    builder.add_node(SyntaxNode::new(None, 9, 2, class("Box", Some("store.Box"))));
    let unit = builder.finish();

    let extraction = extractor().extract(Some(&unit)).expect("unit present");

    assert!(extraction.records.entities.is_empty());
    assert_eq!(extraction.errors[0].kind, ExtractionErrorKind::OutOfRangePosition);
}

// === Malformed structure ===

#[test]
fn member_without_enclosing_type_is_invalid_identity_input() {
    let mut builder = UnitBuilder::new(4, "int orphan;\n");
    builder.add(None, "int orphan;", field("orphan", resolved("int"), 0));
    let unit = builder.finish();

    let extraction = extractor().extract(Some(&unit)).expect("unit present");

    assert!(extraction.records.entities.is_empty());
    assert_eq!(extraction.errors[0].kind, ExtractionErrorKind::InvalidIdentityInput);
}

#[test]
fn parent_cycle_does_not_hang() {
    let mut builder = UnitBuilder::new(5, "class A { class B {} }\n");
    let a = builder.add(None, "class A { class B {} }", class("A", None));
    let b = builder.add(Some(a), "class B {}", class("B", None));
    builder.unit_mut().nodes[a.index()].parent = Some(b);
    let unit = builder.finish();

    let extraction = extractor().extract(Some(&unit)).expect("unit present");

    assert_eq!(extraction.errors.len(), 2);
    assert!(extraction.records.entities.is_empty());
}

#[test]
fn parent_cycle_in_large_unit_terminates() {
    let mut builder = UnitBuilder::new(8, "class A { class B {} }\n");
    let a = builder.add(None, "class A { class B {} }", class("A", None));
    let b = builder.add(Some(a), "class B {}", class("B", None));
    builder.unit_mut().nodes[a.index()].parent = Some(b);
    for _ in 0..200_000 {
        builder.add_node(SyntaxNode::new(None, 0, 0, NodeKind::Other));
    }
    let unit = builder.finish();

    let extraction = extractor().extract(Some(&unit)).expect("unit present");

    assert_eq!(extraction.errors.len(), 2);
    assert!(
        extraction
            .errors
            .iter()
            .all(|e| e.kind == ExtractionErrorKind::InvalidIdentityInput)
    );
    assert!(extraction.records.entities.is_empty());
}

#[test]
fn other_nodes_are_ignored() {
    let mut builder = UnitBuilder::new(6, "class A { static {} }\n");
    let a = builder.add(None, "class A { static {} }", class("A", Some("p.A")));
    builder.add(Some(a), "static {}", NodeKind::Other);
    let unit = builder.finish();

    let extraction = extractor().extract(Some(&unit)).expect("unit present");

    assert_eq!(extraction.records.entities.len(), 1);
    assert!(extraction.errors.is_empty());
}

// === Log failures ===

#[test]
fn failing_build_log_does_not_change_records() {
    let mut builder = UnitBuilder::new(7, "class A {}\n");
    builder.add(None, "class A {}", class("A", Some("p.A")));
    let mut unit = builder.finish();
    unit.problems.push(Problem {
        message: "deprecated".to_string(),
        is_warning: true,
        start: 0,
        end: 5,
        ..Problem::default()
    });

    let with_broken = Extractor::new(ExtractorConfig::default())
        .with_log(Arc::new(BrokenLog))
        .extract(Some(&unit))
        .expect("unit present");
    let with_memory = extractor().extract(Some(&unit)).expect("unit present");

    assert_eq!(with_broken.records, with_memory.records);
    assert_eq!(with_broken.diagnostics, with_memory.diagnostics);
}
