//! Common display utilities for CLI commands.
//!
//! Everything goes to stderr; stdout is reserved for records.

use std::path::Path;

use colored::Colorize;
use tessera::{Severity, UnitExtraction};

const MAX_DISPLAY_ITEMS: usize = 5;

/// Print totals over all extracted units.
pub fn print_summary(extractions: &[UnitExtraction], lines: usize) {
    let entities: usize = extractions.iter().map(|e| e.records.entities.len()).sum();
    let ast_nodes: usize = extractions.iter().map(|e| e.records.ast_nodes.len()).sum();
    let relations: usize = extractions.iter().map(|e| e.records.relations.len()).sum();
    let placeholders: usize = extractions.iter().map(|e| e.stats.placeholders).sum();
    let skipped: usize = extractions.iter().map(|e| e.stats.skipped_references).sum();

    eprintln!();
    eprintln!(
        "{} {} units: {} entities, {} AST nodes, {} relations",
        "Extracted".green().bold(),
        lines,
        entities,
        ast_nodes,
        relations
    );

    let count = |severity: Severity| -> usize {
        extractions
            .iter()
            .flat_map(|e| &e.diagnostics)
            .filter(|d| d.severity == severity)
            .count()
    };
    eprintln!(
        "{}: {} errors, {} warnings, {} notes",
        "Diagnostics".dimmed(),
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Note)
    );

    if placeholders > 0 || skipped > 0 {
        eprintln!(
            "{}: {} placeholder names, {} skipped references",
            "Unresolved".yellow(),
            placeholders,
            skipped
        );
    }

    let errors: Vec<_> = extractions
        .iter()
        .flat_map(|e| e.errors.iter().map(move |err| (e.file_id, err)))
        .collect();
    if errors.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("{} ({}):", "Dropped records".red().bold(), errors.len());
    for (file_id, err) in errors.iter().take(MAX_DISPLAY_ITEMS) {
        eprintln!("  {} file {file_id}: {err}", "•".red());
    }
    if errors.len() > MAX_DISPLAY_ITEMS {
        eprintln!("  ... and {} more", errors.len() - MAX_DISPLAY_ITEMS);
    }
}

/// Print a bulleted list of paths with truncation.
pub fn print_paths(paths: &[&Path]) {
    for path in paths.iter().take(MAX_DISPLAY_ITEMS) {
        eprintln!("  {} {}", "•".dimmed(), path.display());
    }
    if paths.len() > MAX_DISPLAY_ITEMS {
        eprintln!("  ... and {} more", paths.len() - MAX_DISPLAY_ITEMS);
    }
}
