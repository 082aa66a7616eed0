//! `tessera extract` command implementation.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use colored::Colorize;
use tessera::{CONFIG_FILE_NAME, CompilationUnit, Extractor, ExtractorConfig, JsonlSink};

use super::display;

/// Run the extract command.
pub fn run(
    units: &[PathBuf],
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), tessera::Error> {
    let config = load_config(config)?;
    tracing::debug!(?config, "Loaded configuration");

    let mut loaded = Vec::with_capacity(units.len());
    let mut missing = Vec::new();
    for path in units {
        match CompilationUnit::from_json_file(path)? {
            Some(unit) => loaded.push(unit),
            None => missing.push(path.as_path()),
        }
    }

    eprintln!(
        "{} {} units...",
        "Extracting".cyan().bold(),
        loaded.len()
    );

    let extractions = Extractor::new(config).extract_all(&loaded)?;

    let lines = match output {
        Some(path) => write_lines(File::create(path)?, &extractions)?,
        None => write_lines(std::io::stdout().lock(), &extractions)?,
    };

    display::print_summary(&extractions, lines);

    if missing.is_empty() {
        return Ok(());
    }
    eprintln!();
    eprintln!("{} ({}):", "No compilation unit".red().bold(), missing.len());
    display::print_paths(&missing);
    Err(tessera::Error::NoCompilationUnit)
}

fn load_config(path: Option<&Path>) -> Result<ExtractorConfig, tessera::Error> {
    match path {
        Some(path) => ExtractorConfig::load(path),
        None => {
            let default = Path::new(CONFIG_FILE_NAME);
            if default.is_file() {
                ExtractorConfig::load(default)
            } else {
                Ok(ExtractorConfig::default())
            }
        }
    }
}

fn write_lines<W: Write>(
    writer: W,
    extractions: &[tessera::UnitExtraction],
) -> Result<usize, tessera::Error> {
    let mut sink = JsonlSink::new(writer);
    for extraction in extractions {
        sink.write(extraction)?;
    }
    sink.flush()?;
    Ok(sink.lines())
}
