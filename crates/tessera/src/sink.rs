//! JSON Lines hand-off to the storage layer.
//!
//! Each extracted unit becomes exactly one line: a JSON object carrying the
//! file id, records, diagnostics, errors and counters of that unit.

use std::io::{BufWriter, Write};

use serde::Serialize;

use crate::error::Result;

/// Buffered JSONL writer.
///
/// # Examples
///
/// ```no_run
/// use tessera::{Extractor, ExtractorConfig, JsonlSink};
///
/// # fn example(units: &[tessera::CompilationUnit]) -> tessera::Result<()> {
/// let extractions = Extractor::new(ExtractorConfig::default()).extract_all(units)?;
/// let mut sink = JsonlSink::new(std::io::stdout().lock());
/// for extraction in &extractions {
///     sink.write(extraction)?;
/// }
/// sink.flush()?;
/// # Ok(())
/// # }
/// ```
pub struct JsonlSink<W: Write> {
    writer: BufWriter<W>,
    lines: usize,
}

impl<W: Write> JsonlSink<W> {
    /// Wrap `writer` in a buffered JSONL sink.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            lines: 0,
        }
    }

    /// Serialize `value` as one line.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialize` if `value` can't be serialized and
    /// `Error::Io` if the write fails.
    pub fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Lines written so far.
    #[must_use]
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Flush buffered lines to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the final flush fails.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::Error::Io(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExtractionStats, FileId, RecordSet, UnitExtraction};

    fn extraction(file_id: i64) -> UnitExtraction {
        UnitExtraction {
            file_id: FileId(file_id),
            records: RecordSet::default(),
            diagnostics: Vec::new(),
            errors: Vec::new(),
            stats: ExtractionStats::default(),
        }
    }

    #[test]
    fn writes_one_line_per_extraction() {
        let mut sink = JsonlSink::new(Vec::new());

        sink.write(&extraction(1)).expect("serializable");
        sink.write(&extraction(2)).expect("serializable");
        let bytes = sink.into_inner().expect("flushes");

        let text = String::from_utf8(bytes).expect("utf-8 output");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("valid json line");
        assert_eq!(first["file_id"], 1);
        assert!(first["records"]["entities"].as_array().is_some_and(Vec::is_empty));
    }

    #[test]
    fn counts_lines() {
        let mut sink = JsonlSink::new(Vec::new());

        sink.write(&extraction(7)).expect("serializable");

        assert_eq!(sink.lines(), 1);
    }

    #[test]
    fn write_failure_is_io_error() {
        struct Closed;

        impl Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
        }

        let mut sink = JsonlSink::new(Closed);
        sink.write(&extraction(1)).expect("buffered");

        let err = sink.flush().expect_err("closed writer");

        assert!(matches!(err, crate::error::Error::Io(_)));
    }
}
