//! Character offset to line/column mapping.
//!
//! ## Coordinate Conventions
//!
//! - Offsets are **0-indexed** and count Unicode scalar values (`char`s)
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - `\n`, `\r\n` and a lone `\r` each end a line
//! - An offset equal to the text length is the end-of-file position
//!
//! Every component that reports locations goes through `PositionMapper`, so
//! this is the only place the convention is encoded.

use thiserror::Error;

use crate::types::Span;
use crate::unit::CompilationUnit;

/// Failure to map an offset range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// An offset lies past the end of the text
    #[error("offset {offset} is outside the text (length {len})")]
    OutOfRange {
        /// Offending offset
        offset: usize,
        /// Text length in chars
        len: usize,
    },

    /// The range ends before it starts
    #[error("range {start}..{end} ends before it starts")]
    Inverted {
        /// Start offset
        start: usize,
        /// End offset
        end: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct LineStart {
    char_offset: usize,
    byte_offset: usize,
}

/// Maps character offsets of one unit's text to positions.
///
/// Line starts are computed once on construction; lookups are a binary
/// search. The mapper is immutable after construction.
#[derive(Debug)]
pub struct PositionMapper<'a> {
    text: &'a str,
    lines: Vec<LineStart>,
    char_len: usize,
}

impl<'a> PositionMapper<'a> {
    /// Build a mapper over `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        let mut lines = vec![LineStart {
            char_offset: 0,
            byte_offset: 0,
        }];
        let mut chars = text.char_indices().enumerate().peekable();
        let mut char_len = 0;

        while let Some((char_idx, (byte_idx, ch))) = chars.next() {
            char_len = char_idx + 1;
            let line_break = match ch {
                '\n' => true,
                '\r' => {
                    if let Some((_, (_, '\n'))) = chars.peek() {
                        // "\r\n": the break is recorded on the '\n'
                        false
                    } else {
                        true
                    }
                }
                _ => false,
            };
            if line_break {
                lines.push(LineStart {
                    char_offset: char_idx + 1,
                    byte_offset: byte_idx + ch.len_utf8(),
                });
            }
        }

        Self {
            text,
            lines,
            char_len,
        }
    }

    /// Build a mapper over a compilation unit's source.
    #[must_use]
    pub fn for_unit(unit: &'a CompilationUnit) -> Self {
        Self::new(&unit.source)
    }

    /// Length of the text in chars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.char_len
    }

    /// Whether the text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    /// Map one offset to a 1-indexed `(line, column)` pair.
    ///
    /// # Errors
    ///
    /// Returns `PositionError::OutOfRange` if `offset` is past the end of the text.
    pub fn position(&self, offset: usize) -> Result<(u32, u32), PositionError> {
        let line = self.line_index(offset)?;
        let column = offset - self.lines[line].char_offset + 1;
        // Saturates past u32::MAX lines or columns.
        Ok((
            u32::try_from(line + 1).unwrap_or(u32::MAX),
            u32::try_from(column).unwrap_or(u32::MAX),
        ))
    }

    /// Map an offset range to a span.
    ///
    /// # Errors
    ///
    /// Returns `PositionError::OutOfRange` if either offset is past the end
    /// of the text, and `PositionError::Inverted` if `start > end`.
    pub fn compute(&self, start: usize, end: usize) -> Result<Span, PositionError> {
        if start > end {
            return Err(PositionError::Inverted { start, end });
        }
        let (start_line, start_column) = self.position(start)?;
        let (end_line, end_column) = self.position(end)?;

        // Monotonic mapping: start <= end implies the span is ordered.
        Span::new(start_line, start_column, end_line, end_column)
            .ok_or(PositionError::Inverted { start, end })
    }

    /// Source text between two offsets.
    ///
    /// # Errors
    ///
    /// Same conditions as [`compute`](Self::compute).
    pub fn text(&self, start: usize, end: usize) -> Result<&'a str, PositionError> {
        if start > end {
            return Err(PositionError::Inverted { start, end });
        }
        let from = self.byte_offset(start)?;
        let to = self.byte_offset(end)?;
        Ok(&self.text[from..to])
    }

    fn line_index(&self, offset: usize) -> Result<usize, PositionError> {
        if offset > self.char_len {
            return Err(PositionError::OutOfRange {
                offset,
                len: self.char_len,
            });
        }
        // Last line whose start is <= offset
        Ok(self
            .lines
            .partition_point(|line| line.char_offset <= offset)
            - 1)
    }

    fn byte_offset(&self, offset: usize) -> Result<usize, PositionError> {
        let line = self.lines[self.line_index(offset)?];
        let within = offset - line.char_offset;
        let rest = &self.text[line.byte_offset..];
        Ok(line.byte_offset
            + rest
                .char_indices()
                .nth(within)
                .map_or(rest.len(), |(byte, _)| byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Offset 10 is line 2 column 5, offset 20 is line 3 column 1.
    const TWO_BREAKS: &str = "abcde\nfghijklmnopqr\nstu";

    #[test]
    fn compute_maps_offsets_across_lines() {
        let mapper = PositionMapper::new(TWO_BREAKS);

        let span = mapper.compute(10, 20).expect("offsets in range");

        assert_eq!((span.start_line, span.start_column), (2, 5));
        assert_eq!((span.end_line, span.end_column), (3, 1));
    }

    #[test]
    fn first_offset_is_line_one_column_one() {
        let mapper = PositionMapper::new(TWO_BREAKS);

        assert_eq!(mapper.position(0), Ok((1, 1)));
    }

    #[test]
    fn newline_belongs_to_the_line_it_ends() {
        let mapper = PositionMapper::new(TWO_BREAKS);

        assert_eq!(mapper.position(5), Ok((1, 6)));
        assert_eq!(mapper.position(6), Ok((2, 1)));
    }

    #[test]
    fn end_of_text_is_a_valid_position() {
        let mapper = PositionMapper::new(TWO_BREAKS);

        assert_eq!(mapper.position(TWO_BREAKS.len()), Ok((3, 4)));
    }

    #[test]
    fn offset_past_end_is_out_of_range() {
        let mapper = PositionMapper::new("abc");

        let err = mapper.compute(0, 4).expect_err("past end");

        assert_eq!(err, PositionError::OutOfRange { offset: 4, len: 3 });
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mapper = PositionMapper::new(TWO_BREAKS);

        let err = mapper.compute(8, 3).expect_err("inverted");

        assert_eq!(err, PositionError::Inverted { start: 8, end: 3 });
    }

    #[test]
    fn crlf_counts_as_one_line_break() {
        let mapper = PositionMapper::new("ab\r\ncd\rxy");

        assert_eq!(mapper.position(2), Ok((1, 3)));
        assert_eq!(mapper.position(4), Ok((2, 1)));
        // lone '\r' also ends a line
        assert_eq!(mapper.position(7), Ok((3, 1)));
    }

    #[test]
    fn columns_count_chars_not_bytes() {
        let mapper = PositionMapper::new("é = \"ü\";\nx");

        assert_eq!(mapper.position(2), Ok((1, 3)));
        assert_eq!(mapper.position(9), Ok((2, 1)));
        assert_eq!(mapper.text(5, 6), Ok("ü"));
    }

    #[test]
    fn text_slices_by_char_offsets() {
        let mapper = PositionMapper::new(TWO_BREAKS);

        assert_eq!(mapper.text(6, 11), Ok("fghij"));
        assert_eq!(mapper.text(20, 23), Ok("stu"));
        assert_eq!(mapper.text(3, 3), Ok(""));
    }

    #[test]
    fn empty_text_has_single_position() {
        let mapper = PositionMapper::new("");

        assert!(mapper.is_empty());
        assert_eq!(mapper.position(0), Ok((1, 1)));
        assert!(mapper.position(1).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn mapping_is_monotonic(text in "[a-z\n\r]{0,60}", a in 0usize..64, b in 0usize..64) {
                let mapper = PositionMapper::new(&text);
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                prop_assume!(hi <= mapper.len());

                let lo_pos = mapper.position(lo).unwrap();
                let hi_pos = mapper.position(hi).unwrap();

                prop_assert!(lo_pos <= hi_pos);
                prop_assert!(mapper.compute(lo, hi).is_ok());
            }
        }
    }
}
