//! Byte offset to line/column mapping

use crate::syntax::token::Position;
use std::ops::Range;

/// Precomputed line start offsets for one source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMap {
    line_offsets: Vec<usize>,
    len: usize,
}

impl SourceMap {
    /// Index the line starts of `source`
    pub fn new(source: &str) -> Self {
        let mut line_offsets = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_offsets.push(i + 1);
            }
        }
        Self {
            line_offsets,
            len: source.len(),
        }
    }

    /// Number of physical lines; a trailing newline does not open a new line
    pub fn line_count(&self) -> usize {
        match self.line_offsets.last() {
            Some(&last) if last == self.len && self.line_offsets.len() > 1 => {
                self.line_offsets.len() - 1
            }
            _ => self.line_offsets.len(),
        }
    }

    /// Convert a byte offset to a 1-indexed position
    ///
    /// Uses binary search on the precomputed line offsets. Offsets past the end
    /// clamp to the end of the text.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line_idx = self
            .line_offsets
            .partition_point(|&o| o <= offset)
            .saturating_sub(1);

        let line = (line_idx + 1) as u32;
        let column = (offset - self.line_offsets[line_idx] + 1) as u32;
        Position::new(line, column, offset)
    }

    /// Byte range of a 1-indexed line, excluding its line terminator
    pub fn line_range(&self, source: &str, line: u32) -> Option<Range<usize>> {
        let idx = (line as usize).checked_sub(1)?;
        if idx >= self.line_count() {
            return None;
        }
        let start = self.line_offsets[idx];
        let mut end = self
            .line_offsets
            .get(idx + 1)
            .map_or(self.len, |&next| next - 1);
        if end > start && source.as_bytes().get(end - 1) == Some(&b'\r') {
            end -= 1;
        }
        Some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions() {
        let source = "ab\ncd\n\nef";
        let map = SourceMap::new(source);

        assert_eq!(map.position(0), Position::new(1, 1, 0));
        assert_eq!(map.position(1), Position::new(1, 2, 1));
        assert_eq!(map.position(3), Position::new(2, 1, 3));
        assert_eq!(map.position(6), Position::new(3, 1, 6));
        assert_eq!(map.position(8), Position::new(4, 2, 8));
    }

    #[test]
    fn test_position_clamps_past_end() {
        let map = SourceMap::new("abc");
        assert_eq!(map.position(99), Position::new(1, 4, 3));
    }

    #[test]
    fn test_line_count_ignores_trailing_newline() {
        assert_eq!(SourceMap::new("").line_count(), 1);
        assert_eq!(SourceMap::new("a").line_count(), 1);
        assert_eq!(SourceMap::new("a\n").line_count(), 1);
        assert_eq!(SourceMap::new("a\nb").line_count(), 2);
        assert_eq!(SourceMap::new("a\n\n").line_count(), 2);
    }

    #[test]
    fn test_line_range_strips_crlf() {
        let source = "one\r\ntwo\nthree";
        let map = SourceMap::new(source);

        assert_eq!(&source[map.line_range(source, 1).unwrap()], "one");
        assert_eq!(&source[map.line_range(source, 2).unwrap()], "two");
        assert_eq!(&source[map.line_range(source, 3).unwrap()], "three");
        assert!(map.line_range(source, 4).is_none());
        assert!(map.line_range(source, 0).is_none());
    }
}
