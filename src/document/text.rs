//! Text utilities for ranges and position conversion.
//!
//! Everything that touches offsets goes through this module:
//! - `TextRange` is a half-open byte range into a document snapshot
//! - `split_pieces` / `find_outside_placeholders` accumulate absolute offsets
//!   left to right while tokenizing a substring
//! - `LineIndex` converts byte offsets <-> LSP positions with UTF-16 columns

use tower_lsp::lsp_types::Position;

/// A byte range `[start, end)` into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted range {}..{}", start, end);
        Self { start, end }
    }

    /// Range of `len` bytes starting at `start`.
    pub fn at(start: usize, len: usize) -> Self {
        Self::new(start, start + len)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Cursor containment: both ends are inclusive, so a cursor sitting right
    /// after the last character is still "in" the token being typed.
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// The text covered by this range in `source`, or `None` if out of bounds.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}

/// A token of a larger string together with its absolute range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece<'a> {
    pub text: &'a str,
    pub range: TextRange,
}

/// Byte index of the first `needle` in `text` that is not inside a
/// `{{placeholder}}`.
pub fn find_outside_placeholders(text: &str, needle: char) -> Option<usize> {
    let mut found = None;
    walk_outside_placeholders(text, |i, rest| {
        if rest.starts_with(needle) {
            found = Some(i);
            return Some(0);
        }
        None
    });
    found
}

/// Split `text` wherever `separator_len` reports a separator, ignoring
/// separators inside `{{placeholder}}` tokens.
///
/// `base` is the absolute offset of `text[0]`. Every byte of `text` ends up in
/// exactly one piece or one separator, and pieces come back in source order,
/// so the input can be rebuilt from the pieces and the gaps between them.
/// Consecutive or trailing separators produce empty pieces.
pub fn split_pieces<'a, F>(text: &'a str, base: usize, mut separator_len: F) -> Vec<Piece<'a>>
where
    F: FnMut(&str) -> Option<usize>,
{
    let mut pieces = Vec::new();
    let mut start = 0;
    walk_outside_placeholders(text, |i, rest| {
        let len = separator_len(rest).filter(|len| *len > 0)?;
        pieces.push(Piece {
            text: &text[start..i],
            range: TextRange::new(base + start, base + i),
        });
        start = i + len;
        Some(len)
    });
    pieces.push(Piece {
        text: &text[start..],
        range: TextRange::new(base + start, base + text.len()),
    });
    pieces
}

/// Walk `text` char by char outside of `{{...}}`, calling `visit(index, rest)`.
///
/// `visit` returns how many bytes to skip: `Some(0)` stops the walk,
/// `Some(n)` skips `n` bytes, `None` moves on by one char.
fn walk_outside_placeholders<F>(text: &str, mut visit: F)
where
    F: FnMut(usize, &str) -> Option<usize>,
{
    let mut depth = 0usize;
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        if rest.starts_with("{{") {
            depth += 1;
            i += 2;
            continue;
        }
        if depth > 0 {
            if rest.starts_with("}}") {
                depth -= 1;
                i += 2;
            } else {
                i += rest.chars().next().map_or(1, char::len_utf8);
            }
            continue;
        }
        match visit(i, rest) {
            Some(0) => return,
            Some(skip) => i += skip,
            None => i += rest.chars().next().map_or(1, char::len_utf8),
        }
    }
}

/// Pre-computed line index for efficient position lookups.
///
/// LSP positions use line/column where column is in UTF-16 code units.
/// This struct pre-computes line start offsets for O(log n) lookup.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset where each line starts.
    line_starts: Vec<usize>,
    /// Source text (needed for UTF-16 column calculation).
    source: String,
}

impl LineIndex {
    /// Build a line index from source text.
    pub fn new(source: String) -> Self {
        let mut line_starts = vec![0];

        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }

        Self {
            line_starts,
            source,
        }
    }

    /// Get the source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte range of a line, excluding its terminator (`\n` or `\r\n`).
    pub fn line_range(&self, line: usize) -> Option<TextRange> {
        let start = *self.line_starts.get(line)?;
        let mut end = self
            .line_starts
            .get(line + 1)
            .map(|&next| next - 1)
            .unwrap_or(self.source.len());
        if end > start && self.source.as_bytes()[end - 1] == b'\r' {
            end -= 1;
        }
        Some(TextRange::new(start, end))
    }

    /// Text of a line, excluding its terminator.
    pub fn line_text(&self, line: usize) -> Option<&str> {
        self.line_range(line)?.slice(&self.source)
    }

    /// Zero-based line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        }
    }

    /// Convert a byte offset to an LSP position.
    ///
    /// Uses binary search for O(log n) line lookup, then scans the line for UTF-16 column.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let line = self.line_of(offset);

        let line_start = self.line_starts[line];
        let line_end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.source.len());

        let mut col = 0u32;
        let line_slice = &self.source[line_start..line_end];

        for (i, c) in line_slice.char_indices() {
            if line_start + i >= offset {
                break;
            }
            col += c.len_utf16() as u32;
        }

        Position::new(line as u32, col)
    }

    /// Convert an LSP position to a byte offset.
    ///
    /// Returns None if the position is out of bounds.
    pub fn position_to_offset(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;

        if line >= self.line_starts.len() {
            return None;
        }

        let line_start = self.line_starts[line];
        let line_end = self
            .line_starts
            .get(line + 1)
            .map(|&end| end.saturating_sub(1)) // Exclude newline
            .unwrap_or(self.source.len());

        let line_slice = &self.source[line_start..line_end];

        // Walk UTF-16 code units to find byte offset
        let mut utf16_col = 0u32;
        for (i, c) in line_slice.char_indices() {
            if utf16_col >= position.character {
                return Some(line_start + i);
            }
            utf16_col += c.len_utf16() as u32;
        }

        // Position is at or past end of line
        Some(line_end.min(self.source.len()))
    }

    /// Convert a byte range to an LSP range.
    pub fn to_lsp_range(&self, range: TextRange) -> tower_lsp::lsp_types::Range {
        let start = self.offset_to_position(range.start);
        let end = self.offset_to_position(range.end);
        tower_lsp::lsp_types::Range::new(start, end)
    }
}
