//! Line/column positions, for rendering diagnostics to a human.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed column.
    pub character: u32,
}

impl Position {
    #[must_use]
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// A location in a source file: the file it belongs to plus a range within it.
///
/// Every declaration and token-bearing AST node carries one of these, per
/// the external-interface contract the checker requires from the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub range: Range,
}

impl Location {
    #[must_use]
    pub fn new(file: impl Into<String>, range: Range) -> Self {
        Self { file: file.into(), range }
    }

    #[must_use]
    pub fn synthetic() -> Self {
        Self {
            file: String::new(),
            range: Range::new(Position::new(0, 0), Position::new(0, 0)),
        }
    }
}

/// Converts byte offsets to `(line, column)` positions for a single source file.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<u32>,
}

impl LineMap {
    #[must_use]
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        Self { line_starts }
    }

    #[must_use]
    pub fn offset_to_position(&self, offset: u32) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        Position::new(u32::try_from(line).unwrap_or(u32::MAX), offset.saturating_sub(line_start))
    }
}
