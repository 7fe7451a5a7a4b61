//! Source location tracking.

use std::path::PathBuf;

/// A zero-based position, as tree-sitter reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl From<tree_sitter::Point> for Position {
    fn from(point: tree_sitter::Point) -> Self {
        Self {
            line: point.row,
            column: point.column,
        }
    }
}

/// A range in one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub file: PathBuf,
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(file: PathBuf, start: Position, end: Position) -> Self {
        Self { file, start, end }
    }

    /// 1-based `(line, column)` of the start, for reports.
    pub fn display_start(&self) -> (usize, usize) {
        (self.start.line + 1, self.start.column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_start_is_one_based() {
        let span = Span::new(
            PathBuf::from("a.ts"),
            Position { line: 0, column: 4 },
            Position { line: 2, column: 1 },
        );
        assert_eq!(span.display_start(), (1, 5));
    }
}
