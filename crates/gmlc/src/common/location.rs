//! Positions, ranges and references into project files

use super::{FileId, SelfId, SignifierId, Span};
use std::fmt;

/// A byte offset inside a specific file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub file: FileId,
    pub offset: usize,
}

impl Location {
    pub fn new(file: FileId, offset: usize) -> Self {
        Self { file, offset }
    }

    /// A new location in the same file
    pub fn at(&self, offset: usize) -> Self {
        Self { file: self.file, offset }
    }
}

/// A start location and an end offset in the same file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Range {
    pub start: Location,
    pub end: usize,
}

impl Range {
    pub fn new(file: FileId, span: Span) -> Self {
        Self {
            start: Location::new(file, span.start),
            end: span.end,
        }
    }

    pub fn file(&self) -> FileId {
        self.start.file
    }

    pub fn span(&self) -> Span {
        Span::new(self.start.offset, self.end)
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.span().contains(offset)
    }
}

/// One-based line and column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Byte offsets of every line start in a file
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        Self {
            line_starts: codespan_reporting::files::line_starts(text).collect(),
            len: text.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let start = self.line_starts.get(line).copied().unwrap_or(0);
        Position {
            line: line + 1,
            column: offset - start + 1,
        }
    }

    pub fn offset(&self, position: Position) -> Option<usize> {
        let start = *self.line_starts.get(position.line.checked_sub(1)?)?;
        let offset = start + position.column.checked_sub(1)?;
        (offset <= self.len).then_some(offset)
    }
}

/// What a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Referent {
    Signifier(SignifierId),
    /// `self`, `other` and `global` keyword occurrences
    SelfRef(SelfId),
}

/// One occurrence of a referent in source.
///
/// Each reference is stored twice: in its referent's reference list and in
/// the owning file's offset-sorted index. Both copies are written and removed
/// together by the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference {
    pub referent: Referent,
    pub range: Range,
    pub is_declaration: bool,
}

impl Reference {
    pub fn new(referent: Referent, range: Range, is_declaration: bool) -> Self {
        Self {
            referent,
            range,
            is_declaration,
        }
    }

    pub fn file(&self) -> FileId {
        self.range.file()
    }

    pub fn signifier(&self) -> Option<SignifierId> {
        match self.referent {
            Referent::Signifier(id) => Some(id),
            Referent::SelfRef(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_index_round_trip() {
        let index = LineIndex::new("var x = 1;\nx = 2;\n\ny");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.position(0), Position { line: 1, column: 1 });
        assert_eq!(index.position(11), Position { line: 2, column: 1 });
        assert_eq!(index.position(13), Position { line: 2, column: 3 });
        assert_eq!(index.position(19), Position { line: 4, column: 1 });
        assert_eq!(index.offset(Position { line: 2, column: 3 }), Some(13));
        assert_eq!(index.offset(Position { line: 9, column: 1 }), None);
    }

    #[test]
    fn test_derived_location() {
        let loc = Location::new(FileId::new(3), 10);
        let other = loc.at(25);
        assert_eq!(other.file, FileId::new(3));
        assert_eq!(other.offset, 25);
        let range = Range::new(FileId::new(3), Span::new(10, 25));
        assert!(range.contains(25));
        assert_eq!(range.file(), FileId::new(3));
    }
}
