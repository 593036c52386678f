//! One loaded source file and everything analysis recorded about it

use crate::common::{FileId, LineIndex, Position, Range, Reference, ScopeId, SelfId, SignifierId, Span};
use crate::frontend::cst::Program;
use crate::frontend::{parse, LexError, ParseError};
use crate::sema::{Diagnostic, Diagnostics, ScopeRanges};

/// A use of a signifier that may turn out to be undeclared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub signifier: SignifierId,
    pub range: Range,
    /// Written as `global.name`
    pub via_global: bool,
}

/// A call to a known function, checked against its parameters once every
/// file has been analyzed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub callee: SignifierId,
    pub span: Span,
    /// One span per argument slot, empty slots included
    pub args: Vec<Span>,
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    pub name: String,
    pub text: String,
    pub line_index: LineIndex,
    pub lex_errors: Vec<LexError>,
    pub parse_errors: Vec<ParseError>,
    pub unreliable_after: Option<usize>,
    pub(crate) program: Program,
    /// Self the file's top level runs against
    pub(crate) self_id: SelfId,
    pub(crate) top_scope: ScopeId,
    pub(crate) scopes: ScopeRanges,
    /// Local scopes allocated for this file, and those left over from the
    /// previous analysis waiting to be reused
    pub(crate) owned_scopes: Vec<ScopeId>,
    pub(crate) spare_scopes: Vec<ScopeId>,
    /// Offset-ordered index of every reference located in this file
    pub(crate) refs: Vec<Reference>,
    /// Signifiers whose declaration this file contributed
    pub(crate) declared: Vec<SignifierId>,
    pub(crate) accesses: Vec<Access>,
    pub(crate) calls: Vec<CallSite>,
    /// Diagnostics found while walking the file
    pub(crate) findings: Vec<Diagnostic>,
    pub(crate) diagnostics: Diagnostics,
}

impl SourceFile {
    pub(crate) fn new(id: FileId, name: String, text: String, self_id: SelfId, top_scope: ScopeId) -> Self {
        let mut file = Self {
            id,
            name,
            line_index: LineIndex::new(&text),
            text,
            lex_errors: Vec::new(),
            parse_errors: Vec::new(),
            unreliable_after: None,
            program: Program::default(),
            self_id,
            top_scope,
            scopes: ScopeRanges::new(self_id, top_scope),
            owned_scopes: vec![top_scope],
            spare_scopes: Vec::new(),
            refs: Vec::new(),
            declared: Vec::new(),
            accesses: Vec::new(),
            calls: Vec::new(),
            findings: Vec::new(),
            diagnostics: Diagnostics::new(),
        };
        file.parse();
        file
    }

    /// Replace the text and parse it again
    pub(crate) fn set_text(&mut self, text: String) {
        self.line_index = LineIndex::new(&text);
        self.text = text;
        self.parse();
    }

    fn parse(&mut self) {
        let parsed = parse(&self.text);
        tracing::debug!(
            file = %self.name,
            stmts = parsed.program.stmts.len(),
            lex_errors = parsed.lex_errors.len(),
            parse_errors = parsed.parse_errors.len(),
            "parsed file"
        );
        self.program = parsed.program;
        self.lex_errors = parsed.lex_errors;
        self.parse_errors = parsed.parse_errors;
        self.unreliable_after = parsed.unreliable_after;
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn scopes(&self) -> &ScopeRanges {
        &self.scopes
    }

    pub fn references(&self) -> &[Reference] {
        &self.refs
    }

    pub fn position(&self, offset: usize) -> Position {
        self.line_index.position(offset)
    }

    pub fn offset(&self, position: Position) -> Option<usize> {
        self.line_index.offset(position)
    }

    pub fn slice(&self, span: Span) -> &str {
        self.text.get(span.start..span.end).unwrap_or("")
    }

    /// Insert into the offset index, keeping it sorted by start offset
    pub(crate) fn insert_ref(&mut self, reference: Reference) {
        let key = (reference.range.start.offset, reference.range.end);
        let index = self
            .refs
            .partition_point(|r| (r.range.start.offset, r.range.end) <= key);
        self.refs.insert(index, reference);
    }

    /// The reference whose range contains `offset`.
    ///
    /// Reference ranges are identifier spans and never nest, so only the
    /// references starting at the closest start offset at or before `offset`
    /// can contain it.
    pub fn reference_at(&self, offset: usize) -> Option<&Reference> {
        let index = self.refs.partition_point(|r| r.range.start.offset <= offset);
        let start = self.refs[..index].last()?.range.start.offset;
        self.refs[..index]
            .iter()
            .rev()
            .take_while(|r| r.range.start.offset == start)
            .find(|r| r.range.contains(offset))
    }

    /// Drop everything a previous analysis recorded, keeping the parse
    pub(crate) fn reset(&mut self, top_scope: ScopeId) {
        self.top_scope = top_scope;
        self.scopes = ScopeRanges::new(self.self_id, top_scope);
        self.refs.clear();
        self.declared.clear();
        self.accesses.clear();
        self.calls.clear();
        self.findings.clear();
        self.diagnostics.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Referent;
    use pretty_assertions::assert_eq;

    fn file(text: &str) -> SourceFile {
        SourceFile::new(FileId::new(0), "test.gml".into(), text.into(), SelfId::new(0), ScopeId::new(0))
    }

    #[test]
    fn test_parses_on_creation() {
        let file = file("var a = 1;\nfoo(a;");
        assert_eq!(file.program().stmts.len(), 2);
        assert_eq!(file.parse_errors.len(), 1);
        assert_eq!(file.position(11), Position { line: 2, column: 1 });
    }

    #[test]
    fn test_reference_index_stays_sorted() {
        let mut file = file("abc def ghi");
        let referent = Referent::Signifier(SignifierId::new(0));
        for span in [Span::new(8, 11), Span::new(0, 3), Span::new(4, 7)] {
            file.insert_ref(Reference::new(referent, Range::new(file.id, span), false));
        }
        let starts: Vec<_> = file.references().iter().map(|r| r.range.start.offset).collect();
        assert_eq!(starts, vec![0, 4, 8]);
        assert_eq!(file.reference_at(5).map(|r| r.range.span()), Some(Span::new(4, 7)));
        assert_eq!(file.reference_at(3).map(|r| r.range.span()), Some(Span::new(0, 3)));
        assert!(file.reference_at(100).is_none());
    }

    #[test]
    fn test_reference_lookup_between_references() {
        let mut file = file("a           b");
        let referent = Referent::Signifier(SignifierId::new(0));
        for span in [Span::new(0, 1), Span::new(12, 13)] {
            file.insert_ref(Reference::new(referent, Range::new(file.id, span), false));
        }
        assert!(file.reference_at(6).is_none());
        assert_eq!(file.reference_at(12).map(|r| r.range.span()), Some(Span::new(12, 13)));
    }
}
