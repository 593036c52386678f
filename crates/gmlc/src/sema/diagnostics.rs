//! Findings about analyzed code
//!
//! Diagnostics are plain data attached to a file. They never abort analysis
//! and are rendered by the driver through `codespan-reporting`.

use crate::common::Range;
use codespan_reporting::diagnostic::{Diagnostic as CodespanDiagnostic, Label};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticKind {
    SyntaxError,
    UndeclaredVariableReference,
    UndeclaredGlobalReference,
    TooManyArguments,
    MissingRequiredArgument,
    JsdocMismatch,
    GlobalSelf,
    Unused,
}

impl DiagnosticKind {
    pub fn default_severity(self) -> Severity {
        match self {
            DiagnosticKind::SyntaxError | DiagnosticKind::MissingRequiredArgument => Severity::Error,
            DiagnosticKind::UndeclaredVariableReference
            | DiagnosticKind::UndeclaredGlobalReference
            | DiagnosticKind::TooManyArguments
            | DiagnosticKind::JsdocMismatch
            | DiagnosticKind::GlobalSelf => Severity::Warning,
            DiagnosticKind::Unused => Severity::Info,
        }
    }

    /// Stable identifier shown next to rendered diagnostics
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::SyntaxError => "syntax-error",
            DiagnosticKind::UndeclaredVariableReference => "undeclared-variable",
            DiagnosticKind::UndeclaredGlobalReference => "undeclared-global",
            DiagnosticKind::TooManyArguments => "too-many-arguments",
            DiagnosticKind::MissingRequiredArgument => "missing-argument",
            DiagnosticKind::JsdocMismatch => "jsdoc-mismatch",
            DiagnosticKind::GlobalSelf => "global-self",
            DiagnosticKind::Unused => "unused",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Machine-applicable follow-up an editor can offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickFix {
    DeclareVariable { name: String },
    RemoveArgument,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub range: Range,
    pub quick_fix: Option<QuickFix>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, range: Range, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            range,
            quick_fix: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_fix(mut self, fix: QuickFix) -> Self {
        self.quick_fix = Some(fix);
        self
    }

    /// Convert for rendering against a `codespan-reporting` file database
    pub fn to_codespan(&self, file_id: usize) -> CodespanDiagnostic<usize> {
        let base = match self.severity {
            Severity::Error => CodespanDiagnostic::error(),
            Severity::Warning => CodespanDiagnostic::warning(),
            Severity::Info => CodespanDiagnostic::note(),
        };
        let span = self.range.span();
        let mut diagnostic = base
            .with_message(&self.message)
            .with_code(self.kind.code())
            .with_labels(vec![Label::primary(file_id, span.start..span.end)]);
        match &self.quick_fix {
            Some(QuickFix::DeclareVariable { name }) => {
                diagnostic = diagnostic.with_notes(vec![format!("help: declare it with `var {name};` or `globalvar {name};`")]);
            }
            Some(QuickFix::RemoveArgument) => {
                diagnostic = diagnostic.with_notes(vec!["help: remove this argument".to_string()]);
            }
            None => {}
        }
        diagnostic
    }
}

/// Diagnostics of one file
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(diagnostics);
    }

    /// Every diagnostic ordered by start offset
    pub fn all(&self) -> Vec<&Diagnostic> {
        let mut all: Vec<_> = self.items.iter().collect();
        all.sort_by_key(|d| (d.range.start.offset, d.range.end));
        all
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{FileId, Span};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_is_ordered_by_offset() {
        let file = FileId::new(0);
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::new(DiagnosticKind::Unused, Range::new(file, Span::new(20, 25)), "b"));
        diagnostics.push(Diagnostic::new(DiagnosticKind::GlobalSelf, Range::new(file, Span::new(3, 7)), "a"));
        let messages: Vec<_> = diagnostics.all().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b"]);
    }

    #[test]
    fn test_default_severities() {
        assert_eq!(DiagnosticKind::MissingRequiredArgument.default_severity(), Severity::Error);
        assert_eq!(DiagnosticKind::TooManyArguments.default_severity(), Severity::Warning);
        assert_eq!(DiagnosticKind::Unused.default_severity(), Severity::Info);
    }

    #[test]
    fn test_codespan_conversion() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::UndeclaredVariableReference,
            Range::new(FileId::new(0), Span::new(4, 9)),
            "`score` is never declared",
        )
        .with_fix(QuickFix::DeclareVariable { name: "score".into() });
        let rendered = diagnostic.to_codespan(0);
        assert_eq!(rendered.code.as_deref(), Some("undeclared-variable"));
        assert_eq!(rendered.labels[0].range, 4..9);
        assert_eq!(rendered.notes.len(), 1);
    }
}
