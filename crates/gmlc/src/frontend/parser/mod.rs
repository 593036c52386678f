//! GML recursive descent parser
//!
//! The parser never gives up on a file. Syntax errors are collected, an
//! `Error` node takes the place of whatever could not be parsed, and parsing
//! resumes at the next statement boundary.

mod expr;
mod parser;

pub use parser::GmlParser;

use crate::common::Span;
use crate::frontend::cst::Program;
use crate::frontend::lexer::LexError;

/// A recoverable syntax error
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Result of parsing one file
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub program: Program,
    pub lex_errors: Vec<LexError>,
    pub parse_errors: Vec<ParseError>,
    /// Offset after which positions may be off due to a lexing error
    pub unreliable_after: Option<usize>,
}

impl ParsedFile {
    pub fn has_errors(&self) -> bool {
        !self.lex_errors.is_empty() || !self.parse_errors.is_empty()
    }
}

/// Parse a complete GML source text
pub fn parse(source: &str) -> ParsedFile {
    GmlParser::new(source).parse_file()
}
