//! GML concrete syntax tree.
//!
//! One sum type per syntactic category. The analyzer walks these with one
//! `match` arm per variant; `Error` variants stand in for input the parser
//! could not make sense of and are skipped.

mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

use crate::common::Span;

/// A complete GML file
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Program {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Self { stmts, span }
    }
}

/// A name together with where it was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Consecutive `///` lines or one `/** */` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocComment {
    pub text: String,
    pub span: Span,
}
