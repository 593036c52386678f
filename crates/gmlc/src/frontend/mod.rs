//! GML frontend
//!
//! The frontend turns source text into a concrete syntax tree:
//! 1. Lexing source code into tokens, with mode switching for strings
//! 2. Parsing tokens into a CST with error recovery
//! 3. Parsing doc comments into structured summaries

pub mod cst;
pub mod jsdoc;
pub mod lexer;
pub mod parser;

pub use jsdoc::{parse_jsdoc, Jsdoc, JsdocKind, JsdocParam};
pub use lexer::{tokenize, GmlLexer, LexError, LexOutput, Token, TokenKind};
pub use parser::{parse, GmlParser, ParseError, ParsedFile};

/// Debug output switches passed down from the driver
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub dump_tokens: bool,
    pub dump_cst: bool,
    pub verbose: bool,
}

/// Render the token stream of a file, one token per line
pub fn dump_tokens(source: &str) -> String {
    let output = tokenize(source);
    let mut out = String::new();
    for token in &output.tokens {
        out.push_str(&format!("{:>6} {:?}\n", token.span.to_string(), token.kind));
    }
    for error in &output.errors {
        out.push_str(&format!("error at {}: {}\n", error.span, error.message));
    }
    out
}

/// Render the CST of a file in debug notation
pub fn dump_cst(source: &str) -> String {
    let parsed = parse(source);
    let mut out = format!("{:#?}\n", parsed.program);
    for error in &parsed.parse_errors {
        out.push_str(&format!("error at {}: {}\n", error.span, error.message));
    }
    out
}
