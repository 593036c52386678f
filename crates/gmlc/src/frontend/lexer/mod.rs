//! GML lexer module

mod scanner;
mod token;

pub use scanner::{tokenize, GmlLexer, LexError, LexOutput, Mode};
pub use token::{Token, TokenKind};
