//! GML token definitions using logos

use crate::common::Span;
use logos::{FilterResult, Lexer, Logos};
use std::fmt;

/// A GML token with its kind and source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Scan a block comment to its closing `*/`.
///
/// Comments opened with `/**` (other than the empty `/**/`) are kept as doc
/// blocks. An unterminated comment consumes the rest of the file and is
/// reported as an error.
fn block_comment(lex: &mut Lexer<TokenKind>) -> FilterResult<String, ()> {
    let rest = lex.remainder();
    let Some(end) = rest.find("*/") else {
        lex.bump(rest.len());
        return FilterResult::Error(());
    };
    lex.bump(end + 2);
    if rest.starts_with('*') && end > 0 {
        FilterResult::Emit(lex.slice().to_string())
    } else {
        FilterResult::Skip
    }
}

/// Token kinds.
///
/// The logos attributes describe code mode only. String, template and
/// multiline-string contents are lexed by the sub-mode lexers in the scanner,
/// which produce the variants without attributes.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
#[logos(skip r"//([^/\n][^\n]*)?")]
#[logos(skip r"#(end)?region[^\n]*")]
#[logos(skip r"\\")]
pub enum TokenKind {
    // Declarations
    #[token("var")]
    Var,
    #[token("globalvar")]
    GlobalVar,
    #[token("static")]
    Static,
    #[token("function")]
    Function,
    #[token("constructor")]
    Constructor,
    #[token("enum")]
    Enum,
    #[token("#macro")]
    Macro,

    // Control flow
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("until")]
    Until,
    #[token("repeat")]
    Repeat,
    #[token("for")]
    For,
    #[token("with")]
    With,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("exit")]
    Exit,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("throw")]
    Throw,
    #[token("new")]
    New,
    #[token("delete")]
    Delete,
    #[token("begin")]
    Begin,
    #[token("end")]
    End,

    // Context keywords
    #[token("self")]
    SelfKw,
    #[token("other")]
    Other,
    #[token("global")]
    Global,
    #[token("noone")]
    Noone,
    #[token("all")]
    All,

    // Word operators
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("xor")]
    Xor,
    #[token("not")]
    Not,
    #[token("div")]
    Div,
    #[token("mod")]
    Mod,

    // Literals
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("undefined")]
    Undefined,
    #[token("pointer_null")]
    PointerNull,
    #[token("pointer_invalid")]
    PointerInvalid,
    #[regex(r"(0x|\$)[0-9a-fA-F_]+", priority = 3, callback = |lex| lex.slice().to_string())]
    HexLiteral(String),
    #[regex(r"0b[01_]+", priority = 3, callback = |lex| lex.slice().to_string())]
    BinaryLiteral(String),
    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?", priority = 2, callback = |lex| lex.slice().to_string())]
    #[regex(r"\.[0-9][0-9_]*", callback = |lex| lex.slice().to_string())]
    RealLiteral(String),

    // String openers, consumed by the scanner
    #[token("\"")]
    Quote,
    #[token("$\"")]
    TemplateQuote,
    #[token("@\"")]
    MultilineDoubleQuote,
    #[token("@'")]
    MultilineSingleQuote,

    // Produced by the scanner's string modes
    StringLiteral(String),
    TemplateStart,
    TemplateText(String),
    InterpolationStart,
    InterpolationEnd,
    TemplateEnd,

    // Doc comments
    #[regex(r"///[^\n]*", callback = |lex| lex.slice().to_string())]
    DocLine(String),
    /// `/** ... */`; plain `/* ... */` comments are skipped by the same rule
    #[token("/*", block_comment)]
    DocBlock(String),

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", priority = 1, callback = |lex| lex.slice().to_string())]
    Identifier(String),

    // Multi-character operators
    #[token("??=")]
    QuestionQuestionEq,
    #[token("??")]
    QuestionQuestion,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<>")]
    LtGt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("^^")]
    CaretCaret,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token(":=")]
    ColonEq,
    #[token("...")]
    Ellipsis,

    // Accessors
    #[token("[$")]
    AccessorStruct,
    #[token("[?")]
    AccessorMap,
    #[token("[|")]
    AccessorList,
    #[token("[#")]
    AccessorGrid,
    #[token("[@")]
    AccessorArray,

    // Single-character operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("?")]
    Question,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Punctuation
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    // Special
    Eof,
}

impl TokenKind {
    /// Tokens that start a statement, used to resynchronize after errors
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Var
                | TokenKind::GlobalVar
                | TokenKind::Static
                | TokenKind::Function
                | TokenKind::Enum
                | TokenKind::Macro
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::Repeat
                | TokenKind::For
                | TokenKind::With
                | TokenKind::Switch
                | TokenKind::Try
                | TokenKind::Return
                | TokenKind::Exit
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Throw
        )
    }

    pub fn is_doc(&self) -> bool {
        matches!(self, TokenKind::DocLine(_) | TokenKind::DocBlock(_))
    }

    /// The identifier text for identifiers and for keywords that may be used
    /// as names in member position (`a.end`, `{ default: 1 }`)
    pub fn name_like(&self) -> Option<String> {
        match self {
            TokenKind::Identifier(name) => Some(name.clone()),
            TokenKind::Begin
            | TokenKind::End
            | TokenKind::Default
            | TokenKind::Then
            | TokenKind::Until
            | TokenKind::Constructor
            | TokenKind::Delete
            | TokenKind::All
            | TokenKind::Global
            | TokenKind::Other
            | TokenKind::SelfKw
            | TokenKind::Noone => Some(self.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Var => "var",
            TokenKind::GlobalVar => "globalvar",
            TokenKind::Static => "static",
            TokenKind::Function => "function",
            TokenKind::Constructor => "constructor",
            TokenKind::Enum => "enum",
            TokenKind::Macro => "#macro",
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::Until => "until",
            TokenKind::Repeat => "repeat",
            TokenKind::For => "for",
            TokenKind::With => "with",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Default => "default",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Return => "return",
            TokenKind::Exit => "exit",
            TokenKind::Try => "try",
            TokenKind::Catch => "catch",
            TokenKind::Finally => "finally",
            TokenKind::Throw => "throw",
            TokenKind::New => "new",
            TokenKind::Delete => "delete",
            TokenKind::Begin => "begin",
            TokenKind::End => "end",
            TokenKind::SelfKw => "self",
            TokenKind::Other => "other",
            TokenKind::Global => "global",
            TokenKind::Noone => "noone",
            TokenKind::All => "all",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Xor => "xor",
            TokenKind::Not => "not",
            TokenKind::Div => "div",
            TokenKind::Mod => "mod",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Undefined => "undefined",
            TokenKind::PointerNull => "pointer_null",
            TokenKind::PointerInvalid => "pointer_invalid",
            TokenKind::HexLiteral(s)
            | TokenKind::BinaryLiteral(s)
            | TokenKind::RealLiteral(s)
            | TokenKind::StringLiteral(s)
            | TokenKind::TemplateText(s)
            | TokenKind::DocLine(s)
            | TokenKind::DocBlock(s)
            | TokenKind::Identifier(s) => return f.write_str(s),
            TokenKind::Quote => "\"",
            TokenKind::TemplateQuote | TokenKind::TemplateStart => "$\"",
            TokenKind::MultilineDoubleQuote => "@\"",
            TokenKind::MultilineSingleQuote => "@'",
            TokenKind::InterpolationStart => "{",
            TokenKind::InterpolationEnd => "}",
            TokenKind::TemplateEnd => "\"",
            TokenKind::QuestionQuestionEq => "??=",
            TokenKind::QuestionQuestion => "??",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::LtGt => "<>",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::CaretCaret => "^^",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::ColonEq => ":=",
            TokenKind::Ellipsis => "...",
            TokenKind::AccessorStruct => "[$",
            TokenKind::AccessorMap => "[?",
            TokenKind::AccessorList => "[|",
            TokenKind::AccessorGrid => "[#",
            TokenKind::AccessorArray => "[@",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Bang => "!",
            TokenKind::Tilde => "~",
            TokenKind::Eq => "=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Question => "?",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semi => ";",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Eof => "end of file",
        };
        f.write_str(text)
    }
}

/// Inside a `"..."` string
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub(super) enum StringPart {
    #[regex(r#"([^"\\\n]|\\[^\n])+"#)]
    Text,
    #[token("\"")]
    Close,
    #[token("\n")]
    Newline,
}

/// Inside a `$"..."` template, outside of interpolations
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub(super) enum TemplatePart {
    #[regex(r#"([^"\\\n{]|\\[^\n])+"#)]
    Text,
    #[token("{")]
    Open,
    #[token("\"")]
    Close,
    #[token("\n")]
    Newline,
}

/// Inside a `@"..."` string
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub(super) enum MultilineDoublePart {
    #[regex(r#"[^"]+"#)]
    Text,
    #[token("\"")]
    Close,
}

/// Inside a `@'...'` string
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub(super) enum MultilineSinglePart {
    #[regex(r"[^']+")]
    Text,
    #[token("'")]
    Close,
}
