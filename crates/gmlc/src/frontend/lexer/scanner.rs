//! Mode-switching GML lexer.
//!
//! Code mode is lexed by [`TokenKind`]. Opening quotes push a string mode
//! whose contents are lexed by a dedicated logos enum; the scanner morphs the
//! underlying lexer between modes as the mode stack changes. Braces (and
//! `begin`/`end`) push and pop code mode so that a `}` inside a template
//! interpolation returns to the template only when it closes the
//! interpolation itself.

use super::token::{MultilineDoublePart, MultilineSinglePart, StringPart, TemplatePart, Token, TokenKind};
use crate::common::Span;
use logos::Logos;
use std::collections::VecDeque;

/// A recoverable lexing problem
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Everything produced by lexing a whole file
#[derive(Debug, Clone, Default)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
    /// Offset of the first error after which token positions may be off
    pub unreliable_after: Option<usize>,
}

/// Lex a complete source text, doc comments included
pub fn tokenize(source: &str) -> LexOutput {
    GmlLexer::new(source).tokenize_all()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Code,
    String,
    Template,
    MultilineDouble,
    MultilineSingle,
}

enum ModeLexer<'a> {
    Code(logos::Lexer<'a, TokenKind>),
    String(logos::Lexer<'a, StringPart>),
    Template(logos::Lexer<'a, TemplatePart>),
    MultilineDouble(logos::Lexer<'a, MultilineDoublePart>),
    MultilineSingle(logos::Lexer<'a, MultilineSinglePart>),
}

impl<'a> ModeLexer<'a> {
    fn mode(&self) -> Mode {
        match self {
            ModeLexer::Code(_) => Mode::Code,
            ModeLexer::String(_) => Mode::String,
            ModeLexer::Template(_) => Mode::Template,
            ModeLexer::MultilineDouble(_) => Mode::MultilineDouble,
            ModeLexer::MultilineSingle(_) => Mode::MultilineSingle,
        }
    }

    fn into_mode(self, mode: Mode) -> Self {
        match self {
            ModeLexer::Code(lex) => Self::morph_from(lex, mode),
            ModeLexer::String(lex) => Self::morph_from(lex, mode),
            ModeLexer::Template(lex) => Self::morph_from(lex, mode),
            ModeLexer::MultilineDouble(lex) => Self::morph_from(lex, mode),
            ModeLexer::MultilineSingle(lex) => Self::morph_from(lex, mode),
        }
    }

    fn morph_from<T>(lex: logos::Lexer<'a, T>, mode: Mode) -> Self
    where
        T: Logos<'a, Source = str, Extras = ()>,
    {
        match mode {
            Mode::Code => ModeLexer::Code(lex.morph()),
            Mode::String => ModeLexer::String(lex.morph()),
            Mode::Template => ModeLexer::Template(lex.morph()),
            Mode::MultilineDouble => ModeLexer::MultilineDouble(lex.morph()),
            Mode::MultilineSingle => ModeLexer::MultilineSingle(lex.morph()),
        }
    }
}

/// One step of a sub-mode lexer, with the kind erased
enum Step<P> {
    Part(P, Span),
    Invalid(Span),
    Done,
}

fn step<'a, P>(lex: &mut logos::Lexer<'a, P>) -> Step<P>
where
    P: Logos<'a, Source = str, Extras = ()>,
{
    match lex.next() {
        Some(Ok(part)) => Step::Part(part, lex.span().into()),
        Some(Err(_)) => Step::Invalid(lex.span().into()),
        None => Step::Done,
    }
}

/// Lexer for GML source code
pub struct GmlLexer<'a> {
    source: &'a str,
    inner: Option<ModeLexer<'a>>,
    modes: Vec<Mode>,
    /// Where the string currently being lexed began
    string_start: usize,
    errors: Vec<LexError>,
    unreliable_after: Option<usize>,
    /// Buffer for peeked tokens
    peeked: VecDeque<Token>,
    /// Doc comments skipped by `next_token`, waiting to be claimed
    docs: Vec<Token>,
    at_eof: bool,
}

impl<'a> GmlLexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: Some(ModeLexer::Code(TokenKind::lexer(source))),
            modes: vec![Mode::Code],
            string_start: 0,
            errors: Vec::new(),
            unreliable_after: None,
            peeked: VecDeque::new(),
            docs: Vec::new(),
            at_eof: false,
        }
    }

    /// Get the next non-doc token
    pub fn next_token(&mut self) -> Token {
        loop {
            let token = match self.peeked.pop_front() {
                Some(token) => token,
                None => self.scan_token(),
            };
            if token.kind.is_doc() {
                self.docs.push(token);
            } else {
                return token;
            }
        }
    }

    /// Peek at the next non-doc token without consuming it
    pub fn peek(&mut self) -> &Token {
        self.peek_at(0)
    }

    /// Peek at the non-doc token at `offset` (0 = next)
    pub fn peek_at(&mut self, offset: usize) -> &Token {
        loop {
            let available = self.peeked.iter().filter(|t| !t.kind.is_doc()).count();
            let reached_eof = self.at_eof && self.peeked.back().is_some_and(|t| t.kind == TokenKind::Eof);
            if available > offset || reached_eof {
                break;
            }
            let token = self.scan_token();
            self.peeked.push_back(token);
        }
        let eof_index = self.peeked.len() - 1;
        let index = self
            .peeked
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_doc())
            .nth(offset)
            .map_or(eof_index, |(i, _)| i);
        &self.peeked[index]
    }

    /// Take every pending doc comment that ends before `offset`
    pub fn take_docs_before(&mut self, offset: usize) -> Vec<Token> {
        while let Some(front) = self.peeked.front() {
            if front.kind.is_doc() && front.span.end <= offset {
                if let Some(doc) = self.peeked.pop_front() {
                    self.docs.push(doc);
                }
            } else {
                break;
            }
        }
        let (taken, rest) = std::mem::take(&mut self.docs)
            .into_iter()
            .partition(|doc| doc.span.end <= offset);
        self.docs = rest;
        taken
    }

    /// Lex until end of input, keeping doc comments in the stream
    pub fn tokenize_all(mut self) -> LexOutput {
        let mut tokens = Vec::new();
        loop {
            let token = match self.peeked.pop_front() {
                Some(token) => token,
                None => self.scan_token(),
            };
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        LexOutput {
            tokens,
            errors: self.errors,
            unreliable_after: self.unreliable_after,
        }
    }

    /// Errors reported so far
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> (Vec<LexError>, Option<usize>) {
        (std::mem::take(&mut self.errors), self.unreliable_after)
    }

    /// Get the source being lexed
    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Code)
    }

    fn push_mode(&mut self, mode: Mode) {
        self.modes.push(mode);
    }

    fn pop_mode(&mut self) -> bool {
        if self.modes.len() > 1 {
            self.modes.pop();
            true
        } else {
            false
        }
    }

    fn error(&mut self, message: impl Into<String>, span: Span, unrecoverable: bool) {
        let err = LexError::new(message, span);
        tracing::trace!(message = %err.message, %span, "lex error");
        self.errors.push(err);
        if unrecoverable && self.unreliable_after.is_none() {
            self.unreliable_after = Some(span.start);
        }
    }

    /// Morph the underlying lexer to match the top of the mode stack
    fn sync_mode(&mut self) {
        let target = self.mode();
        if let Some(inner) = self.inner.take() {
            let inner = if inner.mode() == target {
                inner
            } else {
                inner.into_mode(target)
            };
            self.inner = Some(inner);
        }
    }

    fn eof_token(&mut self) -> Token {
        let len = self.source.len();
        if !self.at_eof && self.modes.contains(&Mode::Template) {
            self.error("unterminated template string", Span::point(len), true);
        }
        self.at_eof = true;
        Token::new(TokenKind::Eof, Span::point(len))
    }

    /// Scan a new token from source, in whatever mode is active
    fn scan_token(&mut self) -> Token {
        if self.at_eof {
            return self.eof_token();
        }
        loop {
            self.sync_mode();
            let token = match &mut self.inner {
                Some(ModeLexer::Code(lex)) => match lex.next() {
                    Some(Ok(kind)) => {
                        let span: Span = lex.span().into();
                        self.code_token(kind, span)
                    }
                    Some(Err(())) => {
                        let span: Span = lex.span().into();
                        let message = if lex.slice().starts_with("/*") {
                            "unterminated block comment".to_string()
                        } else {
                            format!("unexpected character '{}'", lex.slice())
                        };
                        self.error(message, span, false);
                        None
                    }
                    None => Some(self.eof_token()),
                },
                Some(ModeLexer::String(lex)) => {
                    let step = step(lex);
                    self.string_step(step)
                }
                Some(ModeLexer::Template(lex)) => {
                    let step = step(lex);
                    self.template_step(step)
                }
                Some(ModeLexer::MultilineDouble(lex)) => {
                    let step = step(lex);
                    self.multiline_step(step.map(|part| part == MultilineDoublePart::Close))
                }
                Some(ModeLexer::MultilineSingle(lex)) => {
                    let step = step(lex);
                    self.multiline_step(step.map(|part| part == MultilineSinglePart::Close))
                }
                None => Some(self.eof_token()),
            };
            if let Some(token) = token {
                return token;
            }
        }
    }

    fn code_token(&mut self, kind: TokenKind, span: Span) -> Option<Token> {
        match kind {
            TokenKind::Quote => {
                self.string_start = span.start;
                self.push_mode(Mode::String);
                None
            }
            TokenKind::MultilineDoubleQuote => {
                self.string_start = span.start;
                self.push_mode(Mode::MultilineDouble);
                None
            }
            TokenKind::MultilineSingleQuote => {
                self.string_start = span.start;
                self.push_mode(Mode::MultilineSingle);
                None
            }
            TokenKind::TemplateQuote => {
                self.push_mode(Mode::Template);
                Some(Token::new(TokenKind::TemplateStart, span))
            }
            TokenKind::LBrace | TokenKind::Begin => {
                self.push_mode(Mode::Code);
                Some(Token::new(kind, span))
            }
            TokenKind::RBrace | TokenKind::End => {
                if !self.pop_mode() {
                    self.error(format!("unmatched '{kind}'"), span, true);
                    return Some(Token::new(kind, span));
                }
                if self.mode() == Mode::Template {
                    Some(Token::new(TokenKind::InterpolationEnd, span))
                } else {
                    Some(Token::new(kind, span))
                }
            }
            other => Some(Token::new(other, span)),
        }
    }

    fn finish_string(&mut self, end: usize) -> Token {
        self.pop_mode();
        let span = Span::new(self.string_start, end);
        Token::new(TokenKind::StringLiteral(span.slice(self.source).to_string()), span)
    }

    fn string_step(&mut self, step: Step<StringPart>) -> Option<Token> {
        match step {
            Step::Part(StringPart::Text, _) => None,
            Step::Invalid(span) => {
                self.error("invalid escape sequence", span, false);
                None
            }
            Step::Part(StringPart::Close, span) => Some(self.finish_string(span.end)),
            Step::Part(StringPart::Newline, span) => {
                self.error("unterminated string literal", Span::new(self.string_start, span.start), true);
                Some(self.finish_string(span.start))
            }
            Step::Done => {
                let end = self.source.len();
                self.error("unterminated string literal", Span::new(self.string_start, end), true);
                Some(self.finish_string(end))
            }
        }
    }

    fn template_step(&mut self, step: Step<TemplatePart>) -> Option<Token> {
        match step {
            Step::Part(TemplatePart::Text, span) => Some(Token::new(
                TokenKind::TemplateText(span.slice(self.source).to_string()),
                span,
            )),
            Step::Part(TemplatePart::Open, span) => {
                self.push_mode(Mode::Code);
                Some(Token::new(TokenKind::InterpolationStart, span))
            }
            Step::Part(TemplatePart::Close, span) => {
                self.pop_mode();
                Some(Token::new(TokenKind::TemplateEnd, span))
            }
            Step::Invalid(span) => {
                self.error("invalid escape sequence", span, false);
                None
            }
            Step::Part(TemplatePart::Newline, span) => {
                self.error("unterminated template string", span, true);
                self.pop_mode();
                Some(Token::new(TokenKind::TemplateEnd, Span::point(span.start)))
            }
            Step::Done => {
                let end = self.source.len();
                self.error("unterminated template string", Span::point(end), true);
                self.pop_mode();
                Some(Token::new(TokenKind::TemplateEnd, Span::point(end)))
            }
        }
    }

    fn multiline_step(&mut self, step: Step<bool>) -> Option<Token> {
        match step {
            Step::Part(true, span) => Some(self.finish_string(span.end)),
            Step::Part(false, _) | Step::Invalid(_) => None,
            Step::Done => {
                let end = self.source.len();
                self.error("unterminated string literal", Span::new(self.string_start, end), true);
                Some(self.finish_string(end))
            }
        }
    }
}

impl<P> Step<P> {
    fn map<Q>(self, f: impl FnOnce(P) -> Q) -> Step<Q> {
        match self {
            Step::Part(part, span) => Step::Part(f(part), span),
            Step::Invalid(span) => Step::Invalid(span),
            Step::Done => Step::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords() {
        let source = "var globalvar static function constructor enum if else while repeat with";
        let mut lexer = GmlLexer::new(source);

        assert!(matches!(lexer.next_token().kind, TokenKind::Var));
        assert!(matches!(lexer.next_token().kind, TokenKind::GlobalVar));
        assert!(matches!(lexer.next_token().kind, TokenKind::Static));
        assert!(matches!(lexer.next_token().kind, TokenKind::Function));
        assert!(matches!(lexer.next_token().kind, TokenKind::Constructor));
        assert!(matches!(lexer.next_token().kind, TokenKind::Enum));
        assert!(matches!(lexer.next_token().kind, TokenKind::If));
        assert!(matches!(lexer.next_token().kind, TokenKind::Else));
        assert!(matches!(lexer.next_token().kind, TokenKind::While));
        assert!(matches!(lexer.next_token().kind, TokenKind::Repeat));
        assert!(matches!(lexer.next_token().kind, TokenKind::With));
        assert!(matches!(lexer.next_token().kind, TokenKind::Eof));
    }

    #[test]
    fn test_numeric_literals() {
        let tokens = kinds("10 1.5 .5 0xFF $ff 0b1010 1_000");
        assert!(matches!(&tokens[0], TokenKind::RealLiteral(s) if s == "10"));
        assert!(matches!(&tokens[1], TokenKind::RealLiteral(s) if s == "1.5"));
        assert!(matches!(&tokens[2], TokenKind::RealLiteral(s) if s == ".5"));
        assert!(matches!(&tokens[3], TokenKind::HexLiteral(s) if s == "0xFF"));
        assert!(matches!(&tokens[4], TokenKind::HexLiteral(s) if s == "$ff"));
        assert!(matches!(&tokens[5], TokenKind::BinaryLiteral(s) if s == "0b1010"));
        assert!(matches!(&tokens[6], TokenKind::RealLiteral(s) if s == "1_000"));
    }

    #[test]
    fn test_strings() {
        let output = tokenize(r#"a = "hello \"world\""; b = @"multi
line"; c = @'single';"#);
        assert!(output.errors.is_empty(), "{:?}", output.errors);
        let strings: Vec<_> = output
            .tokens
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::StringLiteral(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(strings, vec![r#""hello \"world\"""#, "@\"multi\nline\"", "@'single'"]);
    }

    #[test]
    fn test_nested_template_interpolation() {
        let output = tokenize(r#"x = $"a{ f({b:1}) }c";"#);
        assert!(output.errors.is_empty(), "{:?}", output.errors);
        let tokens: Vec<_> = output.tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            tokens,
            vec![
                TokenKind::Identifier("x".into()),
                TokenKind::Eq,
                TokenKind::TemplateStart,
                TokenKind::TemplateText("a".into()),
                TokenKind::InterpolationStart,
                TokenKind::Identifier("f".into()),
                TokenKind::LParen,
                TokenKind::LBrace,
                TokenKind::Identifier("b".into()),
                TokenKind::Colon,
                TokenKind::RealLiteral("1".into()),
                TokenKind::RBrace,
                TokenKind::RParen,
                TokenKind::InterpolationEnd,
                TokenKind::TemplateText("c".into()),
                TokenKind::TemplateEnd,
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_reports_one_error() {
        let output = tokenize("a = \"oops\nb = 2;");
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].message, "unterminated string literal");
        assert_eq!(output.unreliable_after, Some(4));
        // Lexing continues on the next line
        assert!(output
            .tokens
            .iter()
            .any(|t| matches!(&t.kind, TokenKind::Identifier(s) if s == "b")));
    }

    #[test]
    fn test_unmatched_close_brace() {
        let output = tokenize("a = 1; }");
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].message, "unmatched '}'");
        assert!(matches!(output.tokens[4].kind, TokenKind::RBrace));
    }

    #[test]
    fn test_comments_and_docs() {
        let tokens = kinds("// plain\n/// @param x\n/* block */ /** doc */ #region Things\nx\n#endregion");
        assert!(matches!(&tokens[0], TokenKind::DocLine(s) if s == "/// @param x"));
        assert!(matches!(&tokens[1], TokenKind::DocBlock(s) if s == "/** doc */"));
        assert!(matches!(&tokens[2], TokenKind::Identifier(s) if s == "x"));
        assert!(matches!(tokens[3], TokenKind::Eof));
    }

    #[test]
    fn test_block_docs_attach_without_errors() {
        let output = tokenize("/** doc */\nx\n/**\n * @param {Real} a\n */\nfunction f(a) {}\n/**/ /* a * b */ y");
        assert!(output.errors.is_empty());
        let kinds: Vec<_> = output.tokens.iter().map(|t| &t.kind).collect();
        assert!(matches!(kinds[0], TokenKind::DocBlock(s) if s == "/** doc */"));
        assert!(matches!(kinds[1], TokenKind::Identifier(s) if s == "x"));
        assert!(matches!(kinds[2], TokenKind::DocBlock(s) if s.ends_with(" */") && s.contains("@param")));
        assert!(matches!(kinds[3], TokenKind::Function));
        assert!(!kinds.contains(&&TokenKind::Slash));
        assert!(matches!(kinds[kinds.len() - 2], TokenKind::Identifier(s) if s == "y"));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let output = tokenize("x /* never closed");
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].message, "unterminated block comment");
        assert_eq!(output.errors[0].span.end, 17);
    }

    #[test]
    fn test_docs_are_skipped_by_next_token() {
        let mut lexer = GmlLexer::new("/// first\nfoo /// second\nbar");
        let foo = lexer.next_token();
        assert!(matches!(&foo.kind, TokenKind::Identifier(s) if s == "foo"));
        let docs = lexer.take_docs_before(foo.span.start);
        assert_eq!(docs.len(), 1);
        let bar_start = lexer.peek().span.start;
        let docs = lexer.take_docs_before(bar_start);
        assert!(matches!(&docs[0].kind, TokenKind::DocLine(s) if s == "/// second"));
    }

    #[test]
    fn test_accessors_and_operators() {
        let tokens = kinds("a[$ b[? c[| d[# e[@ f ?? g ??= h");
        assert!(tokens.contains(&TokenKind::AccessorStruct));
        assert!(tokens.contains(&TokenKind::AccessorMap));
        assert!(tokens.contains(&TokenKind::AccessorList));
        assert!(tokens.contains(&TokenKind::AccessorGrid));
        assert!(tokens.contains(&TokenKind::AccessorArray));
        assert!(tokens.contains(&TokenKind::QuestionQuestion));
        assert!(tokens.contains(&TokenKind::QuestionQuestionEq));
    }
}
