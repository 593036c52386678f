//! Statement-level parsing

use super::{ParseError, ParsedFile};
use crate::common::Span;
use crate::frontend::cst::*;
use crate::frontend::lexer::{GmlLexer, Token, TokenKind};
use std::mem::discriminant;

/// GML parser
pub struct GmlParser<'a> {
    pub(super) lexer: GmlLexer<'a>,
    pub(super) errors: Vec<ParseError>,
    /// End offset of the last consumed token
    pub(super) last_end: usize,
}

impl<'a> GmlParser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: GmlLexer::new(source),
            errors: Vec::new(),
            last_end: 0,
        }
    }

    /// Parse the whole file, collecting every lexing and syntax error
    pub fn parse_file(mut self) -> ParsedFile {
        let program = self.parse_program();
        let (lex_errors, unreliable_after) = self.lexer.take_errors();
        ParsedFile {
            program,
            lex_errors,
            parse_errors: self.errors,
            unreliable_after,
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut stmts = Vec::new();
        while !self.at(&TokenKind::Eof) {
            let before = self.peek().span.start;
            if let Some(stmt) = self.parse_stmt() {
                stmts.push(stmt);
            }
            if self.peek().span.start == before && !self.at(&TokenKind::Eof) {
                // Nothing was consumed; drop the token to guarantee progress
                let token = self.advance();
                self.error(format!("unexpected '{}'", token.kind), token.span);
            }
        }
        Program::new(stmts, Span::new(0, self.lexer.source().len()))
    }

    // ==================== Token helpers ====================

    pub(super) fn peek(&mut self) -> &Token {
        self.lexer.peek()
    }

    pub(super) fn peek_kind(&mut self) -> TokenKind {
        self.lexer.peek().kind.clone()
    }

    pub(super) fn peek_nth_kind(&mut self, n: usize) -> TokenKind {
        self.lexer.peek_at(n).kind.clone()
    }

    pub(super) fn at(&mut self, kind: &TokenKind) -> bool {
        discriminant(&self.peek().kind) == discriminant(kind)
    }

    pub(super) fn advance(&mut self) -> Token {
        let token = self.lexer.next_token();
        if token.kind != TokenKind::Eof {
            self.last_end = token.span.end;
        }
        token
    }

    pub(super) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the expected token or record an error without consuming
    pub(super) fn expect(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.at(kind) {
            return Some(self.advance());
        }
        let found = self.peek().clone();
        self.error(format!("expected '{kind}', found '{}'", found.kind), found.span);
        None
    }

    pub(super) fn expect_ident(&mut self) -> Option<Ident> {
        let token = self.peek().clone();
        match token.kind.name_like() {
            Some(name) => {
                self.advance();
                Some(Ident::new(name, token.span))
            }
            None => {
                self.error(format!("expected identifier, found '{}'", token.kind), token.span);
                None
            }
        }
    }

    pub(super) fn error(&mut self, message: impl Into<String>, span: Span) {
        let err = ParseError::new(message, span);
        tracing::trace!(message = %err.message, %span, "parse error");
        self.errors.push(err);
    }

    pub(super) fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.last_end.max(start))
    }

    /// Skip to a likely statement boundary after an error
    fn synchronize(&mut self) {
        loop {
            let kind = self.peek_kind();
            match kind {
                TokenKind::Eof | TokenKind::RBrace | TokenKind::End => return,
                TokenKind::Semi => {
                    self.advance();
                    return;
                }
                k if k.starts_statement() => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn take_doc(&mut self, before: usize) -> Option<DocComment> {
        let mut docs = self.lexer.take_docs_before(before);
        // Only comments between the previous token and this statement belong to it
        docs.retain(|doc| doc.span.start >= self.last_end);
        let first = docs.first()?.span.start;
        let last = docs.last()?.span.end;
        let text = docs
            .iter()
            .map(|doc| doc.kind.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Some(DocComment {
            text,
            span: Span::new(first, last),
        })
    }

    // ==================== Statements ====================

    /// Parse one statement; `None` for an empty statement
    pub(super) fn parse_stmt(&mut self) -> Option<Stmt> {
        let start = self.peek().span.start;
        let doc = self.take_doc(start);
        let kind = match self.peek_kind() {
            TokenKind::Semi => {
                self.advance();
                return None;
            }
            TokenKind::LBrace | TokenKind::Begin => StmtKind::Block(self.parse_block()),
            TokenKind::Var => {
                self.advance();
                match self.parse_declarators() {
                    decls if decls.is_empty() => StmtKind::Error,
                    decls => StmtKind::Var(decls),
                }
            }
            TokenKind::Static => {
                self.advance();
                match self.parse_declarators() {
                    decls if decls.is_empty() => StmtKind::Error,
                    decls => StmtKind::Static(decls),
                }
            }
            TokenKind::GlobalVar => self.parse_globalvar(),
            TokenKind::Function if self.peek_nth_kind(1).name_like().is_some() => {
                StmtKind::Function(self.parse_function())
            }
            TokenKind::Enum => self.parse_enum(),
            TokenKind::Macro => self.parse_macro(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => {
                self.advance();
                let condition = self.parse_expr();
                let body = self.parse_body();
                StmtKind::While { condition, body }
            }
            TokenKind::Repeat => {
                self.advance();
                let count = self.parse_expr();
                let body = self.parse_body();
                StmtKind::Repeat { count, body }
            }
            TokenKind::Do => {
                self.advance();
                let body = self.parse_body();
                self.expect(&TokenKind::Until);
                let condition = self.parse_expr();
                StmtKind::DoUntil { body, condition }
            }
            TokenKind::For => self.parse_for(),
            TokenKind::With => {
                self.advance();
                let target = self.parse_expr();
                let body = self.parse_body();
                StmtKind::With { target, body }
            }
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Return => {
                self.advance();
                let value = if self.at_stmt_end() { None } else { Some(self.parse_expr()) };
                StmtKind::Return(value)
            }
            TokenKind::Exit => {
                self.advance();
                StmtKind::Exit
            }
            TokenKind::Break => {
                self.advance();
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                StmtKind::Continue
            }
            TokenKind::Throw => {
                self.advance();
                StmtKind::Throw(self.parse_expr())
            }
            TokenKind::Delete => {
                self.advance();
                StmtKind::Delete(self.parse_expr())
            }
            _ => self.parse_simple_stmt(),
        };
        let failed = matches!(kind, StmtKind::Error);
        if failed {
            self.synchronize();
        } else {
            self.eat(&TokenKind::Semi);
        }
        let mut stmt = Stmt::new(kind, self.span_from(start));
        stmt.doc = doc;
        Some(stmt)
    }

    fn at_stmt_end(&mut self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Semi | TokenKind::RBrace | TokenKind::End | TokenKind::Eof
        ) || self.peek_kind().starts_statement()
    }

    /// Assignment or expression statement
    fn parse_simple_stmt(&mut self) -> StmtKind {
        let target = self.parse_unary();
        if matches!(target.kind, ExprKind::Error) {
            return StmtKind::Error;
        }
        if let Some(op) = self.assign_op() {
            self.advance();
            let value = self.parse_expr();
            return StmtKind::Assign { target, op, value };
        }
        let expr = self.parse_expr_rest(target);
        StmtKind::Expr(expr)
    }

    fn assign_op(&mut self) -> Option<AssignOp> {
        Some(match self.peek_kind() {
            TokenKind::Eq | TokenKind::ColonEq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::Add,
            TokenKind::MinusEq => AssignOp::Sub,
            TokenKind::StarEq => AssignOp::Mul,
            TokenKind::SlashEq => AssignOp::Div,
            TokenKind::PercentEq => AssignOp::Mod,
            TokenKind::AmpEq => AssignOp::BitAnd,
            TokenKind::PipeEq => AssignOp::BitOr,
            TokenKind::CaretEq => AssignOp::BitXor,
            TokenKind::QuestionQuestionEq => AssignOp::Nullish,
            _ => return None,
        })
    }

    pub(super) fn parse_block(&mut self) -> Block {
        let start = self.peek().span.start;
        let close = if self.eat(&TokenKind::Begin) {
            TokenKind::End
        } else {
            self.expect(&TokenKind::LBrace);
            TokenKind::RBrace
        };
        let mut stmts = Vec::new();
        while !self.at(&close) && !self.at(&TokenKind::Eof) {
            let before = self.peek().span.start;
            if let Some(stmt) = self.parse_stmt() {
                stmts.push(stmt);
            }
            if self.peek().span.start == before && !self.at(&close) && !self.at(&TokenKind::Eof) {
                let token = self.advance();
                self.error(format!("unexpected '{}'", token.kind), token.span);
            }
        }
        self.expect(&close);
        Block::new(stmts, self.span_from(start))
    }

    /// Body of a control-flow statement
    fn parse_body(&mut self) -> Box<Stmt> {
        let start = self.peek().span.start;
        let stmt = self.parse_stmt().unwrap_or_else(|| {
            let span = self.span_from(start);
            Stmt::new(StmtKind::Block(Block::new(Vec::new(), span)), span)
        });
        Box::new(stmt)
    }

    fn parse_declarators(&mut self) -> Vec<Declarator> {
        let mut declarators = Vec::new();
        loop {
            let Some(name) = self.expect_ident() else { break };
            let init = if self.eat(&TokenKind::Eq) || self.eat(&TokenKind::ColonEq) {
                Some(self.parse_expr())
            } else {
                None
            };
            declarators.push(Declarator { name, init });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        declarators
    }

    fn parse_globalvar(&mut self) -> StmtKind {
        self.advance();
        let mut names = Vec::new();
        loop {
            let Some(name) = self.expect_ident() else { break };
            names.push(name);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        if names.is_empty() {
            StmtKind::Error
        } else {
            StmtKind::GlobalVar(names)
        }
    }

    /// `function name? (params) [: Parent(args)] [constructor] { body }`
    pub(super) fn parse_function(&mut self) -> FunctionExpr {
        let start = self.peek().span.start;
        self.expect(&TokenKind::Function);
        let name = if self.peek().kind.name_like().is_some() {
            self.expect_ident()
        } else {
            None
        };

        let params_start = self.peek().span.start;
        let mut params = Vec::new();
        if self.expect(&TokenKind::LParen).is_some() {
            while !self.at(&TokenKind::RParen) && !self.at(&TokenKind::Eof) {
                let param_start = self.peek().span.start;
                let Some(name) = self.expect_ident() else { break };
                let default = if self.eat(&TokenKind::Eq) {
                    Some(self.parse_expr())
                } else {
                    None
                };
                params.push(Param {
                    name,
                    default,
                    span: self.span_from(param_start),
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen);
        }
        let params_span = self.span_from(params_start);

        let parent = if self.eat(&TokenKind::Colon) {
            self.expect_ident().map(|name| {
                let args = if self.at(&TokenKind::LParen) {
                    self.parse_args()
                } else {
                    Vec::new()
                };
                ParentCall { name, args }
            })
        } else {
            None
        };
        let is_constructor = self.eat(&TokenKind::Constructor);
        let body = self.parse_block();

        FunctionExpr {
            name,
            params,
            params_span,
            is_constructor,
            parent,
            body,
            span: self.span_from(start),
        }
    }

    fn parse_enum(&mut self) -> StmtKind {
        self.advance();
        let Some(name) = self.expect_ident() else {
            return StmtKind::Error;
        };
        let mut members = Vec::new();
        if self.expect(&TokenKind::LBrace).is_some() {
            while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
                let Some(member) = self.expect_ident() else { break };
                let value = if self.eat(&TokenKind::Eq) {
                    Some(self.parse_expr())
                } else {
                    None
                };
                members.push(EnumMember { name: member, value });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RBrace);
        }
        StmtKind::Enum(EnumDecl { name, members })
    }

    fn parse_macro(&mut self) -> StmtKind {
        self.advance();
        let Some(first) = self.expect_ident() else {
            return StmtKind::Error;
        };
        let (config, name) = if self.eat(&TokenKind::Colon) {
            match self.expect_ident() {
                Some(name) => (Some(first), name),
                None => return StmtKind::Error,
            }
        } else {
            (None, first)
        };
        let value = if self.at_stmt_end() { None } else { Some(self.parse_expr()) };
        StmtKind::Macro(MacroDecl { name, config, value })
    }

    fn parse_if(&mut self) -> StmtKind {
        self.advance();
        let condition = self.parse_expr();
        self.eat(&TokenKind::Then);
        let then_branch = self.parse_body();
        let else_branch = if self.eat(&TokenKind::Else) {
            Some(self.parse_body())
        } else {
            None
        };
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        }
    }

    fn parse_for(&mut self) -> StmtKind {
        self.advance();
        self.expect(&TokenKind::LParen);
        let init = if self.at(&TokenKind::Semi) {
            None
        } else {
            self.parse_for_clause()
        };
        self.expect(&TokenKind::Semi);
        let condition = if self.at(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr())
        };
        self.expect(&TokenKind::Semi);
        let update = if self.at(&TokenKind::RParen) {
            None
        } else {
            self.parse_for_clause()
        };
        self.expect(&TokenKind::RParen);
        let body = self.parse_body();
        StmtKind::For {
            init,
            condition,
            update,
            body,
        }
    }

    /// A `for` header clause: a declaration or assignment without its `;`
    fn parse_for_clause(&mut self) -> Option<Box<Stmt>> {
        let start = self.peek().span.start;
        let kind = if self.eat(&TokenKind::Var) {
            StmtKind::Var(self.parse_declarators())
        } else {
            self.parse_simple_stmt()
        };
        Some(Box::new(Stmt::new(kind, self.span_from(start))))
    }

    fn parse_switch(&mut self) -> StmtKind {
        self.advance();
        let discriminant = self.parse_expr();
        let mut cases = Vec::new();
        if self.expect(&TokenKind::LBrace).is_none() {
            return StmtKind::Switch { discriminant, cases };
        }
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            let case_start = self.peek().span.start;
            let test = if self.eat(&TokenKind::Case) {
                Some(self.parse_expr())
            } else if self.eat(&TokenKind::Default) {
                None
            } else {
                let token = self.advance();
                self.error(format!("expected 'case' or 'default', found '{}'", token.kind), token.span);
                continue;
            };
            self.expect(&TokenKind::Colon);
            let mut body = Vec::new();
            while !matches!(
                self.peek_kind(),
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
            ) {
                let before = self.peek().span.start;
                if let Some(stmt) = self.parse_stmt() {
                    body.push(stmt);
                }
                if self.peek().span.start == before {
                    break;
                }
            }
            cases.push(SwitchCase {
                test,
                body,
                span: self.span_from(case_start),
            });
        }
        self.expect(&TokenKind::RBrace);
        StmtKind::Switch { discriminant, cases }
    }

    fn parse_try(&mut self) -> StmtKind {
        self.advance();
        let body = self.parse_block();
        let catch = if self.eat(&TokenKind::Catch) {
            let param = if self.eat(&TokenKind::LParen) {
                let param = self.expect_ident();
                self.expect(&TokenKind::RParen);
                param
            } else {
                None
            };
            Some(CatchClause {
                param,
                body: self.parse_block(),
            })
        } else {
            None
        };
        let finally = if self.eat(&TokenKind::Finally) {
            Some(self.parse_block())
        } else {
            None
        };
        StmtKind::Try { body, catch, finally }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::parse;

    fn parse_ok(source: &str) -> Program {
        let parsed = parse(source);
        assert!(parsed.parse_errors.is_empty(), "{:?}", parsed.parse_errors);
        assert!(parsed.lex_errors.is_empty(), "{:?}", parsed.lex_errors);
        parsed.program
    }

    #[test]
    fn test_var_and_assignment() {
        let program = parse_ok("var x = 10; x = \"hi\";");
        assert_eq!(program.stmts.len(), 2);
        match &program.stmts[0].kind {
            StmtKind::Var(decls) => {
                assert_eq!(decls[0].name.name, "x");
                assert!(matches!(decls[0].init.as_ref().map(|e| &e.kind), Some(ExprKind::Real(s)) if s == "10"));
            }
            other => panic!("expected var, got {other:?}"),
        }
        assert!(matches!(
            &program.stmts[1].kind,
            StmtKind::Assign { op: AssignOp::Assign, value, .. } if matches!(value.kind, ExprKind::String(_))
        ));
    }

    #[test]
    fn test_equality_inside_expressions() {
        let program = parse_ok("if a = 1 { b = a = 2; }");
        let StmtKind::If { condition, then_branch, .. } = &program.stmts[0].kind else {
            panic!("expected if");
        };
        assert!(matches!(condition.kind, ExprKind::Binary { op: BinOp::Eq, .. }));
        let StmtKind::Block(block) = &then_branch.kind else {
            panic!("expected block");
        };
        assert!(matches!(
            &block.stmts[0].kind,
            StmtKind::Assign { value, .. } if matches!(value.kind, ExprKind::Binary { op: BinOp::Eq, .. })
        ));
    }

    #[test]
    fn test_function_declaration_and_constructor() {
        let program = parse_ok(
            "function Base(a) constructor { x = a; }\nfunction Child(a, b = 2) : Base(a) constructor { y = b; }",
        );
        let StmtKind::Function(child) = &program.stmts[1].kind else {
            panic!("expected function");
        };
        assert_eq!(child.name.as_ref().map(|n| n.name.as_str()), Some("Child"));
        assert_eq!(child.params.len(), 2);
        assert!(child.params[1].default.is_some());
        assert!(child.is_constructor);
        assert_eq!(child.parent.as_ref().map(|p| p.name.name.as_str()), Some("Base"));
    }

    #[test]
    fn test_control_flow() {
        let program = parse_ok(
            "for (var i = 0; i < 10; i++) { repeat 3 foo(); }\n\
             while (true) break;\n\
             do { x += 1; } until x > 3;\n\
             with (obj_player) { hp -= 1; }\n\
             switch (state) { case 1: a(); break; default: b(); }\n\
             try { risky(); } catch (e) { show_debug_message(e); } finally { done(); }",
        );
        assert!(matches!(program.stmts[0].kind, StmtKind::For { .. }));
        assert!(matches!(program.stmts[1].kind, StmtKind::While { .. }));
        assert!(matches!(program.stmts[2].kind, StmtKind::DoUntil { .. }));
        assert!(matches!(program.stmts[3].kind, StmtKind::With { .. }));
        let StmtKind::Switch { cases, .. } = &program.stmts[4].kind else {
            panic!("expected switch");
        };
        assert_eq!(cases.len(), 2);
        assert!(cases[1].test.is_none());
        assert!(matches!(program.stmts[5].kind, StmtKind::Try { catch: Some(_), finally: Some(_), .. }));
    }

    #[test]
    fn test_enum_macro_globalvar() {
        let program = parse_ok("enum Color { red, green = 5, blue }\n#macro MAX_HP 100\nglobalvar G, H;");
        let StmtKind::Enum(decl) = &program.stmts[0].kind else {
            panic!("expected enum");
        };
        assert_eq!(decl.members.len(), 3);
        assert!(matches!(&program.stmts[1].kind, StmtKind::Macro(m) if m.name.name == "MAX_HP"));
        assert!(matches!(&program.stmts[2].kind, StmtKind::GlobalVar(names) if names.len() == 2));
    }

    #[test]
    fn test_doc_comments_attach_to_statements() {
        let program = parse_ok("/// @param {Real} a\n/// @returns {Real}\nfunction double(a) { return a * 2; }");
        let doc = program.stmts[0].doc.as_ref().expect("doc comment");
        assert_eq!(doc.text, "/// @param {Real} a\n/// @returns {Real}");
    }

    #[test]
    fn test_recovers_after_errors() {
        let parsed = parse("var = 5;\nvar ok = 1;\nfoo(;\nbar = 2;");
        assert!(!parsed.parse_errors.is_empty());
        let names: Vec<_> = parsed
            .program
            .stmts
            .iter()
            .filter_map(|stmt| match &stmt.kind {
                StmtKind::Var(decls) => decls.first().map(|d| d.name.name.clone()),
                StmtKind::Assign { target, .. } => match &target.kind {
                    ExprKind::Ident(ident) => Some(ident.name.clone()),
                    _ => None,
                },
                _ => None,
            })
            .collect();
        assert!(names.contains(&"ok".to_string()));
        assert!(names.contains(&"bar".to_string()));
    }
}
