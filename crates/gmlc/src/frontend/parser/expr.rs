//! Expression parsing
//!
//! Binary operators are parsed by precedence climbing. Inside expressions a
//! single `=` is equality; assignment is only recognized at statement level.

use super::GmlParser;
use crate::common::Span;
use crate::frontend::cst::*;
use crate::frontend::lexer::TokenKind;

/// Binding power of a binary operator token, loosest first
fn binary_op(kind: &TokenKind) -> Option<(BinOp, u8)> {
    Some(match kind {
        TokenKind::QuestionQuestion => (BinOp::Nullish, 1),
        TokenKind::PipePipe | TokenKind::Or => (BinOp::Or, 2),
        TokenKind::CaretCaret | TokenKind::Xor => (BinOp::Xor, 3),
        TokenKind::AmpAmp | TokenKind::And => (BinOp::And, 4),
        TokenKind::EqEq | TokenKind::Eq => (BinOp::Eq, 5),
        TokenKind::NotEq | TokenKind::LtGt => (BinOp::NotEq, 5),
        TokenKind::Lt => (BinOp::Lt, 6),
        TokenKind::LtEq => (BinOp::LtEq, 6),
        TokenKind::Gt => (BinOp::Gt, 6),
        TokenKind::GtEq => (BinOp::GtEq, 6),
        TokenKind::Pipe => (BinOp::BitOr, 7),
        TokenKind::Caret => (BinOp::BitXor, 8),
        TokenKind::Amp => (BinOp::BitAnd, 9),
        TokenKind::Shl => (BinOp::Shl, 10),
        TokenKind::Shr => (BinOp::Shr, 10),
        TokenKind::Plus => (BinOp::Add, 11),
        TokenKind::Minus => (BinOp::Sub, 11),
        TokenKind::Star => (BinOp::Mul, 12),
        TokenKind::Slash => (BinOp::Div, 12),
        TokenKind::Percent | TokenKind::Mod => (BinOp::Mod, 12),
        TokenKind::Div => (BinOp::IntDiv, 12),
        _ => return None,
    })
}

fn accessor(kind: &TokenKind) -> Option<Accessor> {
    Some(match kind {
        TokenKind::LBracket => Accessor::Array,
        TokenKind::AccessorArray => Accessor::ArrayRef,
        TokenKind::AccessorStruct => Accessor::Struct,
        TokenKind::AccessorMap => Accessor::Map,
        TokenKind::AccessorList => Accessor::List,
        TokenKind::AccessorGrid => Accessor::Grid,
        _ => return None,
    })
}

impl GmlParser<'_> {
    pub(super) fn parse_expr(&mut self) -> Expr {
        let lhs = self.parse_unary();
        self.parse_expr_rest(lhs)
    }

    /// Continue an expression whose leftmost operand is already parsed
    pub(super) fn parse_expr_rest(&mut self, lhs: Expr) -> Expr {
        let condition = self.parse_binary_rhs(lhs, 0);
        if !self.eat(&TokenKind::Question) {
            return condition;
        }
        let then_branch = self.parse_expr();
        self.expect(&TokenKind::Colon);
        let else_branch = self.parse_expr();
        let span = condition.span.merge(else_branch.span);
        Expr::new(
            ExprKind::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            span,
        )
    }

    fn parse_binary_rhs(&mut self, mut lhs: Expr, min_power: u8) -> Expr {
        loop {
            let Some((op, power)) = binary_op(&self.peek_kind()) else {
                return lhs;
            };
            if power <= min_power {
                return lhs;
            }
            self.advance();
            let mut rhs = self.parse_unary();
            while let Some((_, next)) = binary_op(&self.peek_kind()) {
                if next <= power {
                    break;
                }
                rhs = self.parse_binary_rhs(rhs, power);
            }
            let span = lhs.span.merge(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                span,
            );
        }
    }

    pub(super) fn parse_unary(&mut self) -> Expr {
        let start = self.peek().span.start;
        let op = match self.peek_kind() {
            TokenKind::Bang | TokenKind::Not => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.advance().kind == TokenKind::PlusPlus {
                    UpdateOp::Increment
                } else {
                    UpdateOp::Decrement
                };
                let operand = self.parse_unary();
                return Expr::new(
                    ExprKind::Update {
                        op,
                        prefix: true,
                        operand: Box::new(operand),
                    },
                    self.span_from(start),
                );
            }
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary();
        Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            self.span_from(start),
        )
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        if matches!(expr.kind, ExprKind::Error) {
            return expr;
        }
        loop {
            let kind = self.peek_kind();
            if let Some(accessor) = accessor(&kind) {
                self.advance();
                let indices = self.parse_list(&TokenKind::RBracket);
                expr = Expr::new(
                    ExprKind::Index {
                        object: Box::new(expr),
                        accessor,
                        indices,
                    },
                    Span::default(),
                );
            } else {
                match kind {
                    TokenKind::LParen => {
                        let args = self.parse_args();
                        expr = Expr::new(
                            ExprKind::Call {
                                callee: Box::new(expr),
                                args,
                            },
                            Span::default(),
                        );
                    }
                    TokenKind::Dot => {
                        self.advance();
                        let Some(property) = self.expect_ident() else {
                            return expr;
                        };
                        expr = Expr::new(
                            ExprKind::Member {
                                object: Box::new(expr),
                                property,
                            },
                            Span::default(),
                        );
                    }
                    TokenKind::PlusPlus | TokenKind::MinusMinus => {
                        let op = if self.advance().kind == TokenKind::PlusPlus {
                            UpdateOp::Increment
                        } else {
                            UpdateOp::Decrement
                        };
                        expr = Expr::new(
                            ExprKind::Update {
                                op,
                                prefix: false,
                                operand: Box::new(expr),
                            },
                            Span::default(),
                        );
                    }
                    _ => return expr,
                }
            }
            fix_postfix_span(&mut expr, self.last_end);
        }
    }

    fn parse_primary(&mut self) -> Expr {
        let token = self.peek().clone();
        let start = token.span.start;
        let kind = match token.kind {
            TokenKind::RealLiteral(text) | TokenKind::HexLiteral(text) | TokenKind::BinaryLiteral(text) => {
                self.advance();
                ExprKind::Real(text)
            }
            TokenKind::StringLiteral(text) => {
                self.advance();
                ExprKind::String(text)
            }
            TokenKind::TemplateStart => {
                self.advance();
                ExprKind::Template(self.parse_template())
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Undefined => {
                self.advance();
                ExprKind::Undefined
            }
            TokenKind::PointerNull | TokenKind::PointerInvalid => {
                self.advance();
                ExprKind::Pointer
            }
            kind @ (TokenKind::SelfKw | TokenKind::Other | TokenKind::Global | TokenKind::Noone | TokenKind::All) => {
                self.advance();
                match ContextKeyword::from_name(&kind.to_string()) {
                    Some(keyword) => ExprKind::Context(keyword),
                    None => ExprKind::Error,
                }
            }
            TokenKind::Identifier(name) => {
                self.advance();
                ExprKind::Ident(Ident::new(name, token.span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect(&TokenKind::RParen);
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::LBracket => {
                self.advance();
                ExprKind::Array(self.parse_list(&TokenKind::RBracket))
            }
            TokenKind::LBrace => ExprKind::Struct(self.parse_struct()),
            TokenKind::Function => ExprKind::Function(Box::new(self.parse_function())),
            TokenKind::New => {
                self.advance();
                let callee = self.parse_new_callee();
                let args = if self.at(&TokenKind::LParen) {
                    self.parse_args()
                } else {
                    Vec::new()
                };
                ExprKind::New {
                    callee: Box::new(callee),
                    args,
                }
            }
            other => {
                self.error(format!("expected expression, found '{other}'"), token.span);
                return Expr::error(Span::point(start));
            }
        };
        Expr::new(kind, self.span_from(start))
    }

    /// Constructor reference after `new`: a name with optional dotted access
    fn parse_new_callee(&mut self) -> Expr {
        let start = self.peek().span.start;
        let Some(name) = self.expect_ident() else {
            return Expr::error(Span::point(start));
        };
        let mut callee = Expr::new(ExprKind::Ident(name.clone()), name.span);
        while self.eat(&TokenKind::Dot) {
            let Some(property) = self.expect_ident() else { break };
            callee = Expr::new(
                ExprKind::Member {
                    object: Box::new(callee),
                    property,
                },
                self.span_from(start),
            );
        }
        callee
    }

    /// Call arguments, keeping empty slots such as `f(a,,b)`
    pub(super) fn parse_args(&mut self) -> Vec<Arg> {
        let mut args = Vec::new();
        if self.expect(&TokenKind::LParen).is_none() || self.eat(&TokenKind::RParen) {
            return args;
        }
        loop {
            let start = self.peek().span.start;
            if self.at(&TokenKind::Comma) || self.at(&TokenKind::RParen) {
                args.push(Arg {
                    expr: None,
                    span: Span::point(start),
                });
            } else {
                let expr = self.parse_expr();
                let failed = matches!(expr.kind, ExprKind::Error);
                args.push(Arg {
                    span: expr.span,
                    expr: Some(expr),
                });
                if failed {
                    break;
                }
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen);
        args
    }

    /// Comma separated expressions up to `close`, allowing a trailing comma
    fn parse_list(&mut self, close: &TokenKind) -> Vec<Expr> {
        let mut items = Vec::new();
        while !self.at(close) && !self.at(&TokenKind::Eof) {
            let item = self.parse_expr();
            let failed = matches!(item.kind, ExprKind::Error);
            items.push(item);
            if failed || !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(close);
        items
    }

    fn parse_struct(&mut self) -> Vec<StructEntry> {
        self.advance();
        let mut entries = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            let start = self.peek().span.start;
            let doc = self.take_struct_doc(start);
            let Some(key) = self.expect_ident() else { break };
            let value = if self.eat(&TokenKind::Colon) {
                Some(self.parse_expr())
            } else {
                None
            };
            entries.push(StructEntry {
                key,
                value,
                doc,
                span: self.span_from(start),
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace);
        entries
    }

    fn take_struct_doc(&mut self, before: usize) -> Option<DocComment> {
        let docs = self.lexer.take_docs_before(before);
        let doc = docs.iter().rev().find(|doc| doc.span.start >= self.last_end)?;
        Some(DocComment {
            text: doc.kind.to_string(),
            span: doc.span,
        })
    }

    fn parse_template(&mut self) -> Vec<TemplatePart> {
        let mut parts = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::TemplateText(text) => {
                    self.advance();
                    parts.push(TemplatePart::Text(text));
                }
                TokenKind::InterpolationStart => {
                    self.advance();
                    let expr = self.parse_expr();
                    parts.push(TemplatePart::Expr(expr));
                    self.expect(&TokenKind::InterpolationEnd);
                }
                TokenKind::TemplateEnd => {
                    self.advance();
                    return parts;
                }
                other => {
                    let span = self.peek().span;
                    self.error(format!("unexpected '{other}' in template string"), span);
                    return parts;
                }
            }
        }
    }
}

/// Postfix nodes are built before their end is known
fn fix_postfix_span(expr: &mut Expr, end: usize) {
    let start = match &expr.kind {
        ExprKind::Call { callee: inner, .. }
        | ExprKind::Member { object: inner, .. }
        | ExprKind::Index { object: inner, .. }
        | ExprKind::Update { operand: inner, .. } => inner.span.start,
        _ => return,
    };
    expr.span = Span::new(start, end.max(start));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::parse;
    use pretty_assertions::assert_eq;

    fn expr(source: &str) -> Expr {
        let parsed = parse(&format!("x = {source};"));
        assert!(parsed.parse_errors.is_empty(), "{:?}", parsed.parse_errors);
        match parsed.program.stmts.into_iter().next().map(|stmt| stmt.kind) {
            Some(StmtKind::Assign { value, .. }) => value,
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        let e = expr("1 + 2 * 3");
        let ExprKind::Binary { op: BinOp::Add, right, .. } = e.kind else {
            panic!("expected addition");
        };
        assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Mul, .. }));

        let e = expr("a || b && c");
        let ExprKind::Binary { op: BinOp::Or, right, .. } = e.kind else {
            panic!("expected or");
        };
        assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::And, .. }));

        let e = expr("a - b - c");
        let ExprKind::Binary { op: BinOp::Sub, left, .. } = e.kind else {
            panic!("expected subtraction");
        };
        assert!(matches!(left.kind, ExprKind::Binary { op: BinOp::Sub, .. }));
    }

    #[test]
    fn test_ternary_and_nullish() {
        let e = expr("a ?? b ? 1 : 2");
        let ExprKind::Ternary { condition, .. } = e.kind else {
            panic!("expected ternary");
        };
        assert!(matches!(condition.kind, ExprKind::Binary { op: BinOp::Nullish, .. }));
    }

    #[test]
    fn test_postfix_chain() {
        let e = expr("a.b[0].c(1, , 3)");
        let ExprKind::Call { callee, args } = e.kind else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 3);
        assert!(args[1].expr.is_none());
        let ExprKind::Member { object, property } = callee.kind else {
            panic!("expected member");
        };
        assert_eq!(property.name, "c");
        assert!(matches!(object.kind, ExprKind::Index { accessor: Accessor::Array, .. }));
    }

    #[test]
    fn test_postfix_span_covers_chain() {
        let source = "x = foo.bar(1);";
        let parsed = parse(source);
        let Some(StmtKind::Assign { value, .. }) = parsed.program.stmts.first().map(|s| &s.kind) else {
            panic!("expected assignment");
        };
        assert_eq!(value.span.slice(source), "foo.bar(1)");
    }

    #[test]
    fn test_accessors() {
        let e = expr("grid[# 1, 2]");
        let ExprKind::Index { accessor, indices, .. } = e.kind else {
            panic!("expected index");
        };
        assert_eq!(accessor, Accessor::Grid);
        assert_eq!(indices.len(), 2);
        assert!(matches!(expr("m[? \"k\"]").kind, ExprKind::Index { accessor: Accessor::Map, .. }));
        assert!(matches!(expr("s[$ \"k\"]").kind, ExprKind::Index { accessor: Accessor::Struct, .. }));
    }

    #[test]
    fn test_literals() {
        assert!(matches!(expr("[1, \"a\",]").kind, ExprKind::Array(items) if items.len() == 2));
        let e = expr("{ a: 1, b }");
        let ExprKind::Struct(entries) = e.kind else {
            panic!("expected struct");
        };
        assert_eq!(entries.len(), 2);
        assert!(entries[1].value.is_none());
        assert!(matches!(expr("function(a) { return a; }").kind, ExprKind::Function(_)));
        assert!(matches!(expr("new Vec2(1, 2)").kind, ExprKind::New { .. }));
        assert!(matches!(expr("global").kind, ExprKind::Context(ContextKeyword::Global)));
    }

    #[test]
    fn test_template_parts() {
        let e = expr("$\"hp: {hp}!\"");
        let ExprKind::Template(parts) = e.kind else {
            panic!("expected template");
        };
        assert_eq!(parts.len(), 3);
        assert!(matches!(&parts[1], TemplatePart::Expr(inner) if matches!(inner.kind, ExprKind::Ident(_))));
    }

    #[test]
    fn test_unary_and_update() {
        assert!(matches!(expr("-a").kind, ExprKind::Unary { op: UnaryOp::Neg, .. }));
        assert!(matches!(expr("not a").kind, ExprKind::Unary { op: UnaryOp::Not, .. }));
        assert!(matches!(expr("a++").kind, ExprKind::Update { prefix: false, .. }));
        assert!(matches!(expr("--a").kind, ExprKind::Update { prefix: true, op: UpdateOp::Decrement, .. }));
    }
}
