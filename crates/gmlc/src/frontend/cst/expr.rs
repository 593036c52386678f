//! GML expression nodes

use super::{Block, DocComment, Ident};
use crate::common::Span;

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn error(span: Span) -> Self {
        Self::new(ExprKind::Error, span)
    }

    /// Strip any number of enclosing parentheses
    pub fn unparenthesized(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) => inner.unparenthesized(),
            _ => self,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Real literal in any notation: 10, 1.5, 0xFF, $FF, 0b101
    Real(String),
    /// String literal, raw text including its delimiters
    String(String),
    /// Template string: $"a{b}c"
    Template(Vec<TemplatePart>),
    Bool(bool),
    Undefined,
    /// pointer_null, pointer_invalid
    Pointer,

    Ident(Ident),
    /// self, other, global, noone, all
    Context(ContextKeyword),

    /// Array literal: [a, b]
    Array(Vec<Expr>),
    /// Struct literal: { a: 1, b }
    Struct(Vec<StructEntry>),
    /// Function expression, possibly a constructor
    Function(Box<FunctionExpr>),

    Call {
        callee: Box<Expr>,
        args: Vec<Arg>,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Arg>,
    },
    /// Dot access: a.b
    Member {
        object: Box<Expr>,
        property: Ident,
    },
    /// Indexing with any accessor: a[i], a[$ "k"], a[# x, y]
    Index {
        object: Box<Expr>,
        accessor: Accessor,
        indices: Vec<Expr>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// ++x, x--
    Update {
        op: UpdateOp,
        prefix: bool,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Paren(Box<Expr>),

    Error,
}

#[derive(Debug, Clone)]
pub enum TemplatePart {
    Text(String),
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKeyword {
    SelfKw,
    Other,
    Global,
    Noone,
    All,
}

impl ContextKeyword {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextKeyword::SelfKw => "self",
            ContextKeyword::Other => "other",
            ContextKeyword::Global => "global",
            ContextKeyword::Noone => "noone",
            ContextKeyword::All => "all",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "self" => ContextKeyword::SelfKw,
            "other" => ContextKeyword::Other,
            "global" => ContextKeyword::Global,
            "noone" => ContextKeyword::Noone,
            "all" => ContextKeyword::All,
            _ => return None,
        })
    }
}

/// One argument slot of a call; empty slots (`f(a,,b)`) have no expression
#[derive(Debug, Clone)]
pub struct Arg {
    pub expr: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StructEntry {
    pub key: Ident,
    /// `None` for the shorthand `{ a }`
    pub value: Option<Expr>,
    pub doc: Option<DocComment>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Ident,
    pub default: Option<Expr>,
    pub span: Span,
}

/// `: Parent(args)` inheritance clause of a constructor
#[derive(Debug, Clone)]
pub struct ParentCall {
    pub name: Ident,
    pub args: Vec<Arg>,
}

#[derive(Debug, Clone)]
pub struct FunctionExpr {
    pub name: Option<Ident>,
    pub params: Vec<Param>,
    /// Span from `(` to `)`, used for argument diagnostics
    pub params_span: Span,
    pub is_constructor: bool,
    pub parent: Option<ParentCall>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    /// a[i]
    Array,
    /// a[@ i]
    ArrayRef,
    /// a[$ "key"]
    Struct,
    /// a[? key]
    Map,
    /// a[| i]
    List,
    /// a[# x, y]
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// !x, not x
    Not,
    Neg,
    Plus,
    /// ~x
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    /// div
    IntDiv,
    /// % or mod
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Xor,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    /// ??
    Nullish,
}

impl BinOp {
    /// Operators whose result is a boolean regardless of operand types
    pub fn is_comparison_or_logical(self) -> bool {
        matches!(
            self,
            BinOp::Eq
                | BinOp::NotEq
                | BinOp::Lt
                | BinOp::LtEq
                | BinOp::Gt
                | BinOp::GtEq
                | BinOp::And
                | BinOp::Or
                | BinOp::Xor
        )
    }
}
