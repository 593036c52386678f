//! GML statement nodes

use super::{DocComment, Expr, FunctionExpr, Ident};
use crate::common::Span;

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
    /// Doc comment written directly above the statement
    pub doc: Option<DocComment>,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span, doc: None }
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Self { stmts, span }
    }
}

/// `name = init` inside `var` or `static`
#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: Ident,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: Ident,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: Ident,
    pub members: Vec<EnumMember>,
}

/// `#macro [config:]NAME value`
#[derive(Debug, Clone)]
pub struct MacroDecl {
    pub name: Ident,
    pub config: Option<Ident>,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// `None` for `default`
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub param: Option<Ident>,
    pub body: Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    /// ??=
    Nullish,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Var(Vec<Declarator>),
    GlobalVar(Vec<Ident>),
    Static(Vec<Declarator>),
    /// Named function declaration
    Function(FunctionExpr),
    Enum(EnumDecl),
    Macro(MacroDecl),
    Assign {
        target: Expr,
        op: AssignOp,
        value: Expr,
    },
    Expr(Expr),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Repeat {
        count: Expr,
        body: Box<Stmt>,
    },
    DoUntil {
        body: Box<Stmt>,
        condition: Expr,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        update: Option<Box<Stmt>>,
        body: Box<Stmt>,
    },
    With {
        target: Expr,
        body: Box<Stmt>,
    },
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    Try {
        body: Block,
        catch: Option<CatchClause>,
        finally: Option<Block>,
    },
    Return(Option<Expr>),
    Exit,
    Break,
    Continue,
    Throw(Expr),
    Delete(Expr),
    Block(Block),
    Error,
}
