//! Procedural statement syntax nodes.

use crate::{Name, Span};

use super::decl::VarDeclSyntax;
use super::expr::ExprSyntax;

/// A statement syntax node.
#[derive(Clone, Debug)]
pub struct StmtSyntax {
    pub kind: StmtSyntaxKind,
    pub span: Span,
}

/// Statement syntax variants.
#[derive(Clone, Debug)]
pub enum StmtSyntaxKind {
    /// A begin/end block, optionally labeled.
    Block {
        label: Option<Name>,
        body: Vec<StmtSyntax>,
    },
    /// A local variable declaration statement.
    VarDecl(VarDeclSyntax),
    /// An expression statement (usually an assignment or call).
    Expr(ExprSyntax),
    /// A return statement with optional value.
    Return(Option<ExprSyntax>),
    If {
        cond: ExprSyntax,
        then_stmt: Box<StmtSyntax>,
        else_stmt: Option<Box<StmtSyntax>>,
    },
    For {
        init: Vec<StmtSyntax>,
        cond: Option<ExprSyntax>,
        steps: Vec<ExprSyntax>,
        body: Box<StmtSyntax>,
    },
    /// A disable statement targeting a named block or task.
    Disable { target: Name, target_span: Span },
}

impl StmtSyntax {
    pub fn new(kind: StmtSyntaxKind, span: Span) -> Self {
        StmtSyntax { kind, span }
    }

    pub fn expr(expr: ExprSyntax) -> Self {
        let span = expr.span;
        StmtSyntax::new(StmtSyntaxKind::Expr(expr), span)
    }

    pub fn ret(expr: Option<ExprSyntax>, span: Span) -> Self {
        StmtSyntax::new(StmtSyntaxKind::Return(expr), span)
    }
}
