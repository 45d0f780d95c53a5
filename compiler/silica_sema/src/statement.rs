//! Bound procedural statements.

use silica_syntax::Span;

use crate::expression::Expression;
use crate::symbol::SymbolId;

/// A bound statement.
#[derive(Clone, Debug)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Statement { kind, span }
    }

    pub fn invalid(span: Span) -> Self {
        Statement::new(StatementKind::Invalid, span)
    }
}

/// Bound statement variants.
#[derive(Clone, Debug)]
pub enum StatementKind {
    Invalid,
    Block {
        /// The block symbol; a labeled block is a valid disable target.
        block: SymbolId,
        body: Vec<Statement>,
    },
    /// A local variable comes to life with its initializer (or the type's
    /// default) when execution reaches the declaration.
    VarDecl {
        symbol: SymbolId,
        init: Option<Expression>,
    },
    Expr(Expression),
    Return(Option<Expression>),
    If {
        cond: Expression,
        then_stmt: Box<Statement>,
        else_stmt: Option<Box<Statement>>,
    },
    For {
        init: Vec<Statement>,
        cond: Option<Expression>,
        steps: Vec<Expression>,
        body: Box<Statement>,
    },
    Disable {
        /// The resolved target: an enclosing named block or subroutine.
        target: SymbolId,
    },
}
