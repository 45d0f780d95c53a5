//! Expression syntax nodes.

use crate::{Name, Span};

use super::ty::DataTypeSyntax;

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOpSyntax {
    Plus,
    Minus,
    LogicalNot,
    BitwiseNot,
}

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOpSyntax {
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
    ShiftLeft,
    ShiftRight,
    Equality,
    Inequality,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    LogicalAnd,
    LogicalOr,
    BinaryAnd,
    BinaryOr,
    BinaryXor,
}

impl BinaryOpSyntax {
    /// Check whether the operator produces a 1-bit result regardless of
    /// operand widths (comparisons and logical connectives).
    pub fn is_predicate(self) -> bool {
        matches!(
            self,
            BinaryOpSyntax::Equality
                | BinaryOpSyntax::Inequality
                | BinaryOpSyntax::LessThan
                | BinaryOpSyntax::LessThanEqual
                | BinaryOpSyntax::GreaterThan
                | BinaryOpSyntax::GreaterThanEqual
                | BinaryOpSyntax::LogicalAnd
                | BinaryOpSyntax::LogicalOr
        )
    }
}

/// An expression syntax node.
#[derive(Clone, Debug)]
pub struct ExprSyntax {
    pub kind: ExprSyntaxKind,
    pub span: Span,
}

/// Expression syntax variants.
#[derive(Clone, Debug)]
pub enum ExprSyntaxKind {
    /// Integer literal. Unsized literals arrive as 32-bit signed.
    IntegerLiteral {
        value: u64,
        width: u32,
        signed: bool,
    },
    /// Real literal.
    RealLiteral(f64),
    /// String literal.
    StringLiteral(String),
    /// The `null` class-handle literal.
    NullLiteral,
    /// A bare identifier reference.
    Identifier(Name),
    /// A dotted hierarchical path reaching outside the current scope chain.
    HierarchicalName(Vec<Name>),
    Unary {
        op: UnaryOpSyntax,
        operand: Box<ExprSyntax>,
    },
    Binary {
        op: BinaryOpSyntax,
        lhs: Box<ExprSyntax>,
        rhs: Box<ExprSyntax>,
    },
    Conditional {
        cond: Box<ExprSyntax>,
        then_expr: Box<ExprSyntax>,
        else_expr: Box<ExprSyntax>,
    },
    ElementSelect {
        value: Box<ExprSyntax>,
        index: Box<ExprSyntax>,
    },
    MemberAccess {
        value: Box<ExprSyntax>,
        member: Name,
        member_span: Span,
    },
    /// A subroutine invocation, possibly with an array-method `with` clause.
    Call {
        callee: Box<ExprSyntax>,
        args: Vec<ArgSyntax>,
        with_clause: Option<Box<WithClauseSyntax>>,
    },
    Assignment {
        target: Box<ExprSyntax>,
        value: Box<ExprSyntax>,
        nonblocking: bool,
    },
    /// An explicit cast: `ty'(operand)`.
    Cast {
        ty: Box<DataTypeSyntax>,
        operand: Box<ExprSyntax>,
    },
    /// A data type used in expression position (e.g. `$bits(int)`).
    DataType(Box<DataTypeSyntax>),
}

impl ExprSyntax {
    pub fn new(kind: ExprSyntaxKind, span: Span) -> Self {
        ExprSyntax { kind, span }
    }

    /// Unsized decimal literal: 32-bit signed, like `5`.
    pub fn int(value: i32, span: Span) -> Self {
        ExprSyntax::new(
            ExprSyntaxKind::IntegerLiteral {
                value: value as u32 as u64,
                width: 32,
                signed: true,
            },
            span,
        )
    }

    pub fn ident(name: Name, span: Span) -> Self {
        ExprSyntax::new(ExprSyntaxKind::Identifier(name), span)
    }

    pub fn binary(op: BinaryOpSyntax, lhs: ExprSyntax, rhs: ExprSyntax) -> Self {
        let span = lhs.span.merge(rhs.span);
        ExprSyntax::new(
            ExprSyntaxKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    pub fn call(callee: ExprSyntax, args: Vec<ArgSyntax>, span: Span) -> Self {
        ExprSyntax::new(
            ExprSyntaxKind::Call {
                callee: Box::new(callee),
                args,
                with_clause: None,
            },
            span,
        )
    }
}

/// A single element of an argument list.
#[derive(Clone, Debug)]
pub struct ArgSyntax {
    pub kind: ArgSyntaxKind,
    pub span: Span,
}

/// Argument list element variants.
#[derive(Clone, Debug)]
pub enum ArgSyntaxKind {
    /// A positional argument.
    Ordered(ExprSyntax),
    /// A named argument, `.name(expr)`; the expression may be elided.
    Named {
        name: Name,
        name_span: Span,
        expr: Option<ExprSyntax>,
    },
    /// An elided positional argument (consecutive commas).
    Empty,
}

impl ArgSyntax {
    pub fn ordered(expr: ExprSyntax) -> Self {
        let span = expr.span;
        ArgSyntax {
            kind: ArgSyntaxKind::Ordered(expr),
            span,
        }
    }

    pub fn named(name: Name, name_span: Span, expr: Option<ExprSyntax>, span: Span) -> Self {
        ArgSyntax {
            kind: ArgSyntaxKind::Named {
                name,
                name_span,
                expr,
            },
            span,
        }
    }

    pub fn empty(span: Span) -> Self {
        ArgSyntax {
            kind: ArgSyntaxKind::Empty,
            span,
        }
    }
}

/// An array-method `with` clause holding a single iteration expression.
#[derive(Clone, Debug)]
pub struct WithClauseSyntax {
    /// Span of the `with` keyword, used for diagnostics.
    pub with_span: Span,
    pub expr: ExprSyntax,
}
