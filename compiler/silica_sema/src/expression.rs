//! Bound (type-checked) expressions.

use std::fmt;
use std::rc::Rc;

use silica_syntax::ast::{BinaryOpSyntax, UnaryOpSyntax};
use silica_syntax::Span;
use silica_types::{LogicVec, TypeId};

use crate::symbol::SymbolId;
use crate::system::SystemSubroutine;

/// A bound expression with its resolved type.
#[derive(Clone, Debug)]
pub struct Expression {
    pub kind: ExprKind,
    pub ty: TypeId,
    pub span: Span,
}

impl Expression {
    pub fn new(kind: ExprKind, ty: TypeId, span: Span) -> Self {
        Expression { kind, ty, span }
    }

    /// An invalid expression wrapping whatever was bound before the error.
    pub fn invalid(inner: Option<Expression>, span: Span) -> Self {
        Expression::new(ExprKind::Invalid(inner.map(Box::new)), TypeId::ERROR, span)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self.kind, ExprKind::Invalid(_))
    }

    /// Whether the expression denotes a modifiable location.
    pub fn is_lvalue(&self) -> bool {
        match &self.kind {
            ExprKind::NamedValue { assignable, .. } => *assignable,
            ExprKind::ElementSelect { value, .. } => value.is_lvalue(),
            ExprKind::MemberAccess { value, .. } => value.is_lvalue(),
            _ => false,
        }
    }
}

/// Reference to a member of an aggregate or class value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberRef {
    /// A struct field, by declaration index.
    Field(u32),
    /// A class property symbol.
    Property(SymbolId),
}

/// What a call expression dispatches to.
#[derive(Clone)]
pub enum Callee {
    /// A user-declared function or task.
    User(SymbolId),
    /// A system subroutine or built-in method.
    System(SystemCallInfo),
}

impl fmt::Debug for Callee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callee::User(id) => write!(f, "User({id:?})"),
            Callee::System(info) => write!(f, "System({})", info.subroutine.name()),
        }
    }
}

/// A resolved system call, including any iterator `with` clause.
#[derive(Clone)]
pub struct SystemCallInfo {
    pub subroutine: Rc<dyn SystemSubroutine>,
    pub iterator: Option<Box<IteratorCall>>,
}

/// The bound body of an array-method `with` clause.
#[derive(Clone, Debug)]
pub struct IteratorCall {
    /// The iterator symbol visible inside the clause body.
    pub iter_var: SymbolId,
    pub body: Expression,
}

/// Bound expression variants.
#[derive(Clone, Debug)]
pub enum ExprKind {
    /// A subexpression that failed to bind; evaluation yields `Invalid`
    /// without further diagnostics.
    Invalid(Option<Box<Expression>>),
    IntegerLiteral(LogicVec),
    RealLiteral(f64),
    StringLiteral(String),
    NullLiteral,
    /// A reference to a value symbol.
    NamedValue {
        symbol: SymbolId,
        /// False for parameters, enum values, and iterators.
        assignable: bool,
        /// Reached through a hierarchical path rather than lexical
        /// lookup. Legal to bind anywhere; constant evaluation rejects
        /// it.
        hierarchical: bool,
    },
    /// A data type in expression position (argument to `$bits` and
    /// friends); the type itself is in `ty`.
    DataTypeRef,
    /// An elided argument position in a system call whose subroutine
    /// accepts one; the subroutine supplies the meaning.
    EmptyArgument,
    Unary {
        op: UnaryOpSyntax,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOpSyntax,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Conditional {
        cond: Box<Expression>,
        then_expr: Box<Expression>,
        else_expr: Box<Expression>,
    },
    ElementSelect {
        value: Box<Expression>,
        index: Box<Expression>,
    },
    MemberAccess {
        value: Box<Expression>,
        member: MemberRef,
    },
    Call {
        callee: Callee,
        /// Bound arguments in formal order; for built-in methods the
        /// receiver is `args[0]`.
        args: Vec<Expression>,
    },
    Assignment {
        target: Box<Expression>,
        value: Box<Expression>,
        nonblocking: bool,
    },
    /// A representation change to `ty`; implicit conversions are inserted
    /// by the binder, explicit ones come from casts.
    Conversion {
        operand: Box<Expression>,
        implicit: bool,
    },
}
