//! Semantic analysis for hardware designs: symbol tables with lazy
//! member materialization, expression and statement binding, and an
//! elaboration-time constant evaluator.
//!
//! The entry point is [`Compilation`]: feed it compilation units with
//! [`Compilation::add_unit`], then bind and evaluate expressions against
//! any scope. All resolution is demand-driven and memoized, so adding
//! syntax is cheap and only referenced declarations are elaborated.

pub mod bind;
mod compilation;
mod eval;
mod expression;
mod scope;
mod statement;
mod symbol;
mod system;
mod tyres;

pub use compilation::{Compilation, CompilationOptions, SubroutineSig};
pub use eval::{EvalContext, EvalResult};
pub use expression::{
    Callee, ExprKind, Expression, IteratorCall, MemberRef, SystemCallInfo,
};
pub use scope::{LookupLocation, ScopeData, ScopeId, ScopeSyntax};
pub use statement::{Statement, StatementKind};
pub use symbol::{MethodFlags, Namespace, Symbol, SymbolData, SymbolId, SymbolKind};
pub use system::{SystemSubroutine, WithClauseMode};

/// Grow the stack before recursing into deeply nested expressions.
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(100 * 1024, 1024 * 1024, f)
}
