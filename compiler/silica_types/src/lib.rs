//! Type representation and constant values for the Silica compiler.
//!
//! The pool ([`TypePool`]) interns every type used by a compilation and
//! answers the compatibility queries the binder needs: matching,
//! equivalence, assignment compatibility, and cast compatibility. Constant
//! values ([`ConstantValue`]) carry four-state integral payloads
//! ([`LogicVec`]) alongside reals, strings, aggregates, and null.

mod compat;
mod data;
mod logic;
mod pool;
mod range;
mod value;

pub use data::{IntegralFlags, PredefinedIntKind, RealKind, TypeData, TypeId};
pub use logic::LogicVec;
pub use pool::TypePool;
pub use range::ConstantRange;
pub use value::ConstantValue;
