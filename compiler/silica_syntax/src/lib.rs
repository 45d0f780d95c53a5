//! Syntax tree node types for the Silica compiler's semantic core.
//!
//! The lexer, preprocessor, and parser live elsewhere; this crate is the
//! narrow interface through which their output reaches the binder. The core
//! only ever reads these nodes — nothing here is mutated after construction.
//!
//! Also provides the interned identifier table ([`Name`] / [`StringInterner`])
//! and byte-offset source [`Span`]s, which every downstream crate shares.

pub mod ast;
mod interner;
mod name;
mod span;

pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use span::{Span, SpanError};
