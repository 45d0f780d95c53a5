//! Syntax tree nodes.
//!
//! Organized by category:
//!
//! - `expr`: expression and argument-list syntax
//! - `ty`: data type syntax (keywords, packed/unpacked dimensions, enums,
//!   structs)
//! - `decl`: declarations (modules, variables, parameters, subroutines,
//!   classes, typedefs, constraints)
//! - `stmt`: procedural statement syntax
//!
//! Nodes carry their source [`Span`](crate::Span) and are read-only to the
//! semantic core.

mod decl;
mod expr;
mod stmt;
mod ty;

pub use decl::{
    ArgDirection, ClassDeclSyntax, CompilationUnitSyntax, ConstraintDeclSyntax, FormalArgSyntax,
    GenerateBlockSyntax, Lifetime, MemberSyntax, MemberSyntaxKind, MethodModifier,
    ModuleDeclSyntax, PackageDeclSyntax, ParamDeclSyntax, SubroutineDeclSyntax, SubroutineKind,
    TypedefSyntax, VarDeclSyntax,
};
pub use expr::{
    ArgSyntax, ArgSyntaxKind, BinaryOpSyntax, ExprSyntax, ExprSyntaxKind, UnaryOpSyntax,
    WithClauseSyntax,
};
pub use stmt::{StmtSyntax, StmtSyntaxKind};
pub use ty::{
    DataTypeSyntax, DataTypeSyntaxKind, DimensionSyntax, EnumMemberSyntax, StructFieldSyntax,
    TypeKeyword,
};
