//! Data type syntax nodes.

use crate::{Name, Span};

use super::expr::ExprSyntax;

/// Built-in type keywords.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKeyword {
    Bit,
    Logic,
    /// Semantically identical to `logic`; the distinction is preserved for
    /// diagnostics.
    Reg,
    Byte,
    Int,
    Integer,
    LongInt,
    Time,
    Real,
    ShortReal,
    String,
    Void,
}

/// A data type syntax node.
#[derive(Clone, Debug)]
pub struct DataTypeSyntax {
    pub kind: DataTypeSyntaxKind,
    pub span: Span,
}

/// Data type syntax variants.
#[derive(Clone, Debug)]
pub enum DataTypeSyntaxKind {
    /// A built-in keyword type with optional signing override and packed
    /// dimensions, e.g. `logic signed [7:0]`.
    Keyword {
        keyword: TypeKeyword,
        signing: Option<bool>,
        packed_dims: Vec<(ExprSyntax, ExprSyntax)>,
    },
    /// A reference to a named type (typedef, class, enum alias).
    Named(Name),
    /// An enum declaration, e.g. `enum logic [1:0] { A, B, C }`.
    Enum {
        base: Option<Box<DataTypeSyntax>>,
        members: Vec<EnumMemberSyntax>,
    },
    /// An unpacked struct declaration.
    Struct { fields: Vec<StructFieldSyntax> },
    /// No explicit type was written (e.g. an untyped parameter); the type
    /// is inferred from the initializer.
    Implicit,
}

impl DataTypeSyntax {
    pub fn new(kind: DataTypeSyntaxKind, span: Span) -> Self {
        DataTypeSyntax { kind, span }
    }

    /// A bare keyword type with default signing and no packed dimensions.
    pub fn keyword(keyword: TypeKeyword, span: Span) -> Self {
        DataTypeSyntax::new(
            DataTypeSyntaxKind::Keyword {
                keyword,
                signing: None,
                packed_dims: Vec::new(),
            },
            span,
        )
    }

    pub fn named(name: Name, span: Span) -> Self {
        DataTypeSyntax::new(DataTypeSyntaxKind::Named(name), span)
    }

    pub fn implicit(span: Span) -> Self {
        DataTypeSyntax::new(DataTypeSyntaxKind::Implicit, span)
    }
}

/// One member of an enum declaration.
#[derive(Clone, Debug)]
pub struct EnumMemberSyntax {
    pub name: Name,
    pub span: Span,
    pub init: Option<ExprSyntax>,
}

/// One field of a struct declaration.
#[derive(Clone, Debug)]
pub struct StructFieldSyntax {
    pub name: Name,
    pub span: Span,
    pub ty: DataTypeSyntax,
}

/// An unpacked dimension attached to a declarator.
#[derive(Clone, Debug)]
pub enum DimensionSyntax {
    /// A fixed range, `[left:right]`.
    Range(ExprSyntax, ExprSyntax),
    /// A dynamic array dimension, `[]`.
    Dynamic,
    /// A queue dimension, `[$]`.
    Queue,
    /// An associative dimension, `[index_type]`.
    Associative(Box<DataTypeSyntax>),
}
