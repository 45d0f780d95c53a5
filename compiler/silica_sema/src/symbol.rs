//! Symbols: named entities produced by elaboration.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use silica_syntax::ast::{
    ClassDeclSyntax, ConstraintDeclSyntax, FormalArgSyntax, MethodModifier, ParamDeclSyntax,
    SubroutineDeclSyntax, TypedefSyntax, VarDeclSyntax,
};
use silica_syntax::{Name, Span};
use silica_types::TypeId;

use crate::scope::ScopeId;

/// Handle to a symbol in a [`Compilation`](crate::Compilation).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        SymbolId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

/// What kind of entity a symbol names.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SymbolKind {
    Root,
    CompilationUnit,
    Module,
    Package,
    GenerateBlock,
    StatementBlock,
    Subroutine,
    Variable,
    ClassProperty,
    FormalArg,
    Parameter,
    EnumValue,
    TypeAlias,
    ClassType,
    /// Loop variable of an array-method `with` clause.
    Iterator,
    ConstraintBlock,
}

impl SymbolKind {
    /// Whether the symbol can appear in expression position.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            SymbolKind::Variable
                | SymbolKind::ClassProperty
                | SymbolKind::FormalArg
                | SymbolKind::Parameter
                | SymbolKind::EnumValue
                | SymbolKind::Iterator
        )
    }

    /// Whether the symbol names a type.
    pub fn is_type(self) -> bool {
        matches!(self, SymbolKind::TypeAlias | SymbolKind::ClassType)
    }
}

/// Which name table of a scope a symbol lives in.
///
/// Module definitions occupy a separate namespace from ordinary members,
/// so a variable may share its name with a module without conflict.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Namespace {
    Definitions,
    Members,
}

bitflags! {
    /// Properties of a subroutine relevant to call binding and constant
    /// evaluation.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MethodFlags: u8 {
        const STATIC = 1 << 0;
        const VIRTUAL = 1 << 1;
        const PURE = 1 << 2;
        const CONSTRUCTOR = 1 << 3;
        const DPI_IMPORT = 1 << 4;
        /// Explicitly barred from constant expressions.
        const NOT_CONST = 1 << 5;
    }
}

impl MethodFlags {
    pub fn from_modifiers(modifiers: &[MethodModifier]) -> Self {
        let mut flags = MethodFlags::empty();
        for m in modifiers {
            flags |= match m {
                MethodModifier::Static => MethodFlags::STATIC,
                MethodModifier::Virtual => MethodFlags::VIRTUAL,
                MethodModifier::Pure => MethodFlags::PURE,
                MethodModifier::Constructor => MethodFlags::CONSTRUCTOR,
                MethodModifier::DpiImport => MethodFlags::DPI_IMPORT,
                MethodModifier::NotConst => MethodFlags::NOT_CONST,
            };
        }
        flags
    }
}

/// Kind-specific payload of a symbol. Syntax is shared by `Rc` so symbols
/// stay cheap to clone out of the arena.
#[derive(Clone, Debug, Default)]
pub enum SymbolData {
    #[default]
    None,
    /// The scope owned by a scope-like symbol.
    Scope(ScopeId),
    Variable(Rc<VarDeclSyntax>),
    Parameter(Rc<ParamDeclSyntax>),
    FormalArg(Rc<FormalArgSyntax>),
    Subroutine {
        scope: ScopeId,
        syntax: Rc<SubroutineDeclSyntax>,
    },
    Class {
        scope: ScopeId,
        syntax: Rc<ClassDeclSyntax>,
    },
    TypeAlias(Rc<TypedefSyntax>),
    EnumValue {
        /// The declaration (variable or typedef) introducing the enum.
        owner: SymbolId,
        /// Position within the enum's member list.
        position: u32,
    },
    Iterator {
        /// Element type of the array being iterated.
        ty: TypeId,
    },
    Constraint(Rc<ConstraintDeclSyntax>),
}

/// A named entity in the elaborated design.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub name: Name,
    pub span: Span,
    /// The scope the symbol was declared in; `None` only for the root.
    pub parent: Option<ScopeId>,
    /// Declaration order within the parent scope.
    pub index: u32,
    pub data: SymbolData,
}

impl Symbol {
    /// The scope this symbol owns, if it is scope-like.
    pub fn owned_scope(&self) -> Option<ScopeId> {
        match &self.data {
            SymbolData::Scope(scope)
            | SymbolData::Subroutine { scope, .. }
            | SymbolData::Class { scope, .. } => Some(*scope),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_classification() {
        assert!(SymbolKind::Variable.is_value());
        assert!(SymbolKind::Iterator.is_value());
        assert!(!SymbolKind::Module.is_value());
        assert!(SymbolKind::TypeAlias.is_type());
        assert!(!SymbolKind::Parameter.is_type());
    }

    #[test]
    fn method_flags_from_modifiers() {
        let flags = MethodFlags::from_modifiers(&[
            MethodModifier::Static,
            MethodModifier::DpiImport,
        ]);
        assert!(flags.contains(MethodFlags::STATIC));
        assert!(flags.contains(MethodFlags::DPI_IMPORT));
        assert!(!flags.contains(MethodFlags::VIRTUAL));
    }
}
