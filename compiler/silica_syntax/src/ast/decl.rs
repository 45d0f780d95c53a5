//! Declaration syntax nodes.

use crate::{Name, Span};

use super::expr::ExprSyntax;
use super::stmt::StmtSyntax;
use super::ty::{DataTypeSyntax, DimensionSyntax};

/// Top-level compilation unit: an ordered list of members.
#[derive(Clone, Debug, Default)]
pub struct CompilationUnitSyntax {
    pub members: Vec<MemberSyntax>,
}

/// A member of a scope (compilation unit, module, package, class).
#[derive(Clone, Debug)]
pub struct MemberSyntax {
    pub kind: MemberSyntaxKind,
    pub span: Span,
}

/// Declaration syntax variants.
#[derive(Clone, Debug)]
pub enum MemberSyntaxKind {
    Module(ModuleDeclSyntax),
    Package(PackageDeclSyntax),
    Variable(VarDeclSyntax),
    Parameter(ParamDeclSyntax),
    Typedef(TypedefSyntax),
    Subroutine(SubroutineDeclSyntax),
    Class(ClassDeclSyntax),
    Constraint(ConstraintDeclSyntax),
    GenerateBlock(GenerateBlockSyntax),
}

impl MemberSyntax {
    pub fn new(kind: MemberSyntaxKind, span: Span) -> Self {
        MemberSyntax { kind, span }
    }
}

/// A module declaration.
#[derive(Clone, Debug)]
pub struct ModuleDeclSyntax {
    pub name: Name,
    pub name_span: Span,
    pub members: Vec<MemberSyntax>,
}

/// A package declaration.
#[derive(Clone, Debug)]
pub struct PackageDeclSyntax {
    pub name: Name,
    pub name_span: Span,
    pub members: Vec<MemberSyntax>,
}

/// An unnamed or labeled generate block.
#[derive(Clone, Debug)]
pub struct GenerateBlockSyntax {
    pub label: Option<Name>,
    pub members: Vec<MemberSyntax>,
}

/// Variable lifetime keyword.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Lifetime {
    Static,
    Automatic,
}

/// A variable declaration (one declarator).
#[derive(Clone, Debug)]
pub struct VarDeclSyntax {
    pub name: Name,
    pub name_span: Span,
    pub ty: DataTypeSyntax,
    /// Unpacked dimensions following the declarator name.
    pub dims: Vec<DimensionSyntax>,
    /// Explicit lifetime keyword, if any; otherwise inherited from the
    /// enclosing scope.
    pub lifetime: Option<Lifetime>,
    pub is_const: bool,
    pub init: Option<ExprSyntax>,
}

/// A parameter or localparam declaration (one declarator).
#[derive(Clone, Debug)]
pub struct ParamDeclSyntax {
    pub name: Name,
    pub name_span: Span,
    pub ty: DataTypeSyntax,
    pub init: Option<ExprSyntax>,
    /// `localparam` rather than `parameter`.
    pub is_local: bool,
}

/// A typedef declaration.
#[derive(Clone, Debug)]
pub struct TypedefSyntax {
    pub name: Name,
    pub name_span: Span,
    pub ty: DataTypeSyntax,
}

/// Whether a subroutine is a function or a task.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SubroutineKind {
    Function,
    Task,
}

/// Method and subroutine modifiers.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MethodModifier {
    Static,
    Virtual,
    Pure,
    Constructor,
    DpiImport,
    /// Class method not usable in constant expressions.
    NotConst,
}

/// Formal argument direction.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ArgDirection {
    In,
    Out,
    InOut,
    Ref,
    ConstRef,
}

impl ArgDirection {
    /// Whether a caller-supplied value flows into the subroutine.
    pub fn takes_input(self) -> bool {
        !matches!(self, ArgDirection::Out)
    }
}

/// A formal argument declaration.
#[derive(Clone, Debug)]
pub struct FormalArgSyntax {
    pub name: Name,
    pub direction: ArgDirection,
    pub ty: DataTypeSyntax,
    pub default: Option<ExprSyntax>,
    pub span: Span,
}

/// A function or task declaration.
#[derive(Clone, Debug)]
pub struct SubroutineDeclSyntax {
    pub kind: SubroutineKind,
    pub name: Name,
    pub name_span: Span,
    pub lifetime: Option<Lifetime>,
    pub modifiers: Vec<MethodModifier>,
    /// Return type; `None` for tasks.
    pub return_type: Option<DataTypeSyntax>,
    pub formals: Vec<FormalArgSyntax>,
    pub body: Vec<StmtSyntax>,
}

impl SubroutineDeclSyntax {
    pub fn has_modifier(&self, modifier: MethodModifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// A class declaration.
#[derive(Clone, Debug)]
pub struct ClassDeclSyntax {
    pub name: Name,
    pub name_span: Span,
    pub is_interface: bool,
    /// Base class name from an `extends` clause.
    pub base: Option<Name>,
    /// Interface class names from an `implements` clause.
    pub implements: Vec<Name>,
    pub members: Vec<MemberSyntax>,
}

/// A constraint block declaration inside a class.
#[derive(Clone, Debug)]
pub struct ConstraintDeclSyntax {
    pub name: Name,
    pub name_span: Span,
    pub is_static: bool,
    /// Constraint items, kept as raw expressions.
    pub items: Vec<ExprSyntax>,
}
