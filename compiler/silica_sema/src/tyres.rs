//! Lazy resolution of declared types and elaboration-time values.
//!
//! Everything here is memoized on the owning symbol. A cycle guard
//! (`resolving`) catches self-referential declarations like
//! `parameter int P = P + 1` and reports them once.

use std::rc::Rc;

use silica_diagnostic::{Diagnostic, ErrorCode};
use silica_syntax::ast::{
    DataTypeSyntax, DataTypeSyntaxKind, DimensionSyntax, ExprSyntax, Lifetime, SubroutineKind,
};
use silica_syntax::Span;
use silica_types::{ConstantRange, ConstantValue, IntegralFlags, LogicVec, TypeData, TypeId};

use crate::bind::{bind_expr, bind_subroutine_body, BindContext, BindFlags};
use crate::compilation::{Compilation, SubroutineSig};
use crate::eval::EvalContext;
use crate::expression::Expression;
use crate::scope::{LookupLocation, ScopeId};
use crate::statement::Statement;
use crate::symbol::{MethodFlags, Namespace, SymbolData, SymbolId, SymbolKind};

impl Compilation {
    /// An integral vector type of the given shape.
    pub(crate) fn integral_type(&self, width: u32, signed: bool, four_state: bool) -> TypeId {
        let mut flags = IntegralFlags::empty();
        if four_state {
            flags |= IntegralFlags::FOUR_STATE;
        }
        if width == 1 {
            let scalar = if four_state { TypeId::LOGIC } else { TypeId::BIT };
            return self.types.with_signing(scalar, signed);
        }
        if signed {
            flags |= IntegralFlags::SIGNED;
        }
        let elem = if four_state { TypeId::LOGIC } else { TypeId::BIT };
        self.types.intern(TypeData::PackedArray {
            elem,
            range: ConstantRange::new(width as i32 - 1, 0),
            flags,
        })
    }

    /// Bind and evaluate a constant expression to a 32-bit bound.
    pub(crate) fn eval_const_i32(
        &self,
        expr: &ExprSyntax,
        scope: ScopeId,
        location: LookupLocation,
    ) -> Option<i32> {
        let mut ctx = BindContext::new(self, scope, BindFlags::CONSTANT);
        ctx.location = location;
        let bound = bind_expr(&mut ctx, expr);
        if bound.is_invalid() {
            return None;
        }
        let mut eval = EvalContext::new(self, location);
        let value = eval.eval_expr(&bound);
        match value.to_i64().and_then(|v| i32::try_from(v).ok()) {
            Some(v) => Some(v),
            None => {
                self.report(
                    Diagnostic::error(ErrorCode::E5001)
                        .with_message("dimension bound is not a constant integer")
                        .with_label(expr.span, "cannot be evaluated at elaboration time"),
                );
                None
            }
        }
    }

    fn guard_resolve<R>(
        &self,
        sym: SymbolId,
        span: Span,
        on_cycle: R,
        f: impl FnOnce() -> R,
    ) -> R {
        if !self.resolving.borrow_mut().insert(sym) {
            self.report(
                Diagnostic::error(ErrorCode::E4008)
                    .with_message(format!(
                        "cyclic reference involving '{}'",
                        self.symbol_name_str(sym)
                    ))
                    .with_label(span, "depends on its own value"),
            );
            return on_cycle;
        }
        let result = f();
        self.resolving.borrow_mut().remove(&sym);
        result
    }

    /// Resolve a data type syntax node to a type.
    ///
    /// `owner` is the declaration introducing the type; it anchors inline
    /// enum and struct declarations.
    pub fn resolve_type(
        &self,
        syntax: &DataTypeSyntax,
        scope: ScopeId,
        location: LookupLocation,
        owner: Option<SymbolId>,
    ) -> TypeId {
        match &syntax.kind {
            DataTypeSyntaxKind::Keyword {
                keyword,
                signing,
                packed_dims,
            } => {
                let base = silica_types::TypePool::builtin(*keyword);
                let base = match signing {
                    Some(s) => self.types.with_signing(base, *s),
                    None => base,
                };
                if packed_dims.is_empty() {
                    return base;
                }
                if !matches!(self.types.get(base), TypeData::Scalar(_)) {
                    self.report(
                        Diagnostic::error(ErrorCode::E4107)
                            .with_message(format!(
                                "packed dimensions require a single-bit element type, found '{}'",
                                self.types.type_str(base, &self.interner)
                            ))
                            .with_label(syntax.span, "cannot be given packed dimensions"),
                    );
                    return TypeId::ERROR;
                }
                let four_state = self.types.is_four_state(base);
                let signed = self.types.is_signed(base);
                let elem_flags = if four_state {
                    IntegralFlags::FOUR_STATE
                } else {
                    IntegralFlags::empty()
                };
                // Innermost dimension first; signing applies to the whole
                // vector, so only the outermost layer carries it.
                let mut ty = self.types.with_signing(base, false);
                for (left, right) in packed_dims.iter().rev() {
                    let (Some(l), Some(r)) = (
                        self.eval_const_i32(left, scope, location),
                        self.eval_const_i32(right, scope, location),
                    ) else {
                        return TypeId::ERROR;
                    };
                    ty = self.types.intern(TypeData::PackedArray {
                        elem: ty,
                        range: ConstantRange::new(l, r),
                        flags: elem_flags,
                    });
                }
                self.types.with_signing(ty, signed)
            }
            DataTypeSyntaxKind::Named(name) => {
                let Some(found) =
                    self.lookup_unqualified(Namespace::Members, *name, location)
                else {
                    self.report(
                        Diagnostic::error(ErrorCode::E4001)
                            .with_message(format!(
                                "undeclared type '{}'",
                                self.interner.resolve(*name)
                            ))
                            .with_label(syntax.span, "not found in this scope"),
                    );
                    return TypeId::ERROR;
                };
                match self.symbol(found).kind {
                    SymbolKind::TypeAlias => self.typedef_type(found),
                    SymbolKind::ClassType => self.class_type(found),
                    _ => {
                        self.report(
                            Diagnostic::error(ErrorCode::E4007)
                                .with_message(format!(
                                    "'{}' is not a type",
                                    self.interner.resolve(*name)
                                ))
                                .with_label(syntax.span, "used in type position")
                                .with_secondary_label(self.symbol(found).span, "declared here"),
                        );
                        TypeId::ERROR
                    }
                }
            }
            DataTypeSyntaxKind::Enum { base, members } => {
                self.enum_type_for(owner, base.as_deref(), members, scope, location, syntax.span)
            }
            DataTypeSyntaxKind::Struct { fields } => {
                let resolved: Vec<_> = fields
                    .iter()
                    .map(|f| {
                        (
                            f.name,
                            self.resolve_type(&f.ty, scope, location, None),
                        )
                    })
                    .collect();
                let decl = match owner {
                    Some(sym) => sym.raw(),
                    None => {
                        let n = self.anon_counter.get();
                        self.anon_counter.set(n + 1);
                        // High bit keeps anonymous ids clear of symbol ids.
                        0x8000_0000 | n
                    }
                };
                self.types.intern(TypeData::UnpackedStruct {
                    decl,
                    fields: resolved.into_boxed_slice(),
                })
            }
            DataTypeSyntaxKind::Implicit => TypeId::ERROR,
        }
    }

    /// Resolve an inline enum declaration, computing member values in
    /// declaration order. Memoized on the owning declaration.
    fn enum_type_for(
        &self,
        owner: Option<SymbolId>,
        base: Option<&DataTypeSyntax>,
        members: &[silica_syntax::ast::EnumMemberSyntax],
        scope: ScopeId,
        location: LookupLocation,
        span: Span,
    ) -> TypeId {
        let Some(owner) = owner else {
            // An enum type with no declaration to anchor it; the base
            // still resolves so diagnostics stay useful.
            return base.map_or(TypeId::INT, |b| self.resolve_type(b, scope, location, None));
        };
        if let Some(&ty) = self.enum_owner_types.borrow().get(&owner) {
            return ty;
        }

        let base_ty = match base {
            Some(b) => self.resolve_type(b, scope, location, None),
            None => TypeId::INT,
        };
        if !base_ty.is_error() && !self.types.is_integral(base_ty) {
            self.report(
                Diagnostic::error(ErrorCode::E4101)
                    .with_message(format!(
                        "enum base type must be integral, found '{}'",
                        self.types.type_str(base_ty, &self.interner)
                    ))
                    .with_label(span, "invalid enum base"),
            );
        }
        let owner_sym = self.symbol(owner);
        let enum_ty = self.types.intern(TypeData::Enum {
            decl: owner.raw(),
            base: base_ty,
            name: owner_sym.name,
        });
        self.enum_owner_types.borrow_mut().insert(owner, enum_ty);

        // Member symbols live beside the owner in its parent scope.
        let Some(parent) = owner_sym.parent else {
            return enum_ty;
        };
        let member_syms: Vec<SymbolId> = self
            .scope_members(parent)
            .into_iter()
            .filter(|&s| {
                matches!(
                    self.symbol(s).data,
                    SymbolData::EnumValue { owner: o, .. } if o == owner
                )
            })
            .collect();

        let width = self.types.bit_width(base_ty).max(1);
        let signed = self.types.is_signed(base_ty);
        let mut prev: Option<LogicVec> = None;
        for (member, sym) in members.iter().zip(member_syms) {
            let value = match &member.init {
                Some(init) => {
                    // Earlier members are legal in later initializers, so
                    // member inits see the whole scope.
                    let mut ctx = BindContext::new(self, scope, BindFlags::CONSTANT);
                    let bound = bind_expr(&mut ctx, init);
                    let mut eval = EvalContext::new(self, LookupLocation::at_end(scope));
                    self.types.coerce_value(eval.eval_expr(&bound), base_ty)
                }
                None => match &prev {
                    Some(p) => ConstantValue::Integer(p.add(&LogicVec::new(width, signed, 1))),
                    None => ConstantValue::Integer(LogicVec::zero(width, signed)),
                },
            };
            prev = value.integer().copied();
            self.enum_values.borrow_mut().insert(sym, value);
        }
        enum_ty
    }

    /// The target type of a typedef, wrapped in a named alias.
    pub fn typedef_type(&self, sym: SymbolId) -> TypeId {
        if let Some(&ty) = self.typedef_types.borrow().get(&sym) {
            return ty;
        }
        let symbol = self.symbol(sym);
        let SymbolData::TypeAlias(syntax) = symbol.data else {
            return TypeId::ERROR;
        };
        let Some(parent) = symbol.parent else {
            return TypeId::ERROR;
        };
        let ty = self.guard_resolve(sym, symbol.span, TypeId::ERROR, || {
            let location = LookupLocation::at_end(parent);
            let target = self.resolve_type(&syntax.ty, parent, location, Some(sym));
            // Enums and inline types already carry the declaration; a
            // plain alias keeps the typedef's name for diagnostics.
            if matches!(self.types.get(target), TypeData::Enum { .. }) {
                target
            } else {
                self.types.intern(TypeData::Alias {
                    name: symbol.name,
                    target,
                })
            }
        });
        self.typedef_types.borrow_mut().insert(sym, ty);
        ty
    }

    /// The class type for a class declaration, resolving its base class
    /// and implemented interfaces by name.
    pub fn class_type(&self, sym: SymbolId) -> TypeId {
        if let Some(&ty) = self.class_type_ids.borrow().get(&sym) {
            return ty;
        }
        let symbol = self.symbol(sym);
        let SymbolData::Class { syntax, .. } = &symbol.data else {
            return TypeId::ERROR;
        };
        let Some(parent) = symbol.parent else {
            return TypeId::ERROR;
        };
        let syntax = syntax.clone();
        let ty = self.guard_resolve(sym, symbol.span, TypeId::ERROR, || {
            let location = LookupLocation::at_end(parent);
            let base = syntax
                .base
                .and_then(|name| self.resolve_class_ref(name, parent, location, symbol.span));
            let implements: Vec<TypeId> = syntax
                .implements
                .iter()
                .filter_map(|&name| self.resolve_class_ref(name, parent, location, symbol.span))
                .collect();
            self.types.intern(TypeData::Class {
                decl: sym.raw(),
                name: symbol.name,
                base,
                is_interface: syntax.is_interface,
                implements: implements.into_boxed_slice(),
            })
        });
        self.class_type_ids.borrow_mut().insert(sym, ty);
        ty
    }

    fn resolve_class_ref(
        &self,
        name: silica_syntax::Name,
        scope: ScopeId,
        location: LookupLocation,
        span: Span,
    ) -> Option<TypeId> {
        let Some(found) = self.lookup_unqualified(Namespace::Members, name, location) else {
            self.report(
                Diagnostic::error(ErrorCode::E4001)
                    .with_message(format!(
                        "undeclared class '{}'",
                        self.interner.resolve(name)
                    ))
                    .with_label(span, "referenced here"),
            );
            return None;
        };
        if self.symbol(found).kind != SymbolKind::ClassType {
            self.report(
                Diagnostic::error(ErrorCode::E4007)
                    .with_message(format!(
                        "'{}' is not a class",
                        self.interner.resolve(name)
                    ))
                    .with_label(span, "in inheritance list"),
            );
            return None;
        }
        Some(self.class_type(found))
    }

    /// The declared type of a variable or class property, with unpacked
    /// dimensions applied.
    pub fn variable_type(&self, sym: SymbolId) -> TypeId {
        if let Some(&ty) = self.value_types.borrow().get(&sym) {
            return ty;
        }
        let symbol = self.symbol(sym);
        let ty = match (&symbol.data, symbol.parent) {
            (SymbolData::Variable(syntax), Some(parent)) => {
                let syntax = syntax.clone();
                self.guard_resolve(sym, symbol.span, TypeId::ERROR, || {
                    let location = LookupLocation::before_index(parent, symbol.index);
                    let mut ty = self.resolve_type(&syntax.ty, parent, location, Some(sym));
                    for dim in syntax.dims.iter().rev() {
                        ty = self.apply_dimension(ty, dim, parent, location);
                    }
                    ty
                })
            }
            // The implicit result variable of a function.
            (SymbolData::None, Some(parent)) => {
                let owner = self.scope_owner(parent);
                if self.symbol(owner).kind == SymbolKind::Subroutine {
                    self.subroutine_sig(owner).return_type
                } else {
                    TypeId::ERROR
                }
            }
            _ => TypeId::ERROR,
        };
        self.value_types.borrow_mut().insert(sym, ty);
        ty
    }

    fn apply_dimension(
        &self,
        elem: TypeId,
        dim: &DimensionSyntax,
        scope: ScopeId,
        location: LookupLocation,
    ) -> TypeId {
        match dim {
            DimensionSyntax::Range(left, right) => {
                let (Some(l), Some(r)) = (
                    self.eval_const_i32(left, scope, location),
                    self.eval_const_i32(right, scope, location),
                ) else {
                    return TypeId::ERROR;
                };
                self.types.intern(TypeData::FixedArray {
                    elem,
                    range: ConstantRange::new(l, r),
                })
            }
            DimensionSyntax::Dynamic => self.types.intern(TypeData::DynamicArray { elem }),
            DimensionSyntax::Queue => self.types.intern(TypeData::Queue { elem }),
            DimensionSyntax::Associative(index) => {
                let index_ty = self.resolve_type(index, scope, location, None);
                self.types.intern(TypeData::Associative {
                    elem,
                    index: Some(index_ty),
                })
            }
        }
    }

    /// The declared type of a formal argument.
    pub fn formal_type(&self, sym: SymbolId) -> TypeId {
        if let Some(&ty) = self.value_types.borrow().get(&sym) {
            return ty;
        }
        let symbol = self.symbol(sym);
        let ty = match (&symbol.data, symbol.parent) {
            (SymbolData::FormalArg(syntax), Some(parent)) => {
                if matches!(syntax.ty.kind, DataTypeSyntaxKind::Implicit) {
                    // Untyped formals default to a single 4-state bit.
                    TypeId::LOGIC
                } else {
                    let location = LookupLocation::before_index(parent, symbol.index);
                    self.resolve_type(&syntax.ty, parent, location, Some(sym))
                }
            }
            _ => TypeId::ERROR,
        };
        self.value_types.borrow_mut().insert(sym, ty);
        ty
    }

    /// A parameter's declared (or inferred) type.
    pub fn parameter_type(&self, sym: SymbolId) -> TypeId {
        self.parameter_value(sym);
        self.param_types
            .borrow()
            .get(&sym)
            .copied()
            .unwrap_or(TypeId::ERROR)
    }

    /// A parameter's elaboration-time value.
    pub fn parameter_value(&self, sym: SymbolId) -> ConstantValue {
        if let Some(v) = self.param_values.borrow().get(&sym) {
            return v.clone();
        }
        let symbol = self.symbol(sym);
        let (SymbolData::Parameter(syntax), Some(parent)) = (&symbol.data, symbol.parent) else {
            return ConstantValue::Invalid;
        };
        let syntax = syntax.clone();
        let (ty, value) = self.guard_resolve(
            sym,
            symbol.span,
            (TypeId::ERROR, ConstantValue::Invalid),
            || {
                let location = LookupLocation::before_index(parent, symbol.index);
                let Some(init) = &syntax.init else {
                    self.report(
                        Diagnostic::error(ErrorCode::E4205)
                            .with_message(format!(
                                "parameter '{}' has no value",
                                self.interner.resolve(symbol.name)
                            ))
                            .with_label(symbol.span, "declared without a default"),
                    );
                    return (TypeId::ERROR, ConstantValue::Invalid);
                };
                let mut ctx = BindContext::new(self, parent, BindFlags::CONSTANT);
                ctx.location = location;
                let bound = bind_expr(&mut ctx, init);
                let (ty, bound) = if matches!(syntax.ty.kind, DataTypeSyntaxKind::Implicit) {
                    (bound.ty, bound)
                } else {
                    let ty = self.resolve_type(&syntax.ty, parent, location, Some(sym));
                    (ty, crate::bind::convert_assignment(&mut ctx, ty, bound))
                };
                let mut eval = EvalContext::new(self, location);
                let raw = eval.eval_expr(&bound);
                (ty, self.types.coerce_value(raw, ty))
            },
        );
        self.param_types.borrow_mut().insert(sym, ty);
        self.param_values.borrow_mut().insert(sym, value.clone());
        value
    }

    /// An enum member's value, forcing the owning declaration first.
    pub fn enum_value(&self, sym: SymbolId) -> ConstantValue {
        if let Some(v) = self.enum_values.borrow().get(&sym) {
            return v.clone();
        }
        self.enum_member_type(sym);
        self.enum_values
            .borrow()
            .get(&sym)
            .cloned()
            .unwrap_or(ConstantValue::Invalid)
    }

    /// The enum type an enum member belongs to.
    pub fn enum_member_type(&self, sym: SymbolId) -> TypeId {
        let SymbolData::EnumValue { owner, .. } = self.symbol(sym).data else {
            return TypeId::ERROR;
        };
        // Resolving the owner's declared type fills in all member values.
        match self.symbol(owner).kind {
            SymbolKind::TypeAlias => self.typedef_type(owner),
            SymbolKind::Variable | SymbolKind::ClassProperty => self.variable_type(owner),
            _ => TypeId::ERROR,
        };
        self.enum_owner_types
            .borrow()
            .get(&owner)
            .copied()
            .unwrap_or(TypeId::ERROR)
    }

    /// The type a value symbol has in expression position.
    pub fn value_type(&self, sym: SymbolId) -> TypeId {
        let symbol = self.symbol(sym);
        match symbol.kind {
            SymbolKind::Variable | SymbolKind::ClassProperty => self.variable_type(sym),
            SymbolKind::FormalArg => self.formal_type(sym),
            SymbolKind::Parameter => self.parameter_type(sym),
            SymbolKind::EnumValue => self.enum_member_type(sym),
            SymbolKind::Iterator => match symbol.data {
                SymbolData::Iterator { ty } => ty,
                _ => TypeId::ERROR,
            },
            _ => TypeId::ERROR,
        }
    }

    /// A variable's lifetime, falling back to the scope default.
    pub(crate) fn variable_lifetime(&self, sym: SymbolId) -> Lifetime {
        let symbol = self.symbol(sym);
        let declared = match &symbol.data {
            SymbolData::Variable(syntax) => syntax.lifetime,
            _ => None,
        };
        match (declared, symbol.parent) {
            // Automatic is meaningless outside procedural code; the
            // declaration check already reported it.
            (Some(Lifetime::Automatic), Some(parent)) if !self.scope_is_procedural(parent) => {
                Lifetime::Static
            }
            (Some(lifetime), _) => lifetime,
            (None, Some(parent)) => self.scope_default_lifetime(parent),
            (None, None) => Lifetime::Static,
        }
    }

    /// The bound initializer of a variable, if it has one.
    pub(crate) fn variable_initializer(&self, sym: SymbolId) -> Option<Rc<Expression>> {
        if let Some(memo) = self.var_inits.borrow().get(&sym) {
            return memo.clone();
        }
        let symbol = self.symbol(sym);
        let result = match (&symbol.data, symbol.parent) {
            (SymbolData::Variable(syntax), Some(parent)) => syntax.init.as_ref().map(|init| {
                let location = LookupLocation::before_index(parent, symbol.index);
                let mut ctx = BindContext::new(self, parent, BindFlags::CONSTANT);
                ctx.location = location;
                let bound = bind_expr(&mut ctx, init);
                Rc::new(crate::bind::convert_assignment(
                    &mut ctx,
                    self.variable_type(sym),
                    bound,
                ))
            }),
            _ => None,
        };
        self.var_inits.borrow_mut().insert(sym, result.clone());
        result
    }

    /// The resolved signature of a subroutine.
    pub fn subroutine_sig(&self, sym: SymbolId) -> Rc<SubroutineSig> {
        if let Some(sig) = self.subr_sigs.borrow().get(&sym) {
            return sig.clone();
        }
        let symbol = self.symbol(sym);
        let (scope, syntax) = match &symbol.data {
            SymbolData::Subroutine { scope, syntax } => (*scope, syntax.clone()),
            _ => {
                return Rc::new(SubroutineSig {
                    kind: SubroutineKind::Function,
                    flags: MethodFlags::empty(),
                    scope: self.root_scope(),
                    return_type: TypeId::ERROR,
                    formals: Vec::new(),
                    return_var: None,
                    class: None,
                })
            }
        };

        let parent = symbol.parent.unwrap_or_else(|| self.root_scope());
        let return_type = match (syntax.kind, &syntax.return_type) {
            (SubroutineKind::Task, _) | (SubroutineKind::Function, None) => TypeId::VOID,
            (SubroutineKind::Function, Some(ty)) => {
                self.resolve_type(ty, parent, LookupLocation::at_end(parent), Some(sym))
            }
        };

        let mut formals = Vec::new();
        let mut return_var = None;
        for member in self.scope_members(scope) {
            let m = self.symbol(member);
            match m.kind {
                SymbolKind::FormalArg => formals.push(member),
                SymbolKind::Variable if m.name == symbol.name => return_var = Some(member),
                _ => {}
            }
        }
        if let Some(rv) = return_var {
            self.value_types.borrow_mut().insert(rv, return_type);
        }

        let class = {
            let owner = self.scope_owner(parent);
            (self.symbol(owner).kind == SymbolKind::ClassType).then_some(owner)
        };

        let sig = Rc::new(SubroutineSig {
            kind: syntax.kind,
            flags: MethodFlags::from_modifiers(&syntax.modifiers),
            scope,
            return_type,
            formals,
            return_var,
            class,
        });
        self.subr_sigs.borrow_mut().insert(sym, sig.clone());
        sig
    }

    /// The bound body of a subroutine. Bodies bind on demand; binding
    /// needs only signatures of callees, so recursion terminates.
    pub fn subroutine_body(&self, sym: SymbolId) -> Rc<[Statement]> {
        if let Some(body) = self.subr_bodies.borrow().get(&sym) {
            return body.clone();
        }
        let body: Rc<[Statement]> = bind_subroutine_body(self, sym).into();
        self.subr_bodies.borrow_mut().insert(sym, body.clone());
        body
    }
}
