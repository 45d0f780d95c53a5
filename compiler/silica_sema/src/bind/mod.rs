//! Expression and statement binding: syntax in, typed trees out.

mod call;
mod stmt;

pub(crate) use call::bind_call;
pub(crate) use stmt::bind_subroutine_body;

use bitflags::bitflags;
use silica_diagnostic::{Diagnostic, ErrorCode};
use silica_syntax::ast::{
    BinaryOpSyntax, ExprSyntax, ExprSyntaxKind, Lifetime, UnaryOpSyntax,
};
use silica_syntax::{Name, Span};
use silica_types::{LogicVec, TypeData, TypeId};

use crate::compilation::Compilation;
use crate::expression::{ExprKind, Expression, MemberRef};
use crate::scope::{LookupLocation, ScopeId};
use crate::symbol::{MethodFlags, Namespace, SymbolId, SymbolKind};

bitflags! {
    /// Context flags threaded through binding.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct BindFlags: u8 {
        /// The expression must be evaluable at elaboration time.
        const CONSTANT = 1 << 0;
        /// Binding inside a procedural body.
        const PROCEDURAL = 1 << 1;
        /// Binding the initializer of a static variable.
        const STATIC_INITIALIZER = 1 << 2;
        /// A bare data type is acceptable here ($bits and casts).
        const ALLOW_DATA_TYPE = 1 << 3;
    }
}

/// Everything bind functions need to know about where they are.
pub struct BindContext<'a> {
    pub comp: &'a Compilation,
    pub scope: ScopeId,
    pub location: LookupLocation,
    pub flags: BindFlags,
    /// Iterator variables introduced by enclosing `with` clauses,
    /// innermost last.
    pub(crate) iterators: Vec<(Name, SymbolId)>,
}

impl<'a> BindContext<'a> {
    pub fn new(comp: &'a Compilation, scope: ScopeId, flags: BindFlags) -> Self {
        BindContext {
            comp,
            scope,
            location: LookupLocation::at_end(scope),
            flags,
            iterators: Vec::new(),
        }
    }
}

/// Bind an expression syntax tree.
pub fn bind_expr(ctx: &mut BindContext<'_>, syntax: &ExprSyntax) -> Expression {
    crate::ensure_sufficient_stack(|| bind_expr_inner(ctx, syntax))
}

fn bind_expr_inner(ctx: &mut BindContext<'_>, syntax: &ExprSyntax) -> Expression {
    let span = syntax.span;
    match &syntax.kind {
        ExprSyntaxKind::IntegerLiteral {
            value,
            width,
            signed,
        } => {
            let ty = if *width == 32 && *signed {
                TypeId::INT
            } else {
                ctx.comp.integral_type(*width, *signed, false)
            };
            Expression::new(
                ExprKind::IntegerLiteral(LogicVec::new(*width, *signed, *value)),
                ty,
                span,
            )
        }
        ExprSyntaxKind::RealLiteral(value) => {
            Expression::new(ExprKind::RealLiteral(*value), TypeId::REAL, span)
        }
        ExprSyntaxKind::StringLiteral(value) => {
            Expression::new(ExprKind::StringLiteral(value.clone()), TypeId::STRING, span)
        }
        ExprSyntaxKind::NullLiteral => Expression::new(ExprKind::NullLiteral, TypeId::NULL, span),
        ExprSyntaxKind::Identifier(name) => bind_identifier(ctx, *name, span),
        ExprSyntaxKind::HierarchicalName(parts) => bind_hierarchical(ctx, parts, span),
        ExprSyntaxKind::Unary { op, operand } => {
            let operand = bind_expr(ctx, operand);
            bind_unary(ctx, *op, operand, span)
        }
        ExprSyntaxKind::Binary { op, lhs, rhs } => {
            let lhs = bind_expr(ctx, lhs);
            let rhs = bind_expr(ctx, rhs);
            bind_binary(ctx, *op, lhs, rhs, span)
        }
        ExprSyntaxKind::Conditional {
            cond,
            then_expr,
            else_expr,
        } => {
            let cond = bind_expr(ctx, cond);
            let then_expr = bind_expr(ctx, then_expr);
            let else_expr = bind_expr(ctx, else_expr);
            bind_conditional(ctx, cond, then_expr, else_expr, span)
        }
        ExprSyntaxKind::ElementSelect { value, index } => {
            let value = bind_expr(ctx, value);
            let index = bind_expr(ctx, index);
            bind_element_select(ctx, value, index, span)
        }
        ExprSyntaxKind::MemberAccess {
            value,
            member,
            member_span,
        } => {
            let value = bind_expr(ctx, value);
            bind_member_access(ctx, value, *member, *member_span, span)
        }
        ExprSyntaxKind::Call {
            callee,
            args,
            with_clause,
        } => bind_call(ctx, callee, args, with_clause.as_deref(), span),
        ExprSyntaxKind::Assignment {
            target,
            value,
            nonblocking,
        } => {
            let target = bind_expr(ctx, target);
            let value = bind_expr(ctx, value);
            bind_assignment(ctx, target, value, *nonblocking, span)
        }
        ExprSyntaxKind::Cast { ty, operand } => {
            let target = ctx
                .comp
                .resolve_type(ty, ctx.scope, ctx.location, None);
            let operand = bind_expr(ctx, operand);
            if operand.is_invalid() || target.is_error() {
                return Expression::invalid(Some(operand), span);
            }
            if !ctx.comp.types.is_cast_compatible(target, operand.ty) {
                ctx.comp.report(
                    Diagnostic::error(ErrorCode::E4102)
                        .with_message(format!(
                            "cannot cast '{}' to '{}'",
                            type_name(ctx.comp, operand.ty),
                            type_name(ctx.comp, target)
                        ))
                        .with_label(span, "invalid cast"),
                );
                return Expression::invalid(Some(operand), span);
            }
            Expression::new(
                ExprKind::Conversion {
                    operand: Box::new(operand),
                    implicit: false,
                },
                target,
                span,
            )
        }
        ExprSyntaxKind::DataType(ty) => {
            if !ctx.flags.contains(BindFlags::ALLOW_DATA_TYPE) {
                ctx.comp.report(
                    Diagnostic::error(ErrorCode::E4003)
                        .with_message("a data type is not a value")
                        .with_label(span, "type used in expression position"),
                );
                return Expression::invalid(None, span);
            }
            let resolved = ctx.comp.resolve_type(ty, ctx.scope, ctx.location, None);
            Expression::new(ExprKind::DataTypeRef, resolved, span)
        }
    }
}

pub(crate) fn type_name(comp: &Compilation, ty: TypeId) -> String {
    comp.types.type_str(ty, &comp.interner)
}

fn bind_identifier(ctx: &mut BindContext<'_>, name: Name, span: Span) -> Expression {
    // Iterator variables shadow everything else inside a `with` clause.
    if let Some(&(_, sym)) = ctx.iterators.iter().rev().find(|(n, _)| *n == name) {
        return Expression::new(
            ExprKind::NamedValue {
                symbol: sym,
                assignable: false,
                hierarchical: false,
            },
            ctx.comp.value_type(sym),
            span,
        );
    }

    let Some(sym) = ctx
        .comp
        .lookup_unqualified(Namespace::Members, name, ctx.location)
    else {
        ctx.comp.report(
            Diagnostic::error(ErrorCode::E4001)
                .with_message(format!(
                    "use of undeclared identifier '{}'",
                    ctx.comp.interner.resolve(name)
                ))
                .with_label(span, "not found in this scope"),
        );
        return Expression::invalid(None, span);
    };
    bind_symbol_reference(ctx, sym, span)
}

/// Turn a resolved symbol into an expression, enforcing value/type and
/// access rules.
fn bind_symbol_reference(ctx: &mut BindContext<'_>, sym: SymbolId, span: Span) -> Expression {
    let symbol = ctx.comp.symbol(sym);
    if symbol.kind.is_value() {
        let is_automatic = match symbol.kind {
            SymbolKind::Variable => ctx.comp.variable_lifetime(sym) == Lifetime::Automatic,
            SymbolKind::FormalArg => true,
            _ => false,
        };
        if is_automatic && ctx.flags.contains(BindFlags::STATIC_INITIALIZER) {
            ctx.comp.report(
                Diagnostic::error(ErrorCode::E4304)
                    .with_message(format!(
                        "automatic variable '{}' referenced from a static initializer",
                        ctx.comp.interner.resolve(symbol.name)
                    ))
                    .with_label(span, "referenced here")
                    .with_secondary_label(symbol.span, "declared automatic"),
            );
            return Expression::invalid(None, span);
        }
        if symbol.kind == SymbolKind::ClassProperty && !property_is_static(ctx.comp, sym) {
            let prop_class = symbol.parent.map(|p| ctx.comp.scope_owner(p));
            let here = ctx.comp.scope_class(ctx.scope);
            // A derived class sees the non-static properties it inherits.
            let accessible = match (here, prop_class) {
                (Some(here), Some(owner)) => {
                    here == owner
                        || ctx.comp.types.is_assignment_compatible(
                            ctx.comp.class_type(owner),
                            ctx.comp.class_type(here),
                        )
                }
                _ => false,
            };
            if !accessible {
                if here.is_some() {
                    ctx.comp.report(
                        Diagnostic::error(ErrorCode::E4303)
                            .with_message(format!(
                                "cannot reach non-static property '{}' of another class",
                                ctx.comp.interner.resolve(symbol.name)
                            ))
                            .with_label(span, "referenced here"),
                    );
                } else {
                    ctx.comp.report(
                        Diagnostic::error(ErrorCode::E4302)
                            .with_message(format!(
                                "non-static property '{}' requires an object",
                                ctx.comp.interner.resolve(symbol.name)
                            ))
                            .with_label(span, "no object here"),
                    );
                }
                return Expression::invalid(None, span);
            }
            // Accessible by class, but a static context still has no
            // `this` to read it through.
            let static_context = ctx.flags.contains(BindFlags::STATIC_INITIALIZER)
                || enclosing_subroutine(ctx.comp, ctx.scope).is_some_and(|s| {
                    ctx.comp
                        .subroutine_sig(s)
                        .flags
                        .contains(MethodFlags::STATIC)
                });
            if static_context {
                ctx.comp.report(
                    Diagnostic::error(ErrorCode::E4302)
                        .with_message(format!(
                            "non-static property '{}' requires an object",
                            ctx.comp.interner.resolve(symbol.name)
                        ))
                        .with_label(span, "no object in a static context"),
                );
                return Expression::invalid(None, span);
            }
        }
        let assignable = matches!(
            symbol.kind,
            SymbolKind::Variable | SymbolKind::ClassProperty | SymbolKind::FormalArg
        );
        return Expression::new(
            ExprKind::NamedValue {
                symbol: sym,
                assignable,
                hierarchical: false,
            },
            ctx.comp.value_type(sym),
            span,
        );
    }

    if symbol.kind.is_type() {
        if ctx.flags.contains(BindFlags::ALLOW_DATA_TYPE) {
            let ty = match symbol.kind {
                SymbolKind::TypeAlias => ctx.comp.typedef_type(sym),
                _ => ctx.comp.class_type(sym),
            };
            return Expression::new(ExprKind::DataTypeRef, ty, span);
        }
        ctx.comp.report(
            Diagnostic::error(ErrorCode::E4003)
                .with_message(format!(
                    "'{}' is a type, not a value",
                    ctx.comp.interner.resolve(symbol.name)
                ))
                .with_label(span, "used in expression position"),
        );
        return Expression::invalid(None, span);
    }

    let what = match symbol.kind {
        SymbolKind::Subroutine => "a subroutine; call it with parentheses",
        SymbolKind::Module => "a module",
        SymbolKind::Package => "a package",
        _ => "not a value",
    };
    ctx.comp.report(
        Diagnostic::error(ErrorCode::E4003)
            .with_message(format!(
                "'{}' is {what}",
                ctx.comp.interner.resolve(symbol.name)
            ))
            .with_label(span, "used in expression position"),
    );
    Expression::invalid(None, span)
}

/// The subroutine whose body encloses `scope`, if any.
fn enclosing_subroutine(comp: &Compilation, scope: ScopeId) -> Option<SymbolId> {
    let mut current = Some(scope);
    while let Some(s) = current {
        let owner = comp.scope_owner(s);
        if comp.symbol(owner).kind == SymbolKind::Subroutine {
            return Some(owner);
        }
        current = comp.scope_parent(s);
    }
    None
}

/// Static class properties are those declared with an explicit `static`
/// lifetime.
fn property_is_static(comp: &Compilation, sym: SymbolId) -> bool {
    match &comp.symbol(sym).data {
        crate::symbol::SymbolData::Variable(syntax) => syntax.lifetime == Some(Lifetime::Static),
        _ => false,
    }
}

fn bind_hierarchical(ctx: &mut BindContext<'_>, parts: &[Name], span: Span) -> Expression {
    // Package-qualified names stay legal in constant expressions; true
    // hierarchical references do not.
    if parts.len() == 2 {
        if let Some(pkg) = ctx.comp.lookup_package(parts[0]) {
            if let Some(scope) = ctx.comp.symbol(pkg).owned_scope() {
                if let Some(found) = ctx.comp.scope_find(scope, Namespace::Members, parts[1]) {
                    return bind_symbol_reference(ctx, found, span);
                }
            }
            ctx.comp.report(
                Diagnostic::error(ErrorCode::E4001)
                    .with_message(format!(
                        "no member '{}' in package '{}'",
                        ctx.comp.interner.resolve(parts[1]),
                        ctx.comp.interner.resolve(parts[0])
                    ))
                    .with_label(span, "not found"),
            );
            return Expression::invalid(None, span);
        }
    }

    // Walk the path from the first resolvable name.
    let Some(mut sym) = ctx
        .comp
        .lookup_unqualified(Namespace::Definitions, parts[0], ctx.location)
        .or_else(|| {
            ctx.comp
                .lookup_unqualified(Namespace::Members, parts[0], ctx.location)
        })
    else {
        ctx.comp.report(
            Diagnostic::error(ErrorCode::E4001)
                .with_message(format!(
                    "use of undeclared identifier '{}'",
                    ctx.comp.interner.resolve(parts[0])
                ))
                .with_label(span, "in hierarchical name"),
        );
        return Expression::invalid(None, span);
    };
    for &part in &parts[1..] {
        let Some(scope) = ctx.comp.symbol(sym).owned_scope() else {
            ctx.comp.report(
                Diagnostic::error(ErrorCode::E4001)
                    .with_message(format!(
                        "'{}' has no members",
                        ctx.comp.symbol_name_str(sym)
                    ))
                    .with_label(span, "in hierarchical name"),
            );
            return Expression::invalid(None, span);
        };
        let found = ctx
            .comp
            .scope_find(scope, Namespace::Members, part)
            .or_else(|| ctx.comp.scope_find(scope, Namespace::Definitions, part));
        match found {
            Some(next) => sym = next,
            None => {
                ctx.comp.report(
                    Diagnostic::error(ErrorCode::E4001)
                        .with_message(format!(
                            "no member '{}' in '{}'",
                            ctx.comp.interner.resolve(part),
                            ctx.comp.symbol_name_str(sym)
                        ))
                        .with_label(span, "not found"),
                );
                return Expression::invalid(None, span);
            }
        }
    }
    let mut bound = bind_symbol_reference(ctx, sym, span);
    // Binding succeeds even in constant contexts; the evaluator rejects
    // the reference if it is ever asked for its value.
    if let ExprKind::NamedValue { hierarchical, .. } = &mut bound.kind {
        *hierarchical = true;
    }
    bound
}

/// The 1-bit result type of a comparison or logical connective.
fn predicate_type(comp: &Compilation, four_state: bool) -> TypeId {
    if four_state {
        TypeId::LOGIC
    } else {
        TypeId::BIT
    }
}

/// Check that an expression can be used as a condition, reporting E4104.
pub(crate) fn require_boolean(ctx: &BindContext<'_>, expr: &Expression) -> bool {
    if expr.is_invalid() {
        return false;
    }
    if ctx.comp.types.is_boolean_convertible(expr.ty) {
        return true;
    }
    ctx.comp.report(
        Diagnostic::error(ErrorCode::E4104)
            .with_message(format!(
                "'{}' cannot be converted to a predicate",
                type_name(ctx.comp, expr.ty)
            ))
            .with_label(expr.span, "used as a condition"),
    );
    false
}

fn bind_unary(
    ctx: &mut BindContext<'_>,
    op: UnaryOpSyntax,
    operand: Expression,
    span: Span,
) -> Expression {
    if operand.is_invalid() {
        return Expression::invalid(Some(operand), span);
    }
    let types = &ctx.comp.types;
    let ty = match op {
        UnaryOpSyntax::Plus | UnaryOpSyntax::Minus => {
            if !types.is_numeric(operand.ty) {
                return unary_operand_error(ctx, op, operand, span);
            }
            operand.ty
        }
        UnaryOpSyntax::BitwiseNot => {
            if !types.is_integral(operand.ty) {
                return unary_operand_error(ctx, op, operand, span);
            }
            operand.ty
        }
        UnaryOpSyntax::LogicalNot => {
            if !require_boolean(ctx, &operand) {
                return Expression::invalid(Some(operand), span);
            }
            predicate_type(ctx.comp, types.is_four_state(operand.ty))
        }
    };
    Expression::new(
        ExprKind::Unary {
            op,
            operand: Box::new(operand),
        },
        ty,
        span,
    )
}

fn unary_operand_error(
    ctx: &BindContext<'_>,
    op: UnaryOpSyntax,
    operand: Expression,
    span: Span,
) -> Expression {
    ctx.comp.report(
        Diagnostic::error(ErrorCode::E4106)
            .with_message(format!(
                "invalid operand type '{}' for unary operator {op:?}",
                type_name(ctx.comp, operand.ty)
            ))
            .with_label(operand.span, "invalid operand"),
    );
    Expression::invalid(Some(operand), span)
}

fn bind_binary(
    ctx: &mut BindContext<'_>,
    op: BinaryOpSyntax,
    lhs: Expression,
    rhs: Expression,
    span: Span,
) -> Expression {
    if lhs.is_invalid() || rhs.is_invalid() {
        return Expression::invalid(None, span);
    }
    let types = &ctx.comp.types;
    let four_state = types.is_four_state(lhs.ty) || types.is_four_state(rhs.ty);

    let ty = match op {
        BinaryOpSyntax::LogicalAnd | BinaryOpSyntax::LogicalOr => {
            let lok = require_boolean(ctx, &lhs);
            let rok = require_boolean(ctx, &rhs);
            if !lok || !rok {
                return Expression::invalid(None, span);
            }
            predicate_type(ctx.comp, four_state)
        }
        BinaryOpSyntax::Equality | BinaryOpSyntax::Inequality => {
            let comparable = (types.is_numeric(lhs.ty) && types.is_numeric(rhs.ty))
                || (types.is_string(lhs.ty) && types.is_string(rhs.ty))
                || class_comparable(ctx.comp, lhs.ty, rhs.ty)
                || types.is_equivalent(lhs.ty, rhs.ty);
            if !comparable {
                return binary_operand_error(ctx, op, lhs, rhs, span);
            }
            predicate_type(ctx.comp, four_state)
        }
        BinaryOpSyntax::LessThan
        | BinaryOpSyntax::LessThanEqual
        | BinaryOpSyntax::GreaterThan
        | BinaryOpSyntax::GreaterThanEqual => {
            let comparable = (types.is_numeric(lhs.ty) && types.is_numeric(rhs.ty))
                || (types.is_string(lhs.ty) && types.is_string(rhs.ty));
            if !comparable {
                return binary_operand_error(ctx, op, lhs, rhs, span);
            }
            predicate_type(ctx.comp, four_state)
        }
        BinaryOpSyntax::ShiftLeft | BinaryOpSyntax::ShiftRight => {
            if !types.is_integral(lhs.ty) || !types.is_integral(rhs.ty) {
                return binary_operand_error(ctx, op, lhs, rhs, span);
            }
            // The shift amount is self-determined; the result keeps the
            // left operand's type.
            lhs.ty
        }
        BinaryOpSyntax::BinaryAnd | BinaryOpSyntax::BinaryOr | BinaryOpSyntax::BinaryXor => {
            if !types.is_integral(lhs.ty) || !types.is_integral(rhs.ty) {
                return binary_operand_error(ctx, op, lhs, rhs, span);
            }
            merge_integral(ctx.comp, lhs.ty, rhs.ty)
        }
        BinaryOpSyntax::Add
        | BinaryOpSyntax::Subtract
        | BinaryOpSyntax::Multiply
        | BinaryOpSyntax::Divide
        | BinaryOpSyntax::Mod => {
            if !types.is_numeric(lhs.ty) || !types.is_numeric(rhs.ty) {
                return binary_operand_error(ctx, op, lhs, rhs, span);
            }
            if types.is_real(lhs.ty) || types.is_real(rhs.ty) {
                TypeId::REAL
            } else {
                merge_integral(ctx.comp, lhs.ty, rhs.ty)
            }
        }
    };
    Expression::new(
        ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        ty,
        span,
    )
}

fn class_comparable(comp: &Compilation, a: TypeId, b: TypeId) -> bool {
    (comp.types.is_class(a) || comp.types.is_null(a))
        && (comp.types.is_class(b) || comp.types.is_null(b))
}

fn binary_operand_error(
    ctx: &BindContext<'_>,
    op: BinaryOpSyntax,
    lhs: Expression,
    rhs: Expression,
    span: Span,
) -> Expression {
    ctx.comp.report(
        Diagnostic::error(ErrorCode::E4105)
            .with_message(format!(
                "invalid operands '{}' and '{}' for binary operator {op:?}",
                type_name(ctx.comp, lhs.ty),
                type_name(ctx.comp, rhs.ty)
            ))
            .with_label(span, "invalid operation"),
    );
    Expression::invalid(None, span)
}

/// The usual arithmetic result type for two integral operands: maximum
/// width, signed only if both are, 4-state if either is.
pub(crate) fn merge_integral(comp: &Compilation, a: TypeId, b: TypeId) -> TypeId {
    let width = comp.types.bit_width(a).max(comp.types.bit_width(b)).max(1);
    let signed = comp.types.is_signed(a) && comp.types.is_signed(b);
    let four_state = comp.types.is_four_state(a) || comp.types.is_four_state(b);
    comp.integral_type(width, signed, four_state)
}

fn bind_conditional(
    ctx: &mut BindContext<'_>,
    cond: Expression,
    then_expr: Expression,
    else_expr: Expression,
    span: Span,
) -> Expression {
    if cond.is_invalid() || then_expr.is_invalid() || else_expr.is_invalid() {
        return Expression::invalid(None, span);
    }
    if !require_boolean(ctx, &cond) {
        return Expression::invalid(Some(cond), span);
    }
    let types = &ctx.comp.types;
    let (a, b) = (then_expr.ty, else_expr.ty);
    let ty = if types.is_equivalent(a, b) {
        a
    } else if types.is_numeric(a) && types.is_numeric(b) {
        if types.is_real(a) || types.is_real(b) {
            TypeId::REAL
        } else {
            merge_integral(ctx.comp, a, b)
        }
    } else if types.is_class(a) && types.is_null(b) {
        a
    } else if types.is_null(a) && types.is_class(b) {
        b
    } else if types.is_class(a) && types.is_class(b) {
        match types.common_base(a, b) {
            Some(base) => base,
            None => {
                return conditional_arm_error(ctx, then_expr, else_expr, span);
            }
        }
    } else {
        return conditional_arm_error(ctx, then_expr, else_expr, span);
    };
    Expression::new(
        ExprKind::Conditional {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        },
        ty,
        span,
    )
}

fn conditional_arm_error(
    ctx: &BindContext<'_>,
    then_expr: Expression,
    else_expr: Expression,
    span: Span,
) -> Expression {
    ctx.comp.report(
        Diagnostic::error(ErrorCode::E4108)
            .with_message(format!(
                "conditional arms have incompatible types '{}' and '{}'",
                type_name(ctx.comp, then_expr.ty),
                type_name(ctx.comp, else_expr.ty)
            ))
            .with_label(then_expr.span, "this arm")
            .with_secondary_label(else_expr.span, "and this one"),
    );
    Expression::invalid(None, span)
}

fn bind_element_select(
    ctx: &mut BindContext<'_>,
    value: Expression,
    index: Expression,
    span: Span,
) -> Expression {
    if value.is_invalid() || index.is_invalid() {
        return Expression::invalid(None, span);
    }
    let types = &ctx.comp.types;
    let elem = if types.is_string(value.ty) {
        Some(TypeId::BYTE)
    } else {
        types.element_type(value.ty)
    };
    let Some(elem) = elem else {
        ctx.comp.report(
            Diagnostic::error(ErrorCode::E4107)
                .with_message(format!(
                    "type '{}' cannot be indexed",
                    type_name(ctx.comp, value.ty)
                ))
                .with_label(value.span, "not an array"),
        );
        return Expression::invalid(Some(value), span);
    };
    // Associative arrays index with their declared key type; everything
    // else wants an integral index.
    let index_ok = match types.get(types.canonical(value.ty)) {
        TypeData::Associative {
            index: Some(key), ..
        } => types.is_assignment_compatible(key, index.ty),
        _ => types.is_integral(index.ty),
    };
    if !index_ok {
        ctx.comp.report(
            Diagnostic::error(ErrorCode::E4101)
                .with_message(format!(
                    "'{}' is not a valid index for '{}'",
                    type_name(ctx.comp, index.ty),
                    type_name(ctx.comp, value.ty)
                ))
                .with_label(index.span, "invalid index"),
        );
        return Expression::invalid(None, span);
    }
    Expression::new(
        ExprKind::ElementSelect {
            value: Box::new(value),
            index: Box::new(index),
        },
        elem,
        span,
    )
}

fn bind_member_access(
    ctx: &mut BindContext<'_>,
    value: Expression,
    member: Name,
    member_span: Span,
    span: Span,
) -> Expression {
    if value.is_invalid() {
        return Expression::invalid(Some(value), span);
    }
    let types = &ctx.comp.types;
    match types.get(types.canonical(value.ty)) {
        TypeData::UnpackedStruct { fields, .. } => {
            let found = fields
                .iter()
                .enumerate()
                .find(|(_, (name, _))| *name == member);
            match found {
                Some((idx, &(_, field_ty))) => Expression::new(
                    ExprKind::MemberAccess {
                        value: Box::new(value),
                        member: MemberRef::Field(idx as u32),
                    },
                    field_ty,
                    span,
                ),
                None => unknown_member(ctx, value, member, member_span, span),
            }
        }
        TypeData::Class { .. } => {
            match find_class_property(ctx.comp, value.ty, member) {
                Some(prop) => {
                    let ty = ctx.comp.variable_type(prop);
                    Expression::new(
                        ExprKind::MemberAccess {
                            value: Box::new(value),
                            member: MemberRef::Property(prop),
                        },
                        ty,
                        span,
                    )
                }
                None => unknown_member(ctx, value, member, member_span, span),
            }
        }
        _ => unknown_member(ctx, value, member, member_span, span),
    }
}

/// Walk a class and its base classes looking for a property.
pub(crate) fn find_class_property(
    comp: &Compilation,
    class_ty: TypeId,
    name: Name,
) -> Option<SymbolId> {
    let mut current = Some(comp.types.canonical(class_ty));
    while let Some(ty) = current {
        let TypeData::Class { decl, base, .. } = comp.types.get(ty) else {
            return None;
        };
        let class_sym = SymbolId::from_raw(decl);
        if let Some(scope) = comp.symbol(class_sym).owned_scope() {
            if let Some(found) = comp.scope_find(scope, Namespace::Members, name) {
                if comp.symbol(found).kind == SymbolKind::ClassProperty {
                    return Some(found);
                }
            }
        }
        current = base;
    }
    None
}

fn unknown_member(
    ctx: &BindContext<'_>,
    value: Expression,
    member: Name,
    member_span: Span,
    span: Span,
) -> Expression {
    ctx.comp.report(
        Diagnostic::error(ErrorCode::E4109)
            .with_message(format!(
                "no member '{}' in type '{}'",
                ctx.comp.interner.resolve(member),
                type_name(ctx.comp, value.ty)
            ))
            .with_label(member_span, "unknown member"),
    );
    Expression::invalid(Some(value), span)
}

fn bind_assignment(
    ctx: &mut BindContext<'_>,
    target: Expression,
    value: Expression,
    nonblocking: bool,
    span: Span,
) -> Expression {
    if target.is_invalid() || value.is_invalid() {
        return Expression::invalid(None, span);
    }
    if !target.is_lvalue() {
        let mut diag = Diagnostic::error(ErrorCode::E4103)
            .with_message("left side of assignment is not assignable")
            .with_label(target.span, "cannot assign to this");
        if let ExprKind::NamedValue { symbol, .. } = target.kind {
            let declared = ctx.comp.symbol(symbol);
            diag = diag.with_secondary_label(declared.span, "declared here");
        }
        ctx.comp.report(diag);
        return Expression::invalid(None, span);
    }
    let value = convert_assignment(ctx, target.ty, value);
    if value.is_invalid() {
        return Expression::invalid(None, span);
    }
    let ty = target.ty;
    Expression::new(
        ExprKind::Assignment {
            target: Box::new(target),
            value: Box::new(value),
            nonblocking,
        },
        ty,
        span,
    )
}

/// Check assignment compatibility and insert an implicit conversion when
/// the representation changes.
pub(crate) fn convert_assignment(
    ctx: &mut BindContext<'_>,
    target: TypeId,
    expr: Expression,
) -> Expression {
    if expr.is_invalid() || target.is_error() || expr.ty.is_error() {
        return expr;
    }
    let types = &ctx.comp.types;
    if types.is_matching(target, expr.ty) {
        return expr;
    }
    if !types.is_assignment_compatible(target, expr.ty) {
        ctx.comp.report(
            Diagnostic::error(ErrorCode::E4101)
                .with_message(format!(
                    "cannot assign '{}' to '{}'",
                    type_name(ctx.comp, expr.ty),
                    type_name(ctx.comp, target)
                ))
                .with_label(expr.span, "incompatible types"),
        );
        let span = expr.span;
        return Expression::invalid(Some(expr), span);
    }
    let span = expr.span;
    Expression::new(
        ExprKind::Conversion {
            operand: Box::new(expr),
            implicit: true,
        },
        target,
        span,
    )
}
