//! Call binding: callee resolution, argument matching, system dispatch.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use silica_diagnostic::{Diagnostic, ErrorCode};
use smallvec::SmallVec;
use silica_syntax::ast::{
    ArgDirection, ArgSyntax, ArgSyntaxKind, ExprSyntax, ExprSyntaxKind, WithClauseSyntax,
};
use silica_syntax::{Name, Span};
use silica_types::{TypeData, TypeId};

use crate::expression::{Callee, ExprKind, Expression, IteratorCall, SystemCallInfo};
use crate::scope::LookupLocation;
use crate::symbol::{
    MethodFlags, Namespace, Symbol, SymbolData, SymbolId, SymbolKind,
};
use crate::system::{self, SystemSubroutine, WithClauseMode};

use super::{bind_expr, convert_assignment, BindContext, BindFlags};

pub(crate) fn bind_call(
    ctx: &mut BindContext<'_>,
    callee: &ExprSyntax,
    args: &[ArgSyntax],
    with_clause: Option<&WithClauseSyntax>,
    span: Span,
) -> Expression {
    match &callee.kind {
        ExprSyntaxKind::Identifier(name) => {
            let text = ctx.comp.interner.resolve(*name);
            if text.starts_with('$') {
                let Some(sub) = ctx.comp.system_subroutine(*name) else {
                    ctx.comp.report(
                        Diagnostic::error(ErrorCode::E4005)
                            .with_message(format!("unknown system subroutine '{text}'"))
                            .with_label(callee.span, "not a known system function"),
                    );
                    return Expression::invalid(None, span);
                };
                return bind_system_call(ctx, sub, None, args, with_clause, span);
            }

            let Some(sym) = ctx
                .comp
                .lookup_unqualified(Namespace::Members, *name, ctx.location)
            else {
                ctx.comp.report(
                    Diagnostic::error(ErrorCode::E4001)
                        .with_message(format!("use of undeclared identifier '{text}'"))
                        .with_label(callee.span, "not found in this scope"),
                );
                return Expression::invalid(None, span);
            };
            if ctx.comp.symbol(sym).kind != SymbolKind::Subroutine {
                ctx.comp.report(
                    Diagnostic::error(ErrorCode::E4004)
                        .with_message(format!("'{text}' is not callable"))
                        .with_label(callee.span, "called here")
                        .with_secondary_label(ctx.comp.symbol(sym).span, "declared here"),
                );
                return Expression::invalid(None, span);
            }
            if !check_bare_method_access(ctx, sym, callee.span) {
                return Expression::invalid(None, span);
            }
            bind_user_call(ctx, sym, args, with_clause, span)
        }
        ExprSyntaxKind::MemberAccess {
            value,
            member,
            member_span,
        } => {
            let receiver = bind_expr(ctx, value);
            if receiver.is_invalid() {
                return Expression::invalid(Some(receiver), span);
            }
            bind_method_call(ctx, receiver, *member, *member_span, args, with_clause, span)
        }
        _ => {
            ctx.comp.report(
                Diagnostic::error(ErrorCode::E4004)
                    .with_message("expression is not callable")
                    .with_label(callee.span, "called here"),
            );
            Expression::invalid(None, span)
        }
    }
}

/// A non-static method named without a receiver only works inside its own
/// class.
fn check_bare_method_access(ctx: &BindContext<'_>, sym: SymbolId, span: Span) -> bool {
    let sig = ctx.comp.subroutine_sig(sym);
    let Some(class) = sig.class else {
        return true;
    };
    if sig.flags.contains(MethodFlags::STATIC) {
        return true;
    }
    match ctx.comp.scope_class(ctx.scope) {
        Some(here) if here == class => true,
        Some(_) => {
            ctx.comp.report(
                Diagnostic::error(ErrorCode::E4306)
                    .with_message(format!(
                        "cannot call non-static method '{}' of another class",
                        ctx.comp.symbol_name_str(sym)
                    ))
                    .with_label(span, "called here"),
            );
            false
        }
        None => {
            ctx.comp.report(
                Diagnostic::error(ErrorCode::E4305)
                    .with_message(format!(
                        "non-static method '{}' requires an object",
                        ctx.comp.symbol_name_str(sym)
                    ))
                    .with_label(span, "no object here"),
            );
            false
        }
    }
}

fn bind_method_call(
    ctx: &mut BindContext<'_>,
    receiver: Expression,
    member: Name,
    member_span: Span,
    args: &[ArgSyntax],
    with_clause: Option<&WithClauseSyntax>,
    span: Span,
) -> Expression {
    let types = &ctx.comp.types;
    if types.is_class(receiver.ty) {
        let Some(method) = find_class_method(ctx, receiver.ty, member) else {
            ctx.comp.report(
                Diagnostic::error(ErrorCode::E4109)
                    .with_message(format!(
                        "no method '{}' in class '{}'",
                        ctx.comp.interner.resolve(member),
                        super::type_name(ctx.comp, receiver.ty)
                    ))
                    .with_label(member_span, "unknown method"),
            );
            return Expression::invalid(Some(receiver), span);
        };
        // The receiver establishes the dispatch type and is then dropped:
        // constant contexts reject non-static methods outright.
        return bind_user_call(ctx, method, args, with_clause, span);
    }

    let name = ctx.comp.interner.resolve(member);
    if let Some(sub) = system::array_method(name) {
        return bind_system_call(ctx, sub, Some(receiver), args, with_clause, span);
    }

    ctx.comp.report(
        Diagnostic::error(ErrorCode::E4109)
            .with_message(format!(
                "no member '{}' in type '{}'",
                name,
                super::type_name(ctx.comp, receiver.ty)
            ))
            .with_label(member_span, "unknown member"),
    );
    Expression::invalid(Some(receiver), span)
}

fn find_class_method(
    ctx: &BindContext<'_>,
    class_ty: TypeId,
    name: Name,
) -> Option<SymbolId> {
    let mut current = Some(ctx.comp.types.canonical(class_ty));
    while let Some(ty) = current {
        let TypeData::Class { decl, base, .. } = ctx.comp.types.get(ty) else {
            return None;
        };
        let class_sym = SymbolId::from_raw(decl);
        if let Some(scope) = ctx.comp.symbol(class_sym).owned_scope() {
            if let Some(found) = ctx.comp.scope_find(scope, Namespace::Members, name) {
                if ctx.comp.symbol(found).kind == SymbolKind::Subroutine {
                    return Some(found);
                }
            }
        }
        current = base;
    }
    None
}

// ---------------------------------------------------------------------
// User subroutine calls
// ---------------------------------------------------------------------

fn bind_user_call(
    ctx: &mut BindContext<'_>,
    sym: SymbolId,
    args: &[ArgSyntax],
    with_clause: Option<&WithClauseSyntax>,
    span: Span,
) -> Expression {
    if let Some(with) = with_clause {
        ctx.comp.report(
            Diagnostic::error(ErrorCode::E4209)
                .with_message(format!(
                    "'{}' does not take a 'with' clause",
                    ctx.comp.symbol_name_str(sym)
                ))
                .with_label(with.with_span, "unexpected clause"),
        );
        return Expression::invalid(None, span);
    }

    let sig = ctx.comp.subroutine_sig(sym);
    let Some(bound) = resolve_arguments(ctx, sym, &sig.formals, args, span) else {
        return Expression::invalid(None, span);
    };
    Expression::new(
        ExprKind::Call {
            callee: Callee::User(sym),
            args: bound,
        },
        sig.return_type,
        span,
    )
}

/// Match call arguments against formals: ordered first, then named, with
/// defaults filling the gaps.
fn resolve_arguments(
    ctx: &mut BindContext<'_>,
    sym: SymbolId,
    formals: &[SymbolId],
    args: &[ArgSyntax],
    span: Span,
) -> Option<Vec<Expression>> {
    let mut ordered: SmallVec<[&ArgSyntax; 8]> = SmallVec::new();
    let mut named: FxHashMap<Name, &ArgSyntax> = FxHashMap::default();
    let mut seen_named = false;
    let mut ok = true;

    for arg in args {
        match &arg.kind {
            ArgSyntaxKind::Ordered(_) | ArgSyntaxKind::Empty => {
                if seen_named {
                    ctx.comp.report(
                        Diagnostic::error(ErrorCode::E4207)
                            .with_message("positional arguments must precede named arguments")
                            .with_label(arg.span, "positional argument here"),
                    );
                    ok = false;
                    continue;
                }
                ordered.push(arg);
            }
            ArgSyntaxKind::Named {
                name, name_span, ..
            } => {
                seen_named = true;
                if named.insert(*name, arg).is_some() {
                    ctx.comp.report(
                        Diagnostic::error(ErrorCode::E4203)
                            .with_message(format!(
                                "argument '{}' assigned more than once",
                                ctx.comp.interner.resolve(*name)
                            ))
                            .with_label(*name_span, "duplicate assignment"),
                    );
                    ok = false;
                }
            }
        }
    }

    if ordered.len() > formals.len() {
        ctx.comp.report(
            Diagnostic::error(ErrorCode::E4202)
                .with_message(format!(
                    "too many arguments to '{}': expected at most {}, got {}",
                    ctx.comp.symbol_name_str(sym),
                    formals.len(),
                    ordered.len()
                ))
                .with_label(span, "in this call"),
        );
        ok = false;
    }

    let mut bound = Vec::with_capacity(formals.len());
    let mut missing: SmallVec<[(Name, Span); 4]> = SmallVec::new();
    for (i, &formal) in formals.iter().enumerate() {
        let fsym = ctx.comp.symbol(formal);
        let SymbolData::FormalArg(fsyntax) = &fsym.data else {
            return None;
        };
        let fty = ctx.comp.formal_type(formal);

        let expr = if let Some(arg) = ordered.get(i) {
            if let Some(dup) = named.remove(&fsym.name) {
                ctx.comp.report(
                    Diagnostic::error(ErrorCode::E4203)
                        .with_message(format!(
                            "argument '{}' is already assigned positionally",
                            ctx.comp.interner.resolve(fsym.name)
                        ))
                        .with_label(dup.span, "assigned again here")
                        .with_secondary_label(arg.span, "positional value here"),
                );
                ok = false;
            }
            match &arg.kind {
                ArgSyntaxKind::Ordered(expr) => Some(bind_argument(ctx, expr, fty, fsyntax.direction)),
                ArgSyntaxKind::Empty => {
                    let dflt = bind_default(ctx, formal, fsyntax.default.as_ref(), fty);
                    if dflt.is_none() {
                        ctx.comp.report(
                            Diagnostic::error(ErrorCode::E4206)
                                .with_message(format!(
                                    "argument '{}' cannot be empty: it has no default",
                                    ctx.comp.interner.resolve(fsym.name)
                                ))
                                .with_label(arg.span, "empty argument"),
                        );
                        ok = false;
                    }
                    dflt
                }
                ArgSyntaxKind::Named { .. } => None,
            }
        } else if let Some(arg) = named.remove(&fsym.name) {
            let ArgSyntaxKind::Named { expr, name_span, .. } = &arg.kind else {
                return None;
            };
            match expr {
                Some(expr) => Some(bind_argument(ctx, expr, fty, fsyntax.direction)),
                None => {
                    let dflt = bind_default(ctx, formal, fsyntax.default.as_ref(), fty);
                    if dflt.is_none() {
                        ctx.comp.report(
                            Diagnostic::error(ErrorCode::E4205)
                                .with_message(format!(
                                    "no value given for argument '{}' and it has no default",
                                    ctx.comp.interner.resolve(fsym.name)
                                ))
                                .with_label(*name_span, "value elided here"),
                        );
                        ok = false;
                    }
                    dflt
                }
            }
        } else {
            let dflt = bind_default(ctx, formal, fsyntax.default.as_ref(), fty);
            if dflt.is_none() {
                missing.push((fsym.name, fsym.span));
                ok = false;
            }
            dflt
        };

        match expr {
            Some(e) => bound.push(e),
            None => bound.push(Expression::invalid(None, span)),
        }
    }

    // A purely positional call that comes up short gets one summary
    // diagnostic; once names are in play each unconnected formal is
    // reported on its own.
    if !missing.is_empty() {
        if seen_named {
            for (name, decl_span) in &missing {
                ctx.comp.report(
                    Diagnostic::error(ErrorCode::E4205)
                        .with_message(format!(
                            "no value given for argument '{}'",
                            ctx.comp.interner.resolve(*name)
                        ))
                        .with_label(span, "in this call")
                        .with_secondary_label(*decl_span, "declared here"),
                );
            }
        } else {
            ctx.comp.report(
                Diagnostic::error(ErrorCode::E4201)
                    .with_message(format!(
                        "too few arguments to '{}': {} more required",
                        ctx.comp.symbol_name_str(sym),
                        missing.len()
                    ))
                    .with_label(span, "in this call"),
            );
        }
    }

    for (name, arg) in named {
        ctx.comp.report(
            Diagnostic::error(ErrorCode::E4204)
                .with_message(format!(
                    "'{}' has no argument named '{}'",
                    ctx.comp.symbol_name_str(sym),
                    ctx.comp.interner.resolve(name)
                ))
                .with_label(arg.span, "unknown argument"),
        );
        ok = false;
    }

    ok.then_some(bound)
}

fn bind_argument(
    ctx: &mut BindContext<'_>,
    expr: &ExprSyntax,
    formal_ty: TypeId,
    direction: ArgDirection,
) -> Expression {
    let bound = bind_expr(ctx, expr);
    let writes_back = matches!(
        direction,
        ArgDirection::Out | ArgDirection::InOut | ArgDirection::Ref
    );
    if writes_back && !bound.is_invalid() && !bound.is_lvalue() {
        ctx.comp.report(
            Diagnostic::error(ErrorCode::E4103)
                .with_message("argument to an output or ref formal must be assignable")
                .with_label(bound.span, "not an lvalue"),
        );
        let span = bound.span;
        return Expression::invalid(Some(bound), span);
    }
    if writes_back {
        bound
    } else {
        convert_assignment(ctx, formal_ty, bound)
    }
}

/// Default arguments bind in the subroutine's own scope, before the
/// formal they belong to.
fn bind_default(
    ctx: &BindContext<'_>,
    formal: SymbolId,
    default: Option<&ExprSyntax>,
    formal_ty: TypeId,
) -> Option<Expression> {
    let default = default?;
    let fsym = ctx.comp.symbol(formal);
    let scope = fsym.parent?;
    let mut callee_ctx = BindContext::new(ctx.comp, scope, ctx.flags & BindFlags::CONSTANT);
    callee_ctx.location = LookupLocation::before_index(scope, fsym.index);
    let bound = bind_expr(&mut callee_ctx, default);
    Some(convert_assignment(&mut callee_ctx, formal_ty, bound))
}

// ---------------------------------------------------------------------
// System subroutine calls
// ---------------------------------------------------------------------

fn bind_system_call(
    ctx: &mut BindContext<'_>,
    sub: Rc<dyn SystemSubroutine>,
    receiver: Option<Expression>,
    args: &[ArgSyntax],
    with_clause: Option<&WithClauseSyntax>,
    span: Span,
) -> Expression {
    let iterator_mode = sub.with_clause_mode() == WithClauseMode::Iterator;
    if let Some(with) = with_clause {
        if !iterator_mode {
            ctx.comp.report(
                Diagnostic::error(ErrorCode::E4209)
                    .with_message(format!(
                        "'{}' does not take a 'with' clause",
                        sub.name()
                    ))
                    .with_label(with.with_span, "unexpected clause"),
            );
            return Expression::invalid(None, span);
        }
    } else if sub.iterator_required() {
        ctx.comp.report(
            Diagnostic::error(ErrorCode::E4210)
                .with_message(format!("'{}' requires a 'with' clause", sub.name()))
                .with_label(span, "missing iteration expression"),
        );
        return Expression::invalid(None, span);
    }

    let mut bound: Vec<Expression> = Vec::new();
    if let Some(recv) = receiver {
        bound.push(recv);
    }

    let iterator = if iterator_mode && with_clause.is_some() {
        // Call arguments in iterator mode name the loop variable.
        let with = match with_clause {
            Some(w) => w,
            None => return Expression::invalid(None, span),
        };
        let iter_name = match iterator_name(ctx, args) {
            Ok(name) => name,
            Err(()) => return Expression::invalid(None, span),
        };
        let elem = bound
            .first()
            .and_then(|recv| ctx.comp.types.element_type(recv.ty))
            .unwrap_or(TypeId::ERROR);
        Some(Box::new(bind_iterator(ctx, iter_name, elem, with)))
    } else {
        if iterator_mode && !args.is_empty() {
            ctx.comp.report(
                Diagnostic::error(ErrorCode::E4210)
                    .with_message(format!(
                        "iterator arguments to '{}' require a 'with' clause",
                        sub.name()
                    ))
                    .with_label(span, "no 'with' clause"),
            );
            return Expression::invalid(None, span);
        }
        for (i, arg) in args.iter().enumerate() {
            match &arg.kind {
                ArgSyntaxKind::Ordered(expr) => {
                    let allow = sub.allows_data_type_arg(i);
                    let saved = ctx.flags;
                    if allow {
                        ctx.flags |= BindFlags::ALLOW_DATA_TYPE;
                    }
                    let e = bind_expr(ctx, expr);
                    ctx.flags = saved;
                    bound.push(e);
                }
                ArgSyntaxKind::Named { name_span, .. } => {
                    ctx.comp.report(
                        Diagnostic::error(ErrorCode::E4208)
                            .with_message(format!(
                                "'{}' does not accept named arguments",
                                sub.name()
                            ))
                            .with_label(*name_span, "named argument here"),
                    );
                    return Expression::invalid(None, span);
                }
                ArgSyntaxKind::Empty => {
                    if sub.allows_empty_argument(i) {
                        bound.push(Expression::new(
                            ExprKind::EmptyArgument,
                            TypeId::VOID,
                            arg.span,
                        ));
                        continue;
                    }
                    ctx.comp.report(
                        Diagnostic::error(ErrorCode::E4206)
                            .with_message(format!(
                                "arguments to '{}' cannot be empty",
                                sub.name()
                            ))
                            .with_label(arg.span, "empty argument"),
                    );
                    return Expression::invalid(None, span);
                }
            }
        }
        None
    };

    let ty = sub.check_arguments(ctx.comp, &bound, iterator.as_deref(), span);
    if ty.is_error() {
        return Expression::invalid(None, span);
    }
    Expression::new(
        ExprKind::Call {
            callee: Callee::System(SystemCallInfo {
                subroutine: sub,
                iterator,
            }),
            args: bound,
        },
        ty,
        span,
    )
}

/// In iterator mode the argument list may rename the loop variable:
/// `q.find(x) with (x > 2)`. With no argument the name is `item`.
fn iterator_name(ctx: &BindContext<'_>, args: &[ArgSyntax]) -> Result<Name, ()> {
    match args {
        [] => Ok(ctx.comp.name("item")),
        [arg] => match &arg.kind {
            ArgSyntaxKind::Ordered(ExprSyntax {
                kind: ExprSyntaxKind::Identifier(name),
                ..
            }) => Ok(*name),
            _ => {
                ctx.comp.report(
                    Diagnostic::error(ErrorCode::E4211)
                        .with_message("expected an iterator name")
                        .with_label(arg.span, "not a plain identifier"),
                );
                Err(())
            }
        },
        [_, second, ..] => {
            ctx.comp.report(
                Diagnostic::error(ErrorCode::E4211)
                    .with_message("iterator calls take at most one argument, the iterator name")
                    .with_label(second.span, "extra argument"),
            );
            Err(())
        }
    }
}

fn bind_iterator(
    ctx: &mut BindContext<'_>,
    name: Name,
    elem: TypeId,
    with: &WithClauseSyntax,
) -> IteratorCall {
    let iter_var = ctx.comp.add_symbol(Symbol {
        kind: SymbolKind::Iterator,
        name,
        span: with.with_span,
        parent: Some(ctx.scope),
        index: 0,
        data: SymbolData::Iterator { ty: elem },
    });
    ctx.iterators.push((name, iter_var));
    let body = bind_expr(ctx, &with.expr);
    ctx.iterators.pop();
    let body = if matches!(body.kind, ExprKind::DataTypeRef) {
        ctx.comp.report(
            Diagnostic::error(ErrorCode::E4212)
                .with_message("expected an iteration expression")
                .with_label(body.span, "found a data type"),
        );
        let span = body.span;
        Expression::invalid(None, span)
    } else {
        body
    };
    IteratorCall { iter_var, body }
}
