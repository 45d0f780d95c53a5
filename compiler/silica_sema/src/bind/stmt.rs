//! Statement binding for procedural bodies.

use std::rc::Rc;

use silica_diagnostic::{Diagnostic, ErrorCode};
use silica_syntax::ast::{Lifetime, StmtSyntax, StmtSyntaxKind};
use silica_syntax::Name;

use crate::compilation::Compilation;
use crate::scope::LookupLocation;
use crate::statement::{Statement, StatementKind};
use crate::symbol::{Namespace, Symbol, SymbolData, SymbolId, SymbolKind};

use super::{bind_expr, convert_assignment, require_boolean, BindContext, BindFlags};

/// Bind the body of a subroutine into statements.
pub(crate) fn bind_subroutine_body(comp: &Compilation, sym: SymbolId) -> Vec<Statement> {
    let symbol = comp.symbol(sym);
    let SymbolData::Subroutine { scope, syntax } = &symbol.data else {
        return Vec::new();
    };
    let sig = comp.subroutine_sig(sym);
    let mut ctx = BindContext::new(comp, *scope, BindFlags::PROCEDURAL);
    // Formals and the result variable are already in place; statements
    // see them plus whatever declarations precede each statement.
    ctx.location = LookupLocation::before_index(*scope, comp.scope_members(*scope).len() as u32);
    let mut binder = StmtBinder {
        ctx,
        return_type: sig.return_type,
    };
    syntax
        .body
        .iter()
        .map(|stmt| binder.bind_stmt(stmt))
        .collect()
}

struct StmtBinder<'a> {
    ctx: BindContext<'a>,
    return_type: silica_types::TypeId,
}

impl StmtBinder<'_> {
    fn bind_stmt(&mut self, stmt: &StmtSyntax) -> Statement {
        let span = stmt.span;
        match &stmt.kind {
            StmtSyntaxKind::Block { label, body } => {
                let block = self.enter_block(*label, span);
                let inner_scope = match self.ctx.comp.symbol(block).owned_scope() {
                    Some(s) => s,
                    None => return Statement::invalid(span),
                };
                let saved_scope = self.ctx.scope;
                let saved_loc = self.ctx.location;
                self.ctx.scope = inner_scope;
                self.ctx.location = LookupLocation::before_index(inner_scope, 0);
                let body = body.iter().map(|s| self.bind_stmt(s)).collect();
                self.ctx.scope = saved_scope;
                self.ctx.location = saved_loc;
                Statement::new(StatementKind::Block { block, body }, span)
            }
            StmtSyntaxKind::VarDecl(decl) => {
                let sym = self.ctx.comp.add_symbol(Symbol {
                    kind: SymbolKind::Variable,
                    name: decl.name,
                    span: decl.name_span,
                    parent: Some(self.ctx.scope),
                    index: 0,
                    data: SymbolData::Variable(Rc::new(decl.clone())),
                });
                self.ctx
                    .comp
                    .insert_member(self.ctx.scope, Namespace::Members, sym);
                self.ctx.comp.create_enum_members_for(self.ctx.scope, sym, &decl.ty);
                self.ctx.comp.check_var_decl(decl, true);
                // Later statements may now see this declaration.
                self.ctx.location =
                    LookupLocation::before_index(self.ctx.scope, self.ctx.comp.symbol(sym).index + 1);

                let ty = self.ctx.comp.variable_type(sym);
                let init = decl.init.as_ref().map(|init| {
                    let saved = self.ctx.flags;
                    if self.ctx.comp.variable_lifetime(sym) == Lifetime::Static {
                        self.ctx.flags |= BindFlags::STATIC_INITIALIZER;
                    }
                    let bound = bind_expr(&mut self.ctx, init);
                    let bound = convert_assignment(&mut self.ctx, ty, bound);
                    self.ctx.flags = saved;
                    bound
                });
                Statement::new(StatementKind::VarDecl { symbol: sym, init }, span)
            }
            StmtSyntaxKind::Expr(expr) => {
                let bound = bind_expr(&mut self.ctx, expr);
                if bound.is_invalid() {
                    return Statement::invalid(span);
                }
                Statement::new(StatementKind::Expr(bound), span)
            }
            StmtSyntaxKind::Return(expr) => {
                let bound = expr.as_ref().map(|e| {
                    let bound = bind_expr(&mut self.ctx, e);
                    if self.ctx.comp.types.is_void(self.return_type) && !bound.is_invalid() {
                        self.ctx.comp.report(
                            Diagnostic::error(ErrorCode::E4101)
                                .with_message("cannot return a value from a void subroutine")
                                .with_label(bound.span, "returned value"),
                        );
                        let bspan = bound.span;
                        return crate::expression::Expression::invalid(Some(bound), bspan);
                    }
                    convert_assignment(&mut self.ctx, self.return_type, bound)
                });
                Statement::new(StatementKind::Return(bound), span)
            }
            StmtSyntaxKind::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                let cond = bind_expr(&mut self.ctx, cond);
                require_boolean(&self.ctx, &cond);
                let then_stmt = Box::new(self.bind_stmt(then_stmt));
                let else_stmt = else_stmt.as_ref().map(|s| Box::new(self.bind_stmt(s)));
                Statement::new(
                    StatementKind::If {
                        cond,
                        then_stmt,
                        else_stmt,
                    },
                    span,
                )
            }
            StmtSyntaxKind::For {
                init,
                cond,
                steps,
                body,
            } => {
                // Loop variables live in an implicit unnamed block.
                let block = self.enter_block(None, span);
                let inner_scope = match self.ctx.comp.symbol(block).owned_scope() {
                    Some(s) => s,
                    None => return Statement::invalid(span),
                };
                let saved_scope = self.ctx.scope;
                let saved_loc = self.ctx.location;
                self.ctx.scope = inner_scope;
                self.ctx.location = LookupLocation::before_index(inner_scope, 0);

                let init = init.iter().map(|s| self.bind_stmt(s)).collect();
                let cond = cond.as_ref().map(|c| {
                    let bound = bind_expr(&mut self.ctx, c);
                    require_boolean(&self.ctx, &bound);
                    bound
                });
                let steps = steps.iter().map(|e| bind_expr(&mut self.ctx, e)).collect();
                let body = Box::new(self.bind_stmt(body));

                self.ctx.scope = saved_scope;
                self.ctx.location = saved_loc;
                Statement::new(
                    StatementKind::For {
                        init,
                        cond,
                        steps,
                        body,
                    },
                    span,
                )
            }
            StmtSyntaxKind::Disable {
                target,
                target_span,
            } => {
                let Some(found) = self.ctx.comp.lookup_unqualified(
                    Namespace::Members,
                    *target,
                    self.ctx.location,
                ) else {
                    self.ctx.comp.report(
                        Diagnostic::error(ErrorCode::E4001)
                            .with_message(format!(
                                "use of undeclared identifier '{}'",
                                self.ctx.comp.interner.resolve(*target)
                            ))
                            .with_label(*target_span, "not found in this scope"),
                    );
                    return Statement::invalid(span);
                };
                // Inside a function its own name resolves to the return
                // slot; a disable of that name targets the function.
                let mut found = found;
                let symbol = self.ctx.comp.symbol(found);
                if symbol.kind == SymbolKind::Variable {
                    if let Some(parent) = symbol.parent {
                        let owner = self.ctx.comp.scope_owner(parent);
                        let owner_sym = self.ctx.comp.symbol(owner);
                        if owner_sym.kind == SymbolKind::Subroutine && owner_sym.name == symbol.name
                        {
                            found = owner;
                        }
                    }
                }
                let kind = self.ctx.comp.symbol(found).kind;
                if !matches!(kind, SymbolKind::StatementBlock | SymbolKind::Subroutine) {
                    self.ctx.comp.report(
                        Diagnostic::error(ErrorCode::E5013)
                            .with_message(format!(
                                "'{}' is not a block or subroutine",
                                self.ctx.comp.interner.resolve(*target)
                            ))
                            .with_label(*target_span, "invalid disable target"),
                    );
                    return Statement::invalid(span);
                }
                Statement::new(StatementKind::Disable { target: found }, span)
            }
        }
    }

    /// Create a statement block symbol with its own procedural scope and
    /// register it in the current scope. Labeled blocks become disable
    /// targets by name.
    fn enter_block(&mut self, label: Option<Name>, span: silica_syntax::Span) -> SymbolId {
        let comp = self.ctx.comp;
        let sym = comp.add_symbol(Symbol {
            kind: SymbolKind::StatementBlock,
            name: label.unwrap_or(Name::EMPTY),
            span,
            parent: Some(self.ctx.scope),
            index: 0,
            data: SymbolData::None,
        });
        let inner = comp.create_scope(sym, Some(self.ctx.scope));
        let lifetime = comp.scope_default_lifetime(self.ctx.scope);
        comp.with_scope_mut(inner, |data| {
            data.is_procedural = true;
            data.default_lifetime = lifetime;
        });
        {
            let mut symbols = comp.symbols.borrow_mut();
            symbols[sym.raw() as usize].data = SymbolData::Scope(inner);
        }
        comp.insert_member(self.ctx.scope, Namespace::Members, sym);
        self.ctx.location =
            LookupLocation::before_index(self.ctx.scope, comp.symbol(sym).index + 1);
        sym
    }
}
