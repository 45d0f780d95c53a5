//! Constant-expression rules for user subroutine calls.
//!
//! A subroutine is verified before every call. The in-flight set marks
//! bodies currently being walked so recursive functions verify without
//! looping; runaway recursion is caught later by the call-depth limit.
//! Results are not cached across calls because the declared-before-use
//! checks depend on where the evaluation was requested from.

use silica_diagnostic::{Diagnostic, ErrorCode};
use silica_syntax::ast::{ArgDirection, SubroutineKind};
use silica_syntax::Span;

use crate::expression::{Callee, ExprKind, Expression};
use crate::scope::{LookupLocation, ScopeId};
use crate::statement::{Statement, StatementKind};
use crate::symbol::{MethodFlags, SymbolData, SymbolId, SymbolKind};

use super::EvalContext;

pub(super) fn verify_const_subroutine(
    ctx: &mut EvalContext<'_>,
    sym: SymbolId,
    call_span: Span,
    location: LookupLocation,
) -> bool {
    if ctx.verifying.contains(&sym) {
        return true;
    }
    let comp = ctx.comp;
    let sig = comp.subroutine_sig(sym);
    let name = comp.symbol_name_str(sym);
    let decl_span = comp.symbol(sym).span;

    let reject = |code: ErrorCode, what: &str| {
        comp.report(
            Diagnostic::error(code)
                .with_message(format!("{what} '{name}' in a constant expression"))
                .with_label(call_span, "called here")
                .with_secondary_label(decl_span, "declared here"),
        );
        false
    };

    if sig.kind == SubroutineKind::Task {
        return reject(ErrorCode::E5004, "cannot call task");
    }
    if comp.find_ancestor(sym, SymbolKind::GenerateBlock).is_some() {
        return reject(ErrorCode::E5010, "cannot call generate-scoped function");
    }
    if sig.flags.contains(MethodFlags::DPI_IMPORT) {
        return reject(ErrorCode::E5005, "cannot call DPI import");
    }
    if sig.flags.contains(MethodFlags::CONSTRUCTOR) {
        return reject(ErrorCode::E5007, "cannot call constructor");
    }
    if sig
        .flags
        .intersects(MethodFlags::NOT_CONST | MethodFlags::VIRTUAL | MethodFlags::PURE)
        || (sig.class.is_some() && !sig.flags.contains(MethodFlags::STATIC))
    {
        return reject(ErrorCode::E5006, "cannot call method");
    }
    if comp.types.is_void(sig.return_type) {
        return reject(ErrorCode::E5008, "cannot call void function");
    }
    for &formal in &sig.formals {
        let bad = match &comp.symbol(formal).data {
            SymbolData::FormalArg(syntax) => matches!(
                syntax.direction,
                ArgDirection::Out | ArgDirection::InOut | ArgDirection::Ref
            ),
            _ => false,
        };
        if bad {
            comp.report(
                Diagnostic::error(ErrorCode::E5009)
                    .with_message(format!(
                        "'{name}' has an output or ref argument and cannot be a constant function"
                    ))
                    .with_label(call_span, "called here")
                    .with_secondary_label(comp.symbol(formal).span, "this argument"),
            );
            return false;
        }
    }

    ctx.verifying.insert(sym);
    let body = comp.subroutine_body(sym);
    let mut walker = BodyWalker {
        ctx,
        root: sig.scope,
        call_span,
        location,
        ok: true,
    };
    for stmt in body.iter() {
        walker.visit_stmt(stmt);
    }
    let ok = walker.ok;
    ctx.verifying.remove(&sym);
    ok
}

struct BodyWalker<'a, 'b> {
    ctx: &'b mut EvalContext<'a>,
    /// The subroutine's own scope; everything declared at or below it is
    /// local.
    root: ScopeId,
    call_span: Span,
    /// Where the constant evaluation was requested from; symbols the
    /// body reads must already be declared at this point.
    location: LookupLocation,
    ok: bool,
}

impl BodyWalker<'_, '_> {
    fn visit_stmt(&mut self, stmt: &Statement) {
        match &stmt.kind {
            StatementKind::Invalid | StatementKind::Disable { .. } => {}
            StatementKind::Block { body, .. } => {
                for s in body {
                    self.visit_stmt(s);
                }
            }
            StatementKind::VarDecl { init, .. } => {
                if let Some(init) = init {
                    self.visit_expr(init);
                }
            }
            StatementKind::Expr(expr) => self.visit_expr(expr),
            StatementKind::Return(expr) => {
                if let Some(expr) = expr {
                    self.visit_expr(expr);
                }
            }
            StatementKind::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                self.visit_expr(cond);
                self.visit_stmt(then_stmt);
                if let Some(s) = else_stmt {
                    self.visit_stmt(s);
                }
            }
            StatementKind::For {
                init,
                cond,
                steps,
                body,
            } => {
                for s in init {
                    self.visit_stmt(s);
                }
                if let Some(c) = cond {
                    self.visit_expr(c);
                }
                for e in steps {
                    self.visit_expr(e);
                }
                self.visit_stmt(body);
            }
        }
    }

    fn visit_expr(&mut self, expr: &Expression) {
        match &expr.kind {
            ExprKind::Invalid(_)
            | ExprKind::IntegerLiteral(_)
            | ExprKind::RealLiteral(_)
            | ExprKind::StringLiteral(_)
            | ExprKind::NullLiteral
            | ExprKind::DataTypeRef
            | ExprKind::EmptyArgument => {}
            ExprKind::NamedValue {
                symbol,
                hierarchical,
                ..
            } => {
                if *hierarchical {
                    self.fail(
                        ErrorCode::E5002,
                        "hierarchical names are not allowed in constant expressions".to_string(),
                        expr.span,
                    );
                } else {
                    self.check_named(*symbol, expr);
                }
            }
            ExprKind::Unary { operand, .. } | ExprKind::Conversion { operand, .. } => {
                self.visit_expr(operand)
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                self.visit_expr(lhs);
                self.visit_expr(rhs);
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                self.visit_expr(cond);
                self.visit_expr(then_expr);
                self.visit_expr(else_expr);
            }
            ExprKind::ElementSelect { value, index } => {
                self.visit_expr(value);
                self.visit_expr(index);
            }
            ExprKind::MemberAccess { value, .. } => self.visit_expr(value),
            ExprKind::Assignment { target, value, .. } => {
                self.visit_expr(target);
                self.visit_expr(value);
            }
            ExprKind::Call { callee, args } => {
                for arg in args {
                    self.visit_expr(arg);
                }
                if let Callee::User(callee_sym) = callee {
                    if !verify_const_subroutine(self.ctx, *callee_sym, expr.span, self.location) {
                        self.ok = false;
                    }
                }
                if let Callee::System(info) = callee {
                    if let Some(iter) = &info.iterator {
                        self.visit_expr(&iter.body);
                    }
                }
            }
        }
    }

    fn check_named(&mut self, sym: SymbolId, expr: &Expression) {
        let comp = self.ctx.comp;
        let symbol = comp.symbol(sym);

        if comp.types.is_class(expr.ty) {
            self.fail(
                ErrorCode::E5003,
                format!("class handle '{}' is not allowed in a constant expression", comp.interner.resolve(symbol.name)),
                expr.span,
            );
            return;
        }

        match symbol.kind {
            SymbolKind::FormalArg | SymbolKind::Iterator => {}
            SymbolKind::EnumValue => {
                self.check_declared_before(sym, expr.span);
            }
            SymbolKind::Parameter => {
                self.check_declared_before(sym, expr.span);
                self.check_generate_scope(sym, expr.span);
            }
            SymbolKind::Variable | SymbolKind::ClassProperty => {
                if !self.is_local(sym) {
                    self.fail(
                        ErrorCode::E5011,
                        format!(
                            "constant function may only reference its local variables, not '{}'",
                            comp.interner.resolve(symbol.name)
                        ),
                        expr.span,
                    );
                    return;
                }
            }
            _ => {}
        }
    }

    /// Whether the symbol is declared inside the subroutine being
    /// verified.
    fn is_local(&self, sym: SymbolId) -> bool {
        let comp = self.ctx.comp;
        let mut scope = comp.symbol(sym).parent;
        while let Some(s) = scope {
            if s == self.root {
                return true;
            }
            // Stop at the subroutine's enclosing scope boundary.
            if !comp.scope_is_procedural(s) {
                return false;
            }
            scope = comp.scope_parent(s);
        }
        false
    }

    /// A parameter or enum value is only fixed once its declaration is
    /// behind the point the evaluation was requested from. Unrelated
    /// compilation units carry no ordering and are left alone.
    fn check_declared_before(&mut self, sym: SymbolId, span: Span) {
        let comp = self.ctx.comp;
        if comp.is_declared_before(sym, self.location) == Some(false) {
            self.fail(
                ErrorCode::E5012,
                format!(
                    "'{}' is used before it is declared",
                    comp.symbol_name_str(sym)
                ),
                span,
            );
        }
    }

    /// References that reach through a generate block are not constant.
    fn check_generate_scope(&mut self, sym: SymbolId, span: Span) {
        let comp = self.ctx.comp;
        if comp.find_ancestor(sym, SymbolKind::GenerateBlock).is_some() {
            self.fail(
                ErrorCode::E5010,
                format!(
                    "constant function may not reference '{}' inside a generate block",
                    comp.symbol_name_str(sym)
                ),
                span,
            );
        }
    }

    fn fail(&mut self, code: ErrorCode, message: String, span: Span) {
        self.ctx.comp.report(
            Diagnostic::error(code)
                .with_message(message)
                .with_label(span, "in the body of a constant function")
                .with_secondary_label(self.call_span, "called from here"),
        );
        self.ok = false;
    }
}
