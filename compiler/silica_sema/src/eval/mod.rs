//! Constant evaluation: an interpreter over bound trees with an explicit
//! call stack.

mod verify;

use rustc_hash::{FxHashMap, FxHashSet};
use silica_diagnostic::{Diagnostic, ErrorCode};
use silica_syntax::ast::{BinaryOpSyntax, ExprSyntax, UnaryOpSyntax};
use silica_syntax::Span;
use silica_types::{ConstantValue, LogicVec, TypeId};

use crate::bind::{bind_expr, BindContext, BindFlags};
use crate::compilation::Compilation;
use crate::expression::{Callee, ExprKind, Expression, MemberRef};
use crate::scope::{LookupLocation, ScopeId};
use crate::statement::{Statement, StatementKind};
use crate::symbol::{SymbolId, SymbolKind};

/// How a statement finished.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum EvalResult {
    Success,
    Return,
    /// A disable working its way out to the named block or subroutine.
    Disable(SymbolId),
    Fail,
}

/// One activation record: the locals of a subroutine call (or of the
/// top-level expression being evaluated).
struct Frame {
    subroutine: Option<SymbolId>,
    locals: FxHashMap<SymbolId, ConstantValue>,
    call_span: Span,
    /// Where the evaluation was requested from. Every frame carries the
    /// root location so declared-before-use checks anchor to the point
    /// of use, not to the callee.
    location: LookupLocation,
}

/// Evaluation state threaded through a constant evaluation.
pub struct EvalContext<'a> {
    comp: &'a Compilation,
    frames: Vec<Frame>,
    steps: u64,
    budget_blown: bool,
    /// Subroutines whose bodies are being walked by the verification
    /// pass right now; a call that loops back to one of these is
    /// accepted so recursive functions verify without looping.
    verifying: FxHashSet<SymbolId>,
    /// Script mode additionally allows reads of initialized static
    /// variables.
    for_script: bool,
}

impl<'a> EvalContext<'a> {
    pub fn new(comp: &'a Compilation, location: LookupLocation) -> Self {
        EvalContext {
            comp,
            frames: vec![Frame {
                subroutine: None,
                locals: FxHashMap::default(),
                call_span: Span::DUMMY,
                location,
            }],
            steps: 0,
            budget_blown: false,
            verifying: FxHashSet::default(),
            for_script: false,
        }
    }

    pub fn new_script(comp: &'a Compilation, location: LookupLocation) -> Self {
        let mut ctx = Self::new(comp, location);
        ctx.for_script = true;
        ctx
    }

    /// The compilation, with its full lifetime: callers may hold this
    /// across further mutation of the context.
    pub fn compilation(&self) -> &'a Compilation {
        self.comp
    }

    fn frame(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Run `f` with a local binding in the current frame, restoring the
    /// previous binding afterwards.
    pub fn with_local(
        &mut self,
        sym: SymbolId,
        value: ConstantValue,
        f: impl FnOnce(&mut Self) -> ConstantValue,
    ) -> ConstantValue {
        let saved = self.frame().locals.insert(sym, value);
        let result = f(self);
        match saved {
            Some(prev) => {
                self.frame().locals.insert(sym, prev);
            }
            None => {
                self.frame().locals.remove(&sym);
            }
        }
        result
    }

    /// Charge one step against the budget.
    fn step(&mut self, span: Span) -> bool {
        self.steps += 1;
        if self.steps > self.comp.options.max_steps {
            if !self.budget_blown {
                self.budget_blown = true;
                self.comp.report(
                    Diagnostic::error(ErrorCode::E5902)
                        .with_message("constant evaluation exceeded its step budget")
                        .with_label(span, "while evaluating this")
                        .with_note("a loop here may not terminate"),
                );
            }
            return false;
        }
        true
    }

    // ---------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------

    pub fn eval_expr(&mut self, expr: &Expression) -> ConstantValue {
        crate::ensure_sufficient_stack(|| self.eval_expr_inner(expr))
    }

    fn eval_expr_inner(&mut self, expr: &Expression) -> ConstantValue {
        match &expr.kind {
            ExprKind::Invalid(_) | ExprKind::DataTypeRef | ExprKind::EmptyArgument => {
                ConstantValue::Invalid
            }
            ExprKind::IntegerLiteral(v) => ConstantValue::Integer(*v),
            ExprKind::RealLiteral(v) => ConstantValue::Real(*v),
            ExprKind::StringLiteral(s) => ConstantValue::Str(s.clone()),
            ExprKind::NullLiteral => ConstantValue::Null,
            ExprKind::NamedValue {
                symbol,
                hierarchical,
                ..
            } => {
                if *hierarchical {
                    self.comp.report(
                        Diagnostic::error(ErrorCode::E5002)
                            .with_message(
                                "hierarchical names are not allowed in constant expressions",
                            )
                            .with_label(expr.span, "hierarchical reference"),
                    );
                    return ConstantValue::Invalid;
                }
                self.eval_named(*symbol, expr.span)
            }
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand);
                eval_unary(*op, value)
            }
            ExprKind::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs, expr.span),
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                match self.eval_expr(cond).to_bool() {
                    Some(true) => self.eval_expr(then_expr),
                    Some(false) => self.eval_expr(else_expr),
                    // An unknown selector merges the arms: equal values
                    // survive, anything else goes to all-X.
                    None => {
                        let a = self.eval_expr(then_expr);
                        let b = self.eval_expr(else_expr);
                        if a == b {
                            a
                        } else {
                            match (a, b) {
                                (ConstantValue::Integer(x), ConstantValue::Integer(_)) => {
                                    ConstantValue::Integer(LogicVec::filled_x(
                                        x.width(),
                                        x.is_signed(),
                                    ))
                                }
                                _ => ConstantValue::Invalid,
                            }
                        }
                    }
                }
            }
            ExprKind::ElementSelect { value, index } => {
                let base = self.eval_expr(value);
                let index = self.eval_expr(index);
                self.eval_select(value.ty, expr.ty, base, index)
            }
            ExprKind::MemberAccess { value, member } => match member {
                MemberRef::Field(idx) => match self.eval_expr(value) {
                    ConstantValue::Aggregate(mut elems) => {
                        let idx = *idx as usize;
                        if idx < elems.len() {
                            elems.swap_remove(idx)
                        } else {
                            ConstantValue::Invalid
                        }
                    }
                    _ => ConstantValue::Invalid,
                },
                // Class objects have no constant representation.
                MemberRef::Property(_) => ConstantValue::Invalid,
            },
            ExprKind::Call { callee, args } => match callee {
                Callee::User(sym) => self.eval_user_call(*sym, args, expr.span),
                Callee::System(info) => {
                    let sub = info.subroutine.clone();
                    sub.eval(self, args, info.iterator.as_deref(), expr.span)
                }
            },
            ExprKind::Assignment { target, value, .. } => {
                let value = self.eval_expr(value);
                if value.is_invalid() {
                    return ConstantValue::Invalid;
                }
                if self.assign(target, value.clone()) {
                    value
                } else {
                    ConstantValue::Invalid
                }
            }
            ExprKind::Conversion { operand, .. } => {
                let value = self.eval_expr(operand);
                if value.is_invalid() {
                    return ConstantValue::Invalid;
                }
                self.comp.types.coerce_value(value, expr.ty)
            }
        }
    }

    fn eval_named(&mut self, sym: SymbolId, span: Span) -> ConstantValue {
        if let Some(value) = self.frame().locals.get(&sym) {
            return value.clone();
        }
        let symbol = self.comp.symbol(sym);
        match symbol.kind {
            SymbolKind::Parameter => self.comp.parameter_value(sym),
            SymbolKind::EnumValue => self.comp.enum_value(sym),
            SymbolKind::Variable | SymbolKind::ClassProperty if self.for_script => {
                match self.comp.variable_initializer(sym) {
                    Some(init) => self.eval_expr(&init),
                    None => {
                        self.report_nonconst(sym, span);
                        ConstantValue::Invalid
                    }
                }
            }
            _ => {
                self.report_nonconst(sym, span);
                ConstantValue::Invalid
            }
        }
    }

    fn report_nonconst(&self, sym: SymbolId, span: Span) {
        self.comp.report(
            Diagnostic::error(ErrorCode::E5001)
                .with_message(format!(
                    "'{}' does not have a constant value",
                    self.comp.symbol_name_str(sym)
                ))
                .with_label(span, "in a constant expression"),
        );
    }

    fn eval_binary(
        &mut self,
        op: BinaryOpSyntax,
        lhs: &Expression,
        rhs: &Expression,
        span: Span,
    ) -> ConstantValue {
        // Logical connectives short-circuit even through unknowns.
        match op {
            BinaryOpSyntax::LogicalAnd => {
                let l = self.eval_expr(lhs).to_bool();
                if l == Some(false) {
                    return ConstantValue::from_bool(false);
                }
                let r = self.eval_expr(rhs).to_bool();
                return bool3(match (l, r) {
                    (_, Some(false)) => Some(false),
                    (Some(true), Some(true)) => Some(true),
                    _ => None,
                });
            }
            BinaryOpSyntax::LogicalOr => {
                let l = self.eval_expr(lhs).to_bool();
                if l == Some(true) {
                    return ConstantValue::from_bool(true);
                }
                let r = self.eval_expr(rhs).to_bool();
                return bool3(match (l, r) {
                    (_, Some(true)) => Some(true),
                    (Some(false), Some(false)) => Some(false),
                    _ => None,
                });
            }
            _ => {}
        }

        let l = self.eval_expr(lhs);
        let r = self.eval_expr(rhs);
        if l.is_invalid() || r.is_invalid() {
            return ConstantValue::Invalid;
        }

        // Mixed integer/real arithmetic promotes to real.
        if matches!(l, ConstantValue::Real(_)) || matches!(r, ConstantValue::Real(_)) {
            return eval_real_binary(op, &l, &r);
        }
        if let (ConstantValue::Str(a), ConstantValue::Str(b)) = (&l, &r) {
            return eval_string_compare(op, a, b);
        }
        if let (ConstantValue::Null, ConstantValue::Null) = (&l, &r) {
            return match op {
                BinaryOpSyntax::Equality => ConstantValue::from_bool(true),
                BinaryOpSyntax::Inequality => ConstantValue::from_bool(false),
                _ => ConstantValue::Invalid,
            };
        }

        let (Some(a), Some(b)) = (l.integer(), r.integer()) else {
            return ConstantValue::Invalid;
        };
        match op {
            BinaryOpSyntax::Add => ConstantValue::Integer(a.add(b)),
            BinaryOpSyntax::Subtract => ConstantValue::Integer(a.sub(b)),
            BinaryOpSyntax::Multiply => ConstantValue::Integer(a.mul(b)),
            BinaryOpSyntax::Divide | BinaryOpSyntax::Mod => {
                if b.to_u64() == Some(0) {
                    self.comp.report(
                        Diagnostic::error(ErrorCode::E5014)
                            .with_message("division by zero in constant expression")
                            .with_label(span, "divisor is zero"),
                    );
                }
                if op == BinaryOpSyntax::Divide {
                    ConstantValue::Integer(a.div(b))
                } else {
                    ConstantValue::Integer(a.rem(b))
                }
            }
            BinaryOpSyntax::ShiftLeft => ConstantValue::Integer(a.shl(b)),
            BinaryOpSyntax::ShiftRight => ConstantValue::Integer(a.shr(b)),
            BinaryOpSyntax::BinaryAnd => ConstantValue::Integer(a.and(b)),
            BinaryOpSyntax::BinaryOr => ConstantValue::Integer(a.or(b)),
            BinaryOpSyntax::BinaryXor => ConstantValue::Integer(a.xor(b)),
            BinaryOpSyntax::Equality => bool3(a.eq_logic(b)),
            BinaryOpSyntax::Inequality => bool3(a.eq_logic(b).map(|eq| !eq)),
            BinaryOpSyntax::LessThan => bool3(a.lt(b)),
            BinaryOpSyntax::GreaterThanEqual => bool3(a.lt(b).map(|lt| !lt)),
            BinaryOpSyntax::GreaterThan => bool3(b.lt(a)),
            BinaryOpSyntax::LessThanEqual => bool3(b.lt(a).map(|gt| !gt)),
            BinaryOpSyntax::LogicalAnd | BinaryOpSyntax::LogicalOr => ConstantValue::Invalid,
        }
    }

    fn eval_select(
        &mut self,
        value_ty: TypeId,
        elem_ty: TypeId,
        base: ConstantValue,
        index: ConstantValue,
    ) -> ConstantValue {
        let Some(idx) = index.to_i64() else {
            // An unknown index reads as the element default.
            return self.comp.types.default_value(elem_ty);
        };
        match base {
            ConstantValue::Aggregate(elems) => {
                let offset = match self.comp.types.fixed_range(value_ty) {
                    Some(range) => i32::try_from(idx)
                        .ok()
                        .and_then(|i| range.offset_of(i))
                        .map(|o| o as usize),
                    None => usize::try_from(idx).ok(),
                };
                match offset.and_then(|o| elems.get(o)) {
                    Some(v) => v.clone(),
                    None => self.comp.types.default_value(elem_ty),
                }
            }
            ConstantValue::Integer(v) => {
                // Bit select on a packed value: the range's right bound is
                // bit zero, not element zero.
                let pos = match self.comp.types.fixed_range(value_ty) {
                    Some(range) => i32::try_from(idx).ok().and_then(|i| range.bit_position_of(i)),
                    None => u32::try_from(idx).ok(),
                };
                match pos {
                    Some(pos) if pos < v.width() => {
                        if (v.unknown_bits() >> pos) & 1 != 0 {
                            ConstantValue::Integer(LogicVec::filled_x(1, false))
                        } else {
                            let bit = v.to_u64().map_or(0, |raw| (raw >> pos) & 1);
                            ConstantValue::Integer(LogicVec::new(1, false, bit))
                        }
                    }
                    _ => ConstantValue::Integer(LogicVec::filled_x(1, false)),
                }
            }
            ConstantValue::Str(s) => {
                let byte = usize::try_from(idx).ok().and_then(|i| s.as_bytes().get(i));
                ConstantValue::Integer(LogicVec::new(8, false, u64::from(byte.copied().unwrap_or(0))))
            }
            _ => ConstantValue::Invalid,
        }
    }

    // ---------------------------------------------------------------
    // Assignment targets
    // ---------------------------------------------------------------

    /// Write a value through an lvalue expression into frame locals.
    fn assign(&mut self, target: &Expression, value: ConstantValue) -> bool {
        let Some((root, path)) = self.lvalue_path(target) else {
            return false;
        };
        if path.is_empty() {
            self.frame().locals.insert(root, value);
            return true;
        }
        let mut current = match self.frame().locals.get(&root) {
            Some(v) => v.clone(),
            None => self.comp.types.default_value(self.comp.value_type(root)),
        };
        {
            let mut slot = &mut current;
            for access in &path {
                let ConstantValue::Aggregate(elems) = slot else {
                    return false;
                };
                let Some(next) = elems.get_mut(*access) else {
                    return false;
                };
                slot = next;
            }
            *slot = value;
        }
        self.frame().locals.insert(root, current);
        true
    }

    /// Flatten an lvalue into a root symbol plus aggregate offsets.
    fn lvalue_path(&mut self, target: &Expression) -> Option<(SymbolId, Vec<usize>)> {
        match &target.kind {
            ExprKind::NamedValue { symbol, .. } => Some((*symbol, Vec::new())),
            ExprKind::ElementSelect { value, index } => {
                // Writes land in aggregate slots; single packed bits have
                // no slot to address.
                if self.comp.types.is_integral(value.ty) {
                    return None;
                }
                let (root, mut path) = self.lvalue_path(value)?;
                let idx = self.eval_expr(index).to_i64()?;
                let offset = match self.comp.types.fixed_range(value.ty) {
                    Some(range) => i32::try_from(idx).ok().and_then(|i| range.offset_of(i))? as usize,
                    None => usize::try_from(idx).ok()?,
                };
                path.push(offset);
                Some((root, path))
            }
            ExprKind::MemberAccess { value, member } => match member {
                MemberRef::Field(idx) => {
                    let (root, mut path) = self.lvalue_path(value)?;
                    path.push(*idx as usize);
                    Some((root, path))
                }
                MemberRef::Property(_) => None,
            },
            _ => None,
        }
    }

    // ---------------------------------------------------------------
    // Calls
    // ---------------------------------------------------------------

    fn eval_user_call(
        &mut self,
        sym: SymbolId,
        args: &[Expression],
        call_span: Span,
    ) -> ConstantValue {
        let location = self.frame().location;
        if !verify::verify_const_subroutine(self, sym, call_span, location) {
            return ConstantValue::Invalid;
        }
        let sig = self.comp.subroutine_sig(sym);

        // Arguments evaluate in the caller's frame.
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let value = self.eval_expr(arg);
            if value.is_invalid() {
                return ConstantValue::Invalid;
            }
            values.push(value);
        }

        if self.frames.len() as u32 >= self.comp.options.max_call_depth {
            let mut diag = Diagnostic::error(ErrorCode::E5901)
                .with_message(format!(
                    "recursion limit reached while evaluating '{}'",
                    self.comp.symbol_name_str(sym)
                ))
                .with_label(call_span, "call exceeds the depth limit");
            if let Some(outer) = self.frames.last().filter(|f| f.subroutine.is_some()) {
                diag = diag.with_secondary_label(outer.call_span, "during this call");
            }
            self.comp.report(diag);
            return ConstantValue::Invalid;
        }

        let mut locals = FxHashMap::default();
        for (&formal, value) in sig.formals.iter().zip(values) {
            locals.insert(formal, value);
        }
        if let Some(rv) = sig.return_var {
            locals.insert(rv, self.comp.types.default_value(sig.return_type));
        }
        self.frames.push(Frame {
            subroutine: Some(sym),
            locals,
            call_span,
            location,
        });

        let body = self.comp.subroutine_body(sym);
        let mut failed = false;
        for stmt in body.iter() {
            match self.eval_stmt(stmt) {
                EvalResult::Success => {}
                EvalResult::Return => break,
                // Disabling the function itself acts as a return with
                // whatever the result variable holds.
                EvalResult::Disable(t) if t == sym => break,
                EvalResult::Disable(t) => {
                    self.comp.report(
                        Diagnostic::error(ErrorCode::E5013)
                            .with_message(format!(
                                "disable target '{}' is not an enclosing block",
                                self.comp.symbol_name_str(t)
                            ))
                            .with_label(stmt.span, "escapes the subroutine"),
                    );
                    failed = true;
                    break;
                }
                EvalResult::Fail => {
                    failed = true;
                    break;
                }
            }
        }

        let frame = match self.frames.pop() {
            Some(f) => f,
            None => return ConstantValue::Invalid,
        };
        if failed {
            return ConstantValue::Invalid;
        }
        match sig.return_var {
            Some(rv) => frame.locals.get(&rv).cloned().unwrap_or_default(),
            None => ConstantValue::Invalid,
        }
    }

    // ---------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------

    pub fn eval_stmt(&mut self, stmt: &Statement) -> EvalResult {
        if !self.step(stmt.span) {
            return EvalResult::Fail;
        }
        match &stmt.kind {
            StatementKind::Invalid => EvalResult::Fail,
            StatementKind::Block { block, body } => {
                for s in body {
                    match self.eval_stmt(s) {
                        EvalResult::Success => {}
                        // A disable of this very block just exits it.
                        EvalResult::Disable(t) if t == *block => return EvalResult::Success,
                        other => return other,
                    }
                }
                EvalResult::Success
            }
            StatementKind::VarDecl { symbol, init } => {
                let value = match init {
                    Some(init) => {
                        let v = self.eval_expr(init);
                        if v.is_invalid() {
                            return EvalResult::Fail;
                        }
                        v
                    }
                    None => self
                        .comp
                        .types
                        .default_value(self.comp.variable_type(*symbol)),
                };
                self.frame().locals.insert(*symbol, value);
                EvalResult::Success
            }
            StatementKind::Expr(expr) => {
                if self.eval_expr(expr).is_invalid() {
                    EvalResult::Fail
                } else {
                    EvalResult::Success
                }
            }
            StatementKind::Return(expr) => {
                if let Some(expr) = expr {
                    let value = self.eval_expr(expr);
                    if value.is_invalid() {
                        return EvalResult::Fail;
                    }
                    let subroutine = self.frame().subroutine;
                    let return_var = subroutine
                        .map(|s| self.comp.subroutine_sig(s))
                        .and_then(|sig| sig.return_var);
                    if let Some(rv) = return_var {
                        self.frame().locals.insert(rv, value);
                    }
                }
                EvalResult::Return
            }
            StatementKind::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                // An unknown condition falls through to the else branch,
                // matching four-state `if` semantics.
                match self.eval_expr(cond).to_bool() {
                    Some(true) => self.eval_stmt(then_stmt),
                    _ => match else_stmt {
                        Some(s) => self.eval_stmt(s),
                        None => EvalResult::Success,
                    },
                }
            }
            StatementKind::For {
                init,
                cond,
                steps,
                body,
            } => {
                for s in init {
                    match self.eval_stmt(s) {
                        EvalResult::Success => {}
                        other => return other,
                    }
                }
                loop {
                    if let Some(cond) = cond {
                        if !self.step(cond.span) {
                            return EvalResult::Fail;
                        }
                        match self.eval_expr(cond).to_bool() {
                            Some(true) => {}
                            _ => break,
                        }
                    } else if !self.step(stmt.span) {
                        return EvalResult::Fail;
                    }
                    match self.eval_stmt(body) {
                        EvalResult::Success => {}
                        other => return other,
                    }
                    for step in steps {
                        if self.eval_expr(step).is_invalid() {
                            return EvalResult::Fail;
                        }
                    }
                }
                EvalResult::Success
            }
            StatementKind::Disable { target } => EvalResult::Disable(*target),
        }
    }
}

fn bool3(value: Option<bool>) -> ConstantValue {
    match value {
        Some(b) => ConstantValue::from_bool(b),
        None => ConstantValue::Integer(LogicVec::filled_x(1, false)),
    }
}

fn eval_unary(op: UnaryOpSyntax, value: ConstantValue) -> ConstantValue {
    match (op, value) {
        (_, ConstantValue::Invalid) => ConstantValue::Invalid,
        (UnaryOpSyntax::Plus, v) => v,
        (UnaryOpSyntax::Minus, ConstantValue::Integer(v)) => ConstantValue::Integer(v.neg()),
        (UnaryOpSyntax::Minus, ConstantValue::Real(v)) => ConstantValue::Real(-v),
        (UnaryOpSyntax::BitwiseNot, ConstantValue::Integer(v)) => ConstantValue::Integer(v.not()),
        (UnaryOpSyntax::LogicalNot, v) => bool3(v.to_bool().map(|b| !b)),
        _ => ConstantValue::Invalid,
    }
}

fn real_operand(value: &ConstantValue) -> Option<f64> {
    match value {
        ConstantValue::Real(r) => Some(*r),
        ConstantValue::Integer(v) => v.to_i64().map(|i| i as f64),
        _ => None,
    }
}

fn eval_real_binary(op: BinaryOpSyntax, lhs: &ConstantValue, rhs: &ConstantValue) -> ConstantValue {
    let (Some(a), Some(b)) = (real_operand(lhs), real_operand(rhs)) else {
        return ConstantValue::Invalid;
    };
    match op {
        BinaryOpSyntax::Add => ConstantValue::Real(a + b),
        BinaryOpSyntax::Subtract => ConstantValue::Real(a - b),
        BinaryOpSyntax::Multiply => ConstantValue::Real(a * b),
        BinaryOpSyntax::Divide => ConstantValue::Real(a / b),
        BinaryOpSyntax::Mod => ConstantValue::Real(a % b),
        BinaryOpSyntax::Equality => ConstantValue::from_bool(a == b),
        BinaryOpSyntax::Inequality => ConstantValue::from_bool(a != b),
        BinaryOpSyntax::LessThan => ConstantValue::from_bool(a < b),
        BinaryOpSyntax::LessThanEqual => ConstantValue::from_bool(a <= b),
        BinaryOpSyntax::GreaterThan => ConstantValue::from_bool(a > b),
        BinaryOpSyntax::GreaterThanEqual => ConstantValue::from_bool(a >= b),
        _ => ConstantValue::Invalid,
    }
}

fn eval_string_compare(op: BinaryOpSyntax, a: &str, b: &str) -> ConstantValue {
    match op {
        BinaryOpSyntax::Equality => ConstantValue::from_bool(a == b),
        BinaryOpSyntax::Inequality => ConstantValue::from_bool(a != b),
        BinaryOpSyntax::LessThan => ConstantValue::from_bool(a < b),
        BinaryOpSyntax::LessThanEqual => ConstantValue::from_bool(a <= b),
        BinaryOpSyntax::GreaterThan => ConstantValue::from_bool(a > b),
        BinaryOpSyntax::GreaterThanEqual => ConstantValue::from_bool(a >= b),
        _ => ConstantValue::Invalid,
    }
}

impl Compilation {
    /// Bind an expression in a scope as a constant expression.
    pub fn bind_expression(&self, syntax: &ExprSyntax, scope: ScopeId) -> Expression {
        let mut ctx = BindContext::new(self, scope, BindFlags::CONSTANT);
        bind_expr(&mut ctx, syntax)
    }

    /// Bind and evaluate an expression at elaboration time.
    ///
    /// Script mode: reads of initialized static variables fold through
    /// their initializers.
    pub fn eval_expression(&self, syntax: &ExprSyntax, scope: ScopeId) -> ConstantValue {
        let bound = self.bind_expression(syntax, scope);
        if bound.is_invalid() {
            return ConstantValue::Invalid;
        }
        let mut ctx = EvalContext::new_script(self, LookupLocation::at_end(scope));
        ctx.eval_expr(&bound)
    }
}
