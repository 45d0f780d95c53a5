//! System subroutines and built-in array methods.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use silica_diagnostic::{Diagnostic, ErrorCode};
use silica_syntax::{Name, SharedInterner, Span};
use silica_types::{ConstantValue, LogicVec, TypeData, TypeId};

use crate::compilation::Compilation;
use crate::eval::EvalContext;
use crate::expression::{Expression, ExprKind, IteratorCall};

/// How a subroutine treats an attached `with` clause.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum WithClauseMode {
    /// No `with` clause allowed.
    None,
    /// The clause is an iteration expression over array elements.
    Iterator,
}

/// A built-in subroutine: either a `$`-prefixed system function or a
/// method on array types.
pub trait SystemSubroutine {
    fn name(&self) -> &'static str;

    fn with_clause_mode(&self) -> WithClauseMode {
        WithClauseMode::None
    }

    /// Whether the `with` clause is mandatory rather than optional.
    fn iterator_required(&self) -> bool {
        false
    }

    /// Whether the argument at `index` may be a bare data type.
    fn allows_data_type_arg(&self, index: usize) -> bool {
        let _ = index;
        false
    }

    /// Whether the argument at `index` may be written as an empty
    /// placeholder (`$f(, x)`); such positions bind as
    /// [`ExprKind::EmptyArgument`] for the subroutine to interpret.
    fn allows_empty_argument(&self, index: usize) -> bool {
        let _ = index;
        false
    }

    /// Methods receive their receiver as `args[0]`.
    fn is_method(&self) -> bool {
        false
    }

    /// Validate bound arguments and produce the call's type. Reports
    /// diagnostics and returns [`TypeId::ERROR`] on failure.
    fn check_arguments(
        &self,
        comp: &Compilation,
        args: &[Expression],
        iterator: Option<&IteratorCall>,
        call_span: Span,
    ) -> TypeId;

    /// Evaluate the call in a constant context.
    fn eval(
        &self,
        ctx: &mut EvalContext<'_>,
        args: &[Expression],
        iterator: Option<&IteratorCall>,
        call_span: Span,
    ) -> ConstantValue;
}

/// The registry of free system functions, keyed by interned name.
pub(crate) fn builtin_subroutines(
    interner: &SharedInterner,
) -> FxHashMap<Name, Rc<dyn SystemSubroutine>> {
    let mut map: FxHashMap<Name, Rc<dyn SystemSubroutine>> = FxHashMap::default();
    map.insert(interner.intern("$clog2"), Rc::new(Clog2));
    map.insert(interner.intern("$bits"), Rc::new(Bits));
    map
}

/// Look up a built-in method by name; receiver compatibility is checked
/// in `check_arguments`.
pub(crate) fn array_method(name: &str) -> Option<Rc<dyn SystemSubroutine>> {
    match name {
        "size" => Some(Rc::new(ArraySize)),
        "sum" => Some(Rc::new(ArraySum)),
        "find" => Some(Rc::new(ArrayFind)),
        _ => None,
    }
}

fn check_arg_count(
    comp: &Compilation,
    name: &str,
    args: &[Expression],
    expected: usize,
    call_span: Span,
) -> bool {
    use std::cmp::Ordering;
    match args.len().cmp(&expected) {
        Ordering::Less => {
            comp.report(
                Diagnostic::error(ErrorCode::E4201)
                    .with_message(format!(
                        "too few arguments to '{name}': expected {expected}, got {}",
                        args.len()
                    ))
                    .with_label(call_span, "in this call"),
            );
            false
        }
        Ordering::Greater => {
            comp.report(
                Diagnostic::error(ErrorCode::E4202)
                    .with_message(format!(
                        "too many arguments to '{name}': expected {expected}, got {}",
                        args.len()
                    ))
                    .with_label(call_span, "in this call"),
            );
            false
        }
        Ordering::Equal => true,
    }
}

/// `$clog2(n)`: ceiling of log2, with `$clog2(0) == 0`.
struct Clog2;

impl SystemSubroutine for Clog2 {
    fn name(&self) -> &'static str {
        "$clog2"
    }

    fn check_arguments(
        &self,
        comp: &Compilation,
        args: &[Expression],
        _iterator: Option<&IteratorCall>,
        call_span: Span,
    ) -> TypeId {
        if !check_arg_count(comp, self.name(), args, 1, call_span) {
            return TypeId::ERROR;
        }
        let arg = &args[0];
        if !arg.is_invalid() && !comp.types.is_integral(arg.ty) {
            comp.report(
                Diagnostic::error(ErrorCode::E4101)
                    .with_message(format!(
                        "argument to '$clog2' must be integral, found '{}'",
                        comp.types.type_str(arg.ty, &comp.interner)
                    ))
                    .with_label(arg.span, "not an integral value"),
            );
            return TypeId::ERROR;
        }
        TypeId::INT
    }

    fn eval(
        &self,
        ctx: &mut EvalContext<'_>,
        args: &[Expression],
        _iterator: Option<&IteratorCall>,
        _call_span: Span,
    ) -> ConstantValue {
        let value = ctx.eval_expr(&args[0]);
        let Some(v) = value.integer().and_then(LogicVec::to_u64) else {
            return ConstantValue::Invalid;
        };
        let result = if v <= 1 {
            0
        } else {
            u64::from(64 - (v - 1).leading_zeros())
        };
        ConstantValue::Integer(LogicVec::new(32, true, result))
    }
}

/// `$bits(expr_or_type)`: total bit count of a value or type.
struct Bits;

impl SystemSubroutine for Bits {
    fn name(&self) -> &'static str {
        "$bits"
    }

    fn allows_data_type_arg(&self, index: usize) -> bool {
        index == 0
    }

    fn check_arguments(
        &self,
        comp: &Compilation,
        args: &[Expression],
        _iterator: Option<&IteratorCall>,
        call_span: Span,
    ) -> TypeId {
        if !check_arg_count(comp, self.name(), args, 1, call_span) {
            return TypeId::ERROR;
        }
        TypeId::INT
    }

    fn eval(
        &self,
        ctx: &mut EvalContext<'_>,
        args: &[Expression],
        _iterator: Option<&IteratorCall>,
        _call_span: Span,
    ) -> ConstantValue {
        let arg = &args[0];
        let comp = ctx.compilation();
        let fixed = comp.types.bitstream_width(arg.ty);
        if fixed > 0 {
            return ConstantValue::Integer(LogicVec::new(32, true, u64::from(fixed)));
        }
        if matches!(arg.kind, ExprKind::DataTypeRef) {
            // A dynamically sized type has no fixed width to report.
            return ConstantValue::Invalid;
        }
        // Dynamically sized value: measure the evaluated contents.
        let value = ctx.eval_expr(arg);
        let comp = ctx.compilation();
        let bits = match &value {
            ConstantValue::Str(s) => (s.len() as u64) * 8,
            ConstantValue::Aggregate(elems) => {
                let elem_width = comp
                    .types
                    .element_type(arg.ty)
                    .map_or(0, |e| u64::from(comp.types.bitstream_width(e)));
                elems.len() as u64 * elem_width
            }
            _ => return ConstantValue::Invalid,
        };
        ConstantValue::Integer(LogicVec::new(32, true, bits))
    }
}

fn receiver_is_countable(comp: &Compilation, ty: TypeId) -> bool {
    matches!(
        comp.types.get(comp.types.canonical(ty)),
        TypeData::DynamicArray { .. } | TypeData::Queue { .. } | TypeData::Associative { .. }
    )
}

fn receiver_is_iterable(comp: &Compilation, ty: TypeId) -> bool {
    matches!(
        comp.types.get(comp.types.canonical(ty)),
        TypeData::FixedArray { .. }
            | TypeData::DynamicArray { .. }
            | TypeData::Queue { .. }
            | TypeData::Associative { .. }
    )
}

fn report_not_an_array(comp: &Compilation, name: &str, receiver: &Expression) {
    if !receiver.is_invalid() {
        comp.report(
            Diagnostic::error(ErrorCode::E4110)
                .with_message(format!(
                    "'{name}' is not available on type '{}'",
                    comp.types.type_str(receiver.ty, &comp.interner)
                ))
                .with_label(receiver.span, "not an array"),
        );
    }
}

/// `arr.size()`: element count of a dynamically sized array.
struct ArraySize;

impl SystemSubroutine for ArraySize {
    fn name(&self) -> &'static str {
        "size"
    }

    fn is_method(&self) -> bool {
        true
    }

    fn check_arguments(
        &self,
        comp: &Compilation,
        args: &[Expression],
        _iterator: Option<&IteratorCall>,
        call_span: Span,
    ) -> TypeId {
        if !check_arg_count(comp, self.name(), args, 1, call_span) {
            return TypeId::ERROR;
        }
        if !receiver_is_countable(comp, args[0].ty) {
            report_not_an_array(comp, self.name(), &args[0]);
            return TypeId::ERROR;
        }
        TypeId::INT
    }

    fn eval(
        &self,
        ctx: &mut EvalContext<'_>,
        args: &[Expression],
        _iterator: Option<&IteratorCall>,
        _call_span: Span,
    ) -> ConstantValue {
        match ctx.eval_expr(&args[0]) {
            ConstantValue::Aggregate(elems) => {
                ConstantValue::Integer(LogicVec::new(32, true, elems.len() as u64))
            }
            _ => ConstantValue::Invalid,
        }
    }
}

/// `arr.sum` / `arr.sum with (expr)`: reduction over elements.
struct ArraySum;

impl SystemSubroutine for ArraySum {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn is_method(&self) -> bool {
        true
    }

    fn with_clause_mode(&self) -> WithClauseMode {
        WithClauseMode::Iterator
    }

    fn check_arguments(
        &self,
        comp: &Compilation,
        args: &[Expression],
        iterator: Option<&IteratorCall>,
        call_span: Span,
    ) -> TypeId {
        if !check_arg_count(comp, self.name(), args, 1, call_span) {
            return TypeId::ERROR;
        }
        if !receiver_is_iterable(comp, args[0].ty) {
            report_not_an_array(comp, self.name(), &args[0]);
            return TypeId::ERROR;
        }
        match iterator {
            Some(iter) => iter.body.ty,
            None => comp.types.element_type(args[0].ty).unwrap_or(TypeId::ERROR),
        }
    }

    fn eval(
        &self,
        ctx: &mut EvalContext<'_>,
        args: &[Expression],
        iterator: Option<&IteratorCall>,
        call_span: Span,
    ) -> ConstantValue {
        let ConstantValue::Aggregate(elems) = ctx.eval_expr(&args[0]) else {
            return ConstantValue::Invalid;
        };
        let comp = ctx.compilation();
        let result_ty = match iterator {
            Some(iter) => iter.body.ty,
            None => comp.types.element_type(args[0].ty).unwrap_or(TypeId::ERROR),
        };
        let _ = call_span;

        if ctx.compilation().types.is_real(result_ty) {
            let mut acc = 0.0f64;
            for elem in elems {
                let term = match iterator {
                    Some(iter) => ctx.with_local(iter.iter_var, elem, |ctx| {
                        ctx.eval_expr(&iter.body)
                    }),
                    None => elem,
                };
                match term {
                    ConstantValue::Real(r) => acc += r,
                    ConstantValue::Integer(v) => acc += v.to_i64().unwrap_or(0) as f64,
                    _ => return ConstantValue::Invalid,
                }
            }
            return ConstantValue::Real(acc);
        }

        let width = ctx.compilation().types.bit_width(result_ty).max(1);
        let signed = ctx.compilation().types.is_signed(result_ty);
        let mut acc = LogicVec::zero(width, signed);
        for elem in elems {
            let term = match iterator {
                Some(iter) => {
                    ctx.with_local(iter.iter_var, elem, |ctx| ctx.eval_expr(&iter.body))
                }
                None => elem,
            };
            let Some(v) = term.integer() else {
                return ConstantValue::Invalid;
            };
            acc = acc.add(&v.resize(width).as_signed(signed));
        }
        ConstantValue::Integer(acc)
    }
}

/// `arr.find with (expr)`: elements satisfying a predicate, as a queue.
struct ArrayFind;

impl SystemSubroutine for ArrayFind {
    fn name(&self) -> &'static str {
        "find"
    }

    fn is_method(&self) -> bool {
        true
    }

    fn with_clause_mode(&self) -> WithClauseMode {
        WithClauseMode::Iterator
    }

    fn iterator_required(&self) -> bool {
        true
    }

    fn check_arguments(
        &self,
        comp: &Compilation,
        args: &[Expression],
        iterator: Option<&IteratorCall>,
        call_span: Span,
    ) -> TypeId {
        if !check_arg_count(comp, self.name(), args, 1, call_span) {
            return TypeId::ERROR;
        }
        if !receiver_is_iterable(comp, args[0].ty) {
            report_not_an_array(comp, self.name(), &args[0]);
            return TypeId::ERROR;
        }
        let Some(iter) = iterator else {
            return TypeId::ERROR;
        };
        if !comp.types.is_boolean_convertible(iter.body.ty) && !iter.body.is_invalid() {
            comp.report(
                Diagnostic::error(ErrorCode::E4104)
                    .with_message("iteration expression must be convertible to a predicate")
                    .with_label(iter.body.span, "cannot be used as a condition"),
            );
        }
        let elem = comp.types.element_type(args[0].ty).unwrap_or(TypeId::ERROR);
        comp.types.intern(TypeData::Queue { elem })
    }

    fn eval(
        &self,
        ctx: &mut EvalContext<'_>,
        args: &[Expression],
        iterator: Option<&IteratorCall>,
        _call_span: Span,
    ) -> ConstantValue {
        let Some(iter) = iterator else {
            return ConstantValue::Invalid;
        };
        let ConstantValue::Aggregate(elems) = ctx.eval_expr(&args[0]) else {
            return ConstantValue::Invalid;
        };
        let mut found = Vec::new();
        for elem in elems {
            let pred = ctx.with_local(iter.iter_var, elem.clone(), |ctx| {
                ctx.eval_expr(&iter.body)
            });
            match pred.to_bool() {
                Some(true) => found.push(elem),
                Some(false) => {}
                // An unknown predicate result poisons the whole query.
                None => return ConstantValue::Invalid,
            }
        }
        ConstantValue::Aggregate(found)
    }
}
