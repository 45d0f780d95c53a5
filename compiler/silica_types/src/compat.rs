//! Type compatibility queries and constant value coercion.
//!
//! The four relations form a widening chain: matching implies equivalent,
//! equivalent implies assignment compatible, assignment compatible implies
//! cast compatible. The error type is compatible with everything in both
//! directions so one bad declaration does not cascade.

use crate::pool::PoolInner;
use crate::{ConstantValue, IntegralFlags, LogicVec, RealKind, TypeData, TypeId, TypePool};

impl TypePool {
    /// Exact type identity after alias resolution.
    pub fn is_matching(&self, a: TypeId, b: TypeId) -> bool {
        self.inner.read().is_matching(a, b)
    }

    /// Same bit-level representation: matching types, integral types of
    /// equal width/signedness/stateness, or arrays of equivalent elements
    /// with equal element counts.
    pub fn is_equivalent(&self, a: TypeId, b: TypeId) -> bool {
        self.inner.read().is_equivalent(a, b)
    }

    /// Whether a value of `rhs` may be assigned to a target of `lhs`,
    /// possibly with an implicit conversion.
    pub fn is_assignment_compatible(&self, lhs: TypeId, rhs: TypeId) -> bool {
        self.inner.read().is_assignment_compatible(lhs, rhs)
    }

    /// Whether an explicit cast from `rhs` to `lhs` is legal.
    pub fn is_cast_compatible(&self, lhs: TypeId, rhs: TypeId) -> bool {
        self.inner.read().is_cast_compatible(lhs, rhs)
    }

    /// Whether the two types can exchange values through a bitstream cast.
    pub fn is_bitstream_castable(&self, lhs: TypeId, rhs: TypeId) -> bool {
        self.inner.read().is_bitstream_castable(lhs, rhs)
    }

    /// Whether a value of this type may appear in a boolean context.
    pub fn is_boolean_convertible(&self, id: TypeId) -> bool {
        let inner = self.inner.read();
        let data = inner.canonical_data(id);
        data.is_integral()
            || matches!(
                data,
                TypeData::Real(_)
                    | TypeData::Str
                    | TypeData::Class { .. }
                    | TypeData::Null
                    | TypeData::Error
            )
    }

    /// Convert a constant value to fit a target type, resizing integers
    /// and converting between integral and real representations. Values
    /// already shaped for the target pass through unchanged.
    pub fn coerce_value(&self, value: ConstantValue, target: TypeId) -> ConstantValue {
        let inner = self.inner.read();
        let data = inner.canonical_data(target);
        match (&value, data) {
            (_, TypeData::Error) | (ConstantValue::Invalid, _) => value,
            (ConstantValue::Integer(v), d) if d.is_integral() => {
                let width = inner.bit_width(target);
                let flags = inner.integral_flags(target).unwrap_or_default();
                let signed = flags.contains(IntegralFlags::SIGNED);
                let resized = v.resize(width).as_signed(signed);
                // 2-state targets cannot hold X; unknown bits collapse to 0.
                if !flags.contains(IntegralFlags::FOUR_STATE) && resized.has_unknown() {
                    let known = resized.to_u64().unwrap_or(0);
                    ConstantValue::Integer(LogicVec::new(width, signed, known))
                } else {
                    ConstantValue::Integer(resized)
                }
            }
            (ConstantValue::Integer(v), TypeData::Real(kind)) => {
                // X bits convert as 0.
                let masked = LogicVec::new(v.width(), v.is_signed(), v.to_u64().unwrap_or(0));
                let f = masked.to_i64().map_or(0.0, |i| i as f64);
                match kind {
                    RealKind::Real => ConstantValue::Real(f),
                    RealKind::ShortReal => ConstantValue::Real(f64::from(f as f32)),
                }
            }
            (ConstantValue::Real(r), d) if d.is_integral() => {
                let width = inner.bit_width(target);
                let signed = inner
                    .integral_flags(target)
                    .unwrap_or_default()
                    .contains(IntegralFlags::SIGNED);
                // Round half away from zero, per the LRM's real-to-integer
                // conversion rule.
                let rounded = r.round();
                ConstantValue::Integer(LogicVec::new(width, signed, rounded as i64 as u64))
            }
            (ConstantValue::Real(r), TypeData::Real(RealKind::ShortReal)) => {
                ConstantValue::Real(f64::from(*r as f32))
            }
            (ConstantValue::Str(s), d) if d.is_integral() => {
                let width = inner.bit_width(target);
                let mut bits: u64 = 0;
                for &byte in s.as_bytes().iter().rev().take(8) {
                    bits = (bits << 8) | u64::from(byte);
                }
                ConstantValue::Integer(LogicVec::new(width, false, bits))
            }
            (ConstantValue::Integer(v), TypeData::Str) => {
                let mut bytes = Vec::new();
                let raw = v.to_u64().unwrap_or(0);
                for i in (0..8).rev() {
                    let byte = ((raw >> (i * 8)) & 0xff) as u8;
                    if byte != 0 || !bytes.is_empty() {
                        bytes.push(byte);
                    }
                }
                ConstantValue::Str(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => value,
        }
    }
}

impl PoolInner {
    pub(crate) fn is_matching(&self, a: TypeId, b: TypeId) -> bool {
        let (ca, cb) = (self.canonical(a), self.canonical(b));
        ca == cb || ca.is_error() || cb.is_error()
    }

    pub(crate) fn is_equivalent(&self, a: TypeId, b: TypeId) -> bool {
        if self.is_matching(a, b) {
            return true;
        }
        let (ca, cb) = (self.canonical(a), self.canonical(b));
        let (da, db) = (self.data(ca), self.data(cb));

        // Integral types are equivalent on shape alone, but an enum is only
        // equivalent to itself; assigning into an enum requires a cast.
        if da.is_integral()
            && db.is_integral()
            && !matches!(da, TypeData::Enum { .. })
            && !matches!(db, TypeData::Enum { .. })
        {
            let fa = self.integral_flags(ca).unwrap_or_default();
            let fb = self.integral_flags(cb).unwrap_or_default();
            return self.bit_width(ca) == self.bit_width(cb)
                && fa.contains(IntegralFlags::SIGNED) == fb.contains(IntegralFlags::SIGNED)
                && fa.contains(IntegralFlags::FOUR_STATE) == fb.contains(IntegralFlags::FOUR_STATE);
        }

        match (da, db) {
            (
                TypeData::FixedArray { elem: ea, range: ra },
                TypeData::FixedArray { elem: eb, range: rb },
            ) => ra.width() == rb.width() && self.is_equivalent(*ea, *eb),
            (TypeData::DynamicArray { elem: ea }, TypeData::DynamicArray { elem: eb })
            | (TypeData::Queue { elem: ea }, TypeData::Queue { elem: eb }) => {
                self.is_equivalent(*ea, *eb)
            }
            (
                TypeData::Associative { elem: ea, index: ia },
                TypeData::Associative { elem: eb, index: ib },
            ) => {
                let index_ok = match (ia, ib) {
                    (Some(x), Some(y)) => self.is_equivalent(*x, *y),
                    (None, None) => true,
                    _ => false,
                };
                index_ok && self.is_equivalent(*ea, *eb)
            }
            _ => false,
        }
    }

    pub(crate) fn is_assignment_compatible(&self, lhs: TypeId, rhs: TypeId) -> bool {
        if self.is_equivalent(lhs, rhs) {
            return true;
        }
        let (cl, cr) = (self.canonical(lhs), self.canonical(rhs));
        let (dl, dr) = (self.data(cl), self.data(cr));

        // Implicit numeric conversion, but never into an enum.
        let lhs_numeric = dl.is_integral() || matches!(dl, TypeData::Real(_));
        let rhs_numeric = dr.is_integral() || matches!(dr, TypeData::Real(_));
        if lhs_numeric && rhs_numeric && !matches!(dl, TypeData::Enum { .. }) {
            return true;
        }

        if let TypeData::Class { is_interface, .. } = dl {
            return match dr {
                TypeData::Null => true,
                TypeData::Class { .. } => {
                    self.is_derived_from(cr, cl) || (*is_interface && self.implements_iface(cr, cl))
                }
                _ => false,
            };
        }

        false
    }

    pub(crate) fn is_cast_compatible(&self, lhs: TypeId, rhs: TypeId) -> bool {
        if self.is_assignment_compatible(lhs, rhs) {
            return true;
        }
        let (cl, cr) = (self.canonical(lhs), self.canonical(rhs));
        let (dl, dr) = (self.data(cl), self.data(cr));

        // Numeric to enum requires the explicit cast this query answers.
        let rhs_numeric = dr.is_integral() || matches!(dr, TypeData::Real(_));
        if matches!(dl, TypeData::Enum { .. }) && rhs_numeric {
            return true;
        }

        // Integral and string interconvert by byte packing.
        if matches!(dl, TypeData::Str) && dr.is_integral() {
            return true;
        }
        if dl.is_integral() && matches!(dr, TypeData::Str) {
            return true;
        }

        // Downcast along the inheritance chain needs a cast and a runtime
        // check; it is legal to write.
        if matches!(dl, TypeData::Class { .. })
            && matches!(dr, TypeData::Class { .. })
            && self.is_derived_from(cl, cr)
        {
            return true;
        }

        self.is_bitstream_castable(cl, cr)
    }

    pub(crate) fn is_bitstream_castable(&self, lhs: TypeId, rhs: TypeId) -> bool {
        if !self.is_bitstream_type(lhs) || !self.is_bitstream_type(rhs) {
            return false;
        }
        let (wl, wr) = (self.bitstream_width(lhs), self.bitstream_width(rhs));
        let lhs_dynamic = wl == 0;
        let rhs_dynamic = wr == 0;
        match (lhs_dynamic, rhs_dynamic) {
            (false, false) => wl == wr,
            // A dynamically sized side adapts to whatever the other needs.
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConstantRange;
    use pretty_assertions::assert_eq;
    use silica_syntax::Name;

    fn packed(pool: &TypePool, elem: TypeId, left: i32, right: i32) -> TypeId {
        let flags = if pool.is_four_state(elem) {
            IntegralFlags::FOUR_STATE
        } else {
            IntegralFlags::empty()
        };
        pool.intern(TypeData::PackedArray {
            elem,
            range: ConstantRange::new(left, right),
            flags,
        })
    }

    #[test]
    fn matching_through_aliases() {
        let pool = TypePool::new();
        let alias = pool.intern(TypeData::Alias {
            name: Name::from_raw(5),
            target: TypeId::INT,
        });
        assert!(pool.is_matching(alias, TypeId::INT));
        assert!(pool.is_matching(TypeId::ERROR, alias));
    }

    #[test]
    fn equivalence_on_integral_shape() {
        let pool = TypePool::new();
        // int and bit signed [31:0] share width/sign/stateness.
        let bits32 = pool.with_signing(packed(&pool, TypeId::BIT, 31, 0), true);
        assert!(pool.is_equivalent(TypeId::INT, bits32));
        assert!(!pool.is_matching(TypeId::INT, bits32));

        // integer is 4-state, int is not.
        assert!(!pool.is_equivalent(TypeId::INT, TypeId::INTEGER));
        // logic [31:0] signed vs integer: both 4-state 32-bit signed.
        let logic32 = pool.with_signing(packed(&pool, TypeId::LOGIC, 31, 0), true);
        assert!(pool.is_equivalent(TypeId::INTEGER, logic32));
    }

    #[test]
    fn enum_is_not_equivalent_to_its_base() {
        let pool = TypePool::new();
        let e = pool.intern(TypeData::Enum {
            decl: 7,
            base: TypeId::INT,
            name: Name::from_raw(3),
        });
        assert!(!pool.is_equivalent(e, TypeId::INT));
        // But the enum assigns out to numeric targets...
        assert!(pool.is_assignment_compatible(TypeId::INT, e));
        // ...and only casts in.
        assert!(!pool.is_assignment_compatible(e, TypeId::INT));
        assert!(pool.is_cast_compatible(e, TypeId::INT));
    }

    #[test]
    fn fixed_arrays_compare_by_element_and_count() {
        let pool = TypePool::new();
        let a = pool.intern(TypeData::FixedArray {
            elem: TypeId::INT,
            range: ConstantRange::new(0, 3),
        });
        let b = pool.intern(TypeData::FixedArray {
            elem: TypeId::INT,
            range: ConstantRange::new(4, 1),
        });
        let c = pool.intern(TypeData::FixedArray {
            elem: TypeId::INT,
            range: ConstantRange::new(0, 4),
        });
        // Same element count, different bounds: still equivalent.
        assert!(pool.is_equivalent(a, b));
        assert!(!pool.is_equivalent(a, c));
        // Unpacked arrays get no implicit numeric conversion.
        assert!(!pool.is_assignment_compatible(a, c));
    }

    #[test]
    fn numeric_assignment_widening_and_narrowing() {
        let pool = TypePool::new();
        assert!(pool.is_assignment_compatible(TypeId::INT, TypeId::BYTE));
        assert!(pool.is_assignment_compatible(TypeId::BYTE, TypeId::INT));
        assert!(pool.is_assignment_compatible(TypeId::REAL, TypeId::INT));
        assert!(pool.is_assignment_compatible(TypeId::INT, TypeId::REAL));
        assert!(!pool.is_assignment_compatible(TypeId::STRING, TypeId::INT));
    }

    #[test]
    fn class_assignment_rules() {
        let pool = TypePool::new();
        let iface = pool.intern(TypeData::Class {
            decl: 1,
            name: Name::from_raw(1),
            base: None,
            is_interface: true,
            implements: Box::new([]),
        });
        let base = pool.intern(TypeData::Class {
            decl: 2,
            name: Name::from_raw(2),
            base: None,
            is_interface: false,
            implements: Box::new([iface]),
        });
        let derived = pool.intern(TypeData::Class {
            decl: 3,
            name: Name::from_raw(3),
            base: Some(base),
            is_interface: false,
            implements: Box::new([]),
        });

        // Upcast is implicit; downcast needs an explicit cast.
        assert!(pool.is_assignment_compatible(base, derived));
        assert!(!pool.is_assignment_compatible(derived, base));
        assert!(pool.is_cast_compatible(derived, base));

        // null assigns to any handle.
        assert!(pool.is_assignment_compatible(base, TypeId::NULL));

        // Interface handles accept implementing classes.
        assert!(pool.is_assignment_compatible(iface, derived));
    }

    #[test]
    fn string_casts() {
        let pool = TypePool::new();
        assert!(pool.is_cast_compatible(TypeId::STRING, TypeId::INT));
        assert!(pool.is_cast_compatible(TypeId::INT, TypeId::STRING));
        assert!(!pool.is_assignment_compatible(TypeId::INT, TypeId::STRING));
    }

    #[test]
    fn bitstream_cast_requires_equal_fixed_widths() {
        let pool = TypePool::new();
        let arr32 = pool.intern(TypeData::FixedArray {
            elem: TypeId::BYTE,
            range: ConstantRange::new(3, 0),
        });
        assert!(pool.is_bitstream_castable(arr32, TypeId::INT));
        assert!(!pool.is_bitstream_castable(arr32, TypeId::BYTE));

        let dynamic = pool.intern(TypeData::DynamicArray { elem: TypeId::BYTE });
        assert!(pool.is_bitstream_castable(dynamic, TypeId::INT));
    }

    #[test]
    fn coerce_resizes_integers() {
        let pool = TypePool::new();
        let v = ConstantValue::Integer(LogicVec::new(32, true, 0x1ff));
        let as_byte = pool.coerce_value(v, TypeId::BYTE);
        assert_eq!(as_byte.to_i64(), Some(-1));

        let neg = ConstantValue::Integer(LogicVec::new(8, true, 0xff));
        let as_int = pool.coerce_value(neg, TypeId::INT);
        assert_eq!(as_int.to_i64(), Some(-1));
    }

    #[test]
    fn coerce_two_state_drops_unknowns() {
        let pool = TypePool::new();
        let x = ConstantValue::Integer(LogicVec::filled_x(32, true));
        let as_int = pool.coerce_value(x, TypeId::INT);
        assert_eq!(as_int.to_i64(), Some(0));

        let as_integer =
            pool.coerce_value(ConstantValue::Integer(LogicVec::filled_x(32, true)), TypeId::INTEGER);
        assert!(as_integer.has_unknown());
    }

    #[test]
    fn coerce_real_rounds_half_away_from_zero() {
        let pool = TypePool::new();
        assert_eq!(pool.coerce_value(ConstantValue::Real(2.5), TypeId::INT).to_i64(), Some(3));
        assert_eq!(pool.coerce_value(ConstantValue::Real(-2.5), TypeId::INT).to_i64(), Some(-3));
        assert_eq!(pool.coerce_value(ConstantValue::Real(2.4), TypeId::INT).to_i64(), Some(2));
    }
}
