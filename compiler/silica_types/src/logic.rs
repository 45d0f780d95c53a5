//! Four-state logic vectors.
//!
//! [`LogicVec`] is the integral payload of a constant value: up to 64 bits
//! of two-state data plus an unknown mask marking X/Z positions. Unknown
//! bits propagate through arithmetic pessimistically (any unknown operand
//! bit poisons the whole result) and through bitwise operators precisely
//! (a known 0 still dominates an AND).

use std::fmt;

/// A fixed-width four-state integral value.
///
/// Invariant: `value` and `unknown` are masked to `width`, and bits set in
/// `unknown` are clear in `value`, so derived `Eq`/`Hash` are structural.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct LogicVec {
    width: u32,
    signed: bool,
    value: u64,
    unknown: u64,
}

const fn mask_for(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

impl LogicVec {
    /// Maximum representable width in bits.
    pub const MAX_WIDTH: u32 = 64;

    fn from_parts(width: u32, signed: bool, value: u64, unknown: u64) -> Self {
        let width = width.clamp(1, Self::MAX_WIDTH);
        let m = mask_for(width);
        let unknown = unknown & m;
        LogicVec {
            width,
            signed,
            value: value & m & !unknown,
            unknown,
        }
    }

    /// Create a fully-known value, truncated to `width`.
    pub fn new(width: u32, signed: bool, value: u64) -> Self {
        Self::from_parts(width, signed, value, 0)
    }

    /// Create a value with every bit unknown.
    pub fn filled_x(width: u32, signed: bool) -> Self {
        Self::from_parts(width, signed, 0, u64::MAX)
    }

    /// Create a zero of the given shape.
    pub fn zero(width: u32, signed: bool) -> Self {
        Self::new(width, signed, 0)
    }

    /// A 1-bit unsigned value from a boolean.
    pub fn from_bool(b: bool) -> Self {
        Self::new(1, false, u64::from(b))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Check whether any bit is X/Z.
    pub fn has_unknown(&self) -> bool {
        self.unknown != 0
    }

    /// The unknown mask.
    pub fn unknown_bits(&self) -> u64 {
        self.unknown
    }

    /// The two-state value, if fully known.
    pub fn to_u64(&self) -> Option<u64> {
        if self.has_unknown() {
            None
        } else {
            Some(self.value)
        }
    }

    /// The value as a signed integer, sign-extending when the vector is
    /// signed. `None` if any bit is unknown.
    pub fn to_i64(&self) -> Option<i64> {
        let v = self.to_u64()?;
        if self.signed && self.width < 64 && v & (1u64 << (self.width - 1)) != 0 {
            Some((v | !mask_for(self.width)) as i64)
        } else {
            Some(v as i64)
        }
    }

    /// Reinterpret with a different signedness; the bits are unchanged.
    #[must_use]
    pub fn as_signed(&self, signed: bool) -> Self {
        LogicVec { signed, ..*self }
    }

    /// Resize to a new width. Truncates high bits, or extends: sign-extends
    /// a signed value, X-extends when the sign bit is unknown.
    #[must_use]
    pub fn resize(&self, width: u32) -> Self {
        let width = width.clamp(1, Self::MAX_WIDTH);
        if width <= self.width {
            return Self::from_parts(width, self.signed, self.value, self.unknown);
        }
        let msb = 1u64 << (self.width - 1);
        let ext = !mask_for(self.width);
        let (mut value, mut unknown) = (self.value, self.unknown);
        if self.signed {
            if self.unknown & msb != 0 {
                unknown |= ext;
            } else if self.value & msb != 0 {
                value |= ext;
            }
        }
        Self::from_parts(width, self.signed, value, unknown)
    }

    fn common_shape(&self, rhs: &LogicVec) -> (u32, bool) {
        (self.width.max(rhs.width), self.signed && rhs.signed)
    }

    fn extend_to(&self, width: u32, signed: bool) -> Self {
        self.as_signed(self.signed && signed).resize(width)
    }

    fn binary_known(
        &self,
        rhs: &LogicVec,
        f: impl FnOnce(u64, u64, u32, bool) -> Option<u64>,
    ) -> LogicVec {
        let (w, signed) = self.common_shape(rhs);
        let (a, b) = (self.extend_to(w, signed), rhs.extend_to(w, signed));
        match (a.to_u64(), b.to_u64()) {
            (Some(x), Some(y)) => match f(x, y, w, signed) {
                Some(v) => LogicVec::new(w, signed, v),
                None => LogicVec::filled_x(w, signed),
            },
            _ => LogicVec::filled_x(w, signed),
        }
    }

    pub fn add(&self, rhs: &LogicVec) -> LogicVec {
        self.binary_known(rhs, |x, y, _, _| Some(x.wrapping_add(y)))
    }

    pub fn sub(&self, rhs: &LogicVec) -> LogicVec {
        self.binary_known(rhs, |x, y, _, _| Some(x.wrapping_sub(y)))
    }

    pub fn mul(&self, rhs: &LogicVec) -> LogicVec {
        self.binary_known(rhs, |x, y, _, _| Some(x.wrapping_mul(y)))
    }

    /// Division. A zero divisor yields an all-X result.
    pub fn div(&self, rhs: &LogicVec) -> LogicVec {
        self.binary_known(rhs, |x, y, w, signed| {
            if y == 0 {
                return None;
            }
            if signed {
                let (a, b) = (sign_of(x, w), sign_of(y, w));
                Some(a.wrapping_div(b) as u64)
            } else {
                Some(x / y)
            }
        })
    }

    /// Remainder. A zero divisor yields an all-X result.
    pub fn rem(&self, rhs: &LogicVec) -> LogicVec {
        self.binary_known(rhs, |x, y, w, signed| {
            if y == 0 {
                return None;
            }
            if signed {
                let (a, b) = (sign_of(x, w), sign_of(y, w));
                Some(a.wrapping_rem(b) as u64)
            } else {
                Some(x % y)
            }
        })
    }

    pub fn neg(&self) -> LogicVec {
        match self.to_u64() {
            Some(v) => LogicVec::new(self.width, self.signed, v.wrapping_neg()),
            None => LogicVec::filled_x(self.width, self.signed),
        }
    }

    /// Logical shift left; the result keeps the left operand's shape.
    pub fn shl(&self, amount: &LogicVec) -> LogicVec {
        match (self.to_u64(), amount.to_u64()) {
            (Some(v), Some(n)) if n < 64 => LogicVec::new(self.width, self.signed, v << n),
            (Some(_), Some(_)) => LogicVec::zero(self.width, self.signed),
            _ => LogicVec::filled_x(self.width, self.signed),
        }
    }

    /// Shift right: arithmetic for signed vectors, logical otherwise.
    pub fn shr(&self, amount: &LogicVec) -> LogicVec {
        let Some(n) = amount.to_u64() else {
            return LogicVec::filled_x(self.width, self.signed);
        };
        if self.signed {
            match self.to_i64() {
                Some(v) => {
                    let shifted = v >> n.min(63);
                    LogicVec::new(self.width, true, shifted as u64)
                }
                None => LogicVec::filled_x(self.width, true),
            }
        } else {
            match self.to_u64() {
                Some(v) if n < 64 => LogicVec::new(self.width, false, v >> n),
                Some(_) => LogicVec::zero(self.width, false),
                None => LogicVec::filled_x(self.width, false),
            }
        }
    }

    /// Bitwise AND with precise unknown propagation: a known 0 on either
    /// side forces the result bit to 0 even if the other side is X.
    pub fn and(&self, rhs: &LogicVec) -> LogicVec {
        let (w, signed) = self.common_shape(rhs);
        let (a, b) = (self.extend_to(w, signed), rhs.extend_to(w, signed));
        let zero_a = !a.value & !a.unknown;
        let zero_b = !b.value & !b.unknown;
        let unknown = (a.unknown | b.unknown) & !zero_a & !zero_b;
        Self::from_parts(w, signed, a.value & b.value, unknown)
    }

    /// Bitwise OR: a known 1 on either side forces the result bit to 1.
    pub fn or(&self, rhs: &LogicVec) -> LogicVec {
        let (w, signed) = self.common_shape(rhs);
        let (a, b) = (self.extend_to(w, signed), rhs.extend_to(w, signed));
        let one_a = a.value & !a.unknown;
        let one_b = b.value & !b.unknown;
        let unknown = (a.unknown | b.unknown) & !one_a & !one_b;
        Self::from_parts(w, signed, a.value | b.value, unknown)
    }

    /// Bitwise XOR: any unknown input bit makes the result bit unknown.
    pub fn xor(&self, rhs: &LogicVec) -> LogicVec {
        let (w, signed) = self.common_shape(rhs);
        let (a, b) = (self.extend_to(w, signed), rhs.extend_to(w, signed));
        Self::from_parts(w, signed, a.value ^ b.value, a.unknown | b.unknown)
    }

    /// Bitwise NOT; unknown bits stay unknown.
    pub fn not(&self) -> LogicVec {
        Self::from_parts(self.width, self.signed, !self.value, self.unknown)
    }

    /// Collapse to a boolean: `Some(true)` if any known 1 bit exists,
    /// `None` if all set bits are unknown, `Some(false)` if all-zero.
    pub fn reduce_bool(&self) -> Option<bool> {
        if self.value != 0 {
            Some(true)
        } else if self.unknown != 0 {
            None
        } else {
            Some(false)
        }
    }

    /// Equality comparison; `None` if either side has unknown bits.
    pub fn eq_logic(&self, rhs: &LogicVec) -> Option<bool> {
        let (w, signed) = self.common_shape(rhs);
        let a = self.extend_to(w, signed).to_u64()?;
        let b = rhs.extend_to(w, signed).to_u64()?;
        Some(a == b)
    }

    /// Less-than comparison, signed when both operands are signed.
    pub fn lt(&self, rhs: &LogicVec) -> Option<bool> {
        let (w, signed) = self.common_shape(rhs);
        let a = self.extend_to(w, signed);
        let b = rhs.extend_to(w, signed);
        if signed {
            Some(a.to_i64()? < b.to_i64()?)
        } else {
            Some(a.to_u64()? < b.to_u64()?)
        }
    }
}

fn sign_of(v: u64, width: u32) -> i64 {
    if width < 64 && v & (1u64 << (width - 1)) != 0 {
        (v | !mask_for(width)) as i64
    } else {
        v as i64
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_unknown() {
            write!(f, "{}'b", self.width)?;
            for i in (0..self.width).rev() {
                let bit = 1u64 << i;
                if self.unknown & bit != 0 {
                    write!(f, "x")?;
                } else {
                    write!(f, "{}", u64::from(self.value & bit != 0))?;
                }
            }
            Ok(())
        } else if self.signed {
            match self.to_i64() {
                Some(v) => write!(f, "{v}"),
                None => write!(f, "{}'bx", self.width),
            }
        } else {
            write!(f, "{}", self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn construction_masks_to_width() {
        let v = LogicVec::new(8, false, 0x1ff);
        assert_eq!(v.to_u64(), Some(0xff));
        assert_eq!(v.width(), 8);
    }

    #[test]
    fn signed_extraction() {
        let v = LogicVec::new(8, true, 0xff);
        assert_eq!(v.to_i64(), Some(-1));
        assert_eq!(v.to_u64(), Some(0xff));
    }

    #[test]
    fn resize_sign_extends() {
        let v = LogicVec::new(8, true, 0x80);
        let wide = v.resize(16);
        assert_eq!(wide.to_i64(), Some(-128));

        let u = LogicVec::new(8, false, 0x80);
        assert_eq!(u.resize(16).to_u64(), Some(0x80));
    }

    #[test]
    fn arithmetic_basics() {
        let a = LogicVec::new(32, true, 3);
        let b = LogicVec::new(32, true, 2);
        assert_eq!(a.add(&b).to_i64(), Some(5));
        assert_eq!(a.sub(&b).to_i64(), Some(1));
        assert_eq!(a.mul(&b).to_i64(), Some(6));
        assert_eq!(a.div(&b).to_i64(), Some(1));
        assert_eq!(a.rem(&b).to_i64(), Some(1));
    }

    #[test]
    fn signed_division_rounds_toward_zero() {
        let a = LogicVec::new(32, true, (-7i64) as u64);
        let b = LogicVec::new(32, true, 2);
        assert_eq!(a.div(&b).to_i64(), Some(-3));
        assert_eq!(a.rem(&b).to_i64(), Some(-1));
    }

    #[test]
    fn division_by_zero_is_all_x() {
        let a = LogicVec::new(32, true, 10);
        let z = LogicVec::zero(32, true);
        let q = a.div(&z);
        assert!(q.has_unknown());
        assert_eq!(q.to_u64(), None);
        assert!(a.rem(&z).has_unknown());
    }

    #[test]
    fn unknown_poisons_arithmetic() {
        let a = LogicVec::new(8, false, 5);
        let x = LogicVec::filled_x(8, false);
        assert!(a.add(&x).has_unknown());
        assert!(x.mul(&a).has_unknown());
    }

    #[test]
    fn bitwise_known_zero_dominates_and() {
        let zero = LogicVec::zero(4, false);
        let x = LogicVec::filled_x(4, false);
        let r = zero.and(&x);
        assert_eq!(r.to_u64(), Some(0));
    }

    #[test]
    fn bitwise_known_one_dominates_or() {
        let ones = LogicVec::new(4, false, 0xf);
        let x = LogicVec::filled_x(4, false);
        assert_eq!(ones.or(&x).to_u64(), Some(0xf));
    }

    #[test]
    fn xor_with_unknown_is_unknown() {
        let ones = LogicVec::new(4, false, 0xf);
        let x = LogicVec::filled_x(4, false);
        assert!(ones.xor(&x).has_unknown());
    }

    #[test]
    fn reduce_bool_three_ways() {
        assert_eq!(LogicVec::new(8, false, 2).reduce_bool(), Some(true));
        assert_eq!(LogicVec::zero(8, false).reduce_bool(), Some(false));
        assert_eq!(LogicVec::filled_x(8, false).reduce_bool(), None);
        // A known 1 bit wins even when other bits are X.
        let mixed = LogicVec::new(2, false, 0b01).or(&LogicVec::from_parts(2, false, 0, 0b10));
        assert_eq!(mixed.reduce_bool(), Some(true));
    }

    #[test]
    fn comparisons() {
        let a = LogicVec::new(32, true, (-1i64) as u64);
        let b = LogicVec::new(32, true, 1);
        assert_eq!(a.lt(&b), Some(true));
        // Mixed signedness compares unsigned.
        let c = LogicVec::new(32, false, 1);
        assert_eq!(a.lt(&c), Some(false));
        assert_eq!(a.eq_logic(&a), Some(true));
        assert_eq!(a.eq_logic(&LogicVec::filled_x(32, true)), None);
    }

    #[test]
    fn shifts() {
        let v = LogicVec::new(8, false, 0b0110);
        let two = LogicVec::new(32, false, 2);
        assert_eq!(v.shl(&two).to_u64(), Some(0b011000));
        assert_eq!(v.shr(&two).to_u64(), Some(0b01));

        let neg = LogicVec::new(8, true, 0x80);
        let one = LogicVec::new(32, false, 1);
        assert_eq!(neg.shr(&one).to_i64(), Some(-64));
    }

    #[test]
    fn display_with_x() {
        let x = LogicVec::filled_x(4, false);
        assert_eq!(x.to_string(), "4'bxxxx");
        assert_eq!(LogicVec::new(8, true, 0xff).to_string(), "-1");
        assert_eq!(LogicVec::new(8, false, 0xff).to_string(), "255");
    }
}
