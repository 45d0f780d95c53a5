//! Constant dimension ranges.

use std::fmt;

/// A constant range `[left:right]` as written in a dimension.
///
/// Either bound may be larger; `[7:0]` and `[0:7]` are both valid and
/// describe the same number of elements with different index ordering.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct ConstantRange {
    pub left: i32,
    pub right: i32,
}

impl ConstantRange {
    /// Create a range from its written bounds.
    pub const fn new(left: i32, right: i32) -> Self {
        ConstantRange { left, right }
    }

    /// Number of elements described by the range.
    pub const fn width(&self) -> u32 {
        (self.left - self.right).unsigned_abs() + 1
    }

    /// The smaller bound.
    pub fn lower(&self) -> i32 {
        self.left.min(self.right)
    }

    /// The larger bound.
    pub fn upper(&self) -> i32 {
        self.left.max(self.right)
    }

    /// Whether `left` is the high index (`[7:0]` style).
    pub const fn is_little_endian(&self) -> bool {
        self.left >= self.right
    }

    /// Check whether an index falls inside the range.
    pub fn contains(&self, index: i32) -> bool {
        index >= self.lower() && index <= self.upper()
    }

    /// Translate an index into a zero-based element offset, respecting the
    /// range's ordering.
    pub fn offset_of(&self, index: i32) -> Option<u32> {
        if !self.contains(index) {
            return None;
        }
        let offset = if self.is_little_endian() {
            i64::from(self.left) - i64::from(index)
        } else {
            i64::from(index) - i64::from(self.left)
        };
        u32::try_from(offset).ok()
    }

    /// Translate an index into a bit position counting from the right
    /// bound, which is the least significant bit of a packed dimension.
    pub fn bit_position_of(&self, index: i32) -> Option<u32> {
        if !self.contains(index) {
            return None;
        }
        let position = if self.is_little_endian() {
            i64::from(index) - i64::from(self.right)
        } else {
            i64::from(self.right) - i64::from(index)
        };
        u32::try_from(position).ok()
    }
}

impl fmt::Debug for ConstantRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.left, self.right)
    }
}

impl fmt::Display for ConstantRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.left, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_either_direction() {
        assert_eq!(ConstantRange::new(7, 0).width(), 8);
        assert_eq!(ConstantRange::new(0, 7).width(), 8);
        assert_eq!(ConstantRange::new(3, 3).width(), 1);
    }

    #[test]
    fn offsets_respect_ordering() {
        let little = ConstantRange::new(7, 0);
        assert_eq!(little.offset_of(7), Some(0));
        assert_eq!(little.offset_of(0), Some(7));

        let big = ConstantRange::new(0, 7);
        assert_eq!(big.offset_of(0), Some(0));
        assert_eq!(big.offset_of(7), Some(7));

        assert_eq!(little.offset_of(8), None);
        assert_eq!(little.offset_of(-1), None);
    }

    #[test]
    fn bit_positions_count_from_the_right_bound() {
        let little = ConstantRange::new(7, 0);
        assert_eq!(little.bit_position_of(0), Some(0));
        assert_eq!(little.bit_position_of(7), Some(7));

        let big = ConstantRange::new(0, 7);
        assert_eq!(big.bit_position_of(7), Some(0));
        assert_eq!(big.bit_position_of(0), Some(7));

        let shifted = ConstantRange::new(15, 8);
        assert_eq!(shifted.bit_position_of(8), Some(0));
        assert_eq!(shifted.bit_position_of(15), Some(7));
        assert_eq!(shifted.bit_position_of(7), None);
    }

    #[test]
    fn display_format() {
        assert_eq!(ConstantRange::new(15, 8).to_string(), "[15:8]");
    }
}
