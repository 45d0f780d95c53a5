//! Type representation.
//!
//! Types are interned in a [`TypePool`](crate::TypePool) and referred to by
//! [`TypeId`] handles. Structural types (packed/unpacked arrays, queues)
//! deduplicate on shape; nominal types (enums, structs, classes) carry the
//! declaring symbol's id so distinct declarations stay distinct.

use std::fmt;

use bitflags::bitflags;
use silica_syntax::Name;

use crate::ConstantRange;

/// Handle to an interned type.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// The error type, compatible with everything to suppress cascades.
    pub const ERROR: TypeId = TypeId(0);
    pub const BIT: TypeId = TypeId(1);
    pub const LOGIC: TypeId = TypeId(2);
    pub const REG: TypeId = TypeId(3);
    pub const BYTE: TypeId = TypeId(4);
    pub const INT: TypeId = TypeId(5);
    pub const INTEGER: TypeId = TypeId(6);
    pub const LONG_INT: TypeId = TypeId(7);
    pub const TIME: TypeId = TypeId(8);
    pub const REAL: TypeId = TypeId(9);
    pub const SHORT_REAL: TypeId = TypeId(10);
    pub const STRING: TypeId = TypeId(11);
    pub const VOID: TypeId = TypeId(12);
    /// The type of the `null` literal.
    pub const NULL: TypeId = TypeId(13);

    /// First index available for dynamically interned types; lower indices
    /// are reserved for builtins.
    pub const FIRST_DYNAMIC: u32 = 32;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

bitflags! {
    /// Properties of an integral type.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct IntegralFlags: u8 {
        const SIGNED = 1 << 0;
        const FOUR_STATE = 1 << 1;
        /// Declared with the `reg` keyword; semantically identical to
        /// `logic` but kept for diagnostics.
        const REG = 1 << 2;
    }
}

/// The predefined multi-bit integer types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PredefinedIntKind {
    Byte,
    Int,
    Integer,
    LongInt,
    Time,
}

impl PredefinedIntKind {
    pub const fn bit_width(self) -> u32 {
        match self {
            PredefinedIntKind::Byte => 8,
            PredefinedIntKind::Int | PredefinedIntKind::Integer => 32,
            PredefinedIntKind::LongInt | PredefinedIntKind::Time => 64,
        }
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            PredefinedIntKind::Byte => "byte",
            PredefinedIntKind::Int => "int",
            PredefinedIntKind::Integer => "integer",
            PredefinedIntKind::LongInt => "longint",
            PredefinedIntKind::Time => "time",
        }
    }
}

/// The floating-point types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RealKind {
    Real,
    ShortReal,
}

impl RealKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            RealKind::Real => "real",
            RealKind::ShortReal => "shortreal",
        }
    }
}

/// Interned type payload.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeData {
    /// Placeholder for a type that failed to resolve.
    Error,
    /// A single-bit type (`bit`, `logic`, `reg`).
    Scalar(IntegralFlags),
    /// A predefined integer type (`byte`, `int`, ...).
    PredefinedInt {
        kind: PredefinedIntKind,
        flags: IntegralFlags,
    },
    /// A packed array of an integral element type.
    PackedArray {
        elem: TypeId,
        range: ConstantRange,
        flags: IntegralFlags,
    },
    Real(RealKind),
    Str,
    Void,
    /// The type of the `null` literal, assignable to any class handle.
    Null,
    /// An enum; `decl` is the declaring symbol.
    Enum { decl: u32, base: TypeId, name: Name },
    /// A fixed-size unpacked array.
    FixedArray { elem: TypeId, range: ConstantRange },
    DynamicArray { elem: TypeId },
    Queue { elem: TypeId },
    /// An associative array; `index` is `None` for wildcard index.
    Associative {
        elem: TypeId,
        index: Option<TypeId>,
    },
    /// An unpacked struct; `decl` is the declaring symbol.
    UnpackedStruct {
        decl: u32,
        fields: Box<[(Name, TypeId)]>,
    },
    /// A class or interface class.
    Class {
        decl: u32,
        name: Name,
        base: Option<TypeId>,
        is_interface: bool,
        implements: Box<[TypeId]>,
    },
    /// A typedef; transparent for all compatibility queries.
    Alias { name: Name, target: TypeId },
}

impl TypeData {
    /// Whether this type directly holds bits (before alias resolution).
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            TypeData::Scalar(_)
                | TypeData::PredefinedInt { .. }
                | TypeData::PackedArray { .. }
                | TypeData::Enum { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_below_dynamic_floor() {
        assert!(TypeId::NULL.raw() < TypeId::FIRST_DYNAMIC);
        assert!(TypeId::ERROR.is_error());
        assert!(!TypeId::INT.is_error());
    }

    #[test]
    fn predefined_widths() {
        assert_eq!(PredefinedIntKind::Byte.bit_width(), 8);
        assert_eq!(PredefinedIntKind::Int.bit_width(), 32);
        assert_eq!(PredefinedIntKind::Integer.bit_width(), 32);
        assert_eq!(PredefinedIntKind::LongInt.bit_width(), 64);
        assert_eq!(PredefinedIntKind::Time.bit_width(), 64);
    }
}
