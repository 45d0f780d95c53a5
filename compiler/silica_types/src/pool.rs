//! The type pool: interning, canonicalization, and classification queries.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use silica_syntax::ast::TypeKeyword;
use silica_syntax::StringInterner;

use crate::{
    ConstantRange, ConstantValue, IntegralFlags, LogicVec, PredefinedIntKind, RealKind, TypeData,
    TypeId,
};

pub(crate) struct PoolInner {
    pub(crate) types: Vec<TypeData>,
    /// Canonical id per entry, parallel to `types`. Alias targets are
    /// always interned before the alias itself, so this is filled in a
    /// single step at intern time.
    canon: Vec<TypeId>,
    dedup: FxHashMap<TypeData, TypeId>,
}

/// Interning pool for all types in a compilation.
///
/// Builtins occupy fixed indices matching the [`TypeId`] constants, so
/// `TypeId::INT` is valid without touching the pool. All queries resolve
/// aliases first; two types compare as matching exactly when their
/// canonical ids are equal.
pub struct TypePool {
    pub(crate) inner: RwLock<PoolInner>,
}

impl TypePool {
    pub fn new() -> Self {
        let mut types = Vec::with_capacity(TypeId::FIRST_DYNAMIC as usize);
        types.push(TypeData::Error);
        types.push(TypeData::Scalar(IntegralFlags::empty()));
        types.push(TypeData::Scalar(IntegralFlags::FOUR_STATE));
        types.push(TypeData::Scalar(
            IntegralFlags::FOUR_STATE | IntegralFlags::REG,
        ));
        types.push(TypeData::PredefinedInt {
            kind: PredefinedIntKind::Byte,
            flags: IntegralFlags::SIGNED,
        });
        types.push(TypeData::PredefinedInt {
            kind: PredefinedIntKind::Int,
            flags: IntegralFlags::SIGNED,
        });
        types.push(TypeData::PredefinedInt {
            kind: PredefinedIntKind::Integer,
            flags: IntegralFlags::SIGNED | IntegralFlags::FOUR_STATE,
        });
        types.push(TypeData::PredefinedInt {
            kind: PredefinedIntKind::LongInt,
            flags: IntegralFlags::SIGNED,
        });
        types.push(TypeData::PredefinedInt {
            kind: PredefinedIntKind::Time,
            flags: IntegralFlags::FOUR_STATE,
        });
        types.push(TypeData::Real(RealKind::Real));
        types.push(TypeData::Real(RealKind::ShortReal));
        types.push(TypeData::Str);
        types.push(TypeData::Void);
        types.push(TypeData::Null);

        let mut dedup = FxHashMap::default();
        for (i, data) in types.iter().enumerate() {
            dedup.insert(data.clone(), TypeId::from_raw(i as u32));
        }
        // Reserve the remaining builtin slots.
        while types.len() < TypeId::FIRST_DYNAMIC as usize {
            types.push(TypeData::Error);
        }
        let canon = (0..types.len() as u32).map(TypeId::from_raw).collect();

        TypePool {
            inner: RwLock::new(PoolInner {
                types,
                canon,
                dedup,
            }),
        }
    }

    /// Intern a type, deduplicating structurally identical entries.
    pub fn intern(&self, data: TypeData) -> TypeId {
        let mut inner = self.inner.write();
        if let Some(&id) = inner.dedup.get(&data) {
            return id;
        }
        let id = match u32::try_from(inner.types.len()) {
            Ok(raw) => TypeId::from_raw(raw),
            Err(_) => panic!("type pool exceeded capacity"),
        };
        let canon = match &data {
            TypeData::Alias { target, .. } => inner.canonical(*target),
            _ => id,
        };
        inner.dedup.insert(data.clone(), id);
        inner.types.push(data);
        inner.canon.push(canon);
        id
    }

    /// The builtin type for a type keyword, with default signing.
    pub fn builtin(keyword: TypeKeyword) -> TypeId {
        match keyword {
            TypeKeyword::Bit => TypeId::BIT,
            TypeKeyword::Logic => TypeId::LOGIC,
            TypeKeyword::Reg => TypeId::REG,
            TypeKeyword::Byte => TypeId::BYTE,
            TypeKeyword::Int => TypeId::INT,
            TypeKeyword::Integer => TypeId::INTEGER,
            TypeKeyword::LongInt => TypeId::LONG_INT,
            TypeKeyword::Time => TypeId::TIME,
            TypeKeyword::Real => TypeId::REAL,
            TypeKeyword::ShortReal => TypeId::SHORT_REAL,
            TypeKeyword::String => TypeId::STRING,
            TypeKeyword::Void => TypeId::VOID,
        }
    }

    /// Apply an explicit `signed`/`unsigned` keyword to an integral type.
    /// Non-integral types are returned unchanged.
    pub fn with_signing(&self, id: TypeId, signed: bool) -> TypeId {
        let data = self.get(id);
        let adjust = |mut flags: IntegralFlags| {
            flags.set(IntegralFlags::SIGNED, signed);
            flags
        };
        match data {
            TypeData::Scalar(flags) => self.intern(TypeData::Scalar(adjust(flags))),
            TypeData::PredefinedInt { kind, flags } => self.intern(TypeData::PredefinedInt {
                kind,
                flags: adjust(flags),
            }),
            TypeData::PackedArray { elem, range, flags } => self.intern(TypeData::PackedArray {
                elem,
                range,
                flags: adjust(flags),
            }),
            _ => id,
        }
    }

    /// Get a copy of the type's payload.
    pub fn get(&self, id: TypeId) -> TypeData {
        self.inner.read().data(id).clone()
    }

    /// Resolve alias chains to the canonical type.
    pub fn canonical(&self, id: TypeId) -> TypeId {
        self.inner.read().canonical(id)
    }

    pub fn is_integral(&self, id: TypeId) -> bool {
        self.inner.read().canonical_data(id).is_integral()
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        let inner = self.inner.read();
        let data = inner.canonical_data(id);
        data.is_integral() || matches!(data, TypeData::Real(_))
    }

    pub fn is_real(&self, id: TypeId) -> bool {
        matches!(self.inner.read().canonical_data(id), TypeData::Real(_))
    }

    pub fn is_enum(&self, id: TypeId) -> bool {
        matches!(self.inner.read().canonical_data(id), TypeData::Enum { .. })
    }

    pub fn is_class(&self, id: TypeId) -> bool {
        matches!(self.inner.read().canonical_data(id), TypeData::Class { .. })
    }

    pub fn is_null(&self, id: TypeId) -> bool {
        matches!(self.inner.read().canonical_data(id), TypeData::Null)
    }

    pub fn is_string(&self, id: TypeId) -> bool {
        matches!(self.inner.read().canonical_data(id), TypeData::Str)
    }

    pub fn is_void(&self, id: TypeId) -> bool {
        matches!(self.inner.read().canonical_data(id), TypeData::Void)
    }

    /// Whether the type's size is only known at run time.
    pub fn is_dynamically_sized(&self, id: TypeId) -> bool {
        matches!(
            self.inner.read().canonical_data(id),
            TypeData::DynamicArray { .. }
                | TypeData::Queue { .. }
                | TypeData::Associative { .. }
                | TypeData::Str
        )
    }

    /// Whether values of this type can hold X/Z bits.
    pub fn is_four_state(&self, id: TypeId) -> bool {
        let inner = self.inner.read();
        inner
            .integral_flags(id)
            .is_some_and(|f| f.contains(IntegralFlags::FOUR_STATE))
    }

    pub fn is_signed(&self, id: TypeId) -> bool {
        let inner = self.inner.read();
        inner
            .integral_flags(id)
            .is_some_and(|f| f.contains(IntegralFlags::SIGNED))
    }

    /// Width in bits of an integral type; 0 for non-integral types.
    pub fn bit_width(&self, id: TypeId) -> u32 {
        self.inner.read().bit_width(id)
    }

    /// Total bit count for bitstream operations ($bits, bitstream casts);
    /// 0 for dynamically sized and non-bitstream types.
    pub fn bitstream_width(&self, id: TypeId) -> u32 {
        self.inner.read().bitstream_width(id)
    }

    /// The fixed index range, for integral and fixed-array types.
    pub fn fixed_range(&self, id: TypeId) -> Option<ConstantRange> {
        self.inner.read().fixed_range(id)
    }

    /// Element type of an array-like type.
    pub fn element_type(&self, id: TypeId) -> Option<TypeId> {
        let inner = self.inner.read();
        match inner.canonical_data(id) {
            TypeData::FixedArray { elem, .. }
            | TypeData::DynamicArray { elem }
            | TypeData::Queue { elem }
            | TypeData::Associative { elem, .. } => Some(*elem),
            TypeData::PackedArray { elem, .. } => Some(*elem),
            _ => None,
        }
    }

    /// The value a variable of this type holds before assignment.
    pub fn default_value(&self, id: TypeId) -> ConstantValue {
        self.inner.read().default_value(id)
    }

    /// Check whether `derived` is `base` or transitively extends it.
    pub fn is_derived_from(&self, derived: TypeId, base: TypeId) -> bool {
        self.inner.read().is_derived_from(derived, base)
    }

    /// Check whether a class implements an interface class, directly or
    /// through its base chain.
    pub fn implements_iface(&self, cls: TypeId, iface: TypeId) -> bool {
        self.inner.read().implements_iface(cls, iface)
    }

    /// The closest common base class of two class types, if any.
    pub fn common_base(&self, a: TypeId, b: TypeId) -> Option<TypeId> {
        let inner = self.inner.read();
        let mut cursor = Some(inner.canonical(a));
        while let Some(cur) = cursor {
            if inner.is_derived_from(b, cur) {
                return Some(cur);
            }
            cursor = match inner.canonical_data(cur) {
                TypeData::Class { base, .. } => base.map(|t| inner.canonical(t)),
                _ => None,
            };
        }
        None
    }

    /// Render a type for diagnostics.
    pub fn type_str(&self, id: TypeId, interner: &StringInterner) -> String {
        self.inner.read().type_str(id, interner)
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolInner {
    pub(crate) fn data(&self, id: TypeId) -> &TypeData {
        static ERROR_DATA: TypeData = TypeData::Error;
        self.types.get(id.raw() as usize).unwrap_or(&ERROR_DATA)
    }

    pub(crate) fn canonical(&self, id: TypeId) -> TypeId {
        self.canon
            .get(id.raw() as usize)
            .copied()
            .unwrap_or(TypeId::ERROR)
    }

    pub(crate) fn canonical_data(&self, id: TypeId) -> &TypeData {
        self.data(self.canonical(id))
    }

    pub(crate) fn integral_flags(&self, id: TypeId) -> Option<IntegralFlags> {
        match self.canonical_data(id) {
            TypeData::Scalar(flags)
            | TypeData::PredefinedInt { flags, .. }
            | TypeData::PackedArray { flags, .. } => Some(*flags),
            TypeData::Enum { base, .. } => self.integral_flags(*base),
            _ => None,
        }
    }

    pub(crate) fn bit_width(&self, id: TypeId) -> u32 {
        match self.canonical_data(id) {
            TypeData::Scalar(_) => 1,
            TypeData::PredefinedInt { kind, .. } => kind.bit_width(),
            TypeData::PackedArray { elem, range, .. } => {
                self.bit_width(*elem).saturating_mul(range.width())
            }
            TypeData::Enum { base, .. } => self.bit_width(*base),
            _ => 0,
        }
    }

    pub(crate) fn bitstream_width(&self, id: TypeId) -> u32 {
        match self.canonical_data(id) {
            TypeData::FixedArray { elem, range } => {
                self.bitstream_width(*elem).saturating_mul(range.width())
            }
            TypeData::UnpackedStruct { fields, .. } => fields
                .iter()
                .fold(0u32, |acc, (_, ty)| acc.saturating_add(self.bitstream_width(*ty))),
            _ => self.bit_width(id),
        }
    }

    /// Whether the type participates in bitstream casts at all.
    pub(crate) fn is_bitstream_type(&self, id: TypeId) -> bool {
        match self.canonical_data(id) {
            TypeData::Str | TypeData::DynamicArray { .. } | TypeData::Queue { .. } => true,
            TypeData::FixedArray { elem, .. } => self.is_bitstream_type(*elem),
            TypeData::UnpackedStruct { fields, .. } => {
                fields.iter().all(|(_, ty)| self.is_bitstream_type(*ty))
            }
            data => data.is_integral(),
        }
    }

    pub(crate) fn fixed_range(&self, id: TypeId) -> Option<ConstantRange> {
        match self.canonical_data(id) {
            TypeData::Scalar(_) => Some(ConstantRange::new(0, 0)),
            TypeData::PredefinedInt { kind, .. } => {
                Some(ConstantRange::new(kind.bit_width() as i32 - 1, 0))
            }
            TypeData::PackedArray { range, .. } | TypeData::FixedArray { range, .. } => {
                Some(*range)
            }
            TypeData::Enum { base, .. } => self.fixed_range(*base),
            _ => None,
        }
    }

    pub(crate) fn default_value(&self, id: TypeId) -> ConstantValue {
        match self.canonical_data(id) {
            data if data.is_integral() => {
                let width = self.bit_width(id);
                let flags = self.integral_flags(id).unwrap_or_default();
                let signed = flags.contains(IntegralFlags::SIGNED);
                if flags.contains(IntegralFlags::FOUR_STATE) {
                    ConstantValue::Integer(LogicVec::filled_x(width, signed))
                } else {
                    ConstantValue::Integer(LogicVec::zero(width, signed))
                }
            }
            TypeData::Real(_) => ConstantValue::Real(0.0),
            TypeData::Str => ConstantValue::Str(String::new()),
            TypeData::Class { .. } | TypeData::Null => ConstantValue::Null,
            TypeData::FixedArray { elem, range } => {
                let elem_default = self.default_value(*elem);
                ConstantValue::Aggregate(vec![elem_default; range.width() as usize])
            }
            TypeData::UnpackedStruct { fields, .. } => ConstantValue::Aggregate(
                fields.iter().map(|(_, ty)| self.default_value(*ty)).collect(),
            ),
            TypeData::DynamicArray { .. } | TypeData::Queue { .. } | TypeData::Associative { .. } => {
                ConstantValue::Aggregate(Vec::new())
            }
            _ => ConstantValue::Invalid,
        }
    }

    pub(crate) fn is_derived_from(&self, derived: TypeId, base: TypeId) -> bool {
        let base = self.canonical(base);
        let mut cur = self.canonical(derived);
        loop {
            if cur == base {
                return true;
            }
            match self.canonical_data(cur) {
                TypeData::Class { base: Some(b), .. } => cur = self.canonical(*b),
                _ => return false,
            }
        }
    }

    pub(crate) fn implements_iface(&self, cls: TypeId, iface: TypeId) -> bool {
        let iface = self.canonical(iface);
        let mut cur = self.canonical(cls);
        loop {
            match self.canonical_data(cur) {
                TypeData::Class {
                    base, implements, ..
                } => {
                    for &i in implements.iter() {
                        // An implemented interface may itself extend others.
                        if self.canonical(i) == iface || self.is_derived_from(i, iface) {
                            return true;
                        }
                    }
                    match base {
                        Some(b) => cur = self.canonical(*b),
                        None => return false,
                    }
                }
                _ => return false,
            }
        }
    }

    pub(crate) fn type_str(&self, id: TypeId, interner: &StringInterner) -> String {
        match self.data(id) {
            TypeData::Error => "<error>".to_owned(),
            TypeData::Scalar(flags) => {
                let base = if flags.contains(IntegralFlags::REG) {
                    "reg"
                } else if flags.contains(IntegralFlags::FOUR_STATE) {
                    "logic"
                } else {
                    "bit"
                };
                if flags.contains(IntegralFlags::SIGNED) {
                    format!("{base} signed")
                } else {
                    base.to_owned()
                }
            }
            TypeData::PredefinedInt { kind, flags } => {
                // Signed is the default for these; only note deviations.
                if flags.contains(IntegralFlags::SIGNED)
                    || matches!(kind, PredefinedIntKind::Time)
                {
                    kind.keyword().to_owned()
                } else {
                    format!("{} unsigned", kind.keyword())
                }
            }
            TypeData::PackedArray { elem, range, .. } => {
                format!("{} {range}", self.type_str(*elem, interner))
            }
            TypeData::Real(kind) => kind.keyword().to_owned(),
            TypeData::Str => "string".to_owned(),
            TypeData::Void => "void".to_owned(),
            TypeData::Null => "null".to_owned(),
            TypeData::Enum { name, .. } | TypeData::Class { name, .. } => {
                let s = interner.resolve(*name);
                if s.is_empty() {
                    "<unnamed>".to_owned()
                } else {
                    s.to_owned()
                }
            }
            TypeData::FixedArray { elem, range } => {
                format!("{}${range}", self.type_str(*elem, interner))
            }
            TypeData::DynamicArray { elem } => format!("{}$[]", self.type_str(*elem, interner)),
            TypeData::Queue { elem } => format!("{}$[$]", self.type_str(*elem, interner)),
            TypeData::Associative { elem, index } => {
                let idx = match index {
                    Some(i) => self.type_str(*i, interner),
                    None => "*".to_owned(),
                };
                format!("{}$[{idx}]", self.type_str(*elem, interner))
            }
            TypeData::UnpackedStruct { .. } => "struct".to_owned(),
            TypeData::Alias { name, .. } => interner.resolve(*name).to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use silica_syntax::Name;

    #[test]
    fn builtins_at_fixed_indices() {
        let pool = TypePool::new();
        assert!(matches!(pool.get(TypeId::INT), TypeData::PredefinedInt { kind: PredefinedIntKind::Int, .. }));
        assert_eq!(pool.bit_width(TypeId::INT), 32);
        assert!(pool.is_four_state(TypeId::LOGIC));
        assert!(!pool.is_four_state(TypeId::BIT));
        assert!(pool.is_signed(TypeId::BYTE));
        assert!(!pool.is_signed(TypeId::TIME));
    }

    #[test]
    fn intern_dedupes_structural_types() {
        let pool = TypePool::new();
        let a = pool.intern(TypeData::PackedArray {
            elem: TypeId::LOGIC,
            range: ConstantRange::new(7, 0),
            flags: IntegralFlags::FOUR_STATE,
        });
        let b = pool.intern(TypeData::PackedArray {
            elem: TypeId::LOGIC,
            range: ConstantRange::new(7, 0),
            flags: IntegralFlags::FOUR_STATE,
        });
        assert_eq!(a, b);
        assert_eq!(pool.bit_width(a), 8);
        assert!(a.raw() >= TypeId::FIRST_DYNAMIC);
    }

    #[test]
    fn alias_resolves_to_canonical() {
        let pool = TypePool::new();
        let alias = pool.intern(TypeData::Alias {
            name: Name::from_raw(1),
            target: TypeId::INT,
        });
        let alias2 = pool.intern(TypeData::Alias {
            name: Name::from_raw(2),
            target: alias,
        });
        assert_eq!(pool.canonical(alias2), TypeId::INT);
        assert_eq!(pool.bit_width(alias2), 32);
    }

    #[test]
    fn long_alias_chains_stay_canonical() {
        let pool = TypePool::new();
        let mut ty = TypeId::INT;
        for i in 0..100 {
            ty = pool.intern(TypeData::Alias {
                name: Name::from_raw(100 + i),
                target: ty,
            });
        }
        assert_eq!(pool.canonical(ty), TypeId::INT);
        assert_eq!(pool.bit_width(ty), 32);
    }

    #[test]
    fn default_values_by_stateness() {
        let pool = TypePool::new();
        let logic_default = pool.default_value(TypeId::LOGIC);
        assert!(logic_default.has_unknown());

        let int_default = pool.default_value(TypeId::INT);
        assert_eq!(int_default.to_i64(), Some(0));

        // integer is 4-state: defaults to X.
        assert!(pool.default_value(TypeId::INTEGER).has_unknown());

        assert_eq!(pool.default_value(TypeId::STRING), ConstantValue::Str(String::new()));
        assert_eq!(pool.default_value(TypeId::REAL), ConstantValue::Real(0.0));
    }

    #[test]
    fn fixed_array_default_replicates_element() {
        let pool = TypePool::new();
        let arr = pool.intern(TypeData::FixedArray {
            elem: TypeId::INT,
            range: ConstantRange::new(0, 2),
        });
        let ConstantValue::Aggregate(elems) = pool.default_value(arr) else {
            panic!("expected aggregate default");
        };
        assert_eq!(elems.len(), 3);
        assert_eq!(elems[0].to_i64(), Some(0));
    }

    #[test]
    fn class_hierarchy_queries() {
        let pool = TypePool::new();
        let iface = pool.intern(TypeData::Class {
            decl: 100,
            name: Name::from_raw(10),
            base: None,
            is_interface: true,
            implements: Box::new([]),
        });
        let base = pool.intern(TypeData::Class {
            decl: 101,
            name: Name::from_raw(11),
            base: None,
            is_interface: false,
            implements: Box::new([iface]),
        });
        let derived = pool.intern(TypeData::Class {
            decl: 102,
            name: Name::from_raw(12),
            base: Some(base),
            is_interface: false,
            implements: Box::new([]),
        });

        assert!(pool.is_derived_from(derived, base));
        assert!(!pool.is_derived_from(base, derived));
        assert!(pool.implements_iface(derived, iface));
        assert_eq!(pool.common_base(derived, base), Some(base));
    }

    #[test]
    fn bitstream_widths() {
        let pool = TypePool::new();
        let arr = pool.intern(TypeData::FixedArray {
            elem: TypeId::BYTE,
            range: ConstantRange::new(3, 0),
        });
        assert_eq!(pool.bitstream_width(arr), 32);

        let dynamic = pool.intern(TypeData::DynamicArray { elem: TypeId::BYTE });
        assert_eq!(pool.bitstream_width(dynamic), 0);
    }
}
