//! The register-type lattice.
//!
//! A register type is a [`Kind`] plus a small per-kind payload. The closed
//! kind set is densely packed so that assignability and merge decisions
//! between two kinds are plain lookups in tables built at compile time;
//! only reference-level decisions (class joins, unresolved merges) escape
//! to the cache.

use std::borrow::Cow;
use std::fmt;

use dex_types::BitVector;

use crate::reg_type_cache::CacheId;
use crate::resolver::ClassHandle;

/// The kind of value held in a register.
///
/// The discriminants are load-bearing twice over: the fixed cache ids of the
/// type cache coincide with them, and the relative order of the constant
/// kinds within the non-negative group (`Zero..=CharConstant`) and the
/// can-be-negative group (`ByteConstant..=IntegerConstant`) encodes
/// increasing value range, which the merge rules rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
#[repr(u8)]
pub enum Kind {
    /// No value has been written yet.
    Undefined = 0,
    /// Merge bottom; also stands in for `void`.
    Conflict,
    /// `Z`
    Boolean,
    /// `B`
    Byte,
    /// `C`
    Char,
    /// `S`
    Short,
    /// `I`
    Integer,
    /// Low half of a `J` pair.
    LongLo,
    /// High half of a `J` pair.
    LongHi,
    /// `F`
    Float,
    /// Low half of a `D` pair.
    DoubleLo,
    /// High half of a `D` pair.
    DoubleHi,
    /// Constant 0, or merged constants 0. Can be interpreted as `null`.
    Zero,
    /// Constant 1, or merged constants 0..=1.
    BooleanConstant,
    /// Constants 2..=0x7f, or merged constants 0..=0x7f.
    PositiveByteConstant,
    /// Constants 0x80..=0x7fff, or merged constants 0..=0x7fff.
    PositiveShortConstant,
    /// Constants 0x8000..=0xffff, or merged constants 0..=0xffff.
    CharConstant,
    /// Constants -0x80..=-1, or merged constants -0x80..=0x7f.
    ByteConstant,
    /// Constants -0x8000..=-0x81, or merged constants -0x8000..=0x7fff.
    ShortConstant,
    /// Any other 32-bit constant.
    IntegerConstant,
    /// Low half of a wide constant; long or double.
    ConstantLo,
    /// High half of a wide constant.
    ConstantHi,
    /// The null reference.
    Null,
    /// `java.lang.Object`, special-cased for compile-time decisions.
    JavaLangObject,
    /// A reference whose class did not resolve.
    UnresolvedReference,
    /// Fresh allocation, constructor not yet called.
    UninitializedReference,
    /// The `this` argument of a constructor before the superclass call.
    UninitializedThisReference,
    /// Fresh allocation of an unresolved class.
    UnresolvedUninitializedReference,
    /// Constructor `this` of an unresolved class.
    UnresolvedUninitializedThisReference,
    /// Join of a resolved part with a set of unresolved references.
    UnresolvedMergedReference,
    /// A reference to a resolved class.
    Reference,
}

impl Kind {
    /// Number of kinds.
    pub const COUNT: usize = 31;

    const fn from_u8(value: u8) -> Kind {
        match value {
            0 => Kind::Undefined,
            1 => Kind::Conflict,
            2 => Kind::Boolean,
            3 => Kind::Byte,
            4 => Kind::Char,
            5 => Kind::Short,
            6 => Kind::Integer,
            7 => Kind::LongLo,
            8 => Kind::LongHi,
            9 => Kind::Float,
            10 => Kind::DoubleLo,
            11 => Kind::DoubleHi,
            12 => Kind::Zero,
            13 => Kind::BooleanConstant,
            14 => Kind::PositiveByteConstant,
            15 => Kind::PositiveShortConstant,
            16 => Kind::CharConstant,
            17 => Kind::ByteConstant,
            18 => Kind::ShortConstant,
            19 => Kind::IntegerConstant,
            20 => Kind::ConstantLo,
            21 => Kind::ConstantHi,
            22 => Kind::Null,
            23 => Kind::JavaLangObject,
            24 => Kind::UnresolvedReference,
            25 => Kind::UninitializedReference,
            26 => Kind::UninitializedThisReference,
            27 => Kind::UnresolvedUninitializedReference,
            28 => Kind::UnresolvedUninitializedThisReference,
            29 => Kind::UnresolvedMergedReference,
            30 => Kind::Reference,
            _ => panic!("invalid kind value"),
        }
    }

    /// Whether this kind is the low half of a wide pair.
    pub const fn is_low_half(self) -> bool {
        matches!(self, Kind::LongLo | Kind::DoubleLo | Kind::ConstantLo)
    }

    /// Whether this kind is the high half of a wide pair.
    pub const fn is_high_half(self) -> bool {
        matches!(self, Kind::LongHi | Kind::DoubleHi | Kind::ConstantHi)
    }

    /// The high-half kind matching a low-half kind.
    pub const fn to_high_half(self) -> Kind {
        debug_assert!(self.is_low_half());
        Kind::from_u8(self as u8 + 1)
    }

    /// Whether `low`/`high` form a matching wide pair.
    pub const fn check_wide_pair(low: Kind, high: Kind) -> bool {
        low.is_low_half() && high as u8 == low as u8 + 1
    }

    /// Narrow (category-1) constant kinds.
    pub const fn is_constant(self) -> bool {
        self as u8 >= Kind::Zero as u8 && self as u8 <= Kind::IntegerConstant as u8
    }

    /// All constant kinds, including wide halves and `null`.
    pub const fn is_constant_types(self) -> bool {
        self.is_constant() || matches!(self, Kind::ConstantLo | Kind::ConstantHi | Kind::Null)
    }

    /// Kinds usable where a boolean is required.
    pub const fn is_boolean_types(self) -> bool {
        matches!(self, Kind::Boolean | Kind::Zero | Kind::BooleanConstant)
    }

    /// Kinds usable where a byte is required.
    pub const fn is_byte_types(self) -> bool {
        matches!(
            self,
            Kind::Byte | Kind::PositiveByteConstant | Kind::ByteConstant
        ) || self.is_boolean_types()
    }

    /// Kinds usable where a short is required.
    pub const fn is_short_types(self) -> bool {
        matches!(
            self,
            Kind::Short | Kind::PositiveShortConstant | Kind::ShortConstant
        ) || self.is_byte_types()
    }

    /// Kinds usable where a char is required.
    pub const fn is_char_types(self) -> bool {
        matches!(
            self,
            Kind::Char | Kind::CharConstant | Kind::PositiveShortConstant | Kind::PositiveByteConstant
        ) || self.is_boolean_types()
    }

    /// Kinds usable where an int is required.
    pub const fn is_integral_types(self) -> bool {
        matches!(
            self,
            Kind::Integer | Kind::IntegerConstant | Kind::Char | Kind::CharConstant
        ) || self.is_short_types()
    }

    /// Kinds usable where a float is required.
    pub const fn is_float_types(self) -> bool {
        matches!(self, Kind::Float) || self.is_constant()
    }

    /// Kinds usable as the low half of a long.
    pub const fn is_long_types(self) -> bool {
        matches!(self, Kind::LongLo | Kind::ConstantLo)
    }

    /// Kinds usable as the high half of a long.
    pub const fn is_long_high_types(self) -> bool {
        matches!(self, Kind::LongHi | Kind::ConstantHi)
    }

    /// Kinds usable as the low half of a double.
    pub const fn is_double_types(self) -> bool {
        matches!(self, Kind::DoubleLo | Kind::ConstantLo)
    }

    /// Kinds usable as the high half of a double.
    pub const fn is_double_high_types(self) -> bool {
        matches!(self, Kind::DoubleHi | Kind::ConstantHi)
    }

    /// Kinds that occupy a single register.
    pub const fn is_category1_types(self) -> bool {
        self.is_integral_types() || matches!(self, Kind::Float)
    }

    /// Kinds that start a two-register pair. High halves are not expected
    /// to be queried.
    pub const fn is_category2_types(self) -> bool {
        self.is_low_half()
    }

    /// References produced by `new-instance` before the constructor ran.
    pub const fn is_uninitialized_types(self) -> bool {
        matches!(
            self,
            Kind::UninitializedReference
                | Kind::UninitializedThisReference
                | Kind::UnresolvedUninitializedReference
                | Kind::UnresolvedUninitializedThisReference
        )
    }

    /// Kinds carrying at least one unresolved class.
    pub const fn is_unresolved_types(self) -> bool {
        matches!(
            self,
            Kind::UnresolvedReference
                | Kind::UnresolvedMergedReference
                | Kind::UnresolvedUninitializedReference
                | Kind::UnresolvedUninitializedThisReference
        )
    }

    /// Reference kinds other than the zero/null constants.
    pub const fn is_non_zero_reference_types(self) -> bool {
        matches!(
            self,
            Kind::JavaLangObject | Kind::Reference | Kind::UnresolvedReference | Kind::UnresolvedMergedReference
        ) || self.is_uninitialized_types()
    }

    /// All reference kinds, including the zero/null constants.
    pub const fn is_reference_types(self) -> bool {
        self.is_non_zero_reference_types() || matches!(self, Kind::Zero | Kind::Null)
    }

    /// The zero/null constants.
    pub const fn is_zero_or_null(self) -> bool {
        matches!(self, Kind::Zero | Kind::Null)
    }

    /// Kinds acceptable as an array index.
    pub const fn is_array_index_types(self) -> bool {
        self.is_integral_types()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Outcome of a kind-level assignability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignability {
    /// The assignment is valid.
    Assignable,
    /// The assignment is invalid.
    NotAssignable,
    /// The assignment narrows an integral value.
    NarrowingConversion,
    /// Both sides are references; the caller must consult the classes.
    Reference,
    /// The query is meaningless for these kinds; callers must not reach it.
    Invalid,
}

const fn assignability_impl(lhs: Kind, rhs: Kind) -> Assignability {
    let narrowing_or_not = if rhs.is_integral_types() {
        Assignability::NarrowingConversion
    } else {
        Assignability::NotAssignable
    };
    match lhs {
        Kind::Boolean => {
            if rhs.is_boolean_types() {
                Assignability::Assignable
            } else {
                narrowing_or_not
            }
        }
        Kind::Byte => {
            if rhs.is_byte_types() {
                Assignability::Assignable
            } else {
                narrowing_or_not
            }
        }
        Kind::Short => {
            if rhs.is_short_types() {
                Assignability::Assignable
            } else {
                narrowing_or_not
            }
        }
        Kind::Char => {
            if rhs.is_char_types() {
                Assignability::Assignable
            } else {
                narrowing_or_not
            }
        }
        Kind::Integer => {
            if rhs.is_integral_types() {
                Assignability::Assignable
            } else {
                Assignability::NotAssignable
            }
        }
        Kind::Float => {
            if rhs.is_float_types() {
                Assignability::Assignable
            } else {
                Assignability::NotAssignable
            }
        }
        Kind::LongLo => {
            if rhs.is_long_types() {
                Assignability::Assignable
            } else {
                Assignability::NotAssignable
            }
        }
        Kind::DoubleLo => {
            if rhs.is_double_types() {
                Assignability::Assignable
            } else {
                Assignability::NotAssignable
            }
        }
        // A `void` destination is not a real assignment target.
        Kind::Conflict => Assignability::Invalid,
        _ => {
            if lhs.is_uninitialized_types() || matches!(lhs, Kind::UnresolvedMergedReference) {
                // Not valid destinations.
                Assignability::Invalid
            } else if lhs.is_non_zero_reference_types() {
                if rhs.is_zero_or_null() {
                    // All reference types can be assigned null.
                    Assignability::Assignable
                } else if !rhs.is_non_zero_reference_types() {
                    Assignability::NotAssignable
                } else if rhs.is_uninitialized_types() {
                    // Uninitialized references can be copied but not assigned.
                    Assignability::NotAssignable
                } else if matches!(lhs, Kind::JavaLangObject) {
                    Assignability::Assignable
                } else {
                    // The caller resolves this with class-level reflection.
                    Assignability::Reference
                }
            } else {
                debug_assert!(
                    matches!(lhs, Kind::Undefined)
                        || lhs.is_high_half()
                        || lhs.is_constant_types()
                );
                Assignability::Invalid
            }
        }
    }
}

const ASSIGNABILITY_TABLE: [[Assignability; Kind::COUNT]; Kind::COUNT] = {
    let mut table = [[Assignability::Invalid; Kind::COUNT]; Kind::COUNT];
    let mut lhs = 0usize;
    while lhs < Kind::COUNT {
        let mut rhs = 0usize;
        while rhs < Kind::COUNT {
            table[lhs][rhs] = assignability_impl(Kind::from_u8(lhs as u8), Kind::from_u8(rhs as u8));
            rhs += 1;
        }
        lhs += 1;
    }
    table
};

impl Kind {
    /// Kind-level assignability of `rhs` into `lhs`. `lhs == rhs` is the
    /// caller's shortcut and is not special-cased here.
    pub const fn assignability_from(lhs: Kind, rhs: Kind) -> Assignability {
        ASSIGNABILITY_TABLE[lhs as usize][rhs as usize]
    }
}

const fn is_non_negative_constant(kind: Kind) -> bool {
    kind as u8 >= Kind::Zero as u8 && kind as u8 <= Kind::CharConstant as u8
}

const fn merge_kind_impl(lhs: Kind, rhs: Kind) -> Kind {
    if matches!(lhs, Kind::Undefined) || matches!(rhs, Kind::Undefined) {
        // Conflicts may be copied around, undefined values may not, so any
        // merge with undefined stays undefined.
        Kind::Undefined
    } else if matches!(lhs, Kind::Conflict) || matches!(rhs, Kind::Conflict) {
        Kind::Conflict
    } else if lhs.is_constant() && rhs.is_constant() {
        let lhs_non_negative = is_non_negative_constant(lhs);
        if lhs_non_negative == is_non_negative_constant(rhs) {
            // Within a group, the higher kind covers the wider range.
            if lhs as u8 >= rhs as u8 {
                lhs
            } else {
                rhs
            }
        } else {
            let non_negative = if lhs_non_negative { lhs } else { rhs };
            let can_be_negative = if lhs_non_negative { rhs } else { lhs };
            if matches!(can_be_negative, Kind::ByteConstant)
                && non_negative as u8 <= Kind::PositiveByteConstant as u8
            {
                Kind::ByteConstant
            } else if can_be_negative as u8 <= Kind::ShortConstant as u8
                && non_negative as u8 <= Kind::PositiveShortConstant as u8
            {
                Kind::ShortConstant
            } else {
                Kind::IntegerConstant
            }
        }
    } else if (matches!(lhs, Kind::ConstantLo) && matches!(rhs, Kind::ConstantLo))
        || (matches!(lhs, Kind::ConstantHi) && matches!(rhs, Kind::ConstantHi))
    {
        lhs
    } else if lhs.is_integral_types() && rhs.is_integral_types() {
        if lhs.is_boolean_types() && rhs.is_boolean_types() {
            Kind::Boolean
        } else if lhs.is_byte_types() && rhs.is_byte_types() {
            Kind::Byte
        } else if lhs.is_short_types() && rhs.is_short_types() {
            Kind::Short
        } else if lhs.is_char_types() && rhs.is_char_types() {
            Kind::Char
        } else {
            Kind::Integer
        }
    } else if (lhs.is_float_types() && rhs.is_float_types())
        || (lhs.is_long_types() && rhs.is_long_types())
        || (lhs.is_long_high_types() && rhs.is_long_high_types())
        || (lhs.is_double_types() && rhs.is_double_types())
        || (lhs.is_double_high_types() && rhs.is_double_high_types())
    {
        // The constant-vs-constant case was handled above, so at most one
        // side is a constant and the primitive kind wins.
        if lhs.is_constant_types() {
            rhs
        } else {
            lhs
        }
    } else if lhs.is_reference_types() && rhs.is_reference_types() {
        if lhs.is_uninitialized_types() || rhs.is_uninitialized_types() {
            // Uninitialized types may only merge with themselves, and the
            // trivial self-merge is the caller's shortcut.
            Kind::Conflict
        } else if matches!(lhs, Kind::JavaLangObject) || matches!(rhs, Kind::JavaLangObject) {
            Kind::JavaLangObject
        } else {
            // Marker telling the caller to do reference-level merging; the
            // final kind is not necessarily a merged reference.
            Kind::UnresolvedMergedReference
        }
    } else {
        Kind::Conflict
    }
}

const MERGE_TABLE: [[Kind; Kind::COUNT]; Kind::COUNT] = {
    let mut table = [[Kind::Conflict; Kind::COUNT]; Kind::COUNT];
    let mut lhs = 0usize;
    while lhs < Kind::COUNT {
        let mut rhs = 0usize;
        while rhs < Kind::COUNT {
            table[lhs][rhs] = merge_kind_impl(Kind::from_u8(lhs as u8), Kind::from_u8(rhs as u8));
            rhs += 1;
        }
        lhs += 1;
    }
    table
};

impl Kind {
    /// Kind-level merge of two register kinds. A result of
    /// [`Kind::UnresolvedMergedReference`] instructs the caller to perform
    /// reference-level merging.
    pub const fn merge(lhs: Kind, rhs: Kind) -> Kind {
        MERGE_TABLE[lhs as usize][rhs as usize]
    }
}

/// Per-kind payload of a register type.
#[derive(Debug)]
pub(crate) enum Payload<C> {
    /// No payload.
    None,
    /// Resolved reference: the class, plus the lazily created uninitialized
    /// twin used by `new-instance`.
    Reference {
        class: C,
        uninitialized: Option<CacheId>,
    },
    /// `java.lang.Object` with its pre-built uninitialized twin.
    JavaLangObject { uninitialized: CacheId },
    /// Unresolved reference with its lazily created uninitialized twin.
    Unresolved { uninitialized: Option<CacheId> },
    /// Any uninitialized kind: the initialized counterpart.
    Uninitialized { initialized: CacheId },
    /// Merged reference: resolved part plus unresolved member ids.
    Merged {
        resolved: CacheId,
        unresolved: BitVector,
    },
}

/// A register type: kind, descriptor, cache id and payload.
///
/// Types are owned by exactly one [`RegTypeCache`](crate::reg_type_cache::RegTypeCache)
/// and referred to by their 16-bit cache id everywhere else.
#[derive(Debug)]
pub struct RegType<C> {
    pub(crate) kind: Kind,
    pub(crate) descriptor: Cow<'static, str>,
    pub(crate) cache_id: CacheId,
    pub(crate) payload: Payload<C>,
}

impl<C: ClassHandle> RegType<C> {
    /// The kind of this type.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The cache id of this type.
    pub fn id(&self) -> CacheId {
        self.cache_id
    }

    /// The descriptor; empty for primitives, constants, merged references
    /// and the fundamental kinds.
    pub fn descriptor(&self) -> &str {
        debug_assert!(
            matches!(self.kind, Kind::JavaLangObject | Kind::Reference)
                || self.kind.is_uninitialized_types()
                || (self.kind.is_unresolved_types()
                    && !matches!(self.kind, Kind::UnresolvedMergedReference)),
            "descriptor query on {:?}",
            self.kind
        );
        &self.descriptor
    }

    /// Whether two types are the same cache entry.
    pub fn equals(&self, other: &RegType<C>) -> bool {
        self.cache_id == other.cache_id
    }

    /// Whether this type carries a class handle.
    pub fn has_class(&self) -> bool {
        matches!(self.payload, Payload::Reference { .. })
    }

    /// The class of a resolved reference.
    pub fn class(&self) -> C {
        match &self.payload {
            Payload::Reference { class, .. } => *class,
            _ => panic!("class query on {:?}", self.kind),
        }
    }

    /// The initialized counterpart of an uninitialized type.
    pub fn initialized_id(&self) -> CacheId {
        match &self.payload {
            Payload::Uninitialized { initialized } => *initialized,
            _ => panic!("initialized-counterpart query on {:?}", self.kind),
        }
    }

    /// The resolved part of a merged reference.
    pub fn resolved_part_id(&self) -> CacheId {
        match &self.payload {
            Payload::Merged { resolved, .. } => *resolved,
            _ => panic!("resolved-part query on {:?}", self.kind),
        }
    }

    /// The unresolved member ids of a merged reference.
    pub fn unresolved_types(&self) -> &BitVector {
        match &self.payload {
            Payload::Merged { unresolved, .. } => unresolved,
            _ => panic!("unresolved-members query on {:?}", self.kind),
        }
    }

    /// The primitive category of a non-reference type, used for array
    /// element width checks.
    pub fn primitive_type(&self) -> crate::resolver::PrimitiveType {
        use crate::resolver::PrimitiveType;
        let kind = self.kind;
        debug_assert!(!kind.is_non_zero_reference_types());
        if kind.is_boolean_types() {
            PrimitiveType::Boolean
        } else if kind.is_byte_types() {
            PrimitiveType::Byte
        } else if kind.is_short_types() {
            PrimitiveType::Short
        } else if kind.is_char_types() {
            PrimitiveType::Char
        } else if matches!(kind, Kind::Float) {
            PrimitiveType::Float
        } else if kind.is_integral_types() {
            PrimitiveType::Int
        } else if matches!(kind, Kind::DoubleLo) {
            PrimitiveType::Double
        } else {
            debug_assert!(kind.is_long_types());
            PrimitiveType::Long
        }
    }
}

impl<C: ClassHandle> fmt::Display for RegType<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            Kind::Undefined => return write!(f, "Undefined"),
            Kind::Conflict => return write!(f, "Conflict"),
            Kind::Boolean => return write!(f, "Boolean"),
            Kind::Byte => return write!(f, "Byte"),
            Kind::Short => return write!(f, "Short"),
            Kind::Char => return write!(f, "Char"),
            Kind::Integer => return write!(f, "Integer"),
            Kind::LongLo => return write!(f, "Long (Low Half)"),
            Kind::LongHi => return write!(f, "Long (High Half)"),
            Kind::Float => return write!(f, "Float"),
            Kind::DoubleLo => return write!(f, "Double (Low Half)"),
            Kind::DoubleHi => return write!(f, "Double (High Half)"),
            Kind::Zero => return write!(f, "Zero/null"),
            Kind::BooleanConstant => return write!(f, "BooleanConstant"),
            Kind::PositiveByteConstant => return write!(f, "PositiveByteConstant"),
            Kind::PositiveShortConstant => return write!(f, "PositiveShortConstant"),
            Kind::CharConstant => return write!(f, "CharConstant"),
            Kind::ByteConstant => return write!(f, "ByteConstant"),
            Kind::ShortConstant => return write!(f, "ShortConstant"),
            Kind::IntegerConstant => return write!(f, "IntegerConstant"),
            Kind::ConstantLo => return write!(f, "Low-half Constant"),
            Kind::ConstantHi => return write!(f, "High-half Constant"),
            Kind::Null => return write!(f, "null"),
            Kind::JavaLangObject => return write!(f, "Reference java.lang.Object"),
            Kind::UnresolvedMergedReference => return write!(f, "UnresolvedMergedReferences"),
            Kind::UnresolvedReference => "Unresolved Reference: ",
            Kind::UninitializedReference => "Uninitialized Reference: ",
            Kind::UninitializedThisReference => "Uninitialized This Reference: ",
            Kind::UnresolvedUninitializedReference => "Unresolved And Uninitialized Reference: ",
            Kind::UnresolvedUninitializedThisReference => {
                "Unresolved And Uninitialized This Reference: "
            }
            Kind::Reference => "Reference: ",
        };
        write!(f, "{tag}{}", self.descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn kind_discriminants_are_dense() {
        for (index, kind) in Kind::iter().enumerate() {
            assert_eq!(kind as usize, index);
        }
        assert_eq!(Kind::iter().count(), Kind::COUNT);
    }

    #[test]
    fn wide_pairs_are_adjacent() {
        assert_eq!(Kind::LongLo.to_high_half(), Kind::LongHi);
        assert_eq!(Kind::DoubleLo.to_high_half(), Kind::DoubleHi);
        assert_eq!(Kind::ConstantLo.to_high_half(), Kind::ConstantHi);
        assert!(Kind::check_wide_pair(Kind::LongLo, Kind::LongHi));
        assert!(!Kind::check_wide_pair(Kind::LongLo, Kind::DoubleHi));
        assert!(!Kind::check_wide_pair(Kind::LongHi, Kind::LongLo));
    }

    #[test]
    fn assignability_is_reflexive_where_defined() {
        for kind in Kind::iter() {
            let result = Kind::assignability_from(kind, kind);
            if matches!(kind, Kind::Undefined | Kind::Conflict)
                || kind.is_high_half()
                || kind.is_constant_types()
                || kind.is_uninitialized_types()
                || matches!(kind, Kind::UnresolvedMergedReference)
            {
                assert_eq!(result, Assignability::Invalid, "{kind:?}");
            } else {
                assert!(
                    matches!(result, Assignability::Assignable | Assignability::Reference),
                    "{kind:?} -> {result:?}"
                );
            }
        }
    }

    #[test]
    fn merge_is_commutative() {
        for lhs in Kind::iter() {
            for rhs in Kind::iter() {
                assert_eq!(Kind::merge(lhs, rhs), Kind::merge(rhs, lhs), "{lhs:?} {rhs:?}");
            }
        }
    }

    #[test]
    fn merge_absorbs_bottom_kinds() {
        for kind in Kind::iter() {
            assert_eq!(Kind::merge(kind, Kind::Undefined), Kind::Undefined);
            if !matches!(kind, Kind::Undefined) {
                assert_eq!(Kind::merge(kind, Kind::Conflict), Kind::Conflict);
            }
        }
    }

    #[test]
    fn constant_merges_use_range_order() {
        // Same-group merges pick the higher-range kind.
        assert_eq!(
            Kind::merge(Kind::Zero, Kind::CharConstant),
            Kind::CharConstant
        );
        assert_eq!(
            Kind::merge(Kind::ByteConstant, Kind::IntegerConstant),
            Kind::IntegerConstant
        );
        // Cross-group merges widen to cover the sign.
        assert_eq!(
            Kind::merge(Kind::ByteConstant, Kind::PositiveByteConstant),
            Kind::ByteConstant
        );
        assert_eq!(
            Kind::merge(Kind::ByteConstant, Kind::PositiveShortConstant),
            Kind::ShortConstant
        );
        assert_eq!(
            Kind::merge(Kind::ShortConstant, Kind::CharConstant),
            Kind::IntegerConstant
        );
    }

    #[test]
    fn integral_merges_pick_narrowest_family() {
        assert_eq!(Kind::merge(Kind::Boolean, Kind::BooleanConstant), Kind::Boolean);
        assert_eq!(Kind::merge(Kind::Boolean, Kind::Byte), Kind::Byte);
        assert_eq!(Kind::merge(Kind::Byte, Kind::Short), Kind::Short);
        assert_eq!(Kind::merge(Kind::Byte, Kind::Char), Kind::Integer);
        assert_eq!(Kind::merge(Kind::Char, Kind::CharConstant), Kind::Char);
        assert_eq!(Kind::merge(Kind::Integer, Kind::Boolean), Kind::Integer);
    }

    #[test]
    fn wide_and_float_merges_prefer_the_primitive() {
        assert_eq!(Kind::merge(Kind::Float, Kind::Zero), Kind::Float);
        assert_eq!(Kind::merge(Kind::LongLo, Kind::ConstantLo), Kind::LongLo);
        assert_eq!(Kind::merge(Kind::DoubleHi, Kind::ConstantHi), Kind::DoubleHi);
        assert_eq!(Kind::merge(Kind::ConstantLo, Kind::ConstantLo), Kind::ConstantLo);
        // A long and a double never merge.
        assert_eq!(Kind::merge(Kind::LongLo, Kind::DoubleLo), Kind::Conflict);
    }

    #[test]
    fn reference_merges() {
        assert_eq!(
            Kind::merge(Kind::Reference, Kind::JavaLangObject),
            Kind::JavaLangObject
        );
        assert_eq!(
            Kind::merge(Kind::Reference, Kind::UninitializedReference),
            Kind::Conflict
        );
        assert_eq!(
            Kind::merge(Kind::Reference, Kind::Zero),
            Kind::UnresolvedMergedReference
        );
        assert_eq!(
            Kind::merge(Kind::UnresolvedReference, Kind::Reference),
            Kind::UnresolvedMergedReference
        );
        // A reference and a primitive conflict.
        assert_eq!(Kind::merge(Kind::Reference, Kind::Integer), Kind::Conflict);
    }

    #[test]
    fn assignability_transitivity_on_kinds() {
        for a in Kind::iter() {
            for b in Kind::iter() {
                for c in Kind::iter() {
                    if Kind::assignability_from(a, b) == Assignability::Assignable
                        && Kind::assignability_from(b, c) == Assignability::Assignable
                    {
                        let ac = Kind::assignability_from(a, c);
                        assert!(
                            matches!(ac, Assignability::Assignable | Assignability::Reference),
                            "{a:?} <- {b:?} <- {c:?} gave {ac:?}"
                        );
                    }
                }
            }
        }
    }
}
