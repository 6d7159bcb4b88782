//! The per-method register-type cache.
//!
//! Every type the verifier touches while checking one method is interned
//! here and addressed by a 16-bit [`CacheId`]. The fixed kinds (fundamental,
//! primitive, constant, `java.lang.Object` and its uninitialized twin) are
//! pre-allocated so that their ids coincide with the kind discriminants;
//! everything else is created on demand. The cache never shrinks, so ids
//! stay valid for the whole verification.

use std::borrow::Cow;

use dex_types::{BitVector, TypeIndex};
use tracing::debug;

use crate::reg_type::{Kind, Payload, RegType};
use crate::resolver::{is_valid_descriptor, ClassHandle, ClassResolver, PrimitiveType};

/// Index of a type in its owning cache.
pub type CacheId = u16;

/// Number of ids that map one-to-one onto kinds (undefined through
/// `java.lang.Object`).
pub const NUM_REG_KIND_CACHE_IDS: CacheId = Kind::JavaLangObject as CacheId + 1;

/// Fixed id of the pre-built uninitialized `java.lang.Object` type.
pub const UNINITIALIZED_JAVA_LANG_OBJECT_ID: CacheId = NUM_REG_KIND_CACHE_IDS;

/// Number of pre-allocated cache entries.
pub const NUM_FIXED_CACHE_IDS: CacheId = UNINITIALIZED_JAVA_LANG_OBJECT_ID + 1;

/// Slot value in the type-index lookup table meaning "not yet computed".
/// Shares the undefined id, which no type index can map to.
const NO_ID_FOR_TYPE_INDEX: CacheId = Kind::Undefined as CacheId;

/// The id of the pre-allocated entry for a fixed kind.
///
/// Valid for all kinds up to and including `JavaLangObject`; the dynamic
/// reference kinds have no fixed entry.
pub const fn id_for_kind(kind: Kind) -> CacheId {
    debug_assert!((kind as u8 as u16) < NUM_REG_KIND_CACHE_IDS);
    kind as u8 as CacheId
}

/// The kind of a fixed cache id below [`NUM_REG_KIND_CACHE_IDS`].
pub const fn kind_for_id(id: CacheId) -> Kind {
    debug_assert!(id < NUM_REG_KIND_CACHE_IDS);
    // Fixed ids coincide with kind discriminants.
    match id {
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
        _ => Kind::JavaLangObject,
    }
}

/// Per-method interner for register types.
pub struct RegTypeCache<'a, R: ClassResolver> {
    resolver: &'a R,
    entries: Vec<RegType<R::Class>>,
    /// Fast reverse lookup from resolved class to cache entry.
    klass_entries: Vec<(R::Class, CacheId)>,
    /// Cached id per dex type index; zero means "not yet computed".
    ids_for_type_index: Vec<CacheId>,
    /// Last uninitialized-this pair, keyed by the initialized id.
    last_uninitialized_this: Option<(CacheId, CacheId)>,
}

impl<'a, R: ClassResolver> RegTypeCache<'a, R> {
    /// Create a cache for one method, pre-filling the fixed entries.
    pub fn new(resolver: &'a R) -> Self {
        let mut cache = Self {
            resolver,
            entries: Vec::with_capacity(NUM_FIXED_CACHE_IDS as usize + 32),
            klass_entries: Vec::with_capacity(32),
            ids_for_type_index: vec![NO_ID_FOR_TYPE_INDEX; resolver.num_type_ids()],
            last_uninitialized_this: None,
        };
        cache.fill_fixed_entries();
        cache
    }

    fn fill_fixed_entries(&mut self) {
        let fixed = |kind: Kind, descriptor: &'static str, payload: Payload<R::Class>| RegType {
            kind,
            descriptor: Cow::Borrowed(descriptor),
            cache_id: id_for_kind(kind),
            payload,
        };
        for id in 0..NUM_REG_KIND_CACHE_IDS {
            let kind = kind_for_id(id);
            let entry = match kind {
                Kind::Boolean => fixed(kind, "Z", Payload::None),
                Kind::Byte => fixed(kind, "B", Payload::None),
                Kind::Char => fixed(kind, "C", Payload::None),
                Kind::Short => fixed(kind, "S", Payload::None),
                Kind::Integer => fixed(kind, "I", Payload::None),
                Kind::LongLo | Kind::LongHi => fixed(kind, "J", Payload::None),
                Kind::Float => fixed(kind, "F", Payload::None),
                Kind::DoubleLo | Kind::DoubleHi => fixed(kind, "D", Payload::None),
                Kind::JavaLangObject => fixed(
                    kind,
                    "Ljava/lang/Object;",
                    Payload::JavaLangObject {
                        uninitialized: UNINITIALIZED_JAVA_LANG_OBJECT_ID,
                    },
                ),
                _ => fixed(kind, "", Payload::None),
            };
            self.entries.push(entry);
        }
        self.entries.push(RegType {
            kind: Kind::UninitializedReference,
            descriptor: Cow::Borrowed("Ljava/lang/Object;"),
            cache_id: UNINITIALIZED_JAVA_LANG_OBJECT_ID,
            payload: Payload::Uninitialized {
                initialized: id_for_kind(Kind::JavaLangObject),
            },
        });
    }

    /// The resolver this cache resolves through.
    pub fn resolver(&self) -> &'a R {
        self.resolver
    }

    /// Number of interned entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The cache is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Look up a type by id. Accepts any id this cache produced.
    pub fn get(&self, id: CacheId) -> &RegType<R::Class> {
        &self.entries[id as usize]
    }

    /// The kind of the type with the given id.
    pub fn kind_of(&self, id: CacheId) -> Kind {
        self.get(id).kind()
    }

    fn add_entry(&mut self, kind: Kind, descriptor: Cow<'static, str>, payload: Payload<R::Class>) -> CacheId {
        let id = self.entries.len() as CacheId;
        if let Payload::Reference { class, .. } = &payload {
            self.klass_entries.push((*class, id));
        }
        self.entries.push(RegType {
            kind,
            descriptor,
            cache_id: id,
            payload,
        });
        id
    }

    /// The type for a dex type index, computing and caching it on first use.
    pub fn from_type_index(&mut self, type_index: TypeIndex) -> CacheId {
        let cached = self.ids_for_type_index[type_index.to_usize()];
        if cached != NO_ID_FOR_TYPE_INDEX {
            return cached;
        }
        let descriptor = self.resolver.type_descriptor(type_index).to_owned();
        let id = self.from_descriptor(&descriptor);
        debug_assert_ne!(id, NO_ID_FOR_TYPE_INDEX);
        self.ids_for_type_index[type_index.to_usize()] = id;
        id
    }

    /// The type for a descriptor. One-character descriptors map to the
    /// primitives (`V` maps to conflict); class and array descriptors are
    /// interned, resolving the class when possible.
    pub fn from_descriptor(&mut self, descriptor: &str) -> CacheId {
        let bytes = descriptor.as_bytes();
        if bytes.len() == 1 {
            match bytes[0] {
                b'Z' => id_for_kind(Kind::Boolean),
                b'B' => id_for_kind(Kind::Byte),
                b'S' => id_for_kind(Kind::Short),
                b'C' => id_for_kind(Kind::Char),
                b'I' => id_for_kind(Kind::Integer),
                b'J' => id_for_kind(Kind::LongLo),
                b'F' => id_for_kind(Kind::Float),
                b'D' => id_for_kind(Kind::DoubleLo),
                // `V` and anything malformed.
                _ => id_for_kind(Kind::Conflict),
            }
        } else if matches!(bytes.first(), Some(b'L' | b'[')) {
            self.from_object_descriptor(descriptor)
        } else {
            id_for_kind(Kind::Conflict)
        }
    }

    fn from_object_descriptor(&mut self, descriptor: &str) -> CacheId {
        if descriptor == "Ljava/lang/Object;" {
            return id_for_kind(Kind::JavaLangObject);
        }
        for id in NUM_FIXED_CACHE_IDS as usize..self.entries.len() {
            let entry = &self.entries[id];
            if matches!(entry.kind(), Kind::Reference | Kind::UnresolvedReference)
                && entry.descriptor == descriptor
            {
                return id as CacheId;
            }
        }
        match self.resolver.find_class(descriptor) {
            Some(class) => {
                debug_assert!(!class.is_primitive());
                if class.is_object_class() {
                    id_for_kind(Kind::JavaLangObject)
                } else {
                    self.add_entry(
                        Kind::Reference,
                        Cow::Owned(descriptor.to_owned()),
                        Payload::Reference {
                            class,
                            uninitialized: None,
                        },
                    )
                }
            }
            None => {
                if is_valid_descriptor(descriptor) {
                    self.add_entry(
                        Kind::UnresolvedReference,
                        Cow::Owned(descriptor.to_owned()),
                        Payload::Unresolved { uninitialized: None },
                    )
                } else {
                    // Nothing sensible can be done with a broken descriptor.
                    id_for_kind(Kind::Conflict)
                }
            }
        }
    }

    /// The type for a primitive class.
    pub fn from_primitive_type(&self, primitive: PrimitiveType) -> CacheId {
        match primitive {
            PrimitiveType::Boolean => id_for_kind(Kind::Boolean),
            PrimitiveType::Byte => id_for_kind(Kind::Byte),
            PrimitiveType::Char => id_for_kind(Kind::Char),
            PrimitiveType::Short => id_for_kind(Kind::Short),
            PrimitiveType::Int => id_for_kind(Kind::Integer),
            PrimitiveType::Float => id_for_kind(Kind::Float),
            PrimitiveType::Long => id_for_kind(Kind::LongLo),
            PrimitiveType::Double => id_for_kind(Kind::DoubleLo),
        }
    }

    /// The type for a resolved class handle.
    pub fn from_class(&mut self, class: R::Class) -> CacheId {
        if let Some(primitive) = class.primitive_type() {
            return self.from_primitive_type(primitive);
        }
        if class.is_object_class() {
            return id_for_kind(Kind::JavaLangObject);
        }
        if let Some(&(_, id)) = self.klass_entries.iter().find(|(entry, _)| *entry == class) {
            return id;
        }
        self.add_entry(
            Kind::Reference,
            Cow::Owned(class.descriptor().to_owned()),
            Payload::Reference {
                class,
                uninitialized: None,
            },
        )
    }

    /// An anonymous unresolved reference with an intentionally invalid
    /// descriptor, used only when a class join fails internally.
    pub fn make_unresolved_reference(&mut self) -> CacheId {
        self.add_entry(
            Kind::UnresolvedReference,
            Cow::Borrowed("a"),
            Payload::Unresolved { uninitialized: None },
        )
    }

    /// The uninitialized twin of a resolved or unresolved reference type,
    /// created and linked on first use.
    pub fn uninitialized(&mut self, type_id: CacheId) -> CacheId {
        let create_kind = {
            let entry = self.get(type_id);
            match &entry.payload {
                Payload::JavaLangObject { uninitialized } => return *uninitialized,
                Payload::Reference {
                    uninitialized: Some(id),
                    ..
                } => return *id,
                Payload::Unresolved {
                    uninitialized: Some(id),
                } => return *id,
                Payload::Reference { .. } => Kind::UninitializedReference,
                Payload::Unresolved { .. } => Kind::UnresolvedUninitializedReference,
                _ => panic!("uninitialized twin of {:?}", entry.kind()),
            }
        };
        let descriptor = self.get(type_id).descriptor.clone();
        let uninit_id = self.add_entry(
            create_kind,
            descriptor,
            Payload::Uninitialized {
                initialized: type_id,
            },
        );
        match &mut self.entries[type_id as usize].payload {
            Payload::Reference { uninitialized, .. } => *uninitialized = Some(uninit_id),
            Payload::Unresolved { uninitialized } => *uninitialized = Some(uninit_id),
            _ => unreachable!(),
        }
        uninit_id
    }

    /// The uninitialized-this type for a constructor of `type_id`.
    pub fn uninitialized_this_argument(&mut self, type_id: CacheId) -> CacheId {
        if let Some((initialized, uninit)) = self.last_uninitialized_this {
            if initialized == type_id {
                return uninit;
            }
        }
        let kind = self.kind_of(type_id);
        let uninit_kind = if matches!(kind, Kind::UnresolvedReference) {
            Kind::UnresolvedUninitializedThisReference
        } else {
            debug_assert!(matches!(kind, Kind::JavaLangObject | Kind::Reference));
            Kind::UninitializedThisReference
        };
        let existing = (NUM_FIXED_CACHE_IDS as usize..self.entries.len()).find(|&id| {
            let entry = &self.entries[id];
            entry.kind() == uninit_kind
                && matches!(entry.payload, Payload::Uninitialized { initialized } if initialized == type_id)
        });
        let uninit_id = match existing {
            Some(id) => id as CacheId,
            None => {
                let descriptor = self.get(type_id).descriptor.clone();
                self.add_entry(
                    uninit_kind,
                    descriptor,
                    Payload::Uninitialized {
                        initialized: type_id,
                    },
                )
            }
        };
        self.last_uninitialized_this = Some((type_id, uninit_id));
        uninit_id
    }

    /// The initialized counterpart of an uninitialized type.
    pub fn from_uninitialized(&self, uninit_id: CacheId) -> CacheId {
        let entry = self.get(uninit_id);
        debug_assert!(entry.kind().is_uninitialized_types());
        entry.initialized_id()
    }

    /// Whether the type is an array type.
    pub fn is_array_types(&self, id: CacheId) -> bool {
        let entry = self.get(id);
        match entry.kind() {
            Kind::UnresolvedMergedReference => self.merged_is_array(entry),
            kind if kind.is_unresolved_types() => entry.descriptor.starts_with('['),
            Kind::Reference => entry.class().is_array(),
            _ => false,
        }
    }

    /// Whether the type is an array of references.
    pub fn is_object_array_types(&self, id: CacheId) -> bool {
        let entry = self.get(id);
        match entry.kind() {
            // Primitive arrays always resolve, so this matches the array
            // check for merged types.
            Kind::UnresolvedMergedReference => self.merged_is_array(entry),
            kind if kind.is_unresolved_types() => {
                let bytes = entry.descriptor.as_bytes();
                debug_assert!(bytes[0] != b'[' || matches!(bytes[1], b'L' | b'['));
                bytes[0] == b'['
            }
            Kind::Reference => {
                let class = entry.class();
                class.is_array()
                    && class
                        .component_type()
                        .is_some_and(|component| !component.is_primitive())
            }
            _ => false,
        }
    }

    fn merged_is_array(&self, entry: &RegType<R::Class>) -> bool {
        // For a merge to be an array both the resolved part (when present;
        // a missing part is encoded as zero) and the unresolved members
        // must be object arrays. Mixed merges collapsed at construction, so
        // checking one member is enough.
        let resolved = entry.resolved_part_id();
        if !self.kind_of(resolved).is_zero_or_null() && !self.is_array_types(resolved) {
            return false;
        }
        let member = entry
            .unresolved_types()
            .highest_bit_set()
            .expect("merged type without members");
        self.is_array_types(member as CacheId)
    }

    /// Whether the type is `java.lang.Object[]`.
    pub fn is_java_lang_object_array(&self, id: CacheId) -> bool {
        let entry = self.get(id);
        entry.has_class() && entry.class().is_array()
            && entry
                .class()
                .component_type()
                .is_some_and(|component| component.is_object_class())
    }

    /// Whether `new-instance` may instantiate the type.
    pub fn is_instantiable_types(&self, id: CacheId) -> bool {
        let kind = self.kind_of(id);
        debug_assert!(
            matches!(kind, Kind::JavaLangObject | Kind::Reference | Kind::UnresolvedReference),
            "instantiability of {kind:?}"
        );
        !matches!(kind, Kind::Reference) || self.get(id).class().is_instantiable()
    }

    /// The component type of an array type. Must not be asked of a merged
    /// reference.
    pub fn component_type(&mut self, array_id: CacheId) -> CacheId {
        if !self.is_array_types(array_id) {
            return id_for_kind(Kind::Conflict);
        }
        let entry = self.get(array_id);
        if entry.kind().is_unresolved_types() {
            debug_assert!(!matches!(entry.kind(), Kind::UnresolvedMergedReference));
            let component = entry.descriptor[1..].to_owned();
            self.from_descriptor(&component)
        } else {
            let component = entry
                .class()
                .component_type()
                .expect("array class without component");
            self.from_class(component)
        }
    }

    /// Merge two distinct types; implements the join of the lattice.
    pub fn merge(&mut self, lhs_id: CacheId, rhs_id: CacheId) -> CacheId {
        debug_assert_ne!(lhs_id, rhs_id);
        let lhs_kind = self.kind_of(lhs_id);
        let rhs_kind = self.kind_of(rhs_id);
        let merge_kind = Kind::merge(lhs_kind, rhs_kind);
        if !matches!(merge_kind, Kind::UnresolvedMergedReference) {
            return id_for_kind(merge_kind);
        }
        // The marker sends us into reference-level merging.
        debug_assert!(lhs_kind.is_reference_types() && rhs_kind.is_reference_types());
        debug_assert!(!lhs_kind.is_uninitialized_types() && !rhs_kind.is_uninitialized_types());
        if lhs_kind.is_zero_or_null() || rhs_kind.is_zero_or_null() {
            // 0 merged with a reference is the reference, and null absorbs
            // zero.
            return if lhs_kind.is_constant_types() {
                if matches!(rhs_kind, Kind::Zero) {
                    lhs_id
                } else {
                    rhs_id
                }
            } else {
                lhs_id
            };
        }
        if lhs_kind.is_unresolved_types() || rhs_kind.is_unresolved_types() {
            return self.from_unresolved_merge(lhs_id, rhs_id);
        }
        let s = self.get(lhs_id).class();
        let t = self.get(rhs_id).class();
        match self.class_join(s, t) {
            None => {
                // Internal error creating the join (e.g. the array class
                // could not be allocated). Reporting a merged type here
                // would loop on the resolved components, so fall back to an
                // anonymous unresolved sentinel.
                debug!(
                    lhs = %self.dump(lhs_id),
                    rhs = %self.dump(rhs_id),
                    "class join failed, using unresolved sentinel"
                );
                self.make_unresolved_reference()
            }
            Some(join) => {
                self.resolver.record_assignability(join, s);
                self.resolver.record_assignability(join, t);
                if join == s {
                    lhs_id
                } else if join == t {
                    rhs_id
                } else {
                    self.from_class(join)
                }
            }
        }
    }

    /// Merge that tolerates `lhs_id == rhs_id`.
    pub fn safe_merge(&mut self, lhs_id: CacheId, rhs_id: CacheId) -> CacheId {
        if lhs_id == rhs_id {
            lhs_id
        } else {
            self.merge(lhs_id, rhs_id)
        }
    }

    /// Join of two resolved classes. `None` signals an internal failure to
    /// build the join class.
    fn class_join(&self, s: R::Class, t: R::Class) -> Option<R::Class> {
        debug_assert!(!s.is_primitive() && !t.is_primitive());
        if s == t || s.is_assignable_from(t) {
            Some(s)
        } else if t.is_assignable_from(s) {
            Some(t)
        } else if s.is_array() && t.is_array() {
            self.array_class_join(s, t)
        } else if s.is_interface() || t.is_interface() {
            self.interface_class_join(s, t)
        } else {
            let mut s = s;
            let mut t = t;
            let mut s_depth = s.depth_in_hierarchy();
            let mut t_depth = t.depth_in_hierarchy();
            while s_depth > t_depth {
                s = s.superclass()?;
                s_depth -= 1;
            }
            while t_depth > s_depth {
                t = t.superclass()?;
                t_depth -= 1;
            }
            while s != t {
                s = s.superclass()?;
                t = t.superclass()?;
            }
            Some(s)
        }
    }

    fn array_class_join(&self, s: R::Class, t: R::Class) -> Option<R::Class> {
        let s_component = s.component_type()?;
        let t_component = t.component_type()?;
        if s_component.is_primitive() || t_component.is_primitive() {
            // Distinct arrays with a primitive component only share Object.
            let join = s.superclass()?;
            debug_assert!(join.is_object_class());
            return Some(join);
        }
        let common = self.class_join(s_component, t_component)?;
        self.resolver.find_array_class(common)
    }

    fn interface_class_join(&self, s: R::Class, t: R::Class) -> Option<R::Class> {
        // Interfaces have no partial order we could join in, so pick an
        // arbitrary common ancestor interface by walking both interface
        // tables backwards; interface dispatch is re-checked at runtime
        // anyway.
        let s_interfaces = s.implemented_interfaces();
        let t_interfaces = t.implemented_interfaces();
        // Index == table length stands for the class itself.
        for s_it in (0..=s_interfaces.len()).rev() {
            let s_cl = if s_it == s_interfaces.len() { s } else { s_interfaces[s_it] };
            if !s_cl.is_interface() {
                continue;
            }
            for t_it in (0..=t_interfaces.len()).rev() {
                let t_cl = if t_it == t_interfaces.len() { t } else { t_interfaces[t_it] };
                if !t_cl.is_interface() {
                    continue;
                }
                if s_cl == t_cl {
                    return Some(s_cl);
                }
            }
        }
        let join = if s.is_interface() { s.superclass() } else { t.superclass() }?;
        debug_assert!(join.is_object_class());
        Some(join)
    }

    /// Produce or intern the merged-unresolved type for two references, at
    /// least one of which is unresolved.
    pub fn from_unresolved_merge(&mut self, left_id: CacheId, right_id: CacheId) -> CacheId {
        let mut types = BitVector::new(64, true);

        let fold_side = |cache: &Self, id: CacheId, types: &mut BitVector| -> (CacheId, bool) {
            let entry = cache.get(id);
            match entry.kind() {
                Kind::UnresolvedMergedReference => {
                    types.union(entry.unresolved_types());
                    (entry.resolved_part_id(), cache.is_array_types(id))
                }
                kind if kind.is_unresolved_types() => {
                    types.set_bit(id as usize);
                    (id_for_kind(Kind::Zero), cache.is_array_types(id))
                }
                _ => (id, false),
            }
        };
        let (left_resolved, left_unresolved_is_array) = fold_side(self, left_id, &mut types);
        let (right_resolved, right_unresolved_is_array) = fold_side(self, right_id, &mut types);

        // The resolved parts may be equal, so merge defensively.
        let resolved_merged = self.safe_merge(left_resolved, right_resolved);
        if matches!(self.kind_of(resolved_merged), Kind::Conflict) {
            return id_for_kind(Kind::Conflict);
        }
        if matches!(self.kind_of(resolved_merged), Kind::JavaLangObject) {
            return resolved_merged;
        }

        let resolved_merged_is_array = self.is_array_types(resolved_merged);
        if left_unresolved_is_array || right_unresolved_is_array || resolved_merged_is_array {
            // Arrays are involved; a mix of array and non-array parts, or a
            // primitive array, collapses to Object. A missing resolved part
            // is encoded as zero and constrains nothing.
            if resolved_merged_is_array && !self.is_object_array_types(resolved_merged) {
                return id_for_kind(Kind::JavaLangObject);
            }
            let left_has_unresolved = left_resolved != left_id;
            let right_has_unresolved = right_resolved != right_id;
            let resolved_part_exists = !self.kind_of(resolved_merged).is_zero_or_null();
            if (!left_unresolved_is_array && left_has_unresolved)
                || (!right_unresolved_is_array && right_has_unresolved)
                || (resolved_part_exists && !resolved_merged_is_array)
            {
                return id_for_kind(Kind::JavaLangObject);
            }
        }

        // Return an existing equivalent entry if there is one.
        for id in NUM_FIXED_CACHE_IDS as usize..self.entries.len() {
            let entry = &self.entries[id];
            if matches!(entry.kind(), Kind::UnresolvedMergedReference)
                && entry.resolved_part_id() == resolved_merged
                && entry.unresolved_types().same_bits_set(&types)
            {
                return id as CacheId;
            }
        }
        self.add_entry(
            Kind::UnresolvedMergedReference,
            Cow::Borrowed(""),
            Payload::Merged {
                resolved: resolved_merged,
                unresolved: types.fixed_copy(),
            },
        )
    }

    /// `Ljava/lang/String;`
    pub fn java_lang_string(&mut self) -> CacheId {
        self.from_descriptor("Ljava/lang/String;")
    }

    /// `Ljava/lang/Class;`
    pub fn java_lang_class(&mut self) -> CacheId {
        self.from_descriptor("Ljava/lang/Class;")
    }

    /// `Ljava/lang/Throwable;`
    pub fn java_lang_throwable(&mut self) -> CacheId {
        self.from_descriptor("Ljava/lang/Throwable;")
    }

    /// `Ljava/lang/invoke/MethodHandle;`
    pub fn java_lang_invoke_method_handle(&mut self) -> CacheId {
        self.from_descriptor("Ljava/lang/invoke/MethodHandle;")
    }

    /// `Ljava/lang/invoke/MethodType;`
    pub fn java_lang_invoke_method_type(&mut self) -> CacheId {
        self.from_descriptor("Ljava/lang/invoke/MethodType;")
    }

    /// Render a type for diagnostics, expanding merged references.
    pub fn dump(&self, id: CacheId) -> String {
        let entry = self.get(id);
        if !matches!(entry.kind(), Kind::UnresolvedMergedReference) {
            return entry.to_string();
        }
        let mut out = format!(
            "UnresolvedMergedReferences({}",
            self.dump(entry.resolved_part_id())
        );
        for (i, member) in entry.unresolved_types().indexes().enumerate() {
            out.push_str(if i == 0 { " | " } else { ", " });
            out.push_str(&self.dump(member as CacheId));
        }
        out.push(')');
        out
    }
}
