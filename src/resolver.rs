//! External collaborators of the verifier.
//!
//! The verifier is generic over a [`ClassResolver`], the seam through which
//! it resolves types, fields and methods, queries the dex constant pools and
//! reports assignability dependencies. Class entities are opaque
//! [`ClassHandle`]s with a small reflection surface; the verifier never
//! mutates them. Resolution failures are `None` — the host is responsible
//! for clearing any pending exception state of its own before returning.

use dex_types::{
    CallSiteIndex, DexPc, FieldIndex, MethodHandleIndex, MethodIndex, ProtoIndex, StringIndex,
    TypeIndex,
};

/// Dex access flags shared by classes, fields and methods.
pub mod access_flags {
    /// Visible everywhere.
    pub const ACC_PUBLIC: u32 = 0x0001;
    /// Visible only to the defining class.
    pub const ACC_PRIVATE: u32 = 0x0002;
    /// Visible to the package and subclasses.
    pub const ACC_PROTECTED: u32 = 0x0004;
    /// Static member.
    pub const ACC_STATIC: u32 = 0x0008;
    /// Not overridable / not assignable after construction.
    pub const ACC_FINAL: u32 = 0x0010;
    /// Synchronized method.
    pub const ACC_SYNCHRONIZED: u32 = 0x0020;
    /// Variable-arity method.
    pub const ACC_VARARGS: u32 = 0x0080;
    /// Native method.
    pub const ACC_NATIVE: u32 = 0x0100;
    /// Interface class.
    pub const ACC_INTERFACE: u32 = 0x0200;
    /// Abstract class or method.
    pub const ACC_ABSTRACT: u32 = 0x0400;
    /// Strict floating-point method.
    pub const ACC_STRICT: u32 = 0x0800;
    /// Constructor, as marked by the dex file.
    pub const ACC_CONSTRUCTOR: u32 = 0x0001_0000;
    /// Declared-synchronized method.
    pub const ACC_DECLARED_SYNCHRONIZED: u32 = 0x0002_0000;
    /// Fast-native annotation flag.
    pub const ACC_FAST_NATIVE: u32 = 0x0008_0000;
    /// Critical-native annotation flag.
    pub const ACC_CRITICAL_NATIVE: u32 = 0x0020_0000;
}

/// The primitive Java types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// `Z`
    Boolean,
    /// `B`
    Byte,
    /// `C`
    Char,
    /// `S`
    Short,
    /// `I`
    Int,
    /// `F`
    Float,
    /// `J`
    Long,
    /// `D`
    Double,
}

impl PrimitiveType {
    /// Storage size of an array component of this type, in bytes.
    pub const fn component_size(self) -> usize {
        match self {
            PrimitiveType::Boolean | PrimitiveType::Byte => 1,
            PrimitiveType::Char | PrimitiveType::Short => 2,
            PrimitiveType::Int | PrimitiveType::Float => 4,
            PrimitiveType::Long | PrimitiveType::Double => 8,
        }
    }
}

/// Opaque handle to a resolved class entity.
///
/// Handles are cheap to copy and compare; equality is class identity.
pub trait ClassHandle: Copy + Eq + core::fmt::Debug {
    /// The class descriptor, e.g. `Ljava/lang/Object;`.
    fn descriptor(&self) -> &str;
    /// Whether this is an interface.
    fn is_interface(&self) -> bool;
    /// Whether this class is final.
    fn is_final(&self) -> bool;
    /// Whether this class is abstract.
    fn is_abstract(&self) -> bool;
    /// Whether this is an array class.
    fn is_array(&self) -> bool;
    /// Whether this is a primitive type.
    fn is_primitive(&self) -> bool;
    /// Whether this is `java.lang.Object`.
    fn is_object_class(&self) -> bool;
    /// Whether this class is public.
    fn is_public(&self) -> bool;
    /// Whether instances of this class can be created.
    fn is_instantiable(&self) -> bool;
    /// The primitive type, if this is a primitive class.
    fn primitive_type(&self) -> Option<PrimitiveType>;
    /// The component type of an array class.
    fn component_type(&self) -> Option<Self>;
    /// The superclass, `None` for `java.lang.Object` and interfaces rooted
    /// directly in it.
    fn superclass(&self) -> Option<Self>;
    /// Depth in the superclass hierarchy; `java.lang.Object` is 0.
    fn depth_in_hierarchy(&self) -> usize;
    /// All interfaces implemented by this class, direct and inherited, in
    /// table order.
    fn implemented_interfaces(&self) -> Vec<Self>;
    /// Length of the virtual dispatch table.
    fn vtable_length(&self) -> usize;
    /// Whether a value of class `other` can be assigned to this class.
    fn is_assignable_from(&self, other: Self) -> bool;
    /// Whether code in this class may access class `other`.
    fn can_access(&self, other: Self) -> bool;
    /// Whether code in this class may access a member of `declaring` with
    /// the given access flags.
    fn can_access_member(&self, declaring: Self, member_access_flags: u32) -> bool;
}

/// A resolved field.
#[derive(Debug, Clone)]
pub struct ResolvedField<C> {
    /// The class that declares the field.
    pub declaring_class: C,
    /// Dex access flags of the field.
    pub access_flags: u32,
}

impl<C> ResolvedField<C> {
    /// Whether the field is static.
    pub fn is_static(&self) -> bool {
        self.access_flags & access_flags::ACC_STATIC != 0
    }

    /// Whether the field is final.
    pub fn is_final(&self) -> bool {
        self.access_flags & access_flags::ACC_FINAL != 0
    }
}

/// A resolved method.
#[derive(Debug, Clone)]
pub struct ResolvedMethod<C> {
    /// The class that declares the method.
    pub declaring_class: C,
    /// Dex access flags of the method.
    pub access_flags: u32,
    /// The method name.
    pub name: String,
    /// Return type descriptor.
    pub return_descriptor: String,
    /// Parameter type descriptors, in order.
    pub param_descriptors: Vec<String>,
    /// Index into the declaring class vtable, for virtual methods.
    pub vtable_index: usize,
    /// Whether this is a miranda method (declared by an interface but
    /// surfaced through an abstract class).
    pub is_miranda: bool,
}

impl<C> ResolvedMethod<C> {
    /// Whether the method is static.
    pub fn is_static(&self) -> bool {
        self.access_flags & access_flags::ACC_STATIC != 0
    }

    /// Whether the method is private.
    pub fn is_private(&self) -> bool {
        self.access_flags & access_flags::ACC_PRIVATE != 0
    }

    /// Whether the method is public.
    pub fn is_public(&self) -> bool {
        self.access_flags & access_flags::ACC_PUBLIC != 0
    }

    /// Whether the method is native.
    pub fn is_native(&self) -> bool {
        self.access_flags & access_flags::ACC_NATIVE != 0
    }

    /// Whether the method takes variable arguments.
    pub fn is_varargs(&self) -> bool {
        self.access_flags & access_flags::ACC_VARARGS != 0
    }

    /// Whether this is an instance constructor or static initializer.
    pub fn is_any_constructor(&self) -> bool {
        self.access_flags & access_flags::ACC_CONSTRUCTOR != 0 || self.name.starts_with('<')
    }

    /// Whether this is an instance constructor.
    pub fn is_instance_constructor(&self) -> bool {
        self.is_any_constructor() && !self.is_static()
    }

    /// Whether this is a static class initializer.
    pub fn is_class_initializer(&self) -> bool {
        self.is_any_constructor() && self.is_static()
    }

    /// Whether invoke-direct dispatch applies (private method or
    /// constructor).
    pub fn is_direct(&self) -> bool {
        self.is_private() || self.is_static() || self.is_any_constructor()
    }
}

/// A `method_id` entry: the referenced class, name and prototype.
#[derive(Debug, Clone)]
pub struct MethodRef<'a> {
    /// Type index of the class the reference names.
    pub class_idx: TypeIndex,
    /// Method name.
    pub name: &'a str,
    /// Prototype of the reference.
    pub proto_idx: ProtoIndex,
}

/// A `field_id` entry: the referenced class, name and type.
#[derive(Debug, Clone)]
pub struct FieldRef<'a> {
    /// Type index of the class the reference names.
    pub class_idx: TypeIndex,
    /// Field name.
    pub name: &'a str,
    /// Type index of the field type.
    pub type_idx: TypeIndex,
}

/// A method prototype: return type and parameter types.
#[derive(Debug, Clone)]
pub struct ProtoRef {
    /// Type index of the return type.
    pub return_type_idx: TypeIndex,
    /// Type indices of the declared parameters.
    pub param_type_idxs: Vec<TypeIndex>,
}

/// The essential values of a call site: the bootstrap method handle, the
/// name and the method type. A well-formed call site carries at least these
/// three, in this order, with the right value types.
#[derive(Debug, Clone)]
pub struct CallSite {
    /// Index of the bootstrap method handle.
    pub method_handle_idx: MethodHandleIndex,
    /// Index of the method name string.
    pub name_idx: StringIndex,
    /// Index of the method type prototype.
    pub proto_idx: ProtoIndex,
    /// Whether the bootstrap method handle is of kind invoke-static.
    pub method_handle_is_invoke_static: bool,
}

/// The class definition being verified.
#[derive(Debug, Clone, Copy)]
pub struct ClassDef {
    /// Type index of the class.
    pub class_idx: TypeIndex,
    /// Type index of the superclass, `None` for `java.lang.Object`.
    pub superclass_idx: Option<TypeIndex>,
    /// Class access flags.
    pub access_flags: u32,
}

impl ClassDef {
    /// Whether the class is an interface.
    pub fn is_interface(&self) -> bool {
        self.access_flags & access_flags::ACC_INTERFACE != 0
    }
}

/// The method under verification.
#[derive(Debug, Clone, Copy)]
pub struct MethodInfo {
    /// Method index in the dex file.
    pub method_idx: MethodIndex,
    /// Method access flags.
    pub access_flags: u32,
}

/// One entry of the try table.
#[derive(Debug, Clone, Copy)]
pub struct TryItem {
    /// First dex pc covered by the try block.
    pub start_addr: DexPc,
    /// Number of code units covered.
    pub insn_count: u16,
    /// Index into the handler lists of the code item.
    pub handler_index: usize,
}

impl TryItem {
    /// Whether `dex_pc` falls inside this try block.
    pub fn covers(&self, dex_pc: DexPc) -> bool {
        dex_pc >= self.start_addr && dex_pc < self.start_addr + self.insn_count as DexPc
    }
}

/// One catch handler: the caught type (`None` for catch-all) and the
/// handler address.
#[derive(Debug, Clone, Copy)]
pub struct CatchHandler {
    /// Type index of the caught exception, `None` for catch-all.
    pub type_idx: Option<TypeIndex>,
    /// Dex pc of the handler.
    pub address: DexPc,
}

/// A method body: register counts, code units and the try/catch tables.
#[derive(Debug, Clone, Default)]
pub struct CodeItem {
    /// Total number of virtual registers.
    pub registers_size: u16,
    /// Number of registers holding incoming arguments.
    pub ins_size: u16,
    /// Number of registers reserved for outgoing arguments.
    pub outs_size: u16,
    /// The instruction stream.
    pub insns: Vec<u16>,
    /// Try blocks, ordered by start address.
    pub tries: Vec<TryItem>,
    /// Handler lists referenced by the try blocks.
    pub handlers: Vec<Vec<CatchHandler>>,
}

/// Class resolution and dex reflection surface consumed by the verifier.
///
/// The implementation owns all class data; the verifier only holds
/// [`ClassHandle`]s. `record_assignability` is the best-effort dependency
/// sink used by downstream re-verification; implementations may ignore it.
pub trait ClassResolver {
    /// The class entity handle.
    type Class: ClassHandle;

    /// Number of type ids in the dex file.
    fn num_type_ids(&self) -> usize;
    /// Number of field ids in the dex file.
    fn num_field_ids(&self) -> usize;
    /// Number of method ids in the dex file.
    fn num_method_ids(&self) -> usize;
    /// Number of string ids in the dex file.
    fn num_string_ids(&self) -> usize;
    /// Number of prototype ids in the dex file.
    fn num_proto_ids(&self) -> usize;
    /// Number of call-site ids in the dex file.
    fn num_call_site_ids(&self) -> usize {
        0
    }
    /// Number of method handles in the dex file.
    fn num_method_handles(&self) -> usize {
        0
    }

    /// Descriptor of the type at `idx`.
    fn type_descriptor(&self, idx: TypeIndex) -> &str;
    /// The field reference at `idx`.
    fn field_ref(&self, idx: FieldIndex) -> FieldRef<'_>;
    /// The method reference at `idx`.
    fn method_ref(&self, idx: MethodIndex) -> MethodRef<'_>;
    /// The prototype at `idx`.
    fn proto(&self, idx: ProtoIndex) -> ProtoRef;
    /// The essential values of the call site at `idx`, or `None` if the
    /// encoded array is structurally malformed.
    fn call_site(&self, _idx: CallSiteIndex) -> Option<CallSite> {
        None
    }

    /// Resolve a type index to a class.
    fn resolve_type(&self, idx: TypeIndex) -> Option<Self::Class>;
    /// Find a class by descriptor.
    fn find_class(&self, descriptor: &str) -> Option<Self::Class>;
    /// Find or create the array class with the given component.
    fn find_array_class(&self, component: Self::Class) -> Option<Self::Class>;
    /// Resolve a field index.
    fn resolve_field(&self, idx: FieldIndex) -> Option<ResolvedField<Self::Class>>;
    /// Resolve a method index.
    fn resolve_method(&self, idx: MethodIndex) -> Option<ResolvedMethod<Self::Class>>;
    /// Look up the method with the incompatible static/instance shape, for
    /// error reporting only. Results must not be recorded anywhere.
    fn find_incompatible_method(&self, _idx: MethodIndex) -> Option<ResolvedMethod<Self::Class>> {
        None
    }

    /// The class definition being verified.
    fn class_def(&self) -> ClassDef;
    /// Whether the verified class itself declares the instance field `idx`.
    fn class_def_declares_instance_field(&self, idx: FieldIndex) -> bool;
    /// Whether the dex version supports default interface methods.
    fn supports_default_methods(&self) -> bool {
        true
    }
    /// Access flags from native-method annotations (fast-native,
    /// critical-native), zero when absent.
    fn native_annotation_access_flags(&self, _method: MethodIndex) -> u32 {
        0
    }
    /// The method shorty, one character per type with the return type first.
    fn method_shorty(&self, method: MethodIndex) -> String;

    /// Record that `rhs` was proven assignable to `lhs`, for downstream
    /// re-verification.
    fn record_assignability(&self, _lhs: Self::Class, _rhs: Self::Class) {}
}

/// Whether `descriptor` is a well-formed field or class descriptor.
pub fn is_valid_descriptor(descriptor: &str) -> bool {
    let mut rest = descriptor;
    let mut dimensions = 0usize;
    while let Some(stripped) = rest.strip_prefix('[') {
        dimensions += 1;
        if dimensions > 255 {
            return false;
        }
        rest = stripped;
    }
    match rest.as_bytes().first() {
        Some(b'L') => {
            // Lfully/qualified/Name; with a non-empty body and no empty
            // package components.
            let Some(body) = rest.strip_prefix('L').and_then(|r| r.strip_suffix(';')) else {
                return false;
            };
            !body.is_empty()
                && body.split('/').all(|part| {
                    !part.is_empty() && !part.contains(['.', ';', '['])
                })
        }
        Some(b'Z' | b'B' | b'C' | b'S' | b'I' | b'J' | b'F' | b'D') => rest.len() == 1,
        Some(b'V') => rest.len() == 1 && dimensions == 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_validity() {
        assert!(is_valid_descriptor("Ljava/lang/Object;"));
        assert!(is_valid_descriptor("[[I"));
        assert!(is_valid_descriptor("[Ljava/lang/String;"));
        assert!(is_valid_descriptor("V"));
        assert!(!is_valid_descriptor("[V"));
        assert!(!is_valid_descriptor(""));
        assert!(!is_valid_descriptor("L;"));
        assert!(!is_valid_descriptor("Ljava//Name;"));
        assert!(!is_valid_descriptor("Ljava/lang/Object"));
        assert!(!is_valid_descriptor("X"));
        assert!(!is_valid_descriptor("II"));
    }

    #[test]
    fn try_item_coverage() {
        let item = TryItem {
            start_addr: 4,
            insn_count: 3,
            handler_index: 0,
        };
        assert!(!item.covers(3));
        assert!(item.covers(4));
        assert!(item.covers(6));
        assert!(!item.covers(7));
    }
}
