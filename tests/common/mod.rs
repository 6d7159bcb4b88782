//! An in-memory class world for verifier tests.
//!
//! The fake keeps every pool the verifier consults (types, fields, methods,
//! prototypes) in plain vectors and resolves classes by descriptor; a class
//! that was never registered is simply unresolved.

use dex_verifier::prelude::*;
use dex_verifier::resolver::{
    access_flags::*, FieldRef, MethodRef, ProtoRef, ResolvedField, ResolvedMethod,
};
use dex_types::{FieldIndex, MethodIndex, ProtoIndex};

#[derive(Default)]
pub struct ClassData {
    pub descriptor: String,
    pub access_flags: u32,
    pub superclass: Option<usize>,
    /// All implemented interfaces, direct and inherited, in table order.
    pub interfaces: Vec<usize>,
    pub component: Option<usize>,
    pub primitive: Option<PrimitiveType>,
}

pub struct FieldData {
    pub class_idx: TypeIndex,
    pub name: String,
    pub type_idx: TypeIndex,
    pub access_flags: u32,
    pub declared_in_class_def: bool,
}

pub struct MethodData {
    pub class_idx: TypeIndex,
    pub name: String,
    pub proto_idx: ProtoIndex,
    pub access_flags: u32,
    pub vtable_index: usize,
}

#[derive(Default)]
pub struct FakeDex {
    pub classes: Vec<ClassData>,
    pub type_ids: Vec<String>,
    pub fields: Vec<FieldData>,
    pub methods: Vec<MethodData>,
    pub protos: Vec<(TypeIndex, Vec<TypeIndex>)>,
    pub class_def_idx: TypeIndex,
}

impl FakeDex {
    /// A world with `java.lang.Object` and `java.lang.Throwable` in place
    /// and `class_def` as the class under verification.
    pub fn new(class_def: &str) -> Self {
        let mut dex = FakeDex::default();
        dex.add_class("Ljava/lang/Object;", ACC_PUBLIC, None, &[]);
        dex.add_class("Ljava/lang/Throwable;", ACC_PUBLIC, Some("Ljava/lang/Object;"), &[]);
        dex.add_class(class_def, ACC_PUBLIC, Some("Ljava/lang/Object;"), &[]);
        dex.class_def_idx = dex.type_index(class_def);
        dex
    }

    pub fn type_index(&mut self, descriptor: &str) -> TypeIndex {
        if let Some(pos) = self.type_ids.iter().position(|d| d == descriptor) {
            return TypeIndex::new(pos as u16);
        }
        self.type_ids.push(descriptor.to_owned());
        TypeIndex::new((self.type_ids.len() - 1) as u16)
    }

    pub fn add_class(
        &mut self,
        descriptor: &str,
        access_flags: u32,
        superclass: Option<&str>,
        interfaces: &[&str],
    ) -> usize {
        self.type_index(descriptor);
        let superclass = superclass.map(|desc| self.class_position(desc));
        let interfaces = interfaces.iter().map(|desc| self.class_position(desc)).collect();
        self.classes.push(ClassData {
            descriptor: descriptor.to_owned(),
            access_flags,
            superclass,
            interfaces,
            component: None,
            primitive: None,
        });
        self.classes.len() - 1
    }

    pub fn add_array_class(&mut self, descriptor: &str, component: &str) -> usize {
        self.type_index(descriptor);
        let component = self.class_position(component);
        self.classes.push(ClassData {
            descriptor: descriptor.to_owned(),
            access_flags: ACC_PUBLIC | ACC_FINAL,
            superclass: Some(self.class_position("Ljava/lang/Object;")),
            interfaces: Vec::new(),
            component: Some(component),
            primitive: None,
        });
        self.classes.len() - 1
    }

    pub fn add_primitive_class(&mut self, descriptor: &str, primitive: PrimitiveType) -> usize {
        self.classes.push(ClassData {
            descriptor: descriptor.to_owned(),
            access_flags: ACC_PUBLIC | ACC_FINAL,
            superclass: None,
            interfaces: Vec::new(),
            component: None,
            primitive: Some(primitive),
        });
        self.classes.len() - 1
    }

    fn class_position(&self, descriptor: &str) -> usize {
        self.classes
            .iter()
            .position(|class| class.descriptor == descriptor)
            .unwrap_or_else(|| panic!("class {descriptor} not registered"))
    }

    pub fn add_proto(&mut self, return_descriptor: &str, params: &[&str]) -> ProtoIndex {
        let ret = self.type_index(return_descriptor);
        let params = params.iter().map(|desc| self.type_index(desc)).collect();
        self.protos.push((ret, params));
        ProtoIndex::new((self.protos.len() - 1) as u16)
    }

    pub fn add_method(
        &mut self,
        class: &str,
        name: &str,
        return_descriptor: &str,
        params: &[&str],
        access_flags: u32,
    ) -> MethodIndex {
        let class_idx = self.type_index(class);
        let proto_idx = self.add_proto(return_descriptor, params);
        self.methods.push(MethodData {
            class_idx,
            name: name.to_owned(),
            proto_idx,
            access_flags,
            vtable_index: 1,
        });
        MethodIndex::new((self.methods.len() - 1) as u32)
    }

    pub fn add_field(
        &mut self,
        class: &str,
        name: &str,
        type_descriptor: &str,
        access_flags: u32,
    ) -> FieldIndex {
        let class_idx = self.type_index(class);
        let type_idx = self.type_index(type_descriptor);
        let declared_in_class_def = class_idx == self.class_def_idx;
        self.fields.push(FieldData {
            class_idx,
            name: name.to_owned(),
            type_idx,
            access_flags,
            declared_in_class_def,
        });
        FieldIndex::new((self.fields.len() - 1) as u32)
    }

    fn class_by_descriptor(&self, descriptor: &str) -> Option<Class<'_>> {
        self.classes
            .iter()
            .position(|class| class.descriptor == descriptor)
            .map(|index| Class { dex: self, index })
    }
}

#[derive(Clone, Copy)]
pub struct Class<'a> {
    dex: &'a FakeDex,
    index: usize,
}

impl<'a> Class<'a> {
    fn data(&self) -> &'a ClassData {
        &self.dex.classes[self.index]
    }
}

impl<'a> PartialEq for Class<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<'a> Eq for Class<'a> {}

impl<'a> std::fmt::Debug for Class<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Class({})", self.data().descriptor)
    }
}

impl<'a> ClassHandle for Class<'a> {
    fn descriptor(&self) -> &str {
        &self.data().descriptor
    }

    fn is_interface(&self) -> bool {
        self.data().access_flags & ACC_INTERFACE != 0
    }

    fn is_final(&self) -> bool {
        self.data().access_flags & ACC_FINAL != 0
    }

    fn is_abstract(&self) -> bool {
        self.data().access_flags & ACC_ABSTRACT != 0
    }

    fn is_array(&self) -> bool {
        self.data().component.is_some()
    }

    fn is_primitive(&self) -> bool {
        self.data().primitive.is_some()
    }

    fn is_object_class(&self) -> bool {
        self.data().descriptor == "Ljava/lang/Object;"
    }

    fn is_public(&self) -> bool {
        self.data().access_flags & ACC_PUBLIC != 0
    }

    fn is_instantiable(&self) -> bool {
        !self.is_interface() && !self.is_abstract() && !self.is_primitive()
    }

    fn primitive_type(&self) -> Option<PrimitiveType> {
        self.data().primitive
    }

    fn component_type(&self) -> Option<Self> {
        self.data().component.map(|index| Class {
            dex: self.dex,
            index,
        })
    }

    fn superclass(&self) -> Option<Self> {
        self.data().superclass.map(|index| Class {
            dex: self.dex,
            index,
        })
    }

    fn depth_in_hierarchy(&self) -> usize {
        let mut depth = 0;
        let mut cur = self.superclass();
        while let Some(class) = cur {
            depth += 1;
            cur = class.superclass();
        }
        depth
    }

    fn implemented_interfaces(&self) -> Vec<Self> {
        self.data()
            .interfaces
            .iter()
            .map(|&index| Class {
                dex: self.dex,
                index,
            })
            .collect()
    }

    fn vtable_length(&self) -> usize {
        64
    }

    fn is_assignable_from(&self, other: Self) -> bool {
        if self.index == other.index {
            return true;
        }
        if self.is_primitive() || other.is_primitive() {
            return false;
        }
        if self.is_object_class() {
            return true;
        }
        if self.is_array() && other.is_array() {
            return match (self.component_type(), other.component_type()) {
                (Some(ours), Some(theirs)) if !ours.is_primitive() && !theirs.is_primitive() => {
                    ours.is_assignable_from(theirs)
                }
                _ => false,
            };
        }
        let mut cur = Some(other);
        while let Some(class) = cur {
            if class.index == self.index {
                return true;
            }
            if self.is_interface()
                && class
                    .implemented_interfaces()
                    .iter()
                    .any(|iface| iface.index == self.index)
            {
                return true;
            }
            cur = class.superclass();
        }
        false
    }

    fn can_access(&self, other: Self) -> bool {
        other.is_public() || package_of(self.descriptor()) == package_of(other.descriptor())
    }

    fn can_access_member(&self, declaring: Self, member_access_flags: u32) -> bool {
        if member_access_flags & ACC_PUBLIC != 0 {
            return true;
        }
        if member_access_flags & ACC_PRIVATE != 0 {
            return *self == declaring;
        }
        // Protected and package-private both pass within the package.
        package_of(self.descriptor()) == package_of(declaring.descriptor())
            || (member_access_flags & ACC_PROTECTED != 0 && declaring.is_assignable_from(*self))
    }
}

fn package_of(descriptor: &str) -> &str {
    descriptor.rsplit_once('/').map(|(package, _)| package).unwrap_or("")
}

impl<'a> ClassResolver for &'a FakeDex {
    type Class = Class<'a>;

    fn num_type_ids(&self) -> usize {
        self.type_ids.len()
    }

    fn num_field_ids(&self) -> usize {
        self.fields.len()
    }

    fn num_method_ids(&self) -> usize {
        self.methods.len()
    }

    fn num_string_ids(&self) -> usize {
        16
    }

    fn num_proto_ids(&self) -> usize {
        self.protos.len()
    }

    fn type_descriptor(&self, idx: TypeIndex) -> &str {
        &self.type_ids[idx.to_usize()]
    }

    fn field_ref(&self, idx: FieldIndex) -> FieldRef<'_> {
        let field = &self.fields[idx.to_usize()];
        FieldRef {
            class_idx: field.class_idx,
            name: &field.name,
            type_idx: field.type_idx,
        }
    }

    fn method_ref(&self, idx: MethodIndex) -> MethodRef<'_> {
        let method = &self.methods[idx.to_usize()];
        MethodRef {
            class_idx: method.class_idx,
            name: &method.name,
            proto_idx: method.proto_idx,
        }
    }

    fn proto(&self, idx: ProtoIndex) -> ProtoRef {
        let (return_type_idx, params) = &self.protos[idx.to_usize()];
        ProtoRef {
            return_type_idx: *return_type_idx,
            param_type_idxs: params.clone(),
        }
    }

    fn resolve_type(&self, idx: TypeIndex) -> Option<Self::Class> {
        self.class_by_descriptor(&self.type_ids[idx.to_usize()])
    }

    fn find_class(&self, descriptor: &str) -> Option<Self::Class> {
        self.class_by_descriptor(descriptor)
    }

    fn find_array_class(&self, component: Self::Class) -> Option<Self::Class> {
        let descriptor = format!("[{}", component.descriptor());
        self.class_by_descriptor(&descriptor)
    }

    fn resolve_field(&self, idx: FieldIndex) -> Option<ResolvedField<Self::Class>> {
        let field = &self.fields[idx.to_usize()];
        let declaring_class = self.class_by_descriptor(&self.type_ids[field.class_idx.to_usize()])?;
        Some(ResolvedField {
            declaring_class,
            access_flags: field.access_flags,
        })
    }

    fn resolve_method(&self, idx: MethodIndex) -> Option<ResolvedMethod<Self::Class>> {
        let method = &self.methods[idx.to_usize()];
        let declaring_class =
            self.class_by_descriptor(&self.type_ids[method.class_idx.to_usize()])?;
        let (return_type_idx, params) = &self.protos[method.proto_idx.to_usize()];
        Some(ResolvedMethod {
            declaring_class,
            access_flags: method.access_flags,
            name: method.name.clone(),
            return_descriptor: self.type_ids[return_type_idx.to_usize()].clone(),
            param_descriptors: params
                .iter()
                .map(|idx| self.type_ids[idx.to_usize()].clone())
                .collect(),
            vtable_index: method.vtable_index,
            is_miranda: false,
        })
    }

    fn class_def(&self) -> ClassDef {
        ClassDef {
            class_idx: self.class_def_idx,
            superclass_idx: self
                .type_ids
                .iter()
                .position(|desc| desc == "Ljava/lang/Object;")
                .map(|pos| TypeIndex::new(pos as u16)),
            access_flags: ACC_PUBLIC,
        }
    }

    fn class_def_declares_instance_field(&self, idx: FieldIndex) -> bool {
        self.fields[idx.to_usize()].declared_in_class_def
    }

    fn method_shorty(&self, method: MethodIndex) -> String {
        let (return_type_idx, params) = &self.protos[self.methods[method.to_usize()].proto_idx.to_usize()];
        let shorty_char = |idx: &TypeIndex| {
            let descriptor = &self.type_ids[idx.to_usize()];
            match descriptor.as_bytes()[0] {
                b'L' | b'[' => 'L',
                c => c as char,
            }
        };
        let mut shorty = String::new();
        shorty.push(shorty_char(return_type_idx));
        shorty.extend(params.iter().map(shorty_char));
        shorty
    }
}

/// A plain code item with no try blocks.
pub fn code_item(registers: u16, ins: u16, outs: u16, insns: Vec<u16>) -> CodeItem {
    CodeItem {
        registers_size: registers,
        ins_size: ins,
        outs_size: outs,
        insns,
        tries: Vec::new(),
        handlers: Vec::new(),
    }
}
