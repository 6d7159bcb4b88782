//! Field access verification.

use dex_asm::{Instruction, Opcode};
use dex_types::FieldIndex;
use tracing::debug;

use super::instruction::CheckAccess;
use super::MethodVerifier;
use crate::error::ErrorKind;
use crate::reg_type::Kind;
use crate::reg_type_cache::CacheId;
use crate::register_line::LockOp;
use crate::resolver::{ClassResolver, ResolvedField};

impl<'a, R: ClassResolver> MethodVerifier<'a, R> {
    /// Shared verification for `iget*`, `iput*`, `sget*` and `sput*`.
    pub(crate) fn verify_field_access(
        &mut self,
        inst: &Instruction<'_>,
        opcode: Opcode,
        is_primitive: bool,
        is_static: bool,
        is_put: bool,
    ) {
        debug_assert!(opcode.field_access().is_some());
        debug_assert!(!self.have_pending_hard_failure);
        let field_idx = FieldIndex::new(if is_static {
            inst.vreg_b()
        } else {
            inst.vreg_c()
        });
        let field = if is_static {
            self.get_static_field(field_idx, is_put)
        } else {
            let field = self.get_instance_field(inst.vreg_b(), field_idx, is_put);
            if self.have_pending_hard_failure {
                return;
            }
            field
        };
        debug_assert!(!self.have_pending_hard_failure);
        let _ = field;

        // The declared field type drives the register types; it is stronger
        // than what the instruction alone can say (ints vs. floats, longs
        // vs. doubles, exact object types).
        let type_idx = self.resolver.field_ref(field_idx).type_idx;
        let field_type = self.reg_types.from_type_index(type_idx);
        let vreg_a = inst.vreg_a();
        if is_put {
            if is_primitive {
                self.verify_primitive_put(field_type, vreg_a);
            } else {
                self.verify_register_type(vreg_a, field_type);
            }
        } else if !self.reg_types.kind_of(field_type).is_low_half() {
            self.work_line
                .set_register_type(LockOp::Clear, vreg_a, field_type);
        } else {
            let hi = crate::reg_type_cache::id_for_kind(
                self.reg_types.kind_of(field_type).to_high_half(),
            );
            self.work_line.set_register_type_wide(vreg_a, field_type, hi);
        }
    }

    /// Primitive puts have weaker rules than general assignability: any
    /// integral value stores into any integral field.
    pub(crate) fn verify_primitive_put(&mut self, target_type: CacheId, vreg_a: u32) {
        let target_kind = self.reg_types.kind_of(target_type);
        let value_id = self.work_line.reg_id(vreg_a);
        let value_kind = self.reg_types.kind_of(value_id);
        let value_compatible = if target_kind.is_integral_types() {
            value_kind.is_integral_types()
        } else if matches!(target_kind, Kind::Float) {
            value_kind.is_float_types()
        } else if matches!(target_kind, Kind::LongLo) {
            debug_assert!((vreg_a as usize + 1) < self.work_line.num_regs());
            let value_kind_hi = self.reg_kind_of(vreg_a + 1);
            value_kind.is_long_types() && Kind::check_wide_pair(value_kind, value_kind_hi)
        } else if matches!(target_kind, Kind::DoubleLo) {
            debug_assert!((vreg_a as usize + 1) < self.work_line.num_regs());
            let value_kind_hi = self.reg_kind_of(vreg_a + 1);
            value_kind.is_double_types() && Kind::check_wide_pair(value_kind, value_kind_hi)
        } else {
            false
        };
        if !value_compatible {
            let message = format!(
                "unexpected value in v{vreg_a} of type {} but expected {} for put",
                self.reg_types.dump(value_id),
                self.reg_types.dump(target_type)
            );
            self.fail(ErrorKind::BadClassHard, message);
        }
    }

    /// Resolve a static field reference and its constraints.
    pub(crate) fn get_static_field(
        &mut self,
        field_idx: FieldIndex,
        is_put: bool,
    ) -> Option<ResolvedField<R::Class>> {
        let class_idx = self.resolver.field_ref(field_idx).class_idx;
        let klass_type = self.resolve_class(class_idx, CheckAccess::Yes);
        let klass_kind = self.reg_types.kind_of(klass_type);
        debug_assert!(matches!(
            klass_kind,
            Kind::JavaLangObject | Kind::Reference | Kind::UnresolvedReference
        ));
        if matches!(klass_kind, Kind::UnresolvedReference) {
            // Accessibility depends on resolved fields; check at runtime.
            return None;
        }
        let Some(field) = self.resolver.resolve_field(field_idx) else {
            let name = self.resolver.field_ref(field_idx).name.to_owned();
            debug!(field = %name, "unable to resolve static field");
            let message = format!(
                "field {name} not found in the resolved type {}",
                self.reg_types.dump(klass_type)
            );
            self.fail(ErrorKind::NoField, message);
            return None;
        };
        if !field.is_static() {
            let name = self.resolver.field_ref(field_idx).name.to_owned();
            self.fail(
                ErrorKind::ClassChange,
                format!("expected field {name} to be static"),
            );
            return None;
        }
        self.get_field_common(field_idx, field, is_put)
    }

    /// Resolve an instance field reference, including the constructor
    /// special cases for fields of an uninitialized `this`.
    pub(crate) fn get_instance_field(
        &mut self,
        vreg_b: u32,
        field_idx: FieldIndex,
        is_put: bool,
    ) -> Option<ResolvedField<R::Class>> {
        let obj_id = self.work_line.reg_id(vreg_b);
        let obj_kind = self.reg_types.kind_of(obj_id);
        if !obj_kind.is_reference_types() {
            let message = format!(
                "instance field access on object that has non-reference type {}",
                self.reg_types.dump(obj_id)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return None;
        }
        let class_idx = self.resolver.field_ref(field_idx).class_idx;
        let klass_type = self.resolve_class(class_idx, CheckAccess::Yes);
        let klass_kind = self.reg_types.kind_of(klass_type);
        debug_assert!(matches!(
            klass_kind,
            Kind::JavaLangObject | Kind::Reference | Kind::UnresolvedReference
        ));
        let field = if matches!(klass_kind, Kind::UnresolvedReference) {
            None
        } else {
            self.resolver.resolve_field(field_idx)
        };

        if obj_kind.is_uninitialized_types() {
            // Fields of uninitialized references are off limits, except
            // that a constructor may write its own class's fields before
            // calling the superclass constructor. The field must be
            // declared directly by the class, not inherited.
            if is_put && class_idx == self.resolver.class_def().class_idx {
                if matches!(obj_kind, Kind::UnresolvedUninitializedThisReference) {
                    if self.resolver.class_def_declares_instance_field(field_idx) {
                        // Nothing further can be checked on the unresolved
                        // class.
                        return None;
                    }
                } else if matches!(obj_kind, Kind::UninitializedThisReference) {
                    if let Some(field) = &field {
                        let declaring = self.declaring_class_id();
                        if Some(field.declaring_class) == self.reg_type_class(declaring)
                            && !field.is_static()
                        {
                            return Some(field.clone());
                        }
                    }
                }
            }
            // Reads from a resolved uninitialized `this` are tolerated for
            // app compatibility; the reference implementation rejects them
            // but shipped apps rely on it.
            if !is_put && matches!(obj_kind, Kind::UninitializedThisReference) {
                if let Some(field) = &field {
                    let declaring = self.declaring_class_id();
                    if Some(field.declaring_class) == self.reg_type_class(declaring) {
                        return Some(field.clone());
                    }
                }
            }
            let name = self.resolver.field_ref(field_idx).name.to_owned();
            let message = format!(
                "cannot access instance field {name} of a not fully initialized object"
            );
            self.fail(ErrorKind::BadClassHard, message);
            return None;
        }

        if matches!(klass_kind, Kind::UnresolvedReference) {
            // Accessibility depends on resolved fields; check at runtime.
            return None;
        }
        let Some(field) = field else {
            let name = self.resolver.field_ref(field_idx).name.to_owned();
            let message = format!(
                "field {name} not found in the resolved type {}",
                self.reg_types.dump(klass_type)
            );
            self.fail(ErrorKind::NoField, message);
            return None;
        };
        if obj_kind.is_zero_or_null() {
            // The access will throw a null pointer exception at runtime;
            // only the common soft checks below remain.
        } else {
            let klass = field.declaring_class;
            let field_klass = if matches!(klass_kind, Kind::JavaLangObject)
                || self.reg_types.get(klass_type).class() == klass
            {
                klass_type
            } else {
                self.reg_types.from_class(klass)
            };
            debug_assert!(!obj_kind.is_uninitialized_types());
            if !self.is_assignable_from(field_klass, obj_id) {
                // The object type can neither be the declaring class nor a
                // subclass, so for this object the field does not exist.
                debug_assert!(!self.reg_types.kind_of(field_klass).is_unresolved_types());
                let name = self.resolver.field_ref(field_idx).name.to_owned();
                let message = format!(
                    "cannot access instance field {name} from object of type {}",
                    self.reg_types.dump(obj_id)
                );
                if obj_kind.is_unresolved_types() {
                    self.fail(ErrorKind::UnresolvedTypeCheck, message);
                } else {
                    self.fail(ErrorKind::BadClassHard, message);
                }
                return None;
            }
        }

        if field.is_static() {
            let name = self.resolver.field_ref(field_idx).name.to_owned();
            self.fail(
                ErrorKind::ClassChange,
                format!("expected field {name} to not be static"),
            );
            return None;
        }
        self.get_field_common(field_idx, field, is_put)
    }

    fn get_field_common(
        &mut self,
        field_idx: FieldIndex,
        field: ResolvedField<R::Class>,
        is_put: bool,
    ) -> Option<ResolvedField<R::Class>> {
        if !self.can_access_member(field.declaring_class, field.access_flags) {
            let name = self.resolver.field_ref(field_idx).name.to_owned();
            let stat = if field.is_static() { "static" } else { "instance" };
            self.fail(
                ErrorKind::AccessField,
                format!("cannot access {stat} field {name}"),
            );
            return None;
        }
        if is_put && field.is_final() {
            let declaring = self.declaring_class_id();
            if Some(field.declaring_class) != self.reg_type_class(declaring) {
                let name = self.resolver.field_ref(field_idx).name.to_owned();
                self.fail(
                    ErrorKind::AccessField,
                    format!("cannot modify final field {name} from other class"),
                );
                return None;
            }
        }
        self.check_for_final_abstract_class(field.declaring_class);
        Some(field)
    }
}
