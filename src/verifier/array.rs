//! Array instruction verification: `aget*`, `aput*`, `filled-new-array`
//! and `fill-array-data`.

use dex_asm::Instruction;
use dex_types::TypeIndex;

use super::instruction::CheckAccess;
use super::MethodVerifier;
use crate::error::ErrorKind;
use crate::reg_type::Kind;
use crate::reg_type_cache::id_for_kind;
use crate::register_line::LockOp;
use crate::resolver::ClassResolver;

impl<'a, R: ClassResolver> MethodVerifier<'a, R> {
    /// `aget*`: the destination takes the array's component type, or a
    /// type inferred from the instruction when the array is known null.
    pub(crate) fn verify_aget(&mut self, inst: &Instruction<'_>, insn_kind: Kind, is_primitive: bool) {
        let index_kind = self.reg_kind_of(inst.vreg_c());
        if !index_kind.is_array_index_types() {
            let message = format!("Invalid reg type for array index ({index_kind:?})");
            self.fail(ErrorKind::BadClassHard, message);
            return;
        }
        let array_id = self.work_line.reg_id(inst.vreg_b());
        let array_kind = self.reg_types.kind_of(array_id);
        if array_kind.is_zero_or_null() {
            // Null array register; the access throws at runtime. Infer a
            // merge-able result from the instruction alone.
            if !is_primitive {
                self.work_line.set_register_kind(inst.vreg_a(), Kind::Null);
            } else if matches!(insn_kind, Kind::Integer) {
                // A non-zero constant fits any narrow primitive and stays
                // distinguishable from null; the instruction cannot tell an
                // int array from a float array.
                self.work_line
                    .set_register_kind(inst.vreg_a(), super::instruction::determine_cat1_constant(1));
            } else if insn_kind.is_category1_types() {
                self.work_line.set_register_kind(inst.vreg_a(), insn_kind);
            } else {
                self.work_line.set_register_kind_wide(
                    inst.vreg_a(),
                    Kind::ConstantLo,
                    Kind::ConstantHi,
                );
            }
        } else if !self.reg_types.is_array_types(array_id) {
            let message = format!("not array type {} with aget", self.reg_types.dump(array_id));
            self.fail(ErrorKind::BadClassHard, message);
        } else if matches!(array_kind, Kind::UnresolvedMergedReference) {
            // Merged unresolved arrays are always reference arrays.
            if is_primitive {
                let message = format!(
                    "reference array type {} source for category 1 aget",
                    self.reg_types.dump(array_id)
                );
                self.fail(ErrorKind::BadClassHard, message);
            } else {
                let message = format!(
                    "cannot verify aget for {} because of missing class",
                    self.reg_types.dump(array_id)
                );
                self.fail(ErrorKind::NoClass, message);
                // Approximate with java.lang.Object.
                self.work_line
                    .set_register_kind(inst.vreg_a(), Kind::JavaLangObject);
            }
        } else {
            let component = self.reg_types.component_type(array_id);
            let component_kind = self.reg_types.kind_of(component);
            if !component_kind.is_reference_types() && !is_primitive {
                let message = format!(
                    "primitive array type {} source for aget-object",
                    self.reg_types.dump(array_id)
                );
                self.fail(ErrorKind::BadClassHard, message);
            } else if component_kind.is_non_zero_reference_types() && is_primitive {
                let message = format!(
                    "reference array type {} source for category 1 aget",
                    self.reg_types.dump(array_id)
                );
                self.fail(ErrorKind::BadClassHard, message);
            } else if is_primitive
                && component != id_for_kind(insn_kind)
                && !((matches!(insn_kind, Kind::Integer) && matches!(component_kind, Kind::Float))
                    || (matches!(insn_kind, Kind::LongLo)
                        && matches!(component_kind, Kind::DoubleLo)))
            {
                let message = format!(
                    "array type {} incompatible with aget of type {insn_kind:?}",
                    self.reg_types.dump(array_id)
                );
                self.fail(ErrorKind::BadClassHard, message);
            } else if !component_kind.is_low_half() {
                // The component type is stronger knowledge than the
                // instruction type.
                self.work_line
                    .set_register_type(LockOp::Clear, inst.vreg_a(), component);
            } else {
                let hi = id_for_kind(component_kind.to_high_half());
                self.work_line
                    .set_register_type_wide(inst.vreg_a(), component, hi);
            }
        }
    }

    /// `aput*`: the stored value is checked against the component type;
    /// `aput-object` defers the exact element check to the runtime's array
    /// store exception.
    pub(crate) fn verify_aput(&mut self, inst: &Instruction<'_>, insn_kind: Kind, is_primitive: bool) {
        let index_kind = self.reg_kind_of(inst.vreg_c());
        if !index_kind.is_array_index_types() {
            let message = format!("Invalid reg type for array index ({index_kind:?})");
            self.fail(ErrorKind::BadClassHard, message);
            return;
        }
        let array_id = self.work_line.reg_id(inst.vreg_b());
        let array_kind = self.reg_types.kind_of(array_id);
        if array_kind.is_zero_or_null() {
            // Null array register; still check the value against the
            // instruction. The instruction is not fully typed: an `aput`
            // may store a float and an `aput-wide` a double.
            let mut check_id = id_for_kind(insn_kind);
            if matches!(insn_kind, Kind::Integer)
                && matches!(self.reg_kind_of(inst.vreg_a()), Kind::Float)
            {
                check_id = id_for_kind(Kind::Float);
            } else if matches!(insn_kind, Kind::LongLo)
                && matches!(self.reg_kind_of(inst.vreg_a()), Kind::DoubleLo)
            {
                check_id = id_for_kind(Kind::DoubleLo);
            }
            self.verify_register_type(inst.vreg_a(), check_id);
        } else if !self.reg_types.is_array_types(array_id) {
            let message = format!("not array type {} with aput", self.reg_types.dump(array_id));
            self.fail(ErrorKind::BadClassHard, message);
        } else if matches!(array_kind, Kind::UnresolvedMergedReference) {
            if is_primitive {
                let message = format!(
                    "aput insn has type '{insn_kind:?}' but unresolved type '{}'",
                    self.reg_types.dump(array_id)
                );
                self.fail(ErrorKind::BadClassHard, message);
            } else {
                let message = format!(
                    "cannot verify aput for {} because of missing class",
                    self.reg_types.dump(array_id)
                );
                self.fail(ErrorKind::NoClass, message);
            }
        } else {
            let component = self.reg_types.component_type(array_id);
            let component_kind = self.reg_types.kind_of(component);
            let vreg_a = inst.vreg_a();
            if is_primitive {
                let instruction_compatible = if component_kind.is_integral_types() {
                    component == id_for_kind(insn_kind)
                } else if matches!(component_kind, Kind::Float) {
                    // There is no put-float; it travels as put-int.
                    matches!(insn_kind, Kind::Integer)
                } else if matches!(component_kind, Kind::LongLo) {
                    matches!(insn_kind, Kind::LongLo)
                } else if matches!(component_kind, Kind::DoubleLo) {
                    // No put-double either; it travels as put-long.
                    matches!(insn_kind, Kind::LongLo)
                } else {
                    // Reference component with a primitive store.
                    false
                };
                if !instruction_compatible {
                    // The instructions and descriptors were produced from
                    // one file, so a mismatch is corruption rather than a
                    // class change.
                    let message = format!(
                        "aput insn has type '{insn_kind:?}' but expected type '{}'",
                        self.reg_types.dump(component)
                    );
                    self.fail(ErrorKind::BadClassHard, message);
                    return;
                }
                self.verify_primitive_put(component, vreg_a);
            } else if !component_kind.is_reference_types() {
                let message = format!(
                    "primitive array type {} source for aput-object",
                    self.reg_types.dump(array_id)
                );
                self.fail(ErrorKind::BadClassHard, message);
            } else {
                // Use the instruction type rather than the component type;
                // incompatible elements surface as array store exceptions
                // at runtime.
                self.verify_register_type(vreg_a, id_for_kind(Kind::JavaLangObject));
            }
        }
    }

    /// `filled-new-array`: every input register must fit the component
    /// type; the array itself lands in the result register.
    pub(crate) fn verify_filled_new_array(
        &mut self,
        inst: &Instruction<'_>,
        is_range: bool,
    ) -> bool {
        let type_idx = TypeIndex::new(inst.vreg_b() as u16);
        let res_type = self.resolve_class(type_idx, CheckAccess::Yes);
        debug_assert!(self.reg_types.is_array_types(res_type));
        debug_assert!(!matches!(
            self.reg_types.kind_of(res_type),
            Kind::UnresolvedMergedReference
        ));
        let expected_type = self.reg_types.component_type(res_type);
        // Legal, if silly, for the argument count to be zero.
        let arg_count = inst.vreg_a();
        let args = if is_range {
            [0u32; dex_asm::MAX_VAR_ARG_REGS]
        } else {
            inst.var_args()
        };
        for ui in 0..arg_count {
            let get_reg = if is_range {
                inst.vreg_c() + ui
            } else {
                args[ui as usize]
            };
            if !self.verify_register_type(get_reg, expected_type) {
                debug_assert!(self.have_pending_hard_failure);
                return false;
            }
            debug_assert!(!self.have_pending_hard_failure);
        }
        self.work_line.set_result_register_type(res_type);
        true
    }

    /// `fill-array-data`: the array must be a primitive array whose element
    /// width matches the payload's declared width.
    pub(crate) fn verify_fill_array_data(&mut self, inst: &Instruction<'_>) -> bool {
        let array_id = self.work_line.reg_id(inst.vreg_a());
        let array_kind = self.reg_types.kind_of(array_id);
        // A zero register means the code path throws at runtime.
        if array_kind.is_zero_or_null() {
            return true;
        }
        if !self.reg_types.is_array_types(array_id) {
            let message = format!(
                "invalid fill-array-data with array type {}",
                self.reg_types.dump(array_id)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        if array_kind.is_unresolved_types() {
            // An unresolved array can only be a reference array.
            let message = format!(
                "invalid fill-array-data for array of type {}",
                self.reg_types.dump(array_id)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        let component = self.reg_types.component_type(array_id);
        let component_kind = self.reg_types.kind_of(component);
        debug_assert!(!matches!(component_kind, Kind::Conflict));
        if component_kind.is_non_zero_reference_types() {
            let message = format!(
                "invalid fill-array-data with component type {}",
                self.reg_types.dump(component)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        // Dex stores the data uncompressed, so the payload width must be
        // exactly the component width.
        let payload_pc = self.work_insn_idx.wrapping_add(inst.branch_offset() as u32);
        debug_assert_eq!(
            self.code.insns[payload_pc as usize],
            dex_asm::ARRAY_DATA_SIGNATURE
        );
        let elem_width = self.reg_types.get(component).primitive_type().component_size();
        let declared_width = self.code.insns[payload_pc as usize + 1] as usize;
        if declared_width != elem_width {
            let message =
                format!("array-data size mismatch ({declared_width} vs {elem_width})");
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        true
    }
}
