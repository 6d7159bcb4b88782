//! Per-instruction data-flow verification.
//!
//! `code_flow_verify_instruction` decodes one instruction, checks its
//! operand registers, writes its results and propagates the working line to
//! every successor: fall-through, branch targets, switch targets and catch
//! handlers.

use dex_asm::{Instruction, OpFlags, Opcode};
use dex_types::{DexPc, MethodIndex, TypeIndex};
use tracing::debug;

use super::flags::InsnFlags;
use super::invoke::MethodType;
use super::{MethodVerifier, SDK_P, SDK_S_V2};
use crate::error::ErrorKind;
use crate::reg_type::{Assignability, Kind};
use crate::reg_type_cache::{id_for_kind, kind_for_id, CacheId, NUM_REG_KIND_CACHE_IDS};
use crate::register_line::{LockOp, RegisterLine};
use crate::resolver::{ClassHandle, ClassResolver};

/// How eagerly a class resolution checks accessibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CheckAccess {
    No,
    OnResolvedClass,
    Yes,
}

/// Classify a narrow constant by value range. The type is imprecise: only
/// the range matters, not the exact value.
pub(crate) fn determine_cat1_constant(value: i32) -> Kind {
    if value < -32768 {
        Kind::IntegerConstant
    } else if value < -128 {
        Kind::ShortConstant
    } else if value < 0 {
        Kind::ByteConstant
    } else if value == 0 {
        Kind::Zero
    } else if value == 1 {
        Kind::BooleanConstant
    } else if value < 128 {
        Kind::PositiveByteConstant
    } else if value < 32768 {
        Kind::PositiveShortConstant
    } else if value < 65536 {
        Kind::CharConstant
    } else {
        Kind::IntegerConstant
    }
}

impl<'a, R: ClassResolver> MethodVerifier<'a, R> {
    /// Resolve a type index to a register type, enforcing access rules.
    pub(crate) fn resolve_class(&mut self, type_idx: TypeIndex, check: CheckAccess) -> CacheId {
        // Force resolution through the host so its caches see the class
        // even when the cache could answer from a descriptor alone.
        let _ = self.resolver.resolve_type(type_idx);
        let result = self.reg_types.from_type_index(type_idx);
        let result_kind = self.reg_types.kind_of(result);
        if matches!(result_kind, Kind::Conflict) {
            let descriptor = self.resolver.type_descriptor(type_idx).to_owned();
            self.fail(
                ErrorKind::BadClassHard,
                format!("accessing broken descriptor '{descriptor}'"),
            );
            return result;
        }
        // Unresolved classes are included in the access check for newer
        // apps, to trigger re-verification at runtime.
        if check != CheckAccess::No
            && result_kind.is_non_zero_reference_types()
            && ((check == CheckAccess::Yes && self.options.api_level_at_least(SDK_P))
                || !result_kind.is_unresolved_types())
        {
            let referrer = self.declaring_class_id();
            let referrer_unresolved = self.reg_types.kind_of(referrer).is_unresolved_types();
            if (self.options.api_level_at_least(SDK_P) || !referrer_unresolved)
                && !self.can_access(result)
            {
                let message = format!(
                    "(possibly) illegal class access: '{}' -> '{}'",
                    self.reg_types.dump(referrer),
                    self.reg_types.dump(result)
                );
                self.fail(ErrorKind::AccessClass, message);
            }
        }
        result
    }

    pub(crate) fn resolve_class_no_access_check(&mut self, type_idx: TypeIndex) -> CacheId {
        self.resolve_class(type_idx, CheckAccess::No)
    }

    /// The class handle behind a resolved reference type; `java.lang.Object`
    /// goes through the resolver.
    pub(crate) fn reg_type_class(&self, id: CacheId) -> Option<R::Class> {
        let entry = self.reg_types.get(id);
        match entry.kind() {
            Kind::Reference => Some(entry.class()),
            Kind::JavaLangObject => self.resolver.find_class("Ljava/lang/Object;"),
            _ => None,
        }
    }

    /// Whether the verified class may access the class behind `other_id`.
    pub(crate) fn can_access(&mut self, other_id: CacheId) -> bool {
        let declaring = self.declaring_class_id();
        if declaring == other_id {
            return true;
        }
        let other_kind = self.reg_types.kind_of(other_id);
        let declaring_kind = self.reg_types.kind_of(declaring);
        if matches!(other_kind, Kind::UnresolvedReference) {
            // No test is possible on unresolved types; be conservative.
            return false;
        }
        if matches!(declaring_kind, Kind::UnresolvedReference) {
            return matches!(other_kind, Kind::JavaLangObject)
                || (matches!(other_kind, Kind::Reference)
                    && self.reg_types.get(other_id).class().is_public());
        }
        match (self.reg_type_class(declaring), self.reg_type_class(other_id)) {
            (Some(declaring), Some(other)) => declaring.can_access(other),
            _ => true,
        }
    }

    /// Whether the verified class may access a member of `klass`.
    pub(crate) fn can_access_member(&mut self, klass: R::Class, member_access_flags: u32) -> bool {
        let declaring = self.declaring_class_id();
        if self.reg_types.kind_of(declaring).is_unresolved_types() {
            return false;
        }
        self.reg_type_class(declaring)
            .map(|declaring| declaring.can_access_member(klass, member_access_flags))
            .unwrap_or(false)
    }

    /// `new-instance`, field and method declaring classes must not be final
    /// abstract classes; such classes fail verification themselves, so any
    /// use here can only throw at runtime.
    pub(crate) fn check_for_final_abstract_class(&mut self, klass: R::Class) {
        if klass.is_final()
            && klass.is_abstract()
            && !klass.is_interface()
            && !klass.is_primitive()
            && !klass.is_array()
        {
            let descriptor = klass.descriptor().to_owned();
            self.fail(
                ErrorKind::NoClass,
                format!("Final abstract class used in a context that requires a verified class: {descriptor}"),
            );
        }
    }

    /// Can a value of type `rhs` be assigned to a variable of type `lhs`?
    pub(crate) fn assignable_from(&mut self, lhs: CacheId, rhs: CacheId, strict: bool) -> bool {
        if lhs == rhs {
            return true;
        }
        let lhs_kind = self.reg_types.kind_of(lhs);
        let rhs_kind = self.reg_types.kind_of(rhs);
        match Kind::assignability_from(lhs_kind, rhs_kind) {
            Assignability::Assignable => true,
            Assignability::NotAssignable => false,
            // Category checks precede assignability checks, so narrowing
            // conversions only surface for `return`, which prohibits them.
            Assignability::NarrowingConversion => false,
            Assignability::Invalid => {
                debug_assert!(false, "invalid assignability query {lhs_kind:?} := {rhs_kind:?}");
                false
            }
            Assignability::Reference => {
                debug_assert!(!lhs_kind.is_uninitialized_types());
                debug_assert!(!rhs_kind.is_uninitialized_types());
                debug_assert!(!matches!(lhs_kind, Kind::JavaLangObject));
                let lhs_entry = self.reg_types.get(lhs);
                if !strict && lhs_entry.has_class() && lhs_entry.class().is_interface() {
                    // Interface assignability is deferred to run time
                    // unless a strict check was requested.
                    true
                } else if self.reg_types.is_java_lang_object_array(lhs) {
                    // All reference arrays may be assigned to Object[].
                    self.reg_types.is_object_array_types(rhs)
                } else if lhs_entry.has_class() && matches!(rhs_kind, Kind::JavaLangObject) {
                    false
                } else if lhs_entry.has_class() && self.reg_types.get(rhs).has_class() {
                    let lhs_class = self.reg_types.get(lhs).class();
                    let rhs_class = self.reg_types.get(rhs).class();
                    let result = lhs_class.is_assignable_from(rhs_class);
                    if result {
                        self.resolver.record_assignability(lhs_class, rhs_class);
                    }
                    result
                } else {
                    // Unresolved types are assignable only for null and
                    // equality, neither of which reaches this point.
                    false
                }
            }
        }
    }

    pub(crate) fn is_assignable_from(&mut self, lhs: CacheId, rhs: CacheId) -> bool {
        self.assignable_from(lhs, rhs, false)
    }

    pub(crate) fn is_strictly_assignable_from(&mut self, lhs: CacheId, rhs: CacheId) -> bool {
        self.assignable_from(lhs, rhs, true)
    }

    /// Check the type of `vsrc` against `check_id`, hard-failing on
    /// concrete mismatches and soft-failing on unresolved ones. Returns
    /// `false` only for hard failures.
    pub(crate) fn verify_register_type(&mut self, vsrc: u32, check_id: CacheId) -> bool {
        let src_id = self.work_line.reg_id(vsrc);
        if !self.is_assignable_from(check_id, src_id) {
            let check_kind = self.reg_types.kind_of(check_id);
            let src_kind = self.reg_types.kind_of(src_id);
            let fail_kind = if !check_kind.is_non_zero_reference_types()
                || !src_kind.is_non_zero_reference_types()
            {
                // Primitives are concretely known.
                ErrorKind::BadClassHard
            } else if check_kind.is_uninitialized_types() || src_kind.is_uninitialized_types() {
                // Uninitialized types match nothing but themselves.
                ErrorKind::BadClassHard
            } else if check_kind.is_unresolved_types() || src_kind.is_unresolved_types() {
                ErrorKind::UnresolvedTypeCheck
            } else {
                ErrorKind::BadClassHard
            };
            let message = format!(
                "register v{vsrc} has type {} but expected {}",
                self.reg_types.dump(src_id),
                self.reg_types.dump(check_id)
            );
            let hard = matches!(fail_kind, ErrorKind::BadClassHard);
            self.fail(fail_kind, message);
            return !hard;
        }
        if self.reg_types.kind_of(check_id).is_low_half() {
            let src_kind = self.reg_types.kind_of(src_id);
            let src_kind_h = self.reg_types.kind_of(self.work_line.reg_id(vsrc + 1));
            if !Kind::check_wide_pair(src_kind, src_kind_h) {
                self.fail(
                    ErrorKind::BadClassHard,
                    format!("wide register v{vsrc} has type {src_kind:?}/{src_kind_h:?}"),
                );
                return false;
            }
        }
        true
    }

    /// Fast path for checking a register against `Integer` or `Float`.
    pub(crate) fn verify_register_kind(&mut self, vsrc: u32, check_kind: Kind) -> bool {
        debug_assert!(matches!(check_kind, Kind::Integer | Kind::Float));
        let src_id = self.work_line.reg_id(vsrc);
        let assignable = src_id < NUM_REG_KIND_CACHE_IDS
            && Kind::assignability_from(check_kind, kind_for_id(src_id))
                == Assignability::Assignable;
        if !assignable {
            let message = format!(
                "register v{vsrc} has type {} but expected {check_kind}",
                self.reg_types.dump(src_id)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        true
    }

    /// Check a register pair against `LongLo` or `DoubleLo`.
    pub(crate) fn verify_register_type_wide(&mut self, vsrc: u32, check_kind: Kind) -> bool {
        debug_assert!(matches!(check_kind, Kind::LongLo | Kind::DoubleLo));
        let src_id = self.work_line.reg_id(vsrc);
        let assignable = src_id < NUM_REG_KIND_CACHE_IDS
            && Kind::assignability_from(check_kind, kind_for_id(src_id))
                == Assignability::Assignable;
        if !assignable {
            let message = format!(
                "register v{vsrc} has type {} but expected {check_kind}",
                self.reg_types.dump(src_id)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        let src_id_h = self.work_line.reg_id(vsrc + 1);
        let expected_h = id_for_kind(kind_for_id(src_id).to_high_half());
        if src_id_h != expected_h {
            let message = format!(
                "wide register v{vsrc} has type {}/{}",
                self.reg_types.dump(src_id),
                self.reg_types.dump(src_id_h)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        true
    }

    fn verify_copy_reference(&mut self, vdst: u32, vsrc: u32) -> bool {
        let src_id = self.work_line.reg_id(vsrc);
        let kind = self.reg_types.kind_of(src_id);
        // Conflicts may be copied around, just never used.
        if !matches!(kind, Kind::Conflict) && !kind.is_reference_types() {
            let message = format!(
                "copy-reference v{vdst}<-v{vsrc} type={}",
                self.reg_types.dump(src_id)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        self.work_line.copy_reference(vdst, vsrc, src_id);
        true
    }

    fn verify_copy_cat1(&mut self, vdst: u32, vsrc: u32) -> bool {
        let src_id = self.work_line.reg_id(vsrc);
        let valid = src_id < NUM_REG_KIND_CACHE_IDS
            && (matches!(kind_for_id(src_id), Kind::Conflict)
                || kind_for_id(src_id).is_category1_types());
        if !valid {
            let message = format!(
                "copy-cat1 v{vdst}<-v{vsrc} type={}",
                self.reg_types.dump(src_id)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        self.work_line.set_register_kind(vdst, kind_for_id(src_id));
        true
    }

    fn verify_copy_cat2(&mut self, vdst: u32, vsrc: u32) -> bool {
        let src_id_l = self.work_line.reg_id(vsrc);
        let src_id_h = self.work_line.reg_id(vsrc + 1);
        let valid = src_id_l < NUM_REG_KIND_CACHE_IDS
            && kind_for_id(src_id_l).is_low_half()
            && src_id_h == id_for_kind(kind_for_id(src_id_l).to_high_half());
        if !valid {
            let message = format!(
                "copy-cat2 v{vdst}<-v{vsrc} type={}/{}",
                self.reg_types.dump(src_id_l),
                self.reg_types.dump(src_id_h)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        self.work_line
            .set_register_type_wide(vdst, src_id_l, src_id_h);
        true
    }

    fn check_unary_op(&mut self, inst: &Instruction<'_>, dst_kind: Kind, src_kind: Kind) -> bool {
        if self.verify_register_kind(inst.vreg_b(), src_kind) {
            self.work_line.set_register_kind(inst.vreg_a(), dst_kind);
            true
        } else {
            false
        }
    }

    fn check_unary_op_wide(
        &mut self,
        inst: &Instruction<'_>,
        dst_kind: Kind,
        src_kind: Kind,
    ) -> bool {
        if self.verify_register_type_wide(inst.vreg_b(), src_kind) {
            self.work_line
                .set_register_kind_wide(inst.vreg_a(), dst_kind, dst_kind.to_high_half());
            true
        } else {
            false
        }
    }

    fn check_unary_op_to_wide(
        &mut self,
        inst: &Instruction<'_>,
        dst_kind: Kind,
        src_kind: Kind,
    ) -> bool {
        if self.verify_register_kind(inst.vreg_b(), src_kind) {
            self.work_line
                .set_register_kind_wide(inst.vreg_a(), dst_kind, dst_kind.to_high_half());
            true
        } else {
            false
        }
    }

    fn check_unary_op_from_wide(
        &mut self,
        inst: &Instruction<'_>,
        dst_kind: Kind,
        src_kind: Kind,
    ) -> bool {
        if self.verify_register_type_wide(inst.vreg_b(), src_kind) {
            self.work_line.set_register_kind(inst.vreg_a(), dst_kind);
            true
        } else {
            false
        }
    }

    fn check_binary_op(
        &mut self,
        inst: &Instruction<'_>,
        dst_kind: Kind,
        src_kind1: Kind,
        src_kind2: Kind,
        check_boolean_op: bool,
    ) -> bool {
        let vreg_a = inst.vreg_a();
        let vreg_b = inst.vreg_b();
        let vreg_c = inst.vreg_c();
        if self.verify_register_kind(vreg_b, src_kind1)
            && self.verify_register_kind(vreg_c, src_kind2)
        {
            let mut dst_kind = dst_kind;
            if check_boolean_op {
                debug_assert_eq!(dst_kind, Kind::Integer);
                if self.reg_kind_of(vreg_b).is_boolean_types()
                    && self.reg_kind_of(vreg_c).is_boolean_types()
                {
                    dst_kind = Kind::Boolean;
                }
            }
            self.work_line.set_register_kind(vreg_a, dst_kind);
            true
        } else {
            false
        }
    }

    fn check_binary_op_wide(
        &mut self,
        inst: &Instruction<'_>,
        dst_kind: Kind,
        src_kind1: Kind,
        src_kind2: Kind,
    ) -> bool {
        if self.verify_register_type_wide(inst.vreg_b(), src_kind1)
            && self.verify_register_type_wide(inst.vreg_c(), src_kind2)
        {
            self.work_line
                .set_register_kind_wide(inst.vreg_a(), dst_kind, dst_kind.to_high_half());
            true
        } else {
            false
        }
    }

    fn check_binary_op_wide_cmp(
        &mut self,
        inst: &Instruction<'_>,
        dst_kind: Kind,
        src_kind1: Kind,
        src_kind2: Kind,
    ) -> bool {
        if self.verify_register_type_wide(inst.vreg_b(), src_kind1)
            && self.verify_register_type_wide(inst.vreg_c(), src_kind2)
        {
            self.work_line.set_register_kind(inst.vreg_a(), dst_kind);
            true
        } else {
            false
        }
    }

    fn check_binary_op_wide_shift(
        &mut self,
        inst: &Instruction<'_>,
        long_lo_kind: Kind,
        int_kind: Kind,
    ) -> bool {
        if self.verify_register_type_wide(inst.vreg_b(), long_lo_kind)
            && self.verify_register_kind(inst.vreg_c(), int_kind)
        {
            self.work_line.set_register_kind_wide(
                inst.vreg_a(),
                long_lo_kind,
                long_lo_kind.to_high_half(),
            );
            true
        } else {
            false
        }
    }

    fn check_binary_op_2addr(
        &mut self,
        inst: &Instruction<'_>,
        dst_kind: Kind,
        src_kind1: Kind,
        src_kind2: Kind,
        check_boolean_op: bool,
    ) -> bool {
        let vreg_a = inst.vreg_a();
        let vreg_b = inst.vreg_b();
        if self.verify_register_kind(vreg_a, src_kind1)
            && self.verify_register_kind(vreg_b, src_kind2)
        {
            let mut dst_kind = dst_kind;
            if check_boolean_op {
                debug_assert_eq!(dst_kind, Kind::Integer);
                if self.reg_kind_of(vreg_a).is_boolean_types()
                    && self.reg_kind_of(vreg_b).is_boolean_types()
                {
                    dst_kind = Kind::Boolean;
                }
            }
            self.work_line.set_register_kind(vreg_a, dst_kind);
            true
        } else {
            false
        }
    }

    fn check_binary_op_2addr_wide(
        &mut self,
        inst: &Instruction<'_>,
        dst_kind: Kind,
        src_kind1: Kind,
        src_kind2: Kind,
    ) -> bool {
        let vreg_a = inst.vreg_a();
        let vreg_b = inst.vreg_b();
        if self.verify_register_type_wide(vreg_a, src_kind1)
            && self.verify_register_type_wide(vreg_b, src_kind2)
        {
            self.work_line
                .set_register_kind_wide(vreg_a, dst_kind, dst_kind.to_high_half());
            true
        } else {
            false
        }
    }

    fn check_binary_op_2addr_wide_shift(
        &mut self,
        inst: &Instruction<'_>,
        long_lo_kind: Kind,
        int_kind: Kind,
    ) -> bool {
        let vreg_a = inst.vreg_a();
        let vreg_b = inst.vreg_b();
        if self.verify_register_type_wide(vreg_a, long_lo_kind)
            && self.verify_register_kind(vreg_b, int_kind)
        {
            self.work_line
                .set_register_kind_wide(vreg_a, long_lo_kind, long_lo_kind.to_high_half());
            true
        } else {
            false
        }
    }

    fn check_literal_op(
        &mut self,
        inst: &Instruction<'_>,
        dst_kind: Kind,
        src_kind: Kind,
        check_boolean_op: bool,
    ) -> bool {
        let vreg_a = inst.vreg_a();
        let vreg_b = inst.vreg_b();
        if self.verify_register_kind(vreg_b, src_kind) {
            let mut dst_kind = dst_kind;
            if check_boolean_op {
                debug_assert_eq!(dst_kind, Kind::Integer);
                // Check vB, then the constant.
                let value = inst.literal();
                if self.reg_kind_of(vreg_b).is_boolean_types() && (value == 0 || value == 1) {
                    dst_kind = Kind::Boolean;
                }
            }
            self.work_line.set_register_kind(vreg_a, dst_kind);
            true
        } else {
            false
        }
    }

    pub(crate) fn reg_kind_of(&self, vreg: u32) -> Kind {
        self.reg_types.kind_of(self.work_line.reg_id(vreg))
    }

    fn set_result_from_type(&mut self, return_type: CacheId) {
        let kind = self.reg_types.kind_of(return_type);
        if !kind.is_low_half() {
            self.work_line.set_result_register_type(return_type);
        } else {
            self.work_line
                .set_result_register_type_wide(return_type, id_for_kind(kind.to_high_half()));
        }
    }

    /// The return type named by an invoke instruction's method reference.
    fn invoke_return_type(&mut self, method_idx: MethodIndex) -> CacheId {
        let proto_idx = self.resolver.method_ref(method_idx).proto_idx;
        let return_idx = self.resolver.proto(proto_idx).return_type_idx;
        self.reg_types.from_type_index(return_idx)
    }

    /// Verify a single instruction and propagate the state to its
    /// successors. Returns `false` on a hard failure.
    pub(crate) fn code_flow_verify_instruction(&mut self, start_guess: &mut DexPc) -> bool {
        let code = self.code;
        let inst = Instruction::at(&code.insns, self.work_insn_idx);
        let opcode = inst.opcode();
        let mut opcode_flags = opcode.flags();

        // Keep a pre-instruction copy to seed catch-handler merges; the
        // handler must not observe the result of the instruction that
        // threw (e.g. a sharpened check-cast type).
        if (opcode_flags.contains(OpFlags::THROW) || Self::is_compat_throw(opcode))
            && self.insn_flags[self.work_insn_idx as usize].contains(InsnFlags::IN_TRY)
        {
            self.saved_line.copy_from(&self.work_line);
        }
        debug_assert!(!self.have_pending_runtime_throw_failure);

        let mut just_set_result = false;
        // A peephole may compute a refined line for the branch or the
        // fall-through edge; the working line itself must stay consistent.
        let mut branch_line: Option<RegisterLine> = None;
        let mut fallthrough_line: Option<RegisterLine> = None;

        match opcode {
            Opcode::NOP => {
                // Data tables look like NOPs with payload; running into one
                // means the instruction stream is broken.
                if inst.vreg_a() != 0 {
                    self.fail(
                        ErrorKind::BadClassHard,
                        "encountered data table in instruction stream".to_owned(),
                    );
                    return false;
                }
            }

            Opcode::MOVE | Opcode::MOVE_FROM16 | Opcode::MOVE_16 => {
                if !self.verify_copy_cat1(inst.vreg_a(), inst.vreg_b()) {
                    return false;
                }
            }
            Opcode::MOVE_WIDE | Opcode::MOVE_WIDE_FROM16 | Opcode::MOVE_WIDE_16 => {
                if !self.verify_copy_cat2(inst.vreg_a(), inst.vreg_b()) {
                    return false;
                }
            }
            Opcode::MOVE_OBJECT | Opcode::MOVE_OBJECT_FROM16 | Opcode::MOVE_OBJECT_16 => {
                if !self.verify_copy_reference(inst.vreg_a(), inst.vreg_b()) {
                    return false;
                }
            }

            // The move-result instructions copy data out of the result
            // pseudo-registers; they are only valid immediately after an
            // invoke or filled-new-array.
            Opcode::MOVE_RESULT => {
                if let Err(message) =
                    self.work_line
                        .copy_result_register1(&self.reg_types, inst.vreg_a(), false)
                {
                    self.fail(ErrorKind::BadClassHard, message);
                }
            }
            Opcode::MOVE_RESULT_WIDE => {
                if let Err(message) =
                    self.work_line.copy_result_register2(&self.reg_types, inst.vreg_a())
                {
                    self.fail(ErrorKind::BadClassHard, message);
                }
            }
            Opcode::MOVE_RESULT_OBJECT => {
                if let Err(message) =
                    self.work_line
                        .copy_result_register1(&self.reg_types, inst.vreg_a(), true)
                {
                    self.fail(ErrorKind::BadClassHard, message);
                }
            }

            Opcode::MOVE_EXCEPTION => {
                let (success, skip_handler) = self.handle_move_exception(&inst);
                if !success {
                    return false;
                }
                debug_assert!(opcode_flags.contains(OpFlags::CONTINUE));
                if skip_handler {
                    // Avoid verification of the unreachable handler body.
                    opcode_flags.remove(OpFlags::CONTINUE);
                }
            }

            Opcode::RETURN_VOID => {
                if !self.check_constructor_return() {
                    return false;
                }
                let return_type = self.method_return_type();
                if !matches!(self.reg_types.kind_of(return_type), Kind::Conflict) {
                    self.fail(ErrorKind::BadClassHard, "return-void not expected".to_owned());
                    return false;
                }
            }
            Opcode::RETURN => {
                if !self.check_constructor_return() {
                    return false;
                }
                let return_type = self.method_return_type();
                let return_kind = self.reg_types.kind_of(return_type);
                if !return_kind.is_category1_types() {
                    self.fail(
                        ErrorKind::BadClassHard,
                        format!(
                            "unexpected non-category 1 return type {}",
                            self.reg_types.dump(return_type)
                        ),
                    );
                    return false;
                }
                // Compilers may return byte values for booleans and int
                // values for any narrow integral return type.
                let vreg_a = inst.vreg_a();
                let src_kind = self.reg_kind_of(vreg_a);
                let use_src = (matches!(return_kind, Kind::Boolean)
                    && matches!(src_kind, Kind::Byte))
                    || (matches!(
                        return_kind,
                        Kind::Boolean | Kind::Byte | Kind::Short | Kind::Char
                    ) && matches!(src_kind, Kind::Integer));
                let check_id = if use_src {
                    self.work_line.reg_id(vreg_a)
                } else {
                    return_type
                };
                if !self.verify_register_type(vreg_a, check_id) {
                    self.append_to_last_failure(&format!(
                        " return-1nr on invalid register v{vreg_a}"
                    ));
                }
            }
            Opcode::RETURN_WIDE => {
                if !self.check_constructor_return() {
                    return false;
                }
                let return_type = self.method_return_type();
                let return_kind = self.reg_types.kind_of(return_type);
                if !return_kind.is_category2_types() {
                    self.fail(ErrorKind::BadClassHard, "return-wide not expected".to_owned());
                    return false;
                }
                let vreg_a = inst.vreg_a();
                if !self.verify_register_type_wide(vreg_a, return_kind) {
                    self.append_to_last_failure(&format!(
                        " return-wide on invalid register v{vreg_a}"
                    ));
                }
            }
            Opcode::RETURN_OBJECT => {
                if !self.check_constructor_return() {
                    return false;
                }
                let return_type = self.method_return_type();
                let return_kind = self.reg_types.kind_of(return_type);
                if !return_kind.is_reference_types() {
                    self.fail(ErrorKind::BadClassHard, "return-object not expected".to_owned());
                    return false;
                }
                debug_assert!(!return_kind.is_zero_or_null());
                let vreg_a = inst.vreg_a();
                let reg_id = self.work_line.reg_id(vreg_a);
                let reg_kind = self.reg_types.kind_of(reg_id);
                if matches!(reg_kind, Kind::Undefined) {
                    self.fail(ErrorKind::BadClassHard, "returning undefined register".to_owned());
                    return false;
                } else if matches!(reg_kind, Kind::Conflict) {
                    self.fail(
                        ErrorKind::BadClassHard,
                        "returning register with conflict".to_owned(),
                    );
                    return false;
                } else if reg_kind.is_uninitialized_types() {
                    let message = format!(
                        "returning uninitialized object '{}'",
                        self.reg_types.dump(reg_id)
                    );
                    self.fail(ErrorKind::BadClassHard, message);
                    return false;
                } else if !reg_kind.is_reference_types() {
                    let message = format!(
                        "return-object returns a non-reference type {}",
                        self.reg_types.dump(reg_id)
                    );
                    self.fail(ErrorKind::BadClassHard, message);
                    return false;
                } else if !self.is_strictly_assignable_from(return_type, reg_id) {
                    if self.reg_types.kind_of(reg_id).is_unresolved_types()
                        || return_kind.is_unresolved_types()
                    {
                        let message = format!(
                            " can't resolve returned type '{}' or '{}'",
                            self.reg_types.dump(return_type),
                            self.reg_types.dump(reg_id)
                        );
                        self.fail(ErrorKind::UnresolvedTypeCheck, message);
                    } else {
                        let message = format!(
                            "returning '{}', but expected from declaration '{}'",
                            self.reg_types.dump(reg_id),
                            self.reg_types.dump(return_type)
                        );
                        self.fail(ErrorKind::BadClassHard, message);
                        return false;
                    }
                }
            }

            // Could be boolean, int, float, or a null reference.
            Opcode::CONST_4 | Opcode::CONST_16 | Opcode::CONST => {
                let value = inst.literal() as i32;
                self.work_line
                    .set_register_kind(inst.vreg_a(), determine_cat1_constant(value));
            }
            Opcode::CONST_HIGH16 => {
                let value = (inst.literal() as i32) << 16;
                self.work_line
                    .set_register_kind(inst.vreg_a(), determine_cat1_constant(value));
            }
            // Could be long or double; resolved upon use.
            Opcode::CONST_WIDE_16
            | Opcode::CONST_WIDE_32
            | Opcode::CONST_WIDE
            | Opcode::CONST_WIDE_HIGH16 => {
                self.work_line.set_register_kind_wide(
                    inst.vreg_a(),
                    Kind::ConstantLo,
                    Kind::ConstantHi,
                );
            }
            Opcode::CONST_STRING | Opcode::CONST_STRING_JUMBO => {
                let string_type = self.reg_types.java_lang_string();
                self.work_line
                    .set_register_type(LockOp::Clear, inst.vreg_a(), string_type);
            }
            Opcode::CONST_CLASS => {
                // On resolution error the register holds the conflict.
                let res_type =
                    self.resolve_class(TypeIndex::new(inst.vreg_b() as u16), CheckAccess::Yes);
                let result = if matches!(self.reg_types.kind_of(res_type), Kind::Conflict) {
                    res_type
                } else {
                    self.reg_types.java_lang_class()
                };
                self.work_line
                    .set_register_type(LockOp::Clear, inst.vreg_a(), result);
            }
            Opcode::CONST_METHOD_HANDLE => {
                let handle_type = self.reg_types.java_lang_invoke_method_handle();
                self.work_line
                    .set_register_type(LockOp::Clear, inst.vreg_a(), handle_type);
            }
            Opcode::CONST_METHOD_TYPE => {
                let method_type = self.reg_types.java_lang_invoke_method_type();
                self.work_line
                    .set_register_type(LockOp::Clear, inst.vreg_a(), method_type);
            }

            Opcode::MONITOR_ENTER => {
                if !self.verify_monitor_enter(&inst) {
                    return false;
                }
            }
            Opcode::MONITOR_EXIT => {
                // A throwing monitor-exit acts as if it succeeded with the
                // pc on the next instruction, so the throw edge is dropped;
                // structured locking makes the remaining exception cases
                // impossible.
                opcode_flags.remove(OpFlags::THROW);
                let vreg = inst.vreg_a();
                let reg_id = self.work_line.reg_id(vreg);
                let reg_kind = self.reg_types.kind_of(reg_id);
                if !reg_kind.is_reference_types() {
                    let message =
                        format!("monitor-exit on non-object ({})", self.reg_types.dump(reg_id));
                    self.fail(ErrorKind::BadClassHard, message);
                    return false;
                }
                if let Err(message) = self.work_line.pop_monitor(vreg, reg_kind) {
                    self.fail(ErrorKind::Locking, message);
                }
            }

            Opcode::CHECK_CAST | Opcode::INSTANCE_OF => {
                if !self.verify_check_cast_or_instance_of(&inst, opcode) {
                    return false;
                }
            }

            Opcode::ARRAY_LENGTH => {
                let src_id = self.work_line.reg_id(inst.vreg_b());
                let src_kind = self.reg_types.kind_of(src_id);
                if !src_kind.is_reference_types()
                    || (!self.reg_types.is_array_types(src_id) && !src_kind.is_zero_or_null())
                {
                    let message =
                        format!("array-length on non-array {}", self.reg_types.dump(src_id));
                    self.fail(ErrorKind::BadClassHard, message);
                    return false;
                }
                self.work_line.set_register_kind(inst.vreg_a(), Kind::Integer);
            }

            Opcode::NEW_INSTANCE => {
                let res_type =
                    self.resolve_class(TypeIndex::new(inst.vreg_b() as u16), CheckAccess::Yes);
                debug_assert!(matches!(
                    self.reg_types.kind_of(res_type),
                    Kind::JavaLangObject | Kind::Reference | Kind::UnresolvedReference
                ));
                // Interfaces and abstract classes get a soft failure but
                // still produce the uninitialized type.
                if !self.reg_types.is_instantiable_types(res_type) {
                    let message = format!(
                        "new-instance on primitive, interface or abstract class {}",
                        self.reg_types.dump(res_type)
                    );
                    self.fail(ErrorKind::Instantiation, message);
                }
                let uninit_type = self.reg_types.uninitialized(res_type);
                let vreg_a = inst.vreg_a();
                self.work_line
                    .dcheck_unique_new_instance_dex_pc(&self.reg_types, self.work_insn_idx);
                self.work_line.set_register_type_for_new_instance(
                    vreg_a,
                    uninit_type,
                    self.work_insn_idx,
                );
            }
            Opcode::NEW_ARRAY => {
                // The length must be integral.
                if !self.verify_register_kind(inst.vreg_b(), Kind::Integer) {
                    return false;
                }
                let res_type =
                    self.resolve_class(TypeIndex::new(inst.vreg_c() as u16), CheckAccess::Yes);
                debug_assert!(self.reg_types.is_array_types(res_type));
                self.work_line
                    .set_register_type(LockOp::Clear, inst.vreg_a(), res_type);
            }
            Opcode::FILLED_NEW_ARRAY => {
                if !self.verify_filled_new_array(&inst, false) {
                    return false;
                }
                just_set_result = true;
            }
            Opcode::FILLED_NEW_ARRAY_RANGE => {
                if !self.verify_filled_new_array(&inst, true) {
                    return false;
                }
                just_set_result = true;
            }

            Opcode::CMPL_FLOAT | Opcode::CMPG_FLOAT => {
                if !self.check_binary_op(&inst, Kind::Integer, Kind::Float, Kind::Float, false) {
                    return false;
                }
            }
            Opcode::CMPL_DOUBLE | Opcode::CMPG_DOUBLE => {
                if !self.check_binary_op_wide_cmp(
                    &inst,
                    Kind::Integer,
                    Kind::DoubleLo,
                    Kind::DoubleLo,
                ) {
                    return false;
                }
            }
            Opcode::CMP_LONG => {
                if !self.check_binary_op_wide_cmp(&inst, Kind::Integer, Kind::LongLo, Kind::LongLo)
                {
                    return false;
                }
            }

            Opcode::THROW => {
                let res_id = self.work_line.reg_id(inst.vreg_a());
                let throwable = self.reg_types.java_lang_throwable();
                if !self.is_assignable_from(throwable, res_id) {
                    let res_kind = self.reg_types.kind_of(res_id);
                    if res_kind.is_uninitialized_types() {
                        self.fail(
                            ErrorKind::BadClassHard,
                            "thrown exception not initialized".to_owned(),
                        );
                        return false;
                    } else if !res_kind.is_reference_types() {
                        let message = format!(
                            "thrown value of non-reference type {}",
                            self.reg_types.dump(res_id)
                        );
                        self.fail(ErrorKind::BadClassHard, message);
                        return false;
                    } else {
                        let unresolved = res_kind.is_unresolved_types();
                        let message = format!(
                            "thrown class {} not instanceof Throwable",
                            self.reg_types.dump(res_id)
                        );
                        if unresolved {
                            self.fail(ErrorKind::UnresolvedTypeCheck, message);
                        } else {
                            self.fail(ErrorKind::BadClassHard, message);
                            return false;
                        }
                    }
                }
            }

            Opcode::GOTO | Opcode::GOTO_16 | Opcode::GOTO_32 => {
                // No effect on registers.
            }

            Opcode::PACKED_SWITCH | Opcode::SPARSE_SWITCH => {
                // The selector must be an integer or convertible to one.
                self.verify_register_kind(inst.vreg_a(), Kind::Integer);
            }

            Opcode::FILL_ARRAY_DATA => {
                if !self.verify_fill_array_data(&inst) {
                    return false;
                }
            }

            Opcode::IF_EQ | Opcode::IF_NE => {
                let kind1 = self.reg_kind_of(inst.vreg_a());
                let kind2 = self.reg_kind_of(inst.vreg_b());
                let mismatch = if kind1.is_zero_or_null() {
                    !kind2.is_reference_types() && !kind2.is_integral_types()
                } else if kind1.is_reference_types() {
                    !kind2.is_reference_types()
                } else {
                    !kind1.is_integral_types() || !kind2.is_integral_types()
                };
                if mismatch {
                    let message = format!(
                        "args to if-eq/if-ne ({kind1:?},{kind2:?}) must both be references or integral"
                    );
                    self.fail(ErrorKind::BadClassHard, message);
                    return false;
                }
            }
            Opcode::IF_LT | Opcode::IF_GE | Opcode::IF_GT | Opcode::IF_LE => {
                let kind1 = self.reg_kind_of(inst.vreg_a());
                let kind2 = self.reg_kind_of(inst.vreg_b());
                if !kind1.is_integral_types() || !kind2.is_integral_types() {
                    let message =
                        format!("args to 'if' ({kind1:?},{kind2:?}) must be integral");
                    self.fail(ErrorKind::BadClassHard, message);
                    return false;
                }
            }
            Opcode::IF_EQZ | Opcode::IF_NEZ => {
                let reg_kind = self.reg_kind_of(inst.vreg_a());
                if !reg_kind.is_reference_types() && !reg_kind.is_integral_types() {
                    let message =
                        format!("type {reg_kind:?} unexpected as arg to if-eqz/if-nez");
                    self.fail(ErrorKind::BadClassHard, message);
                    return false;
                }
                self.instance_of_peephole(&inst, opcode, &mut branch_line, &mut fallthrough_line);
            }
            Opcode::IF_LTZ | Opcode::IF_GEZ | Opcode::IF_GTZ | Opcode::IF_LEZ => {
                let reg_kind = self.reg_kind_of(inst.vreg_a());
                if !reg_kind.is_integral_types() {
                    let message = format!(
                        "type {reg_kind:?} unexpected as arg to if-ltz/if-gez/if-gtz/if-lez"
                    );
                    self.fail(ErrorKind::BadClassHard, message);
                    return false;
                }
            }

            Opcode::AGET_BOOLEAN => self.verify_aget(&inst, Kind::Boolean, true),
            Opcode::AGET_BYTE => self.verify_aget(&inst, Kind::Byte, true),
            Opcode::AGET_CHAR => self.verify_aget(&inst, Kind::Char, true),
            Opcode::AGET_SHORT => self.verify_aget(&inst, Kind::Short, true),
            Opcode::AGET => self.verify_aget(&inst, Kind::Integer, true),
            Opcode::AGET_WIDE => self.verify_aget(&inst, Kind::LongLo, true),
            Opcode::AGET_OBJECT => self.verify_aget(&inst, Kind::JavaLangObject, false),

            Opcode::APUT_BOOLEAN => self.verify_aput(&inst, Kind::Boolean, true),
            Opcode::APUT_BYTE => self.verify_aput(&inst, Kind::Byte, true),
            Opcode::APUT_CHAR => self.verify_aput(&inst, Kind::Char, true),
            Opcode::APUT_SHORT => self.verify_aput(&inst, Kind::Short, true),
            Opcode::APUT => self.verify_aput(&inst, Kind::Integer, true),
            Opcode::APUT_WIDE => self.verify_aput(&inst, Kind::LongLo, true),
            Opcode::APUT_OBJECT => self.verify_aput(&inst, Kind::JavaLangObject, false),

            Opcode::IGET_BOOLEAN
            | Opcode::IGET_BYTE
            | Opcode::IGET_CHAR
            | Opcode::IGET_SHORT
            | Opcode::IGET
            | Opcode::IGET_WIDE => self.verify_field_access(&inst, opcode, true, false, false),
            Opcode::IGET_OBJECT => self.verify_field_access(&inst, opcode, false, false, false),

            Opcode::IPUT_BOOLEAN
            | Opcode::IPUT_BYTE
            | Opcode::IPUT_CHAR
            | Opcode::IPUT_SHORT
            | Opcode::IPUT
            | Opcode::IPUT_WIDE => self.verify_field_access(&inst, opcode, true, false, true),
            Opcode::IPUT_OBJECT => self.verify_field_access(&inst, opcode, false, false, true),

            Opcode::SGET_BOOLEAN
            | Opcode::SGET_BYTE
            | Opcode::SGET_CHAR
            | Opcode::SGET_SHORT
            | Opcode::SGET
            | Opcode::SGET_WIDE => self.verify_field_access(&inst, opcode, true, true, false),
            Opcode::SGET_OBJECT => self.verify_field_access(&inst, opcode, false, true, false),

            Opcode::SPUT_BOOLEAN
            | Opcode::SPUT_BYTE
            | Opcode::SPUT_CHAR
            | Opcode::SPUT_SHORT
            | Opcode::SPUT
            | Opcode::SPUT_WIDE => self.verify_field_access(&inst, opcode, true, true, true),
            Opcode::SPUT_OBJECT => self.verify_field_access(&inst, opcode, false, true, true),

            Opcode::INVOKE_VIRTUAL
            | Opcode::INVOKE_VIRTUAL_RANGE
            | Opcode::INVOKE_SUPER
            | Opcode::INVOKE_SUPER_RANGE => {
                let is_range = matches!(
                    opcode,
                    Opcode::INVOKE_VIRTUAL_RANGE | Opcode::INVOKE_SUPER_RANGE
                );
                let is_super =
                    matches!(opcode, Opcode::INVOKE_SUPER | Opcode::INVOKE_SUPER_RANGE);
                let method_type = if is_super {
                    MethodType::Super
                } else {
                    MethodType::Virtual
                };
                let _ = self.verify_invocation_args(&inst, method_type, is_range);
                if self.have_pending_hard_failure {
                    return false;
                }
                let return_type = self.invoke_return_type(MethodIndex::new(inst.vreg_b()));
                self.set_result_from_type(return_type);
                just_set_result = true;
            }
            Opcode::INVOKE_DIRECT | Opcode::INVOKE_DIRECT_RANGE => {
                let is_range = opcode == Opcode::INVOKE_DIRECT_RANGE;
                let called = self.verify_invocation_args(&inst, MethodType::Direct, is_range);
                if self.have_pending_hard_failure {
                    return false;
                }
                let method_idx = MethodIndex::new(inst.vreg_b());
                let is_constructor = match &called {
                    Some(method) => method.is_any_constructor(),
                    None => self.method_name(method_idx) == "<init>",
                };
                if is_constructor {
                    let this_id = self.get_invocation_this(&inst);
                    let this_kind = self.reg_types.kind_of(this_id);
                    if matches!(this_kind, Kind::Conflict) {
                        return false;
                    }
                    if this_kind.is_zero_or_null() {
                        self.fail(
                            ErrorKind::BadClassHard,
                            "unable to initialize null ref".to_owned(),
                        );
                        return false;
                    }
                    if !this_kind.is_uninitialized_types() {
                        let message = format!(
                            "Expected initialization on uninitialized reference {}",
                            self.reg_types.dump(this_id)
                        );
                        self.fail(ErrorKind::BadClassHard, message);
                        return false;
                    }
                    // Constructors are never inherited, so the target class
                    // should be the receiver's class or its direct
                    // superclass. Bytecode optimizers inline constructor
                    // chains, though, so that check is deliberately left
                    // out for compatibility.
                    self.work_line
                        .mark_refs_as_initialized(&self.reg_types, inst.vreg_c());
                }
                let return_type = self.invoke_return_type(method_idx);
                self.set_result_from_type(return_type);
                just_set_result = true;
            }
            Opcode::INVOKE_STATIC | Opcode::INVOKE_STATIC_RANGE => {
                let is_range = opcode == Opcode::INVOKE_STATIC_RANGE;
                let _ = self.verify_invocation_args(&inst, MethodType::Static, is_range);
                if self.have_pending_hard_failure {
                    return false;
                }
                let return_type = self.invoke_return_type(MethodIndex::new(inst.vreg_b()));
                self.set_result_from_type(return_type);
                just_set_result = true;
            }
            Opcode::INVOKE_INTERFACE | Opcode::INVOKE_INTERFACE_RANGE => {
                let is_range = opcode == Opcode::INVOKE_INTERFACE_RANGE;
                let called = self.verify_invocation_args(&inst, MethodType::Interface, is_range);
                if self.have_pending_hard_failure {
                    return false;
                }
                if let Some(method) = &called {
                    let called_interface = method.declaring_class;
                    if !called_interface.is_interface() && !called_interface.is_object_class() {
                        let message = format!(
                            "expected interface class in invoke-interface '{}'",
                            method.name
                        );
                        self.fail(ErrorKind::ClassChange, message);
                    }
                }
                if !self.have_pending_hard_failure {
                    // A null receiver always passes here and always fails
                    // at runtime. An imprecise interface join means no
                    // stronger receiver check is possible.
                    let this_id = self.get_invocation_this(&inst);
                    let this_kind = self.reg_types.kind_of(this_id);
                    if matches!(this_kind, Kind::Conflict) {
                        return false;
                    }
                    if !this_kind.is_zero_or_null() && this_kind.is_uninitialized_types() {
                        let message = format!(
                            "interface call on uninitialized object {}",
                            self.reg_types.dump(this_id)
                        );
                        self.fail(ErrorKind::BadClassHard, message);
                        return false;
                    }
                    let return_type = self.invoke_return_type(MethodIndex::new(inst.vreg_b()));
                    self.set_result_from_type(return_type);
                    just_set_result = true;
                }
            }
            Opcode::INVOKE_POLYMORPHIC | Opcode::INVOKE_POLYMORPHIC_RANGE => {
                let is_range = opcode == Opcode::INVOKE_POLYMORPHIC_RANGE;
                let called = self.verify_invocation_args(&inst, MethodType::Polymorphic, is_range);
                match called {
                    None => {
                        // Promote soft failures to hard errors for the
                        // polymorphic invokes.
                        let message = self
                            .failures
                            .last()
                            .map(|f| f.message.clone())
                            .unwrap_or_else(|| {
                                "invoke-polymorphic verification failure.".to_owned()
                            });
                        self.fail(ErrorKind::BadClassHard, message);
                        return false;
                    }
                    Some(called) => {
                        if !self.check_signature_polymorphic_method(&called)
                            || !self.check_signature_polymorphic_receiver(&inst)
                        {
                            debug_assert!(!self.failures.is_empty());
                            if self.have_pending_hard_failure {
                                return false;
                            }
                        } else {
                            let proto_idx =
                                dex_types::ProtoIndex::new(inst.vreg_h() as u16);
                            let return_idx = self.resolver.proto(proto_idx).return_type_idx;
                            let return_type = self.reg_types.from_type_index(return_idx);
                            self.set_result_from_type(return_type);
                            just_set_result = true;
                        }
                    }
                }
            }
            Opcode::INVOKE_CUSTOM | Opcode::INVOKE_CUSTOM_RANGE => {
                let is_range = opcode == Opcode::INVOKE_CUSTOM_RANGE;
                let call_site_idx = dex_types::CallSiteIndex::new(inst.vreg_b());
                if self.check_call_site(call_site_idx) {
                    // The arguments must match the call-site prototype; the
                    // method handle is not known yet, so treat the call as
                    // static.
                    let proto = self.resolver.proto(site_proto(self.resolver, call_site_idx));
                    self.verify_invocation_args_from_params(
                        &proto.param_type_idxs,
                        &inst,
                        MethodType::Static,
                        is_range,
                        None,
                    );
                    if self.have_pending_hard_failure {
                        return false;
                    }
                    let return_type = self.reg_types.from_type_index(proto.return_type_idx);
                    self.set_result_from_type(return_type);
                    just_set_result = true;
                } else {
                    debug_assert!(!self.failures.is_empty());
                    if self.have_pending_hard_failure {
                        return false;
                    }
                }
            }

            Opcode::NEG_INT | Opcode::NOT_INT => {
                if !self.check_unary_op(&inst, Kind::Integer, Kind::Integer) {
                    return false;
                }
            }
            Opcode::NEG_LONG | Opcode::NOT_LONG => {
                if !self.check_unary_op_wide(&inst, Kind::LongLo, Kind::LongLo) {
                    return false;
                }
            }
            Opcode::NEG_FLOAT => {
                if !self.check_unary_op(&inst, Kind::Float, Kind::Float) {
                    return false;
                }
            }
            Opcode::NEG_DOUBLE => {
                if !self.check_unary_op_wide(&inst, Kind::DoubleLo, Kind::DoubleLo) {
                    return false;
                }
            }
            Opcode::INT_TO_LONG => {
                if !self.check_unary_op_to_wide(&inst, Kind::LongLo, Kind::Integer) {
                    return false;
                }
            }
            Opcode::INT_TO_FLOAT => {
                if !self.check_unary_op(&inst, Kind::Float, Kind::Integer) {
                    return false;
                }
            }
            Opcode::INT_TO_DOUBLE => {
                if !self.check_unary_op_to_wide(&inst, Kind::DoubleLo, Kind::Integer) {
                    return false;
                }
            }
            Opcode::LONG_TO_INT => {
                if !self.check_unary_op_from_wide(&inst, Kind::Integer, Kind::LongLo) {
                    return false;
                }
            }
            Opcode::LONG_TO_FLOAT => {
                if !self.check_unary_op_from_wide(&inst, Kind::Float, Kind::LongLo) {
                    return false;
                }
            }
            Opcode::LONG_TO_DOUBLE => {
                if !self.check_unary_op_wide(&inst, Kind::DoubleLo, Kind::LongLo) {
                    return false;
                }
            }
            Opcode::FLOAT_TO_INT => {
                if !self.check_unary_op(&inst, Kind::Integer, Kind::Float) {
                    return false;
                }
            }
            Opcode::FLOAT_TO_LONG => {
                if !self.check_unary_op_to_wide(&inst, Kind::LongLo, Kind::Float) {
                    return false;
                }
            }
            Opcode::FLOAT_TO_DOUBLE => {
                if !self.check_unary_op_to_wide(&inst, Kind::DoubleLo, Kind::Float) {
                    return false;
                }
            }
            Opcode::DOUBLE_TO_INT => {
                if !self.check_unary_op_from_wide(&inst, Kind::Integer, Kind::DoubleLo) {
                    return false;
                }
            }
            Opcode::DOUBLE_TO_LONG => {
                if !self.check_unary_op_wide(&inst, Kind::LongLo, Kind::DoubleLo) {
                    return false;
                }
            }
            Opcode::DOUBLE_TO_FLOAT => {
                if !self.check_unary_op_from_wide(&inst, Kind::Float, Kind::DoubleLo) {
                    return false;
                }
            }
            Opcode::INT_TO_BYTE => {
                if !self.check_unary_op(&inst, Kind::Byte, Kind::Integer) {
                    return false;
                }
            }
            Opcode::INT_TO_CHAR => {
                if !self.check_unary_op(&inst, Kind::Char, Kind::Integer) {
                    return false;
                }
            }
            Opcode::INT_TO_SHORT => {
                if !self.check_unary_op(&inst, Kind::Short, Kind::Integer) {
                    return false;
                }
            }

            Opcode::ADD_INT
            | Opcode::SUB_INT
            | Opcode::MUL_INT
            | Opcode::REM_INT
            | Opcode::DIV_INT
            | Opcode::SHL_INT
            | Opcode::SHR_INT
            | Opcode::USHR_INT => {
                if !self.check_binary_op(&inst, Kind::Integer, Kind::Integer, Kind::Integer, false)
                {
                    return false;
                }
            }
            Opcode::AND_INT | Opcode::OR_INT | Opcode::XOR_INT => {
                if !self.check_binary_op(&inst, Kind::Integer, Kind::Integer, Kind::Integer, true)
                {
                    return false;
                }
            }
            Opcode::ADD_LONG
            | Opcode::SUB_LONG
            | Opcode::MUL_LONG
            | Opcode::DIV_LONG
            | Opcode::REM_LONG
            | Opcode::AND_LONG
            | Opcode::OR_LONG
            | Opcode::XOR_LONG => {
                if !self.check_binary_op_wide(&inst, Kind::LongLo, Kind::LongLo, Kind::LongLo) {
                    return false;
                }
            }
            Opcode::SHL_LONG | Opcode::SHR_LONG | Opcode::USHR_LONG => {
                // The shift distance is an int, unlike the other long ops.
                if !self.check_binary_op_wide_shift(&inst, Kind::LongLo, Kind::Integer) {
                    return false;
                }
            }
            Opcode::ADD_FLOAT
            | Opcode::SUB_FLOAT
            | Opcode::MUL_FLOAT
            | Opcode::DIV_FLOAT
            | Opcode::REM_FLOAT => {
                if !self.check_binary_op(&inst, Kind::Float, Kind::Float, Kind::Float, false) {
                    return false;
                }
            }
            Opcode::ADD_DOUBLE
            | Opcode::SUB_DOUBLE
            | Opcode::MUL_DOUBLE
            | Opcode::DIV_DOUBLE
            | Opcode::REM_DOUBLE => {
                if !self.check_binary_op_wide(&inst, Kind::DoubleLo, Kind::DoubleLo, Kind::DoubleLo)
                {
                    return false;
                }
            }

            Opcode::ADD_INT_2ADDR
            | Opcode::SUB_INT_2ADDR
            | Opcode::MUL_INT_2ADDR
            | Opcode::REM_INT_2ADDR
            | Opcode::SHL_INT_2ADDR
            | Opcode::SHR_INT_2ADDR
            | Opcode::USHR_INT_2ADDR
            | Opcode::DIV_INT_2ADDR => {
                if !self
                    .check_binary_op_2addr(&inst, Kind::Integer, Kind::Integer, Kind::Integer, false)
                {
                    return false;
                }
            }
            Opcode::AND_INT_2ADDR | Opcode::OR_INT_2ADDR | Opcode::XOR_INT_2ADDR => {
                if !self
                    .check_binary_op_2addr(&inst, Kind::Integer, Kind::Integer, Kind::Integer, true)
                {
                    return false;
                }
            }
            Opcode::ADD_LONG_2ADDR
            | Opcode::SUB_LONG_2ADDR
            | Opcode::MUL_LONG_2ADDR
            | Opcode::DIV_LONG_2ADDR
            | Opcode::REM_LONG_2ADDR
            | Opcode::AND_LONG_2ADDR
            | Opcode::OR_LONG_2ADDR
            | Opcode::XOR_LONG_2ADDR => {
                if !self.check_binary_op_2addr_wide(&inst, Kind::LongLo, Kind::LongLo, Kind::LongLo)
                {
                    return false;
                }
            }
            Opcode::SHL_LONG_2ADDR | Opcode::SHR_LONG_2ADDR | Opcode::USHR_LONG_2ADDR => {
                if !self.check_binary_op_2addr_wide_shift(&inst, Kind::LongLo, Kind::Integer) {
                    return false;
                }
            }
            Opcode::ADD_FLOAT_2ADDR
            | Opcode::SUB_FLOAT_2ADDR
            | Opcode::MUL_FLOAT_2ADDR
            | Opcode::DIV_FLOAT_2ADDR
            | Opcode::REM_FLOAT_2ADDR => {
                if !self.check_binary_op_2addr(&inst, Kind::Float, Kind::Float, Kind::Float, false)
                {
                    return false;
                }
            }
            Opcode::ADD_DOUBLE_2ADDR
            | Opcode::SUB_DOUBLE_2ADDR
            | Opcode::MUL_DOUBLE_2ADDR
            | Opcode::DIV_DOUBLE_2ADDR
            | Opcode::REM_DOUBLE_2ADDR => {
                if !self.check_binary_op_2addr_wide(
                    &inst,
                    Kind::DoubleLo,
                    Kind::DoubleLo,
                    Kind::DoubleLo,
                ) {
                    return false;
                }
            }

            Opcode::ADD_INT_LIT16
            | Opcode::RSUB_INT
            | Opcode::MUL_INT_LIT16
            | Opcode::DIV_INT_LIT16
            | Opcode::REM_INT_LIT16 => {
                if !self.check_literal_op(&inst, Kind::Integer, Kind::Integer, false) {
                    return false;
                }
            }
            Opcode::AND_INT_LIT16 | Opcode::OR_INT_LIT16 | Opcode::XOR_INT_LIT16 => {
                if !self.check_literal_op(&inst, Kind::Integer, Kind::Integer, true) {
                    return false;
                }
            }
            Opcode::ADD_INT_LIT8
            | Opcode::RSUB_INT_LIT8
            | Opcode::MUL_INT_LIT8
            | Opcode::DIV_INT_LIT8
            | Opcode::REM_INT_LIT8
            | Opcode::SHL_INT_LIT8
            | Opcode::SHR_INT_LIT8
            | Opcode::USHR_INT_LIT8 => {
                if !self.check_literal_op(&inst, Kind::Integer, Kind::Integer, false) {
                    return false;
                }
            }
            Opcode::AND_INT_LIT8 | Opcode::OR_INT_LIT8 | Opcode::XOR_INT_LIT8 => {
                if !self.check_literal_op(&inst, Kind::Integer, Kind::Integer, true) {
                    return false;
                }
            }

            // These never appear in verifiable code; the static pass has
            // already rejected them.
            _ => {
                self.fail(
                    ErrorKind::BadClassHard,
                    format!("Unexpected opcode {}", opcode.name()),
                );
                return false;
            }
        }

        if self.have_pending_hard_failure {
            return false;
        }
        if self.have_pending_runtime_throw_failure {
            debug!(dex_pc = self.work_insn_idx, "elevating opcode flags to throw");
            // The checking interpreter will throw; treat the following code
            // as unreachable. The flag itself is cleared at the very end
            // because return checking may still raise locking errors.
            opcode_flags = OpFlags::THROW;
        }

        // Invalidate the result registers unless this instruction set them,
        // so move-result is only valid immediately after.
        if !just_set_result {
            self.work_line.set_result_type_to_unknown();
        }

        // Branch: merge into the target.
        let mut branch_target: i32 = 0;
        if opcode_flags.contains(OpFlags::BRANCH) {
            let (offset, conditional) = self.branch_offset_of(self.work_insn_idx);
            branch_target = offset;
            debug_assert_eq!(conditional, opcode_flags.contains(OpFlags::CONTINUE));
            let target = self.work_insn_idx.wrapping_add(branch_target as u32);
            let ok = match &mut branch_line {
                Some(line) => {
                    let lock_failure = Self::update_registers_impl(
                        &mut self.reg_table,
                        &mut self.insn_flags,
                        &mut self.reg_types,
                        target,
                        line,
                        false,
                    );
                    self.report_merge_lock_failure(lock_failure)
                }
                None => self.update_registers_from_work_line(target, false),
            };
            if !ok {
                return false;
            }
        }

        // Switch: merge into every target.
        if opcode_flags.contains(OpFlags::SWITCH) {
            let payload_offset = inst.branch_offset();
            let payload_pc = self.work_insn_idx.wrapping_add(payload_offset as u32) as usize;
            let switch_count = code.insns[payload_pc + 1] as u32;
            let targets_offset = if code.insns[payload_pc] == dex_asm::PACKED_SWITCH_SIGNATURE {
                4
            } else {
                2 + 2 * switch_count
            };
            for target in 0..switch_count {
                let unit = payload_pc + (targets_offset + target * 2) as usize;
                let offset =
                    (code.insns[unit] as u32 | (code.insns[unit + 1] as u32) << 16) as i32;
                let abs_offset = self.work_insn_idx.wrapping_add(offset as u32);
                debug_assert!(abs_offset < self.insns_size());
                if !self.update_registers_from_work_line(abs_offset, false) {
                    return false;
                }
            }
        }

        // Throw inside a try block: merge the saved pre-instruction state
        // into every reachable handler.
        if opcode_flags.contains(OpFlags::THROW)
            && self.insn_flags[self.work_insn_idx as usize].contains(InsnFlags::IN_TRY)
        {
            if !self.propagate_to_handlers(opcode) {
                return false;
            }
        }

        // Fall through to the next instruction.
        if opcode_flags.contains(OpFlags::CONTINUE) {
            let next_insn_idx = self.work_insn_idx + inst.size_in_code_units();
            if let Some(line) = &fallthrough_line {
                // Adopt the peephole-refined fall-through state.
                self.work_line.copy_from(line);
            }
            if !self.handle_fall_through(next_insn_idx) {
                return false;
            }
        }

        // Returning from the method requires an empty monitor stack.
        if opcode_flags.contains(OpFlags::RETURN) && !self.work_line.verify_monitor_stack_empty() {
            self.fail_no_exc(ErrorKind::Locking, "expected empty monitor stack".to_owned());
        }

        // Advance the guess to the next instruction or the branch target;
        // returns and throws leave it for the caller.
        if opcode_flags.contains(OpFlags::CONTINUE) {
            *start_guess = self.work_insn_idx + inst.size_in_code_units();
        } else if opcode_flags.contains(OpFlags::BRANCH) {
            *start_guess = self.work_insn_idx.wrapping_add(branch_target as u32);
        }
        debug_assert!(*start_guess < self.insns_size());
        debug_assert!(self.insn_flags[*start_guess as usize].contains(InsnFlags::OPCODE));

        if self.have_pending_runtime_throw_failure {
            self.fail_runtime_throw();
            self.have_pending_runtime_throw_failure = false;
        }
        true
    }

    fn check_constructor_return(&mut self) -> bool {
        if !self.is_instance_constructor() {
            return true;
        }
        if !self.work_line.check_constructor_return(&self.reg_types) {
            self.fail(
                ErrorKind::BadClassHard,
                "Constructor returning without calling superclass constructor".to_owned(),
            );
            return false;
        }
        true
    }

    /// Merge the saved line into every handler of the covering try block
    /// and enforce the catch-all requirement while monitors are held.
    fn propagate_to_handlers(&mut self, opcode: Opcode) -> bool {
        let code = self.code;
        let try_item = code
            .tries
            .iter()
            .find(|item| item.covers(self.work_insn_idx))
            .expect("in-try instruction without covering try item");
        let handlers = &code.handlers[try_item.handler_index];
        let mut has_catch_all_handler = false;
        for handler in handlers {
            match handler.type_idx {
                None => has_catch_all_handler = true,
                Some(type_idx) => {
                    // java.lang.Throwable is as good as a catch-all.
                    // Unresolved exception classes are ignored by exception
                    // delivery, so resolution failures are tolerated here.
                    if let Some(klass) = self.resolver.resolve_type(type_idx) {
                        if klass.descriptor() == "Ljava/lang/Throwable;" {
                            has_catch_all_handler = true;
                        }
                    }
                }
            }
            // Merge the saved state, not the working state: at runtime the
            // exception is thrown before the instruction changes anything.
            if !self.update_registers_from_saved_line(handler.address) {
                return false;
            }
        }

        // With a monitor held, a throwing instruction needs a catch-all so
        // the lock is provably released. A monitor-enter that just pushed
        // the first monitor throws before acquiring it.
        if self.work_line.monitor_stack_depth() > 0 && !has_catch_all_handler {
            let first_monitor_enter =
                opcode == Opcode::MONITOR_ENTER && self.work_line.monitor_stack_depth() == 1;
            if !first_monitor_enter {
                self.fail(
                    ErrorKind::BadClassHard,
                    "expected to be within a catch-all for an instruction where a monitor is held"
                        .to_owned(),
                );
                return false;
            }
        }
        true
    }

    /// `monitor-enter`, including the aliasing peepholes for a preceding
    /// `move-object` or a pair of identical `const-class` instructions.
    fn verify_monitor_enter(&mut self, inst: &Instruction<'_>) -> bool {
        let vreg = inst.vreg_a();
        let reg_id = self.work_line.reg_id(vreg);
        let reg_kind = self.reg_types.kind_of(reg_id);
        if !reg_kind.is_reference_types() {
            let message = format!(
                "monitor-enter on non-object ({})",
                self.reg_types.dump(reg_id)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        if let Err(message) = self.work_line.push_monitor(vreg, reg_kind, self.work_insn_idx) {
            self.fail(ErrorKind::Locking, message);
        }

        // An immediately preceding move-object into or out of the locked
        // register creates lock aliasing the map has to know about.
        if self.work_insn_idx == 0
            || self.insn_flags[self.work_insn_idx as usize].contains(InsnFlags::BRANCH_TARGET)
        {
            return true;
        }
        let prev_idx = self.previous_opcode_pc(self.work_insn_idx);
        let prev_inst = self.instruction_at(prev_idx);
        match prev_inst.opcode() {
            Opcode::MOVE_OBJECT | Opcode::MOVE_OBJECT_16 | Opcode::MOVE_OBJECT_FROM16 => {
                if prev_inst.vreg_b() == vreg {
                    // Redo the copy; the types are unchanged but the lock
                    // status of the alias is updated.
                    self.work_line
                        .copy_reference(prev_inst.vreg_a(), vreg, reg_id);
                }
            }
            Opcode::CONST_CLASS => {
                // Two consecutive const-class instructions naming the same
                // type link two registers to the same Class object.
                if prev_idx == 0
                    || self.insn_flags[prev_idx as usize].contains(InsnFlags::BRANCH_TARGET)
                {
                    return true;
                }
                let prev2_idx = self.previous_opcode_pc(prev_idx);
                let prev2_inst = self.instruction_at(prev2_idx);
                if prev2_inst.opcode() != Opcode::CONST_CLASS {
                    return true;
                }
                if prev_inst.vreg_b() != prev2_inst.vreg_b() {
                    return true;
                }
                let prev_vreg_a = prev_inst.vreg_a();
                let prev2_vreg_a = prev2_inst.vreg_a();
                if prev_vreg_a == vreg {
                    self.work_line.copy_reference(prev2_vreg_a, vreg, reg_id);
                } else if prev2_vreg_a == vreg {
                    self.work_line.copy_reference(prev_vreg_a, vreg, reg_id);
                }
            }
            _ => {}
        }
        true
    }

    /// `check-cast` and `instance-of`.
    fn verify_check_cast_or_instance_of(&mut self, inst: &Instruction<'_>, opcode: Opcode) -> bool {
        let is_checkcast = opcode == Opcode::CHECK_CAST;
        let type_idx = TypeIndex::new(if is_checkcast {
            inst.vreg_b() as u16
        } else {
            inst.vreg_c() as u16
        });
        let res_type = self.resolve_class(type_idx, CheckAccess::Yes);
        let res_kind = self.reg_types.kind_of(res_type);
        if matches!(res_kind, Kind::Conflict) {
            // A primitive type here is structurally broken; a broken
            // descriptor was already reported and leaves a boolean result.
            if let Some(klass) = self.resolver.resolve_type(type_idx) {
                if klass.is_primitive() {
                    let descriptor = self.resolver.type_descriptor(type_idx).to_owned();
                    self.fail(
                        ErrorKind::BadClassHard,
                        format!("using primitive type {descriptor} in instanceof"),
                    );
                    return false;
                }
            }
            debug_assert!(!self.failures.is_empty());
            if !is_checkcast {
                self.work_line.set_register_kind(inst.vreg_a(), Kind::Boolean);
            }
            return true;
        }
        let orig_type_reg = if is_checkcast {
            inst.vreg_a()
        } else {
            inst.vreg_b()
        };
        let orig_kind = self.reg_kind_of(orig_type_reg);
        if !res_kind.is_non_zero_reference_types() {
            let message = format!(
                "{} on unexpected class {}",
                opcode.name(),
                self.reg_types.dump(res_type)
            );
            self.fail(ErrorKind::BadClassHard, message);
            false
        } else if !orig_kind.is_reference_types() {
            let message = format!("{} on non-reference in v{orig_type_reg}", opcode.name());
            self.fail(ErrorKind::BadClassHard, message);
            false
        } else if orig_kind.is_uninitialized_types() {
            let message = format!(
                "{} on uninitialized reference in v{orig_type_reg}",
                opcode.name()
            );
            self.fail(ErrorKind::BadClassHard, message);
            false
        } else {
            if is_checkcast {
                self.work_line
                    .set_register_type(LockOp::Keep, inst.vreg_a(), res_type);
            } else {
                self.work_line.set_register_kind(inst.vreg_a(), Kind::Boolean);
            }
            true
        }
    }

    /// `move-exception`: compute the union of the exception types every
    /// covering handler delivers here. Returns success and whether the
    /// handler body should be skipped (legacy unreachable-handler path).
    fn handle_move_exception(&mut self, inst: &Instruction<'_>) -> (bool, bool) {
        // A move-exception as the first instruction would make the handler
        // entry reachable without an exception.
        if self.work_insn_idx == 0 {
            self.fail(ErrorKind::BadClassHard, "move-exception at pc 0x0".to_owned());
            return (false, false);
        }
        let code = self.code;
        let mut common_super: Option<CacheId> = None;
        let mut unresolved: Option<CacheId> = None;
        let throwable = self.reg_types.java_lang_throwable();
        for handlers in &code.handlers {
            for handler in handlers {
                if handler.address != self.work_insn_idx {
                    continue;
                }
                match handler.type_idx {
                    None => common_super = Some(throwable),
                    Some(type_idx) => {
                        // Access is only checked on resolved exception
                        // classes.
                        let exception =
                            self.resolve_class(type_idx, CheckAccess::OnResolvedClass);
                        if !self.is_assignable_from(throwable, exception) {
                            debug_assert!(
                                !self.reg_types.kind_of(exception).is_uninitialized_types()
                            );
                            if self.reg_types.kind_of(exception).is_unresolved_types() {
                                unresolved = Some(match unresolved {
                                    None => exception,
                                    Some(prev) => self.reg_types.safe_merge(prev, exception),
                                });
                            } else {
                                let message = format!(
                                    "unexpected non-throwable class {}",
                                    self.reg_types.dump(exception)
                                );
                                self.fail(ErrorKind::BadClassHard, message);
                                return (false, false);
                            }
                        } else {
                            match common_super {
                                None => common_super = Some(exception),
                                Some(prev) if prev == exception => {}
                                Some(prev) => {
                                    let merged = self.reg_types.merge(prev, exception);
                                    if !self.is_assignable_from(throwable, merged) {
                                        self.fail(
                                            ErrorKind::BadClassHard,
                                            "java.lang.Throwable is not assignable-from common_super"
                                                .to_owned(),
                                        );
                                        return (false, false);
                                    }
                                    common_super = Some(merged);
                                }
                            }
                        }
                    }
                }
            }
        }
        let mut skip_handler = false;
        let reg_type = match (unresolved, common_super) {
            (Some(unresolved), maybe_common) => {
                // Soft-fail without a synthetic throw.
                self.fail_no_exc(
                    ErrorKind::UnresolvedTypeCheck,
                    "Unresolved catch handler".to_owned(),
                );
                match maybe_common {
                    Some(common) => self.reg_types.merge(unresolved, common),
                    None => {
                        if !self.options.aot_mode
                            && !self.options.api_level_at_least(SDK_S_V2)
                        {
                            // The handler is unreachable at runtime. Legacy
                            // api levels skip verifying it entirely, but the
                            // method must be marked throwing so the
                            // compiler leaves it to the interpreter.
                            self.fail_runtime_throw();
                            skip_handler = true;
                        }
                        unresolved
                    }
                }
            }
            (None, None) => {
                self.fail(
                    ErrorKind::BadClassHard,
                    "unable to find exception handler".to_owned(),
                );
                return (false, false);
            }
            (None, Some(common)) => {
                if let Some(klass) = self.reg_type_class(common) {
                    self.check_for_final_abstract_class(klass);
                }
                common
            }
        };
        self.work_line
            .set_register_type(LockOp::Clear, inst.vreg_a(), reg_type);
        (true, skip_handler)
    }

    /// The receiver of a non-static invocation: argument count in vA, the
    /// receiver in vC.
    pub(crate) fn get_invocation_this(&mut self, inst: &Instruction<'_>) -> CacheId {
        if inst.vreg_a() < 1 {
            self.fail(ErrorKind::BadClassHard, "invoke lacks 'this'".to_owned());
            return id_for_kind(Kind::Conflict);
        }
        // The first argument register is vC in both the packed and the
        // range encodings.
        let this_reg = inst.vreg_c();
        let this_id = self.work_line.reg_id(this_reg);
        if !self.reg_types.kind_of(this_id).is_reference_types() {
            let message = format!(
                "tried to get class from non-reference register v{this_reg} (type={})",
                self.reg_types.dump(this_id)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return id_for_kind(Kind::Conflict);
        }
        this_id
    }

    /// The dex pc of the closest instruction start at or before `pc - 1`.
    fn previous_opcode_pc(&self, pc: DexPc) -> DexPc {
        let mut prev = pc - 1;
        while prev != 0 && !self.insn_flags[prev as usize].contains(InsnFlags::OPCODE) {
            prev -= 1;
        }
        debug_assert!(self.insn_flags[prev as usize].contains(InsnFlags::OPCODE));
        prev
    }

    /// The `instance-of`/`if-eqz`-family peephole: on the branch edge that
    /// proves the test, sharpen the tested register (and the source of a
    /// preceding `move-object`) to the tested type.
    fn instance_of_peephole(
        &mut self,
        inst: &Instruction<'_>,
        opcode: Opcode,
        branch_line: &mut Option<RegisterLine>,
        fallthrough_line: &mut Option<RegisterLine>,
    ) {
        if self.work_insn_idx == 0 {
            return;
        }
        let instance_of_idx = self.previous_opcode_pc(self.work_insn_idx);
        let instance_of_inst = self.instruction_at(instance_of_idx);

        // The pattern breaks when the branch has other predecessors or the
        // test clobbers its own source.
        if self.insn_flags[self.work_insn_idx as usize].contains(InsnFlags::BRANCH_TARGET)
            || instance_of_inst.opcode() != Opcode::INSTANCE_OF
            || inst.vreg_a() != instance_of_inst.vreg_a()
            || instance_of_inst.vreg_a() == instance_of_inst.vreg_b()
        {
            return;
        }

        // Skip imprecise or no-information cases: unresolved types on
        // either side, interfaces (treated as Object anyway), a known-null
        // source, and sharpenings that would lose information relevant to
        // later checks. Access is deliberately not checked; a failure would
        // mark a runtime throw at the branch rather than the instance-of.
        let orig_id = self.work_line.reg_id(instance_of_inst.vreg_b());
        let cast_id = self.resolve_class_no_access_check(TypeIndex::new(
            instance_of_inst.vreg_c() as u16,
        ));
        let orig_kind = self.reg_types.kind_of(orig_id);
        let cast_kind = self.reg_types.kind_of(cast_id);
        let cast_has_class = self.reg_types.get(cast_id).has_class();
        if orig_id == cast_id
            || cast_kind.is_unresolved_types()
            || orig_kind.is_unresolved_types()
            || !cast_has_class
            || self.reg_types.get(cast_id).class().is_interface()
            || orig_kind.is_zero_or_null()
        {
            return;
        }
        let merged = self.reg_types.merge(cast_id, orig_id);
        if !self.is_strictly_assignable_from(orig_id, merged) {
            return;
        }

        let mut update_line = RegisterLine::new(self.code.registers_size as usize);
        update_line.copy_from(&self.work_line);
        update_line.set_register_type(LockOp::Keep, instance_of_inst.vreg_b(), cast_id);

        // A move-object often feeds instance-of thanks to its small
        // register encoding; propagate the sharpened type to the move
        // source as long as it was not clobbered.
        if !self.insn_flags[instance_of_idx as usize].contains(InsnFlags::BRANCH_TARGET)
            && instance_of_idx != 0
        {
            let move_idx = self.previous_opcode_pc(instance_of_idx);
            let move_inst = self.instruction_at(move_idx);
            if move_inst.opcode().is_move_object() {
                let move_src = move_inst.vreg_b();
                let move_dst = move_inst.vreg_a();
                if move_dst == instance_of_inst.vreg_b()
                    && move_src != instance_of_inst.vreg_a()
                {
                    update_line.set_register_type(LockOp::Keep, move_src, cast_id);
                }
            }
        }

        if opcode == Opcode::IF_EQZ {
            *fallthrough_line = Some(update_line);
        } else {
            *branch_line = Some(update_line);
        }
    }
}

/// The prototype a call site's method type names.
fn site_proto<R: ClassResolver>(
    resolver: &R,
    call_site_idx: dex_types::CallSiteIndex,
) -> dex_types::ProtoIndex {
    resolver
        .call_site(call_site_idx)
        .expect("call site checked before use")
        .proto_idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(i32::MIN, Kind::IntegerConstant)]
    #[case(-32769, Kind::IntegerConstant)]
    #[case(-32768, Kind::ShortConstant)]
    #[case(-129, Kind::ShortConstant)]
    #[case(-128, Kind::ByteConstant)]
    #[case(-1, Kind::ByteConstant)]
    #[case(0, Kind::Zero)]
    #[case(1, Kind::BooleanConstant)]
    #[case(2, Kind::PositiveByteConstant)]
    #[case(127, Kind::PositiveByteConstant)]
    #[case(128, Kind::PositiveShortConstant)]
    #[case(32767, Kind::PositiveShortConstant)]
    #[case(32768, Kind::CharConstant)]
    #[case(65535, Kind::CharConstant)]
    #[case(65536, Kind::IntegerConstant)]
    #[case(i32::MAX, Kind::IntegerConstant)]
    fn constant_classification_boundaries(#[case] value: i32, #[case] expected: Kind) {
        assert_eq!(determine_cat1_constant(value), expected);
    }
}
