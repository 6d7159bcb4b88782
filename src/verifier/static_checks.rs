//! Widths pass, try/catch scan and the static per-instruction pass.

use dex_asm::{Instruction, Opcode, VerifyA, VerifyB, VerifyC, VerifyExtra, VerifyH};
use dex_types::{
    CallSiteIndex, DexPc, FieldIndex, MethodHandleIndex, MethodIndex, StringIndex, TypeIndex,
};

use super::flags::InsnFlags;
use super::MethodVerifier;
use crate::error::ErrorKind;
use crate::resolver::ClassResolver;

impl<'a, R: ClassResolver> MethodVerifier<'a, R> {
    /// Walk the code-unit stream, computing the width of the instruction at
    /// each address and flagging instruction starts. Fails hard when an
    /// instruction would run past the end of the code.
    pub(crate) fn compute_widths_and_count_ops(&mut self) -> bool {
        let insns_size = self.insns_size();
        let mut dex_pc: u32 = 0;
        while dex_pc != insns_size {
            let remaining = insns_size - dex_pc;
            let inst = Instruction::at(&self.code.insns, dex_pc);
            let inst_data = inst.inst_data();
            let opcode = inst.opcode();
            let instruction_size;
            let ok;
            if opcode == Opcode::NOP {
                match inst_data {
                    dex_asm::PACKED_SWITCH_SIGNATURE => {
                        (instruction_size, ok) =
                            Self::check_switch_payload_size(&inst, remaining, 4, 2);
                    }
                    dex_asm::SPARSE_SWITCH_SIGNATURE => {
                        (instruction_size, ok) =
                            Self::check_switch_payload_size(&inst, remaining, 2, 4);
                    }
                    dex_asm::ARRAY_DATA_SIGNATURE => {
                        if remaining < 4 {
                            instruction_size = 0;
                            ok = false;
                        } else {
                            let element_size = inst.fetch(1) as u64;
                            let length =
                                inst.fetch(2) as u64 | (inst.fetch(3) as u64) << 16;
                            // 64-bit arithmetic avoids overflow for huge
                            // declared lengths.
                            let bytes = element_size * length;
                            let code_units = 4 + (bytes + 1) / 2;
                            if code_units > remaining as u64 {
                                instruction_size = 0;
                                ok = false;
                            } else {
                                instruction_size = code_units as u32;
                                ok = true;
                            }
                        }
                    }
                    _ => {
                        instruction_size = 1;
                        ok = true;
                    }
                }
            } else {
                instruction_size = opcode.format().size_in_code_units();
                ok = instruction_size <= remaining;
            }
            if !ok {
                self.fail(
                    ErrorKind::BadClassHard,
                    format!("code did not end where expected ({dex_pc} vs. {insns_size})"),
                );
                return false;
            }
            self.insn_flags[dex_pc as usize] |= InsnFlags::OPCODE;
            debug_assert!(instruction_size != 0);
            dex_pc += instruction_size;
        }
        debug_assert!(self.insn_flags[0].contains(InsnFlags::OPCODE));
        true
    }

    fn check_switch_payload_size(
        inst: &Instruction<'_>,
        remaining: u32,
        base_size: u32,
        entry_size: u32,
    ) -> (u32, bool) {
        if base_size > remaining {
            return (0, false);
        }
        // This cannot overflow: the entry count is a single code unit.
        let num_entries = inst.fetch(1) as u32;
        let instruction_size = base_size + num_entries * entry_size;
        (instruction_size, instruction_size <= remaining)
    }

    /// Flag instructions covered by try blocks and check the catch
    /// handlers. Handler classes are resolved eagerly so that exception
    /// delivery does not depend on resolution; unresolved handler types are
    /// tolerated here.
    pub(crate) fn scan_try_catch_blocks(&mut self) -> bool {
        if self.code.tries.is_empty() {
            return true;
        }
        let insns_size = self.insns_size();
        for try_index in 0..self.code.tries.len() {
            let try_item = self.code.tries[try_index];
            let start = try_item.start_addr;
            let end = start + try_item.insn_count as u32;
            if start >= end || start >= insns_size || end > insns_size {
                self.fail(
                    ErrorKind::BadClassHard,
                    format!("bad exception entry: startAddr={start} endAddr={end} (size={insns_size})"),
                );
                return false;
            }
            if !self.insn_flags[start as usize].contains(InsnFlags::OPCODE) {
                self.fail(
                    ErrorKind::BadClassHard,
                    format!("'try' block starts inside an instruction ({start})"),
                );
                return false;
            }
            let mut dex_pc = start;
            while dex_pc < end {
                self.insn_flags[dex_pc as usize] |= InsnFlags::IN_TRY;
                dex_pc += self.instruction_at(dex_pc).size_in_code_units();
            }
        }
        for handler_list in 0..self.code.handlers.len() {
            for handler_index in 0..self.code.handlers[handler_list].len() {
                let handler = self.code.handlers[handler_list][handler_index];
                let dex_pc = handler.address;
                if dex_pc >= insns_size
                    || !self.insn_flags[dex_pc as usize].contains(InsnFlags::OPCODE)
                {
                    self.work_insn_idx = dex_pc;
                    self.fail(
                        ErrorKind::BadClassHard,
                        "exception handler starts at bad address".to_owned(),
                    );
                    return false;
                }
                if self.instruction_at(dex_pc).opcode().is_move_result() {
                    self.work_insn_idx = dex_pc;
                    self.fail(
                        ErrorKind::BadClassHard,
                        "exception handler begins with move-result*".to_owned(),
                    );
                    return false;
                }
                self.insn_flags[dex_pc as usize] |= InsnFlags::BRANCH_TARGET;
                // Resolve the exception type now; failures leave it to be
                // treated as Throwable by exception delivery.
                if let Some(type_idx) = handler.type_idx {
                    let _ = self.resolver.resolve_type(type_idx);
                }
            }
        }
        true
    }

    /// Static verification of every instruction: register indices, pool
    /// indices, branch and switch targets, payload well-formedness.
    pub(crate) fn verify_instructions(&mut self) -> bool {
        // The method entry is a branch target.
        self.insn_flags[0] |= InsnFlags::BRANCH_TARGET;
        let end_dex_pc = self.insns_size();
        let mut dex_pc = 0u32;
        while dex_pc != end_dex_pc {
            let inst = self.instruction_at(dex_pc);
            let opcode = inst.opcode();
            if !self.verify_instruction(dex_pc, end_dex_pc, opcode) {
                debug_assert!(!self.failures.is_empty());
                return false;
            }
            if opcode.is_return() {
                self.insn_flags[dex_pc as usize] |= InsnFlags::RETURN;
            }
            dex_pc += self.instruction_at(dex_pc).size_in_code_units();
        }
        true
    }

    fn verify_instruction(&mut self, dex_pc: DexPc, end_dex_pc: DexPc, opcode: Opcode) -> bool {
        let inst = Instruction::at(&self.code.insns, dex_pc);
        // Only extract the operands the opcode actually carries.
        let vreg_a = if matches!(opcode.verify_a(), VerifyA::Nothing) {
            0
        } else {
            inst.vreg_a()
        };
        let vreg_b = if matches!(opcode.verify_b(), VerifyB::Nothing) {
            0
        } else {
            inst.vreg_b()
        };
        let vreg_c = if matches!(opcode.verify_c(), VerifyC::Nothing) {
            0
        } else {
            inst.vreg_c()
        };
        let vreg_h = if matches!(opcode.verify_h(), VerifyH::Nothing) {
            0
        } else {
            inst.vreg_h()
        };
        self.work_insn_idx = dex_pc;

        let mut result = true;
        match opcode.verify_a() {
            VerifyA::Nothing => {}
            VerifyA::RegA => result = result && self.check_register_index(vreg_a),
            VerifyA::RegAWide => result = result && self.check_wide_register_index(vreg_a),
        }
        match opcode.verify_b() {
            VerifyB::Nothing => {}
            VerifyB::RegB => result = result && self.check_register_index(vreg_b),
            VerifyB::RegBWide => result = result && self.check_wide_register_index(vreg_b),
            VerifyB::FieldId => {
                result = result && self.check_field_index(opcode, FieldIndex::new(vreg_b))
            }
            VerifyB::MethodId => {
                result = result && self.check_method_index(MethodIndex::new(vreg_b))
            }
            VerifyB::NewInstanceType => result = result && self.check_new_instance(vreg_b),
            VerifyB::StringId => result = result && self.check_string_index(StringIndex::new(vreg_b)),
            VerifyB::TypeId => result = result && self.check_type_index(vreg_b),
            VerifyB::CallSiteId => {
                result = result && self.check_call_site_index(CallSiteIndex::new(vreg_b))
            }
            VerifyB::MethodHandleId => {
                result = result && self.check_method_handle_index(MethodHandleIndex::new(vreg_b))
            }
            VerifyB::ProtoId => result = result && self.check_prototype_index(vreg_b),
            VerifyB::FilledNewArrayType => {
                result = result && self.check_new_array(vreg_b, true)
            }
        }
        match opcode.verify_c() {
            VerifyC::Nothing => {}
            VerifyC::RegC => result = result && self.check_register_index(vreg_c),
            VerifyC::RegCWide => result = result && self.check_wide_register_index(vreg_c),
            VerifyC::FieldId => {
                result = result && self.check_field_index(opcode, FieldIndex::new(vreg_c))
            }
            VerifyC::NewArrayType => result = result && self.check_new_array(vreg_c, false),
            VerifyC::TypeId => result = result && self.check_type_index(vreg_c),
        }
        match opcode.verify_h() {
            VerifyH::Nothing => {}
            VerifyH::ProtoId => result = result && self.check_prototype_index(vreg_h),
        }
        match opcode.verify_extra() {
            VerifyExtra::Nothing => {}
            VerifyExtra::ArrayData => {
                result = result && self.check_array_data(dex_pc, end_dex_pc)
            }
            VerifyExtra::BranchTarget => {
                result = result && self.check_and_mark_branch_target(dex_pc, end_dex_pc, opcode)
            }
            VerifyExtra::SwitchTargets => {
                result = result && self.check_and_mark_switch_targets(dex_pc, end_dex_pc)
            }
            VerifyExtra::VarArg | VerifyExtra::VarArgNonZero => {
                let v_a = inst.vreg_a();
                if (opcode.verify_extra() == VerifyExtra::VarArgNonZero && v_a == 0)
                    || v_a as usize > dex_asm::MAX_VAR_ARG_REGS
                {
                    self.fail_invalid_arg_count(opcode, v_a);
                    return false;
                }
                result = result && self.check_var_arg_regs(&inst, v_a);
            }
            VerifyExtra::VarArgRange | VerifyExtra::VarArgRangeNonZero => {
                let v_a = inst.vreg_a();
                if opcode.verify_extra() == VerifyExtra::VarArgRangeNonZero && v_a == 0 {
                    self.fail_invalid_arg_count(opcode, v_a);
                    return false;
                }
                result = result && self.check_var_arg_range_regs(v_a, inst.vreg_c());
            }
            VerifyExtra::Error => {
                self.fail(
                    ErrorKind::BadClassHard,
                    format!("unexpected opcode {}", opcode.name()),
                );
                result = false;
            }
        }
        result
    }

    fn fail_invalid_arg_count(&mut self, opcode: Opcode, arg_count: u32) {
        self.fail(
            ErrorKind::BadClassHard,
            format!("invalid arg count ({arg_count}) in {}", opcode.name()),
        );
    }

    fn check_register_index(&mut self, idx: u32) -> bool {
        if idx >= self.code.registers_size as u32 {
            self.fail(
                ErrorKind::BadClassHard,
                format!(
                    "register index out of range ({idx} >= {})",
                    self.code.registers_size
                ),
            );
            return false;
        }
        true
    }

    fn check_wide_register_index(&mut self, idx: u32) -> bool {
        if idx + 1 >= self.code.registers_size as u32 {
            self.fail(
                ErrorKind::BadClassHard,
                format!(
                    "wide register index out of range ({idx}+1 >= {})",
                    self.code.registers_size
                ),
            );
            return false;
        }
        true
    }

    fn check_field_index(&mut self, opcode: Opcode, field_idx: FieldIndex) -> bool {
        if field_idx.to_usize() >= self.resolver.num_field_ids() {
            self.fail(
                ErrorKind::BadClassHard,
                format!(
                    "bad field index {field_idx} (max {})",
                    self.resolver.num_field_ids()
                ),
            );
            return false;
        }
        // The field descriptor must match the width and category implied by
        // the opcode.
        let access = opcode.field_access().expect("field index on non-field opcode");
        let (first, second) = access.permitted_descriptor_chars();
        let field = self.resolver.field_ref(field_idx);
        let descriptor = self.resolver.type_descriptor(field.type_idx);
        let leading = descriptor.chars().next().unwrap_or('\0');
        if leading != first && leading != second {
            let alternative = if first != second {
                format!("' or '{second}")
            } else {
                String::new()
            };
            self.fail(
                ErrorKind::BadClassHard,
                format!(
                    "expected field {field_idx} to have type descriptor starting with '{first}{alternative}' but found '{leading}' in {}",
                    opcode.name()
                ),
            );
            return false;
        }
        true
    }

    fn check_method_index(&mut self, method_idx: MethodIndex) -> bool {
        if method_idx.to_usize() >= self.resolver.num_method_ids() {
            self.fail(
                ErrorKind::BadClassHard,
                format!(
                    "bad method index {method_idx} (max {})",
                    self.resolver.num_method_ids()
                ),
            );
            return false;
        }
        true
    }

    fn check_method_handle_index(&mut self, idx: MethodHandleIndex) -> bool {
        if idx.to_usize() >= self.resolver.num_method_handles() {
            self.fail(
                ErrorKind::BadClassHard,
                format!(
                    "bad method handle index {idx} (max {})",
                    self.resolver.num_method_handles()
                ),
            );
            return false;
        }
        true
    }

    fn check_prototype_index(&mut self, idx: u32) -> bool {
        if idx as usize >= self.resolver.num_proto_ids() {
            self.fail(
                ErrorKind::BadClassHard,
                format!("bad prototype index {idx} (max {})", self.resolver.num_proto_ids()),
            );
            return false;
        }
        true
    }

    fn check_string_index(&mut self, idx: StringIndex) -> bool {
        if idx.to_usize() >= self.resolver.num_string_ids() {
            self.fail(
                ErrorKind::BadClassHard,
                format!("bad string index {idx} (max {})", self.resolver.num_string_ids()),
            );
            return false;
        }
        true
    }

    fn check_type_index(&mut self, idx: u32) -> bool {
        if idx as usize >= self.resolver.num_type_ids() {
            self.fail(
                ErrorKind::BadClassHard,
                format!("bad type index {idx} (max {})", self.resolver.num_type_ids()),
            );
            return false;
        }
        true
    }

    fn check_call_site_index(&mut self, idx: CallSiteIndex) -> bool {
        if idx.to_usize() >= self.resolver.num_call_site_ids() {
            self.fail(
                ErrorKind::BadClassHard,
                format!(
                    "bad call site index {idx} (max {})",
                    self.resolver.num_call_site_ids()
                ),
            );
            return false;
        }
        true
    }

    /// `new-instance` must name a non-array class, and `java.lang.Class`
    /// cannot be instantiated.
    fn check_new_instance(&mut self, type_idx_raw: u32) -> bool {
        if !self.check_type_index(type_idx_raw) {
            return false;
        }
        let descriptor = self
            .resolver
            .type_descriptor(TypeIndex::new(type_idx_raw as u16));
        if !descriptor.starts_with('L') {
            let descriptor = descriptor.to_owned();
            self.fail(
                ErrorKind::BadClassHard,
                format!("can't call new-instance on type '{descriptor}'"),
            );
            return false;
        }
        if descriptor == "Ljava/lang/Class;" {
            self.fail(
                ErrorKind::Instantiation,
                "new-instance on java.lang.Class".to_owned(),
            );
        }
        true
    }

    /// `new-array` and `filled-new-array` must name an array class of at
    /// most 255 dimensions; `filled-new-array` further restricts the
    /// component type.
    fn check_new_array(&mut self, type_idx_raw: u32, filled: bool) -> bool {
        if !self.check_type_index(type_idx_raw) {
            return false;
        }
        let descriptor = self
            .resolver
            .type_descriptor(TypeIndex::new(type_idx_raw as u16))
            .to_owned();
        let bracket_count = descriptor.bytes().take_while(|&b| b == b'[').count();
        if bracket_count == 0 {
            self.fail(
                ErrorKind::BadClassHard,
                format!("can't new-array class '{descriptor}' (not an array)"),
            );
            return false;
        }
        if bracket_count > 255 {
            self.fail(
                ErrorKind::BadClassHard,
                format!("can't new-array class '{descriptor}' (exceeds limit)"),
            );
            return false;
        }
        if filled && bracket_count == 1 {
            let component = descriptor.as_bytes()[1];
            if !matches!(component, b'I' | b'L') {
                if matches!(component, b'J' | b'D') {
                    self.fail(
                        ErrorKind::BadClassHard,
                        format!("can't fill-new-array class '{descriptor}' (wide component type)"),
                    );
                    return false;
                }
                // The compiler does not handle the other primitive
                // components; the interpreter throws for them at runtime.
                self.fail(
                    ErrorKind::FilledNewArray,
                    format!("filled-new-array of '{descriptor}'"),
                );
            }
        }
        true
    }

    pub(crate) fn is_offset_in_range(dex_pc: DexPc, end_dex_pc: DexPc, offset: i32) -> bool {
        debug_assert!(dex_pc < end_dex_pc);
        if offset >= 0 {
            (offset as u32) < end_dex_pc - dex_pc
        } else {
            // Unsigned arithmetic keeps the lower bound well defined.
            dex_pc >= (offset as u32).wrapping_neg()
        }
    }

    fn check_array_data(&mut self, dex_pc: DexPc, end_dex_pc: DexPc) -> bool {
        let inst = self.instruction_at(dex_pc);
        let array_data_offset = inst.branch_offset();
        if !Self::is_offset_in_range(dex_pc, end_dex_pc, array_data_offset) {
            self.fail(
                ErrorKind::BadClassHard,
                format!("invalid target offset {array_data_offset} (end {end_dex_pc:#x})"),
            );
            return false;
        }
        let array_data_pc = dex_pc.wrapping_add(array_data_offset as u32);
        // The payload must have been visited as an instruction start by the
        // widths pass.
        if !self.insn_flags[array_data_pc as usize].contains(InsnFlags::OPCODE) {
            self.fail(
                ErrorKind::BadClassHard,
                format!("target dex pc {array_data_pc:#x} is not at instruction start"),
            );
            return false;
        }
        // 32-bit alignment.
        if array_data_pc % 2 != 0 {
            self.fail(
                ErrorKind::BadClassHard,
                format!("unaligned table at {array_data_pc:#x}"),
            );
            return false;
        }
        if self.code.insns[array_data_pc as usize] != dex_asm::ARRAY_DATA_SIGNATURE {
            self.fail(
                ErrorKind::BadClassHard,
                format!("invalid magic for array-data at {array_data_pc:#x}"),
            );
            return false;
        }
        true
    }

    fn check_and_mark_branch_target(
        &mut self,
        dex_pc: DexPc,
        end_dex_pc: DexPc,
        opcode: Opcode,
    ) -> bool {
        let offset = self.instruction_at(dex_pc).branch_offset();
        // Only `goto/32` may branch to itself.
        if opcode != Opcode::GOTO_32 && offset == 0 {
            self.fail(
                ErrorKind::BadClassHard,
                "branch offset of zero not allowed.".to_owned(),
            );
            return false;
        }
        if !Self::is_offset_in_range(dex_pc, end_dex_pc, offset) {
            self.fail(
                ErrorKind::BadClassHard,
                format!("invalid target offset {offset} (end {end_dex_pc:#x})"),
            );
            return false;
        }
        let target = dex_pc.wrapping_add(offset as u32);
        if !self.insn_flags[target as usize].contains(InsnFlags::OPCODE) {
            self.fail(
                ErrorKind::BadClassHard,
                format!("target dex pc {target:#x} is not at instruction start"),
            );
            return false;
        }
        let target_opcode = self.instruction_at(target).opcode();
        if target_opcode.is_move_result_or_move_exception() {
            self.fail(
                ErrorKind::BadClassHard,
                format!(
                    "invalid use of {} as branch target at {target:#x}",
                    target_opcode.name()
                ),
            );
            return false;
        }
        self.insn_flags[target as usize] |= InsnFlags::BRANCH_TARGET;
        true
    }

    fn check_and_mark_switch_targets(&mut self, dex_pc: DexPc, end_dex_pc: DexPc) -> bool {
        let inst = self.instruction_at(dex_pc);
        let payload_offset = inst.branch_offset();
        if !Self::is_offset_in_range(dex_pc, end_dex_pc, payload_offset) {
            self.fail(
                ErrorKind::BadClassHard,
                format!("invalid target offset {payload_offset} (end {end_dex_pc:#x})"),
            );
            return false;
        }
        let payload_pc = dex_pc.wrapping_add(payload_offset as u32);
        if !self.insn_flags[payload_pc as usize].contains(InsnFlags::OPCODE) {
            self.fail(
                ErrorKind::BadClassHard,
                format!("target dex pc {payload_pc:#x} is not at instruction start"),
            );
            return false;
        }
        if payload_pc % 2 != 0 {
            self.fail(
                ErrorKind::BadClassHard,
                format!("unaligned table at {payload_pc:#x}"),
            );
            return false;
        }

        let is_packed = inst.opcode() == Opcode::PACKED_SWITCH;
        let payload = &self.code.insns[payload_pc as usize..];
        let switch_count = payload[1] as u32;
        let (targets_offset, expected_signature) = if is_packed {
            // 0=signature, 1=count, 2/3=first key.
            (4u32, dex_asm::PACKED_SWITCH_SIGNATURE)
        } else {
            // 0=signature, 1=count, then count keys.
            (2 + 2 * switch_count, dex_asm::SPARSE_SWITCH_SIGNATURE)
        };
        let signature = payload[0];
        if signature != expected_signature {
            self.fail(
                ErrorKind::BadClassHard,
                format!(
                    "wrong signature for switch payload at {payload_pc:#x} ({signature:#x}, wanted {expected_signature:#x})"
                ),
            );
            return false;
        }

        let read_i32 = |offset: u32| {
            payload[offset as usize] as u32 | (payload[offset as usize + 1] as u32) << 16
        };
        const KEYS_OFFSET: u32 = 2;
        if switch_count > 1 {
            if is_packed {
                // Keys must not overflow int32.
                let first_key = read_i32(KEYS_OFFSET) as i32;
                let max_first_key = i32::MAX - (switch_count as i32 - 1);
                if first_key > max_first_key {
                    self.fail(
                        ErrorKind::BadClassHard,
                        format!(
                            "invalid packed switch payload at {payload_pc:#x}, key overflow: first_key={first_key}, switch_count={switch_count}"
                        ),
                    );
                    return false;
                }
            } else {
                // Sparse keys must ascend.
                let mut last_key = read_i32(KEYS_OFFSET) as i32;
                for target in 1..switch_count {
                    let key = read_i32(KEYS_OFFSET + target * 2) as i32;
                    if key <= last_key {
                        self.fail(
                            ErrorKind::BadClassHard,
                            format!(
                                "invalid sparse switch payload at {payload_pc:#x}, unordered keys: previous={last_key}, current={key}"
                            ),
                        );
                        return false;
                    }
                    last_key = key;
                }
            }
        }
        for target in 0..switch_count {
            let offset = read_i32(targets_offset + target * 2) as i32;
            if !Self::is_offset_in_range(dex_pc, end_dex_pc, offset) {
                self.fail(
                    ErrorKind::BadClassHard,
                    format!(
                        "invalid target offset {offset} (end {end_dex_pc:#x}) in switch payload at {payload_pc:#x}, target index {target}"
                    ),
                );
                return false;
            }
            let target_pc = dex_pc.wrapping_add(offset as u32);
            if !self.insn_flags[target_pc as usize].contains(InsnFlags::OPCODE) {
                self.fail(
                    ErrorKind::BadClassHard,
                    format!(
                        "target dex pc {target_pc:#x} is not at instruction start in switch payload at {payload_pc:#x}, target index {target}"
                    ),
                );
                return false;
            }
            let target_opcode = self.instruction_at(target_pc).opcode();
            if target_opcode.is_move_result_or_move_exception() {
                self.fail(
                    ErrorKind::BadClassHard,
                    format!(
                        "invalid use of {} as branch target at {target_pc:#x} in switch payload at {payload_pc:#x}, target index {target}",
                        target_opcode.name()
                    ),
                );
                return false;
            }
            self.insn_flags[target_pc as usize] |= InsnFlags::BRANCH_TARGET;
        }
        true
    }

    /// Register arguments of a non-range var-arg instruction are 4-bit, so
    /// only methods with fewer than 16 registers can be out of range.
    fn check_var_arg_regs(&mut self, inst: &Instruction<'_>, v_a: u32) -> bool {
        let registers_size = self.code.registers_size as u32;
        if registers_size >= 16 {
            return true;
        }
        let args = inst.var_args();
        for &arg in args.iter().take(v_a as usize) {
            if arg >= registers_size {
                self.fail(
                    ErrorKind::BadClassHard,
                    format!("invalid reg index ({arg}) in non-range invoke (>= {registers_size})"),
                );
                return false;
            }
        }
        true
    }

    fn check_var_arg_range_regs(&mut self, v_a: u32, v_c: u32) -> bool {
        let registers_size = self.code.registers_size as u32;
        // vA and vC are unsigned 8/16-bit values, so the sum cannot
        // overflow.
        if v_a + v_c > registers_size {
            self.fail(
                ErrorKind::BadClassHard,
                format!("invalid reg index {v_a}+{v_c} in range invoke (> {registers_size})"),
            );
            return false;
        }
        true
    }

    /// Extract the relative offset of a branch instruction; used by the
    /// data-flow pass after static checks have validated it.
    pub(crate) fn branch_offset_of(&self, dex_pc: DexPc) -> (i32, bool) {
        let inst = self.instruction_at(dex_pc);
        let conditional = inst
            .opcode()
            .flags()
            .contains(dex_asm::OpFlags::CONTINUE | dex_asm::OpFlags::BRANCH);
        (inst.branch_offset(), conditional)
    }
}
