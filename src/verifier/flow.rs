//! Signature typing and the data-flow fixed point.

use dex_types::DexPc;
use tracing::debug;

use super::flags::InsnFlags;
use super::MethodVerifier;
use crate::error::ErrorKind;
use crate::reg_type::Kind;
use crate::reg_type_cache::RegTypeCache;
use crate::register_line::RegisterLine;
use crate::resolver::ClassResolver;

impl<'a, R: ClassResolver> MethodVerifier<'a, R> {
    /// Set up the register table and run the data-flow pass.
    pub(crate) fn verify_code_flow(&mut self) -> bool {
        let registers_size = self.code.registers_size as usize;
        let insns_size = self.insns_size();

        // Lines are stored at branch targets, where merges happen, and at
        // the pc a find-locks request wants to observe.
        let reg_table = (0..insns_size)
            .map(|dex_pc| {
                let interesting = self.interesting_dex_pc == Some(dex_pc);
                if interesting
                    || self.insn_flags[dex_pc as usize].contains(InsnFlags::BRANCH_TARGET)
                {
                    Some(RegisterLine::new(registers_size))
                } else {
                    None
                }
            })
            .collect();
        self.reg_table = reg_table;
        self.work_line = RegisterLine::new(registers_size);
        self.saved_line = RegisterLine::new(registers_size);

        if !self.set_types_from_signature() {
            debug_assert!(!self.failures.is_empty());
            self.prepend_to_last_failure("Bad signature in method ");
            return false;
        }
        // Signature setup may have raised a runtime-throw marker; clear it.
        self.have_pending_runtime_throw_failure = false;

        self.code_flow_verify_method()
    }

    /// Initialize register line 0 from the method signature, marking the
    /// receiver of a constructor as uninitialized-this.
    pub(crate) fn set_types_from_signature(&mut self) -> bool {
        debug_assert!(self.code.registers_size >= self.code.ins_size);
        let mut line = self.reg_table[0].take().expect("entry line missing");
        let arg_start = (self.code.registers_size - self.code.ins_size) as u32;
        let expected_args = self.code.ins_size as u32;
        let mut cur_arg = 0u32;

        let mut ok = true;
        if !self.is_static() {
            if expected_args == 0 {
                self.fail(
                    ErrorKind::BadClassHard,
                    "expected 0 args, but method is not static".to_owned(),
                );
                self.reg_table[0] = Some(line);
                return false;
            }
            let declaring_class = self.declaring_class_id();
            if self.is_constructor {
                if matches!(self.reg_types.kind_of(declaring_class), Kind::JavaLangObject) {
                    // The receiver of an Object constructor is implicitly
                    // initialized.
                    line.set_this_initialized();
                    line.set_register_type(
                        crate::register_line::LockOp::Clear,
                        arg_start + cur_arg,
                        declaring_class,
                    );
                } else {
                    let uninit_this = self.reg_types.uninitialized_this_argument(declaring_class);
                    line.set_register_type(
                        crate::register_line::LockOp::Clear,
                        arg_start + cur_arg,
                        uninit_this,
                    );
                }
            } else {
                line.set_register_type(
                    crate::register_line::LockOp::Clear,
                    arg_start + cur_arg,
                    declaring_class,
                );
            }
            cur_arg += 1;
        }

        let proto_idx = self.resolver.method_ref(self.method.method_idx).proto_idx;
        let proto = self.resolver.proto(proto_idx);
        for param_idx in proto.param_type_idxs {
            if cur_arg >= expected_args {
                let descriptor = self.resolver.type_descriptor(param_idx).to_owned();
                self.fail(
                    ErrorKind::BadClassHard,
                    format!("expected {expected_args} args, found more ({descriptor})"),
                );
                ok = false;
                break;
            }
            let descriptor = self.resolver.type_descriptor(param_idx);
            match descriptor.as_bytes()[0] {
                b'L' | b'[' => {
                    // Reference arguments are assumed initialized; access is
                    // deliberately not checked for declared parameter types.
                    let reg_type = self.resolve_class_no_access_check(param_idx);
                    if !self.reg_types.kind_of(reg_type).is_non_zero_reference_types() {
                        debug_assert!(!self.failures.is_empty());
                        ok = false;
                        break;
                    }
                    line.set_register_type(
                        crate::register_line::LockOp::Clear,
                        arg_start + cur_arg,
                        reg_type,
                    );
                }
                b'Z' => line.set_register_kind(arg_start + cur_arg, Kind::Boolean),
                b'C' => line.set_register_kind(arg_start + cur_arg, Kind::Char),
                b'B' => line.set_register_kind(arg_start + cur_arg, Kind::Byte),
                b'I' => line.set_register_kind(arg_start + cur_arg, Kind::Integer),
                b'S' => line.set_register_kind(arg_start + cur_arg, Kind::Short),
                b'F' => line.set_register_kind(arg_start + cur_arg, Kind::Float),
                b'J' | b'D' => {
                    if cur_arg + 1 >= expected_args {
                        let descriptor = descriptor.to_owned();
                        self.fail(
                            ErrorKind::BadClassHard,
                            format!("expected {expected_args} args, found more ({descriptor})"),
                        );
                        ok = false;
                        break;
                    }
                    let (lo, hi) = if descriptor.as_bytes()[0] == b'J' {
                        (Kind::LongLo, Kind::LongHi)
                    } else {
                        (Kind::DoubleLo, Kind::DoubleHi)
                    };
                    line.set_register_kind_wide(arg_start + cur_arg, lo, hi);
                    cur_arg += 1;
                }
                _ => {
                    let descriptor = descriptor.to_owned();
                    self.fail(
                        ErrorKind::BadClassHard,
                        format!("unexpected signature type char '{descriptor}'"),
                    );
                    ok = false;
                    break;
                }
            }
            cur_arg += 1;
        }
        if ok && cur_arg != expected_args {
            self.fail(
                ErrorKind::BadClassHard,
                format!("expected {expected_args} arguments, found {cur_arg}"),
            );
            ok = false;
        }
        self.reg_table[0] = Some(line);
        ok
    }

    /// The fixed-point loop: process the lowest changed instruction until
    /// no instruction is marked changed.
    pub(crate) fn code_flow_verify_method(&mut self) -> bool {
        let insns_size = self.insns_size();
        self.insn_flags[0] |= InsnFlags::CHANGED;
        let mut start_guess: DexPc = 0;

        loop {
            // Find the lowest changed pc, using the guess to catch the
            // common fall-through case without rescanning.
            let mut insn_idx = start_guess;
            while insn_idx < insns_size
                && !self.insn_flags[insn_idx as usize].contains(InsnFlags::CHANGED)
            {
                insn_idx += 1;
            }
            if insn_idx == insns_size {
                if start_guess != 0 {
                    start_guess = 0;
                    continue;
                }
                break;
            }

            // The working line carries over from instruction to
            // instruction; at branch targets (and when chasing changed
            // flags) it is reloaded from the stored line.
            self.work_insn_idx = insn_idx;
            if self.insn_flags[insn_idx as usize].contains(InsnFlags::BRANCH_TARGET) {
                let stored = self.reg_table[insn_idx as usize]
                    .take()
                    .expect("branch target without stored line");
                self.work_line.copy_from(&stored);
                self.reg_table[insn_idx as usize] = Some(stored);
            } else if let Some(stored) = &self.reg_table[insn_idx as usize] {
                // Consistency check: a stored line off a branch target must
                // match the carried working line.
                debug_assert!(
                    self.work_line.same_registers_and_monitors(stored),
                    "work line diverged at {insn_idx:#x}"
                );
            }

            // A find-locks request wants the state before the interesting
            // instruction, which may itself be a monitor-enter.
            if self.monitor_enter_dex_pcs.is_some() && Some(insn_idx) == self.interesting_dex_pc {
                self.collect_monitor_enter_dex_pcs();
            }

            if !self.code_flow_verify_instruction(&mut start_guess) {
                debug_assert!(self.have_pending_hard_failure);
                let prefix = format!("method {} failed to verify: ", self.method.method_idx);
                self.prepend_to_last_failure(&prefix);
                return false;
            }
            debug_assert!(!self.have_pending_hard_failure);
            self.insn_flags[insn_idx as usize] |= InsnFlags::VISITED;
            self.insn_flags[insn_idx as usize] &= !InsnFlags::CHANGED;
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            self.log_dead_code();
        }
        true
    }

    /// Dead code is harmless but worth a trace; always-throw rewrites
    /// routinely produce some.
    fn log_dead_code(&self) {
        let mut dead_start: Option<u32> = None;
        let mut dex_pc = 0u32;
        let insns_size = self.insns_size();
        while dex_pc < insns_size {
            let flags = self.insn_flags[dex_pc as usize];
            if !flags.contains(InsnFlags::OPCODE) {
                dex_pc += 1;
                continue;
            }
            let inst = self.instruction_at(dex_pc);
            // Payload data is never visited by the scanner.
            let is_payload = inst.opcode() == dex_asm::Opcode::NOP && inst.inst_data() != 0;
            if !flags.contains(InsnFlags::VISITED) && !is_payload {
                if dead_start.is_none() {
                    dead_start = Some(dex_pc);
                }
            } else if let Some(start) = dead_start.take() {
                debug!(start = format_args!("{start:#x}"), end = format_args!("{:#x}", dex_pc - 1), "dead code");
            }
            dex_pc += inst.size_in_code_units();
        }
        if let Some(start) = dead_start {
            debug!(start = format_args!("{start:#x}"), end = format_args!("{:#x}", insns_size - 1), "dead code");
        }
    }

    /// Merge `merge_line` into the stored line at `next_insn`, setting the
    /// changed flag when the target state widened. For fall-through edges
    /// the merged state is copied back so the working line stays current.
    /// Returns a lock-inconsistency message if the merge found one.
    pub(crate) fn update_registers_impl(
        reg_table: &mut [Option<RegisterLine>],
        insn_flags: &mut [InsnFlags],
        reg_types: &mut RegTypeCache<'a, R>,
        next_insn: DexPc,
        merge_line: &mut RegisterLine,
        update_merge_line: bool,
    ) -> Option<String> {
        let mut target = reg_table[next_insn as usize]
            .take()
            .expect("merge target without stored line");
        let mut changed = true;
        let mut lock_failure = None;
        if !insn_flags[next_insn as usize].visited_or_changed() {
            // First arrival: copy, don't merge. This is the only way a
            // register leaves the undefined state.
            target.copy_from(merge_line);
        } else {
            let outcome = target.merge(reg_types, merge_line);
            changed = outcome.changed;
            lock_failure = outcome.lock_failure;
            if update_merge_line && changed {
                merge_line.copy_from(&target);
            }
        }
        reg_table[next_insn as usize] = Some(target);
        if changed {
            insn_flags[next_insn as usize] |= InsnFlags::CHANGED;
        }
        lock_failure
    }

    /// Merge the working line into `next_insn`.
    pub(crate) fn update_registers_from_work_line(
        &mut self,
        next_insn: DexPc,
        update_merge_line: bool,
    ) -> bool {
        debug_assert!(!self.have_pending_hard_failure);
        let lock_failure = Self::update_registers_impl(
            &mut self.reg_table,
            &mut self.insn_flags,
            &mut self.reg_types,
            next_insn,
            &mut self.work_line,
            update_merge_line,
        );
        self.report_merge_lock_failure(lock_failure)
    }

    /// Merge the saved pre-instruction line into a catch handler.
    pub(crate) fn update_registers_from_saved_line(&mut self, next_insn: DexPc) -> bool {
        debug_assert!(!self.have_pending_hard_failure);
        let lock_failure = Self::update_registers_impl(
            &mut self.reg_table,
            &mut self.insn_flags,
            &mut self.reg_types,
            next_insn,
            &mut self.saved_line,
            false,
        );
        self.report_merge_lock_failure(lock_failure)
    }

    pub(crate) fn report_merge_lock_failure(&mut self, lock_failure: Option<String>) -> bool {
        match lock_failure {
            Some(message) => {
                self.fail_no_exc(ErrorKind::Locking, message);
                true
            }
            None => true,
        }
    }

    /// Fall-through handling shared by the dispatch: continue into
    /// `next_insn`, merging when a stored line exists there.
    pub(crate) fn handle_fall_through(&mut self, next_insn: DexPc) -> bool {
        if next_insn >= self.insns_size() {
            self.fail(
                ErrorKind::BadClassHard,
                "Can flow through to end of code area".to_owned(),
            );
            return false;
        }
        // The only way to reach a move-exception is to get thrown there.
        let next_opcode = self.instruction_at(next_insn).opcode();
        if matches!(next_opcode, dex_asm::Opcode::MOVE_EXCEPTION) {
            self.fail(
                ErrorKind::BadClassHard,
                "Can flow through to move-exception".to_owned(),
            );
            return false;
        }
        if self.reg_table[next_insn as usize].is_some() {
            self.update_registers_from_work_line(next_insn, true)
        } else {
            // No stored line for the next instruction; assume something
            // changed and force re-evaluation.
            self.insn_flags[next_insn as usize] |= InsnFlags::CHANGED;
            true
        }
    }
}
