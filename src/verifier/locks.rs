//! Lock inspection: which monitors are held at a dex pc, and which
//! registers alias each of them.

use std::collections::BTreeSet;

use dex_asm::Opcode;
use dex_types::DexPc;
use itertools::Itertools;

use super::{MethodVerifier, VerifierOptions};
use crate::resolver::{ClassResolver, CodeItem, MethodInfo};

/// A lock held at a point in a method: the dex pc of the `monitor-enter`
/// and every register holding the locked value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexLockInfo {
    /// Dex pc of the `monitor-enter` instruction.
    pub dex_pc: DexPc,
    /// The registers aliasing the lock.
    pub dex_registers: BTreeSet<u32>,
}

pub(crate) fn find_locks_at_dex_pc<R: ClassResolver>(
    resolver: &R,
    method: &MethodInfo,
    code: &CodeItem,
    options: &VerifierOptions,
    dex_pc: DexPc,
) -> Vec<DexLockInfo> {
    // Without any monitor-enter there is nothing to report; skip running
    // the data-flow pass entirely.
    let mut pc = 0u32;
    let mut any_monitor_enter = false;
    while (pc as usize) < code.insns.len() {
        let inst = dex_asm::Instruction::at(&code.insns, pc);
        if inst.opcode() == Opcode::MONITOR_ENTER {
            any_monitor_enter = true;
            break;
        }
        pc += inst.size_in_code_units();
    }
    if !any_monitor_enter {
        return Vec::new();
    }

    // In principle a subset of verification would do; in practice the
    // interesting phase depends on the data structures of all the earlier
    // passes, so run the full verification and harvest the state captured
    // at the interesting pc.
    let mut verifier = MethodVerifier::new(resolver, method, code, options);
    verifier.interesting_dex_pc = Some(dex_pc);
    verifier.monitor_enter_dex_pcs = Some(Vec::new());
    let _ = verifier.verify();
    verifier.monitor_enter_dex_pcs.unwrap_or_default()
}

impl<'a, R: ClassResolver> MethodVerifier<'a, R> {
    /// Capture the monitor state of the working line, grouping the lock
    /// aliases by monitor-stack depth.
    pub(crate) fn collect_monitor_enter_dex_pcs(&mut self) {
        let mut by_depth: Vec<(u32, u32)> = Vec::new();
        self.work_line.iterate_lock_depths(|reg, depth| {
            by_depth.push((depth, reg));
        });
        let grouped = by_depth.into_iter().into_group_map();
        let mut infos: Vec<DexLockInfo> = grouped
            .into_iter()
            .map(|(depth, registers)| DexLockInfo {
                dex_pc: self.work_line.monitor_enter_dex_pc(depth as usize),
                dex_registers: registers.into_iter().collect(),
            })
            .collect();
        infos.sort_by_key(|info| info.dex_pc);
        // The latest capture of the line is the most accurate one.
        if let Some(out) = &mut self.monitor_enter_dex_pcs {
            *out = infos;
        }
    }
}
