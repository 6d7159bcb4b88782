//! Per-instruction abstract state.
//!
//! A register line tracks, for one dex pc, the type of every virtual
//! register, the invisible result register pair, the stack of entered
//! monitors and which registers alias which lock depth, the allocation dex
//! pcs of uninitialized references, and whether a constructor's `this` has
//! been initialized.

use std::collections::BTreeMap;

use dex_types::{DexPc, NO_DEX_PC};
use tracing::debug;

use crate::reg_type::Kind;
use crate::reg_type_cache::{id_for_kind, CacheId, RegTypeCache};
use crate::resolver::ClassResolver;

/// Maximum number of nested monitors tracked before giving up.
pub const MAX_MONITOR_STACK_DEPTH: usize = 32;

/// Null literals can establish lock aliases that cannot be tracked through
/// a register, so the zero case is booked under a register id that does not
/// exist in dex bytecode.
const VIRTUAL_NULL_REGISTER: u32 = u32::MAX;

/// What to do with recorded lock depths when writing a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOp {
    /// Clear the lock depths of the written register; the value changed.
    Clear,
    /// Keep the lock depths; the value is unchanged and only its type got
    /// refined. Only valid for reference types and conflicts.
    Keep,
}

/// Result of merging an incoming line into a stored line.
#[derive(Debug)]
pub struct MergeOutcome {
    /// Whether any register changed.
    pub changed: bool,
    /// A structured-locking violation discovered during the merge.
    pub lock_failure: Option<String>,
}

/// The abstract machine state at one instruction.
#[derive(Clone)]
pub struct RegisterLine {
    /// A cache id per virtual register.
    line: Box<[CacheId]>,
    /// Result pseudo-register pair of the last invoke/filled-new-array.
    result: [CacheId; 2],
    /// Allocation dex pcs for `new-instance` uninitialized references,
    /// allocated lazily on the first `new-instance`.
    allocation_dex_pcs: Option<Box<[DexPc]>>,
    /// Dex pcs of the `monitor-enter` instructions still held.
    monitors: Vec<DexPc>,
    /// Bit `d` set for a register means it holds the lock entered at
    /// monitor-stack depth `d`.
    reg_to_lock_depths: BTreeMap<u32, u32>,
    /// Whether the constructor chain has initialized `this`.
    this_initialized: bool,
}

impl RegisterLine {
    /// A line of `num_regs` undefined registers.
    pub fn new(num_regs: usize) -> Self {
        Self {
            line: vec![id_for_kind(Kind::Undefined); num_regs].into_boxed_slice(),
            result: [id_for_kind(Kind::Undefined); 2],
            allocation_dex_pcs: None,
            monitors: Vec::new(),
            reg_to_lock_depths: BTreeMap::new(),
            this_initialized: false,
        }
    }

    /// Number of virtual registers.
    pub fn num_regs(&self) -> usize {
        self.line.len()
    }

    /// The cache id held by register `vsrc`. The register index was
    /// validated during the static pass.
    pub fn reg_id(&self, vsrc: u32) -> CacheId {
        self.line[vsrc as usize]
    }

    /// Whether `this` has been initialized.
    pub fn this_initialized(&self) -> bool {
        self.this_initialized
    }

    /// Record that the `<init>` chain has completed.
    pub fn set_this_initialized(&mut self) {
        self.this_initialized = true;
    }

    /// Write a type into a register, handling the lock depths per `lock`.
    pub fn set_register_type(&mut self, lock: LockOp, vdst: u32, id: CacheId) {
        self.line[vdst as usize] = id;
        match lock {
            LockOp::Clear => self.clear_all_lock_depths(vdst),
            LockOp::Keep => {}
        }
    }

    /// Write a fixed kind into a register, clearing lock depths.
    pub fn set_register_kind(&mut self, vdst: u32, kind: Kind) {
        debug_assert!(!kind.is_low_half() && !kind.is_high_half());
        self.set_register_type(LockOp::Clear, vdst, id_for_kind(kind));
    }

    /// Write a wide pair into `vdst`/`vdst + 1`, clearing lock depths on
    /// both.
    pub fn set_register_type_wide(&mut self, vdst: u32, lo: CacheId, hi: CacheId) {
        debug_assert!(lo < crate::reg_type_cache::NUM_REG_KIND_CACHE_IDS);
        debug_assert!(Kind::check_wide_pair(
            crate::reg_type_cache::kind_for_id(lo),
            crate::reg_type_cache::kind_for_id(hi),
        ));
        self.line[vdst as usize] = lo;
        self.line[vdst as usize + 1] = hi;
        self.clear_all_lock_depths(vdst);
        self.clear_all_lock_depths(vdst + 1);
    }

    /// Write the wide pair of fixed kinds.
    pub fn set_register_kind_wide(&mut self, vdst: u32, lo: Kind, hi: Kind) {
        self.set_register_type_wide(vdst, id_for_kind(lo), id_for_kind(hi));
    }

    /// Record the result of a `new-instance`: the uninitialized type and
    /// the allocating dex pc.
    pub fn set_register_type_for_new_instance(
        &mut self,
        vdst: u32,
        uninit_id: CacheId,
        dex_pc: DexPc,
    ) {
        self.set_register_type(LockOp::Clear, vdst, uninit_id);
        self.ensure_allocation_dex_pcs();
        self.allocation_dex_pcs.as_mut().unwrap()[vdst as usize] = dex_pc;
    }

    /// Assert that no register currently holds an uninitialized type
    /// allocated at `dex_pc`; used before recording a `new-instance`.
    pub fn dcheck_unique_new_instance_dex_pc<R: ClassResolver>(
        &self,
        cache: &RegTypeCache<'_, R>,
        dex_pc: DexPc,
    ) {
        // Stale entries can survive in `allocation_dex_pcs` when a merge
        // conflicted or data was copied from a line without the array, but
        // never for a register still holding an uninitialized type.
        if cfg!(debug_assertions) {
            if let Some(pcs) = &self.allocation_dex_pcs {
                for (i, &id) in self.line.iter().enumerate() {
                    if Self::needs_allocation_dex_pc(cache.kind_of(id)) {
                        assert_ne!(pcs[i], dex_pc, "duplicate allocation pc in v{i}");
                    }
                }
            }
        }
    }

    /// Copy a reference (or conflict) register, propagating the lock depths
    /// and the allocation dex pc.
    pub fn copy_reference(&mut self, vdst: u32, vsrc: u32, id: CacheId) {
        debug_assert_eq!(id, self.reg_id(vsrc));
        self.set_register_type(LockOp::Keep, vdst, id);
        self.copy_lock_depths(vdst, vsrc);
        if let Some(pcs) = &mut self.allocation_dex_pcs {
            // Meaningful for uninitialized types; harmless otherwise.
            pcs[vdst as usize] = pcs[vsrc as usize];
        }
    }

    /// Move the category-1 result register into `vdst`.
    pub fn copy_result_register1<R: ClassResolver>(
        &mut self,
        cache: &RegTypeCache<'_, R>,
        vdst: u32,
        is_reference: bool,
    ) -> Result<(), String> {
        let id = self.result[0];
        let kind = cache.kind_of(id);
        let compatible = if is_reference {
            kind.is_reference_types()
        } else {
            kind.is_category1_types()
        };
        if !compatible {
            return Err(format!(
                "copyRes1 v{vdst}<- result0 type={}",
                cache.dump(id)
            ));
        }
        debug_assert_eq!(self.result[1], id_for_kind(Kind::Undefined));
        self.set_register_type(LockOp::Clear, vdst, id);
        self.result[0] = id_for_kind(Kind::Undefined);
        Ok(())
    }

    /// Move the category-2 result register pair into `vdst`.
    pub fn copy_result_register2<R: ClassResolver>(
        &mut self,
        cache: &RegTypeCache<'_, R>,
        vdst: u32,
    ) -> Result<(), String> {
        let lo = self.result[0];
        let hi = self.result[1];
        if !cache.kind_of(lo).is_category2_types() {
            return Err(format!(
                "copyRes2 v{vdst}<- result0 type={}",
                cache.dump(lo)
            ));
        }
        debug_assert!(Kind::check_wide_pair(cache.kind_of(lo), cache.kind_of(hi)));
        self.set_register_type_wide(vdst, lo, hi);
        self.result[0] = id_for_kind(Kind::Undefined);
        self.result[1] = id_for_kind(Kind::Undefined);
        Ok(())
    }

    /// Invalidate the result register pair.
    pub fn set_result_type_to_unknown(&mut self) {
        self.result = [id_for_kind(Kind::Undefined); 2];
    }

    /// Set the category-1 result register.
    pub fn set_result_register_type(&mut self, id: CacheId) {
        self.result = [id, id_for_kind(Kind::Undefined)];
    }

    /// Set the category-2 result register pair.
    pub fn set_result_register_type_wide(&mut self, lo: CacheId, hi: CacheId) {
        self.result = [lo, hi];
    }

    /// The current result register pair.
    pub fn result(&self) -> [CacheId; 2] {
        self.result
    }

    fn needs_allocation_dex_pc(kind: Kind) -> bool {
        matches!(
            kind,
            Kind::UninitializedReference | Kind::UnresolvedUninitializedReference
        )
    }

    fn ensure_allocation_dex_pcs(&mut self) {
        if self.allocation_dex_pcs.is_none() {
            self.allocation_dex_pcs =
                Some(vec![NO_DEX_PC; self.line.len()].into_boxed_slice());
        }
    }

    /// Transition every register holding the same abstract object as
    /// `vsrc` from its uninitialized type to the initialized counterpart.
    pub fn mark_refs_as_initialized<R: ClassResolver>(
        &mut self,
        cache: &RegTypeCache<'_, R>,
        vsrc: u32,
    ) {
        let uninit_id = self.reg_id(vsrc);
        let uninit_kind = cache.kind_of(uninit_id);
        debug_assert!(uninit_kind.is_uninitialized_types());
        let init_id = cache.from_uninitialized(uninit_id);
        let mut changed = 0usize;
        if matches!(
            uninit_kind,
            Kind::UninitializedThisReference | Kind::UnresolvedUninitializedThisReference
        ) {
            self.this_initialized = true;
            for i in 0..self.line.len() {
                if self.line[i] == uninit_id {
                    self.line[i] = init_id;
                    changed += 1;
                }
            }
        } else {
            debug_assert!(Self::needs_allocation_dex_pc(uninit_kind));
            let pcs = self.allocation_dex_pcs.as_ref().expect("no allocation pcs");
            let dex_pc = pcs[vsrc as usize];
            let mut to_update = Vec::new();
            for i in 0..self.line.len() {
                if self.line[i] == uninit_id && pcs[i] == dex_pc {
                    to_update.push(i);
                }
            }
            for i in to_update {
                self.line[i] = init_id;
                changed += 1;
            }
        }
        debug_assert!(changed > 0);
    }

    /// Check constructor-return discipline: `this` must be initialized.
    pub fn check_constructor_return<R: ClassResolver>(
        &self,
        cache: &RegTypeCache<'_, R>,
    ) -> bool {
        if cfg!(debug_assertions) && self.this_initialized {
            for &id in self.line.iter() {
                let kind = cache.kind_of(id);
                assert!(
                    !matches!(
                        kind,
                        Kind::UninitializedThisReference
                            | Kind::UnresolvedUninitializedThisReference
                    ),
                    "initialized line still holds uninitialized this"
                );
            }
        }
        self.this_initialized
    }

    /// Push a monitor acquired at `dex_pc` by register `vreg`.
    pub fn push_monitor(
        &mut self,
        vreg: u32,
        reg_kind: Kind,
        dex_pc: DexPc,
    ) -> Result<(), String> {
        if self.monitors.len() >= MAX_MONITOR_STACK_DEPTH {
            return Err("monitor-enter stack overflow".to_owned());
        }
        if !self.set_lock_depth(vreg, self.monitors.len()) {
            return Err(format!("unexpected monitor-enter on register v{vreg}"));
        }
        if matches!(reg_kind, Kind::Zero) {
            self.set_lock_depth(VIRTUAL_NULL_REGISTER, self.monitors.len());
        }
        self.monitors.push(dex_pc);
        Ok(())
    }

    /// Pop a monitor released through register `vreg`.
    pub fn pop_monitor(&mut self, vreg: u32, reg_kind: Kind) -> Result<(), String> {
        if self.monitors.is_empty() {
            return Err("monitor-exit stack underflow".to_owned());
        }
        self.monitors.pop();
        let depth = self.monitors.len();
        let mut unlock_reg = vreg;
        let mut success = self.is_lock_depth_set(vreg, depth);
        if !success && matches!(reg_kind, Kind::Zero) {
            success = self.is_lock_depth_set(VIRTUAL_NULL_REGISTER, depth);
            if success {
                unlock_reg = VIRTUAL_NULL_REGISTER;
            }
        }
        if !success {
            return Err("monitor-exit not unlocking the top of the monitor stack".to_owned());
        }
        // Unlocking also releases every alias at the same depth, the null
        // slot included.
        self.clear_lock_depth(unlock_reg, depth);
        Ok(())
    }

    /// Depth of the monitor stack.
    pub fn monitor_stack_depth(&self) -> usize {
        self.monitors.len()
    }

    /// Dex pc of the `monitor-enter` at stack depth `depth`.
    pub fn monitor_enter_dex_pc(&self, depth: usize) -> DexPc {
        self.monitors[depth]
    }

    /// Whether the monitor stack is empty, as required before `return*`.
    pub fn verify_monitor_stack_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// Visit `(register, depth)` for every lock depth held by a register.
    pub fn iterate_lock_depths(&self, mut visitor: impl FnMut(u32, u32)) {
        for (&reg, &mask) in &self.reg_to_lock_depths {
            let mut depths = mask;
            let mut depth = 0u32;
            while depths != 0 {
                if depths & 1 != 0 {
                    visitor(reg, depth);
                }
                depths >>= 1;
                depth += 1;
            }
        }
    }

    /// Replace this line with a copy of `src`.
    pub fn copy_from(&mut self, src: &RegisterLine) {
        debug_assert_eq!(self.line.len(), src.line.len());
        self.line.copy_from_slice(&src.line);
        // When the source carries no allocation pcs, retain our buffer as
        // is; the stale values cannot belong to an uninitialized type.
        if src.allocation_dex_pcs.is_some() {
            self.ensure_allocation_dex_pcs();
            self.allocation_dex_pcs
                .as_mut()
                .unwrap()
                .copy_from_slice(src.allocation_dex_pcs.as_ref().unwrap());
        }
        self.result = src.result;
        self.monitors.clone_from(&src.monitors);
        self.reg_to_lock_depths.clone_from(&src.reg_to_lock_depths);
        self.this_initialized = src.this_initialized;
    }

    /// Whether two lines agree on register types and monitors; used for
    /// consistency checking in the fixed-point loop.
    pub fn same_registers_and_monitors(&self, other: &RegisterLine) -> bool {
        self.line == other.line && self.monitors == other.monitors
    }

    /// Merge the `incoming` line into this one, reporting whether anything
    /// changed and any lock inconsistency.
    pub fn merge<R: ClassResolver>(
        &mut self,
        cache: &mut RegTypeCache<'_, R>,
        incoming: &RegisterLine,
    ) -> MergeOutcome {
        let mut changed = false;
        for idx in 0..self.line.len() {
            if self.line[idx] != incoming.line[idx] {
                let merged = cache.merge(self.line[idx], incoming.line[idx]);
                changed = changed || merged != self.line[idx];
                self.line[idx] = merged;
            } else if let (Some(pcs), Some(incoming_pcs)) =
                (&self.allocation_dex_pcs, &incoming.allocation_dex_pcs)
            {
                // Two allocations of the same type from different pcs are
                // different abstract objects; the join holds neither.
                if pcs[idx] != incoming_pcs[idx]
                    && Self::needs_allocation_dex_pc(cache.kind_of(self.line[idx]))
                {
                    self.line[idx] = id_for_kind(Kind::Conflict);
                    changed = true;
                }
            }
        }

        let mut lock_failure = None;
        if !self.monitors.is_empty() || !incoming.monitors.is_empty() {
            if self.monitors.len() != incoming.monitors.len() {
                lock_failure = Some(format!(
                    "mismatched stack depths (depth={}, incoming depth={})",
                    self.monitors.len(),
                    incoming.monitors.len()
                ));
            } else if self.reg_to_lock_depths != incoming.reg_to_lock_depths {
                for idx in 0..self.line.len() as u32 {
                    let ours = self.reg_to_lock_depths.get(&idx).copied();
                    let theirs = incoming.reg_to_lock_depths.get(&idx).copied();
                    if ours == theirs {
                        continue;
                    }
                    // An alias may have been clobbered on one path only.
                    // Dropping this register is fine as long as another
                    // alias of each lock remains; the last alias to vanish
                    // reports the leak.
                    if !Self::find_lock_aliased_register(
                        idx,
                        &self.reg_to_lock_depths,
                        &self.reg_to_lock_depths,
                    ) || !Self::find_lock_aliased_register(
                        idx,
                        &incoming.reg_to_lock_depths,
                        &self.reg_to_lock_depths,
                    ) {
                        debug!(vreg = idx, "mismatched lock depths without alias");
                        lock_failure = Some(format!(
                            "mismatched stack depths for register v{idx}"
                        ));
                        break;
                    }
                    self.reg_to_lock_depths.remove(&idx);
                }
            }
        }

        if self.this_initialized && !incoming.this_initialized {
            self.this_initialized = false;
            changed = true;
        }
        MergeOutcome {
            changed,
            lock_failure,
        }
    }

    fn find_lock_aliased_register(
        src: u32,
        src_map: &BTreeMap<u32, u32>,
        search_map: &BTreeMap<u32, u32>,
    ) -> bool {
        let Some(&src_lock_levels) = src_map.get(&src) else {
            // Not locked is trivially aliased.
            return true;
        };
        if src_lock_levels == 0 {
            return true;
        }
        search_map
            .iter()
            .any(|(&reg, &levels)| reg != src && levels == src_lock_levels)
    }

    fn is_lock_depth_set(&self, reg: u32, depth: usize) -> bool {
        self.reg_to_lock_depths
            .get(&reg)
            .is_some_and(|mask| mask & (1 << depth) != 0)
    }

    fn set_lock_depth(&mut self, reg: u32, depth: usize) -> bool {
        debug_assert!(depth < MAX_MONITOR_STACK_DEPTH);
        if self.is_lock_depth_set(reg, depth) {
            // Locking the same register twice at one depth is erroneous.
            return false;
        }
        *self.reg_to_lock_depths.entry(reg).or_insert(0) |= 1 << depth;
        true
    }

    fn clear_lock_depth(&mut self, reg: u32, depth: usize) {
        debug_assert!(depth < MAX_MONITOR_STACK_DEPTH);
        debug_assert!(self.is_lock_depth_set(reg, depth));
        let mask = 1u32 << depth;
        if let Some(levels) = self.reg_to_lock_depths.get_mut(&reg) {
            *levels ^= mask;
            if *levels == 0 {
                self.reg_to_lock_depths.remove(&reg);
            }
        }
        // Unlock every register aliasing the same depth.
        let aliased: Vec<u32> = self
            .reg_to_lock_depths
            .iter()
            .filter(|(_, &levels)| levels & mask != 0)
            .map(|(&reg, _)| reg)
            .collect();
        for alias in aliased {
            debug!(vreg = alias, "also unlocking alias");
            let levels = self.reg_to_lock_depths.get_mut(&alias).unwrap();
            *levels ^= mask;
            if *levels == 0 {
                self.reg_to_lock_depths.remove(&alias);
            }
        }
    }

    fn copy_lock_depths(&mut self, dst: u32, src: u32) {
        // Overwrite rather than clear-then-copy so `dst == src` keeps its
        // depths.
        match self.reg_to_lock_depths.get(&src).copied() {
            Some(levels) => {
                self.reg_to_lock_depths.insert(dst, levels);
            }
            None => {
                self.reg_to_lock_depths.remove(&dst);
            }
        }
    }

    fn clear_all_lock_depths(&mut self, reg: u32) {
        self.reg_to_lock_depths.remove(&reg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_restores_lock_depths() {
        let mut line = RegisterLine::new(4);
        line.set_register_kind(0, Kind::JavaLangObject);
        let before = line.reg_to_lock_depths.clone();
        line.push_monitor(0, Kind::JavaLangObject, 7).unwrap();
        assert_eq!(line.monitor_stack_depth(), 1);
        assert_eq!(line.monitor_enter_dex_pc(0), 7);
        line.pop_monitor(0, Kind::JavaLangObject).unwrap();
        assert_eq!(line.monitor_stack_depth(), 0);
        assert_eq!(line.reg_to_lock_depths, before);
    }

    #[test]
    fn zero_locks_alias_through_the_null_slot() {
        let mut line = RegisterLine::new(4);
        line.set_register_kind(0, Kind::Zero);
        line.set_register_kind(1, Kind::Zero);
        line.push_monitor(0, Kind::Zero, 3).unwrap();
        // A different register holding zero may release the lock.
        line.pop_monitor(1, Kind::Zero).unwrap();
        assert!(line.verify_monitor_stack_empty());
    }

    #[test]
    fn double_lock_on_same_register_fails() {
        let mut line = RegisterLine::new(2);
        line.set_register_kind(0, Kind::JavaLangObject);
        line.push_monitor(0, Kind::JavaLangObject, 0).unwrap();
        assert!(line.push_monitor(0, Kind::JavaLangObject, 1).is_err());
    }

    #[test]
    fn monitor_stack_overflow_fails() {
        let mut line = RegisterLine::new(64);
        for i in 0..MAX_MONITOR_STACK_DEPTH as u32 {
            line.set_register_kind(i, Kind::JavaLangObject);
            line.push_monitor(i, Kind::JavaLangObject, i).unwrap();
        }
        line.set_register_kind(40, Kind::JavaLangObject);
        assert!(line.push_monitor(40, Kind::JavaLangObject, 99).is_err());
    }

    #[test]
    fn copy_reference_propagates_locks() {
        let mut line = RegisterLine::new(4);
        line.set_register_kind(0, Kind::JavaLangObject);
        line.push_monitor(0, Kind::JavaLangObject, 0).unwrap();
        line.copy_reference(1, 0, line.reg_id(0));
        // Popping through the copy succeeds.
        line.pop_monitor(1, Kind::JavaLangObject).unwrap();
        assert!(line.verify_monitor_stack_empty());
        // The aliased unlock released the original register too.
        assert!(line.reg_to_lock_depths.is_empty());
    }
}
