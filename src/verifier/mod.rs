//! The method verifier.
//!
//! Verification runs in three passes over a method body: a widths pass that
//! locates instruction starts, a static pass that checks operands, indices
//! and targets, and a data-flow pass that abstractly interprets the method
//! until the register lines reach a fixed point.

use dex_types::{DexPc, MethodIndex, NO_DEX_PC};
use tracing::{debug, warn};

use crate::error::{
    can_compiler_handle_failures, ErrorKind, ErrorKinds, FailureData, FailureKind, VerifyFailure,
};
use crate::reg_type_cache::{CacheId, RegTypeCache};
use crate::register_line::RegisterLine;
use crate::resolver::{access_flags::*, ClassResolver, CodeItem, MethodInfo};

mod array;
mod field;
mod flags;
mod flow;
mod instruction;
mod invoke;
mod locks;
mod static_checks;

pub use locks::DexLockInfo;

use flags::InsnFlags;

/// Api level at which access checks extend to unresolved classes.
const SDK_P: u32 = 28;
/// Api level at which guaranteed-throw instructions stop hiding the rest of
/// their block.
const SDK_S_V2: u32 = 32;

/// A method is considered large when registers times code units exceeds
/// this; purely advisory, used for logging.
const LARGE_METHOD_THRESHOLD: usize = 4 * 1024 * 1024;

/// Host-supplied verification options.
#[derive(Debug, Clone)]
pub struct VerifierOptions {
    /// Target api level of the app; `0` means "current" and selects the
    /// strictest behavior.
    pub api_level: u32,
    /// Whether verification happens ahead of time. Affects access-check
    /// reporting and disables the legacy dead-code compatibility path.
    pub aot_mode: bool,
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self {
            api_level: 0,
            aot_mode: false,
        }
    }
}

impl VerifierOptions {
    fn effective_api_level(&self) -> u32 {
        if self.api_level == 0 {
            u32::MAX
        } else {
            self.api_level
        }
    }

    fn api_level_at_least(&self, version: u32) -> bool {
        self.effective_api_level() >= version
    }
}

/// Verify one method.
///
/// `code` is `None` for native and abstract methods. The returned
/// [`FailureData`] reduces all recorded failures into one verdict.
pub fn verify_method<R: ClassResolver>(
    resolver: &R,
    method: &MethodInfo,
    code: Option<&CodeItem>,
    options: &VerifierOptions,
) -> FailureData {
    let Some(code) = code else {
        return verify_methodless(resolver, method, options);
    };
    let mut verifier = MethodVerifier::new(resolver, method, code, options);
    verifier.collect_failure_data(options)
}

/// Run the data-flow pass, pausing at `dex_pc`, and report the locks held
/// there together with the registers aliasing each lock.
pub fn find_locks_at_dex_pc<R: ClassResolver>(
    resolver: &R,
    method: &MethodInfo,
    code: &CodeItem,
    options: &VerifierOptions,
    dex_pc: DexPc,
) -> Vec<DexLockInfo> {
    locks::find_locks_at_dex_pc(resolver, method, code, options, dex_pc)
}

/// Preconditions for methods without a code item: only native or abstract
/// methods may lack code, and the native annotations impose extra limits.
fn verify_methodless<R: ClassResolver>(
    resolver: &R,
    method: &MethodInfo,
    _options: &VerifierOptions,
) -> FailureData {
    let hard = |msg: &str| FailureData {
        kind: FailureKind::HardFailure,
        types: ErrorKinds::BAD_CLASS_HARD,
        hard_failure_msg: Some(msg.to_owned()),
    };

    if (method.access_flags & (ACC_PUBLIC | ACC_PROTECTED | ACC_PRIVATE)).count_ones() > 1 {
        return hard("method has more than one of public/protected/private");
    }
    if method.access_flags & (ACC_NATIVE | ACC_ABSTRACT) == 0 {
        return hard("zero-length code in concrete non-native method");
    }
    if method.access_flags & ACC_ABSTRACT != 0 {
        const FORBIDDEN: u32 = ACC_PRIVATE
            | ACC_STATIC
            | ACC_FINAL
            | ACC_NATIVE
            | ACC_STRICT
            | ACC_SYNCHRONIZED;
        if method.access_flags & FORBIDDEN != 0 {
            return hard("method can't be abstract and private/static/final/native/strict/synchronized");
        }
    }
    if method.access_flags & ACC_NATIVE != 0 {
        let native_flags = resolver.native_annotation_access_flags(method.method_idx);
        if native_flags & ACC_FAST_NATIVE != 0 && method.access_flags & ACC_SYNCHRONIZED != 0 {
            return hard("fast native methods cannot be synchronized");
        }
        if native_flags & ACC_CRITICAL_NATIVE != 0 {
            if method.access_flags & ACC_SYNCHRONIZED != 0 {
                return hard("critical native methods cannot be synchronized");
            }
            if method.access_flags & ACC_STATIC == 0 {
                return hard("critical native methods must be static");
            }
            let shorty = resolver.method_shorty(method.method_idx);
            if shorty.bytes().any(|c| matches!(c, b'L' | b'[')) {
                return hard(
                    "critical native methods must not have references as arguments or return type",
                );
            }
        }
    }
    FailureData::no_failure()
}

pub(crate) struct MethodVerifier<'a, R: ClassResolver> {
    pub(crate) resolver: &'a R,
    pub(crate) options: &'a VerifierOptions,
    pub(crate) method: MethodInfo,
    pub(crate) code: &'a CodeItem,
    pub(crate) reg_types: RegTypeCache<'a, R>,

    /// One flag set per code unit.
    pub(crate) insn_flags: Vec<InsnFlags>,
    /// Stored register lines, present at branch targets (and the pc a
    /// find-locks request is interested in).
    pub(crate) reg_table: Vec<Option<RegisterLine>>,
    /// The line being mutated by the current instruction.
    pub(crate) work_line: RegisterLine,
    /// Pre-instruction copy used to seed catch-handler merges.
    pub(crate) saved_line: RegisterLine,
    /// The dex pc being verified.
    pub(crate) work_insn_idx: DexPc,

    pub(crate) failures: Vec<VerifyFailure>,
    pub(crate) encountered_failure_types: ErrorKinds,
    pub(crate) have_pending_hard_failure: bool,
    /// Per-instruction flag: the instruction throws unconditionally at
    /// runtime. Reset after each instruction.
    pub(crate) have_pending_runtime_throw_failure: bool,

    /// Whether the method is a constructor; derived from the access flags
    /// with a name fallback for legacy dex files.
    pub(crate) is_constructor: bool,
    /// Lazily computed method return type.
    pub(crate) return_type: Option<CacheId>,
    /// Lazily computed declaring class type.
    pub(crate) declaring_class: Option<CacheId>,

    /// Dex pc a find-locks request wants the state for.
    pub(crate) interesting_dex_pc: Option<DexPc>,
    /// Lock information collected at the interesting pc.
    pub(crate) monitor_enter_dex_pcs: Option<Vec<DexLockInfo>>,
}

impl<'a, R: ClassResolver> MethodVerifier<'a, R> {
    pub(crate) fn new(
        resolver: &'a R,
        method: &MethodInfo,
        code: &'a CodeItem,
        options: &'a VerifierOptions,
    ) -> Self {
        Self {
            resolver,
            options,
            method: *method,
            code,
            reg_types: RegTypeCache::new(resolver),
            insn_flags: Vec::new(),
            reg_table: Vec::new(),
            work_line: RegisterLine::new(0),
            saved_line: RegisterLine::new(0),
            work_insn_idx: NO_DEX_PC,
            failures: Vec::new(),
            encountered_failure_types: ErrorKinds::empty(),
            have_pending_hard_failure: false,
            have_pending_runtime_throw_failure: false,
            is_constructor: false,
            return_type: None,
            declaring_class: None,
            interesting_dex_pc: None,
            monitor_enter_dex_pcs: None,
        }
    }

    fn collect_failure_data(&mut self, options: &VerifierOptions) -> FailureData {
        let method_idx = self.method.method_idx;
        let verified = self.verify();
        let mut result = FailureData::no_failure();
        result.types = self.encountered_failure_types;
        if verified {
            debug_assert!(!self.have_pending_hard_failure);
            if !self.failures.is_empty() {
                for failure in &self.failures {
                    debug!(method = %method_idx, %failure, "soft verification failure");
                }
                result.kind = if can_compiler_handle_failures(self.encountered_failure_types) {
                    if self
                        .encountered_failure_types
                        .contains(ErrorKinds::UNRESOLVED_TYPE_CHECK)
                    {
                        FailureKind::TypeChecksFailure
                    } else {
                        FailureKind::AccessChecksFailure
                    }
                } else {
                    // The compiler cannot consume this; force runtime
                    // re-verification.
                    FailureKind::SoftFailure
                };
            }
        } else {
            debug_assert!(self.have_pending_hard_failure);
            debug_assert!(!self.failures.is_empty());
            result.kind = FailureKind::HardFailure;
            result.hard_failure_msg = self.failures.last().map(|f| f.message.clone());
        }
        if self.is_large_method() {
            warn!(
                method = %method_idx,
                registers = self.code.registers_size,
                code_units = self.code.insns.len(),
                aot = options.aot_mode,
                "verified a large method"
            );
        }
        result
    }

    fn is_large_method(&self) -> bool {
        self.code.registers_size as usize * self.code.insns.len() > LARGE_METHOD_THRESHOLD
    }

    /// Run verification. Returns `false` when a hard failure stopped it.
    pub(crate) fn verify(&mut self) -> bool {
        // Older dex versions do not reliably mark constructors, so fall
        // back to the name.
        if self.method.access_flags & ACC_CONSTRUCTOR != 0 {
            self.is_constructor = true;
        } else {
            let name = self.resolver.method_ref(self.method.method_idx).name;
            if name.starts_with('<') {
                warn!(method = %self.method.method_idx, "method not marked as constructor");
                self.is_constructor = true;
            }
        }

        // At most one visibility flag may be set.
        if (self.method.access_flags & (ACC_PUBLIC | ACC_PROTECTED | ACC_PRIVATE)).count_ones() > 1
        {
            self.fail(
                ErrorKind::BadClassHard,
                "method has more than one of public/protected/private".to_owned(),
            );
            return false;
        }
        // Having code at all means the method must be neither native nor
        // abstract.
        if self.method.access_flags & (ACC_NATIVE | ACC_ABSTRACT) != 0 {
            self.fail(
                ErrorKind::BadClassHard,
                "non-zero-length code in abstract or native method".to_owned(),
            );
            return false;
        }
        if self.is_instance_constructor() && self.method.access_flags & ACC_SYNCHRONIZED != 0 {
            self.fail(
                ErrorKind::BadClassHard,
                "constructors can't be synchronized".to_owned(),
            );
            return false;
        }
        // ins + locals = registers, so ins cannot exceed registers.
        if self.code.ins_size > self.code.registers_size {
            self.fail(
                ErrorKind::BadClassHard,
                format!(
                    "bad register counts (ins={} regs={})",
                    self.code.ins_size, self.code.registers_size
                ),
            );
            return false;
        }
        if self.code.insns.is_empty() {
            self.fail(ErrorKind::BadClassHard, "code item has no opcode".to_owned());
            return false;
        }

        self.insn_flags = vec![InsnFlags::empty(); self.code.insns.len()];
        self.compute_widths_and_count_ops()
            && self.scan_try_catch_blocks()
            && self.verify_instructions()
            && self.verify_code_flow()
    }

    pub(crate) fn is_static(&self) -> bool {
        self.method.access_flags & ACC_STATIC != 0
    }

    pub(crate) fn is_instance_constructor(&self) -> bool {
        self.is_constructor && !self.is_static()
    }

    /// Record a failure with the runtime-throw side effects.
    pub(crate) fn fail(&mut self, kind: ErrorKind, message: String) {
        self.fail_impl(kind, message, true);
    }

    /// Record a failure without treating the instruction as throwing.
    pub(crate) fn fail_no_exc(&mut self, kind: ErrorKind, message: String) {
        debug_assert!(!matches!(kind, ErrorKind::BadClassHard));
        self.fail_impl(kind, message, false);
    }

    fn fail_impl(&mut self, kind: ErrorKind, message: String, pending_exc: bool) {
        self.encountered_failure_types |= kind.mask();
        if pending_exc {
            match kind {
                ErrorKind::BadClassHard => {
                    self.have_pending_hard_failure = true;
                }
                ErrorKind::RuntimeThrow => unreachable!("runtime throw is set internally"),
                _ => {
                    self.potentially_mark_runtime_throw();
                }
            }
        }
        debug!(dex_pc = self.work_insn_idx, %kind, %message, "verification failure");
        self.failures.push(VerifyFailure {
            kind,
            dex_pc: self.work_insn_idx,
            message,
        });
    }

    /// Record the runtime-throw marker kind directly.
    pub(crate) fn fail_runtime_throw(&mut self) {
        self.encountered_failure_types |= ErrorKinds::RUNTIME_THROW;
        self.failures.push(VerifyFailure {
            kind: ErrorKind::RuntimeThrow,
            dex_pc: self.work_insn_idx,
            message: String::new(),
        });
    }

    /// For app compatibility, code after a guaranteed runtime throw is dead
    /// for apps targeting api levels before S_V2.
    pub(crate) fn potentially_mark_runtime_throw(&mut self) {
        if self.options.aot_mode || self.options.api_level_at_least(SDK_S_V2) {
            return;
        }
        // A failure can be raised before any instruction is processed, for
        // the method signature.
        if self.work_insn_idx != NO_DEX_PC {
            let inst = self.instruction_at(self.work_insn_idx);
            let opcode = inst.opcode();
            debug_assert!(!matches!(opcode, dex_asm::Opcode::MOVE_EXCEPTION));
            if !opcode.flags().contains(dex_asm::OpFlags::THROW)
                && !Self::is_compat_throw(opcode)
                && self.insn_flags[self.work_insn_idx as usize].contains(InsnFlags::IN_TRY)
            {
                // The work line was not saved for an instruction that was
                // not expected to throw; save it now so handler merges do
                // not see garbage.
                self.saved_line.copy_from(&self.work_line);
            }
        }
        self.have_pending_runtime_throw_failure = true;
    }

    /// Instructions that are not flagged as throwing but historically may
    /// throw anyway.
    pub(crate) fn is_compat_throw(opcode: dex_asm::Opcode) -> bool {
        matches!(
            opcode,
            dex_asm::Opcode::RETURN_OBJECT | dex_asm::Opcode::MOVE_EXCEPTION
        )
    }

    /// Append detail to the most recent failure message.
    pub(crate) fn append_to_last_failure(&mut self, extra: &str) {
        if let Some(last) = self.failures.last_mut() {
            last.message.push_str(extra);
        }
    }

    /// Prefix the most recent failure message.
    pub(crate) fn prepend_to_last_failure(&mut self, prefix: &str) {
        if let Some(last) = self.failures.last_mut() {
            last.message.insert_str(0, prefix);
        }
    }

    /// A cursor into the method body. Borrows the code item, not the
    /// verifier, so the caller can keep mutating verifier state.
    pub(crate) fn instruction_at(&self, dex_pc: DexPc) -> dex_asm::Instruction<'a> {
        dex_asm::Instruction::at(&self.code.insns, dex_pc)
    }

    pub(crate) fn insns_size(&self) -> u32 {
        self.code.insns.len() as u32
    }

    /// The type of the method's declaring class, computed on first use.
    pub(crate) fn declaring_class_id(&mut self) -> CacheId {
        if let Some(id) = self.declaring_class {
            return id;
        }
        let class_idx = self.resolver.method_ref(self.method.method_idx).class_idx;
        let id = self.reg_types.from_type_index(class_idx);
        self.declaring_class = Some(id);
        id
    }

    /// The method's return type, computed on first use.
    pub(crate) fn method_return_type(&mut self) -> CacheId {
        if let Some(id) = self.return_type {
            return id;
        }
        let proto_idx = self.resolver.method_ref(self.method.method_idx).proto_idx;
        let return_idx = self.resolver.proto(proto_idx).return_type_idx;
        let id = self.reg_types.from_type_index(return_idx);
        self.return_type = Some(id);
        id
    }

    pub(crate) fn method_name(&self, method_idx: MethodIndex) -> String {
        self.resolver.method_ref(method_idx).name.to_owned()
    }
}
