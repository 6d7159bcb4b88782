//! Method resolution and invocation argument verification.

use dex_asm::Instruction;
use dex_types::{CallSiteIndex, MethodIndex, ProtoIndex, TypeIndex};

use super::instruction::CheckAccess;
use super::MethodVerifier;
use crate::error::ErrorKind;
use crate::reg_type::Kind;
use crate::resolver::{ClassHandle, ClassResolver, ResolvedMethod};

/// The dispatch flavor implied by an invoke opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MethodType {
    Direct,
    Static,
    Virtual,
    Super,
    Interface,
    Polymorphic,
}

impl std::fmt::Display for MethodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MethodType::Direct => "direct",
            MethodType::Static => "static",
            MethodType::Virtual => "virtual",
            MethodType::Super => "super",
            MethodType::Interface => "interface",
            MethodType::Polymorphic => "polymorphic",
        };
        write!(f, "{name}")
    }
}

impl<'a, R: ClassResolver> MethodVerifier<'a, R> {
    /// Resolve the target of an invoke and check that the reference, the
    /// dispatch flavor and the accessibility all line up.
    pub(crate) fn resolve_method_and_check_access(
        &mut self,
        method_idx: MethodIndex,
        method_type: MethodType,
    ) -> Option<ResolvedMethod<R::Class>> {
        let method_ref = self.resolver.method_ref(method_idx);
        let method_name = method_ref.name.to_owned();
        let class_idx = method_ref.class_idx;
        let klass_type = self.resolve_class(class_idx, CheckAccess::Yes);
        let klass_kind = self.reg_types.kind_of(klass_type);
        if matches!(klass_kind, Kind::Conflict) {
            self.append_to_last_failure(&format!(" in attempt to access method {method_name}"));
            return None;
        }
        if klass_kind.is_unresolved_types() {
            // Nothing more can be checked against an unresolved class.
            return None;
        }
        let klass = self.reg_type_class(klass_type)?;

        let mut must_fail = false;
        let resolved = match self.resolver.resolve_method(method_idx) {
            Some(method) => Some(method),
            None => {
                // Look for the method with the incompatible shape purely
                // for a better error message.
                must_fail = true;
                self.resolver.find_incompatible_method(method_idx)
            }
        };
        let Some(res_method) = resolved else {
            let message = format!(
                "couldn't find method {}.{method_name}",
                klass.descriptor()
            );
            self.fail(ErrorKind::NoMethod, message);
            return None;
        };

        // Constructor calls must be direct, and class initializers may
        // never be called explicitly.
        if res_method.is_any_constructor() && method_type != MethodType::Direct {
            let message = format!("rejecting non-direct call to constructor {method_name}");
            self.fail(ErrorKind::BadClassHard, message);
            return None;
        }
        if res_method.is_class_initializer() {
            let message = format!("rejecting call to class initializer {method_name}");
            self.fail(ErrorKind::BadClassHard, message);
            return None;
        }

        // Methods on interfaces must be called with interface, static,
        // super, or, when default methods exist, direct dispatch. The
        // converse holds for class methods and invoke-interface.
        if klass.is_interface() {
            if method_type != MethodType::Interface
                && method_type != MethodType::Static
                && (!self.resolver.supports_default_methods()
                    || method_type != MethodType::Direct)
                && method_type != MethodType::Super
            {
                let message = format!(
                    "non-interface method {method_name} is in an interface class {}",
                    klass.descriptor()
                );
                self.fail(ErrorKind::ClassChange, message);
                return None;
            }
            if method_type == MethodType::Super && res_method.declaring_class.is_object_class() {
                let message = format!(
                    "invoke-super {}.{method_name} resolved to object method but Object methods are excluded from super method resolution on interfaces.",
                    klass.descriptor()
                );
                self.fail(ErrorKind::NoMethod, message);
                return None;
            }
        } else if method_type == MethodType::Interface {
            let message = format!(
                "interface method {method_name} is in a non-interface class {}",
                klass.descriptor()
            );
            self.fail(ErrorKind::ClassChange, message);
            return None;
        }

        // Interface dispatch may reach Object methods, but only public
        // ones.
        if method_type == MethodType::Interface
            && res_method.declaring_class.is_object_class()
            && !res_method.is_public()
        {
            let message = format!(
                "invoke-interface {}.{method_name} resolved to non-public object method but non-public Object methods are excluded from interface method resolution.",
                klass.descriptor()
            );
            self.fail(ErrorKind::NoMethod, message);
            return None;
        }

        if !self.can_access_member(res_method.declaring_class, res_method.access_flags) {
            let message = format!("illegal method access (call {method_name})");
            self.fail(ErrorKind::AccessMethod, message);
            return Some(res_method);
        }

        // Private methods cannot be reached by virtual or super dispatch.
        if res_method.is_private()
            && matches!(method_type, MethodType::Virtual | MethodType::Super)
        {
            let message =
                format!("invoke-super/virtual can't be used on private method {method_name}");
            self.fail(ErrorKind::BadClassHard, message);
            return None;
        }

        // The dispatch flavor must match the resolved method's shape. The
        // only signature polymorphic methods in existence are native
        // varargs methods.
        let mismatched = match method_type {
            MethodType::Direct => !res_method.is_direct() || res_method.is_static(),
            MethodType::Static => !res_method.is_static(),
            MethodType::Super | MethodType::Virtual | MethodType::Interface => {
                res_method.is_direct()
            }
            MethodType::Polymorphic => !res_method.is_native() || !res_method.is_varargs(),
        };
        if mismatched {
            let message = format!(
                "invoke type ({method_type}) does not match method type of {method_name}"
            );
            self.fail(ErrorKind::ClassChange, message);
            return None;
        }
        debug_assert!(!must_fail, "incompatible lookup unexpectedly resolved");
        Some(res_method)
    }

    /// Resolve the invoked method and verify every argument register
    /// against the declared signature.
    pub(crate) fn verify_invocation_args(
        &mut self,
        inst: &Instruction<'_>,
        method_type: MethodType,
        is_range: bool,
    ) -> Option<ResolvedMethod<R::Class>> {
        let method_idx = MethodIndex::new(inst.vreg_b());
        let Some(res_method) = self.resolve_method_and_check_access(method_idx, method_type)
        else {
            // The method did not resolve; still check what the signature
            // allows to check statically.
            if !self.have_pending_hard_failure {
                self.verify_invocation_args_unresolved_method(inst, method_type, is_range);
            }
            return None;
        };

        if method_type == MethodType::Super
            && !self.check_invoke_super(method_idx, &res_method, inst, is_range)
        {
            return None;
        }

        let proto_idx = if method_type == MethodType::Polymorphic {
            // The call site signature, not the target method's.
            ProtoIndex::new(inst.vreg_h() as u16)
        } else {
            self.resolver.method_ref(method_idx).proto_idx
        };
        let params = self.resolver.proto(proto_idx).param_type_idxs;
        if !self.verify_invocation_args_from_params(
            &params,
            inst,
            method_type,
            is_range,
            Some(&res_method),
        ) {
            return None;
        }
        if !res_method.declaring_class.is_interface() {
            self.check_for_final_abstract_class(res_method.declaring_class);
        }
        Some(res_method)
    }

    /// `invoke-super` must target a method the superclass (or a
    /// super-interface) actually carries.
    fn check_invoke_super(
        &mut self,
        method_idx: MethodIndex,
        res_method: &ResolvedMethod<R::Class>,
        inst: &Instruction<'_>,
        is_range: bool,
    ) -> bool {
        let class_idx = self.resolver.method_ref(method_idx).class_idx;
        let reference_type = self.reg_types.from_type_index(class_idx);
        let reference_kind = self.reg_types.kind_of(reference_type);
        if reference_kind.is_unresolved_types() {
            // Cannot distinguish a class change from a missing method;
            // runtime sorts it out.
            self.fail(
                ErrorKind::NoMethod,
                "Unable to find referenced class from invoke-super".to_owned(),
            );
            self.verify_invocation_args_unresolved_method(inst, MethodType::Super, is_range);
            return false;
        }
        let is_interface_ref = matches!(reference_kind, Kind::Reference)
            && self.reg_types.get(reference_type).class().is_interface();
        if is_interface_ref {
            let declaring = self.declaring_class_id();
            if self.reg_type_class(declaring).is_none() {
                self.fail(
                    ErrorKind::NoClass,
                    "Unable to resolve the full class of 'this' used in an interface invoke-super"
                        .to_owned(),
                );
                self.verify_invocation_args_unresolved_method(inst, MethodType::Super, is_range);
                return false;
            }
            if !self.is_strictly_assignable_from(reference_type, declaring) {
                let message = format!(
                    "invoke-super to method {} references non-super-interface type {}",
                    res_method.name,
                    self.reg_types.dump(reference_type)
                );
                self.fail(ErrorKind::ClassChange, message);
                self.verify_invocation_args_unresolved_method(inst, MethodType::Super, is_range);
                return false;
            }
        } else {
            let Some(superclass_idx) = self.resolver.class_def().superclass_idx else {
                // Only a broken `java.lang.Object` gets here.
                self.fail(
                    ErrorKind::BadClassHard,
                    "no superclass for invoke-super".to_owned(),
                );
                return false;
            };
            let super_type = self.reg_types.from_type_index(superclass_idx);
            if self.reg_types.kind_of(super_type).is_unresolved_types() {
                let message = format!(
                    "unknown super class in invoke-super to {}",
                    res_method.name
                );
                self.fail(ErrorKind::NoMethod, message);
                self.verify_invocation_args_unresolved_method(inst, MethodType::Super, is_range);
                return false;
            }
            let declaring = self.declaring_class_id();
            let vtable_length = self
                .reg_type_class(super_type)
                .map(|klass| klass.vtable_length())
                .unwrap_or(0);
            if !self.is_strictly_assignable_from(reference_type, declaring)
                || res_method.vtable_index >= vtable_length
            {
                let message = format!(
                    "invalid invoke-super from method {} to super {}.{}",
                    self.method.method_idx,
                    self.reg_types.dump(super_type),
                    res_method.name
                );
                self.fail(ErrorKind::NoMethod, message);
                self.verify_invocation_args_unresolved_method(inst, MethodType::Super, is_range);
                return false;
            }
        }
        true
    }

    /// Static checks against the method reference's own prototype when the
    /// method did not resolve: argument counts and primitive types can
    /// still be enforced.
    pub(crate) fn verify_invocation_args_unresolved_method(
        &mut self,
        inst: &Instruction<'_>,
        method_type: MethodType,
        is_range: bool,
    ) {
        let method_idx = MethodIndex::new(inst.vreg_b());
        let proto_idx = self.resolver.method_ref(method_idx).proto_idx;
        let params = self.resolver.proto(proto_idx).param_type_idxs;
        self.verify_invocation_args_from_params(&params, inst, method_type, is_range, None);
    }

    /// The register-against-signature walk shared by all invokes: `vA`
    /// holds the expected argument register count and either the packed
    /// nibbles or the range base name the registers.
    pub(crate) fn verify_invocation_args_from_params(
        &mut self,
        params: &[TypeIndex],
        inst: &Instruction<'_>,
        method_type: MethodType,
        is_range: bool,
        res_method: Option<&ResolvedMethod<R::Class>>,
    ) -> bool {
        let expected_args = inst.vreg_a();
        debug_assert!(is_range || expected_args as usize <= dex_asm::MAX_VAR_ARG_REGS);
        if expected_args > self.code.outs_size as u32 {
            let message = format!(
                "invalid argument count ({expected_args}) exceeds outsSize ({})",
                self.code.outs_size
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }

        if method_type != MethodType::Static {
            // The receiver must be an instance of the declaring class; for
            // constructors it is the uninitialized type being initialized.
            let actual_arg_type = self.get_invocation_this(inst);
            let actual_kind = self.reg_types.kind_of(actual_arg_type);
            if matches!(actual_kind, Kind::Conflict) {
                debug_assert!(self.have_pending_hard_failure);
                return false;
            }
            let mut is_init = false;
            if actual_kind.is_uninitialized_types() {
                let target_is_constructor = match res_method {
                    Some(method) => method.is_any_constructor(),
                    None => {
                        let method_idx = MethodIndex::new(inst.vreg_b());
                        self.method_name(method_idx) == "<init>"
                    }
                };
                if !target_is_constructor {
                    self.fail(
                        ErrorKind::BadClassHard,
                        "'this' arg must be initialized".to_owned(),
                    );
                    return false;
                }
                is_init = true;
            }
            let adjusted_type = if is_init {
                self.reg_types.from_uninitialized(actual_arg_type)
            } else {
                actual_arg_type
            };
            if method_type != MethodType::Interface
                && !self.reg_types.kind_of(adjusted_type).is_zero_or_null()
            {
                // Start from the referenced class; it is usually the
                // resolved method's declaring class, except for methods
                // resolved in a superclass and miranda methods, whose
                // declaring interface must not be used for the check.
                let method_idx = MethodIndex::new(inst.vreg_b());
                let class_idx = self.resolver.method_ref(method_idx).class_idx;
                let mut res_method_class = self.reg_types.from_type_index(class_idx);
                if let Some(method) = res_method {
                    if matches!(self.reg_types.kind_of(res_method_class), Kind::Reference)
                        && !method.is_miranda
                    {
                        let klass = method.declaring_class;
                        if self.reg_types.get(res_method_class).class() != klass {
                            res_method_class = self.reg_types.from_class(klass);
                        }
                    }
                }
                if !self.is_assignable_from(res_method_class, adjusted_type) {
                    let unresolved = self
                        .reg_types
                        .kind_of(adjusted_type)
                        .is_unresolved_types();
                    let message = format!(
                        "'this' argument '{}' not instance of '{}'",
                        self.reg_types.dump(actual_arg_type),
                        self.reg_types.dump(res_method_class)
                    );
                    // Soft failures continue so later hard failures are not
                    // masked from the compiler.
                    if unresolved {
                        self.fail(ErrorKind::UnresolvedTypeCheck, message);
                    } else {
                        self.fail(ErrorKind::BadClassHard, message);
                    }
                    if self.have_pending_hard_failure {
                        return false;
                    }
                }
            }
        }

        let args = inst_var_args(inst, is_range);
        let mut sig_registers: u32 = if method_type == MethodType::Static { 0 } else { 1 };
        for &param_idx in params {
            if sig_registers >= expected_args {
                let message = format!(
                    "Rejecting invocation, expected {expected_args} argument registers, method signature has {} or more",
                    sig_registers + 1
                );
                self.fail(ErrorKind::BadClassHard, message);
                return false;
            }
            let reg_type = self.reg_types.from_type_index(param_idx);
            let reg_kind = self.reg_types.kind_of(reg_type);
            let get_reg = if is_range {
                inst.vreg_c() + sig_registers
            } else {
                args[sig_registers as usize]
            };
            if reg_kind.is_integral_types() {
                let src_kind = self.reg_kind_of(get_reg);
                if !src_kind.is_integral_types() {
                    let message = format!(
                        "register v{get_reg} has type {src_kind:?} but expected {}",
                        self.reg_types.dump(reg_type)
                    );
                    self.fail(ErrorKind::BadClassHard, message);
                    return false;
                }
            } else if !self.verify_register_type(get_reg, reg_type) {
                // Keep looking for hard failures on soft ones.
                if self.have_pending_hard_failure {
                    return false;
                }
            } else if reg_kind.is_low_half() && !is_range && sig_registers + 1 < expected_args {
                // Invokes are the only instructions naming both halves of a
                // pair explicitly; they must be consecutive.
                let second_reg = args[sig_registers as usize + 1];
                if second_reg != get_reg + 1 {
                    let message = format!(
                        "Rejecting invocation, long or double parameter at index {sig_registers} is not a pair: {get_reg} + {second_reg}."
                    );
                    self.fail(ErrorKind::BadClassHard, message);
                    return false;
                }
            }
            sig_registers += if reg_kind.is_low_half() { 2 } else { 1 };
        }
        if expected_args != sig_registers {
            let message = format!(
                "Rejecting invocation, expected {expected_args} argument registers, method signature has {sig_registers}"
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        true
    }

    /// Structural checks on a call site: the three leading values must be a
    /// method handle, a name and a method type, with in-range indices and
    /// an invoke-static bootstrap.
    pub(crate) fn check_call_site(&mut self, call_site_idx: CallSiteIndex) -> bool {
        if call_site_idx.to_usize() >= self.resolver.num_call_site_ids() {
            let message = format!(
                "Bad call site id #{call_site_idx} >= {}",
                self.resolver.num_call_site_ids()
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        let Some(site) = self.resolver.call_site(call_site_idx) else {
            let message = format!("Call site #{call_site_idx} has too few arguments");
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        };
        let in_range = site.method_handle_idx.to_usize() < self.resolver.num_method_handles()
            && site.name_idx.to_usize() < self.resolver.num_string_ids()
            && site.proto_idx.to_usize() < self.resolver.num_proto_ids();
        if !in_range {
            let message = format!("Call site id #{call_site_idx} argument has bad index");
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        if !site.method_handle_is_invoke_static {
            let message = format!(
                "Call site #{call_site_idx} argument 0 method handle type is not InvokeStatic"
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        true
    }

    /// Signature-polymorphic methods are declared on `MethodHandle` and
    /// `VarHandle` with an `Object[]` parameter and a name-determined
    /// return type.
    pub(crate) fn check_signature_polymorphic_method(
        &mut self,
        method: &ResolvedMethod<R::Class>,
    ) -> bool {
        let class_descriptor = method.declaring_class.descriptor().to_owned();
        let expected_return = match class_descriptor.as_str() {
            "Ljava/lang/invoke/MethodHandle;" => {
                method_handle_return_descriptor(&method.name)
            }
            "Ljava/lang/invoke/VarHandle;" => var_handle_return_descriptor(&method.name),
            _ => {
                let message = format!(
                    "Signature polymorphic method in unsupported class: {class_descriptor}"
                );
                self.fail(ErrorKind::BadClassHard, message);
                return false;
            }
        };
        let Some(expected_return) = expected_return else {
            let message =
                format!("Signature polymorphic method name invalid: {}", method.name);
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        };
        if method.param_descriptors.len() != 1 {
            let message = format!(
                "Signature polymorphic method has too many arguments {} != 1",
                method.param_descriptors.len()
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        if method.param_descriptors[0] != "[Ljava/lang/Object;" {
            let message = format!(
                "Signature polymorphic method has unexpected argument type: {}",
                method.param_descriptors[0]
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        if method.return_descriptor != expected_return {
            let message = format!(
                "Signature polymorphic method has unexpected return type: {} != {expected_return}",
                method.return_descriptor
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        true
    }

    /// The receiver of a polymorphic invoke must be a method or var handle.
    pub(crate) fn check_signature_polymorphic_receiver(
        &mut self,
        inst: &Instruction<'_>,
    ) -> bool {
        let this_id = self.get_invocation_this(inst);
        let this_kind = self.reg_types.kind_of(this_id);
        if this_kind.is_zero_or_null() {
            // A null receiver always passes and always fails at runtime.
            return true;
        }
        if !this_kind.is_non_zero_reference_types() {
            let message = format!(
                "invoke-polymorphic receiver is not a reference: {}",
                self.reg_types.dump(this_id)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        if this_kind.is_uninitialized_types() {
            let message = format!(
                "invoke-polymorphic receiver is uninitialized: {}",
                self.reg_types.dump(this_id)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        let Some(this_class) = self.reg_type_class(this_id) else {
            let message = format!(
                "invoke-polymorphic receiver has no class: {}",
                self.reg_types.dump(this_id)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        };
        let is_handle = ["Ljava/lang/invoke/MethodHandle;", "Ljava/lang/invoke/VarHandle;"]
            .iter()
            .filter_map(|descriptor| self.resolver.find_class(descriptor))
            .any(|handle_class| handle_class.is_assignable_from(this_class));
        if !is_handle {
            let message = format!(
                "invoke-polymorphic receiver is not a subclass of MethodHandle or VarHandle: {}",
                self.reg_types.dump(this_id)
            );
            self.fail(ErrorKind::BadClassHard, message);
            return false;
        }
        true
    }
}

fn inst_var_args(inst: &Instruction<'_>, is_range: bool) -> [u32; dex_asm::MAX_VAR_ARG_REGS] {
    if is_range {
        [0; dex_asm::MAX_VAR_ARG_REGS]
    } else {
        inst.var_args()
    }
}

fn method_handle_return_descriptor(name: &str) -> Option<&'static str> {
    match name {
        "invoke" | "invokeExact" => Some("Ljava/lang/Object;"),
        _ => None,
    }
}

fn var_handle_return_descriptor(name: &str) -> Option<&'static str> {
    match name {
        "compareAndSet"
        | "weakCompareAndSet"
        | "weakCompareAndSetAcquire"
        | "weakCompareAndSetPlain"
        | "weakCompareAndSetRelease" => Some("Z"),
        "get"
        | "getAcquire"
        | "getOpaque"
        | "getVolatile"
        | "getAndAdd"
        | "getAndAddAcquire"
        | "getAndAddRelease"
        | "getAndBitwiseAnd"
        | "getAndBitwiseAndAcquire"
        | "getAndBitwiseAndRelease"
        | "getAndBitwiseOr"
        | "getAndBitwiseOrAcquire"
        | "getAndBitwiseOrRelease"
        | "getAndBitwiseXor"
        | "getAndBitwiseXorAcquire"
        | "getAndBitwiseXorRelease"
        | "getAndSet"
        | "getAndSetAcquire"
        | "getAndSetRelease"
        | "compareAndExchange"
        | "compareAndExchangeAcquire"
        | "compareAndExchangeRelease" => Some("Ljava/lang/Object;"),
        "set" | "setOpaque" | "setRelease" | "setVolatile" => Some("V"),
        _ => None,
    }
}
