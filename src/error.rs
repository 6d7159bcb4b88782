//! Verification failure kinds and the per-method verdict.

use dex_types::DexPc;
use thiserror::Error;

bitflags::bitflags! {
    /// Bitmask of the failure kinds encountered while verifying a method.
    pub struct ErrorKinds: u32 {
        /// A class could not be resolved.
        const NO_CLASS = 1 << 0;
        /// A type check could not be decided because a type is unresolved.
        const UNRESOLVED_TYPE_CHECK = 1 << 1;
        /// A method could not be resolved.
        const NO_METHOD = 1 << 2;
        /// A field could not be resolved.
        const NO_FIELD = 1 << 3;
        /// A class is not accessible from the verified class.
        const ACCESS_CLASS = 1 << 4;
        /// A field is not accessible from the verified class.
        const ACCESS_FIELD = 1 << 5;
        /// A method is not accessible from the verified class.
        const ACCESS_METHOD = 1 << 6;
        /// `new-instance` on an interface, abstract or otherwise
        /// non-instantiable class.
        const INSTANTIATION = 1 << 7;
        /// The resolved member changed shape (static vs. instance,
        /// interface vs. class).
        const CLASS_CHANGE = 1 << 8;
        /// `filled-new-array` with a component type the compiler does not
        /// handle.
        const FILLED_NEW_ARRAY = 1 << 9;
        /// Structured-locking violation.
        const LOCKING = 1 << 10;
        /// The method is structurally broken; verification stops.
        const BAD_CLASS_HARD = 1 << 11;
        /// The current instruction throws unconditionally at runtime.
        const RUNTIME_THROW = 1 << 12;
    }
}

/// One kind of verification failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    /// A class could not be resolved.
    #[error("unresolved class")]
    NoClass,
    /// A type check could not be decided because a type is unresolved.
    #[error("unresolved type check")]
    UnresolvedTypeCheck,
    /// A method could not be resolved.
    #[error("unresolved method")]
    NoMethod,
    /// A field could not be resolved.
    #[error("unresolved field")]
    NoField,
    /// A class is not accessible from the verified class.
    #[error("illegal class access")]
    AccessClass,
    /// A field is not accessible from the verified class.
    #[error("illegal field access")]
    AccessField,
    /// A method is not accessible from the verified class.
    #[error("illegal method access")]
    AccessMethod,
    /// `new-instance` on a non-instantiable class.
    #[error("non-instantiable class")]
    Instantiation,
    /// The resolved member changed shape.
    #[error("incompatible class change")]
    ClassChange,
    /// `filled-new-array` with an unsupported component type.
    #[error("unsupported filled-new-array component")]
    FilledNewArray,
    /// Structured-locking violation.
    #[error("locking violation")]
    Locking,
    /// The method is structurally broken.
    #[error("hard verification failure")]
    BadClassHard,
    /// The current instruction throws unconditionally at runtime.
    #[error("guaranteed runtime throw")]
    RuntimeThrow,
}

impl ErrorKind {
    /// The bit this kind occupies in [`ErrorKinds`].
    pub const fn mask(self) -> ErrorKinds {
        match self {
            ErrorKind::NoClass => ErrorKinds::NO_CLASS,
            ErrorKind::UnresolvedTypeCheck => ErrorKinds::UNRESOLVED_TYPE_CHECK,
            ErrorKind::NoMethod => ErrorKinds::NO_METHOD,
            ErrorKind::NoField => ErrorKinds::NO_FIELD,
            ErrorKind::AccessClass => ErrorKinds::ACCESS_CLASS,
            ErrorKind::AccessField => ErrorKinds::ACCESS_FIELD,
            ErrorKind::AccessMethod => ErrorKinds::ACCESS_METHOD,
            ErrorKind::Instantiation => ErrorKinds::INSTANTIATION,
            ErrorKind::ClassChange => ErrorKinds::CLASS_CHANGE,
            ErrorKind::FilledNewArray => ErrorKinds::FILLED_NEW_ARRAY,
            ErrorKind::Locking => ErrorKinds::LOCKING,
            ErrorKind::BadClassHard => ErrorKinds::BAD_CLASS_HARD,
            ErrorKind::RuntimeThrow => ErrorKinds::RUNTIME_THROW,
        }
    }
}

/// A single recorded verification failure, tagged with the dex pc of the
/// instruction being verified when it was raised.
#[derive(Debug, Clone, Error)]
#[error("[0x{dex_pc:X}] {kind}: {message}")]
pub struct VerifyFailure {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Where it went wrong.
    pub dex_pc: DexPc,
    /// Human-readable detail.
    pub message: String,
}

/// Overall verdict for one method, ordered by increasing severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailureKind {
    /// The method verified cleanly.
    NoFailure,
    /// Only access checks could not be proven; the executor re-checks them.
    AccessChecksFailure,
    /// A type check involving an unresolved type was deferred to runtime.
    TypeChecksFailure,
    /// The method must be re-verified at runtime and compiled cautiously.
    SoftFailure,
    /// The method is rejected.
    HardFailure,
}

/// Verification result for a method: the reduced verdict, the union of all
/// failure-kind bits, and the message of the hard failure if there was one.
#[derive(Debug, Clone)]
pub struct FailureData {
    /// The reduced verdict.
    pub kind: FailureKind,
    /// Union of every failure kind encountered.
    pub types: ErrorKinds,
    /// The most recent hard-failure message.
    pub hard_failure_msg: Option<String>,
}

impl FailureData {
    /// A clean result.
    pub fn no_failure() -> Self {
        Self {
            kind: FailureKind::NoFailure,
            types: ErrorKinds::empty(),
            hard_failure_msg: None,
        }
    }

    /// Merge `other` into `self`, keeping the most severe verdict and the
    /// union of failure types.
    pub fn merge(&mut self, other: &FailureData) {
        self.kind = self.kind.max(other.kind);
        self.types |= other.types;
        if self.hard_failure_msg.is_none() {
            self.hard_failure_msg = other.hard_failure_msg.clone();
        }
    }
}

/// Whether a compiler can consume a method that verified with the given
/// failure-kind bits. Locking violations and guaranteed runtime throws
/// require runtime re-verification.
pub const fn can_compiler_handle_failures(types: ErrorKinds) -> bool {
    types.bits() & (ErrorKinds::LOCKING.bits() | ErrorKinds::RUNTIME_THROW.bits()) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_kind_severity_order() {
        assert!(FailureKind::NoFailure < FailureKind::AccessChecksFailure);
        assert!(FailureKind::AccessChecksFailure < FailureKind::TypeChecksFailure);
        assert!(FailureKind::TypeChecksFailure < FailureKind::SoftFailure);
        assert!(FailureKind::SoftFailure < FailureKind::HardFailure);
    }

    #[test]
    fn compiler_binding_rejects_locking_and_runtime_throw() {
        assert!(can_compiler_handle_failures(ErrorKinds::ACCESS_FIELD));
        assert!(can_compiler_handle_failures(
            ErrorKinds::UNRESOLVED_TYPE_CHECK | ErrorKinds::NO_METHOD
        ));
        assert!(!can_compiler_handle_failures(ErrorKinds::LOCKING));
        assert!(!can_compiler_handle_failures(
            ErrorKinds::ACCESS_CLASS | ErrorKinds::RUNTIME_THROW
        ));
    }

    #[test]
    fn merge_keeps_most_severe() {
        let mut a = FailureData::no_failure();
        let b = FailureData {
            kind: FailureKind::SoftFailure,
            types: ErrorKinds::LOCKING,
            hard_failure_msg: None,
        };
        a.merge(&b);
        assert_eq!(a.kind, FailureKind::SoftFailure);
        assert_eq!(a.types, ErrorKinds::LOCKING);
    }
}
