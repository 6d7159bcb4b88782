//! Bytecode method verifier for the Dex instruction set.
//!
//! For each method the verifier decides whether the bytecode is type-safe,
//! reference-safe and structurally well-formed, so that an interpreter or
//! ahead-of-time compiler can omit most dynamic safety checks. The heart of
//! the crate is the register-type lattice with precomputed assignability and
//! merge tables, a per-method register-type cache, the per-instruction
//! register line, and the data-flow abstract interpreter on top of them.
//!
//! Class loading and instruction-stream parsing stay outside: callers hand
//! in a [`ClassResolver`](crate::resolver::ClassResolver) implementation and
//! decoded code units, and read back a
//! [`FailureData`](crate::error::FailureData) verdict.

pub mod error;
pub mod reg_type;
pub mod reg_type_cache;
pub mod register_line;
pub mod resolver;
pub mod verifier;

pub mod prelude {
    //! Re-exports of the types most callers need.

    pub use dex_asm::{op, Instruction, Opcode};
    pub use dex_types::{BitVector, DexPc, TypeIndex};

    pub use crate::error::{ErrorKind, FailureData, FailureKind, VerifyFailure};
    pub use crate::reg_type::{Assignability, Kind};
    pub use crate::reg_type_cache::{CacheId, RegTypeCache};
    pub use crate::register_line::RegisterLine;
    pub use crate::resolver::{
        CatchHandler, ClassDef, ClassHandle, ClassResolver, CodeItem, MethodInfo, PrimitiveType,
        ResolvedField, ResolvedMethod, TryItem,
    };
    pub use crate::verifier::{find_locks_at_dex_pc, verify_method, DexLockInfo, VerifierOptions};
}
