#![warn(missing_docs)]

//! Decoded-instruction surface of the Dex instruction set.
//!
//! The single source of truth is the opcode table in [`opcode`], which drives
//! the [`Opcode`] enum, the per-opcode format, control-flow flags and operand
//! verification metadata. [`Instruction`] is a cursor over raw 16-bit code
//! units that extracts operands according to the instruction format.

#[macro_use]
mod macros;

mod flags;
mod format;
mod instruction;
pub mod op;
mod opcode;

pub use flags::{OpFlags, VerifyA, VerifyB, VerifyC, VerifyExtra, VerifyH};
pub use format::Format;
pub use instruction::Instruction;
pub use opcode::{MemAccess, Opcode};

/// A raw 16-bit Dex code unit.
pub type CodeUnit = u16;

/// Identifying first code unit of a packed-switch payload.
pub const PACKED_SWITCH_SIGNATURE: CodeUnit = 0x0100;

/// Identifying first code unit of a sparse-switch payload.
pub const SPARSE_SWITCH_SIGNATURE: CodeUnit = 0x0200;

/// Identifying first code unit of a fill-array-data payload.
pub const ARRAY_DATA_SIGNATURE: CodeUnit = 0x0300;

/// Maximum number of registers a non-range var-arg instruction can name.
pub const MAX_VAR_ARG_REGS: usize = 5;
