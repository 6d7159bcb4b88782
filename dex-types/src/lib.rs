#![warn(missing_docs)]

//! Atomic types shared by the Dex method verifier crates.
//!
//! This crate carries no verification logic of its own: it defines the
//! newtypes for constant-pool indices and the dense bit-vector engine used
//! to represent lock depths and unresolved-type sets.

mod bit_vector;
mod index_types;

pub use bit_vector::{BitVector, BitVectorView, BitVectorViewMut, BitWord};
pub use index_types::{
    CallSiteIndex, FieldIndex, MethodHandleIndex, MethodIndex, ProtoIndex, StringIndex, TypeIndex,
};

/// A dex program counter, in 16-bit code units from the start of a method.
pub type DexPc = u32;

/// Sentinel for "no dex pc recorded".
pub const NO_DEX_PC: DexPc = u32::MAX;
