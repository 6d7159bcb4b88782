bitflags::bitflags! {
    /// Control-flow properties of an opcode.
    pub struct OpFlags: u8 {
        /// Execution can continue to the next instruction.
        const CONTINUE = 0b0000_0001;
        /// The instruction is an unconditional or conditional branch.
        const BRANCH = 0b0000_0010;
        /// The instruction is a switch dispatch.
        const SWITCH = 0b0000_0100;
        /// The instruction can throw into an enclosing handler.
        const THROW = 0b0000_1000;
        /// The instruction returns from the method.
        const RETURN = 0b0001_0000;
        /// The instruction is a method invocation.
        const INVOKE = 0b0010_0000;
    }
}

/// Static verification requirement for the `vA` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyA {
    /// Nothing to verify.
    Nothing,
    /// `vA` must be a valid register index.
    RegA,
    /// `vA` must be a valid wide register pair index.
    RegAWide,
}

/// Static verification requirement for the `vB` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyB {
    /// Nothing to verify.
    Nothing,
    /// `vB` must be a valid register index.
    RegB,
    /// `vB` must be a valid wide register pair index.
    RegBWide,
    /// `vB` is a field index with an opcode-compatible descriptor.
    FieldId,
    /// `vB` is a method index.
    MethodId,
    /// `vB` is a type index naming a non-array class.
    NewInstanceType,
    /// `vB` is a string index.
    StringId,
    /// `vB` is a type index.
    TypeId,
    /// `vB` is a call-site index.
    CallSiteId,
    /// `vB` is a method-handle index.
    MethodHandleId,
    /// `vB` is a prototype index.
    ProtoId,
    /// `vB` is a type index naming a fillable array class.
    FilledNewArrayType,
}

/// Static verification requirement for the `vC` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyC {
    /// Nothing to verify.
    Nothing,
    /// `vC` must be a valid register index.
    RegC,
    /// `vC` must be a valid wide register pair index.
    RegCWide,
    /// `vC` is a field index with an opcode-compatible descriptor.
    FieldId,
    /// `vC` is a type index naming an array class of at most 255 dimensions.
    NewArrayType,
    /// `vC` is a type index.
    TypeId,
}

/// Static verification requirement for the `vH` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyH {
    /// Nothing to verify.
    Nothing,
    /// `vH` is a prototype index.
    ProtoId,
}

/// Additional whole-instruction verification requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyExtra {
    /// Nothing to verify.
    Nothing,
    /// The instruction references a fill-array-data payload.
    ArrayData,
    /// The instruction has a branch target operand.
    BranchTarget,
    /// The instruction references a switch payload.
    SwitchTargets,
    /// The instruction names up to five argument registers.
    VarArg,
    /// Like `VarArg`, but at least one register is required.
    VarArgNonZero,
    /// The instruction names an argument register range.
    VarArgRange,
    /// Like `VarArgRange`, but at least one register is required.
    VarArgRangeNonZero,
    /// The opcode must not appear in a valid instruction stream.
    Error,
}
