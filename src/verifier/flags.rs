bitflags::bitflags! {
    /// Per-code-unit flags accumulated across the verification passes.
    pub(crate) struct InsnFlags: u8 {
        /// An instruction starts at this code unit.
        const OPCODE = 0b0000_0001;
        /// The code unit is covered by a try block.
        const IN_TRY = 0b0000_0010;
        /// A branch, switch, handler or method entry targets this pc.
        const BRANCH_TARGET = 0b0000_0100;
        /// The register line changed and the instruction must be
        /// (re-)evaluated.
        const CHANGED = 0b0000_1000;
        /// The data-flow pass processed this instruction.
        const VISITED = 0b0001_0000;
        /// The instruction returns from the method.
        const RETURN = 0b0010_0000;
    }
}

impl InsnFlags {
    pub(crate) fn visited_or_changed(self) -> bool {
        self.intersects(InsnFlags::VISITED | InsnFlags::CHANGED)
    }
}
