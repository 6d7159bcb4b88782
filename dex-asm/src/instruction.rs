use crate::{Format, Opcode};
use dex_types::DexPc;

/// A decoded-instruction cursor positioned at a dex pc inside a method's
/// code-unit stream.
///
/// The cursor borrows the whole stream so that payload pseudo-instructions
/// and relative targets can be inspected without re-slicing at every step.
/// Operand extraction follows the instruction format; asking for an operand
/// a format does not carry is a programming error and debug-asserts.
#[derive(Clone, Copy)]
pub struct Instruction<'a> {
    insns: &'a [u16],
    pc: usize,
}

impl<'a> Instruction<'a> {
    /// Position a cursor at `dex_pc`.
    pub fn at(insns: &'a [u16], dex_pc: DexPc) -> Self {
        debug_assert!((dex_pc as usize) < insns.len());
        Self {
            insns,
            pc: dex_pc as usize,
        }
    }

    /// The dex pc this cursor is positioned at.
    pub fn dex_pc(&self) -> DexPc {
        self.pc as DexPc
    }

    /// Fetch the code unit at `offset` from the instruction start.
    pub fn fetch(&self, offset: usize) -> u16 {
        self.insns[self.pc + offset]
    }

    /// The first code unit, carrying the opcode byte and packed operands.
    pub fn inst_data(&self) -> u16 {
        self.fetch(0)
    }

    /// The opcode of this instruction.
    pub fn opcode(&self) -> Opcode {
        Opcode::from((self.inst_data() & 0xff) as u8)
    }

    /// Width of this instruction in code units, including payload data for
    /// the switch and array-data pseudo-instructions.
    ///
    /// The caller must have established that the payload header is in
    /// bounds; the widths pass performs its own bounds-checked variant of
    /// this computation.
    pub fn size_in_code_units(&self) -> u32 {
        let opcode = self.opcode();
        if opcode == Opcode::NOP {
            match self.inst_data() {
                crate::PACKED_SWITCH_SIGNATURE => 4 + 2 * self.fetch(1) as u32,
                crate::SPARSE_SWITCH_SIGNATURE => 2 + 4 * self.fetch(1) as u32,
                crate::ARRAY_DATA_SIGNATURE => {
                    let element_width = self.fetch(1) as u64;
                    let length = self.fetch(2) as u64 | (self.fetch(3) as u64) << 16;
                    (4 + (element_width * length + 1) / 2) as u32
                }
                _ => 1,
            }
        } else {
            opcode.format().size_in_code_units()
        }
    }

    /// The `vA` operand, unsigned.
    pub fn vreg_a(&self) -> u32 {
        let d = self.inst_data() as u32;
        match self.opcode().format() {
            Format::F10x => (d >> 8) & 0xff,
            Format::F12x | Format::F11n => (d >> 8) & 0x0f,
            Format::F11x
            | Format::F10t
            | Format::F22x
            | Format::F21t
            | Format::F21s
            | Format::F21h
            | Format::F21c
            | Format::F23x
            | Format::F22b
            | Format::F31t
            | Format::F31i
            | Format::F31c
            | Format::F51l
            | Format::F3rc
            | Format::F4rcc => (d >> 8) & 0xff,
            Format::F22t | Format::F22s | Format::F22c => (d >> 8) & 0x0f,
            Format::F32x => self.fetch(1) as u32,
            Format::F35c | Format::F45cc => d >> 12,
            Format::F20t => self.fetch(1) as u32,
            Format::F30t => self.fetch(1) as u32 | (self.fetch(2) as u32) << 16,
        }
    }

    /// The `vB` operand, unsigned.
    pub fn vreg_b(&self) -> u32 {
        let d = self.inst_data() as u32;
        match self.opcode().format() {
            Format::F12x | Format::F11n => d >> 12,
            Format::F22x
            | Format::F21t
            | Format::F21s
            | Format::F21h
            | Format::F21c
            | Format::F35c
            | Format::F3rc
            | Format::F45cc
            | Format::F4rcc => self.fetch(1) as u32,
            Format::F23x | Format::F22b => self.fetch(1) as u32 & 0xff,
            Format::F22t | Format::F22s | Format::F22c => d >> 12,
            Format::F32x => self.fetch(2) as u32,
            Format::F31t | Format::F31i | Format::F31c | Format::F51l => {
                self.fetch(1) as u32 | (self.fetch(2) as u32) << 16
            }
            Format::F10x | Format::F11x | Format::F10t | Format::F20t | Format::F30t => {
                debug_assert!(false, "format without vB");
                0
            }
        }
    }

    /// The `vC` operand, unsigned.
    pub fn vreg_c(&self) -> u32 {
        match self.opcode().format() {
            Format::F23x | Format::F22b => self.fetch(1) as u32 >> 8,
            Format::F22t | Format::F22s | Format::F22c => self.fetch(1) as u32,
            Format::F35c | Format::F45cc => self.fetch(2) as u32 & 0x0f,
            Format::F3rc | Format::F4rcc => self.fetch(2) as u32,
            _ => {
                debug_assert!(false, "format without vC");
                0
            }
        }
    }

    /// The `vH` operand, unsigned.
    pub fn vreg_h(&self) -> u32 {
        match self.opcode().format() {
            Format::F45cc | Format::F4rcc => self.fetch(3) as u32,
            _ => {
                debug_assert!(false, "format without vH");
                0
            }
        }
    }

    /// Sign-extended literal operand of a constant or literal-arithmetic
    /// instruction. For the `high16` variants this is the raw 16-bit field;
    /// shifting it into the high half is the consumer's business.
    pub fn literal(&self) -> i64 {
        match self.opcode().format() {
            Format::F11n => (self.inst_data() as i16 >> 12) as i64,
            Format::F21s | Format::F22s | Format::F21h => self.fetch(1) as i16 as i64,
            Format::F22b => (self.fetch(1) >> 8) as u8 as i8 as i64,
            Format::F31i => {
                (self.fetch(1) as u32 | (self.fetch(2) as u32) << 16) as i32 as i64
            }
            Format::F51l => {
                (self.fetch(1) as u64
                    | (self.fetch(2) as u64) << 16
                    | (self.fetch(3) as u64) << 32
                    | (self.fetch(4) as u64) << 48) as i64
            }
            _ => {
                debug_assert!(false, "format without a literal");
                0
            }
        }
    }

    /// Relative branch offset in code units.
    pub fn branch_offset(&self) -> i32 {
        match self.opcode().format() {
            Format::F10t => (self.inst_data() as i16 >> 8) as i32,
            Format::F20t | Format::F21t | Format::F22t => self.fetch(1) as i16 as i32,
            Format::F30t | Format::F31t => {
                (self.fetch(1) as u32 | (self.fetch(2) as u32) << 16) as i32
            }
            _ => {
                debug_assert!(false, "format without a branch offset");
                0
            }
        }
    }

    /// Argument registers of a non-range var-arg instruction. Only the
    /// first `vreg_a()` entries are meaningful.
    pub fn var_args(&self) -> [u32; crate::MAX_VAR_ARG_REGS] {
        debug_assert!(matches!(
            self.opcode().format(),
            Format::F35c | Format::F45cc
        ));
        let regs = self.fetch(2) as u32;
        [
            regs & 0x0f,
            (regs >> 4) & 0x0f,
            (regs >> 8) & 0x0f,
            (regs >> 12) & 0x0f,
            (self.inst_data() as u32 >> 8) & 0x0f,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op;

    #[test]
    fn decodes_simple_add() {
        // const/4 v0, #2; add-int/2addr v0, v0; return v0
        let code = [op::const4(0, 2), op::add_int_2addr(0, 0), op::ret(0)].concat();
        let inst = Instruction::at(&code, 0);
        assert_eq!(inst.opcode(), Opcode::CONST_4);
        assert_eq!(inst.vreg_a(), 0);
        assert_eq!(inst.literal(), 2);
        assert_eq!(inst.size_in_code_units(), 1);

        let inst = Instruction::at(&code, 1);
        assert_eq!(inst.opcode(), Opcode::ADD_INT_2ADDR);
        assert_eq!(inst.vreg_a(), 0);
        assert_eq!(inst.vreg_b(), 0);

        let inst = Instruction::at(&code, 2);
        assert_eq!(inst.opcode(), Opcode::RETURN);
        assert_eq!(inst.vreg_a(), 0);
    }

    #[rstest::rstest]
    #[case(op::const4(3, -1), -1)]
    #[case(op::const4(0, -8), -8)]
    #[case(op::const16(0, -32768), -32768)]
    #[case(op::const_(0, -1), -1)]
    #[case(op::const_(0, i32::MIN), i32::MIN as i64)]
    #[case(op::f51l(Opcode::CONST_WIDE, 0, i64::MIN), i64::MIN)]
    fn negative_literals_sign_extend(#[case] code: Vec<u16>, #[case] expected: i64) {
        assert_eq!(Instruction::at(&code, 0).literal(), expected);
    }

    #[test]
    fn branch_offsets_sign_extend() {
        let code = [op::goto_(-3), op::nop(), op::nop()].concat();
        assert_eq!(Instruction::at(&code, 0).branch_offset(), -3);
        let code = op::if_eqz(1, -10);
        assert_eq!(Instruction::at(&code, 0).branch_offset(), -10);
        let code = op::goto32(1);
        assert_eq!(Instruction::at(&code, 0).branch_offset(), 1);
    }

    #[test]
    fn invoke_var_args_unpack() {
        // invoke-direct {v2, v5, v7}, meth@17
        let code = op::invoke_direct(&[2, 5, 7], 17);
        let inst = Instruction::at(&code, 0);
        assert_eq!(inst.opcode(), Opcode::INVOKE_DIRECT);
        assert_eq!(inst.vreg_a(), 3);
        assert_eq!(inst.vreg_b(), 17);
        let args = inst.var_args();
        assert_eq!(&args[..3], &[2, 5, 7]);
    }

    #[test]
    fn payload_widths() {
        let mut code = op::nop();
        code.extend([crate::PACKED_SWITCH_SIGNATURE, 2, 0, 0, 5, 0, 7, 0]);
        let payload = Instruction::at(&code, 1);
        assert_eq!(payload.opcode(), Opcode::NOP);
        assert_eq!(payload.size_in_code_units(), 4 + 2 * 2);

        let mut code = op::nop();
        code.extend([crate::ARRAY_DATA_SIGNATURE, 2, 3, 0, 0, 0, 0]);
        let payload = Instruction::at(&code, 1);
        assert_eq!(payload.size_in_code_units(), 4 + (2 * 3 + 1) / 2);
    }
}
