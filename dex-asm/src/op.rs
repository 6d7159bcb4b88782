//! Shorthand code-unit builders.
//!
//! These helpers make it practical to hand-write method bodies in tests.
//! The low-level `f*` functions encode any opcode of the matching format;
//! the named wrappers cover the instructions tests reach for most often.
//! Every builder returns the encoded code units for one instruction, to be
//! concatenated into a method's instruction stream.

use crate::Opcode;

/// Encode a `F10x` instruction.
pub fn f10x(op: Opcode) -> Vec<u16> {
    vec![op as u8 as u16]
}

/// Encode a `F12x` instruction.
pub fn f12x(op: Opcode, a: u8, b: u8) -> Vec<u16> {
    debug_assert!(a < 16 && b < 16);
    vec![op as u8 as u16 | (a as u16) << 8 | (b as u16) << 12]
}

/// Encode a `F11n` instruction.
pub fn f11n(op: Opcode, a: u8, literal: i8) -> Vec<u16> {
    debug_assert!(a < 16 && (-8..8).contains(&literal));
    vec![op as u8 as u16 | (a as u16) << 8 | ((literal as u16) & 0xf) << 12]
}

/// Encode a `F11x` instruction.
pub fn f11x(op: Opcode, aa: u8) -> Vec<u16> {
    vec![op as u8 as u16 | (aa as u16) << 8]
}

/// Encode a `F10t` instruction.
pub fn f10t(op: Opcode, offset: i8) -> Vec<u16> {
    vec![op as u8 as u16 | (offset as u8 as u16) << 8]
}

/// Encode a `F20t` instruction.
pub fn f20t(op: Opcode, offset: i16) -> Vec<u16> {
    vec![op as u8 as u16, offset as u16]
}

/// Encode a `F30t` instruction.
pub fn f30t(op: Opcode, offset: i32) -> Vec<u16> {
    vec![op as u8 as u16, offset as u16, (offset as u32 >> 16) as u16]
}

/// Encode a `F22x` instruction.
pub fn f22x(op: Opcode, aa: u8, bbbb: u16) -> Vec<u16> {
    vec![op as u8 as u16 | (aa as u16) << 8, bbbb]
}

/// Encode a `F32x` instruction.
pub fn f32x(op: Opcode, aaaa: u16, bbbb: u16) -> Vec<u16> {
    vec![op as u8 as u16, aaaa, bbbb]
}

/// Encode a `F21t`, `F21s` or `F21c` instruction.
pub fn f21u(op: Opcode, aa: u8, b: u16) -> Vec<u16> {
    vec![op as u8 as u16 | (aa as u16) << 8, b]
}

/// Encode a `F23x` instruction.
pub fn f23x(op: Opcode, aa: u8, bb: u8, cc: u8) -> Vec<u16> {
    vec![op as u8 as u16 | (aa as u16) << 8, bb as u16 | (cc as u16) << 8]
}

/// Encode a `F22b` instruction.
pub fn f22b(op: Opcode, aa: u8, bb: u8, literal: i8) -> Vec<u16> {
    vec![
        op as u8 as u16 | (aa as u16) << 8,
        bb as u16 | (literal as u8 as u16) << 8,
    ]
}

/// Encode a `F22t`, `F22s` or `F22c` instruction.
pub fn f22u(op: Opcode, a: u8, b: u8, c: u16) -> Vec<u16> {
    debug_assert!(a < 16 && b < 16);
    vec![op as u8 as u16 | (a as u16) << 8 | (b as u16) << 12, c]
}

/// Encode a `F31t`, `F31i` or `F31c` instruction.
pub fn f31u(op: Opcode, aa: u8, b: u32) -> Vec<u16> {
    vec![op as u8 as u16 | (aa as u16) << 8, b as u16, (b >> 16) as u16]
}

/// Encode a `F35c` instruction.
pub fn f35c(op: Opcode, regs: &[u8], bbbb: u16) -> Vec<u16> {
    debug_assert!(regs.len() <= crate::MAX_VAR_ARG_REGS);
    debug_assert!(regs.iter().all(|&r| r < 16));
    let reg = |i: usize| *regs.get(i).unwrap_or(&0) as u16;
    vec![
        op as u8 as u16 | (regs.len() as u16) << 12 | reg(4) << 8,
        bbbb,
        reg(0) | reg(1) << 4 | reg(2) << 8 | reg(3) << 12,
    ]
}

/// Encode a `F3rc` instruction.
pub fn f3rc(op: Opcode, count: u8, bbbb: u16, cccc: u16) -> Vec<u16> {
    vec![op as u8 as u16 | (count as u16) << 8, bbbb, cccc]
}

/// Encode a `F45cc` instruction.
pub fn f45cc(op: Opcode, regs: &[u8], bbbb: u16, hhhh: u16) -> Vec<u16> {
    debug_assert!(regs.len() <= crate::MAX_VAR_ARG_REGS);
    let reg = |i: usize| *regs.get(i).unwrap_or(&0) as u16;
    vec![
        op as u8 as u16 | (regs.len() as u16) << 12 | reg(4) << 8,
        bbbb,
        reg(0) | reg(1) << 4 | reg(2) << 8 | reg(3) << 12,
        hhhh,
    ]
}

/// Encode a `F4rcc` instruction.
pub fn f4rcc(op: Opcode, count: u8, bbbb: u16, cccc: u16, hhhh: u16) -> Vec<u16> {
    vec![op as u8 as u16 | (count as u16) << 8, bbbb, cccc, hhhh]
}

/// Encode a `F51l` instruction.
pub fn f51l(op: Opcode, aa: u8, literal: i64) -> Vec<u16> {
    let bits = literal as u64;
    vec![
        op as u8 as u16 | (aa as u16) << 8,
        bits as u16,
        (bits >> 16) as u16,
        (bits >> 32) as u16,
        (bits >> 48) as u16,
    ]
}

/// `nop`
pub fn nop() -> Vec<u16> {
    f10x(Opcode::NOP)
}

/// `move vA, vB`
pub fn move_(a: u8, b: u8) -> Vec<u16> {
    f12x(Opcode::MOVE, a, b)
}

/// `move-object vA, vB`
pub fn move_object(a: u8, b: u8) -> Vec<u16> {
    f12x(Opcode::MOVE_OBJECT, a, b)
}

/// `move-object/from16 vAA, vBBBB`
pub fn move_object_from16(aa: u8, bbbb: u16) -> Vec<u16> {
    f22x(Opcode::MOVE_OBJECT_FROM16, aa, bbbb)
}

/// `move-wide vA, vB`
pub fn move_wide(a: u8, b: u8) -> Vec<u16> {
    f12x(Opcode::MOVE_WIDE, a, b)
}

/// `move-result vAA`
pub fn move_result(aa: u8) -> Vec<u16> {
    f11x(Opcode::MOVE_RESULT, aa)
}

/// `move-result-wide vAA`
pub fn move_result_wide(aa: u8) -> Vec<u16> {
    f11x(Opcode::MOVE_RESULT_WIDE, aa)
}

/// `move-result-object vAA`
pub fn move_result_object(aa: u8) -> Vec<u16> {
    f11x(Opcode::MOVE_RESULT_OBJECT, aa)
}

/// `move-exception vAA`
pub fn move_exception(aa: u8) -> Vec<u16> {
    f11x(Opcode::MOVE_EXCEPTION, aa)
}

/// `return-void`
pub fn return_void() -> Vec<u16> {
    f10x(Opcode::RETURN_VOID)
}

/// `return vAA`
pub fn ret(aa: u8) -> Vec<u16> {
    f11x(Opcode::RETURN, aa)
}

/// `return-wide vAA`
pub fn return_wide(aa: u8) -> Vec<u16> {
    f11x(Opcode::RETURN_WIDE, aa)
}

/// `return-object vAA`
pub fn return_object(aa: u8) -> Vec<u16> {
    f11x(Opcode::RETURN_OBJECT, aa)
}

/// `const/4 vA, #+B`
pub fn const4(a: u8, literal: i8) -> Vec<u16> {
    f11n(Opcode::CONST_4, a, literal)
}

/// `const/16 vAA, #+BBBB`
pub fn const16(aa: u8, literal: i16) -> Vec<u16> {
    f21u(Opcode::CONST_16, aa, literal as u16)
}

/// `const vAA, #+BBBBBBBB`
pub fn const_(aa: u8, literal: i32) -> Vec<u16> {
    f31u(Opcode::CONST, aa, literal as u32)
}

/// `const-wide/16 vAA, #+BBBB`
pub fn const_wide16(aa: u8, literal: i16) -> Vec<u16> {
    f21u(Opcode::CONST_WIDE_16, aa, literal as u16)
}

/// `const-string vAA, string@BBBB`
pub fn const_string(aa: u8, string_idx: u16) -> Vec<u16> {
    f21u(Opcode::CONST_STRING, aa, string_idx)
}

/// `const-class vAA, type@BBBB`
pub fn const_class(aa: u8, type_idx: u16) -> Vec<u16> {
    f21u(Opcode::CONST_CLASS, aa, type_idx)
}

/// `monitor-enter vAA`
pub fn monitor_enter(aa: u8) -> Vec<u16> {
    f11x(Opcode::MONITOR_ENTER, aa)
}

/// `monitor-exit vAA`
pub fn monitor_exit(aa: u8) -> Vec<u16> {
    f11x(Opcode::MONITOR_EXIT, aa)
}

/// `check-cast vAA, type@BBBB`
pub fn check_cast(aa: u8, type_idx: u16) -> Vec<u16> {
    f21u(Opcode::CHECK_CAST, aa, type_idx)
}

/// `instance-of vA, vB, type@CCCC`
pub fn instance_of(a: u8, b: u8, type_idx: u16) -> Vec<u16> {
    f22u(Opcode::INSTANCE_OF, a, b, type_idx)
}

/// `array-length vA, vB`
pub fn array_length(a: u8, b: u8) -> Vec<u16> {
    f12x(Opcode::ARRAY_LENGTH, a, b)
}

/// `new-instance vAA, type@BBBB`
pub fn new_instance(aa: u8, type_idx: u16) -> Vec<u16> {
    f21u(Opcode::NEW_INSTANCE, aa, type_idx)
}

/// `new-array vA, vB, type@CCCC`
pub fn new_array(a: u8, b: u8, type_idx: u16) -> Vec<u16> {
    f22u(Opcode::NEW_ARRAY, a, b, type_idx)
}

/// `filled-new-array {regs}, type@BBBB`
pub fn filled_new_array(regs: &[u8], type_idx: u16) -> Vec<u16> {
    f35c(Opcode::FILLED_NEW_ARRAY, regs, type_idx)
}

/// `fill-array-data vAA, +BBBBBBBB`
pub fn fill_array_data(aa: u8, offset: i32) -> Vec<u16> {
    f31u(Opcode::FILL_ARRAY_DATA, aa, offset as u32)
}

/// `throw vAA`
pub fn throw(aa: u8) -> Vec<u16> {
    f11x(Opcode::THROW, aa)
}

/// `goto +AA`
pub fn goto_(offset: i8) -> Vec<u16> {
    f10t(Opcode::GOTO, offset)
}

/// `goto/16 +AAAA`
pub fn goto16(offset: i16) -> Vec<u16> {
    f20t(Opcode::GOTO_16, offset)
}

/// `goto/32 +AAAAAAAA`
pub fn goto32(offset: i32) -> Vec<u16> {
    f30t(Opcode::GOTO_32, offset)
}

/// `packed-switch vAA, +BBBBBBBB`
pub fn packed_switch(aa: u8, offset: i32) -> Vec<u16> {
    f31u(Opcode::PACKED_SWITCH, aa, offset as u32)
}

/// `if-eq vA, vB, +CCCC`
pub fn if_eq(a: u8, b: u8, offset: i16) -> Vec<u16> {
    f22u(Opcode::IF_EQ, a, b, offset as u16)
}

/// `if-ne vA, vB, +CCCC`
pub fn if_ne(a: u8, b: u8, offset: i16) -> Vec<u16> {
    f22u(Opcode::IF_NE, a, b, offset as u16)
}

/// `if-eqz vAA, +BBBB`
pub fn if_eqz(aa: u8, offset: i16) -> Vec<u16> {
    f21u(Opcode::IF_EQZ, aa, offset as u16)
}

/// `if-nez vAA, +BBBB`
pub fn if_nez(aa: u8, offset: i16) -> Vec<u16> {
    f21u(Opcode::IF_NEZ, aa, offset as u16)
}

/// `aget vAA, vBB, vCC`
pub fn aget(aa: u8, bb: u8, cc: u8) -> Vec<u16> {
    f23x(Opcode::AGET, aa, bb, cc)
}

/// `aget-object vAA, vBB, vCC`
pub fn aget_object(aa: u8, bb: u8, cc: u8) -> Vec<u16> {
    f23x(Opcode::AGET_OBJECT, aa, bb, cc)
}

/// `aget-wide vAA, vBB, vCC`
pub fn aget_wide(aa: u8, bb: u8, cc: u8) -> Vec<u16> {
    f23x(Opcode::AGET_WIDE, aa, bb, cc)
}

/// `aput vAA, vBB, vCC`
pub fn aput(aa: u8, bb: u8, cc: u8) -> Vec<u16> {
    f23x(Opcode::APUT, aa, bb, cc)
}

/// `aput-object vAA, vBB, vCC`
pub fn aput_object(aa: u8, bb: u8, cc: u8) -> Vec<u16> {
    f23x(Opcode::APUT_OBJECT, aa, bb, cc)
}

/// `iget vA, vB, field@CCCC`
pub fn iget(a: u8, b: u8, field_idx: u16) -> Vec<u16> {
    f22u(Opcode::IGET, a, b, field_idx)
}

/// `iget-object vA, vB, field@CCCC`
pub fn iget_object(a: u8, b: u8, field_idx: u16) -> Vec<u16> {
    f22u(Opcode::IGET_OBJECT, a, b, field_idx)
}

/// `iput vA, vB, field@CCCC`
pub fn iput(a: u8, b: u8, field_idx: u16) -> Vec<u16> {
    f22u(Opcode::IPUT, a, b, field_idx)
}

/// `sget vAA, field@BBBB`
pub fn sget(aa: u8, field_idx: u16) -> Vec<u16> {
    f21u(Opcode::SGET, aa, field_idx)
}

/// `sput vAA, field@BBBB`
pub fn sput(aa: u8, field_idx: u16) -> Vec<u16> {
    f21u(Opcode::SPUT, aa, field_idx)
}

/// `invoke-virtual {regs}, meth@BBBB`
pub fn invoke_virtual(regs: &[u8], method_idx: u16) -> Vec<u16> {
    f35c(Opcode::INVOKE_VIRTUAL, regs, method_idx)
}

/// `invoke-direct {regs}, meth@BBBB`
pub fn invoke_direct(regs: &[u8], method_idx: u16) -> Vec<u16> {
    f35c(Opcode::INVOKE_DIRECT, regs, method_idx)
}

/// `invoke-static {regs}, meth@BBBB`
pub fn invoke_static(regs: &[u8], method_idx: u16) -> Vec<u16> {
    f35c(Opcode::INVOKE_STATIC, regs, method_idx)
}

/// `invoke-interface {regs}, meth@BBBB`
pub fn invoke_interface(regs: &[u8], method_idx: u16) -> Vec<u16> {
    f35c(Opcode::INVOKE_INTERFACE, regs, method_idx)
}

/// `add-int vAA, vBB, vCC`
pub fn add_int(aa: u8, bb: u8, cc: u8) -> Vec<u16> {
    f23x(Opcode::ADD_INT, aa, bb, cc)
}

/// `add-int/2addr vA, vB`
pub fn add_int_2addr(a: u8, b: u8) -> Vec<u16> {
    f12x(Opcode::ADD_INT_2ADDR, a, b)
}

/// `add-int/lit8 vAA, vBB, #+CC`
pub fn add_int_lit8(aa: u8, bb: u8, literal: i8) -> Vec<u16> {
    f22b(Opcode::ADD_INT_LIT8, aa, bb, literal)
}

/// `and-int/lit8 vAA, vBB, #+CC`
pub fn and_int_lit8(aa: u8, bb: u8, literal: i8) -> Vec<u16> {
    f22b(Opcode::AND_INT_LIT8, aa, bb, literal)
}

/// `div-int vAA, vBB, vCC`
pub fn div_int(aa: u8, bb: u8, cc: u8) -> Vec<u16> {
    f23x(Opcode::DIV_INT, aa, bb, cc)
}

/// `neg-int vA, vB`
pub fn neg_int(a: u8, b: u8) -> Vec<u16> {
    f12x(Opcode::NEG_INT, a, b)
}

/// `int-to-long vA, vB`
pub fn int_to_long(a: u8, b: u8) -> Vec<u16> {
    f12x(Opcode::INT_TO_LONG, a, b)
}

/// `add-long vAA, vBB, vCC`
pub fn add_long(aa: u8, bb: u8, cc: u8) -> Vec<u16> {
    f23x(Opcode::ADD_LONG, aa, bb, cc)
}

/// `cmp-long vAA, vBB, vCC`
pub fn cmp_long(aa: u8, bb: u8, cc: u8) -> Vec<u16> {
    f23x(Opcode::CMP_LONG, aa, bb, cc)
}
