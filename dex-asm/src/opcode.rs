impl_opcodes! {
    "No operation; also shields switch and array-data payloads."
    0x00 NOP "nop" F10x [CONTINUE] (Nothing, Nothing, Nothing, Nothing, Nothing);
    "Move a category-1 value between registers."
    0x01 MOVE "move" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Move a category-1 value, 8-bit destination."
    0x02 MOVE_FROM16 "move/from16" F22x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Move a category-1 value, 16-bit registers."
    0x03 MOVE_16 "move/16" F32x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Move a register pair."
    0x04 MOVE_WIDE "move-wide" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Move a register pair, 8-bit destination."
    0x05 MOVE_WIDE_FROM16 "move-wide/from16" F22x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Move a register pair, 16-bit registers."
    0x06 MOVE_WIDE_16 "move-wide/16" F32x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Move an object reference between registers."
    0x07 MOVE_OBJECT "move-object" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Move an object reference, 8-bit destination."
    0x08 MOVE_OBJECT_FROM16 "move-object/from16" F22x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Move an object reference, 16-bit registers."
    0x09 MOVE_OBJECT_16 "move-object/16" F32x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Move the category-1 result of the most recent invoke."
    0x0a MOVE_RESULT "move-result" F11x [CONTINUE] (RegA, Nothing, Nothing, Nothing, Nothing);
    "Move the category-2 result of the most recent invoke."
    0x0b MOVE_RESULT_WIDE "move-result-wide" F11x [CONTINUE] (RegAWide, Nothing, Nothing, Nothing, Nothing);
    "Move the object result of the most recent invoke."
    0x0c MOVE_RESULT_OBJECT "move-result-object" F11x [CONTINUE] (RegA, Nothing, Nothing, Nothing, Nothing);
    "Move the caught exception into a register."
    0x0d MOVE_EXCEPTION "move-exception" F11x [CONTINUE] (RegA, Nothing, Nothing, Nothing, Nothing);
    "Return from a void method."
    0x0e RETURN_VOID "return-void" F10x [RETURN] (Nothing, Nothing, Nothing, Nothing, Nothing);
    "Return a category-1 value."
    0x0f RETURN "return" F11x [RETURN] (RegA, Nothing, Nothing, Nothing, Nothing);
    "Return a category-2 value."
    0x10 RETURN_WIDE "return-wide" F11x [RETURN] (RegAWide, Nothing, Nothing, Nothing, Nothing);
    "Return an object reference."
    0x11 RETURN_OBJECT "return-object" F11x [RETURN] (RegA, Nothing, Nothing, Nothing, Nothing);
    "Load a 4-bit signed constant."
    0x12 CONST_4 "const/4" F11n [CONTINUE] (RegA, Nothing, Nothing, Nothing, Nothing);
    "Load a 16-bit signed constant."
    0x13 CONST_16 "const/16" F21s [CONTINUE] (RegA, Nothing, Nothing, Nothing, Nothing);
    "Load a 32-bit constant."
    0x14 CONST "const" F31i [CONTINUE] (RegA, Nothing, Nothing, Nothing, Nothing);
    "Load a constant into the high-order 16 bits."
    0x15 CONST_HIGH16 "const/high16" F21h [CONTINUE] (RegA, Nothing, Nothing, Nothing, Nothing);
    "Load a 16-bit signed constant into a register pair."
    0x16 CONST_WIDE_16 "const-wide/16" F21s [CONTINUE] (RegAWide, Nothing, Nothing, Nothing, Nothing);
    "Load a 32-bit signed constant into a register pair."
    0x17 CONST_WIDE_32 "const-wide/32" F31i [CONTINUE] (RegAWide, Nothing, Nothing, Nothing, Nothing);
    "Load a 64-bit constant into a register pair."
    0x18 CONST_WIDE "const-wide" F51l [CONTINUE] (RegAWide, Nothing, Nothing, Nothing, Nothing);
    "Load a constant into the high-order 16 bits of a pair."
    0x19 CONST_WIDE_HIGH16 "const-wide/high16" F21h [CONTINUE] (RegAWide, Nothing, Nothing, Nothing, Nothing);
    "Load a string reference."
    0x1a CONST_STRING "const-string" F21c [CONTINUE | THROW] (RegA, StringId, Nothing, Nothing, Nothing);
    "Load a string reference, 32-bit index."
    0x1b CONST_STRING_JUMBO "const-string/jumbo" F31c [CONTINUE | THROW] (RegA, StringId, Nothing, Nothing, Nothing);
    "Load a class reference."
    0x1c CONST_CLASS "const-class" F21c [CONTINUE | THROW] (RegA, TypeId, Nothing, Nothing, Nothing);
    "Acquire the monitor of an object."
    0x1d MONITOR_ENTER "monitor-enter" F11x [CONTINUE | THROW] (RegA, Nothing, Nothing, Nothing, Nothing);
    "Release the monitor of an object."
    0x1e MONITOR_EXIT "monitor-exit" F11x [CONTINUE | THROW] (RegA, Nothing, Nothing, Nothing, Nothing);
    "Throw unless the reference can be cast to the given type."
    0x1f CHECK_CAST "check-cast" F21c [CONTINUE | THROW] (RegA, TypeId, Nothing, Nothing, Nothing);
    "Store whether the reference is an instance of the given type."
    0x20 INSTANCE_OF "instance-of" F22c [CONTINUE | THROW] (RegA, RegB, TypeId, Nothing, Nothing);
    "Store the length of an array."
    0x21 ARRAY_LENGTH "array-length" F12x [CONTINUE | THROW] (RegA, RegB, Nothing, Nothing, Nothing);
    "Allocate an uninitialized instance of a class."
    0x22 NEW_INSTANCE "new-instance" F21c [CONTINUE | THROW] (RegA, NewInstanceType, Nothing, Nothing, Nothing);
    "Allocate an array of the given type and length."
    0x23 NEW_ARRAY "new-array" F22c [CONTINUE | THROW] (RegA, RegB, NewArrayType, Nothing, Nothing);
    "Allocate an array filled from up to five registers."
    0x24 FILLED_NEW_ARRAY "filled-new-array" F35c [CONTINUE | THROW] (Nothing, FilledNewArrayType, Nothing, Nothing, VarArg);
    "Allocate an array filled from a register range."
    0x25 FILLED_NEW_ARRAY_RANGE "filled-new-array/range" F3rc [CONTINUE | THROW] (Nothing, FilledNewArrayType, Nothing, Nothing, VarArgRange);
    "Fill an array from an inline data payload."
    0x26 FILL_ARRAY_DATA "fill-array-data" F31t [CONTINUE | THROW] (RegA, Nothing, Nothing, Nothing, ArrayData);
    "Throw the referenced exception."
    0x27 THROW "throw" F11x [THROW] (RegA, Nothing, Nothing, Nothing, Nothing);
    "Unconditional branch, 8-bit offset."
    0x28 GOTO "goto" F10t [BRANCH] (Nothing, Nothing, Nothing, Nothing, BranchTarget);
    "Unconditional branch, 16-bit offset."
    0x29 GOTO_16 "goto/16" F20t [BRANCH] (Nothing, Nothing, Nothing, Nothing, BranchTarget);
    "Unconditional branch, 32-bit offset."
    0x2a GOTO_32 "goto/32" F30t [BRANCH] (Nothing, Nothing, Nothing, Nothing, BranchTarget);
    "Jump through a packed jump table."
    0x2b PACKED_SWITCH "packed-switch" F31t [CONTINUE | SWITCH] (RegA, Nothing, Nothing, Nothing, SwitchTargets);
    "Jump through a sparse jump table."
    0x2c SPARSE_SWITCH "sparse-switch" F31t [CONTINUE | SWITCH] (RegA, Nothing, Nothing, Nothing, SwitchTargets);
    "Compare floats, NaN bias less-than."
    0x2d CMPL_FLOAT "cmpl-float" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Compare floats, NaN bias greater-than."
    0x2e CMPG_FLOAT "cmpg-float" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Compare doubles, NaN bias less-than."
    0x2f CMPL_DOUBLE "cmpl-double" F23x [CONTINUE] (RegA, RegBWide, RegCWide, Nothing, Nothing);
    "Compare doubles, NaN bias greater-than."
    0x30 CMPG_DOUBLE "cmpg-double" F23x [CONTINUE] (RegA, RegBWide, RegCWide, Nothing, Nothing);
    "Compare longs."
    0x31 CMP_LONG "cmp-long" F23x [CONTINUE] (RegA, RegBWide, RegCWide, Nothing, Nothing);
    "Branch if the two registers compare equal."
    0x32 IF_EQ "if-eq" F22t [CONTINUE | BRANCH] (RegA, RegB, Nothing, Nothing, BranchTarget);
    "Branch if the two registers compare not-equal."
    0x33 IF_NE "if-ne" F22t [CONTINUE | BRANCH] (RegA, RegB, Nothing, Nothing, BranchTarget);
    "Branch if less-than."
    0x34 IF_LT "if-lt" F22t [CONTINUE | BRANCH] (RegA, RegB, Nothing, Nothing, BranchTarget);
    "Branch if greater-or-equal."
    0x35 IF_GE "if-ge" F22t [CONTINUE | BRANCH] (RegA, RegB, Nothing, Nothing, BranchTarget);
    "Branch if greater-than."
    0x36 IF_GT "if-gt" F22t [CONTINUE | BRANCH] (RegA, RegB, Nothing, Nothing, BranchTarget);
    "Branch if less-or-equal."
    0x37 IF_LE "if-le" F22t [CONTINUE | BRANCH] (RegA, RegB, Nothing, Nothing, BranchTarget);
    "Branch if zero or null."
    0x38 IF_EQZ "if-eqz" F21t [CONTINUE | BRANCH] (RegA, Nothing, Nothing, Nothing, BranchTarget);
    "Branch if non-zero or non-null."
    0x39 IF_NEZ "if-nez" F21t [CONTINUE | BRANCH] (RegA, Nothing, Nothing, Nothing, BranchTarget);
    "Branch if less-than-zero."
    0x3a IF_LTZ "if-ltz" F21t [CONTINUE | BRANCH] (RegA, Nothing, Nothing, Nothing, BranchTarget);
    "Branch if greater-or-equal-zero."
    0x3b IF_GEZ "if-gez" F21t [CONTINUE | BRANCH] (RegA, Nothing, Nothing, Nothing, BranchTarget);
    "Branch if greater-than-zero."
    0x3c IF_GTZ "if-gtz" F21t [CONTINUE | BRANCH] (RegA, Nothing, Nothing, Nothing, BranchTarget);
    "Branch if less-or-equal-zero."
    0x3d IF_LEZ "if-lez" F21t [CONTINUE | BRANCH] (RegA, Nothing, Nothing, Nothing, BranchTarget);
    "Unused opcode."
    0x3e UNUSED_3E "unused-3e" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0x3f UNUSED_3F "unused-3f" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0x40 UNUSED_40 "unused-40" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0x41 UNUSED_41 "unused-41" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0x42 UNUSED_42 "unused-42" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0x43 UNUSED_43 "unused-43" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Load a 32-bit array element."
    0x44 AGET "aget" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Load a 64-bit array element."
    0x45 AGET_WIDE "aget-wide" F23x [CONTINUE | THROW] (RegAWide, RegB, RegC, Nothing, Nothing);
    "Load an object array element."
    0x46 AGET_OBJECT "aget-object" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Load a boolean array element."
    0x47 AGET_BOOLEAN "aget-boolean" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Load a byte array element."
    0x48 AGET_BYTE "aget-byte" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Load a char array element."
    0x49 AGET_CHAR "aget-char" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Load a short array element."
    0x4a AGET_SHORT "aget-short" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Store a 32-bit array element."
    0x4b APUT "aput" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Store a 64-bit array element."
    0x4c APUT_WIDE "aput-wide" F23x [CONTINUE | THROW] (RegAWide, RegB, RegC, Nothing, Nothing);
    "Store an object array element."
    0x4d APUT_OBJECT "aput-object" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Store a boolean array element."
    0x4e APUT_BOOLEAN "aput-boolean" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Store a byte array element."
    0x4f APUT_BYTE "aput-byte" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Store a char array element."
    0x50 APUT_CHAR "aput-char" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Store a short array element."
    0x51 APUT_SHORT "aput-short" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Load a 32-bit instance field."
    0x52 IGET "iget" F22c [CONTINUE | THROW] (RegA, RegB, FieldId, Nothing, Nothing);
    "Load a 64-bit instance field."
    0x53 IGET_WIDE "iget-wide" F22c [CONTINUE | THROW] (RegAWide, RegB, FieldId, Nothing, Nothing);
    "Load an object instance field."
    0x54 IGET_OBJECT "iget-object" F22c [CONTINUE | THROW] (RegA, RegB, FieldId, Nothing, Nothing);
    "Load a boolean instance field."
    0x55 IGET_BOOLEAN "iget-boolean" F22c [CONTINUE | THROW] (RegA, RegB, FieldId, Nothing, Nothing);
    "Load a byte instance field."
    0x56 IGET_BYTE "iget-byte" F22c [CONTINUE | THROW] (RegA, RegB, FieldId, Nothing, Nothing);
    "Load a char instance field."
    0x57 IGET_CHAR "iget-char" F22c [CONTINUE | THROW] (RegA, RegB, FieldId, Nothing, Nothing);
    "Load a short instance field."
    0x58 IGET_SHORT "iget-short" F22c [CONTINUE | THROW] (RegA, RegB, FieldId, Nothing, Nothing);
    "Store a 32-bit instance field."
    0x59 IPUT "iput" F22c [CONTINUE | THROW] (RegA, RegB, FieldId, Nothing, Nothing);
    "Store a 64-bit instance field."
    0x5a IPUT_WIDE "iput-wide" F22c [CONTINUE | THROW] (RegAWide, RegB, FieldId, Nothing, Nothing);
    "Store an object instance field."
    0x5b IPUT_OBJECT "iput-object" F22c [CONTINUE | THROW] (RegA, RegB, FieldId, Nothing, Nothing);
    "Store a boolean instance field."
    0x5c IPUT_BOOLEAN "iput-boolean" F22c [CONTINUE | THROW] (RegA, RegB, FieldId, Nothing, Nothing);
    "Store a byte instance field."
    0x5d IPUT_BYTE "iput-byte" F22c [CONTINUE | THROW] (RegA, RegB, FieldId, Nothing, Nothing);
    "Store a char instance field."
    0x5e IPUT_CHAR "iput-char" F22c [CONTINUE | THROW] (RegA, RegB, FieldId, Nothing, Nothing);
    "Store a short instance field."
    0x5f IPUT_SHORT "iput-short" F22c [CONTINUE | THROW] (RegA, RegB, FieldId, Nothing, Nothing);
    "Load a 32-bit static field."
    0x60 SGET "sget" F21c [CONTINUE | THROW] (RegA, FieldId, Nothing, Nothing, Nothing);
    "Load a 64-bit static field."
    0x61 SGET_WIDE "sget-wide" F21c [CONTINUE | THROW] (RegAWide, FieldId, Nothing, Nothing, Nothing);
    "Load an object static field."
    0x62 SGET_OBJECT "sget-object" F21c [CONTINUE | THROW] (RegA, FieldId, Nothing, Nothing, Nothing);
    "Load a boolean static field."
    0x63 SGET_BOOLEAN "sget-boolean" F21c [CONTINUE | THROW] (RegA, FieldId, Nothing, Nothing, Nothing);
    "Load a byte static field."
    0x64 SGET_BYTE "sget-byte" F21c [CONTINUE | THROW] (RegA, FieldId, Nothing, Nothing, Nothing);
    "Load a char static field."
    0x65 SGET_CHAR "sget-char" F21c [CONTINUE | THROW] (RegA, FieldId, Nothing, Nothing, Nothing);
    "Load a short static field."
    0x66 SGET_SHORT "sget-short" F21c [CONTINUE | THROW] (RegA, FieldId, Nothing, Nothing, Nothing);
    "Store a 32-bit static field."
    0x67 SPUT "sput" F21c [CONTINUE | THROW] (RegA, FieldId, Nothing, Nothing, Nothing);
    "Store a 64-bit static field."
    0x68 SPUT_WIDE "sput-wide" F21c [CONTINUE | THROW] (RegAWide, FieldId, Nothing, Nothing, Nothing);
    "Store an object static field."
    0x69 SPUT_OBJECT "sput-object" F21c [CONTINUE | THROW] (RegA, FieldId, Nothing, Nothing, Nothing);
    "Store a boolean static field."
    0x6a SPUT_BOOLEAN "sput-boolean" F21c [CONTINUE | THROW] (RegA, FieldId, Nothing, Nothing, Nothing);
    "Store a byte static field."
    0x6b SPUT_BYTE "sput-byte" F21c [CONTINUE | THROW] (RegA, FieldId, Nothing, Nothing, Nothing);
    "Store a char static field."
    0x6c SPUT_CHAR "sput-char" F21c [CONTINUE | THROW] (RegA, FieldId, Nothing, Nothing, Nothing);
    "Store a short static field."
    0x6d SPUT_SHORT "sput-short" F21c [CONTINUE | THROW] (RegA, FieldId, Nothing, Nothing, Nothing);
    "Invoke a virtual method."
    0x6e INVOKE_VIRTUAL "invoke-virtual" F35c [CONTINUE | THROW | INVOKE] (Nothing, MethodId, Nothing, Nothing, VarArgNonZero);
    "Invoke a superclass method."
    0x6f INVOKE_SUPER "invoke-super" F35c [CONTINUE | THROW | INVOKE] (Nothing, MethodId, Nothing, Nothing, VarArgNonZero);
    "Invoke a direct (constructor or private) method."
    0x70 INVOKE_DIRECT "invoke-direct" F35c [CONTINUE | THROW | INVOKE] (Nothing, MethodId, Nothing, Nothing, VarArgNonZero);
    "Invoke a static method."
    0x71 INVOKE_STATIC "invoke-static" F35c [CONTINUE | THROW | INVOKE] (Nothing, MethodId, Nothing, Nothing, VarArg);
    "Invoke an interface method."
    0x72 INVOKE_INTERFACE "invoke-interface" F35c [CONTINUE | THROW | INVOKE] (Nothing, MethodId, Nothing, Nothing, VarArgNonZero);
    "Unused opcode."
    0x73 UNUSED_73 "unused-73" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Invoke a virtual method, register range."
    0x74 INVOKE_VIRTUAL_RANGE "invoke-virtual/range" F3rc [CONTINUE | THROW | INVOKE] (Nothing, MethodId, Nothing, Nothing, VarArgRangeNonZero);
    "Invoke a superclass method, register range."
    0x75 INVOKE_SUPER_RANGE "invoke-super/range" F3rc [CONTINUE | THROW | INVOKE] (Nothing, MethodId, Nothing, Nothing, VarArgRangeNonZero);
    "Invoke a direct method, register range."
    0x76 INVOKE_DIRECT_RANGE "invoke-direct/range" F3rc [CONTINUE | THROW | INVOKE] (Nothing, MethodId, Nothing, Nothing, VarArgRangeNonZero);
    "Invoke a static method, register range."
    0x77 INVOKE_STATIC_RANGE "invoke-static/range" F3rc [CONTINUE | THROW | INVOKE] (Nothing, MethodId, Nothing, Nothing, VarArgRange);
    "Invoke an interface method, register range."
    0x78 INVOKE_INTERFACE_RANGE "invoke-interface/range" F3rc [CONTINUE | THROW | INVOKE] (Nothing, MethodId, Nothing, Nothing, VarArgRangeNonZero);
    "Unused opcode."
    0x79 UNUSED_79 "unused-79" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0x7a UNUSED_7A "unused-7a" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Negate an int."
    0x7b NEG_INT "neg-int" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Bitwise-complement an int."
    0x7c NOT_INT "not-int" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Negate a long."
    0x7d NEG_LONG "neg-long" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Bitwise-complement a long."
    0x7e NOT_LONG "not-long" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Negate a float."
    0x7f NEG_FLOAT "neg-float" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Negate a double."
    0x80 NEG_DOUBLE "neg-double" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Convert int to long."
    0x81 INT_TO_LONG "int-to-long" F12x [CONTINUE] (RegAWide, RegB, Nothing, Nothing, Nothing);
    "Convert int to float."
    0x82 INT_TO_FLOAT "int-to-float" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Convert int to double."
    0x83 INT_TO_DOUBLE "int-to-double" F12x [CONTINUE] (RegAWide, RegB, Nothing, Nothing, Nothing);
    "Convert long to int."
    0x84 LONG_TO_INT "long-to-int" F12x [CONTINUE] (RegA, RegBWide, Nothing, Nothing, Nothing);
    "Convert long to float."
    0x85 LONG_TO_FLOAT "long-to-float" F12x [CONTINUE] (RegA, RegBWide, Nothing, Nothing, Nothing);
    "Convert long to double."
    0x86 LONG_TO_DOUBLE "long-to-double" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Convert float to int."
    0x87 FLOAT_TO_INT "float-to-int" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Convert float to long."
    0x88 FLOAT_TO_LONG "float-to-long" F12x [CONTINUE] (RegAWide, RegB, Nothing, Nothing, Nothing);
    "Convert float to double."
    0x89 FLOAT_TO_DOUBLE "float-to-double" F12x [CONTINUE] (RegAWide, RegB, Nothing, Nothing, Nothing);
    "Convert double to int."
    0x8a DOUBLE_TO_INT "double-to-int" F12x [CONTINUE] (RegA, RegBWide, Nothing, Nothing, Nothing);
    "Convert double to long."
    0x8b DOUBLE_TO_LONG "double-to-long" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Convert double to float."
    0x8c DOUBLE_TO_FLOAT "double-to-float" F12x [CONTINUE] (RegA, RegBWide, Nothing, Nothing, Nothing);
    "Truncate int to byte."
    0x8d INT_TO_BYTE "int-to-byte" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Truncate int to char."
    0x8e INT_TO_CHAR "int-to-char" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Truncate int to short."
    0x8f INT_TO_SHORT "int-to-short" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Add two ints."
    0x90 ADD_INT "add-int" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Subtract two ints."
    0x91 SUB_INT "sub-int" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Multiply two ints."
    0x92 MUL_INT "mul-int" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Divide two ints."
    0x93 DIV_INT "div-int" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Remainder of two ints."
    0x94 REM_INT "rem-int" F23x [CONTINUE | THROW] (RegA, RegB, RegC, Nothing, Nothing);
    "Bitwise-and two ints."
    0x95 AND_INT "and-int" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Bitwise-or two ints."
    0x96 OR_INT "or-int" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Bitwise-xor two ints."
    0x97 XOR_INT "xor-int" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Shift an int left."
    0x98 SHL_INT "shl-int" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Shift an int right, arithmetic."
    0x99 SHR_INT "shr-int" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Shift an int right, logical."
    0x9a USHR_INT "ushr-int" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Add two longs."
    0x9b ADD_LONG "add-long" F23x [CONTINUE] (RegAWide, RegBWide, RegCWide, Nothing, Nothing);
    "Subtract two longs."
    0x9c SUB_LONG "sub-long" F23x [CONTINUE] (RegAWide, RegBWide, RegCWide, Nothing, Nothing);
    "Multiply two longs."
    0x9d MUL_LONG "mul-long" F23x [CONTINUE] (RegAWide, RegBWide, RegCWide, Nothing, Nothing);
    "Divide two longs."
    0x9e DIV_LONG "div-long" F23x [CONTINUE | THROW] (RegAWide, RegBWide, RegCWide, Nothing, Nothing);
    "Remainder of two longs."
    0x9f REM_LONG "rem-long" F23x [CONTINUE | THROW] (RegAWide, RegBWide, RegCWide, Nothing, Nothing);
    "Bitwise-and two longs."
    0xa0 AND_LONG "and-long" F23x [CONTINUE] (RegAWide, RegBWide, RegCWide, Nothing, Nothing);
    "Bitwise-or two longs."
    0xa1 OR_LONG "or-long" F23x [CONTINUE] (RegAWide, RegBWide, RegCWide, Nothing, Nothing);
    "Bitwise-xor two longs."
    0xa2 XOR_LONG "xor-long" F23x [CONTINUE] (RegAWide, RegBWide, RegCWide, Nothing, Nothing);
    "Shift a long left by an int distance."
    0xa3 SHL_LONG "shl-long" F23x [CONTINUE] (RegAWide, RegBWide, RegC, Nothing, Nothing);
    "Shift a long right by an int distance, arithmetic."
    0xa4 SHR_LONG "shr-long" F23x [CONTINUE] (RegAWide, RegBWide, RegC, Nothing, Nothing);
    "Shift a long right by an int distance, logical."
    0xa5 USHR_LONG "ushr-long" F23x [CONTINUE] (RegAWide, RegBWide, RegC, Nothing, Nothing);
    "Add two floats."
    0xa6 ADD_FLOAT "add-float" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Subtract two floats."
    0xa7 SUB_FLOAT "sub-float" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Multiply two floats."
    0xa8 MUL_FLOAT "mul-float" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Divide two floats."
    0xa9 DIV_FLOAT "div-float" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Remainder of two floats."
    0xaa REM_FLOAT "rem-float" F23x [CONTINUE] (RegA, RegB, RegC, Nothing, Nothing);
    "Add two doubles."
    0xab ADD_DOUBLE "add-double" F23x [CONTINUE] (RegAWide, RegBWide, RegCWide, Nothing, Nothing);
    "Subtract two doubles."
    0xac SUB_DOUBLE "sub-double" F23x [CONTINUE] (RegAWide, RegBWide, RegCWide, Nothing, Nothing);
    "Multiply two doubles."
    0xad MUL_DOUBLE "mul-double" F23x [CONTINUE] (RegAWide, RegBWide, RegCWide, Nothing, Nothing);
    "Divide two doubles."
    0xae DIV_DOUBLE "div-double" F23x [CONTINUE] (RegAWide, RegBWide, RegCWide, Nothing, Nothing);
    "Remainder of two doubles."
    0xaf REM_DOUBLE "rem-double" F23x [CONTINUE] (RegAWide, RegBWide, RegCWide, Nothing, Nothing);
    "Add two ints in place."
    0xb0 ADD_INT_2ADDR "add-int/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Subtract two ints in place."
    0xb1 SUB_INT_2ADDR "sub-int/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Multiply two ints in place."
    0xb2 MUL_INT_2ADDR "mul-int/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Divide two ints in place."
    0xb3 DIV_INT_2ADDR "div-int/2addr" F12x [CONTINUE | THROW] (RegA, RegB, Nothing, Nothing, Nothing);
    "Remainder of two ints in place."
    0xb4 REM_INT_2ADDR "rem-int/2addr" F12x [CONTINUE | THROW] (RegA, RegB, Nothing, Nothing, Nothing);
    "Bitwise-and two ints in place."
    0xb5 AND_INT_2ADDR "and-int/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Bitwise-or two ints in place."
    0xb6 OR_INT_2ADDR "or-int/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Bitwise-xor two ints in place."
    0xb7 XOR_INT_2ADDR "xor-int/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Shift an int left in place."
    0xb8 SHL_INT_2ADDR "shl-int/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Shift an int right in place, arithmetic."
    0xb9 SHR_INT_2ADDR "shr-int/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Shift an int right in place, logical."
    0xba USHR_INT_2ADDR "ushr-int/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Add two longs in place."
    0xbb ADD_LONG_2ADDR "add-long/2addr" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Subtract two longs in place."
    0xbc SUB_LONG_2ADDR "sub-long/2addr" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Multiply two longs in place."
    0xbd MUL_LONG_2ADDR "mul-long/2addr" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Divide two longs in place."
    0xbe DIV_LONG_2ADDR "div-long/2addr" F12x [CONTINUE | THROW] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Remainder of two longs in place."
    0xbf REM_LONG_2ADDR "rem-long/2addr" F12x [CONTINUE | THROW] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Bitwise-and two longs in place."
    0xc0 AND_LONG_2ADDR "and-long/2addr" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Bitwise-or two longs in place."
    0xc1 OR_LONG_2ADDR "or-long/2addr" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Bitwise-xor two longs in place."
    0xc2 XOR_LONG_2ADDR "xor-long/2addr" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Shift a long left in place."
    0xc3 SHL_LONG_2ADDR "shl-long/2addr" F12x [CONTINUE] (RegAWide, RegB, Nothing, Nothing, Nothing);
    "Shift a long right in place, arithmetic."
    0xc4 SHR_LONG_2ADDR "shr-long/2addr" F12x [CONTINUE] (RegAWide, RegB, Nothing, Nothing, Nothing);
    "Shift a long right in place, logical."
    0xc5 USHR_LONG_2ADDR "ushr-long/2addr" F12x [CONTINUE] (RegAWide, RegB, Nothing, Nothing, Nothing);
    "Add two floats in place."
    0xc6 ADD_FLOAT_2ADDR "add-float/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Subtract two floats in place."
    0xc7 SUB_FLOAT_2ADDR "sub-float/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Multiply two floats in place."
    0xc8 MUL_FLOAT_2ADDR "mul-float/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Divide two floats in place."
    0xc9 DIV_FLOAT_2ADDR "div-float/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Remainder of two floats in place."
    0xca REM_FLOAT_2ADDR "rem-float/2addr" F12x [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Add two doubles in place."
    0xcb ADD_DOUBLE_2ADDR "add-double/2addr" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Subtract two doubles in place."
    0xcc SUB_DOUBLE_2ADDR "sub-double/2addr" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Multiply two doubles in place."
    0xcd MUL_DOUBLE_2ADDR "mul-double/2addr" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Divide two doubles in place."
    0xce DIV_DOUBLE_2ADDR "div-double/2addr" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Remainder of two doubles in place."
    0xcf REM_DOUBLE_2ADDR "rem-double/2addr" F12x [CONTINUE] (RegAWide, RegBWide, Nothing, Nothing, Nothing);
    "Add an int and a 16-bit literal."
    0xd0 ADD_INT_LIT16 "add-int/lit16" F22s [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Subtract an int from a 16-bit literal."
    0xd1 RSUB_INT "rsub-int" F22s [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Multiply an int by a 16-bit literal."
    0xd2 MUL_INT_LIT16 "mul-int/lit16" F22s [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Divide an int by a 16-bit literal."
    0xd3 DIV_INT_LIT16 "div-int/lit16" F22s [CONTINUE | THROW] (RegA, RegB, Nothing, Nothing, Nothing);
    "Remainder of an int by a 16-bit literal."
    0xd4 REM_INT_LIT16 "rem-int/lit16" F22s [CONTINUE | THROW] (RegA, RegB, Nothing, Nothing, Nothing);
    "Bitwise-and an int with a 16-bit literal."
    0xd5 AND_INT_LIT16 "and-int/lit16" F22s [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Bitwise-or an int with a 16-bit literal."
    0xd6 OR_INT_LIT16 "or-int/lit16" F22s [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Bitwise-xor an int with a 16-bit literal."
    0xd7 XOR_INT_LIT16 "xor-int/lit16" F22s [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Add an int and an 8-bit literal."
    0xd8 ADD_INT_LIT8 "add-int/lit8" F22b [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Subtract an int from an 8-bit literal."
    0xd9 RSUB_INT_LIT8 "rsub-int/lit8" F22b [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Multiply an int by an 8-bit literal."
    0xda MUL_INT_LIT8 "mul-int/lit8" F22b [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Divide an int by an 8-bit literal."
    0xdb DIV_INT_LIT8 "div-int/lit8" F22b [CONTINUE | THROW] (RegA, RegB, Nothing, Nothing, Nothing);
    "Remainder of an int by an 8-bit literal."
    0xdc REM_INT_LIT8 "rem-int/lit8" F22b [CONTINUE | THROW] (RegA, RegB, Nothing, Nothing, Nothing);
    "Bitwise-and an int with an 8-bit literal."
    0xdd AND_INT_LIT8 "and-int/lit8" F22b [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Bitwise-or an int with an 8-bit literal."
    0xde OR_INT_LIT8 "or-int/lit8" F22b [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Bitwise-xor an int with an 8-bit literal."
    0xdf XOR_INT_LIT8 "xor-int/lit8" F22b [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Shift an int left by an 8-bit literal."
    0xe0 SHL_INT_LIT8 "shl-int/lit8" F22b [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Shift an int right by an 8-bit literal, arithmetic."
    0xe1 SHR_INT_LIT8 "shr-int/lit8" F22b [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Shift an int right by an 8-bit literal, logical."
    0xe2 USHR_INT_LIT8 "ushr-int/lit8" F22b [CONTINUE] (RegA, RegB, Nothing, Nothing, Nothing);
    "Unused opcode."
    0xe3 UNUSED_E3 "unused-e3" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xe4 UNUSED_E4 "unused-e4" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xe5 UNUSED_E5 "unused-e5" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xe6 UNUSED_E6 "unused-e6" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xe7 UNUSED_E7 "unused-e7" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xe8 UNUSED_E8 "unused-e8" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xe9 UNUSED_E9 "unused-e9" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xea UNUSED_EA "unused-ea" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xeb UNUSED_EB "unused-eb" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xec UNUSED_EC "unused-ec" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xed UNUSED_ED "unused-ed" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xee UNUSED_EE "unused-ee" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xef UNUSED_EF "unused-ef" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xf0 UNUSED_F0 "unused-f0" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xf1 UNUSED_F1 "unused-f1" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xf2 UNUSED_F2 "unused-f2" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xf3 UNUSED_F3 "unused-f3" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xf4 UNUSED_F4 "unused-f4" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xf5 UNUSED_F5 "unused-f5" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xf6 UNUSED_F6 "unused-f6" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xf7 UNUSED_F7 "unused-f7" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xf8 UNUSED_F8 "unused-f8" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Unused opcode."
    0xf9 UNUSED_F9 "unused-f9" F10x [] (Nothing, Nothing, Nothing, Nothing, Error);
    "Invoke a signature-polymorphic method."
    0xfa INVOKE_POLYMORPHIC "invoke-polymorphic" F45cc [CONTINUE | THROW | INVOKE] (Nothing, MethodId, Nothing, ProtoId, VarArgNonZero);
    "Invoke a signature-polymorphic method, register range."
    0xfb INVOKE_POLYMORPHIC_RANGE "invoke-polymorphic/range" F4rcc [CONTINUE | THROW | INVOKE] (Nothing, MethodId, Nothing, ProtoId, VarArgRangeNonZero);
    "Invoke the method handle of a call site."
    0xfc INVOKE_CUSTOM "invoke-custom" F35c [CONTINUE | THROW | INVOKE] (Nothing, CallSiteId, Nothing, Nothing, VarArg);
    "Invoke the method handle of a call site, register range."
    0xfd INVOKE_CUSTOM_RANGE "invoke-custom/range" F3rc [CONTINUE | THROW | INVOKE] (Nothing, CallSiteId, Nothing, Nothing, VarArgRange);
    "Load a method handle reference."
    0xfe CONST_METHOD_HANDLE "const-method-handle" F21c [CONTINUE | THROW] (RegA, MethodHandleId, Nothing, Nothing, Nothing);
    "Load a method type reference."
    0xff CONST_METHOD_TYPE "const-method-type" F21c [CONTINUE | THROW] (RegA, ProtoId, Nothing, Nothing, Nothing);
}

/// Memory width and category implied by a field-access opcode, used to match
/// the field descriptor against the instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemAccess {
    /// 32-bit int or float.
    Word,
    /// 64-bit long or double.
    Wide,
    /// Reference or array.
    Object,
    /// `Z`
    Boolean,
    /// `B`
    Byte,
    /// `C`
    Char,
    /// `S`
    Short,
}

impl MemAccess {
    /// The field descriptor leading characters permitted for this access.
    pub const fn permitted_descriptor_chars(self) -> (char, char) {
        match self {
            MemAccess::Word => ('I', 'F'),
            MemAccess::Wide => ('J', 'D'),
            MemAccess::Object => ('L', '['),
            MemAccess::Boolean => ('Z', 'Z'),
            MemAccess::Byte => ('B', 'B'),
            MemAccess::Char => ('C', 'C'),
            MemAccess::Short => ('S', 'S'),
        }
    }
}

impl Opcode {
    /// The memory access category of a field-access opcode, `None` otherwise.
    pub const fn field_access(self) -> Option<MemAccess> {
        use Opcode::*;
        match self {
            IGET | IPUT | SGET | SPUT => Some(MemAccess::Word),
            IGET_WIDE | IPUT_WIDE | SGET_WIDE | SPUT_WIDE => Some(MemAccess::Wide),
            IGET_OBJECT | IPUT_OBJECT | SGET_OBJECT | SPUT_OBJECT => Some(MemAccess::Object),
            IGET_BOOLEAN | IPUT_BOOLEAN | SGET_BOOLEAN | SPUT_BOOLEAN => Some(MemAccess::Boolean),
            IGET_BYTE | IPUT_BYTE | SGET_BYTE | SPUT_BYTE => Some(MemAccess::Byte),
            IGET_CHAR | IPUT_CHAR | SGET_CHAR | SPUT_CHAR => Some(MemAccess::Char),
            IGET_SHORT | IPUT_SHORT | SGET_SHORT | SPUT_SHORT => Some(MemAccess::Short),
            _ => None,
        }
    }

    /// Whether this is one of the `move-result*` opcodes.
    pub const fn is_move_result(self) -> bool {
        matches!(
            self,
            Opcode::MOVE_RESULT | Opcode::MOVE_RESULT_WIDE | Opcode::MOVE_RESULT_OBJECT
        )
    }

    /// Whether this is a `move-result*` or `move-exception` opcode, neither
    /// of which may be reached by a branch.
    pub const fn is_move_result_or_move_exception(self) -> bool {
        self.is_move_result() || matches!(self, Opcode::MOVE_EXCEPTION)
    }

    /// Whether this is one of the `move-object*` opcodes.
    pub const fn is_move_object(self) -> bool {
        matches!(
            self,
            Opcode::MOVE_OBJECT | Opcode::MOVE_OBJECT_FROM16 | Opcode::MOVE_OBJECT_16
        )
    }

    /// Whether the instruction returns from the method.
    pub const fn is_return(self) -> bool {
        self.flags().contains(crate::OpFlags::RETURN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OpFlags, VerifyExtra};
    use strum::IntoEnumIterator;

    #[test]
    fn round_trip_all_bytes() {
        for byte in 0u8..=255 {
            let opcode = Opcode::from(byte);
            assert_eq!(u8::from(opcode), byte);
        }
        assert_eq!(Opcode::iter().count(), 256);
    }

    #[test]
    fn every_opcode_has_positive_width_and_name() {
        for opcode in Opcode::iter() {
            assert!(opcode.format().size_in_code_units() > 0);
            assert!(!opcode.name().is_empty());
        }
    }

    #[test]
    fn unused_opcodes_are_flagged_as_errors() {
        for opcode in Opcode::iter() {
            let unused = opcode.name().starts_with("unused-");
            assert_eq!(unused, opcode.verify_extra() == VerifyExtra::Error, "{opcode:?}");
            if unused {
                assert!(opcode.flags().is_empty());
            }
        }
    }

    #[test]
    fn field_access_matches_field_index_requirement() {
        use crate::{VerifyB, VerifyC};
        for opcode in Opcode::iter() {
            let takes_field_index = opcode.verify_b() == VerifyB::FieldId
                || opcode.verify_c() == VerifyC::FieldId;
            assert_eq!(takes_field_index, opcode.field_access().is_some(), "{opcode:?}");
        }
    }

    #[test]
    fn control_flow_flags_are_consistent() {
        for opcode in Opcode::iter() {
            let flags = opcode.flags();
            // Returns and throws never fall through.
            if flags.contains(OpFlags::RETURN) {
                assert!(!flags.contains(OpFlags::CONTINUE), "{opcode:?}");
            }
            // Invokes always continue and may throw.
            if flags.contains(OpFlags::INVOKE) {
                assert!(flags.contains(OpFlags::CONTINUE | OpFlags::THROW), "{opcode:?}");
            }
        }
    }

    #[test]
    fn branch_opcodes_have_branch_targets() {
        for opcode in Opcode::iter() {
            if opcode.flags().contains(OpFlags::BRANCH) {
                assert_eq!(opcode.verify_extra(), VerifyExtra::BranchTarget, "{opcode:?}");
            }
            if opcode.flags().contains(OpFlags::SWITCH) {
                assert_eq!(opcode.verify_extra(), VerifyExtra::SwitchTargets, "{opcode:?}");
            }
        }
    }
}
