//! The `impl_opcodes!` macro.
//!
//! The opcode table in `opcode.rs` is the single source of truth for the
//! instruction set: each row carries the opcode byte, variant identifier,
//! mnemonic, encoding format, control-flow flags and the static-verification
//! requirements of the four operand slots plus the whole-instruction extra
//! check. Everything else in this crate is derived from that table.

macro_rules! impl_opcodes {
    (
        $($doc:literal $raw:literal $Op:ident $name:literal $fmt:ident
            [$($flag:ident)|*]
            ($va:ident, $vb:ident, $vc:ident, $vh:ident, $extra:ident);)+
    ) => {
        /// Opcode byte of a Dex instruction.
        ///
        /// Every byte value maps to an opcode; bytes without an assigned
        /// instruction map to `UNUSED_*` variants whose extra verification
        /// requirement is [`VerifyExtra::Error`](crate::VerifyExtra::Error).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
        #[repr(u8)]
        pub enum Opcode {
            $(#[doc = $doc] $Op = $raw,)+
        }

        impl Opcode {
            /// The instruction mnemonic.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Opcode::$Op => $name,)+
                }
            }

            /// Encoding format of the instruction.
            pub const fn format(self) -> crate::Format {
                match self {
                    $(Opcode::$Op => crate::Format::$fmt,)+
                }
            }

            /// Control-flow flags of the instruction.
            pub const fn flags(self) -> crate::OpFlags {
                match self {
                    $(Opcode::$Op => crate::OpFlags::from_bits_truncate(
                        0 $(| crate::OpFlags::$flag.bits())*
                    ),)+
                }
            }

            /// Static verification requirement for `vA`.
            pub const fn verify_a(self) -> crate::VerifyA {
                match self {
                    $(Opcode::$Op => crate::VerifyA::$va,)+
                }
            }

            /// Static verification requirement for `vB`.
            pub const fn verify_b(self) -> crate::VerifyB {
                match self {
                    $(Opcode::$Op => crate::VerifyB::$vb,)+
                }
            }

            /// Static verification requirement for `vC`.
            pub const fn verify_c(self) -> crate::VerifyC {
                match self {
                    $(Opcode::$Op => crate::VerifyC::$vc,)+
                }
            }

            /// Static verification requirement for `vH`.
            pub const fn verify_h(self) -> crate::VerifyH {
                match self {
                    $(Opcode::$Op => crate::VerifyH::$vh,)+
                }
            }

            /// Whole-instruction verification requirement.
            pub const fn verify_extra(self) -> crate::VerifyExtra {
                match self {
                    $(Opcode::$Op => crate::VerifyExtra::$extra,)+
                }
            }
        }

        impl From<u8> for Opcode {
            fn from(byte: u8) -> Self {
                match byte {
                    $($raw => Opcode::$Op,)+
                }
            }
        }

        impl From<Opcode> for u8 {
            fn from(opcode: Opcode) -> u8 {
                opcode as u8
            }
        }
    };
}
