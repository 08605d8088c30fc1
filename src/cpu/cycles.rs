/*!
cycles.rs - Cycle costs of DCPU-16 instructions.

Base costs only. The dispatcher adds:
  - `NEXT_WORD_CYCLES` for every operand that consumes a next-word literal
    (`[reg + next]`, `[SP + next]`, `[next]`, `next`)
  - `SKIP_CYCLES` for every instruction skipped by a failed conditional
  - whatever extra cycles a device reports for a HWI
*/

use crate::cpu::decode::{BasicOp, SpecialOp};

/// Cost of an operand that reads the next instruction word.
pub(crate) const NEXT_WORD_CYCLES: u32 = 1;

/// Cost of skipping one instruction after a failed conditional.
pub(crate) const SKIP_CYCLES: u32 = 1;

pub(crate) fn basic_cycles(op: BasicOp) -> u32 {
    match op {
        BasicOp::Set | BasicOp::And | BasicOp::Bor | BasicOp::Xor => 1,
        BasicOp::Shr | BasicOp::Asr | BasicOp::Shl => 1,
        BasicOp::Add | BasicOp::Sub | BasicOp::Mul | BasicOp::Mli => 2,
        BasicOp::Div | BasicOp::Dvi | BasicOp::Mod | BasicOp::Mdi => 3,
        BasicOp::Ifb
        | BasicOp::Ifc
        | BasicOp::Ife
        | BasicOp::Ifn
        | BasicOp::Ifg
        | BasicOp::Ifa
        | BasicOp::Ifl
        | BasicOp::Ifu => 2,
        BasicOp::Adx | BasicOp::Sbx => 3,
        BasicOp::Sti | BasicOp::Std => 2,
    }
}

pub(crate) fn special_cycles(op: SpecialOp) -> u32 {
    match op {
        SpecialOp::Jsr => 3,
        SpecialOp::Int => 4,
        SpecialOp::Iag | SpecialOp::Ias => 1,
        SpecialOp::Rfi => 3,
        SpecialOp::Iaq | SpecialOp::Hwn => 2,
        SpecialOp::Hwq | SpecialOp::Hwi => 4,
    }
}

/// True if operand `code` consumes the next instruction word.
#[inline]
pub(crate) fn uses_next_word(code: u16) -> bool {
    matches!(code, 0x10..=0x17 | 0x1A | 0x1E | 0x1F)
}
