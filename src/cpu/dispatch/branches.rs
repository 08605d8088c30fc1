/*!
branches.rs - Conditional opcode handler (IFB/IFC/IFE/IFN/IFG/IFA/IFL/IFU)

Overview
========
A conditional executes the next instruction only when its predicate holds.
When it fails, the next instruction is skipped: its operand words are
stepped over so PC lands on the instruction after it, and the skip costs
one cycle. If the skipped instruction is itself a conditional, its
successor is skipped too, and so on down the chain.

Skipping never resolves operands. It only advances PC past next-word
literals, so no stack pointer moves and undefined opcodes inside a skipped
region are not reported.
*/

use tracing::trace;

use crate::bus::ram::Memory;
use crate::cpu::addressing::{Operand, read};
use crate::cpu::cycles::{SKIP_CYCLES, uses_next_word};
use crate::cpu::decode::{BasicOp, fields};
use crate::cpu::execute::{ifa, ifb, ifc, ife, ifg, ifl, ifn, ifu};
use crate::cpu::state::CpuState;

pub(crate) fn handle(
    op: BasicOp,
    b: Operand,
    a: u16,
    state: &mut CpuState,
    mem: &mut Memory,
    cycles: &mut u32,
) -> bool {
    let bv = read(b, state, mem);
    let taken = match op {
        BasicOp::Ifb => ifb(bv, a),
        BasicOp::Ifc => ifc(bv, a),
        BasicOp::Ife => ife(bv, a),
        BasicOp::Ifn => ifn(bv, a),
        BasicOp::Ifg => ifg(bv, a),
        BasicOp::Ifa => ifa(bv, a),
        BasicOp::Ifl => ifl(bv, a),
        BasicOp::Ifu => ifu(bv, a),
        _ => return false,
    };
    if !taken {
        skip(state, mem, cycles);
    }
    true
}

/// Skip the instruction at PC, continuing while the skipped one is a conditional.
fn skip(state: &mut CpuState, mem: &Memory, cycles: &mut u32) {
    loop {
        let at = state.pc;
        let word = state.next_word(mem);
        let (opcode, b, a) = fields(word);
        if uses_next_word(a) {
            state.pc = state.pc.wrapping_add(1);
        }
        if opcode != 0 && uses_next_word(b) {
            state.pc = state.pc.wrapping_add(1);
        }
        *cycles += SKIP_CYCLES;
        trace!(pc = format_args!("{at:#06x}"), "skipped");

        if !(0x10..=0x17).contains(&opcode) {
            break;
        }
    }
}
