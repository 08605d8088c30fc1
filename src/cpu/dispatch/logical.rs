/*!
logical.rs - Moves, bitwise operations and shifts

Overview
========
```text
SET  b <- a
AND / BOR / XOR
SHR / ASR / SHL (EX receives the bits shifted out)
STI / STD  b <- a, then I and J step by +1 / -1
```

Return Contract
===============
`handle` returns true if the opcode belongs to this family.
*/

use crate::bus::ram::Memory;
use crate::cpu::addressing::{Operand, read, write};
use crate::cpu::decode::BasicOp;
use crate::cpu::dispatch::store;
use crate::cpu::execute::{and, asr, bor, shl, shr, xor};
use crate::cpu::regs::Register;
use crate::cpu::state::CpuState;

pub(crate) fn handle(
    op: BasicOp,
    b: Operand,
    a: u16,
    state: &mut CpuState,
    mem: &mut Memory,
) -> bool {
    match op {
        BasicOp::Set => write(b, state, mem, a),
        BasicOp::Sti | BasicOp::Std => {
            write(b, state, mem, a);
            let step = |v: u16| {
                if op == BasicOp::Sti {
                    v.wrapping_add(1)
                } else {
                    v.wrapping_sub(1)
                }
            };
            let (i, j) = (state.reg(Register::I), state.reg(Register::J));
            state.set_reg(Register::I, step(i));
            state.set_reg(Register::J, step(j));
        }
        BasicOp::And | BasicOp::Bor | BasicOp::Xor | BasicOp::Shr | BasicOp::Asr | BasicOp::Shl => {
            let bv = read(b, state, mem);
            let result = match op {
                BasicOp::And => and(bv, a),
                BasicOp::Bor => bor(bv, a),
                BasicOp::Xor => xor(bv, a),
                BasicOp::Shr => shr(bv, a),
                BasicOp::Asr => asr(bv, a),
                _ => shl(bv, a),
            };
            store(result, b, state, mem);
        }
        _ => return false,
    }
    true
}
