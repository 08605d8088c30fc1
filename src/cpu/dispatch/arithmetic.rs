/*!
arithmetic.rs - ADD / SUB / MUL / MLI / DIV / DVI / MOD / MDI / ADX / SBX handler

Overview
========
Reads b through its resolved operand, computes the result with the helpers
in `cpu::execute` and writes b and (where defined) EX back. Division by
zero is not a fault: the result and EX are 0.

Return Contract
===============
`handle` returns true if the opcode was recognized and executed, false
otherwise so the dispatcher can continue down the chain.
*/

use crate::bus::ram::Memory;
use crate::cpu::addressing::{Operand, read};
use crate::cpu::decode::BasicOp;
use crate::cpu::dispatch::store;
use crate::cpu::execute::{add, adx, div, dvi, mdi, mli, modulo, mul, sbx, sub};
use crate::cpu::state::CpuState;

pub(crate) fn handle(
    op: BasicOp,
    b: Operand,
    a: u16,
    state: &mut CpuState,
    mem: &mut Memory,
) -> bool {
    let bv = read(b, state, mem);
    let result = match op {
        BasicOp::Add => add(bv, a),
        BasicOp::Sub => sub(bv, a),
        BasicOp::Mul => mul(bv, a),
        BasicOp::Mli => mli(bv, a),
        BasicOp::Div => div(bv, a),
        BasicOp::Dvi => dvi(bv, a),
        BasicOp::Mod => modulo(bv, a),
        BasicOp::Mdi => mdi(bv, a),
        BasicOp::Adx => adx(bv, a, state.ex),
        BasicOp::Sbx => sbx(bv, a, state.ex),
        _ => return false,
    };
    store(result, b, state, mem);
    true
}
