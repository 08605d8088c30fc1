/*!
dispatch - Orchestrator for a single DCPU-16 step (devices / interrupts / instruction)

Overview
========
Each call to `step` is one machine cycle:
1. Set the interrupt guard and cycle every attached device (bus order).
2. If the retiring instruction still owes cycles, burn one and return.
3. Else, if queueing is off and an interrupt was already pending when the
   step began, dispatch the oldest one.
4. Else fetch, decode and execute one instruction, recording its remaining
   cost in the sleep counter.
The guard is cleared on the way out, whatever the outcome.

Architecture
============
- Operands are resolved here (a before b) into `Operand`s, then family
  handlers apply the semantics:
    logical       SET AND BOR XOR SHR ASR SHL STI STD
    arithmetic    ADD SUB MUL MLI DIV DVI MOD MDI ADX SBX
    branches      IFB IFC IFE IFN IFG IFA IFL IFU (plus the skip chain)
    control_flow  JSR INT IAG IAS RFI IAQ
    hardware      HWN HWQ HWI
- Handlers return true when they recognized the opcode and add any extra
  cycles to `*cycles`. They never touch the sleep counter.

Interrupts
==========
`raise` is the single entry point for hardware and software interrupts.
While queueing is enabled or an instruction is executing (guard), the
message is queued; otherwise it is triggered at once, or dropped when IA
is 0.
*/

use tracing::{trace, warn};

use crate::bus::Bus;
use crate::bus::clock;
use crate::bus::ram::Memory;
use crate::cpu::addressing::{Operand, Position, read, resolve, write};
use crate::cpu::cycles::{basic_cycles, special_cycles};
use crate::cpu::decode::{Instruction, decode};
use crate::cpu::execute::Alu;
use crate::cpu::regs::Register;
use crate::cpu::state::{CpuState, MAX_QUEUED_INTERRUPTS};
use crate::error::CpuError;

pub(crate) mod arithmetic;
pub(crate) mod branches;
pub(crate) mod control_flow;
pub(crate) mod hardware;
pub(crate) mod logical;

/// Execute one machine cycle.
pub(crate) fn step(state: &mut CpuState, bus: &mut Bus) -> Result<(), CpuError> {
    bus.mark_started();
    state.guard = true;
    let result = step_guarded(state, bus);
    state.guard = false;
    result
}

fn step_guarded(state: &mut CpuState, bus: &mut Bus) -> Result<(), CpuError> {
    // Messages devices raise during this tick wait for a later step.
    let had_pending = !state.queue.is_empty();
    clock::tick(bus, state)?;

    if state.sleep > 0 {
        state.sleep -= 1;
        return Ok(());
    }

    if had_pending && !state.queueing {
        if let Some(message) = state.queue.pop_front() {
            trigger(state, bus.memory_mut(), message);
            return Ok(());
        }
    }

    execute_next(state, bus)
}

/// Fetch, decode and execute the instruction at PC.
fn execute_next(state: &mut CpuState, bus: &mut Bus) -> Result<(), CpuError> {
    let pc = state.pc;
    let word = state.next_word(bus.memory());
    let Some(instruction) = decode(word) else {
        warn!(
            pc = format_args!("{pc:#06x}"),
            word = format_args!("{word:#06x}"),
            "invalid opcode"
        );
        return Err(CpuError::InvalidOpcode { pc, word });
    };

    let mut cycles = 0u32;
    match instruction {
        Instruction::Basic { op, b, a } => {
            cycles += basic_cycles(op);
            let a_op = resolve(a, Position::A, state, bus.memory(), &mut cycles);
            let a_val = read(a_op, state, bus.memory());
            let b_op = resolve(b, Position::B, state, bus.memory(), &mut cycles);

            let mem = bus.memory_mut();
            let handled = logical::handle(op, b_op, a_val, state, mem)
                || arithmetic::handle(op, b_op, a_val, state, mem)
                || branches::handle(op, b_op, a_val, state, mem, &mut cycles);
            debug_assert!(handled, "no handler for {op:?}");
        }
        Instruction::Special { op, a } => {
            cycles += special_cycles(op);
            let a_op = resolve(a, Position::A, state, bus.memory(), &mut cycles);

            let handled = control_flow::handle(op, a_op, state, bus.memory_mut())?
                || hardware::handle(op, a_op, state, bus, &mut cycles)?;
            debug_assert!(handled, "no handler for {op:?}");
        }
    }

    state.sleep = cycles as i32 - 1;
    Ok(())
}

/// Write an ALU result back: b first, then EX when the instruction defines it.
#[inline]
pub(crate) fn store(result: Alu, b: Operand, state: &mut CpuState, mem: &mut Memory) {
    write(b, state, mem, result.value);
    if let Some(ex) = result.ex {
        state.ex = ex;
    }
}

// -------------------------------------------------------------------------
// Interrupts
// -------------------------------------------------------------------------

/// Raise an interrupt with `message`, queueing or triggering it per current policy.
pub(crate) fn raise(state: &mut CpuState, mem: &mut Memory, message: u16) -> Result<(), CpuError> {
    if state.queueing || state.guard {
        if state.queue.len() >= MAX_QUEUED_INTERRUPTS {
            warn!(message = format_args!("{message:#06x}"), "interrupt queue overflow");
            return Err(CpuError::QueueOverflow { message });
        }
        state.queue.push_back(message);
        return Ok(());
    }
    trigger(state, mem, message);
    Ok(())
}

/// Enter the interrupt handler at IA, or drop the message when IA is 0.
fn trigger(state: &mut CpuState, mem: &mut Memory, message: u16) {
    if state.ia == 0 {
        trace!(message = format_args!("{message:#06x}"), "interrupt discarded, IA is 0");
        return;
    }
    trace!(
        message = format_args!("{message:#06x}"),
        ia = format_args!("{:#06x}", state.ia),
        "interrupt"
    );
    state.queueing = true;
    let pc = state.pc;
    state.push(mem, pc);
    let a = state.reg(Register::A);
    state.push(mem, a);
    state.pc = state.ia;
    state.set_reg(Register::A, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_without_handler_is_dropped() {
        let mut s = CpuState::new();
        let mut mem = Memory::new();
        raise(&mut s, &mut mem, 7).unwrap();
        assert!(s.queue.is_empty());
        assert!(!s.queueing);
        assert_eq!(s.pc, 0);
    }

    #[test]
    fn raise_triggers_handler_and_saves_context() {
        let mut s = CpuState::new();
        let mut mem = Memory::new();
        s.ia = 0x0100;
        s.pc = 0x0042;
        s.set_reg(Register::A, 0x1111);
        raise(&mut s, &mut mem, 0xBEEF).unwrap();

        assert!(s.queueing);
        assert_eq!(s.pc, 0x0100);
        assert_eq!(s.reg(Register::A), 0xBEEF);
        assert_eq!(s.sp, 0xFFFE);
        assert_eq!(mem.read(0xFFFF), 0x0042);
        assert_eq!(mem.read(0xFFFE), 0x1111);
    }

    #[test]
    fn guard_forces_queueing() {
        let mut s = CpuState::new();
        let mut mem = Memory::new();
        s.ia = 0x0100;
        s.guard = true;
        raise(&mut s, &mut mem, 1).unwrap();
        assert_eq!(s.queue.len(), 1);
        assert_eq!(s.pc, 0);
    }

    #[test]
    fn queue_is_bounded() {
        let mut s = CpuState::new();
        let mut mem = Memory::new();
        s.queueing = true;
        for m in 0..MAX_QUEUED_INTERRUPTS as u16 {
            raise(&mut s, &mut mem, m).unwrap();
        }
        assert_eq!(
            raise(&mut s, &mut mem, 0xFFFF),
            Err(CpuError::QueueOverflow { message: 0xFFFF })
        );
        assert_eq!(s.queue.len(), MAX_QUEUED_INTERRUPTS);
    }
}
