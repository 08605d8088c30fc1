/*!
addressing.rs - Operand resolution for the 64 DCPU-16 value codes.

Overview
========
An operand code is resolved exactly once per instruction into an `Operand`
(an address or a register slot), and only then read or written. Resolution
carries every side effect of the code:
  - next-word codes advance PC and cost one cycle
  - 0x18 pops (post-increment SP) in the a position and pushes
    (pre-decrement SP) in the b position

The a operand must be resolved before the b operand so the next-word
stream and the stack pointer move in instruction order.

Codes
=====
```text
0x00-0x07  register
0x08-0x0F  [register]
0x10-0x17  [register + next word]
0x18       POP (a) / PUSH (b)
0x19       [SP]
0x1A       [SP + next word]
0x1B       SP
0x1C       PC
0x1D       EX
0x1E       [next word]
0x1F       next word (literal)
0x20-0x3F  literal -1..=30
```
*/

use crate::bus::ram::Memory;
use crate::cpu::cycles::NEXT_WORD_CYCLES;
use crate::cpu::regs::Register;
use crate::cpu::state::CpuState;

/// Which slot of the instruction an operand code occupies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Position {
    A,
    B,
}

/// A resolved operand location.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Register(Register),
    Memory(u16),
    Sp,
    Pc,
    Ex,
    /// Read-only value; writes are discarded.
    Literal(u16),
}

/// Resolve `code`, applying its PC/SP side effects and adding next-word cycles.
pub fn resolve(
    code: u16,
    position: Position,
    state: &mut CpuState,
    mem: &Memory,
    cycles: &mut u32,
) -> Operand {
    match code {
        0x00..=0x07 => Operand::Register(Register::from_code(code)),
        0x08..=0x0F => Operand::Memory(state.reg(Register::from_code(code))),
        0x10..=0x17 => {
            *cycles += NEXT_WORD_CYCLES;
            let base = state.reg(Register::from_code(code));
            Operand::Memory(base.wrapping_add(state.next_word(mem)))
        }
        0x18 => match position {
            Position::A => {
                let addr = state.sp;
                state.sp = state.sp.wrapping_add(1);
                Operand::Memory(addr)
            }
            Position::B => {
                state.sp = state.sp.wrapping_sub(1);
                Operand::Memory(state.sp)
            }
        },
        0x19 => Operand::Memory(state.sp),
        0x1A => {
            *cycles += NEXT_WORD_CYCLES;
            Operand::Memory(state.sp.wrapping_add(state.next_word(mem)))
        }
        0x1B => Operand::Sp,
        0x1C => Operand::Pc,
        0x1D => Operand::Ex,
        0x1E => {
            *cycles += NEXT_WORD_CYCLES;
            Operand::Memory(state.next_word(mem))
        }
        0x1F => {
            *cycles += NEXT_WORD_CYCLES;
            Operand::Literal(state.next_word(mem))
        }
        // 0x20..=0x3F: -1..=30, stored as unsigned words.
        _ => Operand::Literal(code.wrapping_sub(0x21)),
    }
}

#[inline]
pub fn read(op: Operand, state: &CpuState, mem: &Memory) -> u16 {
    match op {
        Operand::Register(r) => state.reg(r),
        Operand::Memory(addr) => mem.read(addr),
        Operand::Sp => state.sp,
        Operand::Pc => state.pc,
        Operand::Ex => state.ex,
        Operand::Literal(v) => v,
    }
}

#[inline]
pub fn write(op: Operand, state: &mut CpuState, mem: &mut Memory, value: u16) {
    match op {
        Operand::Register(r) => state.set_reg(r, value),
        Operand::Memory(addr) => mem.write(addr, value),
        Operand::Sp => state.sp = value,
        Operand::Pc => state.pc = value,
        Operand::Ex => state.ex = value,
        Operand::Literal(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(words: &[u16]) -> (CpuState, Memory) {
        let mut mem = Memory::new();
        mem.load(words);
        (CpuState::new(), mem)
    }

    #[test]
    fn inline_literals_cover_minus_one_to_thirty() {
        let (mut s, mem) = setup(&[]);
        let mut cycles = 0;
        assert_eq!(resolve(0x20, Position::A, &mut s, &mem, &mut cycles), Operand::Literal(0xFFFF));
        assert_eq!(resolve(0x21, Position::A, &mut s, &mem, &mut cycles), Operand::Literal(0));
        assert_eq!(resolve(0x3F, Position::A, &mut s, &mem, &mut cycles), Operand::Literal(30));
        assert_eq!(cycles, 0);
        assert_eq!(s.pc, 0);
    }

    #[test]
    fn register_plus_next_word_wraps_and_costs_a_cycle() {
        let (mut s, mem) = setup(&[0x0010]);
        s.set_reg(Register::X, 0xFFF8);
        let mut cycles = 0;
        let op = resolve(0x13, Position::A, &mut s, &mem, &mut cycles);
        assert_eq!(op, Operand::Memory(0x0008));
        assert_eq!(cycles, 1);
        assert_eq!(s.pc, 1);
    }

    #[test]
    fn stack_code_depends_on_position() {
        let (mut s, mem) = setup(&[]);
        s.sp = 0x1000;
        let mut cycles = 0;
        assert_eq!(resolve(0x18, Position::A, &mut s, &mem, &mut cycles), Operand::Memory(0x1000));
        assert_eq!(s.sp, 0x1001);
        assert_eq!(resolve(0x18, Position::B, &mut s, &mem, &mut cycles), Operand::Memory(0x1000));
        assert_eq!(s.sp, 0x1000);
        assert_eq!(resolve(0x19, Position::B, &mut s, &mem, &mut cycles), Operand::Memory(0x1000));
        assert_eq!(s.sp, 0x1000);
    }

    #[test]
    fn literal_writes_are_discarded() {
        let (mut s, mut mem) = setup(&[]);
        write(Operand::Literal(5), &mut s, &mut mem, 0xDEAD);
        assert_eq!(s.regs, [0; 8]);
        assert!(mem.as_slice().iter().all(|w| *w == 0));
    }

    #[test]
    fn special_registers_round_trip() {
        let (mut s, mut mem) = setup(&[]);
        write(Operand::Ex, &mut s, &mut mem, 7);
        write(Operand::Sp, &mut s, &mut mem, 8);
        write(Operand::Pc, &mut s, &mut mem, 9);
        assert_eq!(read(Operand::Ex, &s, &mem), 7);
        assert_eq!((s.sp, s.pc), (8, 9));
    }
}
