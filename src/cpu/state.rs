/*!
state.rs - Canonical DCPU-16 architectural state.

Overview
========
`CpuState` owns every architecturally visible register plus the interrupt
bookkeeping the execution loop needs:
  - eight general registers, PC, SP, EX and IA
  - the FIFO of pending interrupt messages (at most `MAX_QUEUED_INTERRUPTS`)
  - the software queueing flag (IAQ / interrupt entry / RFI)
  - the transient guard flag set while an instruction executes
  - the sleep counter holding the cycles the retiring instruction still owes

Memory and devices are not part of this struct; they live on the Bus so
devices can borrow memory and state side by side.

Design Choices
==============
- All arithmetic on registers wraps at 16 bits.
- Stack helpers take the memory explicitly. PUSH pre-decrements SP, POP
  post-increments it.
*/

use std::collections::VecDeque;

use crate::bus::ram::Memory;
use crate::cpu::regs::Register;

/// Interrupt queue capacity. Queueing one more is fatal.
pub const MAX_QUEUED_INTERRUPTS: usize = 256;

#[derive(Debug, Clone, Default)]
pub struct CpuState {
    pub regs: [u16; 8],
    pub pc: u16,
    pub sp: u16,
    pub ex: u16,
    pub ia: u16,

    /// Pending interrupt messages, oldest first.
    pub queue: VecDeque<u16>,
    /// Software interrupt queueing (set on interrupt entry and by IAQ).
    pub queueing: bool,
    /// True only while an instruction is being decoded and executed.
    pub guard: bool,
    /// Cycles still owed by the instruction currently retiring.
    pub sleep: i32,
}

impl CpuState {
    /// Construct state with every register zeroed and interrupts idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every register, drop pending interrupts and clear all flags.
    pub fn reset(&mut self) {
        self.regs = [0; 8];
        self.pc = 0;
        self.sp = 0;
        self.ex = 0;
        self.ia = 0;
        self.queue.clear();
        self.queueing = false;
        self.guard = false;
        self.sleep = 0;
    }

    // ---------------------------------------------------------------------
    // Register access
    // ---------------------------------------------------------------------
    #[inline]
    pub fn reg(&self, r: Register) -> u16 {
        self.regs[r.index()]
    }

    #[inline]
    pub fn set_reg(&mut self, r: Register, v: u16) {
        self.regs[r.index()] = v;
    }

    /// Return the word at PC and advance PC.
    #[inline]
    pub fn next_word(&mut self, mem: &Memory) -> u16 {
        let w = mem.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        w
    }

    // ---------------------------------------------------------------------
    // Stack helpers
    // ---------------------------------------------------------------------
    #[inline]
    pub fn push(&mut self, mem: &mut Memory, v: u16) {
        self.sp = self.sp.wrapping_sub(1);
        mem.write(self.sp, v);
    }

    #[inline]
    pub fn pop(&mut self, mem: &Memory) -> u16 {
        let v = mem.read(self.sp);
        self.sp = self.sp.wrapping_add(1);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_wrap_through_zero() {
        let mut s = CpuState::new();
        let mut mem = Memory::new();
        s.push(&mut mem, 0xBEEF);
        assert_eq!(s.sp, 0xFFFF);
        assert_eq!(mem.read(0xFFFF), 0xBEEF);
        assert_eq!(s.pop(&mem), 0xBEEF);
        assert_eq!(s.sp, 0x0000);
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = CpuState::new();
        s.regs = [1; 8];
        s.pc = 2;
        s.sp = 3;
        s.ex = 4;
        s.ia = 5;
        s.queue.push_back(6);
        s.queueing = true;
        s.guard = true;
        s.sleep = 7;
        s.reset();
        assert_eq!(s.regs, [0; 8]);
        assert_eq!((s.pc, s.sp, s.ex, s.ia), (0, 0, 0, 0));
        assert!(s.queue.is_empty());
        assert!(!s.queueing && !s.guard);
        assert_eq!(s.sleep, 0);
    }

    #[test]
    fn next_word_advances_pc() {
        let mut s = CpuState::new();
        let mut mem = Memory::new();
        mem.write(0xFFFF, 0x1234);
        s.pc = 0xFFFF;
        assert_eq!(s.next_word(&mem), 0x1234);
        assert_eq!(s.pc, 0);
    }
}
