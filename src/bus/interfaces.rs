/*!
interfaces: the device trait and the narrow view devices get of the machine.

A device never holds a pointer back to the CPU. Each `on_cycle` and
`on_interrupt` call receives a short-lived `DeviceContext` borrowing only
what a peripheral may touch:
  - the register file (HWI arguments and results travel in registers)
  - CPU memory (memory-mapped regions, DMA-style block copies)
  - the interrupt line (`raise`)
  - the configured clock speed

Usage:
- The Bus builds one context per call, so borrows never outlive the call
  and devices cannot alias each other's state.
- Interrupts raised through the context follow the CPU's normal queueing
  policy. During `step` the guard flag is set, so they are queued and
  dispatched on a later step.
*/

use std::any::Any;

use crate::bus::ram::Memory;
use crate::cpu::dispatch;
use crate::cpu::regs::Register;
use crate::cpu::state::CpuState;
use crate::error::CpuError;

/// Identification reported by HWQ.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub hardware_id: u32,
    pub version: u16,
    pub manufacturer: u32,
    pub name: &'static str,
}

/// Common interface every peripheral implements.
///
/// Semantics:
/// - `on_cycle` runs once per `Cpu::step`, in bus order, before the CPU's own work.
/// - `on_interrupt` runs only when the CPU executes HWI for this device's slot.
///   It returns the number of extra cycles the CPU must spend on the HWI.
/// - Errors from either callback are fatal and propagate out of `step`.
pub trait Device {
    fn info(&self) -> DeviceInfo;

    fn on_cycle(&mut self, _ctx: &mut DeviceContext<'_>) -> Result<(), CpuError> {
        Ok(())
    }

    fn on_interrupt(&mut self, ctx: &mut DeviceContext<'_>) -> Result<u16, CpuError>;

    /// Support for typed lookups through `Cpu::device` / `Cpu::device_mut`.
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Borrowed view of CPU state handed to device callbacks.
pub struct DeviceContext<'a> {
    state: &'a mut CpuState,
    memory: &'a mut Memory,
    clock_speed: u32,
}

impl<'a> DeviceContext<'a> {
    #[inline]
    pub fn new(state: &'a mut CpuState, memory: &'a mut Memory, clock_speed: u32) -> Self {
        Self {
            state,
            memory,
            clock_speed,
        }
    }

    /// Cycles per emulated second.
    #[inline]
    pub fn clock_speed(&self) -> u32 {
        self.clock_speed
    }

    #[inline]
    pub fn reg(&self, r: Register) -> u16 {
        self.state.reg(r)
    }

    #[inline]
    pub fn set_reg(&mut self, r: Register, v: u16) {
        self.state.set_reg(r, v);
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u16 {
        self.memory.read(addr)
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u16) {
        self.memory.write(addr, value);
    }

    #[inline]
    pub fn read_block(&self, addr: u16, out: &mut [u16]) {
        self.memory.read_block(addr, out);
    }

    #[inline]
    pub fn write_block(&mut self, addr: u16, words: &[u16]) {
        self.memory.write_block(addr, words);
    }

    /// Read-only access to the whole memory (used by renderers).
    #[inline]
    pub fn memory(&self) -> &Memory {
        &*self.memory
    }

    /// Raise an interrupt with `message` on the CPU.
    pub fn raise(&mut self, message: u16) -> Result<(), CpuError> {
        dispatch::raise(self.state, self.memory, message)
    }
}
