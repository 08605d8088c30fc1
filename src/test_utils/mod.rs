//! Shared test utilities: a tiny instruction assembler and a recording device.
//!
//! Operand codes follow the instruction encoding directly:
//! - `reg(Register::X)`, `ind(Register::X)`, `ind_next(Register::X)`
//! - `lit(v)` for the inline literals -1..=30 (pass `-1` as `0xFFFF`)
//! - `NEXT` for a next-word literal, `IND_NEXT` for `[next word]`
//! - `PUSH_POP`, `PEEK`, `PICK`, `SP`, `PC`, `EX`
//!
//! `TestDevice` records the interrupts it receives; `Harness` drives any
//! device directly, without a CPU. These builders do no validation beyond
//! what the tests need.

#![allow(dead_code)]

use std::any::Any;

use crate::bus::{Device, DeviceContext, DeviceInfo, Memory};
use crate::cpu::regs::Register;
use crate::cpu::state::CpuState;
use crate::error::CpuError;

pub const PUSH_POP: u16 = 0x18;
pub const PEEK: u16 = 0x19;
pub const PICK: u16 = 0x1A;
pub const SP: u16 = 0x1B;
pub const PC: u16 = 0x1C;
pub const EX: u16 = 0x1D;
pub const IND_NEXT: u16 = 0x1E;
pub const NEXT: u16 = 0x1F;

pub fn reg(r: Register) -> u16 {
    r as u16
}

pub fn ind(r: Register) -> u16 {
    0x08 + r as u16
}

pub fn ind_next(r: Register) -> u16 {
    0x10 + r as u16
}

/// Inline literal code for `v` in -1..=30 (-1 passed as 0xFFFF).
pub fn lit(v: u16) -> u16 {
    debug_assert!(v == 0xFFFF || v <= 30);
    v.wrapping_add(0x21) & 0x3F
}

/// Encode a basic instruction word.
pub fn basic(opcode: u16, b: u16, a: u16) -> u16 {
    (a << 10) | (b << 5) | opcode
}

/// Encode a special instruction word.
pub fn special(opcode: u16, a: u16) -> u16 {
    (a << 10) | (opcode << 5)
}

// Basic opcode numbers.
pub const SET: u16 = 0x01;
pub const ADD: u16 = 0x02;
pub const SUB: u16 = 0x03;
pub const MUL: u16 = 0x04;
pub const MLI: u16 = 0x05;
pub const DIV: u16 = 0x06;
pub const DVI: u16 = 0x07;
pub const MOD: u16 = 0x08;
pub const MDI: u16 = 0x09;
pub const AND: u16 = 0x0A;
pub const BOR: u16 = 0x0B;
pub const XOR: u16 = 0x0C;
pub const SHR: u16 = 0x0D;
pub const ASR: u16 = 0x0E;
pub const SHL: u16 = 0x0F;
pub const IFB: u16 = 0x10;
pub const IFC: u16 = 0x11;
pub const IFE: u16 = 0x12;
pub const IFN: u16 = 0x13;
pub const IFG: u16 = 0x14;
pub const IFA: u16 = 0x15;
pub const IFL: u16 = 0x16;
pub const IFU: u16 = 0x17;
pub const ADX: u16 = 0x1A;
pub const SBX: u16 = 0x1B;
pub const STI: u16 = 0x1E;
pub const STD: u16 = 0x1F;

// Special opcode numbers.
pub const JSR: u16 = 0x01;
pub const INT: u16 = 0x08;
pub const IAG: u16 = 0x09;
pub const IAS: u16 = 0x0A;
pub const RFI: u16 = 0x0B;
pub const IAQ: u16 = 0x0C;
pub const HWN: u16 = 0x10;
pub const HWQ: u16 = 0x11;
pub const HWI: u16 = 0x12;

/// Device that records the A register of every HWI it receives.
#[derive(Debug, Clone)]
pub struct TestDevice {
    pub hardware_id: u32,
    pub version: u16,
    pub manufacturer: u32,
    /// A register of each received interrupt, in order.
    pub received: Vec<u16>,
    /// Number of `on_cycle` calls.
    pub cycles: u64,
    /// Extra cycles reported for every HWI.
    pub extra_cycles: u16,
    /// Message raised from every `on_cycle` when set.
    pub raise_each_cycle: Option<u16>,
}

impl TestDevice {
    pub fn new(hardware_id: u32) -> Self {
        Self {
            hardware_id,
            version: 0,
            manufacturer: 0,
            received: Vec::new(),
            cycles: 0,
            extra_cycles: 0,
            raise_each_cycle: None,
        }
    }
}

impl Device for TestDevice {
    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            hardware_id: self.hardware_id,
            version: self.version,
            manufacturer: self.manufacturer,
            name: "test device",
        }
    }

    fn on_cycle(&mut self, ctx: &mut DeviceContext<'_>) -> Result<(), CpuError> {
        self.cycles += 1;
        if let Some(message) = self.raise_each_cycle {
            ctx.raise(message)?;
        }
        Ok(())
    }

    fn on_interrupt(&mut self, ctx: &mut DeviceContext<'_>) -> Result<u16, CpuError> {
        self.received.push(ctx.reg(Register::A));
        Ok(self.extra_cycles)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Drives a single device outside a CPU, with interrupt queueing forced on
/// so every message the device raises can be inspected.
pub struct Harness {
    pub state: CpuState,
    pub memory: Memory,
    pub clock_speed: u32,
}

impl Harness {
    pub fn new(clock_speed: u32) -> Self {
        let mut state = CpuState::new();
        state.queueing = true;
        Self {
            state,
            memory: Memory::new(),
            clock_speed,
        }
    }

    /// Set `regs`, deliver a HWI and return the extra cycles reported.
    pub fn interrupt<D: Device>(&mut self, dev: &mut D, regs: &[(Register, u16)]) -> u16 {
        for (r, v) in regs {
            self.state.set_reg(*r, *v);
        }
        let mut ctx = DeviceContext::new(&mut self.state, &mut self.memory, self.clock_speed);
        dev.on_interrupt(&mut ctx).unwrap()
    }

    /// Run `n` device cycles.
    pub fn cycle<D: Device>(&mut self, dev: &mut D, n: u64) {
        for _ in 0..n {
            let mut ctx = DeviceContext::new(&mut self.state, &mut self.memory, self.clock_speed);
            dev.on_cycle(&mut ctx).unwrap();
        }
    }

    pub fn reg(&self, r: Register) -> u16 {
        self.state.reg(r)
    }

    /// Messages raised so far, oldest first.
    pub fn raised(&self) -> Vec<u16> {
        self.state.queue.iter().copied().collect()
    }

    pub fn clear_raised(&mut self) {
        self.state.queue.clear();
    }
}
