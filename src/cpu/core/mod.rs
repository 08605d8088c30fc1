/*!
core::Cpu - DCPU-16 façade wrapping `CpuState` and the `Bus`.

Design
======
- `Cpu` owns the architectural state and the bus (memory + devices) side by
  side, so the dispatcher can hand devices a view of both at once.
- `step` is one machine cycle; `run` repeats it. Both stop at the first
  fatal error (invalid opcode, interrupt queue overflow) and return it.
- Devices are attached by value before the first `step`. The CPU keeps
  ownership and hands back typed borrows for configuration.

Reset
=====
`reset` zeroes every register and all of memory and drops pending
interrupts. Attached devices stay attached and keep their own state.
*/

use crate::bus::ram::{Memory, words_from_be_bytes};
use crate::bus::{Bus, Device};
use crate::config::Config;
use crate::cpu::dispatch;
use crate::cpu::regs::Register;
use crate::cpu::state::CpuState;
use crate::error::CpuError;

#[derive(Debug)]
pub struct Cpu {
    state: CpuState,
    bus: Bus,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Construct a CPU with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            state: CpuState::new(),
            bus: Bus::new(config),
        }
    }

    /// Return immutable reference to internal state (for inspection / testing).
    pub fn state(&self) -> &CpuState {
        &self.state
    }

    /// Return mutable reference to internal state.
    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn memory(&self) -> &Memory {
        self.bus.memory()
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        self.bus.memory_mut()
    }

    pub fn clock_speed(&self) -> u32 {
        self.bus.clock_speed()
    }

    /// Zero registers and memory, drop pending interrupts and clear all flags.
    pub fn reset(&mut self) {
        self.state.reset();
        self.bus.memory_mut().reset();
    }

    /// Copy `words` into memory starting at address 0.
    pub fn load(&mut self, words: &[u16]) {
        self.bus.memory_mut().load(words);
    }

    /// Load a flat big-endian word image at address 0.
    pub fn load_bytes(&mut self, bytes: &[u8]) {
        self.load(&words_from_be_bytes(bytes));
    }

    // ---------------------------------------------------------------------
    // Register accessors
    // ---------------------------------------------------------------------
    pub fn reg(&self, r: Register) -> u16 {
        self.state.reg(r)
    }
    pub fn set_reg(&mut self, r: Register, v: u16) {
        self.state.set_reg(r, v);
    }
    pub fn pc(&self) -> u16 {
        self.state.pc
    }
    pub fn set_pc(&mut self, v: u16) {
        self.state.pc = v;
    }
    pub fn sp(&self) -> u16 {
        self.state.sp
    }
    pub fn set_sp(&mut self, v: u16) {
        self.state.sp = v;
    }
    pub fn ex(&self) -> u16 {
        self.state.ex
    }
    pub fn set_ex(&mut self, v: u16) {
        self.state.ex = v;
    }
    pub fn ia(&self) -> u16 {
        self.state.ia
    }
    pub fn set_ia(&mut self, v: u16) {
        self.state.ia = v;
    }

    // ---------------------------------------------------------------------
    // Interrupt state
    // ---------------------------------------------------------------------
    pub fn interrupts_queueing(&self) -> bool {
        self.state.queueing
    }

    pub fn queued_interrupts(&self) -> usize {
        self.state.queue.len()
    }

    /// Cycles the retiring instruction still owes.
    pub fn sleep_cycles(&self) -> i32 {
        self.state.sleep
    }

    /// Raise an interrupt from the host side.
    pub fn raise(&mut self, message: u16) -> Result<(), CpuError> {
        dispatch::raise(&mut self.state, self.bus.memory_mut(), message)
    }

    // ---------------------------------------------------------------------
    // Devices
    // ---------------------------------------------------------------------

    /// Attach `device` to the next bus slot and return a borrow of it.
    pub fn attach<D: Device + 'static>(&mut self, device: D) -> Result<&mut D, CpuError> {
        let slot = self.bus.attach(Box::new(device))?;
        self.bus
            .device_at_mut::<D>(slot)
            .ok_or(CpuError::DeviceType { slot })
    }

    pub fn device_count(&self) -> usize {
        self.bus.device_count()
    }

    /// First attached device of type `D`.
    pub fn device<D: Device + 'static>(&self) -> Option<&D> {
        self.bus.find::<D>()
    }

    /// First attached device of type `D`, mutably.
    pub fn device_mut<D: Device + 'static>(&mut self) -> Option<&mut D> {
        self.bus.find_mut::<D>()
    }

    /// Device of type `D` in `slot`.
    pub fn device_at<D: Device + 'static>(&self, slot: usize) -> Result<&D, CpuError> {
        self.bus
            .device_at::<D>(slot)
            .ok_or(CpuError::DeviceType { slot })
    }

    /// Device of type `D` in `slot`, mutably.
    pub fn device_at_mut<D: Device + 'static>(&mut self, slot: usize) -> Result<&mut D, CpuError> {
        self.bus
            .device_at_mut::<D>(slot)
            .ok_or(CpuError::DeviceType { slot })
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Execute one machine cycle.
    pub fn step(&mut self) -> Result<(), CpuError> {
        dispatch::step(&mut self.state, &mut self.bus)
    }

    /// Execute `cycles` machine cycles, stopping at the first fatal error.
    pub fn run(&mut self, cycles: u64) -> Result<(), CpuError> {
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDevice;

    #[test]
    fn construction_and_reset() {
        let mut cpu = Cpu::new();
        cpu.load(&[1, 2, 3]);
        cpu.set_reg(Register::Z, 9);
        cpu.set_pc(4);
        cpu.set_sp(5);
        cpu.set_ex(6);
        cpu.set_ia(7);
        cpu.state_mut().queueing = true;
        cpu.state_mut().queue.push_back(1);

        cpu.reset();

        for r in Register::ALL {
            assert_eq!(cpu.reg(r), 0, "{r}");
        }
        assert_eq!((cpu.pc(), cpu.sp(), cpu.ex(), cpu.ia()), (0, 0, 0, 0));
        assert!(cpu.memory().as_slice().iter().all(|w| *w == 0));
        assert!(!cpu.interrupts_queueing());
        assert_eq!(cpu.queued_interrupts(), 0);
    }

    #[test]
    fn attach_returns_typed_borrow() {
        let mut cpu = Cpu::new();
        let dev = cpu.attach(TestDevice::new(0x1234_5678)).unwrap();
        dev.version = 3;
        assert_eq!(cpu.device::<TestDevice>().map(|d| d.version), Some(3));
        assert!(cpu.device_at::<TestDevice>(0).is_ok());
        assert_eq!(
            cpu.device_at::<TestDevice>(1).err(),
            Some(CpuError::DeviceType { slot: 1 })
        );
    }

    #[test]
    fn attach_after_first_step_is_rejected() {
        let mut cpu = Cpu::new();
        cpu.load(&[0x7C01, 0xDEAD]);
        cpu.step().unwrap();
        let err = cpu.attach(TestDevice::new(1)).err();
        assert_eq!(err, Some(CpuError::AttachAfterStart { name: "test device" }));
        assert_eq!(cpu.device_count(), 0);
    }

    #[test]
    fn load_bytes_is_big_endian() {
        let mut cpu = Cpu::new();
        cpu.load_bytes(&[0x7C, 0x01, 0xDE, 0xAD]);
        assert_eq!(cpu.memory().read(0), 0x7C01);
        assert_eq!(cpu.memory().read(1), 0xDEAD);
    }
}
