#![doc = r#"
Bus module: memory plus the ordered list of attached devices.

Overview
- `Bus` owns the 64 Ki-word memory and every attached peripheral. The CPU
  owns the Bus next to its `CpuState`, so device callbacks can borrow the
  register file and memory at the same time without aliasing.

Modules and responsibilities
- ram: `Memory`, the flat word-addressed RAM, and big-endian image decoding.
- interfaces: the `Device` trait, `DeviceInfo` and the `DeviceContext` view.
- clock: per-cycle orchestration (advance the cycle counter, cycle every device in bus order).

Slots
- A device's slot is its index in attachment order. Slots never move: devices
  can only be attached before the first `step`, and are never removed.
"#]

pub mod clock;
pub mod interfaces;
pub mod ram;

pub use interfaces::{Device, DeviceContext, DeviceInfo};
pub use ram::Memory;

use tracing::{debug, warn};

use crate::config::Config;
use crate::cpu::state::CpuState;
use crate::error::CpuError;

pub struct Bus {
    memory: Memory,
    devices: Vec<Box<dyn Device>>,
    clock_speed: u32,
    /// Set by the first `step`; locks the device list.
    started: bool,
    /// Total cycles since construction.
    cycles: u64,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.devices.iter().map(|d| d.info().name).collect();
        f.debug_struct("Bus")
            .field("devices", &names)
            .field("clock_speed", &self.clock_speed)
            .field("started", &self.started)
            .field("cycles", &self.cycles)
            .finish()
    }
}

impl Bus {
    pub fn new(config: Config) -> Self {
        Self {
            memory: Memory::new(),
            devices: Vec::new(),
            clock_speed: config.clock_speed.max(1),
            started: false,
            cycles: 0,
        }
    }

    #[inline]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    #[inline]
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    #[inline]
    pub fn clock_speed(&self) -> u32 {
        self.clock_speed
    }

    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[inline]
    pub(crate) fn mark_started(&mut self) {
        self.started = true;
    }

    // ---------------------------------------------------------------------
    // Device list
    // ---------------------------------------------------------------------

    /// Append a device and return its slot.
    pub fn attach(&mut self, device: Box<dyn Device>) -> Result<usize, CpuError> {
        let info = device.info();
        if self.started {
            warn!(name = info.name, "device attached after execution started");
            return Err(CpuError::AttachAfterStart { name: info.name });
        }
        let slot = self.devices.len();
        debug!(
            slot,
            name = info.name,
            hardware_id = format_args!("{:#010x}", info.hardware_id),
            "device attached"
        );
        self.devices.push(device);
        Ok(slot)
    }

    #[inline]
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn device_info(&self, slot: usize) -> Option<DeviceInfo> {
        self.devices.get(slot).map(|d| d.info())
    }

    /// Typed access to the device in `slot`.
    pub fn device_at<D: Device + 'static>(&self, slot: usize) -> Option<&D> {
        self.devices
            .get(slot)
            .and_then(|d| d.as_any().downcast_ref::<D>())
    }

    /// Typed mutable access to the device in `slot`.
    pub fn device_at_mut<D: Device + 'static>(&mut self, slot: usize) -> Option<&mut D> {
        self.devices
            .get_mut(slot)
            .and_then(|d| d.as_any_mut().downcast_mut::<D>())
    }

    /// First attached device of type `D`.
    pub fn find<D: Device + 'static>(&self) -> Option<&D> {
        self.devices
            .iter()
            .find_map(|d| d.as_any().downcast_ref::<D>())
    }

    /// First attached device of type `D`, mutably.
    pub fn find_mut<D: Device + 'static>(&mut self) -> Option<&mut D> {
        self.devices
            .iter_mut()
            .find_map(|d| d.as_any_mut().downcast_mut::<D>())
    }

    /// Deliver a hardware interrupt to `slot`.
    ///
    /// Returns the extra cycles the device asked for, or `None` when the slot is empty.
    pub(crate) fn interrupt(
        &mut self,
        slot: usize,
        state: &mut CpuState,
    ) -> Result<Option<u16>, CpuError> {
        let Some(device) = self.devices.get_mut(slot) else {
            return Ok(None);
        };
        let mut ctx = DeviceContext::new(state, &mut self.memory, self.clock_speed);
        device.on_interrupt(&mut ctx).map(Some)
    }
}
