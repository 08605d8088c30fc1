/*!
Clock/timing orchestrator for the Bus.

Purpose
- Centralize the order of operations for a single machine cycle:
  * Increment the bus cycle counter
  * Call `on_cycle` on every device, in slot order

Integration
- `Cpu::step` calls `clock::tick` with the guard flag already set, before
  any instruction work of that step. Interrupts devices raise here are
  therefore queued and dispatched on a later step.
*/

use crate::bus::Bus;
use crate::bus::interfaces::DeviceContext;
use crate::cpu::state::CpuState;
use crate::error::CpuError;

/// Advance every attached device by one cycle.
pub fn tick(bus: &mut Bus, state: &mut CpuState) -> Result<(), CpuError> {
    bus.cycles = bus.cycles.wrapping_add(1);

    let clock_speed = bus.clock_speed;
    for device in bus.devices.iter_mut() {
        let mut ctx = DeviceContext::new(state, &mut bus.memory, clock_speed);
        device.on_cycle(&mut ctx)?;
    }
    Ok(())
}
