/*!
hardware.rs - Device bus opcodes

```text
HWN a   a <- number of attached devices
HWQ a   A,B <- hardware id (low, high); C <- version;
        X,Y <- manufacturer (low, high) of the device in slot a
HWI a   deliver an interrupt to the device in slot a
```

HWQ and HWI on an empty slot do nothing. Extra cycles reported by a device
for HWI are added to the instruction cost.
*/

use tracing::trace;

use crate::bus::Bus;
use crate::cpu::addressing::{Operand, read, write};
use crate::cpu::decode::SpecialOp;
use crate::cpu::regs::Register;
use crate::cpu::state::CpuState;
use crate::error::CpuError;

pub(crate) fn handle(
    op: SpecialOp,
    a: Operand,
    state: &mut CpuState,
    bus: &mut Bus,
    cycles: &mut u32,
) -> Result<bool, CpuError> {
    match op {
        SpecialOp::Hwn => {
            let count = bus.device_count() as u16;
            write(a, state, bus.memory_mut(), count);
        }
        SpecialOp::Hwq => {
            let slot = read(a, state, bus.memory()) as usize;
            if let Some(info) = bus.device_info(slot) {
                state.set_reg(Register::A, info.hardware_id as u16);
                state.set_reg(Register::B, (info.hardware_id >> 16) as u16);
                state.set_reg(Register::C, info.version);
                state.set_reg(Register::X, info.manufacturer as u16);
                state.set_reg(Register::Y, (info.manufacturer >> 16) as u16);
            }
        }
        SpecialOp::Hwi => {
            let slot = read(a, state, bus.memory()) as usize;
            match bus.interrupt(slot, state)? {
                Some(extra) => *cycles += u32::from(extra),
                None => trace!(slot, "HWI to empty slot"),
            }
        }
        _ => return Ok(false),
    }
    Ok(true)
}
