/*!
Mackapar Suspended Particle Exciter Display, Rev 3 (SPED-3).

A rotating vector display. The program maps a region of vertices; the
host reads them back with `vertices()` and draws them under `rotation()`.

Vertex encoding (two words per vertex):

```text
word 0: bits 7..0   x
        bits 15..8  y
word 1: bits 7..0   z
        bits 9..8   color
        bit  10     intense
```

At most 128 vertices are displayed. Rotation turns one degree at a time
at 50 degrees per emulated second, along the shorter way round.

Interrupts (A register)
- 0: poll. B <- state, C <- last error; the error is cleared.
- 1: map X as the vertex region and Y as the vertex count.
- 2: rotate to X % 360 degrees.
*/

use std::any::Any;

use tracing::debug;

use crate::bus::{Device, DeviceContext, DeviceInfo, Memory};
use crate::cpu::regs::Register;
use crate::error::CpuError;

pub const STATE_NO_DATA: u16 = 0x0000;
pub const STATE_RUNNING: u16 = 0x0001;
pub const STATE_TURNING: u16 = 0x0002;

pub const ERROR_NONE: u16 = 0x0000;
pub const ERROR_BROKEN: u16 = 0xFFFF;

pub const MAX_VERTICES: u16 = 128;

/// Degrees per emulated second.
pub const ROTATION_SPEED: u32 = 50;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vertex {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    /// Color index 0..=3.
    pub color: u8,
    pub intense: bool,
}

impl Vertex {
    pub fn decode(first: u16, second: u16) -> Self {
        Self {
            x: (first & 0xFF) as u8,
            y: (first >> 8) as u8,
            z: (second & 0xFF) as u8,
            color: ((second >> 8) & 0x3) as u8,
            intense: second & 0x400 != 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Sped3 {
    state: u16,
    error: u16,
    region: u16,
    count: u16,
    rotation: u16,
    target: u16,
    cycles: u32,
}

impl Sped3 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> u16 {
        self.state
    }

    /// Current rotation in degrees (0..360).
    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    pub fn target_rotation(&self) -> u16 {
        self.target
    }

    /// Decode the mapped vertices. Empty unless a region is mapped.
    pub fn vertices(&self, memory: &Memory) -> Vec<Vertex> {
        (0..self.count.min(MAX_VERTICES))
            .map(|i| {
                let addr = self.region.wrapping_add(i * 2);
                Vertex::decode(memory.read(addr), memory.read(addr.wrapping_add(1)))
            })
            .collect()
    }

    fn idle_state(&self) -> u16 {
        if self.count == 0 {
            STATE_NO_DATA
        } else {
            STATE_RUNNING
        }
    }

    fn turn_one_degree(&mut self) {
        let ahead = (self.target + 360 - self.rotation) % 360;
        if ahead == 0 {
            return;
        }
        self.rotation = if ahead <= 180 {
            (self.rotation + 1) % 360
        } else {
            (self.rotation + 359) % 360
        };
    }
}

impl Device for Sped3 {
    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            hardware_id: 0x42ba_bf3c,
            version: 0x0003,
            manufacturer: 0x1eb3_7e91,
            name: "Mackapar Suspended Particle Exciter Display, Rev 3 (SPED-3)",
        }
    }

    fn on_cycle(&mut self, ctx: &mut DeviceContext<'_>) -> Result<(), CpuError> {
        if self.state != STATE_TURNING {
            return Ok(());
        }
        self.cycles += 1;
        if self.cycles < (ctx.clock_speed() / ROTATION_SPEED).max(1) {
            return Ok(());
        }
        self.cycles = 0;
        self.turn_one_degree();
        if self.rotation == self.target {
            self.state = self.idle_state();
            debug!(rotation = self.rotation, "SPED-3 rotation reached");
        }
        Ok(())
    }

    fn on_interrupt(&mut self, ctx: &mut DeviceContext<'_>) -> Result<u16, CpuError> {
        match ctx.reg(Register::A) {
            0 => {
                ctx.set_reg(Register::B, self.state);
                ctx.set_reg(Register::C, self.error);
                self.error = ERROR_NONE;
            }
            1 => {
                self.region = ctx.reg(Register::X);
                self.count = ctx.reg(Register::Y);
                if self.count == 0 {
                    self.state = STATE_NO_DATA;
                } else if self.state == STATE_NO_DATA {
                    self.state = STATE_RUNNING;
                }
                debug!(region = self.region, count = self.count, "SPED-3 region mapped");
            }
            2 => {
                self.target = ctx.reg(Register::X) % 360;
                self.state = STATE_TURNING;
                self.cycles = 0;
                debug!(target = self.target, "SPED-3 rotating");
            }
            _ => {}
        }
        Ok(0)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
