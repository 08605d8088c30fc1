/*!
Generic keyboard (compatible).

Behavior:
- The host input layer calls `press` / `release` with key codes:
  * 0x20-0x7F: ASCII characters
  * `BACKSPACE`, `RETURN`, `INSERT`, `DELETE`
  * `ARROW_UP`, `ARROW_DOWN`, `ARROW_LEFT`, `ARROW_RIGHT`
  * `SHIFT`, `CONTROL`
  Any other code is ignored.
- Pressing a key appends it to the typed-key FIFO and marks it held. The
  FIFO holds `TYPED_CAPACITY` keys; when full, the oldest key is dropped.
- When an interrupt message is configured, pressing a non-ASCII key and
  releasing any key each request one interrupt. `press` and `release` run
  outside the CPU step, so requested interrupts are raised on the next
  `on_cycle`.

Interrupts (A register):
- 0: clear the typed-key FIFO.
- 1: C <- next typed key, or 0 if none.
- 2: C <- 1 if key B is held, else 0.
- 3: B != 0 sets the interrupt message to B; B = 0 disables interrupts.
*/

use std::any::Any;
use std::collections::VecDeque;

use tracing::debug;

use crate::bus::{Device, DeviceContext, DeviceInfo};
use crate::cpu::regs::Register;
use crate::error::CpuError;

pub const BACKSPACE: u16 = 0x10;
pub const RETURN: u16 = 0x11;
pub const INSERT: u16 = 0x12;
pub const DELETE: u16 = 0x13;
pub const ARROW_UP: u16 = 0x80;
pub const ARROW_DOWN: u16 = 0x81;
pub const ARROW_LEFT: u16 = 0x82;
pub const ARROW_RIGHT: u16 = 0x83;
pub const SHIFT: u16 = 0x90;
pub const CONTROL: u16 = 0x91;

/// Depth of the typed-key FIFO.
pub const TYPED_CAPACITY: usize = 64;

const SPECIAL_KEYS: [u16; 10] = [
    BACKSPACE,
    RETURN,
    INSERT,
    DELETE,
    ARROW_UP,
    ARROW_DOWN,
    ARROW_LEFT,
    ARROW_RIGHT,
    SHIFT,
    CONTROL,
];

#[inline]
fn is_ascii(key: u16) -> bool {
    (0x20..=0x7F).contains(&key)
}

/// True for every code the keyboard accepts.
pub fn is_valid_key(key: u16) -> bool {
    is_ascii(key) || SPECIAL_KEYS.contains(&key)
}

#[derive(Clone, Debug, Default)]
pub struct Keyboard {
    // Held keys, one bit per code (all valid codes are below 0x100).
    held: [u64; 4],

    // Typed keys, oldest first.
    typed: VecDeque<u16>,

    // Interrupt message; 0 = disabled.
    message: u16,

    // Interrupts requested by press/release, raised on the next cycle.
    pending: u32,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn bit(key: u16) -> (usize, u64) {
        ((key as usize >> 6) & 0x3, 1u64 << (key & 0x3F))
    }

    pub fn press(&mut self, key: u16) {
        if !is_valid_key(key) {
            debug!(key, "ignoring invalid key press");
            return;
        }
        let (word, mask) = Self::bit(key);
        self.held[word] |= mask;
        if self.typed.len() == TYPED_CAPACITY {
            self.typed.pop_front();
        }
        self.typed.push_back(key);
        if !is_ascii(key) && self.message != 0 {
            self.pending += 1;
        }
    }

    pub fn release(&mut self, key: u16) {
        if !is_valid_key(key) {
            debug!(key, "ignoring invalid key release");
            return;
        }
        let (word, mask) = Self::bit(key);
        self.held[word] &= !mask;
        if self.message != 0 {
            self.pending += 1;
        }
    }

    /// True while `key` is held down.
    pub fn is_pressed(&self, key: u16) -> bool {
        if !is_valid_key(key) {
            return false;
        }
        let (word, mask) = Self::bit(key);
        self.held[word] & mask != 0
    }

    /// Number of typed keys not yet read by the CPU.
    pub fn buffered(&self) -> usize {
        self.typed.len()
    }
}

impl Device for Keyboard {
    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            hardware_id: 0x30cf_7406,
            version: 1,
            manufacturer: 0,
            name: "Generic Keyboard (compatible)",
        }
    }

    fn on_cycle(&mut self, ctx: &mut DeviceContext<'_>) -> Result<(), CpuError> {
        while self.pending > 0 {
            self.pending -= 1;
            if self.message != 0 {
                ctx.raise(self.message)?;
            }
        }
        Ok(())
    }

    fn on_interrupt(&mut self, ctx: &mut DeviceContext<'_>) -> Result<u16, CpuError> {
        match ctx.reg(Register::A) {
            0 => self.typed.clear(),
            1 => {
                let key = self.typed.pop_front().unwrap_or(0);
                ctx.set_reg(Register::C, key);
            }
            2 => {
                let held = self.is_pressed(ctx.reg(Register::B));
                ctx.set_reg(Register::C, u16::from(held));
            }
            3 => self.message = ctx.reg(Register::B),
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
