/*!
Generic clock (compatible).

Interrupts (A register):
- 0: tick every B/60 seconds; B = 0 stops the clock. Resets the tick count.
  A period shorter than one cycle ticks on every cycle.
- 1: C <- ticks since the last A=0.
- 2: B != 0 raises message B on every tick; B = 0 disables tick interrupts.
*/

use std::any::Any;

use tracing::debug;

use crate::bus::{Device, DeviceContext, DeviceInfo};
use crate::cpu::regs::Register;
use crate::error::CpuError;

#[derive(Clone, Debug, Default)]
pub struct Clock {
    /// Cycles since the last tick.
    cycles: u64,
    /// 0 when stopped.
    cycles_per_tick: u64,
    ticks: u16,
    message: u16,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks since the clock was last configured.
    pub fn ticks(&self) -> u16 {
        self.ticks
    }

    pub fn cycles_per_tick(&self) -> u64 {
        self.cycles_per_tick
    }
}

impl Device for Clock {
    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            hardware_id: 0x12d0_b402,
            version: 1,
            manufacturer: 0,
            name: "Generic Clock (compatible)",
        }
    }

    fn on_cycle(&mut self, ctx: &mut DeviceContext<'_>) -> Result<(), CpuError> {
        if self.cycles_per_tick == 0 {
            return Ok(());
        }
        self.cycles += 1;
        if self.cycles >= self.cycles_per_tick {
            self.cycles = 0;
            self.ticks = self.ticks.wrapping_add(1);
            if self.message != 0 {
                ctx.raise(self.message)?;
            }
        }
        Ok(())
    }

    fn on_interrupt(&mut self, ctx: &mut DeviceContext<'_>) -> Result<u16, CpuError> {
        match ctx.reg(Register::A) {
            0 => {
                let b = u64::from(ctx.reg(Register::B));
                self.cycles_per_tick = if b == 0 {
                    0
                } else {
                    (b * u64::from(ctx.clock_speed()) / 60).max(1)
                };
                self.cycles = 0;
                self.ticks = 0;
                debug!(cycles_per_tick = self.cycles_per_tick, "clock rate set");
            }
            1 => ctx.set_reg(Register::C, self.ticks),
            2 => self.message = ctx.reg(Register::B),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::regs::Register::{A, B, C};
    use crate::test_utils::Harness;

    #[test]
    fn stopped_until_configured() {
        let mut h = Harness::new(600);
        let mut clock = Clock::new();
        h.cycle(&mut clock, 100);
        assert_eq!(clock.ticks(), 0);
    }

    #[test]
    fn ticks_at_configured_rate() {
        let mut h = Harness::new(600);
        let mut clock = Clock::new();
        // B = 1 -> 60 Hz -> 10 cycles per tick at 600 cycles/s.
        h.interrupt(&mut clock, &[(A, 0), (B, 1)]);
        assert_eq!(clock.cycles_per_tick(), 10);

        h.cycle(&mut clock, 9);
        assert_eq!(clock.ticks(), 0);
        h.cycle(&mut clock, 1);
        assert_eq!(clock.ticks(), 1);
        h.cycle(&mut clock, 25);

        h.interrupt(&mut clock, &[(A, 1)]);
        assert_eq!(h.reg(C), 3);
    }

    #[test]
    fn reconfiguring_resets_the_count() {
        let mut h = Harness::new(600);
        let mut clock = Clock::new();
        h.interrupt(&mut clock, &[(A, 0), (B, 1)]);
        h.cycle(&mut clock, 35);
        h.interrupt(&mut clock, &[(A, 0), (B, 2)]);
        h.interrupt(&mut clock, &[(A, 1)]);
        assert_eq!(h.reg(C), 0);
        h.interrupt(&mut clock, &[(A, 0), (B, 0)]);
        h.cycle(&mut clock, 100);
        assert_eq!(clock.ticks(), 0);
    }

    #[test]
    fn slow_machine_ticks_every_cycle() {
        // 60 Hz cannot be reached at 30 cycles/s.
        let mut h = Harness::new(30);
        let mut clock = Clock::new();
        h.interrupt(&mut clock, &[(A, 0), (B, 1)]);
        assert_eq!(clock.cycles_per_tick(), 1);
        h.cycle(&mut clock, 4);
        assert_eq!(clock.ticks(), 4);
    }

    #[test]
    fn raises_message_on_tick() {
        let mut h = Harness::new(60);
        let mut clock = Clock::new();
        h.interrupt(&mut clock, &[(A, 2), (B, 0x00AB)]);
        h.interrupt(&mut clock, &[(A, 0), (B, 1)]);
        h.cycle(&mut clock, 3);
        assert_eq!(h.raised(), vec![0x00AB; 3]);

        h.clear_raised();
        h.interrupt(&mut clock, &[(A, 2), (B, 0)]);
        h.cycle(&mut clock, 3);
        assert!(h.raised().is_empty());
    }
}
