/*!
LEM1802 - Low Energy Monitor.

Overview
========
A 128x96 pixel text-mode display showing 32x12 character cells of 4x8
pixels. Video memory is 384 words of CPU memory:

```text
bits 15..12  foreground palette index
bits 11..8   background palette index
bit  7       blink
bits 6..0    character
```

Glyphs are two words per character (four 8-pixel columns, the first word's
high byte being the leftmost column, bit 0 the top row). Palette entries
are 0x0RGB. Font and palette come from CPU memory when mapped, otherwise
from the built-in tables below.

Power
=====
DISCONNECTED --(A=0, B!=0)--> STARTING_UP --(one second)--> ACTIVATED.
Mapping video memory to 0 disconnects at any time. While activated the
blink phase flips once per second.

Interrupts (A register)
=======================
- 0: map video memory at B (0 disconnects)
- 1: map font at B (0 = built-in)
- 2: map palette at B (0 = built-in)
- 3: border color <- B & 0xF
- 4: dump the built-in font to B (256 extra cycles)
- 5: dump the built-in palette to B (16 extra cycles)
*/

use std::any::Any;

use tracing::debug;

use crate::bus::{Device, DeviceContext, DeviceInfo, Memory};
use crate::cpu::regs::Register;
use crate::error::CpuError;

/// Screen width in pixels.
pub const WIDTH: usize = 128;
/// Screen height in pixels.
pub const HEIGHT: usize = 96;

const COLUMNS: u16 = 32;
const CELLS: u16 = 384;

/// Extra CPU cycles charged for dumping the font.
pub const FONT_DUMP_CYCLES: u16 = 256;
/// Extra CPU cycles charged for dumping the palette.
pub const PALETTE_DUMP_CYCLES: u16 = 16;

pub const DEFAULT_FONT: [u16; 256] = [
    0xb79e, 0x388e, 0x722c, 0x75f4, 0x19bb, 0x7f8f, 0x85f9, 0xb158, 0x242e, 0x2400, 0x082a, 0x0800,
    0x0008, 0x0000, 0x0808, 0x0808, 0x00ff, 0x0000, 0x00f8, 0x0808, 0x08f8, 0x0000, 0x080f, 0x0000,
    0x000f, 0x0808, 0x00ff, 0x0808, 0x08f8, 0x0808, 0x08ff, 0x0000, 0x080f, 0x0808, 0x08ff, 0x0808,
    0x6633, 0x99cc, 0x9933, 0x66cc, 0xfef8, 0xe080, 0x7f1f, 0x0701, 0x0107, 0x1f7f, 0x80e0, 0xf8fe,
    0x5500, 0xaa00, 0x55aa, 0x55aa, 0xffaa, 0xff55, 0x0f0f, 0x0f0f, 0xf0f0, 0xf0f0, 0x0000, 0xffff,
    0xffff, 0x0000, 0xffff, 0xffff, 0x0000, 0x0000, 0x005f, 0x0000, 0x0300, 0x0300, 0x3e14, 0x3e00,
    0x266b, 0x3200, 0x611c, 0x4300, 0x3629, 0x7650, 0x0002, 0x0100, 0x1c22, 0x4100, 0x4122, 0x1c00,
    0x1408, 0x1400, 0x081c, 0x0800, 0x4020, 0x0000, 0x0808, 0x0800, 0x0040, 0x0000, 0x601c, 0x0300,
    0x3e49, 0x3e00, 0x427f, 0x4000, 0x6259, 0x4600, 0x2249, 0x3600, 0x0f08, 0x7f00, 0x2745, 0x3900,
    0x3e49, 0x3200, 0x6119, 0x0700, 0x3649, 0x3600, 0x2649, 0x3e00, 0x0024, 0x0000, 0x4024, 0x0000,
    0x0814, 0x2200, 0x1414, 0x1400, 0x2214, 0x0800, 0x0259, 0x0600, 0x3e59, 0x5e00, 0x7e09, 0x7e00,
    0x7f49, 0x3600, 0x3e41, 0x2200, 0x7f41, 0x3e00, 0x7f49, 0x4100, 0x7f09, 0x0100, 0x3e41, 0x7a00,
    0x7f08, 0x7f00, 0x417f, 0x4100, 0x2040, 0x3f00, 0x7f08, 0x7700, 0x7f40, 0x4000, 0x7f06, 0x7f00,
    0x7f01, 0x7e00, 0x3e41, 0x3e00, 0x7f09, 0x0600, 0x3e61, 0x7e00, 0x7f09, 0x7600, 0x2649, 0x3200,
    0x017f, 0x0100, 0x3f40, 0x7f00, 0x1f60, 0x1f00, 0x7f30, 0x7f00, 0x7708, 0x7700, 0x0778, 0x0700,
    0x7149, 0x4700, 0x007f, 0x4100, 0x031c, 0x6000, 0x417f, 0x0000, 0x0201, 0x0200, 0x8080, 0x8000,
    0x0001, 0x0200, 0x2454, 0x7800, 0x7f44, 0x3800, 0x3844, 0x2800, 0x3844, 0x7f00, 0x3854, 0x5800,
    0x087e, 0x0900, 0x4854, 0x3c00, 0x7f04, 0x7800, 0x047d, 0x0000, 0x2040, 0x3d00, 0x7f10, 0x6c00,
    0x017f, 0x0000, 0x7c18, 0x7c00, 0x7c04, 0x7800, 0x3844, 0x3800, 0x7c14, 0x0800, 0x0814, 0x7c00,
    0x7c04, 0x0800, 0x4854, 0x2400, 0x043e, 0x4400, 0x3c40, 0x7c00, 0x1c60, 0x1c00, 0x7c30, 0x7c00,
    0x6c10, 0x6c00, 0x4c50, 0x3c00, 0x6454, 0x4c00, 0x0836, 0x4100, 0x0077, 0x0000, 0x4136, 0x0800,
    0x0201, 0x0201, 0x0205, 0x0200,
];

pub const DEFAULT_PALETTE: [u16; 16] = [
    0x000, 0x00a, 0x0a0, 0x0aa, 0xa00, 0xa0a, 0xa50, 0xaaa, 0x555, 0x55f, 0x5f5, 0x5ff, 0xf55, 0xf5f,
    0xff5, 0xfff,
];

/// An 8-bit-per-channel color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Expand a 0x0RGB palette word (each nibble times 0x11).
    #[inline]
    pub fn from_palette_word(word: u16) -> Self {
        let nibble = |shift: u16| (((word >> shift) & 0xF) as u8) * 0x11;
        Rgb {
            r: nibble(8),
            g: nibble(4),
            b: nibble(0),
        }
    }
}

/// One rendered screen, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pixels: Vec<Rgb>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::blank()
    }
}

impl Frame {
    pub const WIDTH: usize = WIDTH;
    pub const HEIGHT: usize = HEIGHT;

    /// An all-black frame.
    pub fn blank() -> Self {
        Self {
            pixels: vec![Rgb::BLACK; WIDTH * HEIGHT],
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * WIDTH + x]
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, c: Rgb) {
        self.pixels[y * WIDTH + x] = c;
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// RGBA8 bytes, row-major, alpha always 0xFF.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| [p.r, p.g, p.b, 0xFF])
            .collect()
    }

    /// Write the frame as an image file (format from the extension).
    #[cfg(feature = "screenshot")]
    pub fn save_png(&self, path: impl AsRef<std::path::Path>) -> Result<(), image::ImageError> {
        let img = image::RgbImage::from_fn(WIDTH as u32, HEIGHT as u32, |x, y| {
            let p = self.pixel(x as usize, y as usize);
            image::Rgb([p.r, p.g, p.b])
        });
        img.save(path)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LemState {
    Disconnected,
    StartingUp,
    Activated,
}

#[derive(Clone, Debug)]
pub struct Lem1802 {
    vram: u16,
    font: u16,
    palette: u16,
    border: u16,
    /// Blinking cells are visible while set.
    blink_visible: bool,
    state: LemState,
    cycles: u32,
}

impl Default for Lem1802 {
    fn default() -> Self {
        Self::new()
    }
}

impl Lem1802 {
    pub fn new() -> Self {
        Self {
            vram: 0,
            font: 0,
            palette: 0,
            border: 0,
            blink_visible: true,
            state: LemState::Disconnected,
            cycles: 0,
        }
    }

    pub fn state(&self) -> LemState {
        self.state
    }

    pub fn activated(&self) -> bool {
        self.state == LemState::Activated
    }

    fn glyph(&self, memory: &Memory, ch: u16) -> u32 {
        let (hi, lo) = if self.font == 0 {
            let i = ch as usize * 2;
            (DEFAULT_FONT[i], DEFAULT_FONT[i + 1])
        } else {
            let base = self.font.wrapping_add(ch * 2);
            (memory.read(base), memory.read(base.wrapping_add(1)))
        };
        (u32::from(hi) << 16) | u32::from(lo)
    }

    fn color(&self, memory: &Memory, index: u16) -> Rgb {
        let word = if self.palette == 0 {
            DEFAULT_PALETTE[(index & 0xF) as usize]
        } else {
            memory.read(self.palette.wrapping_add(index & 0xF))
        };
        Rgb::from_palette_word(word)
    }

    /// Border color from the active palette.
    pub fn border_color(&self, memory: &Memory) -> Rgb {
        self.color(memory, self.border)
    }

    /// Render the screen. Black unless the display is activated.
    ///
    /// Cells holding character 0, and blinking cells while the blink phase
    /// hides them, are left black.
    pub fn render(&self, memory: &Memory) -> Frame {
        let mut frame = Frame::blank();
        if !self.activated() {
            return frame;
        }

        for i in 0..CELLS {
            let cell = memory.read(self.vram.wrapping_add(i));
            let ch = cell & 0x7F;
            let blink = cell & 0x80 != 0;
            if ch == 0 || (blink && !self.blink_visible) {
                continue;
            }
            let bg = self.color(memory, (cell >> 8) & 0xF);
            let fg = self.color(memory, (cell >> 12) & 0xF);
            let glyph = self.glyph(memory, ch);

            let left = (i % COLUMNS) as usize * 4;
            let top = (i / COLUMNS) as usize * 8;
            for x in 0..4 {
                let column = (glyph >> (8 * (3 - x))) & 0xFF;
                for y in 0..8 {
                    let lit = column & (1 << y) != 0;
                    frame.set(left + x, top + y, if lit { fg } else { bg });
                }
            }
        }
        frame
    }
}

impl Device for Lem1802 {
    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            hardware_id: 0x7349_f615,
            version: 0x1802,
            manufacturer: 0x1c6c_8b36,
            name: "LEM1802 - Low Energy Monitor",
        }
    }

    fn on_cycle(&mut self, ctx: &mut DeviceContext<'_>) -> Result<(), CpuError> {
        if self.cycles >= ctx.clock_speed() {
            match self.state {
                LemState::Activated => self.blink_visible = !self.blink_visible,
                LemState::StartingUp => {
                    self.state = LemState::Activated;
                    debug!("LEM1802 activated");
                }
                LemState::Disconnected => {}
            }
            self.cycles = 0;
        }
        self.cycles += 1;
        Ok(())
    }

    fn on_interrupt(&mut self, ctx: &mut DeviceContext<'_>) -> Result<u16, CpuError> {
        let b = ctx.reg(Register::B);
        match ctx.reg(Register::A) {
            0 => {
                self.vram = b;
                if b == 0 {
                    self.state = LemState::Disconnected;
                } else if self.state == LemState::Disconnected {
                    self.state = LemState::StartingUp;
                    self.cycles = 0;
                }
                debug!(vram = b, state = ?self.state, "LEM1802 screen mapped");
            }
            1 => self.font = b,
            2 => self.palette = b,
            3 => self.border = b & 0xF,
            4 => {
                ctx.write_block(b, &DEFAULT_FONT);
                return Ok(FONT_DUMP_CYCLES);
            }
            5 => {
                ctx.write_block(b, &DEFAULT_PALETTE);
                return Ok(PALETTE_DUMP_CYCLES);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::regs::Register::{A, B};
    use crate::test_utils::Harness;

    const CLOCK: u32 = 1000;

    fn activated(h: &mut Harness) -> Lem1802 {
        let mut lem = Lem1802::new();
        h.interrupt(&mut lem, &[(A, 0), (B, 0x8000)]);
        h.cycle(&mut lem, u64::from(CLOCK) + 1);
        assert!(lem.activated());
        lem
    }

    #[test]
    fn activation_takes_one_second() {
        let mut h = Harness::new(CLOCK);
        let mut lem = Lem1802::new();
        h.cycle(&mut lem, 10);
        h.interrupt(&mut lem, &[(A, 0), (B, 0x8000)]);
        assert_eq!(lem.state(), LemState::StartingUp);

        h.cycle(&mut lem, u64::from(CLOCK));
        assert!(!lem.activated());
        h.cycle(&mut lem, 1);
        assert!(lem.activated());

        h.interrupt(&mut lem, &[(A, 0), (B, 0)]);
        assert_eq!(lem.state(), LemState::Disconnected);
    }

    #[test]
    fn renders_black_until_activated() {
        let mut h = Harness::new(CLOCK);
        let mut lem = Lem1802::new();
        h.memory.write(0x8000, 0xF041);
        h.interrupt(&mut lem, &[(A, 0), (B, 0x8000)]);
        assert_eq!(lem.render(&h.memory), Frame::blank());
    }

    #[test]
    fn renders_glyph_with_palette_colors() {
        let mut h = Harness::new(CLOCK);
        let mut lem = activated(&mut h);
        // Cell 33 (row 1, column 1): white on blue, character 0x7F.
        h.memory.write(0x8000 + 33, 0xF17F);
        h.interrupt(&mut lem, &[(A, 1), (B, 0x9000)]);
        // Column 0 fully lit, column 1 top row only, columns 2-3 dark.
        h.memory.write(0x9000 + 0x7F * 2, 0xFF01);
        h.memory.write(0x9000 + 0x7F * 2 + 1, 0x0000);

        let frame = lem.render(&h.memory);
        let white = Rgb { r: 0xFF, g: 0xFF, b: 0xFF };
        let blue = Rgb { r: 0, g: 0, b: 0xAA };
        for y in 8..16 {
            assert_eq!(frame.pixel(4, y), white, "column 0, row {y}");
        }
        assert_eq!(frame.pixel(5, 8), white);
        assert_eq!(frame.pixel(5, 9), blue);
        assert_eq!(frame.pixel(6, 8), blue);
        assert_eq!(frame.pixel(7, 15), blue);
        // Neighbouring empty cells stay black.
        assert_eq!(frame.pixel(3, 8), Rgb::BLACK);
        assert_eq!(frame.pixel(8, 8), Rgb::BLACK);
    }

    #[test]
    fn blinking_cells_follow_the_blink_phase() {
        let mut h = Harness::new(CLOCK);
        let mut lem = activated(&mut h);
        h.memory.write(0x8000, 0xF0C1); // 'A', blinking
        assert_ne!(lem.render(&h.memory), Frame::blank());

        h.cycle(&mut lem, u64::from(CLOCK));
        assert_eq!(lem.render(&h.memory), Frame::blank());
        h.cycle(&mut lem, u64::from(CLOCK));
        assert_ne!(lem.render(&h.memory), Frame::blank());
    }

    #[test]
    fn mapped_palette_and_border() {
        let mut h = Harness::new(CLOCK);
        let mut lem = Lem1802::new();
        assert_eq!(lem.border_color(&h.memory), Rgb::BLACK);

        h.interrupt(&mut lem, &[(A, 3), (B, 0x1F)]);
        assert_eq!(lem.border_color(&h.memory), Rgb { r: 0xFF, g: 0xFF, b: 0xFF });

        h.memory.write(0x2000 + 0xF, 0x0123);
        h.interrupt(&mut lem, &[(A, 2), (B, 0x2000)]);
        assert_eq!(lem.border_color(&h.memory), Rgb { r: 0x11, g: 0x22, b: 0x33 });
    }

    #[test]
    fn dumps_report_extra_cycles() {
        let mut h = Harness::new(CLOCK);
        let mut lem = Lem1802::new();
        assert_eq!(h.interrupt(&mut lem, &[(A, 4), (B, 0x1000)]), 256);
        assert_eq!(h.interrupt(&mut lem, &[(A, 5), (B, 0x2000)]), 16);
        assert_eq!(h.memory.read(0x1000), DEFAULT_FONT[0]);
        assert_eq!(h.memory.read(0x10FF), DEFAULT_FONT[255]);
        assert_eq!(h.memory.read(0x2009), DEFAULT_PALETTE[9]);
    }

    #[test]
    fn frame_rgba_layout() {
        let frame = Frame::blank();
        let rgba = frame.to_rgba();
        assert_eq!(rgba.len(), WIDTH * HEIGHT * 4);
        assert_eq!(&rgba[..4], &[0, 0, 0, 0xFF]);
    }
}
