/*!
Mackapar 3.5" Floppy Drive (M35FD).

Overview
========
A sector-addressed drive holding at most one `Disk`. Reads and writes are
asynchronous: the interrupt issues the operation and returns at once, and
the controller stays BUSY for a simulated seek-plus-transfer delay.

- Geometry: 80 tracks of 18 sectors per side (track = sector / 18).
- Seek: 2.4 ms per track crossed, from the last accessed track.
- Transfer: 30700 words per second, so one 512-word sector per operation.

The storage layer is touched when the operation is issued. A read lands in
an internal buffer and is copied to CPU memory on completion; a write has
already reached the disk by the time the delay starts.

State (derived, never stored)
=============================
BUSY while an operation is in flight, else NO_MEDIA without a disk, else
READY_WP for a write-protected disk, else READY.

Interrupts (A register)
=======================
- 0: poll. B <- state, C <- last error; the error is cleared.
- 1: X != 0 sets the interrupt message to X; X = 0 disables interrupts.
- 2: read sector X to memory at Y. B <- 1 when issued, else 0.
- 3: write sector X from memory at Y. B <- 1 when issued, else 0.

With a message configured, the drive raises it whenever its (state, error)
pair changes.
*/

use std::any::Any;

use tracing::{debug, warn};

use crate::bus::{Device, DeviceContext, DeviceInfo};
use crate::cpu::regs::Register;
use crate::disk::{Disk, SECTOR_WORDS, Sector};
use crate::error::{CpuError, DiskError};

pub const STATE_NO_MEDIA: u16 = 0x0000;
pub const STATE_READY: u16 = 0x0001;
pub const STATE_READY_WP: u16 = 0x0002;
pub const STATE_BUSY: u16 = 0x0003;

pub const ERROR_NONE: u16 = 0x0000;
pub const ERROR_BUSY: u16 = 0x0001;
pub const ERROR_NO_MEDIA: u16 = 0x0002;
pub const ERROR_PROTECTED: u16 = 0x0003;
pub const ERROR_EJECT: u16 = 0x0004;
pub const ERROR_BAD_SECTOR: u16 = 0x0005;
pub const ERROR_BROKEN: u16 = 0xFFFF;

pub const SECTORS_PER_TRACK: u16 = 18;
pub const TRACKS: u16 = 80;

// 2.4 ms per track, as a fraction of a second.
const SEEK_PER_TRACK_NUM: u64 = 24;
const SEEK_PER_TRACK_DEN: u64 = 10_000;
const WORDS_PER_SECOND: u64 = 30_700;

/// Cycles an operation on `to_track` takes when the head sits on `from_track`.
pub fn transfer_delay(clock_speed: u32, from_track: u16, to_track: u16) -> u64 {
    let clock = u64::from(clock_speed);
    let tracks = u64::from(from_track.abs_diff(to_track));
    let seek = tracks * clock * SEEK_PER_TRACK_NUM / SEEK_PER_TRACK_DEN;
    let transfer = SECTOR_WORDS as u64 * clock / WORDS_PER_SECOND;
    (seek + transfer).max(1)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Pending {
    /// Destination in CPU memory; `None` for writes.
    read_dest: Option<u16>,
    remaining: u64,
}

pub struct M35fd {
    disk: Option<Box<dyn Disk>>,
    message: u16,
    error: u16,
    op: Option<Pending>,
    buffer: Box<Sector>,
    track: u16,
    // Last (state, error) pair the program has been told about.
    reported: (u16, u16),
}

impl Default for M35fd {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for M35fd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("M35fd")
            .field("has_disk", &self.disk.is_some())
            .field("message", &self.message)
            .field("error", &self.error)
            .field("op", &self.op)
            .field("track", &self.track)
            .finish_non_exhaustive()
    }
}

impl M35fd {
    /// An empty drive.
    pub fn new() -> Self {
        Self {
            disk: None,
            message: 0,
            error: ERROR_NONE,
            op: None,
            buffer: Box::new([0; SECTOR_WORDS]),
            track: 0,
            reported: (STATE_NO_MEDIA, ERROR_NONE),
        }
    }

    /// Drive state code.
    pub fn state(&self) -> u16 {
        match (&self.op, &self.disk) {
            (Some(_), _) => STATE_BUSY,
            (None, None) => STATE_NO_MEDIA,
            (None, Some(d)) if d.is_write_protected() => STATE_READY_WP,
            (None, Some(_)) => STATE_READY,
        }
    }

    /// Last error code (cleared by the poll interrupt).
    pub fn error(&self) -> u16 {
        self.error
    }

    /// Insert a disk, returning the one previously in the drive.
    pub fn insert(&mut self, disk: Box<dyn Disk>) -> Option<Box<dyn Disk>> {
        let old = self.eject();
        self.disk = Some(disk);
        debug!(write_protected = self.state() == STATE_READY_WP, "M35FD disk inserted");
        old
    }

    /// Remove the disk. An operation in flight is aborted with `ERROR_EJECT`.
    pub fn eject(&mut self) -> Option<Box<dyn Disk>> {
        if self.op.take().is_some() {
            self.error = ERROR_EJECT;
            warn!("M35FD disk ejected during an operation");
        }
        self.disk.take()
    }

    pub fn disk(&self) -> Option<&dyn Disk> {
        self.disk.as_deref()
    }

    pub fn disk_mut(&mut self) -> Option<&mut (dyn Disk + 'static)> {
        self.disk.as_deref_mut()
    }

    fn storage_error(&mut self, sector: u16, err: DiskError) {
        self.error = match err {
            DiskError::SectorOutOfRange(_) => ERROR_BAD_SECTOR,
            DiskError::Io(_) => ERROR_BROKEN,
        };
        warn!(sector, %err, "M35FD operation rejected by storage");
    }

    // Common preconditions of read and write. On failure the error is set.
    fn ready(&mut self) -> bool {
        match self.state() {
            STATE_BUSY => self.error = ERROR_BUSY,
            STATE_NO_MEDIA => self.error = ERROR_NO_MEDIA,
            _ => return true,
        }
        false
    }

    fn schedule(&mut self, clock_speed: u32, sector: u16, read_dest: Option<u16>) {
        let to_track = sector / SECTORS_PER_TRACK;
        let remaining = transfer_delay(clock_speed, self.track, to_track);
        self.track = to_track;
        self.op = Some(Pending {
            read_dest,
            remaining,
        });
        debug!(sector, track = to_track, remaining, read = read_dest.is_some(), "M35FD operation issued");
    }

    fn read(&mut self, ctx: &DeviceContext<'_>, sector: u16, dest: u16) -> bool {
        if !self.ready() {
            return false;
        }
        let Some(disk) = self.disk.as_mut() else {
            return false;
        };
        match disk.read_sector(sector) {
            Ok(words) => {
                *self.buffer = words;
                self.schedule(ctx.clock_speed(), sector, Some(dest));
                true
            }
            Err(err) => {
                self.storage_error(sector, err);
                false
            }
        }
    }

    fn write(&mut self, ctx: &DeviceContext<'_>, sector: u16, src: u16) -> bool {
        if !self.ready() {
            return false;
        }
        if self.state() == STATE_READY_WP {
            self.error = ERROR_PROTECTED;
            return false;
        }
        let Some(disk) = self.disk.as_mut() else {
            return false;
        };
        ctx.read_block(src, &mut self.buffer[..]);
        match disk.write_sector(sector, &self.buffer) {
            Ok(()) => {
                self.schedule(ctx.clock_speed(), sector, None);
                true
            }
            Err(err) => {
                self.storage_error(sector, err);
                false
            }
        }
    }

    fn notify(&mut self, ctx: &mut DeviceContext<'_>) -> Result<(), CpuError> {
        let now = (self.state(), self.error);
        if now != self.reported {
            self.reported = now;
            if self.message != 0 {
                ctx.raise(self.message)?;
            }
        }
        Ok(())
    }
}

impl Device for M35fd {
    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            hardware_id: 0x4fd5_24c5,
            version: 0x000b,
            manufacturer: 0x1eb3_7e91,
            name: "Mackapar 3.5\" Floppy Drive (M35FD)",
        }
    }

    fn on_cycle(&mut self, ctx: &mut DeviceContext<'_>) -> Result<(), CpuError> {
        if let Some(op) = self.op.as_mut() {
            op.remaining = op.remaining.saturating_sub(1);
            if op.remaining == 0 {
                if let Some(dest) = op.read_dest {
                    ctx.write_block(dest, &self.buffer[..]);
                }
                self.op = None;
                debug!(track = self.track, "M35FD operation complete");
            }
        }
        self.notify(ctx)
    }

    fn on_interrupt(&mut self, ctx: &mut DeviceContext<'_>) -> Result<u16, CpuError> {
        match ctx.reg(Register::A) {
            0 => {
                ctx.set_reg(Register::B, self.state());
                ctx.set_reg(Register::C, self.error);
                self.error = ERROR_NONE;
                self.reported = (self.state(), self.error);
            }
            1 => {
                self.message = ctx.reg(Register::X);
                self.reported = (self.state(), self.error);
            }
            2 => {
                let (sector, dest) = (ctx.reg(Register::X), ctx.reg(Register::Y));
                let issued = self.read(ctx, sector, dest);
                ctx.set_reg(Register::B, u16::from(issued));
                self.notify(ctx)?;
            }
            3 => {
                let (sector, src) = (ctx.reg(Register::X), ctx.reg(Register::Y));
                let issued = self.write(ctx, sector, src);
                ctx.set_reg(Register::B, u16::from(issued));
                self.notify(ctx)?;
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
