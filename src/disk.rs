/*!
Disk subsystem: block storage consumed by the M35FD floppy controller.

Geometry is fixed: 1440 sectors of 512 words (a 3.5" double-density
floppy as the M35FD sees it). Every implementation rejects sector indices
past the end with `DiskError::SectorOutOfRange`.

Implementations:
- `MemDisk`: an in-memory, zero-filled image. Handy for tests and scratch
  media.
- `FileDisk`: an image file on the host. Sector `i` lives at byte offset
  `i * 1024`, each word stored big-endian. The file is created and
  zero-extended to full size on open. When it cannot be opened for
  writing, it is opened read-only and reports itself write-protected.
*/

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::DiskError;

/// Words per sector.
pub const SECTOR_WORDS: usize = 512;

/// Sectors per disk.
pub const SECTOR_COUNT: u16 = 1440;

const SECTOR_BYTES: usize = SECTOR_WORDS * 2;

/// One sector worth of words.
pub type Sector = [u16; SECTOR_WORDS];

/// Sector-addressed storage.
///
/// Semantics:
/// - `read_sector`/`write_sector` fail with `SectorOutOfRange` for `index >= SECTOR_COUNT`.
/// - Write protection is advisory: the floppy controller checks it before writing.
pub trait Disk {
    fn read_sector(&mut self, index: u16) -> Result<Sector, DiskError>;

    fn write_sector(&mut self, index: u16, words: &Sector) -> Result<(), DiskError>;

    fn is_write_protected(&self) -> bool {
        false
    }
}

#[inline]
fn check_range(index: u16) -> Result<usize, DiskError> {
    if index >= SECTOR_COUNT {
        return Err(DiskError::SectorOutOfRange(index));
    }
    Ok(index as usize)
}

// -------------------------------------------------------------------------
// In-memory disk
// -------------------------------------------------------------------------

#[derive(Clone)]
pub struct MemDisk {
    words: Vec<u16>,
    write_protected: bool,
}

impl Default for MemDisk {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemDisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemDisk")
            .field("write_protected", &self.write_protected)
            .finish_non_exhaustive()
    }
}

impl MemDisk {
    /// A blank, writable disk.
    pub fn new() -> Self {
        Self {
            words: vec![0; SECTOR_WORDS * SECTOR_COUNT as usize],
            write_protected: false,
        }
    }

    pub fn set_write_protected(&mut self, on: bool) {
        self.write_protected = on;
    }

    /// Builder-style variant of `set_write_protected`.
    pub fn write_protected(mut self, on: bool) -> Self {
        self.write_protected = on;
        self
    }
}

impl Disk for MemDisk {
    fn read_sector(&mut self, index: u16) -> Result<Sector, DiskError> {
        let start = check_range(index)? * SECTOR_WORDS;
        let mut sector = [0u16; SECTOR_WORDS];
        sector.copy_from_slice(&self.words[start..start + SECTOR_WORDS]);
        Ok(sector)
    }

    fn write_sector(&mut self, index: u16, words: &Sector) -> Result<(), DiskError> {
        let start = check_range(index)? * SECTOR_WORDS;
        self.words[start..start + SECTOR_WORDS].copy_from_slice(words);
        Ok(())
    }

    fn is_write_protected(&self) -> bool {
        self.write_protected
    }
}

// -------------------------------------------------------------------------
// File-backed disk
// -------------------------------------------------------------------------

#[derive(Debug)]
pub struct FileDisk {
    file: File,
    write_protected: bool,
}

impl FileDisk {
    /// Open (or create) the image at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DiskError> {
        let path = path.as_ref();
        let full_len = (SECTOR_BYTES * SECTOR_COUNT as usize) as u64;

        match OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
        {
            Ok(file) => {
                if file.metadata()?.len() < full_len {
                    file.set_len(full_len)?;
                }
                debug!(path = %path.display(), "disk image opened");
                Ok(Self {
                    file,
                    write_protected: false,
                })
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "disk image not writable, opening read-only");
                Self::open_read_only(path)
            }
        }
    }

    /// Open an existing image read-only. The disk reports itself write-protected.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self, DiskError> {
        let file = File::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "disk image opened read-only");
        Ok(Self {
            file,
            write_protected: true,
        })
    }
}

impl Disk for FileDisk {
    fn read_sector(&mut self, index: u16) -> Result<Sector, DiskError> {
        let index = check_range(index)?;
        let mut bytes = [0u8; SECTOR_BYTES];
        self.file
            .seek(SeekFrom::Start((index * SECTOR_BYTES) as u64))?;
        // A short read-only image reads as zeros past its end.
        let mut filled = 0;
        while filled < SECTOR_BYTES {
            match self.file.read(&mut bytes[filled..])? {
                0 => break,
                n => filled += n,
            }
        }

        let mut sector = [0u16; SECTOR_WORDS];
        for (word, pair) in sector.iter_mut().zip(bytes.chunks_exact(2)) {
            *word = u16::from_be_bytes([pair[0], pair[1]]);
        }
        Ok(sector)
    }

    fn write_sector(&mut self, index: u16, words: &Sector) -> Result<(), DiskError> {
        let index = check_range(index)?;
        let mut bytes = [0u8; SECTOR_BYTES];
        for (pair, word) in bytes.chunks_exact_mut(2).zip(words.iter()) {
            pair.copy_from_slice(&word.to_be_bytes());
        }
        self.file
            .seek(SeekFrom::Start((index * SECTOR_BYTES) as u64))?;
        self.file.write_all(&bytes)?;
        self.file.flush()?;
        Ok(())
    }

    fn is_write_protected(&self) -> bool {
        self.write_protected
    }
}
