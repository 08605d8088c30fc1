/*!
RAM module: the flat 64 Ki-word DCPU-16 memory.

Every address is a 16-bit word index, so there is no mirroring or decoding:
all 65536 cells are plain RAM. Block helpers used by devices (display
dumps, floppy transfers, vertex maps) wrap around the end of the address
space instead of stopping at it.
*/

/// Number of addressable words.
pub const MEMORY_WORDS: usize = 0x1_0000;

/// Word-addressed CPU memory.
#[derive(Clone)]
pub struct Memory {
    data: Box<[u16]>,
}

impl Default for Memory {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|w| **w != 0).count();
        f.debug_struct("Memory").field("nonzero_words", &used).finish()
    }
}

impl Memory {
    /// Create a new zero-filled memory.
    pub fn new() -> Self {
        Self {
            data: vec![0u16; MEMORY_WORDS].into_boxed_slice(),
        }
    }

    /// Clear every word to 0.
    #[inline]
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u16 {
        self.data[addr as usize]
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u16) {
        self.data[addr as usize] = value;
    }

    /// Copy `out.len()` words starting at `addr` into `out`, wrapping at 0xFFFF.
    pub fn read_block(&self, addr: u16, out: &mut [u16]) {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.read(addr.wrapping_add(i as u16));
        }
    }

    /// Copy `words` into memory starting at `addr`, wrapping at 0xFFFF.
    pub fn write_block(&mut self, addr: u16, words: &[u16]) {
        for (i, w) in words.iter().enumerate() {
            self.write(addr.wrapping_add(i as u16), *w);
        }
    }

    /// Load a word image at address 0. Words past the end of memory are dropped.
    pub fn load(&mut self, words: &[u16]) {
        let n = words.len().min(MEMORY_WORDS);
        self.data[..n].copy_from_slice(&words[..n]);
    }

    /// Borrow the whole memory as a slice (index = address).
    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.data
    }
}

/// Decode a flat big-endian word image. A trailing odd byte becomes the high byte of a final word.
pub fn words_from_be_bytes(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|c| u16::from_be_bytes([c[0], c.get(1).copied().unwrap_or(0)]))
        .collect()
}
