//! 2 KiB internal work RAM.
//!
//! [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map): only 11 address lines are wired,
//! so $0000–$07FF repeats at $0800, $1000 and $1800.

use crate::memory::Memory;

pub const RAM_SIZE: usize = 0x800;

pub struct Ram {
    data: [u8; RAM_SIZE],
}

impl Ram {
    pub fn new() -> Self {
        Self {
            data: [0; RAM_SIZE],
        }
    }

    /// Side-effect-free read, same mirroring as `read`.
    pub fn peek(&self, addr: u16) -> u8 {
        self.data[(addr & 0x07FF) as usize]
    }

    /// Read-only view of one 256-byte page, used by OAM DMA.
    pub fn page(&self, page: u8) -> &[u8] {
        let start = ((page as usize) << 8) & (RAM_SIZE - 1);
        &self.data[start..start + 0x100]
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory for Ram {
    fn read(&mut self, addr: u16) -> u8 {
        self.data[(addr & 0x07FF) as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.data[(addr & 0x07FF) as usize] = data;
    }
}
