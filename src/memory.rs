//! Memory device capability shared by RAM, the bus, and test harnesses.

/// Something that answers 8-bit reads and accepts 8-bit writes on a 16-bit address.
///
/// `read` takes `&mut self` because some devices have read side effects
/// (PPUSTATUS clears VBlank, PPUDATA advances the VRAM pointer, $4016 shifts the joypad).
pub trait Memory {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Little-endian 16-bit read of `addr` and `addr + 1`.
    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}
