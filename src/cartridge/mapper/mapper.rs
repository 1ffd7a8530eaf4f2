//! Mapper trait: PRG/CHR memory access and mirroring.

use crate::cartridge::mapper::Mirroring;

/// Trait for NES cartridge mappers. CPU and PPU reach cartridge memory only through these calls,
/// so bank switching stays consistent between the two views.
pub trait Mapper {
    /// CPU read in $4020–$FFFF (PRG RAM at $6000–$7FFF, PRG ROM at $8000–$FFFF).
    fn read(&self, addr: u16) -> u8;
    /// CPU write in $4020–$FFFF. Writes into ROM space may hit bank-select registers.
    fn write(&mut self, addr: u16, data: u8);
    /// PPU read of the pattern tables ($0000–$1FFF).
    fn ppu_read(&self, addr: u16) -> u8;
    /// PPU write of the pattern tables (CHR RAM).
    fn ppu_write(&mut self, addr: u16, data: u8);
    /// Current nametable mirroring for the PPU.
    fn mirroring(&self) -> Mirroring;
    /// Whole PRG ROM image, independent of the current bank selection.
    fn prg_rom(&self) -> &[u8];
    /// Whole CHR ROM/RAM image.
    fn chr(&self) -> &[u8];
    /// Level of the cartridge IRQ line.
    fn irq_pending(&self) -> bool {
        false
    }
}
