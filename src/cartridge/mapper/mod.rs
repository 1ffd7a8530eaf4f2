//! NES mappers for PRG/CHR memory mapping.
//!
//! Mapper0 (NROM), Mapper1 (MMC1), Mapper2 (UxROM), Mapper3 (CNROM), and common types.

use crate::cartridge::mapper::{
    mapper::Mapper, mapper0::Mapper0, mapper1::Mapper1, mapper2::Mapper2, mapper3::Mapper3,
};

/// Nametable mirroring mode for PPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000 = $2400, $2800 = $2C00 (vertical scrolling games).
    Horizontal,
    /// $2000 = $2800, $2400 = $2C00 (horizontal scrolling games).
    Vertical,
    /// All four nametables show the first 1 KiB page.
    SingleScreenLower,
    /// All four nametables show the second 1 KiB page.
    SingleScreenUpper,
    /// Cartridge supplies extra VRAM; every nametable is distinct.
    FourScreen,
}

pub mod mapper;

pub mod mapper0;
pub mod mapper1;
pub mod mapper2;
pub mod mapper3;

/// Size of the $6000–$7FFF work RAM window every mapper here provides.
pub const PRG_RAM_SIZE: usize = 8 * 1024;

/// Build the mapper for an iNES mapper number. `None` means the board is not supported;
/// callers must treat that as fatal rather than fall back to NROM.
pub fn create(
    id: u8,
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,
) -> Option<Box<dyn Mapper>> {
    let mapper: Box<dyn Mapper> = match id {
        0 => Box::new(Mapper0::new(prg_rom, chr, mirroring)),
        1 => Box::new(Mapper1::new(prg_rom, chr, chr_is_ram)),
        2 => Box::new(Mapper2::new(prg_rom, chr, chr_is_ram, mirroring)),
        3 => Box::new(Mapper3::new(prg_rom, chr, chr_is_ram, mirroring)),
        _ => return None,
    };
    Some(mapper)
}

/// Index into a banked buffer, wrapping so a bad bank number never reads out of bounds.
pub(crate) fn banked(buf: &[u8], bank: usize, bank_size: usize, offset: usize) -> usize {
    let banks = (buf.len() / bank_size).max(1);
    ((bank % banks) * bank_size + offset) % buf.len().max(1)
}
