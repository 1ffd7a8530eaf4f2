//! NES cartridge loading and mapper support.
//!
//! - **cartridge**: Parses iNES (.nes) images, holds the header and the mapper.
//! - **mapper**: NROM (0), MMC1 (1), UxROM (2), CNROM (3); PRG/CHR bank switching and nametable mirroring.

pub mod cartridge;
pub mod mapper;

pub use cartridge::Cartridge;
pub use mapper::Mirroring;
