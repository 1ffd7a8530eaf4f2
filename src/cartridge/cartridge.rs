//! NES cartridge loading from iNES format (.nes files).
//!
//! Implements the [iNES](https://www.nesdev.org/wiki/INES) format: 16-byte header (magic "NES\x1A",
//! PRG size in 16 KiB units, CHR size in 8 KiB units, flags 6–7 for mirroring and mapper number),
//! an optional 512-byte trainer, then PRG ROM, then CHR ROM. A CHR size of zero means the board
//! carries 8 KiB of CHR RAM instead.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::cartridge::mapper::{self, Mirroring, mapper::Mapper};
use crate::error::CartridgeError;

pub const HEADER_SIZE: usize = 16;
pub const TRAINER_SIZE: usize = 512;
pub const PRG_UNIT: usize = 16 * 1024;
pub const CHR_UNIT: usize = 8 * 1024;

const MAGIC: [u8; 4] = *b"NES\x1A";

/// Decoded iNES header fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub prg_banks: u8,
    pub chr_banks: u8,
    pub flags6: u8,
    pub flags7: u8,
    pub prg_ram_banks: u8,
}

impl Header {
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_SIZE {
            return Err(CartridgeError::Truncated {
                section: "header",
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }
        let magic = [data[0], data[1], data[2], data[3]];
        if magic != MAGIC {
            return Err(CartridgeError::BadMagic(magic));
        }
        Ok(Self {
            prg_banks: data[4],
            chr_banks: data[5],
            flags6: data[6],
            flags7: data[7],
            prg_ram_banks: data[8],
        })
    }

    /// Mapper number: low nibble from flags 6, high nibble from flags 7.
    pub fn mapper_id(&self) -> u8 {
        (self.flags6 >> 4) | (self.flags7 & 0xF0)
    }

    /// Flags 6 bit 3 overrides bit 0 (four-screen VRAM on the board).
    pub fn mirroring(&self) -> Mirroring {
        if self.flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if self.flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }

    pub fn has_battery(&self) -> bool {
        self.flags6 & 0x02 != 0
    }

    pub fn has_trainer(&self) -> bool {
        self.flags6 & 0x04 != 0
    }

    pub fn prg_rom_size(&self) -> usize {
        self.prg_banks as usize * PRG_UNIT
    }

    pub fn chr_rom_size(&self) -> usize {
        self.chr_banks as usize * CHR_UNIT
    }
}

/// Cartridge: the mapper that owns PRG/CHR plus the header it was built from.
/// CPU reads PRG via the bus at $4020–$FFFF; the PPU reads CHR at $0000–$1FFF (pattern tables).
pub struct Cartridge {
    pub mapper: Box<dyn Mapper>,
    pub header: Header,
}

impl Cartridge {
    /// Read and parse an iNES file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartridgeError> {
        let data = fs::read(path.as_ref())?;
        let cart = Self::from_bytes(&data)?;
        info!(path = %path.as_ref().display(), "cartridge loaded");
        Ok(cart)
    }

    /// Parse an in-memory iNES image. Nothing is constructed until every section is present.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        let header = Header::parse(data)?;
        if header.prg_banks == 0 {
            return Err(CartridgeError::NoProgramRom);
        }

        let mut offset = HEADER_SIZE;
        if header.has_trainer() {
            let available = data.len().saturating_sub(offset);
            if available < TRAINER_SIZE {
                return Err(CartridgeError::Truncated {
                    section: "trainer",
                    expected: TRAINER_SIZE,
                    actual: available,
                });
            }
            offset += TRAINER_SIZE;
        }

        let prg_rom = take(data, offset, header.prg_rom_size(), "PRG ROM")?;
        offset += prg_rom.len();

        let chr_is_ram = header.chr_banks == 0;
        let chr = if chr_is_ram {
            vec![0; CHR_UNIT]
        } else {
            take(data, offset, header.chr_rom_size(), "CHR ROM")?
        };

        let id = header.mapper_id();
        let mirroring = header.mirroring();
        info!(
            mapper = id,
            prg_kib = prg_rom.len() / 1024,
            chr_kib = chr.len() / 1024,
            chr_ram = chr_is_ram,
            ?mirroring,
            trainer = header.has_trainer(),
            battery = header.has_battery(),
            "iNES header"
        );

        let mapper = mapper::create(id, prg_rom, chr, chr_is_ram, mirroring)
            .ok_or(CartridgeError::UnsupportedMapper(id))?;
        Ok(Self { mapper, header })
    }

    /// Wrap an already-built mapper, e.g. for tests that bypass the container format.
    pub fn from_mapper(mapper: Box<dyn Mapper>) -> Self {
        Self {
            mapper,
            header: Header {
                prg_banks: 0,
                chr_banks: 0,
                flags6: 0,
                flags7: 0,
                prg_ram_banks: 0,
            },
        }
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.mapper.read(addr)
    }

    /// Write: PRG RAM or mapper registers (e.g. MMC1 shift register). PRG ROM is R/O.
    pub fn write(&mut self, addr: u16, data: u8) {
        self.mapper.write(addr, data);
    }

    pub fn ppu_read(&self, addr: u16) -> u8 {
        self.mapper.ppu_read(addr)
    }

    pub fn ppu_write(&mut self, addr: u16, data: u8) {
        self.mapper.ppu_write(addr, data);
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }

    pub fn irq_pending(&self) -> bool {
        self.mapper.irq_pending()
    }

    pub fn mapper_id(&self) -> u8 {
        self.header.mapper_id()
    }
}

fn take(data: &[u8], offset: usize, len: usize, section: &'static str) -> Result<Vec<u8>, CartridgeError> {
    let available = data.len().saturating_sub(offset);
    if available < len {
        return Err(CartridgeError::Truncated {
            section,
            expected: len,
            actual: available,
        });
    }
    Ok(data[offset..offset + len].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(prg: u8, chr: u8, flags6: u8, flags7: u8) -> Vec<u8> {
        let mut data = vec![b'N', b'E', b'S', 0x1A, prg, chr, flags6, flags7];
        data.resize(HEADER_SIZE, 0);
        if flags6 & 0x04 != 0 {
            data.extend(std::iter::repeat_n(0xEE, TRAINER_SIZE));
        }
        for bank in 0..prg {
            data.extend(std::iter::repeat_n(0x10 + bank, PRG_UNIT));
        }
        for bank in 0..chr {
            data.extend(std::iter::repeat_n(0x80 + bank, CHR_UNIT));
        }
        data
    }

    #[test]
    fn nrom_vertical_round_trip() {
        let cart = Cartridge::from_bytes(&image(1, 1, 0x01, 0)).unwrap();
        assert_eq!(cart.mapper_id(), 0);
        assert_eq!(cart.mirroring(), Mirroring::Vertical);
        assert_eq!(cart.mapper.prg_rom().len(), 16384);
        assert_eq!(cart.mapper.chr().len(), 8192);
    }

    #[test]
    fn mapper_number_spans_both_flag_bytes() {
        let header = Header::parse(&image(1, 1, 0x10, 0x20)).unwrap();
        assert_eq!(header.mapper_id(), 0x21);
    }

    #[test]
    fn four_screen_overrides_vertical_bit() {
        let header = Header::parse(&image(1, 1, 0x09, 0)).unwrap();
        assert_eq!(header.mirroring(), Mirroring::FourScreen);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = image(1, 1, 0, 0);
        data[3] = 0x00;
        assert!(matches!(
            Cartridge::from_bytes(&data),
            Err(CartridgeError::BadMagic(_))
        ));
    }

    #[test]
    fn rejects_truncated_prg() {
        let mut data = image(2, 0, 0, 0);
        data.truncate(HEADER_SIZE + PRG_UNIT + 100);
        match Cartridge::from_bytes(&data) {
            Err(CartridgeError::Truncated {
                section,
                expected,
                actual,
            }) => {
                assert_eq!(section, "PRG ROM");
                assert_eq!(expected, 2 * PRG_UNIT);
                assert_eq!(actual, PRG_UNIT + 100);
            }
            other => panic!("unexpected {:?}", other.err()),
        }
    }

    #[test]
    fn rejects_short_header() {
        assert!(matches!(
            Cartridge::from_bytes(b"NES\x1A"),
            Err(CartridgeError::Truncated { section: "header", .. })
        ));
    }

    #[test]
    fn unsupported_mapper_is_an_error() {
        assert!(matches!(
            Cartridge::from_bytes(&image(1, 1, 0x40, 0)),
            Err(CartridgeError::UnsupportedMapper(4))
        ));
    }

    #[test]
    fn trainer_is_skipped() {
        let cart = Cartridge::from_bytes(&image(1, 1, 0x04, 0)).unwrap();
        assert_eq!(cart.read(0x8000), 0x10);
        assert_eq!(cart.ppu_read(0x0000), 0x80);
    }

    #[test]
    fn zero_chr_banks_means_chr_ram() {
        let mut cart = Cartridge::from_bytes(&image(1, 0, 0, 0)).unwrap();
        assert_eq!(cart.mapper.chr().len(), CHR_UNIT);
        cart.ppu_write(0x0010, 0x5A);
        assert_eq!(cart.ppu_read(0x0010), 0x5A);
    }
}
