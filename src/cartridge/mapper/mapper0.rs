//! Mapper 0 (NROM): no bank switching, 16/32KB PRG, 8KB CHR.

use crate::cartridge::mapper::{Mirroring, PRG_RAM_SIZE, mapper::Mapper};

/// NROM mapper: fixed PRG and CHR, 16KB PRG mirrored into $C000.
pub struct Mapper0 {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    prg_ram: Vec<u8>,
    mirroring: Mirroring,
}

impl Mapper0 {
    /// Create Mapper0 with given PRG and CHR data and the solder-pad mirroring from the header.
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>, mirroring: Mirroring) -> Self {
        Self {
            prg_rom,
            chr,
            prg_ram: vec![0; PRG_RAM_SIZE],
            mirroring,
        }
    }
}

impl Mapper for Mapper0 {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[(addr - 0x6000) as usize],
            // PRG ROM: $8000-$FFFF, wraps so a 16KB image appears twice
            0x8000..=0xFFFF => {
                if self.prg_rom.is_empty() {
                    return 0;
                }
                self.prg_rom[(addr - 0x8000) as usize % self.prg_rom.len()]
            }
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        if let 0x6000..=0x7FFF = addr {
            self.prg_ram[(addr - 0x6000) as usize] = data;
        }
        // PRG ROM: no writes
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        if self.chr.is_empty() {
            return 0;
        }
        self.chr[addr as usize % self.chr.len()]
    }

    fn ppu_write(&mut self, addr: u16, data: u8) {
        // Pattern memory is plain storage here; boards with CHR RAM rely on this.
        let len = self.chr.len();
        if len > 0 {
            self.chr[addr as usize % len] = data;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn prg_rom(&self) -> &[u8] {
        &self.prg_rom
    }

    fn chr(&self) -> &[u8] {
        &self.chr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prg_with_marks(len: usize) -> Vec<u8> {
        let mut prg = vec![0; len];
        prg[0] = 0x11;
        prg[len - 1] = 0x22;
        prg
    }

    #[test]
    fn nrom_128_mirrors_bank_into_c000() {
        let m = Mapper0::new(prg_with_marks(0x4000), vec![0; 0x2000], Mirroring::Horizontal);
        assert_eq!(m.read(0x8000), 0x11);
        assert_eq!(m.read(0xC000), 0x11);
        assert_eq!(m.read(0xBFFF), 0x22);
        assert_eq!(m.read(0xFFFF), 0x22);
    }

    #[test]
    fn nrom_256_maps_linearly() {
        let m = Mapper0::new(prg_with_marks(0x8000), vec![0; 0x2000], Mirroring::Horizontal);
        assert_eq!(m.read(0x8000), 0x11);
        assert_eq!(m.read(0xC000), 0x00);
        assert_eq!(m.read(0xFFFF), 0x22);
    }

    #[test]
    fn rom_writes_are_ignored() {
        let mut m = Mapper0::new(prg_with_marks(0x4000), vec![0; 0x2000], Mirroring::Horizontal);
        m.write(0x8000, 0x99);
        assert_eq!(m.read(0x8000), 0x11);
    }

    #[test]
    fn prg_ram_and_chr_are_writable() {
        let mut m = Mapper0::new(prg_with_marks(0x4000), vec![0; 0x2000], Mirroring::Vertical);
        m.write(0x6123, 0xAB);
        assert_eq!(m.read(0x6123), 0xAB);

        m.ppu_write(0x1FF0, 0xCD);
        assert_eq!(m.ppu_read(0x1FF0), 0xCD);
        assert_eq!(m.mirroring(), Mirroring::Vertical);
    }

    #[test]
    fn empty_chr_reads_zero() {
        let mut m = Mapper0::new(prg_with_marks(0x4000), Vec::new(), Mirroring::Vertical);
        m.ppu_write(0x0000, 0x12);
        assert_eq!(m.ppu_read(0x0000), 0);
        assert_eq!(m.ppu_read(0x1FFF), 0);
    }
}
