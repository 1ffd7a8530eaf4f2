//! Mapper 3 (CNROM): fixed PRG like NROM, 8 KiB CHR bank selected by writes to $8000–$FFFF.

use tracing::debug;

use crate::cartridge::mapper::{Mirroring, PRG_RAM_SIZE, banked, mapper::Mapper};

const CHR_BANK: usize = 0x2000;

pub struct Mapper3 {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg_ram: Vec<u8>,
    chr_bank: u8,
    mirroring: Mirroring,
}

impl Mapper3 {
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>, chr_is_ram: bool, mirroring: Mirroring) -> Self {
        Self {
            prg_rom,
            chr,
            chr_is_ram,
            prg_ram: vec![0; PRG_RAM_SIZE],
            chr_bank: 0,
            mirroring,
        }
    }

    fn chr_index(&self, addr: u16) -> usize {
        banked(
            &self.chr,
            self.chr_bank as usize,
            CHR_BANK,
            addr as usize & (CHR_BANK - 1),
        )
    }
}

impl Mapper for Mapper3 {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[(addr - 0x6000) as usize],
            0x8000..=0xFFFF if !self.prg_rom.is_empty() => {
                self.prg_rom[(addr - 0x8000) as usize % self.prg_rom.len()]
            }
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[(addr - 0x6000) as usize] = data,
            0x8000..=0xFFFF => {
                self.chr_bank = data & 0x03;
                debug!(bank = self.chr_bank, "CNROM CHR bank select");
            }
            _ => {}
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        if self.chr.is_empty() {
            return 0;
        }
        self.chr[self.chr_index(addr)]
    }

    fn ppu_write(&mut self, addr: u16, data: u8) {
        if self.chr_is_ram && !self.chr.is_empty() {
            let i = self.chr_index(addr);
            self.chr[i] = data;
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

    #[test]
    fn chr_bank_select() {
        let chr: Vec<u8> = (0..4).flat_map(|b| vec![b as u8 + 10; CHR_BANK]).collect();
        let mut m = Mapper3::new(vec![0; 0x8000], chr, false, Mirroring::Horizontal);
        assert_eq!(m.ppu_read(0x0123), 10);

        m.write(0x8000, 2);
        assert_eq!(m.ppu_read(0x0123), 12);
        assert_eq!(m.ppu_read(0x1FFF), 12);
    }

    #[test]
    fn chr_rom_rejects_pattern_writes() {
        let mut m = Mapper3::new(vec![0; 0x8000], vec![7; CHR_BANK], false, Mirroring::Horizontal);
        m.ppu_write(0x0000, 1);
        assert_eq!(m.ppu_read(0x0000), 7);
    }
}
