//! Mapper 2 (UxROM): switchable 16 KiB PRG bank at $8000, last bank fixed at $C000, CHR RAM or ROM.
//!
//! [UxROM](https://www.nesdev.org/wiki/UxROM): any write to $8000–$FFFF selects the bank.

use tracing::debug;

use crate::cartridge::mapper::{Mirroring, PRG_RAM_SIZE, banked, mapper::Mapper};

const PRG_BANK: usize = 0x4000;

pub struct Mapper2 {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg_ram: Vec<u8>,
    bank: u8,
    mirroring: Mirroring,
}

impl Mapper2 {
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>, chr_is_ram: bool, mirroring: Mirroring) -> Self {
        Self {
            prg_rom,
            chr,
            chr_is_ram,
            prg_ram: vec![0; PRG_RAM_SIZE],
            bank: 0,
            mirroring,
        }
    }

    fn last_bank(&self) -> usize {
        (self.prg_rom.len() / PRG_BANK).max(1) - 1
    }
}

impl Mapper for Mapper2 {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[(addr - 0x6000) as usize],
            0x8000..=0xFFFF if !self.prg_rom.is_empty() => {
                let offset = addr as usize & (PRG_BANK - 1);
                let bank = if addr < 0xC000 {
                    self.bank as usize
                } else {
                    self.last_bank()
                };
                self.prg_rom[banked(&self.prg_rom, bank, PRG_BANK, offset)]
            }
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[(addr - 0x6000) as usize] = data,
            0x8000..=0xFFFF => {
                self.bank = data & 0x0F;
                debug!(bank = self.bank, "UxROM PRG bank select");
            }
            _ => {}
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        if self.chr.is_empty() {
            return 0;
        }
        self.chr[addr as usize % self.chr.len()]
    }

    fn ppu_write(&mut self, addr: u16, data: u8) {
        if self.chr_is_ram && !self.chr.is_empty() {
            let len = self.chr.len();
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

    fn numbered_prg(banks: usize) -> Vec<u8> {
        (0..banks).flat_map(|b| vec![b as u8; PRG_BANK]).collect()
    }

    #[test]
    fn switches_low_window_only() {
        let mut m = Mapper2::new(numbered_prg(8), vec![0; 0x2000], true, Mirroring::Vertical);
        assert_eq!(m.read(0x8000), 0);
        assert_eq!(m.read(0xC000), 7);

        m.write(0x8000, 3);
        assert_eq!(m.read(0x8000), 3);
        assert_eq!(m.read(0xBFFF), 3);
        assert_eq!(m.read(0xC000), 7);
    }

    #[test]
    fn out_of_range_bank_wraps() {
        let mut m = Mapper2::new(numbered_prg(4), vec![0; 0x2000], true, Mirroring::Vertical);
        m.write(0xFFFF, 6);
        assert_eq!(m.read(0x8000), 2);
    }

    #[test]
    fn chr_rom_is_read_only() {
        let mut m = Mapper2::new(numbered_prg(2), vec![0x5A; 0x2000], false, Mirroring::Vertical);
        m.ppu_write(0x0010, 0x00);
        assert_eq!(m.ppu_read(0x0010), 0x5A);

        let mut m = Mapper2::new(numbered_prg(2), vec![0; 0x2000], true, Mirroring::Vertical);
        m.ppu_write(0x0010, 0x77);
        assert_eq!(m.ppu_read(0x0010), 0x77);
    }

    #[test]
    fn empty_chr_reads_zero() {
        let m = Mapper2::new(numbered_prg(2), Vec::new(), true, Mirroring::Vertical);
        assert_eq!(m.ppu_read(0x0000), 0);
    }
}
