//! Mapper 1 (MMC1): bank switching via 5-bit shift register.
//!
//! [MMC1](https://www.nesdev.org/wiki/MMC1): writes to $8000–$9FFF (control), $A000–$BFFF (CHR0),
//! $C000–$DFFF (CHR1), $E000–$FFFF (PRG bank). Any write with bit 7 set resets the shift register.
//! Otherwise, bit 0 is shifted in (LSB first); after 5 writes, the value is latched to the register
//! selected by address bits 13–14. Control bits 0–1 = mirroring; bits 2–3 = PRG mode; bit 4 = CHR mode.

use tracing::debug;

use crate::cartridge::mapper::{Mirroring, PRG_RAM_SIZE, banked, mapper::Mapper};

const PRG_BANK: usize = 0x4000;
const CHR_BANK: usize = 0x1000;

/// MMC1 state: shift register, control byte (mirroring + PRG/CHR mode), bank selects.
pub struct Mapper1 {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg_ram: Vec<u8>,
    shift_reg: u8,
    shift_count: u8,
    control: u8,
    chr_bank0: u8,
    chr_bank1: u8,
    prg_bank: u8,
}

impl Mapper1 {
    /// Control powers up as $0C (PRG mode 3: $8000 switchable, $C000 fixed to the last bank).
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>, chr_is_ram: bool) -> Self {
        Self {
            prg_rom,
            chr,
            chr_is_ram,
            prg_ram: vec![0; PRG_RAM_SIZE],
            shift_reg: 0,
            shift_count: 0,
            control: 0x0C,
            chr_bank0: 0,
            chr_bank1: 0,
            prg_bank: 0,
        }
    }

    /// PRG bank mode from control bits 2–3: 0/1 = 32 KiB; 2 = $8000 fixed first; 3 = $C000 fixed last.
    fn prg_bank_mode(&self) -> u8 {
        (self.control >> 2) & 0b11
    }

    fn prg_bank_count(&self) -> usize {
        (self.prg_rom.len() / PRG_BANK).max(1)
    }

    fn prg_ram_enabled(&self) -> bool {
        self.prg_bank & 0x10 == 0
    }

    fn prg_index(&self, addr: u16) -> usize {
        let offset = (addr as usize - 0x8000) & (PRG_BANK - 1);
        let upper = addr >= 0xC000;
        let select = (self.prg_bank & 0x0F) as usize;

        let bank = match self.prg_bank_mode() {
            0 | 1 => (select & !1) + upper as usize,
            2 => {
                if upper {
                    select
                } else {
                    0
                }
            }
            _ => {
                if upper {
                    self.prg_bank_count() - 1
                } else {
                    select
                }
            }
        };
        banked(&self.prg_rom, bank, PRG_BANK, offset)
    }

    fn chr_index(&self, addr: u16) -> usize {
        let addr = addr as usize & 0x1FFF;
        let offset = addr & (CHR_BANK - 1);
        let upper = addr >= CHR_BANK;

        let bank = if self.control & 0x10 == 0 {
            // 8 KiB mode: low bit of CHR0 ignored.
            (self.chr_bank0 as usize & !1) + upper as usize
        } else if upper {
            self.chr_bank1 as usize
        } else {
            self.chr_bank0 as usize
        };
        banked(&self.chr, bank, CHR_BANK, offset)
    }

    fn load_register(&mut self, addr: u16, value: u8) {
        match addr {
            0x8000..=0x9FFF => self.control = value,
            0xA000..=0xBFFF => self.chr_bank0 = value,
            0xC000..=0xDFFF => self.chr_bank1 = value,
            _ => self.prg_bank = value,
        }
        debug!(
            control = self.control,
            chr0 = self.chr_bank0,
            chr1 = self.chr_bank1,
            prg = self.prg_bank,
            "MMC1 register load"
        );
    }
}

impl Mapper for Mapper1 {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF if self.prg_ram_enabled() => self.prg_ram[(addr - 0x6000) as usize],
            0x8000..=0xFFFF if !self.prg_rom.is_empty() => self.prg_rom[self.prg_index(addr)],
            _ => 0,
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x6000..=0x7FFF => {
                if self.prg_ram_enabled() {
                    self.prg_ram[(addr - 0x6000) as usize] = data;
                }
            }
            0x8000..=0xFFFF => {
                if data & 0x80 != 0 {
                    self.shift_reg = 0;
                    self.shift_count = 0;
                    self.control |= 0x0C;
                    return;
                }

                self.shift_reg = (self.shift_reg >> 1) | ((data & 1) << 4);
                self.shift_count += 1;

                if self.shift_count == 5 {
                    let value = self.shift_reg & 0x1F;
                    self.load_register(addr, value);
                    self.shift_reg = 0;
                    self.shift_count = 0;
                }
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
        if !self.chr_is_ram || self.chr.is_empty() {
            return;
        }
        let i = self.chr_index(addr);
        self.chr[i] = data;
    }

    /// Mirroring from control bits 0–1: 0 = one-screen lower, 1 = one-screen upper, 2 = vertical, 3 = horizontal.
    fn mirroring(&self) -> Mirroring {
        match self.control & 0b11 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
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

    /// Serially load a 5-bit value the way games do: five writes, LSB first.
    fn load(m: &mut Mapper1, addr: u16, value: u8) {
        for i in 0..5 {
            m.write(addr, (value >> i) & 1);
        }
    }

    fn numbered_prg(banks: usize) -> Vec<u8> {
        (0..banks).flat_map(|b| vec![b as u8; PRG_BANK]).collect()
    }

    #[test]
    fn power_on_fixes_last_bank_at_c000() {
        let m = Mapper1::new(numbered_prg(8), vec![0; 0x2000], true);
        assert_eq!(m.read(0x8000), 0);
        assert_eq!(m.read(0xC000), 7);
    }

    #[test]
    fn prg_bank_switch_in_mode_3() {
        let mut m = Mapper1::new(numbered_prg(8), vec![0; 0x2000], true);
        load(&mut m, 0xE000, 5);
        assert_eq!(m.read(0x8000), 5);
        assert_eq!(m.read(0xFFFF), 7);
    }

    #[test]
    fn mode_2_fixes_first_bank() {
        let mut m = Mapper1::new(numbered_prg(8), vec![0; 0x2000], true);
        load(&mut m, 0x8000, 0b01000);
        load(&mut m, 0xE000, 3);
        assert_eq!(m.read(0x8000), 0);
        assert_eq!(m.read(0xC000), 3);
    }

    #[test]
    fn thirty_two_k_mode_ignores_low_bit() {
        let mut m = Mapper1::new(numbered_prg(8), vec![0; 0x2000], true);
        load(&mut m, 0x8000, 0b00000);
        load(&mut m, 0xE000, 5);
        assert_eq!(m.read(0x8000), 4);
        assert_eq!(m.read(0xC000), 5);
    }

    #[test]
    fn reset_bit_discards_partial_shift() {
        let mut m = Mapper1::new(numbered_prg(8), vec![0; 0x2000], true);
        m.write(0xE000, 1);
        m.write(0xE000, 1);
        m.write(0xE000, 0x80);
        load(&mut m, 0xE000, 2);
        assert_eq!(m.read(0x8000), 2);
    }

    #[test]
    fn control_selects_mirroring() {
        let mut m = Mapper1::new(numbered_prg(2), vec![0; 0x2000], true);
        load(&mut m, 0x8000, 0b01110);
        assert_eq!(m.mirroring(), Mirroring::Vertical);
        load(&mut m, 0x8000, 0b01101);
        assert_eq!(m.mirroring(), Mirroring::SingleScreenUpper);
    }

    #[test]
    fn four_k_chr_banks() {
        let chr: Vec<u8> = (0..4).flat_map(|b| vec![b as u8; CHR_BANK]).collect();
        let mut m = Mapper1::new(numbered_prg(2), chr, false);
        load(&mut m, 0x8000, 0b11100);
        load(&mut m, 0xA000, 2);
        load(&mut m, 0xC000, 1);
        assert_eq!(m.ppu_read(0x0000), 2);
        assert_eq!(m.ppu_read(0x1000), 1);
    }

    #[test]
    fn prg_ram_disable_bit() {
        let mut m = Mapper1::new(numbered_prg(2), vec![0; 0x2000], true);
        m.write(0x6000, 0x42);
        assert_eq!(m.read(0x6000), 0x42);
        load(&mut m, 0xE000, 0x10);
        assert_eq!(m.read(0x6000), 0);
    }

    #[test]
    fn chr_writes_need_chr_ram() {
        let mut rom = Mapper1::new(numbered_prg(2), vec![0x5A; 0x2000], false);
        rom.ppu_write(0x0100, 0x00);
        assert_eq!(rom.ppu_read(0x0100), 0x5A);

        let mut ram = Mapper1::new(numbered_prg(2), vec![0; 0x2000], true);
        ram.ppu_write(0x0100, 0x33);
        assert_eq!(ram.ppu_read(0x0100), 0x33);
    }
}
