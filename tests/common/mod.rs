//! In-memory iNES images for integration tests.

#![allow(dead_code)]

use hunes::{bus::NesBus, cartridge::Cartridge, cpu::CPU};

pub const PRG_BANK: usize = 0x4000;
pub const CHR_BANK: usize = 0x2000;

pub struct RomBuilder {
    mapper: u8,
    vertical: bool,
    prg: Vec<u8>,
    chr: Vec<u8>,
}

impl RomBuilder {
    /// `prg_banks` × 16 KiB of PRG ROM and `chr_banks` × 8 KiB of CHR ROM (0 means CHR RAM).
    pub fn new(mapper: u8, prg_banks: usize, chr_banks: usize) -> Self {
        Self {
            mapper,
            vertical: false,
            prg: vec![0xEA; prg_banks * PRG_BANK],
            chr: vec![0; chr_banks * CHR_BANK],
        }
    }

    pub fn vertical(mut self) -> Self {
        self.vertical = true;
        self
    }

    /// Copy `bytes` into PRG ROM at `offset`.
    pub fn code(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.prg[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// NMI, RESET and IRQ vectors in the last six bytes of PRG ROM.
    pub fn vectors(self, nmi: u16, reset: u16, irq: u16) -> Self {
        let at = self.prg.len() - 6;
        let mut bytes = [0; 6];
        for (i, v) in [nmi, reset, irq].into_iter().enumerate() {
            bytes[i * 2..i * 2 + 2].copy_from_slice(&v.to_le_bytes());
        }
        self.code(at, &bytes)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut image = vec![
            b'N',
            b'E',
            b'S',
            0x1A,
            (self.prg.len() / PRG_BANK) as u8,
            (self.chr.len() / CHR_BANK) as u8,
            (self.mapper << 4) | self.vertical as u8,
            self.mapper & 0xF0,
        ];
        image.resize(16, 0);
        image.extend_from_slice(&self.prg);
        image.extend_from_slice(&self.chr);
        image
    }

    pub fn cartridge(&self) -> Cartridge {
        Cartridge::from_bytes(&self.build()).unwrap()
    }

    /// Power on a full system with this cartridge, CPU reset done.
    pub fn boot(&self) -> CPU<NesBus> {
        let mut cpu = CPU::new(NesBus::new(self.cartridge()));
        cpu.reset();
        cpu
    }
}

/// NROM-128 with `program` at $8000, an optional NMI handler at $9000, RESET at $8000.
pub fn nrom(program: &[u8], nmi_handler: &[u8]) -> RomBuilder {
    RomBuilder::new(0, 1, 1)
        .code(0x0000, program)
        .code(0x1000, nmi_handler)
        .vectors(0x9000, 0x8000, 0x9000)
}
