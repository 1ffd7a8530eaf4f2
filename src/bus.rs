//! Memory bus and address decoding for the NES.
//!
//! Maps the [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map) onto RAM, PPU registers,
//! the OAM DMA port, controllers, and the cartridge. Every address decodes to something; reads
//! from registers nothing drives return the last value seen on the data bus.

use crate::{
    cartridge::Cartridge,
    controller::Controller,
    memory::Memory,
    ppu::PPU,
    ram::Ram,
};

/// Cycles the CPU loses to an OAM DMA transfer, before the odd-cycle alignment penalty.
/// The extra cycle is paid when the write to $4014 finishes on an odd CPU cycle.
pub const OAM_DMA_CYCLES: usize = 513;

/// What the CPU needs from the system besides plain memory access.
pub trait Bus: Memory {
    /// Advance the rest of the system by `cycles` CPU cycles.
    fn tick(&mut self, cycles: usize);
    /// Take a pending NMI request (edge, consumed on read).
    fn poll_nmi(&mut self) -> bool;
    /// Level of the shared IRQ line.
    fn irq_line(&self) -> bool {
        false
    }
    /// Take cycles the CPU must stall for (OAM DMA) since the last call. `pending` is the number of
    /// cycles the current instruction has spent that have not been ticked yet.
    fn take_stall(&mut self, _pending: usize) -> usize {
        0
    }
    /// Read without side effects, if this address allows it. Used for trace output.
    fn peek(&self, _addr: u16) -> Option<u8> {
        None
    }
}

/// Main NES bus: RAM, PPU, cartridge, and both controller ports.
pub struct NesBus {
    pub ram: Ram,
    pub cart: Cartridge,
    pub ppu: PPU,
    pub controllers: [Controller; 2],
    /// Last byte driven on the CPU data bus.
    open_bus: u8,
    /// CPU cycles ticked so far; with the in-flight instruction's cycles, its parity decides the
    /// DMA alignment cycle.
    cycles: u64,
    dma_pending: bool,
}

impl NesBus {
    /// Create a new bus with the given cartridge.
    pub fn new(cart: Cartridge) -> Self {
        Self {
            ram: Ram::new(),
            cart,
            ppu: PPU::new(),
            controllers: [Controller::new(), Controller::new()],
            open_bus: 0,
            cycles: 0,
            dma_pending: false,
        }
    }

    /// True once the PPU has finished a frame; the framebuffer is complete.
    pub fn frame_ready(&self) -> bool {
        self.ppu.frame_ready
    }

    /// Clear frame_ready after presenting (so the next frame can set it again).
    pub fn clear_frame_ready(&mut self) {
        self.ppu.frame_ready = false;
    }

    pub fn framebuffer(&self) -> &[u32] {
        &self.ppu.framebuffer
    }

    pub fn controller(&mut self, port: usize) -> &mut Controller {
        &mut self.controllers[port & 1]
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// $4014: copy page `page` ($XX00–$XXFF) into OAM starting at OAMADDR.
    fn oam_dma(&mut self, page: u8) {
        if page < 0x20 {
            for &data in self.ram.page(page) {
                self.ppu.write_oam_data(data);
            }
        } else {
            let base = (page as u16) << 8;
            for i in 0..256 {
                let data = self.read(base | i);
                self.ppu.write_oam_data(data);
            }
        }
        self.dma_pending = true;
    }

    fn read_ppu_register(&mut self, addr: u16) -> u8 {
        match addr & 0x0007 {
            2 => self.ppu.read_status(),
            4 => self.ppu.read_oam_data(),
            7 => self.ppu.read_data(&mut self.cart),
            _ => self.ppu.latch(),
        }
    }

    fn write_ppu_register(&mut self, addr: u16, data: u8) {
        match addr & 0x0007 {
            0 => self.ppu.write_ctrl(data),
            1 => self.ppu.write_mask(data),
            3 => self.ppu.write_oam_addr(data),
            4 => self.ppu.write_oam_data(data),
            5 => self.ppu.write_scroll(data),
            6 => self.ppu.write_addr(data),
            7 => self.ppu.write_data(&mut self.cart, data),
            _ => self.ppu.write_status(data),
        }
    }
}

impl Memory for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        let data = match addr {
            // Internal RAM (mirrored 4x in 0x0000-0x1FFF)
            0x0000..=0x1FFF => self.ram.read(addr),
            // PPU registers $2000-$3FFF (mirrored every 8 bytes)
            0x2000..=0x3FFF => self.read_ppu_register(addr),
            // Controllers drive only bit 0; the rest is open bus.
            0x4016 => (self.open_bus & 0xE0) | self.controllers[0].read(),
            0x4017 => (self.open_bus & 0xE0) | self.controllers[1].read(),
            // APU and test registers: not emulated
            0x4000..=0x401F => self.open_bus,
            // Cartridge: expansion, PRG RAM, PRG ROM
            0x4020..=0xFFFF => self.cart.read(addr),
        };
        self.open_bus = data;
        data
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.open_bus = data;
        match addr {
            0x0000..=0x1FFF => self.ram.write(addr, data),
            0x2000..=0x3FFF => self.write_ppu_register(addr, data),
            0x4014 => self.oam_dma(data),
            // Strobe line is shared by both ports.
            0x4016 => {
                self.controllers[0].write(data);
                self.controllers[1].write(data);
            }
            0x4000..=0x401F => {}
            // Cartridge: PRG RAM and mapper registers (e.g. MMC1)
            0x4020..=0xFFFF => self.cart.write(addr, data),
        }
    }
}

impl Bus for NesBus {
    fn tick(&mut self, cycles: usize) {
        // 3 PPU dots per CPU cycle (NTSC)
        for _ in 0..cycles * 3 {
            self.ppu.step(&mut self.cart);
        }
        self.cycles += cycles as u64;
    }

    fn poll_nmi(&mut self) -> bool {
        self.ppu.poll_nmi()
    }

    fn irq_line(&self) -> bool {
        self.cart.irq_pending()
    }

    fn take_stall(&mut self, pending: usize) -> usize {
        if !std::mem::take(&mut self.dma_pending) {
            return 0;
        }
        let odd = (self.cycles + pending as u64) % 2 == 1;
        OAM_DMA_CYCLES + odd as usize
    }

    fn peek(&self, addr: u16) -> Option<u8> {
        match addr {
            0x0000..=0x1FFF => Some(self.ram.peek(addr)),
            0x4020..=0xFFFF => Some(self.cart.read(addr)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::mapper::{Mirroring, mapper0::Mapper0};
    use crate::controller::Button;
    use crate::ppu::registers::{CTRL_INCREMENT_32, STATUS_VBLANK};

    fn bus() -> NesBus {
        let mut prg = vec![0; 0x4000];
        prg[0] = 0x5A;
        let cart = Cartridge::from_mapper(Box::new(Mapper0::new(
            prg,
            vec![0; 0x2000],
            Mirroring::Vertical,
        )));
        NesBus::new(cart)
    }

    #[test]
    fn ram_is_mirrored_every_2k() {
        let mut bus = bus();
        bus.write(0x0000, 0x42);
        for addr in [0x0800, 0x1000, 0x1800] {
            assert_eq!(bus.read(addr), 0x42);
        }
        bus.write(0x1FFF, 0x24);
        assert_eq!(bus.read(0x07FF), 0x24);
    }

    #[test]
    fn ppu_registers_repeat_every_8_bytes() {
        let mut a = bus();
        let mut b = bus();
        a.write(0x2000, 0x83);
        b.write(0x2008, 0x83);
        assert_eq!(a.ppu.ctrl, b.ppu.ctrl);
        assert_eq!(a.ppu.t, b.ppu.t);

        b.write(0x3FFE, 0x3F);
        b.write(0x3FFE, 0x00);
        assert_eq!(b.ppu.v, 0x3F00);
    }

    #[test]
    fn status_read_has_side_effects() {
        let mut bus = bus();
        bus.ppu.vblank = true;
        bus.write(0x2006, 0x21);
        assert_ne!(bus.read(0x2002) & STATUS_VBLANK, 0);
        assert_eq!(bus.read(0x2002) & STATUS_VBLANK, 0);
        assert!(!bus.ppu.w);
    }

    #[test]
    fn data_port_increment_follows_ctrl() {
        let mut bus = bus();
        bus.write(0x2006, 0x20);
        bus.write(0x2006, 0x00);
        bus.write(0x2007, 0x01);
        assert_eq!(bus.ppu.v, 0x2001);
        bus.write(0x2000, CTRL_INCREMENT_32);
        bus.read(0x2007);
        assert_eq!(bus.ppu.v, 0x2021);
    }

    #[test]
    fn apu_range_reads_open_bus_and_ignores_writes() {
        let mut bus = bus();
        assert_eq!(bus.read(0x8000), 0x5A);
        assert_eq!(bus.read(0x4000), 0x5A);
        bus.write(0x4015, 0x0F);
        assert_eq!(bus.read(0x4015), 0x0F);
        assert_eq!(bus.read(0x401F), 0x0F);
    }

    #[test]
    fn mapper_region_passes_through() {
        let mut bus = bus();
        assert_eq!(bus.read(0x8000), 0x5A);
        assert_eq!(bus.read(0xC000), 0x5A);
        bus.write(0x6000, 0x77);
        assert_eq!(bus.read(0x6000), 0x77);
    }

    #[test]
    fn controllers_shift_through_4016_and_4017() {
        let mut bus = bus();
        bus.controller(0).set_button_pressed(Button::A, true);
        bus.controller(1).set_button_pressed(Button::B, true);
        bus.write(0x4016, 1);
        bus.write(0x4016, 0);

        assert_eq!(bus.read(0x4016) & 1, 1);
        assert_eq!(bus.read(0x4016) & 1, 0);
        assert_eq!(bus.read(0x4017) & 1, 0);
        assert_eq!(bus.read(0x4017) & 1, 1);
    }

    #[test]
    fn oam_dma_copies_page_and_stalls() {
        let mut bus = bus();
        for i in 0..256u16 {
            bus.write(0x0200 + i, i as u8);
        }
        bus.write(0x2003, 0x00);
        bus.write(0x4014, 0x02);
        assert_eq!(bus.ppu.oam[0], 0);
        assert_eq!(bus.ppu.oam[255], 255);
        assert_eq!(bus.take_stall(4), OAM_DMA_CYCLES);
        assert_eq!(bus.take_stall(4), 0);
    }

    #[test]
    fn oam_dma_alignment_follows_write_cycle() {
        let mut bus = bus();
        bus.write(0x4014, 0x02);
        assert_eq!(bus.take_stall(5), OAM_DMA_CYCLES + 1);

        bus.tick(1);
        bus.write(0x4014, 0x02);
        assert_eq!(bus.take_stall(4), OAM_DMA_CYCLES + 1);

        bus.write(0x4014, 0x02);
        assert_eq!(bus.take_stall(5), OAM_DMA_CYCLES);
    }

    #[test]
    fn peek_has_no_side_effects() {
        let mut bus = bus();
        bus.write(0x4015, 0x0F);
        bus.write(0x0010, 0x33);
        bus.ppu.vblank = true;

        assert_eq!(bus.peek(0x0810), Some(0x33));
        assert_eq!(bus.peek(0x8000), Some(0x5A));
        assert_eq!(bus.peek(0x2002), None);
        assert_eq!(bus.peek(0x4016), None);

        assert!(bus.ppu.vblank);
        assert_eq!(bus.read(0x4015), 0x33);
    }

    #[test]
    fn tick_runs_three_dots_per_cycle() {
        let mut bus = bus();
        bus.tick(10);
        assert_eq!((bus.ppu.scanline, bus.ppu.cycle), (0, 30));
        assert_eq!(bus.cycles(), 10);
    }
}
