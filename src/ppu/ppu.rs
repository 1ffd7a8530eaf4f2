//! NES PPU (Picture Processing Unit) implementation.
//!
//! Dot-stepped 2C02: 341 dots per scanline, 262 scanlines per frame (0–239 visible, 240 idle,
//! 241–260 vblank, 261 pre-render). Background tiles go through the usual
//! [fetch/shift pipeline](https://www.nesdev.org/wiki/PPU_rendering) driven by the internal
//! `v`/`t`/`x`/`w` [scroll registers](https://www.nesdev.org/wiki/PPU_scrolling); sprites are
//! evaluated at dot 257 of each visible line for the line that follows.

use crate::cartridge::{Cartridge, Mirroring};
use crate::ppu::palette::{NES_PALETTE_RGB, palette_index};
use crate::ppu::registers::*;

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;

/// OAM (Object Attribute Memory): 64 sprites × 4 bytes. Each entry: Y, tile, attr, X.
pub const OAM_LEN: usize = 256;

pub const DOTS_PER_SCANLINE: u16 = 341;
pub const SCANLINES_PER_FRAME: u16 = 262;
pub const VBLANK_SCANLINE: u16 = 241;
pub const PRE_RENDER_SCANLINE: u16 = 261;

const MAX_SPRITES_PER_LINE: usize = 8;

/// PPU state: timing, scroll registers, VRAM, palettes, OAM, and framebuffer.
pub struct PPU {
    pub cycle: u16,
    pub scanline: u16,
    /// Completed frames since power-on.
    pub frame: u64,
    /// NMI request waiting for the CPU.
    pub nmi: bool,
    pub vblank: bool,
    /// Set when scanline 261 wraps to 0; the consumer clears it after presenting.
    pub frame_ready: bool,
    pub ctrl: u8,
    pub mask: u8,
    /// Current VRAM address.
    pub v: u16,
    /// Temporary VRAM address (top-left of the screen between frames).
    pub t: u16,
    pub fine_x: u8,
    /// First/second write toggle shared by $2005 and $2006.
    pub w: bool,
    read_buffer: u8,
    /// Last value driven onto the PPU data bus; write-only registers read back as this.
    latch: u8,
    /// 4 KiB so four-screen boards get distinct nametables; two-screen boards use the first 2 KiB.
    pub nametable: [u8; 0x1000],
    /// Palette RAM $3F00-$3F1F.
    pub palette: [u8; 32],
    pub oam: [u8; OAM_LEN],
    pub oam_addr: u8,
    pub sprite_0_hit: bool,
    pub sprite_overflow: bool,

    next_tile_id: u8,
    next_tile_attr: u8,
    next_tile_lo: u8,
    next_tile_hi: u8,
    bg_shift_pattern_lo: u16,
    bg_shift_pattern_hi: u16,
    bg_shift_attr_lo: u16,
    bg_shift_attr_hi: u16,

    sprite_count: usize,
    sprite_pattern_lo: [u8; MAX_SPRITES_PER_LINE],
    sprite_pattern_hi: [u8; MAX_SPRITES_PER_LINE],
    sprite_attr: [u8; MAX_SPRITES_PER_LINE],
    sprite_x: [u8; MAX_SPRITES_PER_LINE],
    sprite_zero_on_line: bool,

    /// 256×240 framebuffer (0x00RRGGBB per pixel). Row-major, left-to-right, top-to-bottom.
    pub framebuffer: Vec<u32>,
}

impl Default for PPU {
    fn default() -> Self {
        Self::new()
    }
}

impl PPU {
    /// Power-on state: scanline 0, dot 0, rendering disabled.
    pub fn new() -> Self {
        Self {
            cycle: 0,
            scanline: 0,
            frame: 0,
            nmi: false,
            vblank: false,
            frame_ready: false,
            ctrl: 0,
            mask: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            w: false,
            read_buffer: 0,
            latch: 0,
            nametable: [0; 0x1000],
            palette: [0; 32],
            oam: [0; OAM_LEN],
            oam_addr: 0,
            sprite_0_hit: false,
            sprite_overflow: false,
            next_tile_id: 0,
            next_tile_attr: 0,
            next_tile_lo: 0,
            next_tile_hi: 0,
            bg_shift_pattern_lo: 0,
            bg_shift_pattern_hi: 0,
            bg_shift_attr_lo: 0,
            bg_shift_attr_hi: 0,
            sprite_count: 0,
            sprite_pattern_lo: [0; MAX_SPRITES_PER_LINE],
            sprite_pattern_hi: [0; MAX_SPRITES_PER_LINE],
            sprite_attr: [0; MAX_SPRITES_PER_LINE],
            sprite_x: [0; MAX_SPRITES_PER_LINE],
            sprite_zero_on_line: false,
            framebuffer: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    pub fn rendering_enabled(&self) -> bool {
        self.mask & (MASK_SHOW_BG | MASK_SHOW_SPRITES) != 0
    }

    /// Take a pending NMI request.
    pub fn poll_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi)
    }

    /// Advance one dot, then do that dot's work.
    pub fn step(&mut self, cart: &mut Cartridge) {
        self.advance();

        let visible = self.scanline < SCREEN_HEIGHT as u16;
        let pre_render = self.scanline == PRE_RENDER_SCANLINE;

        if self.scanline == VBLANK_SCANLINE && self.cycle == 1 {
            self.vblank = true;
            if self.ctrl & CTRL_NMI_ENABLE != 0 {
                self.nmi = true;
            }
        }
        if pre_render && self.cycle == 1 {
            self.vblank = false;
            self.sprite_0_hit = false;
            self.sprite_overflow = false;
        }

        if (visible || pre_render) && self.rendering_enabled() {
            self.background_dot(cart, pre_render);
            if self.cycle == 257 {
                if visible {
                    self.evaluate_sprites(cart);
                } else {
                    self.sprite_count = 0;
                }
            }
        }

        if visible && (1..=256).contains(&self.cycle) {
            self.render_pixel();
        }
    }

    /// Move the dot/scanline counters. Odd frames drop the last pre-render dot while rendering.
    fn advance(&mut self) {
        if self.scanline == PRE_RENDER_SCANLINE
            && self.cycle == 339
            && self.frame % 2 == 1
            && self.rendering_enabled()
        {
            self.cycle = 0;
            self.scanline = 0;
            self.finish_frame();
            return;
        }

        self.cycle += 1;
        if self.cycle >= DOTS_PER_SCANLINE {
            self.cycle = 0;
            self.scanline += 1;
            if self.scanline >= SCANLINES_PER_FRAME {
                self.scanline = 0;
                self.finish_frame();
            }
        }
    }

    fn finish_frame(&mut self) {
        self.frame_ready = true;
        self.frame += 1;
    }

    fn background_dot(&mut self, cart: &mut Cartridge, pre_render: bool) {
        let cycle = self.cycle;
        if (2..=257).contains(&cycle) || (321..=337).contains(&cycle) {
            self.shift_background();
            match (cycle - 1) % 8 {
                0 => {
                    self.load_background_shifters();
                    self.next_tile_id = self.vram_read(cart, 0x2000 | (self.v & 0x0FFF));
                }
                2 => {
                    let v = self.v;
                    let addr = 0x23C0 | (v & 0x0C00) | ((v >> 4) & 0x38) | ((v >> 2) & 0x07);
                    let mut attr = self.vram_read(cart, addr);
                    if v & 0x40 != 0 {
                        attr >>= 4;
                    }
                    if v & 0x02 != 0 {
                        attr >>= 2;
                    }
                    self.next_tile_attr = attr & 0x03;
                }
                4 => self.next_tile_lo = self.vram_read(cart, self.bg_pattern_addr()),
                6 => self.next_tile_hi = self.vram_read(cart, self.bg_pattern_addr() + 8),
                7 => self.increment_x(),
                _ => {}
            }
        }
        if cycle == 256 {
            self.increment_y();
        }
        if cycle == 257 {
            self.load_background_shifters();
            self.v = (self.v & !(VRAM_NAMETABLE_X | VRAM_COARSE_X))
                | (self.t & (VRAM_NAMETABLE_X | VRAM_COARSE_X));
        }
        if pre_render && (280..=304).contains(&cycle) {
            let mask = VRAM_FINE_Y | VRAM_NAMETABLE_Y | VRAM_COARSE_Y;
            self.v = (self.v & !mask) | (self.t & mask);
        }
    }

    fn bg_pattern_addr(&self) -> u16 {
        let table = if self.ctrl & CTRL_BG_TABLE != 0 { 0x1000 } else { 0 };
        table + self.next_tile_id as u16 * 16 + ((self.v & VRAM_FINE_Y) >> 12)
    }

    fn shift_background(&mut self) {
        if self.mask & MASK_SHOW_BG != 0 {
            self.bg_shift_pattern_lo <<= 1;
            self.bg_shift_pattern_hi <<= 1;
            self.bg_shift_attr_lo <<= 1;
            self.bg_shift_attr_hi <<= 1;
        }
    }

    fn load_background_shifters(&mut self) {
        self.bg_shift_pattern_lo = (self.bg_shift_pattern_lo & 0xFF00) | self.next_tile_lo as u16;
        self.bg_shift_pattern_hi = (self.bg_shift_pattern_hi & 0xFF00) | self.next_tile_hi as u16;
        let attr_lo = if self.next_tile_attr & 1 != 0 { 0xFF } else { 0x00 };
        let attr_hi = if self.next_tile_attr & 2 != 0 { 0xFF } else { 0x00 };
        self.bg_shift_attr_lo = (self.bg_shift_attr_lo & 0xFF00) | attr_lo;
        self.bg_shift_attr_hi = (self.bg_shift_attr_hi & 0xFF00) | attr_hi;
    }

    /// Coarse X increment, wrapping into the horizontally adjacent nametable.
    fn increment_x(&mut self) {
        if self.v & VRAM_COARSE_X == 31 {
            self.v &= !VRAM_COARSE_X;
            self.v ^= VRAM_NAMETABLE_X;
        } else {
            self.v += 1;
        }
    }

    /// Fine Y increment, carrying into coarse Y; row 29 wraps into the vertically adjacent nametable.
    fn increment_y(&mut self) {
        if self.v & VRAM_FINE_Y != VRAM_FINE_Y {
            self.v += 0x1000;
            return;
        }
        self.v &= !VRAM_FINE_Y;
        let mut y = (self.v & VRAM_COARSE_Y) >> 5;
        if y == 29 {
            y = 0;
            self.v ^= VRAM_NAMETABLE_Y;
        } else if y == 31 {
            // Attribute rows: wrap without switching nametables.
            y = 0;
        } else {
            y += 1;
        }
        self.v = (self.v & !VRAM_COARSE_Y) | (y << 5);
    }

    fn sprite_height(&self) -> u16 {
        if self.ctrl & CTRL_SPRITE_16 != 0 { 16 } else { 8 }
    }

    /// Select up to 8 sprites whose rows cover the current scanline; they are drawn on the next one.
    /// A ninth match sets the overflow flag.
    fn evaluate_sprites(&mut self, cart: &Cartridge) {
        let height = self.sprite_height();
        let line = self.scanline;
        self.sprite_count = 0;
        self.sprite_zero_on_line = false;

        for i in 0..64 {
            let entry = &self.oam[i * 4..i * 4 + 4];
            let (y, tile, attr, x) = (entry[0] as u16, entry[1], entry[2], entry[3]);
            if line < y || line - y >= height {
                continue;
            }
            if self.sprite_count == MAX_SPRITES_PER_LINE {
                self.sprite_overflow = true;
                break;
            }

            let mut row = line - y;
            if attr & 0x80 != 0 {
                row = height - 1 - row;
            }
            let addr = if height == 8 {
                let table = if self.ctrl & CTRL_SPRITE_TABLE != 0 { 0x1000 } else { 0 };
                table + tile as u16 * 16 + row
            } else {
                let table = (tile & 1) as u16 * 0x1000;
                table + ((tile & 0xFE) as u16 + row / 8) * 16 + (row & 7)
            };
            let mut lo = cart.ppu_read(addr);
            let mut hi = cart.ppu_read(addr + 8);
            if attr & 0x40 != 0 {
                lo = lo.reverse_bits();
                hi = hi.reverse_bits();
            }

            let slot = self.sprite_count;
            self.sprite_pattern_lo[slot] = lo;
            self.sprite_pattern_hi[slot] = hi;
            self.sprite_attr[slot] = attr;
            self.sprite_x[slot] = x;
            if i == 0 {
                self.sprite_zero_on_line = true;
            }
            self.sprite_count += 1;
        }
    }

    /// Compose background and sprite for dot (cycle - 1, scanline).
    fn render_pixel(&mut self) {
        let x = (self.cycle - 1) as usize;
        let y = self.scanline as usize;

        let mut bg_pixel = 0u8;
        let mut bg_palette = 0u8;
        if self.mask & MASK_SHOW_BG != 0 && (x >= 8 || self.mask & MASK_BG_LEFT != 0) {
            let bit = 0x8000 >> self.fine_x;
            let p0 = (self.bg_shift_pattern_lo & bit != 0) as u8;
            let p1 = (self.bg_shift_pattern_hi & bit != 0) as u8;
            bg_pixel = (p1 << 1) | p0;
            let a0 = (self.bg_shift_attr_lo & bit != 0) as u8;
            let a1 = (self.bg_shift_attr_hi & bit != 0) as u8;
            bg_palette = (a1 << 1) | a0;
        }

        let mut fg_pixel = 0u8;
        let mut fg_palette = 0u8;
        let mut fg_behind = false;
        let mut fg_is_zero = false;
        if self.mask & MASK_SHOW_SPRITES != 0 && (x >= 8 || self.mask & MASK_SPRITE_LEFT != 0) {
            for i in 0..self.sprite_count {
                let sx = self.sprite_x[i] as usize;
                if x < sx || x >= sx + 8 {
                    continue;
                }
                let shift = 7 - (x - sx);
                let p0 = (self.sprite_pattern_lo[i] >> shift) & 1;
                let p1 = (self.sprite_pattern_hi[i] >> shift) & 1;
                let pixel = (p1 << 1) | p0;
                if pixel == 0 {
                    continue;
                }
                fg_pixel = pixel;
                fg_palette = (self.sprite_attr[i] & 0x03) + 4;
                fg_behind = self.sprite_attr[i] & 0x20 != 0;
                fg_is_zero = i == 0 && self.sprite_zero_on_line;
                break;
            }
        }

        let (pixel, palette) = match (bg_pixel, fg_pixel) {
            (0, 0) => (0, 0),
            (0, _) => (fg_pixel, fg_palette),
            (_, 0) => (bg_pixel, bg_palette),
            _ => {
                if fg_is_zero && x != 255 {
                    self.sprite_0_hit = true;
                }
                if fg_behind {
                    (bg_pixel, bg_palette)
                } else {
                    (fg_pixel, fg_palette)
                }
            }
        };

        let addr = if pixel == 0 {
            0x3F00
        } else {
            0x3F00 + palette as u16 * 4 + pixel as u16
        };
        let mut color = self.palette[palette_index(addr)];
        if self.mask & MASK_GREYSCALE != 0 {
            color &= 0x30;
        }
        self.framebuffer[y * SCREEN_WIDTH + x] = NES_PALETTE_RGB[(color & 0x3F) as usize];
    }

    /// PPU address space read ($0000–$3FFF).
    fn vram_read(&self, cart: &Cartridge, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => cart.ppu_read(addr),
            0x2000..=0x3EFF => self.nametable[map_nametable_addr(addr, cart.mirroring())],
            _ => self.palette[palette_index(addr)],
        }
    }

    fn vram_write(&mut self, cart: &mut Cartridge, addr: u16, data: u8) {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => cart.ppu_write(addr, data),
            0x2000..=0x3EFF => self.nametable[map_nametable_addr(addr, cart.mirroring())] = data,
            // Palette entries are 6 bits wide.
            _ => self.palette[palette_index(addr)] = data & 0x3F,
        }
    }

    fn increment_vram_addr(&mut self) {
        let inc = if self.ctrl & CTRL_INCREMENT_32 != 0 { 32 } else { 1 };
        self.v = self.v.wrapping_add(inc) & 0x7FFF;
    }

    /// Value seen when reading a write-only register.
    pub fn latch(&self) -> u8 {
        self.latch
    }

    /// Read PPUSTATUS ($2002); clears vblank and the shared write toggle.
    pub fn read_status(&mut self) -> u8 {
        let mut status = self.latch & 0x1F;
        if self.vblank {
            status |= STATUS_VBLANK;
        }
        if self.sprite_0_hit {
            status |= STATUS_SPRITE_0_HIT;
        }
        if self.sprite_overflow {
            status |= STATUS_SPRITE_OVERFLOW;
        }
        self.vblank = false;
        self.w = false;
        self.latch = status;
        status
    }

    /// PPUSTATUS is read-only; a write only refreshes the latch.
    pub fn write_status(&mut self, data: u8) {
        self.latch = data;
    }

    /// Write PPUCTRL ($2000). Enabling NMI while vblank is already set raises one immediately.
    pub fn write_ctrl(&mut self, data: u8) {
        self.latch = data;
        let was_enabled = self.ctrl & CTRL_NMI_ENABLE != 0;
        self.ctrl = data;
        self.t = (self.t & !(VRAM_NAMETABLE_X | VRAM_NAMETABLE_Y))
            | (((data & CTRL_NAMETABLE) as u16) << 10);
        if !was_enabled && data & CTRL_NMI_ENABLE != 0 && self.vblank {
            self.nmi = true;
        }
    }

    /// Write PPUMASK ($2001). Emphasis bits are stored but not applied.
    pub fn write_mask(&mut self, data: u8) {
        self.latch = data;
        self.mask = data;
    }

    /// Write OAMADDR ($2003).
    pub fn write_oam_addr(&mut self, data: u8) {
        self.latch = data;
        self.oam_addr = data;
    }

    /// Read OAMDATA ($2004). Reads do not increment OAMADDR; attribute bits 2–4 read as 0.
    pub fn read_oam_data(&mut self) -> u8 {
        let mut data = self.oam[self.oam_addr as usize];
        if self.oam_addr & 0x03 == 2 {
            data &= 0xE3;
        }
        self.latch = data;
        data
    }

    /// Write OAMDATA ($2004); writes OAM and increments OAMADDR.
    pub fn write_oam_data(&mut self, data: u8) {
        self.latch = data;
        self.oam[self.oam_addr as usize] = data;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    /// Write PPUSCROLL ($2005): first write = coarse/fine X, second write = coarse/fine Y.
    pub fn write_scroll(&mut self, data: u8) {
        self.latch = data;
        if !self.w {
            self.t = (self.t & !VRAM_COARSE_X) | (data >> 3) as u16;
            self.fine_x = data & 0x07;
        } else {
            self.t = (self.t & !(VRAM_FINE_Y | VRAM_COARSE_Y))
                | (((data & 0x07) as u16) << 12)
                | (((data & 0xF8) as u16) << 2);
        }
        self.w = !self.w;
    }

    /// Write PPUADDR ($2006): high byte (6 bits) then low byte; the second write copies t into v.
    pub fn write_addr(&mut self, data: u8) {
        self.latch = data;
        if !self.w {
            self.t = (self.t & 0x00FF) | (((data & 0x3F) as u16) << 8);
        } else {
            self.t = (self.t & 0xFF00) | data as u16;
            self.v = self.t;
        }
        self.w = !self.w;
    }

    /// Read PPUDATA ($2007). Non-palette reads return the previous buffered byte; palette reads are
    /// immediate and refill the buffer from the nametable underneath.
    pub fn read_data(&mut self, cart: &mut Cartridge) -> u8 {
        let addr = self.v & 0x3FFF;
        let data = if addr >= 0x3F00 {
            self.read_buffer = self.vram_read(cart, addr - 0x1000);
            (self.palette[palette_index(addr)] & 0x3F) | (self.latch & 0xC0)
        } else {
            let buffered = self.read_buffer;
            self.read_buffer = self.vram_read(cart, addr);
            buffered
        };
        self.increment_vram_addr();
        self.latch = data;
        data
    }

    /// Write PPUDATA ($2007), then increment v by 1 or 32.
    pub fn write_data(&mut self, cart: &mut Cartridge, data: u8) {
        self.latch = data;
        self.vram_write(cart, self.v, data);
        self.increment_vram_addr();
    }
}

/// Map a nametable address ($2000–$3EFF) to an index into the 4 KiB nametable array.
pub fn map_nametable_addr(addr: u16, mirroring: Mirroring) -> usize {
    let addr = addr & 0x0FFF;
    let table = addr / 0x400;
    let offset = addr & 0x3FF;
    let page = match mirroring {
        Mirroring::Vertical => table & 1,
        Mirroring::Horizontal => table >> 1,
        Mirroring::SingleScreenLower => 0,
        Mirroring::SingleScreenUpper => 1,
        Mirroring::FourScreen => table,
    };
    (page * 0x400 + offset) as usize
}
