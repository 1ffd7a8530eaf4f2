//! Bit assignments of the CPU-visible PPU registers.
//!
//! See [PPU registers](https://www.nesdev.org/wiki/PPU_registers).

/// PPUCTRL ($2000): base nametable select (bits 0–1).
pub const CTRL_NAMETABLE: u8 = 0x03;
/// PPUCTRL: VRAM address increment per PPUDATA access (0 = +1 across, 1 = +32 down).
pub const CTRL_INCREMENT_32: u8 = 0x04;
/// PPUCTRL: sprite pattern table for 8×8 sprites (0 = $0000, 1 = $1000).
pub const CTRL_SPRITE_TABLE: u8 = 0x08;
/// PPUCTRL: background pattern table (0 = $0000, 1 = $1000).
pub const CTRL_BG_TABLE: u8 = 0x10;
/// PPUCTRL: sprite size (0 = 8×8, 1 = 8×16).
pub const CTRL_SPRITE_16: u8 = 0x20;
/// PPUCTRL: generate NMI at the start of vblank.
pub const CTRL_NMI_ENABLE: u8 = 0x80;

/// PPUMASK ($2001): greyscale.
pub const MASK_GREYSCALE: u8 = 0x01;
/// PPUMASK: show background in the leftmost 8 pixels.
pub const MASK_BG_LEFT: u8 = 0x02;
/// PPUMASK: show sprites in the leftmost 8 pixels.
pub const MASK_SPRITE_LEFT: u8 = 0x04;
pub const MASK_SHOW_BG: u8 = 0x08;
pub const MASK_SHOW_SPRITES: u8 = 0x10;

/// PPUSTATUS ($2002) bits; the low five come from the PPU data latch.
pub const STATUS_SPRITE_OVERFLOW: u8 = 0x20;
pub const STATUS_SPRITE_0_HIT: u8 = 0x40;
pub const STATUS_VBLANK: u8 = 0x80;

// Internal VRAM address layout (v/t): yyy NN YYYYY XXXXX.
pub const VRAM_COARSE_X: u16 = 0x001F;
pub const VRAM_COARSE_Y: u16 = 0x03E0;
pub const VRAM_NAMETABLE_X: u16 = 0x0400;
pub const VRAM_NAMETABLE_Y: u16 = 0x0800;
pub const VRAM_FINE_Y: u16 = 0x7000;
