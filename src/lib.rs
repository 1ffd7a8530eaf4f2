//! hunes: an instruction-stepped NES (Nintendo Entertainment System) emulator core.
//!
//! Implements the NES chipset as documented on the
//! [NESdev Wiki](https://www.nesdev.org/wiki/NES_reference_guide): Ricoh 2A03 CPU (without the
//! APU), 2C02 PPU, cartridge mappers, and controller I/O. The CPU drives everything: each
//! [`cpu::CPU::step`] runs one instruction or interrupt, then ticks the PPU three dots per cycle.
//!
//! ## Modules (NESdev references)
//!
//! - **bus** – [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map): RAM, PPU registers,
//!   OAM DMA, controllers, cartridge; 3 PPU cycles per CPU cycle
//! - **cartridge** – [iNES](https://www.nesdev.org/wiki/INES) loading; [Mapper](https://www.nesdev.org/wiki/Mapper) NROM (0), MMC1 (1), UxROM (2), CNROM (3)
//! - **config** – command-line options for the binary
//! - **controller** – [Controller reading](https://www.nesdev.org/wiki/Controller_reading): $4016 latch, shift-out
//! - **cpu** – [6502](https://www.nesdev.org/wiki/CPU) / 2A03: full + undocumented opcodes, [NMI](https://www.nesdev.org/wiki/NMI), IRQ
//! - **error** – cartridge and CPU failure types
//! - **memory** / **ram** – the read/write capability and 2 KiB work RAM
//! - **ppu** – [PPU](https://www.nesdev.org/wiki/PPU), [PPU registers](https://www.nesdev.org/wiki/PPU_registers), OAM, nametables, 256×240

pub mod bus;
pub mod cartridge;
pub mod config;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod memory;
pub mod ppu;
pub mod ram;
