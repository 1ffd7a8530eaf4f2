//! Error types for cartridge loading, CPU execution, and the frontend window.

use thiserror::Error;

/// Reasons an iNES image is rejected. Raised before any mapper is built.
#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("failed to read ROM: {0}")]
    Io(#[from] std::io::Error),

    #[error("not an iNES image (magic {0:02X?})")]
    BadMagic([u8; 4]),

    #[error("truncated {section}: expected {expected} bytes, found {actual}")]
    Truncated {
        section: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("image declares no PRG ROM")]
    NoProgramRom,

    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),
}

/// Fatal CPU conditions.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    /// A JAM/KIL opcode locked up the processor; only a reset recovers.
    #[error("CPU jammed on opcode ${opcode:02X} at ${pc:04X}")]
    Jammed { opcode: u8, pc: u16 },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),

    #[error(transparent)]
    Cpu(#[from] CpuError),

    #[error("window: {0}")]
    Window(#[from] minifb::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
