//! 6502 (Ricoh 2A03) CPU emulation for the NES.
//!
//! Table-driven: every opcode byte maps to an [`opcodes::Instruction`] naming its operation,
//! addressing mode, and base cycle cost. Undocumented opcodes are included; the unstable ones run
//! as NOPs and the JAM bytes halt the CPU.

pub mod cpu;
pub mod flags;
pub mod opcodes;


pub use cpu::CPU;
