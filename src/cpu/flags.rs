//! 6502 processor status register (P) flag bits.
//!
//! B and U are not stored latches on real silicon; they only show up in the copy of P pushed to
//! the stack. U always reads as 1, B is 1 for BRK/PHP and 0 for NMI/IRQ.

pub const FLAG_CARRY: u8 = 1 << 0;
pub const FLAG_ZERO: u8 = 1 << 1;
pub const FLAG_INTERRUPT_DISABLE: u8 = 1 << 2;
pub const FLAG_DECIMAL: u8 = 1 << 3; // stored, but the 2A03 has no decimal mode
pub const FLAG_BREAK: u8 = 1 << 4;
pub const FLAG_UNUSED: u8 = 1 << 5;
pub const FLAG_OVERFLOW: u8 = 1 << 6;
pub const FLAG_NEGATIVE: u8 = 1 << 7;
