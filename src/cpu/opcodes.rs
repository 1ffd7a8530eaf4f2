//! Instruction descriptor table: one entry per opcode byte.
//!
//! Cycle counts are the base cost from the [6502 opcode matrix](https://www.nesdev.org/wiki/CPU_unofficial_opcodes);
//! `page_penalty` marks reads that take one more cycle when indexing crosses a page.
//! Branch costs beyond the base are added by the branch itself.

use self::AddressingMode::*;
use self::Op::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// JMP ($xxxx) only.
    Indirect,
    /// ($zz,X)
    IndirectX,
    /// ($zz),Y
    IndirectY,
    Relative,
}

impl AddressingMode {
    /// Operand bytes following the opcode.
    pub fn operand_len(self) -> u16 {
        match self {
            Implied | Accumulator => 0,
            Immediate | ZeroPage | ZeroPageX | ZeroPageY | IndirectX | IndirectY | Relative => 1,
            Absolute | AbsoluteX | AbsoluteY | Indirect => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    // Stable unofficial opcodes.
    Alr, Anc, Arr, Axs, Dcp, Isc, Las, Lax, Rla, Rra, Sax, Slo, Sre,
    // Unstable on real silicon; executed as NOPs.
    Ahx, Lxa, Shx, Shy, Tas, Xaa,
    /// Locks up the CPU.
    Jam,
}

impl Op {
    pub fn is_unstable(self) -> bool {
        matches!(self, Ahx | Lxa | Shx | Shy | Tas | Xaa)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Instruction {
    pub op: Op,
    pub mode: AddressingMode,
    pub cycles: u8,
    pub page_penalty: bool,
}

const fn op(op: Op, mode: AddressingMode, cycles: u8) -> Instruction {
    Instruction { op, mode, cycles, page_penalty: false }
}

const fn paged(op: Op, mode: AddressingMode, cycles: u8) -> Instruction {
    Instruction { op, mode, cycles, page_penalty: true }
}

#[rustfmt::skip]
pub static OPCODES: [Instruction; 256] = [
    /* 00 */ op(Brk, Implied, 7),
    /* 01 */ op(Ora, IndirectX, 6),
    /* 02 */ op(Jam, Implied, 2),
    /* 03 */ op(Slo, IndirectX, 8),
    /* 04 */ op(Nop, ZeroPage, 3),
    /* 05 */ op(Ora, ZeroPage, 3),
    /* 06 */ op(Asl, ZeroPage, 5),
    /* 07 */ op(Slo, ZeroPage, 5),
    /* 08 */ op(Php, Implied, 3),
    /* 09 */ op(Ora, Immediate, 2),
    /* 0A */ op(Asl, Accumulator, 2),
    /* 0B */ op(Anc, Immediate, 2),
    /* 0C */ op(Nop, Absolute, 4),
    /* 0D */ op(Ora, Absolute, 4),
    /* 0E */ op(Asl, Absolute, 6),
    /* 0F */ op(Slo, Absolute, 6),
    /* 10 */ op(Bpl, Relative, 2),
    /* 11 */ paged(Ora, IndirectY, 5),
    /* 12 */ op(Jam, Implied, 2),
    /* 13 */ op(Slo, IndirectY, 8),
    /* 14 */ op(Nop, ZeroPageX, 4),
    /* 15 */ op(Ora, ZeroPageX, 4),
    /* 16 */ op(Asl, ZeroPageX, 6),
    /* 17 */ op(Slo, ZeroPageX, 6),
    /* 18 */ op(Clc, Implied, 2),
    /* 19 */ paged(Ora, AbsoluteY, 4),
    /* 1A */ op(Nop, Implied, 2),
    /* 1B */ op(Slo, AbsoluteY, 7),
    /* 1C */ paged(Nop, AbsoluteX, 4),
    /* 1D */ paged(Ora, AbsoluteX, 4),
    /* 1E */ op(Asl, AbsoluteX, 7),
    /* 1F */ op(Slo, AbsoluteX, 7),
    /* 20 */ op(Jsr, Absolute, 6),
    /* 21 */ op(And, IndirectX, 6),
    /* 22 */ op(Jam, Implied, 2),
    /* 23 */ op(Rla, IndirectX, 8),
    /* 24 */ op(Bit, ZeroPage, 3),
    /* 25 */ op(And, ZeroPage, 3),
    /* 26 */ op(Rol, ZeroPage, 5),
    /* 27 */ op(Rla, ZeroPage, 5),
    /* 28 */ op(Plp, Implied, 4),
    /* 29 */ op(And, Immediate, 2),
    /* 2A */ op(Rol, Accumulator, 2),
    /* 2B */ op(Anc, Immediate, 2),
    /* 2C */ op(Bit, Absolute, 4),
    /* 2D */ op(And, Absolute, 4),
    /* 2E */ op(Rol, Absolute, 6),
    /* 2F */ op(Rla, Absolute, 6),
    /* 30 */ op(Bmi, Relative, 2),
    /* 31 */ paged(And, IndirectY, 5),
    /* 32 */ op(Jam, Implied, 2),
    /* 33 */ op(Rla, IndirectY, 8),
    /* 34 */ op(Nop, ZeroPageX, 4),
    /* 35 */ op(And, ZeroPageX, 4),
    /* 36 */ op(Rol, ZeroPageX, 6),
    /* 37 */ op(Rla, ZeroPageX, 6),
    /* 38 */ op(Sec, Implied, 2),
    /* 39 */ paged(And, AbsoluteY, 4),
    /* 3A */ op(Nop, Implied, 2),
    /* 3B */ op(Rla, AbsoluteY, 7),
    /* 3C */ paged(Nop, AbsoluteX, 4),
    /* 3D */ paged(And, AbsoluteX, 4),
    /* 3E */ op(Rol, AbsoluteX, 7),
    /* 3F */ op(Rla, AbsoluteX, 7),
    /* 40 */ op(Rti, Implied, 6),
    /* 41 */ op(Eor, IndirectX, 6),
    /* 42 */ op(Jam, Implied, 2),
    /* 43 */ op(Sre, IndirectX, 8),
    /* 44 */ op(Nop, ZeroPage, 3),
    /* 45 */ op(Eor, ZeroPage, 3),
    /* 46 */ op(Lsr, ZeroPage, 5),
    /* 47 */ op(Sre, ZeroPage, 5),
    /* 48 */ op(Pha, Implied, 3),
    /* 49 */ op(Eor, Immediate, 2),
    /* 4A */ op(Lsr, Accumulator, 2),
    /* 4B */ op(Alr, Immediate, 2),
    /* 4C */ op(Jmp, Absolute, 3),
    /* 4D */ op(Eor, Absolute, 4),
    /* 4E */ op(Lsr, Absolute, 6),
    /* 4F */ op(Sre, Absolute, 6),
    /* 50 */ op(Bvc, Relative, 2),
    /* 51 */ paged(Eor, IndirectY, 5),
    /* 52 */ op(Jam, Implied, 2),
    /* 53 */ op(Sre, IndirectY, 8),
    /* 54 */ op(Nop, ZeroPageX, 4),
    /* 55 */ op(Eor, ZeroPageX, 4),
    /* 56 */ op(Lsr, ZeroPageX, 6),
    /* 57 */ op(Sre, ZeroPageX, 6),
    /* 58 */ op(Cli, Implied, 2),
    /* 59 */ paged(Eor, AbsoluteY, 4),
    /* 5A */ op(Nop, Implied, 2),
    /* 5B */ op(Sre, AbsoluteY, 7),
    /* 5C */ paged(Nop, AbsoluteX, 4),
    /* 5D */ paged(Eor, AbsoluteX, 4),
    /* 5E */ op(Lsr, AbsoluteX, 7),
    /* 5F */ op(Sre, AbsoluteX, 7),
    /* 60 */ op(Rts, Implied, 6),
    /* 61 */ op(Adc, IndirectX, 6),
    /* 62 */ op(Jam, Implied, 2),
    /* 63 */ op(Rra, IndirectX, 8),
    /* 64 */ op(Nop, ZeroPage, 3),
    /* 65 */ op(Adc, ZeroPage, 3),
    /* 66 */ op(Ror, ZeroPage, 5),
    /* 67 */ op(Rra, ZeroPage, 5),
    /* 68 */ op(Pla, Implied, 4),
    /* 69 */ op(Adc, Immediate, 2),
    /* 6A */ op(Ror, Accumulator, 2),
    /* 6B */ op(Arr, Immediate, 2),
    /* 6C */ op(Jmp, Indirect, 5),
    /* 6D */ op(Adc, Absolute, 4),
    /* 6E */ op(Ror, Absolute, 6),
    /* 6F */ op(Rra, Absolute, 6),
    /* 70 */ op(Bvs, Relative, 2),
    /* 71 */ paged(Adc, IndirectY, 5),
    /* 72 */ op(Jam, Implied, 2),
    /* 73 */ op(Rra, IndirectY, 8),
    /* 74 */ op(Nop, ZeroPageX, 4),
    /* 75 */ op(Adc, ZeroPageX, 4),
    /* 76 */ op(Ror, ZeroPageX, 6),
    /* 77 */ op(Rra, ZeroPageX, 6),
    /* 78 */ op(Sei, Implied, 2),
    /* 79 */ paged(Adc, AbsoluteY, 4),
    /* 7A */ op(Nop, Implied, 2),
    /* 7B */ op(Rra, AbsoluteY, 7),
    /* 7C */ paged(Nop, AbsoluteX, 4),
    /* 7D */ paged(Adc, AbsoluteX, 4),
    /* 7E */ op(Ror, AbsoluteX, 7),
    /* 7F */ op(Rra, AbsoluteX, 7),
    /* 80 */ op(Nop, Immediate, 2),
    /* 81 */ op(Sta, IndirectX, 6),
    /* 82 */ op(Nop, Immediate, 2),
    /* 83 */ op(Sax, IndirectX, 6),
    /* 84 */ op(Sty, ZeroPage, 3),
    /* 85 */ op(Sta, ZeroPage, 3),
    /* 86 */ op(Stx, ZeroPage, 3),
    /* 87 */ op(Sax, ZeroPage, 3),
    /* 88 */ op(Dey, Implied, 2),
    /* 89 */ op(Nop, Immediate, 2),
    /* 8A */ op(Txa, Implied, 2),
    /* 8B */ op(Xaa, Immediate, 2),
    /* 8C */ op(Sty, Absolute, 4),
    /* 8D */ op(Sta, Absolute, 4),
    /* 8E */ op(Stx, Absolute, 4),
    /* 8F */ op(Sax, Absolute, 4),
    /* 90 */ op(Bcc, Relative, 2),
    /* 91 */ op(Sta, IndirectY, 6),
    /* 92 */ op(Jam, Implied, 2),
    /* 93 */ op(Ahx, IndirectY, 6),
    /* 94 */ op(Sty, ZeroPageX, 4),
    /* 95 */ op(Sta, ZeroPageX, 4),
    /* 96 */ op(Stx, ZeroPageY, 4),
    /* 97 */ op(Sax, ZeroPageY, 4),
    /* 98 */ op(Tya, Implied, 2),
    /* 99 */ op(Sta, AbsoluteY, 5),
    /* 9A */ op(Txs, Implied, 2),
    /* 9B */ op(Tas, AbsoluteY, 5),
    /* 9C */ op(Shy, AbsoluteX, 5),
    /* 9D */ op(Sta, AbsoluteX, 5),
    /* 9E */ op(Shx, AbsoluteY, 5),
    /* 9F */ op(Ahx, AbsoluteY, 5),
    /* A0 */ op(Ldy, Immediate, 2),
    /* A1 */ op(Lda, IndirectX, 6),
    /* A2 */ op(Ldx, Immediate, 2),
    /* A3 */ op(Lax, IndirectX, 6),
    /* A4 */ op(Ldy, ZeroPage, 3),
    /* A5 */ op(Lda, ZeroPage, 3),
    /* A6 */ op(Ldx, ZeroPage, 3),
    /* A7 */ op(Lax, ZeroPage, 3),
    /* A8 */ op(Tay, Implied, 2),
    /* A9 */ op(Lda, Immediate, 2),
    /* AA */ op(Tax, Implied, 2),
    /* AB */ op(Lxa, Immediate, 2),
    /* AC */ op(Ldy, Absolute, 4),
    /* AD */ op(Lda, Absolute, 4),
    /* AE */ op(Ldx, Absolute, 4),
    /* AF */ op(Lax, Absolute, 4),
    /* B0 */ op(Bcs, Relative, 2),
    /* B1 */ paged(Lda, IndirectY, 5),
    /* B2 */ op(Jam, Implied, 2),
    /* B3 */ paged(Lax, IndirectY, 5),
    /* B4 */ op(Ldy, ZeroPageX, 4),
    /* B5 */ op(Lda, ZeroPageX, 4),
    /* B6 */ op(Ldx, ZeroPageY, 4),
    /* B7 */ op(Lax, ZeroPageY, 4),
    /* B8 */ op(Clv, Implied, 2),
    /* B9 */ paged(Lda, AbsoluteY, 4),
    /* BA */ op(Tsx, Implied, 2),
    /* BB */ paged(Las, AbsoluteY, 4),
    /* BC */ paged(Ldy, AbsoluteX, 4),
    /* BD */ paged(Lda, AbsoluteX, 4),
    /* BE */ paged(Ldx, AbsoluteY, 4),
    /* BF */ paged(Lax, AbsoluteY, 4),
    /* C0 */ op(Cpy, Immediate, 2),
    /* C1 */ op(Cmp, IndirectX, 6),
    /* C2 */ op(Nop, Immediate, 2),
    /* C3 */ op(Dcp, IndirectX, 8),
    /* C4 */ op(Cpy, ZeroPage, 3),
    /* C5 */ op(Cmp, ZeroPage, 3),
    /* C6 */ op(Dec, ZeroPage, 5),
    /* C7 */ op(Dcp, ZeroPage, 5),
    /* C8 */ op(Iny, Implied, 2),
    /* C9 */ op(Cmp, Immediate, 2),
    /* CA */ op(Dex, Implied, 2),
    /* CB */ op(Axs, Immediate, 2),
    /* CC */ op(Cpy, Absolute, 4),
    /* CD */ op(Cmp, Absolute, 4),
    /* CE */ op(Dec, Absolute, 6),
    /* CF */ op(Dcp, Absolute, 6),
    /* D0 */ op(Bne, Relative, 2),
    /* D1 */ paged(Cmp, IndirectY, 5),
    /* D2 */ op(Jam, Implied, 2),
    /* D3 */ op(Dcp, IndirectY, 8),
    /* D4 */ op(Nop, ZeroPageX, 4),
    /* D5 */ op(Cmp, ZeroPageX, 4),
    /* D6 */ op(Dec, ZeroPageX, 6),
    /* D7 */ op(Dcp, ZeroPageX, 6),
    /* D8 */ op(Cld, Implied, 2),
    /* D9 */ paged(Cmp, AbsoluteY, 4),
    /* DA */ op(Nop, Implied, 2),
    /* DB */ op(Dcp, AbsoluteY, 7),
    /* DC */ paged(Nop, AbsoluteX, 4),
    /* DD */ paged(Cmp, AbsoluteX, 4),
    /* DE */ op(Dec, AbsoluteX, 7),
    /* DF */ op(Dcp, AbsoluteX, 7),
    /* E0 */ op(Cpx, Immediate, 2),
    /* E1 */ op(Sbc, IndirectX, 6),
    /* E2 */ op(Nop, Immediate, 2),
    /* E3 */ op(Isc, IndirectX, 8),
    /* E4 */ op(Cpx, ZeroPage, 3),
    /* E5 */ op(Sbc, ZeroPage, 3),
    /* E6 */ op(Inc, ZeroPage, 5),
    /* E7 */ op(Isc, ZeroPage, 5),
    /* E8 */ op(Inx, Implied, 2),
    /* E9 */ op(Sbc, Immediate, 2),
    /* EA */ op(Nop, Implied, 2),
    /* EB */ op(Sbc, Immediate, 2),
    /* EC */ op(Cpx, Absolute, 4),
    /* ED */ op(Sbc, Absolute, 4),
    /* EE */ op(Inc, Absolute, 6),
    /* EF */ op(Isc, Absolute, 6),
    /* F0 */ op(Beq, Relative, 2),
    /* F1 */ paged(Sbc, IndirectY, 5),
    /* F2 */ op(Jam, Implied, 2),
    /* F3 */ op(Isc, IndirectY, 8),
    /* F4 */ op(Nop, ZeroPageX, 4),
    /* F5 */ op(Sbc, ZeroPageX, 4),
    /* F6 */ op(Inc, ZeroPageX, 6),
    /* F7 */ op(Isc, ZeroPageX, 6),
    /* F8 */ op(Sed, Implied, 2),
    /* F9 */ paged(Sbc, AbsoluteY, 4),
    /* FA */ op(Nop, Implied, 2),
    /* FB */ op(Isc, AbsoluteY, 7),
    /* FC */ paged(Nop, AbsoluteX, 4),
    /* FD */ paged(Sbc, AbsoluteX, 4),
    /* FE */ op(Inc, AbsoluteX, 7),
    /* FF */ op(Isc, AbsoluteX, 7),
];
