use tracing::{Level, error, trace, warn};

use crate::{
    bus::{Bus, NesBus},
    cpu::{
        flags::{
            FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE,
            FLAG_OVERFLOW, FLAG_UNUSED, FLAG_ZERO,
        },
        opcodes::{AddressingMode, Instruction, OPCODES, Op},
    },
    error::CpuError,
    memory::Memory,
};

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles spent pushing state and loading a vector for NMI/IRQ.
pub const INTERRUPT_CYCLES: usize = 7;

/// Effective address of an instruction's operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operand {
    pub addr: u16,
    pub page_crossed: bool,
}

impl Operand {
    fn at(addr: u16) -> Self {
        Self {
            addr,
            page_crossed: false,
        }
    }

    fn indexed(base: u16, index: u8) -> Self {
        let addr = base.wrapping_add(index as u16);
        Self {
            addr,
            page_crossed: (base & 0xFF00) != (addr & 0xFF00),
        }
    }
}

pub struct CPU<B: Bus> {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub cycles: usize,
    pub bus: B,
    pub halted: bool,
    /// Opcode and address of the JAM that halted the CPU.
    jammed_at: Option<(u8, u16)>,
    warned_unstable: [bool; 256],
}

impl<B: Bus> CPU<B> {
    pub fn new(bus: B) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: FLAG_INTERRUPT_DISABLE | FLAG_UNUSED,
            cycles: 0,
            bus,
            halted: false,
            jammed_at: None,
            warned_unstable: [false; 256],
        }
    }

    /// Power-up/reset state: PC from the RESET vector, SP = $FD, I set.
    pub fn reset(&mut self) {
        self.pc = self.bus.read_word(RESET_VECTOR);

        self.sp = 0xFD;
        self.status = FLAG_INTERRUPT_DISABLE | FLAG_UNUSED;

        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.halted = false;
        self.jammed_at = None;

        self.cycles = 7;
    }

    /// Service a pending interrupt or run one instruction, then advance the rest of the system by
    /// the cycles spent. Returns the cycle count.
    pub fn step(&mut self) -> Result<usize, CpuError> {
        if let Some((opcode, pc)) = self.jammed_at {
            return Err(CpuError::Jammed { opcode, pc });
        }

        let start = self.cycles;
        if self.bus.poll_nmi() {
            self.interrupt(NMI_VECTOR);
        } else if self.bus.irq_line() && self.status & FLAG_INTERRUPT_DISABLE == 0 {
            self.interrupt(IRQ_VECTOR);
        } else {
            self.execute()?;
        }
        let pending = self.cycles - start;
        self.cycles += self.bus.take_stall(pending);

        let cycle_diff = self.cycles - start;
        self.bus.tick(cycle_diff);
        Ok(cycle_diff)
    }

    fn execute(&mut self) -> Result<(), CpuError> {
        let pc = self.pc;
        let opcode = self.fetch_byte();
        let ins = OPCODES[opcode as usize];

        if tracing::enabled!(Level::TRACE) {
            self.trace(pc, opcode, &ins);
        }

        if ins.op == Op::Jam {
            self.halted = true;
            self.jammed_at = Some((opcode, pc));
            error!("CPU jammed on ${opcode:02X} at ${pc:04X}");
            return Err(CpuError::Jammed { opcode, pc });
        }

        let operand = self.resolve(ins.mode);
        self.cycles += ins.cycles as usize;
        if ins.page_penalty && operand.page_crossed {
            self.cycles += 1;
        }

        if ins.op.is_unstable() {
            self.warn_unstable(pc, opcode, ins.op);
        } else {
            self.run(ins, operand);
        }
        Ok(())
    }

    /// Unstable opcodes run as NOPs; say so once per opcode byte.
    fn warn_unstable(&mut self, pc: u16, opcode: u8, op: Op) {
        if !self.warned_unstable[opcode as usize] {
            self.warned_unstable[opcode as usize] = true;
            warn!("unstable opcode ${opcode:02X} ({op:?}) at ${pc:04X} treated as NOP");
        }
    }

    fn fetch_byte(&mut self) -> u8 {
        let byte = self.bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch_byte() as u16;
        let hi = self.fetch_byte() as u16;
        (hi << 8) | lo
    }

    /// Read a pointer from the zero page; the high byte wraps within page 0.
    fn read_zero_page_word(&mut self, ptr: u8) -> u16 {
        let lo = self.bus.read(ptr as u16) as u16;
        let hi = self.bus.read(ptr.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    /// Compute the effective address, consuming operand bytes.
    pub fn resolve(&mut self, mode: AddressingMode) -> Operand {
        match mode {
            AddressingMode::Implied | AddressingMode::Accumulator => Operand::at(0),
            AddressingMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                Operand::at(addr)
            }
            AddressingMode::ZeroPage => Operand::at(self.fetch_byte() as u16),
            AddressingMode::ZeroPageX => Operand::at(self.fetch_byte().wrapping_add(self.x) as u16),
            AddressingMode::ZeroPageY => Operand::at(self.fetch_byte().wrapping_add(self.y) as u16),
            AddressingMode::Absolute => Operand::at(self.fetch_word()),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word();
                Operand::indexed(base, self.x)
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word();
                Operand::indexed(base, self.y)
            }
            AddressingMode::Indirect => {
                let ptr = self.fetch_word();
                let lo = self.bus.read(ptr) as u16;
                // The high byte never carries into the next page.
                let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
                let hi = self.bus.read(hi_addr) as u16;
                Operand::at((hi << 8) | lo)
            }
            AddressingMode::IndirectX => {
                let ptr = self.fetch_byte().wrapping_add(self.x);
                Operand::at(self.read_zero_page_word(ptr))
            }
            AddressingMode::IndirectY => {
                let ptr = self.fetch_byte();
                let base = self.read_zero_page_word(ptr);
                Operand::indexed(base, self.y)
            }
            AddressingMode::Relative => {
                let offset = self.fetch_byte() as i8;
                let target = self.pc.wrapping_add(offset as u16);
                Operand {
                    addr: target,
                    page_crossed: (self.pc & 0xFF00) != (target & 0xFF00),
                }
            }
        }
    }

    fn run(&mut self, ins: Instruction, operand: Operand) {
        let addr = operand.addr;
        let mode = ins.mode;
        match ins.op {
            Op::Lda => {
                let value = self.bus.read(addr);
                self.a = value;
                self.update_zero_and_negative_flags(value);
            }
            Op::Ldx => {
                let value = self.bus.read(addr);
                self.x = value;
                self.update_zero_and_negative_flags(value);
            }
            Op::Ldy => {
                let value = self.bus.read(addr);
                self.y = value;
                self.update_zero_and_negative_flags(value);
            }
            Op::Sta => self.bus.write(addr, self.a),
            Op::Stx => self.bus.write(addr, self.x),
            Op::Sty => self.bus.write(addr, self.y),

            Op::Tax => {
                self.x = self.a;
                self.update_zero_and_negative_flags(self.x);
            }
            Op::Tay => {
                self.y = self.a;
                self.update_zero_and_negative_flags(self.y);
            }
            Op::Tsx => {
                self.x = self.sp;
                self.update_zero_and_negative_flags(self.x);
            }
            Op::Txa => {
                self.a = self.x;
                self.update_zero_and_negative_flags(self.a);
            }
            Op::Tya => {
                self.a = self.y;
                self.update_zero_and_negative_flags(self.a);
            }
            Op::Txs => self.sp = self.x,

            Op::And => {
                let value = self.bus.read(addr);
                self.and(value);
            }
            Op::Ora => {
                let value = self.bus.read(addr);
                self.ora(value);
            }
            Op::Eor => {
                let value = self.bus.read(addr);
                self.eor(value);
            }
            Op::Adc => {
                let value = self.bus.read(addr);
                self.add_with_carry(value);
            }
            Op::Sbc => {
                let value = self.bus.read(addr);
                self.add_with_carry(!value);
            }
            Op::Cmp => {
                let value = self.bus.read(addr);
                self.compare(self.a, value);
            }
            Op::Cpx => {
                let value = self.bus.read(addr);
                self.compare(self.x, value);
            }
            Op::Cpy => {
                let value = self.bus.read(addr);
                self.compare(self.y, value);
            }
            Op::Bit => {
                let value = self.bus.read(addr);
                self.set_flag(FLAG_ZERO, self.a & value == 0);
                self.set_flag(FLAG_OVERFLOW, value & 0x40 != 0);
                self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
            }

            Op::Inc => {
                self.read_modify_write(mode, addr, Self::increment);
            }
            Op::Dec => {
                self.read_modify_write(mode, addr, Self::decrement);
            }
            Op::Inx => self.x = self.increment(self.x),
            Op::Iny => self.y = self.increment(self.y),
            Op::Dex => self.x = self.decrement(self.x),
            Op::Dey => self.y = self.decrement(self.y),

            Op::Asl => {
                self.read_modify_write(mode, addr, Self::asl);
            }
            Op::Lsr => {
                self.read_modify_write(mode, addr, Self::lsr);
            }
            Op::Rol => {
                self.read_modify_write(mode, addr, Self::rol);
            }
            Op::Ror => {
                self.read_modify_write(mode, addr, Self::ror);
            }

            Op::Jmp => self.pc = addr,
            Op::Jsr => {
                self.push_word(self.pc.wrapping_sub(1));
                self.pc = addr;
            }
            Op::Rts => {
                self.pc = self.pop_word().wrapping_add(1);
            }
            Op::Rti => {
                let status = self.pop();
                self.status = (status & !FLAG_BREAK) | FLAG_UNUSED;
                self.pc = self.pop_word();
            }
            Op::Brk => {
                // Skip the padding byte.
                self.pc = self.pc.wrapping_add(1);
                self.push_word(self.pc);
                self.push(self.status | FLAG_BREAK | FLAG_UNUSED);
                self.status |= FLAG_INTERRUPT_DISABLE;
                self.pc = self.bus.read_word(IRQ_VECTOR);
            }

            Op::Pha => self.push(self.a),
            Op::Php => self.push(self.status | FLAG_BREAK | FLAG_UNUSED),
            Op::Pla => {
                self.a = self.pop();
                self.update_zero_and_negative_flags(self.a);
            }
            Op::Plp => {
                let value = self.pop();
                self.status = (value & !FLAG_BREAK) | FLAG_UNUSED;
            }

            Op::Bcc => self.branch(self.status & FLAG_CARRY == 0, operand),
            Op::Bcs => self.branch(self.status & FLAG_CARRY != 0, operand),
            Op::Bne => self.branch(self.status & FLAG_ZERO == 0, operand),
            Op::Beq => self.branch(self.status & FLAG_ZERO != 0, operand),
            Op::Bpl => self.branch(self.status & FLAG_NEGATIVE == 0, operand),
            Op::Bmi => self.branch(self.status & FLAG_NEGATIVE != 0, operand),
            Op::Bvc => self.branch(self.status & FLAG_OVERFLOW == 0, operand),
            Op::Bvs => self.branch(self.status & FLAG_OVERFLOW != 0, operand),

            Op::Clc => self.status &= !FLAG_CARRY,
            Op::Cld => self.status &= !FLAG_DECIMAL,
            Op::Cli => self.status &= !FLAG_INTERRUPT_DISABLE,
            Op::Clv => self.status &= !FLAG_OVERFLOW,
            Op::Sec => self.status |= FLAG_CARRY,
            Op::Sed => self.status |= FLAG_DECIMAL,
            Op::Sei => self.status |= FLAG_INTERRUPT_DISABLE,

            Op::Nop => {}

            Op::Lax => {
                let value = self.bus.read(addr);
                self.a = value;
                self.x = value;
                self.update_zero_and_negative_flags(value);
            }
            Op::Sax => self.bus.write(addr, self.a & self.x),
            Op::Dcp => {
                let value = self.read_modify_write(mode, addr, |_, v| v.wrapping_sub(1));
                self.compare(self.a, value);
            }
            Op::Isc => {
                let value = self.read_modify_write(mode, addr, |_, v| v.wrapping_add(1));
                self.add_with_carry(!value);
            }
            Op::Slo => {
                let value = self.read_modify_write(mode, addr, Self::asl);
                self.ora(value);
            }
            Op::Rla => {
                let value = self.read_modify_write(mode, addr, Self::rol);
                self.and(value);
            }
            Op::Sre => {
                let value = self.read_modify_write(mode, addr, Self::lsr);
                self.eor(value);
            }
            Op::Rra => {
                let value = self.read_modify_write(mode, addr, Self::ror);
                self.add_with_carry(value);
            }
            Op::Anc => {
                let value = self.bus.read(addr);
                self.and(value);
                self.set_flag(FLAG_CARRY, self.a & 0x80 != 0);
            }
            Op::Alr => {
                let value = self.bus.read(addr);
                self.a &= value;
                self.a = self.lsr(self.a);
            }
            Op::Arr => {
                let value = self.bus.read(addr);
                let carry_in = self.status & FLAG_CARRY;
                self.a = ((self.a & value) >> 1) | (carry_in << 7);
                self.update_zero_and_negative_flags(self.a);
                let bit6 = self.a & 0x40 != 0;
                let bit5 = self.a & 0x20 != 0;
                self.set_flag(FLAG_CARRY, bit6);
                self.set_flag(FLAG_OVERFLOW, bit6 != bit5);
            }
            Op::Axs => {
                let value = self.bus.read(addr);
                let masked = self.a & self.x;
                self.set_flag(FLAG_CARRY, masked >= value);
                self.x = masked.wrapping_sub(value);
                self.update_zero_and_negative_flags(self.x);
            }
            Op::Las => {
                let value = self.bus.read(addr) & self.sp;
                self.a = value;
                self.x = value;
                self.sp = value;
                self.update_zero_and_negative_flags(value);
            }

            // Filtered out in `execute`.
            Op::Ahx | Op::Lxa | Op::Shx | Op::Shy | Op::Tas | Op::Xaa | Op::Jam => {}
        }
    }

    /// Apply `f` to the accumulator or to memory at `addr`; returns the new value.
    fn read_modify_write(
        &mut self,
        mode: AddressingMode,
        addr: u16,
        f: impl FnOnce(&mut Self, u8) -> u8,
    ) -> u8 {
        if mode == AddressingMode::Accumulator {
            let value = self.a;
            let result = f(self, value);
            self.a = result;
            result
        } else {
            let value = self.bus.read(addr);
            let result = f(self, value);
            self.bus.write(addr, result);
            result
        }
    }

    fn increment(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.update_zero_and_negative_flags(result);
        result
    }

    fn decrement(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.update_zero_and_negative_flags(result);
        result
    }

    fn asl(&mut self, value: u8) -> u8 {
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        let result = value << 1;
        self.update_zero_and_negative_flags(result);
        result
    }

    fn lsr(&mut self, value: u8) -> u8 {
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        let result = value >> 1;
        self.update_zero_and_negative_flags(result);
        result
    }

    fn rol(&mut self, value: u8) -> u8 {
        let carry_in = self.status & FLAG_CARRY;
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.update_zero_and_negative_flags(result);
        result
    }

    fn ror(&mut self, value: u8) -> u8 {
        let carry_in = self.status & FLAG_CARRY;
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        let result = (value >> 1) | (carry_in << 7);
        self.update_zero_and_negative_flags(result);
        result
    }

    fn and(&mut self, value: u8) {
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn ora(&mut self, value: u8) {
        self.a |= value;
        self.update_zero_and_negative_flags(self.a);
    }

    fn eor(&mut self, value: u8) {
        self.a ^= value;
        self.update_zero_and_negative_flags(self.a);
    }

    /// Binary ADC (the 2A03 has no decimal mode). SBC is ADC of the complement.
    fn add_with_carry(&mut self, value: u8) {
        let carry_in = (self.status & FLAG_CARRY) as u16;
        let sum = self.a as u16 + value as u16 + carry_in;
        let result = sum as u8;

        self.set_flag(FLAG_CARRY, sum > 0xFF);
        self.set_flag(
            FLAG_OVERFLOW,
            (!(self.a ^ value) & (self.a ^ result)) & 0x80 != 0,
        );

        self.a = result;
        self.update_zero_and_negative_flags(self.a);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.set_flag(FLAG_CARRY, register >= value);
        self.update_zero_and_negative_flags(register.wrapping_sub(value));
    }

    fn set_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    fn update_zero_and_negative_flags(&mut self, value: u8) {
        self.set_flag(FLAG_ZERO, value == 0);
        self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
    }

    /// Push PC and status (B clear), set I, and jump through `vector`.
    fn interrupt(&mut self, vector: u16) {
        self.push_word(self.pc);
        self.push((self.status & !FLAG_BREAK) | FLAG_UNUSED);
        self.status |= FLAG_INTERRUPT_DISABLE;
        self.pc = self.bus.read_word(vector);
        self.cycles += INTERRUPT_CYCLES;
    }

    fn push(&mut self, value: u8) {
        self.bus.write(0x0100 | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.bus.read(0x0100 | self.sp as u16)
    }

    /// High byte first, so the low byte ends up at the lower address.
    fn push_word(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    fn pop_word(&mut self) -> u16 {
        let lo = self.pop() as u16;
        let hi = self.pop() as u16;
        (hi << 8) | lo
    }

    /// +1 cycle when taken, +1 more when the target is on another page.
    fn branch(&mut self, condition: bool, target: Operand) {
        if condition {
            self.cycles += 1;
            if target.page_crossed {
                self.cycles += 1;
            }
            self.pc = target.addr;
        }
    }

    /// nestest-style line: `C000  4C F5 C5  JMP  A:00 X:00 Y:00 P:24 SP:FD CYC:7`.
    /// Operand bytes come from `Bus::peek` so tracing never disturbs the bus.
    fn trace(&self, pc: u16, opcode: u8, ins: &Instruction) {
        let mut bytes = format!("{opcode:02X}");
        for i in 1..=ins.mode.operand_len() {
            match self.bus.peek(pc.wrapping_add(i)) {
                Some(byte) => bytes.push_str(&format!(" {byte:02X}")),
                None => bytes.push_str(" ??"),
            }
        }
        let mnemonic = format!("{:?}", ins.op).to_uppercase();
        trace!(
            "{pc:04X}  {bytes:<8}  {mnemonic:<4} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            self.a,
            self.x,
            self.y,
            self.status,
            self.sp,
            self.cycles
        );
    }
}

impl CPU<NesBus> {
    /// Step until the PPU finishes a frame, then acknowledge it.
    pub fn run_frame(&mut self) -> Result<(), CpuError> {
        while !self.bus.frame_ready() {
            self.step()?;
        }
        self.bus.clear_frame_ready();
        Ok(())
    }
}
