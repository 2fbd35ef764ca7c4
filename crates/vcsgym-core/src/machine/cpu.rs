use serde::{Deserialize, Serialize};

use crate::{
    controller::ControlLines,
    machine::{RAM_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH, opcode::Opcode, status::Status},
    rng::SplitMix64,
};

/// Depth of the hardware return stack used by `JSR`/`RTS`.
pub(crate) const STACK_DEPTH: usize = 8;

const RAM_MASK: usize = RAM_SIZE - 1;

/// Everything the CPU can touch while executing one frame.
pub(crate) struct Bus<'a> {
    pub(crate) ram: &'a mut [u8; RAM_SIZE],
    pub(crate) frame_buffer: &'a mut [u8],
    pub(crate) program: &'a [u8],
    pub(crate) rng: &'a mut SplitMix64,
    pub(crate) input: ControlLines,
}

impl Bus<'_> {
    #[inline]
    fn read_ram(&self, zp: u8) -> u8 {
        self.ram[zp as usize & RAM_MASK]
    }

    #[inline]
    fn write_ram(&mut self, zp: u8, data: u8) {
        self.ram[zp as usize & RAM_MASK] = data;
    }

    /// Reads past the end of the program see `HLT`.
    #[inline]
    fn fetch(&self, pc: u16) -> u8 {
        self.program
            .get(pc as usize)
            .copied()
            .unwrap_or(Opcode::Hlt as u8)
    }

    fn plot(&mut self, x: u8, y: u8, color: u8) {
        let col = x as usize % SCREEN_WIDTH;
        let row = y as usize % SCREEN_HEIGHT;
        self.frame_buffer[row * SCREEN_WIDTH + col] = color;
    }
}

/// Outcome of executing a single instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Continue,
    EndOfFrame,
    /// The CPU jammed on this instruction.
    Jammed { pc: u16, opcode: u8 },
    /// The CPU was already jammed; nothing executed.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cpu {
    a: u8,
    x: u8,
    y: u8,
    pc: u16,
    p: Status,
    stack: [u16; STACK_DEPTH],
    sp: u8,
    jammed: bool,
}

/// Serializable register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CpuState {
    pub(crate) a: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) pc: u16,
    /// Raw status bits (N-----ZC).
    pub(crate) p: u8,
    pub(crate) stack: [u16; STACK_DEPTH],
    pub(crate) sp: u8,
    pub(crate) jammed: bool,
}

impl Cpu {
    /// Power-on register state: everything cleared, execution starts at address 0.
    pub(crate) fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            p: Status::empty(),
            stack: [0; STACK_DEPTH],
            sp: 0,
            jammed: false,
        }
    }

    pub(crate) fn pc(&self) -> u16 {
        self.pc
    }

    pub(crate) fn is_jammed(&self) -> bool {
        self.jammed
    }

    pub(crate) fn save_state(&self) -> CpuState {
        CpuState {
            a: self.a,
            x: self.x,
            y: self.y,
            pc: self.pc,
            p: self.p.bits(),
            stack: self.stack,
            sp: self.sp,
            jammed: self.jammed,
        }
    }

    pub(crate) fn load_state(&mut self, state: &CpuState) {
        self.a = state.a;
        self.x = state.x;
        self.y = state.y;
        self.pc = state.pc;
        self.p = Status::from_bits_truncate(state.p);
        self.stack = state.stack;
        self.sp = state.sp;
        self.jammed = state.jammed;
    }

    #[inline]
    fn fetch_byte(&mut self, bus: &Bus<'_>) -> u8 {
        let byte = bus.fetch(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    #[inline]
    fn fetch_addr(&mut self, bus: &Bus<'_>) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn jam(&mut self, pc: u16, opcode: u8) -> Step {
        self.jammed = true;
        self.pc = pc;
        Step::Jammed { pc, opcode }
    }

    fn load_a(&mut self, value: u8) {
        self.a = value;
        self.p.update_zero_negative(value);
    }

    fn add(&mut self, value: u8) {
        let (sum, carry) = self.a.overflowing_add(value);
        self.p.set_carry(carry);
        self.load_a(sum);
    }

    fn sub(&mut self, value: u8) {
        self.p.set_carry(self.a >= value);
        self.load_a(self.a.wrapping_sub(value));
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.p.set_carry(register >= value);
        self.p.update_zero_negative(register.wrapping_sub(value));
    }

    fn branch(&mut self, bus: &Bus<'_>, taken: bool) {
        let target = self.fetch_addr(bus);
        if taken {
            self.pc = target;
        }
    }

    /// Executes one instruction.
    pub(crate) fn step(&mut self, bus: &mut Bus<'_>) -> Step {
        if self.jammed {
            return Step::Halted;
        }

        let at = self.pc;
        let byte = self.fetch_byte(bus);
        let Some(op) = Opcode::from_byte(byte) else {
            return self.jam(at, byte);
        };

        match op {
            Opcode::Nop => {}

            Opcode::LdaImm => {
                let v = self.fetch_byte(bus);
                self.load_a(v);
            }
            Opcode::LdaZp => {
                let zp = self.fetch_byte(bus);
                self.load_a(bus.read_ram(zp));
            }
            Opcode::LdaZpX => {
                let zp = self.fetch_byte(bus);
                self.load_a(bus.read_ram(zp.wrapping_add(self.x)));
            }
            Opcode::StaZp => {
                let zp = self.fetch_byte(bus);
                bus.write_ram(zp, self.a);
            }
            Opcode::StaZpX => {
                let zp = self.fetch_byte(bus);
                bus.write_ram(zp.wrapping_add(self.x), self.a);
            }
            Opcode::LdxImm => {
                self.x = self.fetch_byte(bus);
                self.p.update_zero_negative(self.x);
            }
            Opcode::LdxZp => {
                let zp = self.fetch_byte(bus);
                self.x = bus.read_ram(zp);
                self.p.update_zero_negative(self.x);
            }
            Opcode::StxZp => {
                let zp = self.fetch_byte(bus);
                bus.write_ram(zp, self.x);
            }
            Opcode::LdyImm => {
                self.y = self.fetch_byte(bus);
                self.p.update_zero_negative(self.y);
            }
            Opcode::LdyZp => {
                let zp = self.fetch_byte(bus);
                self.y = bus.read_ram(zp);
                self.p.update_zero_negative(self.y);
            }
            Opcode::StyZp => {
                let zp = self.fetch_byte(bus);
                bus.write_ram(zp, self.y);
            }
            Opcode::Tax => {
                self.x = self.a;
                self.p.update_zero_negative(self.x);
            }
            Opcode::Txa => self.load_a(self.x),
            Opcode::Tay => {
                self.y = self.a;
                self.p.update_zero_negative(self.y);
            }
            Opcode::Tya => self.load_a(self.y),

            Opcode::AddImm => {
                let v = self.fetch_byte(bus);
                self.add(v);
            }
            Opcode::AddZp => {
                let zp = self.fetch_byte(bus);
                self.add(bus.read_ram(zp));
            }
            Opcode::SubImm => {
                let v = self.fetch_byte(bus);
                self.sub(v);
            }
            Opcode::SubZp => {
                let zp = self.fetch_byte(bus);
                self.sub(bus.read_ram(zp));
            }
            Opcode::CmpImm => {
                let v = self.fetch_byte(bus);
                self.compare(self.a, v);
            }
            Opcode::CmpZp => {
                let zp = self.fetch_byte(bus);
                self.compare(self.a, bus.read_ram(zp));
            }
            Opcode::AndImm => {
                let v = self.fetch_byte(bus);
                self.load_a(self.a & v);
            }
            Opcode::OraImm => {
                let v = self.fetch_byte(bus);
                self.load_a(self.a | v);
            }
            Opcode::EorImm => {
                let v = self.fetch_byte(bus);
                self.load_a(self.a ^ v);
            }
            Opcode::IncZp => {
                let zp = self.fetch_byte(bus);
                let v = bus.read_ram(zp).wrapping_add(1);
                bus.write_ram(zp, v);
                self.p.update_zero_negative(v);
            }
            Opcode::DecZp => {
                let zp = self.fetch_byte(bus);
                let v = bus.read_ram(zp).wrapping_sub(1);
                bus.write_ram(zp, v);
                self.p.update_zero_negative(v);
            }
            Opcode::Inx => {
                self.x = self.x.wrapping_add(1);
                self.p.update_zero_negative(self.x);
            }
            Opcode::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.p.update_zero_negative(self.x);
            }
            Opcode::Iny => {
                self.y = self.y.wrapping_add(1);
                self.p.update_zero_negative(self.y);
            }
            Opcode::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.p.update_zero_negative(self.y);
            }
            Opcode::CpxImm => {
                let v = self.fetch_byte(bus);
                self.compare(self.x, v);
            }
            Opcode::CpyImm => {
                let v = self.fetch_byte(bus);
                self.compare(self.y, v);
            }
            Opcode::Lsr => {
                self.p.set_carry(self.a & 0x01 != 0);
                self.load_a(self.a >> 1);
            }

            Opcode::Jmp => self.pc = self.fetch_addr(bus),
            Opcode::Jsr => {
                let target = self.fetch_addr(bus);
                let Some(slot) = self.stack.get_mut(self.sp as usize) else {
                    return self.jam(at, byte);
                };
                *slot = self.pc;
                self.sp += 1;
                self.pc = target;
            }
            Opcode::Rts => {
                if self.sp == 0 {
                    return self.jam(at, byte);
                }
                self.sp -= 1;
                self.pc = self.stack[self.sp as usize];
            }
            Opcode::Beq => self.branch(bus, self.p.contains(Status::ZERO)),
            Opcode::Bne => self.branch(bus, !self.p.contains(Status::ZERO)),
            Opcode::Bcs => self.branch(bus, self.p.contains(Status::CARRY)),
            Opcode::Bcc => self.branch(bus, !self.p.contains(Status::CARRY)),
            Opcode::Bmi => self.branch(bus, self.p.contains(Status::NEGATIVE)),
            Opcode::Bpl => self.branch(bus, !self.p.contains(Status::NEGATIVE)),

            Opcode::Inp => self.load_a(bus.input.bits()),
            Opcode::Rnd => {
                let v = bus.rng.next_u8();
                self.load_a(v);
            }
            Opcode::Plot => bus.plot(self.x, self.y, self.a),
            Opcode::Cls => bus.frame_buffer.fill(self.a),
            Opcode::Sync => return Step::EndOfFrame,

            Opcode::Hlt => return self.jam(at, byte),
        }

        Step::Continue
    }
}
