//! VCS-8 instruction set.
//!
//! Operands follow the opcode byte. `Imm`/`Zp` forms take one byte;
//! jumps and branches take an absolute little-endian program address.
//! Zero-page operands address the 128 bytes of working RAM (masked to 7 bits).

/// Operand shape of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    Byte,
    Address,
}

impl Operand {
    pub const fn byte_len(self) -> usize {
        match self {
            Operand::None => 0,
            Operand::Byte => 1,
            Operand::Address => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0x00,

    LdaImm = 0x01,
    LdaZp = 0x02,
    /// `A = ram[zp + X]`
    LdaZpX = 0x03,
    StaZp = 0x04,
    /// `ram[zp + X] = A`
    StaZpX = 0x05,
    LdxImm = 0x06,
    LdxZp = 0x07,
    StxZp = 0x08,
    LdyImm = 0x09,
    LdyZp = 0x0A,
    StyZp = 0x0B,
    Tax = 0x0C,
    Txa = 0x0D,
    Tay = 0x0E,
    Tya = 0x0F,

    AddImm = 0x10,
    AddZp = 0x11,
    SubImm = 0x12,
    SubZp = 0x13,
    CmpImm = 0x14,
    CmpZp = 0x15,
    AndImm = 0x16,
    OraImm = 0x17,
    EorImm = 0x18,
    IncZp = 0x19,
    DecZp = 0x1A,
    Inx = 0x1B,
    Dex = 0x1C,
    Iny = 0x1D,
    Dey = 0x1E,
    CpxImm = 0x1F,
    CpyImm = 0x20,
    /// Logical shift right of A; bit 0 goes to carry.
    Lsr = 0x21,

    Jmp = 0x30,
    Jsr = 0x31,
    Rts = 0x32,
    Beq = 0x33,
    Bne = 0x34,
    Bcs = 0x35,
    Bcc = 0x36,
    Bmi = 0x37,
    Bpl = 0x38,

    /// `A = input port`
    Inp = 0x40,
    /// `A = hardware random byte`
    Rnd = 0x41,
    /// Writes A to the frame buffer at column X, row Y (both wrap).
    Plot = 0x42,
    /// Fills the frame buffer with A.
    Cls = 0x43,
    /// Ends the current video frame.
    Sync = 0x44,

    /// Jams the CPU until the next power cycle or state restore.
    Hlt = 0xFF,
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        use Opcode::*;

        let op = match byte {
            0x00 => Nop,
            0x01 => LdaImm,
            0x02 => LdaZp,
            0x03 => LdaZpX,
            0x04 => StaZp,
            0x05 => StaZpX,
            0x06 => LdxImm,
            0x07 => LdxZp,
            0x08 => StxZp,
            0x09 => LdyImm,
            0x0A => LdyZp,
            0x0B => StyZp,
            0x0C => Tax,
            0x0D => Txa,
            0x0E => Tay,
            0x0F => Tya,
            0x10 => AddImm,
            0x11 => AddZp,
            0x12 => SubImm,
            0x13 => SubZp,
            0x14 => CmpImm,
            0x15 => CmpZp,
            0x16 => AndImm,
            0x17 => OraImm,
            0x18 => EorImm,
            0x19 => IncZp,
            0x1A => DecZp,
            0x1B => Inx,
            0x1C => Dex,
            0x1D => Iny,
            0x1E => Dey,
            0x1F => CpxImm,
            0x20 => CpyImm,
            0x21 => Lsr,
            0x30 => Jmp,
            0x31 => Jsr,
            0x32 => Rts,
            0x33 => Beq,
            0x34 => Bne,
            0x35 => Bcs,
            0x36 => Bcc,
            0x37 => Bmi,
            0x38 => Bpl,
            0x40 => Inp,
            0x41 => Rnd,
            0x42 => Plot,
            0x43 => Cls,
            0x44 => Sync,
            0xFF => Hlt,
            _ => return None,
        };
        Some(op)
    }

    pub const fn operand(self) -> Operand {
        use Opcode::*;

        match self {
            LdaImm | LdaZp | LdaZpX | StaZp | StaZpX | LdxImm | LdxZp | StxZp | LdyImm | LdyZp
            | StyZp | AddImm | AddZp | SubImm | SubZp | CmpImm | CmpZp | AndImm | OraImm
            | EorImm | IncZp | DecZp | CpxImm | CpyImm => Operand::Byte,
            Jmp | Jsr | Beq | Bne | Bcs | Bcc | Bmi | Bpl => Operand::Address,
            Nop | Tax | Txa | Tay | Tya | Inx | Dex | Iny | Dey | Lsr | Rts | Inp | Rnd | Plot
            | Cls | Sync | Hlt => Operand::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_defined_byte_round_trips() {
        for byte in 0..=u8::MAX {
            if let Some(op) = Opcode::from_byte(byte) {
                assert_eq!(op as u8, byte);
            }
        }
    }

    #[test]
    fn undefined_bytes_decode_to_none() {
        assert_eq!(Opcode::from_byte(0x22), None);
        assert_eq!(Opcode::from_byte(0xFE), None);
    }
}
