//! A tiny two-pass assembler for VCS-8 programs.
//!
//! ```
//! use vcsgym_core::machine::{Assembler, Opcode};
//!
//! let mut asm = Assembler::new();
//! asm.label("frame")
//!     .op8(Opcode::IncZp, 0x00)
//!     .op(Opcode::Sync)
//!     .branch(Opcode::Jmp, "frame");
//! let program = asm.finish().unwrap();
//! assert_eq!(program.len(), 6);
//! ```

use std::collections::HashMap;

use thiserror::Error;

use super::opcode::{Opcode, Operand};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmError {
    #[error("label `{0}` defined twice")]
    DuplicateLabel(String),
    #[error("label `{0}` is never defined")]
    UndefinedLabel(String),
    #[error("`{0:?}` does not take that operand")]
    OperandMismatch(Opcode),
    #[error("program exceeds the 64 KiB address space")]
    TooLarge,
}

#[derive(Debug, Default)]
pub struct Assembler {
    code: Vec<u8>,
    labels: HashMap<String, u16>,
    /// Operand offsets waiting for a label address.
    fixups: Vec<(usize, String)>,
    error: Option<AsmError>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current program address.
    pub fn here(&self) -> usize {
        self.code.len()
    }

    pub fn label(&mut self, name: &str) -> &mut Self {
        let Ok(addr) = u16::try_from(self.code.len()) else {
            return self.fail(AsmError::TooLarge);
        };
        if self.labels.insert(name.to_string(), addr).is_some() {
            return self.fail(AsmError::DuplicateLabel(name.to_string()));
        }
        self
    }

    /// Emits an instruction without operand.
    pub fn op(&mut self, opcode: Opcode) -> &mut Self {
        if opcode.operand() != Operand::None {
            return self.fail(AsmError::OperandMismatch(opcode));
        }
        self.code.push(opcode as u8);
        self
    }

    /// Emits an instruction with an immediate or zero-page operand.
    pub fn op8(&mut self, opcode: Opcode, operand: u8) -> &mut Self {
        if opcode.operand() != Operand::Byte {
            return self.fail(AsmError::OperandMismatch(opcode));
        }
        self.code.extend_from_slice(&[opcode as u8, operand]);
        self
    }

    /// Emits a jump, call or branch to `label`, which may be defined later.
    pub fn branch(&mut self, opcode: Opcode, label: &str) -> &mut Self {
        if opcode.operand() != Operand::Address {
            return self.fail(AsmError::OperandMismatch(opcode));
        }
        self.code.push(opcode as u8);
        self.fixups.push((self.code.len(), label.to_string()));
        self.code.extend_from_slice(&[0, 0]);
        self
    }

    /// Resolves labels and returns the program image.
    ///
    /// Reports the first error encountered while building, if any.
    pub fn finish(self) -> Result<Vec<u8>, AsmError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.code.len() > u16::MAX as usize + 1 {
            return Err(AsmError::TooLarge);
        }
        let mut code = self.code;
        for (at, name) in &self.fixups {
            let addr = self
                .labels
                .get(name)
                .ok_or_else(|| AsmError::UndefinedLabel(name.clone()))?;
            code[*at..*at + 2].copy_from_slice(&addr.to_le_bytes());
        }
        Ok(code)
    }

    fn fail(&mut self, err: AsmError) -> &mut Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }
}
