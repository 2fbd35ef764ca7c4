//! The VCS-8 reference console.
//!
//! A deliberately small 8-bit machine: 128 bytes of working RAM, a 64x48
//! palette-indexed frame buffer, and a CPU that executes cartridge programs
//! until they signal the end of a video frame with `SYNC`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    cartridge::Cartridge,
    controller::ControlLines,
    engine::{Engine, EngineError, Screen},
    rng::SplitMix64,
};

pub mod asm;
mod cpu;
mod opcode;
mod status;

pub use asm::{AsmError, Assembler};
pub use opcode::{Opcode, Operand};

use cpu::{Bus, Cpu, CpuState, STACK_DEPTH, Step};

pub const RAM_SIZE: usize = 128;
pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 48;
/// Upper bound on instructions per frame for programs that never `SYNC`.
pub const INSTRUCTIONS_PER_FRAME: usize = 4096;

#[derive(Debug)]
pub struct Console {
    cpu: Cpu,
    ram: [u8; RAM_SIZE],
    frame_buffer: Vec<u8>,
    program: Arc<[u8]>,
    program_crc: u32,
    rng: SplitMix64,
    input: ControlLines,
    frame: u64,
}

/// Serializable dynamic state of a [`Console`]; the program itself is not included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ConsoleState {
    cpu: CpuState,
    ram: Vec<u8>,
    frame_buffer: Vec<u8>,
    rng: SplitMix64,
    input: u8,
    frame: u64,
    program_crc: u32,
}

impl Console {
    /// Powers on a console with `cartridge` inserted.
    ///
    /// Working RAM comes up filled from the hardware random source, so two
    /// different seeds give two different power-on states.
    pub fn new(cartridge: &Cartridge, seed: u64) -> Self {
        let mut rng = SplitMix64::new(seed);
        let mut ram = [0u8; RAM_SIZE];
        rng.fill_bytes(&mut ram);
        Self {
            cpu: Cpu::new(),
            ram,
            frame_buffer: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
            program: Arc::clone(cartridge.program()),
            program_crc: cartridge.crc32(),
            rng,
            input: ControlLines::empty(),
            frame: 0,
        }
    }

    /// Frames executed since power-on.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_jammed(&self) -> bool {
        self.cpu.is_jammed()
    }

    pub fn pc(&self) -> u16 {
        self.cpu.pc()
    }

    fn run_frame(&mut self) {
        let mut bus = Bus {
            ram: &mut self.ram,
            frame_buffer: &mut self.frame_buffer,
            program: &self.program,
            rng: &mut self.rng,
            input: self.input,
        };
        for _ in 0..INSTRUCTIONS_PER_FRAME {
            match self.cpu.step(&mut bus) {
                Step::Continue => {}
                Step::EndOfFrame | Step::Halted => return,
                Step::Jammed { pc, opcode } => {
                    tracing::warn!(pc, opcode, frame = self.frame, "console CPU jammed");
                    return;
                }
            }
        }
    }

    fn save_state(&self) -> ConsoleState {
        ConsoleState {
            cpu: self.cpu.save_state(),
            ram: self.ram.to_vec(),
            frame_buffer: self.frame_buffer.clone(),
            rng: self.rng,
            input: self.input.bits(),
            frame: self.frame,
            program_crc: self.program_crc,
        }
    }

    fn load_state(&mut self, state: ConsoleState) -> Result<(), EngineError> {
        let ram: [u8; RAM_SIZE] = state
            .ram
            .as_slice()
            .try_into()
            .map_err(|_| EngineError::CorruptState("RAM size mismatch"))?;
        if state.frame_buffer.len() != self.frame_buffer.len() {
            return Err(EngineError::CorruptState("frame buffer size mismatch"));
        }
        if state.cpu.sp as usize > STACK_DEPTH {
            return Err(EngineError::CorruptState("return stack pointer out of range"));
        }
        if state.program_crc != self.program_crc {
            return Err(EngineError::CorruptState("state belongs to another cartridge"));
        }

        self.cpu.load_state(&state.cpu);
        self.ram = ram;
        self.frame_buffer = state.frame_buffer;
        self.rng = state.rng;
        self.input = ControlLines::from_bits_truncate(state.input);
        self.frame = state.frame;
        Ok(())
    }
}

impl Engine for Console {
    fn advance_frame(&mut self, lines: ControlLines) {
        self.input = lines;
        self.run_frame();
        self.frame += 1;
    }

    fn memory(&self) -> &[u8] {
        &self.ram
    }

    fn screen(&self) -> Screen<'_> {
        Screen::new(SCREEN_WIDTH, SCREEN_HEIGHT, &self.frame_buffer)
    }

    fn capture_state(&self) -> Result<Vec<u8>, EngineError> {
        postcard::to_stdvec(&self.save_state()).map_err(EngineError::Encode)
    }

    fn restore_state(&mut self, blob: &[u8]) -> Result<(), EngineError> {
        let state: ConsoleState = postcard::from_bytes(blob).map_err(EngineError::Decode)?;
        self.load_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console_for(asm: Assembler, seed: u64) -> Console {
        let program = asm.finish().expect("assemble");
        let image = Cartridge::build("TEST", &program).expect("build");
        let cart = Cartridge::parse(&image).expect("parse");
        Console::new(&cart, seed)
    }

    /// Counts frames in RAM[0] and mirrors the input port into RAM[1].
    fn counter_program() -> Assembler {
        let mut asm = Assembler::new();
        asm.label("loop")
            .op8(Opcode::IncZp, 0x00)
            .op(Opcode::Inp)
            .op8(Opcode::StaZp, 0x01)
            .op(Opcode::Rnd)
            .op8(Opcode::StaZp, 0x02)
            .op(Opcode::Sync)
            .branch(Opcode::Jmp, "loop");
        asm
    }

    #[test]
    fn one_frame_runs_until_sync() {
        let mut console = console_for(counter_program(), 1);
        let start = console.memory()[0];
        console.advance_frame(ControlLines::FIRE);
        console.advance_frame(ControlLines::UP);
        assert_eq!(console.memory()[0], start.wrapping_add(2));
        assert_eq!(console.memory()[1], ControlLines::UP.bits());
        assert_eq!(console.frame(), 2);
    }

    #[test]
    fn restore_replays_identically() {
        let mut console = console_for(counter_program(), 7);
        console.advance_frame(ControlLines::empty());
        let blob = console.capture_state().expect("capture");

        let mut first = Vec::new();
        for _ in 0..5 {
            console.advance_frame(ControlLines::LEFT);
            first.push(console.memory().to_vec());
        }

        console.restore_state(&blob).expect("restore");
        for expected in &first {
            console.advance_frame(ControlLines::LEFT);
            assert_eq!(console.memory(), expected.as_slice());
        }
    }

    #[test]
    fn capture_does_not_disturb_state() {
        let mut console = console_for(counter_program(), 3);
        console.advance_frame(ControlLines::empty());
        let before = console.capture_state().expect("capture");
        let again = console.capture_state().expect("capture");
        assert_eq!(before, again);
    }

    #[test]
    fn seeds_change_power_on_ram() {
        let a = console_for(counter_program(), 1);
        let b = console_for(counter_program(), 2);
        assert_ne!(a.memory(), b.memory());
    }

    #[test]
    fn illegal_opcode_jams_but_frames_still_count() {
        let program = [0xEE];
        let image = Cartridge::build("JAM", &program).expect("build");
        let cart = Cartridge::parse(&image).expect("parse");
        let mut console = Console::new(&cart, 0);
        console.advance_frame(ControlLines::empty());
        console.advance_frame(ControlLines::empty());
        assert!(console.is_jammed());
        assert_eq!(console.pc(), 0);
        assert_eq!(console.frame(), 2);
    }

    #[test]
    fn runaway_program_is_cut_at_instruction_budget() {
        let mut asm = Assembler::new();
        asm.label("spin")
            .op8(Opcode::IncZp, 0x10)
            .op(Opcode::Nop)
            .branch(Opcode::Jmp, "spin");
        let mut console = console_for(asm, 0);
        let start = console.memory()[0x10];
        console.advance_frame(ControlLines::empty());
        // Three instructions per pass; the budget ends right after an increment.
        let increments = INSTRUCTIONS_PER_FRAME.div_ceil(3) as u8;
        assert_eq!(console.memory()[0x10], start.wrapping_add(increments));
    }

    #[test]
    fn plot_and_cls_write_the_frame_buffer() {
        let mut asm = Assembler::new();
        asm.op8(Opcode::LdaImm, 3)
            .op(Opcode::Cls)
            .op8(Opcode::LdaImm, 9)
            .op8(Opcode::LdxImm, 70)
            .op8(Opcode::LdyImm, 2)
            .op(Opcode::Plot)
            .op(Opcode::Sync)
            .op(Opcode::Hlt);
        let mut console = console_for(asm, 0);
        console.advance_frame(ControlLines::empty());
        let screen = console.screen();
        assert_eq!(screen.pixel(0, 0), Some(3));
        assert_eq!(screen.pixel(70 % SCREEN_WIDTH, 2), Some(9));
    }

    #[test]
    fn state_from_another_cartridge_is_rejected() {
        let a = console_for(counter_program(), 0);
        let mut other = Assembler::new();
        other.op(Opcode::Sync).op(Opcode::Hlt);
        let mut b = console_for(other, 0);
        let blob = a.capture_state().expect("capture");
        let before = b.capture_state().expect("capture");
        assert!(matches!(
            b.restore_state(&blob),
            Err(EngineError::CorruptState(_))
        ));
        assert_eq!(b.capture_state().expect("capture"), before);
    }

    #[test]
    fn garbage_blob_fails_to_decode() {
        let mut console = console_for(counter_program(), 0);
        assert!(matches!(
            console.restore_state(&[0xFF; 3]),
            Err(EngineError::Decode(_))
        ));
    }

    #[test]
    fn subroutines_and_branches() {
        let mut asm = Assembler::new();
        asm.op8(Opcode::LdxImm, 3)
            .label("loop")
            .branch(Opcode::Jsr, "bump")
            .op(Opcode::Dex)
            .branch(Opcode::Bne, "loop")
            .op(Opcode::Sync)
            .op(Opcode::Hlt)
            .label("bump")
            .op8(Opcode::LdaZp, 0x20)
            .op8(Opcode::AddImm, 5)
            .op8(Opcode::StaZp, 0x20)
            .op(Opcode::Rts);
        let mut console = console_for(asm, 0);
        let start = console.memory()[0x20];
        console.advance_frame(ControlLines::empty());
        assert_eq!(console.memory()[0x20], start.wrapping_add(15));
        assert!(!console.is_jammed());
    }
}
