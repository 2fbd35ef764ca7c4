//! Cartridge images for the built-in titles.
//!
//! Both programs share a skeleton: sample the input port once per frame,
//! start a new game while the console reset switch is held, run one tick of
//! game logic while playing, redraw, and `SYNC`.

use crate::{
    cartridge::{Cartridge, CartridgeError},
    machine::{Assembler, Opcode},
    title,
};

mod dodge;
mod gallery;

/// A built-in cartridge: file stem and image builder.
pub type DemoBuilder = fn() -> Result<Vec<u8>, CartridgeError>;

/// Every built-in cartridge, keyed by title tag.
pub const CARTRIDGES: [(&str, DemoBuilder); 2] = [
    (title::gallery::TAG, gallery_cartridge),
    (title::dodge::TAG, dodge_cartridge),
];

/// Loadable image of the `GALLERY` title.
pub fn gallery_cartridge() -> Result<Vec<u8>, CartridgeError> {
    Cartridge::build(title::gallery::TAG, &gallery::program()?)
}

/// Loadable image of the `DODGE` title.
pub fn dodge_cartridge() -> Result<Vec<u8>, CartridgeError> {
    Cartridge::build(title::dodge::TAG, &dodge::program()?)
}

/// Emits the shared frame loop. `play` and `render` are subroutine labels,
/// `new_game` is called every frame the reset switch is held.
fn frame_loop(asm: &mut Assembler, mode: u8, input: u8, playing: u8) {
    asm.op8(Opcode::LdaImm, 0)
        .op8(Opcode::StaZp, mode)
        .label("main")
        .op(Opcode::Inp)
        .op8(Opcode::StaZp, input)
        .op8(Opcode::AndImm, 0x80)
        .branch(Opcode::Beq, "no_reset")
        .branch(Opcode::Jsr, "new_game")
        .branch(Opcode::Jmp, "frame_end")
        .label("no_reset")
        .op8(Opcode::LdaZp, mode)
        .op8(Opcode::CmpImm, playing)
        .branch(Opcode::Bne, "frame_end")
        .branch(Opcode::Jsr, "play")
        .label("frame_end")
        .branch(Opcode::Jsr, "render")
        .op(Opcode::Sync)
        .branch(Opcode::Jmp, "main");
}

/// Leaves `ram[zp] << shifts` in A, using `tmp` as scratch.
fn load_scaled(asm: &mut Assembler, zp: u8, tmp: u8, shifts: u8) {
    asm.op8(Opcode::LdaZp, zp);
    for _ in 0..shifts {
        asm.op8(Opcode::StaZp, tmp).op8(Opcode::AddZp, tmp);
    }
}

/// Plots `ram[count]` pixels of `color` along row `row`, from column `count` down to 1.
fn bar(asm: &mut Assembler, count: u8, row: u8, color: u8, done: &str, repeat: &str) {
    asm.op8(Opcode::LdxZp, count)
        .branch(Opcode::Beq, done)
        .op8(Opcode::LdyImm, row)
        .op8(Opcode::LdaImm, color)
        .label(repeat)
        .op(Opcode::Plot)
        .op(Opcode::Dex)
        .branch(Opcode::Bne, repeat)
        .label(done);
}
