use crate::{
    cartridge::CartridgeError,
    controller::ControlLines,
    machine::{Assembler, Opcode},
    title::dodge::{MODE_OVER, MODE_PLAYING, STARTING_LIVES, ram},
};

use super::{bar, frame_loop, load_scaled};

const MOVE_DELAY: u8 = 2;
const COLUMNS: u8 = 8;
/// Row at which a falling rock reaches the player.
const GROUND_ROW: u8 = 11;

pub(super) fn program() -> Result<Vec<u8>, CartridgeError> {
    let mut asm = Assembler::new();
    frame_loop(&mut asm, ram::MODE, ram::INPUT, MODE_PLAYING);

    asm.label("new_game")
        .op8(Opcode::LdaImm, MODE_PLAYING)
        .op8(Opcode::StaZp, ram::MODE)
        .op8(Opcode::LdaImm, STARTING_LIVES)
        .op8(Opcode::StaZp, ram::LIVES)
        .op8(Opcode::LdaImm, COLUMNS / 2 - 1)
        .op8(Opcode::StaZp, ram::PLAYER_X)
        .op8(Opcode::LdaImm, 0)
        .op8(Opcode::StaZp, ram::DODGED_LO)
        .op8(Opcode::StaZp, ram::DODGED_HI)
        .op8(Opcode::StaZp, ram::TICK)
        .op8(Opcode::StaZp, ram::MOVE_DELAY)
        .op8(Opcode::StaZp, ram::ROCK_Y)
        .op(Opcode::Rnd)
        .op8(Opcode::AndImm, COLUMNS - 1)
        .op8(Opcode::StaZp, ram::ROCK_X)
        .op(Opcode::Rts);

    asm.label("play")
        .op8(Opcode::LdaZp, ram::MOVE_DELAY)
        .branch(Opcode::Beq, "can_move")
        .op8(Opcode::DecZp, ram::MOVE_DELAY)
        .branch(Opcode::Jmp, "fall")
        .label("can_move")
        .op8(Opcode::LdaZp, ram::INPUT)
        .op8(Opcode::AndImm, ControlLines::LEFT.bits())
        .branch(Opcode::Beq, "not_left")
        .op8(Opcode::LdaZp, ram::PLAYER_X)
        .branch(Opcode::Beq, "moved")
        .op8(Opcode::DecZp, ram::PLAYER_X)
        .branch(Opcode::Jmp, "moved")
        .label("not_left")
        .op8(Opcode::LdaZp, ram::INPUT)
        .op8(Opcode::AndImm, ControlLines::RIGHT.bits())
        .branch(Opcode::Beq, "fall")
        .op8(Opcode::LdaZp, ram::PLAYER_X)
        .op8(Opcode::CmpImm, COLUMNS - 1)
        .branch(Opcode::Bcs, "moved")
        .op8(Opcode::IncZp, ram::PLAYER_X)
        .label("moved")
        .op8(Opcode::LdaImm, MOVE_DELAY)
        .op8(Opcode::StaZp, ram::MOVE_DELAY);

    // The rock drops one row every fourth tick.
    asm.label("fall")
        .op8(Opcode::IncZp, ram::TICK)
        .op8(Opcode::LdaZp, ram::TICK)
        .op8(Opcode::AndImm, 0x03)
        .branch(Opcode::Bne, "play_done")
        .op8(Opcode::IncZp, ram::ROCK_Y)
        .op8(Opcode::LdaZp, ram::ROCK_Y)
        .op8(Opcode::CmpImm, GROUND_ROW)
        .branch(Opcode::Bne, "play_done")
        .op8(Opcode::LdaZp, ram::ROCK_X)
        .op8(Opcode::CmpZp, ram::PLAYER_X)
        .branch(Opcode::Bne, "dodged")
        .op8(Opcode::DecZp, ram::LIVES)
        .branch(Opcode::Bne, "respawn")
        .op8(Opcode::LdaImm, MODE_OVER)
        .op8(Opcode::StaZp, ram::MODE)
        .branch(Opcode::Jmp, "respawn")
        .label("dodged")
        .op8(Opcode::IncZp, ram::DODGED_LO)
        .branch(Opcode::Bne, "respawn")
        .op8(Opcode::IncZp, ram::DODGED_HI)
        .label("respawn")
        .op8(Opcode::LdaImm, 0)
        .op8(Opcode::StaZp, ram::ROCK_Y)
        .op(Opcode::Rnd)
        .op8(Opcode::AndImm, COLUMNS - 1)
        .op8(Opcode::StaZp, ram::ROCK_X)
        .label("play_done")
        .op(Opcode::Rts);

    // Columns are eight pixels wide, rows four pixels tall.
    asm.label("render").op8(Opcode::LdaImm, 0).op(Opcode::Cls);
    load_scaled(&mut asm, ram::PLAYER_X, ram::TMP, 3);
    asm.op8(Opcode::AddImm, 4)
        .op(Opcode::Tax)
        .op8(Opcode::LdyImm, GROUND_ROW * 4)
        .op8(Opcode::LdaImm, 1)
        .op(Opcode::Plot);
    load_scaled(&mut asm, ram::ROCK_X, ram::TMP, 3);
    asm.op8(Opcode::AddImm, 4).op(Opcode::Tax);
    load_scaled(&mut asm, ram::ROCK_Y, ram::TMP, 2);
    asm.op(Opcode::Tay).op8(Opcode::LdaImm, 2).op(Opcode::Plot);
    bar(&mut asm, ram::LIVES, 0, 3, "lives_done", "lives_bar");
    asm.op(Opcode::Rts);

    Ok(asm.finish()?)
}
