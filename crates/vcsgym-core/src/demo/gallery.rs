use crate::{
    cartridge::CartridgeError,
    controller::ControlLines,
    machine::{Assembler, Opcode},
    title::gallery::{MODE_OVER, MODE_PLAYING, POINTS_PER_HIT, STARTING_AMMO, ram},
};

use super::{bar, frame_loop, load_scaled};

const MOVE_DELAY: u8 = 3;
const FIRE_COOLDOWN: u8 = 8;
const LANES: u8 = 8;

pub(super) fn program() -> Result<Vec<u8>, CartridgeError> {
    let mut asm = Assembler::new();
    frame_loop(&mut asm, ram::MODE, ram::INPUT, MODE_PLAYING);

    asm.label("new_game")
        .op8(Opcode::LdaImm, MODE_PLAYING)
        .op8(Opcode::StaZp, ram::MODE)
        .op8(Opcode::LdaImm, LANES / 2)
        .op8(Opcode::StaZp, ram::PLAYER_Y)
        .op(Opcode::Rnd)
        .op8(Opcode::AndImm, LANES - 1)
        .op8(Opcode::StaZp, ram::TARGET_Y)
        .op8(Opcode::LdaImm, STARTING_AMMO)
        .op8(Opcode::StaZp, ram::AMMO)
        .op8(Opcode::LdaImm, 0)
        .op8(Opcode::StaZp, ram::SCORE_LO)
        .op8(Opcode::StaZp, ram::SCORE_HI)
        .op8(Opcode::StaZp, ram::COOLDOWN)
        .op8(Opcode::StaZp, ram::TICK)
        .op8(Opcode::StaZp, ram::MOVE_DELAY)
        .op(Opcode::Rts);

    // Target hops to a random lane every 16 ticks.
    asm.label("play")
        .op8(Opcode::IncZp, ram::TICK)
        .op8(Opcode::LdaZp, ram::TICK)
        .op8(Opcode::AndImm, 0x0F)
        .branch(Opcode::Bne, "steer")
        .op(Opcode::Rnd)
        .op8(Opcode::AndImm, LANES - 1)
        .op8(Opcode::StaZp, ram::TARGET_Y);

    asm.label("steer")
        .op8(Opcode::LdaZp, ram::MOVE_DELAY)
        .branch(Opcode::Beq, "can_move")
        .op8(Opcode::DecZp, ram::MOVE_DELAY)
        .branch(Opcode::Jmp, "trigger")
        .label("can_move")
        .op8(Opcode::LdaZp, ram::INPUT)
        .op8(Opcode::AndImm, ControlLines::UP.bits())
        .branch(Opcode::Beq, "not_up")
        .op8(Opcode::LdaZp, ram::PLAYER_Y)
        .branch(Opcode::Beq, "moved")
        .op8(Opcode::DecZp, ram::PLAYER_Y)
        .branch(Opcode::Jmp, "moved")
        .label("not_up")
        .op8(Opcode::LdaZp, ram::INPUT)
        .op8(Opcode::AndImm, ControlLines::DOWN.bits())
        .branch(Opcode::Beq, "trigger")
        .op8(Opcode::LdaZp, ram::PLAYER_Y)
        .op8(Opcode::CmpImm, LANES - 1)
        .branch(Opcode::Bcs, "moved")
        .op8(Opcode::IncZp, ram::PLAYER_Y)
        .label("moved")
        .op8(Opcode::LdaImm, MOVE_DELAY)
        .op8(Opcode::StaZp, ram::MOVE_DELAY);

    asm.label("trigger")
        .op8(Opcode::LdaZp, ram::COOLDOWN)
        .branch(Opcode::Beq, "can_fire")
        .op8(Opcode::DecZp, ram::COOLDOWN)
        .op(Opcode::Rts)
        .label("can_fire")
        .op8(Opcode::LdaZp, ram::INPUT)
        .op8(Opcode::AndImm, ControlLines::FIRE.bits())
        .branch(Opcode::Beq, "play_done")
        .op8(Opcode::LdaImm, FIRE_COOLDOWN)
        .op8(Opcode::StaZp, ram::COOLDOWN)
        .op8(Opcode::DecZp, ram::AMMO)
        .op8(Opcode::LdaZp, ram::PLAYER_Y)
        .op8(Opcode::CmpZp, ram::TARGET_Y)
        .branch(Opcode::Bne, "out_of_ammo")
        .op8(Opcode::LdaZp, ram::SCORE_LO)
        .op8(Opcode::AddImm, POINTS_PER_HIT)
        .op8(Opcode::StaZp, ram::SCORE_LO)
        .branch(Opcode::Bcc, "new_target")
        .op8(Opcode::IncZp, ram::SCORE_HI)
        .label("new_target")
        .op(Opcode::Rnd)
        .op8(Opcode::AndImm, LANES - 1)
        .op8(Opcode::StaZp, ram::TARGET_Y)
        .label("out_of_ammo")
        .op8(Opcode::LdaZp, ram::AMMO)
        .branch(Opcode::Bne, "play_done")
        .op8(Opcode::LdaImm, MODE_OVER)
        .op8(Opcode::StaZp, ram::MODE)
        .label("play_done")
        .op(Opcode::Rts);

    // Lanes are four pixels tall; ammo runs along the bottom.
    asm.label("render").op8(Opcode::LdaImm, 0).op(Opcode::Cls);
    load_scaled(&mut asm, ram::PLAYER_Y, ram::TMP, 2);
    asm.op(Opcode::Tay)
        .op8(Opcode::LdaImm, 1)
        .op8(Opcode::LdxImm, 4)
        .op(Opcode::Plot)
        .op8(Opcode::LdxImm, 5)
        .op(Opcode::Plot);
    load_scaled(&mut asm, ram::TARGET_Y, ram::TMP, 2);
    asm.op(Opcode::Tay)
        .op8(Opcode::LdaImm, 2)
        .op8(Opcode::LdxImm, 56)
        .op(Opcode::Plot);
    bar(&mut asm, ram::AMMO, 46, 3, "ammo_done", "ammo_bar");
    asm.op(Opcode::Rts);

    Ok(asm.finish()?)
}
