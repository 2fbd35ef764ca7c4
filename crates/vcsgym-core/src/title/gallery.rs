//! Shooting gallery: line the gun up with the target and fire.

use crate::{
    action::{Action, ActionSet},
    title::{Reward, TitleAdapter, peek, peek_u16},
};

pub const TAG: &str = "GALLERY";

/// Working-memory layout shared with the cartridge program.
pub mod ram {
    /// 0 = attract, 1 = playing, 2 = game over.
    pub const MODE: u8 = 0x00;
    pub const PLAYER_Y: u8 = 0x01;
    pub const TARGET_Y: u8 = 0x02;
    pub const AMMO: u8 = 0x03;
    pub const SCORE_LO: u8 = 0x04;
    pub const SCORE_HI: u8 = 0x05;
    pub const COOLDOWN: u8 = 0x06;
    pub const TICK: u8 = 0x07;
    pub const INPUT: u8 = 0x08;
    pub const MOVE_DELAY: u8 = 0x09;
    pub const TMP: u8 = 0x0A;
}

pub const MODE_PLAYING: u8 = 1;
pub const MODE_OVER: u8 = 2;
pub const STARTING_AMMO: u8 = 20;
pub const POINTS_PER_HIT: u8 = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct Gallery;

impl Gallery {
    pub fn score(memory: &[u8]) -> u16 {
        peek_u16(memory, ram::SCORE_LO, ram::SCORE_HI)
    }
}

impl TitleAdapter for Gallery {
    fn name(&self) -> &str {
        "Gallery"
    }

    fn minimal_actions(&self) -> ActionSet {
        [Action::Noop, Action::Up, Action::Down, Action::Fire]
            .into_iter()
            .collect()
    }

    fn reward(&self, previous: &[u8], current: &[u8]) -> Reward {
        Reward::from(Self::score(current)) - Reward::from(Self::score(previous))
    }

    fn is_terminal(&self, memory: &[u8]) -> bool {
        peek(memory, ram::MODE) == MODE_OVER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_is_score_delta_across_the_high_byte() {
        let mut before = [0u8; 16];
        before[ram::SCORE_LO as usize] = 250;
        let mut after = before;
        after[ram::SCORE_LO as usize] = 4;
        after[ram::SCORE_HI as usize] = 1;
        assert_eq!(Gallery.reward(&before, &after), 10);
    }

    #[test]
    fn game_over_mode_is_terminal() {
        let mut mem = [0u8; 16];
        assert!(!Gallery.is_terminal(&mem));
        mem[ram::MODE as usize] = MODE_OVER;
        assert!(Gallery.is_terminal(&mem));
    }
}
