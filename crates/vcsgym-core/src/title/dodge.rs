//! Dodge: slide left and right to avoid falling rocks.

use crate::{
    action::{Action, ActionSet},
    title::{Reward, TitleAdapter, peek, peek_u16},
};

pub const TAG: &str = "DODGE";

/// Working-memory layout shared with the cartridge program.
pub mod ram {
    /// 0 = attract, 1 = playing, 2 = game over.
    pub const MODE: u8 = 0x00;
    pub const PLAYER_X: u8 = 0x01;
    pub const ROCK_X: u8 = 0x02;
    pub const ROCK_Y: u8 = 0x03;
    pub const LIVES: u8 = 0x04;
    pub const DODGED_LO: u8 = 0x05;
    pub const TICK: u8 = 0x06;
    pub const INPUT: u8 = 0x07;
    pub const TMP: u8 = 0x08;
    pub const MOVE_DELAY: u8 = 0x09;
    pub const DODGED_HI: u8 = 0x0A;
}

pub const MODE_PLAYING: u8 = 1;
pub const MODE_OVER: u8 = 2;
pub const STARTING_LIVES: u8 = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct Dodge;

impl Dodge {
    pub fn dodged(memory: &[u8]) -> u16 {
        peek_u16(memory, ram::DODGED_LO, ram::DODGED_HI)
    }
}

impl TitleAdapter for Dodge {
    fn name(&self) -> &str {
        "Dodge"
    }

    fn minimal_actions(&self) -> ActionSet {
        [Action::Noop, Action::Left, Action::Right]
            .into_iter()
            .collect()
    }

    fn reward(&self, previous: &[u8], current: &[u8]) -> Reward {
        Reward::from(Self::dodged(current)) - Reward::from(Self::dodged(previous))
    }

    fn is_terminal(&self, memory: &[u8]) -> bool {
        peek(memory, ram::MODE) == MODE_OVER
    }

    fn lives(&self, memory: &[u8]) -> Option<u32> {
        Some(peek(memory, ram::LIVES).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lives_come_from_ram() {
        let mut mem = [0u8; 16];
        mem[ram::LIVES as usize] = 2;
        assert_eq!(Dodge.lives(&mem), Some(2));
    }

    #[test]
    fn each_dodged_rock_is_worth_one() {
        let before = [0u8; 16];
        let mut after = before;
        after[ram::DODGED_LO as usize] = 1;
        assert_eq!(Dodge.reward(&before, &after), 1);
    }
}
