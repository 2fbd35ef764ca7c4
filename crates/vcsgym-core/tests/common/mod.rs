#![allow(dead_code)]

use anyhow::{Result, bail};
use vcsgym_core::{Action, Interface, Reward, demo};

/// Upper bound on frames any helper will step before giving up.
pub const FRAME_LIMIT: usize = 20_000;

pub fn gallery() -> Result<Interface> {
    let mut ale = Interface::new();
    ale.load_rom_bytes(&demo::gallery_cartridge()?)?;
    Ok(ale)
}

pub fn dodge() -> Result<Interface> {
    let mut ale = Interface::new();
    ale.load_rom_bytes(&demo::dodge_cartridge()?)?;
    Ok(ale)
}

/// Repeats `action` until the episode ends; returns the reward sum and frame count.
pub fn play_until_terminal(ale: &mut Interface, action: Action) -> Result<(Reward, usize)> {
    let mut total = 0;
    for frames in 1..=FRAME_LIMIT {
        total += ale.act(action)?;
        if ale.game_over()? {
            return Ok((total, frames));
        }
    }
    bail!("episode did not end within {FRAME_LIMIT} frames")
}

/// Steps `actions` in order, recording each reward and terminal flag.
pub fn trace(ale: &mut Interface, actions: &[Action]) -> Result<Vec<(Reward, bool)>> {
    actions
        .iter()
        .map(|&action| Ok((ale.act(action)?, ale.game_over()?)))
        .collect()
}
