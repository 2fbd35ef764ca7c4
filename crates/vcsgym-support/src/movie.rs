//! Input movies: a start snapshot plus the actions stepped from it.
//!
//! Because stepping is deterministic, a movie fully describes a trajectory.
//! Replaying it against any interface loaded with the same cartridge and the
//! same stepping settings reproduces every reward and terminal flag. Any
//! other interface refuses the start snapshot with a state mismatch.

use serde::{Deserialize, Serialize};
use vcsgym_core::{Action, Interface, Reward, Snapshot};

use crate::{
    checkpoint::{pack, unpack},
    error::SupportError,
};

pub const MAGIC: &[u8; 8] = b"VCSMOVI\x01";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub start: Snapshot,
    pub actions: Vec<Action>,
}

/// What a replay produced, one entry per action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub rewards: Vec<Reward>,
    pub terminals: Vec<bool>,
    pub final_state: Snapshot,
}

impl ReplayReport {
    pub fn total_reward(&self) -> i64 {
        self.rewards.iter().map(|&r| i64::from(r)).sum()
    }

    /// Index of the first frame where the two reports disagree.
    ///
    /// Reports of different length diverge where the shorter one ends.
    /// Identical step outputs with different final states diverge after the last frame.
    pub fn first_divergence(&self, other: &ReplayReport) -> Option<usize> {
        let steps = self.rewards.iter().zip(&self.terminals);
        let other_steps = other.rewards.iter().zip(&other.terminals);
        if let Some(frame) = steps.zip(other_steps).position(|(a, b)| a != b) {
            return Some(frame);
        }
        let shorter = self.rewards.len().min(other.rewards.len());
        if self.rewards.len() != other.rewards.len() || self.final_state != other.final_state {
            return Some(shorter);
        }
        None
    }
}

impl Movie {
    /// Records `actions` from the interface's current state.
    pub fn record(
        ale: &mut Interface,
        actions: &[Action],
    ) -> Result<(Movie, ReplayReport), SupportError> {
        let movie = Movie {
            start: ale.clone_state()?,
            actions: actions.to_vec(),
        };
        let report = movie.step_all(ale)?;
        Ok((movie, report))
    }

    /// Restores the start snapshot and steps every action.
    pub fn replay(&self, ale: &mut Interface) -> Result<ReplayReport, SupportError> {
        ale.restore_state(&self.start)?;
        self.step_all(ale)
    }

    /// Replays twice and checks both runs are bit-identical.
    pub fn verify(&self, ale: &mut Interface) -> Result<ReplayReport, SupportError> {
        let first = self.replay(ale)?;
        let second = self.replay(ale)?;
        if let Some(frame) = first.first_divergence(&second) {
            tracing::warn!(frame, frames = self.actions.len(), "movie replay diverged");
            return Err(SupportError::Desync { frame });
        }
        Ok(first)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SupportError> {
        Ok(pack(MAGIC, &postcard::to_stdvec(self)?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SupportError> {
        let raw = unpack(MAGIC, "movie", bytes)?;
        Ok(postcard::from_bytes(&raw)?)
    }

    fn step_all(&self, ale: &mut Interface) -> Result<ReplayReport, SupportError> {
        let mut rewards = Vec::with_capacity(self.actions.len());
        let mut terminals = Vec::with_capacity(self.actions.len());
        for &action in &self.actions {
            rewards.push(ale.act(action)?);
            terminals.push(ale.game_over()?);
        }
        Ok(ReplayReport {
            rewards,
            terminals,
            final_state: ale.clone_state()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcsgym_core::demo;

    fn dodge() -> Interface {
        let mut ale = Interface::new();
        ale.load_rom_bytes(&demo::dodge_cartridge().expect("cartridge"))
            .expect("load");
        ale
    }

    #[test]
    fn bytes_round_trip() {
        let mut ale = dodge();
        let (movie, _) = Movie::record(&mut ale, &[Action::Left, Action::Right]).expect("record");
        let bytes = movie.to_bytes().expect("encode");
        assert_eq!(Movie::from_bytes(&bytes).expect("decode"), movie);
        assert!(Movie::from_bytes(&bytes[1..]).is_err());
    }

    #[test]
    fn divergence_is_located() {
        let mut ale = dodge();
        let (movie, report) = Movie::record(&mut ale, &[Action::Noop; 5]).expect("record");
        assert_eq!(report.first_divergence(&report), None);

        let mut tampered = report.clone();
        tampered.rewards[3] += 1;
        assert_eq!(report.first_divergence(&tampered), Some(3));

        let mut shorter = report.clone();
        shorter.rewards.truncate(2);
        shorter.terminals.truncate(2);
        assert_eq!(report.first_divergence(&shorter), Some(2));
        assert_eq!(movie.len(), 5);
    }
}
