//! Snapshot values.
//!
//! A [`Snapshot`] is a self-contained value: the engine's opaque state blob
//! plus the environment's own bookkeeping. It holds no reference to the
//! environment that produced it, so any number of snapshots can coexist,
//! be compared, or be moved across threads.

use serde::{Deserialize, Serialize};

use crate::{action::Action, error::Result, rng::SplitMix64};

/// Bumped whenever the snapshot layout changes.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 2;

/// Identifies the cartridge and stepping configuration a snapshot was taken under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub format_version: u32,
    /// Cartridge title tag.
    pub title: String,
    /// CRC-32 of the cartridge image.
    pub cartridge_crc32: u32,
    /// [`EnvConfig::digest`](crate::settings::EnvConfig::digest) of the latched settings.
    pub config_digest: u32,
}

impl SnapshotMeta {
    pub(crate) fn describe(&self) -> String {
        format!(
            "{} (crc {:08x}, config {:08x}, format v{})",
            self.title, self.cartridge_crc32, self.config_digest, self.format_version
        )
    }
}

/// Sticky-action memory: the action the console actually received last,
/// and the generator deciding whether it repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickyState {
    pub last_action: Action,
    pub rng: SplitMix64,
}

impl StickyState {
    pub fn new(seed: u64) -> Self {
        Self {
            last_action: Action::Noop,
            rng: SplitMix64::new(seed),
        }
    }

    /// Returns the action that reaches the console when `requested` is asked for.
    ///
    /// The generator only advances when `repeat_probability` is positive, so
    /// runs without sticky actions never consume it.
    pub fn resolve(&mut self, requested: Action, repeat_probability: f64) -> Action {
        let executed = if repeat_probability > 0.0 && self.rng.next_f64() < repeat_probability {
            self.last_action
        } else {
            requested
        };
        self.last_action = executed;
        executed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub(crate) meta: SnapshotMeta,
    pub(crate) engine: Vec<u8>,
    pub(crate) frame_number: u64,
    pub(crate) episode_frame_number: u64,
    pub(crate) terminal: bool,
    pub(crate) sticky: StickyState,
}

impl Snapshot {
    pub fn meta(&self) -> &SnapshotMeta {
        &self.meta
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn episode_frame_number(&self) -> u64 {
        self.episode_frame_number
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Opaque engine state.
    pub fn engine_state(&self) -> &[u8] {
        &self.engine
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(postcard::to_stdvec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(postcard::from_bytes(bytes)?)
    }
}
