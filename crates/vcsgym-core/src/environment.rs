//! The stepping state machine.
//!
//! One [`Environment::act`] is exactly one emulated video frame. The
//! environment owns the engine and the title adapter for the lifetime of a
//! loaded cartridge and keeps the frame and episode counters, the latched
//! terminal flag and the sticky-action state next to them.

use crate::{
    action::{Action, ActionSet},
    cartridge::Cartridge,
    controller::ControlLines,
    engine::{Engine, Screen},
    error::{Error, Result},
    machine::Console,
    rng::SplitMix64,
    settings::EnvConfig,
    state::{SNAPSHOT_FORMAT_VERSION, Snapshot, SnapshotMeta, StickyState},
    title::{Reward, TitleAdapter},
};

#[derive(Debug)]
pub struct Environment {
    engine: Box<dyn Engine>,
    title: Box<dyn TitleAdapter>,
    meta: SnapshotMeta,
    config: EnvConfig,
    legal_actions: ActionSet,
    minimal_actions: ActionSet,
    frame_number: u64,
    episode_frame_number: u64,
    terminal: bool,
    sticky: StickyState,
    /// Memory as it was before the frame in flight; reused across steps.
    previous_memory: Vec<u8>,
}

impl Environment {
    /// Powers on the reference console with `cartridge` and starts the first episode.
    pub fn new(cartridge: &Cartridge, title: Box<dyn TitleAdapter>, config: EnvConfig) -> Self {
        let engine = Box::new(Console::new(cartridge, config.random_seed));
        let meta = SnapshotMeta {
            format_version: SNAPSHOT_FORMAT_VERSION,
            title: cartridge.title().to_string(),
            cartridge_crc32: cartridge.crc32(),
            config_digest: config.digest(),
        };
        Self::with_engine(engine, title, meta, config)
    }

    /// Wraps an arbitrary engine. Snapshots must match `meta` to be
    /// restorable; its config digest is always taken from `config`.
    pub fn with_engine(
        engine: Box<dyn Engine>,
        title: Box<dyn TitleAdapter>,
        mut meta: SnapshotMeta,
        config: EnvConfig,
    ) -> Self {
        meta.config_digest = config.digest();
        let legal_actions = title.legal_actions();
        let mut minimal_actions = title.minimal_actions();
        let declared = minimal_actions.len();
        minimal_actions.retain(|action| legal_actions.contains(*action));
        if minimal_actions.len() != declared {
            tracing::warn!(
                title = title.name(),
                dropped = declared - minimal_actions.len(),
                "minimal actions outside the legal set were dropped"
            );
        }

        let sticky_seed = SplitMix64::new(config.random_seed).next_u64();
        let mut env = Self {
            engine,
            title,
            meta,
            legal_actions,
            minimal_actions,
            frame_number: 0,
            episode_frame_number: 0,
            terminal: false,
            sticky: StickyState::new(sticky_seed),
            previous_memory: Vec::new(),
            config,
        };
        env.reset_episode();
        env
    }

    /// Advances exactly one frame and returns the reward that frame earned.
    ///
    /// Stepping a terminal episode is allowed: the engine keeps running and
    /// the terminal flag stays set until [`Environment::reset_episode`] or
    /// [`Environment::restore`].
    pub fn act(&mut self, action: Action) -> Reward {
        let executed = self
            .sticky
            .resolve(action, self.config.repeat_action_probability);

        self.previous_memory.clear();
        self.previous_memory.extend_from_slice(self.engine.memory());
        self.engine.advance_frame(executed.control_lines());

        let memory = self.engine.memory();
        let reward = self.title.reward(&self.previous_memory, memory);
        self.frame_number += 1;
        self.episode_frame_number += 1;

        let life_lost = self.config.terminal_on_life_loss
            && matches!(
                (self.title.lives(&self.previous_memory), self.title.lives(memory)),
                (Some(before), Some(after)) if after < before
            );
        let truncated = self.config.max_num_frames_per_episode > 0
            && self.episode_frame_number >= self.config.max_num_frames_per_episode;
        self.terminal |= self.title.is_terminal(memory) || life_lost || truncated;

        reward
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Returns the title to the start of an episode by holding the console
    /// reset switch, then playing the title's starting actions.
    ///
    /// The frame counter is untouched; the frames spent here are not counted.
    pub fn reset_episode(&mut self) {
        for _ in 0..self.config.system_reset_steps.max(1) {
            self.engine.advance_frame(ControlLines::RESET);
        }
        self.engine.advance_frame(ControlLines::empty());
        for action in self.title.starting_actions() {
            self.engine.advance_frame(action.control_lines());
        }

        self.episode_frame_number = 0;
        self.terminal = false;
        self.sticky.last_action = Action::Noop;
        tracing::debug!(
            title = self.title.name(),
            frame = self.frame_number,
            "episode reset"
        );
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn episode_frame_number(&self) -> u64 {
        self.episode_frame_number
    }

    pub fn legal_actions(&self) -> &ActionSet {
        &self.legal_actions
    }

    pub fn minimal_actions(&self) -> &ActionSet {
        &self.minimal_actions
    }

    /// Captures engine state and bookkeeping. Observable state is unchanged.
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            meta: self.meta.clone(),
            engine: self.engine.capture_state()?,
            frame_number: self.frame_number,
            episode_frame_number: self.episode_frame_number,
            terminal: self.terminal,
            sticky: self.sticky,
        })
    }

    /// Overwrites engine state, counters, the terminal flag and sticky-action
    /// state from `snapshot`. Nothing changes if the snapshot is rejected.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        if snapshot.meta != self.meta {
            return Err(Error::StateMismatch {
                expected: self.meta.describe(),
                found: snapshot.meta.describe(),
            });
        }
        self.engine.restore_state(&snapshot.engine)?;
        self.frame_number = snapshot.frame_number;
        self.episode_frame_number = snapshot.episode_frame_number;
        self.terminal = snapshot.terminal;
        self.sticky = snapshot.sticky;
        tracing::debug!(frame = self.frame_number, "snapshot restored");
        Ok(())
    }

    /// Frame buffer; valid until the next step or reset.
    pub fn screen(&self) -> Screen<'_> {
        self.engine.screen()
    }

    /// Working memory; valid until the next step or reset.
    pub fn memory(&self) -> &[u8] {
        self.engine.memory()
    }

    pub fn lives(&self) -> Option<u32> {
        self.title.lives(self.engine.memory())
    }

    pub fn title_name(&self) -> &str {
        self.title.name()
    }

    pub fn meta(&self) -> &SnapshotMeta {
        &self.meta
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }
}
