//! Agent-facing facade.
//!
//! ```no_run
//! use vcsgym_core::{Action, Interface};
//!
//! let mut ale = Interface::new();
//! ale.set_setting("random_seed", 7i64)?;
//! ale.load_rom("gallery.vcs")?;
//! let mut total = 0;
//! while !ale.game_over()? {
//!     total += ale.act(Action::Fire)?;
//! }
//! println!("episode return: {total}");
//! # Ok::<(), vcsgym_core::Error>(())
//! ```

use std::path::Path;

use crate::{
    action::{Action, ActionSet},
    cartridge::Cartridge,
    engine::Screen,
    environment::Environment,
    error::{Error, LoadError, Result},
    settings::{EnvConfig, SettingValue, Settings},
    state::Snapshot,
    title::{self, Reward, TitleProvider},
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn welcome_message() -> String {
    format!("vcsgym {VERSION}: deterministic frame-stepping over the VCS-8 console")
}

#[derive(Debug, Default)]
pub struct Interface {
    settings: Settings,
    environment: Option<Environment>,
    checkpoint: Option<Snapshot>,
    title_provider: Option<Box<dyn TitleProvider>>,
}

impl Interface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an explicit settings object instead of the defaults.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get_setting(&self, key: &str) -> Result<&SettingValue> {
        self.settings.get(key)
    }

    /// Changes a setting. Takes effect on the next load, never on the
    /// currently loaded cartridge.
    pub fn set_setting(&mut self, key: &str, value: impl Into<SettingValue>) -> Result<()> {
        self.settings.set(key, value)
    }

    /// Parses `raw` according to the setting's type, then behaves like
    /// [`Interface::set_setting`].
    pub fn set_setting_from_str(&mut self, key: &str, raw: &str) -> Result<()> {
        self.settings.set_from_str(key, raw)
    }

    /// Installs a source of additional title adapters, consulted on later loads.
    pub fn set_title_provider(&mut self, provider: Option<Box<dyn TitleProvider>>) {
        self.title_provider = provider;
    }

    /// Loads a cartridge image from disk.
    ///
    /// On failure the interface keeps whatever it had loaded before.
    pub fn load_rom(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        match std::fs::read(path) {
            Ok(bytes) => self.load_rom_bytes_from(&bytes, origin),
            Err(err) => Err(self.load_failed(origin, err.into())),
        }
    }

    /// Loads a cartridge image already in memory.
    pub fn load_rom_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.load_rom_bytes_from(bytes, "<memory>".to_string())
    }

    fn load_rom_bytes_from(&mut self, bytes: &[u8], origin: String) -> Result<()> {
        let cartridge = match Cartridge::parse(bytes) {
            Ok(cartridge) => cartridge,
            Err(err) => return Err(self.load_failed(origin, err.into())),
        };
        let Some(adapter) = title::resolve(&cartridge, self.title_provider.as_deref()) else {
            let tag = cartridge.title().to_string();
            return Err(self.load_failed(origin, LoadError::UnknownTitle(tag)));
        };
        let config = EnvConfig::from_settings(&self.settings)?;

        let environment = Environment::new(&cartridge, adapter, config);
        tracing::info!(
            origin = %origin,
            title = environment.title_name(),
            crc32 = cartridge.crc32(),
            minimal_actions = environment.minimal_actions().len(),
            "cartridge loaded"
        );
        self.environment = Some(environment);
        self.checkpoint = None;
        self.settings.record_rom_file(&origin);
        Ok(())
    }

    fn load_failed(&self, origin: String, source: LoadError) -> Error {
        tracing::warn!(origin = %origin, error = %source, "cartridge load failed");
        Error::LoadFailure { origin, source }
    }

    pub fn is_loaded(&self) -> bool {
        self.environment.is_some()
    }

    fn env(&self) -> Result<&Environment> {
        self.environment.as_ref().ok_or(Error::NotLoaded)
    }

    fn env_mut(&mut self) -> Result<&mut Environment> {
        self.environment.as_mut().ok_or(Error::NotLoaded)
    }

    /// Advances one frame and returns the reward it earned.
    pub fn act(&mut self, action: Action) -> Result<Reward> {
        Ok(self.env_mut()?.act(action))
    }

    pub fn game_over(&self) -> Result<bool> {
        Ok(self.env()?.is_terminal())
    }

    pub fn reset_game(&mut self) -> Result<()> {
        self.env_mut()?.reset_episode();
        Ok(())
    }

    pub fn frame_number(&self) -> Result<u64> {
        Ok(self.env()?.frame_number())
    }

    pub fn episode_frame_number(&self) -> Result<u64> {
        Ok(self.env()?.episode_frame_number())
    }

    pub fn legal_action_set(&self) -> Result<&ActionSet> {
        Ok(self.env()?.legal_actions())
    }

    pub fn minimal_action_set(&self) -> Result<&ActionSet> {
        Ok(self.env()?.minimal_actions())
    }

    pub fn lives(&self) -> Result<Option<u32>> {
        Ok(self.env()?.lives())
    }

    pub fn title_name(&self) -> Result<&str> {
        Ok(self.env()?.title_name())
    }

    pub fn screen(&self) -> Result<Screen<'_>> {
        Ok(self.env()?.screen())
    }

    pub fn ram(&self) -> Result<&[u8]> {
        Ok(self.env()?.memory())
    }

    /// Returns a snapshot the caller owns.
    pub fn clone_state(&self) -> Result<Snapshot> {
        self.env()?.snapshot()
    }

    pub fn restore_state(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.env_mut()?.restore(snapshot)
    }

    /// Stores a snapshot in the single checkpoint slot, replacing the previous one.
    pub fn save_state(&mut self) -> Result<()> {
        let snapshot = self.clone_state()?;
        self.checkpoint = Some(snapshot);
        Ok(())
    }

    /// Restores the checkpoint slot. The slot keeps its content.
    pub fn load_state(&mut self) -> Result<()> {
        let env = self.environment.as_mut().ok_or(Error::NotLoaded)?;
        let snapshot = self.checkpoint.as_ref().ok_or(Error::NoCheckpoint)?;
        env.restore(snapshot)
    }
}
