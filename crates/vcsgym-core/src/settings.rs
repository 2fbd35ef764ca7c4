//! Typed key/value configuration.
//!
//! [`Settings`] is the mutable store the interface exposes. At load time it
//! is latched into an immutable [`EnvConfig`], so changing a setting never
//! affects an environment that is already running.

use std::{collections::BTreeMap, fmt};

use crate::error::{Error, Result};

/// Recognised setting keys.
pub mod keys {
    pub const RANDOM_SEED: &str = "random_seed";
    pub const MAX_NUM_FRAMES_PER_EPISODE: &str = "max_num_frames_per_episode";
    pub const REPEAT_ACTION_PROBABILITY: &str = "repeat_action_probability";
    pub const SYSTEM_RESET_STEPS: &str = "system_reset_steps";
    pub const TERMINAL_ON_LIFE_LOSS: &str = "terminal_on_life_loss";
    pub const ROM_FILE: &str = "rom_file";
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Str,
    Int,
    Bool,
    Float,
}

impl SettingValue {
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::Str(_) => SettingKind::Str,
            SettingValue::Int(_) => SettingKind::Int,
            SettingValue::Bool(_) => SettingKind::Bool,
            SettingValue::Float(_) => SettingKind::Float,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Str(s) => f.write_str(s),
            SettingValue::Int(v) => write!(f, "{v}"),
            SettingValue::Bool(v) => write!(f, "{v}"),
            SettingValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SettingKind::Str => "string",
            SettingKind::Int => "integer",
            SettingKind::Bool => "boolean",
            SettingKind::Float => "float",
        };
        f.write_str(s)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Str(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Str(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Float(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    values: BTreeMap<&'static str, SettingValue>,
}

impl Default for Settings {
    fn default() -> Self {
        let values = [
            (keys::RANDOM_SEED, SettingValue::Int(0)),
            (keys::MAX_NUM_FRAMES_PER_EPISODE, SettingValue::Int(0)),
            (keys::REPEAT_ACTION_PROBABILITY, SettingValue::Float(0.0)),
            (keys::SYSTEM_RESET_STEPS, SettingValue::Int(4)),
            (keys::TERMINAL_ON_LIFE_LOSS, SettingValue::Bool(false)),
            (keys::ROM_FILE, SettingValue::Str(String::new())),
        ];
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }

    pub fn get(&self, key: &str) -> Result<&SettingValue> {
        self.values
            .get(key)
            .ok_or_else(|| Error::invalid_setting(key, "unknown key"))
    }

    /// Stores `value` under `key`. The value must have the key's type and be in range.
    pub fn set(&mut self, key: &str, value: impl Into<SettingValue>) -> Result<()> {
        let value = value.into();
        let (&name, slot) = self
            .values
            .get_key_value(key)
            .ok_or_else(|| Error::invalid_setting(key, "unknown key"))?;
        if slot.kind() != value.kind() {
            return Err(Error::invalid_setting(
                key,
                format!("expected {}, got {}", slot.kind(), value.kind()),
            ));
        }
        check_range(name, &value)?;
        self.values.insert(name, value);
        Ok(())
    }

    /// Parses `raw` according to the type of `key` and stores it.
    pub fn set_from_str(&mut self, key: &str, raw: &str) -> Result<()> {
        let kind = self.get(key)?.kind();
        let raw = raw.trim();
        let value = match kind {
            SettingKind::Str => SettingValue::Str(raw.to_string()),
            SettingKind::Int => raw
                .parse()
                .map(SettingValue::Int)
                .map_err(|err| Error::invalid_setting(key, format!("`{raw}`: {err}")))?,
            SettingKind::Float => raw
                .parse()
                .map(SettingValue::Float)
                .map_err(|err| Error::invalid_setting(key, format!("`{raw}`: {err}")))?,
            SettingKind::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => SettingValue::Bool(true),
                "false" | "0" | "no" | "off" => SettingValue::Bool(false),
                _ => return Err(Error::invalid_setting(key, format!("`{raw}` is not a boolean"))),
            },
        };
        self.set(key, value)
    }

    pub fn get_string(&self, key: &str) -> Result<&str> {
        match self.get(key)? {
            SettingValue::Str(v) => Ok(v),
            other => Err(type_error(key, SettingKind::Str, other)),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        match self.get(key)? {
            SettingValue::Int(v) => Ok(*v),
            other => Err(type_error(key, SettingKind::Int, other)),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.get(key)? {
            SettingValue::Bool(v) => Ok(*v),
            other => Err(type_error(key, SettingKind::Bool, other)),
        }
    }

    pub fn get_float(&self, key: &str) -> Result<f64> {
        match self.get(key)? {
            SettingValue::Float(v) => Ok(*v),
            other => Err(type_error(key, SettingKind::Float, other)),
        }
    }

    /// Records the path of the most recently loaded cartridge.
    pub(crate) fn record_rom_file(&mut self, origin: &str) {
        self.values
            .insert(keys::ROM_FILE, SettingValue::Str(origin.to_string()));
    }
}

fn type_error(key: &str, wanted: SettingKind, found: &SettingValue) -> Error {
    Error::invalid_setting(key, format!("is a {}, not a {wanted}", found.kind()))
}

fn check_range(key: &str, value: &SettingValue) -> Result<()> {
    match (key, value) {
        (keys::MAX_NUM_FRAMES_PER_EPISODE | keys::SYSTEM_RESET_STEPS, SettingValue::Int(v))
            if *v < 0 =>
        {
            Err(Error::invalid_setting(key, "must not be negative"))
        }
        (keys::SYSTEM_RESET_STEPS, SettingValue::Int(v)) if *v > i64::from(u16::MAX) => {
            Err(Error::invalid_setting(key, "too many reset steps"))
        }
        (keys::REPEAT_ACTION_PROBABILITY, SettingValue::Float(p))
            if !(0.0..=1.0).contains(p) =>
        {
            Err(Error::invalid_setting(key, "must be within [0, 1]"))
        }
        _ => Ok(()),
    }
}

/// Settings latched at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    pub random_seed: u64,
    /// Zero means unlimited.
    pub max_num_frames_per_episode: u64,
    pub repeat_action_probability: f64,
    pub system_reset_steps: u32,
    pub terminal_on_life_loss: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            random_seed: 0,
            max_num_frames_per_episode: 0,
            repeat_action_probability: 0.0,
            system_reset_steps: 4,
            terminal_on_life_loss: false,
        }
    }
}

impl EnvConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let non_negative = |key: &str| -> Result<u64> {
            u64::try_from(settings.get_int(key)?)
                .map_err(|_| Error::invalid_setting(key, "must not be negative"))
        };
        let reset_steps = non_negative(keys::SYSTEM_RESET_STEPS)?;
        Ok(Self {
            // Negative seeds are reinterpreted bit-for-bit.
            random_seed: settings.get_int(keys::RANDOM_SEED)? as u64,
            max_num_frames_per_episode: non_negative(keys::MAX_NUM_FRAMES_PER_EPISODE)?,
            repeat_action_probability: settings.get_float(keys::REPEAT_ACTION_PROBABILITY)?,
            system_reset_steps: u32::try_from(reset_steps)
                .map_err(|_| Error::invalid_setting(keys::SYSTEM_RESET_STEPS, "out of range"))?,
            terminal_on_life_loss: settings.get_bool(keys::TERMINAL_ON_LIFE_LOSS)?,
        })
    }

    /// CRC-32 over every field that shapes stepping, except the seed.
    ///
    /// The seed only matters at power-on; its consequences already live in
    /// the engine and sticky state a snapshot carries.
    pub fn digest(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.max_num_frames_per_episode.to_le_bytes());
        hasher.update(&self.repeat_action_probability.to_bits().to_le_bytes());
        hasher.update(&self.system_reset_steps.to_le_bytes());
        hasher.update(&[u8::from(self.terminal_on_life_loss)]);
        hasher.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_latch_into_default_config() {
        let config = EnvConfig::from_settings(&Settings::new()).expect("config");
        assert_eq!(config, EnvConfig::default());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut settings = Settings::new();
        let err = settings.set("frame_skip", 4i64).expect_err("unknown key");
        assert!(matches!(err, Error::InvalidSetting { ref key, .. } if key == "frame_skip"));
        assert!(settings.get_int("frame_skip").is_err());
    }

    #[test]
    fn wrong_type_is_rejected_and_value_kept() {
        let mut settings = Settings::new();
        assert!(settings.set(keys::RANDOM_SEED, true).is_err());
        assert!(settings.get_float(keys::RANDOM_SEED).is_err());
        assert_eq!(settings.get_int(keys::RANDOM_SEED).expect("int"), 0);
    }

    #[test]
    fn probability_must_be_a_probability() {
        let mut settings = Settings::new();
        assert!(settings.set(keys::REPEAT_ACTION_PROBABILITY, 1.5).is_err());
        assert!(settings.set(keys::REPEAT_ACTION_PROBABILITY, f64::NAN).is_err());
        settings
            .set(keys::REPEAT_ACTION_PROBABILITY, 0.25)
            .expect("in range");
        assert_eq!(
            settings.get_float(keys::REPEAT_ACTION_PROBABILITY).expect("float"),
            0.25
        );
    }

    #[test]
    fn counts_must_not_be_negative() {
        let mut settings = Settings::new();
        assert!(settings.set(keys::MAX_NUM_FRAMES_PER_EPISODE, -1i64).is_err());
        assert!(settings.set(keys::SYSTEM_RESET_STEPS, -3i64).is_err());
    }

    #[test]
    fn strings_parse_by_key_type() {
        let mut settings = Settings::new();
        settings.set_from_str(keys::RANDOM_SEED, " 42 ").expect("int");
        settings.set_from_str(keys::TERMINAL_ON_LIFE_LOSS, "TRUE").expect("bool");
        settings
            .set_from_str(keys::REPEAT_ACTION_PROBABILITY, "0.5")
            .expect("float");
        assert!(settings.set_from_str(keys::RANDOM_SEED, "forty").is_err());
        assert!(settings.set_from_str(keys::TERMINAL_ON_LIFE_LOSS, "maybe").is_err());

        let config = EnvConfig::from_settings(&settings).expect("config");
        assert_eq!(config.random_seed, 42);
        assert!(config.terminal_on_life_loss);
        assert_eq!(config.repeat_action_probability, 0.5);
    }

    #[test]
    fn digest_tracks_stepping_fields_but_not_the_seed() {
        let base = EnvConfig::default();
        let reseeded = EnvConfig {
            random_seed: 7,
            ..base.clone()
        };
        assert_eq!(base.digest(), reseeded.digest());

        let variants = [
            EnvConfig {
                max_num_frames_per_episode: 3,
                ..base.clone()
            },
            EnvConfig {
                repeat_action_probability: 0.25,
                ..base.clone()
            },
            EnvConfig {
                system_reset_steps: 1,
                ..base.clone()
            },
            EnvConfig {
                terminal_on_life_loss: true,
                ..base.clone()
            },
        ];
        for variant in &variants {
            assert_ne!(variant.digest(), base.digest(), "{variant:?}");
        }
    }
}
