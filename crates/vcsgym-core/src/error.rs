use thiserror::Error;

use crate::{cartridge::CartridgeError, engine::EngineError};

/// Errors surfaced by [`crate::Interface`] and [`crate::Environment`].
#[derive(Debug, Error)]
#[must_use]
pub enum Error {
    /// A stepping or state operation was called before a cartridge was loaded.
    #[error("no cartridge loaded")]
    NotLoaded,
    /// The cartridge could not be read or no title adapter recognises it.
    /// The interface keeps whatever it had loaded before.
    #[error("failed to load cartridge from {origin}")]
    LoadFailure {
        origin: String,
        #[source]
        source: LoadError,
    },
    /// A snapshot taken under one cartridge was restored under another.
    #[error("snapshot belongs to {found}, but {expected} is loaded")]
    StateMismatch { expected: String, found: String },
    /// Unknown setting key, value of the wrong type, or value out of range.
    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: String, reason: String },
    /// `load_state` was called before any `save_state`.
    #[error("no checkpoint has been saved")]
    NoCheckpoint,
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] postcard::Error),
}

/// Cause of a [`Error::LoadFailure`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("i/o error while reading cartridge: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),
    #[error("no title adapter recognises tag `{0}`")]
    UnknownTitle(String),
}

impl Error {
    pub(crate) fn invalid_setting(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
