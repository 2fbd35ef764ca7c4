//! Deterministic, frame-stepped agent environment over the VCS-8 console.
//!
//! [`Interface`] is the entry point: load a cartridge, then step it one video
//! frame per [`Interface::act`] call, reading rewards, the terminal flag,
//! the frame buffer and working memory. Snapshots capture everything needed
//! to replay a trajectory bit-for-bit.

pub mod action;
pub mod cartridge;
pub mod controller;
pub mod demo;
pub mod engine;
pub mod environment;
pub mod error;
pub mod interface;
pub mod machine;
pub mod rng;
pub mod settings;
pub mod state;
pub mod title;

pub use action::{Action, ActionSet};
pub use cartridge::{Cartridge, CartridgeError};
pub use controller::ControlLines;
pub use engine::{Engine, EngineError, Screen};
pub use environment::Environment;
pub use error::{Error, LoadError, Result};
pub use interface::{Interface, VERSION, welcome_message};
pub use settings::{EnvConfig, SettingKind, SettingValue, Settings};
pub use state::{Snapshot, SnapshotMeta};
pub use title::{Reward, TitleAdapter, TitleProvider};

#[cfg(test)]
mod tests {
    use ctor::ctor;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    #[ctor]
    fn init_tracing() {
        let subscriber = FmtSubscriber::builder()
            .with_file(true)
            .with_line_number(true)
            .with_max_level(Level::DEBUG)
            .pretty()
            .finish();
        tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
    }
}
