//! Per-title game logic.
//!
//! A [`TitleAdapter`] turns raw working memory into the signals an agent
//! learns from. The environment never branches on which title is loaded;
//! adapters are picked once per load by cartridge title tag.

use std::fmt::Debug;

use crate::{
    action::{Action, ActionSet},
    cartridge::Cartridge,
};

pub mod dodge;
pub mod gallery;

pub use dodge::Dodge;
pub use gallery::Gallery;

/// Signed per-frame reward.
pub type Reward = i32;

pub trait TitleAdapter: Debug + Send {
    /// Human-readable title name.
    fn name(&self) -> &str;

    /// Actions the title accepts. Defaults to every action.
    fn legal_actions(&self) -> ActionSet {
        ActionSet::full()
    }

    /// Actions that actually change the game, in the order agents should index them.
    fn minimal_actions(&self) -> ActionSet;

    /// Reward earned by the single frame that turned `previous` into `current`.
    fn reward(&self, previous: &[u8], current: &[u8]) -> Reward;

    fn is_terminal(&self, memory: &[u8]) -> bool;

    /// Remaining lives, for titles that have them.
    fn lives(&self, _memory: &[u8]) -> Option<u32> {
        None
    }

    /// Actions played after the console reset switch is released, to get
    /// from the title screen into gameplay.
    fn starting_actions(&self) -> &[Action] {
        &[]
    }
}

/// Source of user-provided title adapters.
///
/// A provider is consulted before the built-in table, so it can both add new
/// titles and replace built-in ones. Returning `None` falls back to the
/// built-in table.
///
/// # Example
/// ```
/// use vcsgym_core::{
///     Action, ActionSet, Cartridge,
///     title::{Reward, TitleAdapter, TitleProvider},
/// };
///
/// #[derive(Debug)]
/// struct Idle;
///
/// impl TitleAdapter for Idle {
///     fn name(&self) -> &str { "Idle" }
///     fn minimal_actions(&self) -> ActionSet { [Action::Noop].into_iter().collect() }
///     fn reward(&self, _: &[u8], _: &[u8]) -> Reward { 0 }
///     fn is_terminal(&self, _: &[u8]) -> bool { false }
/// }
///
/// #[derive(Debug)]
/// struct IdleProvider;
///
/// impl TitleProvider for IdleProvider {
///     fn title_for(&self, cartridge: &Cartridge) -> Option<Box<dyn TitleAdapter>> {
///         (cartridge.title().as_str() == "IDLE").then(|| Box::new(Idle) as Box<dyn TitleAdapter>)
///     }
/// }
/// ```
pub trait TitleProvider: Debug + Send {
    fn title_for(&self, cartridge: &Cartridge) -> Option<Box<dyn TitleAdapter>>;
}

/// Looks up a built-in adapter by title tag.
pub fn builtin(tag: &str) -> Option<Box<dyn TitleAdapter>> {
    let adapter: Box<dyn TitleAdapter> = match tag {
        gallery::TAG => Box::new(Gallery),
        dodge::TAG => Box::new(Dodge),
        _ => return None,
    };
    Some(adapter)
}

/// Picks the adapter for `cartridge`, asking `provider` first.
pub fn resolve(
    cartridge: &Cartridge,
    provider: Option<&dyn TitleProvider>,
) -> Option<Box<dyn TitleAdapter>> {
    provider
        .and_then(|p| p.title_for(cartridge))
        .or_else(|| builtin(cartridge.title().as_str()))
}

#[inline]
pub(crate) fn peek(memory: &[u8], addr: u8) -> u8 {
    memory.get(addr as usize).copied().unwrap_or(0)
}

#[inline]
pub(crate) fn peek_u16(memory: &[u8], lo: u8, hi: u8) -> u16 {
    u16::from_le_bytes([peek(memory, lo), peek(memory, hi)])
}
