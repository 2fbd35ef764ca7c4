//! Discrete agent actions and ordered action sets.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controller::ControlLines;

/// Joystick direction (including neutral and diagonals) combined with the
/// fire button state.
///
/// Discriminants define the enumeration order used for indexing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Action {
    #[default]
    Noop = 0,
    Fire = 1,
    Up = 2,
    Right = 3,
    Left = 4,
    Down = 5,
    UpRight = 6,
    UpLeft = 7,
    DownRight = 8,
    DownLeft = 9,
    UpFire = 10,
    RightFire = 11,
    LeftFire = 12,
    DownFire = 13,
    UpRightFire = 14,
    UpLeftFire = 15,
    DownRightFire = 16,
    DownLeftFire = 17,
}

impl Action {
    pub const COUNT: usize = 18;

    /// Every representable action in enumeration order.
    pub const ALL: [Action; Self::COUNT] = [
        Action::Noop,
        Action::Fire,
        Action::Up,
        Action::Right,
        Action::Left,
        Action::Down,
        Action::UpRight,
        Action::UpLeft,
        Action::DownRight,
        Action::DownLeft,
        Action::UpFire,
        Action::RightFire,
        Action::LeftFire,
        Action::DownFire,
        Action::UpRightFire,
        Action::UpLeftFire,
        Action::DownRightFire,
        Action::DownLeftFire,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Action::Noop => "NOOP",
            Action::Fire => "FIRE",
            Action::Up => "UP",
            Action::Right => "RIGHT",
            Action::Left => "LEFT",
            Action::Down => "DOWN",
            Action::UpRight => "UPRIGHT",
            Action::UpLeft => "UPLEFT",
            Action::DownRight => "DOWNRIGHT",
            Action::DownLeft => "DOWNLEFT",
            Action::UpFire => "UPFIRE",
            Action::RightFire => "RIGHTFIRE",
            Action::LeftFire => "LEFTFIRE",
            Action::DownFire => "DOWNFIRE",
            Action::UpRightFire => "UPRIGHTFIRE",
            Action::UpLeftFire => "UPLEFTFIRE",
            Action::DownRightFire => "DOWNRIGHTFIRE",
            Action::DownLeftFire => "DOWNLEFTFIRE",
        }
    }

    /// Encodes the action as the joystick lines held for one frame.
    pub fn control_lines(self) -> ControlLines {
        use ControlLines as L;

        let direction = match self {
            Action::Noop | Action::Fire => L::empty(),
            Action::Up | Action::UpFire => L::UP,
            Action::Right | Action::RightFire => L::RIGHT,
            Action::Left | Action::LeftFire => L::LEFT,
            Action::Down | Action::DownFire => L::DOWN,
            Action::UpRight | Action::UpRightFire => L::UP | L::RIGHT,
            Action::UpLeft | Action::UpLeftFire => L::UP | L::LEFT,
            Action::DownRight | Action::DownRightFire => L::DOWN | L::RIGHT,
            Action::DownLeft | Action::DownLeftFire => L::DOWN | L::LEFT,
        };
        if self.has_fire() {
            direction | L::FIRE
        } else {
            direction
        }
    }

    /// Whether the fire button is held.
    pub const fn has_fire(self) -> bool {
        matches!(
            self,
            Action::Fire
                | Action::UpFire
                | Action::RightFire
                | Action::LeftFire
                | Action::DownFire
                | Action::UpRightFire
                | Action::UpLeftFire
                | Action::DownRightFire
                | Action::DownLeftFire
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action `{0}`")]
pub struct ParseActionError(String);

impl FromStr for Action {
    type Err = ParseActionError;

    /// Parses an upper- or lower-case action name (`"UPFIRE"`, `"noop"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}

/// Ordered, duplicate-free sequence of actions.
///
/// Order is insertion order, so indices handed to agents stay stable for the
/// lifetime of a loaded title.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionSet {
    actions: Vec<Action>,
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every representable action, in enumeration order.
    pub fn full() -> Self {
        Self {
            actions: Action::ALL.to_vec(),
        }
    }

    /// Appends `action` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, action: Action) -> bool {
        if self.contains(action) {
            return false;
        }
        self.actions.push(action);
        true
    }

    pub fn contains(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Action> {
        self.actions.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.actions.iter().copied()
    }

    pub fn as_slice(&self) -> &[Action] {
        &self.actions
    }

    pub fn is_subset_of(&self, other: &ActionSet) -> bool {
        self.iter().all(|action| other.contains(action))
    }

    /// Keeps only the actions for which `keep` returns `true`, preserving order.
    pub fn retain(&mut self, keep: impl FnMut(&Action) -> bool) {
        self.actions.retain(keep);
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = ActionSet::new();
        for action in iter {
            set.insert(action);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ActionSet {
    type Item = Action;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Action>>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter().copied()
    }
}
