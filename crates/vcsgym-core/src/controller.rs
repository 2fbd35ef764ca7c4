//! Joystick and console switch lines.
//!
//! The console samples these once per frame; the program reads them through
//! the `INP` instruction.

use bitflags::bitflags;

bitflags! {
    /// Active-high control lines latched on the console input port for one frame.
    ///
    /// Bit layout as read by `INP`:
    /// 7 6 5 4 3 2 1 0
    /// R S _ F R L D U
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ControlLines: u8 {
        const UP     = 0b0000_0001;
        const DOWN   = 0b0000_0010;
        const LEFT   = 0b0000_0100;
        const RIGHT  = 0b0000_1000;
        /// Joystick trigger.
        const FIRE   = 0b0001_0000;
        /// Console game-select switch.
        const SELECT = 0b0100_0000;
        /// Console reset switch. Programs restart their game loop while it is held.
        const RESET  = 0b1000_0000;
    }
}

impl ControlLines {
    /// Lines driven by the joystick, as opposed to the console switches.
    pub const JOYSTICK: Self = Self::UP
        .union(Self::DOWN)
        .union(Self::LEFT)
        .union(Self::RIGHT)
        .union(Self::FIRE);
}
