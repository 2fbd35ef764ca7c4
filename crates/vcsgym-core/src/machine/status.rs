use bitflags::bitflags;

bitflags! {
    /// VCS-8 processor status register.
    ///
    /// Bit layout:
    /// 7 6 5 4 3 2 1 0
    /// N _ _ _ _ _ Z C
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct Status: u8 {
        /// Set when an addition carries out of bit 7, or a subtraction or
        /// comparison needed no borrow.
        const CARRY    = 0b0000_0001;

        /// Set when the result of an operation is zero.
        const ZERO     = 0b0000_0010;

        /// Mirrors bit 7 of the result.
        const NEGATIVE = 0b1000_0000;
    }
}

impl Status {
    pub(crate) fn update_zero_negative(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    pub(crate) fn set_carry(&mut self, carry: bool) {
        self.set(Status::CARRY, carry);
    }
}
