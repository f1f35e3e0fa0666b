//! Host pin layer traits
//!
//! The host layer owns pin multiplexing and peripheral lifecycle: it
//! translates a pin request into a board pin index, tracks whether the
//! assignment is still alive, and releases the assignment at teardown.
//! The PWM driver consumes this layer; it never re-implements it.

use crate::config::PinRequest;

/// Errors from pin assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostError {
    /// The request names no pin the host knows about
    UnknownPin,
    /// The pin is already assigned to another peripheral
    PinInUse,
}

/// Assigns pins on behalf of peripherals
pub trait PinHost {
    /// The assignment handle produced by [`PinHost::assign`]
    type Pin: HostPin;

    /// Assign the requested pin to a new peripheral
    fn assign(&mut self, request: &PinRequest) -> Result<Self::Pin, HostError>;
}

/// A live pin assignment
pub trait HostPin {
    /// The translated board pin index of this assignment
    fn board_index(&self) -> u8;

    /// Whether this assignment is still alive
    ///
    /// Becomes false after [`HostPin::release`]; a dead assignment must
    /// not be written through.
    fn alive(&self) -> bool;

    /// Release the assignment and mark it dead
    fn release(&mut self);
}
