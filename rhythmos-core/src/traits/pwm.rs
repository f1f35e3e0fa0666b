//! Hardware PWM traits
//!
//! The hardware layer programs the frequency and duty registers of a
//! physical PWM channel. Acquisition selects the GPIO and its alternate
//! function; after that the driver only issues writes.

use crate::pins::AltFunction;

/// Provides hardware PWM output handles
pub trait PwmHardware {
    /// The output handle produced by [`PwmHardware::acquire`]
    type Output: PwmOutput;
    /// Acquisition error
    type Error;

    /// Acquire the output for a GPIO, selecting its alternate function
    fn acquire(&mut self, gpio: u8, function: AltFunction) -> Result<Self::Output, Self::Error>;
}

/// A live hardware PWM output
pub trait PwmOutput {
    /// Write error
    type Error;

    /// Program the output
    ///
    /// `duty_ticks` is the integer duty value out of
    /// [`crate::duty::MAX_DUTY_TICKS`].
    fn write(&mut self, frequency_hz: u32, duty_ticks: u32) -> Result<(), Self::Error>;
}
