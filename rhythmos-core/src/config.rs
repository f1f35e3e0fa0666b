//! Peripheral configuration types
//!
//! Construction takes a [`PwmConfig`]; every field is typed at the
//! boundary, with documented defaults for anything left unset.

use heapless::String;

/// Maximum length of a named pin request (e.g. `"GPIO12"`)
pub const MAX_PIN_NAME_LEN: usize = 8;

/// Default requested pin: board index 1 (GPIO18)
pub const DEFAULT_PIN: u8 = 1;

/// Default PWM frequency in Hz
pub const DEFAULT_FREQUENCY_HZ: u32 = 50;

/// A pin as requested by the caller
///
/// The host layer translates either form into a board pin index before
/// resolution; which names are understood is the host layer's business.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinRequest {
    /// Board pin index
    Index(u8),
    /// Named pin, e.g. `"GPIO12"`
    Name(String<MAX_PIN_NAME_LEN>),
}

impl PinRequest {
    /// Create a named request, rejecting names longer than
    /// [`MAX_PIN_NAME_LEN`]
    pub fn name(s: &str) -> Option<Self> {
        String::try_from(s).ok().map(PinRequest::Name)
    }
}

impl Default for PinRequest {
    fn default() -> Self {
        PinRequest::Index(DEFAULT_PIN)
    }
}

impl From<u8> for PinRequest {
    fn from(board_index: u8) -> Self {
        PinRequest::Index(board_index)
    }
}

/// PWM peripheral configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    /// Requested pin
    pub pin: PinRequest,
    /// Output frequency in Hz, fixed for the peripheral's lifetime
    pub frequency_hz: u32,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            pin: PinRequest::default(),
            frequency_hz: DEFAULT_FREQUENCY_HZ,
        }
    }
}

impl From<u8> for PwmConfig {
    /// Bare pin index with the default frequency
    fn from(board_index: u8) -> Self {
        Self {
            pin: PinRequest::Index(board_index),
            ..Self::default()
        }
    }
}

impl From<PinRequest> for PwmConfig {
    /// Bare pin request with the default frequency
    fn from(pin: PinRequest) -> Self {
        Self {
            pin,
            ..Self::default()
        }
    }
}
