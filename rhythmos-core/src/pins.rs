//! PWM pin resolution
//!
//! Maps a host board pin index to its GPIO number, the alternate
//! function that routes PWM onto it, and the channel that generates the
//! signal. Only four pins carry hardware PWM; everything else is a
//! resolution failure at construction time.
//!
//! Pin details from <http://elinux.org/RPi_BCM2835_GPIOs>.

use crate::channel::PwmChannel;

/// GPIO alternate function selecting the PWM signal path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AltFunction {
    /// Alternate function 0
    Alt0,
    /// Alternate function 5
    Alt5,
}

/// One entry of the PWM pin table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinMapping {
    /// Host board pin index (after the host layer translates the request)
    pub board_index: u8,
    /// BCM GPIO number
    pub gpio: u8,
    /// Alternate function routing PWM to this GPIO
    pub function: AltFunction,
    /// Channel that generates the signal on this GPIO
    pub channel: PwmChannel,
}

/// The four PWM-capable pins
///
/// Each channel appears twice: both GPIO12 and GPIO18 are served by
/// PWM0, both GPIO13 and GPIO19 by PWM1.
pub const PWM_PIN_MAP: [PinMapping; 4] = [
    PinMapping {
        board_index: 26,
        gpio: 12,
        function: AltFunction::Alt0,
        channel: PwmChannel::Pwm0,
    },
    PinMapping {
        board_index: 1,
        gpio: 18,
        function: AltFunction::Alt5,
        channel: PwmChannel::Pwm0,
    },
    PinMapping {
        board_index: 23,
        gpio: 13,
        function: AltFunction::Alt0,
        channel: PwmChannel::Pwm1,
    },
    PinMapping {
        board_index: 24,
        gpio: 19,
        function: AltFunction::Alt5,
        channel: PwmChannel::Pwm1,
    },
];

impl PinMapping {
    /// Look up the mapping for a board pin index
    ///
    /// Returns `None` for any index outside the four supported pins.
    pub fn for_board_index(board_index: u8) -> Option<PinMapping> {
        PWM_PIN_MAP
            .iter()
            .find(|m| m.board_index == board_index)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_all_supported_pins_resolve() {
        let expected = [
            (26, 12, AltFunction::Alt0, PwmChannel::Pwm0),
            (1, 18, AltFunction::Alt5, PwmChannel::Pwm0),
            (23, 13, AltFunction::Alt0, PwmChannel::Pwm1),
            (24, 19, AltFunction::Alt5, PwmChannel::Pwm1),
        ];

        for (board_index, gpio, function, channel) in expected {
            let mapping = PinMapping::for_board_index(board_index).unwrap();
            assert_eq!(mapping.gpio, gpio);
            assert_eq!(mapping.function, function);
            assert_eq!(mapping.channel, channel);
        }
    }

    #[test]
    fn test_each_channel_serves_two_pins() {
        for channel in PwmChannel::ALL {
            let count = PWM_PIN_MAP.iter().filter(|m| m.channel == channel).count();
            assert_eq!(count, 2);
        }
    }

    proptest! {
        #[test]
        fn test_unsupported_pins_never_resolve(board_index in 0u8..=255) {
            prop_assume!(![26, 1, 23, 24].contains(&board_index));
            prop_assert!(PinMapping::for_board_index(board_index).is_none());
        }
    }
}
