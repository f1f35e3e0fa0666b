//! Hardware PWM peripheral driver
//!
//! This driver provides:
//! - Pin-to-channel resolution and exclusive channel claim at open
//! - Flow-gated duty-cycle writes (labeled values are checked against
//!   the loaded policy before their payload is used)
//! - Synchronous change notification after each successful write
//! - Teardown that returns the channel to the registry
//!
//! # Usage
//!
//! ```ignore
//! let mut registry = ChannelRegistry::new();
//! let mut pwm = PwmPin::open(&mut registry, &mut host, &mut hw, &mut store, PwmConfig::default())?;
//! pwm.write(0.5)?;
//! pwm.destroy(&mut registry);
//! ```

use heapless::Vec;

use rhythmos_core::channel::{ChannelBusy, ChannelRegistry, PwmChannel};
use rhythmos_core::config::PwmConfig;
use rhythmos_core::duty::{self, DutyValue};
use rhythmos_core::label::Label;
use rhythmos_core::pins::PinMapping;
use rhythmos_core::policy::{FlowPolicy, RulePolicy};
use rhythmos_core::traits::{HostError, HostPin, PinHost, PolicyStore, PwmHardware, PwmOutput};

use crate::policy::{self, PolicyLoadError};

/// Maximum number of registered change hooks
pub const MAX_CHANGE_HOOKS: usize = 4;

/// Hook invoked with the new duty cycle after each successful write
pub type ChangeHook = fn(f32);

/// Errors raised while opening a PWM peripheral
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpenError<E> {
    /// The assigned pin has no hardware PWM capability
    UnsupportedPin(u8),
    /// The channel behind the pin is claimed by another live peripheral
    ChannelBusy(PwmChannel),
    /// Pin assignment failed in the host layer
    Host(HostError),
    /// The hardware output could not be acquired
    Hardware(E),
    /// The policy document could not be loaded or parsed
    Policy(PolicyLoadError),
}

impl<E> From<HostError> for OpenError<E> {
    fn from(e: HostError) -> Self {
        OpenError::Host(e)
    }
}

/// Errors raised by [`PwmPin::write`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteError<E> {
    /// The policy denies the flow from the value's label to this output
    InvalidFlow {
        /// Label of the rejected value
        source: Label,
    },
    /// The peripheral has been torn down
    AlreadyDestroyed,
    /// Duty cycle out of domain (not finite, or outside [0, 1])
    InvalidDutyCycle(f32),
    /// Hardware write failed after the duty cycle was stored
    Hardware(E),
}

/// A hardware PWM peripheral on one of the four PWM-capable pins
///
/// Holds its channel claim for its whole lifetime; [`PwmPin::destroy`]
/// returns the claim to the registry and releases the host pin.
pub struct PwmPin<P, O>
where
    P: HostPin,
    O: PwmOutput,
{
    base: P,
    output: O,
    mapping: PinMapping,
    frequency_hz: u32,
    duty_cycle: f32,
    policy: RulePolicy,
    label: Label,
    hooks: Vec<ChangeHook, MAX_CHANGE_HOOKS>,
}

impl<P, O> PwmPin<P, O>
where
    P: HostPin,
    O: PwmOutput,
{
    /// Open the peripheral described by `config`
    ///
    /// Assigns the pin through the host layer, resolves it against the
    /// PWM pin table, claims the backing channel, acquires the hardware
    /// output, and loads the flow policy. A failure after the channel
    /// claim releases the claim again; the host pin assignment is the
    /// host layer's to clean up.
    pub fn open<H, HW, S>(
        registry: &mut ChannelRegistry,
        host: &mut H,
        hardware: &mut HW,
        store: &mut S,
        config: PwmConfig,
    ) -> Result<Self, OpenError<HW::Error>>
    where
        H: PinHost<Pin = P>,
        HW: PwmHardware<Output = O>,
        S: PolicyStore,
    {
        let base = host.assign(&config.pin)?;

        let board_index = base.board_index();
        let mapping = PinMapping::for_board_index(board_index)
            .ok_or(OpenError::UnsupportedPin(board_index))?;

        registry
            .claim(mapping.channel)
            .map_err(|ChannelBusy(channel)| OpenError::ChannelBusy(channel))?;

        let output = match hardware.acquire(mapping.gpio, mapping.function) {
            Ok(output) => output,
            Err(e) => {
                registry.release(mapping.channel);
                return Err(OpenError::Hardware(e));
            }
        };

        let policy = match policy::load(store) {
            Ok(policy) => policy,
            Err(e) => {
                registry.release(mapping.channel);
                return Err(OpenError::Policy(e));
            }
        };

        Ok(Self {
            base,
            output,
            mapping,
            frequency_hz: config.frequency_hz,
            duty_cycle: 0.0,
            policy,
            label: Label::for_gpio(mapping.gpio),
            hooks: Vec::new(),
        })
    }

    /// Write a duty cycle, plain or labeled
    ///
    /// A labeled value passes the flow gate before its payload is
    /// touched; a denial changes nothing. The write then requires a
    /// live peripheral and a duty cycle in [0, 1]. On success the new
    /// duty cycle is stored, the hardware is programmed, and every
    /// registered change hook runs in registration order.
    pub fn write(
        &mut self,
        value: impl Into<DutyValue>,
    ) -> Result<(), WriteError<O::Error>> {
        let candidate = match value.into() {
            DutyValue::Labeled(labeled) => {
                if !self.policy.can_flow(labeled.label(), &self.label) {
                    let (_, source) = labeled.into_parts();
                    return Err(WriteError::InvalidFlow { source });
                }
                let (value, _) = labeled.into_parts();
                value
            }
            DutyValue::Plain(value) => value,
        };

        if !self.base.alive() {
            return Err(WriteError::AlreadyDestroyed);
        }

        if !duty::is_valid(candidate) {
            return Err(WriteError::InvalidDutyCycle(candidate));
        }

        self.duty_cycle = candidate;
        self.output
            .write(self.frequency_hz, duty::ticks(candidate))
            .map_err(WriteError::Hardware)?;

        for hook in &self.hooks {
            hook(candidate);
        }

        Ok(())
    }

    /// Register a change hook
    ///
    /// Hooks run synchronously after each successful write, in
    /// registration order. Returns the hook back if all
    /// [`MAX_CHANGE_HOOKS`] slots are taken.
    pub fn observe(&mut self, hook: ChangeHook) -> Result<(), ChangeHook> {
        self.hooks.push(hook)
    }

    /// Tear the peripheral down
    ///
    /// Returns the channel claim to the registry, then releases the
    /// host pin assignment. Call at most once; any later write fails
    /// with [`WriteError::AlreadyDestroyed`].
    pub fn destroy(&mut self, registry: &mut ChannelRegistry) {
        registry.release(self.mapping.channel);
        self.base.release();
    }

    /// Output frequency in Hz
    pub fn frequency(&self) -> u32 {
        self.frequency_hz
    }

    /// Current duty cycle
    pub fn duty_cycle(&self) -> f32 {
        self.duty_cycle
    }

    /// The loaded flow policy
    pub fn policy(&self) -> &RulePolicy {
        &self.policy
    }

    /// The output label of this peripheral
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// The claimed channel
    pub fn channel(&self) -> PwmChannel {
        self.mapping.channel
    }

    /// The resolved GPIO number
    pub fn gpio(&self) -> u8 {
        self.mapping.gpio
    }
}

impl<E: core::fmt::Debug> embedded_hal::pwm::Error for WriteError<E> {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}

impl<P, O> embedded_hal::pwm::ErrorType for PwmPin<P, O>
where
    P: HostPin,
    O: PwmOutput,
    O::Error: core::fmt::Debug,
{
    type Error = WriteError<O::Error>;
}

impl<P, O> embedded_hal::pwm::SetDutyCycle for PwmPin<P, O>
where
    P: HostPin,
    O: PwmOutput,
    O::Error: core::fmt::Debug,
{
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.write(duty as f32 / u16::MAX as f32)
    }
}
