//! External collaborator traits
//!
//! These traits define the interface between the PWM peripheral driver
//! and the platform pieces it consumes but does not own: the host pin
//! layer, the hardware PWM output, and the policy document store.

pub mod host;
pub mod pwm;
pub mod store;

pub use host::{HostError, HostPin, PinHost};
pub use pwm::{PwmHardware, PwmOutput};
pub use store::{PolicySlot, PolicyStore, StoreError};
