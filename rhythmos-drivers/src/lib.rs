//! PWM peripheral driver layer
//!
//! This crate builds the peripheral-facing pieces on top of the
//! rhythmos-core traits:
//!
//! - The [`pwm::PwmPin`] driver (channel claim, flow-gated writes,
//!   change notification, teardown)
//! - The policy document loader (TOML text with binary fallback)

#![no_std]
#![deny(unsafe_code)]

pub mod policy;
pub mod pwm;
