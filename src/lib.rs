//! Bias/sense window monitor and discharge controller.
//!
//! A fixed-period loop samples two debounced switches (auto/manual mode and a
//! manual override), averages target and sense readings over a window and
//! pulses the discharge switch when the sense average leaves the band around
//! the target. Hardware is reached only through `embedded-hal` pins, the
//! [`analog::AnalogSampler`] and [`clock::Clock`] traits and an
//! `embedded-io-async` status sink.
#![cfg_attr(not(test), no_std)]

// Logging macros. Keep first.
mod fmt;

pub mod analog;
pub mod averager;
pub mod clock;
pub mod config;
pub mod control;
pub mod debounce;
pub mod discharge;
pub mod error;
pub mod state;
pub mod status;

pub use control::{ControlIo, ControlLoop};
pub use error::Error;
