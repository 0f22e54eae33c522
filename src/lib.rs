//! Keypad firmware core.
//!
//! Everything that decides *what* the keypad does lives here and builds on
//! the host: the binding model, the button/encoder/LED engines, the HID
//! dispatcher and the report layer. Hardware is reached through the traits
//! in [`platform`], [`hid::HidTransport`] and [`led::LedStrip`].
//!
//! Usage: `cargo test` on the host; `cargo build --release --features
//! embedded --target thumbv7em-none-eabihf` for the nRF52840 binary.

#![cfg_attr(not(test), no_std)]

pub mod binding;
pub mod buttons;
pub mod config;
pub mod dispatch;
pub mod encoder;
pub mod error;
pub mod hid;
pub mod keymap;
pub mod keypad;
pub mod led;
pub mod platform;

#[cfg(test)]
mod testing;

pub use binding::{ButtonBinding, EncoderBinding, HidBinding, TriggerMode};
pub use config::Configuration;
pub use error::{Error, Result};
pub use keypad::{Keypad, Tick};
