//! Platform primitives the engines are written against.
//!
//! Pins are addressed by the numbers used in the binding tables. Delays go
//! through `embedded_hal::delay::DelayNs`.

/// Input pull configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None,
    Up,
}

/// Digital inputs addressed by table pin number.
pub trait Gpio {
    fn configure_input(&mut self, pin: u8, pull: Pull);
    fn is_high(&mut self, pin: u8) -> bool;
}

/// Free-running millisecond counter. Wraps; callers use wrapping arithmetic.
pub trait Clock {
    fn millis(&self) -> u32;
}
