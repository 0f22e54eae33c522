//! Table-addressed GPIO on top of `embassy-nrf` flex pins.

use embassy_nrf::gpio::{self, AnyPin, Flex};
use heapless::Vec;
use keypad::config::{BUTTON_CAPACITY, ENCODER_CAPACITY};
use keypad::platform::{Gpio, Pull};

const PIN_CAPACITY: usize = BUTTON_CAPACITY + 2 * ENCODER_CAPACITY;

/// Highest valid pin number (`P1.15`).
const MAX_PIN: u8 = 47;

/// Owns every pin the binding table names.
///
/// Pins are claimed on first use. The table must not name the LED data pin
/// or the SWD/USB pins.
pub struct BoardGpio {
    pins: Vec<(u8, Flex<'static>), PIN_CAPACITY>,
}

impl BoardGpio {
    pub fn new() -> Self {
        Self { pins: Vec::new() }
    }

    fn pin(&mut self, number: u8) -> Option<&mut Flex<'static>> {
        let slot = self.pins.iter().position(|(n, _)| *n == number)?;
        Some(&mut self.pins[slot].1)
    }

    fn claim(&mut self, number: u8) -> Option<&mut Flex<'static>> {
        if self.pin(number).is_none() {
            if number > MAX_PIN {
                defmt::warn!("pin {} does not exist", number);
                return None;
            }
            // SAFETY: each table pin is claimed exactly once and no other
            // driver is handed these pin numbers.
            let flex = Flex::new(unsafe { AnyPin::steal(number) });
            if self.pins.push((number, flex)).is_err() {
                defmt::warn!("too many input pins, ignoring {}", number);
                return None;
            }
        }
        self.pin(number)
    }
}

impl Gpio for BoardGpio {
    fn configure_input(&mut self, pin: u8, pull: Pull) {
        let pull = match pull {
            Pull::None => gpio::Pull::None,
            Pull::Up => gpio::Pull::Up,
        };
        if let Some(flex) = self.claim(pin) {
            flex.set_as_input(pull);
        }
    }

    fn is_high(&mut self, pin: u8) -> bool {
        self.pin(pin).is_some_and(|flex| flex.is_high())
    }
}
