//! Polled button input with edge detection and the bootloader chord.
//!
//! Buttons are sampled once per tick (no debounce; the poll interval and
//! the switches' own settling are enough for a macropad). Every level
//! change becomes a `Press` or `Release` trigger.

use crate::binding::{ButtonBinding, TriggerMode};
use crate::config::BUTTON_CAPACITY;
use crate::platform::{Gpio, Pull};
use heapless::Vec;

fn pull_for(binding: &ButtonBinding<'_>) -> Pull {
    if binding.active_low {
        Pull::Up
    } else {
        Pull::None
    }
}

fn read_active<G: Gpio>(gpio: &mut G, binding: &ButtonBinding<'_>) -> bool {
    gpio.is_high(binding.pin) != binding.active_low
}

/// True if any `bootloader_on_boot` button is held right now.
///
/// Called once at power-on, before [`ButtonEngine::setup`].
pub fn bootloader_requested<G: Gpio>(bindings: &[ButtonBinding<'_>], gpio: &mut G) -> bool {
    let mut requested = false;
    for binding in bindings.iter().filter(|b| b.bootloader_on_boot) {
        gpio.configure_input(binding.pin, pull_for(binding));
        requested |= read_active(gpio, binding);
    }
    requested
}

pub struct ButtonEngine<'a> {
    bindings: &'a [ButtonBinding<'a>],
    active: Vec<bool, BUTTON_CAPACITY>,
    has_chord: bool,
    chord_latched: bool,
}

impl<'a> ButtonEngine<'a> {
    /// Bind to a table. Entries past `BUTTON_CAPACITY` get no runtime state.
    pub fn new(bindings: &'a [ButtonBinding<'a>]) -> Self {
        if bindings.len() > BUTTON_CAPACITY {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "{} buttons configured, only {} tracked",
                bindings.len(),
                BUTTON_CAPACITY
            );
        }
        let bindings = &bindings[..bindings.len().min(BUTTON_CAPACITY)];
        Self {
            bindings,
            active: Vec::new(),
            has_chord: bindings.iter().any(|b| b.bootloader_chord_member),
            chord_latched: false,
        }
    }

    /// Number of buttons with runtime state.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn is_pressed(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Configure every pin and record its initial level.
    ///
    /// Buttons already held fire `Press` now; their `Release` comes from a
    /// later [`update`](Self::update).
    pub fn setup<G, F>(&mut self, gpio: &mut G, mut on_trigger: F)
    where
        G: Gpio,
        F: FnMut(usize, TriggerMode),
    {
        self.active.clear();
        for (index, binding) in self.bindings.iter().enumerate() {
            gpio.configure_input(binding.pin, pull_for(binding));
            let active = read_active(gpio, binding);
            // Capacity is enforced in `new`.
            let _ = self.active.push(active);
            if active {
                on_trigger(index, TriggerMode::Press);
            }
        }
        #[cfg(feature = "defmt")]
        defmt::info!("buttons: {} configured, chord={}", self.len(), self.has_chord);
    }

    /// Sample every button and fire a trigger for each level change.
    ///
    /// Returns `true` on the tick the bootloader chord becomes fully held.
    /// The chord then stays latched until one of its members is released.
    pub fn update<G, F>(&mut self, gpio: &mut G, mut on_trigger: F) -> bool
    where
        G: Gpio,
        F: FnMut(usize, TriggerMode),
    {
        if self.active.len() != self.bindings.len() {
            return false;
        }
        let mut chord = self.has_chord;
        let states = self.active.iter_mut();
        for (index, (binding, state)) in self.bindings.iter().zip(states).enumerate() {
            let active = read_active(gpio, binding);
            if binding.bootloader_chord_member {
                chord &= active;
            }
            if *state != active {
                *state = active;
                let mode = if active {
                    TriggerMode::Press
                } else {
                    TriggerMode::Release
                };
                on_trigger(index, mode);
            }
        }

        if !chord {
            self.chord_latched = false;
            return false;
        }
        if self.chord_latched {
            return false;
        }
        self.chord_latched = true;
        true
    }
}
