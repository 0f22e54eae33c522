//! Quadrature rotary encoders.
//!
//! Each tick every encoder is sampled as a 2-bit value `(a << 1) | b` and
//! the transition from the previous sample is looked up in [`TRANSITIONS`].
//! Valid single-bit steps add ±1 to a per-encoder accumulator; a full detent
//! is four steps. Bounce and skipped samples cancel out or contribute 0.

use crate::binding::EncoderBinding;
use crate::config::ENCODER_CAPACITY;
use crate::platform::{Gpio, Pull};
use heapless::Vec;

/// Step delta indexed by `(previous << 2) | current`.
pub const TRANSITIONS: [i8; 16] = [
    0, -1, 1, 0, //
    1, 0, 0, -1, //
    -1, 0, 0, 1, //
    0, 1, -1, 0,
];

/// Quarter-steps per detent.
const STEPS_PER_DETENT: i8 = 4;

pub fn transition_delta(previous: u8, current: u8) -> i8 {
    TRANSITIONS[usize::from(((previous & 0b11) << 2) | (current & 0b11))]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn is_clockwise(self) -> bool {
        self == Direction::Clockwise
    }
}

/// Decoder state for one encoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuadratureState {
    previous: u8,
    delta: i8,
}

impl QuadratureState {
    pub const fn new(initial: u8) -> Self {
        Self {
            previous: initial & 0b11,
            delta: 0,
        }
    }

    pub fn delta(&self) -> i8 {
        self.delta
    }

    /// Feed one 2-bit sample.
    pub fn sample(&mut self, current: u8) {
        let current = current & 0b11;
        self.delta = self
            .delta
            .saturating_add(transition_delta(self.previous, current));
        self.previous = current;
    }

    /// Take one completed detent off the accumulator, if any.
    pub fn next_detent(&mut self) -> Option<Direction> {
        if self.delta >= STEPS_PER_DETENT {
            self.delta -= STEPS_PER_DETENT;
            Some(Direction::Clockwise)
        } else if self.delta <= -STEPS_PER_DETENT {
            self.delta += STEPS_PER_DETENT;
            Some(Direction::CounterClockwise)
        } else {
            None
        }
    }
}

fn read<G: Gpio>(gpio: &mut G, binding: &EncoderBinding<'_>) -> u8 {
    (u8::from(gpio.is_high(binding.pin_a)) << 1) | u8::from(gpio.is_high(binding.pin_b))
}

pub struct EncoderEngine<'a> {
    bindings: &'a [EncoderBinding<'a>],
    states: Vec<QuadratureState, ENCODER_CAPACITY>,
}

impl<'a> EncoderEngine<'a> {
    pub fn new(bindings: &'a [EncoderBinding<'a>]) -> Self {
        if bindings.len() > ENCODER_CAPACITY {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "{} encoders configured, only {} tracked",
                bindings.len(),
                ENCODER_CAPACITY
            );
        }
        Self {
            bindings: &bindings[..bindings.len().min(ENCODER_CAPACITY)],
            states: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<&QuadratureState> {
        self.states.get(index)
    }

    /// Enable pull-ups on both pins and take the initial sample.
    pub fn setup<G: Gpio>(&mut self, gpio: &mut G) {
        self.states.clear();
        for binding in self.bindings {
            gpio.configure_input(binding.pin_a, Pull::Up);
            gpio.configure_input(binding.pin_b, Pull::Up);
            // Capacity is enforced in `new`.
            let _ = self.states.push(QuadratureState::new(read(gpio, binding)));
        }
        #[cfg(feature = "defmt")]
        defmt::info!("encoders: {} configured", self.len());
    }

    /// Sample every encoder, then report each completed detent.
    pub fn update<G, F>(&mut self, gpio: &mut G, mut on_detent: F)
    where
        G: Gpio,
        F: FnMut(usize, Direction),
    {
        for (binding, state) in self.bindings.iter().zip(self.states.iter_mut()) {
            state.sample(read(gpio, binding));
        }
        for (index, state) in self.states.iter_mut().enumerate() {
            while let Some(direction) = state.next_detent() {
                on_detent(index, direction);
            }
        }
    }
}
