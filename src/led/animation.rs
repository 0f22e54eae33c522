//! Shared animation phases: the rolling rainbow and the breathing wave.
//!
//! Both advance in whole steps derived from elapsed milliseconds. If the
//! loop stalled (a long macro, a USB hiccup) the missed steps are replayed
//! on the next update, up to a per-call cap; the leftover time is kept.

use crate::config::{
    HUE_WHEEL, MAX_BREATHING_STEPS_PER_UPDATE, MAX_RAINBOW_STEPS_PER_UPDATE, RAINBOW_LED_OFFSET,
};

/// Converts elapsed time into whole animation steps.
#[derive(Clone, Copy, Debug, Default)]
struct StepClock {
    last_ms: u32,
}

impl StepClock {
    fn take(&mut self, now: u32, step_ms: u8, cap: u32) -> u32 {
        let step = u32::from(step_ms.max(1));
        let elapsed = now.wrapping_sub(self.last_ms);
        if elapsed < step {
            return 0;
        }
        let steps = (elapsed / step).min(cap);
        let remaining = elapsed - steps * step;
        self.last_ms = now.wrapping_sub(remaining);
        steps
    }
}

/// Hue phase shared by every rainbow LED.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rainbow {
    phase: u8,
    clock: StepClock,
}

impl Rainbow {
    pub fn reset(&mut self, now: u32) {
        self.phase = 0;
        self.clock.last_ms = now;
    }

    pub fn phase(&self) -> u8 {
        self.phase
    }

    pub fn advance(&mut self, now: u32, step_ms: u8) {
        let steps = self.clock.take(now, step_ms, MAX_RAINBOW_STEPS_PER_UPDATE);
        self.phase = ((u32::from(self.phase) + steps) % u32::from(HUE_WHEEL)) as u8;
    }

    /// Hue for logical LED `index`; neighbours trail by a fixed offset.
    pub fn hue_for(&self, index: usize) -> u8 {
        let wheel = usize::from(HUE_WHEEL);
        let offset = index * usize::from(RAINBOW_LED_OFFSET) % wheel;
        ((usize::from(self.phase) + offset) % wheel) as u8
    }
}

/// Triangle wave between the configured minimum and 100 %.
#[derive(Clone, Copy, Debug)]
pub struct Breathing {
    percent: u8,
    descending: bool,
    clock: StepClock,
}

impl Default for Breathing {
    fn default() -> Self {
        Self {
            percent: 100,
            descending: true,
            clock: StepClock::default(),
        }
    }
}

impl Breathing {
    pub fn reset(&mut self, now: u32) {
        *self = Self::default();
        self.clock.last_ms = now;
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    pub fn advance(&mut self, now: u32, step_ms: u8, min_percent: u8) {
        let steps = self.clock.take(now, step_ms, MAX_BREATHING_STEPS_PER_UPDATE);
        for _ in 0..steps {
            self.step(min_percent);
        }
    }

    /// One point of the wave. Reaching a bound costs a step that only turns
    /// the direction around.
    fn step(&mut self, min_percent: u8) {
        if self.descending {
            if self.percent > min_percent {
                self.percent -= 1;
            } else {
                self.descending = false;
            }
        } else if self.percent < 100 {
            self.percent += 1;
        } else {
            self.descending = true;
        }
    }
}
