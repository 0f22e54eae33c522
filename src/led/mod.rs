//! Per-key addressable LEDs.
//!
//! Every logical LED has a passive look (shown while its key is up) and an
//! active look (while the key is held). [`LedEngine::update`] renders one
//! frame per tick into an [`LedStrip`] and latches it.

pub mod animation;
pub mod color;

use crate::config::{
    BOOTLOADER_HUE, DEFAULT_BREATHING_STEP_MS, DEFAULT_RAINBOW_STEP_MS, LED_CAPACITY,
};
use animation::{Breathing, Rainbow};
use smart_leds::RGB8;

const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// Look of an LED whose key is up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PassiveMode {
    Off,
    Rainbow,
    Static,
    Breathing,
}

/// Look of an LED whose key is held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveMode {
    Off,
    Solid,
    /// Keep showing the passive look.
    Nothing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedSlot {
    pub passive_mode: PassiveMode,
    pub passive_color: RGB8,
    pub active_mode: ActiveMode,
    pub active_color: RGB8,
}

impl LedSlot {
    pub const fn new(
        passive_mode: PassiveMode,
        passive_color: RGB8,
        active_mode: ActiveMode,
        active_color: RGB8,
    ) -> Self {
        Self {
            passive_mode,
            passive_color,
            active_mode,
            active_color,
        }
    }
}

/// LED table plus the strip-wide settings.
///
/// Percentages above 100 are treated as 100; step intervals of 0 fall back
/// to the defaults in `config.rs`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedConfiguration<'a> {
    pub slots: &'a [LedSlot],
    pub brightness_percent: u8,
    pub rainbow_step_ms: u8,
    pub breathing_min_percent: u8,
    pub breathing_step_ms: u8,
    /// Strip is wired last-key-first.
    pub reversed: bool,
}

impl<'a> LedConfiguration<'a> {
    pub const fn disabled() -> Self {
        Self {
            slots: &[],
            brightness_percent: 0,
            rainbow_step_ms: 0,
            breathing_min_percent: 0,
            breathing_step_ms: 0,
            reversed: false,
        }
    }

    /// Logical LEDs with runtime state.
    pub fn count(&self) -> usize {
        self.slots.len().min(LED_CAPACITY)
    }

    pub fn rainbow_step_ms(&self) -> u8 {
        match self.rainbow_step_ms {
            0 => DEFAULT_RAINBOW_STEP_MS,
            ms => ms,
        }
    }

    pub fn breathing_step_ms(&self) -> u8 {
        match self.breathing_step_ms {
            0 => DEFAULT_BREATHING_STEP_MS,
            ms => ms,
        }
    }

    pub fn breathing_min_percent(&self) -> u8 {
        color::clamp_percent(self.breathing_min_percent)
    }

    fn slots(&self) -> &'a [LedSlot] {
        &self.slots[..self.count()]
    }

    fn uses(&self, mode: PassiveMode) -> bool {
        self.slots().iter().any(|slot| slot.passive_mode == mode)
    }
}

/// Output side of the LED engine.
pub trait LedStrip {
    /// Stage a color for physical LED `index`.
    fn write_color(&mut self, index: u8, color: RGB8);
    /// Latch the staged frame onto the LEDs.
    fn update(&mut self);
}

/// Receives key up/down so LEDs can switch between passive and active looks.
pub trait KeyIndicator {
    fn set_key_state(&mut self, led: u8, pressed: bool);
}

pub struct LedEngine<'a, S> {
    config: LedConfiguration<'a>,
    strip: S,
    pressed: [bool; LED_CAPACITY],
    rainbow: Rainbow,
    breathing: Breathing,
}

impl<'a, S: LedStrip> LedEngine<'a, S> {
    pub fn new(config: LedConfiguration<'a>, strip: S) -> Self {
        if config.slots.len() > LED_CAPACITY {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "{} LEDs configured, only {} driven",
                config.slots.len(),
                LED_CAPACITY
            );
        }
        Self {
            config,
            strip,
            pressed: [false; LED_CAPACITY],
            rainbow: Rainbow::default(),
            breathing: Breathing::default(),
        }
    }

    pub fn strip(&self) -> &S {
        &self.strip
    }

    pub fn rainbow(&self) -> &Rainbow {
        &self.rainbow
    }

    pub fn breathing(&self) -> &Breathing {
        &self.breathing
    }

    pub fn is_pressed(&self, led: usize) -> bool {
        self.pressed.get(led).copied().unwrap_or(false)
    }

    /// Reset both animations to their starting point at `now`.
    pub fn init(&mut self, now: u32) {
        self.pressed = [false; LED_CAPACITY];
        self.rainbow.reset(now);
        self.breathing.reset(now);
        #[cfg(feature = "defmt")]
        defmt::info!("leds: {} configured", self.config.count());
    }

    /// Advance the animations in use and render one frame.
    pub fn update(&mut self, now: u32) {
        let count = self.config.count();
        if count == 0 {
            return;
        }
        if self.config.uses(PassiveMode::Rainbow) {
            self.rainbow.advance(now, self.config.rainbow_step_ms());
        }
        if self.config.uses(PassiveMode::Breathing) {
            self.breathing.advance(
                now,
                self.config.breathing_step_ms(),
                self.config.breathing_min_percent(),
            );
        }
        for led in 0..count {
            let color = self.color_for(led);
            if let Some(physical) = self.physical_index(led) {
                self.strip.write_color(physical, color);
            }
        }
        self.strip.update();
    }

    /// Paint every LED blue at full hue brightness and latch immediately.
    pub fn show_bootloader_indicator(&mut self) {
        let blue = color::hue_to_rgb(BOOTLOADER_HUE);
        for led in 0..self.config.count() {
            if let Some(physical) = self.physical_index(led) {
                self.strip.write_color(physical, blue);
            }
        }
        self.strip.update();
    }

    /// Color logical LED `led` should show right now (before reversal).
    pub fn color_for(&self, led: usize) -> RGB8 {
        let Some(slot) = self.config.slots().get(led) else {
            return BLACK;
        };
        if self.pressed[led] {
            match slot.active_mode {
                ActiveMode::Solid => return self.scaled(slot.active_color, 100),
                ActiveMode::Off => return BLACK,
                ActiveMode::Nothing => {}
            }
        }
        match slot.passive_mode {
            PassiveMode::Off => BLACK,
            PassiveMode::Static => self.scaled(slot.passive_color, 100),
            PassiveMode::Breathing => self.scaled(slot.passive_color, self.breathing.percent()),
            PassiveMode::Rainbow => {
                self.scaled(color::hue_to_rgb(self.rainbow.hue_for(led)), 100)
            }
        }
    }

    /// Physical strip position of logical LED `led`, `None` past the end.
    pub fn physical_index(&self, led: usize) -> Option<u8> {
        let count = self.config.count();
        if led >= count {
            return None;
        }
        let physical = if self.config.reversed {
            count - 1 - led
        } else {
            led
        };
        u8::try_from(physical).ok()
    }

    fn scaled(&self, color: RGB8, percent: u8) -> RGB8 {
        color::scale(
            color,
            color::effective_percent(percent, self.config.brightness_percent),
        )
    }
}

impl<S: LedStrip> KeyIndicator for LedEngine<'_, S> {
    fn set_key_state(&mut self, led: u8, pressed: bool) {
        let led = usize::from(led);
        if led < self.config.count() {
            self.pressed[led] = pressed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockStrip;

    const RED: RGB8 = RGB8 { r: 200, g: 0, b: 0 };
    const WHITE: RGB8 = RGB8 { r: 255, g: 255, b: 255 };

    fn config(slots: &[LedSlot]) -> LedConfiguration<'_> {
        LedConfiguration {
            slots,
            brightness_percent: 100,
            rainbow_step_ms: 0,
            breathing_min_percent: 50,
            breathing_step_ms: 10,
            reversed: false,
        }
    }

    fn engine<'a>(config: LedConfiguration<'a>) -> (LedEngine<'a, MockStrip>, MockStrip) {
        let strip = MockStrip::new();
        let mut engine = LedEngine::new(config, strip.clone());
        engine.init(0);
        (engine, strip)
    }

    #[test]
    fn static_and_off_passive_looks() {
        let slots = [
            LedSlot::new(PassiveMode::Static, RED, ActiveMode::Nothing, BLACK),
            LedSlot::new(PassiveMode::Off, RED, ActiveMode::Nothing, BLACK),
        ];
        let (mut engine, strip) = engine(config(&slots));
        engine.update(0);
        assert_eq!(strip.pixel(0), RED);
        assert_eq!(strip.pixel(1), BLACK);
        assert_eq!(strip.frames(), 1);
    }

    #[test]
    fn active_modes_while_pressed() {
        let slots = [
            LedSlot::new(PassiveMode::Static, RED, ActiveMode::Solid, WHITE),
            LedSlot::new(PassiveMode::Static, RED, ActiveMode::Off, WHITE),
            LedSlot::new(PassiveMode::Static, RED, ActiveMode::Nothing, WHITE),
        ];
        let mut cfg = config(&slots);
        cfg.brightness_percent = 50;
        let (mut engine, strip) = engine(cfg);
        for led in 0..3 {
            engine.set_key_state(led, true);
        }
        engine.update(0);
        assert_eq!(strip.pixel(0), RGB8 { r: 127, g: 127, b: 127 });
        assert_eq!(strip.pixel(1), BLACK);
        assert_eq!(strip.pixel(2), RGB8 { r: 100, g: 0, b: 0 });

        engine.set_key_state(0, false);
        engine.update(1);
        assert_eq!(strip.pixel(0), RGB8 { r: 100, g: 0, b: 0 });
    }

    #[test]
    fn out_of_range_key_state_is_ignored() {
        let slots = [LedSlot::new(PassiveMode::Off, RED, ActiveMode::Solid, WHITE)];
        let (mut engine, _) = engine(config(&slots));
        engine.set_key_state(1, true);
        engine.set_key_state(200, true);
        assert!(!engine.is_pressed(1));
    }

    #[test]
    fn rainbow_leds_trail_each_other() {
        let slots = [LedSlot::new(PassiveMode::Rainbow, BLACK, ActiveMode::Nothing, BLACK); 3];
        let (mut engine, strip) = engine(config(&slots));
        engine.update(0);
        assert_eq!(strip.pixel(0), color::hue_to_rgb(0));
        assert_eq!(strip.pixel(1), color::hue_to_rgb(8));
        assert_eq!(strip.pixel(2), color::hue_to_rgb(16));

        engine.update(DEFAULT_RAINBOW_STEP_MS as u32 * 2);
        assert_eq!(engine.rainbow().phase(), 2);
        assert_eq!(strip.pixel(0), color::hue_to_rgb(2));
    }

    #[test]
    fn animations_only_run_when_used() {
        let slots = [LedSlot::new(PassiveMode::Static, RED, ActiveMode::Nothing, BLACK)];
        let (mut engine, _) = engine(config(&slots));
        engine.update(5000);
        assert_eq!(engine.rainbow().phase(), 0);
        assert_eq!(engine.breathing().percent(), 100);
    }

    #[test]
    fn breathing_scales_passive_color() {
        let slots = [LedSlot::new(PassiveMode::Breathing, RED, ActiveMode::Nothing, BLACK)];
        let (mut engine, strip) = engine(config(&slots));
        engine.update(100);
        assert_eq!(engine.breathing().percent(), 90);
        assert_eq!(strip.pixel(0), RGB8 { r: 180, g: 0, b: 0 });
    }

    #[test]
    fn reversed_strip_mirrors_indices() {
        let slots = [
            LedSlot::new(PassiveMode::Static, RED, ActiveMode::Nothing, BLACK),
            LedSlot::new(PassiveMode::Off, RED, ActiveMode::Nothing, BLACK),
            LedSlot::new(PassiveMode::Off, RED, ActiveMode::Nothing, BLACK),
        ];
        let mut cfg = config(&slots);
        cfg.reversed = true;
        let (mut engine, strip) = engine(cfg);
        assert_eq!(engine.physical_index(0), Some(2));
        assert_eq!(engine.physical_index(2), Some(0));
        assert_eq!(engine.physical_index(3), None);
        engine.update(0);
        assert_eq!(strip.pixel(2), RED);
        assert_eq!(strip.pixel(0), BLACK);
    }

    #[test]
    fn bootloader_indicator_is_unscaled_blue() {
        let slots = [LedSlot::new(PassiveMode::Off, RED, ActiveMode::Nothing, BLACK); 2];
        let mut cfg = config(&slots);
        cfg.brightness_percent = 10;
        let (mut engine, strip) = engine(cfg);
        engine.show_bootloader_indicator();
        assert_eq!(strip.pixel(0), RGB8 { r: 0, g: 0, b: 252 });
        assert_eq!(strip.pixel(1), RGB8 { r: 0, g: 0, b: 252 });
        assert_eq!(strip.frames(), 1);
    }

    #[test]
    fn empty_table_renders_nothing() {
        let (mut engine, strip) = engine(LedConfiguration::disabled());
        engine.update(100);
        engine.set_key_state(0, true);
        assert_eq!(strip.frames(), 0);
    }
}
