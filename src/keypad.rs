//! The keypad context: engines, dispatcher and hardware handles in one place.
//!
//! The target binary builds one [`Keypad`], checks
//! [`bootloader_requested`](Keypad::bootloader_requested), calls
//! [`setup`](Keypad::setup) and then [`tick`](Keypad::tick) once per poll
//! interval.

use crate::binding::ButtonBinding;
use crate::buttons::{self, ButtonEngine};
use crate::config::Configuration;
use crate::dispatch::Dispatcher;
use crate::encoder::EncoderEngine;
use crate::hid::HidTransport;
use crate::led::{LedEngine, LedStrip};
use crate::platform::{Clock, Gpio};
use embedded_hal::delay::DelayNs;

/// What the caller should do after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    Continue,
    /// The bootloader chord was pressed; the indicator is already showing.
    EnterBootloader,
}

pub struct Keypad<'a, G, C, T, D, S> {
    button_bindings: &'a [ButtonBinding<'a>],
    gpio: G,
    clock: C,
    buttons: ButtonEngine<'a>,
    encoders: EncoderEngine<'a>,
    leds: LedEngine<'a, S>,
    dispatcher: Dispatcher<'a, T, D>,
}

impl<'a, G, C, T, D, S> Keypad<'a, G, C, T, D, S>
where
    G: Gpio,
    C: Clock,
    T: HidTransport,
    D: DelayNs,
    S: LedStrip,
{
    pub fn new(
        config: &Configuration<'a>,
        gpio: G,
        clock: C,
        transport: T,
        delay: D,
        strip: S,
    ) -> Self {
        Self {
            button_bindings: config.buttons,
            gpio,
            clock,
            buttons: ButtonEngine::new(config.buttons),
            encoders: EncoderEngine::new(config.encoders),
            leds: LedEngine::new(config.leds, strip),
            dispatcher: Dispatcher::new(config.buttons, config.encoders, transport, delay),
        }
    }

    /// Power-on check of the `bootloader_on_boot` buttons.
    pub fn bootloader_requested(&mut self) -> bool {
        buttons::bootloader_requested(self.button_bindings, &mut self.gpio)
    }

    /// Show the bootloader indicator on every LED.
    pub fn show_bootloader_indicator(&mut self) {
        self.leds.show_bootloader_indicator();
    }

    /// Configure inputs and start the LED animations.
    ///
    /// Buttons held at this point fire their `Press` binding right away.
    pub fn setup(&mut self) {
        self.leds.init(self.clock.millis());
        let dispatcher = &mut self.dispatcher;
        let leds = &mut self.leds;
        self.buttons.setup(&mut self.gpio, |index, mode| {
            dispatcher.handle_button(index, mode, leds)
        });
        self.encoders.setup(&mut self.gpio);
    }

    /// One pass of the poll loop.
    pub fn tick(&mut self) -> Tick {
        let dispatcher = &mut self.dispatcher;
        let leds = &mut self.leds;
        let chord = self.buttons.update(&mut self.gpio, |index, mode| {
            dispatcher.handle_button(index, mode, leds)
        });
        if chord {
            #[cfg(feature = "defmt")]
            defmt::info!("bootloader chord held");
            self.leds.show_bootloader_indicator();
            return Tick::EnterBootloader;
        }

        let dispatcher = &mut self.dispatcher;
        self.encoders.update(&mut self.gpio, |index, direction| {
            dispatcher.handle_encoder(index, direction.is_clockwise())
        });
        self.dispatcher.service();
        self.leds.update(self.clock.millis());
        Tick::Continue
    }

    pub fn buttons(&self) -> &ButtonEngine<'a> {
        &self.buttons
    }

    pub fn encoders(&self) -> &EncoderEngine<'a> {
        &self.encoders
    }

    pub fn leds(&self) -> &LedEngine<'a, S> {
        &self.leds
    }

    pub fn dispatcher(&self) -> &Dispatcher<'a, T, D> {
        &self.dispatcher
    }
}
