//! Build-time binding table.
//!
//! The configuration generator overwrites this file with the user's layout.
//! The checked-in table is a four-key pad with one volume knob: keys type
//! `1`..`4`, all four keys together enter the bootloader, and holding the
//! first key while plugging in does the same.
//!
//! Pin numbers are nRF52840 GPIO numbers (`P0.n` = n, `P1.n` = 32 + n).

use crate::binding::{
    Action, ButtonBinding, EncoderBinding, HidBinding, KeySequence, KeyStep, Modifiers, Step,
};
use crate::config::Configuration;
use crate::led::{ActiveMode, LedConfiguration, LedSlot, PassiveMode};
use smart_leds::RGB8;

/// Data pin of the WS2812 strip.
pub const LED_DATA_PIN: u8 = 6;

const fn type_key(keycode: u8) -> [Step; 1] {
    [Step::Key(KeyStep::new(keycode, Modifiers::NONE, 10, 0))]
}

const KEY_1: [Step; 1] = type_key(b'1');
const KEY_2: [Step; 1] = type_key(b'2');
const KEY_3: [Step; 1] = type_key(b'3');
const KEY_4: [Step; 1] = type_key(b'4');

const fn key(pin: u8, led: u8, steps: &'static [Step]) -> ButtonBinding<'static> {
    ButtonBinding {
        pin,
        active_low: true,
        led: Some(led),
        bootloader_on_boot: false,
        bootloader_chord_member: true,
        binding: HidBinding::KeySequence(KeySequence::new(steps)),
    }
}

static BUTTONS: [ButtonBinding<'static>; 4] = [
    ButtonBinding {
        bootloader_on_boot: true,
        ..key(2, 0, &KEY_1)
    },
    key(3, 1, &KEY_2),
    key(28, 2, &KEY_3),
    key(29, 3, &KEY_4),
];

static ENCODERS: [EncoderBinding<'static>; 1] = [EncoderBinding {
    pin_a: 4,
    pin_b: 5,
    clockwise: HidBinding::Function(Action::VolumeUp),
    counter_clockwise: HidBinding::Function(Action::VolumeDown),
}];

const WHITE: RGB8 = RGB8 {
    r: 255,
    g: 255,
    b: 255,
};

static LEDS: [LedSlot; 4] =
    [LedSlot::new(PassiveMode::Rainbow, WHITE, ActiveMode::Solid, WHITE); 4];

pub static KEYMAP: Configuration<'static> = Configuration {
    buttons: &BUTTONS,
    encoders: &ENCODERS,
    leds: LedConfiguration {
        slots: &LEDS,
        brightness_percent: 100,
        rainbow_step_ms: 20,
        breathing_min_percent: 20,
        breathing_step_ms: 20,
        reversed: false,
    },
};
