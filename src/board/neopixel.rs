//! WS2812 strip driven by the PWM sequencer.
//!
//! Each bit becomes one 1.25 us PWM period whose duty encodes 0 or 1; the
//! sequencer streams the whole frame by DMA. A trailing low period plus the
//! sequence end delay gives the latch gap.

use embassy_nrf::peripherals::PWM0;
use embassy_nrf::pwm::{
    self, Config, Prescaler, SequenceConfig, SequenceLoad, SequencePwm, SingleSequenceMode,
    SingleSequencer,
};
use embassy_nrf::gpio::AnyPin;
use embassy_time::{block_for, Duration};
use keypad::config::LED_CAPACITY;
use keypad::led::LedStrip;
use smart_leds::{SmartLedsWrite, RGB8};

/// 16 MHz / 20 = 800 kHz bit clock.
const MAX_DUTY: u16 = 20;
const T1H: u16 = 0x8000 | 13;
const T0H: u16 = 0x8000 | 7;
const RESET: u16 = 0x8000;
/// Extra low periods after the frame (40 x 1.25 us = 50 us).
const LATCH_PERIODS: u32 = 40;

const BITS_PER_LED: usize = 24;
const WORDS: usize = LED_CAPACITY * BITS_PER_LED + 1;

pub struct NeoPixel {
    pwm: SequencePwm<'static, PWM0>,
    words: [u16; WORDS],
    frame: [RGB8; LED_CAPACITY],
    shown: Option<[RGB8; LED_CAPACITY]>,
    count: usize,
}

impl NeoPixel {
    pub fn new(pwm0: PWM0, data: AnyPin, count: usize) -> Result<Self, pwm::Error> {
        let mut config = Config::default();
        config.sequence_load = SequenceLoad::Common;
        config.prescaler = Prescaler::Div1;
        config.max_duty = MAX_DUTY;
        let pwm = SequencePwm::new_1ch(pwm0, data, config)?;
        Ok(Self {
            pwm,
            words: [RESET; WORDS],
            frame: [RGB8::default(); LED_CAPACITY],
            shown: None,
            count: count.min(LED_CAPACITY),
        })
    }

    fn encode(color: RGB8, out: &mut [u16]) {
        // WS2812 wants green first.
        for (byte, bits) in [color.g, color.r, color.b].into_iter().zip(out.chunks_exact_mut(8)) {
            for (i, word) in bits.iter_mut().enumerate() {
                *word = if byte & (0x80 >> i) != 0 { T1H } else { T0H };
            }
        }
    }
}

impl SmartLedsWrite for NeoPixel {
    type Error = pwm::Error;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let mut used = 0;
        for (color, chunk) in iterator
            .into_iter()
            .zip(self.words.chunks_exact_mut(BITS_PER_LED))
        {
            Self::encode(color.into(), chunk);
            used += BITS_PER_LED;
        }
        self.words[used] = RESET;

        let mut seq_config = SequenceConfig::default();
        seq_config.end_delay = LATCH_PERIODS - 1;
        let sequencer = SingleSequencer::new(&mut self.pwm, &self.words[..=used], seq_config);
        sequencer.start(SingleSequenceMode::Times(1))?;
        // 1.25 us per word, rounded up, plus the latch gap.
        let frame_us = (used as u64 + 1) * 5 / 4 + 1 + u64::from(LATCH_PERIODS) * 5 / 4;
        block_for(Duration::from_micros(frame_us));
        Ok(())
    }
}

impl LedStrip for NeoPixel {
    fn write_color(&mut self, index: u8, color: RGB8) {
        if let Some(pixel) = self.frame.get_mut(usize::from(index)) {
            *pixel = color;
        }
    }

    fn update(&mut self) {
        if self.shown == Some(self.frame) {
            return;
        }
        let frame = self.frame;
        if self.write(frame[..self.count].iter().copied()).is_err() {
            defmt::warn!("LED frame not sent");
            return;
        }
        self.shown = Some(frame);
    }
}
