//! Color math for the LED engine.

use crate::config::HUE_WHEEL;
use smart_leds::RGB8;

/// Hues per third of the wheel.
const HUE_SEGMENT: u8 = HUE_WHEEL / 3;

/// Peak channel value produced by [`hue_to_rgb`].
pub const HUE_PEAK: u8 = (HUE_SEGMENT - 1) << 2;

/// Map a hue in `0..192` onto a piecewise-linear red→green→blue wheel.
///
/// Channel values run `0..=252`; hues past the wheel land in the last segment.
pub fn hue_to_rgb(hue: u8) -> RGB8 {
    let phase = hue / HUE_SEGMENT;
    let step = (hue % HUE_SEGMENT) << 2;
    let nstep = HUE_PEAK - step;
    match phase {
        0 => RGB8 { r: nstep, g: step, b: 0 },
        1 => RGB8 { r: 0, g: nstep, b: step },
        _ => RGB8 { r: step, g: 0, b: nstep },
    }
}

pub fn clamp_percent(value: u8) -> u8 {
    value.min(100)
}

/// Combine a per-state percentage with the global brightness.
pub fn effective_percent(percent: u8, brightness: u8) -> u8 {
    (u16::from(clamp_percent(percent)) * u16::from(clamp_percent(brightness)) / 100) as u8
}

pub fn scale(color: RGB8, percent: u8) -> RGB8 {
    let percent = u16::from(clamp_percent(percent));
    let channel = |value: u8| (u16::from(value) * percent / 100) as u8;
    RGB8 {
        r: channel(color.r),
        g: channel(color.g),
        b: channel(color.b),
    }
}
