//! Firmware-wide constants and the shape of the build-time configuration.
//!
//! Runtime capacities, timing parameters, and USB identity live here so
//! they can be tuned in one place. The binding tables themselves are
//! produced by the configuration generator (see `keymap.rs`).

use crate::binding::{ButtonBinding, EncoderBinding};
use crate::led::LedConfiguration;

// Runtime capacities

/// Buttons with runtime state. Binding tables longer than this are truncated.
pub const BUTTON_CAPACITY: usize = 16;

/// Encoders with runtime state.
pub const ENCODER_CAPACITY: usize = 4;

/// Logical LEDs with runtime state.
pub const LED_CAPACITY: usize = 16;

/// Steps per key sequence; extra steps in a table are ignored.
pub const MAX_KEY_STEPS: usize = 16;

/// Pointer events per mouse macro.
pub const MAX_POINTER_EVENTS: usize = 30;

/// Discrete media actions waiting for the consumer endpoint.
pub const MEDIA_QUEUE_CAPACITY: usize = 8;

// Timing

/// Main polling loop period (ms).
pub const POLL_INTERVAL_MS: u64 = 1;

/// Hold applied to a key step that declares `hold_ms == 0`.
pub const DEFAULT_KEY_HOLD_MS: u8 = 10;

/// Settle time after pressing a mouse macro's holder key.
pub const HOLDER_SETTLE_MS: u32 = 30;

/// Rainbow phase step used when the table leaves it at 0.
pub const DEFAULT_RAINBOW_STEP_MS: u8 = 20;

/// Breathing step used when the table leaves it at 0.
pub const DEFAULT_BREATHING_STEP_MS: u8 = 20;

/// Catch-up caps after a stalled loop (macro playback, USB stall).
pub const MAX_RAINBOW_STEPS_PER_UPDATE: u32 = 64;
pub const MAX_BREATHING_STEPS_PER_UPDATE: u32 = 200;

/// Full hue wheel length; hues are `0..HUE_WHEEL`.
pub const HUE_WHEEL: u8 = 192;

/// Per-LED hue offset for the rolling rainbow.
pub const RAINBOW_LED_OFFSET: u8 = 8;

/// Hue shown on every LED right before the bootloader jump (blue).
pub const BOOTLOADER_HUE: u8 = 128;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0xC55C;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "keypad";
pub const USB_PRODUCT: &str = "Macro Keypad";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 1;

/// Keyboard/mouse reports buffered between the poll loop and the USB task.
pub const REPORT_QUEUE_DEPTH: usize = 32;

// Build-time binding table

/// Immutable binding tables consumed by the engines.
///
/// Emitted by the configuration generator; the firmware never mutates it.
#[derive(Clone, Copy, Debug)]
pub struct Configuration<'a> {
    pub buttons: &'a [ButtonBinding<'a>],
    pub encoders: &'a [EncoderBinding<'a>],
    pub leds: LedConfiguration<'a>,
}
