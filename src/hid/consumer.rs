//! Consumer Control HID support - media keys, volume, etc.
//!
//! Consumer Control is a separate HID usage page (0x0C) that handles:
//! - Volume Up/Down/Mute
//! - Play/Pause/Stop/Next/Previous
//!
//! This is transmitted as a separate USB HID report alongside
//! keyboard and mouse reports. Only one usage is reported at a time, and
//! every usage must be followed by a release report (usage 0).

use crate::binding::Action;

/// Consumer control report size (2 bytes for usage ID).
pub const CONSUMER_REPORT_SIZE: usize = 2;

/// Consumer control usage codes (Usage Page 0x0C) reachable from bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ConsumerUsage {
    /// No action / release.
    None = 0x0000,
    /// Play/Pause toggle.
    PlayPause = 0x00CD,
    /// Next track.
    NextTrack = 0x00B5,
    /// Previous track.
    PrevTrack = 0x00B6,
    /// Stop.
    Stop = 0x00B7,
    /// Volume increment.
    VolumeUp = 0x00E9,
    /// Volume decrement.
    VolumeDown = 0x00EA,
    /// Mute toggle.
    Mute = 0x00E2,
}

impl From<Action> for ConsumerUsage {
    fn from(action: Action) -> Self {
        match action {
            Action::VolumeUp => ConsumerUsage::VolumeUp,
            Action::VolumeDown => ConsumerUsage::VolumeDown,
            Action::Mute => ConsumerUsage::Mute,
            Action::PlayPause => ConsumerUsage::PlayPause,
            Action::NextTrack => ConsumerUsage::NextTrack,
            Action::PrevTrack => ConsumerUsage::PrevTrack,
            Action::Stop => ConsumerUsage::Stop,
        }
    }
}

/// Consumer Control HID report.
///
/// Simple 2-byte report containing a single usage code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConsumerReport {
    /// Active consumer control usage (little-endian u16).
    pub usage: u16,
}

impl ConsumerReport {
    /// Create an empty (no keys pressed) report.
    pub const fn empty() -> Self {
        Self { usage: 0 }
    }

    /// Create a report with a single usage.
    pub const fn new(usage: ConsumerUsage) -> Self {
        Self {
            usage: usage as u16,
        }
    }

    /// Serialize to USB HID report bytes.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < CONSUMER_REPORT_SIZE {
            return 0;
        }
        let bytes = self.usage.to_le_bytes();
        buf[0] = bytes[0];
        buf[1] = bytes[1];
        CONSUMER_REPORT_SIZE
    }

    /// Check if any key is pressed.
    pub fn is_empty(&self) -> bool {
        self.usage == 0
    }
}

/// USB HID Report Descriptor for Consumer Control.
///
/// This is a minimal descriptor for a single 16-bit usage.
pub const CONSUMER_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x0C, // Usage Page (Consumer)
    0x09, 0x01, // Usage (Consumer Control)
    0xA1, 0x01, // Collection (Application)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x03, //   Logical Maximum (1023)
    0x19, 0x00, //   Usage Minimum (0)
    0x2A, 0xFF, 0x03, //   Usage Maximum (1023)
    0x75, 0x10, //   Report Size (16)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x00, //   Input (Data, Array, Absolute)
    0xC0, // End Collection
];
