//! USB HID keyboard report (boot protocol compatible).
//!
//! Layout (8 bytes):
//! ```text
//! Byte 0: Modifier keys (bitfield)
//!         Bit 0 = Left Ctrl,  Bit 1 = Left Shift,
//!         Bit 2 = Left Alt,   Bit 3 = Left GUI,
//!         Bit 4 = Right Ctrl, Bit 5 = Right Shift,
//!         Bit 6 = Right Alt,  Bit 7 = Right GUI
//! Byte 1: Reserved (0x00)
//! Byte 2-7: Up to 6 simultaneous key codes (USB HID usage codes)
//! ```
//!
//! Binding tables use the Arduino keycode convention:
//! ```text
//! 0x00-0x7F  printable ASCII (shifted characters imply Left Shift)
//! 0x80-0x87  modifier keys, bit (code - 0x80) of byte 0
//! 0x88-0xFF  raw usage (code - 0x88), e.g. KEY_F1 = 0x88 + 0x3A
//! ```

/// Keyboard report size in bytes.
pub const KEYBOARD_REPORT_SIZE: usize = 8;

pub const KEY_LEFT_CTRL: u8 = 0x80;
pub const KEY_LEFT_SHIFT: u8 = 0x81;
pub const KEY_LEFT_ALT: u8 = 0x82;
pub const KEY_LEFT_GUI: u8 = 0x83;
pub const KEY_RIGHT_CTRL: u8 = 0x84;
pub const KEY_RIGHT_SHIFT: u8 = 0x85;
pub const KEY_RIGHT_ALT: u8 = 0x86;
pub const KEY_RIGHT_GUI: u8 = 0x87;

/// First keycode that carries a raw usage.
const RAW_USAGE_BASE: u8 = 0x88;

pub const KEY_RETURN: u8 = RAW_USAGE_BASE + 0x28;
pub const KEY_ESC: u8 = RAW_USAGE_BASE + 0x29;
pub const KEY_BACKSPACE: u8 = RAW_USAGE_BASE + 0x2A;
pub const KEY_TAB: u8 = RAW_USAGE_BASE + 0x2B;
pub const KEY_F1: u8 = RAW_USAGE_BASE + 0x3A;
pub const KEY_F12: u8 = RAW_USAGE_BASE + 0x45;
pub const KEY_INSERT: u8 = RAW_USAGE_BASE + 0x49;
pub const KEY_HOME: u8 = RAW_USAGE_BASE + 0x4A;
pub const KEY_PAGE_UP: u8 = RAW_USAGE_BASE + 0x4B;
pub const KEY_DELETE: u8 = RAW_USAGE_BASE + 0x4C;
pub const KEY_END: u8 = RAW_USAGE_BASE + 0x4D;
pub const KEY_PAGE_DOWN: u8 = RAW_USAGE_BASE + 0x4E;
pub const KEY_RIGHT_ARROW: u8 = RAW_USAGE_BASE + 0x4F;
pub const KEY_LEFT_ARROW: u8 = RAW_USAGE_BASE + 0x50;
pub const KEY_DOWN_ARROW: u8 = RAW_USAGE_BASE + 0x51;
pub const KEY_UP_ARROW: u8 = RAW_USAGE_BASE + 0x52;

const MODIFIER_LEFT_SHIFT: u8 = 0x02;

/// A table keycode resolved against the report layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyTarget {
    /// Bit in the modifier byte.
    Modifier(u8),
    /// Usage code, optionally with Left Shift implied.
    Usage { usage: u8, shift: bool },
}

/// Resolve a table keycode. `None` for ASCII with no key on a US layout.
pub fn resolve(keycode: u8) -> Option<KeyTarget> {
    match keycode {
        RAW_USAGE_BASE..=0xFF => Some(KeyTarget::Usage {
            usage: keycode - RAW_USAGE_BASE,
            shift: false,
        }),
        KEY_LEFT_CTRL..=KEY_RIGHT_GUI => Some(KeyTarget::Modifier(1 << (keycode - KEY_LEFT_CTRL))),
        ascii => ascii_usage(ascii).map(|(usage, shift)| KeyTarget::Usage { usage, shift }),
    }
}

/// US-layout usage for an ASCII character.
fn ascii_usage(c: u8) -> Option<(u8, bool)> {
    let plain = |usage| Some((usage, false));
    let shifted = |usage| Some((usage, true));
    match c {
        b'a'..=b'z' => plain(0x04 + (c - b'a')),
        b'A'..=b'Z' => shifted(0x04 + (c - b'A')),
        b'1'..=b'9' => plain(0x1E + (c - b'1')),
        b'0' => plain(0x27),
        b'!' => shifted(0x1E),
        b'@' => shifted(0x1F),
        b'#' => shifted(0x20),
        b'$' => shifted(0x21),
        b'%' => shifted(0x22),
        b'^' => shifted(0x23),
        b'&' => shifted(0x24),
        b'*' => shifted(0x25),
        b'(' => shifted(0x26),
        b')' => shifted(0x27),
        b'\n' => plain(0x28),
        0x1B => plain(0x29),
        0x08 => plain(0x2A),
        b'\t' => plain(0x2B),
        b' ' => plain(0x2C),
        b'-' => plain(0x2D),
        b'_' => shifted(0x2D),
        b'=' => plain(0x2E),
        b'+' => shifted(0x2E),
        b'[' => plain(0x2F),
        b'{' => shifted(0x2F),
        b']' => plain(0x30),
        b'}' => shifted(0x30),
        b'\\' => plain(0x31),
        b'|' => shifted(0x31),
        b';' => plain(0x33),
        b':' => shifted(0x33),
        b'\'' => plain(0x34),
        b'"' => shifted(0x34),
        b'`' => plain(0x35),
        b'~' => shifted(0x35),
        b',' => plain(0x36),
        b'<' => shifted(0x36),
        b'.' => plain(0x37),
        b'>' => shifted(0x37),
        b'/' => plain(0x38),
        b'?' => shifted(0x38),
        _ => None,
    }
}

/// Standard USB HID boot-protocol keyboard report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    /// Modifier key bitfield.
    pub modifier: u8,
    /// Reserved byte (always 0x00 per HID spec).
    pub reserved: u8,
    /// Up to 6 simultaneously pressed key codes.
    pub keycodes: [u8; 6],
}

impl KeyboardReport {
    /// Create an empty (all-keys-released) report.
    pub const fn empty() -> Self {
        Self {
            modifier: 0,
            reserved: 0,
            keycodes: [0; 6],
        }
    }

    /// Add a table keycode to the report.
    ///
    /// Returns `true` if the report changed. A seventh usage is dropped.
    pub fn press(&mut self, keycode: u8) -> bool {
        match resolve(keycode) {
            Some(KeyTarget::Modifier(bit)) => self.set_modifier(bit),
            Some(KeyTarget::Usage { usage, shift }) => {
                let mut changed = shift && self.set_modifier(MODIFIER_LEFT_SHIFT);
                if !self.keycodes.contains(&usage) {
                    if let Some(slot) = self.keycodes.iter_mut().find(|k| **k == 0) {
                        *slot = usage;
                        changed = true;
                    }
                }
                changed
            }
            None => false,
        }
    }

    /// Remove a table keycode from the report.
    ///
    /// Returns `true` if the report changed.
    pub fn release(&mut self, keycode: u8) -> bool {
        match resolve(keycode) {
            Some(KeyTarget::Modifier(bit)) => self.clear_modifier(bit),
            Some(KeyTarget::Usage { usage, shift }) => {
                let mut changed = shift && self.clear_modifier(MODIFIER_LEFT_SHIFT);
                for slot in self.keycodes.iter_mut().filter(|k| **k == usage) {
                    *slot = 0;
                    changed = true;
                }
                changed
            }
            None => false,
        }
    }

    /// Release every key and modifier. Returns `true` if the report changed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.is_empty();
        *self = Self::empty();
        changed
    }

    fn set_modifier(&mut self, bit: u8) -> bool {
        let before = self.modifier;
        self.modifier |= bit;
        before != self.modifier
    }

    fn clear_modifier(&mut self, bit: u8) -> bool {
        let before = self.modifier;
        self.modifier &= !bit;
        before != self.modifier
    }

    /// Serialise into a byte slice for USB HID transmission.
    /// Returns the number of bytes written (always 8).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < KEYBOARD_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.modifier;
        buf[1] = self.reserved;
        buf[2..8].copy_from_slice(&self.keycodes);
        KEYBOARD_REPORT_SIZE
    }

    /// Returns `true` if no keys are pressed (release event).
    pub fn is_empty(&self) -> bool {
        self.modifier == 0 && self.keycodes.iter().all(|&k| k == 0)
    }
}

// USB HID report descriptor for a boot-protocol keyboard

/// USB HID Report Descriptor for a standard keyboard.
///
/// This descriptor tells the USB host that we are a keyboard with:
///   - 8 modifier key bits (input)
///   - 1 reserved byte
///   - 5 LED indicators (output)
///   - 6 key code bytes (input)
pub const KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    //
    //   - Modifier keys (8 bits) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - Reserved byte -
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant) - padding
    //
    //   - LED output (5 bits + 3 padding) -
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (Num Lock)
    0x29, 0x05, //   Usage Maximum (Kana)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant) - padding
    //
    //   - Key codes (6 bytes) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0xFF, //   Usage Maximum (255)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x00, //   Input (Data, Array)
    //
    0xC0, // End Collection
];
