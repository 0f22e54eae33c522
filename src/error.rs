//! Unified error type for the keypad firmware.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

use core::fmt;

/// Top-level error type used across the firmware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // HID transport
    /// The transport cannot accept another report right now; try next tick.
    Busy,

    /// USB stack returned an error while writing a report.
    Usb,

    // Binding encoding
    /// Buffer too small for the requested operation.
    BufferOverflow,

    /// Encoded data ended in the middle of a record.
    Truncated,

    /// Step tag byte does not name a known step kind.
    UnknownStep(u8),

    /// Pointer kind byte does not name a known pointer event.
    UnknownPointer(u8),

    /// Action byte does not name a registered action.
    UnknownAction(u8),

    /// Sequence holds more steps than `MAX_KEY_STEPS`.
    SequenceTooLong,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Busy => f.write_str("transport busy"),
            Error::Usb => f.write_str("usb write failed"),
            Error::BufferOverflow => f.write_str("buffer too small"),
            Error::Truncated => f.write_str("encoded data truncated"),
            Error::UnknownStep(tag) => write!(f, "unknown step tag {tag:#04x}"),
            Error::UnknownPointer(kind) => write!(f, "unknown pointer kind {kind:#04x}"),
            Error::UnknownAction(action) => write!(f, "unknown action {action:#04x}"),
            Error::SequenceTooLong => f.write_str("sequence exceeds step capacity"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
