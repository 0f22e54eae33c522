//! Binding model - what a button or encoder direction does.
//!
//! Everything here is declarative data emitted by the configuration
//! generator. Execution lives in [`crate::dispatch`].
//!
//! Steps also have a compact byte encoding (used by the generator when it
//! ships binding blobs):
//!
//! ```text
//! sequence := len:u8 step*
//! step     := 0x01 keycode modifiers hold_ms gap_ms      (key)
//!           | 0x02 gap_ms                               (pause)
//!           | 0x03 kind value gap_ms                    (pointer)
//!           | 0x04 action repeat gap_ms                 (function)
//! ```

use crate::config::{MAX_KEY_STEPS, MAX_POINTER_EVENTS};
use crate::error::{Error, Result};

/// Why a binding is being run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerMode {
    /// Physical key-down.
    Press,
    /// Physical key-up.
    Release,
    /// Instantaneous trigger with no release (encoder detents).
    Click,
}

/// Modifier bitmask carried by a key step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const CTRL: Self = Self(0x01);
    pub const SHIFT: Self = Self(0x02);
    pub const ALT: Self = Self(0x04);
    pub const GUI: Self = Self(0x08);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// One pointer action inside a mouse macro or key sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PointerKind {
    MoveUp = 0,
    MoveDown = 1,
    MoveLeft = 2,
    MoveRight = 3,
    LeftClick = 4,
    RightClick = 5,
    ScrollUp = 6,
    ScrollDown = 7,
}

impl TryFrom<u8> for PointerKind {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            0 => PointerKind::MoveUp,
            1 => PointerKind::MoveDown,
            2 => PointerKind::MoveLeft,
            3 => PointerKind::MoveRight,
            4 => PointerKind::LeftClick,
            5 => PointerKind::RightClick,
            6 => PointerKind::ScrollUp,
            7 => PointerKind::ScrollDown,
            other => return Err(Error::UnknownPointer(other)),
        })
    }
}

/// Pointer action plus its magnitude (pixels or wheel detents; ignored for clicks).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub value: u8,
}

impl PointerEvent {
    pub const fn new(kind: PointerKind, value: u8) -> Self {
        Self { kind, value }
    }
}

/// Handlers reachable from `Function` bindings.
///
/// Static tables cannot hold closures, so bindings name an entry of this
/// registry and the dispatcher routes it to an [`Actionable`](crate::dispatch::Actionable).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Action {
    VolumeUp = 0,
    VolumeDown = 1,
    Mute = 2,
    PlayPause = 3,
    NextTrack = 4,
    PrevTrack = 5,
    Stop = 6,
}

impl TryFrom<u8> for Action {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            0 => Action::VolumeUp,
            1 => Action::VolumeDown,
            2 => Action::Mute,
            3 => Action::PlayPause,
            4 => Action::NextTrack,
            5 => Action::PrevTrack,
            6 => Action::Stop,
            other => return Err(Error::UnknownAction(other)),
        })
    }
}

/// Press keycode (with modifiers), hold, release everything, then wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyStep {
    /// Keycode in the table convention (see [`crate::hid::keyboard`]); 0 = modifiers only.
    pub keycode: u8,
    pub modifiers: Modifiers,
    /// 0 means the default hold.
    pub hold_ms: u8,
    pub gap_ms: u8,
}

impl KeyStep {
    pub const fn new(keycode: u8, modifiers: Modifiers, hold_ms: u8, gap_ms: u8) -> Self {
        Self {
            keycode,
            modifiers,
            hold_ms,
            gap_ms,
        }
    }
}

/// One entry of a key sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Key(KeyStep),
    Pause { gap_ms: u8 },
    Pointer { event: PointerEvent, gap_ms: u8 },
    Function { action: Action, repeat: u8, gap_ms: u8 },
}

const TAG_KEY: u8 = 0x01;
const TAG_PAUSE: u8 = 0x02;
const TAG_POINTER: u8 = 0x03;
const TAG_FUNCTION: u8 = 0x04;

impl Step {
    /// Encoded size of this step in bytes.
    pub const fn encoded_len(&self) -> usize {
        match self {
            Step::Key(_) => 5,
            Step::Pause { .. } => 2,
            Step::Pointer { .. } | Step::Function { .. } => 4,
        }
    }

    /// Serialise into `buf`. Returns the number of bytes written.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let len = self.encoded_len();
        let out = buf.get_mut(..len).ok_or(Error::BufferOverflow)?;
        match *self {
            Step::Key(key) => out.copy_from_slice(&[
                TAG_KEY,
                key.keycode,
                key.modifiers.0,
                key.hold_ms,
                key.gap_ms,
            ]),
            Step::Pause { gap_ms } => out.copy_from_slice(&[TAG_PAUSE, gap_ms]),
            Step::Pointer { event, gap_ms } => {
                out.copy_from_slice(&[TAG_POINTER, event.kind as u8, event.value, gap_ms])
            }
            Step::Function {
                action,
                repeat,
                gap_ms,
            } => out.copy_from_slice(&[TAG_FUNCTION, action as u8, repeat, gap_ms]),
        }
        Ok(len)
    }

    /// Parse one step from the front of `data`, returning it and the bytes consumed.
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        let tag = *data.first().ok_or(Error::Truncated)?;
        let step = match tag {
            TAG_KEY => {
                let b = data.get(1..5).ok_or(Error::Truncated)?;
                Step::Key(KeyStep::new(b[0], Modifiers(b[1]), b[2], b[3]))
            }
            TAG_PAUSE => {
                let b = data.get(1..2).ok_or(Error::Truncated)?;
                Step::Pause { gap_ms: b[0] }
            }
            TAG_POINTER => {
                let b = data.get(1..4).ok_or(Error::Truncated)?;
                Step::Pointer {
                    event: PointerEvent::new(PointerKind::try_from(b[0])?, b[1]),
                    gap_ms: b[2],
                }
            }
            TAG_FUNCTION => {
                let b = data.get(1..4).ok_or(Error::Truncated)?;
                Step::Function {
                    action: Action::try_from(b[0])?,
                    repeat: b[1],
                    gap_ms: b[2],
                }
            }
            other => return Err(Error::UnknownStep(other)),
        };
        Ok((step, step.encoded_len()))
    }
}

/// Ordered steps played back on press/click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeySequence<'a> {
    steps: &'a [Step],
}

impl<'a> KeySequence<'a> {
    pub const fn new(steps: &'a [Step]) -> Self {
        Self { steps }
    }

    /// Steps that will actually play, capped at `MAX_KEY_STEPS`.
    pub fn steps(&self) -> &'a [Step] {
        &self.steps[..self.steps.len().min(MAX_KEY_STEPS)]
    }

    pub fn len(&self) -> usize {
        self.steps().len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Serialise the playable steps into `buf`. Returns the number of bytes written.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let steps = self.steps();
        let first = buf.first_mut().ok_or(Error::BufferOverflow)?;
        *first = steps.len() as u8;
        let mut written = 1;
        for step in steps {
            written += step.encode(&mut buf[written..])?;
        }
        Ok(written)
    }
}

/// Decode a key sequence produced by [`KeySequence::encode`].
pub fn decode_sequence(data: &[u8]) -> Result<heapless::Vec<Step, MAX_KEY_STEPS>> {
    let count = *data.first().ok_or(Error::Truncated)? as usize;
    if count > MAX_KEY_STEPS {
        return Err(Error::SequenceTooLong);
    }
    let mut steps = heapless::Vec::new();
    let mut offset = 1;
    for _ in 0..count {
        let (step, used) = Step::decode(&data[offset..])?;
        steps.push(step).map_err(|_| Error::SequenceTooLong)?;
        offset += used;
    }
    Ok(steps)
}

/// Pointer events with an optional key held for the whole macro.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseMacro<'a> {
    events: &'a [PointerEvent],
    /// Wait after each event.
    pub delay_ms: u8,
    /// Keycode held while the macro runs (e.g. Ctrl for zoom-scroll); 0 = none.
    pub holder: u8,
}

impl<'a> MouseMacro<'a> {
    pub const fn new(events: &'a [PointerEvent], delay_ms: u8, holder: u8) -> Self {
        Self {
            events,
            delay_ms,
            holder,
        }
    }

    /// Events that will actually play, capped at `MAX_POINTER_EVENTS`.
    pub fn events(&self) -> &'a [PointerEvent] {
        &self.events[..self.events.len().min(MAX_POINTER_EVENTS)]
    }
}

/// What a button or encoder direction does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidBinding<'a> {
    KeySequence(KeySequence<'a>),
    MouseMacro(MouseMacro<'a>),
    Function(Action),
    #[default]
    Null,
}

/// A physical button and what it triggers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonBinding<'a> {
    pub pin: u8,
    /// Pressed pulls the pin low (pull-up enabled).
    pub active_low: bool,
    /// Logical LED lit while this button is held; `None` for no LED.
    pub led: Option<u8>,
    /// Checked once at power-on; held means jump straight to the bootloader.
    pub bootloader_on_boot: bool,
    /// Part of the in-field bootloader chord.
    pub bootloader_chord_member: bool,
    pub binding: HidBinding<'a>,
}

/// A quadrature encoder and its two directional bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderBinding<'a> {
    pub pin_a: u8,
    pub pin_b: u8,
    pub clockwise: HidBinding<'a>,
    pub counter_clockwise: HidBinding<'a>,
}

impl<'a> EncoderBinding<'a> {
    pub fn binding_for(&self, clockwise: bool) -> &HidBinding<'a> {
        if clockwise {
            &self.clockwise
        } else {
            &self.counter_clockwise
        }
    }
}
