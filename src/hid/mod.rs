//! HID report types and the transport the dispatcher drives.
//!
//! The dispatcher only knows [`HidTransport`] (press/release/mouse/consumer
//! calls). [`ReportTransport`] turns those calls into boot-protocol reports
//! and hands them to a [`ReportQueue`] that the USB task drains.

pub mod consumer;
pub mod keyboard;
pub mod mouse;


use crate::error::{Error, Result};
use consumer::ConsumerReport;
use keyboard::KeyboardReport;
use mouse::{MouseButton, MouseReport};

/// A report ready for one of the three HID endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidReport {
    Keyboard(KeyboardReport),
    Mouse(MouseReport),
    Consumer(ConsumerReport),
}

impl HidReport {
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        match self {
            HidReport::Keyboard(k) => k.serialize(buf),
            HidReport::Mouse(m) => m.serialize(buf),
            HidReport::Consumer(c) => c.serialize(buf),
        }
    }

    pub fn is_consumer(&self) -> bool {
        matches!(self, HidReport::Consumer(_))
    }
}

/// Key, pointer and consumer-control output as seen by the dispatcher.
pub trait HidTransport {
    /// Press a table keycode (see [`keyboard`] for the convention).
    fn press(&mut self, keycode: u8);
    fn release(&mut self, keycode: u8);
    fn release_all(&mut self);
    fn mouse_move(&mut self, dx: i8, dy: i8);
    /// Press and release one mouse button.
    fn mouse_click(&mut self, button: MouseButton);
    fn mouse_scroll(&mut self, amount: i8);
    /// Non-blocking consumer report; usage 0 releases.
    ///
    /// `Err(Error::Busy)` means the previous consumer report is still in
    /// flight and the caller should retry on a later tick.
    fn consumer_try_send(&mut self, usage: u16) -> Result<()>;
    /// Retry button state that could not be queued earlier. Called once per
    /// poll tick.
    fn flush(&mut self) {}
}

/// Non-blocking sink for finished reports.
pub trait ReportQueue {
    /// `Err(Error::Busy)` when the endpoint's buffer is full.
    fn try_push(&mut self, report: HidReport) -> Result<()>;
}

/// [`HidTransport`] that tracks the keyboard report state and emits a
/// report for every change.
///
/// Keyboard and mouse button state is never lost to a full queue: the
/// latest keyboard report and a pending mouse button-up are kept and
/// re-pushed before anything else on the next call or [`flush`].
/// Relative motion, scroll and a click that cannot start are dropped when
/// the queue is full.
///
/// [`flush`]: HidTransport::flush
pub struct ReportTransport<Q> {
    queue: Q,
    keyboard: KeyboardReport,
    keyboard_pending: bool,
    mouse_release_pending: bool,
}

impl<Q: ReportQueue> ReportTransport<Q> {
    pub fn new(queue: Q) -> Self {
        Self {
            queue,
            keyboard: KeyboardReport::empty(),
            keyboard_pending: false,
            mouse_release_pending: false,
        }
    }

    /// Current keyboard state (last report queued or waiting to be).
    pub fn keyboard(&self) -> &KeyboardReport {
        &self.keyboard
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// `true` while a keyboard or mouse button report waits for queue space.
    pub fn has_pending(&self) -> bool {
        self.keyboard_pending || self.mouse_release_pending
    }

    fn push(&mut self, report: HidReport) -> bool {
        match self.queue.try_push(report) {
            Ok(()) => true,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("HID queue full: {}", _e);
                false
            }
        }
    }

    /// Re-push held-back state in order. Returns `true` once nothing is
    /// pending.
    fn retry_pending(&mut self) -> bool {
        if self.keyboard_pending {
            let report = HidReport::Keyboard(self.keyboard);
            self.keyboard_pending = !self.push(report);
        }
        if self.mouse_release_pending && !self.keyboard_pending {
            self.mouse_release_pending = !self.push(HidReport::Mouse(MouseReport::empty()));
        }
        !self.has_pending()
    }

    fn keyboard_changed(&mut self, changed: bool) {
        if changed {
            self.keyboard_pending = true;
        }
        self.retry_pending();
    }

    fn push_motion(&mut self, report: MouseReport) {
        if self.retry_pending() {
            self.push(HidReport::Mouse(report));
        }
    }
}

impl<Q: ReportQueue> HidTransport for ReportTransport<Q> {
    fn press(&mut self, keycode: u8) {
        let changed = self.keyboard.press(keycode);
        self.keyboard_changed(changed);
    }

    fn release(&mut self, keycode: u8) {
        let changed = self.keyboard.release(keycode);
        self.keyboard_changed(changed);
    }

    fn release_all(&mut self) {
        let changed = self.keyboard.clear();
        self.keyboard_changed(changed);
    }

    fn mouse_move(&mut self, dx: i8, dy: i8) {
        self.push_motion(MouseReport::movement(dx, dy));
    }

    fn mouse_click(&mut self, button: MouseButton) {
        if !self.retry_pending() {
            return;
        }
        if self.push(HidReport::Mouse(MouseReport::buttons(button))) {
            self.mouse_release_pending = true;
            self.retry_pending();
        }
    }

    fn mouse_scroll(&mut self, amount: i8) {
        self.push_motion(MouseReport::scroll(amount));
    }

    fn consumer_try_send(&mut self, usage: u16) -> Result<()> {
        self.queue
            .try_push(HidReport::Consumer(ConsumerReport { usage }))
            .map_err(|_| Error::Busy)
    }

    fn flush(&mut self) {
        self.retry_pending();
    }
}
