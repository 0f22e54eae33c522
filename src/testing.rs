//! Recording mocks for host tests.
//!
//! Transport calls and delays share one log so tests can assert on the
//! exact interleaving a binding produces.

use crate::error::{Error, Result};
use crate::hid::mouse::MouseButton;
use crate::hid::HidTransport;
use crate::led::{KeyIndicator, LedStrip};
use crate::platform::{Clock, Gpio, Pull};
use embedded_hal::delay::DelayNs;
use smart_leds::RGB8;
use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    Press(u8),
    Release(u8),
    ReleaseAll,
    Move(i8, i8),
    Click(MouseButton),
    Scroll(i8),
    Consumer(u16),
    Delay(u32),
}

#[derive(Default)]
struct Shared {
    calls: Vec<Call>,
    consumer_busy: bool,
    now: u32,
}

/// Shared log behind the transport, delay and clock mocks.
#[derive(Clone, Default)]
pub struct Recorder(Rc<RefCell<Shared>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transport(&self) -> MockTransport {
        MockTransport(self.0.clone())
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay(self.0.clone())
    }

    pub fn clock(&self) -> MockClock {
        MockClock(self.0.clone())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    pub fn set_consumer_busy(&self, busy: bool) {
        self.0.borrow_mut().consumer_busy = busy;
    }
}

pub struct MockTransport(Rc<RefCell<Shared>>);

impl MockTransport {
    fn record(&mut self, call: Call) {
        self.0.borrow_mut().calls.push(call);
    }
}

impl HidTransport for MockTransport {
    fn press(&mut self, keycode: u8) {
        self.record(Call::Press(keycode));
    }

    fn release(&mut self, keycode: u8) {
        self.record(Call::Release(keycode));
    }

    fn release_all(&mut self) {
        self.record(Call::ReleaseAll);
    }

    fn mouse_move(&mut self, dx: i8, dy: i8) {
        self.record(Call::Move(dx, dy));
    }

    fn mouse_click(&mut self, button: MouseButton) {
        self.record(Call::Click(button));
    }

    fn mouse_scroll(&mut self, amount: i8) {
        self.record(Call::Scroll(amount));
    }

    fn consumer_try_send(&mut self, usage: u16) -> Result<()> {
        if self.0.borrow().consumer_busy {
            return Err(Error::Busy);
        }
        self.record(Call::Consumer(usage));
        Ok(())
    }
}

/// Records each delay and advances the shared clock by it.
pub struct MockDelay(Rc<RefCell<Shared>>);

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        let mut shared = self.0.borrow_mut();
        shared.calls.push(Call::Delay(ms));
        shared.now = shared.now.wrapping_add(ms);
    }
}

pub struct MockClock(Rc<RefCell<Shared>>);

impl Clock for MockClock {
    fn millis(&self) -> u32 {
        self.0.borrow().now
    }
}

struct PinState {
    high: [bool; 64],
    pull: [Option<Pull>; 64],
}

/// Pin levels set by the test, read by the engines.
#[derive(Clone)]
pub struct MockGpio(Rc<RefCell<PinState>>);

impl MockGpio {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(PinState {
            high: [false; 64],
            pull: [None; 64],
        })))
    }

    pub fn set(&self, pin: u8, high: bool) {
        self.0.borrow_mut().high[pin as usize] = high;
    }

    pub fn pull(&self, pin: u8) -> Option<Pull> {
        self.0.borrow().pull[pin as usize]
    }
}

impl Gpio for MockGpio {
    fn configure_input(&mut self, pin: u8, pull: Pull) {
        self.0.borrow_mut().pull[pin as usize] = Some(pull);
    }

    fn is_high(&mut self, pin: u8) -> bool {
        self.0.borrow().high[pin as usize]
    }
}

struct StripState {
    pixels: [RGB8; 32],
    frames: usize,
}

/// LED strip that keeps the last written color per physical index.
#[derive(Clone)]
pub struct MockStrip(Rc<RefCell<StripState>>);

impl MockStrip {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(StripState {
            pixels: [RGB8::default(); 32],
            frames: 0,
        })))
    }

    pub fn pixel(&self, index: usize) -> RGB8 {
        self.0.borrow().pixels[index]
    }

    pub fn frames(&self) -> usize {
        self.0.borrow().frames
    }
}

impl LedStrip for MockStrip {
    fn write_color(&mut self, index: u8, color: RGB8) {
        self.0.borrow_mut().pixels[index as usize] = color;
    }

    fn update(&mut self) {
        self.0.borrow_mut().frames += 1;
    }
}

/// Records every key-state change the dispatcher requests.
#[derive(Default)]
pub struct KeyLog(pub Vec<(u8, bool)>);

impl KeyIndicator for KeyLog {
    fn set_key_state(&mut self, led: u8, pressed: bool) {
        self.0.push((led, pressed));
    }
}
