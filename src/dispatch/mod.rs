//! Binding playback.
//!
//! The dispatcher turns button and encoder triggers into HID output. Key
//! sequences and mouse macros are played back synchronously with blocking
//! delays (every wait is bounded by a `u8` field). Consumer-control output
//! is queued and drained by [`Dispatcher::service`] from the poll loop.

mod consumer;

pub use consumer::{Actionable, ConsumerControl, ConsumerPhase};

use crate::binding::{
    ButtonBinding, EncoderBinding, HidBinding, KeySequence, KeyStep, Modifiers, MouseMacro,
    PointerEvent, PointerKind, Step, TriggerMode,
};
use crate::config::{DEFAULT_KEY_HOLD_MS, HOLDER_SETTLE_MS};
use crate::hid::keyboard::{KEY_LEFT_ALT, KEY_LEFT_CTRL, KEY_LEFT_GUI, KEY_LEFT_SHIFT};
use crate::hid::mouse::{self, MouseButton};
use crate::hid::HidTransport;
use crate::led::KeyIndicator;
use embedded_hal::delay::DelayNs;

/// Modifier bits and the keycodes pressed for them, in press order.
const MODIFIER_KEYS: [(Modifiers, u8); 4] = [
    (Modifiers::CTRL, KEY_LEFT_CTRL),
    (Modifiers::SHIFT, KEY_LEFT_SHIFT),
    (Modifiers::ALT, KEY_LEFT_ALT),
    (Modifiers::GUI, KEY_LEFT_GUI),
];

pub struct Dispatcher<'a, T, D> {
    buttons: &'a [ButtonBinding<'a>],
    encoders: &'a [EncoderBinding<'a>],
    transport: T,
    delay: D,
    consumer: ConsumerControl,
}

impl<'a, T: HidTransport, D: DelayNs> Dispatcher<'a, T, D> {
    pub fn new(
        buttons: &'a [ButtonBinding<'a>],
        encoders: &'a [EncoderBinding<'a>],
        transport: T,
        delay: D,
    ) -> Self {
        Self {
            buttons,
            encoders,
            transport,
            delay,
            consumer: ConsumerControl::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn consumer(&self) -> &ConsumerControl {
        &self.consumer
    }

    /// Run button `index`'s binding and track its LED.
    pub fn handle_button<L: KeyIndicator>(&mut self, index: usize, mode: TriggerMode, leds: &mut L) {
        let Some(button) = self.buttons.get(index) else {
            return;
        };
        if let Some(led) = button.led {
            match mode {
                TriggerMode::Press => leds.set_key_state(led, true),
                TriggerMode::Release => leds.set_key_state(led, false),
                TriggerMode::Click => {}
            }
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("button {} {}", index, mode);
        self.run_binding(&button.binding, mode);
    }

    /// Run one detent's binding for encoder `index`.
    pub fn handle_encoder(&mut self, index: usize, clockwise: bool) {
        let Some(encoder) = self.encoders.get(index) else {
            return;
        };
        #[cfg(feature = "defmt")]
        defmt::debug!("encoder {} cw={}", index, clockwise);
        self.run_binding(encoder.binding_for(clockwise), TriggerMode::Click);
    }

    pub fn run_binding(&mut self, binding: &HidBinding<'_>, mode: TriggerMode) {
        match binding {
            HidBinding::KeySequence(sequence) => self.run_sequence(sequence, mode),
            HidBinding::MouseMacro(mouse) => self.run_mouse_macro(mouse, mode),
            HidBinding::Function(action) => self.consumer.invoke(*action, mode),
            HidBinding::Null => {}
        }
    }

    /// Retry held-back button reports, then advance consumer-control output
    /// by at most one report.
    pub fn service(&mut self) {
        self.transport.flush();
        self.consumer.service(&mut self.transport);
    }

    fn run_sequence(&mut self, sequence: &KeySequence<'_>, mode: TriggerMode) {
        if mode == TriggerMode::Release {
            return;
        }
        for step in sequence.steps() {
            match *step {
                Step::Key(key) => self.run_key_step(&key),
                Step::Pause { gap_ms } => self.wait(gap_ms),
                Step::Pointer { event, gap_ms } => {
                    self.perform_pointer(&event);
                    self.wait(gap_ms);
                }
                Step::Function {
                    action,
                    repeat,
                    gap_ms,
                } => {
                    for _ in 0..repeat.max(1) {
                        self.consumer.invoke(action, mode);
                        self.wait(gap_ms);
                    }
                }
            }
        }
    }

    fn run_key_step(&mut self, key: &KeyStep) {
        for (bit, keycode) in MODIFIER_KEYS {
            if key.modifiers.contains(bit) {
                self.transport.press(keycode);
            }
        }
        if key.keycode != 0 {
            self.transport.press(key.keycode);
        }
        let hold = if key.hold_ms == 0 {
            DEFAULT_KEY_HOLD_MS
        } else {
            key.hold_ms
        };
        self.delay.delay_ms(u32::from(hold));
        self.transport.release_all();
        self.wait(key.gap_ms);
    }

    fn run_mouse_macro(&mut self, mouse: &MouseMacro<'_>, mode: TriggerMode) {
        if mode == TriggerMode::Release {
            return;
        }
        let held = mouse.holder != 0;
        if held {
            self.transport.press(mouse.holder);
            self.delay.delay_ms(HOLDER_SETTLE_MS);
        }
        for event in mouse.events() {
            self.perform_pointer(event);
            self.wait(mouse.delay_ms);
        }
        if held {
            self.transport.release_all();
        }
    }

    fn perform_pointer(&mut self, event: &PointerEvent) {
        let value = event.value;
        match event.kind {
            PointerKind::MoveUp => self.transport.mouse_move(0, mouse::axis(value, true)),
            PointerKind::MoveDown => self.transport.mouse_move(0, mouse::axis(value, false)),
            PointerKind::MoveLeft => self.transport.mouse_move(mouse::axis(value, true), 0),
            PointerKind::MoveRight => self.transport.mouse_move(mouse::axis(value, false), 0),
            PointerKind::LeftClick => self.transport.mouse_click(MouseButton::Left),
            PointerKind::RightClick => self.transport.mouse_click(MouseButton::Right),
            PointerKind::ScrollUp => self.transport.mouse_scroll(mouse::axis(value, false)),
            PointerKind::ScrollDown => self.transport.mouse_scroll(mouse::axis(value, true)),
        }
    }

    fn wait(&mut self, ms: u8) {
        if ms > 0 {
            self.delay.delay_ms(u32::from(ms));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{decode_sequence, Action};
    use crate::testing::{Call, KeyLog, MockDelay, MockTransport, Recorder};

    fn button(led: Option<u8>, binding: HidBinding<'static>) -> ButtonBinding<'static> {
        ButtonBinding {
            pin: 0,
            active_low: true,
            led,
            bootloader_on_boot: false,
            bootloader_chord_member: false,
            binding,
        }
    }

    fn dispatcher<'a>(
        recorder: &Recorder,
        buttons: &'a [ButtonBinding<'a>],
        encoders: &'a [EncoderBinding<'a>],
    ) -> Dispatcher<'a, MockTransport, MockDelay> {
        Dispatcher::new(buttons, encoders, recorder.transport(), recorder.delay())
    }

    const TYPE_A: [Step; 1] = [Step::Key(KeyStep::new(b'a', Modifiers::NONE, 10, 0))];

    #[test]
    fn single_key_press_and_release() {
        let recorder = Recorder::new();
        let buttons = [button(
            None,
            HidBinding::KeySequence(KeySequence::new(&TYPE_A)),
        )];
        let mut dispatcher = dispatcher(&recorder, &buttons, &[]);
        let mut leds = KeyLog::default();

        dispatcher.handle_button(0, TriggerMode::Press, &mut leds);
        dispatcher.handle_button(0, TriggerMode::Release, &mut leds);

        let output: Vec<Call> = recorder
            .calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Delay(_)))
            .collect();
        assert_eq!(output, vec![Call::Press(b'a'), Call::ReleaseAll]);
    }

    #[test]
    fn key_step_presses_modifiers_in_order_then_holds() {
        let recorder = Recorder::new();
        let steps = [Step::Key(KeyStep::new(
            b's',
            Modifiers::GUI.union(Modifiers::CTRL).union(Modifiers::SHIFT),
            0,
            25,
        ))];
        let mut dispatcher = dispatcher(&recorder, &[], &[]);
        dispatcher.run_binding(
            &HidBinding::KeySequence(KeySequence::new(&steps)),
            TriggerMode::Press,
        );

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Press(KEY_LEFT_CTRL),
                Call::Press(KEY_LEFT_SHIFT),
                Call::Press(KEY_LEFT_GUI),
                Call::Press(b's'),
                Call::Delay(DEFAULT_KEY_HOLD_MS as u32),
                Call::ReleaseAll,
                Call::Delay(25),
            ]
        );
    }

    #[test]
    fn modifier_only_step_skips_primary_key() {
        let recorder = Recorder::new();
        let steps = [Step::Key(KeyStep::new(0, Modifiers::ALT, 5, 0))];
        let mut dispatcher = dispatcher(&recorder, &[], &[]);
        dispatcher.run_binding(
            &HidBinding::KeySequence(KeySequence::new(&steps)),
            TriggerMode::Click,
        );
        assert_eq!(
            recorder.calls(),
            vec![Call::Press(KEY_LEFT_ALT), Call::Delay(5), Call::ReleaseAll]
        );
    }

    #[test]
    fn pause_and_pointer_steps() {
        let recorder = Recorder::new();
        let steps = [
            Step::Pause { gap_ms: 40 },
            Step::Pointer {
                event: PointerEvent::new(PointerKind::MoveLeft, 12),
                gap_ms: 0,
            },
            Step::Pointer {
                event: PointerEvent::new(PointerKind::ScrollDown, 2),
                gap_ms: 3,
            },
        ];
        let mut dispatcher = dispatcher(&recorder, &[], &[]);
        dispatcher.run_binding(
            &HidBinding::KeySequence(KeySequence::new(&steps)),
            TriggerMode::Press,
        );
        assert_eq!(
            recorder.calls(),
            vec![
                Call::Delay(40),
                Call::Move(-12, 0),
                Call::Scroll(-2),
                Call::Delay(3),
            ]
        );
    }

    #[test]
    fn function_step_repeats_at_least_once() {
        let recorder = Recorder::new();
        let steps = [
            Step::Function {
                action: Action::VolumeUp,
                repeat: 0,
                gap_ms: 0,
            },
            Step::Function {
                action: Action::VolumeUp,
                repeat: 3,
                gap_ms: 2,
            },
        ];
        let mut dispatcher = dispatcher(&recorder, &[], &[]);
        dispatcher.run_binding(
            &HidBinding::KeySequence(KeySequence::new(&steps)),
            TriggerMode::Press,
        );
        assert_eq!(dispatcher.consumer().volume_pending(), 4);
        assert_eq!(
            recorder.calls(),
            vec![Call::Delay(2), Call::Delay(2), Call::Delay(2)]
        );
    }

    #[test]
    fn release_does_not_replay_sequences_or_macros() {
        let recorder = Recorder::new();
        let events = [PointerEvent::new(PointerKind::LeftClick, 0)];
        let mut dispatcher = dispatcher(&recorder, &[], &[]);
        dispatcher.run_binding(
            &HidBinding::KeySequence(KeySequence::new(&TYPE_A)),
            TriggerMode::Release,
        );
        dispatcher.run_binding(
            &HidBinding::MouseMacro(MouseMacro::new(&events, 1, 0)),
            TriggerMode::Release,
        );
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn mouse_macro_holds_key_for_whole_macro() {
        let recorder = Recorder::new();
        let events = [
            PointerEvent::new(PointerKind::ScrollUp, 1),
            PointerEvent::new(PointerKind::ScrollUp, 1),
        ];
        let mut dispatcher = dispatcher(&recorder, &[], &[]);
        dispatcher.run_binding(
            &HidBinding::MouseMacro(MouseMacro::new(&events, 5, KEY_LEFT_CTRL)),
            TriggerMode::Press,
        );
        assert_eq!(
            recorder.calls(),
            vec![
                Call::Press(KEY_LEFT_CTRL),
                Call::Delay(HOLDER_SETTLE_MS),
                Call::Scroll(1),
                Call::Delay(5),
                Call::Scroll(1),
                Call::Delay(5),
                Call::ReleaseAll,
            ]
        );
    }

    #[test]
    fn mouse_macro_without_holder_sends_no_keys() {
        let recorder = Recorder::new();
        let events = [
            PointerEvent::new(PointerKind::MoveUp, 200),
            PointerEvent::new(PointerKind::RightClick, 0),
        ];
        let mut dispatcher = dispatcher(&recorder, &[], &[]);
        dispatcher.run_binding(
            &HidBinding::MouseMacro(MouseMacro::new(&events, 0, 0)),
            TriggerMode::Click,
        );
        assert_eq!(
            recorder.calls(),
            vec![Call::Move(0, -127), Call::Click(MouseButton::Right)]
        );
    }

    #[test]
    fn button_led_tracks_press_and_release() {
        let recorder = Recorder::new();
        let buttons = [button(Some(2), HidBinding::Null), button(None, HidBinding::Null)];
        let mut dispatcher = dispatcher(&recorder, &buttons, &[]);
        let mut leds = KeyLog::default();

        dispatcher.handle_button(0, TriggerMode::Press, &mut leds);
        dispatcher.handle_button(1, TriggerMode::Press, &mut leds);
        dispatcher.handle_button(0, TriggerMode::Release, &mut leds);

        assert_eq!(leds.0, vec![(2, true), (2, false)]);
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let recorder = Recorder::new();
        let buttons = [button(Some(0), HidBinding::KeySequence(KeySequence::new(&TYPE_A)))];
        let mut dispatcher = dispatcher(&recorder, &buttons, &[]);
        let mut leds = KeyLog::default();

        dispatcher.handle_button(5, TriggerMode::Press, &mut leds);
        dispatcher.handle_encoder(0, true);

        assert!(leds.0.is_empty());
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn encoder_detent_runs_direction_as_click() {
        let recorder = Recorder::new();
        let encoders = [EncoderBinding {
            pin_a: 0,
            pin_b: 1,
            clockwise: HidBinding::Function(Action::VolumeUp),
            counter_clockwise: HidBinding::Function(Action::VolumeDown),
        }];
        let mut dispatcher = dispatcher(&recorder, &[], &encoders);

        dispatcher.handle_encoder(0, true);
        dispatcher.handle_encoder(0, true);
        dispatcher.handle_encoder(0, false);
        assert_eq!(dispatcher.consumer().volume_pending(), 1);

        dispatcher.service();
        dispatcher.service();
        assert_eq!(
            recorder.calls(),
            vec![Call::Consumer(0x00E9), Call::Consumer(0)]
        );
    }

    #[test]
    fn decoded_sequence_plays_back_identically() {
        let steps = [
            Step::Key(KeyStep::new(b'x', Modifiers::CTRL, 12, 4)),
            Step::Pause { gap_ms: 9 },
            Step::Pointer {
                event: PointerEvent::new(PointerKind::MoveDown, 7),
                gap_ms: 1,
            },
        ];
        let mut buf = [0u8; 32];
        let written = KeySequence::new(&steps).encode(&mut buf).unwrap();
        let decoded = decode_sequence(&buf[..written]).unwrap();

        let play = |steps: &[Step]| {
            let recorder = Recorder::new();
            let mut dispatcher = dispatcher(&recorder, &[], &[]);
            dispatcher.run_binding(
                &HidBinding::KeySequence(KeySequence::new(steps)),
                TriggerMode::Press,
            );
            recorder.calls()
        };

        assert_eq!(play(&steps), play(&decoded));
        assert_eq!(play(&decoded).len(), 8);
    }
}
