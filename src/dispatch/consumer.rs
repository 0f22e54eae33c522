//! Consumer-control queue.
//!
//! The consumer endpoint carries one usage at a time and every usage must be
//! followed by a release report. Encoder detents can trigger volume changes
//! faster than the host polls, so triggers only update counters here and
//! [`ConsumerControl::service`] drains them one report per tick.

use crate::binding::{Action, TriggerMode};
use crate::config::MEDIA_QUEUE_CAPACITY;
use crate::hid::consumer::ConsumerUsage;
use crate::hid::HidTransport;
use heapless::Deque;

/// Handler for `Function` bindings.
pub trait Actionable {
    /// Run `action` for a trigger. May be called repeatedly for one binding.
    fn invoke(&mut self, action: Action, mode: TriggerMode);
}

/// Where the consumer endpoint handshake stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsumerPhase {
    /// Free to send the next usage.
    Idle,
    /// A usage was sent; its release (usage 0) is still owed.
    WaitingRelease,
}

#[derive(Debug)]
pub struct ConsumerControl {
    /// Net volume steps still to send; positive is up.
    volume_pending: i16,
    /// Discrete media keys in trigger order.
    media: Deque<ConsumerUsage, MEDIA_QUEUE_CAPACITY>,
    phase: ConsumerPhase,
}

impl ConsumerControl {
    pub const fn new() -> Self {
        Self {
            volume_pending: 0,
            media: Deque::new(),
            phase: ConsumerPhase::Idle,
        }
    }

    pub fn volume_pending(&self) -> i16 {
        self.volume_pending
    }

    pub fn queued_media(&self) -> usize {
        self.media.len()
    }

    pub fn phase(&self) -> ConsumerPhase {
        self.phase
    }

    /// Advance the handshake by at most one report.
    pub fn service<T: HidTransport>(&mut self, transport: &mut T) {
        match self.phase {
            ConsumerPhase::WaitingRelease => {
                if transport.consumer_try_send(ConsumerUsage::None as u16).is_ok() {
                    self.phase = ConsumerPhase::Idle;
                }
            }
            ConsumerPhase::Idle => {
                let usage = match self.volume_pending {
                    p if p > 0 => ConsumerUsage::VolumeUp,
                    p if p < 0 => ConsumerUsage::VolumeDown,
                    _ => match self.media.front() {
                        Some(usage) => *usage,
                        None => return,
                    },
                };
                if transport.consumer_try_send(usage as u16).is_err() {
                    return;
                }
                match usage {
                    ConsumerUsage::VolumeUp => self.volume_pending -= 1,
                    ConsumerUsage::VolumeDown => self.volume_pending += 1,
                    _ => {
                        self.media.pop_front();
                    }
                }
                self.phase = ConsumerPhase::WaitingRelease;
            }
        }
    }
}

impl Default for ConsumerControl {
    fn default() -> Self {
        Self::new()
    }
}

impl Actionable for ConsumerControl {
    fn invoke(&mut self, action: Action, mode: TriggerMode) {
        if mode == TriggerMode::Release {
            return;
        }
        match action {
            Action::VolumeUp => self.volume_pending = self.volume_pending.saturating_add(1),
            Action::VolumeDown => self.volume_pending = self.volume_pending.saturating_sub(1),
            other => {
                if self.media.push_back(ConsumerUsage::from(other)).is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Media queue full, dropping {}", other);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, Recorder};

    #[test]
    fn release_triggers_nothing() {
        let mut consumer = ConsumerControl::new();
        consumer.invoke(Action::VolumeUp, TriggerMode::Release);
        consumer.invoke(Action::Mute, TriggerMode::Release);
        assert_eq!(consumer.volume_pending(), 0);
        assert_eq!(consumer.queued_media(), 0);
    }

    #[test]
    fn volume_triggers_accumulate_signed() {
        let mut consumer = ConsumerControl::new();
        consumer.invoke(Action::VolumeUp, TriggerMode::Click);
        consumer.invoke(Action::VolumeUp, TriggerMode::Press);
        consumer.invoke(Action::VolumeDown, TriggerMode::Click);
        assert_eq!(consumer.volume_pending(), 1);
    }

    #[test]
    fn service_pairs_each_usage_with_release() {
        let recorder = Recorder::new();
        let mut transport = recorder.transport();
        let mut consumer = ConsumerControl::new();
        consumer.invoke(Action::VolumeUp, TriggerMode::Click);
        consumer.invoke(Action::VolumeUp, TriggerMode::Click);

        for _ in 0..5 {
            consumer.service(&mut transport);
        }

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Consumer(0x00E9),
                Call::Consumer(0),
                Call::Consumer(0x00E9),
                Call::Consumer(0),
            ]
        );
        assert_eq!(consumer.volume_pending(), 0);
        assert_eq!(consumer.phase(), ConsumerPhase::Idle);
    }

    #[test]
    fn busy_transport_retries_next_tick() {
        let recorder = Recorder::new();
        let mut transport = recorder.transport();
        let mut consumer = ConsumerControl::new();
        consumer.invoke(Action::VolumeDown, TriggerMode::Click);

        recorder.set_consumer_busy(true);
        consumer.service(&mut transport);
        assert_eq!(consumer.volume_pending(), -1);
        assert_eq!(consumer.phase(), ConsumerPhase::Idle);

        recorder.set_consumer_busy(false);
        consumer.service(&mut transport);
        assert_eq!(consumer.volume_pending(), 0);
        assert_eq!(consumer.phase(), ConsumerPhase::WaitingRelease);

        recorder.set_consumer_busy(true);
        consumer.service(&mut transport);
        assert_eq!(consumer.phase(), ConsumerPhase::WaitingRelease);

        recorder.set_consumer_busy(false);
        consumer.service(&mut transport);
        assert_eq!(consumer.phase(), ConsumerPhase::Idle);
        assert_eq!(
            recorder.calls(),
            vec![Call::Consumer(0x00EA), Call::Consumer(0)]
        );
    }

    #[test]
    fn media_keys_drain_after_volume() {
        let recorder = Recorder::new();
        let mut transport = recorder.transport();
        let mut consumer = ConsumerControl::new();
        consumer.invoke(Action::PlayPause, TriggerMode::Press);
        consumer.invoke(Action::VolumeDown, TriggerMode::Click);

        for _ in 0..4 {
            consumer.service(&mut transport);
        }

        assert_eq!(
            recorder.calls(),
            vec![
                Call::Consumer(0x00EA),
                Call::Consumer(0),
                Call::Consumer(0x00CD),
                Call::Consumer(0),
            ]
        );
        assert_eq!(consumer.queued_media(), 0);
    }

    #[test]
    fn media_queue_overflow_drops_newest() {
        let mut consumer = ConsumerControl::new();
        for _ in 0..MEDIA_QUEUE_CAPACITY + 3 {
            consumer.invoke(Action::NextTrack, TriggerMode::Press);
        }
        assert_eq!(consumer.queued_media(), MEDIA_QUEUE_CAPACITY);
    }
}
