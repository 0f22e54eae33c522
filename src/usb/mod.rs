//! USB Device subsystem - presents a composite HID device to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`. We create a **composite device** with three HID
//! interfaces:
//!
//! - Interface 0: Keyboard (boot protocol)
//! - Interface 1: Mouse    (boot protocol)
//! - Interface 2: Consumer control
//!
//! The poll loop never touches the endpoints directly. It pushes finished
//! reports into two channels ([`UsbQueue`]) that the writer tasks drain on
//! the USB executor.

pub mod hid_device;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use keypad::config::REPORT_QUEUE_DEPTH;
use keypad::error::{Error, Result};
use keypad::hid::{HidReport, ReportQueue};

/// Keyboard and mouse reports, in order.
pub type ReportChannel = Channel<CriticalSectionRawMutex, HidReport, REPORT_QUEUE_DEPTH>;
pub type ReportReceiver = Receiver<'static, CriticalSectionRawMutex, HidReport, REPORT_QUEUE_DEPTH>;

/// Consumer reports. One slot: a full slot is the "previous report still in
/// flight" signal the dispatcher retries on.
pub type ConsumerChannel = Channel<CriticalSectionRawMutex, HidReport, 1>;
pub type ConsumerReceiver = Receiver<'static, CriticalSectionRawMutex, HidReport, 1>;

pub static REPORTS: ReportChannel = Channel::new();
pub static CONSUMER_REPORTS: ConsumerChannel = Channel::new();

/// Non-blocking report sink backed by the two channels.
pub struct UsbQueue {
    reports: Sender<'static, CriticalSectionRawMutex, HidReport, REPORT_QUEUE_DEPTH>,
    consumer: Sender<'static, CriticalSectionRawMutex, HidReport, 1>,
}

impl UsbQueue {
    pub fn new() -> Self {
        Self {
            reports: REPORTS.sender(),
            consumer: CONSUMER_REPORTS.sender(),
        }
    }
}

impl ReportQueue for UsbQueue {
    fn try_push(&mut self, report: HidReport) -> Result<()> {
        let sent = if report.is_consumer() {
            self.consumer.try_send(report)
        } else {
            self.reports.try_send(report)
        };
        sent.map_err(|_| Error::Busy)
    }
}
