//! USB HID composite device - keyboard + mouse + consumer control.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral and exposes three HID endpoints.

use super::{ConsumerReceiver, ReportReceiver};
use defmt::{info, warn};
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State};
use embassy_usb::{Builder, Config, UsbDevice};
use keypad::config;
use keypad::hid::consumer::CONSUMER_REPORT_DESCRIPTOR;
use keypad::hid::keyboard::KEYBOARD_REPORT_DESCRIPTOR;
use keypad::hid::mouse::MOUSE_REPORT_DESCRIPTOR;
use keypad::hid::HidReport;
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;
pub type ReportWriter = HidWriter<'static, UsbDriver, 8>;

static KB_STATE: StaticCell<State> = StaticCell::new();
static MOUSE_STATE: StaticCell<State> = StaticCell::new();
static CONSUMER_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// Build result containing the USB device runner and the three HID writers.
pub struct UsbHidDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub keyboard_writer: ReportWriter,
    pub mouse_writer: ReportWriter,
    pub consumer_writer: ReportWriter,
}

fn hid_config(report_descriptor: &'static [u8]) -> HidConfig<'static> {
    HidConfig {
        report_descriptor,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    }
}

/// Initialise the USB stack and create the composite HID device.
///
/// Must be called exactly once. All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbHidDevice {
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        usb_config,
        USB_CONFIG_DESC.init([0u8; 256]),
        USB_BOS_DESC.init([0u8; 256]),
        USB_MSOS_DESC.init([0u8; 256]),
        USB_CTRL_BUF.init([0u8; 128]),
    );

    let keyboard_writer = HidWriter::new(
        &mut builder,
        KB_STATE.init(State::new()),
        hid_config(KEYBOARD_REPORT_DESCRIPTOR),
    );
    let mouse_writer = HidWriter::new(
        &mut builder,
        MOUSE_STATE.init(State::new()),
        hid_config(MOUSE_REPORT_DESCRIPTOR),
    );
    let consumer_writer = HidWriter::new(
        &mut builder,
        CONSUMER_STATE.init(State::new()),
        hid_config(CONSUMER_REPORT_DESCRIPTOR),
    );

    let device = builder.build();

    info!("USB HID composite device initialised (keyboard + mouse + consumer)");

    UsbHidDevice {
        device,
        keyboard_writer,
        mouse_writer,
        consumer_writer,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

async fn write_report(writer: &mut ReportWriter, report: &HidReport) {
    let mut buf = [0u8; 8];
    let n = report.serialize(&mut buf);
    if writer.write(&buf[..n]).await.is_err() {
        warn!("USB write failed: {}", keypad::Error::Usb);
    }
}

/// Keyboard/mouse forwarding - reads the report channel and writes each
/// report to its endpoint in order.
pub async fn hid_writer_task(
    mut keyboard: ReportWriter,
    mut mouse: ReportWriter,
    reports: ReportReceiver,
) -> ! {
    info!("HID writer task started - waiting for reports");
    loop {
        let report = reports.receive().await;
        match report {
            HidReport::Keyboard(_) => write_report(&mut keyboard, &report).await,
            HidReport::Mouse(_) => write_report(&mut mouse, &report).await,
            HidReport::Consumer(_) => warn!("consumer report on keyboard channel"),
        }
    }
}

/// Consumer-control forwarding.
pub async fn consumer_writer_task(mut consumer: ReportWriter, reports: ConsumerReceiver) -> ! {
    loop {
        let report = reports.receive().await;
        write_report(&mut consumer, &report).await;
    }
}
