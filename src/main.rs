//! Keypad firmware entry point (nRF52840).
//!
//! Two executors:
//! - an interrupt executor (`EGU0_SWI0`, priority 6) runs the USB device
//!   and the report writer tasks, so blocking macro delays in the poll loop
//!   never stall enumeration or endpoint traffic;
//! - the thread-mode executor runs the keypad poll loop.

#![no_std]
#![no_main]

mod board;
mod usb;

use board::gpio::BoardGpio;
use board::neopixel::NeoPixel;
use board::BoardClock;
use cortex_m_rt::entry;
use defmt::{info, unwrap};
use embassy_executor::{Executor, InterruptExecutor};
use embassy_nrf::gpio::AnyPin;
use embassy_nrf::interrupt;
use embassy_nrf::interrupt::{InterruptExt, Priority};
use embassy_time::{Delay, Duration, Ticker};
use keypad::config::POLL_INTERVAL_MS;
use keypad::hid::ReportTransport;
use keypad::keymap::{KEYMAP, LED_DATA_PIN};
use keypad::{Keypad, Tick};
use static_cell::StaticCell;
use usb::hid_device::{self, ReportWriter, UsbDriver};
use usb::{ConsumerReceiver, ReportReceiver, UsbQueue, CONSUMER_REPORTS, REPORTS};
use {defmt_rtt as _, panic_probe as _};

type BoardKeypad =
    Keypad<'static, BoardGpio, BoardClock, ReportTransport<UsbQueue>, Delay, NeoPixel>;

static EXECUTOR_USB: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_MAIN: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn EGU0_SWI0() {
    EXECUTOR_USB.on_interrupt()
}

#[embassy_executor::task]
async fn usb_device_task(device: embassy_usb::UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn report_writer_task(
    keyboard: ReportWriter,
    mouse: ReportWriter,
    reports: ReportReceiver,
) -> ! {
    hid_device::hid_writer_task(keyboard, mouse, reports).await
}

#[embassy_executor::task]
async fn consumer_task(consumer: ReportWriter, reports: ConsumerReceiver) -> ! {
    hid_device::consumer_writer_task(consumer, reports).await
}

#[embassy_executor::task]
async fn keypad_task(mut keypad: BoardKeypad) -> ! {
    keypad.setup();
    info!("keypad running");
    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));
    loop {
        if keypad.tick() == Tick::EnterBootloader {
            board::enter_bootloader();
        }
        ticker.next().await;
    }
}

#[entry]
fn main() -> ! {
    let p = embassy_nrf::init(Default::default());
    info!("keypad firmware starting");

    // SAFETY: the LED data pin is not part of the binding table.
    let led_pin = unsafe { AnyPin::steal(LED_DATA_PIN) };
    let strip = unwrap!(NeoPixel::new(p.PWM0, led_pin, KEYMAP.leds.slots.len()));

    let mut keypad = Keypad::new(
        &KEYMAP,
        BoardGpio::new(),
        BoardClock,
        ReportTransport::new(UsbQueue::new()),
        Delay,
        strip,
    );
    if keypad.bootloader_requested() {
        keypad.show_bootloader_indicator();
        board::enter_bootloader();
    }

    let usb = hid_device::init(p.USBD);
    interrupt::EGU0_SWI0.set_priority(Priority::P6);
    let usb_spawner = EXECUTOR_USB.start(interrupt::EGU0_SWI0);
    unwrap!(usb_spawner.spawn(usb_device_task(usb.device)));
    unwrap!(usb_spawner.spawn(report_writer_task(
        usb.keyboard_writer,
        usb.mouse_writer,
        REPORTS.receiver(),
    )));
    unwrap!(usb_spawner.spawn(consumer_task(
        usb.consumer_writer,
        CONSUMER_REPORTS.receiver(),
    )));

    let executor = EXECUTOR_MAIN.init(Executor::new());
    executor.run(|spawner| {
        unwrap!(spawner.spawn(keypad_task(keypad)));
    })
}
