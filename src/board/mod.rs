//! nRF52840 implementations of the keypad's platform traits.

pub mod gpio;
pub mod neopixel;

use embassy_time::Instant;
use keypad::platform::Clock;

/// Millisecond clock from the embassy time driver.
pub struct BoardClock;

impl Clock for BoardClock {
    fn millis(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

/// GPREGRET value the UF2 bootloader treats as "stay in bootloader".
const DFU_MAGIC_UF2_RESET: u32 = 0x57;
/// POWER->GPREGRET.
const GPREGRET: *mut u32 = 0x4000_051C as *mut u32;

/// Reset into the UF2 bootloader. Does not return.
pub fn enter_bootloader() -> ! {
    defmt::info!("entering bootloader");
    // SAFETY: GPREGRET is a plain retention register; nothing else in the
    // firmware uses it.
    unsafe { core::ptr::write_volatile(GPREGRET, DFU_MAGIC_UF2_RESET) };
    cortex_m::peripheral::SCB::sys_reset()
}
