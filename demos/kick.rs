//! Services the active watchdog from a busy loop.
//!
//! Production build: the IWDT, fixed by OFS0. With `--features engineering`
//! the WDT is configured for 100 ms, refreshable only during the second half
//! of its period.

#![no_std]
#![no_main]

use cortex_m::asm;
use cortex_m_rt::entry;
use panic_halt as _;

use synergy_wdt::{RunAction, WatchdogConfig, WatchdogTimer, WindowEnd, WindowStart};

// S3A7 clocks after the default setup
const ICLK_HZ: u32 = 120_000_000;
const PCLK_HZ: u32 = 60_000_000;

const CONFIG: WatchdogConfig = WatchdogConfig::new()
    .period(100)
    .window(WindowStart::Pct50, WindowEnd::Pct0)
    .on_start(RunAction::Start)
    .on_sleep(RunAction::Stop);

#[entry]
fn main() -> ! {
    let mut wdg = match synergy_wdt::take(PCLK_HZ) {
        Some(wdg) => wdg,
        None => loop {
            asm::bkpt();
        },
    };

    if wdg.is_reset() {
        // previous boot starved the watchdog
        asm::bkpt();
    }

    if wdg.init(&CONFIG).is_err() {
        // bad period for this clock; let the watchdog take us down
        loop {}
    }

    loop {
        // 100 ms: the timeout resolves to ~140 ms, so this lands after the
        // window opens at ~70 ms
        asm::delay(ICLK_HZ / 10);
        wdg.kick();
    }
}
