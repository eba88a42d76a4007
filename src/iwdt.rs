//! Independent watchdog (IWDT).
//!
//! The IWDT runs from its own low-speed oscillator. Timeout, window, reset
//! behaviour and auto-start all come from the OFS0 option-setting word in
//! flash, which software cannot change at runtime. Build OFS0 with the IWDT
//! in auto-start mode and the WDT disabled; `IWDT_WINDOW` gives the window
//! bits. All that is left for software is the refresh and the status read.

use embedded_hal::watchdog;

use crate::config::WatchdogConfig;
use crate::dispatch::{State, WatchdogTimer};
use crate::error::Error;
use crate::regs::{IwdtBus, REFRESH_FIRST, REFRESH_SECOND, STATUS_CNTVAL, STATUS_ERR_MASK};

pub struct IndependentWatchdog<B> {
    bus: B,
}

impl<B: IwdtBus> IndependentWatchdog<B> {
    pub fn new(bus: B) -> IndependentWatchdog<B> {
        IndependentWatchdog { bus }
    }

    /// Nothing to configure; always succeeds.
    pub fn init(&mut self, _config: &WatchdogConfig) -> Result<(), Error> {
        Ok(())
    }

    pub fn kick(&mut self) {
        self.bus.write_refresh_pair(REFRESH_FIRST, REFRESH_SECOND);
    }

    pub fn is_reset(&self) -> bool {
        self.bus.status() & STATUS_ERR_MASK != 0
    }

    pub fn counter(&self) -> u16 {
        STATUS_CNTVAL.extract(u32::from(self.bus.status())) as u16
    }

    /// Armed out of reset.
    pub fn state(&self) -> State {
        State::Armed
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn free(self) -> B {
        self.bus
    }
}

impl<B: IwdtBus> WatchdogTimer for IndependentWatchdog<B> {
    fn init(&mut self, config: &WatchdogConfig) -> Result<(), Error> {
        IndependentWatchdog::init(self, config)
    }

    fn kick(&mut self) {
        IndependentWatchdog::kick(self)
    }

    fn is_reset(&self) -> bool {
        IndependentWatchdog::is_reset(self)
    }

    fn state(&self) -> State {
        IndependentWatchdog::state(self)
    }
}

impl<B: IwdtBus> watchdog::Watchdog for IndependentWatchdog<B> {
    fn feed(&mut self) {
        self.kick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimIwdt;

    #[test]
    fn init_is_a_no_op() {
        let mut iwdt = IndependentWatchdog::new(SimIwdt::after_reset(0x4000));
        iwdt.init(&WatchdogConfig::new().period(u32::MAX)).unwrap();

        assert_eq!(iwdt.bus().writes(), Default::default());
        assert!(iwdt.is_reset());
        assert_eq!(iwdt.state(), State::Armed);
    }

    #[test]
    fn kick_writes_the_pair() {
        let mut iwdt = IndependentWatchdog::new(SimIwdt::new());
        iwdt.kick();

        let log: Vec<u8> = iwdt.bus().refresh_log().iter().copied().collect();
        assert_eq!(log, [0x00, 0xFF]);
    }

    #[test]
    fn reset_flags() {
        let cases = [
            (0x0000, false),
            (0x3FFF, false),
            (0x4000, true),
            (0x8000, true),
            (0xC123, true),
        ];
        for &(status, reset) in cases.iter() {
            let iwdt = IndependentWatchdog::new(SimIwdt::after_reset(status));
            assert_eq!(iwdt.is_reset(), reset, "{:#06x}", status);
            assert_eq!(iwdt.is_reset(), reset, "{:#06x}", status);
        }
    }

    #[test]
    fn counter() {
        let mut sim = SimIwdt::after_reset(0x8000);
        sim.set_counter(0x2000);
        assert_eq!(IndependentWatchdog::new(sim).counter(), 0x2000);
    }
}
