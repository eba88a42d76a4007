//! Clock-derived watchdog (WDT).
//!
//! The WDT runs in register-start mode: `init` writes WDTCR once and the
//! first refresh starts the counter. WDTCR, WDTRCR and WDTCSTPR only accept a
//! single write after reset, so `init` skips every write that would not change
//! the register.

use bit_field::BitField;
use embedded_hal::watchdog;

use crate::config::{RunAction, WatchdogConfig};
use crate::dispatch::{State, WatchdogTimer};
use crate::error::Error;
use crate::period::{self, ClockDivisor, TimeoutCycles};
use crate::regs::{
    modify_field, WdtBus, CR_CKS, CR_TOPS, CSTPR_SLCSTP, RCR_RSTIRQS, REFRESH_FIRST,
    REFRESH_SECOND, STATUS_CNTVAL, STATUS_ERR_MASK,
};
use crate::window::{Window, WDT_WINDOW};

pub struct ClockWatchdog<B> {
    bus: B,
    pclk_hz: u32,
    state: State,
    flags_cleared: bool,
}

impl<B: WdtBus> ClockWatchdog<B> {
    /// `pclk_hz` is the peripheral clock feeding the WDT.
    pub fn new(bus: B, pclk_hz: u32) -> ClockWatchdog<B> {
        ClockWatchdog {
            bus,
            pclk_hz,
            state: State::Unconfigured,
            flags_cleared: false,
        }
    }

    /// Applies `config` and arms the watchdog.
    ///
    /// Everything is validated before the first register access, so an error
    /// leaves the block untouched. The first call also clears the status error
    /// flags; read `is_reset` before it.
    ///
    /// The first refresh locks WDTCR, WDTRCR and WDTCSTPR until the next
    /// reset. Only calls made before the first `kick` (including the one
    /// `RunAction::Start` issues) take effect; later calls still return `Ok`
    /// and the hardware ignores the writes.
    pub fn init(&mut self, config: &WatchdogConfig) -> Result<(), Error> {
        let entry = if config.period_changed {
            Some(period::resolve(config.period_ms, self.pclk_hz)?)
        } else {
            None
        };

        let window = config.window_policy();
        if config.window_changed && !window.is_open() {
            return Err(Error::EmptyWindow {
                start: window.start,
                end: window.end,
            });
        }

        if !self.flags_cleared {
            let status = self.bus.status();
            if status & STATUS_ERR_MASK != 0 {
                self.bus.write_status(status & !STATUS_ERR_MASK);
            }
            self.flags_cleared = true;
        }

        let mut rcr = self.bus.reset_control();
        if !rcr.get_bit(RCR_RSTIRQS) {
            rcr.set_bit(RCR_RSTIRQS, true);
            self.bus.write_reset_control(rcr);
        }

        let current = self.bus.control();
        let mut control = current;
        if let Some(entry) = entry {
            control = modify_field(control, CR_TOPS, u32::from(entry.period_select_bits()));
            control = modify_field(control, CR_CKS, u32::from(entry.divisor_bits()));
        }
        if config.window_changed {
            control = WDT_WINDOW.apply(u32::from(control), window) as u16;
        }
        if !config.leaves_control() && control != current {
            #[cfg(feature = "defmt")]
            defmt::debug!("WDTCR {=u16:#x} -> {=u16:#x}", current, control);
            self.bus.write_control(control);
        }

        let stop_in_sleep = match config.sleep_action {
            RunAction::Start => Some(false),
            RunAction::Stop => Some(true),
            RunAction::NoOp => None,
        };
        if let Some(stop) = stop_in_sleep {
            let mut cstpr = self.bus.stop_control();
            if cstpr.get_bit(CSTPR_SLCSTP) != stop {
                cstpr.set_bit(CSTPR_SLCSTP, stop);
                self.bus.write_stop_control(cstpr);
            }
        }

        self.state = State::Armed;
        if config.start_action == RunAction::Start {
            self.kick();
        }
        Ok(())
    }

    /// Refreshes the counter.
    ///
    /// Must land inside the configured window; a refresh outside it resets
    /// the part.
    pub fn kick(&mut self) {
        self.bus.write_refresh_pair(REFRESH_FIRST, REFRESH_SECOND);
    }

    /// Whether the previous reset came from this watchdog (underflow or
    /// refresh error). Does not clear anything.
    pub fn is_reset(&self) -> bool {
        self.bus.status() & STATUS_ERR_MASK != 0
    }

    pub fn counter(&self) -> u16 {
        STATUS_CNTVAL.extract(u32::from(self.bus.status())) as u16
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn window(&self) -> Window {
        WDT_WINDOW.read(u32::from(self.bus.control()))
    }

    /// Timeout currently programmed in WDTCR, or `None` if CKS holds a
    /// reserved code.
    pub fn interval_ms(&self) -> Option<u32> {
        let control = u32::from(self.bus.control());
        let cycles = TimeoutCycles::from_bits(CR_TOPS.extract(control) as u16).cycles();
        let divisor = ClockDivisor::from_bits(CR_CKS.extract(control) as u16)?.divisor();
        let total = u64::from(cycles) * u64::from(divisor);
        Some((total * 1000 / u64::from(self.pclk_hz.max(1))) as u32)
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn free(self) -> B {
        self.bus
    }
}

impl<B: WdtBus> WatchdogTimer for ClockWatchdog<B> {
    fn init(&mut self, config: &WatchdogConfig) -> Result<(), Error> {
        ClockWatchdog::init(self, config)
    }

    fn kick(&mut self) {
        ClockWatchdog::kick(self)
    }

    fn is_reset(&self) -> bool {
        ClockWatchdog::is_reset(self)
    }

    fn state(&self) -> State {
        ClockWatchdog::state(self)
    }
}

impl<B: WdtBus> watchdog::Watchdog for ClockWatchdog<B> {
    fn feed(&mut self) {
        self.kick()
    }
}
