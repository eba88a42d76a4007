//! One watchdog contract, two backends.
//!
//! Application code talks to [`WatchdogTimer`]. Which block sits behind it is
//! decided by cargo features and nothing else:
//!
//! | features              | `ActiveWatchdog`                          |
//! |-----------------------|-------------------------------------------|
//! | (none)                | IWDT, fixed by OFS0, `init` is a no-op     |
//! | `engineering`         | WDT, configured by `init`                  |
//! | `sim`                 | IWDT over `SimIwdt`                        |
//! | `engineering`, `sim`  | WDT over `SimWdt`                          |

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::WatchdogConfig;
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not yet configured by `init`.
    Unconfigured,
    /// Counting, or waiting for the first kick to start counting.
    Armed,
}

/// The operations every watchdog backend provides.
///
/// `init` is called once at boot, before the task that kicks starts. After
/// that only `kick` (from the periodic task) and `is_reset` (from post-reset
/// diagnostics) are used.
pub trait WatchdogTimer {
    fn init(&mut self, config: &WatchdogConfig) -> Result<(), Error>;

    /// Restarts the countdown. A kick outside the refresh window, or no kick
    /// before expiry, resets the part.
    fn kick(&mut self);

    /// Whether the previous boot ended in a reset from this watchdog.
    fn is_reset(&self) -> bool;

    fn state(&self) -> State;
}

#[cfg(all(not(feature = "engineering"), not(feature = "sim")))]
pub type ActiveWatchdog = crate::iwdt::IndependentWatchdog<&'static mut crate::regs::IwdtRegs>;
#[cfg(all(feature = "engineering", not(feature = "sim")))]
pub type ActiveWatchdog = crate::wdt::ClockWatchdog<&'static mut crate::regs::WdtRegs>;
#[cfg(all(not(feature = "engineering"), feature = "sim"))]
pub type ActiveWatchdog = crate::iwdt::IndependentWatchdog<crate::simulated::SimIwdt>;
#[cfg(all(feature = "engineering", feature = "sim"))]
pub type ActiveWatchdog = crate::wdt::ClockWatchdog<crate::simulated::SimWdt>;

static TAKEN: AtomicBool = AtomicBool::new(false);

#[cfg(not(feature = "sim"))]
fn claim() -> bool {
    // no CAS on Cortex-M0+
    cortex_m::interrupt::free(|_| {
        let taken = TAKEN.load(Ordering::Relaxed);
        TAKEN.store(true, Ordering::Relaxed);
        !taken
    })
}

#[cfg(feature = "sim")]
fn claim() -> bool {
    !TAKEN.swap(true, Ordering::Relaxed)
}

/// Hands out the active watchdog, once per program. `pclk_hz` is only used by
/// the WDT backend.
pub fn take(pclk_hz: u32) -> Option<ActiveWatchdog> {
    if !claim() {
        return None;
    }
    Some(build(pclk_hz))
}

#[cfg(all(not(feature = "engineering"), not(feature = "sim")))]
fn build(_pclk_hz: u32) -> ActiveWatchdog {
    crate::iwdt::IndependentWatchdog::new(unsafe { crate::regs::IwdtRegs::steal() })
}

#[cfg(all(feature = "engineering", not(feature = "sim")))]
fn build(pclk_hz: u32) -> ActiveWatchdog {
    crate::wdt::ClockWatchdog::new(unsafe { crate::regs::WdtRegs::steal() }, pclk_hz)
}

#[cfg(all(not(feature = "engineering"), feature = "sim"))]
fn build(_pclk_hz: u32) -> ActiveWatchdog {
    crate::iwdt::IndependentWatchdog::new(crate::simulated::SimIwdt::new())
}

#[cfg(all(feature = "engineering", feature = "sim"))]
fn build(pclk_hz: u32) -> ActiveWatchdog {
    crate::wdt::ClockWatchdog::new(crate::simulated::SimWdt::new(), pclk_hz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunAction;
    use crate::iwdt::IndependentWatchdog;
    use crate::simulated::{SimIwdt, SimWdt};
    use crate::wdt::ClockWatchdog;

    fn boot<W: WatchdogTimer>(wdg: &mut W) -> Result<bool, Error> {
        let was_reset = wdg.is_reset();
        wdg.init(&WatchdogConfig::new().period(500).on_start(RunAction::Start))?;
        for _ in 0..3 {
            wdg.kick();
        }
        Ok(was_reset)
    }

    #[test]
    fn both_backends_serve_the_same_caller() {
        let mut wdt = ClockWatchdog::new(SimWdt::after_reset(0x4000), 48_000_000);
        let mut iwdt = IndependentWatchdog::new(SimIwdt::after_reset(0x4000));

        assert_eq!(boot(&mut wdt), Ok(true));
        assert_eq!(boot(&mut iwdt), Ok(true));

        assert_eq!(wdt.state(), State::Armed);
        assert_eq!(iwdt.state(), State::Armed);
        assert_eq!(wdt.bus().writes().refresh, 8);
        assert_eq!(iwdt.bus().writes().refresh, 6);
    }

    #[cfg(feature = "sim")]
    #[test]
    fn take_hands_out_one_watchdog() {
        let mut wdg = take(48_000_000).expect("first take");
        assert!(take(48_000_000).is_none());

        assert!(!wdg.is_reset());
        wdg.init(&WatchdogConfig::new().period(10)).unwrap();
        wdg.kick();

        assert_eq!(wdg.state(), State::Armed);
        assert!(!wdg.is_reset());
        let log: Vec<u8> = wdg.bus().refresh_log().iter().copied().collect();
        assert_eq!(log, [0x00, 0xFF]);
    }

    #[test]
    fn range_errors_surface_through_the_trait() {
        let mut wdt = ClockWatchdog::new(SimWdt::new(), 120_000_000);
        let wdg: &mut dyn WatchdogTimer = &mut wdt;
        assert!(wdg.init(&WatchdogConfig::new().period(60_000)).is_err());
        assert_eq!(wdg.state(), State::Unconfigured);
    }
}
