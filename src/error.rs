use core::fmt;

use crate::window::{WindowEnd, WindowStart};

/// Configuration errors reported by `init`.
///
/// Faults raised by the hardware itself (a refresh outside the window, or no
/// refresh before expiry) never show up here. They reset the part, and the
/// only trace left is `is_reset()` on the next boot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The requested period is longer than the largest timeout the counter
    /// can express at this clock frequency.
    PeriodOutOfRange { period_ms: u32, clock_hz: u32 },
    /// The window closes before (or exactly when) it opens, so every refresh
    /// would be a refresh error.
    EmptyWindow { start: WindowStart, end: WindowEnd },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::PeriodOutOfRange { period_ms, clock_hz } => write!(
                f,
                "watchdog period of {} ms is out of range for a {} Hz clock",
                period_ms, clock_hz
            ),
            Error::EmptyWindow { start, end } => write!(
                f,
                "refresh window {}%..{}% never opens",
                start.percent(),
                end.percent()
            ),
        }
    }
}
