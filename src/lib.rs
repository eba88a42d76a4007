//! Watchdog support for Renesas Synergy S-series parts.
//!
//! Production builds service the IWDT, whose behaviour is fixed by the OFS0
//! fuse word. Engineering builds (`engineering` feature) use the clock-derived
//! WDT instead and configure it at boot through [`WatchdogConfig`]. The `sim`
//! feature swaps either register block for an in-memory stand-in.
//!
//! ```no_run
//! use synergy_wdt::{RunAction, WatchdogConfig, WatchdogTimer};
//!
//! let mut wdg = synergy_wdt::take(48_000_000).unwrap();
//! let was_reset = wdg.is_reset();
//! wdg.init(&WatchdogConfig::new().period(100).on_start(RunAction::Start))
//!     .unwrap();
//! # let _ = was_reset;
//! loop {
//!     // periodic task
//!     wdg.kick();
//! }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod iwdt;
pub mod period;
pub mod regs;
pub mod simulated;
pub mod wdt;
pub mod window;

pub use crate::config::{RunAction, WatchdogConfig};
pub use crate::dispatch::{take, ActiveWatchdog, State, WatchdogTimer};
pub use crate::error::Error;
pub use crate::iwdt::IndependentWatchdog;
pub use crate::period::{resolve, PeriodCycleEntry};
pub use crate::wdt::ClockWatchdog;
pub use crate::window::{encode_window, Window, WindowEnd, WindowStart};
