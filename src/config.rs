use crate::window::{Window, WindowEnd, WindowStart};

/// What `init` does to a counter or a counting mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunAction {
    Start,
    Stop,
    NoOp,
}

/// Boot-time watchdog settings, consumed once by `init`.
///
/// Each group of fields has a change flag. Fields whose flag is clear are not
/// written, so a partial configuration leaves the rest of the control
/// register as it was. The builder methods set value and flag together.
///
/// `start_action`:
/// * `Start` refreshes once at the end of `init`, which starts the counter.
/// * `Stop` skips that refresh; the counter stays halted until the first
///   kick. The WDT has no stop bit, so a counter that is already running
///   keeps running.
/// * `NoOp` leaves the counter alone.
///
/// `sleep_action`:
/// * `Start` keeps counting in sleep mode.
/// * `Stop` stops counting in sleep mode.
/// * `NoOp` leaves WDTCSTPR alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchdogConfig {
    pub period_changed: bool,
    pub period_ms: u32,
    pub window_changed: bool,
    pub window_start: WindowStart,
    pub window_end: WindowEnd,
    pub start_action: RunAction,
    pub sleep_action: RunAction,
}

impl Default for WatchdogConfig {
    fn default() -> WatchdogConfig {
        WatchdogConfig::new()
    }
}

impl WatchdogConfig {
    /// A configuration that changes nothing.
    pub const fn new() -> WatchdogConfig {
        WatchdogConfig {
            period_changed: false,
            period_ms: 0,
            window_changed: false,
            window_start: WindowStart::Pct100,
            window_end: WindowEnd::Pct0,
            start_action: RunAction::NoOp,
            sleep_action: RunAction::NoOp,
        }
    }

    pub const fn period(mut self, period_ms: u32) -> WatchdogConfig {
        self.period_changed = true;
        self.period_ms = period_ms;
        self
    }

    pub const fn window(mut self, start: WindowStart, end: WindowEnd) -> WatchdogConfig {
        self.window_changed = true;
        self.window_start = start;
        self.window_end = end;
        self
    }

    pub const fn on_start(mut self, action: RunAction) -> WatchdogConfig {
        self.start_action = action;
        self
    }

    pub const fn on_sleep(mut self, action: RunAction) -> WatchdogConfig {
        self.sleep_action = action;
        self
    }

    pub fn window_policy(&self) -> Window {
        Window::new(self.window_start, self.window_end)
    }

    /// True if `init` has nothing to write to the control register.
    pub fn leaves_control(&self) -> bool {
        !self.period_changed && !self.window_changed
    }
}
