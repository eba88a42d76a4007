//! In-memory stand-ins for the WDT and IWDT blocks.
//!
//! They follow the register semantics the drivers rely on (power-on values,
//! write-0-to-clear status flags, reserved bits reading as zero) and count
//! every write so host tests can check which registers were touched.
//!
//! `SimWdt` also locks WDTCR, WDTRCR and WDTCSTPR at the first refresh: later
//! writes are counted but ignored, as on the part. The per-register
//! write-once rule before that point is not modelled.

use arraydeque::{ArrayDeque, Wrapping};

use crate::regs::{
    IwdtBus, WdtBus, CR_WRITABLE, STATUS_ERR_MASK, WDTCR_RESET, WDTCSTPR_RESET, WDTRCR_RESET,
};

/// Refresh register history, newest last.
pub type RefreshLog = ArrayDeque<[u8; 16], Wrapping>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub refresh: u32,
    pub control: u32,
    pub status: u32,
    pub reset_control: u32,
    pub stop_control: u32,
}

/// Write-0-to-clear on the error flags; CNTVAL is read-only.
fn clear_status_flags(status: u16, written: u16) -> u16 {
    status & (!STATUS_ERR_MASK | (written & STATUS_ERR_MASK))
}

pub struct SimWdt {
    control: u16,
    status: u16,
    reset_control: u8,
    stop_control: u8,
    locked: bool,
    refresh: RefreshLog,
    writes: WriteCounts,
}

impl SimWdt {
    /// A block as it comes out of a power-on reset.
    pub fn new() -> SimWdt {
        SimWdt {
            control: WDTCR_RESET,
            status: 0,
            reset_control: WDTRCR_RESET,
            stop_control: WDTCSTPR_RESET,
            locked: false,
            refresh: RefreshLog::new(),
            writes: WriteCounts::default(),
        }
    }

    /// A block after a reset caused by this watchdog. `status` is the WDTSR
    /// value left behind, e.g. `0x4000` for an underflow.
    pub fn after_reset(status: u16) -> SimWdt {
        SimWdt {
            status,
            ..SimWdt::new()
        }
    }

    /// Sets the counter, as the hardware would while counting down.
    pub fn set_counter(&mut self, count: u16) {
        self.status = (self.status & STATUS_ERR_MASK) | (count & !STATUS_ERR_MASK);
    }

    /// Whether the first refresh has locked the control registers.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn refresh_log(&self) -> &RefreshLog {
        &self.refresh
    }

    pub fn writes(&self) -> WriteCounts {
        self.writes
    }
}

impl Default for SimWdt {
    fn default() -> SimWdt {
        SimWdt::new()
    }
}

impl WdtBus for SimWdt {
    fn write_refresh_pair(&mut self, first: u8, second: u8) {
        self.refresh.push_back(first);
        self.refresh.push_back(second);
        self.writes.refresh += 2;
        self.locked = true;
    }

    fn control(&self) -> u16 {
        self.control
    }

    fn write_control(&mut self, value: u16) {
        if !self.locked {
            self.control = value & CR_WRITABLE;
        }
        self.writes.control += 1;
    }

    fn status(&self) -> u16 {
        self.status
    }

    fn write_status(&mut self, value: u16) {
        self.status = clear_status_flags(self.status, value);
        self.writes.status += 1;
    }

    fn reset_control(&self) -> u8 {
        self.reset_control
    }

    fn write_reset_control(&mut self, value: u8) {
        if !self.locked {
            self.reset_control = value & 0x80;
        }
        self.writes.reset_control += 1;
    }

    fn stop_control(&self) -> u8 {
        self.stop_control
    }

    fn write_stop_control(&mut self, value: u8) {
        if !self.locked {
            self.stop_control = value & 0x80;
        }
        self.writes.stop_control += 1;
    }
}

pub struct SimIwdt {
    status: u16,
    refresh: RefreshLog,
    writes: WriteCounts,
}

impl SimIwdt {
    pub fn new() -> SimIwdt {
        SimIwdt::after_reset(0)
    }

    pub fn after_reset(status: u16) -> SimIwdt {
        SimIwdt {
            status,
            refresh: RefreshLog::new(),
            writes: WriteCounts::default(),
        }
    }

    pub fn set_counter(&mut self, count: u16) {
        self.status = (self.status & STATUS_ERR_MASK) | (count & !STATUS_ERR_MASK);
    }

    pub fn refresh_log(&self) -> &RefreshLog {
        &self.refresh
    }

    pub fn writes(&self) -> WriteCounts {
        self.writes
    }
}

impl Default for SimIwdt {
    fn default() -> SimIwdt {
        SimIwdt::new()
    }
}

impl IwdtBus for SimIwdt {
    fn write_refresh_pair(&mut self, first: u8, second: u8) {
        self.refresh.push_back(first);
        self.refresh.push_back(second);
        self.writes.refresh += 2;
    }

    fn status(&self) -> u16 {
        self.status
    }
}
