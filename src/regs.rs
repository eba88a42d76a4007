//! WDT and IWDT register blocks.
//!
//! S3A7 manual - ch. 24 (WDT), ch. 25 (IWDT)

use core::ops::Range;

use bit_field::BitField;
use cortex_m::interrupt;
use volatile_register::{RO, RW};

pub const WDT_ADDR: usize = 0x4004_4200;
pub const IWDT_ADDR: usize = 0x4004_4400;

/// A refresh is 0x00 then 0xFF to the refresh register, back to back.
pub const REFRESH_FIRST: u8 = 0x00;
pub const REFRESH_SECOND: u8 = 0xFF;

/// UNDFF | REFEF, shared by WDTSR and IWDTSR.
pub const STATUS_ERR_MASK: u16 = 0xC000;
pub const STATUS_CNTVAL: Field = Field::new(0, 14);

/// WDTCR
pub const CR_TOPS: Field = Field::new(0, 2);
pub const CR_CKS: Field = Field::new(4, 4);
pub const CR_RPES: Field = Field::new(8, 2);
pub const CR_RPSS: Field = Field::new(12, 2);
/// Bits of WDTCR that are not reserved.
pub const CR_WRITABLE: u16 = 0x33F3;

/// WDTRCR.RSTIRQS: reset on expiry instead of an NMI
pub const RCR_RSTIRQS: usize = 7;
/// WDTCSTPR.SLCSTP: stop counting in sleep mode
pub const CSTPR_SLCSTP: usize = 7;

// Power-on values
pub const WDTCR_RESET: u16 = 0x33F3;
pub const WDTRCR_RESET: u8 = 0x80;
pub const WDTCSTPR_RESET: u8 = 0x80;

/// A bit field inside a register word, given as offset and width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub offset: usize,
    pub width: usize,
}

impl Field {
    pub const fn new(offset: usize, width: usize) -> Field {
        Field { offset, width }
    }

    fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.width
    }

    fn low_mask(&self) -> u32 {
        (1u32 << self.width) - 1
    }

    /// Mask of the field in place.
    pub fn mask(&self) -> u32 {
        self.low_mask() << self.offset
    }

    pub fn extract(&self, word: u32) -> u32 {
        word.get_bits(self.range())
    }

    /// `(word & !mask) | ((value << offset) & mask)`
    ///
    /// Value bits that do not fit the field are dropped, never spilled into
    /// the neighbours.
    pub fn insert(&self, word: u32, value: u32) -> u32 {
        let mut word = word;
        word.set_bits(self.range(), value & self.low_mask());
        word
    }
}

/// Read-modify-write of one field in a 16-bit register value.
pub fn modify_field(reg: u16, field: Field, value: u32) -> u16 {
    field.insert(u32::from(reg), value) as u16
}

#[repr(C)]
pub struct WdtRegs {
    wdtrr: RW<u8>,
    _pad0: u8,
    wdtcr: RW<u16>,
    wdtsr: RW<u16>,
    wdtrcr: RW<u8>,
    _pad1: u8,
    wdtcstpr: RW<u8>,
}

#[repr(C)]
pub struct IwdtRegs {
    iwdtrr: RW<u8>,
    _pad0: [u8; 3],
    iwdtsr: RO<u16>,
}

impl WdtRegs {
    /// # Safety
    ///
    /// The caller must be the only owner of the WDT block, and the bus it sits
    /// on must already be clocked.
    pub unsafe fn steal() -> &'static mut WdtRegs {
        &mut *(WDT_ADDR as *mut WdtRegs)
    }
}

impl IwdtRegs {
    /// # Safety
    ///
    /// Same as [`WdtRegs::steal`], for the IWDT block.
    pub unsafe fn steal() -> &'static mut IwdtRegs {
        &mut *(IWDT_ADDR as *mut IwdtRegs)
    }
}

/// Access to a clock-derived watchdog register block.
///
/// Implemented by the memory-mapped block and by the in-memory stand-in in
/// `simulated`.
pub trait WdtBus {
    /// Two byte stores to the refresh register with nothing in between.
    fn write_refresh_pair(&mut self, first: u8, second: u8);

    fn control(&self) -> u16;
    fn write_control(&mut self, value: u16);

    fn status(&self) -> u16;
    /// Error flags clear on 0 and ignore 1; CNTVAL is read-only.
    fn write_status(&mut self, value: u16);

    fn reset_control(&self) -> u8;
    fn write_reset_control(&mut self, value: u8);

    fn stop_control(&self) -> u8;
    fn write_stop_control(&mut self, value: u8);
}

/// Access to an independent watchdog register block. Everything but the
/// refresh register is either read-only or fixed by OFS0.
pub trait IwdtBus {
    fn write_refresh_pair(&mut self, first: u8, second: u8);
    fn status(&self) -> u16;
}

impl WdtBus for &'static mut WdtRegs {
    fn write_refresh_pair(&mut self, first: u8, second: u8) {
        interrupt::free(|_| unsafe {
            self.wdtrr.write(first);
            self.wdtrr.write(second);
        });
    }

    fn control(&self) -> u16 {
        self.wdtcr.read()
    }

    fn write_control(&mut self, value: u16) {
        unsafe { self.wdtcr.write(value & CR_WRITABLE) }
    }

    fn status(&self) -> u16 {
        self.wdtsr.read()
    }

    fn write_status(&mut self, value: u16) {
        unsafe { self.wdtsr.write(value) }
    }

    fn reset_control(&self) -> u8 {
        self.wdtrcr.read()
    }

    fn write_reset_control(&mut self, value: u8) {
        unsafe { self.wdtrcr.write(value & 0x80) }
    }

    fn stop_control(&self) -> u8 {
        self.wdtcstpr.read()
    }

    fn write_stop_control(&mut self, value: u8) {
        unsafe { self.wdtcstpr.write(value & 0x80) }
    }
}

impl IwdtBus for &'static mut IwdtRegs {
    fn write_refresh_pair(&mut self, first: u8, second: u8) {
        interrupt::free(|_| unsafe {
            self.iwdtrr.write(first);
            self.iwdtrr.write(second);
        });
    }

    fn status(&self) -> u16 {
        self.iwdtsr.read()
    }
}
