//! Period to TOPS/CKS selection.
//!
//! The WDT times out after `cycles * divisor` PCLK cycles, where cycles comes
//! from WDTCR.TOPS and the divisor from WDTCR.CKS. `WDT_CYCLE_TABLE` lists
//! every distinct product in ascending order.

use crate::error::Error;

/// WDTCR.TOPS
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeoutCycles {
    Cycles1024 = 0b00,
    Cycles4096 = 0b01,
    Cycles8192 = 0b10,
    Cycles16384 = 0b11,
}

/// WDTCR.CKS
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockDivisor {
    Div4 = 0b0001,
    Div64 = 0b0100,
    Div128 = 0b1111,
    Div512 = 0b0110,
    Div2048 = 0b0111,
    Div8192 = 0b1000,
}

impl TimeoutCycles {
    pub fn from_bits(bits: u16) -> TimeoutCycles {
        match bits & 0b11 {
            0b00 => TimeoutCycles::Cycles1024,
            0b01 => TimeoutCycles::Cycles4096,
            0b10 => TimeoutCycles::Cycles8192,
            _ => TimeoutCycles::Cycles16384,
        }
    }

    pub const fn cycles(self) -> u32 {
        match self {
            TimeoutCycles::Cycles1024 => 1024,
            TimeoutCycles::Cycles4096 => 4096,
            TimeoutCycles::Cycles8192 => 8192,
            TimeoutCycles::Cycles16384 => 16384,
        }
    }
}

impl ClockDivisor {
    /// `None` for the reserved codes.
    pub fn from_bits(bits: u16) -> Option<ClockDivisor> {
        match bits {
            0b0001 => Some(ClockDivisor::Div4),
            0b0100 => Some(ClockDivisor::Div64),
            0b1111 => Some(ClockDivisor::Div128),
            0b0110 => Some(ClockDivisor::Div512),
            0b0111 => Some(ClockDivisor::Div2048),
            0b1000 => Some(ClockDivisor::Div8192),
            _ => None,
        }
    }

    pub const fn divisor(self) -> u32 {
        match self {
            ClockDivisor::Div4 => 4,
            ClockDivisor::Div64 => 64,
            ClockDivisor::Div128 => 128,
            ClockDivisor::Div512 => 512,
            ClockDivisor::Div2048 => 2048,
            ClockDivisor::Div8192 => 8192,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeriodCycleEntry {
    /// PCLK cycles until the counter underflows.
    pub cycle_threshold: u32,
    pub period_select: TimeoutCycles,
    pub divisor: ClockDivisor,
}

impl PeriodCycleEntry {
    const fn new(period_select: TimeoutCycles, divisor: ClockDivisor) -> PeriodCycleEntry {
        PeriodCycleEntry {
            cycle_threshold: period_select.cycles() * divisor.divisor(),
            period_select,
            divisor,
        }
    }

    pub fn period_select_bits(&self) -> u16 {
        self.period_select as u16
    }

    pub fn divisor_bits(&self) -> u16 {
        self.divisor as u16
    }

    /// Timeout this entry gives at `clock_hz`, rounded down.
    pub fn timeout_ms(&self, clock_hz: u32) -> u32 {
        (u64::from(self.cycle_threshold) * 1000 / u64::from(clock_hz.max(1))) as u32
    }
}

use self::ClockDivisor::*;
use self::TimeoutCycles::*;

/// Where two settings give the same product the smaller divisor wins, since
/// it leaves the finer counter.
#[rustfmt::skip]
pub const WDT_CYCLE_TABLE: [PeriodCycleEntry; 15] = [
    PeriodCycleEntry::new(Cycles1024,  Div4),    //       4_096
    PeriodCycleEntry::new(Cycles4096,  Div4),    //      16_384
    PeriodCycleEntry::new(Cycles8192,  Div4),    //      32_768
    PeriodCycleEntry::new(Cycles16384, Div4),    //      65_536
    PeriodCycleEntry::new(Cycles1024,  Div128),  //     131_072
    PeriodCycleEntry::new(Cycles4096,  Div64),   //     262_144
    PeriodCycleEntry::new(Cycles8192,  Div64),   //     524_288
    PeriodCycleEntry::new(Cycles16384, Div64),   //   1_048_576
    PeriodCycleEntry::new(Cycles16384, Div128),  //   2_097_152
    PeriodCycleEntry::new(Cycles8192,  Div512),  //   4_194_304
    PeriodCycleEntry::new(Cycles16384, Div512),  //   8_388_608
    PeriodCycleEntry::new(Cycles8192,  Div2048), //  16_777_216
    PeriodCycleEntry::new(Cycles16384, Div2048), //  33_554_432
    PeriodCycleEntry::new(Cycles8192,  Div8192), //  67_108_864
    PeriodCycleEntry::new(Cycles16384, Div8192), // 134_217_728
];

const fn is_strictly_ascending(table: &[PeriodCycleEntry]) -> bool {
    let mut i = 1;
    while i < table.len() {
        if table[i].cycle_threshold <= table[i - 1].cycle_threshold {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(is_strictly_ascending(&WDT_CYCLE_TABLE));

/// Picks the smallest WDT setting whose timeout is longer than `period_ms`.
///
/// See [`resolve_in`].
pub fn resolve(period_ms: u32, clock_hz: u32) -> Result<PeriodCycleEntry, Error> {
    resolve_in(&WDT_CYCLE_TABLE, period_ms, clock_hz)
}

/// Picks the first entry of `table` whose threshold is strictly greater than
/// `clock_hz / 1000 * period_ms` cycles.
///
/// `table` must be sorted by ascending threshold. Periods past the last entry,
/// and periods whose cycle count does not fit in 32 bits, are
/// `Error::PeriodOutOfRange`.
///
/// `clock_hz` is truncated to whole kHz, so at a clock that is not a whole
/// number of kHz the chosen timeout can fall short of `period_ms` by less than
/// `period_ms` cycles. At 52_428_999 Hz a 10 ms request needs 524_290 cycles
/// but resolves to 524_288.
pub fn resolve_in(
    table: &[PeriodCycleEntry],
    period_ms: u32,
    clock_hz: u32,
) -> Result<PeriodCycleEntry, Error> {
    let out_of_range = Error::PeriodOutOfRange {
        period_ms,
        clock_hz,
    };

    let required = (clock_hz / 1000)
        .checked_mul(period_ms)
        .ok_or(out_of_range)?;

    table
        .iter()
        .find(|entry| entry.cycle_threshold > required)
        .copied()
        .ok_or(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn table_matches_register_codes() {
        for entry in WDT_CYCLE_TABLE.iter() {
            assert_eq!(
                entry.cycle_threshold,
                entry.period_select.cycles() * entry.divisor.divisor()
            );
        }
        assert!(is_strictly_ascending(&WDT_CYCLE_TABLE));
        assert_eq!(WDT_CYCLE_TABLE[6].period_select_bits(), 0b10);
        assert_eq!(WDT_CYCLE_TABLE[6].divisor_bits(), 0b0100);
        assert_eq!(WDT_CYCLE_TABLE[4].divisor_bits(), 0b1111);
    }

    #[test]
    fn codes_decode() {
        for entry in WDT_CYCLE_TABLE.iter() {
            assert_eq!(TimeoutCycles::from_bits(entry.period_select_bits()), entry.period_select);
            assert_eq!(ClockDivisor::from_bits(entry.divisor_bits()), Some(entry.divisor));
        }
        assert_eq!(ClockDivisor::from_bits(0b0000), None);
        assert_eq!(ClockDivisor::from_bits(0b0010), None);
    }

    #[test]
    fn ten_ms_at_48_mhz() {
        // 48_000 * 10 = 480_000 cycles
        let entry = resolve(10, 48_000_000).unwrap();
        assert_eq!(entry.cycle_threshold, 524_288);
        assert_eq!(entry.period_select, TimeoutCycles::Cycles8192);
        assert_eq!(entry.divisor, ClockDivisor::Div64);
        assert_eq!(entry.timeout_ms(48_000_000), 10);
    }

    #[test]
    fn exact_threshold_moves_up() {
        // one cycle per ms at 1 kHz, so 4_096 ms lands exactly on the first threshold
        let entry = resolve(4_096, 1_000).unwrap();
        assert_eq!(entry.cycle_threshold, 16_384);
    }

    #[test]
    fn zero_period_takes_the_smallest() {
        assert_eq!(resolve(0, 48_000_000).unwrap(), WDT_CYCLE_TABLE[0]);
    }

    #[test]
    fn largest_timeout_is_not_a_default() {
        // 134_217_728 / 48_000 = 2796.2 ms
        assert!(resolve(2_796, 48_000_000).is_ok());
        assert_eq!(
            resolve(2_797, 48_000_000),
            Err(Error::PeriodOutOfRange {
                period_ms: 2_797,
                clock_hz: 48_000_000
            })
        );
    }

    #[test]
    fn overflow_is_out_of_range() {
        assert_eq!(
            resolve(u32::MAX, 120_000_000),
            Err(Error::PeriodOutOfRange {
                period_ms: u32::MAX,
                clock_hz: 120_000_000
            })
        );
    }

    #[test]
    fn sub_khz_clock_is_truncated() {
        let entry = resolve(10, 52_428_999).unwrap();
        assert_eq!(entry.cycle_threshold, 524_288);
        // 52_428.999 cycles/ms * 10 ms
        assert!(u64::from(entry.cycle_threshold) < 524_290);
    }

    #[test]
    fn custom_table() {
        let table = [WDT_CYCLE_TABLE[0], WDT_CYCLE_TABLE[14]];
        assert_eq!(resolve_in(&table, 1, 8_000_000).unwrap(), table[1]);
        assert!(resolve_in(&[], 0, 8_000_000).is_err());
    }

    proptest! {
        #[test]
        fn never_undershoots(clock_khz in 1_000u32..=240_000, period_ms in 0u32..=5_000) {
            let clock_hz = clock_khz * 1000;
            match resolve(period_ms, clock_hz) {
                Ok(entry) => {
                    prop_assert!(
                        u64::from(entry.cycle_threshold) * 1000
                            >= u64::from(period_ms) * u64::from(clock_hz)
                    );
                }
                Err(_) => {
                    let last = WDT_CYCLE_TABLE[WDT_CYCLE_TABLE.len() - 1];
                    prop_assert!(u64::from(clock_khz) * u64::from(period_ms) >= u64::from(last.cycle_threshold));
                }
            }
        }

        #[test]
        fn shortfall_is_under_one_cycle_per_ms(clock_hz in 1_000_000u32..=240_000_000, period_ms in 0u32..=2_000) {
            if let Ok(entry) = resolve(period_ms, clock_hz) {
                let exact = u64::from(period_ms) * u64::from(clock_hz);
                let slack = u64::from(period_ms) * 1000;
                prop_assert!(u64::from(entry.cycle_threshold) * 1000 + slack > exact);
            }
        }

        #[test]
        fn picks_the_first_match(clock_khz in 1_000u32..=240_000, period_ms in 0u32..=2_000) {
            let clock_hz = clock_khz * 1000;
            if let Ok(entry) = resolve(period_ms, clock_hz) {
                let required = clock_khz * period_ms;
                for smaller in WDT_CYCLE_TABLE.iter().take_while(|e| e.cycle_threshold < entry.cycle_threshold) {
                    prop_assert!(smaller.cycle_threshold <= required);
                }
            }
        }
    }
}
