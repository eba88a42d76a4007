//! Refresh window encoding.
//!
//! A refresh is only accepted while the down-counter sits between the start
//! and end positions of the window, given as a percentage of the counter
//! value remaining. Start 100% / end 0% accepts a refresh at any time; start
//! 50% / end 0% only accepts one after half the period has run out.
//!
//! Refreshing outside the window is a refresh error. The hardware resets the
//! part (or raises an NMI); software cannot catch it ahead of time.

use crate::regs::{Field, CR_RPES, CR_RPSS};

/// Window start, as the counter value remaining when refresh becomes allowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WindowStart {
    Pct100 = 0b11,
    Pct75 = 0b10,
    Pct50 = 0b01,
    Pct25 = 0b00,
}

/// Window end, as the counter value remaining when refresh stops being allowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WindowEnd {
    Pct75 = 0b00,
    Pct50 = 0b01,
    Pct25 = 0b10,
    Pct0 = 0b11,
}

impl WindowStart {
    pub const ALL: [WindowStart; 4] = [
        WindowStart::Pct100,
        WindowStart::Pct75,
        WindowStart::Pct50,
        WindowStart::Pct25,
    ];

    pub fn percent(self) -> u8 {
        match self {
            WindowStart::Pct100 => 100,
            WindowStart::Pct75 => 75,
            WindowStart::Pct50 => 50,
            WindowStart::Pct25 => 25,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    pub fn from_bits(bits: u8) -> WindowStart {
        match bits & 0b11 {
            0b11 => WindowStart::Pct100,
            0b10 => WindowStart::Pct75,
            0b01 => WindowStart::Pct50,
            _ => WindowStart::Pct25,
        }
    }
}

impl WindowEnd {
    pub const ALL: [WindowEnd; 4] = [
        WindowEnd::Pct75,
        WindowEnd::Pct50,
        WindowEnd::Pct25,
        WindowEnd::Pct0,
    ];

    pub fn percent(self) -> u8 {
        match self {
            WindowEnd::Pct75 => 75,
            WindowEnd::Pct50 => 50,
            WindowEnd::Pct25 => 25,
            WindowEnd::Pct0 => 0,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    pub fn from_bits(bits: u8) -> WindowEnd {
        match bits & 0b11 {
            0b00 => WindowEnd::Pct75,
            0b01 => WindowEnd::Pct50,
            0b10 => WindowEnd::Pct25,
            _ => WindowEnd::Pct0,
        }
    }
}

/// A start/end pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    pub start: WindowStart,
    pub end: WindowEnd,
}

impl Window {
    /// Refresh allowed for the whole period.
    pub const ALWAYS: Window = Window {
        start: WindowStart::Pct100,
        end: WindowEnd::Pct0,
    };

    pub fn new(start: WindowStart, end: WindowEnd) -> Window {
        Window { start, end }
    }

    /// False when the window closes before it opens. Such a window can still
    /// be encoded, but every refresh under it is a refresh error.
    pub fn is_open(&self) -> bool {
        self.start.percent() > self.end.percent()
    }
}

/// Maps a window onto its two-bit (start, end) codes.
pub fn encode_window(start: WindowStart, end: WindowEnd) -> (u8, u8) {
    (start.bits(), end.bits())
}

/// Where a variant keeps its window fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowLayout {
    pub start: Field,
    pub end: Field,
}

/// WDTCR: RPES[9:8], RPSS[13:12]
pub const WDT_WINDOW: WindowLayout = WindowLayout {
    start: CR_RPSS,
    end: CR_RPES,
};

/// OFS0: IWDTRPES[9:8], IWDTRPSS[11:10]
///
/// The IWDT window lives in the option-setting fuse word and cannot be
/// changed at runtime. This layout is only here so board code can check the
/// fuse value it ships with.
pub const IWDT_WINDOW: WindowLayout = WindowLayout {
    start: Field::new(10, 2),
    end: Field::new(8, 2),
};

impl WindowLayout {
    /// The window bits for this layout, with every other bit clear.
    pub fn place(&self, start: WindowStart, end: WindowEnd) -> u32 {
        self.apply(0, Window::new(start, end))
    }

    /// Applies a window to `word`, leaving the other bits alone.
    pub fn apply(&self, word: u32, window: Window) -> u32 {
        let (start_bits, end_bits) = encode_window(window.start, window.end);
        let word = self.start.insert(word, u32::from(start_bits));
        self.end.insert(word, u32::from(end_bits))
    }

    pub fn read(&self, word: u32) -> Window {
        Window {
            start: WindowStart::from_bits(self.start.extract(word) as u8),
            end: WindowEnd::from_bits(self.end.extract(word) as u8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_matches_manual() {
        assert_eq!(encode_window(WindowStart::Pct100, WindowEnd::Pct0), (0b11, 0b11));
        assert_eq!(encode_window(WindowStart::Pct75, WindowEnd::Pct50), (0b10, 0b01));
        assert_eq!(encode_window(WindowStart::Pct50, WindowEnd::Pct25), (0b01, 0b10));
        assert_eq!(encode_window(WindowStart::Pct25, WindowEnd::Pct75), (0b00, 0b00));
    }

    #[test]
    fn all_sixteen_pairs_are_distinct() {
        for layout in [WDT_WINDOW, IWDT_WINDOW].iter() {
            let mut seen = [0u32; 16];
            let mut n = 0;
            for &start in WindowStart::ALL.iter() {
                for &end in WindowEnd::ALL.iter() {
                    let bits = layout.place(start, end);
                    assert!(!seen[..n].contains(&bits), "{:?} {:?}", start, end);
                    seen[n] = bits;
                    n += 1;
                }
            }
            assert_eq!(n, 16);
        }
    }

    #[test]
    fn layouts_differ() {
        let start = WindowStart::Pct75;
        let end = WindowEnd::Pct25;
        assert_eq!(WDT_WINDOW.place(start, end), 0x2200);
        assert_eq!(IWDT_WINDOW.place(start, end), 0x0A00);
    }

    #[test]
    fn apply_then_read() {
        let word = WDT_WINDOW.apply(0x33F3, Window::new(WindowStart::Pct50, WindowEnd::Pct25));
        assert_eq!(word, 0x12F3);
        assert_eq!(
            WDT_WINDOW.read(word),
            Window::new(WindowStart::Pct50, WindowEnd::Pct25)
        );
    }

    #[test]
    fn open_windows() {
        assert!(Window::ALWAYS.is_open());
        assert!(Window::new(WindowStart::Pct50, WindowEnd::Pct25).is_open());
        assert!(!Window::new(WindowStart::Pct50, WindowEnd::Pct50).is_open());
        assert!(!Window::new(WindowStart::Pct25, WindowEnd::Pct75).is_open());
    }
}
