//! Counter-driven LED breathing sequencer.
//!
//! The animation is a flat ordered table of disjoint counter ranges, each
//! mapped to one color/intensity pair. Expressing it as a table (instead of
//! per-range conditionals) makes the exactly-one-active-band invariant
//! structural: the constructor rejects any table with gaps or overlaps, so
//! every lookup lands on exactly one band.

use core::fmt;

/// Identifier for the logical LED colors exposed by the board.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LedColor {
    White,
    Purple,
    Blue,
    Cyan,
    Green,
    Yellow,
    Orange,
    Red,
}

impl LedColor {
    /// Deterministic index for lookups into [`ALL_COLORS`].
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            LedColor::White => 0,
            LedColor::Purple => 1,
            LedColor::Blue => 2,
            LedColor::Cyan => 3,
            LedColor::Green => 4,
            LedColor::Yellow => 5,
            LedColor::Orange => 6,
            LedColor::Red => 7,
        }
    }

    /// Attempts to construct a [`LedColor`] from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(LedColor::White),
            1 => Some(LedColor::Purple),
            2 => Some(LedColor::Blue),
            3 => Some(LedColor::Cyan),
            4 => Some(LedColor::Green),
            5 => Some(LedColor::Yellow),
            6 => Some(LedColor::Orange),
            7 => Some(LedColor::Red),
            _ => None,
        }
    }

    /// Short label used in diagnostics output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            LedColor::White => "white",
            LedColor::Purple => "purple",
            LedColor::Blue => "blue",
            LedColor::Cyan => "cyan",
            LedColor::Green => "green",
            LedColor::Yellow => "yellow",
            LedColor::Orange => "orange",
            LedColor::Red => "red",
        }
    }
}

impl fmt::Display for LedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Compile-time catalog of every LED color, indexed by `as_index`.
pub const ALL_COLORS: [LedColor; 8] = [
    LedColor::White,
    LedColor::Purple,
    LedColor::Blue,
    LedColor::Cyan,
    LedColor::Green,
    LedColor::Yellow,
    LedColor::Orange,
    LedColor::Red,
];

/// PWM intensity expressed as a duty percentage.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Intensity(u8);

impl Intensity {
    /// Fully off.
    pub const OFF: Self = Self(0);
    /// Fully on.
    pub const FULL: Self = Self(100);

    /// Creates an intensity, saturating at 100 percent.
    #[must_use]
    pub const fn percent(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Returns the duty percentage in `0..=100`.
    #[must_use]
    pub const fn as_percent(self) -> u8 {
        self.0
    }
}

/// Abstraction over the physical LED outputs.
pub trait LedDriver {
    /// Drives one color at the requested intensity.
    fn set(&mut self, color: LedColor, intensity: Intensity);

    /// Turns every color output off.
    fn all_off(&mut self);
}

/// LED driver that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopLedDriver;

impl NoopLedDriver {
    /// Creates a new no-op LED driver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LedDriver for NoopLedDriver {
    fn set(&mut self, _: LedColor, _: Intensity) {}

    fn all_off(&mut self) {}
}

/// Half-open counter range `[start, end)` mapped to one visual state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Band {
    pub start: u32,
    pub end: u32,
    pub color: LedColor,
    pub intensity: Intensity,
}

impl Band {
    /// Creates a band covering `[start, end)`.
    #[must_use]
    pub const fn new(start: u32, end: u32, color: LedColor, intensity: Intensity) -> Self {
        Self {
            start,
            end,
            color,
            intensity,
        }
    }

    /// Returns `true` when the band's range contains `position`.
    #[must_use]
    pub const fn contains(&self, position: u32) -> bool {
        self.start <= position && position < self.end
    }
}

/// Number of scheduler cycles in one full breathing period.
pub const BREATHE_CYCLE_LENGTH: u32 = 3_800;

/// The breathing animation: white fades through the spectrum down to a
/// short red tail, then wraps back to white.
pub const BREATHE_BANDS: [Band; 8] = [
    Band::new(0, 900, LedColor::White, Intensity::percent(100)),
    Band::new(900, 1_700, LedColor::Purple, Intensity::percent(90)),
    Band::new(1_700, 2_300, LedColor::Blue, Intensity::percent(80)),
    Band::new(2_300, 2_800, LedColor::Cyan, Intensity::percent(70)),
    Band::new(2_800, 3_200, LedColor::Green, Intensity::percent(60)),
    Band::new(3_200, 3_500, LedColor::Yellow, Intensity::percent(50)),
    Band::new(3_500, 3_700, LedColor::Orange, Intensity::percent(40)),
    Band::new(3_700, 3_800, LedColor::Red, Intensity::percent(30)),
];

/// Errors rejected by [`BlinkSequencer::from_bands`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BandTableError {
    /// Table contains no bands.
    Empty,
    /// First band does not start at position zero.
    MissingOrigin,
    /// A band's range is empty or inverted.
    EmptyBand { index: usize },
    /// A band leaves a gap after, or overlaps, its predecessor.
    NotContiguous { index: usize },
}

/// Deterministic state machine mapping a cyclic counter to the active band.
///
/// Advanced exactly once per super-loop cycle; fully reproducible from
/// `position` alone, with no external input and no randomness.
#[derive(Clone, Debug)]
pub struct BlinkSequencer {
    bands: &'static [Band],
    period: u32,
    position: u32,
}

impl BlinkSequencer {
    /// Creates a sequencer over the default breathing table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bands: &BREATHE_BANDS,
            period: BREATHE_CYCLE_LENGTH,
            position: 0,
        }
    }

    /// Creates a sequencer over a caller-supplied band table.
    ///
    /// The table must start at zero and tile its full range with no gaps and
    /// no overlaps; the period is the final band's `end`.
    pub fn from_bands(bands: &'static [Band]) -> Result<Self, BandTableError> {
        let Some(first) = bands.first() else {
            return Err(BandTableError::Empty);
        };
        if first.start != 0 {
            return Err(BandTableError::MissingOrigin);
        }

        let mut covered = 0;
        for (index, band) in bands.iter().enumerate() {
            if band.end <= band.start {
                return Err(BandTableError::EmptyBand { index });
            }
            if band.start != covered {
                return Err(BandTableError::NotContiguous { index });
            }
            covered = band.end;
        }

        Ok(Self {
            bands,
            period: covered,
            position: 0,
        })
    }

    /// Returns the current counter position in `[0, period)`.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Returns the number of cycles in one full period.
    #[must_use]
    pub const fn period(&self) -> u32 {
        self.period
    }

    /// Returns the band whose range contains the current position.
    #[must_use]
    pub fn active_band(&self) -> &Band {
        self.band_at(self.position)
    }

    /// Returns the band covering an arbitrary position (modulo the period).
    #[must_use]
    pub fn band_at(&self, position: u32) -> &Band {
        let position = position % self.period;
        // Total coverage is guaranteed at construction, so the lookup always
        // lands on exactly one band.
        self.bands
            .iter()
            .find(|band| band.contains(position))
            .unwrap_or(&self.bands[0])
    }

    /// Advances the counter by one cycle and re-drives the LED outputs.
    ///
    /// All colors are switched off before the covering band's color is lit,
    /// so a band transition turns the old color off in the same step that
    /// lights the new one.
    pub fn advance<L: LedDriver>(&mut self, leds: &mut L) {
        self.position = (self.position + 1) % self.period;
        leds.all_off();

        let band = self.band_at(self.position);
        leds.set(band.color, band.intensity);
    }
}

impl Default for BlinkSequencer {
    fn default() -> Self {
        Self::new()
    }
}
