use lumen_core::sequencer::{
    BREATHE_BANDS, BREATHE_CYCLE_LENGTH, BlinkSequencer, Intensity, LedColor, LedDriver,
};

/// LED sink that enforces the exactly-one-lit contract on every advance.
#[derive(Default)]
struct CheckedLeds {
    lit: Option<(LedColor, Intensity)>,
    sets_since_off: u32,
}

impl LedDriver for CheckedLeds {
    fn set(&mut self, color: LedColor, intensity: Intensity) {
        self.sets_since_off += 1;
        assert_eq!(
            self.sets_since_off, 1,
            "more than one color lit in a single step"
        );
        self.lit = Some((color, intensity));
    }

    fn all_off(&mut self) {
        self.lit = None;
        self.sets_since_off = 0;
    }
}

#[test]
fn exactly_one_color_lit_after_every_cycle() {
    let mut sequencer = BlinkSequencer::new();
    let mut leds = CheckedLeds::default();

    for n in 1..=u32::from(u16::MAX) {
        sequencer.advance(&mut leds);

        let expected = sequencer.band_at(n % BREATHE_CYCLE_LENGTH);
        assert_eq!(leds.lit, Some((expected.color, expected.intensity)));
    }
}

#[test]
fn full_period_returns_to_white_at_origin() {
    let mut sequencer = BlinkSequencer::new();
    let mut leds = CheckedLeds::default();

    for _ in 0..BREATHE_CYCLE_LENGTH {
        sequencer.advance(&mut leds);
    }

    assert_eq!(sequencer.position(), 0);
    assert_eq!(
        leds.lit,
        Some((LedColor::White, Intensity::percent(100))),
        "full wraparound must land back on white at full intensity"
    );
}

#[test]
fn white_hands_off_to_purple_in_one_step() {
    let mut sequencer = BlinkSequencer::new();
    let mut leds = CheckedLeds::default();

    for _ in 0..899 {
        sequencer.advance(&mut leds);
    }
    assert_eq!(leds.lit.map(|(color, _)| color), Some(LedColor::White));

    // The transition step both extinguishes white and lights purple.
    sequencer.advance(&mut leds);
    assert_eq!(
        leds.lit,
        Some((LedColor::Purple, Intensity::percent(90)))
    );
    assert_eq!(leds.sets_since_off, 1);
}

#[test]
fn color_sequence_is_identical_across_runs() {
    let mut first = Vec::new();
    let mut second = Vec::new();

    for out in [&mut first, &mut second] {
        let mut sequencer = BlinkSequencer::new();
        let mut leds = CheckedLeds::default();
        for _ in 0..BREATHE_CYCLE_LENGTH {
            sequencer.advance(&mut leds);
            out.push(leds.lit.expect("a color must be lit"));
        }
    }

    assert_eq!(first, second);
}

#[test]
fn band_dwell_times_match_the_table() {
    let mut sequencer = BlinkSequencer::new();
    let mut leds = CheckedLeds::default();
    let mut dwell = [0_u32; 8];

    for _ in 0..BREATHE_CYCLE_LENGTH {
        sequencer.advance(&mut leds);
        let (color, _) = leds.lit.expect("a color must be lit");
        dwell[color.as_index()] += 1;
    }

    for band in &BREATHE_BANDS {
        assert_eq!(dwell[band.color.as_index()], band.end - band.start);
    }
}
