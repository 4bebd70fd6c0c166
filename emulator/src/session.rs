//! Host-side rendition of the super-loop against simulated hardware.
//!
//! The session binds the exact scheduler and sequencer from `lumen-core` to
//! a simulated clock, a pulse-counting watchdog, and a terminal-backed LED
//! sink, then narrates every band transition of the breathing animation.

use std::cell::Cell;
use std::io::{self, Write};
use std::ops::Add;
use std::time::Duration;

use crossterm::style::{Color, Stylize};

use lumen_core::flags::SystemFlags;
use lumen_core::report::{BringUpReport, StatusReporter};
use lumen_core::scheduler::{LoopClock, Scheduler, Watchdog};
use lumen_core::sequencer::{Intensity, LedColor, LedDriver};
use lumen_core::task::{InitError, Task};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SimInstant(u64);

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + u64::try_from(rhs.as_micros()).unwrap_or(u64::MAX))
    }
}

/// Clock whose time advances only when the loop idles.
struct SimClock {
    now: Cell<u64>,
    idled: Cell<u64>,
}

impl SimClock {
    fn new() -> Self {
        Self {
            now: Cell::new(0),
            idled: Cell::new(0),
        }
    }
}

impl LoopClock for &SimClock {
    type Instant = SimInstant;

    fn now(&self) -> Self::Instant {
        SimInstant(self.now.get())
    }

    fn idle_until(&mut self, deadline: Self::Instant) {
        let now = self.now.get();
        if deadline.0 > now {
            self.idled.set(self.idled.get() + (deadline.0 - now));
            self.now.set(deadline.0);
        }
    }
}

struct CountingWatchdog {
    pulses: Cell<u64>,
}

impl CountingWatchdog {
    fn new() -> Self {
        Self {
            pulses: Cell::new(0),
        }
    }
}

impl Watchdog for &CountingWatchdog {
    fn pulse(&mut self) {
        self.pulses.set(self.pulses.get() + 1);
    }
}

/// LED sink that remembers the single lit color for rendering.
struct SimLeds {
    lit: Cell<Option<(LedColor, Intensity)>>,
}

impl SimLeds {
    fn new() -> Self {
        Self {
            lit: Cell::new(None),
        }
    }
}

impl LedDriver for &SimLeds {
    fn set(&mut self, color: LedColor, intensity: Intensity) {
        self.lit.set(Some((color, intensity)));
    }

    fn all_off(&mut self) {
        self.lit.set(None);
    }
}

/// Stand-in application task: counts its slices and stays well inside the
/// cycle budget, as every real task must.
struct CounterTask {
    slices: u64,
}

impl Task for CounterTask {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn initialize(&mut self) -> Result<(), InitError> {
        Ok(())
    }

    fn run_once(&mut self, _: &SystemFlags) {
        self.slices += 1;
    }
}

/// Stand-in driver whose bring-up fails, demonstrating the fail-forward
/// policy: it stays in the schedule and degrades to a no-op.
struct FlakyProbeTask;

impl Task for FlakyProbeTask {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn initialize(&mut self) -> Result<(), InitError> {
        Err(InitError::new("simulated sensor fault"))
    }

    fn run_once(&mut self, _: &SystemFlags) {}
}

struct ConsoleStatusReporter;

impl StatusReporter for ConsoleStatusReporter {
    fn report(&mut self, report: &BringUpReport) {
        println!(
            "bring-up: {} task(s), {} failure(s)",
            report.entries().len(),
            report.failure_count()
        );
        for entry in report.entries() {
            if entry.ready {
                println!("  {} {}", entry.name, "ready".green());
            } else {
                println!(
                    "  {} {} ({})",
                    entry.name,
                    "not ready".red(),
                    entry.failure.unwrap_or("no reason given")
                );
            }
        }
    }
}

fn terminal_color(color: LedColor) -> Color {
    match color {
        LedColor::White => Color::White,
        LedColor::Purple => Color::Magenta,
        LedColor::Blue => Color::Blue,
        LedColor::Cyan => Color::Cyan,
        LedColor::Green => Color::Green,
        LedColor::Yellow => Color::Yellow,
        LedColor::Orange => Color::Rgb {
            r: 255,
            g: 165,
            b: 0,
        },
        LedColor::Red => Color::Red,
    }
}

pub struct Session {
    clock: SimClock,
    watchdog: CountingWatchdog,
    leds: SimLeds,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            clock: SimClock::new(),
            watchdog: CountingWatchdog::new(),
            leds: SimLeds::new(),
        }
    }

    pub fn run(&mut self, cycles: u64) -> io::Result<()> {
        let flags = SystemFlags::new();
        let mut counter = CounterTask { slices: 0 };
        let mut probe = FlakyProbeTask;
        let mut tasks: [&mut dyn Task; 2] = [&mut probe, &mut counter];

        let mut scheduler = Scheduler::new(
            &self.clock,
            &self.watchdog,
            &self.leds,
            &mut tasks,
            &flags,
        );

        scheduler.initialize(&mut ConsoleStatusReporter);

        let stdout = io::stdout();
        let mut writer = stdout.lock();
        let mut last_color: Option<LedColor> = None;

        for cycle in 1..=cycles {
            scheduler.run_cycle();

            let Some((color, intensity)) = self.leds.lit.get() else {
                continue;
            };
            if last_color == Some(color) {
                continue;
            }
            last_color = Some(color);

            writeln!(
                writer,
                "cycle {:>6}  position {:>4}  {} @ {}%",
                cycle,
                scheduler.sequencer().position(),
                format!("{color:>6}").with(terminal_color(color)).bold(),
                intensity.as_percent()
            )?;
        }

        let total_cycles = scheduler.cycles();
        drop(scheduler);

        writeln!(
            writer,
            "{} cycle(s), {} watchdog pulse(s), {} task slice(s), {} ms simulated ({} ms idle)",
            total_cycles,
            self.watchdog.pulses.get(),
            counter.slices,
            self.clock.now.get() / 1_000,
            self.clock.idled.get() / 1_000,
        )?;

        Ok(())
    }
}
