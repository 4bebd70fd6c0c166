//! Fixed-budget cooperative super-loop.
//!
//! The scheduler owns the ordered schedule and the externals the loop
//! consumes: a monotonic clock, the hardware watchdog, and the LED outputs
//! driven by the breathing sequencer. Each cycle gives every task one
//! run-to-completion slice in declaration order, pads the remainder of the
//! cycle budget with the platform's idle primitive, then advances the
//! sequencer by one step.
//!
//! There is no preemption and no per-task supervision. A task that overruns
//! its share simply shrinks the idle step to zero; the only backstop for a
//! wedged task is the watchdog, whose expiry is an uncontrolled device
//! reset outside this crate's scope.

use core::ops::Add;
use core::time::Duration;

use crate::flags::SystemFlags;
use crate::report::{BringUpReport, StatusReporter, TaskStatus};
use crate::sequencer::{BlinkSequencer, LedDriver};
use crate::task::Task;

/// Nominal cycle duration when none is configured.
pub const DEFAULT_CYCLE_BUDGET: Duration = Duration::from_millis(1);

/// Monotonic time source plus the idle primitive that pads each cycle.
pub trait LoopClock {
    /// Monotonic timestamp type.
    type Instant: Copy + Ord + Add<Duration, Output = Self::Instant>;

    /// Returns the current instant.
    fn now(&self) -> Self::Instant;

    /// Yields the processor until `deadline`.
    ///
    /// Must return immediately when the deadline has already passed; a
    /// cycle overrun is absorbed by a zero-length idle, never reported.
    fn idle_until(&mut self, deadline: Self::Instant);
}

/// Hardware watchdog reset line.
///
/// `pulse` must be invoked at least once per cycle; missing the hardware
/// timeout resets the device uncontrolled.
pub trait Watchdog {
    /// Resets the watchdog counter.
    fn pulse(&mut self);
}

/// Watchdog stub for hosts without the hardware counter.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopWatchdog;

impl NoopWatchdog {
    /// Creates a new no-op watchdog.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Watchdog for NoopWatchdog {
    fn pulse(&mut self) {}
}

/// The super-loop container.
///
/// The schedule slice is fixed at construction; slot order is dependency
/// order (low-level drivers before the applications that consume their
/// output) and doubles as each task's readiness-flag slot.
pub struct Scheduler<'a, C, W, L>
where
    C: LoopClock,
    W: Watchdog,
    L: LedDriver,
{
    clock: C,
    watchdog: W,
    leds: L,
    sequencer: BlinkSequencer,
    tasks: &'a mut [&'a mut dyn Task],
    flags: &'a SystemFlags,
    budget: Duration,
    cycles: u64,
}

impl<'a, C, W, L> Scheduler<'a, C, W, L>
where
    C: LoopClock,
    W: Watchdog,
    L: LedDriver,
{
    /// Creates a scheduler over the given externals and schedule.
    pub fn new(
        clock: C,
        watchdog: W,
        leds: L,
        tasks: &'a mut [&'a mut dyn Task],
        flags: &'a SystemFlags,
    ) -> Self {
        Self {
            clock,
            watchdog,
            leds,
            sequencer: BlinkSequencer::new(),
            tasks,
            flags,
            budget: DEFAULT_CYCLE_BUDGET,
            cycles: 0,
        }
    }

    /// Overrides the nominal cycle duration.
    #[must_use]
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Replaces the default breathing sequencer.
    #[must_use]
    pub fn with_sequencer(mut self, sequencer: BlinkSequencer) -> Self {
        self.sequencer = sequencer;
        self
    }

    /// One-time bring-up phase. Must run exactly once, before the first
    /// cycle.
    ///
    /// Sets the `Initializing` flag, calls every task's `initialize()` in
    /// schedule order, and records each outcome. A failure never aborts the
    /// phase: the slot's readiness bit stays clear and the next task still
    /// initializes. The reporter receives the snapshot exactly once, before
    /// the flag is cleared for the lifetime of the device.
    pub fn initialize(&mut self, reporter: &mut dyn StatusReporter) {
        self.flags.begin_initialization();

        let mut report = BringUpReport::new();
        for (slot, task) in self.tasks.iter_mut().enumerate() {
            let status = match task.initialize() {
                Ok(()) => {
                    self.flags.mark_ready(slot);
                    TaskStatus::ready(task.name())
                }
                Err(err) => TaskStatus::failed(task.name(), err.reason()),
            };
            let _ = report.push(status);
        }

        reporter.report(&report);
        self.flags.finish_initialization();
    }

    /// Runs one full cycle: watchdog pulse, every task once in schedule
    /// order, idle padding to the cycle budget, then one sequencer step.
    pub fn run_cycle(&mut self) {
        self.watchdog.pulse();
        let started = self.clock.now();

        for task in self.tasks.iter_mut() {
            task.run_once(self.flags);
        }

        self.clock.idle_until(started + self.budget);
        self.sequencer.advance(&mut self.leds);
        self.cycles += 1;
    }

    /// Bring-up followed by the infinite super-loop.
    pub fn run(&mut self, reporter: &mut dyn StatusReporter) -> ! {
        self.initialize(reporter);
        loop {
            self.run_cycle();
        }
    }

    /// Returns the number of completed cycles.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Returns the hosted sequencer.
    #[must_use]
    pub const fn sequencer(&self) -> &BlinkSequencer {
        &self.sequencer
    }

    /// Returns the shared flag block.
    #[must_use]
    pub const fn flags(&self) -> &SystemFlags {
        self.flags
    }

    /// Returns the configured cycle budget.
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NoopStatusReporter;
    use crate::sequencer::{LedColor, NoopLedDriver};
    use crate::task::InitError;
    use core::cell::{Cell, RefCell};
    use heapless::Vec;

    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
    struct MockInstant(u64);

    impl Add<Duration> for MockInstant {
        type Output = Self;

        fn add(self, rhs: Duration) -> Self::Output {
            Self(self.0 + u64::try_from(rhs.as_micros()).unwrap_or(u64::MAX))
        }
    }

    /// Clock whose time only moves when the loop idles or a test nudges it.
    struct MockClock {
        now: Cell<u64>,
        idle_deadlines: RefCell<Vec<u64, 16>>,
    }

    impl MockClock {
        fn new() -> Self {
            Self {
                now: Cell::new(0),
                idle_deadlines: RefCell::new(Vec::new()),
            }
        }
    }

    impl LoopClock for &MockClock {
        type Instant = MockInstant;

        fn now(&self) -> Self::Instant {
            MockInstant(self.now.get())
        }

        fn idle_until(&mut self, deadline: Self::Instant) {
            let _ = self.idle_deadlines.borrow_mut().push(deadline.0);
            if deadline.0 > self.now.get() {
                self.now.set(deadline.0);
            }
        }
    }

    struct CountingWatchdog<'l> {
        pulses: &'l Cell<u32>,
    }

    impl Watchdog for CountingWatchdog<'_> {
        fn pulse(&mut self) {
            self.pulses.set(self.pulses.get() + 1);
        }
    }

    type CallLog = RefCell<Vec<&'static str, 64>>;

    struct SpyTask<'l> {
        name: &'static str,
        log: &'l CallLog,
        fail_init: bool,
    }

    impl SpyTask<'_> {
        fn record(&self, phase: &'static str) {
            let _ = self.log.borrow_mut().push(phase);
        }
    }

    impl Task for SpyTask<'_> {
        fn name(&self) -> &'static str {
            self.name
        }

        fn initialize(&mut self) -> Result<(), InitError> {
            self.record(self.name);
            if self.fail_init {
                Err(InitError::new("forced failure"))
            } else {
                Ok(())
            }
        }

        fn run_once(&mut self, _: &SystemFlags) {
            self.record(self.name);
        }
    }

    struct OneShotReporter<'l> {
        invocations: &'l Cell<u32>,
        ready_mask_seen: &'l Cell<u32>,
        flags: &'l SystemFlags,
        initializing_during_report: &'l Cell<bool>,
    }

    impl StatusReporter for OneShotReporter<'_> {
        fn report(&mut self, report: &BringUpReport) {
            self.invocations.set(self.invocations.get() + 1);
            self.initializing_during_report
                .set(self.flags.is_initializing());
            let mut mask = 0;
            for (slot, entry) in report.entries().iter().enumerate() {
                if entry.ready {
                    mask |= 1 << slot;
                }
            }
            self.ready_mask_seen.set(mask);
        }
    }

    #[test]
    fn initialization_is_fail_forward_and_ordered() {
        let flags = SystemFlags::new();
        let log: CallLog = RefCell::new(Vec::new());
        let mut uart = SpyTask {
            name: "uart",
            log: &log,
            fail_init: false,
        };
        let mut radio = SpyTask {
            name: "radio",
            log: &log,
            fail_init: true,
        };
        let mut app = SpyTask {
            name: "app",
            log: &log,
            fail_init: false,
        };
        let mut tasks: [&mut dyn Task; 3] = [&mut uart, &mut radio, &mut app];

        let clock = MockClock::new();
        let pulses = Cell::new(0);
        let mut scheduler = Scheduler::new(
            &clock,
            CountingWatchdog { pulses: &pulses },
            NoopLedDriver::new(),
            &mut tasks,
            &flags,
        );

        scheduler.initialize(&mut NoopStatusReporter::new());

        assert_eq!(log.borrow().as_slice(), ["uart", "radio", "app"]);
        assert!(flags.is_ready(0));
        assert!(!flags.is_ready(1));
        assert!(flags.is_ready(2));
        assert!(!flags.is_initializing());
    }

    #[test]
    fn reporter_fires_once_during_initialization_phase() {
        let flags = SystemFlags::new();
        let log: CallLog = RefCell::new(Vec::new());
        let mut only = SpyTask {
            name: "only",
            log: &log,
            fail_init: false,
        };
        let mut tasks: [&mut dyn Task; 1] = [&mut only];

        let clock = MockClock::new();
        let pulses = Cell::new(0);
        let mut scheduler = Scheduler::new(
            &clock,
            CountingWatchdog { pulses: &pulses },
            NoopLedDriver::new(),
            &mut tasks,
            &flags,
        );

        let invocations = Cell::new(0);
        let ready_mask_seen = Cell::new(0);
        let initializing_during_report = Cell::new(false);
        let mut reporter = OneShotReporter {
            invocations: &invocations,
            ready_mask_seen: &ready_mask_seen,
            flags: &flags,
            initializing_during_report: &initializing_during_report,
        };

        scheduler.initialize(&mut reporter);

        assert_eq!(invocations.get(), 1);
        assert_eq!(ready_mask_seen.get(), 0b1);
        // The snapshot is taken while the device still reports initializing.
        assert!(initializing_during_report.get());
        assert!(!flags.is_initializing());
    }

    #[test]
    fn run_cycle_pulses_watchdog_exactly_once() {
        let flags = SystemFlags::new();
        let log: CallLog = RefCell::new(Vec::new());
        let mut task = SpyTask {
            name: "task",
            log: &log,
            fail_init: false,
        };
        let mut tasks: [&mut dyn Task; 1] = [&mut task];

        let clock = MockClock::new();
        let pulses = Cell::new(0);
        let mut scheduler = Scheduler::new(
            &clock,
            CountingWatchdog { pulses: &pulses },
            NoopLedDriver::new(),
            &mut tasks,
            &flags,
        );

        for cycle in 1..=5_u32 {
            scheduler.run_cycle();
            assert_eq!(pulses.get(), cycle);
        }
        assert_eq!(scheduler.cycles(), 5);
    }

    #[test]
    fn task_order_is_invariant_across_cycles() {
        let flags = SystemFlags::new();
        let log: CallLog = RefCell::new(Vec::new());
        let mut low = SpyTask {
            name: "low",
            log: &log,
            fail_init: false,
        };
        let mut mid = SpyTask {
            name: "mid",
            log: &log,
            fail_init: true,
        };
        let mut high = SpyTask {
            name: "high",
            log: &log,
            fail_init: false,
        };
        let mut tasks: [&mut dyn Task; 3] = [&mut low, &mut mid, &mut high];

        let clock = MockClock::new();
        let pulses = Cell::new(0);
        let mut scheduler = Scheduler::new(
            &clock,
            CountingWatchdog { pulses: &pulses },
            NoopLedDriver::new(),
            &mut tasks,
            &flags,
        );

        scheduler.initialize(&mut NoopStatusReporter::new());
        log.borrow_mut().clear();

        for _ in 0..3 {
            scheduler.run_cycle();
        }

        // Failed initialization does not evict a task from the schedule.
        assert_eq!(
            log.borrow().as_slice(),
            ["low", "mid", "high", "low", "mid", "high", "low", "mid", "high"]
        );
    }

    #[test]
    fn idle_step_pads_to_cycle_budget() {
        let flags = SystemFlags::new();
        let mut tasks: [&mut dyn Task; 0] = [];

        let clock = MockClock::new();
        let pulses = Cell::new(0);
        let mut scheduler = Scheduler::new(
            &clock,
            CountingWatchdog { pulses: &pulses },
            NoopLedDriver::new(),
            &mut tasks,
            &flags,
        )
        .with_budget(Duration::from_millis(1));

        scheduler.run_cycle();
        scheduler.run_cycle();

        // Each idle deadline is exactly cycle start + budget.
        assert_eq!(clock.idle_deadlines.borrow().as_slice(), [1_000, 2_000]);
    }

    #[test]
    fn overrun_cycle_requests_past_deadline() {
        struct SlowTask<'l> {
            clock: &'l MockClock,
        }

        impl Task for SlowTask<'_> {
            fn name(&self) -> &'static str {
                "slow"
            }

            fn initialize(&mut self) -> Result<(), InitError> {
                Ok(())
            }

            fn run_once(&mut self, _: &SystemFlags) {
                // Burns three budgets of time inside one slice.
                self.clock.now.set(self.clock.now.get() + 3_000);
            }
        }

        let flags = SystemFlags::new();
        let clock = MockClock::new();
        let mut slow = SlowTask { clock: &clock };
        let mut tasks: [&mut dyn Task; 1] = [&mut slow];
        let pulses = Cell::new(0);
        let mut scheduler = Scheduler::new(
            &clock,
            CountingWatchdog { pulses: &pulses },
            NoopLedDriver::new(),
            &mut tasks,
            &flags,
        );

        scheduler.run_cycle();

        // The idle step was still invoked, with a deadline already in the
        // past, and time was not rolled back.
        assert_eq!(clock.idle_deadlines.borrow().as_slice(), [1_000]);
        assert_eq!(clock.now.get(), 3_000);
    }

    #[test]
    fn sequencer_advances_once_per_cycle() {
        let flags = SystemFlags::new();
        let mut tasks: [&mut dyn Task; 0] = [];

        let clock = MockClock::new();
        let mut scheduler = Scheduler::new(
            &clock,
            NoopWatchdog::new(),
            NoopLedDriver::new(),
            &mut tasks,
            &flags,
        );

        for _ in 0..900 {
            scheduler.run_cycle();
        }

        assert_eq!(scheduler.sequencer().position(), 900);
        assert_eq!(scheduler.sequencer().active_band().color, LedColor::Purple);
    }
}
