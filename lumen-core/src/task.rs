//! The two-phase contract every driver and application satisfies.

use core::fmt;

use crate::flags::SystemFlags;

/// Upper bound on schedule length, matching the width of the readiness mask.
pub const MAX_TASKS: usize = 32;

/// Failure detail surfaced by a task's one-time initialization.
///
/// Initialization failures never abort bring-up; the scheduler records the
/// reason, leaves the slot's readiness bit clear, and moves on to the next
/// task in the schedule.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InitError {
    reason: &'static str,
}

impl InitError {
    /// Creates an error carrying a short human-readable reason.
    #[must_use]
    pub const fn new(reason: &'static str) -> Self {
        Self { reason }
    }

    /// Returns the failure reason.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        self.reason
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason)
    }
}

/// Uniform interface the scheduler drives.
///
/// `initialize` runs exactly once, before the first cycle, in schedule
/// order. `run_once` runs exactly once per cycle thereafter, forever, and
/// must return within a small bounded time: no blocking waits, no unbounded
/// loops. Implementations must tolerate `run_once` being invoked while
/// their readiness bit is unset and degrade to a no-op instead.
pub trait Task {
    /// Short identifier used in the bring-up report and diagnostics.
    fn name(&self) -> &'static str;

    /// One-time setup. Must leave the subsystem disabled-but-safe on `Err`.
    fn initialize(&mut self) -> Result<(), InitError>;

    /// One bounded slice of work per cycle.
    fn run_once(&mut self, flags: &SystemFlags);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_error_reports_reason() {
        let err = InitError::new("sensor absent");
        assert_eq!(err.reason(), "sensor absent");
    }
}
