//! One-shot bring-up status snapshot.

use heapless::Vec;

use crate::task::MAX_TASKS;

/// Outcome of one task's one-time initialization.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TaskStatus {
    pub name: &'static str,
    pub ready: bool,
    /// Failure reason when `ready` is false and the task reported one.
    pub failure: Option<&'static str>,
}

impl TaskStatus {
    /// Records a successful initialization.
    #[must_use]
    pub const fn ready(name: &'static str) -> Self {
        Self {
            name,
            ready: true,
            failure: None,
        }
    }

    /// Records a failed initialization with its reason.
    #[must_use]
    pub const fn failed(name: &'static str, reason: &'static str) -> Self {
        Self {
            name,
            ready: false,
            failure: Some(reason),
        }
    }
}

/// Ordered end-of-initialization snapshot handed to the status reporter.
///
/// Built once by the scheduler, after the last `initialize()` and before the
/// first cycle; read-only thereafter.
#[derive(Clone, Debug, Default)]
pub struct BringUpReport {
    entries: Vec<TaskStatus, MAX_TASKS>,
}

impl BringUpReport {
    /// Creates an empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a task outcome in schedule order.
    ///
    /// Returns `false` when the report is full; the schedule is bounded by
    /// [`MAX_TASKS`] so this only trips on misconfigured schedules.
    pub fn push(&mut self, status: TaskStatus) -> bool {
        self.entries.push(status).is_ok()
    }

    /// Returns the recorded outcomes in schedule order.
    #[must_use]
    pub fn entries(&self) -> &[TaskStatus] {
        &self.entries
    }

    /// Returns the number of tasks that failed initialization.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.ready).count()
    }

    /// Returns `true` when every task initialized successfully.
    #[must_use]
    pub fn all_ready(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Sink for the one-shot diagnostic emission after bring-up.
pub trait StatusReporter {
    /// Invoked exactly once, after all initializations and before the first
    /// cycle.
    fn report(&mut self, report: &BringUpReport);
}

/// Reporter that discards the snapshot.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopStatusReporter;

impl NoopStatusReporter {
    /// Creates a new no-op reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl StatusReporter for NoopStatusReporter {
    fn report(&mut self, _: &BringUpReport) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_tracks_failures_in_order() {
        let mut report = BringUpReport::new();
        assert!(report.push(TaskStatus::ready("uart")));
        assert!(report.push(TaskStatus::failed("radio", "no response")));
        assert!(report.push(TaskStatus::ready("heartbeat")));

        assert_eq!(report.entries().len(), 3);
        assert_eq!(report.entries()[1].failure, Some("no response"));
        assert_eq!(report.failure_count(), 1);
        assert!(!report.all_ready());
    }

    #[test]
    fn empty_report_is_all_ready() {
        let report = BringUpReport::new();
        assert!(report.all_ready());
    }
}
