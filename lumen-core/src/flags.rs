//! Process-wide readiness and phase flags shared across the super-loop.
//!
//! Two independent bitmasks mirror the device lifecycle: a system mask that
//! currently carries only the `Initializing` bit, and a readiness mask with
//! one bit per schedule slot. Each bit has exactly one writer (the scheduler
//! for the system mask, the owning task's initialization outcome for its
//! readiness bit); the atomics exist so any component may read the masks at
//! any point in the cycle without tearing, not to arbitrate writes.

use portable_atomic::{AtomicU32, Ordering};

use crate::task::MAX_TASKS;

const SYSTEM_INITIALIZING: u32 = 1 << 0;

/// Shared flag storage with interior mutability, usable as a `static`.
#[derive(Debug, Default)]
pub struct SystemFlags {
    system: AtomicU32,
    ready: AtomicU32,
}

impl SystemFlags {
    /// Creates a flag block with every bit clear.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            system: AtomicU32::new(0),
            ready: AtomicU32::new(0),
        }
    }

    /// Marks the device as being inside the one-time bring-up phase.
    ///
    /// Called by the scheduler before the first `initialize()`. Never called
    /// again until a hardware reset.
    pub fn begin_initialization(&self) {
        self.system.fetch_or(SYSTEM_INITIALIZING, Ordering::Relaxed);
    }

    /// Clears the bring-up bit once every task has had its one-time setup.
    pub fn finish_initialization(&self) {
        self.system
            .fetch_and(!SYSTEM_INITIALIZING, Ordering::Relaxed);
    }

    /// Returns `true` while the bring-up phase is still in progress.
    #[must_use]
    pub fn is_initializing(&self) -> bool {
        self.system.load(Ordering::Relaxed) & SYSTEM_INITIALIZING != 0
    }

    /// Sets the readiness bit for a schedule slot.
    ///
    /// Out-of-range slots are ignored; the schedule is bounded by
    /// [`MAX_TASKS`] so the mask always has a bit to spare for valid slots.
    pub fn mark_ready(&self, slot: usize) {
        if slot < MAX_TASKS {
            self.ready.fetch_or(1 << slot, Ordering::Relaxed);
        }
    }

    /// Returns `true` when the slot's one-time initialization succeeded.
    #[must_use]
    pub fn is_ready(&self, slot: usize) -> bool {
        if slot >= MAX_TASKS {
            return false;
        }
        self.ready.load(Ordering::Relaxed) & (1 << slot) != 0
    }

    /// Returns the raw readiness mask, bit N = schedule slot N.
    #[must_use]
    pub fn ready_mask(&self) -> u32 {
        self.ready.load(Ordering::Relaxed)
    }
}
