//! User button polling with cycle-based debouncing.

use embassy_stm32::gpio::Input;

use lumen_core::flags::SystemFlags;
use lumen_core::task::{InitError, Task};

/// Number of consecutive cycles a level must hold before it is accepted.
const DEBOUNCE_CYCLES: u8 = 20;

/// Driver task that samples the user button once per cycle.
pub struct ButtonTask<'d> {
    input: Input<'d>,
    slot: usize,
    stable: bool,
    candidate: bool,
    held_for: u8,
}

impl<'d> ButtonTask<'d> {
    /// Creates the task over the pulled-up button input and its slot.
    pub fn new(input: Input<'d>, slot: usize) -> Self {
        Self {
            input,
            slot,
            stable: false,
            candidate: false,
            held_for: 0,
        }
    }
}

impl Task for ButtonTask<'_> {
    fn name(&self) -> &'static str {
        "button"
    }

    fn initialize(&mut self) -> Result<(), InitError> {
        // Active low behind the pull-up.
        self.stable = self.input.is_low();
        self.candidate = self.stable;
        Ok(())
    }

    fn run_once(&mut self, flags: &SystemFlags) {
        if !flags.is_ready(self.slot) {
            return;
        }

        let sampled = self.input.is_low();
        if sampled == self.candidate {
            if self.held_for < DEBOUNCE_CYCLES {
                self.held_for += 1;
            }
        } else {
            self.candidate = sampled;
            self.held_for = 0;
        }

        if self.held_for >= DEBOUNCE_CYCLES && self.candidate != self.stable {
            self.stable = self.candidate;
            if self.stable {
                defmt::info!("button pressed");
            } else {
                defmt::info!("button released");
            }
        }
    }
}
