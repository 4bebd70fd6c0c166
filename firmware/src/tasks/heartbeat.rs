//! Liveness heartbeat on the board's status LED.

use embassy_stm32::gpio::Output;

use lumen_core::flags::SystemFlags;
use lumen_core::task::{InitError, Task};

/// Toggle interval in cycles; with the 1 ms budget the LED blinks at 1 Hz.
const TOGGLE_EVERY_CYCLES: u32 = 500;

/// Application task that toggles the status LED once it is ready.
pub struct HeartbeatTask<'d> {
    led: Output<'d>,
    slot: usize,
    cycles: u32,
}

impl<'d> HeartbeatTask<'d> {
    /// Creates the task over the status LED pin and its schedule slot.
    pub fn new(led: Output<'d>, slot: usize) -> Self {
        Self {
            led,
            slot,
            cycles: 0,
        }
    }
}

impl Task for HeartbeatTask<'_> {
    fn name(&self) -> &'static str {
        "heartbeat"
    }

    fn initialize(&mut self) -> Result<(), InitError> {
        self.led.set_low();
        Ok(())
    }

    fn run_once(&mut self, flags: &SystemFlags) {
        if !flags.is_ready(self.slot) {
            return;
        }

        self.cycles += 1;
        if self.cycles >= TOGGLE_EVERY_CYCLES {
            self.cycles = 0;
            self.led.toggle();
        }
    }
}
