//! Hardware bindings for the `lumen-core` external interfaces.
//!
//! Each submodule adapts one trait consumed by the shared super-loop to the
//! STM32G0 peripherals, so the loop itself never touches the HAL directly.

pub mod clock;
pub mod leds;
pub mod watchdog;
