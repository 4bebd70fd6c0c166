#![no_std]

// Portable super-loop runtime for the lumen board family.
//
// This crate stays independent of any MCU HAL by expressing the externals the
// loop consumes (time source, watchdog, LED outputs, status sink) as traits.
// The firmware and the host emulator bind those traits to real hardware and
// to simulations respectively while sharing the scheduling and sequencing
// logic housed here.

pub mod flags;
pub mod report;
pub mod scheduler;
pub mod sequencer;
pub mod task;
