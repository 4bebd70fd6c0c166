//! Independent watchdog binding.

use embassy_stm32::peripherals::IWDG;
use embassy_stm32::wdg::IndependentWatchdog;

use lumen_core::scheduler::Watchdog;

/// Watchdog timeout. The cycle budget is 1 ms, so even heavy cycle overrun
/// leaves a wide margin before the hardware resets the device.
pub const WATCHDOG_TIMEOUT_US: u32 = 500_000;

/// [`Watchdog`] implementation over the STM32 independent watchdog.
pub struct IwdgWatchdog<'d> {
    inner: IndependentWatchdog<'d, IWDG>,
}

impl<'d> IwdgWatchdog<'d> {
    /// Configures and starts the hardware counter. Once unleashed it can
    /// only be serviced, never stopped, until a reset.
    pub fn new(peripheral: IWDG) -> Self {
        let mut inner = IndependentWatchdog::new(peripheral, WATCHDOG_TIMEOUT_US);
        inner.unleash();
        Self { inner }
    }
}

impl Watchdog for IwdgWatchdog<'_> {
    fn pulse(&mut self) {
        self.inner.pet();
    }
}
