//! Monotonic clock and the cycle-padding idle step.
//!
//! Cycle timestamps come from the Embassy time driver. The idle step parks
//! the core on `wfi`; a 1 kHz SysTick interrupt (handler intentionally
//! empty) guarantees a wakeup at least once per millisecond so the loop
//! never oversleeps its budget by more than one tick.

use core::ops::Add;
use core::time::Duration;

use cortex_m::peripheral::SYST;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m_rt::exception;
use embassy_time::Instant;

use lumen_core::scheduler::LoopClock;

/// Core clock frequency with the default HSI configuration.
const SYSCLK_HZ: u32 = 16_000_000;

/// Monotonic timestamp bound to the Embassy time driver.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct FirmwareInstant(Instant);

impl Add<Duration> for FirmwareInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        let micros = u64::try_from(rhs.as_micros()).unwrap_or(u64::MAX);
        Self(self.0 + embassy_time::Duration::from_micros(micros))
    }
}

/// [`LoopClock`] implementation over the Embassy time driver plus SysTick.
pub struct FirmwareClock {
    _syst: SYST,
}

impl FirmwareClock {
    /// Configures SysTick as a 1 kHz wakeup source and takes ownership of it.
    pub fn new(mut syst: SYST) -> Self {
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(SYSCLK_HZ / 1_000 - 1);
        syst.clear_current();
        syst.enable_counter();
        syst.enable_interrupt();
        Self { _syst: syst }
    }
}

impl LoopClock for FirmwareClock {
    type Instant = FirmwareInstant;

    fn now(&self) -> Self::Instant {
        FirmwareInstant(Instant::now())
    }

    fn idle_until(&mut self, deadline: Self::Instant) {
        while Instant::now() < deadline.0 {
            cortex_m::asm::wfi();
        }
    }
}

/// Wakeup tick only; all cycle bookkeeping happens in the super-loop.
#[exception]
fn SysTick() {}
