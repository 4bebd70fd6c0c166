use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_stm32 as hal;
use embassy_stm32::gpio::{Input, Level, Output, OutputType, Pull, Speed};
use embassy_stm32::time::khz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};

use lumen_core::flags::SystemFlags;
use lumen_core::scheduler::Scheduler;
use lumen_core::task::Task;

use crate::hw::clock::FirmwareClock;
use crate::hw::leds::PwmLedDriver;
use crate::hw::watchdog::IwdgWatchdog;
use crate::status::DefmtStatusReporter;
use crate::tasks::button::ButtonTask;
use crate::tasks::heartbeat::HeartbeatTask;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

/// Flag block shared between the scheduler and every task.
static SYSTEM_FLAGS: SystemFlags = SystemFlags::new();

#[cortex_m_rt::entry]
fn main() -> ! {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA1,
        PA2,
        PA3,
        PA6,
        PA7,
        PB0,
        PB1,
        PB2,
        PC6,
        TIM2,
        TIM3,
        IWDG,
        ..
    } = hal::init(config);

    let core = cortex_m::Peripherals::take().expect("core peripherals already taken");

    // Watchdog first so a hang anywhere in bring-up still resets the board.
    let watchdog = IwdgWatchdog::new(IWDG);
    let clock = FirmwareClock::new(core.SYST);

    let low_bank = SimplePwm::new(
        TIM2,
        Some(PwmPin::new_ch1(PA0, OutputType::PushPull)),
        Some(PwmPin::new_ch2(PA1, OutputType::PushPull)),
        Some(PwmPin::new_ch3(PA2, OutputType::PushPull)),
        Some(PwmPin::new_ch4(PA3, OutputType::PushPull)),
        khz(1),
        CountingMode::EdgeAlignedUp,
    );
    let high_bank = SimplePwm::new(
        TIM3,
        Some(PwmPin::new_ch1(PA6, OutputType::PushPull)),
        Some(PwmPin::new_ch2(PA7, OutputType::PushPull)),
        Some(PwmPin::new_ch3(PB0, OutputType::PushPull)),
        Some(PwmPin::new_ch4(PB1, OutputType::PushPull)),
        khz(1),
        CountingMode::EdgeAlignedUp,
    );
    let leds = PwmLedDriver::new(low_bank, high_bank);

    // Schedule order is dependency order: drivers ahead of applications.
    let mut button = ButtonTask::new(Input::new(PC6, Pull::Up), 0);
    let mut heartbeat = HeartbeatTask::new(Output::new(PB2, Level::Low, Speed::Low), 1);
    let mut tasks: [&mut dyn Task; 2] = [&mut button, &mut heartbeat];

    defmt::info!("lumen firmware starting");

    let mut scheduler = Scheduler::new(clock, watchdog, leds, &mut tasks, &SYSTEM_FLAGS);
    let mut reporter = DefmtStatusReporter::new();
    scheduler.run(&mut reporter)
}
