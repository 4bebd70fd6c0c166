//! PWM binding for the eight-color LED bank.
//!
//! The board routes the bank across two 4-channel general-purpose timers:
//! TIM2 drives white/purple/blue/cyan on PA0..PA3, TIM3 drives
//! green/yellow/orange/red on PA6, PA7, PB0, PB1. Intensity maps directly
//! to duty percentage.

use embassy_stm32::peripherals::{TIM2, TIM3};
use embassy_stm32::timer::Channel;
use embassy_stm32::timer::simple_pwm::SimplePwm;

use lumen_core::sequencer::{Intensity, LedColor, LedDriver};

enum Bank {
    Low(Channel),
    High(Channel),
}

fn route(color: LedColor) -> Bank {
    match color {
        LedColor::White => Bank::Low(Channel::Ch1),
        LedColor::Purple => Bank::Low(Channel::Ch2),
        LedColor::Blue => Bank::Low(Channel::Ch3),
        LedColor::Cyan => Bank::Low(Channel::Ch4),
        LedColor::Green => Bank::High(Channel::Ch1),
        LedColor::Yellow => Bank::High(Channel::Ch2),
        LedColor::Orange => Bank::High(Channel::Ch3),
        LedColor::Red => Bank::High(Channel::Ch4),
    }
}

/// [`LedDriver`] implementation over the two PWM banks.
pub struct PwmLedDriver<'d> {
    low: SimplePwm<'d, TIM2>,
    high: SimplePwm<'d, TIM3>,
}

impl<'d> PwmLedDriver<'d> {
    /// Takes ownership of both configured PWM banks and enables every
    /// channel at zero duty.
    pub fn new(mut low: SimplePwm<'d, TIM2>, mut high: SimplePwm<'d, TIM3>) -> Self {
        for channel in [Channel::Ch1, Channel::Ch2, Channel::Ch3, Channel::Ch4] {
            low.channel(channel).set_duty_cycle_fully_off();
            low.channel(channel).enable();
            high.channel(channel).set_duty_cycle_fully_off();
            high.channel(channel).enable();
        }
        Self { low, high }
    }
}

impl LedDriver for PwmLedDriver<'_> {
    fn set(&mut self, color: LedColor, intensity: Intensity) {
        let percent = intensity.as_percent();
        match route(color) {
            Bank::Low(channel) => self.low.channel(channel).set_duty_cycle_percent(percent),
            Bank::High(channel) => self.high.channel(channel).set_duty_cycle_percent(percent),
        }
    }

    fn all_off(&mut self) {
        for channel in [Channel::Ch1, Channel::Ch2, Channel::Ch3, Channel::Ch4] {
            self.low.channel(channel).set_duty_cycle_fully_off();
            self.high.channel(channel).set_duty_cycle_fully_off();
        }
    }
}
