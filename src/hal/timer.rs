//! Advanced-Control Timer Backend
//!
//! Programs an STM32 advanced-control timer (TIM1/TIM8/...) through its
//! register block. Pins are configured by the caller with the embassy
//! `PwmPin` / `ComplementaryPwmPin` constructors.

use embassy_stm32::pac::timer::vals::Ocm;
use embassy_stm32::timer::low_level::Timer;
use embassy_stm32::timer::AdvancedInstance4Channel;
use embassy_stm32::Peripheral;

use crate::backend::{Polarity, TimerBackend, TimerConfig};
use crate::clock::{ClockSource, FixedClock};
use crate::config::{COUNTER_MAX_16BIT, PRESCALER_MAX};
use crate::error::HardwareFault;
use crate::types::{Channel, ChannelMode, CounterWidth};

/// Timer backend on top of an embassy-stm32 advanced timer
pub struct AdvancedTimer<'d, T: AdvancedInstance4Channel> {
    timer: Timer<'d, T>,
}

impl<'d, T: AdvancedInstance4Channel> AdvancedTimer<'d, T> {
    /// Take ownership of the timer peripheral, enable its clock and reset it
    ///
    /// The reset leaves CR2, RCR and the break/lock bits of BDTR at the
    /// fixed settings [`TimerConfig`] documents.
    pub fn new(tim: impl Peripheral<P = T> + 'd) -> Self {
        Self { timer: Timer::new(tim) }
    }

    /// Timer kernel clock as reported by the RCC driver
    #[must_use]
    pub fn clock(&self) -> FixedClock {
        FixedClock(self.timer.get_clock_frequency().0)
    }
}

impl<T: AdvancedInstance4Channel> ClockSource for AdvancedTimer<'_, T> {
    fn timer_clock_hz(&self) -> u32 {
        self.timer.get_clock_frequency().0
    }
}

impl<T: AdvancedInstance4Channel> TimerBackend for AdvancedTimer<'_, T> {
    fn apply(&mut self, config: &TimerConfig) -> Result<(), HardwareFault> {
        // Advanced timers have a 16-bit counter and prescaler
        if config.counter_width == CounterWidth::Bits32
            || config.timing.period > COUNTER_MAX_16BIT
            || config.timing.prescaler > PRESCALER_MAX
        {
            return Err(HardwareFault::ValueOutOfRange);
        }

        let regs = self.timer.regs_advanced();

        // Time base; DIR and CKD stay at reset (up, no division)
        regs.cr1().modify(|w| {
            w.set_cen(false);
            w.set_arpe(config.auto_reload_preload);
        });
        regs.psc().write_value(config.timing.prescaler as u16);
        regs.arr().write(|w| w.set_arr(config.timing.period as u16));

        // PWM mode 1, pulse 0, preload on every channel
        for channel in Channel::ALL {
            let idx = channel.index();
            regs.ccmr_output(idx / 2).modify(|w| {
                w.set_ocm(idx % 2, Ocm::PWM_MODE1);
                w.set_ocpe(idx % 2, true);
            });
            regs.ccr(idx).write(|w| w.set_ccr(0));
            regs.ccer().modify(|w| {
                w.set_ccp(idx, config.polarity == Polarity::ActiveLow);
                w.set_ccnp(idx, config.complementary_polarity == Polarity::ActiveLow);
            });
        }

        // Dead time and main output enable; break and lock stay at reset
        regs.bdtr().modify(|w| {
            w.set_dtg(config.dead_time);
            w.set_moe(true);
        });

        regs.egr().write(|w| w.set_ug(true));
        regs.cr1().modify(|w| w.set_cen(true));
        Ok(())
    }

    fn set_compare(&mut self, channel: Channel, value: u32) {
        let value = value.min(COUNTER_MAX_16BIT) as u16;
        self.timer
            .regs_advanced()
            .ccr(channel.index())
            .write(|w| w.set_ccr(value));
    }

    fn start(&mut self, channel: Channel, mode: ChannelMode) {
        let idx = channel.index();
        self.timer.regs_advanced().ccer().modify(|w| {
            w.set_cce(idx, true);
            if mode.is_complementary() {
                w.set_ccne(idx, true);
            }
        });
    }

    fn stop(&mut self, channel: Channel, mode: ChannelMode) {
        let idx = channel.index();
        self.timer.regs_advanced().ccer().modify(|w| {
            w.set_cce(idx, false);
            if mode.is_complementary() {
                w.set_ccne(idx, false);
            }
        });
    }
}
