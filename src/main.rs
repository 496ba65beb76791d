//! PWM Demo Application
//!
//! Runs TIM1 on an STM32G474 with two complementary pairs and one single
//! output, then sweeps the duty cycle of all enabled channels.

#![no_std]
#![no_main]

use defmt::info;
use embassy_executor::Spawner;
use embassy_stm32::gpio::OutputType;
use embassy_stm32::peripherals::TIM1;
use embassy_stm32::timer::complementary_pwm::ComplementaryPwmPin;
use embassy_stm32::timer::simple_pwm::PwmPin;
use embassy_stm32::timer::{Ch1, Ch2, Ch3};
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use pwm_timer::config::demo;
use pwm_timer::hal::AdvancedTimer;
use pwm_timer::prelude::*;

/// TIM1 channel table: CH1/CH2 complementary, CH3 single, CH4 unused
static CHANNELS: ChannelModes = ChannelModes::new(
    ChannelMode::Complementary,
    ChannelMode::Complementary,
    ChannelMode::Single,
    ChannelMode::Disabled,
);

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("PWM demo v{}", env!("CARGO_PKG_VERSION"));

    let p = embassy_stm32::init(embassy_stm32::Config::default());

    // Route the timer outputs to their pins (some are shared with TIM8)
    let _ch1: PwmPin<'_, TIM1, Ch1> = PwmPin::new_ch1(p.PA8, OutputType::PushPull);
    let _ch1n: ComplementaryPwmPin<'_, TIM1, Ch1> = ComplementaryPwmPin::new_ch1(p.PA7, OutputType::PushPull);
    let _ch2: PwmPin<'_, TIM1, Ch2> = PwmPin::new_ch2(p.PA9, OutputType::PushPull);
    let _ch2n: ComplementaryPwmPin<'_, TIM1, Ch2> = ComplementaryPwmPin::new_ch2(p.PB0, OutputType::PushPull);
    let _ch3: PwmPin<'_, TIM1, Ch3> = PwmPin::new_ch3(p.PA10, OutputType::PushPull);
    info!(
        "TIM{} outputs: {} {} {} {} {}",
        demo::TIMER,
        demo::CH1,
        demo::CH1N,
        demo::CH2,
        demo::CH2N,
        demo::CH3
    );

    let timer = AdvancedTimer::new(p.TIM1);
    let clock = timer.clock();
    let spec = TimerSpec::new(demo::FREQUENCY_HZ, CounterWidth::Bits16, demo::DEAD_TIME_NS);
    let mut pwm = defmt::unwrap!(HardwarePwm::new(timer, &clock, &CHANNELS, spec));

    info!(
        "{} Hz requested, {} Hz produced ({})",
        demo::FREQUENCY_HZ,
        pwm.output_frequency_hz(),
        pwm.timing()
    );

    pwm.start_all(DutyCycle::ZERO);

    let mut percent = 0.0f32;
    let mut rising = true;
    loop {
        for (channel, _) in CHANNELS.enabled() {
            defmt::unwrap!(pwm.change_duty_cycle(channel, DutyCycle::saturating(percent)));
        }

        if rising {
            percent += demo::SWEEP_STEP_PERCENT;
            rising = percent < 100.0;
        } else {
            percent -= demo::SWEEP_STEP_PERCENT;
            rising = percent <= 0.0;
        }

        Timer::after(Duration::from_millis(demo::SWEEP_INTERVAL_MS)).await;
    }
}
