//! PWM Controller Tests
//!
//! Drives `HardwarePwm` against the simulated timer and checks the
//! register program and the order of backend requests.
//! Run with: cargo test --test controller_tests

use embedded_hal::pwm::SetDutyCycle;
use pwm_timer::backend::TimerConfig;
use pwm_timer::clock::{BusClockTree, BusClocks, ChipFamily, ClockSource, FixedClock, TimerInstance};
use pwm_timer::error::{HardwareFault, PwmError};
use pwm_timer::pwm::HardwarePwm;
use pwm_timer::sim::{SimEvent, SimulatedTimer};
use pwm_timer::timing::ResolvedTiming;
use pwm_timer::types::{Channel, ChannelMode, ChannelModes, CounterWidth, DutyCycle, TimerSpec};

/// CH1 complementary, CH2 single, CH3/CH4 unused
static CHANNELS: ChannelModes = ChannelModes::new(
    ChannelMode::Complementary,
    ChannelMode::Single,
    ChannelMode::Disabled,
    ChannelMode::Disabled,
);

const CLOCK: FixedClock = FixedClock(48_000_000);

fn spec_1khz() -> TimerSpec {
    TimerSpec::new(1_000, CounterWidth::Bits16, 1_000)
}

fn controller(clock: &FixedClock) -> HardwarePwm<'_, SimulatedTimer, FixedClock> {
    HardwarePwm::new(SimulatedTimer::new(), clock, &CHANNELS, spec_1khz()).unwrap()
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn new_programs_timer_and_stops_channels() {
    let pwm = controller(&CLOCK);
    let sim = pwm.backend();

    assert_eq!(pwm.timing(), ResolvedTiming::new(0, 47_999));
    assert_eq!(sim.prescaler(), 0);
    assert_eq!(sim.period(), 47_999);
    assert_eq!(sim.dead_time(), 48);
    assert_eq!(pwm.dead_time_register(), 48);
    assert_eq!(
        sim.events(),
        &[
            SimEvent::Apply(TimerConfig::new(ResolvedTiming::new(0, 47_999), CounterWidth::Bits16, 48)),
            SimEvent::Stop(Channel::Ch1, ChannelMode::Complementary),
            SimEvent::Stop(Channel::Ch2, ChannelMode::Single),
        ]
    );
    assert!(!sim.any_running());
}

#[test]
fn new_rejects_unreachable_frequency_without_touching_timer() {
    let mut sim = SimulatedTimer::new();
    let spec = TimerSpec::new(4_800_000, CounterWidth::Bits16, 0);
    let result = HardwarePwm::new(&mut sim, &CLOCK, &CHANNELS, spec);
    assert!(matches!(
        result,
        Err(PwmError::FrequencyOutOfRange {
            requested_hz: 4_800_000,
            max_hz: 4_800_000,
        })
    ));
    assert!(sim.events().is_empty());
}

#[test]
fn new_rejects_dead_time_overflow() {
    let spec = TimerSpec::new(1_000, CounterWidth::Bits16, 10_000);
    let result = HardwarePwm::new(SimulatedTimer::new(), &CLOCK, &CHANNELS, spec);
    assert!(matches!(result, Err(PwmError::DeadTimeOverflow { ticks: 480 })));
}

#[test]
fn new_reports_backend_fault() {
    let mut sim = SimulatedTimer::new();
    sim.fail_next_apply(HardwareFault::BaseInit);
    let result = HardwarePwm::new(&mut sim, &CLOCK, &CHANNELS, spec_1khz());
    assert!(matches!(result, Err(PwmError::Configuration(HardwareFault::BaseInit))));
    assert!(sim.config().is_none());
}

#[test]
fn clock_tree_as_clock_source() {
    let tree = BusClockTree::new(
        ChipFamily::Stm32F4,
        TimerInstance::TIM1,
        BusClocks::new(168_000_000, 42_000_000, 84_000_000),
    );
    let pwm = HardwarePwm::new(SimulatedTimer::new(), &tree, &CHANNELS, spec_1khz()).unwrap();
    assert_eq!(pwm.timing(), ResolvedTiming::new(2, 55_999));
    assert_eq!(pwm.dead_time_register(), 168);
    assert_eq!(pwm.output_frequency_hz(), 1_000);
}

#[test]
fn dyn_clock_source() {
    let clock: &dyn ClockSource = &CLOCK;
    let pwm = HardwarePwm::new(SimulatedTimer::new(), clock, &CHANNELS, spec_1khz()).unwrap();
    assert_eq!(pwm.timing().period, 47_999);
}

// ============================================================================
// Start / Stop Tests
// ============================================================================

#[test]
fn start_complementary_channel() {
    let mut pwm = controller(&CLOCK);
    pwm.start(Channel::Ch1, DutyCycle::HALF).unwrap();

    let sim = pwm.backend();
    assert_eq!(sim.compare(Channel::Ch1), 24_000);
    assert!(sim.is_running(Channel::Ch1));
    assert!(sim.is_complementary_running(Channel::Ch1));
}

#[test]
fn start_single_channel_leaves_complement_off() {
    let mut pwm = controller(&CLOCK);
    pwm.start(Channel::Ch2, DutyCycle::FULL).unwrap();

    let sim = pwm.backend();
    assert_eq!(sim.compare(Channel::Ch2), 47_999);
    assert!(sim.is_running(Channel::Ch2));
    assert!(!sim.is_complementary_running(Channel::Ch2));
}

#[test]
fn disabled_channel_rejected() {
    let mut pwm = controller(&CLOCK);
    pwm.backend_mut().clear_events();

    assert_eq!(
        pwm.start(Channel::Ch3, DutyCycle::HALF),
        Err(PwmError::ChannelDisabled(Channel::Ch3))
    );
    assert_eq!(pwm.stop(Channel::Ch4), Err(PwmError::ChannelDisabled(Channel::Ch4)));
    assert_eq!(
        pwm.change_duty_cycle(Channel::Ch3, DutyCycle::ZERO),
        Err(PwmError::ChannelDisabled(Channel::Ch3))
    );
    assert!(pwm.backend().events().is_empty());
}

#[test]
fn stop_channel() {
    let mut pwm = controller(&CLOCK);
    pwm.start(Channel::Ch1, DutyCycle::HALF).unwrap();
    pwm.stop(Channel::Ch1).unwrap();

    let sim = pwm.backend();
    assert!(!sim.is_running(Channel::Ch1));
    assert!(!sim.is_complementary_running(Channel::Ch1));
}

#[test]
fn start_all_skips_disabled() {
    let mut pwm = controller(&CLOCK);
    pwm.start_all(DutyCycle::from_percent(25.0).unwrap());

    let sim = pwm.backend();
    assert!(sim.is_running(Channel::Ch1));
    assert!(sim.is_running(Channel::Ch2));
    assert!(!sim.is_running(Channel::Ch3));
    assert!(!sim.is_running(Channel::Ch4));
    assert_eq!(sim.compare(Channel::Ch1), 12_000);
    assert_eq!(sim.compare(Channel::Ch2), 12_000);
}

#[test]
fn stop_all_stops_everything() {
    let mut pwm = controller(&CLOCK);
    pwm.start_all(DutyCycle::HALF);
    pwm.stop_all();
    assert!(!pwm.backend().any_running());
}

// ============================================================================
// Duty Cycle Tests
// ============================================================================

#[test]
fn half_duty_on_period_999_rounds_up() {
    // 1 MHz / 1 kHz = 1000 ticks, period register 999
    let clock = FixedClock(1_000_000);
    let spec = TimerSpec::new(1_000, CounterWidth::Bits16, 0);
    let mut pwm = HardwarePwm::new(SimulatedTimer::new(), &clock, &CHANNELS, spec).unwrap();
    assert_eq!(pwm.timing().period, 999);
    assert_eq!(pwm.compare_value(DutyCycle::HALF), 500);

    pwm.change_duty_cycle(Channel::Ch1, DutyCycle::HALF).unwrap();
    assert_eq!(pwm.backend().compare(Channel::Ch1), 500);
}

#[test]
fn duty_extremes() {
    let mut pwm = controller(&CLOCK);
    pwm.change_duty_cycle(Channel::Ch1, DutyCycle::ZERO).unwrap();
    assert_eq!(pwm.backend().compare(Channel::Ch1), 0);
    pwm.change_duty_cycle(Channel::Ch1, DutyCycle::FULL).unwrap();
    assert_eq!(pwm.backend().compare(Channel::Ch1), 47_999);
}

#[test]
fn duty_change_keeps_channel_running() {
    let mut pwm = controller(&CLOCK);
    pwm.start(Channel::Ch2, DutyCycle::HALF).unwrap();
    pwm.change_duty_cycle(Channel::Ch2, DutyCycle::from_percent(75.0).unwrap())
        .unwrap();

    let sim = pwm.backend();
    assert!(sim.is_running(Channel::Ch2));
    // 47999 × 0.75 = 35999.25
    assert_eq!(sim.compare(Channel::Ch2), 35_999);
    assert!((sim.output_duty_percent(Channel::Ch2) - 75.0).abs() < 0.01);
}

#[test]
fn thirty_two_bit_counter_full_duty() {
    let clock = FixedClock(170_000_000);
    let spec = TimerSpec::new(1, CounterWidth::Bits32, 0);
    let mut pwm = HardwarePwm::new(SimulatedTimer::new(), &clock, &CHANNELS, spec).unwrap();
    assert_eq!(pwm.timing(), ResolvedTiming::new(0, 169_999_999));

    pwm.start(Channel::Ch2, DutyCycle::FULL).unwrap();
    assert_eq!(pwm.backend().compare(Channel::Ch2), 169_999_999);
}

// ============================================================================
// Frequency Change Tests
// ============================================================================

#[test]
fn frequency_change_stops_then_reprograms() {
    let mut pwm = controller(&CLOCK);
    pwm.start_all(DutyCycle::HALF);
    pwm.backend_mut().clear_events();

    pwm.change_frequency(2_000).unwrap();

    assert_eq!(
        pwm.backend().events(),
        &[
            SimEvent::Stop(Channel::Ch1, ChannelMode::Complementary),
            SimEvent::Stop(Channel::Ch2, ChannelMode::Single),
            SimEvent::Apply(TimerConfig::new(ResolvedTiming::new(0, 23_999), CounterWidth::Bits16, 48)),
        ]
    );
    assert_eq!(pwm.timing(), ResolvedTiming::new(0, 23_999));
    assert_eq!(pwm.spec().frequency_hz, 2_000);
    assert_eq!(pwm.spec().dead_time_ns, 1_000);
    assert!(!pwm.backend().any_running());
}

#[test]
fn restart_after_frequency_change_uses_new_period() {
    let mut pwm = controller(&CLOCK);
    pwm.change_frequency(10).unwrap();
    assert_eq!(pwm.timing(), ResolvedTiming::new(73, 64_863));

    pwm.start(Channel::Ch1, DutyCycle::HALF).unwrap();
    // 64863 / 2 = 32431.5
    assert_eq!(pwm.backend().compare(Channel::Ch1), 32_432);
}

#[test]
fn unreachable_frequency_leaves_everything_untouched() {
    let mut pwm = controller(&CLOCK);
    pwm.start_all(DutyCycle::HALF);
    pwm.backend_mut().clear_events();

    assert!(matches!(
        pwm.change_frequency(5_000_000),
        Err(PwmError::FrequencyOutOfRange { .. })
    ));
    assert_eq!(pwm.change_frequency(0), Err(PwmError::ZeroFrequency));

    assert!(pwm.backend().events().is_empty());
    assert!(pwm.backend().is_running(Channel::Ch1));
    assert_eq!(pwm.timing(), ResolvedTiming::new(0, 47_999));
    assert_eq!(pwm.spec().frequency_hz, 1_000);
}

#[test]
fn backend_fault_during_frequency_change() {
    let mut pwm = controller(&CLOCK);
    pwm.start_all(DutyCycle::HALF);
    pwm.backend_mut().fail_next_apply(HardwareFault::OutputCompare);

    assert_eq!(
        pwm.change_frequency(2_000),
        Err(PwmError::Configuration(HardwareFault::OutputCompare))
    );
    assert!(!pwm.backend().any_running());
}

#[test]
fn failed_frequency_change_keeps_previous_timing() {
    let mut pwm = controller(&CLOCK);
    pwm.backend_mut().fail_next_apply(HardwareFault::BaseInit);

    assert_eq!(
        pwm.change_frequency(10),
        Err(PwmError::Configuration(HardwareFault::BaseInit))
    );

    // Controller and timer still agree on 1 kHz
    assert_eq!(pwm.timing(), ResolvedTiming::new(0, 47_999));
    assert_eq!(pwm.timing().prescaler, pwm.backend().prescaler());
    assert_eq!(pwm.timing().period, pwm.backend().period());
    assert_eq!(pwm.spec().frequency_hz, 1_000);
    assert_eq!(pwm.output_frequency_hz(), 1_000);

    // Restart computes the compare value against the programmed period
    pwm.start(Channel::Ch1, DutyCycle::HALF).unwrap();
    assert_eq!(pwm.backend().compare(Channel::Ch1), 24_000);
    assert!((pwm.backend().output_duty_percent(Channel::Ch1) - 50.0).abs() < 0.01);

    // A later change goes through normally
    pwm.change_frequency(10).unwrap();
    assert_eq!(pwm.backend().period(), 64_863);
    assert_eq!(pwm.timing().period, 64_863);
}

// ============================================================================
// embedded-hal Adapter Tests
// ============================================================================

#[test]
fn set_duty_cycle_adapter() {
    let mut pwm = controller(&CLOCK);
    {
        let mut output = pwm.channel(Channel::Ch1);
        assert_eq!(output.id(), Channel::Ch1);
        assert_eq!(output.max_duty_cycle(), u16::MAX);
        output.set_duty_cycle_fully_on().unwrap();
    }
    assert_eq!(pwm.backend().compare(Channel::Ch1), 47_999);

    pwm.channel(Channel::Ch1).set_duty_cycle_fully_off().unwrap();
    assert_eq!(pwm.backend().compare(Channel::Ch1), 0);
    assert!(pwm.backend().is_running(Channel::Ch1));
}

#[test]
fn set_duty_cycle_adapter_on_disabled_channel() {
    let mut pwm = controller(&CLOCK);
    assert_eq!(
        pwm.channel(Channel::Ch4).set_duty_cycle(1_000),
        Err(PwmError::ChannelDisabled(Channel::Ch4))
    );
}

#[test]
fn release_returns_backend() {
    let mut pwm = controller(&CLOCK);
    pwm.start(Channel::Ch2, DutyCycle::HALF).unwrap();
    assert_eq!(pwm.channel_mode(Channel::Ch2), ChannelMode::Single);

    let sim = pwm.release();
    assert!(sim.is_running(Channel::Ch2));
    assert_eq!(sim.apply_count(), 1);
}
