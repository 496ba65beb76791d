//! Simulated Timer
//!
//! A register-level model of an advanced-control timer for host builds.
//! It keeps PSC, ARR, CCR1-4 and DTG the way the hardware would, tracks
//! which outputs are enabled and records every request so tests can check
//! ordering. A fault can be injected into the next configuration.

use std::vec::Vec;

use crate::backend::{Polarity, TimerBackend, TimerConfig};
use crate::config::NUM_CHANNELS;
use crate::error::HardwareFault;
use crate::types::{Channel, ChannelMode, CounterWidth};

/// Request received by the simulated timer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimEvent {
    /// Base configuration programmed
    Apply(TimerConfig),
    /// Compare register written
    Compare(Channel, u32),
    /// Channel outputs enabled
    Start(Channel, ChannelMode),
    /// Channel outputs disabled
    Stop(Channel, ChannelMode),
}

/// Host-side timer model
#[derive(Clone, Debug, Default)]
pub struct SimulatedTimer {
    /// Counter register width
    width: CounterWidth,
    /// Prescaler register
    psc: u32,
    /// Auto-reload register
    arr: u32,
    /// Capture/compare registers
    ccr: [u32; NUM_CHANNELS],
    /// Dead-time generator
    dtg: u8,
    /// Auto-reload preload enable (ARPE)
    arpe: bool,
    /// Main output polarity (CCxP)
    ccp: [Polarity; NUM_CHANNELS],
    /// Complementary output polarity (CCxNP)
    ccnp: [Polarity; NUM_CHANNELS],
    /// Main output enable (CCxE)
    outputs: [bool; NUM_CHANNELS],
    /// Complementary output enable (CCxNE)
    complementary: [bool; NUM_CHANNELS],
    /// Last accepted configuration
    config: Option<TimerConfig>,
    /// Fault returned by the next `apply`
    fail_next: Option<HardwareFault>,
    /// Everything that happened, oldest first
    events: Vec<SimEvent>,
}

impl SimulatedTimer {
    /// Create a timer in its reset state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `apply` fail with the given fault
    pub fn fail_next_apply(&mut self, fault: HardwareFault) {
        self.fail_next = Some(fault);
    }

    /// Prescaler register
    #[must_use]
    pub const fn prescaler(&self) -> u32 {
        self.psc
    }

    /// Auto-reload register
    #[must_use]
    pub const fn period(&self) -> u32 {
        self.arr
    }

    /// Capture/compare register of a channel
    #[must_use]
    pub const fn compare(&self, channel: Channel) -> u32 {
        self.ccr[channel.index()]
    }

    /// Dead-time register
    #[must_use]
    pub const fn dead_time(&self) -> u8 {
        self.dtg
    }

    /// Whether the auto-reload register is buffered
    #[must_use]
    pub const fn auto_reload_preload(&self) -> bool {
        self.arpe
    }

    /// Main output polarity of a channel
    #[must_use]
    pub const fn polarity(&self, channel: Channel) -> Polarity {
        self.ccp[channel.index()]
    }

    /// Complementary output polarity of a channel
    #[must_use]
    pub const fn complementary_polarity(&self, channel: Channel) -> Polarity {
        self.ccnp[channel.index()]
    }

    /// Whether the main output of a channel is enabled
    #[must_use]
    pub const fn is_running(&self, channel: Channel) -> bool {
        self.outputs[channel.index()]
    }

    /// Whether the complementary output of a channel is enabled
    #[must_use]
    pub const fn is_complementary_running(&self, channel: Channel) -> bool {
        self.complementary[channel.index()]
    }

    /// Whether any output is enabled
    #[must_use]
    pub fn any_running(&self) -> bool {
        self.outputs.iter().chain(self.complementary.iter()).any(|&on| on)
    }

    /// Last accepted configuration
    #[must_use]
    pub const fn config(&self) -> Option<&TimerConfig> {
        self.config.as_ref()
    }

    /// Recorded requests, oldest first
    #[must_use]
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Forget recorded requests
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Number of accepted configurations
    #[must_use]
    pub fn apply_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, SimEvent::Apply(_)))
            .count()
    }

    /// Ratio of compare to period + 1, in percent, as seen on the output
    #[must_use]
    pub fn output_duty_percent(&self, channel: Channel) -> f64 {
        f64::from(self.compare(channel)) * 100.0 / (f64::from(self.arr) + 1.0)
    }
}

impl TimerBackend for SimulatedTimer {
    fn apply(&mut self, config: &TimerConfig) -> Result<(), HardwareFault> {
        if let Some(fault) = self.fail_next.take() {
            trace!("simulated timer: injected fault {}", fault);
            return Err(fault);
        }
        if !config.timing.fits(config.counter_width) {
            return Err(HardwareFault::ValueOutOfRange);
        }

        self.width = config.counter_width;
        self.psc = config.timing.prescaler;
        self.arr = config.timing.period;
        self.dtg = config.dead_time;
        self.arpe = config.auto_reload_preload;
        self.ccp = [config.polarity; NUM_CHANNELS];
        self.ccnp = [config.complementary_polarity; NUM_CHANNELS];
        // Output compare init clears the pulse of every channel
        self.ccr = [0; NUM_CHANNELS];
        self.config = Some(*config);
        self.events.push(SimEvent::Apply(*config));
        trace!("simulated timer: PSC={} ARR={} DTG={}", self.psc, self.arr, self.dtg);
        Ok(())
    }

    fn set_compare(&mut self, channel: Channel, value: u32) {
        // CCR is as wide as the counter
        let value = value & self.width.max();
        self.ccr[channel.index()] = value;
        self.events.push(SimEvent::Compare(channel, value));
    }

    fn start(&mut self, channel: Channel, mode: ChannelMode) {
        self.outputs[channel.index()] = true;
        if mode.is_complementary() {
            self.complementary[channel.index()] = true;
        }
        self.events.push(SimEvent::Start(channel, mode));
    }

    fn stop(&mut self, channel: Channel, mode: ChannelMode) {
        self.outputs[channel.index()] = false;
        if mode.is_complementary() {
            self.complementary[channel.index()] = false;
        }
        self.events.push(SimEvent::Stop(channel, mode));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::ResolvedTiming;

    #[test]
    fn rejects_period_wider_than_counter() {
        let mut timer = SimulatedTimer::new();
        let config = TimerConfig::new(ResolvedTiming::new(0, 0x1_0000), CounterWidth::Bits16, 0);
        assert_eq!(timer.apply(&config), Err(HardwareFault::ValueOutOfRange));
        assert!(timer.config().is_none());
    }

    #[test]
    fn injected_fault_is_one_shot() {
        let mut timer = SimulatedTimer::new();
        let config = TimerConfig::new(ResolvedTiming::new(0, 999), CounterWidth::Bits16, 10);
        timer.fail_next_apply(HardwareFault::BreakDeadTime);
        assert_eq!(timer.apply(&config), Err(HardwareFault::BreakDeadTime));
        assert_eq!(timer.apply(&config), Ok(()));
        assert_eq!(timer.period(), 999);
        assert_eq!(timer.dead_time(), 10);
    }

    #[test]
    fn output_settings_reach_registers() {
        let mut timer = SimulatedTimer::new();
        let mut config = TimerConfig::new(ResolvedTiming::new(1, 999), CounterWidth::Bits16, 0);
        config.auto_reload_preload = true;
        config.polarity = Polarity::ActiveLow;
        timer.apply(&config).unwrap();

        assert!(timer.auto_reload_preload());
        for channel in Channel::ALL {
            assert_eq!(timer.polarity(channel), Polarity::ActiveLow);
            assert_eq!(timer.complementary_polarity(channel), Polarity::ActiveHigh);
        }
    }

    #[test]
    fn complementary_stop_clears_both_outputs() {
        let mut timer = SimulatedTimer::new();
        timer.start(Channel::Ch1, ChannelMode::Complementary);
        assert!(timer.is_running(Channel::Ch1));
        assert!(timer.is_complementary_running(Channel::Ch1));
        timer.stop(Channel::Ch1, ChannelMode::Complementary);
        assert!(!timer.any_running());
    }
}
