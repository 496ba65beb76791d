//! Timer Backend Interface
//!
//! The register plumbing behind the controller. A backend receives a
//! complete [`TimerConfig`] and per-channel start/stop/compare requests;
//! it never computes timing itself.

use crate::error::HardwareFault;
use crate::timing::ResolvedTiming;
use crate::types::{Channel, ChannelMode, CounterWidth};

/// Active level of an output
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Polarity {
    /// Output is high while active
    #[default]
    ActiveHigh,
    /// Output is low while active
    ActiveLow,
}

/// Base configuration of the timer
///
/// Everything a backend programs on (re)initialization. The remaining
/// settings are fixed for every backend: up-counting, no clock division,
/// repetition counter 0, outputs low when idle, break input disabled and
/// no register lock. These are the reset values of the timer, so backends
/// start from a reset peripheral and leave those registers alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerConfig {
    /// Prescaler and period
    pub timing: ResolvedTiming,
    /// Counter register width
    pub counter_width: CounterWidth,
    /// Dead-time generator value in timer ticks
    pub dead_time: u8,
    /// Buffer the auto-reload register (ARPE)
    pub auto_reload_preload: bool,
    /// Polarity of main outputs (CCxP)
    pub polarity: Polarity,
    /// Polarity of complementary outputs (CCxNP)
    pub complementary_polarity: Polarity,
}

impl TimerConfig {
    /// Configuration for resolved timing and dead time, defaults elsewhere
    #[must_use]
    pub const fn new(timing: ResolvedTiming, counter_width: CounterWidth, dead_time: u8) -> Self {
        Self {
            timing,
            counter_width,
            dead_time,
            auto_reload_preload: false,
            polarity: Polarity::ActiveHigh,
            complementary_polarity: Polarity::ActiveHigh,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TimerConfig {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "TimerConfig({}, {}, DTG={})",
            self.timing,
            self.counter_width,
            self.dead_time
        );
    }
}

/// Register-level access to one timer peripheral
pub trait TimerBackend {
    /// Program the time base and the break/dead-time block
    ///
    /// # Errors
    ///
    /// The initialization step that rejected the configuration.
    fn apply(&mut self, config: &TimerConfig) -> Result<(), HardwareFault>;

    /// Write the capture/compare register of a channel
    fn set_compare(&mut self, channel: Channel, value: u32);

    /// Enable a channel output (and its complement in complementary mode)
    fn start(&mut self, channel: Channel, mode: ChannelMode);

    /// Disable a channel output (and its complement in complementary mode)
    fn stop(&mut self, channel: Channel, mode: ChannelMode);
}

impl<T: TimerBackend + ?Sized> TimerBackend for &mut T {
    fn apply(&mut self, config: &TimerConfig) -> Result<(), HardwareFault> {
        (**self).apply(config)
    }

    fn set_compare(&mut self, channel: Channel, value: u32) {
        (**self).set_compare(channel, value);
    }

    fn start(&mut self, channel: Channel, mode: ChannelMode) {
        (**self).start(channel, mode);
    }

    fn stop(&mut self, channel: Channel, mode: ChannelMode) {
        (**self).stop(channel, mode);
    }
}
