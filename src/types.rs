//! Shared types used across the PWM controller
//!
//! This module defines domain-specific types that enforce invariants
//! at construction time: channel identifiers, channel modes, counter
//! width, timer specification and duty cycle.

use core::fmt;

use crate::config::{COUNTER_MAX_16BIT, COUNTER_MAX_32BIT, DEFAULT_DEAD_TIME_NS, DEFAULT_FREQUENCY_HZ, NUM_CHANNELS};
use crate::error::PwmError;

/// Capture/compare channel of the timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// Channel 1
    Ch1,
    /// Channel 2
    Ch2,
    /// Channel 3
    Ch3,
    /// Channel 4
    Ch4,
}

impl Channel {
    /// All channels in register order
    pub const ALL: [Self; NUM_CHANNELS] = [Self::Ch1, Self::Ch2, Self::Ch3, Self::Ch4];

    /// Zero-based index (CCR1 is index 0)
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Ch1 => 0,
            Self::Ch2 => 1,
            Self::Ch3 => 2,
            Self::Ch4 => 3,
        }
    }

    /// One-based channel number as printed in reference manuals
    #[must_use]
    pub const fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Channel from zero-based index
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Ch1),
            1 => Some(Self::Ch2),
            2 => Some(Self::Ch3),
            3 => Some(Self::Ch4),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CH{}", self.number())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Channel {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "CH{}", self.number());
    }
}

/// Output configuration of one channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChannelMode {
    /// Channel is not used; start/stop requests are rejected
    #[default]
    Disabled,
    /// Main output only
    Single,
    /// Main output plus inverted output with dead time
    Complementary,
}

impl ChannelMode {
    /// Whether the channel takes part in PWM generation
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Whether the paired (N) output is driven as well
    #[must_use]
    pub const fn is_complementary(self) -> bool {
        matches!(self, Self::Complementary)
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("disabled"),
            Self::Single => f.write_str("single"),
            Self::Complementary => f.write_str("complementary"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ChannelMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Disabled => defmt::write!(f, "OFF"),
            Self::Single => defmt::write!(f, "PWM"),
            Self::Complementary => defmt::write!(f, "PWM+N"),
        }
    }
}

/// Per-channel mode table, fixed for the lifetime of a controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ChannelModes([ChannelMode; NUM_CHANNELS]);

impl ChannelModes {
    /// All four channels disabled
    pub const DISABLED: Self = Self([ChannelMode::Disabled; NUM_CHANNELS]);

    /// Create a table from the four channel modes
    #[must_use]
    pub const fn new(ch1: ChannelMode, ch2: ChannelMode, ch3: ChannelMode, ch4: ChannelMode) -> Self {
        Self([ch1, ch2, ch3, ch4])
    }

    /// Return a copy with one channel reconfigured
    #[must_use]
    pub fn with(mut self, channel: Channel, mode: ChannelMode) -> Self {
        self.0[channel.index()] = mode;
        self
    }

    /// Mode of a channel
    #[must_use]
    pub const fn get(&self, channel: Channel) -> ChannelMode {
        self.0[channel.index()]
    }

    /// Channels that are not disabled, in register order
    #[must_use]
    pub fn enabled(&self) -> heapless::Vec<(Channel, ChannelMode), NUM_CHANNELS> {
        Channel::ALL
            .iter()
            .map(|&ch| (ch, self.get(ch)))
            .filter(|(_, mode)| mode.is_enabled())
            .collect()
    }

    /// Whether any channel drives a complementary output
    #[must_use]
    pub fn any_complementary(&self) -> bool {
        self.0.iter().any(|mode| mode.is_complementary())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ChannelModes {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[{}, {}, {}, {}]", self.0[0], self.0[1], self.0[2], self.0[3]);
    }
}

/// Width of the timer counter and auto-reload register
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CounterWidth {
    /// 16-bit counter (TIM1, TIM3, ...)
    #[default]
    Bits16,
    /// 32-bit counter (TIM2, TIM5 on most families)
    Bits32,
}

impl CounterWidth {
    /// Counter width from the "timer is 32-bit" flag
    #[must_use]
    pub const fn from_is_32bit(is_32bit: bool) -> Self {
        if is_32bit {
            Self::Bits32
        } else {
            Self::Bits16
        }
    }

    /// Largest representable period value
    #[must_use]
    pub const fn max(self) -> u32 {
        match self {
            Self::Bits16 => COUNTER_MAX_16BIT,
            Self::Bits32 => COUNTER_MAX_32BIT,
        }
    }

    /// Whether this is a 32-bit counter
    #[must_use]
    pub const fn is_32bit(self) -> bool {
        matches!(self, Self::Bits32)
    }
}

impl fmt::Display for CounterWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bits16 => f.write_str("16-bit"),
            Self::Bits32 => f.write_str("32-bit"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for CounterWidth {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Bits16 => defmt::write!(f, "16-bit"),
            Self::Bits32 => defmt::write!(f, "32-bit"),
        }
    }
}

/// Timer specification requested by the application
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerSpec {
    /// Target PWM frequency in Hz
    pub frequency_hz: u32,
    /// Counter register width
    pub counter_width: CounterWidth,
    /// Dead time between complementary edges in nanoseconds
    pub dead_time_ns: u32,
}

impl TimerSpec {
    /// Create a new specification
    #[must_use]
    pub const fn new(frequency_hz: u32, counter_width: CounterWidth, dead_time_ns: u32) -> Self {
        Self {
            frequency_hz,
            counter_width,
            dead_time_ns,
        }
    }

    /// Same specification at a different frequency
    #[must_use]
    pub const fn with_frequency(self, frequency_hz: u32) -> Self {
        Self {
            frequency_hz,
            ..self
        }
    }
}

impl Default for TimerSpec {
    fn default() -> Self {
        Self::new(DEFAULT_FREQUENCY_HZ, CounterWidth::Bits16, DEFAULT_DEAD_TIME_NS)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TimerSpec {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "{} Hz, {}, {} ns",
            self.frequency_hz,
            self.counter_width,
            self.dead_time_ns
        );
    }
}

/// PWM duty cycle as a percentage in `[0, 100]`
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct DutyCycle(f32);

impl DutyCycle {
    /// 0% duty cycle
    pub const ZERO: Self = Self(0.0);

    /// 50% duty cycle
    pub const HALF: Self = Self(50.0);

    /// 100% duty cycle
    pub const FULL: Self = Self(100.0);

    /// Create from percentage, returns None if outside `[0, 100]` or NaN
    #[must_use]
    pub fn from_percent(percent: f32) -> Option<Self> {
        if (0.0..=100.0).contains(&percent) {
            Some(Self(percent))
        } else {
            None
        }
    }

    /// Create from percentage, clamping into `[0, 100]` (NaN maps to 0%)
    #[must_use]
    pub fn saturating(percent: f32) -> Self {
        if percent.is_nan() {
            Self::ZERO
        } else {
            Self(percent.clamp(0.0, 100.0))
        }
    }

    /// Get as percentage
    #[must_use]
    pub const fn percent(self) -> f32 {
        self.0
    }

    /// Capture/compare value for a given period, rounded half up
    #[must_use]
    pub fn compare_value(self, period: u32) -> u32 {
        // f64 keeps full precision for 32-bit periods
        let exact = f64::from(period) * f64::from(self.0) / 100.0;
        (exact + 0.5) as u32
    }
}

impl TryFrom<f32> for DutyCycle {
    type Error = PwmError;

    fn try_from(percent: f32) -> Result<Self, Self::Error> {
        Self::from_percent(percent).ok_or(PwmError::InvalidDutyCycle)
    }
}

impl fmt::Display for DutyCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DutyCycle {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}%", self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_index_roundtrip() {
        for ch in Channel::ALL {
            assert_eq!(Channel::from_index(ch.index()), Some(ch));
        }
        assert_eq!(Channel::from_index(4), None);
        assert_eq!(Channel::Ch3.number(), 3);
    }

    #[test]
    fn enabled_channels_skip_disabled() {
        let modes = ChannelModes::DISABLED
            .with(Channel::Ch2, ChannelMode::Single)
            .with(Channel::Ch4, ChannelMode::Complementary);
        let enabled = modes.enabled();
        assert_eq!(enabled.len(), 2);
        assert_eq!(enabled[0], (Channel::Ch2, ChannelMode::Single));
        assert_eq!(enabled[1], (Channel::Ch4, ChannelMode::Complementary));
        assert!(modes.any_complementary());
    }

    #[test]
    fn duty_cycle_rejects_out_of_range() {
        assert!(DutyCycle::from_percent(-0.1).is_none());
        assert!(DutyCycle::from_percent(100.1).is_none());
        assert!(DutyCycle::from_percent(f32::NAN).is_none());
        assert_eq!(DutyCycle::try_from(150.0), Err(PwmError::InvalidDutyCycle));
    }

    #[test]
    fn duty_cycle_saturates() {
        assert_eq!(DutyCycle::saturating(120.0), DutyCycle::FULL);
        assert_eq!(DutyCycle::saturating(-5.0), DutyCycle::ZERO);
        assert_eq!(DutyCycle::saturating(f32::NAN), DutyCycle::ZERO);
    }

    #[test]
    fn compare_value_rounds_half_up() {
        assert_eq!(DutyCycle::HALF.compare_value(999), 500);
        assert_eq!(DutyCycle::ZERO.compare_value(999), 0);
        assert_eq!(DutyCycle::FULL.compare_value(999), 999);
        assert_eq!(DutyCycle::FULL.compare_value(u32::MAX), u32::MAX);
    }

    #[test]
    fn counter_width_limits() {
        assert_eq!(CounterWidth::from_is_32bit(false).max(), 0xFFFF);
        assert_eq!(CounterWidth::from_is_32bit(true).max(), 0xFFFF_FFFF);
    }
}
