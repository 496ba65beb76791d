//! Error types for timer configuration and PWM control

use core::fmt;

use crate::types::Channel;

/// Initialization step rejected by the timer backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HardwareFault {
    /// Time-base (prescaler, period, counter mode) configuration failed
    BaseInit,
    /// Internal clock source selection failed
    ClockSource,
    /// Output-compare channel configuration failed
    OutputCompare,
    /// Master/slave trigger configuration failed
    MasterConfig,
    /// Break and dead-time configuration failed
    BreakDeadTime,
    /// A value does not fit the register it targets
    ValueOutOfRange,
}

impl fmt::Display for HardwareFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BaseInit => write!(f, "time-base initialization failed"),
            Self::ClockSource => write!(f, "clock source configuration failed"),
            Self::OutputCompare => write!(f, "output compare configuration failed"),
            Self::MasterConfig => write!(f, "master configuration failed"),
            Self::BreakDeadTime => write!(f, "break/dead-time configuration failed"),
            Self::ValueOutOfRange => write!(f, "register value out of range"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for HardwareFault {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::BaseInit => defmt::write!(f, "BaseInit"),
            Self::ClockSource => defmt::write!(f, "ClockSource"),
            Self::OutputCompare => defmt::write!(f, "OutputCompare"),
            Self::MasterConfig => defmt::write!(f, "MasterConfig"),
            Self::BreakDeadTime => defmt::write!(f, "BreakDeadTime"),
            Self::ValueOutOfRange => defmt::write!(f, "ValueOutOfRange"),
        }
    }
}

impl core::error::Error for HardwareFault {}

/// PWM controller errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PwmError {
    /// The timer backend rejected a register program
    Configuration(HardwareFault),
    /// Requested frequency is at or above one tenth of the timer clock
    FrequencyOutOfRange {
        /// Frequency that was asked for
        requested_hz: u32,
        /// Exclusive upper bound for this timer clock
        max_hz: u32,
    },
    /// A frequency of 0 Hz was requested
    ZeroFrequency,
    /// Dead time does not fit the 8-bit dead-time generator
    DeadTimeOverflow {
        /// Dead time expressed in timer ticks
        ticks: u64,
    },
    /// Start/stop was requested on a channel configured as disabled
    ChannelDisabled(Channel),
    /// Duty cycle outside `[0, 100]` percent
    InvalidDutyCycle,
}

impl fmt::Display for PwmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(fault) => write!(f, "hardware configuration failure: {fault}"),
            Self::FrequencyOutOfRange { requested_hz, max_hz } => {
                write!(f, "frequency {requested_hz} Hz out of range (must be below {max_hz} Hz)")
            }
            Self::ZeroFrequency => write!(f, "frequency must be non-zero"),
            Self::DeadTimeOverflow { ticks } => {
                write!(f, "dead time of {ticks} ticks exceeds the 8-bit dead-time register")
            }
            Self::ChannelDisabled(channel) => write!(f, "{channel} is disabled"),
            Self::InvalidDutyCycle => write!(f, "duty cycle must be within 0..=100 percent"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for PwmError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Configuration(fault) => defmt::write!(f, "Configuration({})", fault),
            Self::FrequencyOutOfRange { requested_hz, max_hz } => {
                defmt::write!(f, "FrequencyOutOfRange({} Hz >= {} Hz)", requested_hz, max_hz);
            }
            Self::ZeroFrequency => defmt::write!(f, "ZeroFrequency"),
            Self::DeadTimeOverflow { ticks } => defmt::write!(f, "DeadTimeOverflow({} ticks)", ticks),
            Self::ChannelDisabled(channel) => defmt::write!(f, "ChannelDisabled({})", channel),
            Self::InvalidDutyCycle => defmt::write!(f, "InvalidDutyCycle"),
        }
    }
}

impl core::error::Error for PwmError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Configuration(fault) => Some(fault),
            _ => None,
        }
    }
}

impl From<HardwareFault> for PwmError {
    fn from(fault: HardwareFault) -> Self {
        Self::Configuration(fault)
    }
}

impl embedded_hal::pwm::Error for PwmError {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}

/// Result type for PWM operations
pub type PwmResult<T> = Result<T, PwmError>;
