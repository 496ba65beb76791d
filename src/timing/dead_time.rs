//! Dead-Time Calculation
//!
//! Converts a dead time in nanoseconds into the value of the 8-bit
//! dead-time generator field. One register step is one timer clock tick.

use crate::config::NANOS_PER_SECOND;
use crate::error::{PwmError, PwmResult};

/// Dead time between complementary edges
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DeadTime {
    /// Dead time in nanoseconds
    ns: u32,
}

impl DeadTime {
    /// No dead time (only safe when no complementary output is used)
    pub const ZERO: Self = Self { ns: 0 };

    /// Create from nanoseconds
    #[must_use]
    pub const fn from_ns(ns: u32) -> Self {
        Self { ns }
    }

    /// Get dead time in nanoseconds
    #[must_use]
    pub const fn as_ns(self) -> u32 {
        self.ns
    }

    /// Dead time in timer clock ticks (truncated)
    #[must_use]
    pub fn ticks(self, timer_clock_hz: u32) -> u64 {
        // DTG = dead_time * timer_clock / 1e9
        (u64::from(self.ns) * u64::from(timer_clock_hz)) / NANOS_PER_SECOND
    }

    /// Calculate timer register value for given clock
    ///
    /// # Errors
    ///
    /// [`PwmError::DeadTimeOverflow`] when the tick count does not fit 8 bits.
    pub fn as_timer_value(self, timer_clock_hz: u32) -> PwmResult<u8> {
        let ticks = self.ticks(timer_clock_hz);
        u8::try_from(ticks).map_err(|_| PwmError::DeadTimeOverflow { ticks })
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DeadTime {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}ns", self.ns);
    }
}

/// Calculate the dead-time register value for a timer clock
///
/// # Errors
///
/// [`PwmError::DeadTimeOverflow`] when `dead_time_ns` spans more than 255 ticks.
pub fn resolve_dead_time(timer_clock_hz: u32, dead_time_ns: u32) -> PwmResult<u8> {
    DeadTime::from_ns(dead_time_ns).as_timer_value(timer_clock_hz)
}

/// Dead time in nanoseconds that a register value produces
///
/// Truncates to whole nanoseconds and saturates at `u32::MAX` on very slow
/// clocks.
#[must_use]
pub fn dead_time_ns_for(timer_clock_hz: u32, register: u8) -> u32 {
    if timer_clock_hz == 0 {
        return 0;
    }
    let ns = (u64::from(register) * NANOS_PER_SECOND) / u64::from(timer_clock_hz);
    u32::try_from(ns).unwrap_or(u32::MAX)
}
