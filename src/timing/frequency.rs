//! Prescaler / Period Calculation
//!
//! Converts a target PWM frequency into the prescaler and auto-reload
//! register values of a timer. This module is testable on the host.
//!
//! # Theory of Operation
//!
//! The timer counts at `FCLK / (PSC + 1)` and wraps after `ARR + 1` ticks:
//!
//! ```text
//! FPWM = FCLK / ((PSC + 1) × (ARR + 1))
//! ```
//!
//! The resolver looks for the smallest divisor `PSC + 1` that brings the
//! tick count `FCLK / ((PSC + 1) × FPWM)` within the counter width. A small
//! prescaler keeps the period large, which gives the finest duty-cycle
//! resolution. Both registers hold "count minus one", so the search result
//! is decremented once before it is programmed.

use crate::config::{MAX_FREQUENCY_DIVISOR, PRESCALER_MAX};
use crate::error::{PwmError, PwmResult};
use crate::types::CounterWidth;

/// Prescaler and period register values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ResolvedTiming {
    /// Prescaler register value (clock divisor minus one)
    pub prescaler: u32,
    /// Auto-reload register value (ticks per period minus one)
    pub period: u32,
}

impl ResolvedTiming {
    /// Create from raw register values
    #[must_use]
    pub const fn new(prescaler: u32, period: u32) -> Self {
        Self { prescaler, period }
    }

    /// Total number of input clock cycles in one PWM period
    ///
    /// Saturates at `u64::MAX` for the one pair that spans 2^64 cycles.
    #[must_use]
    pub fn cycles_per_period(&self) -> u64 {
        (u64::from(self.prescaler) + 1).saturating_mul(u64::from(self.period) + 1)
    }

    /// PWM frequency these values produce from a given timer clock
    #[must_use]
    pub fn output_frequency_hz(&self, timer_clock_hz: u32) -> u32 {
        (u64::from(timer_clock_hz) / self.cycles_per_period()) as u32
    }

    /// Whether the period fits the given counter
    #[must_use]
    pub const fn fits(&self, width: CounterWidth) -> bool {
        self.period <= width.max() && self.prescaler <= PRESCALER_MAX
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ResolvedTiming {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PSC={} ARR={}", self.prescaler, self.period);
    }
}

/// Exclusive upper bound on the PWM frequency for a timer clock
#[must_use]
pub const fn max_frequency_hz(timer_clock_hz: u32) -> u32 {
    timer_clock_hz / MAX_FREQUENCY_DIVISOR
}

/// Calculate prescaler and period for a target frequency
///
/// Frequencies at or above one tenth of the timer clock are rejected, as
/// they would leave fewer than ten duty-cycle steps.
///
/// # Errors
///
/// - [`PwmError::ZeroFrequency`] when `target_hz` is 0
/// - [`PwmError::FrequencyOutOfRange`] when `target_hz >= timer_clock_hz / 10`
pub fn resolve(target_hz: u32, timer_clock_hz: u32, width: CounterWidth) -> PwmResult<ResolvedTiming> {
    if target_hz == 0 {
        return Err(PwmError::ZeroFrequency);
    }

    let max_hz = max_frequency_hz(timer_clock_hz);
    if target_hz >= max_hz {
        return Err(PwmError::FrequencyOutOfRange {
            requested_hz: target_hz,
            max_hz,
        });
    }

    let clock = u64::from(timer_clock_hz);
    let target = u64::from(target_hz);
    let counter_max = u64::from(width.max());

    let mut prescaler: u64 = 0;
    let mut period: u64;
    loop {
        period = clock / ((prescaler + 1) * target);
        prescaler += 1;
        if period <= counter_max {
            break;
        }
    }

    // Both registers hold "count minus one". A 16-bit prescaler times a
    // 16-bit counter spans 2^32 cycles, so the prescaler always fits.
    Ok(ResolvedTiming::new((prescaler - 1) as u32, (period - 1) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_fit_needs_no_prescaler() {
        // 48 MHz / 1 kHz = 48000 ticks, fits 16 bits
        let timing = resolve(1_000, 48_000_000, CounterWidth::Bits16).unwrap();
        assert_eq!(timing, ResolvedTiming::new(0, 47_999));
        assert_eq!(timing.output_frequency_hz(48_000_000), 1_000);
    }

    #[test]
    fn low_frequency_needs_prescaler() {
        // 4.8M ticks: smallest divisor with floor(4.8M / d) <= 65535 is 74
        let timing = resolve(10, 48_000_000, CounterWidth::Bits16).unwrap();
        assert_eq!(timing, ResolvedTiming::new(73, 64_863));
    }

    #[test]
    fn thirty_two_bit_counter_never_divides() {
        let timing = resolve(1, 170_000_000, CounterWidth::Bits32).unwrap();
        assert_eq!(timing, ResolvedTiming::new(0, 169_999_999));
    }

    #[test]
    fn guard_is_strict() {
        assert_eq!(
            resolve(4_800_000, 48_000_000, CounterWidth::Bits16),
            Err(PwmError::FrequencyOutOfRange {
                requested_hz: 4_800_000,
                max_hz: 4_800_000,
            })
        );
        assert!(resolve(4_799_999, 48_000_000, CounterWidth::Bits16).is_ok());
    }

    #[test]
    fn zero_frequency_rejected() {
        assert_eq!(resolve(0, 48_000_000, CounterWidth::Bits16), Err(PwmError::ZeroFrequency));
    }

    #[test]
    fn slowest_setting_fits_prescaler_register() {
        let timing = resolve(1, u32::MAX, CounterWidth::Bits16).unwrap();
        assert_eq!(timing, ResolvedTiming::new(65_535, 65_534));
        assert!(timing.fits(CounterWidth::Bits16));
    }

    #[test]
    fn widest_register_pair_saturates() {
        let timing = ResolvedTiming::new(u32::MAX, u32::MAX);
        assert_eq!(timing.cycles_per_period(), u64::MAX);
        assert_eq!(timing.output_frequency_hz(u32::MAX), 0);
        assert_eq!(ResolvedTiming::new(u32::MAX, 0).cycles_per_period(), 1 << 32);
    }

    #[test]
    fn zero_clock_rejects_everything() {
        assert!(matches!(
            resolve(1, 0, CounterWidth::Bits32),
            Err(PwmError::FrequencyOutOfRange { max_hz: 0, .. })
        ));
    }
}
