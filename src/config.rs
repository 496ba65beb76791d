//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the timer hardware.
//! Register widths, resolver limits, defaults and demo pin assignments
//! are centralized here.

/// Number of capture/compare channels on one timer
pub const NUM_CHANNELS: usize = 4;

/// Highest PWM frequency accepted is strictly below `timer_clock / MAX_FREQUENCY_DIVISOR`
pub const MAX_FREQUENCY_DIVISOR: u32 = 10;

/// Largest auto-reload value of a 16-bit counter
pub const COUNTER_MAX_16BIT: u32 = 0xFFFF;

/// Largest auto-reload value of a 32-bit counter
pub const COUNTER_MAX_32BIT: u32 = 0xFFFF_FFFF;

/// Largest value of the prescaler register (16-bit on all supported timers)
pub const PRESCALER_MAX: u32 = 0xFFFF;

/// Nanoseconds per second
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Default PWM frequency (1 kHz)
pub const DEFAULT_FREQUENCY_HZ: u32 = 1_000;

/// Default dead time between complementary edges (1 µs)
pub const DEFAULT_DEAD_TIME_NS: u32 = 1_000;

/// Demo board assignments
pub mod demo {
    //! Timer and pin assignments used by the `pwm-demo` binary (NUCLEO-G474RE)

    /// Advanced-control timer driving the outputs
    pub const TIMER: u8 = 1;

    /// TIM1_CH1 output
    pub const CH1: &str = "PA8";

    /// TIM1_CH1N output
    pub const CH1N: &str = "PA7";

    /// TIM1_CH2 output
    pub const CH2: &str = "PA9";

    /// TIM1_CH2N output
    pub const CH2N: &str = "PB0";

    /// TIM1_CH3 output
    pub const CH3: &str = "PA10";

    /// PWM frequency used by the demo (20 kHz, above audible range)
    pub const FREQUENCY_HZ: u32 = 20_000;

    /// Dead time used by the demo
    pub const DEAD_TIME_NS: u32 = 500;

    /// Duty-cycle sweep step in percent
    pub const SWEEP_STEP_PERCENT: f32 = 5.0;

    /// Delay between sweep steps in milliseconds
    pub const SWEEP_INTERVAL_MS: u64 = 50;
}
