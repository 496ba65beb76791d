//! Hardware Timer PWM Library
//!
//! Drives up to four PWM channels of one hardware timer from a frequency,
//! a counter width and a dead time. Channels run either as a single output
//! or as a complementary pair with dead-time insertion, and the frequency
//! can be changed at runtime.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CONTROLLER LAYER                         │
//! │  HardwarePwm  │  SharedPwm (mutex)  │  embedded-hal adapter  │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   TIMING CALCULATION                         │
//! │  Frequency → (prescaler, period)  │  Dead time → ticks       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    BACKEND / CLOCK                           │
//! │  TimerBackend: AdvancedTimer │ SimulatedTimer                │
//! │  ClockSource: FixedClock │ BusClockTree │ AdvancedTimer      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The timing calculation is pure and runs on the host; the controller is
//! generic over its backend so it can be tested against [`sim::SimulatedTimer`].
//!
//! # Example
//!
//! ```
//! use pwm_timer::prelude::*;
//! use pwm_timer::sim::SimulatedTimer;
//!
//! static CHANNELS: ChannelModes = ChannelModes::new(
//!     ChannelMode::Complementary,
//!     ChannelMode::Single,
//!     ChannelMode::Disabled,
//!     ChannelMode::Disabled,
//! );
//!
//! let clock = FixedClock(48_000_000);
//! let spec = TimerSpec::new(1_000, CounterWidth::Bits16, 1_000);
//! let mut pwm = HardwarePwm::new(SimulatedTimer::new(), &clock, &CHANNELS, spec)?;
//! assert_eq!(pwm.timing().period, 47_999);
//!
//! pwm.start(Channel::Ch1, DutyCycle::HALF)?;
//! assert_eq!(pwm.backend().compare(Channel::Ch1), 24_000);
//! # Ok::<(), PwmError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Must come first so the logging macros are visible to every module
mod fmt;

/// System configuration and constants
pub mod config;

/// Shared types used across modules
pub mod types;

/// Error types
pub mod error;

/// Timing calculation
///
/// Frequency and dead-time resolution; pure functions only.
pub mod timing;

/// Timer clock sources
pub mod clock;

/// Timer backend interface
pub mod backend;

/// PWM controller
pub mod pwm;

/// Mutex-protected controller
pub mod shared;

/// Register-level timer model for host builds
#[cfg(feature = "std")]
pub mod sim;

/// Hardware Abstraction Layer
///
/// Backend for STM32 advanced-control timers.
#[cfg(feature = "embedded")]
pub mod hal;

pub use backend::{TimerBackend, TimerConfig};
pub use clock::{BusClockTree, ClockSource, FixedClock};
pub use error::{HardwareFault, PwmError, PwmResult};
pub use pwm::{HardwarePwm, PwmOutput};
pub use shared::SharedPwm;
pub use timing::{resolve, resolve_dead_time, ResolvedTiming};
pub use types::{Channel, ChannelMode, ChannelModes, CounterWidth, DutyCycle, TimerSpec};

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::backend::{TimerBackend, TimerConfig};
    pub use crate::clock::{BusClockTree, BusClocks, ChipFamily, ClockSource, FixedClock, TimerInstance};
    pub use crate::error::{HardwareFault, PwmError, PwmResult};
    pub use crate::pwm::HardwarePwm;
    pub use crate::shared::SharedPwm;
    pub use crate::timing::{resolve, resolve_dead_time, DeadTime, ResolvedTiming};
    pub use crate::types::*;

    // Common traits
    pub use embedded_hal::pwm::SetDutyCycle;
}
