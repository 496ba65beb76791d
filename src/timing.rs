//! Timer Register Calculation
//!
//! Pure conversions from physical quantities to timer register values:
//! - PWM frequency to prescaler and auto-reload period
//! - Dead time to dead-time generator ticks
//!
//! Nothing here touches hardware, so all of it runs on the host.

pub mod dead_time;
pub mod frequency;

pub use dead_time::{dead_time_ns_for, resolve_dead_time, DeadTime};
pub use frequency::{max_frequency_hz, resolve, ResolvedTiming};
