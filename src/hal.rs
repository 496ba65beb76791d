//! Hardware Abstraction Layer
//!
//! Timer backends for STM32 parts, built on embassy-stm32. Everything
//! above this module is target independent.

pub mod timer;

pub use timer::AdvancedTimer;
