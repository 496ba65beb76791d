//! Shared PWM Controller
//!
//! Wraps a [`HardwarePwm`] in a blocking mutex so it can be reached from
//! several execution contexts (thread mode and interrupts on target,
//! threads on the host). Every call, including a full frequency change,
//! runs inside one critical section, so duty-cycle writes never observe
//! a half-updated period.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::backend::TimerBackend;
use crate::clock::ClockSource;
use crate::error::PwmResult;
use crate::pwm::HardwarePwm;
use crate::timing::ResolvedTiming;
use crate::types::{Channel, DutyCycle};

/// Mutex-protected PWM controller
pub struct SharedPwm<'a, M: RawMutex, B, C: ?Sized> {
    inner: Mutex<M, RefCell<HardwarePwm<'a, B, C>>>,
}

impl<'a, M: RawMutex, B: TimerBackend, C: ClockSource + ?Sized> SharedPwm<'a, M, B, C> {
    /// Wrap an initialized controller
    #[must_use]
    pub const fn new(pwm: HardwarePwm<'a, B, C>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(pwm)),
        }
    }

    /// Run a closure with exclusive access to the controller
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from inside another `lock` closure.
    pub fn lock<R>(&self, f: impl FnOnce(&mut HardwarePwm<'a, B, C>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// See [`HardwarePwm::start`]
    ///
    /// # Errors
    ///
    /// As [`HardwarePwm::start`].
    pub fn start(&self, channel: Channel, duty: DutyCycle) -> PwmResult<()> {
        self.lock(|pwm| pwm.start(channel, duty))
    }

    /// See [`HardwarePwm::stop`]
    ///
    /// # Errors
    ///
    /// As [`HardwarePwm::stop`].
    pub fn stop(&self, channel: Channel) -> PwmResult<()> {
        self.lock(|pwm| pwm.stop(channel))
    }

    /// See [`HardwarePwm::start_all`]
    pub fn start_all(&self, duty: DutyCycle) {
        self.lock(|pwm| pwm.start_all(duty));
    }

    /// See [`HardwarePwm::stop_all`]
    pub fn stop_all(&self) {
        self.lock(|pwm| pwm.stop_all());
    }

    /// See [`HardwarePwm::change_duty_cycle`]
    ///
    /// # Errors
    ///
    /// As [`HardwarePwm::change_duty_cycle`].
    pub fn change_duty_cycle(&self, channel: Channel, duty: DutyCycle) -> PwmResult<()> {
        self.lock(|pwm| pwm.change_duty_cycle(channel, duty))
    }

    /// Change frequency and restart the given channels in one critical section
    ///
    /// # Errors
    ///
    /// As [`HardwarePwm::change_frequency`] and [`HardwarePwm::start`].
    pub fn retune(&self, frequency_hz: u32, restart: &[(Channel, DutyCycle)]) -> PwmResult<()> {
        self.lock(|pwm| {
            pwm.change_frequency(frequency_hz)?;
            restart
                .iter()
                .try_for_each(|&(channel, duty)| pwm.start(channel, duty))
        })
    }

    /// See [`HardwarePwm::change_frequency`]
    ///
    /// # Errors
    ///
    /// As [`HardwarePwm::change_frequency`].
    pub fn change_frequency(&self, frequency_hz: u32) -> PwmResult<()> {
        self.lock(|pwm| pwm.change_frequency(frequency_hz))
    }

    /// Prescaler and period currently programmed
    pub fn timing(&self) -> ResolvedTiming {
        self.lock(|pwm| pwm.timing())
    }

    /// Unwrap the controller
    pub fn into_inner(self) -> HardwarePwm<'a, B, C> {
        self.inner.into_inner().into_inner()
    }
}
