//! PWM Controller
//!
//! Drives up to four channels of one timer. All channels share the
//! prescaler and period, so a frequency change stops every channel,
//! reprograms the time base and leaves the channels stopped until the
//! application restarts them.
//!
//! The controller owns its backend but only borrows the clock source and
//! the channel table; both must outlive it.

use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use crate::backend::{TimerBackend, TimerConfig};
use crate::clock::ClockSource;
use crate::error::{PwmError, PwmResult};
use crate::timing::{resolve, resolve_dead_time, ResolvedTiming};
use crate::types::{Channel, ChannelMode, ChannelModes, CounterWidth, DutyCycle, TimerSpec};

/// Hardware PWM controller for one timer
pub struct HardwarePwm<'a, B, C: ?Sized> {
    /// Register access
    backend: B,
    /// Timer input clock
    clock: &'a C,
    /// Channel configuration
    channels: &'a ChannelModes,
    /// Current specification (frequency is updated on change)
    spec: TimerSpec,
    /// Prescaler and period currently programmed
    timing: ResolvedTiming,
    /// Dead-time register value currently programmed
    dead_time: u8,
}

impl<'a, B: TimerBackend, C: ClockSource + ?Sized> HardwarePwm<'a, B, C> {
    /// Resolve timing, initialize the timer and stop all channels
    ///
    /// # Errors
    ///
    /// Returns an error if the frequency or dead time cannot be represented,
    /// or if the backend rejects the configuration.
    pub fn new(backend: B, clock: &'a C, channels: &'a ChannelModes, spec: TimerSpec) -> PwmResult<Self> {
        let (timing, dead_time) = Self::calculate(clock, &spec)?;

        let mut pwm = Self {
            backend,
            clock,
            channels,
            spec,
            timing,
            dead_time,
        };
        pwm.program(spec.counter_width, timing, dead_time)?;
        pwm.stop_all();
        Ok(pwm)
    }

    /// Prescaler, period and dead-time register for a specification
    fn calculate(clock: &C, spec: &TimerSpec) -> PwmResult<(ResolvedTiming, u8)> {
        let clock_hz = clock.timer_clock_hz();
        let timing = resolve(spec.frequency_hz, clock_hz, spec.counter_width).inspect_err(|e| {
            warn!("cannot resolve {} Hz from {} Hz clock: {}", spec.frequency_hz, clock_hz, e);
        })?;
        let dead_time = resolve_dead_time(clock_hz, spec.dead_time_ns).inspect_err(|e| {
            warn!("cannot resolve {} ns dead time: {}", spec.dead_time_ns, e);
        })?;

        debug!(
            "{} Hz from {} Hz clock: PSC={} ARR={} DTG={}",
            spec.frequency_hz,
            clock_hz,
            timing.prescaler,
            timing.period,
            dead_time
        );
        Ok((timing, dead_time))
    }

    /// Program timing and dead time into the timer
    fn program(&mut self, width: CounterWidth, timing: ResolvedTiming, dead_time: u8) -> PwmResult<()> {
        let config = TimerConfig::new(timing, width, dead_time);
        self.backend.apply(&config).map_err(|fault| {
            error!("timer configuration rejected: {}", fault);
            PwmError::Configuration(fault)
        })
    }

    /// Mode of a channel, or an error if it is disabled
    fn enabled_mode(&self, channel: Channel) -> PwmResult<ChannelMode> {
        match self.channels.get(channel) {
            ChannelMode::Disabled => Err(PwmError::ChannelDisabled(channel)),
            mode => Ok(mode),
        }
    }

    /// Set the compare value and enable the outputs of one channel
    fn drive(&mut self, channel: Channel, mode: ChannelMode, duty: DutyCycle) {
        let value = duty.compare_value(self.timing.period);
        self.backend.set_compare(channel, value);
        self.backend.start(channel, mode);
        trace!("{} started at {} (CCR={})", channel, duty, value);
    }

    /// Start one channel at a duty cycle
    ///
    /// # Errors
    ///
    /// [`PwmError::ChannelDisabled`] if the channel is configured as disabled.
    pub fn start(&mut self, channel: Channel, duty: DutyCycle) -> PwmResult<()> {
        let mode = self.enabled_mode(channel)?;
        self.drive(channel, mode, duty);
        Ok(())
    }

    /// Stop one channel
    ///
    /// # Errors
    ///
    /// [`PwmError::ChannelDisabled`] if the channel is configured as disabled.
    pub fn stop(&mut self, channel: Channel) -> PwmResult<()> {
        let mode = self.enabled_mode(channel)?;
        self.backend.stop(channel, mode);
        trace!("{} stopped", channel);
        Ok(())
    }

    /// Start every enabled channel at the same duty cycle
    pub fn start_all(&mut self, duty: DutyCycle) {
        for (channel, mode) in self.channels.enabled() {
            self.drive(channel, mode, duty);
        }
    }

    /// Stop every enabled channel
    pub fn stop_all(&mut self) {
        for (channel, mode) in self.channels.enabled() {
            self.backend.stop(channel, mode);
        }
        trace!("all channels stopped");
    }

    /// Change the duty cycle of one channel (starts it if stopped)
    ///
    /// # Errors
    ///
    /// [`PwmError::ChannelDisabled`] if the channel is configured as disabled.
    pub fn change_duty_cycle(&mut self, channel: Channel, duty: DutyCycle) -> PwmResult<()> {
        self.start(channel, duty)
    }

    /// Change the PWM frequency
    ///
    /// Stops all channels and reinitializes the timer. Channels stay
    /// stopped; restart them with the desired duty cycle afterwards.
    /// An unreachable frequency is rejected before any channel is touched.
    ///
    /// # Errors
    ///
    /// Resolution errors leave timer and channels untouched. A backend
    /// failure leaves all channels stopped and the previous timing in
    /// effect, both in the timer and in [`Self::timing`].
    pub fn change_frequency(&mut self, frequency_hz: u32) -> PwmResult<()> {
        let spec = self.spec.with_frequency(frequency_hz);
        let (timing, dead_time) = Self::calculate(self.clock, &spec)?;

        self.stop_all();
        // Only commit once the timer holds the new values
        self.program(spec.counter_width, timing, dead_time)?;
        self.spec = spec;
        self.timing = timing;
        self.dead_time = dead_time;

        info!("PWM frequency changed to {} Hz", frequency_hz);
        Ok(())
    }

    /// Handle for one channel implementing [`SetDutyCycle`]
    pub fn channel(&mut self, channel: Channel) -> PwmOutput<'_, 'a, B, C> {
        PwmOutput { pwm: self, channel }
    }

    /// Prescaler and period currently programmed
    #[must_use]
    pub const fn timing(&self) -> ResolvedTiming {
        self.timing
    }

    /// Current timer specification
    #[must_use]
    pub const fn spec(&self) -> TimerSpec {
        self.spec
    }

    /// Dead-time register value currently programmed
    #[must_use]
    pub const fn dead_time_register(&self) -> u8 {
        self.dead_time
    }

    /// Mode of a channel
    #[must_use]
    pub const fn channel_mode(&self, channel: Channel) -> ChannelMode {
        self.channels.get(channel)
    }

    /// Compare value a duty cycle maps to at the current period
    #[must_use]
    pub fn compare_value(&self, duty: DutyCycle) -> u32 {
        duty.compare_value(self.timing.period)
    }

    /// PWM frequency actually produced (differs from the request by quantization)
    #[must_use]
    pub fn output_frequency_hz(&self) -> u32 {
        self.timing.output_frequency_hz(self.clock.timer_clock_hz())
    }

    /// Borrow the backend
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutably borrow the backend
    ///
    /// Register writes made here bypass the controller's bookkeeping.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Give the backend back, leaving the outputs as they are
    #[must_use]
    pub fn release(self) -> B {
        self.backend
    }
}

/// One channel of a [`HardwarePwm`], usable through `embedded-hal`
pub struct PwmOutput<'p, 'a, B, C: ?Sized> {
    pwm: &'p mut HardwarePwm<'a, B, C>,
    channel: Channel,
}

impl<B, C: ?Sized> PwmOutput<'_, '_, B, C> {
    /// Channel this handle drives
    #[must_use]
    pub const fn id(&self) -> Channel {
        self.channel
    }
}

impl<B: TimerBackend, C: ClockSource + ?Sized> ErrorType for PwmOutput<'_, '_, B, C> {
    type Error = PwmError;
}

impl<B: TimerBackend, C: ClockSource + ?Sized> SetDutyCycle for PwmOutput<'_, '_, B, C> {
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let percent = f32::from(duty) * 100.0 / f32::from(u16::MAX);
        self.pwm.start(self.channel, DutyCycle::saturating(percent))
    }
}
