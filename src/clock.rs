//! Timer Input Clock
//!
//! The timer clock is the APB bus clock the timer hangs off, doubled
//! whenever that bus runs with a prescaler other than 1. Which bus feeds
//! which timer depends on the chip family.
//!
//! ```text
//!  HCLK ──► APBx prescaler ──► PCLKx ──► ×1 (APB presc = 1) ──► TIMxCLK
//!                                   └──► ×2 (APB presc > 1) ──┘
//! ```

use core::fmt;

/// Source of the timer input clock frequency
pub trait ClockSource {
    /// Effective timer input clock in Hz
    fn timer_clock_hz(&self) -> u32;
}

impl<T: ClockSource + ?Sized> ClockSource for &T {
    fn timer_clock_hz(&self) -> u32 {
        (**self).timer_clock_hz()
    }
}

/// Clock with a frequency known up front
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub u32);

impl ClockSource for FixedClock {
    fn timer_clock_hz(&self) -> u32 {
        self.0
    }
}

/// Peripheral bus a timer is clocked from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bus {
    /// Low-speed peripheral bus
    Apb1,
    /// High-speed peripheral bus
    Apb2,
}

#[cfg(feature = "embedded")]
impl defmt::Format for Bus {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Apb1 => defmt::write!(f, "APB1"),
            Self::Apb2 => defmt::write!(f, "APB2"),
        }
    }
}

/// Timer peripheral number (TIM1 = 1, TIM2 = 2, ...)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimerInstance(u8);

impl TimerInstance {
    /// Advanced-control timer TIM1
    pub const TIM1: Self = Self(1);
    /// General-purpose timer TIM2
    pub const TIM2: Self = Self(2);
    /// General-purpose timer TIM3
    pub const TIM3: Self = Self(3);
    /// General-purpose timer TIM4
    pub const TIM4: Self = Self(4);
    /// General-purpose timer TIM5
    pub const TIM5: Self = Self(5);
    /// Advanced-control timer TIM8
    pub const TIM8: Self = Self(8);

    /// Create from timer number
    #[must_use]
    pub const fn new(number: u8) -> Self {
        Self(number)
    }

    /// Timer number
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for TimerInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TIM{}", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TimerInstance {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "TIM{}", self.0);
    }
}

/// Microcontroller family, selects the timer-to-bus mapping
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChipFamily {
    /// STM32F0: single APB, max 48 MHz
    Stm32F0,
    /// STM32F1: APB1 max 36 MHz, APB2 max 72 MHz
    Stm32F1,
    /// STM32F2: APB1 max 30 MHz, APB2 max 60 MHz
    Stm32F2,
    /// STM32F3: APB1 max 36 MHz, APB2 max 72 MHz
    Stm32F3,
    /// STM32F4: APB1 max 42 MHz, APB2 max 84 MHz
    Stm32F4,
    /// STM32F7: APB1 max 54 MHz, APB2 max 108 MHz
    Stm32F7,
}

impl ChipFamily {
    /// Timers clocked from APB1; everything else sits on APB2
    #[must_use]
    pub const fn apb1_timers(self) -> &'static [u8] {
        match self {
            Self::Stm32F0 => &[],
            Self::Stm32F1 => &[2, 3, 4],
            Self::Stm32F2 | Self::Stm32F4 | Self::Stm32F7 => &[2, 3, 4, 5, 6, 7, 12, 13, 14],
            Self::Stm32F3 => &[2, 3, 4, 6, 7],
        }
    }

    /// Bus feeding a timer
    #[must_use]
    pub fn bus_for(self, timer: TimerInstance) -> Bus {
        // F0 has a single peripheral bus
        if matches!(self, Self::Stm32F0) || self.apb1_timers().contains(&timer.number()) {
            Bus::Apb1
        } else {
            Bus::Apb2
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ChipFamily {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Stm32F0 => defmt::write!(f, "STM32F0"),
            Self::Stm32F1 => defmt::write!(f, "STM32F1"),
            Self::Stm32F2 => defmt::write!(f, "STM32F2"),
            Self::Stm32F3 => defmt::write!(f, "STM32F3"),
            Self::Stm32F4 => defmt::write!(f, "STM32F4"),
            Self::Stm32F7 => defmt::write!(f, "STM32F7"),
        }
    }
}

/// Bus clock frequencies as reported by the RCC
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusClocks {
    /// AHB clock in Hz
    pub hclk: u32,
    /// APB1 clock in Hz
    pub pclk1: u32,
    /// APB2 clock in Hz
    pub pclk2: u32,
}

impl BusClocks {
    /// Create from the three bus frequencies
    #[must_use]
    pub const fn new(hclk: u32, pclk1: u32, pclk2: u32) -> Self {
        Self { hclk, pclk1, pclk2 }
    }

    /// Clock of a peripheral bus
    #[must_use]
    pub const fn pclk(&self, bus: Bus) -> u32 {
        match bus {
            Bus::Apb1 => self.pclk1,
            Bus::Apb2 => self.pclk2,
        }
    }

    /// Timer clock on a bus: PCLK when the APB prescaler is 1, else 2 × PCLK
    #[must_use]
    pub const fn timer_clock(&self, bus: Bus) -> u32 {
        let pclk = self.pclk(bus);
        if pclk == self.hclk {
            pclk
        } else {
            pclk.saturating_mul(2)
        }
    }
}

/// Timer clock derived from the bus topology of a chip family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusClockTree {
    /// Chip family
    pub family: ChipFamily,
    /// Timer whose clock is wanted
    pub timer: TimerInstance,
    /// Current bus frequencies
    pub clocks: BusClocks,
}

impl BusClockTree {
    /// Create a clock tree view for one timer
    #[must_use]
    pub const fn new(family: ChipFamily, timer: TimerInstance, clocks: BusClocks) -> Self {
        Self { family, timer, clocks }
    }

    /// Bus the timer is attached to
    #[must_use]
    pub fn bus(&self) -> Bus {
        self.family.bus_for(self.timer)
    }
}

impl ClockSource for BusClockTree {
    fn timer_clock_hz(&self) -> u32 {
        self.clocks.timer_clock(self.bus())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_clock_doubles_with_divided_bus() {
        let clocks = BusClocks::new(72_000_000, 36_000_000, 72_000_000);
        assert_eq!(clocks.timer_clock(Bus::Apb1), 72_000_000);
        assert_eq!(clocks.timer_clock(Bus::Apb2), 72_000_000);
    }

    #[test]
    fn f0_puts_everything_on_apb1() {
        assert_eq!(ChipFamily::Stm32F0.bus_for(TimerInstance::TIM1), Bus::Apb1);
        assert_eq!(ChipFamily::Stm32F0.bus_for(TimerInstance::new(17)), Bus::Apb1);
    }

    #[test]
    fn fixed_clock_through_reference() {
        let clock = FixedClock(48_000_000);
        let by_ref: &dyn ClockSource = &clock;
        assert_eq!((&by_ref).timer_clock_hz(), 48_000_000);
    }
}
