use embassy_time::{Duration, Instant};
use embedded_hal_1::digital::InputPin;

use crate::error::Error;

/// Which electrical level means "engaged".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    pub const fn is_active(self, level_high: bool) -> bool {
        match self {
            Polarity::ActiveHigh => level_high,
            Polarity::ActiveLow => !level_high,
        }
    }
}

/// Edge-latching debouncer.
///
/// The first transition is accepted immediately and then every further change
/// is ignored until the deadline passes.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    stable_level: bool,
    debounce_deadline: Option<Instant>,
    debounce: Duration,
}

impl Debouncer {
    pub const fn new(initial_level: bool, debounce: Duration) -> Self {
        Self {
            stable_level: initial_level,
            debounce_deadline: None,
            debounce,
        }
    }

    pub fn read(&mut self, raw_level: bool, now: Instant) -> bool {
        match self.debounce_deadline {
            Some(deadline) => {
                if now >= deadline {
                    self.debounce_deadline = None;
                }
            }
            None => {
                if raw_level != self.stable_level {
                    self.stable_level = raw_level;
                    self.debounce_deadline = Some(now + self.debounce);
                }
            }
        }
        self.stable_level
    }

    pub fn stable_level(&self) -> bool {
        self.stable_level
    }

    pub fn is_pending(&self) -> bool {
        self.debounce_deadline.is_some()
    }
}

/// A switch input sampled through a [`Debouncer`].
pub struct DebouncedPin<P> {
    pin: P,
    polarity: Polarity,
    debouncer: Debouncer,
}

impl<P: InputPin> DebouncedPin<P> {
    /// Starts released; switches idle at their pulled level.
    pub fn new(pin: P, polarity: Polarity, debounce: Duration) -> Self {
        Self {
            pin,
            polarity,
            debouncer: Debouncer::new(false, debounce),
        }
    }

    /// Samples the pin and returns the debounced engaged state.
    pub fn update(&mut self, now: Instant) -> Result<bool, Error> {
        let high = self.pin.is_high().map_err(|_| Error::DigitalInput)?;
        Ok(self.debouncer.read(self.polarity.is_active(high), now))
    }

    pub fn is_engaged(&self) -> bool {
        self.debouncer.stable_level()
    }
}
